//! Persistence layer
//!
//! The dataset lives in two JSON array files, `groups.json` and
//! `tasks.json`, inside the configured data directory. Both are read once
//! at startup and written back at graceful shutdown. Writes go to a temp
//! file first and are renamed into place; file locks (`fs2`) keep an
//! external reader from observing a half-written file.
//!
//! A missing file means an empty collection (first run needs no setup); a
//! file that exists but does not parse is a fatal startup error.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{Group, Task};

/// Reads and writes the persisted dataset
pub struct DataStore {
    groups_path: PathBuf,
    tasks_path: PathBuf,
}

impl DataStore {
    /// Creates a store rooted at the given data directory
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            groups_path: data_dir.join("groups.json"),
            tasks_path: data_dir.join("tasks.json"),
        }
    }

    /// Loads both collections
    pub fn load(&self) -> Result<(Vec<Group>, Vec<Task>)> {
        let groups = read_array(&self.groups_path)?;
        let tasks = read_array(&self.tasks_path)?;
        Ok((groups, tasks))
    }

    /// Writes both collections back
    pub fn save(&self, groups: &[Group], tasks: &[Task]) -> Result<()> {
        write_array(&self.groups_path, groups)?;
        write_array(&self.tasks_path, tasks)?;
        Ok(())
    }

    /// Path of the groups file
    pub fn groups_path(&self) -> &Path {
        &self.groups_path
    }

    /// Path of the tasks file
    pub fn tasks_path(&self) -> &Path {
        &self.tasks_path
    }
}

fn read_array<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;

    // Shared lock so a concurrent save cannot be observed mid-rename
    file.lock_shared()
        .with_context(|| format!("Failed to lock {}", path.display()))?;

    let reader = BufReader::new(&file);
    let items = serde_json::from_reader(reader)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    // Lock is released when the file handle drops
    Ok(items)
}

fn write_array<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    let temp_path = path.with_extension("json.tmp");
    {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("Failed to create {}", temp_path.display()))?;

        file.lock_exclusive()
            .with_context(|| format!("Failed to lock {}", temp_path.display()))?;

        let mut writer = BufWriter::new(&file);
        serde_json::to_writer(&mut writer, items)
            .with_context(|| format!("Failed to serialize {}", path.display()))?;
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", temp_path.display()))?;
    }

    fs::rename(&temp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}
