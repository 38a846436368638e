//! A table kept as a JSON file on disk.
//!
//! The whole file is read on open and rewritten on every mutation, through a
//! temporary file renamed over the original.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use calsheet_core::cell::{Cell, Row};
use calsheet_core::error::{SyncError, SyncResult};
use calsheet_core::store::TableStore;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct SheetContents {
    #[serde(default)]
    rows: Vec<Row>,
    /// Number format pattern per column index.
    #[serde(default)]
    column_formats: BTreeMap<usize, String>,
    #[serde(default)]
    hidden_columns: BTreeSet<usize>,
}

pub struct SheetFile {
    path: PathBuf,
    contents: SheetContents,
}

impl SheetFile {
    /// Open the sheet at `path`. A missing file is an empty table, created on
    /// the first write; a missing directory is a configuration error.
    pub fn open(path: &Path) -> SyncResult<Self> {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = parent
            && !dir.is_dir()
        {
            return Err(SyncError::Configuration(format!(
                "Directory for sheet {} does not exist",
                path.display()
            )));
        }

        let contents = if path.exists() {
            let raw = fs::read_to_string(path)?;
            serde_json::from_str(&raw).map_err(|e| {
                SyncError::Serialization(format!("{}: {}", path.display(), e))
            })?
        } else {
            debug!(path = %path.display(), "sheet file missing, starting empty");
            SheetContents::default()
        };

        Ok(SheetFile {
            path: path.to_path_buf(),
            contents,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> SyncResult<()> {
        let json = serde_json::to_string_pretty(&self.contents)
            .map_err(|e| SyncError::Serialization(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), rows = self.contents.rows.len(), "saved sheet");
        Ok(())
    }
}

impl TableStore for SheetFile {
    fn read_all(&self) -> SyncResult<Vec<Row>> {
        Ok(self.contents.rows.clone())
    }

    fn write_all(&mut self, rows: &[Row]) -> SyncResult<()> {
        let existing = &mut self.contents.rows;
        for (i, row) in rows.iter().enumerate() {
            match existing.get_mut(i) {
                Some(slot) => *slot = row.clone(),
                None => existing.push(row.clone()),
            }
        }
        self.save()
    }

    fn write_column(&mut self, col: usize, cells: &[Cell]) -> SyncResult<()> {
        let rows = &mut self.contents.rows;
        if rows.len() < cells.len() {
            rows.resize(cells.len(), Vec::new());
        }
        for (row, cell) in rows.iter_mut().zip(cells) {
            if row.len() <= col {
                row.resize(col + 1, Cell::Empty);
            }
            row[col] = cell.clone();
        }
        self.save()
    }

    fn delete_trailing_rows(&mut self, from: usize, count: usize) -> SyncResult<()> {
        let rows = &mut self.contents.rows;
        let end = from.saturating_add(count).min(rows.len());
        if from < end {
            rows.drain(from..end);
        }
        self.save()
    }

    fn set_column_format(&mut self, col: usize, pattern: &str) -> SyncResult<()> {
        self.contents.column_formats.insert(col, pattern.to_string());
        self.save()
    }

    fn hide_column(&mut self, col: usize) -> SyncResult<()> {
        self.contents.hidden_columns.insert(col);
        self.save()
    }
}
