//! Directory scanner for discovering sales export files

use crate::error::Result;
use crate::parser::InputFormat;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Which files a scan picks up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanOptions {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Also pick up spreadsheets, not just CSV files
    pub include_spreadsheets: bool,
}

/// Find input files under `root`, sorted by path
pub fn scan_inputs<P: AsRef<Path>>(root: P, options: ScanOptions) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(root.as_ref()).follow_links(true);
    if !options.recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if is_lock_file(path) {
            continue;
        }

        let wanted = match InputFormat::detect(path) {
            Some(InputFormat::Csv) => true,
            Some(InputFormat::Spreadsheet) => options.include_spreadsheets,
            None => false,
        };
        if wanted {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Office keeps `~$name.xlsx` lock files next to open workbooks
fn is_lock_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("~$"))
}
