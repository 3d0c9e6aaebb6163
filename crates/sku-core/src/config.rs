//! Run configuration stored as JSON

use crate::catalog::DEFAULT_CATALOG_FILE;
use crate::error::{Error, Result};
use crate::export::{is_output_name, OutputFormat};
use crate::scanner::{scan_inputs, ScanOptions};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for a mapping run
///
/// Inputs are the explicit `inputs` list followed by whatever a scan of
/// `input_dir` finds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Reference catalog workbook
    pub catalog: PathBuf,
    /// Input files processed in the given order
    pub inputs: Vec<PathBuf>,
    /// Directory scanned for input files
    pub input_dir: Option<PathBuf>,
    /// Descend into subdirectories of `input_dir`
    pub recursive: bool,
    /// Pick up spreadsheets in `input_dir`, not only CSV files
    pub include_spreadsheets: bool,
    /// Where processed files are written
    pub output_dir: PathBuf,
    /// Format of per-file outputs
    pub format: OutputFormat,
    /// Also write the multi-sheet combined workbook
    pub combined_workbook: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from(DEFAULT_CATALOG_FILE),
            inputs: Vec::new(),
            input_dir: None,
            recursive: false,
            include_spreadsheets: false,
            output_dir: PathBuf::from("."),
            format: OutputFormat::Xlsx,
            combined_workbook: true,
        }
    }
}

impl RunConfig {
    /// Load a run configuration from JSON
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Save the run configuration to JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Every input file this configuration names, explicit ones first
    ///
    /// Scanned files inside the output directory, or named like processed
    /// output, are skipped so earlier results are not processed again.
    pub fn resolve_inputs(&self) -> Result<Vec<PathBuf>> {
        let mut inputs = self.inputs.clone();

        if let Some(dir) = &self.input_dir {
            let options = ScanOptions {
                recursive: self.recursive,
                include_spreadsheets: self.include_spreadsheets,
            };
            let skip_output = self.output_dir != *dir && self.output_dir != Path::new(".");
            for path in scan_inputs(dir, options)? {
                if skip_output && path.starts_with(&self.output_dir) {
                    continue;
                }
                let written_here = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(is_output_name);
                if written_here {
                    continue;
                }
                if !inputs.contains(&path) {
                    inputs.push(path);
                }
            }
        }

        Ok(inputs)
    }
}
