// file: src/input/scanner.rs
// description: resolves upload arguments to pdf files, walking directories with filtering
// reference: https://docs.rs/walkdir

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::utils::Validator;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

pub struct FileScanner {
    config: PipelineConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub size: u64,
}

impl FileScanner {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Expands each argument: files are taken as given, directories are
    /// walked for `.pdf` files. Output is sorted by path and deduplicated.
    pub fn collect(&self, inputs: &[PathBuf]) -> Result<Vec<ScannedFile>> {
        let mut files = Vec::new();

        for input in inputs {
            if input.is_dir() {
                files.extend(self.scan_directory(input)?);
            } else if input.is_file() {
                let size = std::fs::metadata(input)
                    .map_err(|source| PipelineError::FileOperation {
                        path: input.clone(),
                        source,
                    })?
                    .len();
                if let Err(e) = Validator::validate_pdf_extension(input) {
                    warn!("{}; uploading anyway", e);
                }
                files.push(ScannedFile {
                    path: input.clone(),
                    size,
                });
            } else {
                return Err(PipelineError::Validation(format!(
                    "Path does not exist: {}",
                    input.display()
                )));
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        files.dedup_by(|a, b| a.path == b.path);
        Ok(files)
    }

    pub fn scan_directory(&self, root: &Path) -> Result<Vec<ScannedFile>> {
        info!("Scanning directory: {}", root.display());
        let mut files = Vec::new();
        let max_size = (self.config.max_file_size_mb * 1024 * 1024) as u64;

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();

            if self.should_skip(path) {
                debug!("Skipping file: {}", path.display());
                continue;
            }

            if Validator::validate_pdf_extension(path).is_ok()
                && let Ok(metadata) = entry.metadata()
            {
                let size = metadata.len();
                if size > max_size {
                    debug!(
                        "Skipping large file ({} MB): {}",
                        size / 1024 / 1024,
                        path.display()
                    );
                    continue;
                }

                files.push(ScannedFile {
                    path: path.to_path_buf(),
                    size,
                });
            }
        }

        info!("Found {} pdf files", files.len());
        Ok(files)
    }

    fn should_skip(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        self.config.skip_patterns.iter().any(|pattern| {
            if let Some(suffix) = pattern.strip_prefix('*') {
                path_str.ends_with(suffix)
            } else {
                path_str.contains(pattern.replace('*', "").as_str())
            }
        })
    }
}
