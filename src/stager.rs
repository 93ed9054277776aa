use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

use crate::direct_files;
use crate::paths::{PathConfiguration, RESOURCE_DIR};

/// One file copy into an output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingTask {
    pub source: PathBuf,
    pub destination_root: PathBuf,
    /// Relative to the root. Empty for files that sit next to the executable.
    pub subfolder: PathBuf,
    /// File name at the destination; usually the source file name.
    pub file_name: PathBuf,
}

impl StagingTask {
    pub fn destination(&self) -> PathBuf {
        self.destination_root.join(&self.subfolder).join(&self.file_name)
    }

    /// Copies the file, creating the destination folder and overwriting
    /// whatever was there.
    pub fn execute(&self) -> Result<()> {
        let destination = self.destination();
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        fs::copy(&self.source, &destination).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                self.source.display(),
                destination.display()
            )
        })?;

        log::debug!("Staged {} -> {}", self.source.display(), destination.display());
        Ok(())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StagingReport {
    pub roots: usize,
    pub files_copied: usize,
}

/// Copies shared libraries and resource folders into every output root.
///
/// Never deletes anything: files left over from earlier runs stay in place.
pub struct ResourceStager<'a> {
    config: &'a PathConfiguration,
}

impl<'a> ResourceStager<'a> {
    pub fn new(config: &'a PathConfiguration) -> Self {
        Self { config }
    }

    /// The copies for a single output root, libraries first.
    pub fn plan_root(&self, root: &Path) -> Result<Vec<StagingTask>> {
        let mut tasks: Vec<StagingTask> = self
            .config
            .shared_libraries
            .iter()
            .map(|library| StagingTask {
                source: library.source.clone(),
                destination_root: root.to_path_buf(),
                subfolder: PathBuf::new(),
                file_name: PathBuf::from(&library.file_name),
            })
            .collect();

        for folder in self.config.resource_folders() {
            if !folder.is_dir() {
                log::warn!("Skipping missing resource folder {}", folder.display());
                continue;
            }

            let folder_name = folder
                .file_name()
                .with_context(|| format!("Resource folder {} has no name", folder.display()))?;
            let subfolder = Path::new(RESOURCE_DIR).join(folder_name);

            let files = direct_files(folder)
                .with_context(|| format!("Failed to enumerate resources in {}", folder.display()))?;
            for source in files {
                // direct_files only yields named entries
                let Some(file_name) = source.file_name().map(PathBuf::from) else {
                    continue;
                };
                tasks.push(StagingTask {
                    source,
                    destination_root: root.to_path_buf(),
                    subfolder: subfolder.clone(),
                    file_name,
                });
            }
        }

        Ok(tasks)
    }

    pub fn stage(&self) -> Result<StagingReport> {
        let mut report = StagingReport::default();

        for root in &self.config.output_roots {
            fs::create_dir_all(root)
                .with_context(|| format!("Failed to create output root {}", root.display()))?;

            let tasks = self.plan_root(root)?;
            for task in &tasks {
                task.execute()?;
            }

            log::info!("Staged {} file(s) into {}", tasks.len(), root.display());
            report.roots += 1;
            report.files_copied += tasks.len();
        }

        Ok(report)
    }
}
