use std::path::{Path, PathBuf};

use crate::infrastructure::config_generator::RenderedArtifact;
use crate::infrastructure::error::KmsImportError;
use crate::traits::{FileSystem, Output};

/// Outcome of writing a set of artifacts
#[derive(Debug, Default)]
pub struct WriteReport {
    /// Paths written, joined onto the output root
    pub written: Vec<PathBuf>,
    pub failed: Vec<KmsImportError>,
}

impl WriteReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes rendered artifacts under an output root
pub struct ArtifactWriter<'a> {
    fs: &'a dyn FileSystem,
    output: &'a dyn Output,
}

impl<'a> ArtifactWriter<'a> {
    pub fn new(fs: &'a dyn FileSystem, output: &'a dyn Output) -> Self {
        Self { fs, output }
    }

    /// Write every artifact, overwriting existing files
    ///
    /// A failed file is reported and the rest are still written.
    pub fn write_all(&self, root: &Path, artifacts: &[RenderedArtifact]) -> WriteReport {
        let mut report = WriteReport::default();

        if let Err(err) = self.fs.create_dir_all(root) {
            report.failed.push(KmsImportError::FileSystem {
                path: root.to_path_buf(),
                message: format!("{:#}", err),
            });
            self.output.error(&format!(
                "Could not create output directory {}: {:#}",
                root.display(),
                err
            ));
            return report;
        }

        for artifact in artifacts {
            let path = root.join(&artifact.path);
            match self.write_one(&path, artifact) {
                Ok(()) => {
                    self.output
                        .success(&format!("Generated: {}", path.display()));
                    report.written.push(path);
                }
                Err(err) => {
                    self.output.error(&err.to_string());
                    report.failed.push(err);
                }
            }
        }

        report
    }

    fn write_one(&self, path: &Path, artifact: &RenderedArtifact) -> Result<(), KmsImportError> {
        let fail = |err: anyhow::Error| KmsImportError::FileSystem {
            path: path.to_path_buf(),
            message: format!("{:#}", err),
        };

        if let Some(parent) = path.parent() {
            self.fs.create_dir_all(parent).map_err(fail)?;
        }
        self.fs.write(path, &artifact.contents).map_err(fail)?;
        if artifact.executable {
            self.fs.set_executable(path).map_err(fail)?;
        }

        Ok(())
    }
}
