//! Run configuration
//!
//! Settings can come from a YAML file (`--config`) and from command-line
//! flags. Flags win over file values; anything left unset falls back to
//! the built-in defaults.
//!
//! ```yaml
//! region: eu-west-1
//! credential_mode: profile
//! profile: production
//! output_dir: ./terraform-kms
//! module: false
//! region_source: first-key-arn
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::infrastructure::config_generator::{Layout, RegionSource};
use crate::infrastructure::error::{ImportResult, KmsImportError};
use crate::infrastructure::session::{CredentialMode, SessionConfig};
use crate::infrastructure::workflow::ImportOptions;
use crate::traits::FileSystem;

/// Credential mode as written in a config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialModeSetting {
    Environment,
    Profile,
    Interactive,
}

/// Contents of a YAML run configuration file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub credential_mode: Option<CredentialModeSetting>,
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub module: Option<bool>,
    #[serde(default)]
    pub region_source: Option<RegionSource>,
    #[serde(default)]
    pub dry_run: Option<bool>,
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub interactive: bool,
    pub output_dir: Option<PathBuf>,
    pub module: bool,
    pub region_source: Option<RegionSource>,
    pub dry_run: bool,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub session: SessionConfig,
    pub options: ImportOptions,
}

impl RunConfig {
    /// Load a config file
    pub fn load(fs: &dyn FileSystem, path: &Path) -> ImportResult<Self> {
        let content = fs.read_to_string(path).map_err(|err| {
            KmsImportError::ConfigParse(format!("{}: {:#}", path.display(), err))
        })?;

        Self::parse(&content).map_err(|err| {
            KmsImportError::ConfigParse(format!("{}: {}", path.display(), err))
        })
    }

    pub fn parse(content: &str) -> ImportResult<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(content)?)
    }

    /// Combine with command-line overrides
    pub fn merge(self, overrides: Overrides) -> ImportResult<Settings> {
        let mode = if overrides.interactive {
            CredentialMode::Interactive
        } else if let Some(profile) = overrides.profile {
            CredentialMode::Profile(profile)
        } else {
            match (self.credential_mode, self.profile) {
                (Some(CredentialModeSetting::Interactive), _) => CredentialMode::Interactive,
                (Some(CredentialModeSetting::Environment), _) => CredentialMode::Environment,
                (Some(CredentialModeSetting::Profile) | None, Some(profile)) => {
                    CredentialMode::Profile(profile)
                }
                (Some(CredentialModeSetting::Profile), None) => {
                    return Err(KmsImportError::ConfigParse(
                        "credential_mode 'profile' requires a profile name".to_string(),
                    ));
                }
                (None, None) => CredentialMode::Environment,
            }
        };

        let layout = if overrides.module || self.module.unwrap_or(false) {
            Layout::Module
        } else {
            Layout::Flat
        };

        let output_dir = overrides
            .output_dir
            .or(self.output_dir)
            .unwrap_or_else(|| PathBuf::from(layout.default_output_dir()));

        Ok(Settings {
            session: SessionConfig {
                mode,
                region: overrides.region.or(self.region),
            },
            options: ImportOptions {
                output_dir,
                layout,
                region_source: overrides
                    .region_source
                    .or(self.region_source)
                    .unwrap_or_default(),
                dry_run: overrides.dry_run || self.dry_run.unwrap_or(false),
            },
        })
    }
}
