use std::fmt;

use crate::infrastructure::error::{ImportResult, KmsImportError};
use crate::infrastructure::providers::aws::known_regions;
use crate::traits::{Output, UserInput};

/// Where credentials come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialMode {
    /// The ambient AWS credential chain (env vars, shared config, instance role)
    Environment,
    /// A named profile from the shared config files
    Profile(String),
    /// Access keys typed in at a prompt
    Interactive,
}

/// Inputs to session resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub mode: CredentialMode,
    /// Explicit region; otherwise the profile/environment default (or a prompt)
    pub region: Option<String>,
}

/// Static access keys
#[derive(Clone, PartialEq, Eq)]
pub struct StaticKeys {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl fmt::Debug for StaticKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticKeys")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .finish()
    }
}

/// Resolved credential source handed to the SDK loader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Ambient,
    Profile(String),
    Static(StaticKeys),
}

/// What the API client is built from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPlan {
    pub region: Option<String>,
    pub source: CredentialSource,
}

/// Turns a session configuration into a credential source, prompting when asked to
pub struct SessionResolver<'a> {
    input: &'a dyn UserInput,
    output: &'a dyn Output,
}

impl<'a> SessionResolver<'a> {
    pub fn new(input: &'a dyn UserInput, output: &'a dyn Output) -> Self {
        Self { input, output }
    }

    pub fn resolve(&self, config: &SessionConfig) -> ImportResult<SessionPlan> {
        let region = match config.region.as_deref().map(str::trim) {
            Some("") => {
                return Err(KmsImportError::AuthResolution(
                    "region must not be empty".to_string(),
                ));
            }
            Some(region) => Some(region.to_string()),
            None => None,
        };

        match &config.mode {
            CredentialMode::Environment => {
                self.output
                    .info("Using credentials from the AWS environment");
                Ok(SessionPlan {
                    region,
                    source: CredentialSource::Ambient,
                })
            }
            CredentialMode::Profile(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(KmsImportError::AuthResolution(
                        "profile name must not be empty".to_string(),
                    ));
                }

                self.output
                    .info(&format!("Using AWS profile '{}'", name));
                Ok(SessionPlan {
                    region,
                    source: CredentialSource::Profile(name.to_string()),
                })
            }
            CredentialMode::Interactive => self.prompt(region),
        }
    }

    fn prompt(&self, region: Option<String>) -> ImportResult<SessionPlan> {
        let access_key_id = required(
            self.input
                .text("AWS Access Key ID:", None)
                .map_err(prompt_failed)?,
            "access key ID",
        )?;
        let secret_access_key = required(
            self.input
                .password("AWS Secret Access Key:")
                .map_err(prompt_failed)?,
            "secret access key",
        )?;

        let session_token = if self
            .input
            .confirm("Are these temporary credentials with a session token?", false)
            .map_err(prompt_failed)?
        {
            Some(required(
                self.input
                    .text("AWS Session Token:", None)
                    .map_err(prompt_failed)?,
                "session token",
            )?)
        } else {
            None
        };

        let region = match region {
            Some(region) => region,
            None => self
                .input
                .select("AWS Region:", known_regions())
                .map_err(prompt_failed)?,
        };

        self.output
            .info("Using credentials entered interactively");

        Ok(SessionPlan {
            region: Some(region),
            source: CredentialSource::Static(StaticKeys {
                access_key_id,
                secret_access_key,
                session_token,
            }),
        })
    }
}

fn prompt_failed(err: anyhow::Error) -> KmsImportError {
    KmsImportError::AuthResolution(format!("credential prompt failed: {}", err))
}

fn required(value: String, what: &str) -> ImportResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(KmsImportError::AuthResolution(format!(
            "{} must not be empty",
            what
        )));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockOutput, MockResponse, MockUserInput};

    fn resolve(config: SessionConfig, input: &MockUserInput) -> ImportResult<SessionPlan> {
        let output = MockOutput::new();
        SessionResolver::new(input, &output).resolve(&config)
    }

    #[test]
    fn test_environment_mode_keeps_explicit_region() {
        let input = MockUserInput::new();
        let plan = resolve(
            SessionConfig {
                mode: CredentialMode::Environment,
                region: Some(" eu-west-1 ".to_string()),
            },
            &input,
        )
        .unwrap();

        assert_eq!(plan.region.as_deref(), Some("eu-west-1"));
        assert_eq!(plan.source, CredentialSource::Ambient);
    }

    #[test]
    fn test_profile_mode() {
        let input = MockUserInput::new();
        let plan = resolve(
            SessionConfig {
                mode: CredentialMode::Profile("prod".to_string()),
                region: None,
            },
            &input,
        )
        .unwrap();

        assert_eq!(plan.region, None);
        assert_eq!(plan.source, CredentialSource::Profile("prod".to_string()));
    }

    #[test]
    fn test_empty_profile_is_rejected() {
        let input = MockUserInput::new();
        let err = resolve(
            SessionConfig {
                mode: CredentialMode::Profile("  ".to_string()),
                region: None,
            },
            &input,
        )
        .unwrap_err();

        assert!(matches!(err, KmsImportError::AuthResolution(_)));
    }

    #[test]
    fn test_interactive_mode_prompts_for_keys_and_region() {
        let input = MockUserInput::with_responses(vec![
            MockResponse::Text("AKIAEXAMPLE".to_string()),
            MockResponse::Password("secret".to_string()),
            MockResponse::Confirm(true),
            MockResponse::Text("token".to_string()),
            MockResponse::Select("eu-central-1".to_string()),
        ]);

        let plan = resolve(
            SessionConfig {
                mode: CredentialMode::Interactive,
                region: None,
            },
            &input,
        )
        .unwrap();

        assert_eq!(plan.region.as_deref(), Some("eu-central-1"));
        assert_eq!(
            plan.source,
            CredentialSource::Static(StaticKeys {
                access_key_id: "AKIAEXAMPLE".to_string(),
                secret_access_key: "secret".to_string(),
                session_token: Some("token".to_string()),
            })
        );
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn test_interactive_mode_skips_region_prompt_when_given() {
        let input = MockUserInput::with_responses(vec![
            MockResponse::Text("AKIAEXAMPLE".to_string()),
            MockResponse::Password("secret".to_string()),
            MockResponse::Confirm(false),
        ]);

        let plan = resolve(
            SessionConfig {
                mode: CredentialMode::Interactive,
                region: Some("us-west-2".to_string()),
            },
            &input,
        )
        .unwrap();

        assert_eq!(plan.region.as_deref(), Some("us-west-2"));
        match plan.source {
            CredentialSource::Static(keys) => assert_eq!(keys.session_token, None),
            other => panic!("unexpected source: {:?}", other),
        }
    }

    #[test]
    fn test_interactive_mode_rejects_empty_access_key() {
        let input = MockUserInput::with_responses(vec![MockResponse::Text("   ".to_string())]);

        let err = resolve(
            SessionConfig {
                mode: CredentialMode::Interactive,
                region: None,
            },
            &input,
        )
        .unwrap_err();

        assert!(matches!(err, KmsImportError::AuthResolution(_)));
    }

    #[test]
    fn test_static_keys_debug_redacts_secret() {
        let keys = StaticKeys {
            access_key_id: "AKIAEXAMPLE".to_string(),
            secret_access_key: "very-secret".to_string(),
            session_token: None,
        };

        let text = format!("{:?}", keys);
        assert!(text.contains("AKIAEXAMPLE"));
        assert!(!text.contains("very-secret"));
    }
}
