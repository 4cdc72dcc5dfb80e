use std::fmt;
use std::path::PathBuf;

/// Error types for the KMS inventory and code generation pipeline
#[derive(Debug)]
pub enum KmsImportError {
    /// No usable credential source or region could be resolved
    AuthResolution(String),

    /// A call the whole run depends on failed (e.g. listing keys)
    FatalApi { operation: String, message: String },

    /// A mandatory per-key call failed; the key is skipped
    TransientApi {
        key_id: String,
        operation: String,
        message: String,
    },

    /// An optional per-key enrichment failed; the field was defaulted
    OptionalFetch {
        key_id: String,
        field: String,
        message: String,
    },

    /// Writing a single artifact failed
    FileSystem { path: PathBuf, message: String },

    /// Two resources sanitize to the same Terraform address
    DuplicateResourceName {
        address: String,
        first: String,
        second: String,
    },

    /// Run configuration file could not be parsed
    ConfigParse(String),

    /// Serialization error
    Serialization(String),

    /// General I/O error
    Io(std::io::Error),
}

impl KmsImportError {
    /// Key the error is scoped to, if any
    pub fn key_id(&self) -> Option<&str> {
        match self {
            KmsImportError::TransientApi { key_id, .. }
            | KmsImportError::OptionalFetch { key_id, .. } => Some(key_id),
            _ => None,
        }
    }
}

impl fmt::Display for KmsImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KmsImportError::AuthResolution(msg) => {
                write!(f, "Unable to resolve AWS credentials: {}", msg)
            }
            KmsImportError::FatalApi { operation, message } => {
                write!(f, "KMS {} failed: {}", operation, message)
            }
            KmsImportError::TransientApi {
                key_id,
                operation,
                message,
            } => {
                write!(
                    f,
                    "KMS {} failed for key {}: {}",
                    operation, key_id, message
                )
            }
            KmsImportError::OptionalFetch {
                key_id,
                field,
                message,
            } => {
                write!(
                    f,
                    "Could not fetch {} for key {} (using default): {}",
                    field, key_id, message
                )
            }
            KmsImportError::FileSystem { path, message } => {
                write!(f, "Failed to write {}: {}", path.display(), message)
            }
            KmsImportError::DuplicateResourceName {
                address,
                first,
                second,
            } => {
                write!(
                    f,
                    "Resource address '{}' is derived from both '{}' and '{}'",
                    address, first, second
                )
            }
            KmsImportError::ConfigParse(msg) => {
                write!(f, "Failed to parse configuration: {}", msg)
            }
            KmsImportError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            KmsImportError::Io(err) => {
                write!(f, "I/O error: {}", err)
            }
        }
    }
}

impl std::error::Error for KmsImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KmsImportError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for KmsImportError {
    fn from(err: std::io::Error) -> Self {
        KmsImportError::Io(err)
    }
}

impl From<serde_yaml::Error> for KmsImportError {
    fn from(err: serde_yaml::Error) -> Self {
        KmsImportError::ConfigParse(err.to_string())
    }
}

impl From<serde_json::Error> for KmsImportError {
    fn from(err: serde_json::Error) -> Self {
        KmsImportError::Serialization(err.to_string())
    }
}

/// Result type for KMS import operations
pub type ImportResult<T> = Result<T, KmsImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_error_names_key() {
        let err = KmsImportError::TransientApi {
            key_id: "1234abcd".to_string(),
            operation: "DescribeKey".to_string(),
            message: "AccessDeniedException".to_string(),
        };

        assert_eq!(err.key_id(), Some("1234abcd"));
        assert!(err.to_string().contains("1234abcd"));
        assert!(err.to_string().contains("DescribeKey"));
    }

    #[test]
    fn test_duplicate_name_display() {
        let err = KmsImportError::DuplicateResourceName {
            address: "aws_kms_alias.alias_app_key".to_string(),
            first: "alias/app-key".to_string(),
            second: "alias/app_key".to_string(),
        };

        let text = err.to_string();
        assert!(text.contains("alias/app-key"));
        assert!(text.contains("alias/app_key"));
        assert_eq!(err.key_id(), None);
    }

    #[test]
    fn test_yaml_error_converts_to_config_parse() {
        let yaml_err = serde_yaml::from_str::<Vec<String>>("{not: [a list").unwrap_err();
        let err: KmsImportError = yaml_err.into();
        assert!(matches!(err, KmsImportError::ConfigParse(_)));
    }
}
