use serde::Serialize;
use serde_json::Value;

/// Intended use of a KMS key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyUsage {
    EncryptDecrypt,
    SignVerify,
    GenerateVerifyMac,
    KeyAgreement,
    Other(String),
}

impl KeyUsage {
    /// Get the API identifier string
    pub fn as_str(&self) -> &str {
        match self {
            KeyUsage::EncryptDecrypt => "ENCRYPT_DECRYPT",
            KeyUsage::SignVerify => "SIGN_VERIFY",
            KeyUsage::GenerateVerifyMac => "GENERATE_VERIFY_MAC",
            KeyUsage::KeyAgreement => "KEY_AGREEMENT",
            KeyUsage::Other(value) => value,
        }
    }

    /// Parse key usage from its API string; a missing value means ENCRYPT_DECRYPT
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            None | Some("ENCRYPT_DECRYPT") => KeyUsage::EncryptDecrypt,
            Some("SIGN_VERIFY") => KeyUsage::SignVerify,
            Some("GENERATE_VERIFY_MAC") => KeyUsage::GenerateVerifyMac,
            Some("KEY_AGREEMENT") => KeyUsage::KeyAgreement,
            Some(other) => KeyUsage::Other(other.to_string()),
        }
    }
}

/// Lifecycle state of a KMS key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyState {
    Enabled,
    Disabled,
    PendingDeletion,
    PendingImport,
    PendingReplicaDeletion,
    Unavailable,
    Updating,
    Creating,
    Other(String),
}

impl KeyState {
    pub fn as_str(&self) -> &str {
        match self {
            KeyState::Enabled => "Enabled",
            KeyState::Disabled => "Disabled",
            KeyState::PendingDeletion => "PendingDeletion",
            KeyState::PendingImport => "PendingImport",
            KeyState::PendingReplicaDeletion => "PendingReplicaDeletion",
            KeyState::Unavailable => "Unavailable",
            KeyState::Updating => "Updating",
            KeyState::Creating => "Creating",
            KeyState::Other(value) => value,
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "Enabled" => KeyState::Enabled,
            "Disabled" => KeyState::Disabled,
            "PendingDeletion" => KeyState::PendingDeletion,
            "PendingImport" => KeyState::PendingImport,
            "PendingReplicaDeletion" => KeyState::PendingReplicaDeletion,
            "Unavailable" => KeyState::Unavailable,
            "Updating" => KeyState::Updating,
            "Creating" => KeyState::Creating,
            other => KeyState::Other(other.to_string()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, KeyState::Enabled)
    }
}

/// Who manages a key: the account owner or AWS itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyManager {
    Aws,
    Customer,
}

impl KeyManager {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyManager::Aws => "AWS",
            KeyManager::Customer => "CUSTOMER",
        }
    }

    /// Anything not explicitly AWS-managed is treated as customer-managed
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some(value) if value.eq_ignore_ascii_case("AWS") => KeyManager::Aws,
            _ => KeyManager::Customer,
        }
    }
}

impl std::fmt::Display for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resource tag attached to a key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Snapshot of a DescribeKey response, serialized with the API's field names
///
/// Timestamps are already rendered as RFC 3339 strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyMetadataSnapshot {
    #[serde(rename = "AWSAccountId", skip_serializing_if = "Option::is_none")]
    pub aws_account_id: Option<String>,
    pub key_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_usage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deletion_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_key_store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_master_key_spec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_spec: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub encryption_algorithms: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signing_algorithms: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mac_algorithms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_region: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_deletion_window_in_days: Option<i32>,
}

impl KeyMetadataSnapshot {
    pub fn key_manager(&self) -> KeyManager {
        KeyManager::parse(self.key_manager.as_deref())
    }
}

/// Everything collected about one customer-managed key
#[derive(Debug, Clone, PartialEq)]
pub struct KeyRecord {
    pub key_id: String,
    pub arn: String,
    pub description: Option<String>,
    pub key_usage: KeyUsage,
    pub key_state: KeyState,
    pub key_manager: KeyManager,
    pub multi_region: Option<bool>,
    pub customer_master_key_spec: Option<String>,
    pub rotation_enabled: bool,
    pub policy: Value,
    pub tags: Vec<Tag>,
    /// Alias names (with the `alias/` prefix), in API order, deduplicated
    pub aliases: Vec<String>,
    pub metadata: KeyMetadataSnapshot,
}

impl KeyRecord {
    /// Assemble a record from the describe-key snapshot and the per-key lookups
    pub fn from_parts(
        metadata: KeyMetadataSnapshot,
        aliases: Vec<String>,
        policy: Value,
        tags: Vec<Tag>,
        rotation_enabled: bool,
    ) -> Self {
        let mut unique_aliases: Vec<String> = Vec::with_capacity(aliases.len());
        for alias in aliases {
            if !unique_aliases.contains(&alias) {
                unique_aliases.push(alias);
            }
        }

        Self {
            key_id: metadata.key_id.clone(),
            arn: metadata.arn.clone().unwrap_or_default(),
            description: metadata
                .description
                .clone()
                .filter(|description| !description.is_empty()),
            key_usage: KeyUsage::parse(metadata.key_usage.as_deref()),
            key_state: KeyState::parse(metadata.key_state.as_deref().unwrap_or("Enabled")),
            key_manager: metadata.key_manager(),
            multi_region: metadata.multi_region,
            customer_master_key_spec: metadata.customer_master_key_spec.clone(),
            rotation_enabled,
            policy,
            tags,
            aliases: unique_aliases,
            metadata,
        }
    }

    /// Key spec worth pinning in configuration (symmetric default is implied)
    pub fn asymmetric_key_spec(&self) -> Option<&str> {
        self.customer_master_key_spec
            .as_deref()
            .filter(|spec| *spec != "SYMMETRIC_DEFAULT")
    }
}

/// Result of one inventory pass
#[derive(Debug, Default)]
pub struct Inventory {
    /// Customer-managed keys, in listing order
    pub records: Vec<KeyRecord>,
    /// Number of key IDs returned by the listing
    pub discovered: usize,
    /// Keys excluded because AWS manages them
    pub provider_managed: usize,
    /// Keys skipped because a mandatory lookup failed, with the reason
    pub skipped: Vec<(String, String)>,
    /// Optional fields that fell back to defaults
    pub degraded: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> KeyMetadataSnapshot {
        KeyMetadataSnapshot {
            aws_account_id: Some("111122223333".to_string()),
            key_id: "1234abcd-12ab-34cd-56ef-1234567890ab".to_string(),
            arn: Some(
                "arn:aws:kms:us-east-1:111122223333:key/1234abcd-12ab-34cd-56ef-1234567890ab"
                    .to_string(),
            ),
            creation_date: Some("2024-03-01T12:00:00+00:00".to_string()),
            enabled: true,
            description: Some(String::new()),
            key_usage: None,
            key_state: Some("Disabled".to_string()),
            key_manager: Some("CUSTOMER".to_string()),
            customer_master_key_spec: Some("SYMMETRIC_DEFAULT".to_string()),
            encryption_algorithms: vec!["SYMMETRIC_DEFAULT".to_string()],
            ..Default::default()
        }
    }

    #[test]
    fn test_key_usage_defaults_to_encrypt_decrypt() {
        assert_eq!(KeyUsage::parse(None), KeyUsage::EncryptDecrypt);
        assert_eq!(KeyUsage::parse(Some("SIGN_VERIFY")), KeyUsage::SignVerify);
        assert_eq!(KeyUsage::parse(Some("NEW_USAGE")).as_str(), "NEW_USAGE");
    }

    #[test]
    fn test_key_manager_parse() {
        assert_eq!(KeyManager::parse(Some("AWS")), KeyManager::Aws);
        assert_eq!(KeyManager::parse(Some("CUSTOMER")), KeyManager::Customer);
        assert_eq!(KeyManager::parse(None), KeyManager::Customer);
    }

    #[test]
    fn test_record_from_parts() {
        let record = KeyRecord::from_parts(
            snapshot(),
            vec!["alias/app".to_string(), "alias/app".to_string(), "alias/db".to_string()],
            json!({"Version": "2012-10-17"}),
            vec![Tag::new("Environment", "Production")],
            true,
        );

        assert_eq!(record.key_id, "1234abcd-12ab-34cd-56ef-1234567890ab");
        assert_eq!(record.description, None);
        assert_eq!(record.key_usage, KeyUsage::EncryptDecrypt);
        assert_eq!(record.key_state, KeyState::Disabled);
        assert!(!record.key_state.is_enabled());
        assert_eq!(record.aliases, vec!["alias/app", "alias/db"]);
        assert_eq!(record.asymmetric_key_spec(), None);
        assert!(record.rotation_enabled);
    }

    #[test]
    fn test_snapshot_serializes_with_api_field_names() {
        let value = serde_json::to_value(snapshot()).unwrap();

        assert_eq!(value["AWSAccountId"], "111122223333");
        assert_eq!(value["KeyId"], "1234abcd-12ab-34cd-56ef-1234567890ab");
        assert_eq!(value["CreationDate"], "2024-03-01T12:00:00+00:00");
        assert_eq!(value["EncryptionAlgorithms"], json!(["SYMMETRIC_DEFAULT"]));
        assert!(value.get("SigningAlgorithms").is_none());
        assert!(value.get("MultiRegion").is_none());
    }
}
