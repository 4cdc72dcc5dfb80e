//! Test helpers for building KMS key fixtures
//!
//! Keys are built with sensible defaults (customer-managed, enabled,
//! symmetric) and tweaked per test.

#![cfg(test)]

use crate::infrastructure::discovery::{KeyMetadataSnapshot, KeyRecord, Tag};
use crate::infrastructure::providers::mock::MockKey;
use serde_json::{Value, json};

pub const TEST_ACCOUNT: &str = "111122223333";
pub const TEST_REGION: &str = "us-east-1";

/// Default key policy granting the account root full access
pub fn default_policy() -> Value {
    json!({
        "Version": "2012-10-17",
        "Id": "key-default-1",
        "Statement": [
            {
                "Sid": "Enable IAM User Permissions",
                "Effect": "Allow",
                "Principal": { "AWS": format!("arn:aws:iam::{}:root", TEST_ACCOUNT) },
                "Action": "kms:*",
                "Resource": "*"
            }
        ]
    })
}

/// Builder for a KMS key as returned by the API
pub struct KeyFixture {
    metadata: KeyMetadataSnapshot,
    aliases: Vec<String>,
    policy: String,
    tags: Vec<Tag>,
    rotation_enabled: bool,
}

impl KeyFixture {
    /// Create a customer-managed, enabled, symmetric key
    pub fn new(key_id: impl Into<String>) -> Self {
        let key_id = key_id.into();
        let metadata = KeyMetadataSnapshot {
            aws_account_id: Some(TEST_ACCOUNT.to_string()),
            arn: Some(format!(
                "arn:aws:kms:{}:{}:key/{}",
                TEST_REGION, TEST_ACCOUNT, key_id
            )),
            key_id,
            creation_date: Some("2024-03-01T12:00:00+00:00".to_string()),
            enabled: true,
            description: Some("Test key".to_string()),
            key_usage: Some("ENCRYPT_DECRYPT".to_string()),
            key_state: Some("Enabled".to_string()),
            origin: Some("AWS_KMS".to_string()),
            key_manager: Some("CUSTOMER".to_string()),
            customer_master_key_spec: Some("SYMMETRIC_DEFAULT".to_string()),
            key_spec: Some("SYMMETRIC_DEFAULT".to_string()),
            encryption_algorithms: vec!["SYMMETRIC_DEFAULT".to_string()],
            multi_region: Some(false),
            ..Default::default()
        };

        Self {
            metadata,
            aliases: Vec::new(),
            policy: default_policy().to_string(),
            tags: Vec::new(),
            rotation_enabled: false,
        }
    }

    /// Mark the key as AWS-managed
    pub fn aws_managed(mut self) -> Self {
        self.metadata.key_manager = Some("AWS".to_string());
        self.metadata.description =
            Some("Default key that protects my S3 objects when no other key is defined".to_string());
        self
    }

    pub fn description(mut self, description: Option<&str>) -> Self {
        self.metadata.description = description.map(str::to_string);
        self
    }

    pub fn state(mut self, state: &str) -> Self {
        self.metadata.enabled = state == "Enabled";
        self.metadata.key_state = Some(state.to_string());
        self
    }

    pub fn key_usage(mut self, usage: &str) -> Self {
        self.metadata.key_usage = Some(usage.to_string());
        self
    }

    pub fn key_spec(mut self, spec: &str) -> Self {
        self.metadata.customer_master_key_spec = Some(spec.to_string());
        self.metadata.key_spec = Some(spec.to_string());
        self
    }

    pub fn multi_region(mut self, multi_region: Option<bool>) -> Self {
        self.metadata.multi_region = multi_region;
        self
    }

    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    pub fn tag(mut self, key: &str, value: &str) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    pub fn rotation(mut self, enabled: bool) -> Self {
        self.rotation_enabled = enabled;
        self
    }

    pub fn policy(mut self, policy: Value) -> Self {
        self.policy = policy.to_string();
        self
    }

    /// Raw policy text, for malformed-document tests
    pub fn raw_policy(mut self, policy: &str) -> Self {
        self.policy = policy.to_string();
        self
    }

    /// Build the key as the mock API serves it
    pub fn mock(self) -> MockKey {
        MockKey {
            metadata: self.metadata,
            aliases: self.aliases,
            policy: self.policy,
            tags: self.tags,
            rotation_enabled: self.rotation_enabled,
        }
    }

    /// Build the record the collector would produce for this key
    pub fn record(self) -> KeyRecord {
        let policy = serde_json::from_str(&self.policy).unwrap_or(Value::Null);
        KeyRecord::from_parts(
            self.metadata,
            self.aliases,
            policy,
            self.tags,
            self.rotation_enabled,
        )
    }
}
