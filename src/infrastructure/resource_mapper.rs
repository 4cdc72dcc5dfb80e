//! Resource Name Mapper
//!
//! Maps KMS identifiers (key IDs, alias names, ARNs) to Terraform resource
//! addresses and HCL literals.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use super::error::{ImportResult, KmsImportError};

lazy_static! {
    static ref NON_IDENTIFIER: Regex = Regex::new(r"[^A-Za-z0-9_]").unwrap();
    static ref KMS_ARN: Regex =
        Regex::new(r"^arn:[a-z0-9-]+:kms:([a-z0-9-]+):[0-9]*:(key|alias)/").unwrap();
}

/// Terraform resource type for KMS keys
pub const KEY_RESOURCE_TYPE: &str = "aws_kms_key";
/// Terraform resource type for KMS aliases
pub const ALIAS_RESOURCE_TYPE: &str = "aws_kms_alias";

/// Information about a Terraform provider for generating required_providers blocks
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    /// Provider source (e.g., "hashicorp/aws")
    pub source: &'static str,
    /// Default version constraint (e.g., "~> 5.0")
    pub default_version: &'static str,
    /// Terraform provider name for the provider block
    pub tf_name: &'static str,
}

/// The AWS provider every generated configuration targets
pub const AWS_PROVIDER: ProviderInfo = ProviderInfo {
    source: "hashicorp/aws",
    default_version: "~> 5.0",
    tf_name: "aws",
};

/// Replace every character that is not valid in an HCL identifier with `_`
pub fn sanitize_identifier(raw: &str) -> String {
    NON_IDENTIFIER.replace_all(raw, "_").into_owned()
}

/// Resource name for a key: `key_<key_id>` with invalid characters replaced
pub fn key_resource_name(key_id: &str) -> String {
    format!("key_{}", sanitize_identifier(key_id))
}

/// Resource name for an alias: `alias_<name without "alias/">` sanitized
pub fn alias_resource_name(alias_name: &str) -> String {
    format!("alias_{}", sanitize_identifier(alias_short_name(alias_name)))
}

/// Alias name without the `alias/` prefix
pub fn alias_short_name(alias_name: &str) -> &str {
    alias_name.strip_prefix("alias/").unwrap_or(alias_name)
}

/// Region segment of a KMS key or alias ARN
pub fn region_from_arn(arn: &str) -> Option<String> {
    KMS_ARN
        .captures(arn)
        .and_then(|captures| captures.get(1))
        .map(|region| region.as_str().to_string())
}

/// Escape a value for use inside a double-quoted HCL string
pub fn hcl_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                escaped.push(c);
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }

    escaped
}

/// Escape template sequences so heredoc content is taken literally
pub fn heredoc_literal(value: &str) -> String {
    value.replace("${", "$${").replace("%{", "%%{")
}

/// Registry of Terraform addresses already handed out in one generation pass
#[derive(Debug, Default)]
pub struct ResourceNames {
    claimed: HashMap<String, String>,
}

impl ResourceNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `address` for `source`; a second source mapping to the same address is an error
    pub fn claim(&mut self, address: String, source: &str) -> ImportResult<()> {
        match self.claimed.get(&address) {
            Some(first) if first != source => Err(KmsImportError::DuplicateResourceName {
                address,
                first: first.clone(),
                second: source.to_string(),
            }),
            Some(_) => Ok(()),
            None => {
                self.claimed.insert(address, source.to_string());
                Ok(())
            }
        }
    }
}
