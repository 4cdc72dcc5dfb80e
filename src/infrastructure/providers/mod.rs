pub mod aws;
#[cfg(test)]
pub mod mock;

use anyhow::Result;

use crate::infrastructure::discovery::{KeyMetadataSnapshot, Tag};

pub use aws::AwsKmsApi;
#[cfg(test)]
pub use mock::{MockKmsApi, MockOperation};

/// One page of the key listing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyListPage {
    pub key_ids: Vec<String>,
    /// Continuation token; `None` once the listing is exhausted
    pub next_marker: Option<String>,
}

/// The KMS operations the inventory needs, scoped to one region and credential context
///
/// Implementations are blocking. Alias and tag listings are returned whole;
/// the key listing is exposed page by page so callers drive pagination.
pub trait KmsApi: Send + Sync {
    /// ListKeys, starting after `marker`
    fn list_keys_page(&self, marker: Option<&str>) -> Result<KeyListPage>;

    /// DescribeKey
    fn describe_key(&self, key_id: &str) -> Result<KeyMetadataSnapshot>;

    /// ListAliases filtered to one key, all pages
    fn list_aliases(&self, key_id: &str) -> Result<Vec<String>>;

    /// GetKeyPolicy for the `default` policy, as raw JSON text
    fn get_key_policy(&self, key_id: &str) -> Result<String>;

    /// ListResourceTags, all pages
    fn list_resource_tags(&self, key_id: &str) -> Result<Vec<Tag>>;

    /// GetKeyRotationStatus
    fn get_key_rotation_status(&self, key_id: &str) -> Result<bool>;
}
