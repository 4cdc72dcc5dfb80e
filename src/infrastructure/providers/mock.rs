use anyhow::{Result, anyhow};
use std::collections::HashSet;
use std::sync::Mutex;

use crate::infrastructure::discovery::{KeyMetadataSnapshot, Tag};
use crate::infrastructure::providers::{KeyListPage, KmsApi};

/// KMS operations a mock can be told to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    DescribeKey,
    ListAliases,
    GetKeyPolicy,
    ListResourceTags,
    GetKeyRotationStatus,
}

impl MockOperation {
    fn name(&self) -> &'static str {
        match self {
            MockOperation::DescribeKey => "DescribeKey",
            MockOperation::ListAliases => "ListAliases",
            MockOperation::GetKeyPolicy => "GetKeyPolicy",
            MockOperation::ListResourceTags => "ListResourceTags",
            MockOperation::GetKeyRotationStatus => "GetKeyRotationStatus",
        }
    }
}

/// A key as the mock account holds it
#[derive(Debug, Clone)]
pub struct MockKey {
    pub metadata: KeyMetadataSnapshot,
    pub aliases: Vec<String>,
    pub policy: String,
    pub tags: Vec<Tag>,
    pub rotation_enabled: bool,
}

/// In-memory KMS account for tests
pub struct MockKmsApi {
    keys: Vec<MockKey>,
    page_size: usize,
    fail_listing: bool,
    failures: HashSet<(String, MockOperation)>,
    calls: Mutex<Vec<String>>,
}

impl MockKmsApi {
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            page_size: 100,
            fail_listing: false,
            failures: HashSet::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_key(mut self, key: MockKey) -> Self {
        self.keys.push(key);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Make ListKeys fail
    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Make `operation` fail for `key_id`
    pub fn failing(mut self, key_id: &str, operation: MockOperation) -> Self {
        self.failures.insert((key_id.to_string(), operation));
        self
    }

    /// Calls made so far, as `Operation` or `Operation:key_id`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn lookup(&self, key_id: &str, operation: MockOperation) -> Result<&MockKey> {
        self.record(format!("{}:{}", operation.name(), key_id));

        if self.failures.contains(&(key_id.to_string(), operation)) {
            return Err(anyhow!(
                "{}: AccessDeniedException: simulated failure for {}",
                operation.name(),
                key_id
            ));
        }

        self.keys
            .iter()
            .find(|key| key.metadata.key_id == key_id)
            .ok_or_else(|| anyhow!("{}: NotFoundException: {}", operation.name(), key_id))
    }
}

impl Default for MockKmsApi {
    fn default() -> Self {
        Self::new()
    }
}

impl KmsApi for MockKmsApi {
    fn list_keys_page(&self, marker: Option<&str>) -> Result<KeyListPage> {
        self.record(format!("ListKeys:{}", marker.unwrap_or("")));

        if self.fail_listing {
            return Err(anyhow!("ListKeys: AccessDeniedException: simulated failure"));
        }

        let start = match marker {
            Some(marker) => marker
                .parse::<usize>()
                .map_err(|_| anyhow!("ListKeys: InvalidMarkerException: {}", marker))?,
            None => 0,
        };
        let end = (start + self.page_size).min(self.keys.len());

        let key_ids = self.keys[start.min(end)..end]
            .iter()
            .map(|key| key.metadata.key_id.clone())
            .collect();
        let next_marker = (end < self.keys.len()).then(|| end.to_string());

        Ok(KeyListPage {
            key_ids,
            next_marker,
        })
    }

    fn describe_key(&self, key_id: &str) -> Result<KeyMetadataSnapshot> {
        Ok(self.lookup(key_id, MockOperation::DescribeKey)?.metadata.clone())
    }

    fn list_aliases(&self, key_id: &str) -> Result<Vec<String>> {
        Ok(self.lookup(key_id, MockOperation::ListAliases)?.aliases.clone())
    }

    fn get_key_policy(&self, key_id: &str) -> Result<String> {
        Ok(self.lookup(key_id, MockOperation::GetKeyPolicy)?.policy.clone())
    }

    fn list_resource_tags(&self, key_id: &str) -> Result<Vec<Tag>> {
        Ok(self.lookup(key_id, MockOperation::ListResourceTags)?.tags.clone())
    }

    fn get_key_rotation_status(&self, key_id: &str) -> Result<bool> {
        Ok(self
            .lookup(key_id, MockOperation::GetKeyRotationStatus)?
            .rotation_enabled)
    }
}
