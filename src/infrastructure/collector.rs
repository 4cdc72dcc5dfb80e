//! Key inventory
//!
//! Pages through the key listing and gathers everything needed to describe
//! each customer-managed key. Mandatory lookups (metadata, aliases, policy)
//! skip the key on failure; optional ones (tags, rotation) fall back to a
//! default and the run carries on.

use serde_json::Value;

use crate::infrastructure::discovery::{Inventory, KeyManager, KeyRecord};
use crate::infrastructure::error::{ImportResult, KmsImportError};
use crate::infrastructure::providers::KmsApi;
use crate::traits::Output;

/// An optional field value, plus the failure that forced a default (if any)
#[derive(Debug)]
pub struct Enrichment<T> {
    pub value: T,
    pub failure: Option<KmsImportError>,
}

/// Attempt an optional lookup; on failure use `default` and record why
pub fn attempt_optional<T>(
    key_id: &str,
    field: &str,
    fetch: impl FnOnce() -> anyhow::Result<T>,
    default: impl FnOnce() -> T,
) -> Enrichment<T> {
    match fetch() {
        Ok(value) => Enrichment {
            value,
            failure: None,
        },
        Err(err) => Enrichment {
            value: default(),
            failure: Some(KmsImportError::OptionalFetch {
                key_id: key_id.to_string(),
                field: field.to_string(),
                message: format!("{:#}", err),
            }),
        },
    }
}

/// What became of one listed key
#[derive(Debug)]
pub enum KeyOutcome {
    Retained {
        record: KeyRecord,
        degraded: Vec<KmsImportError>,
    },
    /// Managed by AWS; never imported
    ProviderManaged,
}

pub struct KeyCollector<'a> {
    api: &'a dyn KmsApi,
    output: &'a dyn Output,
}

impl<'a> KeyCollector<'a> {
    pub fn new(api: &'a dyn KmsApi, output: &'a dyn Output) -> Self {
        Self { api, output }
    }

    /// Every key ID in the region, in the order the API returns them
    pub fn list_key_ids(&self) -> ImportResult<Vec<String>> {
        let mut key_ids = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let page = self
                .api
                .list_keys_page(marker.as_deref())
                .map_err(|err| KmsImportError::FatalApi {
                    operation: "ListKeys".to_string(),
                    message: format!("{:#}", err),
                })?;

            key_ids.extend(page.key_ids);

            match page.next_marker {
                Some(next) if marker.as_deref() == Some(next.as_str()) => {
                    return Err(KmsImportError::FatalApi {
                        operation: "ListKeys".to_string(),
                        message: format!("pagination did not advance past marker {}", next),
                    });
                }
                Some(next) => marker = Some(next),
                None => break,
            }
        }

        Ok(key_ids)
    }

    /// Gather metadata, aliases, policy, tags and rotation status for one key
    pub fn describe_key(&self, key_id: &str) -> ImportResult<KeyOutcome> {
        let metadata = self
            .api
            .describe_key(key_id)
            .map_err(|err| transient(key_id, "DescribeKey", err))?;

        if metadata.key_manager() == KeyManager::Aws {
            return Ok(KeyOutcome::ProviderManaged);
        }

        let aliases = self
            .api
            .list_aliases(key_id)
            .map_err(|err| transient(key_id, "ListAliases", err))?;

        let policy_text = self
            .api
            .get_key_policy(key_id)
            .map_err(|err| transient(key_id, "GetKeyPolicy", err))?;
        let policy: Value =
            serde_json::from_str(&policy_text).map_err(|err| KmsImportError::TransientApi {
                key_id: key_id.to_string(),
                operation: "GetKeyPolicy".to_string(),
                message: format!("policy is not valid JSON: {}", err),
            })?;

        let tags = attempt_optional(
            key_id,
            "tags",
            || self.api.list_resource_tags(key_id),
            Vec::new,
        );
        let rotation = attempt_optional(
            key_id,
            "rotation status",
            || self.api.get_key_rotation_status(key_id),
            || false,
        );

        let degraded = [tags.failure, rotation.failure]
            .into_iter()
            .flatten()
            .collect();

        Ok(KeyOutcome::Retained {
            record: KeyRecord::from_parts(metadata, aliases, policy, tags.value, rotation.value),
            degraded,
        })
    }

    /// Run the whole inventory pass
    ///
    /// Only a failed listing is fatal; per-key problems are reported and skipped.
    pub fn collect(&self) -> ImportResult<Inventory> {
        let key_ids = self.list_key_ids()?;
        self.output
            .info(&format!("Discovered {} KMS keys", key_ids.len()));

        let mut inventory = Inventory {
            discovered: key_ids.len(),
            ..Default::default()
        };

        for key_id in &key_ids {
            match self.describe_key(key_id) {
                Ok(KeyOutcome::ProviderManaged) => {
                    inventory.provider_managed += 1;
                    self.output.dimmed(&format!(
                        "  Skipping {} managed key {}",
                        KeyManager::Aws,
                        key_id
                    ));
                }
                Ok(KeyOutcome::Retained { record, degraded }) => {
                    for failure in degraded {
                        self.output.warning(&failure.to_string());
                        inventory.degraded.push(failure.to_string());
                    }
                    if !record.key_state.is_enabled() {
                        self.output.dimmed(&format!(
                            "  Key {} is {}",
                            key_id,
                            record.key_state.as_str()
                        ));
                    }
                    inventory.records.push(record);
                }
                Err(err) => {
                    self.output
                        .warning(&format!("Skipping key {}: {}", key_id, err));
                    let scoped = err.key_id().unwrap_or(key_id).to_string();
                    inventory.skipped.push((scoped, err.to_string()));
                }
            }
        }

        Ok(inventory)
    }
}

fn transient(key_id: &str, operation: &str, err: anyhow::Error) -> KmsImportError {
    KmsImportError::TransientApi {
        key_id: key_id.to_string(),
        operation: operation.to_string(),
        message: format!("{:#}", err),
    }
}
