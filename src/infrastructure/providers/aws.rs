use anyhow::{anyhow, Result};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_kms::Client as KmsClient;
use aws_sdk_kms::error::DisplayErrorContext;
use aws_sdk_kms::primitives::DateTime;
use aws_sdk_kms::types::KeyMetadata;
use chrono::Utc;
use tokio::runtime::Runtime;

use crate::infrastructure::discovery::{KeyMetadataSnapshot, Tag};
use crate::infrastructure::error::{ImportResult, KmsImportError};
use crate::infrastructure::providers::{KeyListPage, KmsApi};
use crate::infrastructure::session::{CredentialSource, SessionPlan};

const CREDENTIALS_PROVIDER_NAME: &str = "kms-tf-import";

/// KMS access through the AWS SDK
///
/// The SDK is async; this adapter owns a current-thread runtime and blocks
/// on each call so the pipeline stays sequential.
/// Credentials come from one of:
/// - Environment variables (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY)
/// - A named profile in ~/.aws/config and ~/.aws/credentials
/// - Keys entered interactively
pub struct AwsKmsApi {
    client: KmsClient,
    runtime: Runtime,
    region: String,
}

impl AwsKmsApi {
    /// Build a client for the session and verify credentials can be resolved
    ///
    /// Makes no KMS calls.
    pub fn connect(plan: &SessionPlan) -> ImportResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let config = runtime.block_on(load_sdk_config(plan));

        let region = config
            .region()
            .map(|region| region.as_ref().to_string())
            .ok_or_else(|| {
                KmsImportError::AuthResolution(
                    "no region configured; pass --region or set AWS_REGION".to_string(),
                )
            })?;

        let provider = config.credentials_provider().ok_or_else(|| {
            KmsImportError::AuthResolution("no credentials provider available".to_string())
        })?;

        runtime
            .block_on(provider.provide_credentials())
            .map_err(|err| {
                KmsImportError::AuthResolution(DisplayErrorContext(&err).to_string())
            })?;

        Ok(Self {
            client: KmsClient::new(&config),
            runtime,
            region,
        })
    }

    /// Region the client is scoped to
    pub fn region(&self) -> &str {
        &self.region
    }
}

async fn load_sdk_config(plan: &SessionPlan) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &plan.region {
        loader = loader.region(Region::new(region.clone()));
    }

    match &plan.source {
        CredentialSource::Ambient => {}
        CredentialSource::Profile(name) => {
            loader = loader.profile_name(name);
        }
        CredentialSource::Static(keys) => {
            loader = loader.credentials_provider(Credentials::new(
                keys.access_key_id.clone(),
                keys.secret_access_key.clone(),
                keys.session_token.clone(),
                None,
                CREDENTIALS_PROVIDER_NAME,
            ));
        }
    }

    loader.load().await
}

fn api_error<E: std::error::Error>(operation: &str, err: &E) -> anyhow::Error {
    anyhow!("{}: {}", operation, DisplayErrorContext(err))
}

fn iso8601(value: &DateTime) -> String {
    chrono::DateTime::<Utc>::from_timestamp(value.secs(), value.subsec_nanos())
        .map(|timestamp| timestamp.to_rfc3339())
        .unwrap_or_else(|| value.secs().to_string())
}

#[allow(deprecated)]
fn snapshot_from(metadata: &KeyMetadata) -> KeyMetadataSnapshot {
    KeyMetadataSnapshot {
        aws_account_id: metadata.aws_account_id().map(str::to_string),
        key_id: metadata.key_id().to_string(),
        arn: metadata.arn().map(str::to_string),
        creation_date: metadata.creation_date().map(iso8601),
        enabled: metadata.enabled(),
        description: metadata.description().map(str::to_string),
        key_usage: metadata.key_usage().map(|v| v.as_str().to_string()),
        key_state: metadata.key_state().map(|v| v.as_str().to_string()),
        deletion_date: metadata.deletion_date().map(iso8601),
        valid_to: metadata.valid_to().map(iso8601),
        origin: metadata.origin().map(|v| v.as_str().to_string()),
        custom_key_store_id: metadata.custom_key_store_id().map(str::to_string),
        expiration_model: metadata.expiration_model().map(|v| v.as_str().to_string()),
        key_manager: metadata.key_manager().map(|v| v.as_str().to_string()),
        customer_master_key_spec: metadata
            .customer_master_key_spec()
            .map(|v| v.as_str().to_string()),
        key_spec: metadata.key_spec().map(|v| v.as_str().to_string()),
        encryption_algorithms: metadata
            .encryption_algorithms()
            .iter()
            .map(|v| v.as_str().to_string())
            .collect(),
        signing_algorithms: metadata
            .signing_algorithms()
            .iter()
            .map(|v| v.as_str().to_string())
            .collect(),
        mac_algorithms: metadata
            .mac_algorithms()
            .iter()
            .map(|v| v.as_str().to_string())
            .collect(),
        multi_region: metadata.multi_region(),
        pending_deletion_window_in_days: metadata.pending_deletion_window_in_days(),
    }
}

impl KmsApi for AwsKmsApi {
    fn list_keys_page(&self, marker: Option<&str>) -> Result<KeyListPage> {
        let response = self
            .runtime
            .block_on(
                self.client
                    .list_keys()
                    .set_marker(marker.map(str::to_string))
                    .send(),
            )
            .map_err(|err| api_error("ListKeys", &err))?;

        let key_ids = response
            .keys()
            .iter()
            .filter_map(|entry| entry.key_id().map(str::to_string))
            .collect();

        let next_marker = if response.truncated() {
            response.next_marker().map(str::to_string)
        } else {
            None
        };

        Ok(KeyListPage {
            key_ids,
            next_marker,
        })
    }

    fn describe_key(&self, key_id: &str) -> Result<KeyMetadataSnapshot> {
        let response = self
            .runtime
            .block_on(self.client.describe_key().key_id(key_id).send())
            .map_err(|err| api_error("DescribeKey", &err))?;

        response
            .key_metadata()
            .map(snapshot_from)
            .ok_or_else(|| anyhow!("DescribeKey returned no metadata for {}", key_id))
    }

    fn list_aliases(&self, key_id: &str) -> Result<Vec<String>> {
        let mut aliases = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = self
                .runtime
                .block_on(
                    self.client
                        .list_aliases()
                        .key_id(key_id)
                        .set_marker(marker.take())
                        .send(),
                )
                .map_err(|err| api_error("ListAliases", &err))?;

            aliases.extend(
                response
                    .aliases()
                    .iter()
                    .filter_map(|alias| alias.alias_name().map(str::to_string)),
            );

            match response.next_marker() {
                Some(next) if response.truncated() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(aliases)
    }

    fn get_key_policy(&self, key_id: &str) -> Result<String> {
        let response = self
            .runtime
            .block_on(
                self.client
                    .get_key_policy()
                    .key_id(key_id)
                    .policy_name("default")
                    .send(),
            )
            .map_err(|err| api_error("GetKeyPolicy", &err))?;

        response
            .policy()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("GetKeyPolicy returned no policy for {}", key_id))
    }

    fn list_resource_tags(&self, key_id: &str) -> Result<Vec<Tag>> {
        let mut tags = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = self
                .runtime
                .block_on(
                    self.client
                        .list_resource_tags()
                        .key_id(key_id)
                        .set_marker(marker.take())
                        .send(),
                )
                .map_err(|err| api_error("ListResourceTags", &err))?;

            tags.extend(
                response
                    .tags()
                    .iter()
                    .map(|tag| Tag::new(tag.tag_key(), tag.tag_value())),
            );

            match response.next_marker() {
                Some(next) if response.truncated() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(tags)
    }

    fn get_key_rotation_status(&self, key_id: &str) -> Result<bool> {
        let response = self
            .runtime
            .block_on(self.client.get_key_rotation_status().key_id(key_id).send())
            .map_err(|err| api_error("GetKeyRotationStatus", &err))?;

        Ok(response.key_rotation_enabled())
    }
}

/// Regions offered when the region is prompted for
pub fn known_regions() -> Vec<String> {
    [
        "us-east-1",
        "us-east-2",
        "us-west-1",
        "us-west-2",
        "ca-central-1",
        "eu-west-1",
        "eu-west-2",
        "eu-west-3",
        "eu-central-1",
        "eu-north-1",
        "ap-northeast-1",
        "ap-northeast-2",
        "ap-southeast-1",
        "ap-southeast-2",
        "ap-south-1",
        "sa-east-1",
    ]
    .iter()
    .map(|region| region.to_string())
    .collect()
}
