//! KMS Key Import Module
//!
//! Inventories the customer managed KMS keys of one AWS account and region
//! and generates the Terraform needed to take them under management:
//!
//! - Resolving credentials (environment, named profile or interactive entry)
//! - Paging through the key listing and enriching each key with its
//!   aliases, policy, tags and rotation status
//! - Rendering `aws_kms_key` / `aws_kms_alias` configuration, either flat or
//!   through a local module
//! - Writing an executable `import-keys.sh` with one `terraform import` per
//!   resource, plus a JSON dump of each key's metadata
//!
//! # Terraform Import Workflow
//!
//! 1. Run the tool to generate the configuration directory
//! 2. `terraform init`
//! 3. `./import-keys.sh` to bind the existing keys to the generated addresses
//! 4. `terraform plan` should report no changes

pub mod collector;
pub mod config_generator;
pub mod discovery;
pub mod error;
pub mod providers;
pub mod resource_mapper;
pub mod session;
pub mod templates;
pub mod workflow;
pub mod writer;
