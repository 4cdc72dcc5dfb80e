//! Terraform configuration generator
//!
//! Renders the collected key records into Terraform files, an import script
//! and one JSON dump per key. Each key contributes fragments that are
//! collected in order and joined once at the end.

use std::path::PathBuf;

use anyhow::{Context, Result};
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::discovery::{KeyMetadataSnapshot, KeyRecord};
use super::resource_mapper::{
    ALIAS_RESOURCE_TYPE, AWS_PROVIDER, KEY_RESOURCE_TYPE, ResourceNames, alias_resource_name,
    alias_short_name, hcl_string, heredoc_literal, key_resource_name, region_from_arn,
};
use super::templates;

/// Deletion window written for every key; DescribeKey does not report one
pub const DELETION_WINDOW_DAYS: u32 = 30;
/// Description used when a key has none
pub const DEFAULT_DESCRIPTION: &str = "Imported KMS Key";
/// Name of the generated import script
pub const IMPORT_SCRIPT: &str = "import-keys.sh";
/// Directory of the generated KMS module, relative to the output root
pub const MODULE_DIR: &str = "modules/kms";

/// How generated resources are organized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// `aws_kms_key` / `aws_kms_alias` resources directly in `main.tf`
    #[default]
    Flat,
    /// A reusable module under `modules/kms`, instantiated once per key
    Module,
}

impl Layout {
    /// Output directory used when none is configured
    pub fn default_output_dir(&self) -> &'static str {
        match self {
            Layout::Flat => "terraform-kms",
            Layout::Module => "terraform-kms-import",
        }
    }
}

/// Where the provider block's region comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RegionSource {
    /// The region the API session was resolved for
    #[default]
    Session,
    /// The region segment of the first collected key's ARN
    FirstKeyArn,
}

/// Pick the region written into the provider configuration
pub fn resolve_provider_region(
    source: RegionSource,
    session_region: &str,
    records: &[KeyRecord],
) -> String {
    match source {
        RegionSource::Session => session_region.to_string(),
        RegionSource::FirstKeyArn => records
            .first()
            .and_then(|record| region_from_arn(&record.arn))
            .unwrap_or_else(|| session_region.to_string()),
    }
}

/// Generator settings
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub layout: Layout,
    pub provider_region: String,
}

/// One file to be written, relative to the output directory
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedArtifact {
    pub path: PathBuf,
    pub contents: String,
    pub executable: bool,
}

impl RenderedArtifact {
    fn file(path: impl Into<PathBuf>, contents: String) -> Self {
        Self {
            path: path.into(),
            contents,
            executable: false,
        }
    }
}

/// What one key adds to the shared files
#[derive(Debug, Default)]
struct KeyFragments {
    config: String,
    outputs: String,
    imports: Vec<String>,
}

#[derive(Serialize)]
struct TagView {
    key: String,
    value: String,
}

#[derive(Serialize)]
struct KeyView<'a> {
    name: &'a str,
    key_id: &'a str,
    description: String,
    deletion_window: u32,
    key_usage: &'a str,
    rotation_enabled: bool,
    is_enabled: bool,
    disabled: bool,
    has_multi_region: bool,
    multi_region: bool,
    key_spec: Option<&'a str>,
    tags: Vec<TagView>,
    aliases: Vec<String>,
    policy: String,
}

#[derive(Serialize)]
struct AliasView<'a> {
    name: String,
    alias: String,
    key_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeKeyDump<'a> {
    key_metadata: &'a KeyMetadataSnapshot,
}

/// Pretty-printed policy, safe to embed in a heredoc
pub fn policy_heredoc(policy: &Value) -> Result<String> {
    let pretty = serde_json::to_string_pretty(policy).context("Failed to serialize key policy")?;
    Ok(heredoc_literal(&pretty))
}

/// DescribeKey-shaped JSON document for one key
pub fn metadata_dump(record: &KeyRecord) -> Result<String> {
    let mut dump = serde_json::to_string_pretty(&DescribeKeyDump {
        key_metadata: &record.metadata,
    })
    .with_context(|| format!("Failed to serialize metadata for key {}", record.key_id))?;
    dump.push('\n');
    Ok(dump)
}

/// Renders Terraform files for a set of key records
pub struct ConfigGenerator {
    handlebars: Handlebars<'static>,
    config: GeneratorConfig,
}

impl ConfigGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);

        for (name, template) in [
            ("provider_literal", templates::PROVIDER_LITERAL),
            ("key_resource", templates::KEY_RESOURCE),
            ("alias_resource", templates::ALIAS_RESOURCE),
            ("key_outputs", templates::KEY_OUTPUTS),
            ("module_instance", templates::MODULE_INSTANCE),
            ("module_outputs", templates::MODULE_OUTPUTS),
            ("root_variables", templates::ROOT_VARIABLES),
            ("terraform_settings", templates::TERRAFORM_SETTINGS),
        ] {
            handlebars
                .register_template_string(name, template)
                .with_context(|| format!("Failed to register template '{}'", name))?;
        }

        Ok(Self { handlebars, config })
    }

    /// Render every artifact for `records`, in collection order
    ///
    /// Fails without rendering anything if two resources would share an address.
    pub fn generate(&self, records: &[KeyRecord]) -> Result<Vec<RenderedArtifact>> {
        self.claim_names(records)?;

        let mut config_fragments = Vec::with_capacity(records.len());
        let mut output_fragments = Vec::with_capacity(records.len());
        let mut import_blocks = Vec::with_capacity(records.len());

        for record in records {
            let fragments = self.render_key(record)?;
            config_fragments.push(fragments.config);
            output_fragments.push(fragments.outputs);
            import_blocks.push(fragments.imports.join("\n"));
        }

        let mut artifacts = Vec::new();
        match self.config.layout {
            Layout::Flat => {
                let header = self.render(
                    "provider_literal",
                    &serde_json::json!({ "region": hcl_string(&self.config.provider_region) }),
                )?;
                artifacts.push(RenderedArtifact::file(
                    "main.tf",
                    header + &config_fragments.concat(),
                ));
                artifacts.push(RenderedArtifact::file("outputs.tf", output_fragments.concat()));
            }
            Layout::Module => {
                artifacts.push(RenderedArtifact::file(
                    "terraform.tf",
                    self.render(
                        "terraform_settings",
                        &serde_json::json!({
                            "tf_name": AWS_PROVIDER.tf_name,
                            "source": AWS_PROVIDER.source,
                            "version": AWS_PROVIDER.default_version,
                        }),
                    )?,
                ));
                artifacts.push(RenderedArtifact::file(
                    "providers.tf",
                    templates::PROVIDER_VARIABLE.to_string(),
                ));
                artifacts.push(RenderedArtifact::file(
                    "variables.tf",
                    self.render(
                        "root_variables",
                        &serde_json::json!({ "region": hcl_string(&self.config.provider_region) }),
                    )?,
                ));
                artifacts.push(RenderedArtifact::file("main.tf", config_fragments.concat()));
                artifacts.push(RenderedArtifact::file("outputs.tf", output_fragments.concat()));
                artifacts.push(RenderedArtifact::file(
                    format!("{}/main.tf", MODULE_DIR),
                    templates::MODULE_MAIN.to_string(),
                ));
                artifacts.push(RenderedArtifact::file(
                    format!("{}/variables.tf", MODULE_DIR),
                    templates::MODULE_VARIABLES.to_string(),
                ));
                artifacts.push(RenderedArtifact::file(
                    format!("{}/outputs.tf", MODULE_DIR),
                    templates::MODULE_OUTPUTS_FILE.to_string(),
                ));
            }
        }

        artifacts.push(RenderedArtifact {
            path: PathBuf::from(IMPORT_SCRIPT),
            contents: import_script(&import_blocks),
            executable: true,
        });

        for record in records {
            artifacts.push(RenderedArtifact::file(
                format!("{}.json", record.key_id),
                metadata_dump(record)?,
            ));
        }

        Ok(artifacts)
    }

    fn claim_names(&self, records: &[KeyRecord]) -> Result<()> {
        let mut names = ResourceNames::new();

        for record in records {
            let name = key_resource_name(&record.key_id);
            match self.config.layout {
                Layout::Flat => {
                    names.claim(format!("{}.{}", KEY_RESOURCE_TYPE, name), &record.key_id)?;
                    for alias in &record.aliases {
                        names.claim(
                            format!("{}.{}", ALIAS_RESOURCE_TYPE, alias_resource_name(alias)),
                            alias,
                        )?;
                    }
                }
                Layout::Module => {
                    names.claim(format!("module.{}", name), &record.key_id)?;
                }
            }
        }

        Ok(())
    }

    fn render_key(&self, record: &KeyRecord) -> Result<KeyFragments> {
        let name = key_resource_name(&record.key_id);
        let view = key_view(&name, record)?;

        match self.config.layout {
            Layout::Flat => {
                let mut config = self.render("key_resource", &view)?;
                let mut imports = vec![format!(
                    "terraform import {}.{} {}",
                    KEY_RESOURCE_TYPE,
                    name,
                    import_id(record)
                )];

                for alias in &record.aliases {
                    let alias_name = alias_resource_name(alias);
                    config.push_str(&self.render(
                        "alias_resource",
                        &AliasView {
                            name: alias_name.clone(),
                            alias: hcl_string(alias),
                            key_name: &name,
                        },
                    )?);
                    imports.push(format!(
                        "terraform import {}.{} {}",
                        ALIAS_RESOURCE_TYPE, alias_name, alias
                    ));
                }

                Ok(KeyFragments {
                    config,
                    outputs: self.render("key_outputs", &view)?,
                    imports,
                })
            }
            Layout::Module => {
                let mut imports = vec![format!(
                    "terraform import module.{}.{}.this {}",
                    name, KEY_RESOURCE_TYPE, record.key_id
                )];
                for alias in &record.aliases {
                    imports.push(format!(
                        "terraform import 'module.{}.{}.this[\"{}\"]' {}",
                        name,
                        ALIAS_RESOURCE_TYPE,
                        alias_short_name(alias),
                        alias
                    ));
                }

                Ok(KeyFragments {
                    config: self.render("module_instance", &view)?,
                    outputs: self.render("module_outputs", &view)?,
                    imports,
                })
            }
        }
    }

    fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String> {
        self.handlebars
            .render(template, data)
            .with_context(|| format!("Failed to render template '{}'", template))
    }
}

fn key_view<'a>(name: &'a str, record: &'a KeyRecord) -> Result<KeyView<'a>> {
    Ok(KeyView {
        name,
        key_id: &record.key_id,
        description: hcl_string(record.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)),
        deletion_window: DELETION_WINDOW_DAYS,
        key_usage: record.key_usage.as_str(),
        rotation_enabled: record.rotation_enabled,
        is_enabled: record.key_state.is_enabled(),
        disabled: !record.key_state.is_enabled(),
        has_multi_region: record.multi_region.is_some(),
        multi_region: record.multi_region.unwrap_or(false),
        key_spec: record.asymmetric_key_spec(),
        tags: record
            .tags
            .iter()
            .map(|tag| TagView {
                key: hcl_string(&tag.key),
                value: hcl_string(&tag.value),
            })
            .collect(),
        aliases: record
            .aliases
            .iter()
            .map(|alias| hcl_string(alias_short_name(alias)))
            .collect(),
        policy: policy_heredoc(&record.policy)?,
    })
}

/// Identifier `terraform import` binds a flat key resource to
fn import_id(record: &KeyRecord) -> &str {
    if record.arn.is_empty() {
        &record.key_id
    } else {
        &record.arn
    }
}

fn import_script(blocks: &[String]) -> String {
    let mut script = String::from(
        "#!/bin/bash\n\
         # Imports existing KMS keys and aliases into Terraform state.\n\
         # Run from this directory after `terraform init`.\n\
         set -e\n",
    );

    for block in blocks {
        script.push('\n');
        script.push_str(block);
        script.push('\n');
    }

    script
}
