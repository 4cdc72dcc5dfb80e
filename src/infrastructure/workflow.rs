use std::path::PathBuf;

use anyhow::{Result, bail};

use crate::context::Context;
use crate::infrastructure::collector::KeyCollector;
use crate::infrastructure::config_generator::{
    ConfigGenerator, GeneratorConfig, IMPORT_SCRIPT, Layout, RegionSource,
    resolve_provider_region,
};
use crate::infrastructure::providers::KmsApi;
use crate::infrastructure::writer::ArtifactWriter;

/// Options for one inventory-and-generate run
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOptions {
    pub output_dir: PathBuf,
    pub layout: Layout,
    pub region_source: RegionSource,
    /// List the files that would be generated without writing them
    pub dry_run: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        let layout = Layout::default();
        Self {
            output_dir: PathBuf::from(layout.default_output_dir()),
            layout,
            region_source: RegionSource::default(),
            dry_run: false,
        }
    }
}

/// Counts reported at the end of a run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ImportSummary {
    pub discovered: usize,
    pub provider_managed: usize,
    pub generated: usize,
    pub skipped: usize,
    pub degraded: usize,
    pub files: Vec<PathBuf>,
}

/// Orchestrates inventory, generation and writing
pub struct ImportWorkflow<'a> {
    ctx: &'a Context,
    options: &'a ImportOptions,
}

impl<'a> ImportWorkflow<'a> {
    pub fn new(ctx: &'a Context, options: &'a ImportOptions) -> Self {
        Self { ctx, options }
    }

    /// Run the full pipeline against `api`, whose session targets `session_region`
    pub fn run(&self, api: &dyn KmsApi, session_region: &str) -> Result<ImportSummary> {
        let output = self.ctx.output.as_ref();

        output.section("KMS Key Inventory");
        output.key_value("Region", session_region);
        output.blank();

        let inventory = KeyCollector::new(api, output).collect()?;
        let mut summary = ImportSummary {
            discovered: inventory.discovered,
            provider_managed: inventory.provider_managed,
            generated: inventory.records.len(),
            skipped: inventory.skipped.len(),
            degraded: inventory.degraded.len(),
            files: Vec::new(),
        };

        if inventory.records.is_empty() {
            output.blank();
            output.info("No customer managed KMS keys found.");
            return Ok(summary);
        }

        let provider_region =
            resolve_provider_region(self.options.region_source, session_region, &inventory.records);
        if provider_region != session_region {
            output.info(&format!(
                "Provider region taken from key ARN: {}",
                provider_region
            ));
        }

        let generator = ConfigGenerator::new(GeneratorConfig {
            layout: self.options.layout,
            provider_region,
        })?;
        let artifacts = generator.generate(&inventory.records)?;

        if self.options.dry_run {
            output.subsection("Dry run: nothing will be written");
            for artifact in &artifacts {
                output.dimmed(&format!(
                    "  Would write {}",
                    self.options.output_dir.join(&artifact.path).display()
                ));
            }
            summary.files = artifacts
                .iter()
                .map(|artifact| self.options.output_dir.join(&artifact.path))
                .collect();
            self.print_summary(&summary);
            return Ok(summary);
        }

        output.section("Generating Terraform");
        let report = ArtifactWriter::new(self.ctx.fs.as_ref(), output)
            .write_all(&self.options.output_dir, &artifacts);
        summary.files = report.written.clone();

        self.print_summary(&summary);

        if !report.is_complete() {
            bail!(
                "{} of {} files could not be written to {}",
                report.failed.len(),
                artifacts.len(),
                self.options.output_dir.display()
            );
        }

        self.print_next_steps();
        Ok(summary)
    }

    fn print_summary(&self, summary: &ImportSummary) {
        let output = self.ctx.output.as_ref();

        output.section("Summary");
        output.key_value("Keys discovered", &summary.discovered.to_string());
        output.key_value("AWS managed (skipped)", &summary.provider_managed.to_string());
        output.key_value("Keys generated", &summary.generated.to_string());
        if summary.skipped > 0 {
            output.key_value("Keys skipped (errors)", &summary.skipped.to_string());
        }
        if summary.degraded > 0 {
            output.key_value("Fields defaulted", &summary.degraded.to_string());
        }
        output.key_value(
            "Output directory",
            &self.options.output_dir.display().to_string(),
        );
    }

    fn print_next_steps(&self) {
        let output = self.ctx.output.as_ref();

        output.section("Next Steps");
        output.info(&format!("cd {}", self.options.output_dir.display()));
        output.info("terraform init");
        output.info(&format!("./{}", IMPORT_SCRIPT));
        output.info("terraform plan");
        output.blank();
        output.dimmed("The plan should show no changes once every import has succeeded.");
    }
}
