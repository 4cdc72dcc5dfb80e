use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::config::{Overrides, RunConfig};
use crate::context::Context;
use crate::infrastructure::config_generator::RegionSource;
use crate::infrastructure::providers::AwsKmsApi;
use crate::infrastructure::session::SessionResolver;
use crate::infrastructure::workflow::ImportWorkflow;

/// Inventory customer managed KMS keys and generate Terraform to import them
#[derive(Debug, Args)]
pub struct ImportArgs {
    /// AWS region to inventory (defaults to the profile or environment region)
    #[arg(short, long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Named AWS profile from the shared config files
    #[arg(short, long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Prompt for access keys instead of using the environment or a profile
    #[arg(short, long)]
    pub interactive: bool,

    /// Directory to write the generated files to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Generate a reusable module instantiated once per key
    #[arg(short, long)]
    pub module: bool,

    /// Where the provider block's region comes from
    #[arg(long, value_enum)]
    pub region_source: Option<RegionSource>,

    /// YAML run configuration; flags take precedence over its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// List the files that would be generated without writing them
    #[arg(long)]
    pub dry_run: bool,
}

impl ImportArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            region: self.region.clone(),
            profile: self.profile.clone(),
            interactive: self.interactive,
            output_dir: self.output_dir.clone(),
            module: self.module,
            region_source: self.region_source,
            dry_run: self.dry_run,
        }
    }
}

pub struct ImportKeysCommand;

impl ImportKeysCommand {
    /// Execute the import command
    pub fn execute(ctx: &Context, args: &ImportArgs) -> Result<()> {
        let file = match &args.config {
            Some(path) => RunConfig::load(ctx.fs.as_ref(), path)?,
            None => RunConfig::default(),
        };
        let settings = file.merge(args.overrides())?;

        let plan = SessionResolver::new(ctx.input.as_ref(), ctx.output.as_ref())
            .resolve(&settings.session)?;
        let api = AwsKmsApi::connect(&plan)?;

        ImportWorkflow::new(ctx, &settings.options).run(&api, api.region())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::error::KmsImportError;
    use crate::traits::{MockFileSystem, MockOutput, MockResponse, MockUserInput};
    use clap::Parser;
    use std::sync::Arc;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ImportArgs,
    }

    fn parse(argv: &[&str]) -> ImportArgs {
        TestCli::try_parse_from(std::iter::once("kms-tf-import").chain(argv.iter().copied()))
            .unwrap()
            .args
    }

    #[test]
    fn test_parse_flags() {
        let args = parse(&[
            "--region",
            "eu-west-1",
            "--module",
            "--output-dir",
            "out",
            "--region-source",
            "first-key-arn",
            "--dry-run",
        ]);

        assert_eq!(args.region.as_deref(), Some("eu-west-1"));
        assert!(args.module);
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.region_source, Some(RegionSource::FirstKeyArn));
        assert!(args.dry_run);
    }

    #[test]
    fn test_invalid_region_source_is_rejected() {
        let result = TestCli::try_parse_from(["kms-tf-import", "--region-source", "nowhere"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_file_fails_before_any_prompt() {
        let input = Arc::new(MockUserInput::new());
        let ctx = Context::test_with(
            Arc::new(MockFileSystem::new()),
            input.clone(),
            Arc::new(MockOutput::new()),
        );
        let args = parse(&["--config", "/does/not/exist.yaml"]);

        let err = ImportKeysCommand::execute(&ctx, &args).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<KmsImportError>(),
            Some(KmsImportError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_interactive_empty_secret_fails_credential_resolution() {
        let ctx = Context::test_with(
            Arc::new(MockFileSystem::new()),
            Arc::new(MockUserInput::with_responses(vec![
                MockResponse::Text("AKIAEXAMPLE".to_string()),
                MockResponse::Password(String::new()),
            ])),
            Arc::new(MockOutput::new()),
        );
        let args = parse(&["--interactive", "--region", "us-east-1"]);

        let err = ImportKeysCommand::execute(&ctx, &args).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<KmsImportError>(),
            Some(KmsImportError::AuthResolution(_))
        ));
    }
}
