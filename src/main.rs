mod commands;
mod config;
mod context;
mod infrastructure;
mod output;
#[cfg(test)]
mod test_helpers;
mod traits;

use anyhow::Result;
use clap::Parser;
use commands::{ImportArgs, ImportKeysCommand};
use context::Context;

#[derive(Parser)]
#[command(name = "kms-tf-import")]
#[command(about = "Inventory customer managed AWS KMS keys and generate Terraform to import them", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    args: ImportArgs,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = Context::new();

    ImportKeysCommand::execute(&ctx, &cli.args)
}
