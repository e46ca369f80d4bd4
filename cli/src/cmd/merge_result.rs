use std::path::PathBuf;

use anyhow::Context as _;
use cverify_core::{action, print_success};

use super::{GlobalArgs, SubcmdResult};

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Results of split runs
    #[arg(required = true)]
    pub results: Vec<PathBuf>,

    #[arg(short, long)]
    pub output: PathBuf,
}

pub fn exec(args: &Args, _: &GlobalArgs) -> SubcmdResult {
    let merged = action::merge_results(&args.results)?;
    merged
        .save(&args.output)
        .context("Failed to save merged result")?;
    print_success!(
        "Merged {} results into {} ({} files)",
        args.results.len(),
        args.output.to_string_lossy(),
        merged.files.len()
    );
    Ok(())
}
