use std::path::PathBuf;

use anyhow::Context as _;
use cverify_core::{action, models::VerificationInput, print_success};

use super::{GlobalArgs, SubcmdResult};
use crate::config;

#[derive(Debug, clap::Args)]
pub struct Args {
    #[arg(short, long)]
    pub input: PathBuf,
}

pub async fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let cfg = config::load(global_args)?;
    let input = VerificationInput::load(&args.input).context("Failed to load verification input")?;

    let downloader = action::new_downloader(&cfg);
    let n = action::download_all(&input, &downloader).await?;
    print_success!(
        "Judge data of {} problems ready in {}",
        n,
        cfg.judge.cache_dir.to_string_lossy()
    );
    Ok(())
}
