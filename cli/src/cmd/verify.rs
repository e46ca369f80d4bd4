use std::path::PathBuf;

use anyhow::bail;
use cverify_core::{
    action::{self, VerifyRequest},
    split::SplitState,
};

use super::{ArgTimestamp, GlobalArgs, SubcmdResult};
use crate::config;

#[derive(Debug, clap::Args)]
pub struct Args {
    /// Dependency graph and checks of every file (JSON)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Result of a previous run; files still fresh in it are not verified again
    #[arg(short, long)]
    pub prev_result: Option<PathBuf>,

    #[arg(short, long)]
    pub output: PathBuf,

    /// Whole-run budget in seconds; checks not started within it are skipped
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Time limit in seconds for checks without their own
    #[arg(long)]
    pub default_tle: Option<f64>,

    /// Memory limit in MiB for problems without their own
    #[arg(long)]
    pub default_mle: Option<u64>,

    #[arg(long, value_enum)]
    pub timestamp: Option<ArgTimestamp>,

    /// Number of parallel workers sharing the run
    #[arg(long, requires = "split_index")]
    pub split: Option<usize>,

    /// 0-based worker index
    #[arg(long, requires = "split")]
    pub split_index: Option<usize>,

    /// Use judge data already in the cache only
    #[arg(long)]
    pub no_download: bool,
}

pub async fn exec(args: &Args, global_args: &GlobalArgs) -> SubcmdResult {
    let mut cfg = config::load(global_args)?;
    config::override_timeout(&mut cfg, args.timeout)?;
    config::override_default_tle(&mut cfg, args.default_tle)?;
    if let Some(mle) = args.default_mle {
        cfg.verify.default_mle = Some(mle);
    }
    if let Some(t) = args.timestamp {
        cfg.verify.timestamp = t.into();
    }

    let split_state = args
        .split
        .zip(args.split_index)
        .map(|(size, index)| SplitState::new(size, index))
        .transpose()?;

    let req = VerifyRequest {
        input: args.input.clone(),
        prev_result: args.prev_result.clone(),
        output: args.output.clone(),
        split_state,
        download: !args.no_download,
    };
    let result = action::run_verification(&cfg, &req).await?;

    let num_failed = result.failed_files().count();
    if num_failed > 0 {
        bail!("{} of {} files failed", num_failed, result.files.len());
    }
    Ok(())
}
