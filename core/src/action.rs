pub mod error {
    #[allow(unused_imports)]
    pub(crate) use anyhow::{anyhow, bail, ensure, Context as _};
    pub use anyhow::{Error, Result};
}

use std::path::{Path, PathBuf};

use error::*;

use crate::{
    config::Config,
    judgedata::{CommandDownloader, JudgeDataProvider},
    models::{VerificationInput, VerificationResult},
    runner::CommandRunner,
    split::SplitState,
    style,
    verify::Verifier,
};

#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub input: PathBuf,
    pub prev_result: Option<PathBuf>,
    pub output: PathBuf,
    pub split_state: Option<SplitState>,
    pub download: bool,
}

/// A missing file is not an error: there is simply nothing to reuse yet.
fn load_prev_result(path: &Path) -> Result<Option<VerificationResult>> {
    if !path.exists() {
        log::warn!(
            "Previous result {} does not exist; verifying every file",
            path.to_string_lossy()
        );
        return Ok(None);
    }
    let res = VerificationResult::load(path).context("Failed to load previous result")?;
    Ok(Some(res))
}

pub fn new_downloader(cfg: &Config) -> CommandDownloader {
    CommandDownloader::from_config(&cfg.judge)
        .runner(CommandRunner::new().shell(&cfg.verify.shell))
}

pub async fn run_verification(cfg: &Config, req: &VerifyRequest) -> Result<VerificationResult> {
    let input = VerificationInput::load(&req.input).context("Failed to load verification input")?;
    let prev_result = match &req.prev_result {
        Some(path) => self::load_prev_result(path)?,
        None => None,
    };

    let mut verifier = Verifier::new(
        input,
        cfg.verify.timestamp.provider(),
        Box::new(self::new_downloader(cfg)),
    )
    .prev_result(prev_result)
    .split_state(req.split_state)
    .timeout(cfg.verify.timeout)
    .default_tle(cfg.verify.default_tle)
    .default_mle(cfg.verify.default_mle)
    .compile_tle(cfg.verify.compile_tle)
    .shell(&cfg.verify.shell);

    if let Some(split_state) = req.split_state {
        log::info!("Split: {}", split_state);
    }
    let result = verifier.verify(req.download).await.context("Failed to verify")?;

    result
        .save(&req.output)
        .context("Failed to save verification result")?;
    log::info!("Saved result to {}", req.output.to_string_lossy());

    style::print_result_summary(&result);
    Ok(result)
}

/// Makes the data of every problem referenced by `input` available.
/// Keeps going after a failure and reports all of them at the end.
pub async fn download_all(input: &VerificationInput, provider: &dyn JudgeDataProvider) -> Result<usize> {
    let urls = input.problem_urls();
    let mut num_failed = 0;
    for url in &urls {
        match provider.acquire(url).await {
            Ok(data) => log::info!("{} => {}", url, data.dir().to_string_lossy()),
            Err(e) => {
                log::error!("{}", e);
                num_failed += 1;
            }
        }
    }
    ensure!(
        num_failed == 0,
        "Failed to download {}/{} problems",
        num_failed,
        urls.len()
    );
    Ok(urls.len())
}

/// Merges results of split runs; later files win on conflicting entries of equal age.
pub fn merge_results<P: AsRef<Path>>(paths: &[P]) -> Result<VerificationResult> {
    paths
        .iter()
        .try_fold(VerificationResult::default(), |acc, path| {
            let path = path.as_ref();
            let res = VerificationResult::load(path)
                .with_context(|| format!("Failed to load {}", path.to_string_lossy()))?;
            Ok(acc.merge(res))
        })
}
