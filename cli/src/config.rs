use std::path::PathBuf;

use anyhow::Context as _;
use cverify_core::Config;
use serde::Deserialize;

use crate::{cmd::GlobalArgs, util};

pub const APP_NAME: &str = "cverify";
pub const ENV_PREFIX: &str = "CVERIFY_";

/// Settings taken from `CVERIFY_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EnvConfig {
    pub cache_dir: Option<PathBuf>,

    /// Whole-run budget in seconds.
    pub timeout: Option<f64>,
}

impl EnvConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_iter(std::env::vars())
    }

    fn from_iter<I>(iter: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX)
            .from_iter(iter)
            .with_context(|| format!("Invalid {}* environment variable", ENV_PREFIX))
    }

    pub fn apply(&self, cfg: &mut Config) -> anyhow::Result<()> {
        if let Some(dir) = &self.cache_dir {
            cfg.judge.cache_dir = dir.clone();
        }
        if let Some(secs) = self.timeout {
            cfg.verify.timeout = util::secs_to_duration(secs)?;
        }
        Ok(())
    }
}

fn default_cache_dir() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join(APP_NAME))
}

/// Config file (or built-in defaults), then environment, then command line.
pub fn load(args: &GlobalArgs) -> anyhow::Result<Config> {
    let mut cfg = Config::load(util::current_dir())?;
    match &cfg.source_config_file {
        Some(path) => log::debug!(
            "Config: {}",
            util::replace_homedir_to_tilde(path).to_string_lossy()
        ),
        None => {
            if let Some(dir) = default_cache_dir() {
                cfg.judge.cache_dir = dir;
            }
        }
    }

    EnvConfig::from_env()?.apply(&mut cfg)?;

    if let Some(dir) = &args.cache_dir {
        cfg.judge.cache_dir = dir.clone();
    }
    log::debug!("Cache dir: {}", cfg.judge.cache_dir.to_string_lossy());
    Ok(cfg)
}

/// Overrides the run budget if given.
pub fn override_timeout(cfg: &mut Config, secs: Option<f64>) -> anyhow::Result<()> {
    if let Some(secs) = secs {
        cfg.verify.timeout = util::secs_to_duration(secs)?;
    }
    Ok(())
}

pub fn override_default_tle(cfg: &mut Config, secs: Option<f64>) -> anyhow::Result<()> {
    if let Some(secs) = secs {
        cfg.verify.default_tle = util::secs_to_duration(secs)?;
    }
    Ok(())
}
