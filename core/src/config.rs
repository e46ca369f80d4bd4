use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use std::time::Duration;

use anyhow::Context as _;
use rust_embed::RustEmbed;
use serde::Deserialize;

use crate::timestamp::TimestampStrategy;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    pub verify: VerifyConfig,
    pub judge: JudgeConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VerifyConfig {
    pub shell: PathBuf,
    #[serde(with = "serdable::duration_secs")]
    pub timeout: Duration,
    #[serde(with = "serdable::duration_secs")]
    pub default_tle: Duration,
    #[serde(default)]
    pub default_mle: Option<u64>,
    #[serde(
        with = "serdable::duration_secs",
        default = "VerifyConfig::default_compile_tle"
    )]
    pub compile_tle: Duration,
    pub timestamp: TimestampStrategy,
}

impl VerifyConfig {
    fn default_compile_tle() -> Duration {
        Duration::from_secs(600)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JudgeConfig {
    pub cache_dir: PathBuf,
    pub download_command: String,
    #[serde(default)]
    pub auth: Vec<AuthConfig>,
}

/// Environment variable holding credentials for a judge host.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthConfig {
    pub host: String,
    pub env: String,
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

fn strip_prefix_dot(path: &Path) -> &Path {
    path.strip_prefix(".").unwrap_or(path)
}

impl Config {
    pub const FILENAME: &str = "cverify.toml";

    pub fn example_toml() -> anyhow::Result<String> {
        let file = Asset::get(Self::FILENAME).context("Example config is not embedded")?;
        let s = std::str::from_utf8(file.data.as_ref()).context("Example config is not UTF-8")?;
        Ok(s.to_owned())
    }

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Loads `filepath`; relative paths inside are resolved against its directory.
    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(&filepath).context("Cannot read a file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;

        let config_dir = filepath.parent().unwrap_or(Path::new("."));
        if cfg.judge.cache_dir.is_relative() {
            cfg.judge.cache_dir = config_dir.join(strip_prefix_dot(&cfg.judge.cache_dir));
        }
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Find config file ancestor dirs, including current dir.
    pub fn find_file_in_ancestors(cur_dir: impl AsRef<Path>) -> Option<PathBuf> {
        cur_dir
            .as_ref()
            .ancestors()
            .map(|dir| dir.join(Self::FILENAME))
            .find(|path| path.is_file())
    }

    /// The nearest config file, or the built-in defaults if there is none.
    pub fn load(cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        match Self::find_file_in_ancestors(cur_dir) {
            Some(path) => {
                log::debug!("Using config {:?}", path);
                Self::from_toml_file(path)
            }
            None => {
                let toml = Self::example_toml()?;
                Self::from_toml(&toml).context("Invalid built-in config")
            }
        }
    }
}
