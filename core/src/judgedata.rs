//! Judge test data, cached on local storage by URL hash.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use url::Url;

use crate::{
    config::{AuthConfig, JudgeConfig},
    runner::{CommandRunner, ExecError, Limits},
    str_interp::{interp, InterpError},
    testing::shell_quote,
};

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("Authentication required to download {url}: set ${env}")]
    AuthRequired { url: Url, env: String },

    #[error("Failed to download {url}: {source}")]
    Command {
        url: Url,
        #[source]
        source: ExecError,
    },

    #[error("Invalid download command: {0}")]
    Template(#[from] InterpError),

    #[error("Downloaded no testcase for {0}")]
    NoTestcase(Url),

    #[error(transparent)]
    Storage(#[from] fsutil::Error),
}

#[async_trait]
pub trait JudgeDataProvider: Send + Sync {
    /// Where the data for `url` lives, whether or not it has been downloaded.
    fn locate(&self, url: &Url) -> ProblemData;

    /// Makes the data for `url` available, downloading it only if missing.
    async fn acquire(&self, url: &Url) -> Result<ProblemData, DownloadError>;
}

/// Layout of one problem's cached data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemData {
    dir: PathBuf,
}

impl ProblemData {
    const TESTCASE_DIR_NAME: &str = "test";
    const CHECKER_FILENAME: &str = "checker";

    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn testcase_dir(&self) -> PathBuf {
        self.dir.join(Self::TESTCASE_DIR_NAME)
    }

    /// Custom checker, if the judge ships one.
    pub fn checker(&self) -> Option<PathBuf> {
        let path = self.dir.join(Self::CHECKER_FILENAME);
        path.is_file().then_some(path)
    }

    pub fn is_available(&self) -> bool {
        fsutil::is_nonempty_dir(self.testcase_dir())
    }
}

/// Directory name for `url`: leading half of the hex SHA-256 of the URL.
///
/// ```
/// use cverify_core::judgedata::url_hash;
/// use url::Url;
///
/// let url = Url::parse("https://judge.yosupo.jp/problem/aplusb").unwrap();
/// assert_eq!(url_hash(&url).len(), 32);
/// assert_eq!(url_hash(&url), url_hash(&url.clone()));
/// ```
pub fn url_hash(url: &Url) -> String {
    let digest = Sha256::digest(url.as_str().as_bytes());
    hex::encode(&digest[..16])
}

/// Stores judge data under `<cache_dir>/<url_hash>/` and fills it by running an
/// external download command. Template variables are substituted shell-quoted.
#[derive(Debug, Clone)]
pub struct CommandDownloader {
    cache_dir: PathBuf,
    download_command: String,
    auth: Vec<AuthConfig>,
    runner: CommandRunner,
}

impl CommandDownloader {
    pub fn new(cache_dir: impl Into<PathBuf>, download_command: impl Into<String>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            download_command: download_command.into(),
            auth: Vec::new(),
            runner: CommandRunner::new(),
        }
    }

    pub fn from_config(cfg: &JudgeConfig) -> Self {
        Self::new(&cfg.cache_dir, &cfg.download_command).auth(cfg.auth.clone())
    }

    pub fn auth(mut self, auth: Vec<AuthConfig>) -> Self {
        self.auth = auth;
        self
    }

    pub fn runner(mut self, runner: CommandRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn download_command_for(&self, url: &Url, data: &ProblemData) -> Result<String, InterpError> {
        let vars: HashMap<&str, String> = HashMap::from([
            ("url", shell_quote(url.as_str())),
            ("problemDir", shell_quote(&data.dir().to_string_lossy())),
            ("testDir", shell_quote(&data.testcase_dir().to_string_lossy())),
        ]);
        interp(&self.download_command, &vars)
    }

    /// The credential variable this URL needs but the environment lacks, if any.
    fn missing_credential(&self, url: &Url) -> Option<&str> {
        let host = url.host_str()?;
        self.auth
            .iter()
            .find(|a| a.host == host)
            .filter(|a| std::env::var_os(&a.env).map_or(true, |v| v.is_empty()))
            .map(|a| a.env.as_str())
    }
}

#[async_trait]
impl JudgeDataProvider for CommandDownloader {
    fn locate(&self, url: &Url) -> ProblemData {
        ProblemData::new(self.cache_dir.join(url_hash(url)))
    }

    async fn acquire(&self, url: &Url) -> Result<ProblemData, DownloadError> {
        let data = self.locate(url);
        if data.is_available() {
            log::info!("already exists: {}", url);
            return Ok(data);
        }

        log::info!("download: {}", url);
        fsutil::mkdir_all(data.dir())?;
        let cmd = self.download_command_for(url, &data)?;

        if let Err(e) = self.runner.run_checked(&cmd, Limits::default()).await {
            if let Some(env) = self.missing_credential(url) {
                log::error!("Required: ${} environment variable", env);
                return Err(DownloadError::AuthRequired {
                    url: url.clone(),
                    env: env.to_owned(),
                });
            }
            return Err(DownloadError::Command {
                url: url.clone(),
                source: e,
            });
        }

        if !data.is_available() {
            return Err(DownloadError::NoTestcase(url.clone()));
        }
        Ok(data)
    }
}
