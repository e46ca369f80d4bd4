#[cfg(test)]
use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use async_trait::async_trait;
use tokio::{fs::File as TokioFile, io::AsyncRead};

#[async_trait]
pub trait AsyncTestcase<'a>: Sync {
    type Reader: AsyncRead + Unpin + Send;
    fn name(&self) -> &str;
    async fn new_input_reader(&'a self) -> anyhow::Result<Self::Reader>;
    async fn new_groundtruth_reader(&'a self) -> anyhow::Result<Self::Reader>;
}

/// A testcase stored as `<name>.in` and `<name>.out` in one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsTestcase {
    name: String,
    input_data_path: PathBuf,
    groundtruth_data_path: PathBuf,
}

/// Testcase held in memory; only unit tests build these.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnMemoryTestcase<B: AsRef<[u8]>> {
    pub name: String,
    pub input: B,
    pub groundtruth: B,
}

#[async_trait]
impl<'a> AsyncTestcase<'a> for FsTestcase {
    type Reader = TokioFile;

    fn name(&self) -> &str {
        &self.name
    }

    async fn new_input_reader(&'a self) -> anyhow::Result<TokioFile> {
        TokioFile::open(&self.input_data_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to read testcase {}",
                    self.input_data_path.to_string_lossy(),
                )
            })
    }

    async fn new_groundtruth_reader(&'a self) -> anyhow::Result<TokioFile> {
        TokioFile::open(&self.groundtruth_data_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to read testcase {}",
                    self.groundtruth_data_path.to_string_lossy(),
                )
            })
    }
}

impl FsTestcase {
    pub const INPUT_EXT: &str = "in";
    pub const GROUNDTRUTH_EXT: &str = "out";

    pub fn new(
        name: impl Into<String>,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            input_data_path: input.into(),
            groundtruth_data_path: output.into(),
        }
    }

    /// Lists testcases in `dir`, sorted by name.
    /// An input file without its groundtruth file is ignored.
    pub fn enumerate(dir: impl AsRef<Path>) -> fsutil::Result<Vec<Self>> {
        let mut res = Vec::new();
        for entry in fsutil::read_dir(&dir)?.filter_map(Result::ok) {
            let Ok(ft) = entry.file_type() else {
                continue
            };
            if ft.is_dir() {
                continue;
            }
            let input = entry.path();
            if input.extension().and_then(|x| x.to_str()) != Some(Self::INPUT_EXT) {
                continue;
            }
            let groundtruth = input.with_extension(Self::GROUNDTRUTH_EXT);
            if !groundtruth.is_file() {
                log::warn!("Missing groundtruth for {}", input.to_string_lossy());
                continue;
            }
            let name = input
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            res.push(Self::new(name, input, groundtruth));
        }
        res.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(res)
    }
}

#[cfg(test)]
impl<B> OnMemoryTestcase<B>
where
    B: AsRef<[u8]>,
{
    pub fn new(name: impl Into<String>, input: impl Into<B>, groundtruth: impl Into<B>) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            groundtruth: groundtruth.into(),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl<'a, B> AsyncTestcase<'a> for OnMemoryTestcase<B>
where
    B: AsRef<[u8]> + Sync,
{
    type Reader = Cursor<&'a [u8]>;

    fn name(&self) -> &str {
        &self.name
    }

    async fn new_input_reader(&'a self) -> anyhow::Result<Self::Reader> {
        Ok(Cursor::new(self.input.as_ref()))
    }

    async fn new_groundtruth_reader(&'a self) -> anyhow::Result<Self::Reader> {
        Ok(Cursor::new(self.groundtruth.as_ref()))
    }
}
