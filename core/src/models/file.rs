use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use url::Url;

use super::Verification;

/// The whole dependency graph of one run, as produced by the resolver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationInput {
    pub files: BTreeMap<PathBuf, VerificationFile>,

    /// Commands executed once before any file is verified.
    #[serde(default)]
    pub pre_command: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerificationFile {
    #[serde(default)]
    pub dependencies: BTreeSet<PathBuf>,

    #[serde(default)]
    pub verification: Vec<Verification>,

    #[serde(default)]
    pub document_attributes: BTreeMap<String, serde_json::Value>,

    #[serde(default)]
    pub additional_sources: Vec<AdditionalSource>,
}

/// Auxiliary artifact attached for reporting (e.g. the bundled form of a file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdditionalSource {
    pub name: String,
    pub path: PathBuf,
}

impl VerificationFile {
    /// A file is a verification file iff it has at least one check;
    /// otherwise it is a library file.
    pub fn is_verification(&self) -> bool {
        !self.verification.is_empty()
    }

    /// Distinct problem URLs of this file's checks, in order of first appearance.
    pub fn problem_urls(&self) -> Vec<&Url> {
        let mut urls: Vec<&Url> = Vec::new();
        for url in self.verification.iter().filter_map(Verification::problem_url) {
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        urls
    }
}

impl VerificationInput {
    pub fn load(filepath: impl AsRef<Path>) -> fsutil::Result<Self> {
        let mut input: Self = fsutil::read_json_with_deserialize(filepath)?;
        input.files = std::mem::take(&mut input.files)
            .into_iter()
            .map(|(path, f)| (fsutil::normalize_path(path), f))
            .collect();
        Ok(input)
    }

    /// Files having at least one check, sorted by path.
    pub fn verification_files(&self) -> impl Iterator<Item = (&Path, &VerificationFile)> {
        self.files
            .iter()
            .filter(|(_, f)| f.is_verification())
            .map(|(path, f)| (path.as_path(), f))
    }

    /// Dependencies of `path`, always including `path` itself.
    pub fn resolve_dependencies(&self, path: &Path) -> BTreeSet<PathBuf> {
        let mut deps = self
            .files
            .get(path)
            .map(|f| f.dependencies.clone())
            .unwrap_or_default();
        deps.insert(path.to_owned());
        deps
    }

    /// Every distinct problem URL referenced by any verification file.
    pub fn problem_urls(&self) -> BTreeSet<&Url> {
        self.verification_files()
            .flat_map(|(_, f)| f.problem_urls())
            .collect()
    }
}
