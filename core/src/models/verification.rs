use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// One executable check attached to a verification file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Verification {
    /// Runs `command` against the judge data of `problem`.
    Problem(ProblemVerification),

    /// Runs `command` as a self-contained unit test.
    Command(CommandVerification),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemVerification {
    pub problem: Url,
    pub command: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile: Option<String>,

    /// Absolute or relative error allowed when comparing floating-point outputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<f64>,

    /// Time limit per testcase.
    #[serde(
        default,
        with = "serdable::opt_duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub tle: Option<Duration>,

    /// Memory limit in MiB.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mle: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandVerification {
    pub command: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compile: Option<String>,

    #[serde(
        default,
        with = "serdable::opt_duration_secs",
        skip_serializing_if = "Option::is_none"
    )]
    pub tle: Option<Duration>,
}

impl Verification {
    pub fn compile_command(&self) -> Option<&str> {
        match self {
            Self::Problem(v) => v.compile.as_deref(),
            Self::Command(v) => v.compile.as_deref(),
        }
    }

    pub fn run_command(&self) -> &str {
        match self {
            Self::Problem(v) => &v.command,
            Self::Command(v) => &v.command,
        }
    }

    pub fn problem_url(&self) -> Option<&Url> {
        match self {
            Self::Problem(v) => Some(&v.problem),
            Self::Command(_) => None,
        }
    }

    pub fn time_limit(&self) -> Option<Duration> {
        match self {
            Self::Problem(v) => v.tle,
            Self::Command(v) => v.tle,
        }
    }
}
