use std::path::PathBuf;

use anyhow::Context as _;

use crate::runner::{CommandRunner, Limits};

/// How a program's stdout is judged against the groundtruth.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputComparator {
    /// Byte-for-byte equality.
    Exact,

    /// Whitespace-separated tokens must match; numeric tokens may differ by the
    /// given absolute or relative error.
    Tolerance(f64),

    /// External checker invoked as `<checker> <input> <output> <groundtruth>`;
    /// exit code 0 means accepted.
    Checker(PathBuf),
}

impl OutputComparator {
    pub async fn accepts(
        &self,
        runner: &CommandRunner,
        input: &[u8],
        output: &[u8],
        groundtruth: &[u8],
    ) -> anyhow::Result<bool> {
        match self {
            Self::Exact => Ok(output == groundtruth),
            Self::Tolerance(eps) => Ok(match_with_tolerance(output, groundtruth, *eps)),
            Self::Checker(checker) => run_checker(runner, checker, input, output, groundtruth).await,
        }
    }
}

/// ```
/// use cverify_core::testing::match_with_tolerance;
///
/// assert!(match_with_tolerance(b"3.1415927\n", b"3.14159265", 1e-6));
/// assert!(!match_with_tolerance(b"3.1416", b"3.14159265", 1e-6));
/// assert!(match_with_tolerance(b"1000000.5", b"1000000.0", 1e-6)); // relative error
/// assert!(!match_with_tolerance(b"Yes 1.0", b"No 1.0", 1e-6));
/// assert!(!match_with_tolerance(b"1 2", b"1 2 3", 1e-6));
/// ```
pub fn match_with_tolerance(output: &[u8], groundtruth: &[u8], eps: f64) -> bool {
    let output = String::from_utf8_lossy(output);
    let groundtruth = String::from_utf8_lossy(groundtruth);
    let mut xs = output.split_whitespace();
    let mut ys = groundtruth.split_whitespace();
    loop {
        match (xs.next(), ys.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) => {
                if x == y {
                    continue;
                }
                let (Ok(a), Ok(b)) = (x.parse::<f64>(), y.parse::<f64>()) else {
                    return false
                };
                let diff = (a - b).abs();
                if !(diff <= eps || diff <= eps * b.abs()) {
                    return false;
                }
            }
            _ => return false,
        }
    }
}

async fn run_checker(
    runner: &CommandRunner,
    checker: &PathBuf,
    input: &[u8],
    output: &[u8],
    groundtruth: &[u8],
) -> anyhow::Result<bool> {
    let scratch = tempfile::tempdir().context("Failed to create scratch dir for checker")?;
    let paths = ["input", "output", "groundtruth"].map(|name| scratch.path().join(name));
    for (path, data) in paths.iter().zip([input, output, groundtruth]) {
        fsutil::write(path, data)?;
    }

    let cmd = std::iter::once(checker)
        .chain(&paths)
        .map(|p| shell_quote(&p.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ");
    let res = runner.run(&cmd, Limits::default()).await?;
    if !res.success() {
        log::debug!("checker rejected: {}", res.stderr.trim_end());
    }
    Ok(res.success())
}

/// Single-quotes `s` for POSIX shells.
///
/// ```
/// use cverify_core::testing::shell_quote;
///
/// assert_eq!(shell_quote("a b"), "'a b'");
/// assert_eq!(shell_quote("it's"), r#"'it'"'"'s'"#);
/// ```
pub fn shell_quote(s: &str) -> String {
    // terminate '  ->  enclose ' with "  ->  restart '
    format!("'{}'", s.replace('\'', r#"'"'"'"#))
}
