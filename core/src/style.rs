use std::collections::BTreeMap;

use colored::{Color, ColoredString, Colorize};
use strum::IntoEnumIterator;

use crate::{
    models::{ResultStatus, VerificationResult},
    testing::JudgeCode,
};

#[macro_export]
macro_rules! print_success {
    ($fmt:literal, $($e:tt)*) => {
        use ::colored::Colorize as _;
        println!("{}", format!($fmt, $($e)*).green())
    }
}

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for log::Level {
    fn color(&self) -> Color {
        use log::Level::*;
        match self {
            Error => Color::BrightRed,
            Warn => Color::BrightYellow,
            Info => Color::Cyan,
            Debug => Color::Magenta,
            Trace => Color::Blue,
        }
    }
}

impl ColorTheme for JudgeCode {
    fn color(&self) -> Color {
        use JudgeCode::*;
        if !self::is_truecolor_supported() {
            return match self {
                AC => Color::Green,
                WA => Color::Yellow,
                TLE => Color::Red,
                RE => Color::Magenta,
            };
        }

        match self {
            AC => Color::TrueColor {
                r: 30,
                g: 180,
                b: 40,
            },
            WA => Color::TrueColor {
                r: 210,
                g: 138,
                b: 4,
            },
            TLE => Color::TrueColor {
                r: 220,
                g: 42,
                b: 42,
            },
            RE => Color::TrueColor {
                r: 171,
                g: 40,
                b: 200,
            },
        }
    }
}

impl ColorTheme for ResultStatus {
    fn color(&self) -> Color {
        use ResultStatus::*;
        match self {
            Success => Color::Green,
            Failure => Color::Red,
            Skipped => Color::Yellow,
        }
    }
}

fn icon(label: impl std::fmt::Display, bg: Color) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {} ", label).on_color(bg).bold().color(fg)
}

pub fn judge_icon(judge: JudgeCode) -> ColoredString {
    self::icon(judge, judge.color())
}

pub fn status_icon(status: ResultStatus) -> ColoredString {
    self::icon(status, status.color())
}

/// Number of slots per status over the whole result.
pub fn count_statuses(result: &VerificationResult) -> BTreeMap<ResultStatus, usize> {
    ResultStatus::iter()
        .map(|s| {
            let n = result.files.values().map(|f| f.count(s)).sum();
            (s, n)
        })
        .collect()
}

pub fn print_result_summary(result: &VerificationResult) {
    let bar = "-".repeat(5);
    print!("{} ", bar);

    let num_files = result.files.len();
    let failed: Vec<_> = result.failed_files().collect();

    if failed.is_empty() {
        let msg = format!("All {} files passed ✨", num_files);
        print!("{}", msg.green());
    } else {
        let summary_msg = format!("{}/{} files failed 💣", failed.len(), num_files);
        let detail_msg = self::count_statuses(result)
            .into_iter()
            .filter(|&(s, n)| s != ResultStatus::Success && n > 0)
            .map(|(s, n)| {
                format!(
                    "{}{}{}",
                    self::status_icon(s),
                    "x".dimmed(),
                    n.to_string().bold().bright_white(),
                )
            })
            .collect::<Vec<String>>()
            .join(", ");
        print!("{} ({})", summary_msg.bright_red(), detail_msg);
    }
    println!(" {}", bar);

    for path in failed {
        println!(
            "{} {}",
            self::status_icon(ResultStatus::Failure),
            path.to_string_lossy().bright_red()
        );
    }
}
