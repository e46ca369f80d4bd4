use std::{collections::BTreeMap, time::Duration};

use crate::{
    error::{Result, VerifyError},
    judgedata::JudgeDataProvider,
    models::{CommandVerification, ProblemVerification, Verification},
    runner::{CommandRunner, Limits},
    style,
    testing::{FsTestcase, JudgeCode, OutputComparator, TestRunner},
};

/// What a check needs from the run that executes it.
pub struct ExecContext<'a> {
    pub runner: &'a CommandRunner,
    pub judge_data: &'a dyn JudgeDataProvider,
    pub default_tle: Duration,
    pub default_mle: Option<u64>,
    pub compile_tle: Duration,
}

impl Verification {
    /// Compiles (if there is a compile step) and then runs this check.
    /// A compile failure skips the run step.
    pub async fn execute(&self, ctx: &ExecContext<'_>) -> Result<()> {
        if let Some(cmd) = self.compile_command() {
            log::info!("compile: {}", cmd);
            let limits = Limits {
                time: Some(ctx.compile_tle),
                memory: None,
            };
            ctx.runner
                .run_checked(cmd, limits)
                .await
                .map_err(VerifyError::CompileFailure)?;
        }
        let tle = self.time_limit().unwrap_or(ctx.default_tle);
        match self {
            Self::Problem(v) => v.run(ctx, tle).await,
            Self::Command(v) => v.run(ctx, tle).await,
        }
    }
}

impl CommandVerification {
    async fn run(&self, ctx: &ExecContext<'_>, tle: Duration) -> Result<()> {
        let limits = Limits {
            time: Some(tle),
            memory: None,
        };
        ctx.runner
            .run_checked(&self.command, limits)
            .await
            .map(|_| ())
            .map_err(|e| VerifyError::run_failure(&self.command, e))
    }
}

impl ProblemVerification {
    fn comparator(&self, checker: Option<std::path::PathBuf>) -> OutputComparator {
        match (checker, self.error) {
            (Some(checker), _) => OutputComparator::Checker(checker),
            (None, Some(eps)) => OutputComparator::Tolerance(eps),
            (None, None) => OutputComparator::Exact,
        }
    }

    async fn run(&self, ctx: &ExecContext<'_>, tle: Duration) -> Result<()> {
        let data = ctx.judge_data.locate(&self.problem);
        let testcases = FsTestcase::enumerate(data.testcase_dir())
            .map_err(|e| VerifyError::run_failure(&self.command, e))?;
        if testcases.is_empty() {
            return Err(VerifyError::run_failure(
                &self.command,
                format!("No testcase for {}", self.problem),
            ));
        }

        let runner = TestRunner::new(ctx.runner.clone(), &self.command)
            .comparator(self.comparator(data.checker()))
            .execution_time_limit(tle)
            .memory_limit(self.mle.or(ctx.default_mle));

        let mut count: BTreeMap<JudgeCode, usize> = BTreeMap::new();
        for t in &testcases {
            let res = runner
                .run(t)
                .await
                .map_err(|e| VerifyError::run_failure(&self.command, format!("{:#}", e)))?;
            log::info!(
                "{}: {} [{}ms]",
                res.testcase_name,
                style::judge_icon(res.judge),
                res.execution_time.as_millis()
            );
            *count.entry(res.judge).or_default() += 1;
        }

        let failed: Vec<String> = count
            .iter()
            .filter(|(&judge, _)| judge != JudgeCode::AC)
            .map(|(judge, n)| format!("{}x{}", judge, n))
            .collect();
        if failed.is_empty() {
            Ok(())
        } else {
            Err(VerifyError::run_failure(
                &self.command,
                format!("{} (of {} testcases)", failed.join(", "), testcases.len()),
            ))
        }
    }
}
