use std::{process::Stdio, time::Duration};

use anyhow::{bail, Context};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use super::{compare::OutputComparator, result::*, testcase::*};
use crate::runner::{CommandOutput, CommandRunner};

/// Runs one program against testcases and judges each run.
#[derive(Debug, Clone)]
pub struct TestRunner {
    runner: CommandRunner,
    cmd: String,
    comparator: OutputComparator,
    execution_time_limit: Duration,
    memory_limit: Option<u64>,
}

impl TestRunner {
    const DEFAULT_EXEC_TIME_LIMIT: Duration = Duration::from_secs(10);

    pub fn new(runner: CommandRunner, cmd: impl Into<String>) -> Self {
        Self {
            runner,
            cmd: cmd.into(),
            comparator: OutputComparator::Exact,
            execution_time_limit: Self::DEFAULT_EXEC_TIME_LIMIT,
            memory_limit: None,
        }
    }

    pub fn comparator(mut self, comparator: OutputComparator) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn execution_time_limit(mut self, limit: Duration) -> Self {
        self.execution_time_limit = limit;
        self
    }

    /// In MiB.
    pub fn memory_limit(mut self, limit: Option<u64>) -> Self {
        self.memory_limit = limit;
        self
    }

    pub async fn run<'t, T>(&self, testcase: &'t T) -> anyhow::Result<TestOutcome>
    where
        T: AsyncTestcase<'t>,
    {
        let (mut input_reader, mut groundtruth_reader) = tokio::try_join!(
            testcase.new_input_reader(),
            testcase.new_groundtruth_reader()
        )?;
        let mut input = Vec::new();
        input_reader
            .read_to_end(&mut input)
            .await
            .context("Failed to read input data")?;
        drop(input_reader);

        let cmd = &self.cmd;
        let mut proc = self
            .runner
            .command(cmd, self.memory_limit)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.runner.spawn_error(cmd, e))?;
        let mut stdin = proc.stdin.take().context("Failed to open stdin")?;
        let mut stdout = proc.stdout.take().context("Failed to open stdout")?;
        let mut stderr = proc.stderr.take().context("Failed to open stderr")?;

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        let start_at = tokio::time::Instant::now();
        let res = {
            let fut_stdin = async {
                // the program may exit without reading all of its input
                let _ = stdin.write_all(&input).await;
                drop(stdin); // NOTE: closing stdin is essential
                Ok::<_, std::io::Error>(())
            };
            let fut_stdout = stdout.read_to_end(&mut stdout_buf);
            let fut_stderr = stderr.read_to_end(&mut stderr_buf);
            let fut_exit_status = proc.wait();

            tokio::time::timeout(self.execution_time_limit, async {
                tokio::try_join!(fut_stdin, fut_stdout, fut_stderr, fut_exit_status)
                    .context("Failed to communicate with subprocess")
            })
            .await
        };
        let execution_time = start_at.elapsed();

        let (judge, output) = match res {
            Err(_) => {
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill TLE process: {:#}", e));
                (JudgeCode::TLE, None)
            }

            Ok(Err(e)) => bail!(e),

            Ok(Ok((_, _, _, exit_status))) => {
                let judge = if !exit_status.success() {
                    JudgeCode::RE
                } else {
                    let mut groundtruth = Vec::new();
                    groundtruth_reader
                        .read_to_end(&mut groundtruth)
                        .await
                        .context("Failed to read groundtruth data")?;
                    let accepted = self
                        .comparator
                        .accepts(&self.runner, &input, &stdout_buf, &groundtruth)
                        .await?;
                    if accepted {
                        JudgeCode::AC
                    } else {
                        JudgeCode::WA
                    }
                };
                let output = CommandOutput {
                    status: exit_status.code(),
                    stdout: String::from_utf8_lossy(&stdout_buf).into(),
                    stderr: String::from_utf8_lossy(&stderr_buf).into(),
                    elapsed: execution_time,
                };
                (judge, Some(output))
            }
        };

        Ok(TestOutcome {
            testcase_name: testcase.name().to_owned(),
            judge,
            execution_time,
            output,
        })
    }
}
