use std::time::Duration;

use crate::runner::CommandOutput;

#[derive(Debug, Clone)]
pub struct TestOutcome {
    pub testcase_name: String,
    pub judge: JudgeCode,
    pub execution_time: Duration,
    pub output: Option<CommandOutput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, strum::Display)]
pub enum JudgeCode {
    AC,
    WA,
    TLE,
    RE,
}
