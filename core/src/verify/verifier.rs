use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use chrono::Local;

use super::{exec::ExecContext, resource};
use crate::{
    error::{Result, VerifyError},
    judgedata::JudgeDataProvider,
    models::{
        CommandResult, FileResult, ResultStatus, Timestamp, VerificationFile, VerificationInput,
        VerificationResult,
    },
    runner::{CommandRunner, Limits},
    split::SplitState,
    timestamp::{to_local_timestamp, TimestampProvider},
};

/// Decides which files must be verified in this run and verifies them.
pub struct Verifier {
    input: VerificationInput,
    prev_result: Option<VerificationResult>,
    split_state: Option<SplitState>,
    verification_time: Timestamp,
    timeout: Duration,
    default_tle: Duration,
    default_mle: Option<u64>,
    compile_tle: Duration,
    runner: CommandRunner,
    timestamp: Box<dyn TimestampProvider>,
    judge_data: Box<dyn JudgeDataProvider>,
    result: Option<VerificationResult>,
}

impl Verifier {
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1800);
    const DEFAULT_TLE: Duration = Duration::from_secs(60);
    const DEFAULT_COMPILE_TLE: Duration = Duration::from_secs(600);

    pub fn new(
        input: VerificationInput,
        timestamp: Box<dyn TimestampProvider>,
        judge_data: Box<dyn JudgeDataProvider>,
    ) -> Self {
        Self {
            input,
            prev_result: None,
            split_state: None,
            verification_time: to_local_timestamp(Local::now()),
            timeout: Self::DEFAULT_TIMEOUT,
            default_tle: Self::DEFAULT_TLE,
            default_mle: None,
            compile_tle: Self::DEFAULT_COMPILE_TLE,
            runner: CommandRunner::new(),
            timestamp,
            judge_data,
            result: None,
        }
    }

    pub fn prev_result(mut self, prev_result: Option<VerificationResult>) -> Self {
        self.prev_result = prev_result;
        self
    }

    pub fn split_state(mut self, split_state: Option<SplitState>) -> Self {
        self.split_state = split_state;
        self
    }

    pub fn verification_time(mut self, t: Timestamp) -> Self {
        self.verification_time = t;
        self
    }

    /// Wall-clock budget of [`Self::verify`]; checks not started within it are skipped.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn default_tle(mut self, tle: Duration) -> Self {
        self.default_tle = tle;
        self
    }

    /// In MiB.
    pub fn default_mle(mut self, mle: Option<u64>) -> Self {
        self.default_mle = mle;
        self
    }

    pub fn compile_tle(mut self, tle: Duration) -> Self {
        self.compile_tle = tle;
        self
    }

    pub fn shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.runner = self.runner.shell(shell);
        self
    }

    pub fn runner(mut self, runner: CommandRunner) -> Self {
        self.runner = runner;
        self
    }

    pub fn get_verification_time(&self) -> Timestamp {
        self.verification_time
    }

    pub fn force_result(&self) -> Result<&VerificationResult> {
        self.result.as_ref().ok_or(VerifyError::Unverified)
    }

    /// False until [`Self::verify`] has completed.
    pub fn is_success(&self) -> bool {
        self.result
            .as_ref()
            .map_or(false, VerificationResult::is_success)
    }

    /// Files having at least one check, sorted by path.
    pub fn verification_files(&self) -> Vec<(&Path, &VerificationFile)> {
        self.input.verification_files().collect()
    }

    /// Last change of `path` or any of its dependencies.
    pub async fn current_timestamp(&self, path: &Path) -> anyhow::Result<Timestamp> {
        let deps = self.input.resolve_dependencies(path);
        self.timestamp.latest_change(&deps).await
    }

    /// Whether `prev` can stand for `path` in this run: it covers every check of
    /// `file`, all of them succeeded, and nothing `path` depends on changed since.
    async fn is_fresh(&self, path: &Path, file: &VerificationFile, prev: &FileResult) -> bool {
        match self.current_timestamp(path).await {
            Ok(t) => !prev.need_verification(
                self.verification_time.min(t),
                file.verification.len(),
            ),
            Err(e) => {
                log::warn!(
                    "Cannot get timestamp of {}; verifying it anyway: {:#}",
                    path.to_string_lossy(),
                    e
                );
                false
            }
        }
    }

    /// Verification files minus those whose previous result is still fresh.
    pub async fn remaining_verification_files(&self) -> Vec<(&Path, &VerificationFile)> {
        let files = self.verification_files();
        let Some(prev_result) = &self.prev_result else {
            return files
        };

        let mut remaining = Vec::with_capacity(files.len());
        for (path, f) in files {
            if let Some(prev) = prev_result.get(path) {
                if self.is_fresh(path, f, prev).await {
                    log::debug!("Fresh: {}", path.to_string_lossy());
                    continue;
                }
            }
            remaining.push((path, f));
        }
        remaining
    }

    /// The share of [`Self::remaining_verification_files`] assigned to this worker.
    pub async fn current_verification_files(&self) -> Vec<(&Path, &VerificationFile)> {
        let remaining = self.remaining_verification_files().await;
        match self.split_state {
            Some(split_state) => split_state.split(&remaining).to_vec(),
            None => remaining,
        }
    }

    async fn exec_pre_commands(&self) -> Result<()> {
        let pre_commands = &self.input.pre_command;
        if pre_commands.is_empty() {
            log::info!("There is no pre_command");
            return Ok(());
        }

        log::info!("pre_command size {}", pre_commands.len());
        for cmd in pre_commands {
            log::debug!("pre_command: {}", cmd);
            self.runner
                .run_checked(cmd, Limits::default())
                .await
                .map_err(|e| {
                    log::error!("Failed to pre_command: {}", cmd);
                    VerifyError::PreconditionFailure(e)
                })?;
        }
        Ok(())
    }

    /// Previous results of files that are still verification files.
    fn carried_forward_results(&self) -> BTreeMap<PathBuf, FileResult> {
        let Some(prev_result) = &self.prev_result else {
            return BTreeMap::new()
        };
        prev_result
            .files
            .iter()
            .filter(|(path, _)| {
                self.input
                    .files
                    .get(*path)
                    .map_or(false, VerificationFile::is_verification)
            })
            .map(|(path, r)| (path.clone(), r.clone()))
            .collect()
    }

    /// Runs pre-commands, then verifies the current files one by one.
    ///
    /// Files outside this run keep their previous result. A failing pre-command
    /// aborts the whole run with [`VerifyError::PreconditionFailure`]; any other
    /// failure is recorded in the result.
    pub async fn verify(&mut self, download: bool) -> Result<VerificationResult> {
        let start_time = Instant::now();

        if let Err(e) = resource::raise_stack_limit() {
            log::warn!("failed to increase the stack size[ulimit]: {:#}", e);
        }

        self.exec_pre_commands().await?;

        let current: Vec<PathBuf> = self
            .current_verification_files()
            .await
            .into_iter()
            .map(|(path, _)| path.to_owned())
            .collect();
        log::info!(
            "current_verification_files: {}",
            current
                .iter()
                .map(|p| p.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let mut files = self.carried_forward_results();
        for path in current {
            let Some(f) = self.input.files.get(&path) else {
                continue
            };
            let file_result = self.verify_file(&path, f, download, start_time).await;
            files.insert(path, file_result);
        }

        let result = VerificationResult { files };
        self.result = Some(result.clone());
        Ok(result)
    }

    async fn verify_file(
        &self,
        path: &Path,
        file: &VerificationFile,
        download: bool,
        start_time: Instant,
    ) -> FileResult {
        let now = self.verification_time;
        let path_str = path.to_string_lossy();
        let file_start_time = Instant::now();
        log::info!("Start: {}", path_str);

        if download {
            for url in file.problem_urls() {
                if let Err(e) = self.judge_data.acquire(url).await {
                    log::error!("Failed to verify {}: {}", path_str, VerifyError::from(e));
                    return FileResult::new(vec![CommandResult::new(ResultStatus::Failure, now)]);
                }
            }
        }

        let ctx = ExecContext {
            runner: &self.runner,
            judge_data: self.judge_data.as_ref(),
            default_tle: self.default_tle,
            default_mle: self.default_mle,
            compile_tle: self.compile_tle,
        };

        let mut results = Vec::with_capacity(file.verification.len());
        for (i, v) in file.verification.iter().enumerate() {
            if start_time.elapsed() > self.timeout {
                log::warn!("Skip[Timeout]: {} #{}", path_str, i);
                results.push(CommandResult::new(ResultStatus::Skipped, now));
                continue;
            }
            let status = match v.execute(&ctx).await {
                Ok(()) => ResultStatus::Success,
                Err(e) => {
                    log::error!(
                        "Failed to verify {} #{} ({}): {}",
                        path_str,
                        i,
                        v.run_command(),
                        e
                    );
                    ResultStatus::Failure
                }
            };
            results.push(CommandResult::new(status, now));
        }

        log::info!(
            "Finish: {} ({:.2}s)",
            path_str,
            file_start_time.elapsed().as_secs_f64()
        );
        FileResult::new(results)
    }
}

#[cfg(test)]
mod test {
    use std::{
        collections::{BTreeSet, HashMap, HashSet},
        sync::Mutex,
    };

    use async_trait::async_trait;
    use chrono::{FixedOffset, TimeZone};
    use maplit::{btreemap, hashmap, hashset};
    use url::Url;

    use super::*;
    use crate::{
        judgedata::{DownloadError, ProblemData},
        models::{CommandVerification, ProblemVerification, Verification},
    };
    use ResultStatus::*;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> Timestamp {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, s)
            .unwrap()
    }

    /// Timestamps from a table instead of git or the file system.
    struct FixedTimestamps {
        default: Timestamp,
        table: HashMap<PathBuf, Timestamp>,
        broken: HashSet<PathBuf>,
    }

    #[async_trait]
    impl TimestampProvider for FixedTimestamps {
        async fn latest_change(&self, paths: &BTreeSet<PathBuf>) -> anyhow::Result<Timestamp> {
            if paths.iter().any(|p| self.broken.contains(p)) {
                anyhow::bail!("broken timestamp");
            }
            Ok(paths
                .iter()
                .map(|p| self.table.get(p).copied().unwrap_or(self.default))
                .max()
                .unwrap_or(self.default))
        }
    }

    fn fixed_timestamps(default: Timestamp, table: HashMap<PathBuf, Timestamp>) -> Box<FixedTimestamps> {
        Box::new(FixedTimestamps {
            default,
            table,
            broken: HashSet::new(),
        })
    }

    /// Judge data living in a fixed dir; URLs in `unavailable` fail to download.
    struct StubJudgeData {
        dir: PathBuf,
        unavailable: HashSet<Url>,
        acquired: Mutex<Vec<Url>>,
    }

    impl StubJudgeData {
        fn new(dir: impl Into<PathBuf>) -> Self {
            Self {
                dir: dir.into(),
                unavailable: HashSet::new(),
                acquired: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl JudgeDataProvider for StubJudgeData {
        fn locate(&self, _url: &Url) -> ProblemData {
            ProblemData::new(&self.dir)
        }

        async fn acquire(&self, url: &Url) -> std::result::Result<ProblemData, DownloadError> {
            self.acquired.lock().unwrap().push(url.clone());
            if self.unavailable.contains(url) {
                return Err(DownloadError::AuthRequired {
                    url: url.clone(),
                    env: "YUKICODER_TOKEN".to_owned(),
                });
            }
            Ok(self.locate(url))
        }
    }

    fn unittest(cmd: &str) -> Verification {
        Verification::Command(CommandVerification {
            command: cmd.to_owned(),
            compile: None,
            tle: None,
        })
    }

    fn problem(url: &str, cmd: &str) -> Verification {
        Verification::Problem(ProblemVerification {
            problem: Url::parse(url).unwrap(),
            command: cmd.to_owned(),
            compile: None,
            error: None,
            tle: None,
            mle: None,
        })
    }

    fn verification_file(verification: Vec<Verification>) -> VerificationFile {
        VerificationFile {
            verification,
            ..Default::default()
        }
    }

    fn input_of(files: Vec<(&str, Vec<Verification>)>) -> VerificationInput {
        VerificationInput {
            files: files
                .into_iter()
                .map(|(path, vs)| (PathBuf::from(path), verification_file(vs)))
                .collect(),
            pre_command: vec![],
        }
    }

    fn file_result(slots: &[(ResultStatus, Timestamp)]) -> FileResult {
        FileResult::new(
            slots
                .iter()
                .map(|&(s, t)| CommandResult::new(s, t))
                .collect(),
        )
    }

    fn verifier(input: VerificationInput) -> Verifier {
        let epoch = datetime(2000, 1, 1, 0, 0, 0);
        Verifier::new(
            input,
            fixed_timestamps(epoch, HashMap::new()),
            Box::new(StubJudgeData::new("/nonexistent")),
        )
    }

    fn paths<'a>(files: &[(&'a Path, &VerificationFile)]) -> Vec<&'a str> {
        files.iter().map(|(p, _)| p.to_str().unwrap()).collect()
    }

    #[test]
    fn force_result_should_fail_before_verify() {
        let v = verifier(VerificationInput::default());
        assert!(matches!(v.force_result(), Err(VerifyError::Unverified)));
        assert!(!v.is_success());
    }

    #[test]
    fn verification_files_should_be_sorted_and_exclude_libraries() {
        let v = verifier(input_of(vec![
            ("foo/baz.py", vec![unittest("true")]),
            ("foo/abc.py", vec![unittest("true")]),
            ("baz/foo.py", vec![unittest("true")]),
            ("lib/library.py", vec![]),
            ("hoge/piyo.py", vec![unittest("true")]),
            ("hoge/hoge.py", vec![unittest("true")]),
        ]));
        assert_eq!(
            paths(&v.verification_files()),
            vec!["baz/foo.py", "foo/abc.py", "foo/baz.py", "hoge/hoge.py", "hoge/piyo.py"]
        );
    }

    #[tokio::test]
    async fn remaining_verification_files() {
        let input = input_of(vec![
            ("baz/foo.py", vec![unittest("true")]),
            ("foo/abc.py", vec![unittest("true")]),
            ("foo/baz.py", vec![unittest("true")]),
            ("hoge/hoge.py", vec![unittest("true")]),
            ("hoge/piyo.py", vec![unittest("true")]),
        ]);
        let success_time = datetime(2019, 12, 27, 19, 0, 0);
        let v = Verifier::new(
            input,
            fixed_timestamps(
                datetime(2019, 12, 25, 19, 0, 0),
                hashmap! {
                    PathBuf::from("hoge/piyo.py") => datetime(2019, 12, 28, 19, 0, 0),
                    PathBuf::from("hoge/hoge.py") => datetime(2019, 12, 27, 19, 0, 0),
                },
            ),
            Box::new(StubJudgeData::new("/nonexistent")),
        )
        .verification_time(datetime(2020, 2, 27, 19, 0, 0))
        .prev_result(Some(VerificationResult {
            files: btreemap! {
                PathBuf::from("baz/foo.py") => file_result(&[(Failure, success_time)]),
                PathBuf::from("hoge/hoge.py") => file_result(&[(Success, success_time)]),
                PathBuf::from("hoge/piyo.py") => file_result(&[(Success, success_time)]),
            },
        }));

        assert_eq!(
            paths(&v.remaining_verification_files().await),
            vec!["baz/foo.py", "foo/abc.py", "foo/baz.py", "hoge/piyo.py"]
        );
    }

    #[tokio::test]
    async fn file_is_skipped_only_if_dependencies_unchanged_since_success() {
        let success_time = datetime(2023, 1, 10, 0, 0, 0);
        let run = |dep_time: Timestamp| {
            let mut input = input_of(vec![("a.test.cpp", vec![unittest("true")])]);
            input
                .files
                .get_mut(Path::new("a.test.cpp"))
                .unwrap()
                .dependencies
                .insert(PathBuf::from("lib.hpp"));
            Verifier::new(
                input,
                fixed_timestamps(
                    datetime(2023, 1, 1, 0, 0, 0),
                    hashmap! { PathBuf::from("lib.hpp") => dep_time },
                ),
                Box::new(StubJudgeData::new("/nonexistent")),
            )
            .verification_time(datetime(2023, 2, 1, 0, 0, 0))
            .prev_result(Some(VerificationResult {
                files: btreemap! {
                    PathBuf::from("a.test.cpp") => file_result(&[(Success, success_time)]),
                },
            }))
        };

        // dependency older than the last success: fresh, skipped
        let v = run(datetime(2023, 1, 9, 0, 0, 0));
        assert!(v.remaining_verification_files().await.is_empty());

        // dependency changed in the same second as the last success: still fresh
        let v = run(success_time);
        assert!(v.remaining_verification_files().await.is_empty());

        // dependency changed after the last success: verified again
        let v = run(datetime(2023, 1, 11, 0, 0, 0));
        assert_eq!(paths(&v.remaining_verification_files().await), vec!["a.test.cpp"]);
    }

    #[tokio::test]
    async fn skipped_or_failed_results_are_never_fresh() {
        let t = datetime(2023, 1, 10, 0, 0, 0);
        let v = verifier(input_of(vec![
            ("a.py", vec![unittest("true"), unittest("true")]),
            ("b.py", vec![unittest("true")]),
            ("c.py", vec![unittest("true")]),
        ]))
        .prev_result(Some(VerificationResult {
            files: btreemap! {
                PathBuf::from("a.py") => file_result(&[(Success, t), (Skipped, t)]),
                PathBuf::from("b.py") => file_result(&[(Failure, t)]),
                PathBuf::from("c.py") => file_result(&[(Success, t)]),
            },
        }));
        assert_eq!(
            paths(&v.remaining_verification_files().await),
            vec!["a.py", "b.py"]
        );
    }

    #[tokio::test]
    async fn added_check_invalidates_previous_success() {
        let t = datetime(2023, 1, 10, 0, 0, 0);
        let mut v = verifier(input_of(vec![(
            "a.py",
            vec![unittest("true"), unittest("exit 1")],
        )]))
        .prev_result(Some(VerificationResult {
            files: btreemap! { PathBuf::from("a.py") => file_result(&[(Success, t)]) },
        }));
        assert_eq!(paths(&v.remaining_verification_files().await), vec!["a.py"]);

        let now = v.get_verification_time();
        let res = v.verify(false).await.unwrap();
        assert_eq!(
            res.files[Path::new("a.py")],
            file_result(&[(Success, now), (Failure, now)])
        );
        assert!(!v.is_success());
    }

    #[tokio::test]
    async fn timestamp_failure_should_not_skip_file() {
        let t = datetime(2023, 1, 10, 0, 0, 0);
        let v = Verifier::new(
            input_of(vec![("a.py", vec![unittest("true")])]),
            Box::new(FixedTimestamps {
                default: datetime(2000, 1, 1, 0, 0, 0),
                table: HashMap::new(),
                broken: hashset! { PathBuf::from("a.py") },
            }),
            Box::new(StubJudgeData::new("/nonexistent")),
        )
        .prev_result(Some(VerificationResult {
            files: btreemap! { PathBuf::from("a.py") => file_result(&[(Success, t)]) },
        }));
        assert_eq!(paths(&v.remaining_verification_files().await), vec!["a.py"]);
    }

    #[tokio::test]
    async fn current_verification_files_should_be_split() {
        let input = input_of(
            ["0.py", "1.py", "2.py", "3.py", "4.py"]
                .iter()
                .map(|&p| (p, vec![unittest("true")]))
                .collect(),
        );
        let shard = |index| {
            verifier(input.clone()).split_state(Some(SplitState::new(3, index).unwrap()))
        };
        assert_eq!(paths(&shard(0).current_verification_files().await), vec!["0.py"]);
        assert_eq!(
            paths(&shard(1).current_verification_files().await),
            vec!["1.py", "2.py"]
        );
        assert_eq!(
            paths(&shard(2).current_verification_files().await),
            vec!["3.py", "4.py"]
        );
        assert_eq!(
            paths(&verifier(input.clone()).current_verification_files().await).len(),
            5
        );
    }

    #[tokio::test]
    async fn failing_check_should_not_abort_others() {
        let mut v = verifier(input_of(vec![
            ("a.py", vec![unittest("exit 1"), unittest("true")]),
            ("b.py", vec![unittest("true")]),
        ]));
        let now = v.get_verification_time();
        let res = v.verify(false).await.unwrap();

        assert_eq!(
            res.files,
            btreemap! {
                PathBuf::from("a.py") => file_result(&[(Failure, now), (Success, now)]),
                PathBuf::from("b.py") => file_result(&[(Success, now)]),
            }
        );
        assert!(!v.is_success());
        assert_eq!(v.force_result().unwrap(), &res);
    }

    #[tokio::test]
    async fn compile_failure_should_skip_run_step() {
        let tmp = tempfile::tempdir().unwrap();
        let marker = tmp.path().join("ran");
        let mut v = verifier(input_of(vec![(
            "a.cpp",
            vec![Verification::Command(CommandVerification {
                command: format!("touch '{}'", marker.to_string_lossy()),
                compile: Some("exit 1".to_owned()),
                tle: None,
            })],
        )]));
        let res = v.verify(false).await.unwrap();
        assert_eq!(res.files[Path::new("a.cpp")].count(Failure), 1);
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn hanging_compile_should_be_killed() {
        let tmp = tempfile::tempdir().unwrap();
        let marker = tmp.path().join("ran");
        let mut v = verifier(input_of(vec![(
            "a.cpp",
            vec![Verification::Command(CommandVerification {
                command: format!("touch '{}'", marker.to_string_lossy()),
                compile: Some("sleep 5".to_owned()),
                tle: Some(Duration::from_secs(10)),
            })],
        )]))
        .compile_tle(Duration::from_millis(200));

        let start = std::time::Instant::now();
        let res = v.verify(false).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(3));
        assert_eq!(res.files[Path::new("a.cpp")].count(Failure), 1);
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn failing_pre_command_should_abort_before_any_file() {
        let tmp = tempfile::tempdir().unwrap();
        let marker = tmp.path().join("ran");
        let mut input = input_of(vec![(
            "a.py",
            vec![unittest(&format!("touch '{}'", marker.to_string_lossy()))],
        )]);
        input.pre_command = vec!["true".to_owned(), "exit 3".to_owned()];
        let mut v = verifier(input);

        let err = v.verify(false).await.unwrap_err();
        assert!(matches!(err, VerifyError::PreconditionFailure(_)), "{:?}", err);
        assert!(!marker.exists());
        assert!(matches!(v.force_result(), Err(VerifyError::Unverified)));
    }

    #[tokio::test]
    async fn exhausted_budget_should_record_skipped() {
        let mut v = verifier(input_of(vec![
            ("a.py", vec![unittest("true"), unittest("true")]),
            ("b.py", vec![unittest("true")]),
        ]))
        .timeout(Duration::ZERO);
        let now = v.get_verification_time();
        let res = v.verify(false).await.unwrap();

        assert_eq!(
            res.files,
            btreemap! {
                PathBuf::from("a.py") => file_result(&[(Skipped, now), (Skipped, now)]),
                PathBuf::from("b.py") => file_result(&[(Skipped, now)]),
            }
        );
        assert!(v.is_success());
    }

    #[tokio::test]
    async fn results_outside_this_run_are_carried_forward() {
        let old = datetime(2023, 1, 10, 0, 0, 0);
        let prev = VerificationResult {
            files: btreemap! {
                PathBuf::from("fresh.py") => file_result(&[(Success, old)]),
                PathBuf::from("stale.py") => file_result(&[(Failure, old)]),
                PathBuf::from("deleted.py") => file_result(&[(Success, old)]),
                PathBuf::from("other_shard.py") => file_result(&[(Failure, old)]),
            },
        };
        let mut v = verifier(input_of(vec![
            ("fresh.py", vec![unittest("true")]),
            ("other_shard.py", vec![unittest("true")]),
            ("stale.py", vec![unittest("true")]),
        ]))
        .prev_result(Some(prev.clone()))
        .split_state(Some(SplitState::new(2, 1).unwrap()));
        let now = v.get_verification_time();

        // remaining: [other_shard.py, stale.py]; shard 1 of 2 gets stale.py
        let res = v.verify(false).await.unwrap();
        assert_eq!(
            res.files,
            btreemap! {
                PathBuf::from("fresh.py") => prev.files[Path::new("fresh.py")].clone(),
                PathBuf::from("other_shard.py") => prev.files[Path::new("other_shard.py")].clone(),
                PathBuf::from("stale.py") => file_result(&[(Success, now)]),
            }
        );
    }

    #[tokio::test]
    async fn download_failure_should_fail_file_without_running_checks() {
        let tmp = tempfile::tempdir().unwrap();
        let marker = tmp.path().join("ran");
        let url = "https://yukicoder.me/problems/no/1";
        let mut judge_data = StubJudgeData::new(tmp.path());
        judge_data.unavailable.insert(Url::parse(url).unwrap());

        let mut v = Verifier::new(
            input_of(vec![
                (
                    "a.cpp",
                    vec![
                        problem(url, "true"),
                        unittest(&format!("touch '{}'", marker.to_string_lossy())),
                    ],
                ),
                ("b.cpp", vec![unittest("true")]),
            ]),
            fixed_timestamps(datetime(2000, 1, 1, 0, 0, 0), HashMap::new()),
            Box::new(judge_data),
        );
        let now = v.get_verification_time();
        let res = v.verify(true).await.unwrap();

        assert_eq!(res.files[Path::new("a.cpp")], file_result(&[(Failure, now)]));
        assert_eq!(res.files[Path::new("b.cpp")], file_result(&[(Success, now)]));
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn problem_verification_should_judge_testcases() {
        let tmp = tempfile::tempdir().unwrap();
        let data = ProblemData::new(tmp.path());
        let test_dir = data.testcase_dir();
        fsutil::write_with_mkdir(test_dir.join("00.in"), "3\n").unwrap();
        fsutil::write_with_mkdir(test_dir.join("00.out"), "6\n").unwrap();
        fsutil::write_with_mkdir(test_dir.join("01.in"), "21\n").unwrap();
        fsutil::write_with_mkdir(test_dir.join("01.out"), "42\n").unwrap();

        let url = "https://judge.yosupo.jp/problem/double";
        let mut v = Verifier::new(
            input_of(vec![
                ("ac.cpp", vec![problem(url, "read x; echo $((x * 2))")]),
                ("wa.cpp", vec![problem(url, "read x; echo $((x + 3))")]),
            ]),
            fixed_timestamps(datetime(2000, 1, 1, 0, 0, 0), HashMap::new()),
            Box::new(StubJudgeData::new(tmp.path())),
        );
        let res = v.verify(false).await.unwrap();

        assert!(res.files[Path::new("ac.cpp")].is_success());
        assert!(!res.files[Path::new("wa.cpp")].is_success());
    }
}
