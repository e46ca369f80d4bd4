pub mod download;
pub mod merge_result;
pub mod verify;

use std::path::PathBuf;

use cverify_core::timestamp::TimestampStrategy;

#[derive(Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct GlobalArgs {
    #[command(subcommand)]
    pub subcmd: Subcommand,

    #[arg(long)]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
pub enum Subcommand {
    #[command(alias("v"))]
    Verify(verify::Args),

    Download(download::Args),

    MergeResult(merge_result::Args),
}

pub type SubcmdResult = anyhow::Result<()>;

impl GlobalArgs {
    pub async fn exec_subcmd(&self) -> SubcmdResult {
        use Subcommand::*;
        match &self.subcmd {
            Verify(args) => verify::exec(args, self).await,
            Download(args) => download::exec(args, self).await,
            MergeResult(args) => merge_result::exec(args, self),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
#[clap(rename_all = "lower")]
pub enum ArgTimestamp {
    Git,
    Filesystem,
}

impl From<ArgTimestamp> for TimestampStrategy {
    fn from(value: ArgTimestamp) -> Self {
        use ArgTimestamp::*;
        match value {
            Git => TimestampStrategy::Git,
            Filesystem => TimestampStrategy::Filesystem,
        }
    }
}

#[cfg(test)]
mod test {
    use clap::Parser;

    use super::*;

    #[test]
    fn parse_verify() {
        let args = GlobalArgs::parse_from([
            "cverify",
            "--cache-dir",
            "/tmp/cache",
            "verify",
            "--input",
            "verify.json",
            "--output",
            "result.json",
            "--timestamp",
            "filesystem",
            "--split",
            "4",
            "--split-index",
            "2",
            "--no-download",
        ]);
        assert_eq!(args.cache_dir, Some(PathBuf::from("/tmp/cache")));
        let Subcommand::Verify(v) = &args.subcmd else {
            panic!("not verify: {:?}", args.subcmd)
        };
        assert_eq!(v.input, PathBuf::from("verify.json"));
        assert_eq!(v.timestamp, Some(ArgTimestamp::Filesystem));
        assert_eq!((v.split, v.split_index), (Some(4), Some(2)));
        assert!(v.no_download);
        assert_eq!(v.prev_result, None);
    }

    #[test]
    fn split_needs_index() {
        let res = GlobalArgs::try_parse_from([
            "cverify", "verify", "-i", "verify.json", "-o", "result.json", "--split", "4",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn parse_merge_result() {
        let args = GlobalArgs::parse_from(["cverify", "merge-result", "a.json", "b.json", "-o", "c.json"]);
        let Subcommand::MergeResult(m) = &args.subcmd else {
            panic!("not merge-result: {:?}", args.subcmd)
        };
        assert_eq!(m.results, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert_eq!(m.output, PathBuf::from("c.json"));
    }
}
