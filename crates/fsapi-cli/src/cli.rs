use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fsapi",
    about = "Path-addressed file store over a key index and a blob directory",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file; environment variables override it.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// List stored paths starting with a prefix
    Ls(LsArgs),
    /// Store a local file at a path
    Put(PutArgs),
    /// Print the object stored at a path
    Cat(CatArgs),
    /// Delete every object whose path starts with a prefix
    Rm(RmArgs),
    /// Remove blobs no path refers to any more
    Gc(GcArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(long)]
    pub bind: Option<String>,
    #[arg(long)]
    pub redis_url: Option<String>,
    #[arg(long)]
    pub storage: Option<PathBuf>,
}

#[derive(Args)]
pub struct LsArgs {
    #[arg(default_value = "")]
    pub prefix: String,
}

#[derive(Args)]
pub struct PutArgs {
    pub path: String,
    pub file: PathBuf,
}

#[derive(Args)]
pub struct CatArgs {
    pub path: String,
    /// Show the metadata sidecar instead of the content
    #[arg(long)]
    pub info: bool,
}

#[derive(Args)]
pub struct RmArgs {
    pub prefix: String,
}

/// Smallest accepted `gc --min-age-secs`. A younger unreferenced blob may
/// belong to a put whose index entry is not written yet.
pub const MIN_GC_AGE_SECS: u64 = 60;

#[derive(Args)]
pub struct GcArgs {
    /// Leave unreferenced blobs younger than this alone (at least 60)
    #[arg(
        long,
        default_value = "3600",
        value_parser = clap::value_parser!(u64).range(MIN_GC_AGE_SECS..)
    )]
    pub min_age_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["fsapi", "serve", "--bind", "0.0.0.0:8080", "--storage", "/data"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind.as_deref(), Some("0.0.0.0:8080"));
            assert_eq!(args.storage, Some(PathBuf::from("/data")));
            assert!(args.redis_url.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_ls_default_prefix() {
        let cli = Cli::try_parse_from(["fsapi", "ls"]).unwrap();
        if let Command::Ls(args) = cli.command {
            assert_eq!(args.prefix, "");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_put() {
        let cli = Cli::try_parse_from(["fsapi", "put", "docs/a.txt", "./a.txt"]).unwrap();
        if let Command::Put(args) = cli.command {
            assert_eq!(args.path, "docs/a.txt");
            assert_eq!(args.file, PathBuf::from("./a.txt"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_cat_info() {
        let cli = Cli::try_parse_from(["fsapi", "cat", "--info", "p"]).unwrap();
        if let Command::Cat(args) = cli.command {
            assert!(args.info);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_rm_requires_prefix() {
        assert!(Cli::try_parse_from(["fsapi", "rm"]).is_err());
    }

    #[test]
    fn parse_gc() {
        let cli = Cli::try_parse_from(["fsapi", "gc"]).unwrap();
        if let Command::Gc(args) = cli.command {
            assert_eq!(args.min_age_secs, 3600);
        } else { panic!("wrong command"); }
        let cli = Cli::try_parse_from(["fsapi", "gc", "--min-age-secs", "60"]).unwrap();
        assert!(matches!(cli.command, Command::Gc(GcArgs { min_age_secs: 60 })));
    }

    #[test]
    fn parse_gc_rejects_age_below_floor() {
        assert!(Cli::try_parse_from(["fsapi", "gc", "--min-age-secs", "0"]).is_err());
        assert!(Cli::try_parse_from(["fsapi", "gc", "--min-age-secs", "59"]).is_err());
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from(["fsapi", "-v", "--config", "fsapi.toml", "--format", "json", "ls"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("fsapi.toml")));
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
