//! Command line argument parsing

use crate::core::Preset;
use crate::extractor::ytdlp::DEFAULT_BINARY;
use crate::web::server::{ServerConfig, DEFAULT_BIND};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tubedrop - video downloads behind a login page
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (only errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run the web page (default)
    Serve(ServeArgs),
    /// Download one URL from the command line
    Fetch(FetchArgs),
    /// List the available presets
    Presets,
}

#[derive(clap::Args, Clone, PartialEq)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "TUBEDROP_BIND", value_name = "ADDR", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// Path to the yt-dlp executable
    #[arg(long = "yt-dlp", env = "TUBEDROP_YT_DLP", value_name = "PATH", default_value = DEFAULT_BINARY)]
    pub yt_dlp: PathBuf,

    /// Directory for per-request temporary directories
    #[arg(long, env = "TUBEDROP_TEMP_DIR", value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Password required on the login page
    #[arg(long, env = "TUBEDROP_PASSWORD", value_name = "SECRET", hide_env_values = true)]
    pub password: Option<String>,

    /// How long a login stays valid (e.g. "12h", "30m")
    #[arg(long, env = "TUBEDROP_SESSION_TTL", value_name = "DURATION", default_value = "12h")]
    pub session_ttl: humantime::Duration,
}

#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct FetchArgs {
    /// Video URL
    pub url: String,

    /// Preset id or label (see `tubedrop presets`)
    #[arg(short, long, value_name = "ID", default_value = "mp4_best")]
    pub preset: Preset,

    /// Directory to save the file into
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output: PathBuf,

    /// Path to the yt-dlp executable
    #[arg(long = "yt-dlp", env = "TUBEDROP_YT_DLP", value_name = "PATH", default_value = DEFAULT_BINARY)]
    pub yt_dlp: PathBuf,

    /// Directory for the temporary download directory
    #[arg(long, env = "TUBEDROP_TEMP_DIR", value_name = "DIR")]
    pub temp_dir: Option<PathBuf>,
}

/// Wrapper used to read `serve` settings when no subcommand is given
#[derive(Parser)]
struct ServeOnly {
    #[command(flatten)]
    serve: ServeArgs,
}

impl ServeArgs {
    /// Defaults plus environment overrides
    pub fn from_env() -> Self {
        ServeOnly::parse_from([env!("CARGO_PKG_NAME")]).serve
    }

    pub fn to_config(&self) -> ServerConfig {
        ServerConfig {
            bind: self.bind.clone(),
            yt_dlp: self.yt_dlp.clone(),
            temp_dir: self.temp_dir.clone(),
            password: self.password.clone().filter(|p| !p.is_empty()),
            session_ttl: self.session_ttl.into(),
        }
    }
}

impl std::fmt::Debug for ServeArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.to_config(), f)
    }
}

impl Args {
    /// The subcommand to run, `serve` when none was given
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Serve(ServeArgs::from_env()))
    }

    /// Get output verbosity level
    pub fn verbosity_level(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn default_log_filter(&self) -> &'static str {
        let fetching = matches!(self.command, Some(Command::Fetch(_)));
        match self.verbosity_level() {
            VerbosityLevel::Verbose => "tubedrop=debug,tower_http=debug",
            VerbosityLevel::Quiet => "tubedrop=error,tower_http=error",
            VerbosityLevel::Normal if fetching => "tubedrop=warn",
            VerbosityLevel::Normal => "tubedrop=info,tower_http=info",
        }
    }
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbosityLevel {
    /// Quiet (only errors)
    Quiet,
    /// Normal
    Normal,
    /// Verbose (debug info)
    Verbose,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            command: None,
            verbose: false,
            quiet: false,
        }
    }
}
