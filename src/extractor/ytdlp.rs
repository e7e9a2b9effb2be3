//! yt-dlp driven as a child process

use crate::core::{ExtractorOptions, PostProcessor, VideoInfo};
use crate::error::TubedropError;
use crate::extractor::Extractor;
use crate::Result;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, warn};

/// Default executable name looked up on `PATH`
pub const DEFAULT_BINARY: &str = "yt-dlp";

/// Extractor backed by the `yt-dlp` command line program
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    /// Use `yt-dlp` from `PATH`
    pub fn new() -> Self {
        Self {
            binary: PathBuf::from(DEFAULT_BINARY),
        }
    }

    /// Use a specific executable
    pub fn with_binary(mut self, binary: impl Into<PathBuf>) -> Self {
        self.binary = binary.into();
        self
    }

    async fn run(&self, args: Vec<String>) -> Result<Output> {
        debug!("Running {} {:?}", self.binary.display(), args);

        let output = Command::new(&self.binary)
            .args(&args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    TubedropError::ExtractorNotFound(self.binary.display().to_string())
                } else {
                    TubedropError::IoError(e)
                }
            })?;

        if !output.status.success() {
            let stderr = stderr_text(&output.stderr);
            warn!("{} exited with {}: {}", self.binary.display(), output.status, stderr);
            return Err(TubedropError::ExtractorFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(output)
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn extract_info(&self, url: &str, options: &ExtractorOptions) -> Result<VideoInfo> {
        let mut args = vec!["--dump-single-json".to_string()];
        args.extend(options_to_args(options));
        push_url(&mut args, url);

        let output = self.run(args).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(VideoInfo::from_json(stdout.trim())?)
    }

    async fn download(&self, url: &str, options: &ExtractorOptions) -> Result<()> {
        let mut args = options_to_args(options);
        push_url(&mut args, url);

        self.run(args).await?;
        Ok(())
    }
}

/// Translate an options bundle into command line flags
pub fn options_to_args(options: &ExtractorOptions) -> Vec<String> {
    let mut args = Vec::new();

    if options.noplaylist {
        args.push("--no-playlist".to_string());
    }
    if options.nocheckcertificate {
        args.push("--no-check-certificates".to_string());
    }
    if options.quiet {
        args.push("--quiet".to_string());
        args.push("--no-warnings".to_string());
    }
    if options.skip_download {
        args.push("--skip-download".to_string());
    }
    if let Some(format) = &options.format {
        args.push("-f".to_string());
        args.push(format.clone());
    }
    if let Some(container) = &options.merge_output_format {
        args.push("--merge-output-format".to_string());
        args.push(container.clone());
    }
    for pp in &options.postprocessors {
        args.extend(postprocessor_args(pp));
    }
    if let Some(template) = &options.outtmpl {
        args.push("-o".to_string());
        args.push(template.clone());
    }

    args
}

fn postprocessor_args(pp: &PostProcessor) -> Vec<String> {
    match pp.key.as_str() {
        "FFmpegExtractAudio" => vec![
            "-x".to_string(),
            "--audio-format".to_string(),
            pp.preferred_codec.clone(),
            "--audio-quality".to_string(),
            audio_quality_arg(&pp.preferred_quality),
        ],
        other => {
            warn!("Ignoring unsupported post-processor {}", other);
            Vec::new()
        }
    }
}

/// Values above 10 are bitrates in kbps, lower ones are VBR levels
fn audio_quality_arg(quality: &str) -> String {
    match quality.trim().parse::<u32>() {
        Ok(q) if q > 10 => format!("{}K", q),
        _ => quality.trim().to_string(),
    }
}

// URL goes after `--` so it is never parsed as a flag.
fn push_url(args: &mut Vec<String>, url: &str) {
    args.push("--".to_string());
    args.push(url.to_string());
}

fn stderr_text(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return "no error output".to_string();
    }
    lines.join("\n")
}
