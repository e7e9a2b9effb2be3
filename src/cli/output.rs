//! Output formatting and progress display

use crate::cli::args::VerbosityLevel;
use crate::core::{format_bytes, Notice, NoticeLevel, Preset, Stage};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Output formatter for tubedrop
pub struct OutputFormatter {
    verbosity: VerbosityLevel,
    spinner: Option<ProgressBar>,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(verbosity: VerbosityLevel) -> Self {
        Self {
            verbosity,
            spinner: None,
        }
    }

    /// Create a spinner showing the current stage
    pub fn start_spinner(&mut self) -> Option<ProgressBar> {
        if self.verbosity == VerbosityLevel::Quiet {
            return None;
        }

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.set_message(Stage::Idle.describe());
        spinner.enable_steady_tick(Duration::from_millis(120));

        self.spinner = Some(spinner.clone());
        Some(spinner)
    }

    /// Stage observer that updates the spinner message
    pub fn stage_callback(&self) -> impl Fn(Stage) + Send + Sync + 'static {
        let spinner = self.spinner.clone();
        move |stage: Stage| {
            if let Some(spinner) = &spinner {
                spinner.set_message(stage.describe());
            }
        }
    }

    /// Finish the spinner
    pub fn finish_spinner(&self, message: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.finish_with_message(message.to_string());
        }
    }

    /// Print info message
    pub fn info(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("ℹ️  {}", message);
        }
    }

    /// Print success message
    pub fn success(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            println!("✅ {}", message.green());
        }
    }

    /// Print warning message
    pub fn warning(&self, message: &str) {
        if self.verbosity != VerbosityLevel::Quiet {
            eprintln!("⚠️  {}", message.yellow());
        }
    }

    /// Print error message
    pub fn error(&self, message: &str) {
        eprintln!("❌ {}", message.red().bold());
    }

    /// Print debug message
    pub fn debug(&self, message: &str) {
        if self.verbosity == VerbosityLevel::Verbose {
            println!("🐛 {}", message.dimmed());
        }
    }

    /// Print a notice at its own level
    pub fn notice(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Success => self.success(&notice.message),
            NoticeLevel::Warning => self.warning(&notice.message),
            NoticeLevel::Error => self.error(&notice.message),
        }
        if let Some(detail) = &notice.detail {
            self.debug(detail);
        }
    }

    /// Print the preset table
    pub fn print_presets(&self) {
        for preset in Preset::ALL {
            if self.verbosity == VerbosityLevel::Quiet {
                println!("{}", preset.id());
            } else {
                println!(
                    "{:<16} {:<5} {}",
                    preset.id().bold(),
                    preset.ext(),
                    preset.label()
                );
            }
        }
    }

    /// Print fetch start message
    pub fn print_fetch_start(&self, url: &str, preset: Preset) {
        if self.verbosity == VerbosityLevel::Quiet {
            return;
        }

        println!("🚀 Starting download...");
        println!("🔗 URL: {}", url.cyan());
        println!("📋 Preset: {}", preset.label());
        println!();
    }

    /// Print fetch complete message
    pub fn print_fetch_complete(&self, saved_to: &Path, size: u64, elapsed: Duration) {
        if self.verbosity == VerbosityLevel::Quiet {
            println!("{}", saved_to.display());
            return;
        }

        println!();
        println!("✅ {}", "Download completed!".green().bold());
        println!("💾 Saved to: {} ({})", saved_to.display(), format_bytes(size));
        println!("⏱️  Time: {}", format_elapsed(elapsed));
    }
}

/// Whole seconds, humantime style
fn format_elapsed(elapsed: Duration) -> String {
    humantime::format_duration(Duration::from_secs(elapsed.as_secs())).to_string()
}
