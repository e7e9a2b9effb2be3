//! The fetch pipeline: validate, probe, download, locate

use crate::core::options::ExtractorOptions;
use crate::core::preset::Preset;
use crate::core::progress::{Notice, NoticeLevel, Stage};
use crate::download::{create_workspace, locate_output, LocatedOutput};
use crate::extractor::Extractor;
use crate::utils::{host_of, title_or_fallback, validate_video_url, FALLBACK_TITLE};
use crate::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

/// Callback invoked on every stage transition
pub type StageObserver = Arc<dyn Fn(Stage) + Send + Sync>;

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub url: String,
    pub preset: Preset,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, preset: Preset) -> Self {
        Self {
            url: url.into(),
            preset,
        }
    }
}

/// A finished fetch, ready for delivery.
///
/// Owns the temporary directory; dropping the outcome removes the file.
#[derive(Debug)]
pub struct FetchOutcome {
    pub workspace: TempDir,
    pub output: LocatedOutput,
    /// Sanitized title the file was named after
    pub title: String,
    pub preset: Preset,
    pub notices: Vec<Notice>,
}

impl FetchOutcome {
    /// Warning recorded when the metadata probe failed
    pub fn probe_warning(&self) -> Option<&Notice> {
        self.notices
            .iter()
            .find(|n| n.level == NoticeLevel::Warning)
    }

    /// Copy the delivered file into `dir` under its user-facing name
    pub async fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let destination = dir.join(&self.output.filename);
        tokio::fs::copy(&self.output.path, &destination).await?;
        Ok(destination)
    }
}

/// Runs one fetch per call against an [`Extractor`]
pub struct Downloader {
    extractor: Arc<dyn Extractor>,
    temp_root: Option<PathBuf>,
    observer: Option<StageObserver>,
}

impl Downloader {
    /// Create a downloader using the system temp directory
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self {
            extractor,
            temp_root: None,
            observer: None,
        }
    }

    /// Create per-request workspaces under `root`
    pub fn with_temp_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.temp_root = Some(root.into());
        self
    }

    /// Report stage transitions to `observer`
    pub fn with_observer(mut self, observer: impl Fn(Stage) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    fn enter(&self, stage: Stage) {
        debug!(stage = %stage, "Entering stage");
        if let Some(observer) = &self.observer {
            observer(stage);
        }
    }

    /// Fetch `request.url` with `request.preset` into a fresh workspace
    pub async fn fetch(&self, request: &FetchRequest) -> Result<FetchOutcome> {
        match self.run(request).await {
            Ok(outcome) => {
                self.enter(Stage::Delivering);
                Ok(outcome)
            }
            Err(e) => {
                self.enter(Stage::Failed);
                error!("Fetch of {} failed: {}", request.url.trim(), e);
                Err(e)
            }
        }
    }

    async fn run(&self, request: &FetchRequest) -> Result<FetchOutcome> {
        self.enter(Stage::ValidatingInput);
        let url = validate_video_url(&request.url)?;
        let preset = request.preset;
        info!(
            "Starting fetch from {} as {}",
            host_of(&url).unwrap_or_default(),
            preset.id()
        );

        let workspace = create_workspace(self.temp_root.as_deref())?;
        let mut notices = Vec::new();

        self.enter(Stage::ProbingMetadata);
        let (title, probe_warning) = self.probe_title(&url).await;
        notices.extend(probe_warning);

        self.enter(Stage::Fetching);
        let options = ExtractorOptions::for_preset(preset, workspace.path(), &title);
        debug!("Options bundle: {:?}", options);
        self.extractor.download(&url, &options).await?;

        self.enter(Stage::LocatingOutput);
        let output = locate_output(workspace.path(), &title, preset.ext())?;
        info!("Fetched {:?} ({})", output.filename, preset.id());
        notices.push(Notice::success(format!(
            "「{}」のダウンロードが完了しました！",
            output.filename
        )));

        Ok(FetchOutcome {
            workspace,
            output,
            title,
            preset,
            notices,
        })
    }

    /// Probe the title; never fails, falls back to the placeholder title instead
    pub async fn probe_title(&self, url: &str) -> (String, Option<Notice>) {
        match self
            .extractor
            .extract_info(url, &ExtractorOptions::probe())
            .await
        {
            Ok(info) => (title_or_fallback(info.title()), None),
            Err(e) => {
                warn!("Metadata probe failed, using '{}': {}", FALLBACK_TITLE, e);
                let notice = Notice::warning(format!(
                    "動画タイトルの取得に失敗しました。デフォルトのファイル名を使用します。エラー: {}",
                    e
                ));
                (FALLBACK_TITLE.to_string(), Some(notice))
            }
        }
    }
}
