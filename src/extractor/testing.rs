//! Scripted extractor for tests

use crate::core::{ExtractorOptions, VideoInfo, EXT_PLACEHOLDER};
use crate::error::TubedropError;
use crate::extractor::Extractor;
use crate::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// What the probe call does
#[derive(Debug, Clone)]
pub(crate) enum Probe {
    Title(String),
    Untitled,
    Fail,
}

/// A file the download call leaves behind
#[derive(Debug, Clone)]
pub(crate) enum Output {
    /// Fill the output template with this extension
    Ext(String),
    /// Write a file with exactly this name next to the template
    Named(String),
}

/// Bytes written into every produced file
pub(crate) const MEDIA_BYTES: &[u8] = b"not really media";

#[derive(Debug)]
pub(crate) struct ScriptedExtractor {
    probe: Probe,
    outputs: Vec<Output>,
    fail_download: bool,
    probes: Mutex<Vec<(String, ExtractorOptions)>>,
    downloads: Mutex<Vec<(String, ExtractorOptions)>>,
}

impl ScriptedExtractor {
    pub(crate) fn new(probe: Probe, outputs: Vec<Output>) -> Self {
        Self {
            probe,
            outputs,
            fail_download: false,
            probes: Mutex::new(Vec::new()),
            downloads: Mutex::new(Vec::new()),
        }
    }

    /// Probe succeeds with `title`, download produces `<title>.<ext>`
    pub(crate) fn producing(title: &str, ext: &str) -> Self {
        Self::new(Probe::Title(title.to_string()), vec![Output::Ext(ext.to_string())])
    }

    pub(crate) fn failing_download(mut self) -> Self {
        self.fail_download = true;
        self
    }

    pub(crate) fn probe_calls(&self) -> Vec<(String, ExtractorOptions)> {
        self.probes.lock().unwrap().clone()
    }

    pub(crate) fn download_calls(&self) -> Vec<(String, ExtractorOptions)> {
        self.downloads.lock().unwrap().clone()
    }
}

fn fill_template(template: &str, ext: &str) -> PathBuf {
    PathBuf::from(template.replace(EXT_PLACEHOLDER, ext).replace("%%", "%"))
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    async fn extract_info(&self, url: &str, options: &ExtractorOptions) -> Result<VideoInfo> {
        self.probes
            .lock()
            .unwrap()
            .push((url.to_string(), options.clone()));

        match &self.probe {
            Probe::Title(title) => Ok(VideoInfo::with_title(title.clone())),
            Probe::Untitled => Ok(VideoInfo::default()),
            Probe::Fail => Err(TubedropError::ExtractorFailed {
                status: "exit status: 1".to_string(),
                stderr: "ERROR: probe refused".to_string(),
            }),
        }
    }

    async fn download(&self, url: &str, options: &ExtractorOptions) -> Result<()> {
        self.downloads
            .lock()
            .unwrap()
            .push((url.to_string(), options.clone()));

        if self.fail_download {
            return Err(TubedropError::ExtractorFailed {
                status: "exit status: 1".to_string(),
                stderr: "ERROR: Unsupported URL".to_string(),
            });
        }

        let template = options.outtmpl.as_deref().unwrap_or("%(ext)s");
        let dir = Path::new(template)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        for output in &self.outputs {
            let path = match output {
                Output::Ext(ext) => fill_template(template, ext),
                Output::Named(name) => dir.join(name),
            };
            tokio::fs::write(&path, MEDIA_BYTES).await?;
        }

        Ok(())
    }
}
