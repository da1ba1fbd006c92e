//! Pipeline orchestration - fetch, score, branch, describe.
//!
//! ```text
//! FETCHING ──fail──────────────────────────────► ERROR
//!    │
//!    ▼
//! ANALYZING ──blurry──► BLURRY_DONE
//!    │
//!    ▼
//! DESCRIBING ─────────► DONE
//! ```
//!
//! Every call produces exactly one [`AnalysisResult`]. Fetch failures and
//! anything unexpected (including panics below this point) become an error
//! result; nothing is returned as `Err` and nothing unwinds to the caller.

use futures_util::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::error::{PipelineError, PipelineResult};
use crate::llm::{DescribeOptions, Describer, ProviderFactory};
use crate::types::{AnalysisRequest, AnalysisResult};

use super::blur::BlurAnalyzer;
use super::fetch::{HttpFetcher, ImageSource};

/// Stages a triage call moves through, for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageStage {
    Fetching,
    Analyzing,
    BlurryDone,
    Describing,
    Done,
    Error,
}

impl fmt::Display for TriageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TriageStage::Fetching => "FETCHING",
            TriageStage::Analyzing => "ANALYZING",
            TriageStage::BlurryDone => "BLURRY_DONE",
            TriageStage::Describing => "DESCRIBING",
            TriageStage::Done => "DONE",
            TriageStage::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Sequences fetch, blur analysis and description into one result.
///
/// Holds no per-request state; share it behind an `Arc` across tasks.
pub struct TriageProcessor {
    source: Arc<dyn ImageSource>,
    analyzer: BlurAnalyzer,
    describer: Describer,
}

impl TriageProcessor {
    /// Build the production pipeline from configuration.
    ///
    /// A description backend that can't be constructed degrades to fallback
    /// text instead of failing here.
    pub fn new(config: &Config) -> PipelineResult<Self> {
        let source = HttpFetcher::new(&config.fetch)?;
        let provider = ProviderFactory::create_or_unavailable(&config.llm, config.llm.model.as_deref());
        Ok(Self::with_components(
            Box::new(source),
            BlurAnalyzer::new(config.analysis.blur_threshold),
            Describer::new(provider, DescribeOptions::from(&config.llm)),
        ))
    }

    pub fn with_components(
        source: Box<dyn ImageSource>,
        analyzer: BlurAnalyzer,
        describer: Describer,
    ) -> Self {
        Self {
            source: Arc::from(source),
            analyzer,
            describer,
        }
    }

    pub fn analyzer(&self) -> &BlurAnalyzer {
        &self.analyzer
    }

    pub fn describer(&self) -> &Describer {
        &self.describer
    }

    pub async fn process(&self, request: &AnalysisRequest) -> AnalysisResult {
        self.triage(&request.url).await
    }

    /// Run the full pipeline for one URL.
    pub async fn triage(&self, url: &str) -> AnalysisResult {
        let start = Instant::now();

        let outcome = AssertUnwindSafe(self.run(url)).catch_unwind().await;
        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::debug!(url, stage = %TriageStage::Error, "Triage failed: {e}");
                AnalysisResult::error(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(url, stage = %TriageStage::Error, "Triage panicked: {message}");
                AnalysisResult::error(PipelineError::Unexpected { message }.to_string())
            }
        };

        match &result {
            AnalysisResult::Success {
                is_blur,
                blur_score,
                ..
            } => tracing::info!(
                url,
                is_blur,
                blur_score,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Triage complete"
            ),
            AnalysisResult::Error { message } => tracing::warn!(
                url,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Triage error: {message}"
            ),
        }
        result
    }

    async fn run(&self, url: &str) -> PipelineResult<AnalysisResult> {
        tracing::debug!(url, stage = %TriageStage::Fetching, "Fetching image");
        let bytes = self.source.fetch(url).await?;

        tracing::debug!(
            url,
            stage = %TriageStage::Analyzing,
            bytes = bytes.len(),
            "Scoring sharpness"
        );
        let verdict = self.analyzer.analyze_blocking(bytes).await?;

        if verdict.is_blur {
            tracing::debug!(
                url,
                stage = %TriageStage::BlurryDone,
                score = verdict.score,
                "Image too blurry"
            );
            return Ok(AnalysisResult::blurry(verdict.score));
        }

        tracing::debug!(
            url,
            stage = %TriageStage::Describing,
            score = verdict.score,
            "Requesting description"
        );
        let description = self.describer.describe(url).await;

        tracing::debug!(url, stage = %TriageStage::Done, "Description attached");
        Ok(AnalysisResult::sharp(verdict.score, description))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
