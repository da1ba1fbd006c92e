//! The `clarity analyze` command: triage one URL from the terminal.

use clap::Args;
use clarity_core::config::ProviderKind;
use clarity_core::{Clarity, Config};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image URL to triage
    pub url: String,

    /// Blur threshold (overrides `analysis.blur_threshold`)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Vision model to use instead of the configured one
    #[arg(short, long)]
    pub model: Option<String>,

    /// Skip the LLM; sharp images get the fallback description
    #[arg(long)]
    pub no_description: bool,

    /// Pretty-print the JSON result
    #[arg(long)]
    pub pretty: bool,
}

/// Execute the analyze command.
pub async fn execute(args: AnalyzeArgs, config: Config) -> anyhow::Result<()> {
    let config = apply_overrides(config, &args)?;
    let clarity = Clarity::new(config)?;
    tracing::debug!(
        threshold = clarity.config().analysis.blur_threshold,
        provider = %clarity.config().llm.provider,
        "Analyzing {}",
        args.url
    );

    let spinner = create_spinner(&args.url);
    let result = clarity.triage(&args.url).await;
    spinner.finish_and_clear();

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{json}");

    if !result.is_success() {
        tracing::debug!("Triage of {} ended in an error result", args.url);
    }

    Ok(())
}

/// Fold CLI flags into the loaded config.
fn apply_overrides(mut config: Config, args: &AnalyzeArgs) -> anyhow::Result<Config> {
    if let Some(threshold) = args.threshold {
        if !threshold.is_finite() || threshold < 0.0 {
            anyhow::bail!("--threshold must be a finite, non-negative number (got {threshold})");
        }
        config.analysis.blur_threshold = threshold;
    }
    if let Some(model) = &args.model {
        config.llm.model = Some(model.clone());
    }
    if args.no_description {
        config.llm.provider = ProviderKind::None;
    }
    Ok(config)
}

/// Spinner on stderr so stdout stays clean JSON.
fn create_spinner(url: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("triaging {url}"));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
