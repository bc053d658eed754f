use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use daybook_agent::DailyEngine;
use daybook_core::{dates, DaybookConfig, FileStore};
use daybook_llm::providers::{DeepSeekClient, MockProvider};
use daybook_llm::LlmClient;
use daybook_moltbook::MoltbookClient;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Daybook — recurring daily growth-log agent", long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "daybook.toml")]
    config: String,

    /// Run for a specific date (YYYY-MM-DD) instead of today
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Skip publishing even when the config enables it
    #[arg(long)]
    no_publish: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = DaybookConfig::load_or_default(&args.config);
    let today = args.date.unwrap_or_else(dates::today);

    let store = FileStore::new(&config.run.data_dir);

    let llm: Arc<dyn LlmClient> = match config.llm.provider.as_str() {
        "deepseek" => Arc::new(DeepSeekClient::new(
            &config.llm.model,
            config.llm.base_url.as_deref(),
        )?),
        "mock" => Arc::new(MockProvider::new(vec![])),
        other => anyhow::bail!("Unknown LLM provider: {other}"),
    };

    let publisher = if config.moltbook.enabled && !args.no_publish {
        Some(MoltbookClient::new(
            &config.moltbook.base_url,
            &config.moltbook.submolt,
        )?)
    } else {
        info!("Publishing disabled, running pipeline only");
        None
    };

    let engine = DailyEngine::new(config, store, llm, publisher);
    let summary = engine.run(today).await?;

    info!(
        "Cycle {} complete: post \"{}\", repaired={}, published={}, created={:?}, updated={:?}, rejected={:?}, downgraded={:?}",
        summary.date,
        summary.post_title,
        summary.repaired,
        summary.published,
        summary.outcome.created,
        summary.outcome.updated,
        summary.outcome.rejected,
        summary.outcome.downgraded,
    );

    Ok(())
}
