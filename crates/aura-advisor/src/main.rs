//! `aura-advisor` command-line front end.
//!
//! ```bash
//! AURA_API_KEY=sk-or-... aura-advisor chat "Is it normal to feel tired during my period?"
//! aura-advisor --lang hi mood --entries moods.json
//! aura-advisor --config advisor.toml risk --context assessment.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use aura_advisor::{AdvisorConfig, ConversationTurn, HealthAdvisor, Language, MoodEntry, RiskContext};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing::info;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file (overrides AURA_* environment variables)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Response language code (`en`, `hi`)
    #[arg(long, global = true, default_value = "en")]
    lang: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask a free-form health question
    Chat {
        query: String,
        /// JSON array of prior `{ "userText", "botText" }` turns
        #[arg(long)]
        history: Option<PathBuf>,
        /// JSON risk assessment to tailor the answer to
        #[arg(long)]
        risk: Option<PathBuf>,
    },
    /// Summarize a mood history
    Mood {
        /// JSON array of `{ "date": "YYYY-MM-DD", "mood": "..." }` entries
        #[arg(long)]
        entries: PathBuf,
    },
    /// Explain a computed risk assessment
    Risk {
        /// JSON risk assessment
        #[arg(long)]
        context: PathBuf,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).context(format!("Failed to parse {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => AdvisorConfig::from_file(path)?,
        None => {
            let config = AdvisorConfig::from_env();
            config.validate().map_err(anyhow::Error::msg)?;
            config
        }
    };
    let language = Language::from_code(&args.lang);

    info!(
        endpoint = %config.endpoint_url,
        models = ?config.models,
        credential = config.has_credential(),
        language = language.code(),
        "Aura advisor starting"
    );

    let advisor = HealthAdvisor::from_config(config).context("Failed to build advisor")?;

    let advice = match args.command {
        Command::Chat {
            query,
            history,
            risk,
        } => {
            let history: Vec<ConversationTurn> = match history {
                Some(path) => read_json(&path)?,
                None => Vec::new(),
            };
            let risk: Option<RiskContext> = risk.map(|path| read_json(&path)).transpose()?;
            advisor
                .generate_health_advice(&query, &history, language, risk.as_ref())
                .await
        }
        Command::Mood { entries } => {
            let entries: Vec<MoodEntry> = read_json(&entries)?;
            advisor.summarize_mood_patterns(&entries, language).await
        }
        Command::Risk { context } => {
            let risk: RiskContext = read_json(&context)?;
            advisor.generate_symptom_advice(&risk, language).await
        }
    };

    println!("{advice}");
    Ok(())
}
