use crate::app_state::AppState;
use crate::artifacts::LoadedArtifacts;
use crate::config::AppConfig;
use crate::fields::FEATURE_COLUMNS;
use crate::pipeline::InferenceContext;
use crate::request::RawRequest;
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level CLI interface
#[derive(Parser)]
#[command(
    name = "obesity_predictor",
    version,
    about = "Obesity level prediction front-end"
)]
pub struct Cli {
    /// Configuration file (defaults to $OBESITY_CONFIG, then obesity.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the prediction form and JSON API
    Serve {
        /// Host/IP to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run one prediction from a JSON file of field values
    Predict {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Load the artifacts and report what was loaded
    Check,

    /// Print the feature column order the model expects
    Columns,

    /// Print the effective configuration
    Config,
}

pub async fn dispatch(command: Commands, mut config: AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            config.validate()?;

            let context = InferenceContext::load(&config.artifact_paths());
            let state = Arc::new(AppState::new(context));
            crate::web::serve(state, &config.bind_address()).await
        }
        Commands::Predict { input } => {
            let content = std::fs::read_to_string(&input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            let raw: RawRequest = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a JSON object of field values", input.display()))?;

            let context = InferenceContext::load(&config.artifact_paths());
            let prediction = context.submit(&raw)?;
            println!("Prediction: {}", prediction.label);
            println!("{}", serde_json::to_string_pretty(&prediction)?);
            Ok(())
        }
        Commands::Check => {
            let artifacts = LoadedArtifacts::load(&config.artifact_paths())?;
            println!("Model: {}", artifacts.predictor.describe());
            for info in &artifacts.info {
                println!(
                    "{:<18} {} ({} bytes) sha256={}",
                    info.name,
                    info.path.display(),
                    info.size_bytes,
                    info.sha256
                );
            }
            println!("Labels: {}", artifacts.labels.labels().join(", "));
            for table in artifacts.encoders.tables() {
                println!("{:<32} {}", table.field(), table.classes().join(", "));
            }
            Ok(())
        }
        Commands::Columns => {
            for (idx, column) in FEATURE_COLUMNS.iter().enumerate() {
                println!("{idx:>2} {column}");
            }
            Ok(())
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
