use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use topicast::artifacts::bundle::ArtifactBundle;
use topicast::config::{Backend, Config};
use topicast::engine::traits::TopicPredictor;

/// Topicast: multi-label topic classification for short texts.
///
/// Prepares training artifacts, serves the hosted scoring endpoint, and runs
/// the keyed prediction API in front of it.
#[derive(Parser)]
#[command(name = "topicast", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the keyed prediction API (POST /predict/)
    Serve {
        /// Port to listen on (default: 8000)
        #[arg(long, default_value = "8000")]
        port: u16,

        /// Address to bind (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },

    /// Run the scoring endpoint over the local artifact bundle (POST /score)
    ServeScoring {
        /// Port to listen on (default: 8001)
        #[arg(long, default_value = "8001")]
        port: u16,

        /// Address to bind (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },

    /// Fit the vectorizer and label codec, build the topic mapping, and
    /// write the training matrix
    Prepare {
        /// Labelled corpus, JSON lines: {"text": "...", "topics": [0, 3]}
        #[arg(long)]
        corpus: PathBuf,

        /// Topic table, JSON lines: {"topic": "Topic 3", "terms": "a,b,c"}
        #[arg(long)]
        topics: PathBuf,

        /// Where to write the artifacts (default: TOPICAST_ARTIFACT_DIR)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Vocabulary size cap (default: 20000)
        #[arg(long, default_value = "20000")]
        max_features: usize,

        /// Drop English stop words before counting
        #[arg(long)]
        stop_words: bool,
    },

    /// Predict topics for one or more texts with the local artifact bundle
    Predict {
        /// Texts to classify
        #[arg(required = true)]
        texts: Vec<String>,

        /// Print the raw JSON instead of the formatted view
        #[arg(long)]
        json: bool,
    },

    /// Exact-match accuracy of the local bundle on a labelled corpus
    Evaluate {
        /// Labelled corpus, JSON lines (same format as `prepare`)
        #[arg(long)]
        corpus: PathBuf,
    },

    /// Show configuration and artifact status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("topicast=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            config.require_api_key()?;
            config.require_backend()?;

            // The predictor (and any bundle behind it) is fully built before
            // the listener binds.
            let predictor = create_predictor(&config)?;
            let state = topicast::web::AppState {
                predictor,
                config: Arc::new(config),
            };
            topicast::web::run_server(state, port, &bind).await?;
        }

        Commands::ServeScoring { port, bind } => {
            let config = Config::load()?;
            config.require_artifacts()?;
            let bundle = load_bundle(&config)?;
            let state = topicast::web::AppState {
                predictor: Arc::new(topicast::engine::local::LocalPredictor::new(bundle)),
                config: Arc::new(config),
            };
            topicast::web::run_scoring_server(state, port, &bind).await?;
        }

        Commands::Prepare {
            corpus,
            topics,
            output_dir,
            max_features,
            stop_words,
        } => {
            let config = Config::load()?;
            let output_dir = output_dir.unwrap_or_else(|| config.artifact_dir.clone());

            let corpus_rows: Vec<topicast::pipeline::corpus::CorpusRow> =
                topicast::pipeline::corpus::read_jsonl(&corpus)?;
            let topic_rows: Vec<topicast::labels::mapping::TopicRow> =
                topicast::pipeline::corpus::read_jsonl(&topics)?;
            println!(
                "Preparing {} documents and {} topic rows...",
                corpus_rows.len(),
                topic_rows.len()
            );

            let params = topicast::features::vectorizer::VectorizerParams {
                max_features,
                english_stop_words: stop_words,
            };
            let prepared = topicast::pipeline::prepare::prepare(&corpus_rows, &topic_rows, params)?;

            let manifest = topicast::artifacts::save_preprocessing(
                &output_dir,
                &prepared.vectorizer,
                &prepared.codec,
                &prepared.mapping,
            )?;

            println!("\nWriting training matrix...");
            let matrix_path = output_dir.join(topicast::artifacts::TRAINING_MATRIX_FILE);
            topicast::pipeline::prepare::write_training_matrix(
                &matrix_path,
                &prepared.features,
                &prepared.labels,
                &prepared.codec,
                true,
            )?;

            println!("\n{}", "=== Preprocessing complete ===".bold());
            println!("  Run:        {}", manifest.run_id);
            println!("  Vocabulary: {} terms", manifest.n_features);
            println!("  Topics:     {}", manifest.n_labels);
            println!("  Mapped:     {}", prepared.mapping.len());
            println!("  Output:     {}", output_dir.display());
            println!(
                "\n{}",
                format!(
                    "Train the classifier on {} and export it to {} to complete the bundle.",
                    matrix_path.display(),
                    output_dir.join(topicast::artifacts::CLASSIFIER_FILE).display()
                )
                .dimmed()
            );
        }

        Commands::Predict { texts, json } => {
            let config = Config::load()?;
            config.require_artifacts()?;
            let bundle = load_bundle(&config)?;
            let predictor = topicast::engine::local::LocalPredictor::new(bundle);
            let results = predictor.predict(&texts).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                topicast::output::terminal::display_predictions(&results);
            }
        }

        Commands::Evaluate { corpus } => {
            let config = Config::load()?;
            config.require_artifacts()?;
            let bundle = load_bundle(&config)?;
            let rows: Vec<topicast::pipeline::corpus::CorpusRow> =
                topicast::pipeline::corpus::read_jsonl(&corpus)?;

            println!("Evaluating {} rows...", rows.len());
            let report = tokio::task::spawn_blocking(move || {
                topicast::pipeline::evaluate::evaluate(&bundle, &rows)
            })
            .await
            .context("evaluation task panicked")??;
            topicast::output::terminal::display_evaluation(&report);
        }

        Commands::Status => {
            let config = Config::load()?;
            topicast::status::show(&config);
        }
    }

    Ok(())
}

/// Load the artifact bundle. Any missing or unreadable member aborts.
fn load_bundle(config: &Config) -> Result<Arc<ArtifactBundle>> {
    let bundle = ArtifactBundle::load(&config.artifact_dir).with_context(|| {
        format!(
            "Failed to load artifact bundle from {}",
            config.artifact_dir.display()
        )
    })?;
    Ok(Arc::new(bundle))
}

/// Build the predictor for the configured backend.
fn create_predictor(config: &Config) -> Result<Arc<dyn TopicPredictor>> {
    let predictor: Arc<dyn TopicPredictor> = match config.backend {
        Backend::Remote => {
            info!(endpoint = %config.remote_endpoint, "Using remote scoring endpoint");
            Arc::new(topicast::engine::remote::RemotePredictor::new(
                config.remote_endpoint.clone(),
                config.remote_api_key.clone(),
            ))
        }
        Backend::Local => {
            info!(dir = %config.artifact_dir.display(), "Using in-process artifact bundle");
            Arc::new(topicast::engine::local::LocalPredictor::new(load_bundle(
                config,
            )?))
        }
        Backend::Mock => {
            tracing::warn!("Using MOCK predictor: responses are random and not model output");
            Arc::new(topicast::engine::mock::MockPredictor::new())
        }
    };
    Ok(predictor)
}
