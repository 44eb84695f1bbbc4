//! Cipherscope CLI
//!
//! Command-line interface for the ciphertext scheme classifier: an offline
//! `train` subcommand that produces a model artifact, and a `serve`
//! subcommand that resolves an artifact and answers inference requests over
//! HTTP.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::path::PathBuf;
use tracing::{error, info};

use cipherscope::{
    corpus, store, ClassifierModel, ForestConfig, Predictor, ServerConfig, StoreConfig,
    TrainingConfig,
};

/// Version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "cipherscope")]
#[command(about = "Statistical ciphertext scheme classifier", version = VERSION)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true, env = "CIPHERSCOPE_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve inference over HTTP
    Serve {
        /// Listen address
        #[arg(long, default_value = "127.0.0.1:5001", env = "CIPHERSCOPE_LISTEN")]
        listen: String,

        /// Primary model artifact path
        #[arg(
            long,
            default_value = "model/cipherscope.model",
            env = "CIPHERSCOPE_MODEL"
        )]
        model: PathBuf,

        /// Legacy model artifact path, tried when the primary is unusable
        #[arg(
            long,
            default_value = "model/cipherscope-legacy.model",
            env = "CIPHERSCOPE_LEGACY_MODEL"
        )]
        legacy_model: PathBuf,
    },

    /// Train a model on a synthetic corpus and write the artifact
    Train {
        /// Training examples generated per scheme class
        #[arg(long, default_value = "300", env = "CIPHERSCOPE_SAMPLES")]
        samples: usize,

        /// Seed for corpus synthesis, the split, and tree growth
        #[arg(long, default_value = "42", env = "CIPHERSCOPE_SEED")]
        seed: u64,

        /// Number of trees in the ensemble
        #[arg(long, default_value = "200", env = "CIPHERSCOPE_TREES")]
        trees: usize,

        /// Maximum tree depth
        #[arg(long, default_value = "10", env = "CIPHERSCOPE_MAX_DEPTH")]
        max_depth: usize,

        /// Where to write the model artifact
        #[arg(
            long,
            default_value = "model/cipherscope.model",
            env = "CIPHERSCOPE_MODEL"
        )]
        output: PathBuf,
    },
}

/// Install panic hook for production diagnostics
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| {
                panic_info
                    .payload()
                    .downcast_ref::<String>()
                    .map(|s| s.as_str())
            })
            .unwrap_or("Unknown panic payload");

        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        // eprintln because tracing may not work during panic
        eprintln!("PANIC: cipherscope panicked at {}: {}", location, payload);
        error!(
            panic_payload = %payload,
            panic_location = %location,
            "cipherscope panicked"
        );

        default_hook(panic_info);
    }));
}

fn train(config: &TrainingConfig) -> Result<()> {
    info!(
        samples_per_class = config.samples_per_class,
        seed = config.forest.seed,
        trees = config.forest.num_trees,
        max_depth = config.forest.max_depth,
        "Generating training corpus"
    );

    let mut rng = ChaCha20Rng::seed_from_u64(config.forest.seed);
    let dataset = corpus::generate(config.samples_per_class, &mut rng);

    let (model, report) = ClassifierModel::fit(&dataset, &config.forest)?;
    println!("{report}");

    store::save_model(&config.output, &model)?;
    info!(output = %config.output.display(), "Training complete");

    // Spot-check the fitted model on known samples
    let predictor = Predictor::fitted(model);
    for sample in ["RIJVSUYVJN", "ZEBBWTBOBW", "HWEOLRLLDO", "8f9a3b1c0e7d9f4d"] {
        let prediction = predictor.predict(sample)?;
        info!(
            sample = sample,
            algorithm = %prediction.algorithm,
            confidence = prediction.confidence,
            "Spot check"
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    install_panic_hook();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("{}={}", env!("CARGO_CRATE_NAME"), log_level))
        .init();

    info!(version = VERSION, "Starting cipherscope");

    match cli.command {
        Command::Serve {
            listen,
            model,
            legacy_model,
        } => {
            let store_config = StoreConfig {
                primary_path: model,
                legacy_path: legacy_model,
            };

            // Resolve the classifier before accepting any traffic; a missing
            // artifact degrades to the heuristic, never to a dead server.
            let outcome = store::resolve(&store_config.primary_path, &store_config.legacy_path);
            let predictor = Predictor::from_outcome(outcome);
            info!(
                mode = predictor.mode().as_str(),
                listen = %listen,
                "Predictor resolved"
            );

            cipherscope::server::serve(predictor, &ServerConfig { listen }).await
        }
        Command::Train {
            samples,
            seed,
            trees,
            max_depth,
            output,
        } => {
            let config = TrainingConfig {
                samples_per_class: samples,
                forest: ForestConfig {
                    num_trees: trees,
                    max_depth,
                    seed,
                    ..ForestConfig::default()
                },
                output,
            };
            train(&config)
        }
    }
}
