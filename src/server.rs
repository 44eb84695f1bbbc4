//! Inference HTTP Server
//!
//! Thin JSON wrapper around the [`Predictor`]: it decodes requests, rounds
//! the numeric fields for display, and maps the error taxonomy onto HTTP
//! status codes. No classification logic lives here.
//!
//! Endpoints:
//!   POST /predict     — classify a ciphertext sample
//!   GET  /algorithms  — the closed set of classes the backend supports
//!   GET  /health      — liveness plus which backend tier is serving
//!
//! All responses are JSON. CORS is open for local development.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::ServerConfig;
use crate::predictor::{PredictError, Prediction, Predictor};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<Predictor>,
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Missing ciphertext is treated the same as empty: invalid input
    #[serde(default)]
    pub ciphertext: String,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub algorithm: String,
    pub confidence: f64,
    pub algorithm_probabilities: BTreeMap<String, f64>,
    pub features: FeaturesDto,
}

/// Feature echo with display rounding applied
#[derive(Debug, Serialize)]
pub struct FeaturesDto {
    pub length: u64,
    pub alpha_ratio: f64,
    pub digit_ratio: f64,
    pub symbol_ratio: f64,
    pub entropy: f64,
    pub ic: f64,
    pub chi_square: f64,
}

#[derive(Debug, Serialize)]
pub struct AlgorithmsResponse {
    pub algorithms: Vec<String>,
    pub description: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub model: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl PredictResponse {
    /// Rounding here is presentation only; the predictor's contract is
    /// unrounded probabilities in [0, 1].
    fn from_prediction(prediction: Prediction) -> Self {
        let algorithm_probabilities = prediction
            .probabilities
            .iter()
            .map(|(scheme, p)| (scheme.as_str().to_string(), round_to(p * 100.0, 1)))
            .collect();

        let f = prediction.features;
        Self {
            algorithm: prediction.algorithm.as_str().to_string(),
            confidence: round_to(prediction.confidence, 2),
            algorithm_probabilities,
            features: FeaturesDto {
                length: f.length as u64,
                alpha_ratio: round_to(f.alpha_ratio, 2),
                digit_ratio: round_to(f.digit_ratio, 2),
                symbol_ratio: round_to(f.symbol_ratio, 2),
                entropy: round_to(f.entropy, 2),
                ic: round_to(f.index_of_coincidence, 3),
                chi_square: round_to(f.chi_square, 1),
            },
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Build the router with all routes and the CORS layer applied
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/predict", post(handle_predict))
        .route("/algorithms", get(handle_algorithms))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state)
}

/// Bind the listener and serve until SIGINT/SIGTERM.
///
/// The predictor is fully resolved before this is called, so no request can
/// observe a partially initialized backend.
pub async fn serve(predictor: Predictor, config: &ServerConfig) -> anyhow::Result<()> {
    let state = AppState {
        predictor: Arc::new(predictor),
    };

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    info!(listen = %config.listen, "Inference server listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Inference server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())
        .expect("failed to register SIGINT handler");
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .expect("failed to register SIGTERM handler");

    tokio::select! {
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
    }
}

async fn handle_predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> impl IntoResponse {
    match state.predictor.predict(&request.ciphertext) {
        Ok(prediction) => {
            info!(
                algorithm = %prediction.algorithm,
                confidence = prediction.confidence,
                length = prediction.features.length,
                "Prediction served"
            );
            (
                StatusCode::OK,
                Json(PredictResponse::from_prediction(prediction)),
            )
                .into_response()
        }
        Err(e @ PredictError::EmptyCiphertext) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
            .into_response(),
    }
}

async fn handle_algorithms(State(state): State<AppState>) -> impl IntoResponse {
    Json(AlgorithmsResponse {
        algorithms: state
            .predictor
            .algorithms()
            .iter()
            .map(|s| s.as_str().to_string())
            .collect(),
        description: "Supported cipher scheme classes",
    })
}

async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        service: "cipherscope",
        model: state.predictor.mode().as_str(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;
    use crate::predictor::Prediction;
    use crate::schemes::CipherScheme;

    fn sample_prediction() -> Prediction {
        Prediction {
            algorithm: CipherScheme::Substitution,
            confidence: 0.61234,
            probabilities: vec![
                (CipherScheme::Vigenere, 0.1),
                (CipherScheme::Substitution, 0.61234),
                (CipherScheme::Transposition, 0.18766),
                (CipherScheme::Modern, 0.1),
            ],
            features: FeatureVector {
                length: 10.0,
                alpha_ratio: 1.0,
                digit_ratio: 0.0,
                symbol_ratio: 0.0,
                entropy: 2.921928,
                index_of_coincidence: 0.044444,
                chi_square: 123.456,
            },
        }
    }

    #[test]
    fn test_response_rounding() {
        let response = PredictResponse::from_prediction(sample_prediction());

        assert_eq!(response.algorithm, "Substitution");
        assert_eq!(response.confidence, 0.61);
        assert_eq!(response.features.length, 10);
        assert_eq!(response.features.entropy, 2.92);
        assert_eq!(response.features.ic, 0.044);
        assert_eq!(response.features.chi_square, 123.5);
    }

    #[test]
    fn test_probabilities_are_percentages_summing_to_one_hundred() {
        let response = PredictResponse::from_prediction(sample_prediction());

        assert_eq!(response.algorithm_probabilities.len(), 4);
        let sum: f64 = response.algorithm_probabilities.values().sum();
        assert!((sum - 100.0).abs() <= 0.5, "sum {sum} outside tolerance");
        assert_eq!(response.algorithm_probabilities["Substitution"], 61.2);
    }

    #[test]
    fn test_missing_ciphertext_defaults_to_empty() {
        let request: PredictRequest = serde_json::from_str("{}").unwrap();
        assert!(request.ciphertext.is_empty());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.6149, 2), 0.61);
        assert_eq!(round_to(0.625, 2), 0.63);
        assert_eq!(round_to(12.34, 1), 12.3);
    }
}
