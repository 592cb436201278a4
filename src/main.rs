use prediction_engine::{ModelRegistry, Predictor};
use rcc_core::{AppConfig, CoreError, ErrorReporter};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), CoreError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("rcc=info,web_app=info,prediction_engine=info")),
        )
        .init();

    tracing::info!("Starting Reddit comment classifier");

    let reporter = ErrorReporter::new();
    let result = run().await;
    if let Err(e) = &result {
        reporter.report_error(e);
    }
    result
}

async fn run() -> Result<(), CoreError> {
    let config = AppConfig::load()?;

    let registry = ModelRegistry::load(&config.server.subreddits_path, &config.server.models_path)?;
    tracing::info!(
        "Loaded models for {} communities",
        registry.communities().len()
    );

    let predictor = Arc::new(build_predictor(registry)?);
    web_app::serve(&config.server, predictor).await
}

#[cfg(not(feature = "transformer"))]
fn build_predictor(registry: ModelRegistry) -> Result<Predictor, CoreError> {
    Ok(Predictor::new(Arc::new(registry)))
}

#[cfg(feature = "transformer")]
fn build_predictor(registry: ModelRegistry) -> Result<Predictor, CoreError> {
    use feature_engine::{
        CommentFeatureExtractor, Lemmatizer, LexiconSentimentScorer, StopwordList,
        TransformerSentimentScorer,
    };
    use rcc_core::ModelError;

    let scorer = TransformerSentimentScorer::new(LexiconSentimentScorer::english()).map_err(|e| {
        ModelError::InvalidArtifact {
            path: "rust-bert sentiment model".to_string(),
            details: e.to_string(),
        }
    })?;
    let extractor = CommentFeatureExtractor::new(
        Box::new(scorer),
        Lemmatizer::new(),
        StopwordList::all_languages(),
    );
    Ok(Predictor::with_extractor(Arc::new(registry), extractor))
}
