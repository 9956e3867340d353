//! Error taxonomy for the question-resolution pipeline

use thiserror::Error;

/// Classified failure from the text-generation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider authentication failed: {0}")]
    Auth(String),

    #[error("provider call timed out after {0}s")]
    Timeout(u64),

    #[error("provider rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("provider returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("provider network error: {0}")]
    Network(String),
}

/// Failure along the model-generation path. Any of these switches the
/// resolver to the deterministic fallback rules.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("la IA no generó una consulta SQL válida. Respuesta: {response}")]
    InvalidGeneration { response: String },
}
