use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid authentication challenge: {0:?}")]
    Challenge(String),
    #[error("the challenge has no {0} parameter")]
    MissingParameter(&'static str),
    #[error("{scheme} engine failed: {reason}")]
    Engine {
        scheme: &'static str,
        reason: String,
    },
    #[error("the {0} scheme needs an engine supplied by the caller")]
    EngineRequired(String),
    #[error("invalid configuration")]
    Config(#[from] toml::de::Error),
}
