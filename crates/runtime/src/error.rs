use sigil_engine::EngineError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("no engine registered for chain {0}")]
    UnknownChain(u64),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
