use thiserror::Error;

use tm_core::CoreError;

#[derive(Debug, Error)]
pub enum DiseaseError {
    #[error("disease configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type DiseaseResult<T> = Result<T, DiseaseError>;
