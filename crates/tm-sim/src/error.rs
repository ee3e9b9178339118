use thiserror::Error;
use tm_core::{CoreError, PersonId};
use tm_disease::DiseaseError;
use tm_network::NetworkError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("model configuration error: {0}")]
    Config(String),

    #[error("{0} is scheduled or connected but not in the population")]
    UnknownPerson(PersonId),

    #[error("parameter error: {0}")]
    Core(#[from] CoreError),

    #[error("disease model error: {0}")]
    Disease(#[from] DiseaseError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),
}

pub type SimResult<T> = Result<T, SimError>;
