//! Network error type.

use thiserror::Error;

use tm_core::{EdgeId, PersonId};

use crate::EdgeType;

/// Errors produced by `tm-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("{0} is not a vertex of the network")]
    VertexNotFound(PersonId),

    #[error("{0} is already a vertex of the network")]
    DuplicateVertex(PersonId),

    #[error("{0} not found in network")]
    EdgeNotFound(EdgeId),

    #[error("self-loop on {0}")]
    SelfLoop(PersonId),

    #[error("{kind} edge between {v1} and {v2} already exists")]
    DuplicateEdge { v1: PersonId, v2: PersonId, kind: EdgeType },
}

pub type NetworkResult<T> = Result<T, NetworkError>;
