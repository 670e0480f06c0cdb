//! Error types for hidden-line generation.

use thiserror::Error;

/// Errors that can occur during hidden-line generation.
///
/// Geometric degeneracies and empty intersection results are not errors;
/// they are silently skipped so the algorithm stays total over all
/// floating-point inputs. Only malformed inputs and cancellation
/// terminate a run.
#[derive(Error, Debug)]
pub enum HlrError {
    /// Mesh has no triangles.
    #[error("mesh is empty")]
    EmptyMesh,

    /// Projection direction has (near) zero length.
    #[error("projection vector has zero length")]
    InvalidProjection,

    /// Index buffer references a vertex outside the position buffer.
    #[error("index buffer references vertex {0} but mesh has {1} vertices")]
    IndexOutOfBounds(u32, usize),

    /// Invalid generation options.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// The cooperative task observed a cancellation signal.
    #[error("generation was cancelled")]
    Cancelled,
}

/// Result type for hidden-line operations.
pub type Result<T> = std::result::Result<T, HlrError>;
