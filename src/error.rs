// vertex_core/src/error.rs
//
// Library-surfaced error paths. These cover construction-time
// misconfiguration only; once a component is running, capacity or
// invariant violations are fatal (see DESIGN.md open question (a)) rather
// than propagated as `Result`, matching the exchange's own `ASSERT`/`FATAL`
// posture.

use thiserror::Error;

/// Construction-time failures for a fixed-capacity `Pool`.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("pool capacity must be non-zero")]
    ZeroCapacity,
}

#[derive(Debug, Error)]
pub enum VertexError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("queue capacity must be non-zero")]
    ZeroCapacityQueue,

    #[error("failed to open log file {path}: {source}")]
    LogFileOpen {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type VertexResult<T> = Result<T, VertexError>;
pub type PoolResult<T> = Result<T, PoolError>;
