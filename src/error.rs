use thiserror::Error;

/// Failures inside the graph store gateway. A failed batch is safe to retry
/// wholesale because all writes are merge-upserts keyed on deterministic ids.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures in the extraction pipeline
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Semantic-pass output that violates the extraction schema. Recovered
    /// locally: the offending item is dropped and the document continues.
    #[error("semantic extraction produced invalid output: {0}")]
    InvalidSemanticOutput(String),

    #[error("recognizer failed: {0}")]
    Recognizer(String),

    #[error("semantic extraction call failed: {0}")]
    Semantic(String),

    /// Batch write into the graph store failed; the caller retries the batch.
    #[error("graph write failed: {0}")]
    Write(#[from] StoreError),
}

/// Failures in the traversal retriever
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// One strategy timed out or errored. The merger treats this as a zero
    /// contribution and the overall call proceeds.
    #[error("traversal strategy {strategy} failed: {message}")]
    Strategy { strategy: String, message: String },

    /// Every strategy failed, e.g. the graph store is unreachable. The
    /// caller should fall back to non-graph retrieval.
    #[error("graph retrieval unavailable: all traversal strategies failed")]
    Unavailable,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
