//! Error taxonomy for the featview engine
//!
//! Configuration faults (negative or inconsistent sizes) never surface here:
//! they are clamped and logged where they are detected. What remains are
//! consistency faults between the trace model and its consumers, and
//! malformed input documents.

use thiserror::Error;

use crate::trace::TraceId;

/// Main error type for featview operations
#[derive(Error, Debug)]
pub enum ViewerError {
    /// A scale or render pass referenced a trace id the model does not hold.
    #[error("Trace {id} not found in the trace model")]
    TraceNotFound { id: TraceId },

    #[error("Feature {index} not found in trace {trace}")]
    FeatureNotFound { trace: TraceId, index: usize },

    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ViewerError {
    pub fn trace_not_found(id: TraceId) -> Self {
        Self::TraceNotFound { id }
    }

    pub fn feature_not_found(trace: TraceId, index: usize) -> Self {
        Self::FeatureNotFound { trace, index }
    }

    pub fn invalid_document<S: Into<String>>(message: S) -> Self {
        Self::InvalidDocument { message: message.into() }
    }

    /// Consistency faults mean the model and a consumer have diverged.
    pub fn is_consistency_fault(&self) -> bool {
        matches!(self, Self::TraceNotFound { .. } | Self::FeatureNotFound { .. })
    }
}

/// Result type for featview operations
pub type Result<T> = std::result::Result<T, ViewerError>;
