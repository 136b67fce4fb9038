//! featview core library
//!
//! Trace model, scale engine, settings and feature types for the featview
//! feature-track engine.

pub mod colors;
pub mod error;
pub mod feature;
pub mod model;
pub mod scale;
pub mod sequence;
pub mod settings;
pub mod trace;

// Re-export commonly used types
pub use error::{Result, ViewerError};
pub use feature::{CurveType, DsspCode, DsspShape, Feature, FeatureKind, FeatureStyle, Span};
pub use model::TraceModel;
pub use scale::{recompute_y_scale, Band, LinearScale, OrdinalScale, RowKey, ZoomTransform};
pub use sequence::Sequence;
pub use settings::{BackgroundHeight, PartialSettings, Settings};
pub use trace::{Domain, FeatureKey, InternalTrace, Trace, TraceId, TraceOptions, TracePosition};

/// Version information for the featview core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
