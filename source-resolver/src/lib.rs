//! Source Resolver - capture-source enumeration and deduplication
//!
//! This crate answers "which windows and screens can the user record?" on
//! desktops where the native picker is noisy or incomplete:
//!
//! - **Enumeration**: ordered fallback across OS strategies (window-server
//!   helper, then System Events scripting)
//! - **Filtering**: drops OS chrome, the host app itself and tiny or
//!   high-layer windows
//! - **Scoring**: keeps the single best window per application
//! - **Grouping**: collapses native picker surfaces into one entry per
//!   logical application using title heuristics
//!
//! # Architecture
//!
//! [`EnumerationOrchestrator`] runs each [`EnumerationStrategy`] under a
//! deadline. Full-fidelity output goes through [`SourceFilter`] and
//! [`WindowScorer`]; coarse output is restricted to important apps. The
//! first strategy that yields anything wins.

pub mod capture;
pub mod config;
pub mod filter;
pub mod grouper;
pub mod orchestrator;
pub mod registry;
pub mod scorer;
pub mod strategies;
pub mod types;

// Re-export commonly used types
#[allow(deprecated)]
pub use capture::capture_window_by_id;
pub use config::Config;
pub use filter::{SourceFilter, ALWAYS_DENIED_PROCESSES};
pub use grouper::{ApplicationGrouper, SurfaceFilter, TitlePattern, TitleRule};
pub use orchestrator::EnumerationOrchestrator;
pub use registry::AppRegistry;
pub use scorer::WindowScorer;
pub use strategies::{EnumerationStrategy, Fidelity};
pub use types::{
    CaptureError, EnumerationError, GroupedSource, NativeSource, RawWindowRecord, SourceBounds,
    SourceDescriptor, SourceId, SourceKind, WindowId,
};
