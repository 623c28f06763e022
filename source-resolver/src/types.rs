//! Core types used throughout the source resolver.
//!
//! This module defines the normalized source descriptor, the wire records
//! produced by the enumeration channels, and the error types for strategies
//! and the deprecated capture path.

use crate::registry::AppRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Window-server window number
pub type WindowId = u64;

/// Opaque identifier handed to the capture layer.
///
/// Placeholder ids are random per enumeration call. Callers must not expect
/// the same application to keep its placeholder id across calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum SourceId {
    /// Real window number reported by the window server
    Window(WindowId),
    /// Stand-in generated by a low-fidelity strategy
    Placeholder(Uuid),
    /// Identifier minted by the host's native surfaces API
    Native(String),
}

impl SourceId {
    /// Generate a fresh placeholder id
    pub fn placeholder() -> Self {
        SourceId::Placeholder(Uuid::new_v4())
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, SourceId::Placeholder(_))
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceId::Window(id) => write!(f, "{}", id),
            SourceId::Placeholder(uuid) => write!(f, "placeholder:{}", uuid),
            SourceId::Native(id) => f.write_str(id),
        }
    }
}

/// Kind of capturable surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Window,
    Screen,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Window => "window",
            SourceKind::Screen => "screen",
        }
    }
}

/// Window position and size in OS points
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SourceBounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SourceBounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Normalized record describing one capturable window or screen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDescriptor {
    pub id: SourceId,
    pub kind: SourceKind,
    /// Owning process name as reported by the OS
    pub owner_app: String,
    /// Raw window title, possibly empty
    pub title: String,
    /// Absent on low-fidelity enumeration paths
    pub bounds: Option<SourceBounds>,
    /// Compositing layer, lower is closer to the normal window layer
    pub layer: i64,
    /// False may mean minimized or on another Space
    pub on_screen: bool,
    pub is_important_app: bool,
}

impl SourceDescriptor {
    pub fn new(id: SourceId, kind: SourceKind, owner_app: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            owner_app: owner_app.into(),
            title: title.into(),
            bounds: None,
            layer: 0,
            on_screen: false,
            is_important_app: false,
        }
    }

    pub fn with_bounds(mut self, width: f64, height: f64) -> Self {
        self.bounds = Some(SourceBounds::new(0.0, 0.0, width, height));
        self
    }

    pub fn with_layer(mut self, layer: i64) -> Self {
        self.layer = layer;
        self
    }

    /// `width × height`, or 0 without geometry
    pub fn area(&self) -> f64 {
        self.bounds.map(|b| b.area()).unwrap_or(0.0)
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn is_window(&self) -> bool {
        self.kind == SourceKind::Window
    }
}

/// Window record as emitted by the auxiliary helper process
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWindowRecord {
    pub window_id: WindowId,
    pub app_name: String,
    #[serde(default)]
    pub window_title: Option<String>,
    #[serde(default)]
    pub bounds: Option<RawBounds>,
    #[serde(default, alias = "isOnScreen")]
    pub is_onscreen: bool,
    #[serde(default)]
    pub layer: i64,
}

/// Quartz-style bounds dictionary (`X`, `Y`, `Width`, `Height`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawBounds {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

impl RawWindowRecord {
    /// Normalize into a descriptor, marking important applications
    pub fn into_descriptor(self, registry: &AppRegistry) -> SourceDescriptor {
        let is_important_app = registry.is_important(&self.app_name);
        SourceDescriptor {
            id: SourceId::Window(self.window_id),
            kind: SourceKind::Window,
            title: self.window_title.unwrap_or_default(),
            bounds: self
                .bounds
                .map(|b| SourceBounds::new(b.x, b.y, b.width, b.height)),
            layer: self.layer,
            on_screen: self.is_onscreen,
            is_important_app,
            owner_app: self.app_name,
        }
    }
}

/// Entry returned by the host's native "all capturable surfaces" API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeSource {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
    pub name: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_icon: Option<String>,
}

impl NativeSource {
    pub fn window(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: SourceKind::Window,
            name: name.into(),
            thumbnail: String::new(),
            app_icon: None,
        }
    }

    pub fn screen(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::Screen,
            ..Self::window(id, name)
        }
    }
}

/// One entry per logical application, as produced by the grouper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupedSource {
    #[serde(flatten)]
    pub source: NativeSource,
    pub app_name: String,
}

/// Errors a single enumeration strategy can report.
///
/// These never escape the orchestrator; they are logged and treated as an
/// empty result.
#[derive(Debug, thiserror::Error)]
pub enum EnumerationError {
    #[error("Strategy not supported on this platform")]
    Unsupported,

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Process exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Malformed output: {0}")]
    MalformedOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the capture entry points
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("capture by window id is deprecated (window {window_id}); select a source from the enumerated list instead")]
    Deprecated { window_id: WindowId },
}
