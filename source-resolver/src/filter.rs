//! Source filtering ahead of scoring.
//!
//! This module drops entries that can never be a useful capture target:
//! - OS shell and UI-chrome processes, plus configured deny patterns
//! - The host application's own windows
//! - Windows too small or on too high a layer to be content windows
//! - Untitled, unrecognized windows that are not large enough to matter

use crate::config::FilterConfig;
use crate::types::SourceDescriptor;
use tracing::{debug, trace};

/// OS shell processes that are always dropped and cannot be re-allowed.
pub const ALWAYS_DENIED_PROCESSES: &[&str] = &[
    "SystemUIServer",
    "Dock",
    "ControlCenter",
    "WindowManager",
    "NotificationCenter",
    "Spotlight",
];

/// Filter applied to full-fidelity enumeration output
#[derive(Debug, Clone)]
pub struct SourceFilter {
    config: FilterConfig,
    /// Compiled patterns for denied owners
    denied_patterns: Vec<glob::Pattern>,
    /// Names the host process is known by
    host_names: Vec<String>,
}

impl SourceFilter {
    /// Create a new filter with the given configuration
    pub fn new(config: FilterConfig) -> Self {
        let denied_patterns = config
            .denied_apps
            .iter()
            .filter_map(|pattern| {
                glob::Pattern::new(pattern)
                    .map_err(|e| {
                        tracing::warn!("Invalid denied app pattern '{}': {}", pattern, e);
                        e
                    })
                    .ok()
            })
            .collect();

        let mut host_names = config.host_app_names.clone();
        if let Some(name) = current_process_name() {
            host_names.push(name);
        }

        Self {
            config,
            denied_patterns,
            host_names,
        }
    }

    /// Check if an owner is in the static OS shell deny-list
    pub fn is_always_denied(owner_app: &str) -> bool {
        ALWAYS_DENIED_PROCESSES.iter().any(|&denied| denied == owner_app)
    }

    /// Check if the owner is the host application itself
    pub fn is_host(&self, owner_app: &str) -> bool {
        self.host_names.iter().any(|name| name == owner_app)
    }

    /// Check if entries owned by this application must be dropped
    pub fn is_denied(&self, owner_app: &str) -> bool {
        if Self::is_always_denied(owner_app) {
            trace!("'{}' is an OS shell process", owner_app);
            return true;
        }

        if self.is_host(owner_app) {
            trace!("'{}' is the host application", owner_app);
            return true;
        }

        for pattern in &self.denied_patterns {
            if pattern.matches(owner_app) {
                trace!("'{}' denied by pattern '{}'", owner_app, pattern);
                return true;
            }
        }
        false
    }

    /// Decide whether a single descriptor survives filtering
    pub fn should_keep(&self, source: &SourceDescriptor) -> bool {
        if self.is_denied(&source.owner_app) {
            return false;
        }

        // Screens are not subject to the window heuristics
        if !source.is_window() {
            return true;
        }

        let (width, height) = source
            .bounds
            .map(|b| (b.width, b.height))
            .unwrap_or((0.0, 0.0));

        if source.bounds.is_some()
            && (width < self.config.min_width || height < self.config.min_height)
        {
            return false;
        }

        if source.layer > self.config.max_layer {
            return false;
        }

        source.is_important_app
            || source.has_title()
            || (width > self.config.large_window_width
                && height > self.config.large_window_height)
    }

    /// Apply the filter, preserving input order
    pub fn apply(&self, sources: Vec<SourceDescriptor>) -> Vec<SourceDescriptor> {
        let before = sources.len();
        let kept: Vec<_> = sources
            .into_iter()
            .filter(|source| {
                let keep = self.should_keep(source);
                if !keep {
                    trace!(
                        "Dropped {} '{}' ({})",
                        source.kind.as_str(),
                        source.title,
                        source.owner_app
                    );
                }
                keep
            })
            .collect();
        debug!("Filter kept {} of {} sources", kept.len(), before);
        kept
    }
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

/// File stem of the running executable
fn current_process_name() -> Option<String> {
    std::env::current_exe()
        .ok()?
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
}
