//! Per-application window selection.
//!
//! Applications frequently own several windows (helpers, palettes, hidden
//! frames). The scorer keeps one representative window per owner and orders
//! the result for presentation.

use crate::types::SourceDescriptor;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Composite ranking key; the greater key wins.
///
/// Fields compare in declaration order: importance, then area, then layer
/// (negated so lower layers rank higher), then title presence.
#[derive(Debug, Clone, Copy)]
pub struct RankKey {
    pub is_important: bool,
    pub area: f64,
    pub neg_layer: i64,
    pub has_title: bool,
}

impl RankKey {
    pub fn of(source: &SourceDescriptor) -> Self {
        Self {
            is_important: source.is_important_app,
            area: source.area(),
            neg_layer: source.layer.saturating_neg(),
            has_title: source.has_title(),
        }
    }
}

impl PartialEq for RankKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankKey {}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.is_important
            .cmp(&other.is_important)
            .then_with(|| self.area.total_cmp(&other.area))
            .then_with(|| self.neg_layer.cmp(&other.neg_layer))
            .then_with(|| self.has_title.cmp(&other.has_title))
    }
}

/// Selects the best window per owning application
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowScorer;

impl WindowScorer {
    pub fn new() -> Self {
        Self
    }

    /// Reduce to one window per `owner_app` and order the result.
    ///
    /// Screens pass through untouched ahead of the windows. Windows are
    /// ordered important-first, then by owner name.
    pub fn select(&self, sources: Vec<SourceDescriptor>) -> Vec<SourceDescriptor> {
        let mut screens = Vec::new();
        let mut best: Vec<SourceDescriptor> = Vec::new();
        let mut slot_by_owner: HashMap<String, usize> = HashMap::new();

        for source in sources {
            if !source.is_window() {
                screens.push(source);
                continue;
            }

            match slot_by_owner.get(&source.owner_app) {
                Some(&slot) => {
                    // Strictly greater: ties keep the earliest window
                    if RankKey::of(&source) > RankKey::of(&best[slot]) {
                        best[slot] = source;
                    }
                }
                None => {
                    slot_by_owner.insert(source.owner_app.clone(), best.len());
                    best.push(source);
                }
            }
        }

        best.sort_by(|a, b| {
            b.is_important_app
                .cmp(&a.is_important_app)
                .then_with(|| {
                    a.owner_app
                        .to_lowercase()
                        .cmp(&b.owner_app.to_lowercase())
                })
                .then_with(|| a.owner_app.cmp(&b.owner_app))
        });

        debug!(
            "Selected {} windows across {} applications, {} screens",
            best.len(),
            slot_by_owner.len(),
            screens.len()
        );

        screens.extend(best);
        screens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SourceId, SourceKind};
    use pretty_assertions::assert_eq;

    fn window(id: u64, owner: &str, title: &str, width: f64, height: f64) -> SourceDescriptor {
        SourceDescriptor::new(SourceId::Window(id), SourceKind::Window, owner, title)
            .with_bounds(width, height)
    }

    fn ids(sources: &[SourceDescriptor]) -> Vec<String> {
        sources.iter().map(|s| s.id.to_string()).collect()
    }

    #[test]
    fn test_larger_area_wins() {
        let picked = WindowScorer::new().select(vec![
            window(1, "Notes", "small", 400.0, 300.0),
            window(2, "Notes", "large", 1200.0, 900.0),
        ]);
        assert_eq!(ids(&picked), vec!["2"]);
    }

    #[test]
    fn test_equal_area_lower_layer_wins() {
        let picked = WindowScorer::new().select(vec![
            window(1, "Notes", "a", 800.0, 600.0).with_layer(3),
            window(2, "Notes", "b", 800.0, 600.0).with_layer(0),
            window(3, "Notes", "c", 800.0, 600.0).with_layer(8),
        ]);
        assert_eq!(ids(&picked), vec!["2"]);
    }

    #[test]
    fn test_title_breaks_final_tie() {
        let picked = WindowScorer::new().select(vec![
            window(1, "Notes", "", 800.0, 600.0),
            window(2, "Notes", "Todo", 800.0, 600.0),
        ]);
        assert_eq!(ids(&picked), vec!["2"]);
    }

    #[test]
    fn test_exact_tie_keeps_first() {
        let picked = WindowScorer::new().select(vec![
            window(1, "Notes", "a", 800.0, 600.0),
            window(2, "Notes", "b", 800.0, 600.0),
        ]);
        assert_eq!(ids(&picked), vec!["1"]);
    }

    #[test]
    fn test_importance_beats_area() {
        let small_important = {
            let mut w = window(1, "Slack", "", 100.0, 100.0);
            w.is_important_app = true;
            w
        };
        let key_a = RankKey::of(&small_important);
        let key_b = RankKey::of(&window(2, "Slack", "huge", 3000.0, 2000.0));
        assert!(key_a > key_b);
    }

    #[test]
    fn test_one_window_per_owner() {
        let picked = WindowScorer::new().select(vec![
            window(1, "Mail", "Inbox", 800.0, 600.0),
            window(2, "Notes", "a", 800.0, 600.0),
            window(3, "Mail", "Compose", 500.0, 400.0),
            window(4, "Notes", "b", 900.0, 600.0),
            window(5, "Calendar", "Week", 700.0, 600.0),
        ]);
        let owners: Vec<_> = picked.iter().map(|s| s.owner_app.as_str()).collect();
        assert_eq!(owners, vec!["Calendar", "Mail", "Notes"]);
        assert_eq!(ids(&picked), vec!["5", "1", "4"]);
    }

    #[test]
    fn test_important_apps_sorted_first() {
        let mut slack = window(1, "Slack", "general", 800.0, 600.0);
        slack.is_important_app = true;
        let picked = WindowScorer::new().select(vec![
            window(2, "Activity Monitor", "CPU", 800.0, 600.0),
            slack,
            window(3, "calculator", "", 400.0, 400.0),
        ]);
        let owners: Vec<_> = picked.iter().map(|s| s.owner_app.as_str()).collect();
        assert_eq!(owners, vec!["Slack", "Activity Monitor", "calculator"]);
    }

    #[test]
    fn test_screens_pass_through() {
        let screen = SourceDescriptor::new(
            SourceId::Native("screen:1".into()),
            SourceKind::Screen,
            "Notes",
            "Display",
        );
        let picked = WindowScorer::new().select(vec![
            window(1, "Notes", "a", 800.0, 600.0),
            screen.clone(),
        ]);
        assert_eq!(picked.len(), 2);
        assert_eq!(picked[0], screen);
        assert_eq!(ids(&picked[1..]), vec!["1"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(WindowScorer::new().select(Vec::new()).is_empty());
    }
}
