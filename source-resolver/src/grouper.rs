//! Title-based application grouping.
//!
//! The host's native surface enumeration reports one entry per window with
//! only a title to go on. The grouper collapses those titles into one entry
//! per application as a user would name it, e.g. every "… | Microsoft Teams"
//! chat window becomes a single "Microsoft Teams" entry.
//!
//! Named applications are recognized through a rule table; everything else
//! goes through separator heuristics on the raw title.

use crate::config::GroupingConfig;
use crate::types::{GroupedSource, NativeSource, SourceKind};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::trace;

const EM_DASH_SEPARATOR: &str = " — ";
const HYPHEN_SEPARATOR: &str = " - ";
const TEAMS_LABEL: &str = "Microsoft Teams";

lazy_static! {
    // Any dash, used to cut overly long titles down to their first segment
    static ref LEADING_SEGMENT: Regex = Regex::new(r"[-—]").unwrap();

    static ref STARTS_UPPERCASE: Regex = Regex::new(r"^[A-Z]").unwrap();

    static ref STARTS_WITH_DIGIT: Regex = Regex::new(r"^[0-9]").unwrap();
}

/// A single predicate over a raw window title
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitlePattern {
    Contains(String),
    EndsWith(String),
    /// Every fragment must be present
    ContainsAll(Vec<String>),
}

impl TitlePattern {
    pub fn matches(&self, title: &str) -> bool {
        match self {
            TitlePattern::Contains(needle) => title.contains(needle.as_str()),
            TitlePattern::EndsWith(suffix) => title.ends_with(suffix.as_str()),
            TitlePattern::ContainsAll(needles) => {
                !needles.is_empty() && needles.iter().all(|n| title.contains(n.as_str()))
            }
        }
    }
}

/// Maps matching titles to a fixed application label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleRule {
    pub app_label: String,
    /// Higher priorities are evaluated first
    #[serde(default)]
    pub priority: i32,
    /// The rule matches when any pattern matches
    pub patterns: Vec<TitlePattern>,
}

impl TitleRule {
    pub fn new(app_label: &str, priority: i32, patterns: Vec<TitlePattern>) -> Self {
        Self {
            app_label: app_label.to_string(),
            priority,
            patterns,
        }
    }

    pub fn matches(&self, title: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(title))
    }
}

fn contains(s: &str) -> TitlePattern {
    TitlePattern::Contains(s.to_string())
}

fn ends_with(s: &str) -> TitlePattern {
    TitlePattern::EndsWith(s.to_string())
}

/// Built-in rules for applications with recognizable title conventions
pub fn default_title_rules() -> Vec<TitleRule> {
    vec![
        TitleRule::new(
            TEAMS_LABEL,
            80,
            vec![
                contains("Microsoft Teams"),
                contains("MSTeams"),
                TitlePattern::ContainsAll(vec![
                    "Chat |".to_string(),
                    "| Microsoft Teams".to_string(),
                ]),
            ],
        ),
        TitleRule::new("WeChat", 70, vec![contains("WeChat"), contains("微信")]),
        TitleRule::new("Slack", 60, vec![contains("Slack")]),
        TitleRule::new(
            "Google Chrome",
            50,
            vec![contains("Google Chrome"), ends_with(" - Chrome")],
        ),
        TitleRule::new("Safari", 40, vec![contains("Safari"), ends_with(" — Safari")]),
        TitleRule::new(
            "Visual Studio Code",
            30,
            vec![contains("Visual Studio Code"), ends_with(" - Code")],
        ),
        TitleRule::new("iTerm", 25, vec![contains("iTerm")]),
        TitleRule::new("Terminal", 20, vec![contains("Terminal")]),
    ]
}

/// Which surface kinds to show
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceFilter {
    #[default]
    All,
    Windows,
    Screens,
}

impl SurfaceFilter {
    pub fn matches(&self, kind: SourceKind) -> bool {
        match self {
            SurfaceFilter::All => true,
            SurfaceFilter::Windows => kind == SourceKind::Window,
            SurfaceFilter::Screens => kind == SourceKind::Screen,
        }
    }

    pub fn retain(&self, sources: Vec<GroupedSource>) -> Vec<GroupedSource> {
        sources
            .into_iter()
            .filter(|s| self.matches(s.source.kind))
            .collect()
    }
}

impl FromStr for SurfaceFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SurfaceFilter::All),
            "windows" => Ok(SurfaceFilter::Windows),
            "screens" => Ok(SurfaceFilter::Screens),
            other => Err(format!("unknown surface filter '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum GroupKey {
    Screen(String),
    App(String),
}

/// Collapses native window entries into one entry per application
#[derive(Debug, Clone)]
pub struct ApplicationGrouper {
    rules: Vec<TitleRule>,
    name_length_cap: usize,
    long_title_threshold: usize,
}

impl ApplicationGrouper {
    pub fn new(config: GroupingConfig) -> Self {
        let mut rules = config.rules;
        // Stable: equal priorities keep table order
        rules.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self {
            rules,
            name_length_cap: config.name_length_cap,
            long_title_threshold: config.long_title_threshold,
        }
    }

    pub fn rules(&self) -> &[TitleRule] {
        &self.rules
    }

    /// First rule matching the title, in priority order
    pub fn matching_rule(&self, title: &str) -> Option<&TitleRule> {
        self.rules.iter().find(|rule| rule.matches(title))
    }

    /// Derive the application name a user would recognize from a raw title
    pub fn canonical_name(&self, title: &str) -> String {
        if let Some(rule) = self.matching_rule(title) {
            return rule.app_label.clone();
        }

        let mut name = title;

        if title.contains(EM_DASH_SEPARATOR) {
            if let Some(last) = title.rsplit(EM_DASH_SEPARATOR).next() {
                if !last.is_empty() && char_len(last) < self.name_length_cap {
                    name = last;
                }
            }
        } else if title.contains(HYPHEN_SEPARATOR) {
            if let Some(last) = title.rsplit(HYPHEN_SEPARATOR).next() {
                if self.looks_like_app_name(last) {
                    name = last;
                }
            }
        }

        if name == title && char_len(title) > self.long_title_threshold {
            let first = LEADING_SEGMENT.split(title).next().unwrap_or("").trim();
            if !first.is_empty() && char_len(first) < self.name_length_cap {
                name = first;
            }
        }

        name.to_string()
    }

    /// Trailing hyphen segments must look like a name, not a file or version
    fn looks_like_app_name(&self, segment: &str) -> bool {
        !segment.is_empty()
            && char_len(segment) < self.name_length_cap
            && STARTS_UPPERCASE.is_match(segment)
            && !segment.contains('.')
            && !segment.contains('/')
            && !STARTS_WITH_DIGIT.is_match(segment)
    }

    /// Group sources, keeping first-seen order of each application
    pub fn group(&self, sources: &[NativeSource]) -> Vec<GroupedSource> {
        let mut entries: Vec<GroupedSource> = Vec::new();
        let mut slots: HashMap<GroupKey, usize> = HashMap::new();

        for source in sources {
            let (key, app_name) = match source.kind {
                SourceKind::Screen => (GroupKey::Screen(source.id.clone()), source.name.clone()),
                SourceKind::Window => {
                    let name = self.canonical_name(&source.name);
                    (GroupKey::App(name.clone()), name)
                }
            };

            let candidate = GroupedSource {
                source: source.clone(),
                app_name,
            };

            match slots.get(&key) {
                None => {
                    slots.insert(key, entries.len());
                    entries.push(candidate);
                }
                Some(&slot) => {
                    let replace = match source.kind {
                        SourceKind::Screen => true,
                        SourceKind::Window => prefer_candidate(
                            &candidate.app_name,
                            &entries[slot].source.name,
                            &source.name,
                        ),
                    };
                    if replace {
                        trace!(
                            "'{}' replaces '{}' for {}",
                            source.name,
                            entries[slot].source.name,
                            candidate.app_name
                        );
                        entries[slot] = candidate;
                    }
                }
            }
        }

        entries
    }
}

impl Default for ApplicationGrouper {
    fn default() -> Self {
        Self::new(GroupingConfig::default())
    }
}

/// Merge policy for two windows that canonicalize to the same application
fn prefer_candidate(app_name: &str, existing: &str, candidate: &str) -> bool {
    if app_name == TEAMS_LABEL {
        return prefer_teams_candidate(existing, candidate);
    }

    let is_main = |title: &str| title == app_name || title.ends_with(app_name);
    match (is_main(candidate), is_main(existing)) {
        (true, false) => true,
        (false, false) => char_len(candidate) < char_len(existing),
        _ => false,
    }
}

/// Teams: the MSTeams main window beats chat windows, chats beat the rest
fn prefer_teams_candidate(existing: &str, candidate: &str) -> bool {
    let candidate_main = candidate.contains("MSTeams");
    let existing_main = existing.contains("MSTeams");
    let candidate_chat = candidate.contains("Chat |");
    let existing_chat = existing.contains("Chat |");

    if candidate_main && !existing_main {
        true
    } else if !candidate_main && existing_main {
        false
    } else if candidate_chat && !existing_chat {
        true
    } else {
        char_len(candidate) < char_len(existing)
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn canonical(title: &str) -> String {
        ApplicationGrouper::default().canonical_name(title)
    }

    fn group_names(titles: &[&str]) -> Vec<(String, String)> {
        let sources: Vec<_> = titles
            .iter()
            .enumerate()
            .map(|(i, t)| NativeSource::window(format!("window:{}:0", i), *t))
            .collect();
        ApplicationGrouper::default()
            .group(&sources)
            .into_iter()
            .map(|g| (g.app_name, g.source.name))
            .collect()
    }

    #[test]
    fn test_named_rules() {
        assert_eq!(canonical("Project X — Visual Studio Code"), "Visual Studio Code");
        assert_eq!(canonical("lib.rs - Code"), "Visual Studio Code");
        assert_eq!(canonical("Chat | Alice | Microsoft Teams"), "Microsoft Teams");
        assert_eq!(canonical("MSTeams"), "Microsoft Teams");
        assert_eq!(canonical("微信"), "WeChat");
        assert_eq!(canonical("general (Channel) - Acme - Slack"), "Slack");
        assert_eq!(canonical("Docs - Google Chrome"), "Google Chrome");
        assert_eq!(canonical("Inbox - Chrome"), "Google Chrome");
        assert_eq!(canonical("Apple — Safari"), "Safari");
        assert_eq!(canonical("zsh — iTerm2"), "iTerm");
        assert_eq!(canonical("user@host: ~ — Terminal"), "Terminal");
    }

    #[test]
    fn test_rule_priority_order() {
        // Mentions both; Teams outranks Slack
        assert_eq!(canonical("Slack integration - Microsoft Teams"), "Microsoft Teams");
    }

    #[test]
    fn test_em_dash_suffix() {
        assert_eq!(canonical("Inbox — Mail"), "Mail");
        assert_eq!(canonical("a — b — Preview"), "Preview");
    }

    #[test]
    fn test_em_dash_suffix_too_long() {
        let title = "Draft — an extremely long trailing segment";
        assert_eq!(canonical(title), title);
    }

    #[test]
    fn test_hyphen_suffix() {
        assert_eq!(canonical("notes.txt - Sublime Text"), "Sublime Text");
    }

    #[test]
    fn test_hyphen_suffix_guards() {
        // Lowercase
        assert_eq!(canonical("todo - draft"), "todo - draft");
        // Filename
        assert_eq!(canonical("Budget - Q3.xlsx"), "Budget - Q3.xlsx");
        // Path
        assert_eq!(canonical("Project - Docs/Archive"), "Project - Docs/Archive");
        // Version
        assert_eq!(canonical("Release - 2024"), "Release - 2024");
    }

    #[test]
    fn test_plain_title_unchanged() {
        assert_eq!(canonical("report_v2_final.pdf"), "report_v2_final.pdf");
    }

    #[test]
    fn test_long_title_truncated_to_first_segment() {
        let title = "Weekly sync - action items, owners and follow-ups for Q3 launch";
        assert_eq!(canonical(title), "Weekly sync");

        let title = "Mail — A very long trailing segment that is over thirty";
        assert_eq!(canonical(title), "Mail");
    }

    #[test]
    fn test_long_title_without_short_segment() {
        let title = "A very long window title without any separators at all here";
        assert_eq!(canonical(title), title);
    }

    #[test]
    fn test_main_window_preferred() {
        let grouped = group_names(&["Slack | general | Acme", "Slack | random", "Acme - Slack"]);
        assert_eq!(grouped, vec![("Slack".to_string(), "Acme - Slack".to_string())]);
    }

    #[test]
    fn test_shorter_sub_window_preferred() {
        let grouped = group_names(&["Slack | general | Acme", "Slack | random"]);
        assert_eq!(grouped, vec![("Slack".to_string(), "Slack | random".to_string())]);
    }

    #[test]
    fn test_existing_main_window_kept() {
        let grouped = group_names(&["Draft — Mail", "Mail"]);
        assert_eq!(grouped, vec![("Mail".to_string(), "Draft — Mail".to_string())]);
    }

    #[test]
    fn test_teams_main_window_beats_chat() {
        let grouped = group_names(&["Chat | Alice | Microsoft Teams", "MSTeams"]);
        assert_eq!(grouped[0].1, "MSTeams");

        let grouped = group_names(&["MSTeams", "Chat | Bob | Microsoft Teams"]);
        assert_eq!(grouped[0].1, "MSTeams");
    }

    #[test]
    fn test_teams_chat_beats_generic() {
        let grouped = group_names(&["Microsoft Teams", "Chat | Bob | Microsoft Teams"]);
        assert_eq!(grouped[0].1, "Chat | Bob | Microsoft Teams");
    }

    #[test]
    fn test_teams_shorter_chat_wins() {
        let grouped = group_names(&["Chat | Alexandra | Microsoft Teams", "Chat | Bo | Microsoft Teams"]);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].1, "Chat | Bo | Microsoft Teams");
    }

    #[test]
    fn test_screens_pass_through() {
        let sources = vec![
            NativeSource::screen("screen:1:0", "Entire Screen"),
            NativeSource::window("window:1:0", "Inbox — Mail"),
            NativeSource::screen("screen:2:0", "Entire Screen"),
        ];
        let grouped = ApplicationGrouper::default().group(&sources);
        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0].source.id, "screen:1:0");
        assert_eq!(grouped[2].source.id, "screen:2:0");
        assert_eq!(grouped[0].app_name, "Entire Screen");
    }

    #[test]
    fn test_first_seen_order_is_kept() {
        let grouped = group_names(&["Inbox — Mail", "Docs - Google Chrome", "Draft — Mail"]);
        let names: Vec<_> = grouped.iter().map(|(app, _)| app.as_str()).collect();
        assert_eq!(names, vec!["Mail", "Google Chrome"]);
    }

    #[test]
    fn test_regrouping_is_idempotent() {
        let grouper = ApplicationGrouper::default();
        let sources: Vec<_> = [
            "Project X — Visual Studio Code",
            "notes.txt - Sublime Text",
            "report_v2_final.pdf",
            "Chat | Alice | Microsoft Teams",
            "Inbox — Mail",
            "Weekly sync - action items, owners and follow-ups for Q3 launch",
        ]
        .iter()
        .enumerate()
        .map(|(i, t)| NativeSource::window(format!("window:{}:0", i), *t))
        .collect();

        // Canonicalized input: one entry per app, name == appName
        let canonical: Vec<_> = grouper
            .group(&sources)
            .into_iter()
            .map(|g| NativeSource {
                name: g.app_name,
                ..g.source
            })
            .collect();

        let once = grouper.group(&canonical);
        let twice = grouper.group(
            &once.iter().map(|g| g.source.clone()).collect::<Vec<_>>(),
        );
        assert_eq!(once, twice);
        assert!(once.iter().all(|g| g.app_name == g.source.name));
    }

    #[test]
    fn test_custom_rule_table() {
        let config = GroupingConfig {
            rules: vec![TitleRule::new("Ghostty", 1, vec![ends_with(" - Ghostty")])],
            ..Default::default()
        };
        let grouper = ApplicationGrouper::new(config);
        assert_eq!(grouper.canonical_name("~/src - ghostty"), "~/src - ghostty");
        assert_eq!(grouper.canonical_name("vim - Ghostty"), "Ghostty");
        // Built-in rules are replaced, not merged
        assert_eq!(grouper.canonical_name("Slack | general"), "Slack | general");
    }

    #[test]
    fn test_rules_sorted_by_priority() {
        let config = GroupingConfig {
            rules: vec![
                TitleRule::new("Low", 1, vec![contains("x")]),
                TitleRule::new("High", 9, vec![contains("x")]),
            ],
            ..Default::default()
        };
        let grouper = ApplicationGrouper::new(config);
        assert_eq!(grouper.canonical_name("x"), "High");
        assert_eq!(grouper.rules()[0].app_label, "High");
    }

    #[test]
    fn test_contains_all_requires_every_fragment() {
        let pattern = TitlePattern::ContainsAll(vec!["Chat |".into(), "| Microsoft Teams".into()]);
        assert!(pattern.matches("Chat | Bob | Microsoft Teams"));
        assert!(!pattern.matches("Chat | Bob"));
        assert!(!TitlePattern::ContainsAll(Vec::new()).matches("anything"));
    }

    #[test]
    fn test_surface_filter() {
        let grouped = ApplicationGrouper::default().group(&[
            NativeSource::screen("screen:1:0", "Entire Screen"),
            NativeSource::window("window:1:0", "Inbox — Mail"),
        ]);
        assert_eq!(SurfaceFilter::All.retain(grouped.clone()).len(), 2);
        assert_eq!(SurfaceFilter::Windows.retain(grouped.clone())[0].app_name, "Mail");
        assert_eq!(SurfaceFilter::Screens.retain(grouped)[0].app_name, "Entire Screen");
        assert_eq!("screens".parse::<SurfaceFilter>(), Ok(SurfaceFilter::Screens));
        assert!("tabs".parse::<SurfaceFilter>().is_err());
    }
}
