//! Comparison settings
//!
//! Settings can be built in code, deserialized from a fixture, or layered
//! over the defaults from `EASY_COMPARE_*` environment variables.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Default recursion limit for both matching strategies
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Which built-in strategy compares the trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Expected leaves are regular expressions anchored at the start of the actual value
    Regex,
    /// Structural tree diff
    #[default]
    Exact,
}

impl std::str::FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "1" => Ok(MatchType::Exact),
            "regex" | "0" => Ok(MatchType::Regex),
            other => Err(format!("unknown match type '{}'", other)),
        }
    }
}

/// A caller-supplied comparison that replaces the built-in strategies.
///
/// It still receives the preprocessed trees.
pub trait MatchStrategy: Send + Sync {
    fn matches(&self, actual: &Value, expected: &Value, settings: &CompareSettings) -> bool;
}

impl<F> MatchStrategy for F
where
    F: Fn(&Value, &Value, &CompareSettings) -> bool + Send + Sync,
{
    fn matches(&self, actual: &Value, expected: &Value, settings: &CompareSettings) -> bool {
        self(actual, expected, settings)
    }
}

/// Options controlling a single comparison
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareSettings {
    /// Drop null values and `__`-suffixed keys before matching
    pub ignore_none: bool,
    /// Compare keys with underscores removed and upper-cased
    pub unify_name: bool,
    /// Built-in strategy to use
    pub match_type: MatchType,
    /// Expected may be a subset of actual
    pub contains_as_true: bool,
    /// Maximum tree depth either strategy will descend
    pub max_depth: usize,
    #[serde(skip)]
    pub user_defined_match: Option<Arc<dyn MatchStrategy>>,
}

impl Default for CompareSettings {
    fn default() -> Self {
        Self {
            ignore_none: true,
            unify_name: false,
            match_type: MatchType::Exact,
            contains_as_true: true,
            max_depth: DEFAULT_MAX_DEPTH,
            user_defined_match: None,
        }
    }
}

impl fmt::Debug for CompareSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompareSettings")
            .field("ignore_none", &self.ignore_none)
            .field("unify_name", &self.unify_name)
            .field("match_type", &self.match_type)
            .field("contains_as_true", &self.contains_as_true)
            .field("max_depth", &self.max_depth)
            .field("user_defined_match", &self.user_defined_match.is_some())
            .finish()
    }
}

impl CompareSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full structural equality with no preprocessing
    pub fn strict() -> Self {
        Self {
            ignore_none: false,
            unify_name: false,
            match_type: MatchType::Exact,
            contains_as_true: false,
            ..Self::default()
        }
    }

    /// Regex-tree matching with the remaining defaults
    pub fn regex() -> Self {
        Self::default().with_match_type(MatchType::Regex)
    }

    pub fn exact_mode(&self) -> bool {
        self.match_type == MatchType::Exact
    }

    pub fn with_ignore_none(mut self, ignore_none: bool) -> Self {
        self.ignore_none = ignore_none;
        self
    }

    pub fn with_unify_name(mut self, unify_name: bool) -> Self {
        self.unify_name = unify_name;
        self
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self
    }

    pub fn with_contains_as_true(mut self, contains_as_true: bool) -> Self {
        self.contains_as_true = contains_as_true;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_strategy<S>(mut self, strategy: S) -> Self
    where
        S: MatchStrategy + 'static,
    {
        self.user_defined_match = Some(Arc::new(strategy));
        self
    }

    /// Load settings from `EASY_COMPARE_*` environment variables over the defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings from an arbitrary variable lookup over the defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(v) = parse_var(&lookup, "EASY_COMPARE_IGNORE_NONE", parse_bool) {
            settings.ignore_none = v;
        }
        if let Some(v) = parse_var(&lookup, "EASY_COMPARE_UNIFY_NAME", parse_bool) {
            settings.unify_name = v;
        }
        if let Some(v) = parse_var(&lookup, "EASY_COMPARE_MATCH_TYPE", |s| s.parse().ok()) {
            settings.match_type = v;
        }
        if let Some(v) = parse_var(&lookup, "EASY_COMPARE_CONTAINS_AS_TRUE", parse_bool) {
            settings.contains_as_true = v;
        }
        if let Some(v) = parse_var(&lookup, "EASY_COMPARE_MAX_DEPTH", |s| s.trim().parse().ok()) {
            settings.max_depth = v;
        }

        settings
    }
}

fn parse_var<F, T, P>(lookup: &F, key: &str, parse: P) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    let raw = lookup(key)?;
    let parsed = parse(&raw);
    if parsed.is_none() {
        warn!("Ignoring unparsable {}={:?}, keeping default", key, raw);
    }
    parsed
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
