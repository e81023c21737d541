//! Top-level comparison entry points

use crate::delta::{diff, Delta};
use crate::error::{CompareError, CompareResult};
use crate::format::pretty;
use crate::preprocess::{normalize_keys, strip_nulls};
use crate::regex_tree::{RegexTreeMatcher, Verdict};
use crate::settings::CompareSettings;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, error, info};

/// Which path produced a [`MatchResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    FullExact,
    PartialExact,
    FullRegex,
    PartialRegex,
    UserDefined,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::FullExact => write!(f, "JSON FULL EXACT MATCH"),
            MatchKind::PartialExact => write!(f, "JSON PARTIAL EXACT MATCH"),
            MatchKind::FullRegex => write!(f, "JSON FULL REGEX MATCH"),
            MatchKind::PartialRegex => write!(f, "JSON PARTIAL REGEX MATCH"),
            MatchKind::UserDefined => write!(f, "JSON USER DEFINED MATCH"),
        }
    }
}

/// Result of comparing two mapping trees
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub matched: bool,
    pub kind: MatchKind,
    /// Human-readable explanation with both trees pretty-printed
    pub diagnostic: String,
    /// Remaining differences for a failed exact comparison
    pub delta: Option<Delta>,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        self.matched
    }
}

/// Anything that can be turned into a mapping tree.
///
/// Every `Serialize` type qualifies, including `Value` itself.
pub trait ToMapping {
    fn to_mapping(&self) -> Result<Value, serde_json::Error>;
}

impl<T: Serialize + ?Sized> ToMapping for T {
    fn to_mapping(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// Compare two model-like values by converting both into mapping trees first
pub fn compare_objects<A, E>(
    actual: &A,
    expected: &E,
    settings: &CompareSettings,
) -> CompareResult<MatchResult>
where
    A: ToMapping + ?Sized,
    E: ToMapping + ?Sized,
{
    let actual = actual
        .to_mapping()
        .map_err(|source| CompareError::Serialize { side: "actual", source })?;
    let expected = expected
        .to_mapping()
        .map_err(|source| CompareError::Serialize { side: "expected", source })?;
    compare(&actual, &expected, settings)
}

/// Compare an actual mapping tree against an expected one.
///
/// Returns an error only when an input is not a mapping, a pattern does not
/// compile, or the depth limit is hit. The outcome is also logged: `info` on
/// a match and `error` otherwise.
pub fn compare(
    actual: &Value,
    expected: &Value,
    settings: &CompareSettings,
) -> CompareResult<MatchResult> {
    require_mapping("actual", actual)?;
    require_mapping("expected", expected)?;

    let mut actual = actual.clone();
    let mut expected = expected.clone();

    if settings.ignore_none {
        debug!("Stripping nulls and reserved keys");
        actual = strip_nulls(&actual);
        expected = strip_nulls(&expected);
    }

    if settings.unify_name {
        debug!("Normalizing key names");
        actual = normalize_keys(&actual);
        expected = normalize_keys(&expected);
    }

    let result = if let Some(strategy) = &settings.user_defined_match {
        let matched = strategy.matches(&actual, &expected, settings);
        MatchResult {
            matched,
            kind: MatchKind::UserDefined,
            diagnostic: outcome_detail(MatchKind::UserDefined, matched, &actual, &expected),
            delta: None,
        }
    } else if settings.exact_mode() {
        exact_match(&actual, &expected, settings)?
    } else {
        regex_match(&actual, &expected, settings)?
    };

    if result.matched {
        info!("{}", result.diagnostic);
    } else {
        error!("{}", result.diagnostic);
    }

    Ok(result)
}

fn exact_match(
    actual: &Value,
    expected: &Value,
    settings: &CompareSettings,
) -> CompareResult<MatchResult> {
    let Some(delta) = diff(actual, expected, settings.max_depth)? else {
        return Ok(MatchResult {
            matched: true,
            kind: MatchKind::FullExact,
            diagnostic: outcome_detail(MatchKind::FullExact, true, actual, expected),
            delta: None,
        });
    };

    if !settings.contains_as_true {
        return Ok(MatchResult {
            matched: false,
            kind: MatchKind::FullExact,
            diagnostic: format!(
                "{}\n{}",
                outcome_detail(MatchKind::FullExact, false, actual, expected),
                delta_section("DELTA", &delta)
            ),
            delta: Some(delta),
        });
    }

    match delta.retain_required() {
        None => Ok(MatchResult {
            matched: true,
            kind: MatchKind::PartialExact,
            diagnostic: outcome_detail(MatchKind::PartialExact, true, actual, expected),
            delta: None,
        }),
        Some(missed) => Ok(MatchResult {
            matched: false,
            kind: MatchKind::PartialExact,
            diagnostic: format!(
                "{}\n{}",
                outcome_detail(MatchKind::PartialExact, false, actual, expected),
                delta_section("MISSED", &missed)
            ),
            delta: Some(missed),
        }),
    }
}

fn regex_match(
    actual: &Value,
    expected: &Value,
    settings: &CompareSettings,
) -> CompareResult<MatchResult> {
    let kind = if settings.contains_as_true {
        MatchKind::PartialRegex
    } else {
        MatchKind::FullRegex
    };

    let verdict = RegexTreeMatcher::new(
        actual,
        expected,
        settings.contains_as_true,
        settings.max_depth,
    )
    .run()?;
    let result = match verdict {
        Verdict::Pass => MatchResult {
            matched: true,
            kind,
            diagnostic: outcome_detail(kind, true, actual, expected),
            delta: None,
        },
        // The walk's message already carries both trees
        Verdict::Fail(message) => MatchResult {
            matched: false,
            kind,
            diagnostic: format!("{}, Result: FAIL\n{}", kind, message),
            delta: None,
        },
    };
    Ok(result)
}

fn require_mapping(side: &'static str, value: &Value) -> CompareResult<()> {
    if value.is_object() {
        Ok(())
    } else {
        Err(CompareError::NotAMapping {
            side,
            found: kind_name(value),
        })
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

fn outcome_detail(kind: MatchKind, matched: bool, actual: &Value, expected: &Value) -> String {
    format!(
        "{}, Result: {}, Detail:\n>>>>>ACTUAL>>>>>\n{}\n>>>>>EXPECT>>>>>\n{}",
        kind,
        if matched { "PASS" } else { "FAIL" },
        pretty(actual),
        pretty(expected)
    )
}

fn delta_section(title: &str, delta: &Delta) -> String {
    format!(">>>>>{}>>>>>\n{}", title, delta)
}
