//! Regex-tree strategy
//!
//! Every primitive leaf of `expected` is a regular expression that must match
//! at the start of the stringified actual leaf. A sequence in `expected` is a
//! template: its first element must match every element of the actual
//! sequence, and further expected elements are ignored.

use crate::delta::{display_path, join_key};
use crate::error::{CompareError, CompareResult};
use crate::format::pretty;
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// Expected values that match anything
pub const WILDCARDS: [&str; 2] = ["*", ".*"];

/// Outcome of a regex-tree walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    /// The first mismatch found, with its diagnostic
    Fail(String),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Walks an actual tree against an expected pattern tree.
///
/// Compiled patterns are cached for the lifetime of the matcher, since a
/// sequence template is applied to every actual element.
pub struct RegexTreeMatcher<'a> {
    contains_as_true: bool,
    max_depth: usize,
    root_actual: &'a Value,
    root_expected: &'a Value,
    patterns: HashMap<String, Regex>,
}

impl<'a> RegexTreeMatcher<'a> {
    pub fn new(
        root_actual: &'a Value,
        root_expected: &'a Value,
        contains_as_true: bool,
        max_depth: usize,
    ) -> Self {
        Self {
            contains_as_true,
            max_depth,
            root_actual,
            root_expected,
            patterns: HashMap::new(),
        }
    }

    /// Match the root trees
    pub fn run(&mut self) -> CompareResult<Verdict> {
        let (actual, expected) = (self.root_actual, self.root_expected);
        self.match_node(actual, expected, "", 0)
    }

    fn match_node(
        &mut self,
        actual: &Value,
        expected: &Value,
        path: &str,
        depth: usize,
    ) -> CompareResult<Verdict> {
        if depth > self.max_depth {
            return Err(CompareError::DepthExceeded {
                max_depth: self.max_depth,
                path: display_path(path),
            });
        }

        if is_wildcard(expected) {
            return Ok(Verdict::Pass);
        }

        match (actual, expected) {
            (Value::Array(act), Value::Array(exp)) => {
                self.match_sequence(act, exp, actual, expected, path, depth)
            }
            (Value::Object(act), Value::Object(exp)) => {
                self.match_mapping(act, exp, actual, expected, path, depth)
            }
            (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
                Ok(self.fail("type mismatch", path, actual, expected))
            }
            (_, Value::String(pattern)) => self.match_leaf(actual, pattern, path, expected),
            _ if same_kind(actual, expected) => {
                let pattern = stringify(expected);
                self.match_leaf(actual, &pattern, path, expected)
            }
            _ => Ok(self.fail("type mismatch", path, actual, expected)),
        }
    }

    fn match_sequence(
        &mut self,
        act: &[Value],
        exp: &[Value],
        actual: &Value,
        expected: &Value,
        path: &str,
        depth: usize,
    ) -> CompareResult<Verdict> {
        let template = match (act.is_empty(), exp.first()) {
            (true, None) => return Ok(Verdict::Pass),
            (false, Some(template)) => template,
            _ => return Ok(self.fail("actual or expected list is empty", path, actual, expected)),
        };

        for (index, item) in act.iter().enumerate() {
            let child = format!("{}[{}]", path, index);
            let verdict = self.match_node(item, template, &child, depth + 1)?;
            if !verdict.is_pass() {
                return Ok(verdict);
            }
        }
        Ok(Verdict::Pass)
    }

    fn match_mapping(
        &mut self,
        act: &Map<String, Value>,
        exp: &Map<String, Value>,
        actual: &Value,
        expected: &Value,
        path: &str,
        depth: usize,
    ) -> CompareResult<Verdict> {
        let keys_actual: BTreeSet<&str> = act.keys().map(String::as_str).collect();
        let keys_expected: BTreeSet<&str> = exp.keys().map(String::as_str).collect();

        let missing: Vec<_> = keys_expected.difference(&keys_actual).copied().collect();
        let unexpected: Vec<_> = if self.contains_as_true {
            Vec::new()
        } else {
            keys_actual.difference(&keys_expected).copied().collect()
        };

        if !missing.is_empty() || !unexpected.is_empty() {
            let reason = format!(
                "keys missed\nACTKEYS: {:?}\nEXPKEYS: {:?}\nMISSING: {:?}\nUNEXPECTED: {:?}",
                keys_actual, keys_expected, missing, unexpected
            );
            return Ok(self.fail(&reason, path, actual, expected));
        }

        for (key, exp_value) in exp {
            let child = join_key(path, key);
            // Presence was checked above
            let Some(act_value) = act.get(key) else {
                continue;
            };
            let verdict = self.match_node(act_value, exp_value, &child, depth + 1)?;
            if !verdict.is_pass() {
                return Ok(verdict);
            }
        }
        Ok(Verdict::Pass)
    }

    fn match_leaf(
        &mut self,
        actual: &Value,
        pattern: &str,
        path: &str,
        expected: &Value,
    ) -> CompareResult<Verdict> {
        let subject = stringify(actual);
        if self.compile(pattern, path)?.is_match(&subject) {
            Ok(Verdict::Pass)
        } else {
            let reason = format!("[{}] does not match pattern [{}]", subject, pattern);
            Ok(self.fail(&reason, path, actual, expected))
        }
    }

    fn compile(&mut self, pattern: &str, path: &str) -> CompareResult<&Regex> {
        if !self.patterns.contains_key(pattern) {
            debug!("Compiling leaf pattern {:?} at {}", pattern, display_path(path));
            let regex = Regex::new(&format!("^(?:{})", pattern)).map_err(|source| {
                CompareError::InvalidPattern {
                    path: display_path(path),
                    pattern: pattern.to_string(),
                    source,
                }
            })?;
            self.patterns.insert(pattern.to_string(), regex);
        }
        Ok(&self.patterns[pattern])
    }

    fn fail(&self, reason: &str, path: &str, actual: &Value, expected: &Value) -> Verdict {
        let mut message = format!(
            "JSON REGEX MATCH RESULT: FAIL at {}, Reason: {}\n>>>>>ACTUAL>>>>>\n{}",
            display_path(path),
            reason,
            pretty(actual)
        );
        if actual != self.root_actual {
            message.push_str(&format!("\n[<{}>]", pretty(self.root_actual)));
        }
        message.push_str(&format!("\n>>>>>EXPECTED>>>>>\n{}", pretty(expected)));
        if expected != self.root_expected {
            message.push_str(&format!("\n[<{}>]", pretty(self.root_expected)));
        }
        Verdict::Fail(message)
    }
}

fn is_wildcard(expected: &Value) -> bool {
    matches!(expected, Value::String(s) if WILDCARDS.contains(&s.as_str()))
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

/// Text a leaf is matched as: strings verbatim, everything else as JSON
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
