//! Exact-diff strategy
//!
//! [`diff`] walks two trees in lock-step and records, for every node that
//! differs, whether it exists only in `actual`, only in `expected`, or has a
//! different value. Sequences are aligned on their longest common
//! subsequence first so that an inserted element does not turn every
//! following element into a change.

use crate::error::{CompareError, CompareResult};
use serde_json::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Structural difference between an actual and an expected tree
#[derive(Debug, Clone, PartialEq)]
pub enum Delta {
    /// Present in actual, never mentioned by expected
    OnlyInActual(Value),
    /// Required by expected, absent from actual
    OnlyInExpected(Value),
    /// Present on both sides with different values
    Changed { actual: Value, expected: Value },
    /// Per-key differences inside a mapping
    Object(BTreeMap<String, Delta>),
    /// Per-element differences inside a sequence.
    ///
    /// The index refers to `expected` for [`Delta::OnlyInExpected`] entries
    /// and to `actual` for everything else. Flattened paths mark the former
    /// as `[expected N]`.
    Array(Vec<(usize, Delta)>),
}

/// A single flattened difference
#[derive(Debug, Clone, PartialEq)]
pub struct Difference {
    pub category: DiffCategory,
    pub path: String,
    pub actual: String,
    pub expected: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffCategory {
    /// Expected something actual does not have
    Missing,
    /// Actual has something expected does not mention
    Extra,
    /// Same kind of value, different content
    Value,
    /// Different kinds of value
    Structure,
}

impl fmt::Display for DiffCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffCategory::Missing => write!(f, "MISSING"),
            DiffCategory::Extra => write!(f, "EXTRA"),
            DiffCategory::Value => write!(f, "VALUE"),
            DiffCategory::Structure => write!(f, "STRUCTURE"),
        }
    }
}

/// Diff two trees, `None` when they are equal
pub fn diff(actual: &Value, expected: &Value, max_depth: usize) -> CompareResult<Option<Delta>> {
    diff_at(actual, expected, "", 0, max_depth)
}

fn diff_at(
    actual: &Value,
    expected: &Value,
    path: &str,
    depth: usize,
    max_depth: usize,
) -> CompareResult<Option<Delta>> {
    if depth > max_depth {
        return Err(CompareError::DepthExceeded {
            max_depth,
            path: display_path(path),
        });
    }

    match (actual, expected) {
        (Value::Object(act), Value::Object(exp)) => {
            let mut entries = BTreeMap::new();

            for (key, act_value) in act {
                match exp.get(key) {
                    Some(exp_value) => {
                        let child = join_key(path, key);
                        if let Some(delta) =
                            diff_at(act_value, exp_value, &child, depth + 1, max_depth)?
                        {
                            entries.insert(key.clone(), delta);
                        }
                    }
                    None => {
                        entries.insert(key.clone(), Delta::OnlyInActual(act_value.clone()));
                    }
                }
            }

            for (key, exp_value) in exp {
                if !act.contains_key(key) {
                    entries.insert(key.clone(), Delta::OnlyInExpected(exp_value.clone()));
                }
            }

            Ok((!entries.is_empty()).then_some(Delta::Object(entries)))
        }
        (Value::Array(act), Value::Array(exp)) => {
            if values_equal(actual, expected) {
                return Ok(None);
            }
            let entries = diff_sequences(act, exp, path, depth, max_depth)?;
            Ok((!entries.is_empty()).then_some(Delta::Array(entries)))
        }
        _ if values_equal(actual, expected) => Ok(None),
        _ => Ok(Some(Delta::Changed {
            actual: actual.clone(),
            expected: expected.clone(),
        })),
    }
}

enum Step {
    Keep,
    Extra(usize),
    Missing(usize),
}

/// Align two sequences on their longest common subsequence
fn align(act: &[Value], exp: &[Value]) -> Vec<Step> {
    let (n, m) = (act.len(), exp.len());
    let mut lcs = vec![vec![0u32; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if values_equal(&act[i], &exp[j]) {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut steps = Vec::with_capacity(n.max(m));
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if values_equal(&act[i], &exp[j]) {
            steps.push(Step::Keep);
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            steps.push(Step::Extra(i));
            i += 1;
        } else {
            steps.push(Step::Missing(j));
            j += 1;
        }
    }
    steps.extend((i..n).map(Step::Extra));
    steps.extend((j..m).map(Step::Missing));
    steps
}

fn diff_sequences(
    act: &[Value],
    exp: &[Value],
    path: &str,
    depth: usize,
    max_depth: usize,
) -> CompareResult<Vec<(usize, Delta)>> {
    let mut entries = Vec::new();
    let mut extras = Vec::new();
    let mut missing = Vec::new();

    for step in align(act, exp).into_iter().chain(std::iter::once(Step::Keep)) {
        match step {
            Step::Extra(i) => extras.push(i),
            Step::Missing(j) => missing.push(j),
            Step::Keep => {
                // Pair up the unmatched run positionally before moving on
                let paired = extras.len().min(missing.len());
                for (&i, &j) in extras.iter().zip(missing.iter()) {
                    let child = format!("{}[{}]", path, i);
                    match (&act[i], &exp[j]) {
                        (Value::Object(_), Value::Object(_))
                        | (Value::Array(_), Value::Array(_)) => {
                            if let Some(delta) =
                                diff_at(&act[i], &exp[j], &child, depth + 1, max_depth)?
                            {
                                entries.push((i, delta));
                            }
                        }
                        _ => entries.push((
                            i,
                            Delta::Changed {
                                actual: act[i].clone(),
                                expected: exp[j].clone(),
                            },
                        )),
                    }
                }
                entries.extend(
                    extras[paired..]
                        .iter()
                        .map(|&i| (i, Delta::OnlyInActual(act[i].clone()))),
                );
                entries.extend(
                    missing[paired..]
                        .iter()
                        .map(|&j| (j, Delta::OnlyInExpected(exp[j].clone()))),
                );
                extras.clear();
                missing.clear();
            }
        }
    }

    Ok(entries)
}

impl Delta {
    /// Drop everything that only exists in actual.
    ///
    /// Mappings and sequences left empty by the filter are dropped too;
    /// `None` means expected is contained in actual.
    pub fn retain_required(self) -> Option<Delta> {
        match self {
            Delta::OnlyInActual(_) => None,
            kept @ (Delta::OnlyInExpected(_) | Delta::Changed { .. }) => Some(kept),
            Delta::Object(entries) => {
                let entries: BTreeMap<_, _> = entries
                    .into_iter()
                    .filter_map(|(key, delta)| delta.retain_required().map(|d| (key, d)))
                    .collect();
                (!entries.is_empty()).then_some(Delta::Object(entries))
            }
            Delta::Array(entries) => {
                let entries: Vec<_> = entries
                    .into_iter()
                    .filter_map(|(index, delta)| delta.retain_required().map(|d| (index, d)))
                    .collect();
                (!entries.is_empty()).then_some(Delta::Array(entries))
            }
        }
    }

    /// Flatten into one [`Difference`] per differing leaf, in path order
    pub fn differences(&self) -> Vec<Difference> {
        let mut out = Vec::new();
        self.collect("", &mut out);
        out
    }

    fn collect(&self, path: &str, out: &mut Vec<Difference>) {
        match self {
            Delta::OnlyInActual(value) => out.push(Difference {
                category: DiffCategory::Extra,
                path: display_path(path),
                actual: value.to_string(),
                expected: "(not present)".to_string(),
            }),
            Delta::OnlyInExpected(value) => out.push(Difference {
                category: DiffCategory::Missing,
                path: display_path(path),
                actual: "(missing)".to_string(),
                expected: value.to_string(),
            }),
            Delta::Changed { actual, expected } => out.push(Difference {
                category: if same_kind(actual, expected) {
                    DiffCategory::Value
                } else {
                    DiffCategory::Structure
                },
                path: display_path(path),
                actual: actual.to_string(),
                expected: expected.to_string(),
            }),
            Delta::Object(entries) => {
                for (key, delta) in entries {
                    delta.collect(&join_key(path, key), out);
                }
            }
            Delta::Array(entries) => {
                for (index, delta) in entries {
                    let child = match delta {
                        Delta::OnlyInExpected(_) => format!("{}[expected {}]", path, index),
                        _ => format!("{}[{}]", path, index),
                    };
                    delta.collect(&child, out);
                }
            }
        }
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diff in self.differences() {
            writeln!(
                f,
                "   [{:>9}] {} : actual={} expected={}",
                diff.category, diff.path, diff.actual, diff.expected
            )?;
        }
        Ok(())
    }
}

/// Structural equality where numbers compare by value, so `20` equals `20.0`
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(key, x)| y.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if a.is_f64() || b.is_f64() {
        return a.as_f64() == b.as_f64();
    }
    match (a.as_i64(), b.as_i64()) {
        (Some(x), Some(y)) => x == y,
        _ => a.as_u64() == b.as_u64(),
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    std::mem::discriminant(a) == std::mem::discriminant(b)
}

pub(crate) fn join_key(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

pub(crate) fn display_path(path: &str) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        path.to_string()
    }
}
