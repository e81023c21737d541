//! Structural JSON comparison for API tests
//!
//! This crate checks a decoded API response (`actual`) against a fixture
//! (`expected`). Both sides are mapping trees (`serde_json::Value` objects).
//!
//! # Pipeline
//!
//! ```text
//! actual, expected ──► strip nulls / __ keys ──► normalize key names ──┐
//!                        (ignore_none)           (unify_name)          │
//!          ┌────────────────────────────────────────────────────────────┘
//!          ▼
//!   user strategy? ──► exact diff (+ containment filter) or regex tree
//!          │
//!          ▼
//!     MatchResult ──► info! on pass, error! on fail
//! ```
//!
//! # Example
//!
//! ```
//! use easy_compare::{compare, CompareSettings};
//! use serde_json::json;
//!
//! let response = json!({"id": 42, "name": "widget", "created_at": "2024-01-01"});
//!
//! // Exact containment: fields the fixture omits are tolerated
//! let result = compare(&response, &json!({"id": 42}), &CompareSettings::default()).unwrap();
//! assert!(result.matched);
//!
//! // Regex tree: expected leaves are patterns anchored at the start
//! let fixture = json!({"name": "wid", "created_at": "\\d{4}-"});
//! let result = compare(&response, &fixture, &CompareSettings::regex()).unwrap();
//! assert!(result.matched);
//! ```

pub mod compare;
pub mod delta;
pub mod error;
pub mod format;
pub mod preprocess;
pub mod regex_tree;
pub mod settings;

pub use compare::{compare, compare_objects, MatchKind, MatchResult, ToMapping};
pub use delta::{diff, Delta, DiffCategory, Difference};
pub use error::{CompareError, CompareResult};
pub use format::{compact, format_body, log_pretty, pretty};
pub use preprocess::{
    normalize_key, normalize_keys, strip, strip_nulls, StripOptions, RESERVED_SUFFIX,
};
pub use regex_tree::{RegexTreeMatcher, Verdict};
pub use settings::{CompareSettings, MatchStrategy, MatchType};

/// Assert that `actual` matches `expected`, panicking with the diagnostic otherwise.
///
/// Both sides may be anything implementing [`ToMapping`]. Settings default to
/// [`CompareSettings::default`].
#[macro_export]
macro_rules! assert_json_match {
    ($actual:expr, $expected:expr $(,)?) => {
        $crate::assert_json_match!($actual, $expected, &$crate::CompareSettings::default())
    };
    ($actual:expr, $expected:expr, $settings:expr $(,)?) => {
        match $crate::compare_objects(&$actual, &$expected, $settings) {
            Ok(result) if result.matched => {}
            Ok(result) => panic!("{}", result.diagnostic),
            Err(e) => panic!("comparison failed: {}", e),
        }
    };
}
