//! Integration tests for the comparison engine
//!
//! Fixtures under `tests/fixtures/` model a typical order API response and
//! the fixtures a test suite would check it against.
//!
//! Set `RUST_LOG=debug` to see the diagnostics:
//!
//! ```bash
//! RUST_LOG=debug cargo test -p easy-compare -- --nocapture
//! ```

mod common;

use common::{init_tracing, load_json_fixture, load_yaml_fixture};
use easy_compare::{
    assert_json_match, compare, compare_objects, normalize_keys, strip_nulls, CompareError,
    CompareSettings, DiffCategory, MatchKind, MatchType,
};
use serde::Serialize;
use serde_json::{json, Value};

fn exact(contains_as_true: bool) -> CompareSettings {
    CompareSettings::default()
        .with_match_type(MatchType::Exact)
        .with_contains_as_true(contains_as_true)
}

fn regex(contains_as_true: bool) -> CompareSettings {
    CompareSettings::default()
        .with_match_type(MatchType::Regex)
        .with_contains_as_true(contains_as_true)
}

fn matches(actual: Value, expected: Value, settings: &CompareSettings) -> bool {
    compare(&actual, &expected, settings).unwrap().matched
}

fn sample_trees() -> Vec<Value> {
    vec![
        json!({}),
        json!({"a": 1}),
        json!({"a": null, "b": [null, 1, "x"], "c": {"d": {"e": [true, false]}}}),
        json!({"list": [{"id": 1}, {"id": 2, "tags": []}], "n": -3.25, "s": ""}),
        load_json_fixture("order_response.json"),
    ]
}

// ============================================================================
// Exact-diff strategy
// ============================================================================

#[test]
fn test_every_tree_matches_itself_exactly() {
    init_tracing();
    for tree in sample_trees() {
        for ignore_none in [true, false] {
            let settings = exact(false).with_ignore_none(ignore_none);
            assert!(matches(tree.clone(), tree.clone(), &settings), "tree {}", tree);
        }
    }
}

#[test]
fn test_extra_key_is_tolerated_only_under_containment() {
    init_tracing();
    for base in sample_trees() {
        let mut extended = base.clone();
        extended
            .as_object_mut()
            .unwrap()
            .insert("zz_extra".to_string(), json!({"anything": [1, 2]}));

        assert!(matches(extended.clone(), base.clone(), &exact(true)));
        assert!(!matches(extended, base, &exact(false)));
    }
}

#[test]
fn test_exact_containment_direction() {
    init_tracing();
    assert!(matches(json!({"a": 1, "b": 2}), json!({"a": 1}), &exact(true)));

    let result = compare(&json!({"a": 1}), &json!({"a": 1, "b": 2}), &exact(true)).unwrap();
    assert!(!result.matched);
    assert_eq!(result.kind, MatchKind::PartialExact);
    let diffs = result.delta.unwrap().differences();
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].category, DiffCategory::Missing);
    assert_eq!(diffs[0].path, "b");
}

#[test]
fn test_exact_changed_value_fails_under_containment() {
    init_tracing();
    let result = compare(
        &json!({"data": {"status": "PAID", "extra": 1}}),
        &json!({"data": {"status": "REFUNDED"}}),
        &exact(true),
    )
    .unwrap();
    assert!(!result.matched);
    assert!(result.diagnostic.contains("data.status"));
    assert!(!result.diagnostic.contains("data.extra :"));
}

#[test]
fn test_order_fixture_with_unified_names() {
    init_tracing();
    let actual = load_json_fixture("order_response.json");
    let expected = load_json_fixture("order_expected_exact.json");

    let settings = exact(true).with_unify_name(true).with_ignore_none(true);
    let result = compare(&actual, &expected, &settings).unwrap();
    assert!(result.matched, "{}", result.diagnostic);
    assert_eq!(result.kind, MatchKind::PartialExact);

    // Without key normalization the camelCase fixture keys are missing
    let result = compare(&actual, &expected, &settings.clone().with_unify_name(false)).unwrap();
    assert!(!result.matched);
    let missing: Vec<_> = result
        .delta
        .unwrap()
        .differences()
        .into_iter()
        .filter(|d| d.category == DiffCategory::Missing)
        .map(|d| d.path)
        .collect();
    assert!(missing.contains(&"data.orderId".to_string()));
    assert!(missing.contains(&"data.crmSaleId".to_string()));
}

#[test]
fn test_exact_numbers_compare_by_value() {
    init_tracing();
    let expected: Value = serde_yaml::from_str("price: 20.0\nqty: 2\n").unwrap();
    let actual = json!({"price": 20, "qty": 2.0, "sku": "A-100"});

    assert!(matches(actual.clone(), expected.clone(), &exact(true)));
    assert!(!matches(actual, json!({"price": 20.5}), &exact(true)));
}

// ============================================================================
// Regex-tree strategy
// ============================================================================

#[test]
fn test_regex_leaf_is_anchored_at_start() {
    init_tracing();
    assert!(matches(json!({"a": "hello"}), json!({"a": "hel"}), &regex(true)));
    assert!(matches(json!({"a": "hello"}), json!({"a": "^hello$"}), &regex(true)));
    assert!(!matches(json!({"a": "hello"}), json!({"a": "world"}), &regex(true)));
}

#[test]
fn test_regex_wildcard_ignores_actual_type() {
    init_tracing();
    for actual in [json!({"b": 1}), json!([1, 2]), json!("text"), json!(3)] {
        assert!(matches(json!({ "a": actual.clone() }), json!({"a": "*"}), &regex(true)));
        assert!(matches(json!({ "a": actual }), json!({"a": ".*"}), &regex(false)));
    }
}

#[test]
fn test_regex_array_template() {
    init_tracing();
    let actual = json!({"items": [{"v": 1}, {"v": 2}]});
    assert!(matches(actual.clone(), json!({"items": [{"v": "\\d+"}]}), &regex(true)));
    assert!(!matches(actual, json!({"items": [{"v": "[a-z]+"}]}), &regex(true)));
}

#[test]
fn test_regex_empty_expected_mapping() {
    init_tracing();
    assert!(matches(json!({"x": 1, "y": 2}), json!({}), &regex(true)));
}

#[test]
fn test_type_mismatch_fails_in_every_mode() {
    init_tracing();
    for contains_as_true in [true, false] {
        assert!(!matches(json!({"a": "1"}), json!({"a": 1}), &regex(contains_as_true)));
        assert!(!matches(json!({"a": "1"}), json!({"a": 1}), &exact(contains_as_true)));
    }
}

#[test]
fn test_order_fixture_regex() {
    init_tracing();
    let actual = load_json_fixture("order_response.json");
    let expected = load_yaml_fixture("order_expected_regex.yaml");

    let result = compare(&actual, &expected, &regex(true)).unwrap();
    assert!(result.matched, "{}", result.diagnostic);
    assert_eq!(result.kind, MatchKind::PartialRegex);

    // Strict key checking rejects the fields the fixture leaves out
    let result = compare(&actual, &expected, &regex(false)).unwrap();
    assert!(!result.matched);
    assert!(result.diagnostic.contains("keys missed"));
}

#[test]
fn test_regex_failure_names_both_values() {
    init_tracing();
    let result = compare(
        &json!({"data": {"items": [{"sku": "A-1"}, {"sku": "b-2"}]}}),
        &json!({"data": {"items": [{"sku": "[A-Z]-\\d"}]}}),
        &regex(true),
    )
    .unwrap();
    assert!(!result.matched);
    assert!(result.diagnostic.contains("data.items[1].sku"));
    assert!(result.diagnostic.contains("b-2"));
    assert!(result.diagnostic.contains("[A-Z]-\\d"));
}

#[test]
fn test_invalid_pattern_is_an_error() {
    init_tracing();
    let err = compare(&json!({"a": "x"}), &json!({"a": "[unclosed"}), &regex(true)).unwrap_err();
    assert!(matches!(err, CompareError::InvalidPattern { .. }));
}

// ============================================================================
// Preprocessing properties
// ============================================================================

#[test]
fn test_normalize_keys_idempotent_on_fixtures() {
    for tree in sample_trees() {
        let once = normalize_keys(&tree);
        assert_eq!(normalize_keys(&once), once);
    }
}

#[test]
fn test_strip_nulls_on_fixture() {
    let stripped = strip_nulls(&load_json_fixture("order_expected_exact.json"));
    let data = stripped["data"].as_object().unwrap();
    assert!(!data.contains_key("remark"));
    assert!(!data.contains_key("debug_note__"));
    assert!(data.contains_key("orderId"));
}

// ============================================================================
// Entry points
// ============================================================================

#[test]
fn test_non_mapping_input_is_rejected() {
    let err = compare(&json!([1, 2]), &json!({}), &CompareSettings::default()).unwrap_err();
    assert!(matches!(err, CompareError::NotAMapping { side: "actual", .. }));
}

#[derive(Serialize)]
struct Buyer {
    user_id: u64,
    nick_name: String,
    tags: Vec<String>,
}

#[test]
fn test_compare_objects_with_model() {
    init_tracing();
    let buyer = Buyer {
        user_id: 77,
        nick_name: "tester".to_string(),
        tags: vec![],
    };
    let response = load_json_fixture("order_response.json");

    let result = compare_objects(&buyer, &response["data"]["buyer"], &exact(false)).unwrap();
    assert!(result.matched, "{}", result.diagnostic);

    assert_json_match!(response["data"]["buyer"], buyer);
    assert_json_match!(buyer, json!({"nick_name": "^test"}), &regex(true));
}

#[test]
#[should_panic(expected = "JSON PARTIAL EXACT MATCH, Result: FAIL")]
fn test_assert_json_match_panics_with_diagnostic() {
    assert_json_match!(json!({"a": 1}), json!({"a": 2}));
}

#[test]
fn test_strategy_short_circuits() {
    init_tracing();
    let settings = regex(false).with_strategy(|_: &Value, _: &Value, _: &CompareSettings| true);
    let result = compare(&json!({"a": "1"}), &json!({"a": 1}), &settings).unwrap();
    assert!(result.matched);
    assert_eq!(result.kind, MatchKind::UserDefined);
}

#[test]
fn test_concurrent_comparisons() {
    let actual = load_json_fixture("order_response.json");
    let expected = load_yaml_fixture("order_expected_regex.yaml");
    let settings = regex(true);

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| compare(&actual, &expected, &settings).unwrap().matched))
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    });
}
