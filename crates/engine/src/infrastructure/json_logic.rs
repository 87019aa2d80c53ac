//! JsonLogic rule evaluator.
//!
//! Rules are JSON documents (https://jsonlogic.com) evaluated by `jsonlogic_rs`. Validation
//! only checks the shape of a rule: every object node names exactly one known operation.

use serde_json::Value;

use crate::infrastructure::ports::{RuleError, RuleEvaluator};

/// Operations of the JsonLogic standard.
const OPERATIONS: &[&str] = &[
    // Data access
    "var",
    "missing",
    "missing_some",
    // Logic and comparison
    "if",
    "?:",
    "==",
    "===",
    "!=",
    "!==",
    "!",
    "!!",
    "and",
    "or",
    "<",
    "<=",
    ">",
    ">=",
    // Numeric
    "max",
    "min",
    "+",
    "-",
    "*",
    "/",
    "%",
    // Arrays
    "map",
    "filter",
    "reduce",
    "all",
    "none",
    "some",
    "merge",
    "in",
    // Strings
    "cat",
    "substr",
    // Misc
    "log",
];

fn parse_rule(rule: &str) -> Result<Value, RuleError> {
    let value: Value =
        serde_json::from_str(rule).map_err(|e| RuleError::InvalidRule(e.to_string()))?;
    check_shape(&value)?;
    Ok(value)
}

fn check_shape(value: &Value) -> Result<(), RuleError> {
    match value {
        Value::Object(map) => {
            let mut entries = map.iter();
            match (entries.next(), entries.next()) {
                (Some((name, args)), None) => {
                    if !OPERATIONS.contains(&name.as_str()) {
                        return Err(RuleError::InvalidRule(format!(
                            "unknown operation {name:?}"
                        )));
                    }
                    check_shape(args)
                }
                _ => Err(RuleError::InvalidRule(format!(
                    "operation must have exactly one key, found {}",
                    map.len()
                ))),
            }
        }
        Value::Array(items) => items.iter().try_for_each(check_shape),
        _ => Ok(()),
    }
}

/// `RuleEvaluator` backed by JsonLogic.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLogicEvaluator;

impl JsonLogicEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl RuleEvaluator for JsonLogicEvaluator {
    fn is_valid(&self, rule: &str) -> bool {
        parse_rule(rule).is_ok()
    }

    fn evaluate(&self, rule: &str, data: &str) -> Result<bool, RuleError> {
        let rule = parse_rule(rule)?;
        let data: Value =
            serde_json::from_str(data).map_err(|e| RuleError::BrokenData(e.to_string()))?;

        let result = jsonlogic_rs::apply(&rule, &data)
            .map_err(|e| RuleError::Evaluation(e.to_string()))?;

        match result {
            Value::Bool(result) => Ok(result),
            other => Err(RuleError::NotBoolean(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOME_SWORD: &str = r#"{"some": [{"var": "items"}, {"==": [{"var": ""}, "sword"]}]}"#;

    #[test]
    fn standard_operations_are_valid_rules() {
        let evaluator = JsonLogicEvaluator::new();
        for rule in [
            "true",
            r#"{"==": [{"var": "a"}, 1]}"#,
            SOME_SWORD,
            r#"{"all": [{"var": "items"}, {">": [{"var": ""}, 0]}]}"#,
            r#"{"none": [{"var": "items"}, {"<": [{"var": ""}, 0]}]}"#,
            r#"{"in": ["b", {"merge": [["a"], ["b"]]}]}"#,
            r#"{"==": [{"substr": ["jsonlogic", 4]}, "logic"]}"#,
            r#"{"<=": [1, {"var": "level"}, 10]}"#,
        ] {
            assert!(evaluator.is_valid(rule), "{rule} should be valid");
        }
    }

    #[test]
    fn malformed_rules_are_invalid() {
        let evaluator = JsonLogicEvaluator::new();
        assert!(!evaluator.is_valid("{not json"));
        assert!(!evaluator.is_valid(r#"{"teleport": [1]}"#));
        assert!(!evaluator.is_valid(r#"{"==": [1, 2], "!=": [1, 2]}"#));
        assert!(!evaluator.is_valid(r#"{"and": [true, {"warp": 9}]}"#));
    }

    #[test]
    fn rules_run_against_event_data() {
        let evaluator = JsonLogicEvaluator::new();
        let kills = r#"{">": [{"var": "kills"}, 3]}"#;

        assert_eq!(evaluator.evaluate(kills, r#"{"kills": 4}"#), Ok(true));
        assert_eq!(evaluator.evaluate(kills, r#"{"kills": 1}"#), Ok(false));
        assert_eq!(
            evaluator.evaluate(SOME_SWORD, r#"{"items": ["shield", "sword"]}"#),
            Ok(true)
        );
        assert_eq!(
            evaluator.evaluate(SOME_SWORD, r#"{"items": ["shield"]}"#),
            Ok(false)
        );
    }

    #[test]
    fn failures_keep_their_kind() {
        let evaluator = JsonLogicEvaluator::new();
        let rule = r#"{">": [{"var": "kills"}, 3]}"#;

        assert!(matches!(
            evaluator.evaluate(rule, r#"{"kills": "#),
            Err(RuleError::BrokenData(_))
        ));
        assert!(matches!(
            evaluator.evaluate(rule, ""),
            Err(RuleError::BrokenData(_))
        ));
        assert!(matches!(
            evaluator.evaluate(r#"{"var": "kills"}"#, r#"{"kills": 4}"#),
            Err(RuleError::NotBoolean(_))
        ));
        assert!(matches!(
            evaluator.evaluate(r#"{"unknown": 1}"#, "{}"),
            Err(RuleError::InvalidRule(_))
        ));
    }
}
