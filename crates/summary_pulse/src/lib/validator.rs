//! # Response Validator
//!
//! Turns the raw text of a completion into a [`StructuredSummary`]. Parsing is
//! strict: the text must be the JSON object and nothing else. A parsed summary
//! is then checked against the cardinality bounds the prompt asks for.

use std::{collections::HashSet, ops::RangeInclusive};

use itertools::Itertools;
use summary_datastore::StructuredSummary;

pub const MAIN_TOPICS_BOUNDS: RangeInclusive<usize> = 3..=5;
pub const KEY_POINTS_BOUNDS: RangeInclusive<usize> = 3..=5;
pub const KEYWORDS_BOUNDS: RangeInclusive<usize> = 5..=8;
pub const ACTION_ITEMS_BOUNDS: RangeInclusive<usize> = 2..=3;
pub const KEY_POINT_DESCRIPTION_MAX_CHARS: usize = 50;

const RAW_EXCERPT_MAX_CHARS: usize = 200;

/// The completion text could not be parsed as a summary
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Malformed summary at byte {offset}: {message}")]
pub struct ValidationError {
    /// Byte offset into the raw text where parsing stopped
    pub offset: usize,
    pub message: String,
    /// Leading part of the raw text, at most 200 characters
    pub raw_excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaViolation {
    #[error("`{field}` must not be empty")]
    Empty { field: &'static str },
    #[error("`{field}` has {actual} items, expected {min} to {max}")]
    Count {
        field: &'static str,
        min: usize,
        max: usize,
        actual: usize,
    },
    #[error("`{field}[{index}]` is {actual} characters long, limit is {max}")]
    TooLong {
        field: &'static str,
        index: usize,
        max: usize,
        actual: usize,
    },
    #[error("`{field}` contains {value:?} more than once")]
    Duplicate { field: &'static str, value: String },
}

/// A parsed summary broke one or more bounds
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Summary violates schema: {}", .violations.iter().join("; "))]
pub struct SchemaViolationError {
    pub violations: Vec<SchemaViolation>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    #[error(transparent)]
    Malformed(#[from] ValidationError),
    #[error(transparent)]
    Schema(#[from] SchemaViolationError),
}

/// Parses `raw` and enforces every bound of the summary schema
pub fn validate(raw: &str) -> Result<StructuredSummary, ResponseError> {
    let summary = parse(raw)?;

    let violations = check_bounds(&summary);
    if !violations.is_empty() {
        return Err(SchemaViolationError { violations }.into());
    }

    Ok(summary)
}

fn parse(raw: &str) -> Result<StructuredSummary, ValidationError> {
    serde_json::from_str::<StructuredSummary>(raw).map_err(|e| ValidationError {
        offset: byte_offset(raw, e.line(), e.column(), e.is_eof()),
        message: e.to_string(),
        raw_excerpt: raw.chars().take(RAW_EXCERPT_MAX_CHARS).collect(),
    })
}

/// serde_json reports 1-based lines and 1-based byte columns within the line.
/// At end of input the column sits on the last byte, so the offset is the
/// input length.
fn byte_offset(raw: &str, line: usize, column: usize, eof: bool) -> usize {
    let line_start: usize = raw
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();

    let column = if eof { column } else { column.saturating_sub(1) };
    (line_start + column).min(raw.len())
}

pub fn check_bounds(summary: &StructuredSummary) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();

    if summary.sub_title.trim().is_empty() {
        violations.push(SchemaViolation::Empty { field: "sub_title" });
    }

    check_count(
        &mut violations,
        "main_topics",
        summary.main_topics.len(),
        &MAIN_TOPICS_BOUNDS,
    );
    check_count(
        &mut violations,
        "key_points",
        summary.key_points.len(),
        &KEY_POINTS_BOUNDS,
    );

    for (index, point) in summary.key_points.iter().enumerate() {
        let actual = point.description.chars().count();
        if actual > KEY_POINT_DESCRIPTION_MAX_CHARS {
            violations.push(SchemaViolation::TooLong {
                field: "key_points.description",
                index,
                max: KEY_POINT_DESCRIPTION_MAX_CHARS,
                actual,
            });
        }
    }

    check_count(
        &mut violations,
        "keywords",
        summary.keywords.len(),
        &KEYWORDS_BOUNDS,
    );

    let mut seen = HashSet::new();
    for keyword in &summary.keywords {
        if !seen.insert(keyword.as_str()) {
            violations.push(SchemaViolation::Duplicate {
                field: "keywords",
                value: keyword.clone(),
            });
        }
    }

    check_count(
        &mut violations,
        "action_items",
        summary.action_items.len(),
        &ACTION_ITEMS_BOUNDS,
    );

    violations
}

fn check_count(
    violations: &mut Vec<SchemaViolation>,
    field: &'static str,
    actual: usize,
    bounds: &RangeInclusive<usize>,
) {
    if !bounds.contains(&actual) {
        violations.push(SchemaViolation::Count {
            field,
            min: *bounds.start(),
            max: *bounds.end(),
            actual,
        });
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn valid_json() -> Value {
        json!({
            "sub_title": "Rust ownership in practice",
            "overview": "A walkthrough of borrowing rules.",
            "main_topics": ["Ownership", "Borrowing", "Lifetimes", "Smart pointers"],
            "key_points": [
                { "title": "Moves", "description": "Values have exactly one owner." },
                { "title": "Borrows", "description": "References never outlive data." },
                { "title": "Rc", "description": "Shared ownership via counting." }
            ],
            "keywords": ["rust", "ownership", "borrowing", "lifetime", "memory"],
            "action_items": ["Rewrite a clone-heavy module", "Read the nomicon"]
        })
    }

    fn validate_value(value: &Value) -> Result<StructuredSummary, ResponseError> {
        validate(&value.to_string())
    }

    fn violations_of(value: &Value) -> Vec<SchemaViolation> {
        match validate_value(value) {
            Err(ResponseError::Schema(e)) => e.violations,
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    fn strings(n: usize) -> Value {
        Value::Array((0..n).map(|i| json!(format!("item {i}"))).collect())
    }

    fn key_points(n: usize) -> Value {
        Value::Array(
            (0..n)
                .map(|i| json!({ "title": format!("t{i}"), "description": "short" }))
                .collect(),
        )
    }

    #[test]
    fn test_accepts_valid_summary() {
        let summary = validate_value(&valid_json()).expect("summary should be valid");
        assert_eq!(summary.sub_title, "Rust ownership in practice");
        assert_eq!(summary.main_topics.len(), 4);
        assert_eq!(summary.key_points[1].title, "Borrows");
    }

    #[test]
    fn test_accepts_bounds_edges() {
        for (topics, points, keywords, actions) in [(3, 3, 5, 2), (5, 5, 8, 3)] {
            let mut value = valid_json();
            value["main_topics"] = strings(topics);
            value["key_points"] = key_points(points);
            value["keywords"] = strings(keywords);
            value["action_items"] = strings(actions);
            assert!(
                validate_value(&value).is_ok(),
                "bounds {topics}/{points}/{keywords}/{actions} should be accepted"
            );
        }
    }

    #[test]
    fn test_rejects_main_topics_out_of_bounds() {
        for n in [2, 6] {
            let mut value = valid_json();
            value["main_topics"] = strings(n);
            assert_eq!(
                violations_of(&value),
                vec![SchemaViolation::Count {
                    field: "main_topics",
                    min: 3,
                    max: 5,
                    actual: n
                }]
            );
        }
    }

    #[test]
    fn test_rejects_key_points_out_of_bounds() {
        for n in [2, 6] {
            let mut value = valid_json();
            value["key_points"] = key_points(n);
            assert_eq!(
                violations_of(&value),
                vec![SchemaViolation::Count {
                    field: "key_points",
                    min: 3,
                    max: 5,
                    actual: n
                }]
            );
        }
    }

    #[test]
    fn test_rejects_long_key_point_description() {
        let mut value = valid_json();
        value["key_points"][2]["description"] = json!("x".repeat(51));

        assert_eq!(
            violations_of(&value),
            vec![SchemaViolation::TooLong {
                field: "key_points.description",
                index: 2,
                max: 50,
                actual: 51
            }]
        );
    }

    #[test]
    fn test_description_length_counts_characters_not_bytes() {
        let mut value = valid_json();
        // 50 multi-byte characters sit exactly on the limit
        value["key_points"][0]["description"] = json!("要".repeat(50));
        assert!(validate_value(&value).is_ok());
    }

    #[test]
    fn test_rejects_keywords_out_of_bounds() {
        for n in [4, 9] {
            let mut value = valid_json();
            value["keywords"] = strings(n);
            assert_eq!(
                violations_of(&value),
                vec![SchemaViolation::Count {
                    field: "keywords",
                    min: 5,
                    max: 8,
                    actual: n
                }]
            );
        }
    }

    #[test]
    fn test_rejects_duplicate_keywords() {
        let mut value = valid_json();
        value["keywords"] = json!(["rust", "rust", "ownership", "borrowing", "memory"]);

        assert_eq!(
            violations_of(&value),
            vec![SchemaViolation::Duplicate {
                field: "keywords",
                value: "rust".into()
            }]
        );
    }

    #[test]
    fn test_rejects_action_items_out_of_bounds() {
        for n in [1, 4] {
            let mut value = valid_json();
            value["action_items"] = strings(n);
            assert_eq!(
                violations_of(&value),
                vec![SchemaViolation::Count {
                    field: "action_items",
                    min: 2,
                    max: 3,
                    actual: n
                }]
            );
        }
    }

    #[test]
    fn test_rejects_blank_sub_title() {
        let mut value = valid_json();
        value["sub_title"] = json!("   ");
        assert_eq!(
            violations_of(&value),
            vec![SchemaViolation::Empty { field: "sub_title" }]
        );
    }

    #[test]
    fn test_reports_every_violation() {
        let mut value = valid_json();
        value["main_topics"] = strings(1);
        value["action_items"] = strings(0);

        let violations = violations_of(&value);
        assert_eq!(violations.len(), 2);

        let message = SchemaViolationError { violations }.to_string();
        assert!(message.contains("main_topics"), "got: {message}");
        assert!(message.contains("action_items"), "got: {message}");
    }

    #[test]
    fn test_truncated_output_reports_offset_and_excerpt() {
        let raw = r#"{"sub_title": "X", "overview":"#;

        let Err(ResponseError::Malformed(err)) = validate(raw) else {
            panic!("truncated output must be malformed");
        };

        assert!(err.raw_excerpt.starts_with(r#"{"sub_title": "X""#));
        assert_eq!(err.offset, raw.len());
        assert!(err.message.contains("EOF"), "got: {}", err.message);
    }

    #[test]
    fn test_excerpt_is_capped() {
        let raw = format!("not json {}", "a".repeat(500));

        let Err(ResponseError::Malformed(err)) = validate(&raw) else {
            panic!("prose must be malformed");
        };

        assert_eq!(err.raw_excerpt.chars().count(), 200);
        assert!(err.offset <= raw.len());
    }

    #[test]
    fn test_offset_on_later_line() {
        let raw = "{\n  \"sub_title\": \"X\",\n  \"overview\": ]\n}";

        let Err(ResponseError::Malformed(err)) = validate(raw) else {
            panic!("invalid token must be malformed");
        };

        assert_eq!(err.offset, raw.find(']').unwrap());
    }

    #[test]
    fn test_offset_points_at_offending_byte() {
        let raw = r#"{"sub_title": ]"#;

        let Err(ResponseError::Malformed(err)) = validate(raw) else {
            panic!("invalid token must be malformed");
        };

        assert_eq!(err.offset, 14);
        assert_eq!(&raw[err.offset..=err.offset], "]");
    }

    #[test]
    fn test_rejects_code_fenced_output() {
        let raw = format!("```json\n{}\n```", valid_json());
        assert!(matches!(validate(&raw), Err(ResponseError::Malformed(_))));
    }

    #[test]
    fn test_rejects_unknown_and_missing_fields() {
        let mut extra = valid_json();
        extra["mood"] = json!("upbeat");
        assert!(matches!(
            validate_value(&extra),
            Err(ResponseError::Malformed(_))
        ));

        let mut missing = valid_json();
        missing.as_object_mut().unwrap().remove("keywords");
        assert!(matches!(
            validate_value(&missing),
            Err(ResponseError::Malformed(_))
        ));
    }
}
