//! Reusable validation rules.
//!
//! Constraint names match the vocabulary the account service reports back
//! (`length`, `isEmail`, `isIn`, ...), so local and remote violations read
//! the same way.

use crate::dates::parse_date_like;
use crate::validation::{FieldBag, Rule, Schema};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::cmp::Ordering;
use std::sync::LazyLock;

const EMAIL_PATTERN: &str = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$";

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

/// Length of the opaque object identifiers the service issues.
pub const OBJECT_ID_LEN: usize = 24;

/// Value is a JSON string.
pub fn is_string() -> Rule {
    Rule::on_value("isString", "must be a string", Value::is_string)
}

/// Value is a JSON boolean.
pub fn is_boolean() -> Rule {
    Rule::on_value("isBoolean", "must be a boolean value", Value::is_boolean)
}

/// Value is a finite JSON number.
pub fn is_number() -> Rule {
    Rule::on_value("isNumber", "must be a number", |value| {
        value.as_f64().is_some_and(f64::is_finite)
    })
}

/// Value is a number with no fractional part.
pub fn is_integer() -> Rule {
    Rule::on_value("isInt", "must be an integer number", |value| {
        value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|n| n.fract() == 0.0)
    })
}

/// Numeric value is at least `bound`.
pub fn min(bound: f64) -> Rule {
    Rule::on_value("min", format!("must not be less than {bound}"), move |value| {
        value.as_f64().is_some_and(|number| number >= bound)
    })
}

/// Numeric value is at most `bound`.
pub fn max(bound: f64) -> Rule {
    Rule::on_value("max", format!("must not be greater than {bound}"), move |value| {
        value.as_f64().is_some_and(|number| number <= bound)
    })
}

/// String length in characters is within `[min, max]`.
pub fn length(min: usize, max: usize) -> Rule {
    Rule::on_value(
        "length",
        format!("length must be between {min} and {max} characters"),
        move |value| {
            value
                .as_str()
                .is_some_and(|text| (min..=max).contains(&text.chars().count()))
        },
    )
}

/// String matches `pattern`. An invalid pattern never matches.
pub fn matches(pattern: &str) -> Rule {
    let regex = Regex::new(pattern).ok();
    Rule::on_value("matches", format!("must match {pattern}"), move |value| {
        match (value.as_str(), regex.as_ref()) {
            (Some(text), Some(regex)) => regex.is_match(text),
            _ => false,
        }
    })
}

/// String contains no uppercase characters.
pub fn is_lowercase() -> Rule {
    Rule::on_value("isLowercase", "must be a lowercase string", |value| {
        value.as_str().is_some_and(|text| text == text.to_lowercase())
    })
}

/// String is non-empty and made only of ASCII letters and digits.
pub fn is_alphanumeric() -> Rule {
    Rule::on_value("isAlphanumeric", "must contain only letters and numbers", |value| {
        value
            .as_str()
            .is_some_and(|text| !text.is_empty() && text.chars().all(|c| c.is_ascii_alphanumeric()))
    })
}

/// String has an email address shape.
pub fn is_email() -> Rule {
    Rule::on_value("isEmail", "must be an email", |value| {
        value.as_str().is_some_and(is_email_str)
    })
}

/// Returns true when `text` has an email address shape.
pub fn is_email_str(text: &str) -> bool {
    EMAIL.as_ref().is_some_and(|regex| regex.is_match(text))
}

/// Value equals one of `allowed`.
pub fn is_in<I, V>(allowed: I) -> Rule
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let allowed: Vec<Value> = allowed.into_iter().map(Into::into).collect();
    let listed = allowed
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Rule::on_value(
        "isIn",
        format!("must be one of the following values: {listed}"),
        move |value| allowed.iter().any(|candidate| same_value(candidate, value)),
    )
}

/// JSON equality where numbers compare by numeric value, so `25` and `25.0` match.
fn same_value(left: &Value, right: &Value) -> bool {
    match (left.as_f64(), right.as_f64()) {
        (Some(left), Some(right)) => left.partial_cmp(&right) == Some(Ordering::Equal),
        _ => left == right,
    }
}

/// Value is a JSON array.
pub fn is_array() -> Rule {
    Rule::on_value("isArray", "must be an array", Value::is_array)
}

/// Value is an array whose every element satisfies `rule`.
///
/// The element rule's constraint name is reported.
pub fn each(rule: Rule) -> Rule {
    let constraint = rule.constraint();
    let message = format!("each value: {}", rule.message());
    Rule::on_value(constraint, message, move |value| {
        value
            .as_array()
            .is_some_and(|items| items.iter().all(|item| rule.check_value(item)))
    })
}

/// Value is an object that passes `schema`.
pub fn nested(constraint: &'static str, schema: Schema) -> Rule {
    let message = format!("must be a valid {}", schema.name());
    Rule::on_value(constraint, message, move |value| match value {
        Value::Object(map) => schema.check(&FieldBag::from(map.clone())).is_ok(),
        _ => false,
    })
}

/// Accept `null`, otherwise defer to `rule`.
pub fn nullable(rule: Rule) -> Rule {
    let constraint = rule.constraint();
    let message = rule.message().to_owned();
    Rule::on_value(constraint, message, move |value| {
        value.is_null() || rule.check_value(value)
    })
}

/// Value parses as a date; `null` is accepted when `nullable`.
pub fn is_date_like(nullable: bool) -> Rule {
    Rule::on_value("isDateLike", "value is not date like", move |value| {
        (nullable && value.is_null()) || parse_date_like(value).is_some()
    })
}

/// Date value falls within `[min, max]`; empty values are accepted.
pub fn in_date_range(min: DateTime<Utc>, max: DateTime<Utc>) -> Rule {
    let message = format!(
        "Date not in between {} to {}.",
        min.format("%a %b %d %Y"),
        max.format("%a %b %d %Y")
    );
    Rule::on_value("isInDateRange", message, move |value| {
        if is_empty_value(value) {
            return true;
        }
        parse_date_like(value).is_some_and(|date| date >= min && date <= max)
    })
}

/// String is a 24-character hexadecimal object id.
pub fn is_object_id() -> Rule {
    Rule::on_value("isMongoId", "must be a mongodb id", |value| {
        value.as_str().is_some_and(is_object_id_str)
    })
}

/// Returns true when `text` is a 24-character hexadecimal object id.
pub fn is_object_id_str(text: &str) -> bool {
    text.len() == OBJECT_ID_LEN && text.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::String(text) => text.is_empty(),
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::Array(_) | Value::Object(_) => false,
    }
}
