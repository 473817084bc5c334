//! Schema validation engine for field bags.
//!
//! A [`Schema`] is a declarative table of field names and the [`Rule`]s that
//! apply to each. Every rule attached through [`Schema::field`] is wrapped in
//! [`only_if_present`], so absent fields are never checked; callers that need
//! a field to exist gate presence before validating. Keys the schema does not
//! declare are rejected, and every violation is collected before returning.

use crate::errors::{ErrorCode, ErrorEnvelope};
use crate::invariants::Validated;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Constraint name reported for keys a schema does not declare.
pub const UNKNOWN_FIELD_CONSTRAINT: &str = "whitelistValidation";

/// Ordered mapping of field name to JSON value.
///
/// An absent key and a present `null` are different: absence means "do not
/// validate or send", while `null` is an explicit value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldBag(Map<String, Value>);

impl FieldBag {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Build a bag from a JSON value; only objects qualify.
    #[must_use]
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    /// Insert or replace a field.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Insert a field only when a value is provided.
    pub fn insert_opt<V: Into<Value>>(&mut self, field: &str, value: Option<V>) {
        if let Some(value) = value {
            self.0.insert(field.to_owned(), value.into());
        }
    }

    /// Borrow a field value.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns true when the key is present (even if `null`).
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when the bag has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over field names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Borrow the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON object value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for FieldBag {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<FieldBag> for Value {
    fn from(bag: FieldBag) -> Self {
        bag.into_value()
    }
}

type BagCheck = dyn Fn(&FieldBag, &str) -> bool + Send + Sync;
type ValueCheck = dyn Fn(&Value) -> bool + Send + Sync;
type Normalizer = dyn Fn(Value) -> Value + Send + Sync;

#[derive(Clone)]
enum Check {
    Bag(Arc<BagCheck>),
    Value(Arc<ValueCheck>),
}

/// A named predicate over one field of a bag.
#[derive(Clone)]
pub struct Rule {
    constraint: &'static str,
    message: Box<str>,
    check: Check,
}

impl Rule {
    /// Build a rule that sees the whole bag and the field name.
    pub fn new(
        constraint: &'static str,
        message: impl Into<Box<str>>,
        check: impl Fn(&FieldBag, &str) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            constraint,
            message: message.into(),
            check: Check::Bag(Arc::new(check)),
        }
    }

    /// Build a rule that only inspects the field value; absent values fail.
    pub fn on_value(
        constraint: &'static str,
        message: impl Into<Box<str>>,
        check: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            constraint,
            message: message.into(),
            check: Check::Value(Arc::new(check)),
        }
    }

    /// Replace the human message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<Box<str>>) -> Self {
        self.message = message.into();
        self
    }

    /// Constraint name reported on failure.
    #[must_use]
    pub const fn constraint(&self) -> &'static str {
        self.constraint
    }

    /// Human message reported on failure.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Evaluate the rule against `field` of `bag`.
    #[must_use]
    pub fn check(&self, bag: &FieldBag, field: &str) -> bool {
        match &self.check {
            Check::Bag(check) => check(bag, field),
            Check::Value(check) => bag.get(field).is_some_and(|value| check(value)),
        }
    }

    /// Evaluate the rule against a standalone value.
    #[must_use]
    pub fn check_value(&self, value: &Value) -> bool {
        match &self.check {
            Check::Value(check) => check(value),
            Check::Bag(check) => {
                let bag = FieldBag::new().with("value", value.clone());
                check(&bag, "value")
            },
        }
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Rule")
            .field("constraint", &self.constraint)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Gate a rule so it is satisfied whenever the field is absent.
pub fn only_if_present(rule: Rule) -> Rule {
    let Rule {
        constraint,
        message,
        check,
    } = rule;
    let gated = move |bag: &FieldBag, field: &str| match bag.get(field) {
        None => true,
        Some(value) => match &check {
            Check::Bag(check) => check(bag, field),
            Check::Value(check) => check(value),
        },
    };
    Rule::new(constraint, message, gated)
}

#[derive(Clone)]
struct FieldSpec {
    name: &'static str,
    rules: Vec<Rule>,
    default: Option<Value>,
    normalizer: Option<Arc<Normalizer>>,
}

impl FieldSpec {
    const fn new(name: &'static str) -> Self {
        Self {
            name,
            rules: Vec::new(),
            default: None,
            normalizer: None,
        }
    }
}

/// Declarative rule table for one input shape.
#[derive(Clone)]
pub struct Schema {
    name: &'static str,
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// Create an empty schema.
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            fields: Vec::new(),
        }
    }

    /// Declare a field and its rules; every rule is gated on presence.
    #[must_use]
    pub fn field(mut self, name: &'static str, rules: impl IntoIterator<Item = Rule>) -> Self {
        let gated = rules.into_iter().map(only_if_present);
        if let Some(spec) = self.spec_mut(name) {
            spec.rules.extend(gated);
        }
        self
    }

    /// Fill `name` with `value` when it is absent.
    #[must_use]
    pub fn with_default(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        if let Some(spec) = self.spec_mut(name) {
            spec.default = Some(value.into());
        }
        self
    }

    /// Coerce a present value after validation succeeds.
    #[must_use]
    pub fn with_normalizer(
        mut self,
        name: &'static str,
        normalizer: impl Fn(Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        if let Some(spec) = self.spec_mut(name) {
            spec.normalizer = Some(Arc::new(normalizer));
        }
        self
    }

    fn spec_mut(&mut self, name: &'static str) -> Option<&mut FieldSpec> {
        if !self.declares(name) {
            self.fields.push(FieldSpec::new(name));
        }
        self.fields.iter_mut().find(|spec| spec.name == name)
    }

    /// Schema name used in error reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Declared field names, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|spec| spec.name)
    }

    /// Returns true when the schema declares `field`.
    #[must_use]
    pub fn declares(&self, field: &str) -> bool {
        self.fields.iter().any(|spec| spec.name == field)
    }

    /// Check a bag as-is (no defaults, no normalization).
    pub fn check(&self, bag: &FieldBag) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new(self.name);

        for key in bag.keys() {
            if !self.declares(key) {
                errors.push(
                    key,
                    UNKNOWN_FIELD_CONSTRAINT,
                    format!("property {key} should not exist"),
                );
            }
        }

        for spec in &self.fields {
            for rule in &spec.rules {
                if !rule.check(bag, spec.name) {
                    errors.push(spec.name, rule.constraint(), rule.message());
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Apply defaults, check every rule, then normalize present values.
    pub fn validate(&self, mut bag: FieldBag) -> Result<Validated<FieldBag>, ValidationErrors> {
        for spec in &self.fields {
            if let Some(default) = spec.default.as_ref() {
                if !bag.contains(spec.name) {
                    bag.insert(spec.name, default.clone());
                }
            }
        }

        self.check(&bag)?;

        for spec in &self.fields {
            let Some(normalizer) = spec.normalizer.as_ref() else {
                continue;
            };
            if let Some(value) = bag.remove(spec.name) {
                bag.insert(spec.name, normalizer(value));
            }
        }

        Ok(Validated::new(bag))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Schema")
            .field("name", &self.name)
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .finish()
    }
}

/// One failed rule on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Constraint name (for example `length` or `isEmail`).
    pub constraint: Box<str>,
    /// Human-readable message.
    pub message: Box<str>,
}

/// Aggregated violations for one validation pass.
///
/// A field is listed iff at least one of its rules failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    schema: Box<str>,
    fields: BTreeMap<String, Vec<FieldViolation>>,
}

impl ValidationErrors {
    /// Create an empty error set for `schema`.
    pub fn new(schema: impl Into<Box<str>>) -> Self {
        Self {
            schema: schema.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Record a violation.
    pub fn push(
        &mut self,
        field: impl Into<String>,
        constraint: impl Into<Box<str>>,
        message: impl Into<Box<str>>,
    ) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(FieldViolation {
                constraint: constraint.into(),
                message: message.into(),
            });
    }

    /// Fold another error set in; violations on the same field accumulate.
    pub fn merge(&mut self, other: Self) {
        for (field, violations) in other.fields {
            self.fields.entry(field).or_default().extend(violations);
        }
    }

    /// Schema the errors were produced by.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns true when nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of offending fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Offending field names, sorted.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Violations recorded for `field`.
    #[must_use]
    pub fn violations(&self, field: &str) -> &[FieldViolation] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    /// Returns true when `field` has any violation.
    #[must_use]
    pub fn has_error(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// Returns true when `field` violated `constraint`.
    #[must_use]
    pub fn has_constraint(&self, field: &str, constraint: &str) -> bool {
        self.violations(field)
            .iter()
            .any(|violation| violation.constraint.as_ref() == constraint)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{} validation failed:", self.schema)?;
        for (index, (field, violations)) in self.fields.iter().enumerate() {
            let separator = if index == 0 { " " } else { "; " };
            let constraints: Vec<&str> = violations
                .iter()
                .map(|violation| violation.constraint.as_ref())
                .collect();
            write!(formatter, "{separator}{field} ({})", constraints.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for ErrorEnvelope {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors.fields().collect::<Vec<_>>().join(",");
        Self::expected(ErrorCode::validation_failed(), errors.to_string())
            .with_metadata("schema", errors.schema())
            .with_metadata("fields", fields)
    }
}
