//! Rule tables for every input the account service accepts.
//!
//! Field messages reuse the service's own codes (`InvalidEmail`,
//! `InvalidLength`, ...) so local and remote violations read the same.

use account_client_domain::{ALLOWED_PAGE_LIMITS, Gender, MAX_PAGE, Role};
use account_client_shared::rules::{
    OBJECT_ID_LEN, each, in_date_range, is_alphanumeric, is_array, is_boolean, is_date_like,
    is_email, is_in, is_integer, is_lowercase, is_number, is_object_id, is_string, length,
    matches, max, min, nested, nullable,
};
use account_client_shared::{Rule, Schema, format_date, parse_date_like};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::sync::LazyLock;

const NAME_PATTERN: &str = "^[a-zA-Z ]+$";
const OPTIONAL_NAME_PATTERN: &str = "^[a-zA-Z ]*$";
const COMPARE_KEYS: [&str; 5] = ["eq", "gt", "gte", "lt", "lte"];

/// Arguments of the `get` query.
pub static GET_USER_ARGS: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("GetArgs")
        .field("id", [is_string(), length(OBJECT_ID_LEN, OBJECT_ID_LEN)])
        .field("username", username_rules())
        .field("email", [is_email()])
});

/// The `data` of the `create` mutation.
pub static CREATE_USER_INPUT: LazyLock<Schema> = LazyLock::new(|| {
    with_birthday(
        Schema::new("CreateInput")
            .field("email", [is_email().with_message("InvalidEmail")])
            .field("firstName", name_rules(NAME_PATTERN, 2, "InvalidFirstName"))
            .field("lastName", name_rules(NAME_PATTERN, 2, "InvalidLastName"))
            .field("role", [role_rule()])
            .field("password", [length(8, 32).with_message("InvalidLength")])
            .field("username", username_rules())
            .field("active", [is_boolean()])
            .field("gender", [gender_rule()]),
    )
    .field("groups", group_rules())
});

/// The `data` of the `update` mutation; every field is optional.
pub static UPDATE_USER_INPUT: LazyLock<Schema> = LazyLock::new(|| {
    with_birthday(
        Schema::new("UpdateInput")
            .field("email", [is_email().with_message("InvalidEmail")])
            .field(
                "firstName",
                name_rules(OPTIONAL_NAME_PATTERN, 0, "InvalidFirstName"),
            )
            .field(
                "lastName",
                name_rules(OPTIONAL_NAME_PATTERN, 0, "InvalidLastName"),
            )
            .field("role", [role_rule()])
            .field("password", [length(8, 32).with_message("InvalidLength")])
            .field("username", username_rules())
            .field("active", [is_boolean()])
            .field("gender", [gender_rule()]),
    )
    .field("updateLastLogin", [is_boolean()])
    .field("groups", group_rules())
});

/// The `filters` of the `find` query.
pub static USER_FILTER: LazyLock<Schema> = LazyLock::new(|| {
    let schema = Schema::new("FilterInput")
        .field("active", [is_boolean()])
        .field("gender", [nested("isGenderQuery", gender_query_schema())])
        .field("role", [nested("isRoleQuery", role_query_schema())])
        .field("deleted", [is_boolean()])
        .field("deletedAt", [compare_date_rule(true)])
        .field("createdAt", [compare_date_rule(false)])
        .field("updatedAt", [compare_date_rule(false)])
        .field("lastLogin", [compare_date_rule(true)])
        .field("birthday", [compare_date_rule(true)])
        .field("groups", group_rules());

    ["deletedAt", "createdAt", "updatedAt", "lastLogin", "birthday"]
        .into_iter()
        .fold(schema, |schema, field| {
            schema.with_normalizer(field, normalize_compare)
        })
});

/// Id argument of `update` and `delete`.
pub static ID_INPUT: LazyLock<Schema> =
    LazyLock::new(|| Schema::new("IDInput").field("id", [is_object_id()]));

/// A user record as returned by the service (wire field names).
pub static USER_ENTITY: LazyLock<Schema> = LazyLock::new(|| {
    Schema::new("User")
        .field("_id", [length(OBJECT_ID_LEN, OBJECT_ID_LEN)])
        .field("username", username_rules())
        .field("email", [is_email()])
        .field("firstName", entity_name_rules())
        .field("lastName", entity_name_rules())
        .field("role", [role_rule()])
        .field("gender", [nullable(gender_rule())])
        .field("birthday", [is_date_like(true)])
        .field("active", [is_boolean()])
        .field("createdAt", [is_date_like(false)])
        .field("updatedAt", [is_date_like(false)])
        .field("deletedAt", [is_date_like(true)])
        .field("deleted", [is_boolean()])
        .field("lastLogin", [is_date_like(true)])
        .field("groups", group_rules())
});

/// Pagination input with defaults `page = 1`, `offset = 0` and
/// `limit = default_limit`.
#[must_use]
pub fn pagination_schema(default_limit: u32) -> Schema {
    Schema::new("PaginationInput")
        .field("page", [is_number(), is_integer(), min(1.0), max(f64::from(MAX_PAGE))])
        .field("offset", [is_number(), is_integer(), min(0.0)])
        .field("limit", [is_number(), is_in(ALLOWED_PAGE_LIMITS)])
        .with_default("page", 1)
        .with_default("offset", 0)
        .with_default("limit", default_limit)
}

/// Earliest and latest accepted birthdays.
#[must_use]
pub fn birthday_range() -> (DateTime<Utc>, DateTime<Utc>) {
    (utc_date(1950, 2, 1), utc_date(2001, 1, 31))
}

fn utc_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn with_birthday(schema: Schema) -> Schema {
    let (earliest, latest) = birthday_range();
    schema
        .field(
            "birthday",
            [is_date_like(true), in_date_range(earliest, latest)],
        )
        .with_normalizer("birthday", normalize_date)
}

fn username_rules() -> [Rule; 3] {
    [
        length(4, 32).with_message("InvalidLength"),
        is_lowercase().with_message("NotLowercase"),
        is_alphanumeric().with_message("NotAlphanumeric"),
    ]
}

fn name_rules(pattern: &str, min_len: usize, message: &'static str) -> [Rule; 2] {
    [
        matches(pattern).with_message(message),
        length(min_len, 32).with_message("InvalidLength"),
    ]
}

fn entity_name_rules() -> [Rule; 3] {
    [
        is_string(),
        length(2, 32).with_message("InvalidLength"),
        matches(NAME_PATTERN),
    ]
}

fn role_rule() -> Rule {
    is_in(Role::ALL.map(Role::as_str)).with_message("Invalid")
}

fn gender_rule() -> Rule {
    is_in(Gender::ALL.map(Gender::as_str)).with_message("InvalidGender")
}

fn group_rules() -> [Rule; 2] {
    [
        is_array(),
        each(length(OBJECT_ID_LEN, OBJECT_ID_LEN)).with_message("InvalidIDLength"),
    ]
}

fn role_query_schema() -> Schema {
    let role = || is_in(Role::ALL.map(Role::as_str));
    Schema::new("RoleQuery")
        .field("eq", [role()])
        .field("in", [is_array(), each(role())])
}

fn gender_query_schema() -> Schema {
    let gender = || is_in(Gender::ALL.map(Gender::as_str)).with_message("Invalid");
    Schema::new("GenderQuery")
        .field("eq", [gender()])
        .field("in", [is_array(), each(gender())])
}

fn compare_date_schema(nullable_eq: bool) -> Schema {
    let name = if nullable_eq {
        "CompareNullableDateInput"
    } else {
        "CompareDateInput"
    };
    COMPARE_KEYS
        .into_iter()
        .fold(Schema::new(name), |schema, key| {
            let allow_null = nullable_eq && key == "eq";
            schema.field(key, [is_date_like(allow_null).with_message("isDate")])
        })
}

fn compare_date_rule(nullable_eq: bool) -> Rule {
    nested("isCompareDateInput", compare_date_schema(nullable_eq))
        .with_message("Invalid Compare Date Input")
}

fn normalize_date(value: Value) -> Value {
    match parse_date_like(&value) {
        Some(date) => Value::String(format_date(&date)),
        None => value,
    }
}

fn normalize_compare(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, normalize_date(value)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use account_client_shared::{FieldBag, UNKNOWN_FIELD_CONSTRAINT, Validated, ValidationErrors};
    use serde_json::json;

    fn bag(value: Value) -> FieldBag {
        FieldBag::from_value(value).unwrap_or_default()
    }

    fn errors(schema: &Schema, value: Value) -> Option<ValidationErrors> {
        schema.validate(bag(value)).err()
    }

    #[test]
    fn get_args_shapes() {
        assert!(errors(&GET_USER_ARGS, json!({ "id": "1".repeat(24) })).is_none());
        assert!(errors(&GET_USER_ARGS, json!({ "username": "johndoe" })).is_none());

        let failed = errors(&GET_USER_ARGS, json!({ "id": "longid".repeat(10) }));
        assert!(failed.is_some_and(|errors| errors.has_constraint("id", "length")));

        let failed = errors(&GET_USER_ARGS, json!({ "username": "John_Doe" }));
        assert!(failed.is_some_and(|errors| {
            errors.has_constraint("username", "isLowercase")
                && errors.has_constraint("username", "isAlphanumeric")
        }));
    }

    #[test]
    fn create_input_reports_every_bad_field() -> Result<(), Box<dyn std::error::Error>> {
        let failed = errors(
            &CREATE_USER_INPUT,
            json!({
                "email": "invalid",
                "firstName": "R2D2",
                "lastName": "D",
                "role": "ROOT",
                "password": "short",
                "gender": "asd"
            }),
        )
        .ok_or("create input must fail")?;
        assert_eq!(
            failed.fields().collect::<Vec<_>>(),
            ["email", "firstName", "gender", "lastName", "password", "role"]
        );
        assert_eq!(
            failed.violations("email").first().map(|v| v.message.as_ref()),
            Some("InvalidEmail")
        );
        assert!(failed.has_constraint("lastName", "length"));
        assert!(!failed.has_constraint("lastName", "matches"));
        Ok(())
    }

    #[test]
    fn create_input_normalizes_birthday() -> Result<(), ValidationErrors> {
        let validated = CREATE_USER_INPUT
            .validate(bag(json!({ "birthday": "04/19/1995" })))
            .map(Validated::into_inner)?;
        assert_eq!(
            validated.get("birthday"),
            Some(&json!("1995-04-19T00:00:00.000Z"))
        );

        let validated = CREATE_USER_INPUT
            .validate(bag(json!({ "birthday": null })))
            .map(Validated::into_inner)?;
        assert_eq!(validated.get("birthday"), Some(&Value::Null));
        Ok(())
    }

    #[test]
    fn birthday_outside_range_fails() {
        let failed = errors(&CREATE_USER_INPUT, json!({ "birthday": "1945-02-01" }));
        assert!(failed.is_some_and(|errors| errors.has_constraint("birthday", "isInDateRange")));

        let failed = errors(&UPDATE_USER_INPUT, json!({ "birthday": "asd" }));
        assert!(failed.is_some_and(|errors| errors.has_constraint("birthday", "isDateLike")));
    }

    #[test]
    fn update_input_allows_empty_names_and_groups() {
        assert!(
            errors(
                &UPDATE_USER_INPUT,
                json!({ "firstName": "", "groups": ["i".repeat(24)], "updateLastLogin": true })
            )
            .is_none()
        );
        let failed = errors(&UPDATE_USER_INPUT, json!({ "firstName": "F".repeat(33) }));
        assert!(failed.is_some_and(|errors| errors.has_constraint("firstName", "length")));

        let failed = errors(&UPDATE_USER_INPUT, json!({ "groups": ["asd"] }));
        assert!(failed.is_some_and(|errors| errors.has_constraint("groups", "length")));
    }

    #[test]
    fn unknown_fields_are_rejected_everywhere() {
        for schema in [&*CREATE_USER_INPUT, &*UPDATE_USER_INPUT, &*USER_FILTER] {
            let failed = errors(schema, json!({ "nope": 1 }));
            assert!(failed.is_some_and(|errors| errors.has_constraint("nope", UNKNOWN_FIELD_CONSTRAINT)));
        }
    }

    #[test]
    fn filter_queries_are_checked_nested() {
        assert!(
            errors(
                &USER_FILTER,
                json!({
                    "role": { "in": ["ADMIN", "STUDENT"] },
                    "gender": { "eq": "FEMALE" },
                    "deletedAt": { "eq": null },
                    "createdAt": { "gte": "2018-01-01", "lt": "2019-01-01" }
                })
            )
            .is_none()
        );

        let failed = errors(&USER_FILTER, json!({ "role": { "eq": "ROOT" } }));
        assert!(failed.is_some_and(|errors| errors.has_constraint("role", "isRoleQuery")));

        let failed = errors(&USER_FILTER, json!({ "createdAt": { "eq": null } }));
        assert!(failed.is_some_and(|errors| errors.has_constraint("createdAt", "isCompareDateInput")));

        let failed = errors(&USER_FILTER, json!({ "lastLogin": { "after": "2018-01-01" } }));
        assert!(failed.is_some_and(|errors| errors.has_error("lastLogin")));
    }

    #[test]
    fn filter_dates_are_sent_canonical() -> Result<(), ValidationErrors> {
        let validated = USER_FILTER
            .validate(bag(json!({ "createdAt": { "gte": "01/02/2018" } })))
            .map(Validated::into_inner)?;
        assert_eq!(
            validated.get("createdAt"),
            Some(&json!({ "gte": "2018-01-02T00:00:00.000Z" }))
        );
        Ok(())
    }

    #[test]
    fn pagination_defaults_fill_empty_input() -> Result<(), ValidationErrors> {
        let validated = pagination_schema(25)
            .validate(FieldBag::new())
            .map(Validated::into_inner)?;
        assert_eq!(validated.into_value(), json!({ "page": 1, "offset": 0, "limit": 25 }));
        Ok(())
    }

    #[test]
    fn pagination_accepts_float_spelled_limit() {
        assert_eq!(errors(&pagination_schema(25), json!({ "limit": 25.0 })), None);
    }

    #[test]
    fn pagination_rejects_unlisted_limit() {
        let failed = errors(&pagination_schema(25), json!({ "limit": 7 }));
        assert!(failed.is_some_and(|errors| {
            errors.fields().collect::<Vec<_>>() == ["limit"] && errors.has_constraint("limit", "isIn")
        }));

        let failed = errors(&pagination_schema(25), json!({ "page": 0, "offset": -1 }));
        assert!(failed.is_some_and(|errors| errors.len() == 2));
    }

    #[test]
    fn id_input_requires_hex_object_id() {
        assert!(errors(&ID_INPUT, json!({ "id": "5b2a4f6e8d1c3e0012345678" })).is_none());
        assert!(errors(&ID_INPUT, json!({ "id": "1".repeat(24) })).is_none());
        let failed = errors(&ID_INPUT, json!({ "id": "i".repeat(24) }));
        assert!(failed.is_some_and(|errors| errors.has_constraint("id", "isMongoId")));
    }

    #[test]
    fn entity_schema_accepts_nulls_on_nullable_fields() {
        assert!(
            errors(
                &USER_ENTITY,
                json!({
                    "_id": "1".repeat(24),
                    "gender": null,
                    "birthday": null,
                    "deletedAt": null,
                    "lastLogin": null,
                    "createdAt": "2018-01-01T00:00:00.000Z"
                })
            )
            .is_none()
        );
        let failed = errors(&USER_ENTITY, json!({ "createdAt": null }));
        assert!(failed.is_some_and(|errors| errors.has_error("createdAt")));
    }
}
