//! Mapping between wire JSON and the domain `User` / `Page`.

use crate::fragment::FieldSelection;
use crate::schemas::USER_ENTITY;
use account_client_domain::{Gender, Nullable, ObjectId, Page, Role, User, UserField};
use account_client_shared::{FieldBag, ValidationErrors, format_date, parse_date_like};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::fmt;

/// Why a response payload could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload is not a JSON object.
    NotAnObject(&'static str),
    /// The record carries none of the selected fields.
    NoFields,
    /// The record failed entity validation.
    Invalid(ValidationErrors),
    /// A required key is missing or has the wrong type.
    BadField(&'static str),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject(what) => write!(formatter, "{what} is not an object"),
            Self::NoFields => formatter.write_str("user record has no selected fields"),
            Self::Invalid(errors) => write!(formatter, "{errors}"),
            Self::BadField(field) => write!(formatter, "field `{field}` is missing or malformed"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decode one user record, looking only at the selected fields.
pub fn decode_user(value: &Value, selection: &FieldSelection) -> Result<User, DecodeError> {
    let Value::Object(record) = value else {
        return Err(DecodeError::NotAnObject("user"));
    };

    let mut bag = FieldBag::new();
    for field in selection.fields() {
        if let Some(value) = record.get(field.as_str()) {
            bag.insert(field.as_str(), value.clone());
        }
    }
    if bag.is_empty() {
        return Err(DecodeError::NoFields);
    }
    let bag = USER_ENTITY
        .validate(bag)
        .map_err(DecodeError::Invalid)?
        .into_inner();

    let mut user = User::default();
    for (name, value) in bag.as_map() {
        let Ok(field) = name.parse::<UserField>() else {
            continue;
        };
        assign(&mut user, field, value)?;
    }
    Ok(user)
}

fn assign(user: &mut User, field: UserField, value: &Value) -> Result<(), DecodeError> {
    let name = field.as_str();
    let text = || value.as_str().map(str::to_owned).ok_or(DecodeError::BadField(name));
    let flag = || value.as_bool().ok_or(DecodeError::BadField(name));
    let date = || parse_date_like(value).ok_or(DecodeError::BadField(name));
    let nullable_date = || -> Result<Nullable<DateTime<Utc>>, DecodeError> {
        if value.is_null() {
            Ok(Nullable::Null)
        } else {
            date().map(Nullable::Value)
        }
    };

    match field {
        UserField::Id => {
            user.id = Some(ObjectId::parse(text()?).map_err(|_| DecodeError::BadField(name))?);
        },
        UserField::Email => user.email = Some(text()?),
        UserField::Username => user.username = Some(text()?),
        UserField::FirstName => user.first_name = Some(text()?),
        UserField::LastName => user.last_name = Some(text()?),
        UserField::Role => {
            user.role = Some(text()?.parse::<Role>().map_err(|_| DecodeError::BadField(name))?);
        },
        UserField::Gender => {
            user.gender = Some(if value.is_null() {
                Nullable::Null
            } else {
                Nullable::Value(text()?.parse::<Gender>().map_err(|_| DecodeError::BadField(name))?)
            });
        },
        UserField::Birthday => user.birthday = Some(nullable_date()?),
        UserField::Active => user.active = Some(flag()?),
        UserField::CreatedAt => user.created_at = Some(date()?),
        UserField::UpdatedAt => user.updated_at = Some(date()?),
        UserField::DeletedAt => user.deleted_at = Some(nullable_date()?),
        UserField::Deleted => user.deleted = Some(flag()?),
        UserField::LastLogin => user.last_login = Some(nullable_date()?),
        UserField::Groups => {
            let groups = value
                .as_array()
                .ok_or(DecodeError::BadField(name))?
                .iter()
                .map(|group| {
                    group
                        .as_str()
                        .and_then(|group| ObjectId::parse(group).ok())
                        .ok_or(DecodeError::BadField(name))
                })
                .collect::<Result<Vec<_>, _>>()?;
            user.groups = Some(groups);
        },
    }
    Ok(())
}

/// Encode the populated fields of `user` with wire names and string dates.
#[must_use]
pub fn encode_user(user: &User) -> Value {
    let date = |value: &DateTime<Utc>| Value::String(format_date(value));
    let nullable_date = |value: &Nullable<DateTime<Utc>>| {
        value.as_value().map_or(Value::Null, |value| date(value))
    };

    let mut record = Map::new();
    let mut put = |field: UserField, value: Option<Value>| {
        if let Some(value) = value {
            record.insert(field.as_str().to_owned(), value);
        }
    };
    put(UserField::Id, user.id.as_ref().map(|id| Value::from(id.as_str())));
    put(UserField::Email, user.email.clone().map(Value::from));
    put(UserField::Username, user.username.clone().map(Value::from));
    put(UserField::FirstName, user.first_name.clone().map(Value::from));
    put(UserField::LastName, user.last_name.clone().map(Value::from));
    put(UserField::Role, user.role.map(|role| Value::from(role.as_str())));
    put(
        UserField::Gender,
        user.gender.map(|gender| {
            gender
                .as_value()
                .map_or(Value::Null, |gender| Value::from(gender.as_str()))
        }),
    );
    put(UserField::Birthday, user.birthday.as_ref().map(nullable_date));
    put(UserField::Active, user.active.map(Value::from));
    put(UserField::CreatedAt, user.created_at.as_ref().map(date));
    put(UserField::UpdatedAt, user.updated_at.as_ref().map(date));
    put(UserField::DeletedAt, user.deleted_at.as_ref().map(nullable_date));
    put(UserField::Deleted, user.deleted.map(Value::from));
    put(UserField::LastLogin, user.last_login.as_ref().map(nullable_date));
    put(
        UserField::Groups,
        user.groups.as_ref().map(|groups| {
            Value::Array(groups.iter().map(|group| Value::from(group.as_str())).collect())
        }),
    );
    Value::Object(record)
}

/// Decode a `find` result; `page`, `pages` and `offset` default to 1, 1
/// and 0 when null or absent.
pub fn decode_page(value: &Value, selection: &FieldSelection) -> Result<Page<User>, DecodeError> {
    let Value::Object(result) = value else {
        return Err(DecodeError::NotAnObject("result"));
    };

    let docs = result
        .get("docs")
        .and_then(Value::as_array)
        .ok_or(DecodeError::BadField("docs"))?
        .iter()
        .map(|doc| decode_user(doc, selection))
        .collect::<Result<Vec<_>, _>>()?;

    let number = |key: &'static str| result.get(key).and_then(Value::as_u64);
    let counter = |key: &'static str| number(key).ok_or(DecodeError::BadField(key));
    let small = |key: &'static str, value: u64| u32::try_from(value).map_err(|_| DecodeError::BadField(key));

    let total = counter("total")?;
    let limit = small("limit", counter("limit")?)?;
    let page = small("page", number("page").filter(|page| *page > 0).unwrap_or(1))?;
    let pages = small("pages", number("pages").filter(|pages| *pages > 0).unwrap_or(1))?;
    let offset = number("offset").unwrap_or(0);

    Ok(Page::new(docs, total, limit, page, pages, offset))
}

/// Encode a page the way the service returns a `find` result.
#[must_use]
pub fn encode_page(page: &Page<User>, selection: &FieldSelection) -> Value {
    let docs = page
        .docs()
        .iter()
        .map(|user| encode_user(&user.project(selection.fields())))
        .collect();
    serde_json::json!({
        "docs": Value::Array(docs),
        "total": page.total(),
        "limit": page.limit(),
        "page": page.page(),
        "pages": page.pages(),
        "offset": page.offset(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn wire_user() -> Value {
        json!({
            "_id": "5b2a4f6e8d1c3e0012345678",
            "email": "jane.doe@example.com",
            "username": "janedoe",
            "firstName": "Jane",
            "lastName": "Doe",
            "role": "STUDENT",
            "gender": null,
            "birthday": "1995-04-19T00:00:00.000Z",
            "active": true,
            "createdAt": "2018-06-20T10:00:00.000Z",
            "updatedAt": "2018-06-21T10:00:00.000Z",
            "deletedAt": null,
            "deleted": false,
            "lastLogin": null,
            "groups": ["i".repeat(24)]
        })
    }

    #[test]
    fn decodes_every_field() -> Result<(), Box<dyn std::error::Error>> {
        let user = decode_user(&wire_user(), &FieldSelection::all())?;

        assert_eq!(user.id.as_ref().map(ObjectId::as_str), Some("5b2a4f6e8d1c3e0012345678"));
        assert_eq!(user.role, Some(Role::Student));
        assert_eq!(user.gender, Some(Nullable::<Gender>::Null));
        assert_eq!(user.deleted_at, Some(Nullable::Null));
        assert!(matches!(user.birthday, Some(Nullable::Value(_))));
        assert_eq!(user.groups.as_ref().map(Vec::len), Some(1));
        Ok(())
    }

    #[test]
    fn encode_is_inverse_of_decode() -> Result<(), DecodeError> {
        let user = decode_user(&wire_user(), &FieldSelection::all())?;
        assert_eq!(encode_user(&user), wire_user());
        Ok(())
    }

    #[test]
    fn unselected_keys_are_ignored() -> Result<(), Box<dyn std::error::Error>> {
        let selection = FieldSelection::parse(["email"])?;
        let mut record = wire_user();
        if let Some(map) = record.as_object_mut() {
            map.insert("unexpected".into(), json!(1));
        }
        let user = decode_user(&record, &selection)?;
        assert_eq!(user, User {
            email: Some("jane.doe@example.com".into()),
            ..User::default()
        });
        Ok(())
    }

    #[test]
    fn invalid_records_are_rejected() {
        let error = decode_user(&json!({ "_id": "short" }), &FieldSelection::all()).err();
        assert!(matches!(error, Some(DecodeError::Invalid(errors)) if errors.has_error("_id")));

        let error = decode_user(&json!({}), &FieldSelection::all()).err();
        assert_eq!(error, Some(DecodeError::NoFields));
    }

    #[test]
    fn page_counters_default_when_missing() -> Result<(), DecodeError> {
        let page = decode_page(
            &json!({ "docs": [wire_user()], "total": 1, "limit": 10, "page": null }),
            &FieldSelection::all(),
        )?;
        assert_eq!((page.page(), page.pages(), page.offset()), (1, 1, 0));
        assert_eq!(page.docs().len(), 1);
        Ok(())
    }

    #[test]
    fn page_without_total_is_malformed() {
        let error = decode_page(&json!({ "docs": [], "limit": 10 }), &FieldSelection::all()).err();
        assert_eq!(error, Some(DecodeError::BadField("total")));
    }

    proptest! {
        #[test]
        fn decoded_keys_equal_requested_fields(
            fields in proptest::sample::subsequence(UserField::ALL.to_vec(), 1..=UserField::ALL.len())
        ) {
            let selection = FieldSelection::new(fields.clone());
            prop_assert!(selection.is_ok());
            let selection = selection.unwrap_or_default();

            let full = wire_user();
            let mut record = Map::new();
            for field in &fields {
                if let Some(value) = full.get(field.as_str()) {
                    record.insert(field.as_str().to_owned(), value.clone());
                }
            }
            let user = decode_user(&Value::Object(record), &selection);
            prop_assert!(user.is_ok());
            let user = user.unwrap_or_default();
            for field in UserField::ALL {
                prop_assert_eq!(user.has(field), fields.contains(&field));
            }
        }
    }
}
