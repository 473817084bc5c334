//! Deterministic user fixtures.

use account_client_domain::{Gender, Nullable, ObjectId, Role, User};
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use std::path::PathBuf;

const FIRST_NAMES: [&str; 8] = ["Jane", "John", "Ada", "Alan", "Grace", "Linus", "Barbara", "Ken"];
const LAST_NAMES: [&str; 6] = ["Doe", "Lovelace", "Turing", "Hopper", "Torvalds", "Liskov"];

/// Number of distinct groups handed out by [`sample_user`].
pub const GROUP_COUNT: u64 = 3;

/// Path of a file under this crate's `fixtures/` directory.
pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(relative)
}

/// The `n`-th fixture user id.
pub fn user_id(n: u64) -> ObjectId {
    ObjectId::parse(format!("{n:024x}")).expect("fixture ids are 24 hex characters")
}

/// The `n`-th fixture group id.
pub fn group_id(n: u64) -> ObjectId {
    ObjectId::parse(format!("a0{n:022x}")).expect("fixture ids are 24 hex characters")
}

/// Creation time of fixture user 0; user `i` is created `i` days later.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2018, 6, 20, 10, 0, 0).unwrap()
}

/// A fully populated user; fields vary with `index` so filters have
/// something to select on.
pub fn sample_user(index: usize) -> User {
    let n = index as u64;
    let created_at = base_time() + Duration::days(index as i64);
    let deleted = index % 10 == 9;

    User {
        id: Some(user_id(n + 1)),
        email: Some(format!("user{index:03}@example.com")),
        username: Some(format!("user{index:03}")),
        first_name: Some(FIRST_NAMES[index % FIRST_NAMES.len()].to_owned()),
        last_name: Some(LAST_NAMES[index % LAST_NAMES.len()].to_owned()),
        role: Some(Role::ALL[index % Role::ALL.len()]),
        gender: Some(match index % 4 {
            0 => Nullable::Null,
            other => Nullable::Value(Gender::ALL[other - 1]),
        }),
        birthday: Some(if index % 3 == 0 {
            Nullable::Null
        } else {
            let year = 1960 + (index % 40) as i32;
            let month = 1 + (index % 12) as u32;
            let day = 1 + (index % 28) as u32;
            Nullable::Value(Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap())
        }),
        active: Some(index % 7 != 0),
        created_at: Some(created_at),
        updated_at: Some(created_at + Duration::hours(1)),
        deleted_at: Some(if deleted {
            Nullable::Value(created_at + Duration::days(1))
        } else {
            Nullable::Null
        }),
        deleted: Some(deleted),
        last_login: Some(if index % 2 == 0 {
            Nullable::Null
        } else {
            Nullable::Value(created_at + Duration::hours(2))
        }),
        groups: Some(vec![group_id(n % GROUP_COUNT)]),
    }
}

/// The first `count` fixture users.
pub fn sample_users(count: usize) -> Vec<User> {
    (0..count).map(sample_user).collect()
}

/// Wire form of [`sample_user`].
pub fn sample_user_json(index: usize) -> Value {
    account_client_api::encode_user(&sample_user(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use account_client_api::{FieldSelection, decode_user};

    #[test]
    fn fixture_users_decode_cleanly() {
        for index in 0..40 {
            let decoded = decode_user(&sample_user_json(index), &FieldSelection::all());
            assert_eq!(decoded, Ok(sample_user(index)), "user {index}");
        }
    }

    #[test]
    fn fixture_ids_are_distinct() {
        let users = sample_users(30);
        let mut ids: Vec<_> = users.iter().filter_map(|user| user.id.clone()).collect();
        ids.sort_by(|left, right| left.as_str().cmp(right.as_str()));
        ids.dedup();
        assert_eq!(ids.len(), 30);
    }

    #[test]
    fn config_fixtures_are_present() {
        assert!(fixture_path("config/client-config.valid.json").is_file());
    }
}
