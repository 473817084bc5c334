//! Secret detection and redaction utilities.
//!
//! Passwords travel inside request variables and bearer tokens inside
//! config; both must never reach a log line or an error message verbatim.

/// The redacted placeholder string.
pub const REDACTED: &str = "[REDACTED]";

/// Checks if a key/variable name likely refers to a secret.
///
/// # Examples
///
/// ```
/// use account_client_shared::is_secret_key;
///
/// assert!(is_secret_key("password"));
/// assert!(is_secret_key("ACCOUNT_CLIENT_TOKEN"));
/// assert!(is_secret_key("Authorization"));
/// assert!(!is_secret_key("username"));
/// ```
pub fn is_secret_key(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    ["KEY", "TOKEN", "SECRET", "PASSWORD", "CREDENTIAL", "AUTH"]
        .iter()
        .any(|marker| key.contains(marker))
}

/// Redacts a value if the key is likely a secret.
///
/// # Examples
///
/// ```
/// use account_client_shared::redact_if_secret;
///
/// assert_eq!(redact_if_secret("password", "hunter22"), "[REDACTED]");
/// assert_eq!(redact_if_secret("email", "a@b.io"), "a@b.io");
/// ```
pub fn redact_if_secret(key: &str, value: &str) -> String {
    if is_secret_key(key) {
        REDACTED.to_string()
    } else {
        value.to_string()
    }
}

/// Recursively replace secret-keyed entries of a JSON value.
pub fn redact_json(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, nested) in map.iter_mut() {
                if is_secret_key(key) {
                    *nested = serde_json::Value::String(REDACTED.to_string());
                } else {
                    redact_json(nested);
                }
            }
        },
        serde_json::Value::Array(items) => items.iter_mut().for_each(redact_json),
        _ => {},
    }
}

/// A secret string wrapper that redacts on Display/Debug.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SecretString(Box<str>);

impl SecretString {
    /// Wrap a secret value.
    pub fn new(value: impl Into<Box<str>>) -> Self {
        Self(value.into())
    }

    /// Borrow the underlying secret.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(REDACTED)
    }
}

impl std::fmt::Display for SecretString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(REDACTED)
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value.into_boxed_str())
    }
}

impl serde::Serialize for SecretString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(REDACTED)
    }
}

impl<'de> serde::Deserialize<'de> for SecretString {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detects_common_secret_patterns() {
        assert!(is_secret_key("password"));
        assert!(is_secret_key("newPassword"));
        assert!(is_secret_key("bearerToken"));
        assert!(is_secret_key("CLIENT_SECRET"));
        assert!(is_secret_key("authorization"));
        assert!(is_secret_key("credentials"));
    }

    #[test]
    fn rejects_non_secret_patterns() {
        assert!(!is_secret_key("email"));
        assert!(!is_secret_key("firstName"));
        assert!(!is_secret_key("ACCOUNT_CLIENT_ENDPOINT"));
        assert!(!is_secret_key("timeoutMs"));
    }

    #[test]
    fn redacts_nested_json() {
        let mut value = json!({
            "data": { "email": "a@b.io", "password": "hunter22" }, // pragma: allowlist secret
            "list": [{ "token": "t" }]
        });
        redact_json(&mut value);

        assert_eq!(value["data"]["password"], json!(REDACTED));
        assert_eq!(value["data"]["email"], json!("a@b.io"));
        assert_eq!(value["list"][0]["token"], json!(REDACTED));
    }

    #[test]
    fn secret_string_redacts_display_and_debug() {
        let secret = SecretString::from("shh");
        assert_eq!(secret.to_string(), REDACTED);
        assert_eq!(format!("{secret:?}"), REDACTED);
        assert_eq!(secret.expose(), "shh");
    }

    #[test]
    fn secret_string_serializes_redacted() -> Result<(), serde_json::Error> {
        let secret: SecretString = serde_json::from_value(json!("token-value"))?;
        assert_eq!(secret.expose(), "token-value");
        assert_eq!(serde_json::to_value(&secret)?, json!(REDACTED));
        Ok(())
    }
}
