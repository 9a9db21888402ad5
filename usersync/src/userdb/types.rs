use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents a user identity synchronized from the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned surrogate key; [`User::UNPERSISTED`] means "not yet persisted"
    pub id: i64,
    /// Opaque subject identifier supplied by the identity provider
    pub external_user_id: Option<String>,
    /// Email address; unique among persisted users when present
    pub email: Option<String>,
    /// Display name
    pub name: Option<String>,
    /// Identity-provider tenant the user belongs to
    pub tenant_id: Option<String>,
    /// When the user row was created (stamped by the store layer)
    pub created_at: DateTime<Utc>,
    /// When the user row was last updated (stamped by the store layer)
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Sentinel id for a user that has not been persisted yet
    pub const UNPERSISTED: i64 = 0;

    /// Create a new, not-yet-persisted user from identity-provider fields
    pub fn new(
        external_user_id: Option<String>,
        email: Option<String>,
        name: Option<String>,
        tenant_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Self::UNPERSISTED,
            external_user_id,
            email,
            name,
            tenant_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this user carries a store-assigned id
    pub fn is_persisted(&self) -> bool {
        self.id != Self::UNPERSISTED
    }
}

/// Outcome of a delete operation
///
/// Deletes are idempotent from the caller's perspective: a missing row is an
/// informational outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

impl DeleteOutcome {
    /// Human-readable message for API responses
    pub fn message(&self) -> &'static str {
        match self {
            Self::Deleted => "User deleted successfully",
            Self::NotFound => "User not found",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    /// A new user starts unpersisted, with both timestamps set to now
    #[test]
    fn test_user_new() {
        let user = User::new(
            Some("ext-123".to_string()),
            Some("test@example.com".to_string()),
            Some("Test User".to_string()),
            Some("tenant-1".to_string()),
        );

        assert_eq!(user.id, User::UNPERSISTED);
        assert!(!user.is_persisted());
        assert_eq!(user.external_user_id.as_deref(), Some("ext-123"));
        assert_eq!(user.email.as_deref(), Some("test@example.com"));
        assert_eq!(user.name.as_deref(), Some("Test User"));
        assert_eq!(user.tenant_id.as_deref(), Some("tenant-1"));

        let one_second_ago = Utc::now() - Duration::seconds(1);
        assert!(user.created_at > one_second_ago);
        assert_eq!(user.created_at, user.updated_at);
    }

    #[test]
    fn test_is_persisted() {
        let mut user = User::new(None, Some("a@example.com".to_string()), None, None);
        assert!(!user.is_persisted());

        user.id = 42;
        assert!(user.is_persisted());
    }

    /// Wire format uses camelCase keys, matching the HTTP contract
    #[test]
    fn test_user_serializes_camel_case() {
        let now = Utc::now();
        let user = User {
            id: 7,
            external_user_id: Some("ext".to_string()),
            email: Some("a@example.com".to_string()),
            name: None,
            tenant_id: Some("t1".to_string()),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&user).expect("Failed to serialize User");
        assert_eq!(json["id"], 7);
        assert_eq!(json["externalUserId"], "ext");
        assert_eq!(json["email"], "a@example.com");
        assert_eq!(json["name"], serde_json::Value::Null);
        assert_eq!(json["tenantId"], "t1");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
    }

    #[test]
    fn test_delete_outcome_messages() {
        assert_eq!(DeleteOutcome::Deleted.message(), "User deleted successfully");
        assert_eq!(DeleteOutcome::NotFound.message(), "User not found");
    }

    // Property-based tests for the User struct
    proptest! {
        /// Any valid User survives a serde round trip
        #[test]
        fn test_user_serde_roundtrip(
            id in 0..10000i64,
            external_user_id in proptest::option::of("[a-zA-Z0-9_-]{1,64}"),
            email in proptest::option::of("[a-zA-Z0-9._%+-]{1,64}@[a-zA-Z0-9.-]{1,64}\\.[a-zA-Z]{2,8}"),
            name in proptest::option::of("[\\p{L}\\p{N} ]{1,64}"),
            tenant_id in proptest::option::of("[a-zA-Z0-9-]{1,36}"),
        ) {
            let now = Utc::now();
            let user = User {
                id,
                external_user_id,
                email,
                name,
                tenant_id,
                created_at: now,
                updated_at: now,
            };

            let serialized = serde_json::to_string(&user).expect("Failed to serialize");
            let deserialized: User = serde_json::from_str(&serialized).expect("Failed to deserialize");

            // Timestamps may lose sub-serialization precision; compare the rest
            prop_assert_eq!(user.id, deserialized.id);
            prop_assert_eq!(user.external_user_id, deserialized.external_user_id);
            prop_assert_eq!(user.email, deserialized.email);
            prop_assert_eq!(user.name, deserialized.name);
            prop_assert_eq!(user.tenant_id, deserialized.tenant_id);
        }

        /// User::new always produces an unpersisted user with equal timestamps
        #[test]
        fn test_user_new_properties(
            email in proptest::option::of("[a-zA-Z0-9._%+-]{1,64}@[a-zA-Z0-9.-]{1,64}\\.[a-zA-Z]{2,8}"),
            name in proptest::option::of("[\\p{L}\\p{N} ]{1,64}"),
        ) {
            let user = User::new(None, email.clone(), name.clone(), None);

            prop_assert_eq!(user.id, User::UNPERSISTED);
            prop_assert!(!user.is_persisted());
            prop_assert_eq!(user.email, email);
            prop_assert_eq!(user.name, name);
            prop_assert_eq!(user.created_at, user.updated_at);
        }
    }
}
