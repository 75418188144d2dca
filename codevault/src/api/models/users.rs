//! API request/response models for users.

use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The caller identified by a verified session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    pub id: UserId,
    pub username: String,
}

/// Profile changes. Absent fields are left as they are; `"bio": null` clears the bio.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub display_name: Option<String>,
    #[serde(default, with = "serde_with::rust::double_option", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
}

// User response models
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub username: String,
    pub display_name: String,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: DateTime<Utc>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            display_name: db.display_name,
            bio: db.bio,
            created_at: db.created_at,
            last_login_at: db.last_login_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_never_carries_password_hash() {
        let now = Utc::now();
        let response = UserResponse::from(UserDBResponse {
            id: 1,
            username: "alice".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            display_name: "Alice".to_string(),
            bio: None,
            created_at: now,
            last_login_at: now,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert!(!json.to_string().contains("argon2id"));
        assert_eq!(json["displayName"], "Alice");
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let absent: UserUpdate = serde_json::from_str(r#"{"displayName":"A"}"#).unwrap();
        assert_eq!(absent.bio, None);

        let cleared: UserUpdate = serde_json::from_str(r#"{"bio":null}"#).unwrap();
        assert_eq!(cleared.bio, Some(None));

        let set: UserUpdate = serde_json::from_str(r#"{"bio":"hi"}"#).unwrap();
        assert_eq!(set.bio, Some(Some("hi".to_string())));
    }
}
