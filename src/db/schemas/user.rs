//! User document schema
//!
//! App accounts managed from the console: profile, gamification counters,
//! subscription state, and the admin flag consumed by the sign-in gate.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// Collection name for per-user completed content records
pub const COMPLETED_CONTENT_COLLECTION: &str = "completedContents";

/// Derived gamification level: 100 XP per level, starting at level 1
pub fn level_for_xp(xp: i64) -> i64 {
    xp / 100 + 1
}

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct UserDoc {
    /// MongoDB document ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    /// Common metadata (created_at, updated_at)
    #[serde(default)]
    pub metadata: Metadata,

    /// Account email, unique across users
    pub email: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    // Personalization answers from onboarding
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,

    #[serde(default)]
    pub daily_goal: i64,

    // Gamification counters
    #[serde(default)]
    pub xp: i64,

    #[serde(default)]
    pub streak: i64,

    /// Derived level, kept in the document so the app reads it directly
    #[serde(default = "default_user_level")]
    pub user_level: i64,

    #[serde(default)]
    pub achievements: Vec<String>,

    #[serde(default)]
    pub total_lessons: i64,

    #[serde(default)]
    pub total_words: i64,

    #[serde(default)]
    pub total_hours: f64,

    // Coin balance and daily check-in
    #[serde(default)]
    pub coins: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check_in_date: Option<DateTime>,

    // Subscription state
    #[serde(default)]
    pub is_premium: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<String>,

    /// Console access flag; absent deserializes as false
    #[serde(default)]
    pub is_admin: bool,

    /// Argon2 hash of the console credential; empty for app-only accounts
    #[serde(default)]
    pub password_hash: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime>,
}

fn default_user_level() -> i64 {
    1
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Unique index on email
            (
                doc! { "email": 1 },
                Some(
                    IndexOptions::builder()
                        .unique(true)
                        .name("email_unique".to_string())
                        .build(),
                ),
            ),
            // Index on last_login_at for the active-users window
            (
                doc! { "last_login_at": 1 },
                Some(
                    IndexOptions::builder()
                        .name("last_login_at_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

impl MutMetadata for UserDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

/// Completion record linking a user to a study content they finished.
/// Read only by the dashboard aggregate.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct CompletedContentDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub user_id: ObjectId,

    pub content_id: ObjectId,
}

impl IntoIndexes for CompletedContentDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "user_id": 1 },
            Some(
                IndexOptions::builder()
                    .name("user_id_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for CompletedContentDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_xp() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(130), 2);
        assert_eq!(level_for_xp(250), 3);
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let raw = doc! { "email": "maria@example.com" };
        let user: UserDoc = bson::from_document(raw).unwrap();

        assert_eq!(user.xp, 0);
        assert_eq!(user.coins, 0);
        assert_eq!(user.streak, 0);
        assert_eq!(user.user_level, 1);
        assert!(!user.is_premium);
        assert!(!user.is_admin);
        assert!(user.achievements.is_empty());
    }

    #[test]
    fn test_absent_admin_flag_is_false() {
        let raw = doc! { "email": "joao@example.com", "name": "João" };
        let user: UserDoc = bson::from_document(raw).unwrap();
        assert!(!user.is_admin);
    }
}
