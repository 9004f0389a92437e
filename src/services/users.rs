//! User management service
//!
//! Admin-side operations over app accounts: profile edits, premium toggles,
//! gamification adjustments, credential resets. Accounts are created by the
//! app itself; the console only manages existing ones.

use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use tracing::info;

use crate::auth::hash_password;
use crate::db::schemas::{level_for_xp, UserDoc, USER_COLLECTION};
use crate::db::{MongoClient, MongoCollection};
use crate::types::{AdminError, Result};

/// Fields an admin edit may touch; identifier, timestamps, and derived
/// gamification values are not among them
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,
    pub goal: Option<String>,
    pub level: Option<String>,
    pub frequency: Option<String>,
    pub daily_goal: Option<i64>,
    pub achievements: Option<Vec<String>>,
    pub total_lessons: Option<i64>,
    pub total_words: Option<i64>,
    pub total_hours: Option<f64>,
}

impl UserUpdate {
    fn into_set_document(self) -> Document {
        let mut set = doc! { "metadata.updated_at": DateTime::now() };
        if let Some(name) = self.name {
            set.insert("name", name);
        }
        if let Some(phone) = self.phone {
            set.insert("phone", phone);
        }
        if let Some(photo_url) = self.photo_url {
            set.insert("photo_url", photo_url);
        }
        if let Some(goal) = self.goal {
            set.insert("goal", goal);
        }
        if let Some(level) = self.level {
            set.insert("level", level);
        }
        if let Some(frequency) = self.frequency {
            set.insert("frequency", frequency);
        }
        if let Some(daily_goal) = self.daily_goal {
            set.insert("daily_goal", daily_goal);
        }
        if let Some(achievements) = self.achievements {
            set.insert("achievements", achievements);
        }
        if let Some(total_lessons) = self.total_lessons {
            set.insert("total_lessons", total_lessons);
        }
        if let Some(total_words) = self.total_words {
            set.insert("total_words", total_words);
        }
        if let Some(total_hours) = self.total_hours {
            set.insert("total_hours", total_hours);
        }
        set
    }
}

/// Service for admin-managed user accounts
#[derive(Clone)]
pub struct UserService {
    mongo: MongoClient,
}

impl UserService {
    pub fn new(mongo: MongoClient) -> Self {
        Self { mongo }
    }

    async fn users(&self) -> Result<MongoCollection<UserDoc>> {
        self.mongo.collection(USER_COLLECTION).await
    }

    /// All users, newest first
    pub async fn list(&self) -> Result<Vec<UserDoc>> {
        let mut users = self.users().await?.find_many(doc! {}).await?;
        users.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));
        Ok(users)
    }

    pub async fn get_by_id(&self, id: ObjectId) -> Result<Option<UserDoc>> {
        self.users().await?.find_one(doc! { "_id": id }).await
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<UserDoc>> {
        self.users().await?.find_one(doc! { "email": email }).await
    }

    pub async fn update(&self, id: ObjectId, update: UserUpdate) -> Result<()> {
        let result = self
            .users()
            .await?
            .update_one(doc! { "_id": id }, doc! { "$set": update.into_set_document() })
            .await?;

        if result.matched_count == 0 {
            return Err(AdminError::NotFound("user"));
        }
        Ok(())
    }

    pub async fn delete(&self, id: ObjectId) -> Result<()> {
        let deleted = self.users().await?.delete_one(doc! { "_id": id }).await?;
        if deleted == 0 {
            return Err(AdminError::NotFound("user"));
        }
        info!("User {} deleted", id.to_hex());
        Ok(())
    }

    /// Switch premium on/off; subscription type follows the flag
    pub async fn set_premium(&self, id: ObjectId, is_premium: bool) -> Result<()> {
        let subscription_type = if is_premium {
            Bson::String("individual".to_string())
        } else {
            Bson::Null
        };

        let result = self
            .users()
            .await?
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "is_premium": is_premium,
                        "subscription_type": subscription_type,
                        "metadata.updated_at": DateTime::now(),
                    }
                },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AdminError::NotFound("user"));
        }
        info!(
            "User {} premium set to {}",
            id.to_hex(),
            is_premium
        );
        Ok(())
    }

    /// Grant XP and recompute the derived level
    pub async fn add_xp(&self, id: ObjectId, amount: i64) -> Result<i64> {
        let users = self.users().await?;
        let user = users
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(AdminError::NotFound("user"))?;

        let new_xp = user.xp + amount;
        let new_level = level_for_xp(new_xp);

        users
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "xp": new_xp,
                        "user_level": new_level,
                        "metadata.updated_at": DateTime::now(),
                    }
                },
            )
            .await?;

        info!(
            "User {} granted {} XP (now {} at level {})",
            id.to_hex(),
            amount,
            new_xp,
            new_level
        );
        Ok(new_xp)
    }

    /// Grant coins
    pub async fn add_coins(&self, id: ObjectId, amount: i64) -> Result<i64> {
        let users = self.users().await?;
        let user = users
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(AdminError::NotFound("user"))?;

        let new_coins = user.coins + amount;

        users
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "coins": new_coins,
                        "metadata.updated_at": DateTime::now(),
                    }
                },
            )
            .await?;

        Ok(new_coins)
    }

    /// Zero the streak and clear the last check-in date
    pub async fn reset_streak(&self, id: ObjectId) -> Result<()> {
        let result = self
            .users()
            .await?
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "streak": 0_i64,
                        "last_check_in_date": Bson::Null,
                        "metadata.updated_at": DateTime::now(),
                    }
                },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AdminError::NotFound("user"));
        }
        Ok(())
    }

    /// Replace the console credential with a new Argon2 hash
    pub async fn reset_password(&self, id: ObjectId, new_password: &str) -> Result<()> {
        if new_password.len() < 8 {
            return Err(AdminError::Validation(
                "password must be at least 8 characters".into(),
            ));
        }

        let password_hash = hash_password(new_password)?;

        let result = self
            .users()
            .await?
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "password_hash": password_hash,
                        "metadata.updated_at": DateTime::now(),
                    }
                },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AdminError::NotFound("user"));
        }
        info!("Password reset for user {}", id.to_hex());
        Ok(())
    }

    /// Stamp a successful console sign-in
    pub async fn touch_last_login(&self, id: ObjectId) -> Result<()> {
        self.users()
            .await?
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "last_login_at": DateTime::now() } },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_dto_skips_generated_and_derived_fields() {
        let update = UserUpdate {
            name: Some("Maria Souza".into()),
            daily_goal: Some(20),
            ..Default::default()
        };
        let set = update.into_set_document();

        assert!(!set.contains_key("_id"));
        assert!(!set.contains_key("xp"));
        assert!(!set.contains_key("user_level"));
        assert!(!set.contains_key("is_admin"));
        assert!(!set.contains_key("password_hash"));
        assert!(!set.contains_key("metadata.created_at"));
        assert_eq!(set.get_str("name").unwrap(), "Maria Souza");
        assert_eq!(set.get_i64("daily_goal").unwrap(), 20);
    }

    #[test]
    fn test_xp_grant_matches_level_derivation() {
        // 80 XP + 50 XP = 130 XP, which lands on level 2
        let new_xp = 80 + 50;
        assert_eq!(new_xp, 130);
        assert_eq!(level_for_xp(new_xp), 2);
    }

    #[test]
    fn test_newest_first_ordering() {
        use crate::db::schemas::Metadata;

        let stamp = |millis: i64| Some(bson::DateTime::from_millis(millis));
        let mut users: Vec<UserDoc> = [1_000, 3_000, 2_000]
            .into_iter()
            .map(|millis| UserDoc {
                email: format!("user-{millis}@example.com"),
                metadata: Metadata {
                    created_at: stamp(millis),
                    updated_at: stamp(millis),
                },
                ..Default::default()
            })
            .collect();

        users.sort_by(|a, b| b.metadata.created_at.cmp(&a.metadata.created_at));

        let emails: Vec<&str> = users.iter().map(|u| u.email.as_str()).collect();
        assert_eq!(
            emails,
            vec![
                "user-3000@example.com",
                "user-2000@example.com",
                "user-1000@example.com"
            ]
        );
    }
}
