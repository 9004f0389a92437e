//! Dashboard aggregate service
//!
//! Home-screen numbers: user totals, a 7-day active window, the study
//! content count, and completed lessons summed per user over their
//! completion records.

use bson::{doc, DateTime};
use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::db::schemas::{
    CompletedContentDoc, StudyContentDoc, UserDoc, COMPLETED_CONTENT_COLLECTION,
    STUDY_CONTENT_COLLECTION, USER_COLLECTION,
};
use crate::db::MongoClient;
use crate::types::Result;

/// Days a user may be idle and still count as active
const ACTIVE_WINDOW_DAYS: i64 = 7;

/// Aggregate numbers for the console home screen
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub active_users: u64,
    pub total_study_contents: u64,
    pub completed_lessons: u64,
}

/// Service computing the dashboard aggregate
#[derive(Clone)]
pub struct DashboardService {
    mongo: MongoClient,
}

impl DashboardService {
    pub fn new(mongo: MongoClient) -> Self {
        Self { mongo }
    }

    pub async fn stats(&self) -> Result<DashboardStats> {
        let users = self
            .mongo
            .collection::<UserDoc>(USER_COLLECTION)
            .await?
            .find_many(doc! {})
            .await?;
        let total_users = users.len() as u64;

        let cutoff = DateTime::from_chrono(Utc::now() - Duration::days(ACTIVE_WINDOW_DAYS));
        let active_users = users
            .iter()
            .filter(|u| u.last_login_at.map_or(false, |seen| seen > cutoff))
            .count() as u64;

        let total_study_contents = self
            .mongo
            .collection::<StudyContentDoc>(STUDY_CONTENT_COLLECTION)
            .await?
            .count(doc! {})
            .await?;

        // Completed lessons are summed per user; a failed per-user count is
        // treated as zero rather than failing the whole aggregate
        let completions = self
            .mongo
            .collection::<CompletedContentDoc>(COMPLETED_CONTENT_COLLECTION)
            .await?;
        let mut completed_lessons: u64 = 0;
        for user in &users {
            let Some(user_id) = user._id else {
                continue;
            };
            match completions.count(doc! { "user_id": user_id }).await {
                Ok(n) => completed_lessons += n,
                Err(e) => {
                    debug!("Completion count failed for user {}: {}", user_id.to_hex(), e);
                }
            }
        }

        Ok(DashboardStats {
            total_users,
            active_users,
            total_study_contents,
            completed_lessons,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_active_window_comparison() {
        let now = Utc::now();
        let cutoff = DateTime::from_chrono(now - Duration::days(ACTIVE_WINDOW_DAYS));

        let yesterday = DateTime::from_chrono(now - Duration::days(1));
        let last_month = DateTime::from_chrono(now - Duration::days(30));

        assert!(yesterday > cutoff);
        assert!(last_month < cutoff);
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let stats = DashboardStats {
            total_users: 12,
            active_users: 4,
            total_study_contents: 30,
            completed_lessons: 91,
        };
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["totalUsers"], 12);
        assert_eq!(json["activeUsers"], 4);
        assert_eq!(json["totalStudyContents"], 30);
        assert_eq!(json["completedLessons"], 91);
    }
}
