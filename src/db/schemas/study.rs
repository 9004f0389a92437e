//! Study plan document schemas
//!
//! Three-level containment hierarchy: folders own subfolders, subfolders own
//! contents. Children point upward by parent id; the relation is only ever
//! traversed downward except by explicit lookup. Each parent carries a
//! `total_items` counter over its direct children.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for top-level study folders
pub const STUDY_FOLDER_COLLECTION: &str = "studyFolders";

/// Collection name for mid-level subfolders
pub const STUDY_SUBFOLDER_COLLECTION: &str = "studySubfolders";

/// Collection name for leaf study contents
pub const STUDY_CONTENT_COLLECTION: &str = "studyContents";

/// Kind of a leaf study content
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    #[default]
    Video,
    Article,
    Podcast,
}

/// Difficulty tag on a study content
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentDifficulty {
    Easy,
    Medium,
    Hard,
}

/// Top-level study folder
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct StudyFolderDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub icon_name: String,

    #[serde(default)]
    pub color_hex: String,

    /// Display position within the sibling set; uniqueness is not enforced
    #[serde(default)]
    pub order: i64,

    #[serde(default)]
    pub is_premium: bool,

    /// Count of direct child subfolders, adjusted on child create/delete
    #[serde(default)]
    pub total_items: i64,

    #[serde(default)]
    pub completed_items: i64,
}

impl IntoIndexes for StudyFolderDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![]
    }
}

impl MutMetadata for StudyFolderDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

/// Mid-level subfolder, owned by exactly one folder
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct StudySubfolderDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Owning folder
    pub parent_id: ObjectId,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub order: i64,

    /// Count of direct child contents, adjusted on child create/delete
    #[serde(default)]
    pub total_items: i64,

    #[serde(default)]
    pub completed_items: i64,
}

impl IntoIndexes for StudySubfolderDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "parent_id": 1 },
            Some(
                IndexOptions::builder()
                    .name("parent_id_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for StudySubfolderDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

/// Leaf study content, owned by exactly one subfolder
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct StudyContentDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Owning subfolder
    pub subfolder_id: ObjectId,

    pub title: String,

    #[serde(default)]
    pub subtitle: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub kind: ContentKind,

    /// URL of the video/article/podcast this entry points at
    #[serde(default)]
    pub external_link: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<ContentDifficulty>,

    #[serde(default)]
    pub is_completed: bool,

    #[serde(default)]
    pub order: i64,
}

impl IntoIndexes for StudyContentDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "subfolder_id": 1 },
            Some(
                IndexOptions::builder()
                    .name("subfolder_id_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for StudyContentDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_numeric_defaults() {
        let raw = doc! { "name": "Grammar" };
        let folder: StudyFolderDoc = bson::from_document(raw).unwrap();

        assert_eq!(folder.order, 0);
        assert_eq!(folder.total_items, 0);
        assert_eq!(folder.completed_items, 0);
        assert!(!folder.is_premium);
    }

    #[test]
    fn test_content_kind_round_trip() {
        let raw = doc! {
            "subfolder_id": ObjectId::new(),
            "title": "Past tense basics",
            "kind": "podcast",
        };
        let content: StudyContentDoc = bson::from_document(raw).unwrap();
        assert_eq!(content.kind, ContentKind::Podcast);

        let back = bson::to_document(&content).unwrap();
        assert_eq!(back.get_str("kind").unwrap(), "podcast");
    }

    #[test]
    fn test_content_defaults() {
        let raw = doc! {
            "subfolder_id": ObjectId::new(),
            "title": "Listening drill",
        };
        let content: StudyContentDoc = bson::from_document(raw).unwrap();

        assert_eq!(content.kind, ContentKind::Video);
        assert_eq!(content.order, 0);
        assert!(!content.is_completed);
        assert!(content.difficulty.is_none());
    }
}
