//! Vocabulary document schemas
//!
//! Two-level hierarchy: categories own multiple-choice questions. A question's
//! `correct_index` must always point inside `options`.

use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::{IntoIndexes, MutMetadata};
use crate::db::schemas::Metadata;

/// Collection name for vocabulary categories
pub const VOCABULARY_CATEGORY_COLLECTION: &str = "vocabularyCategories";

/// Collection name for vocabulary questions
pub const VOCABULARY_QUESTION_COLLECTION: &str = "vocabularyQuestions";

/// Vocabulary category with bilingual titles and a two-color gradient
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VocabularyCategoryDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    pub title_en: String,

    pub title_pt: String,

    #[serde(default)]
    pub icon_name: String,

    /// Two hex colors rendered as a gradient in the app
    #[serde(default)]
    pub gradient_colors: Vec<String>,

    #[serde(default)]
    pub total_levels: i64,

    /// Zero-based display position
    #[serde(default)]
    pub order: i64,

    #[serde(default)]
    pub is_premium: bool,
}

impl IntoIndexes for VocabularyCategoryDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![]
    }
}

impl MutMetadata for VocabularyCategoryDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

/// Multiple-choice vocabulary question
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct VocabularyQuestionDoc {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub _id: Option<ObjectId>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Owning category
    pub category_id: ObjectId,

    #[serde(default)]
    pub level: i64,

    /// 1 = easy, 2 = medium, 3 = hard
    #[serde(default)]
    pub difficulty: i64,

    pub question: String,

    #[serde(default)]
    pub emoji: String,

    /// 2 to 6 answer options
    #[serde(default)]
    pub options: Vec<String>,

    /// Index into `options` of the correct answer
    #[serde(default)]
    pub correct_index: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_en: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_pt: Option<String>,
}

impl IntoIndexes for VocabularyQuestionDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "category_id": 1 },
            Some(
                IndexOptions::builder()
                    .name("category_id_index".to_string())
                    .build(),
            ),
        )]
    }
}

impl MutMetadata for VocabularyQuestionDoc {
    fn mut_metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_defaults() {
        let raw = doc! { "title_en": "Animals", "title_pt": "Animais" };
        let category: VocabularyCategoryDoc = bson::from_document(raw).unwrap();

        assert_eq!(category.order, 0);
        assert_eq!(category.total_levels, 0);
        assert!(!category.is_premium);
        assert!(category.gradient_colors.is_empty());
    }

    #[test]
    fn test_question_defaults() {
        let raw = doc! {
            "category_id": ObjectId::new(),
            "question": "What is 'cachorro' in English?",
        };
        let question: VocabularyQuestionDoc = bson::from_document(raw).unwrap();

        assert_eq!(question.level, 0);
        assert_eq!(question.correct_index, 0);
        assert!(question.options.is_empty());
        assert!(question.explanation_en.is_none());
    }
}
