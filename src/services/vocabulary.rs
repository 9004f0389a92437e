//! Vocabulary collection services
//!
//! Categories and their multiple-choice questions. Deleting a category
//! cascades over its questions in a single batch. Option removal keeps
//! `correct_index` pointing at the same answer by shifting it when an
//! earlier option disappears.

use bson::{doc, oid::ObjectId, DateTime, Document};
use tracing::info;

use crate::db::schemas::{
    Metadata, VocabularyCategoryDoc, VocabularyQuestionDoc, VOCABULARY_CATEGORY_COLLECTION,
    VOCABULARY_QUESTION_COLLECTION,
};
use crate::db::{BatchOp, MongoClient, MongoCollection};
use crate::services::{reorder_ops, OrderAssignment};
use crate::types::{AdminError, Result};

/// Minimum answer options a question must keep
pub const MIN_OPTIONS: usize = 2;

/// Maximum answer options a question may carry
pub const MAX_OPTIONS: usize = 6;

// =============================================================================
// Create / update DTOs
// =============================================================================

#[derive(Debug, Clone)]
pub struct NewVocabularyCategory {
    pub title_en: String,
    pub title_pt: String,
    pub icon_name: String,
    pub gradient_colors: Vec<String>,
    pub total_levels: i64,
    pub order: i64,
    pub is_premium: bool,
}

#[derive(Debug, Clone, Default)]
pub struct VocabularyCategoryUpdate {
    pub title_en: Option<String>,
    pub title_pt: Option<String>,
    pub icon_name: Option<String>,
    pub gradient_colors: Option<Vec<String>>,
    pub total_levels: Option<i64>,
    pub order: Option<i64>,
    pub is_premium: Option<bool>,
}

impl VocabularyCategoryUpdate {
    fn into_set_document(self) -> Document {
        let mut set = doc! { "metadata.updated_at": DateTime::now() };
        if let Some(title_en) = self.title_en {
            set.insert("title_en", title_en);
        }
        if let Some(title_pt) = self.title_pt {
            set.insert("title_pt", title_pt);
        }
        if let Some(icon_name) = self.icon_name {
            set.insert("icon_name", icon_name);
        }
        if let Some(gradient_colors) = self.gradient_colors {
            set.insert("gradient_colors", gradient_colors);
        }
        if let Some(total_levels) = self.total_levels {
            set.insert("total_levels", total_levels);
        }
        if let Some(order) = self.order {
            set.insert("order", order);
        }
        if let Some(is_premium) = self.is_premium {
            set.insert("is_premium", is_premium);
        }
        set
    }
}

#[derive(Debug, Clone)]
pub struct NewVocabularyQuestion {
    pub level: i64,
    pub difficulty: i64,
    pub question: String,
    pub emoji: String,
    pub options: Vec<String>,
    pub correct_index: i64,
    pub explanation_en: Option<String>,
    pub explanation_pt: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct VocabularyQuestionUpdate {
    pub level: Option<i64>,
    pub difficulty: Option<i64>,
    pub question: Option<String>,
    pub emoji: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_index: Option<i64>,
    pub explanation_en: Option<String>,
    pub explanation_pt: Option<String>,
}

impl VocabularyQuestionUpdate {
    fn into_set_document(self) -> Document {
        let mut set = doc! { "metadata.updated_at": DateTime::now() };
        if let Some(level) = self.level {
            set.insert("level", level);
        }
        if let Some(difficulty) = self.difficulty {
            set.insert("difficulty", difficulty);
        }
        if let Some(question) = self.question {
            set.insert("question", question);
        }
        if let Some(emoji) = self.emoji {
            set.insert("emoji", emoji);
        }
        if let Some(options) = self.options {
            set.insert("options", options);
        }
        if let Some(correct_index) = self.correct_index {
            set.insert("correct_index", correct_index);
        }
        if let Some(explanation_en) = self.explanation_en {
            set.insert("explanation_en", explanation_en);
        }
        if let Some(explanation_pt) = self.explanation_pt {
            set.insert("explanation_pt", explanation_pt);
        }
        set
    }
}

// =============================================================================
// Pure helpers
// =============================================================================

/// Reject a question shape before anything is written
pub fn validate_question_shape(
    options: &[String],
    correct_index: i64,
    difficulty: i64,
    level: i64,
) -> Result<()> {
    if options.len() < MIN_OPTIONS || options.len() > MAX_OPTIONS {
        return Err(AdminError::Validation(format!(
            "a question needs between {} and {} options",
            MIN_OPTIONS, MAX_OPTIONS
        )));
    }
    if options.iter().any(|o| o.trim().is_empty()) {
        return Err(AdminError::Validation("options must not be empty".into()));
    }
    if correct_index < 0 || correct_index as usize >= options.len() {
        return Err(AdminError::Validation(
            "correctIndex must point at one of the options".into(),
        ));
    }
    if !(1..=3).contains(&difficulty) {
        return Err(AdminError::Validation(
            "difficulty must be 1, 2 or 3".into(),
        ));
    }
    if level < 1 {
        return Err(AdminError::Validation("level must be at least 1".into()));
    }
    Ok(())
}

/// Remove the option at `remove`, shifting `correct_index` down when an
/// option at or before it disappears. The option count never drops below
/// [`MIN_OPTIONS`].
pub fn remove_option_at(
    options: &[String],
    correct_index: i64,
    remove: usize,
) -> Result<(Vec<String>, i64)> {
    if remove >= options.len() {
        return Err(AdminError::Validation("option index out of range".into()));
    }
    if options.len() <= MIN_OPTIONS {
        return Err(AdminError::Validation(format!(
            "a question must keep at least {} options",
            MIN_OPTIONS
        )));
    }

    let mut remaining = options.to_vec();
    remaining.remove(remove);

    let shifted = if correct_index >= remove as i64 && correct_index > 0 {
        correct_index - 1
    } else {
        correct_index
    };

    Ok((remaining, shifted))
}

/// Stage the deletion of a category plus all of its questions
pub fn category_cascade_ops(category_id: ObjectId, question_ids: &[ObjectId]) -> Vec<BatchOp> {
    let mut ops: Vec<BatchOp> = question_ids
        .iter()
        .map(|question_id| BatchOp::Delete {
            collection: VOCABULARY_QUESTION_COLLECTION.to_string(),
            id: *question_id,
        })
        .collect();
    ops.push(BatchOp::Delete {
        collection: VOCABULARY_CATEGORY_COLLECTION.to_string(),
        id: category_id,
    });
    ops
}

// =============================================================================
// Service
// =============================================================================

/// Service for vocabulary categories and questions
#[derive(Clone)]
pub struct VocabularyService {
    mongo: MongoClient,
}

impl VocabularyService {
    pub fn new(mongo: MongoClient) -> Self {
        Self { mongo }
    }

    async fn categories(&self) -> Result<MongoCollection<VocabularyCategoryDoc>> {
        self.mongo.collection(VOCABULARY_CATEGORY_COLLECTION).await
    }

    async fn questions(&self) -> Result<MongoCollection<VocabularyQuestionDoc>> {
        self.mongo.collection(VOCABULARY_QUESTION_COLLECTION).await
    }

    /// All categories, ascending by `order`
    pub async fn list_categories(&self) -> Result<Vec<VocabularyCategoryDoc>> {
        let mut categories = self.categories().await?.find_many(doc! {}).await?;
        categories.sort_by_key(|c| c.order);
        Ok(categories)
    }

    pub async fn get_category(&self, id: ObjectId) -> Result<Option<VocabularyCategoryDoc>> {
        self.categories().await?.find_one(doc! { "_id": id }).await
    }

    pub async fn create_category(&self, data: NewVocabularyCategory) -> Result<ObjectId> {
        if data.title_en.trim().is_empty() || data.title_pt.trim().is_empty() {
            return Err(AdminError::Validation(
                "both titleEn and titlePt are required".into(),
            ));
        }
        if data.gradient_colors.len() != 2 {
            return Err(AdminError::Validation(
                "gradientColors must hold exactly two colors".into(),
            ));
        }

        let category = VocabularyCategoryDoc {
            _id: None,
            metadata: Metadata::new(),
            title_en: data.title_en,
            title_pt: data.title_pt,
            icon_name: data.icon_name,
            gradient_colors: data.gradient_colors,
            total_levels: data.total_levels,
            order: data.order,
            is_premium: data.is_premium,
        };

        let id = self.categories().await?.insert_one(category).await?;
        info!("Vocabulary category {} created", id.to_hex());
        Ok(id)
    }

    pub async fn update_category(
        &self,
        id: ObjectId,
        update: VocabularyCategoryUpdate,
    ) -> Result<()> {
        if let Some(ref colors) = update.gradient_colors {
            if colors.len() != 2 {
                return Err(AdminError::Validation(
                    "gradientColors must hold exactly two colors".into(),
                ));
            }
        }

        let result = self
            .categories()
            .await?
            .update_one(doc! { "_id": id }, doc! { "$set": update.into_set_document() })
            .await?;

        if result.matched_count == 0 {
            return Err(AdminError::NotFound("vocabulary category"));
        }
        Ok(())
    }

    /// Delete a category and all of its questions in one batch
    pub async fn delete_category(&self, id: ObjectId) -> Result<()> {
        let questions = self
            .questions()
            .await?
            .find_many(doc! { "category_id": id })
            .await?;
        let question_ids: Vec<ObjectId> = questions.iter().filter_map(|q| q._id).collect();

        let ops = category_cascade_ops(id, &question_ids);
        let staged = ops.len();
        let mut batch = self.mongo.batch();
        batch.extend(ops);
        batch.commit().await?;

        info!(
            "Vocabulary category {} deleted ({} documents removed)",
            id.to_hex(),
            staged
        );
        Ok(())
    }

    pub async fn reorder_categories(&self, assignments: &[OrderAssignment]) -> Result<()> {
        let mut batch = self.mongo.batch();
        batch.extend(reorder_ops(VOCABULARY_CATEGORY_COLLECTION, assignments));
        batch.commit().await
    }

    /// Questions of one category, sorted by level then difficulty.
    /// An empty result is valid; only a missing category is an error.
    pub async fn list_questions(&self, category_id: ObjectId) -> Result<Vec<VocabularyQuestionDoc>> {
        let category = self
            .categories()
            .await?
            .find_one(doc! { "_id": category_id })
            .await?;
        if category.is_none() {
            return Err(AdminError::NotFound("vocabulary category"));
        }

        let mut questions = self
            .questions()
            .await?
            .find_many(doc! { "category_id": category_id })
            .await?;
        questions.sort_by_key(|q| (q.level, q.difficulty));
        Ok(questions)
    }

    pub async fn get_question(&self, id: ObjectId) -> Result<Option<VocabularyQuestionDoc>> {
        self.questions().await?.find_one(doc! { "_id": id }).await
    }

    pub async fn create_question(
        &self,
        category_id: ObjectId,
        data: NewVocabularyQuestion,
    ) -> Result<ObjectId> {
        if data.question.trim().is_empty() {
            return Err(AdminError::Validation("question text is required".into()));
        }
        validate_question_shape(&data.options, data.correct_index, data.difficulty, data.level)?;

        let category = self
            .categories()
            .await?
            .find_one(doc! { "_id": category_id })
            .await?;
        if category.is_none() {
            return Err(AdminError::NotFound("vocabulary category"));
        }

        let question = question_doc(category_id, data);
        let id = self.questions().await?.insert_one(question).await?;
        info!("Vocabulary question {} created", id.to_hex());
        Ok(id)
    }

    /// Create many questions in one atomic batch
    pub async fn bulk_create_questions(
        &self,
        category_id: ObjectId,
        items: Vec<NewVocabularyQuestion>,
    ) -> Result<usize> {
        if items.is_empty() {
            return Err(AdminError::Validation("no questions supplied".into()));
        }
        for item in &items {
            if item.question.trim().is_empty() {
                return Err(AdminError::Validation("question text is required".into()));
            }
            validate_question_shape(&item.options, item.correct_index, item.difficulty, item.level)?;
        }

        let category = self
            .categories()
            .await?
            .find_one(doc! { "_id": category_id })
            .await?;
        if category.is_none() {
            return Err(AdminError::NotFound("vocabulary category"));
        }

        let count = items.len();
        let mut batch = self.mongo.batch();
        for item in items {
            let question = question_doc(category_id, item);
            let document = bson::to_document(&question)
                .map_err(|e| AdminError::Database(format!("Serialize failed: {}", e)))?;
            batch.insert(VOCABULARY_QUESTION_COLLECTION, document);
        }
        batch.commit().await?;

        info!(
            "Bulk created {} vocabulary questions in category {}",
            count,
            category_id.to_hex()
        );
        Ok(count)
    }

    pub async fn update_question(
        &self,
        id: ObjectId,
        update: VocabularyQuestionUpdate,
    ) -> Result<()> {
        if let Some(difficulty) = update.difficulty {
            if !(1..=3).contains(&difficulty) {
                return Err(AdminError::Validation(
                    "difficulty must be 1, 2 or 3".into(),
                ));
            }
        }
        if let Some(level) = update.level {
            if level < 1 {
                return Err(AdminError::Validation("level must be at least 1".into()));
            }
        }

        // Option/index changes must stay consistent with what is stored
        if update.options.is_some() || update.correct_index.is_some() {
            let current = self
                .get_question(id)
                .await?
                .ok_or(AdminError::NotFound("vocabulary question"))?;
            let options = update.options.clone().unwrap_or(current.options);
            let correct_index = update.correct_index.unwrap_or(current.correct_index);

            if options.len() < MIN_OPTIONS || options.len() > MAX_OPTIONS {
                return Err(AdminError::Validation(format!(
                    "a question needs between {} and {} options",
                    MIN_OPTIONS, MAX_OPTIONS
                )));
            }
            if correct_index < 0 || correct_index as usize >= options.len() {
                return Err(AdminError::Validation(
                    "correctIndex must point at one of the options".into(),
                ));
            }
        }

        let result = self
            .questions()
            .await?
            .update_one(doc! { "_id": id }, doc! { "$set": update.into_set_document() })
            .await?;

        if result.matched_count == 0 {
            return Err(AdminError::NotFound("vocabulary question"));
        }
        Ok(())
    }

    pub async fn delete_question(&self, id: ObjectId) -> Result<()> {
        self.questions().await?.delete_one(doc! { "_id": id }).await?;
        info!("Vocabulary question {} deleted", id.to_hex());
        Ok(())
    }

    /// Remove one answer option, shifting the stored correct index so it
    /// keeps pointing at the same answer
    pub async fn remove_option(&self, id: ObjectId, index: usize) -> Result<()> {
        let questions = self.questions().await?;
        let question = questions
            .find_one(doc! { "_id": id })
            .await?
            .ok_or(AdminError::NotFound("vocabulary question"))?;

        let (options, correct_index) =
            remove_option_at(&question.options, question.correct_index, index)?;

        questions
            .update_one(
                doc! { "_id": id },
                doc! {
                    "$set": {
                        "options": options,
                        "correct_index": correct_index,
                        "metadata.updated_at": DateTime::now(),
                    }
                },
            )
            .await?;

        Ok(())
    }
}

fn question_doc(category_id: ObjectId, data: NewVocabularyQuestion) -> VocabularyQuestionDoc {
    VocabularyQuestionDoc {
        _id: None,
        metadata: Metadata::new(),
        category_id,
        level: data.level,
        difficulty: data.difficulty,
        question: data.question,
        emoji: data.emoji,
        options: data.options,
        correct_index: data.correct_index,
        explanation_en: data.explanation_en,
        explanation_pt: data.explanation_pt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("option-{i}")).collect()
    }

    #[test]
    fn test_remove_before_correct_shifts_index_down() {
        let (remaining, correct) = remove_option_at(&options(4), 2, 0).unwrap();
        assert_eq!(remaining.len(), 3);
        assert_eq!(correct, 1);
        // Still points at the same answer text
        assert_eq!(remaining[correct as usize], "option-2");
    }

    #[test]
    fn test_remove_at_correct_shifts_index_down() {
        let (_, correct) = remove_option_at(&options(4), 2, 2).unwrap();
        assert_eq!(correct, 1);
    }

    #[test]
    fn test_remove_after_correct_leaves_index_unchanged() {
        let (remaining, correct) = remove_option_at(&options(4), 1, 3).unwrap();
        assert_eq!(correct, 1);
        assert_eq!(remaining[correct as usize], "option-1");
    }

    #[test]
    fn test_remove_at_index_zero_when_correct_is_zero() {
        let (remaining, correct) = remove_option_at(&options(3), 0, 0).unwrap();
        assert_eq!(correct, 0);
        assert_eq!(remaining.len(), 2);
    }

    #[test]
    fn test_option_count_never_drops_below_two() {
        let err = remove_option_at(&options(2), 0, 1).unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
    }

    #[test]
    fn test_remove_out_of_range_rejected() {
        let err = remove_option_at(&options(4), 0, 4).unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
    }

    #[test]
    fn test_question_shape_bounds() {
        assert!(validate_question_shape(&options(2), 0, 1, 1).is_ok());
        assert!(validate_question_shape(&options(6), 5, 3, 10).is_ok());

        assert!(validate_question_shape(&options(1), 0, 1, 1).is_err());
        assert!(validate_question_shape(&options(7), 0, 1, 1).is_err());
        assert!(validate_question_shape(&options(4), 4, 1, 1).is_err());
        assert!(validate_question_shape(&options(4), -1, 1, 1).is_err());
        assert!(validate_question_shape(&options(4), 0, 0, 1).is_err());
        assert!(validate_question_shape(&options(4), 0, 4, 1).is_err());
        assert!(validate_question_shape(&options(4), 0, 1, 0).is_err());
    }

    #[test]
    fn test_category_cascade_deletes_questions_then_category() {
        let category = ObjectId::new();
        let questions = [ObjectId::new(), ObjectId::new(), ObjectId::new()];

        let ops = category_cascade_ops(category, &questions);
        assert_eq!(ops.len(), 4);

        // The category's own deletion is staged last, after every question
        match ops.last().unwrap() {
            BatchOp::Delete { collection, id } => {
                assert_eq!(collection, VOCABULARY_CATEGORY_COLLECTION);
                assert_eq!(*id, category);
            }
            other => panic!("expected delete op, got {:?}", other),
        }
    }

    #[test]
    fn test_question_sort_by_level_then_difficulty() {
        let category_id = ObjectId::new();
        let mut questions: Vec<VocabularyQuestionDoc> = [(2, 1), (1, 3), (1, 1), (2, 3)]
            .into_iter()
            .map(|(level, difficulty)| VocabularyQuestionDoc {
                category_id,
                level,
                difficulty,
                question: format!("q-{level}-{difficulty}"),
                ..Default::default()
            })
            .collect();

        questions.sort_by_key(|q| (q.level, q.difficulty));

        let keys: Vec<(i64, i64)> = questions.iter().map(|q| (q.level, q.difficulty)).collect();
        assert_eq!(keys, vec![(1, 1), (1, 3), (2, 1), (2, 3)]);
    }
}
