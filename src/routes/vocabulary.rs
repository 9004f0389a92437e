//! Admin API endpoints for vocabulary categories and questions
//!
//! ## Endpoints
//!
//! - `GET    /vocabulary/categories` - List categories in display order
//! - `POST   /vocabulary/categories` - Create a category
//! - `POST   /vocabulary/categories/reorder` - Apply order assignments atomically
//! - `GET/PUT/DELETE /vocabulary/categories/{id}` - Category CRUD (delete cascades questions)
//! - `GET    /vocabulary/categories/{id}/questions` - Questions sorted by level, difficulty
//! - `POST   /vocabulary/categories/{id}/questions` - Create a question
//! - `POST   /vocabulary/categories/{id}/questions/bulk` - Create many questions atomically
//! - `GET/PUT/DELETE /vocabulary/questions/{id}` - Question CRUD
//! - `DELETE /vocabulary/questions/{id}/options/{index}` - Remove an answer option
//!
//! All endpoints require an admin JWT.

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::schemas::{VocabularyCategoryDoc, VocabularyQuestionDoc};
use crate::routes::study::{CreatedResponse, ReorderItem};
use crate::routes::{
    error_response, error_to_response, format_timestamp, json_response, parse_json_body,
    parse_object_id, require_admin, require_db, FullBody, SuccessResponse,
};
use crate::server::AppState;
use crate::services::vocabulary::{
    NewVocabularyCategory, NewVocabularyQuestion, VocabularyCategoryUpdate,
    VocabularyQuestionUpdate,
};
use crate::services::{OrderAssignment, VocabularyService};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub title_en: String,
    pub title_pt: String,
    #[serde(default)]
    pub icon_name: String,
    #[serde(default)]
    pub gradient_colors: Vec<String>,
    #[serde(default)]
    pub total_levels: i64,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub is_premium: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub title_en: Option<String>,
    pub title_pt: Option<String>,
    pub icon_name: Option<String>,
    pub gradient_colors: Option<Vec<String>>,
    pub total_levels: Option<i64>,
    pub order: Option<i64>,
    pub is_premium: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[serde(default = "default_level")]
    pub level: i64,
    #[serde(default = "default_difficulty")]
    pub difficulty: i64,
    pub question: String,
    #[serde(default)]
    pub emoji: String,
    pub options: Vec<String>,
    pub correct_index: i64,
    #[serde(default)]
    pub explanation_en: Option<String>,
    #[serde(default)]
    pub explanation_pt: Option<String>,
}

fn default_level() -> i64 {
    1
}

fn default_difficulty() -> i64 {
    1
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuestionRequest {
    pub level: Option<i64>,
    pub difficulty: Option<i64>,
    pub question: Option<String>,
    pub emoji: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_index: Option<i64>,
    pub explanation_en: Option<String>,
    pub explanation_pt: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateResponse {
    pub success: bool,
    pub created: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub title_en: String,
    pub title_pt: String,
    pub icon_name: String,
    pub gradient_colors: Vec<String>,
    pub total_levels: i64,
    pub order: i64,
    pub is_premium: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub category_id: String,
    pub level: i64,
    pub difficulty: i64,
    pub question: String,
    pub emoji: String,
    pub options: Vec<String>,
    pub correct_index: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_en: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation_pt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn category_to_response(category: &VocabularyCategoryDoc) -> CategoryResponse {
    CategoryResponse {
        id: category._id.map(|o| o.to_hex()).unwrap_or_default(),
        title_en: category.title_en.clone(),
        title_pt: category.title_pt.clone(),
        icon_name: category.icon_name.clone(),
        gradient_colors: category.gradient_colors.clone(),
        total_levels: category.total_levels,
        order: category.order,
        is_premium: category.is_premium,
        created_at: format_timestamp(category.metadata.created_at),
        updated_at: format_timestamp(category.metadata.updated_at),
    }
}

fn question_to_response(question: &VocabularyQuestionDoc) -> QuestionResponse {
    QuestionResponse {
        id: question._id.map(|o| o.to_hex()).unwrap_or_default(),
        category_id: question.category_id.to_hex(),
        level: question.level,
        difficulty: question.difficulty,
        question: question.question.clone(),
        emoji: question.emoji.clone(),
        options: question.options.clone(),
        correct_index: question.correct_index,
        explanation_en: question.explanation_en.clone(),
        explanation_pt: question.explanation_pt.clone(),
        created_at: format_timestamp(question.metadata.created_at),
        updated_at: format_timestamp(question.metadata.updated_at),
    }
}

fn question_data(body: CreateQuestionRequest) -> NewVocabularyQuestion {
    NewVocabularyQuestion {
        level: body.level,
        difficulty: body.difficulty,
        question: body.question,
        emoji: body.emoji,
        options: body.options,
        correct_index: body.correct_index,
        explanation_en: body.explanation_en,
        explanation_pt: body.explanation_pt,
    }
}

// =============================================================================
// Route Handler
// =============================================================================

/// Main handler for /vocabulary/* routes
pub async fn handle_vocabulary_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    if let Err(resp) = require_admin(&req, &state) {
        return resp;
    }

    let method = req.method().clone();
    let subpath = path.strip_prefix("/vocabulary").unwrap_or("").to_string();

    match (method, subpath.as_str()) {
        // Categories
        (Method::GET, "/categories") | (Method::GET, "/categories/") => {
            handle_list_categories(state).await
        }
        (Method::POST, "/categories") => handle_create_category(req, state).await,
        (Method::POST, "/categories/reorder") => handle_reorder_categories(req, state).await,
        (Method::POST, p) if p.starts_with("/categories/") && p.ends_with("/questions/bulk") => {
            let id = p
                .strip_prefix("/categories/")
                .and_then(|s| s.strip_suffix("/questions/bulk"))
                .unwrap_or("")
                .to_string();
            handle_bulk_create_questions(req, state, id).await
        }
        (Method::POST, p) if p.starts_with("/categories/") && p.ends_with("/questions") => {
            let id = p
                .strip_prefix("/categories/")
                .and_then(|s| s.strip_suffix("/questions"))
                .unwrap_or("")
                .to_string();
            handle_create_question(req, state, id).await
        }
        (Method::GET, p) if p.starts_with("/categories/") && p.ends_with("/questions") => {
            let id = p
                .strip_prefix("/categories/")
                .and_then(|s| s.strip_suffix("/questions"))
                .unwrap_or("");
            handle_list_questions(state, id).await
        }
        (Method::GET, p) if p.starts_with("/categories/") => {
            handle_get_category(state, p.trim_start_matches("/categories/")).await
        }
        (Method::PUT, p) if p.starts_with("/categories/") => {
            handle_update_category(req, state, p.trim_start_matches("/categories/").to_string())
                .await
        }
        (Method::DELETE, p) if p.starts_with("/categories/") => {
            handle_delete_category(state, p.trim_start_matches("/categories/")).await
        }

        // Questions
        (Method::DELETE, p) if p.starts_with("/questions/") && p.contains("/options/") => {
            let rest = p.strip_prefix("/questions/").unwrap_or("");
            let (id, index) = match rest.split_once("/options/") {
                Some(pair) => pair,
                None => return error_response(StatusCode::NOT_FOUND, "Not found", None),
            };
            handle_remove_option(state, id, index).await
        }
        (Method::GET, p) if p.starts_with("/questions/") => {
            handle_get_question(state, p.trim_start_matches("/questions/")).await
        }
        (Method::PUT, p) if p.starts_with("/questions/") => {
            handle_update_question(req, state, p.trim_start_matches("/questions/").to_string())
                .await
        }
        (Method::DELETE, p) if p.starts_with("/questions/") => {
            handle_delete_question(state, p.trim_start_matches("/questions/")).await
        }

        _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
    }
}

// =============================================================================
// Category Handlers
// =============================================================================

async fn handle_list_categories(state: Arc<AppState>) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    match VocabularyService::new(mongo.clone()).list_categories().await {
        Ok(categories) => {
            let body: Vec<CategoryResponse> = categories.iter().map(category_to_response).collect();
            json_response(StatusCode::OK, &body)
        }
        Err(e) => error_to_response(&e),
    }
}

async fn handle_get_category(state: Arc<AppState>, raw_id: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match VocabularyService::new(mongo.clone()).get_category(id).await {
        Ok(Some(category)) => json_response(StatusCode::OK, &category_to_response(&category)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "vocabulary category not found",
            Some("NOT_FOUND"),
        ),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_create_category(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<FullBody> {
    let body: CreateCategoryRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid JSON body: {}", e),
                None,
            )
        }
    };
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let data = NewVocabularyCategory {
        title_en: body.title_en,
        title_pt: body.title_pt,
        icon_name: body.icon_name,
        gradient_colors: body.gradient_colors,
        total_levels: body.total_levels,
        order: body.order,
        is_premium: body.is_premium,
    };

    match VocabularyService::new(mongo.clone()).create_category(data).await {
        Ok(id) => json_response(StatusCode::CREATED, &CreatedResponse { id: id.to_hex() }),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_update_category(
    req: Request<Incoming>,
    state: Arc<AppState>,
    raw_id: String,
) -> Response<FullBody> {
    let body: UpdateCategoryRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid JSON body: {}", e),
                None,
            )
        }
    };
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(&raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let update = VocabularyCategoryUpdate {
        title_en: body.title_en,
        title_pt: body.title_pt,
        icon_name: body.icon_name,
        gradient_colors: body.gradient_colors,
        total_levels: body.total_levels,
        order: body.order,
        is_premium: body.is_premium,
    };

    match VocabularyService::new(mongo.clone())
        .update_category(id, update)
        .await
    {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Vocabulary category updated".to_string(),
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_delete_category(state: Arc<AppState>, raw_id: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match VocabularyService::new(mongo.clone()).delete_category(id).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Vocabulary category and questions deleted".to_string(),
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_reorder_categories(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<FullBody> {
    let items: Vec<ReorderItem> = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid JSON body: {}", e),
                None,
            )
        }
    };

    if items.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No order assignments given", None);
    }

    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let mut assignments = Vec::with_capacity(items.len());
    for item in &items {
        let id = match parse_object_id(&item.id) {
            Ok(id) => id,
            Err(resp) => return resp,
        };
        assignments.push(OrderAssignment {
            id,
            order: item.order,
        });
    }

    match VocabularyService::new(mongo.clone())
        .reorder_categories(&assignments)
        .await
    {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Order updated".to_string(),
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

// =============================================================================
// Question Handlers
// =============================================================================

async fn handle_list_questions(state: Arc<AppState>, raw_category: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let category_id = match parse_object_id(raw_category) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match VocabularyService::new(mongo.clone())
        .list_questions(category_id)
        .await
    {
        Ok(questions) => {
            let body: Vec<QuestionResponse> = questions.iter().map(question_to_response).collect();
            json_response(StatusCode::OK, &body)
        }
        Err(e) => error_to_response(&e),
    }
}

async fn handle_get_question(state: Arc<AppState>, raw_id: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match VocabularyService::new(mongo.clone()).get_question(id).await {
        Ok(Some(question)) => json_response(StatusCode::OK, &question_to_response(&question)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "vocabulary question not found",
            Some("NOT_FOUND"),
        ),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_create_question(
    req: Request<Incoming>,
    state: Arc<AppState>,
    raw_category: String,
) -> Response<FullBody> {
    let body: CreateQuestionRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid JSON body: {}", e),
                None,
            )
        }
    };
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let category_id = match parse_object_id(&raw_category) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match VocabularyService::new(mongo.clone())
        .create_question(category_id, question_data(body))
        .await
    {
        Ok(id) => json_response(StatusCode::CREATED, &CreatedResponse { id: id.to_hex() }),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_bulk_create_questions(
    req: Request<Incoming>,
    state: Arc<AppState>,
    raw_category: String,
) -> Response<FullBody> {
    let bodies: Vec<CreateQuestionRequest> = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid JSON body: {}", e),
                None,
            )
        }
    };
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let category_id = match parse_object_id(&raw_category) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let items: Vec<NewVocabularyQuestion> = bodies.into_iter().map(question_data).collect();

    match VocabularyService::new(mongo.clone())
        .bulk_create_questions(category_id, items)
        .await
    {
        Ok(created) => json_response(
            StatusCode::CREATED,
            &BulkCreateResponse {
                success: true,
                created,
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_update_question(
    req: Request<Incoming>,
    state: Arc<AppState>,
    raw_id: String,
) -> Response<FullBody> {
    let body: UpdateQuestionRequest = match parse_json_body(req).await {
        Ok(b) => b,
        Err(e) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                &format!("Invalid JSON body: {}", e),
                None,
            )
        }
    };
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(&raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let update = VocabularyQuestionUpdate {
        level: body.level,
        difficulty: body.difficulty,
        question: body.question,
        emoji: body.emoji,
        options: body.options,
        correct_index: body.correct_index,
        explanation_en: body.explanation_en,
        explanation_pt: body.explanation_pt,
    };

    match VocabularyService::new(mongo.clone())
        .update_question(id, update)
        .await
    {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Vocabulary question updated".to_string(),
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_delete_question(state: Arc<AppState>, raw_id: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match VocabularyService::new(mongo.clone()).delete_question(id).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Vocabulary question deleted".to_string(),
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_remove_option(
    state: Arc<AppState>,
    raw_id: &str,
    raw_index: &str,
) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let index: usize = match raw_index.parse() {
        Ok(i) => i,
        Err(_) => {
            return error_response(StatusCode::BAD_REQUEST, "Invalid option index", None);
        }
    };

    match VocabularyService::new(mongo.clone()).remove_option(id, index).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Option removed".to_string(),
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_question_request_defaults() {
        let body: CreateQuestionRequest = serde_json::from_str(
            r#"{
                "question": "What is 'gato' in English?",
                "options": ["cat", "dog", "bird"],
                "correctIndex": 0
            }"#,
        )
        .unwrap();

        assert_eq!(body.level, 1);
        assert_eq!(body.difficulty, 1);
        assert_eq!(body.options.len(), 3);
        assert_eq!(body.correct_index, 0);
        assert_eq!(body.emoji, "");
    }

    #[test]
    fn test_update_question_request_partial() {
        let body: UpdateQuestionRequest =
            serde_json::from_str(r#"{ "difficulty": 2 }"#).unwrap();
        assert_eq!(body.difficulty, Some(2));
        assert!(body.question.is_none());
        assert!(body.options.is_none());
    }
}
