//! Admin API endpoints for the study plan hierarchy
//!
//! ## Endpoints
//!
//! - `GET    /study/folders` - List folders in display order
//! - `POST   /study/folders` - Create a folder
//! - `POST   /study/folders/reorder` - Apply order assignments atomically
//! - `GET    /study/folders/{id}` - Folder with its subfolders
//! - `PUT    /study/folders/{id}` - Update a folder
//! - `DELETE /study/folders/{id}` - Delete a folder and all descendants
//! - `GET    /study/folders/{id}/subfolders` - Subfolders of one folder
//! - `POST   /study/subfolders` - Create a subfolder (bumps parent counter)
//! - `POST   /study/subfolders/reorder`
//! - `GET/PUT/DELETE /study/subfolders/{id}`
//! - `GET    /study/subfolders/{id}/contents` - Contents of one subfolder
//! - `POST   /study/contents` - Create a content (bumps parent counter)
//! - `POST   /study/contents/reorder`
//! - `GET/PUT/DELETE /study/contents/{id}`
//!
//! All endpoints require an admin JWT.

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::schemas::{ContentDifficulty, ContentKind, StudyContentDoc, StudyFolderDoc, StudySubfolderDoc};
use crate::routes::{
    error_response, error_to_response, format_timestamp, json_response, parse_json_body,
    parse_object_id, require_admin, require_db, FullBody, SuccessResponse,
};
use crate::server::AppState;
use crate::services::study::{
    NewStudyContent, NewStudyFolder, NewStudySubfolder, StudyContentUpdate, StudyFolderUpdate,
    StudySubfolderUpdate,
};
use crate::services::{
    OrderAssignment, StudyContentService, StudyFolderService, StudySubfolderService,
};

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon_name: String,
    #[serde(default)]
    pub color_hex: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub is_premium: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFolderRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon_name: Option<String>,
    pub color_hex: Option<String>,
    pub order: Option<i64>,
    pub is_premium: Option<bool>,
    pub completed_items: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubfolderRequest {
    pub parent_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSubfolderRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub order: Option<i64>,
    pub completed_items: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContentRequest {
    pub subfolder_id: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub description: String,
    pub kind: ContentKind,
    pub external_link: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub difficulty: Option<ContentDifficulty>,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContentRequest {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub kind: Option<ContentKind>,
    pub external_link: Option<String>,
    pub image_url: Option<String>,
    pub duration_minutes: Option<i64>,
    pub difficulty: Option<ContentDifficulty>,
    pub is_completed: Option<bool>,
    pub order: Option<i64>,
}

/// One `{id, order}` pair inside a reorder call
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderItem {
    pub id: String,
    pub order: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub icon_name: String,
    pub color_hex: String,
    pub order: i64,
    pub is_premium: bool,
    pub total_items: i64,
    pub completed_items: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDetailResponse {
    #[serde(flatten)]
    pub folder: FolderResponse,
    pub subfolders: Vec<SubfolderResponse>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubfolderResponse {
    pub id: String,
    pub parent_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub order: i64,
    pub total_items: i64,
    pub completed_items: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentResponse {
    pub id: String,
    pub subfolder_id: String,
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub kind: ContentKind,
    pub external_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<ContentDifficulty>,
    pub is_completed: bool,
    pub order: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn folder_to_response(folder: &StudyFolderDoc) -> FolderResponse {
    FolderResponse {
        id: folder._id.map(|o| o.to_hex()).unwrap_or_default(),
        name: folder.name.clone(),
        description: folder.description.clone(),
        icon_name: folder.icon_name.clone(),
        color_hex: folder.color_hex.clone(),
        order: folder.order,
        is_premium: folder.is_premium,
        total_items: folder.total_items,
        completed_items: folder.completed_items,
        created_at: format_timestamp(folder.metadata.created_at),
        updated_at: format_timestamp(folder.metadata.updated_at),
    }
}

fn subfolder_to_response(subfolder: &StudySubfolderDoc) -> SubfolderResponse {
    SubfolderResponse {
        id: subfolder._id.map(|o| o.to_hex()).unwrap_or_default(),
        parent_id: subfolder.parent_id.to_hex(),
        name: subfolder.name.clone(),
        description: subfolder.description.clone(),
        order: subfolder.order,
        total_items: subfolder.total_items,
        completed_items: subfolder.completed_items,
        created_at: format_timestamp(subfolder.metadata.created_at),
        updated_at: format_timestamp(subfolder.metadata.updated_at),
    }
}

fn content_to_response(content: &StudyContentDoc) -> ContentResponse {
    ContentResponse {
        id: content._id.map(|o| o.to_hex()).unwrap_or_default(),
        subfolder_id: content.subfolder_id.to_hex(),
        title: content.title.clone(),
        subtitle: content.subtitle.clone(),
        description: content.description.clone(),
        kind: content.kind,
        external_link: content.external_link.clone(),
        image_url: content.image_url.clone(),
        duration_minutes: content.duration_minutes,
        difficulty: content.difficulty,
        is_completed: content.is_completed,
        order: content.order,
        created_at: format_timestamp(content.metadata.created_at),
        updated_at: format_timestamp(content.metadata.updated_at),
    }
}

#[allow(clippy::result_large_err)]
fn parse_assignments(items: &[ReorderItem]) -> Result<Vec<OrderAssignment>, Response<FullBody>> {
    items
        .iter()
        .map(|item| {
            Ok(OrderAssignment {
                id: parse_object_id(&item.id)?,
                order: item.order,
            })
        })
        .collect()
}

// =============================================================================
// Route Handler
// =============================================================================

/// Main handler for /study/* routes
pub async fn handle_study_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    if let Err(resp) = require_admin(&req, &state) {
        return resp;
    }

    let method = req.method().clone();
    let subpath = path.strip_prefix("/study").unwrap_or("").to_string();

    match (method, subpath.as_str()) {
        // Folders
        (Method::GET, "/folders") | (Method::GET, "/folders/") => {
            handle_list_folders(state).await
        }
        (Method::POST, "/folders") => handle_create_folder(req, state).await,
        (Method::POST, "/folders/reorder") => {
            handle_reorder(req, state, ReorderTarget::Folders).await
        }
        (Method::GET, p) if p.starts_with("/folders/") && p.ends_with("/subfolders") => {
            let id = p
                .strip_prefix("/folders/")
                .and_then(|s| s.strip_suffix("/subfolders"))
                .unwrap_or("");
            handle_list_subfolders(state, id).await
        }
        (Method::GET, p) if p.starts_with("/folders/") => {
            handle_get_folder(state, p.trim_start_matches("/folders/")).await
        }
        (Method::PUT, p) if p.starts_with("/folders/") => {
            handle_update_folder(req, state, p.trim_start_matches("/folders/").to_string()).await
        }
        (Method::DELETE, p) if p.starts_with("/folders/") => {
            handle_delete_folder(state, p.trim_start_matches("/folders/")).await
        }

        // Subfolders
        (Method::POST, "/subfolders") => handle_create_subfolder(req, state).await,
        (Method::POST, "/subfolders/reorder") => {
            handle_reorder(req, state, ReorderTarget::Subfolders).await
        }
        (Method::GET, p) if p.starts_with("/subfolders/") && p.ends_with("/contents") => {
            let id = p
                .strip_prefix("/subfolders/")
                .and_then(|s| s.strip_suffix("/contents"))
                .unwrap_or("");
            handle_list_contents(state, id).await
        }
        (Method::GET, p) if p.starts_with("/subfolders/") => {
            handle_get_subfolder(state, p.trim_start_matches("/subfolders/")).await
        }
        (Method::PUT, p) if p.starts_with("/subfolders/") => {
            handle_update_subfolder(req, state, p.trim_start_matches("/subfolders/").to_string())
                .await
        }
        (Method::DELETE, p) if p.starts_with("/subfolders/") => {
            handle_delete_subfolder(state, p.trim_start_matches("/subfolders/")).await
        }

        // Contents
        (Method::POST, "/contents") => handle_create_content(req, state).await,
        (Method::POST, "/contents/reorder") => {
            handle_reorder(req, state, ReorderTarget::Contents).await
        }
        (Method::GET, p) if p.starts_with("/contents/") => {
            handle_get_content(state, p.trim_start_matches("/contents/")).await
        }
        (Method::PUT, p) if p.starts_with("/contents/") => {
            handle_update_content(req, state, p.trim_start_matches("/contents/").to_string()).await
        }
        (Method::DELETE, p) if p.starts_with("/contents/") => {
            handle_delete_content(state, p.trim_start_matches("/contents/")).await
        }

        _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
    }
}

// =============================================================================
// Folder Handlers
// =============================================================================

async fn handle_list_folders(state: Arc<AppState>) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    match StudyFolderService::new(mongo.clone()).list().await {
        Ok(folders) => {
            let body: Vec<FolderResponse> = folders.iter().map(folder_to_response).collect();
            json_response(StatusCode::OK, &body)
        }
        Err(e) => error_to_response(&e),
    }
}

async fn handle_get_folder(state: Arc<AppState>, raw_id: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let folder = match StudyFolderService::new(mongo.clone()).get_by_id(id).await {
        Ok(Some(f)) => f,
        Ok(None) => {
            return error_response(
                StatusCode::NOT_FOUND,
                "study folder not found",
                Some("NOT_FOUND"),
            )
        }
        Err(e) => return error_to_response(&e),
    };

    // Detail view carries the child subfolders, already sorted
    let subfolders = match StudySubfolderService::new(mongo.clone())
        .list_by_parent(id)
        .await
    {
        Ok(s) => s,
        Err(e) => return error_to_response(&e),
    };

    json_response(
        StatusCode::OK,
        &FolderDetailResponse {
            folder: folder_to_response(&folder),
            subfolders: subfolders.iter().map(subfolder_to_response).collect(),
        },
    )
}

async fn handle_create_folder(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let body: CreateFolderRequest = match parse_json_body(req).await {
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

    let data = NewStudyFolder {
        name: body.name,
        description: body.description,
        icon_name: body.icon_name,
        color_hex: body.color_hex,
        order: body.order,
        is_premium: body.is_premium,
    };

    match StudyFolderService::new(mongo.clone()).create(data).await {
        Ok(id) => json_response(StatusCode::CREATED, &CreatedResponse { id: id.to_hex() }),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_update_folder(
    req: Request<Incoming>,
    state: Arc<AppState>,
    raw_id: String,
) -> Response<FullBody> {
    let body: UpdateFolderRequest = match parse_json_body(req).await {
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

    let update = StudyFolderUpdate {
        name: body.name,
        description: body.description,
        icon_name: body.icon_name,
        color_hex: body.color_hex,
        order: body.order,
        is_premium: body.is_premium,
        completed_items: body.completed_items,
    };

    match StudyFolderService::new(mongo.clone()).update(id, update).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Study folder updated".to_string(),
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_delete_folder(state: Arc<AppState>, raw_id: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match StudyFolderService::new(mongo.clone()).delete(id).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Study folder and descendants deleted".to_string(),
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

// =============================================================================
// Subfolder Handlers
// =============================================================================

async fn handle_list_subfolders(state: Arc<AppState>, raw_parent: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let parent_id = match parse_object_id(raw_parent) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match StudySubfolderService::new(mongo.clone())
        .list_by_parent(parent_id)
        .await
    {
        Ok(subfolders) => {
            let body: Vec<SubfolderResponse> =
                subfolders.iter().map(subfolder_to_response).collect();
            json_response(StatusCode::OK, &body)
        }
        Err(e) => error_to_response(&e),
    }
}

async fn handle_get_subfolder(state: Arc<AppState>, raw_id: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match StudySubfolderService::new(mongo.clone()).get_by_id(id).await {
        Ok(Some(subfolder)) => json_response(StatusCode::OK, &subfolder_to_response(&subfolder)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "study subfolder not found",
            Some("NOT_FOUND"),
        ),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_create_subfolder(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<FullBody> {
    let body: CreateSubfolderRequest = match parse_json_body(req).await {
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
    let parent_id = match parse_object_id(&body.parent_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let data = NewStudySubfolder {
        parent_id,
        name: body.name,
        description: body.description,
        order: body.order,
    };

    match StudySubfolderService::new(mongo.clone()).create(data).await {
        Ok(id) => json_response(StatusCode::CREATED, &CreatedResponse { id: id.to_hex() }),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_update_subfolder(
    req: Request<Incoming>,
    state: Arc<AppState>,
    raw_id: String,
) -> Response<FullBody> {
    let body: UpdateSubfolderRequest = match parse_json_body(req).await {
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

    let update = StudySubfolderUpdate {
        name: body.name,
        description: body.description,
        order: body.order,
        completed_items: body.completed_items,
    };

    match StudySubfolderService::new(mongo.clone())
        .update(id, update)
        .await
    {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Study subfolder updated".to_string(),
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_delete_subfolder(state: Arc<AppState>, raw_id: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match StudySubfolderService::new(mongo.clone()).delete(id).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Study subfolder and contents deleted".to_string(),
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

// =============================================================================
// Content Handlers
// =============================================================================

async fn handle_list_contents(state: Arc<AppState>, raw_subfolder: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let subfolder_id = match parse_object_id(raw_subfolder) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match StudyContentService::new(mongo.clone())
        .list_by_subfolder(subfolder_id)
        .await
    {
        Ok(contents) => {
            let body: Vec<ContentResponse> = contents.iter().map(content_to_response).collect();
            json_response(StatusCode::OK, &body)
        }
        Err(e) => error_to_response(&e),
    }
}

async fn handle_get_content(state: Arc<AppState>, raw_id: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match StudyContentService::new(mongo.clone()).get_by_id(id).await {
        Ok(Some(content)) => json_response(StatusCode::OK, &content_to_response(&content)),
        Ok(None) => error_response(
            StatusCode::NOT_FOUND,
            "study content not found",
            Some("NOT_FOUND"),
        ),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_create_content(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let body: CreateContentRequest = match parse_json_body(req).await {
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
    let subfolder_id = match parse_object_id(&body.subfolder_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let data = NewStudyContent {
        subfolder_id,
        title: body.title,
        subtitle: body.subtitle,
        description: body.description,
        kind: body.kind,
        external_link: body.external_link,
        image_url: body.image_url,
        duration_minutes: body.duration_minutes,
        difficulty: body.difficulty,
        order: body.order,
    };

    match StudyContentService::new(mongo.clone()).create(data).await {
        Ok(id) => json_response(StatusCode::CREATED, &CreatedResponse { id: id.to_hex() }),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_update_content(
    req: Request<Incoming>,
    state: Arc<AppState>,
    raw_id: String,
) -> Response<FullBody> {
    let body: UpdateContentRequest = match parse_json_body(req).await {
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

    let update = StudyContentUpdate {
        title: body.title,
        subtitle: body.subtitle,
        description: body.description,
        kind: body.kind,
        external_link: body.external_link,
        image_url: body.image_url,
        duration_minutes: body.duration_minutes,
        difficulty: body.difficulty,
        is_completed: body.is_completed,
        order: body.order,
    };

    match StudyContentService::new(mongo.clone()).update(id, update).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Study content updated".to_string(),
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

async fn handle_delete_content(state: Arc<AppState>, raw_id: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match StudyContentService::new(mongo.clone()).delete(id).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "Study content deleted".to_string(),
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

// =============================================================================
// Reorder Handler
// =============================================================================

enum ReorderTarget {
    Folders,
    Subfolders,
    Contents,
}

async fn handle_reorder(
    req: Request<Incoming>,
    state: Arc<AppState>,
    target: ReorderTarget,
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
    let assignments = match parse_assignments(&items) {
        Ok(a) => a,
        Err(resp) => return resp,
    };

    let result = match target {
        ReorderTarget::Folders => {
            StudyFolderService::new(mongo.clone())
                .reorder(&assignments)
                .await
        }
        ReorderTarget::Subfolders => {
            StudySubfolderService::new(mongo.clone())
                .reorder(&assignments)
                .await
        }
        ReorderTarget::Contents => {
            StudyContentService::new(mongo.clone())
                .reorder(&assignments)
                .await
        }
    };

    match result {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assignments_round_trip() {
        let first = bson::oid::ObjectId::new();
        let second = bson::oid::ObjectId::new();
        let items = vec![
            ReorderItem {
                id: first.to_hex(),
                order: 2,
            },
            ReorderItem {
                id: second.to_hex(),
                order: 1,
            },
        ];

        let assignments = parse_assignments(&items).unwrap();
        assert_eq!(assignments.len(), 2);
        assert_eq!(assignments[0].id, first);
        assert_eq!(assignments[0].order, 2);
        assert_eq!(assignments[1].id, second);
        assert_eq!(assignments[1].order, 1);
    }

    #[test]
    fn test_parse_assignments_rejects_bad_id() {
        let items = vec![ReorderItem {
            id: "not-an-object-id".into(),
            order: 1,
        }];
        assert!(parse_assignments(&items).is_err());
    }

    #[test]
    fn test_create_folder_request_defaults() {
        let body: CreateFolderRequest =
            serde_json::from_str(r#"{ "name": "Grammar" }"#).unwrap();
        assert_eq!(body.name, "Grammar");
        assert_eq!(body.order, 0);
        assert!(!body.is_premium);
        assert!(body.description.is_none());
    }

    #[test]
    fn test_create_content_request_parses_kind() {
        let body: CreateContentRequest = serde_json::from_str(
            r#"{
                "subfolderId": "66f0a1b2c3d4e5f6a7b8c9d0",
                "title": "Irregular verbs",
                "kind": "article",
                "externalLink": "https://example.com/irregular-verbs"
            }"#,
        )
        .unwrap();
        assert_eq!(body.kind, ContentKind::Article);
        assert_eq!(body.subtitle, "");
        assert!(body.difficulty.is_none());
    }
}
