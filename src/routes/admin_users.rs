//! Admin API endpoints for user management
//!
//! ## Endpoints
//!
//! - `GET    /admin/users` - List users with pagination and search
//! - `GET    /admin/users/{id}` - User details
//! - `PUT    /admin/users/{id}` - Update profile fields
//! - `DELETE /admin/users/{id}` - Delete user
//! - `PUT    /admin/users/{id}/premium` - Toggle premium subscription
//! - `POST   /admin/users/{id}/xp` - Grant XP (recomputes derived level)
//! - `POST   /admin/users/{id}/coins` - Grant coins
//! - `POST   /admin/users/{id}/streak/reset` - Zero the streak counter
//! - `POST   /admin/users/{id}/reset-password` - Replace console credential
//!
//! All endpoints require an admin JWT.

use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::db::schemas::UserDoc;
use crate::routes::{
    error_response, error_to_response, format_timestamp, json_response, parse_json_body,
    parse_object_id, require_admin, require_db, FullBody, SuccessResponse,
};
use crate::server::AppState;
use crate::services::users::UserUpdate;
use crate::services::UserService;

// =============================================================================
// Request/Response Types
// =============================================================================

/// Query parameters for listing users
#[derive(Debug, Default)]
pub struct ListUsersQuery {
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
    pub is_premium: Option<bool>,
}

impl ListUsersQuery {
    fn from_query_string(query: Option<&str>) -> Self {
        let mut params = Self {
            page: 1,
            limit: 20,
            search: None,
            is_premium: None,
        };

        if let Some(q) = query {
            for pair in q.split('&') {
                if let Some((key, value)) = pair.split_once('=') {
                    let value = urlencoding::decode(value).unwrap_or_default();
                    match key {
                        "page" => params.page = value.parse().unwrap_or(1),
                        "limit" => params.limit = value.parse().unwrap_or(20),
                        "search" => params.search = Some(value.to_string()),
                        "isPremium" | "is_premium" => params.is_premium = value.parse().ok(),
                        _ => {}
                    }
                }
            }
        }

        params
    }

    /// Keep users matching the search text and premium filter
    fn matches(&self, user: &UserDoc) -> bool {
        if let Some(premium) = self.is_premium {
            if user.is_premium != premium {
                return false;
            }
        }
        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            return user.email.to_lowercase().contains(&needle)
                || user.name.to_lowercase().contains(&needle);
        }
        true
    }
}

/// User summary for list view
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub name: String,
    pub xp: i64,
    pub user_level: i64,
    pub coins: i64,
    pub streak: i64,
    pub is_premium: bool,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

/// Paginated users response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsersResponse {
    pub users: Vec<UserSummary>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// Full user details response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailsResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    pub daily_goal: i64,
    pub xp: i64,
    pub streak: i64,
    pub user_level: i64,
    pub achievements: Vec<String>,
    pub total_lessons: i64,
    pub total_words: i64,
    pub total_hours: f64,
    pub coins: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_check_in_date: Option<String>,
    pub is_premium: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_type: Option<String>,
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
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

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPremiumRequest {
    pub is_premium: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantRequest {
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantResponse {
    pub success: bool,
    pub new_total: i64,
}

fn user_to_summary(user: &UserDoc) -> UserSummary {
    UserSummary {
        id: user._id.map(|o| o.to_hex()).unwrap_or_default(),
        email: user.email.clone(),
        name: user.name.clone(),
        xp: user.xp,
        user_level: user.user_level,
        coins: user.coins,
        streak: user.streak,
        is_premium: user.is_premium,
        is_admin: user.is_admin,
        created_at: format_timestamp(user.metadata.created_at),
        last_login_at: format_timestamp(user.last_login_at),
    }
}

fn user_to_details(user: &UserDoc) -> UserDetailsResponse {
    UserDetailsResponse {
        id: user._id.map(|o| o.to_hex()).unwrap_or_default(),
        email: user.email.clone(),
        name: user.name.clone(),
        phone: user.phone.clone(),
        photo_url: user.photo_url.clone(),
        goal: user.goal.clone(),
        level: user.level.clone(),
        frequency: user.frequency.clone(),
        daily_goal: user.daily_goal,
        xp: user.xp,
        streak: user.streak,
        user_level: user.user_level,
        achievements: user.achievements.clone(),
        total_lessons: user.total_lessons,
        total_words: user.total_words,
        total_hours: user.total_hours,
        coins: user.coins,
        last_check_in_date: format_timestamp(user.last_check_in_date),
        is_premium: user.is_premium,
        subscription_type: user.subscription_type.clone(),
        is_admin: user.is_admin,
        created_at: format_timestamp(user.metadata.created_at),
        last_login_at: format_timestamp(user.last_login_at),
    }
}

// =============================================================================
// Route Handler
// =============================================================================

/// Main handler for /admin/users/* routes
pub async fn handle_admin_users_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
    path: &str,
) -> Response<FullBody> {
    let admin_claims = match require_admin(&req, &state) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let admin_email = admin_claims.email;

    let method = req.method().clone();
    let subpath = path.strip_prefix("/admin/users").unwrap_or("").to_string();

    match (method, subpath.as_str()) {
        (Method::GET, "") | (Method::GET, "/") => handle_list_users(req, state).await,

        (Method::PUT, p) if p.ends_with("/premium") => {
            let id = p
                .strip_prefix('/')
                .and_then(|s| s.strip_suffix("/premium"))
                .unwrap_or("")
                .to_string();
            handle_set_premium(req, state, id, admin_email).await
        }

        (Method::POST, p) if p.ends_with("/xp") => {
            let id = p
                .strip_prefix('/')
                .and_then(|s| s.strip_suffix("/xp"))
                .unwrap_or("")
                .to_string();
            handle_grant_xp(req, state, id, admin_email).await
        }

        (Method::POST, p) if p.ends_with("/coins") => {
            let id = p
                .strip_prefix('/')
                .and_then(|s| s.strip_suffix("/coins"))
                .unwrap_or("")
                .to_string();
            handle_grant_coins(req, state, id, admin_email).await
        }

        (Method::POST, p) if p.ends_with("/streak/reset") => {
            let id = p
                .strip_prefix('/')
                .and_then(|s| s.strip_suffix("/streak/reset"))
                .unwrap_or("");
            handle_reset_streak(state.clone(), id, &admin_email).await
        }

        (Method::POST, p) if p.ends_with("/reset-password") => {
            let id = p
                .strip_prefix('/')
                .and_then(|s| s.strip_suffix("/reset-password"))
                .unwrap_or("")
                .to_string();
            handle_reset_password(req, state, id, admin_email).await
        }

        (Method::GET, p) => {
            let id = p.trim_start_matches('/');
            handle_get_user(state.clone(), id).await
        }

        (Method::PUT, p) => {
            let id = p.trim_start_matches('/').to_string();
            handle_update_user(req, state, id).await
        }

        (Method::DELETE, p) => {
            let id = p.trim_start_matches('/');
            handle_delete_user(state.clone(), id, &admin_email).await
        }

        _ => error_response(StatusCode::NOT_FOUND, "Not found", None),
    }
}

// =============================================================================
// Endpoint Handlers
// =============================================================================

/// GET /admin/users - List users with pagination
async fn handle_list_users(req: Request<Incoming>, state: Arc<AppState>) -> Response<FullBody> {
    let params = ListUsersQuery::from_query_string(req.uri().query());

    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };

    let users = match UserService::new(mongo.clone()).list().await {
        Ok(u) => u,
        Err(e) => return error_to_response(&e),
    };

    let filtered: Vec<&UserDoc> = users.iter().filter(|u| params.matches(u)).collect();
    let total = filtered.len() as u64;

    let limit = params.limit.clamp(1, 100);
    let page = params.page.max(1);
    let skip = ((page - 1) * limit) as usize;

    let page_users: Vec<UserSummary> = filtered
        .into_iter()
        .skip(skip)
        .take(limit as usize)
        .map(|u| user_to_summary(u))
        .collect();

    let total_pages = ((total as f64) / (limit as f64)).ceil() as u32;

    json_response(
        StatusCode::OK,
        &UsersResponse {
            users: page_users,
            total,
            page,
            limit,
            total_pages,
        },
    )
}

/// GET /admin/users/{id} - User details
async fn handle_get_user(state: Arc<AppState>, raw_id: &str) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match UserService::new(mongo.clone()).get_by_id(id).await {
        Ok(Some(user)) => json_response(StatusCode::OK, &user_to_details(&user)),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "user not found", Some("NOT_FOUND")),
        Err(e) => error_to_response(&e),
    }
}

/// PUT /admin/users/{id} - Update profile fields
async fn handle_update_user(
    req: Request<Incoming>,
    state: Arc<AppState>,
    raw_id: String,
) -> Response<FullBody> {
    let body: UpdateUserRequest = match parse_json_body(req).await {
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

    let update = UserUpdate {
        name: body.name,
        phone: body.phone,
        photo_url: body.photo_url,
        goal: body.goal,
        level: body.level,
        frequency: body.frequency,
        daily_goal: body.daily_goal,
        achievements: body.achievements,
        total_lessons: body.total_lessons,
        total_words: body.total_words,
        total_hours: body.total_hours,
    };

    match UserService::new(mongo.clone()).update(id, update).await {
        Ok(()) => json_response(
            StatusCode::OK,
            &SuccessResponse {
                success: true,
                message: "User updated".to_string(),
            },
        ),
        Err(e) => error_to_response(&e),
    }
}

/// DELETE /admin/users/{id}
async fn handle_delete_user(
    state: Arc<AppState>,
    raw_id: &str,
    admin_email: &str,
) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match UserService::new(mongo.clone()).delete(id).await {
        Ok(()) => {
            info!("User {} deleted by admin {}", raw_id, admin_email);
            json_response(
                StatusCode::OK,
                &SuccessResponse {
                    success: true,
                    message: "User deleted".to_string(),
                },
            )
        }
        Err(e) => error_to_response(&e),
    }
}

/// PUT /admin/users/{id}/premium - Toggle premium subscription
async fn handle_set_premium(
    req: Request<Incoming>,
    state: Arc<AppState>,
    raw_id: String,
    admin_email: String,
) -> Response<FullBody> {
    let body: SetPremiumRequest = match parse_json_body(req).await {
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

    match UserService::new(mongo.clone())
        .set_premium(id, body.is_premium)
        .await
    {
        Ok(()) => {
            info!(
                "User {} premium set to {} by admin {}",
                raw_id, body.is_premium, admin_email
            );
            json_response(
                StatusCode::OK,
                &SuccessResponse {
                    success: true,
                    message: format!(
                        "User {}",
                        if body.is_premium {
                            "upgraded to premium"
                        } else {
                            "downgraded to free"
                        }
                    ),
                },
            )
        }
        Err(e) => error_to_response(&e),
    }
}

/// POST /admin/users/{id}/xp - Grant XP
async fn handle_grant_xp(
    req: Request<Incoming>,
    state: Arc<AppState>,
    raw_id: String,
    admin_email: String,
) -> Response<FullBody> {
    let body: GrantRequest = match parse_json_body(req).await {
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

    match UserService::new(mongo.clone()).add_xp(id, body.amount).await {
        Ok(new_total) => {
            info!(
                "{} XP granted to user {} by admin {}",
                body.amount, raw_id, admin_email
            );
            json_response(
                StatusCode::OK,
                &GrantResponse {
                    success: true,
                    new_total,
                },
            )
        }
        Err(e) => error_to_response(&e),
    }
}

/// POST /admin/users/{id}/coins - Grant coins
async fn handle_grant_coins(
    req: Request<Incoming>,
    state: Arc<AppState>,
    raw_id: String,
    admin_email: String,
) -> Response<FullBody> {
    let body: GrantRequest = match parse_json_body(req).await {
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

    match UserService::new(mongo.clone())
        .add_coins(id, body.amount)
        .await
    {
        Ok(new_total) => {
            info!(
                "{} coins granted to user {} by admin {}",
                body.amount, raw_id, admin_email
            );
            json_response(
                StatusCode::OK,
                &GrantResponse {
                    success: true,
                    new_total,
                },
            )
        }
        Err(e) => error_to_response(&e),
    }
}

/// POST /admin/users/{id}/streak/reset
async fn handle_reset_streak(
    state: Arc<AppState>,
    raw_id: &str,
    admin_email: &str,
) -> Response<FullBody> {
    let mongo = match require_db(&state) {
        Ok(m) => m,
        Err(resp) => return resp,
    };
    let id = match parse_object_id(raw_id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match UserService::new(mongo.clone()).reset_streak(id).await {
        Ok(()) => {
            info!("Streak reset for user {} by admin {}", raw_id, admin_email);
            json_response(
                StatusCode::OK,
                &SuccessResponse {
                    success: true,
                    message: "Streak reset".to_string(),
                },
            )
        }
        Err(e) => error_to_response(&e),
    }
}

/// POST /admin/users/{id}/reset-password
async fn handle_reset_password(
    req: Request<Incoming>,
    state: Arc<AppState>,
    raw_id: String,
    admin_email: String,
) -> Response<FullBody> {
    let body: ResetPasswordRequest = match parse_json_body(req).await {
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

    match UserService::new(mongo.clone())
        .reset_password(id, &body.new_password)
        .await
    {
        Ok(()) => {
            info!("Password reset for user {} by admin {}", raw_id, admin_email);
            json_response(
                StatusCode::OK,
                &SuccessResponse {
                    success: true,
                    message: "Password reset successfully".to_string(),
                },
            )
        }
        Err(e) => error_to_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_parsing() {
        let params =
            ListUsersQuery::from_query_string(Some("page=2&limit=50&search=maria&isPremium=true"));
        assert_eq!(params.page, 2);
        assert_eq!(params.limit, 50);
        assert_eq!(params.search.as_deref(), Some("maria"));
        assert_eq!(params.is_premium, Some(true));
    }

    #[test]
    fn test_query_string_defaults() {
        let params = ListUsersQuery::from_query_string(None);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 20);
        assert!(params.search.is_none());
        assert!(params.is_premium.is_none());
    }

    #[test]
    fn test_query_string_ignores_garbage() {
        let params = ListUsersQuery::from_query_string(Some("page=abc&unknown=1"));
        assert_eq!(params.page, 1);
    }

    #[test]
    fn test_search_matches_email_and_name() {
        let user: UserDoc = bson::from_document(bson::doc! {
            "email": "maria.souza@example.com",
            "name": "Maria Souza",
        })
        .unwrap();

        let by_email = ListUsersQuery {
            page: 1,
            limit: 20,
            search: Some("SOUZA".into()),
            is_premium: None,
        };
        assert!(by_email.matches(&user));

        let no_match = ListUsersQuery {
            page: 1,
            limit: 20,
            search: Some("joana".into()),
            is_premium: None,
        };
        assert!(!no_match.matches(&user));
    }

    #[test]
    fn test_premium_filter() {
        let user: UserDoc = bson::from_document(bson::doc! {
            "email": "free@example.com",
            "is_premium": false,
        })
        .unwrap();

        let premium_only = ListUsersQuery {
            page: 1,
            limit: 20,
            search: None,
            is_premium: Some(true),
        };
        assert!(!premium_only.matches(&user));
    }
}
