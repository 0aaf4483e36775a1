use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    auth::Credentials,
    db::dao::{UserRecord, UserSearchFilter},
    error::{AppError, messages},
    middleware::BearerToken,
    response::{ApiResult, PagedBody},
    services::{ChangePasswordInput, GuestInput, ProfilePatch, ServiceContext, SignupInput},
    state::AppState,
    storage::{UploadedFile, object_key, validate_upload},
};

use super::forms::FormBody;

pub fn router(upload_limit_bytes: usize) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(find).post(register_guest))
        .route("/verify", get(verify))
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/me", put(update_me))
        .route("/change_password_me", put(change_password_me))
        .route("/{id}", get(get_one))
        .layer(DefaultBodyLimit::max(upload_limit_bytes))
}

/// Default account view. Password, rotating token and audit fields never
/// leave the server through this shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: i32,
    pub username: Option<String>,
    pub enable: bool,
    pub created_at: chrono::DateTime<Utc>,
    pub permissions: Vec<i32>,
    pub user_info: Option<ProfileView>,
    /// Present only in the guest-registration response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub name: Option<String>,
    pub address: Option<String>,
    pub expert_id: Option<String>,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub city: Option<String>,
    pub is_deleted: bool,
}

impl UserView {
    pub fn from_record(record: &UserRecord) -> Self {
        Self {
            id: record.user.id,
            username: record.user.username.clone(),
            enable: record.user.enable,
            created_at: record.user.created_at,
            permissions: record.permissions.clone(),
            user_info: record.info.as_ref().map(ProfileView::from_model),
            token: None,
        }
    }

    fn register(record: &UserRecord) -> Self {
        Self {
            token: Some(record.user.token.clone()),
            ..Self::from_record(record)
        }
    }
}

impl ProfileView {
    fn from_model(info: &crate::db::entities::user_info::Model) -> Self {
        Self {
            name: info.name.clone(),
            address: info.address.clone(),
            expert_id: info.expert_id.clone(),
            phone_number: info.phone_number.clone(),
            avatar_url: info.avatar_url.clone(),
            city: info.city.clone(),
            is_deleted: info.is_deleted,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ListParams {
    name: Option<String>,
    address: Option<String>,
    username: Option<String>,
    permission: Option<String>,
    phone_number: Option<String>,
    page: Option<u64>,
    limit: Option<i64>,
    with_count: Option<String>,
}

async fn find(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> ApiResult<Response> {
    let filter = UserSearchFilter {
        name: params.name,
        address: params.address,
        username: params.username,
        permission: params.permission,
        phone_number: params.phone_number,
    };
    let with_count = params
        .with_count
        .as_deref()
        .map(|v| !v.is_empty() && v != "false")
        .unwrap_or(false);

    let outcome = ServiceContext::from_state(&state)
        .user()
        .find(filter, params.page, params.limit, with_count)
        .await?;
    let data: Vec<UserView> = outcome.records.iter().map(UserView::from_record).collect();

    match outcome.counts {
        Some((total_count, page_count)) => Ok(Json(PagedBody {
            data,
            page_count,
            total_count,
            page: outcome.page,
            limit: outcome.limit,
        })
        .into_response()),
        None => Ok(Json(data).into_response()),
    }
}

async fn verify(
    State(state): State<Arc<AppState>>,
    bearer: BearerToken,
) -> ApiResult<Json<UserView>> {
    let attempts: Vec<Credentials> = bearer.into_credentials().into_iter().collect();
    let record = ServiceContext::from_state(&state)
        .authenticator()
        .authorize(&attempts)
        .await?;
    Ok(Json(UserView::from_record(&record)))
}

async fn get_one(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<UserView>> {
    let id: i32 = id
        .parse()
        .map_err(|_| AppError::not_found("user_not_found", messages::USER_NOT_FOUND))?;
    let record = ServiceContext::from_state(&state).user().get(id).await?;
    Ok(Json(UserView::from_record(&record)))
}

async fn register_guest(
    State(state): State<Arc<AppState>>,
    body: FormBody,
) -> ApiResult<Json<UserView>> {
    let avatar_url = store_avatar(&state, body.file.clone()).await?;
    let record = ServiceContext::from_state(&state)
        .user()
        .register_guest(GuestInput {
            name: body.text("name"),
            phone_number: body.text("phoneNumber"),
            address: body.text("address"),
            avatar_url,
        })
        .await?;
    Ok(Json(UserView::register(&record)))
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LoginBody {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    user: UserView,
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginBody>,
) -> ApiResult<Json<LoginResponse>> {
    let (token, record) = ServiceContext::from_state(&state)
        .user()
        .login(body.username, body.password)
        .await?;
    Ok(Json(LoginResponse {
        token,
        user: UserView::from_record(&record),
    }))
}

async fn signup(
    State(state): State<Arc<AppState>>,
    body: FormBody,
) -> ApiResult<StatusCode> {
    let avatar_url = store_avatar(&state, body.file.clone()).await?;
    ServiceContext::from_state(&state)
        .user()
        .signup(SignupInput {
            username: body.text("username"),
            password: body.text("password"),
            repeat_password: body.text("repeatPassword"),
            phone_number: body.text("phoneNumber"),
            address: body.text("address"),
            avatar_url,
        })
        .await?;
    Ok(StatusCode::OK)
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    bearer: BearerToken,
    body: FormBody,
) -> ApiResult<Json<UserView>> {
    let mut attempts = Vec::new();
    if let Some(credentials) = bearer.into_credentials() {
        attempts.push(credentials);
    }
    if let (Some(user_id), Some(token)) = (body.int("userId"), body.text("token")) {
        attempts.push(Credentials::Guest { user_id, token });
    }

    let ctx = ServiceContext::from_state(&state);
    let record = ctx.authenticator().authorize(&attempts).await?;

    let avatar_url = store_avatar(&state, body.file.clone()).await?;
    let updated = ctx
        .user()
        .update_me(
            record.user.id,
            ProfilePatch {
                name: body.text("name"),
                phone_number: body.text("phoneNumber"),
                address: body.text("address"),
                avatar_url,
            },
        )
        .await?;
    Ok(Json(UserView::from_record(&updated)))
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ChangePasswordBody {
    username: Option<String>,
    password: Option<String>,
    new_password: Option<String>,
    repeat_new_password: Option<String>,
}

async fn change_password_me(
    State(state): State<Arc<AppState>>,
    bearer: BearerToken,
    Json(body): Json<ChangePasswordBody>,
) -> ApiResult<StatusCode> {
    let attempts: Vec<Credentials> = bearer.into_credentials().into_iter().collect();
    let ctx = ServiceContext::from_state(&state);
    let record = ctx.authenticator().authorize(&attempts).await?;

    ctx.user()
        .change_password(
            record.user.id,
            ChangePasswordInput {
                username: body.username,
                password: body.password,
                new_password: body.new_password,
                repeat_new_password: body.repeat_new_password,
            },
        )
        .await?;
    Ok(StatusCode::OK)
}

async fn store_avatar(
    state: &AppState,
    file: Option<UploadedFile>,
) -> ApiResult<Option<String>> {
    let Some(file) = file else {
        return Ok(None);
    };
    validate_upload(&file)?;
    let key = object_key(
        &file.field,
        None,
        &file.original_name,
        Utc::now().timestamp_millis(),
    );
    let url = state
        .store
        .put(&key, file.bytes.clone(), &file.content_type)
        .await?;
    Ok(Some(url))
}
