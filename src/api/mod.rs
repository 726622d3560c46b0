mod payload;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use chrono::Utc;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::core::ledger::{TransactionDraft, TransactionEntry, summarize};
use crate::core::profile::{GoalProgress, Profile, ProfileUpdate};
use crate::core::tax::{TaxInput, TaxSchedule, calculate_tax};
use crate::core::project;
use crate::error::AppError;
use crate::session::{Caller, IdentityProvider, bearer_token, require_admin};
use crate::store::{
    ComparisonRecord, InMemoryRepository, Record, RecordId, Repository, RepositoryError,
};

pub(crate) use payload::{ProjectArgs, build_projection_response};
use payload::{ProjectionPayload, api_input_from_payload};

/// Shared handles for every request. Storage and identity sit behind traits so
/// tests can swap them.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub comparisons: Arc<dyn Repository<ComparisonRecord>>,
    pub transactions: Arc<dyn Repository<TransactionEntry>>,
    pub profiles: Arc<dyn Repository<Profile>>,
}

impl AppState {
    pub fn in_memory(identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            identity,
            comparisons: Arc::new(InMemoryRepository::new("cmp")),
            transactions: Arc::new(InMemoryRepository::new("txn")),
            profiles: Arc::new(InMemoryRepository::new("prf")),
        }
    }
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct AdminStats {
    comparisons: usize,
    transactions: usize,
    profiles: usize,
}

#[derive(Serialize)]
struct ProfileView {
    #[serde(flatten)]
    record: Record<Profile>,
    goals: GoalProgress,
}

impl From<Record<Profile>> for ProfileView {
    fn from(record: Record<Profile>) -> Self {
        let goals = record.data.goal_progress();
        Self { record, goals }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/v1/projection",
            get(projection_get_handler).post(projection_post_handler),
        )
        .route("/api/v1/tax", post(tax_handler))
        .route(
            "/api/v1/comparisons",
            get(list_comparisons_handler).post(create_comparison_handler),
        )
        .route("/api/v1/comparisons/:id", delete(delete_comparison_handler))
        .route(
            "/api/v1/transactions",
            get(list_transactions_handler).post(create_transaction_handler),
        )
        .route(
            "/api/v1/transactions/summary",
            get(transaction_summary_handler),
        )
        .route(
            "/api/v1/transactions/:id",
            put(update_transaction_handler).delete(delete_transaction_handler),
        )
        .route(
            "/api/v1/profile",
            get(get_profile_handler).put(update_profile_handler),
        )
        .route("/api/v1/admin/stats", get(admin_stats_handler))
        .route("/api/v1/admin/profiles", get(admin_list_profiles_handler))
        .route(
            "/api/v1/admin/profiles/:id",
            delete(admin_delete_profile_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(config: &AppConfig) -> Result<(), AppError> {
    let addr = config.server.socket_addr()?;
    let registry = config.sessions.registry(Utc::now());
    if registry.is_empty() {
        warn!("no API tokens configured; authenticated routes will reject every request");
    }
    let app = router(AppState::in_memory(Arc::new(registry)));

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, environment = ?config.environment, "fin360 HTTP API listening");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, MessageResponse { message: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn projection_get_handler(
    payload: Result<Query<ProjectionPayload>, QueryRejection>,
) -> Response {
    match payload {
        Ok(Query(payload)) => projection_handler_impl(payload).await,
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

async fn projection_post_handler(
    payload: Result<Json<ProjectionPayload>, JsonRejection>,
) -> Response {
    match payload {
        Ok(Json(payload)) => projection_handler_impl(payload).await,
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

async fn projection_handler_impl(payload: ProjectionPayload) -> Response {
    let input = match api_input_from_payload(payload) {
        Ok(input) => input,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match project(&input) {
        Ok(result) => {
            debug!(
                months = result.months,
                comparison = result.comparison,
                "projection computed"
            );
            json_response(StatusCode::OK, build_projection_response(input, result))
        }
        Err(err) => AppError::from(err).into_response(),
    }
}

async fn tax_handler(
    payload: Result<Json<TaxInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(input) = payload.map_err(bad_body)?;
    let result = calculate_tax(&input, &TaxSchedule::israel_2025())?;
    Ok(json_response(StatusCode::OK, result))
}

async fn list_comparisons_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, &headers)?;
    let records = state.comparisons.list_by_owner(&caller.user_id)?;
    Ok(json_response(StatusCode::OK, records))
}

async fn create_comparison_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<ProjectionPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, &headers)?;
    let Json(payload) = payload.map_err(bad_body)?;
    let input = api_input_from_payload(payload).map_err(AppError::BadRequest)?;
    // Results are recomputed here; clients only ever submit inputs.
    let result = project(&input)?;
    let record = state.comparisons.insert(
        &caller.user_id,
        ComparisonRecord::from_projection(input, &result),
    )?;
    info!(user = %caller.user_id, id = %record.id, "comparison saved");
    Ok(json_response(StatusCode::CREATED, record))
}

async fn delete_comparison_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, &headers)?;
    let id = RecordId(id);
    state.comparisons.delete(&caller.user_id, &id)?;
    info!(user = %caller.user_id, %id, "comparison deleted");
    Ok(json_response(
        StatusCode::OK,
        MessageResponse {
            message: "Comparison deleted",
        },
    ))
}

async fn list_transactions_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, &headers)?;
    let mut records = state.transactions.list_by_owner(&caller.user_id)?;
    records.sort_by(|a, b| b.data.date.cmp(&a.data.date));
    Ok(json_response(StatusCode::OK, records))
}

async fn create_transaction_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    draft: Result<Json<TransactionDraft>, JsonRejection>,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, &headers)?;
    let Json(draft) = draft.map_err(bad_body)?;
    let entry = draft.into_entry(Utc::now().date_naive())?;
    let record = state.transactions.insert(&caller.user_id, entry)?;
    info!(user = %caller.user_id, id = %record.id, "transaction recorded");
    Ok(json_response(StatusCode::CREATED, record))
}

async fn update_transaction_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    draft: Result<Json<TransactionDraft>, JsonRejection>,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, &headers)?;
    let Json(draft) = draft.map_err(bad_body)?;
    let entry = draft.into_entry(Utc::now().date_naive())?;
    let record = state
        .transactions
        .update(&caller.user_id, &RecordId(id), entry)?;
    debug!(user = %caller.user_id, id = %record.id, "transaction updated");
    Ok(json_response(StatusCode::OK, record))
}

async fn delete_transaction_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, &headers)?;
    let id = RecordId(id);
    state.transactions.delete(&caller.user_id, &id)?;
    info!(user = %caller.user_id, %id, "transaction deleted");
    Ok(json_response(
        StatusCode::OK,
        MessageResponse {
            message: "Transaction deleted",
        },
    ))
}

async fn transaction_summary_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, &headers)?;
    let records = state.transactions.list_by_owner(&caller.user_id)?;
    let summary = summarize(&records, Utc::now().date_naive());
    Ok(json_response(StatusCode::OK, summary))
}

async fn admin_stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, &headers)?;
    require_admin(&caller).inspect_err(|_| {
        warn!(user = %caller.user_id, "non-admin requested admin stats");
    })?;
    let stats = AdminStats {
        comparisons: state.comparisons.count()?,
        transactions: state.transactions.count()?,
        profiles: state.profiles.count()?,
    };
    Ok(json_response(StatusCode::OK, stats))
}

async fn get_profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, &headers)?;
    let record = state
        .profiles
        .list_by_owner(&caller.user_id)?
        .into_iter()
        .next()
        .ok_or(RepositoryError::NotFound)?;
    Ok(json_response(StatusCode::OK, ProfileView::from(record)))
}

/// Upserts the caller's single profile.
async fn update_profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    update: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, &headers)?;
    let Json(update) = update.map_err(bad_body)?;

    let existing = state
        .profiles
        .list_by_owner(&caller.user_id)?
        .into_iter()
        .next();
    let record = match existing {
        Some(record) => {
            let mut profile = record.data;
            profile.apply(update)?;
            state.profiles.update(&caller.user_id, &record.id, profile)?
        }
        None => {
            let mut profile = Profile::default();
            profile.apply(update)?;
            let record = state.profiles.insert(&caller.user_id, profile)?;
            info!(user = %caller.user_id, id = %record.id, "profile created");
            record
        }
    };
    Ok(json_response(StatusCode::OK, ProfileView::from(record)))
}

async fn admin_list_profiles_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, &headers)?;
    require_admin(&caller)?;
    let profiles: Vec<ProfileView> = state
        .profiles
        .list_all()?
        .into_iter()
        .map(ProfileView::from)
        .collect();
    Ok(json_response(StatusCode::OK, profiles))
}

async fn admin_delete_profile_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let caller = authenticate(&state, &headers)?;
    require_admin(&caller)?;
    let id = RecordId(id);
    state.profiles.remove(&id)?;
    info!(admin = %caller.user_id, %id, "profile deleted by admin");
    Ok(json_response(
        StatusCode::OK,
        MessageResponse {
            message: "Profile deleted",
        },
    ))
}

fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Caller, AppError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = bearer_token(header)?;
    state
        .identity
        .authenticate(token, Utc::now())
        .map_err(|err| {
            warn!(%err, "rejected bearer token");
            AppError::from(err)
        })
}

fn bad_body(rejection: JsonRejection) -> AppError {
    AppError::BadRequest(rejection.body_text())
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(status, serde_json::json!({ "error": msg }))
}
