use axum::{
	Json, Router,
	extract::{State, rejection::JsonRejection},
	http::{HeaderMap, StatusCode, header::AUTHORIZATION},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use vicinity_service::{
	Error as ServiceError, HistoryDeleteRequest, HistoryDeleteResponse, HistoryGetRequest,
	HistoryItem, HistoryListRequest, HistoryListResponse, SearchRequest, SearchResponse,
	SubmitRequest, SubmitResponse,
};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/nearby/search", post(search))
		.route("/v1/nearby/submit", post(submit))
		.route("/v1/history/list", post(history_list))
		.route("/v1/history/get", post(history_get))
		.route("/v1/history/delete", post(history_delete))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let Json(mut payload) = payload?;

	payload.access_token = read_bearer_token(&headers).map(str::to_string);

	let response = state.service.search_nearby(payload).await?;

	Ok(Json(response))
}

async fn submit(
	State(state): State<AppState>,
	payload: Result<Json<SubmitRequest>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.submit_favorites(payload).await?;

	Ok(Json(response))
}

async fn history_list(
	State(state): State<AppState>,
	payload: Result<Json<HistoryListRequest>, JsonRejection>,
) -> Result<Json<HistoryListResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.history_list(payload).await?;

	Ok(Json(response))
}

async fn history_get(
	State(state): State<AppState>,
	payload: Result<Json<HistoryGetRequest>, JsonRejection>,
) -> Result<Json<HistoryItem>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.history_get(payload).await?;

	Ok(Json(response))
}

async fn history_delete(
	State(state): State<AppState>,
	payload: Result<Json<HistoryDeleteRequest>, JsonRejection>,
) -> Result<Json<HistoryDeleteResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.history_delete(payload).await?;

	Ok(Json(response))
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::Validation { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", message, None),
			ServiceError::Unauthenticated { message } =>
				ApiError::new(StatusCode::UNAUTHORIZED, "unauthenticated", message, None),
			ServiceError::NotFound { message } =>
				ApiError::new(StatusCode::NOT_FOUND, "not_found", message, None),
			ServiceError::Connectivity { message } => {
				tracing::error!(error = %message, "Upstream or storage is unreachable.");

				ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "connectivity", message, None)
			},
			ServiceError::Storage { message } => {
				tracing::error!(error = %message, "Stored data could not be read.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "storage", message, None)
			},
			ServiceError::Cancelled => ApiError::new(
				StatusCode::REQUEST_TIMEOUT,
				"cancelled",
				"Request was cancelled.",
				None,
			),
		}
	}
}

impl From<JsonRejection> for ApiError {
	fn from(err: JsonRejection) -> Self {
		ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", err.body_text(), None)
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}
