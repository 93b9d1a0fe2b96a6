//! Catalog HTTP routes.
//!
//! The request layer owns structural validation (field lengths, enum
//! membership, locale format, id format on the strict endpoints); the
//! manager behind it assumes well-formed input and only maintains
//! invariants.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::manager::{CatalogError, CatalogPatch, CreateCatalog};
use crate::server::state::{GuardedCatalogManager, ServerState};

lazy_static! {
    static ref LOCALE_RE: Regex = Regex::new(r"^[a-z]{2}_[A-Z]{2}$").unwrap();
}

const MAX_NAME_LENGTH: usize = 100;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
struct DeleteCatalogsBody {
    ids: Vec<String>,
}

// =============================================================================
// Validation
// =============================================================================

fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("Name must not be empty");
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err("Name must be at most 100 characters long");
    }
    if !name.chars().all(char::is_alphabetic) {
        return Err("Name must contain only alphabetic characters");
    }
    Ok(())
}

fn validate_locales(locales: &[String]) -> Result<(), &'static str> {
    if locales.is_empty() {
        return Err("The locales array must not be empty");
    }
    if !locales.iter().all(|locale| LOCALE_RE.is_match(locale)) {
        return Err("Each locale must follow the pattern xx_YY.");
    }
    Ok(())
}

fn validate_create(body: &CreateCatalog) -> Result<(), &'static str> {
    validate_name(&body.name)?;
    validate_locales(&body.locales)
}

fn validate_patch(body: &CatalogPatch) -> Result<(), &'static str> {
    if let Some(name) = &body.name {
        validate_name(name)?;
    }
    if let Some(locales) = &body.locales {
        validate_locales(locales)?;
    }
    Ok(())
}

/// The delete endpoints are the strict-id variant: ids must be well-formed
/// UUIDs before the store is consulted at all.
fn validate_id_format(id: &str) -> Result<(), &'static str> {
    uuid::Uuid::parse_str(id)
        .map(|_| ())
        .map_err(|_| "Id must be a valid UUID")
}

fn validate_delete_many(body: &DeleteCatalogsBody) -> Result<(), &'static str> {
    if body.ids.is_empty() {
        return Err("The ids array must not be empty");
    }
    if body.ids.iter().any(|id| uuid::Uuid::parse_str(id).is_err()) {
        return Err("Each id must be a valid UUID");
    }
    Ok(())
}

// =============================================================================
// Response mapping
// =============================================================================

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_owned(),
        }),
    )
        .into_response()
}

fn catalog_error_response(err: CatalogError) -> Response {
    if err.is_not_found() {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response();
    }
    error!("Catalog operation failed: {}", err);
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

// =============================================================================
// Handlers
// =============================================================================

async fn create_catalog(
    State(manager): State<GuardedCatalogManager>,
    Json(body): Json<CreateCatalog>,
) -> Response {
    if let Err(message) = validate_create(&body) {
        return bad_request(message);
    }
    match manager.create(body) {
        Ok(catalog) => (StatusCode::CREATED, Json(catalog)).into_response(),
        Err(err) => catalog_error_response(err),
    }
}

async fn list_catalogs(State(manager): State<GuardedCatalogManager>) -> Response {
    match manager.find_all() {
        Ok(catalogs) => Json(catalogs).into_response(),
        Err(err) => catalog_error_response(err),
    }
}

async fn get_catalog(
    State(manager): State<GuardedCatalogManager>,
    Path(id): Path<String>,
) -> Response {
    match manager.find_by_id(&id) {
        Ok(catalog) => Json(catalog).into_response(),
        Err(err) => catalog_error_response(err),
    }
}

async fn update_catalog(
    State(manager): State<GuardedCatalogManager>,
    Path(id): Path<String>,
    Json(body): Json<CatalogPatch>,
) -> Response {
    if let Err(message) = validate_patch(&body) {
        return bad_request(message);
    }
    match manager.update_catalog(&id, body) {
        Ok(catalog) => Json(catalog).into_response(),
        Err(err) => catalog_error_response(err),
    }
}

async fn delete_catalog(
    State(manager): State<GuardedCatalogManager>,
    Path(id): Path<String>,
) -> Response {
    if let Err(message) = validate_id_format(&id) {
        return bad_request(message);
    }
    match manager.delete_catalog(&id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => catalog_error_response(err),
    }
}

async fn delete_catalogs(
    State(manager): State<GuardedCatalogManager>,
    Json(body): Json<DeleteCatalogsBody>,
) -> Response {
    if let Err(message) = validate_delete_many(&body) {
        return bad_request(message);
    }
    match manager.delete_multiple_catalogs(&body.ids) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => catalog_error_response(err),
    }
}

pub fn make_catalog_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", post(create_catalog))
        .route("/", get(list_catalogs))
        .route("/", delete(delete_catalogs))
        .route("/{id}", get(get_catalog))
        .route("/{id}", patch(update_catalog))
        .route("/{id}", delete(delete_catalog))
        .with_state(state)
}
