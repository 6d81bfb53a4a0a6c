//! Generic CRUD handlers, instantiated once per [`Resource`].
//!
//! Every collection gets the same five routes:
//!
//! | Method | Path | Permission |
//! |---|---|---|
//! | GET | `/<collection>` | `<collection>.read` |
//! | GET | `/<collection>/:id` | `<collection>.read` |
//! | POST | `/<collection>` | `<collection>.create` |
//! | PUT | `/<collection>/:id` | `<collection>.update` |
//! | DELETE | `/<collection>/:id` | `<collection>.delete` |

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::Response,
    routing::get,
};
use serde::Deserialize;

use wms_core::{Page, Pagination, RecordId};
use wms_infra::Record;
use wms_warehouse::{DeleteMode, Resource};

use crate::app::envelope::Envelope;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz::{self, Action};
use crate::context::PrincipalContext;

pub fn resource_router<R: Resource>() -> Router {
    Router::new()
        .route(
            &format!("/{}", R::COLLECTION),
            get(list::<R>).post(create::<R>),
        )
        .route(
            &format!("/{}/:id", R::COLLECTION),
            get(get_one::<R>).put(update::<R>).delete(delete::<R>),
        )
}

/// `limit`/`offset` query parameters; every other key must be a field of the
/// resource filter.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

pub async fn list<R: Resource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    raw: Result<Query<Vec<(String, String)>>, QueryRejection>,
    page: Result<Query<PageParams>, QueryRejection>,
    filter: Result<Query<R::Filter>, QueryRejection>,
) -> Result<Envelope<Page<Record<R>>>, ApiError> {
    authz::require(&principal, R::COLLECTION, Action::Read)?;
    let Query(raw) = raw?;
    reject_unknown_params::<R>(&raw)?;
    let Query(page) = page?;
    let Query(filter) = filter?;

    let pagination = Pagination::new(page.limit, page.offset, services.default_page_limit())?;
    let records = services.repository::<R>().list(&filter, pagination).await?;
    Ok(Envelope::ok(records))
}

pub async fn get_one<R: Resource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Envelope<Record<R>>, ApiError> {
    authz::require(&principal, R::COLLECTION, Action::Read)?;
    let id = parse_id(&id)?;

    let record = services.repository::<R>().get(id).await?;
    Ok(Envelope::ok(record))
}

pub async fn create<R: Resource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<R>, JsonRejection>,
) -> Result<Response, ApiError> {
    authz::require(&principal, R::COLLECTION, Action::Create)?;
    let Json(body) = body?;

    let record = services
        .repository::<R>()
        .create(body, principal.user_id())
        .await?;
    Ok(Envelope::ok(record).into_response_with(StatusCode::CREATED))
}

pub async fn update<R: Resource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    patch: Result<Json<R::Update>, JsonRejection>,
) -> Result<Envelope<Record<R>>, ApiError> {
    authz::require(&principal, R::COLLECTION, Action::Update)?;
    let id = parse_id(&id)?;
    let Json(patch) = patch?;

    let record = services
        .repository::<R>()
        .update(id, patch, principal.user_id())
        .await?;
    Ok(Envelope::ok(record))
}

pub async fn delete<R: Resource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Envelope<Record<R>>, ApiError> {
    authz::require(&principal, R::COLLECTION, Action::Delete)?;
    let id = parse_id(&id)?;

    let record = services
        .repository::<R>()
        .delete(id, principal.user_id())
        .await?;
    let message = match R::DELETE_MODE {
        DeleteMode::Hard => "record deleted",
        DeleteMode::Soft => "record archived",
    };
    Ok(Envelope::ok(record).with_message(message))
}

/// A misspelled filter must not silently widen the result to the whole
/// collection.
fn reject_unknown_params<R: Resource>(params: &[(String, String)]) -> Result<(), ApiError> {
    let fields = serde_json::to_value(R::Filter::default())
        .map_err(|e| ApiError::Internal(format!("{} filter: {e}", R::COLLECTION)))?;
    let known = |key: &str| matches!(key, "limit" | "offset") || fields.get(key).is_some();

    match params.iter().find(|(key, _)| !known(key)) {
        Some((key, _)) => Err(ApiError::BadRequest(format!(
            "unknown query parameter '{key}' for {}",
            R::COLLECTION
        ))),
        None => Ok(()),
    }
}

fn parse_id(raw: &str) -> Result<RecordId, ApiError> {
    raw.parse::<RecordId>().map_err(ApiError::from)
}
