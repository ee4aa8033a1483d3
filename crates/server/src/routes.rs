use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        FromRef, OriginalUri, Path, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use axum_extra::extract::{Query, QueryRejection};
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::Health;
use configs::PaginationConfig;
use service::catalog::{Categories, Products, Users};
use service::crud::{CrudService, Resource};
use service::errors::ServiceError;
use service::pagination::{Page, PageRequest, SortOrder};

use crate::errors::JsonApiError;

/// Shared handler state: one service per resource kind plus paging defaults.
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<CrudService<Categories>>,
    pub products: Arc<CrudService<Products>>,
    pub users: Arc<CrudService<Users>>,
    pub pagination: PaginationConfig,
}

impl FromRef<AppState> for Arc<CrudService<Categories>> {
    fn from_ref(state: &AppState) -> Self { state.categories.clone() }
}

impl FromRef<AppState> for Arc<CrudService<Products>> {
    fn from_ref(state: &AppState) -> Self { state.products.clone() }
}

impl FromRef<AppState> for Arc<CrudService<Users>> {
    fn from_ref(state: &AppState) -> Self { state.users.clone() }
}

impl FromRef<AppState> for PaginationConfig {
    fn from_ref(state: &AppState) -> Self { state.pagination }
}

/// `?page=0&size=12&sort=name,asc&sort=id,desc&name=PC`
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u64>,
    pub size: Option<u64>,
    #[serde(default)]
    pub sort: Vec<String>,
    /// Substring filter on the name column (email for users).
    #[serde(alias = "email")]
    pub name: Option<String>,
}

impl ListParams {
    fn into_request(self, defaults: &PaginationConfig) -> Result<PageRequest, ServiceError> {
        let mut request =
            PageRequest::of(self.page.unwrap_or(0), self.size.unwrap_or(defaults.default_page_size));
        for raw in &self.sort {
            request = request.sorted(SortOrder::parse(raw)?);
        }
        if let Some(name) = self.name {
            request = request.filtered(name);
        }
        Ok(request)
    }
}

type Svc<K> = State<Arc<CrudService<K>>>;

/// Turn any failure into the JSON error body for `path`. Extractors are taken
/// as `Result` so malformed ids, bodies and queries get the same body too.
fn fail(e: impl Into<JsonApiError>, path: &str) -> JsonApiError {
    e.into().at(path)
}

async fn list<K>(
    State(svc): Svc<K>,
    State(defaults): State<PaginationConfig>,
    OriginalUri(uri): OriginalUri,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Page<K::Dto>>, JsonApiError>
where
    K: Resource,
    Arc<CrudService<K>>: FromRef<AppState>,
{
    let Query(params) = params.map_err(|e| fail(e, uri.path()))?;
    let request = params.into_request(&defaults).map_err(|e| fail(e, uri.path()))?;
    svc.find_all_paged(request).await.map(Json).map_err(|e| fail(e, uri.path()))
}

async fn get_one<K>(
    State(svc): Svc<K>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<K::Dto>, JsonApiError>
where
    K: Resource,
    Arc<CrudService<K>>: FromRef<AppState>,
{
    let Path(id) = id.map_err(|e| fail(e, uri.path()))?;
    svc.find_by_id(id).await.map(Json).map_err(|e| fail(e, uri.path()))
}

async fn create<K>(
    State(svc): Svc<K>,
    OriginalUri(uri): OriginalUri,
    dto: Result<Json<K::InsertDto>, JsonRejection>,
) -> Result<Response, JsonApiError>
where
    K: Resource,
    Arc<CrudService<K>>: FromRef<AppState>,
{
    let Json(dto) = dto.map_err(|e| fail(e, uri.path()))?;
    let created = svc.insert(dto).await.map_err(|e| fail(e, uri.path()))?;
    let location = match K::dto_id(&created) {
        Some(id) => format!("{}/{}", uri.path().trim_end_matches('/'), id),
        None => uri.path().to_string(),
    };
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)).into_response())
}

async fn update<K>(
    State(svc): Svc<K>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i32>, PathRejection>,
    dto: Result<Json<K::UpdateDto>, JsonRejection>,
) -> Result<Json<K::Dto>, JsonApiError>
where
    K: Resource,
    Arc<CrudService<K>>: FromRef<AppState>,
{
    let Path(id) = id.map_err(|e| fail(e, uri.path()))?;
    let Json(dto) = dto.map_err(|e| fail(e, uri.path()))?;
    svc.update(id, dto).await.map(Json).map_err(|e| fail(e, uri.path()))
}

async fn remove<K>(
    State(svc): Svc<K>,
    OriginalUri(uri): OriginalUri,
    id: Result<Path<i32>, PathRejection>,
) -> Result<StatusCode, JsonApiError>
where
    K: Resource,
    Arc<CrudService<K>>: FromRef<AppState>,
{
    let Path(id) = id.map_err(|e| fail(e, uri.path()))?;
    svc.delete(id).await.map(|_| StatusCode::NO_CONTENT).map_err(|e| fail(e, uri.path()))
}

fn resource_routes<K>(path: &str) -> Router<AppState>
where
    K: Resource,
    Arc<CrudService<K>>: FromRef<AppState>,
{
    Router::new()
        .route(path, get(list::<K>).post(create::<K>))
        .route(&format!("{path}/:id"), get(get_one::<K>).put(update::<K>).delete(remove::<K>))
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> Response {
    match common::metrics::encode_metrics() {
        Ok(text) => (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], text).into_response(),
        Err(e) => JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e))
            .at("/metrics")
            .into_response(),
    }
}

/// Build the full application router: the three resource collections plus health and metrics.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .merge(resource_routes::<Categories>("/categories"))
        .merge(resource_routes::<Products>("/products"))
        .merge(resource_routes::<Users>("/users"))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // one INFO span per request with method and path
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // status code and latency on response
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and other failures at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
