use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use super::directory::FranchiseDirectory;
use super::domain::{FranchiseId, FranchiseRegistration, PublicFranchiseView};
use super::service::{FranchiseDirectoryService, FranchiseServiceError};
use crate::actor::Actor;
use crate::error::AppError;
use crate::payload::FormOrJson;
use crate::validation::{FieldError, ValidationError};

/// Router builder exposing the public directory and back-office management endpoints.
pub fn franchise_router<D>(service: Arc<FranchiseDirectoryService<D>>) -> Router
where
    D: FranchiseDirectory + 'static,
{
    Router::new()
        .route("/api/v1/franchises/public", get(public_list_handler::<D>))
        .route(
            "/api/v1/franchises/public/locations",
            get(locations_handler::<D>),
        )
        .route(
            "/api/v1/franchises/public/:slug",
            get(public_detail_handler::<D>),
        )
        .route("/api/v1/franchises/admin", post(register_handler::<D>))
        .route(
            "/api/v1/franchises/admin/:franchise_id",
            patch(set_active_handler::<D>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PublicListQuery {
    pub(crate) city: Option<String>,
    pub(crate) state: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActivationRequest {
    pub(crate) is_active: bool,
}

pub(crate) async fn public_list_handler<D>(
    State(service): State<Arc<FranchiseDirectoryService<D>>>,
    Query(query): Query<PublicListQuery>,
) -> Response
where
    D: FranchiseDirectory + 'static,
{
    match service.public_list(query.city.as_deref(), query.state.as_deref()) {
        Ok(franchises) => {
            let views: Vec<PublicFranchiseView> =
                franchises.iter().map(|franchise| franchise.public_view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn public_detail_handler<D>(
    State(service): State<Arc<FranchiseDirectoryService<D>>>,
    Path(slug): Path<String>,
) -> Response
where
    D: FranchiseDirectory + 'static,
{
    match service.public_detail(&slug) {
        Ok(franchise) => (StatusCode::OK, Json(franchise.public_view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn locations_handler<D>(
    State(service): State<Arc<FranchiseDirectoryService<D>>>,
) -> Response
where
    D: FranchiseDirectory + 'static,
{
    match service.locations() {
        Ok(locations) => (StatusCode::OK, Json(locations)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_handler<D>(
    State(service): State<Arc<FranchiseDirectoryService<D>>>,
    actor: Actor,
    FormOrJson(registration): FormOrJson<FranchiseRegistration>,
) -> Response
where
    D: FranchiseDirectory + 'static,
{
    let owner = match actor.back_office() {
        Ok(owner) => owner.clone(),
        Err(denied) => return denied.into_response(),
    };

    match service.register(registration, owner) {
        Ok(franchise) => (StatusCode::CREATED, Json(franchise)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn set_active_handler<D>(
    State(service): State<Arc<FranchiseDirectoryService<D>>>,
    actor: Actor,
    Path(franchise_id): Path<u64>,
    request: Result<Json<ActivationRequest>, JsonRejection>,
) -> Response
where
    D: FranchiseDirectory + 'static,
{
    if let Err(denied) = actor.back_office() {
        return denied.into_response();
    }

    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = ValidationError {
                fields: vec![FieldError {
                    field: "is_active",
                    message: rejection.body_text(),
                }],
            };
            return AppError::from(error).into_response();
        }
    };

    match service.set_active(FranchiseId(franchise_id), request.is_active) {
        Ok(franchise) => (StatusCode::OK, Json(franchise)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: FranchiseServiceError) -> Response {
    AppError::from(error).into_response()
}
