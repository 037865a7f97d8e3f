use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;

use super::domain::{EnquiryId, EnquiryRecord, EnquiryStatus, EnquirySubmission, EnquiryType, EnquiryView};
use super::notification::EnquiryNotifier;
use super::repository::EnquiryRepository;
use super::service::{EnquiryIntakeService, EnquiryServiceError};
use crate::actor::Actor;
use crate::error::AppError;
use crate::payload::{FormOrJson, TextPayload};
use crate::validation::{FieldError, ValidationError};
use crate::workflows::franchises::directory::FranchiseDirectory;

type SharedService<R, D, N> = Arc<EnquiryIntakeService<R, D, N>>;

/// Router builder exposing intake and back-office endpoints.
pub fn enquiry_router<R, D, N>(service: SharedService<R, D, N>) -> Router
where
    R: EnquiryRepository + 'static,
    D: FranchiseDirectory + 'static,
    N: EnquiryNotifier + 'static,
{
    Router::new()
        .route("/api/v1/enquiries", post(submit_handler::<R, D, N>))
        .route(
            "/api/v1/enquiries/admin/all",
            get(global_list_handler::<R, D, N>),
        )
        .route(
            "/api/v1/enquiries/admin/owned",
            get(owner_list_handler::<R, D, N>),
        )
        .route(
            "/api/v1/enquiries/admin/:enquiry_id",
            patch(status_handler::<R, D, N>),
        )
        .route(
            "/api/v1/enquiries/franchise",
            get(franchise_list_handler::<R, D, N>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ListQuery {
    #[serde(rename = "type")]
    pub(crate) enquiry_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StatusUpdate {
    pub(crate) status: Option<String>,
}

impl TextPayload for StatusUpdate {
    const FIELDS: &'static [&'static str] = &["status"];
}

impl StatusUpdate {
    fn parse(self) -> Result<EnquiryStatus, ValidationError> {
        let message = match self.status.as_deref().map(str::trim) {
            None | Some("") => "this field is required".to_string(),
            Some(raw) => match EnquiryStatus::parse(raw) {
                Some(status) => return Ok(status),
                None => format!("\"{raw}\" is not a valid status"),
            },
        };
        Err(ValidationError {
            fields: vec![FieldError {
                field: "status",
                message,
            }],
        })
    }
}

pub(crate) async fn submit_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    FormOrJson(submission): FormOrJson<EnquirySubmission>,
) -> Response
where
    R: EnquiryRepository + 'static,
    D: FranchiseDirectory + 'static,
    N: EnquiryNotifier + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::CREATED, Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn global_list_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    actor: Actor,
    Query(query): Query<ListQuery>,
) -> Response
where
    R: EnquiryRepository + 'static,
    D: FranchiseDirectory + 'static,
    N: EnquiryNotifier + 'static,
{
    if let Err(denied) = actor.back_office() {
        return denied.into_response();
    }

    let enquiry_type = match parse_type_filter(query.enquiry_type.as_deref()) {
        Ok(enquiry_type) => enquiry_type,
        Err(error) => return AppError::from(error).into_response(),
    };

    list_response(service.list_global(enquiry_type))
}

pub(crate) async fn owner_list_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    actor: Actor,
) -> Response
where
    R: EnquiryRepository + 'static,
    D: FranchiseDirectory + 'static,
    N: EnquiryNotifier + 'static,
{
    let owner = match actor.back_office() {
        Ok(owner) => owner.id,
        Err(denied) => return denied.into_response(),
    };

    list_response(service.list_for_owner(owner))
}

pub(crate) async fn franchise_list_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    actor: Actor,
) -> Response
where
    R: EnquiryRepository + 'static,
    D: FranchiseDirectory + 'static,
    N: EnquiryNotifier + 'static,
{
    let franchise = match actor.franchise() {
        Ok(franchise) => franchise,
        Err(denied) => return denied.into_response(),
    };

    list_response(service.list_for_franchise(franchise))
}

pub(crate) async fn status_handler<R, D, N>(
    State(service): State<SharedService<R, D, N>>,
    actor: Actor,
    Path(enquiry_id): Path<u64>,
    FormOrJson(update): FormOrJson<StatusUpdate>,
) -> Response
where
    R: EnquiryRepository + 'static,
    D: FranchiseDirectory + 'static,
    N: EnquiryNotifier + 'static,
{
    if let Err(denied) = actor.back_office() {
        return denied.into_response();
    }

    let status = match update.parse() {
        Ok(status) => status,
        Err(error) => return AppError::from(error).into_response(),
    };

    match service.update_status(EnquiryId(enquiry_id), status) {
        Ok(record) => (StatusCode::OK, Json(record.view())).into_response(),
        Err(error) => error_response(error),
    }
}

fn parse_type_filter(raw: Option<&str>) -> Result<Option<EnquiryType>, ValidationError> {
    match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => EnquiryType::parse(raw).map(Some).ok_or_else(|| ValidationError {
            fields: vec![FieldError {
                field: "type",
                message: format!("\"{raw}\" is not a known enquiry type"),
            }],
        }),
    }
}

fn list_response(result: Result<Vec<EnquiryRecord>, EnquiryServiceError>) -> Response {
    match result {
        Ok(records) => {
            let views: Vec<EnquiryView> = records.iter().map(EnquiryRecord::view).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(error) => error_response(error),
    }
}

fn error_response(error: EnquiryServiceError) -> Response {
    AppError::from(error).into_response()
}
