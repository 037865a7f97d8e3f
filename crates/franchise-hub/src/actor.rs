//! Caller identity asserted by the upstream gateway.
//!
//! Authentication happens before requests reach this service; handlers only read the
//! role headers the gateway forwards and enforce which role may call what.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::workflows::franchises::domain::{FranchiseId, OwnerId, OwnerRef};

pub const ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_EMAIL_HEADER: &str = "x-actor-email";
pub const FRANCHISE_HEADER: &str = "x-franchise-id";

/// Authenticated caller of a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    BackOffice(OwnerRef),
    Franchise(FranchiseId),
}

impl Actor {
    pub fn back_office(&self) -> Result<&OwnerRef, AccessDenied> {
        match self {
            Actor::BackOffice(owner) => Ok(owner),
            Actor::Franchise(_) => Err(AccessDenied::RequiresRole("back-office")),
        }
    }

    pub fn franchise(&self) -> Result<FranchiseId, AccessDenied> {
        match self {
            Actor::Franchise(id) => Ok(*id),
            Actor::BackOffice(_) => Err(AccessDenied::RequiresRole("franchise")),
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ActorRejection> {
        let role = header_text(headers, ROLE_HEADER).ok_or(ActorRejection::MissingRole)?;

        match role.to_ascii_lowercase().as_str() {
            "back-office" | "admin" => {
                let id = header_id(headers, ACTOR_ID_HEADER)?;
                let email = header_text(headers, ACTOR_EMAIL_HEADER).map(str::to_string);
                Ok(Actor::BackOffice(OwnerRef {
                    id: OwnerId(id),
                    email,
                }))
            }
            "franchise" => Ok(Actor::Franchise(FranchiseId(header_id(
                headers,
                FRANCHISE_HEADER,
            )?))),
            other => Err(ActorRejection::UnknownRole(other.to_string())),
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ActorRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Actor::from_headers(&parts.headers)
    }
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn header_id(headers: &HeaderMap, name: &'static str) -> Result<u64, ActorRejection> {
    header_text(headers, name)
        .ok_or(ActorRejection::MissingHeader(name))?
        .parse::<u64>()
        .map_err(|_| ActorRejection::InvalidHeader(name))
}

/// The request carried no usable identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActorRejection {
    #[error("missing x-actor-role header")]
    MissingRole,
    #[error("unknown actor role '{0}'")]
    UnknownRole(String),
    #[error("missing {0} header")]
    MissingHeader(&'static str),
    #[error("{0} header must be a numeric id")]
    InvalidHeader(&'static str),
}

impl IntoResponse for ActorRejection {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// The caller is identified but holds the wrong role.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    #[error("{0} role required")]
    RequiresRole(&'static str),
}

impl IntoResponse for AccessDenied {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::FORBIDDEN, body).into_response()
    }
}
