//! Request bodies posted either as HTML forms or as JSON objects.

use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::{Form, Json};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;
use crate::validation::{FieldError, FieldErrors, ValidationError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Payload whose fields are all free text.
pub trait TextPayload: DeserializeOwned {
    /// Accepted field names, serde aliases included.
    const FIELDS: &'static [&'static str];
}

/// Extractor decoding a [`TextPayload`] from a urlencoded form or a JSON object.
///
/// Decode failures surface as a `400` listing every offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOrJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for FormOrJson<T>
where
    T: TextPayload,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let object = if is_form(req.headers()) {
            let Form(pairs) = Form::<Vec<(String, String)>>::from_request(req, state)
                .await
                .map_err(|rejection| body_error(rejection.body_text()))?;
            pairs
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect()
        } else {
            let Json(value) = Json::<Value>::from_request(req, state)
                .await
                .map_err(|rejection| body_error(rejection.body_text()))?;
            match value {
                Value::Object(object) => object,
                _ => return Err(body_error("expected a JSON object")),
            }
        };

        decode(object).map(FormOrJson).map_err(AppError::from)
    }
}

/// Keep known text fields, reporting every non-text value before deserializing.
pub fn decode<T: TextPayload>(object: Map<String, Value>) -> Result<T, ValidationError> {
    let mut errors = FieldErrors::default();
    let mut text = Map::new();

    for (key, value) in object {
        let Some(field) = T::FIELDS.iter().copied().find(|field| *field == key) else {
            continue;
        };
        match value {
            Value::String(_) | Value::Null => {
                text.insert(key, value);
            }
            other => errors.push(field, format!("expected text, found {}", kind(&other))),
        }
    }

    if !errors.is_empty() {
        return Err(errors.into_error());
    }

    serde_json::from_value(Value::Object(text)).map_err(|err| ValidationError {
        fields: vec![FieldError {
            field: "body",
            message: err.to_string(),
        }],
    })
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().starts_with(FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

fn body_error(message: impl Into<String>) -> AppError {
    AppError::BadRequest(ValidationError {
        fields: vec![FieldError {
            field: "body",
            message: message.into(),
        }],
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "text",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Note {
        #[serde(alias = "heading")]
        title: Option<String>,
        body: Option<String>,
    }

    impl TextPayload for Note {
        const FIELDS: &'static [&'static str] = &["title", "heading", "body"];
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(object) => object,
            _ => panic!("expected object"),
        }
    }

    async fn extract(content_type: &str, body: &str) -> Result<Note, AppError> {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body.to_string()))
            .expect("request");
        FormOrJson::<Note>::from_request(request, &())
            .await
            .map(|FormOrJson(note)| note)
    }

    #[test]
    fn decode_collects_every_non_text_field() {
        let error = decode::<Note>(object(json!({ "title": 4, "body": ["a"], "extra": true })))
            .expect_err("rejected");
        assert_eq!(error.fields.len(), 2);
        assert!(error.has_field("title"));
        assert!(error.has_field("body"));
    }

    #[test]
    fn decode_ignores_unknown_fields_and_honours_aliases() {
        let note = decode::<Note>(object(json!({ "heading": "Hi", "body": null, "x": 1 })))
            .expect("decoded");
        assert_eq!(note.title.as_deref(), Some("Hi"));
        assert_eq!(note.body, None);
    }

    #[tokio::test]
    async fn form_bodies_decode_like_json() {
        let form = extract(FORM_CONTENT_TYPE, "title=Hello+there&body=a%40b.com")
            .await
            .expect("form");
        let json = extract("application/json", r#"{"title":"Hello there","body":"a@b.com"}"#)
            .await
            .expect("json");
        assert_eq!(form, json);
    }

    #[tokio::test]
    async fn malformed_bodies_become_field_errors() {
        let response = extract("application/json", "{not json")
            .await
            .expect_err("rejected")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = extract("application/json", "[1, 2]")
            .await
            .expect_err("rejected")
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
