//! Delete selection extractor
//!
//! The listing page posts one checkbox per selected product, named after its id.
//! Only the field names matter; values are ignored. Urlencoded, multipart and JSON
//! object bodies are understood; any other content type is rejected.

use actix_multipart::Multipart;
use actix_web::{
    dev::Payload, http::StatusCode, web, FromRequest, HttpMessage, HttpRequest, HttpResponse,
    ResponseError,
};
use futures::{future::LocalBoxFuture, TryStreamExt};
use thiserror::Error;

use crate::api::error::ErrorBody;

#[derive(Debug, Error)]
pub enum SelectionError {
    #[error("Malformed multipart body: {0}")]
    Multipart(String),

    #[error("Unreadable form body: {0}")]
    Body(String),

    #[error("Unsupported content type '{0}'")]
    UnsupportedType(String),
}

impl ResponseError for SelectionError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        ErrorBody::response(self.status_code(), self.to_string())
    }
}

/// Distinct product ids named by a form post, in submission order
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeleteSelection {
    ids: Vec<String>,
}

impl DeleteSelection {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut selection = Self::default();
        for name in names {
            selection.push(name.into());
        }
        selection
    }

    /// Names from an `application/x-www-form-urlencoded` body
    pub fn from_urlencoded(body: &[u8]) -> Self {
        Self::from_names(url::form_urlencoded::parse(body).map(|(name, _)| name.into_owned()))
    }

    /// Keys of an `application/json` object body; an empty body selects nothing
    pub fn from_json(body: &[u8]) -> Result<Self, SelectionError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)
            .map_err(|e| SelectionError::Body(format!("expected a JSON object: {e}")))?;
        Ok(Self::from_names(object.into_iter().map(|(name, _)| name)))
    }

    fn push(&mut self, id: String) {
        if !id.is_empty() && !self.ids.contains(&id) {
            self.ids.push(id);
        }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromRequest for DeleteSelection {
    type Error = SelectionError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let kind = match body_kind(req) {
            Ok(kind) => kind,
            Err(e) => return Box::pin(async move { Err(e) }),
        };

        if kind == BodyKind::Multipart {
            let multipart = Multipart::new(req.headers(), payload.take());
            return Box::pin(read_multipart_names(multipart));
        }

        let body = web::Bytes::from_request(req, payload);
        Box::pin(async move {
            let body = body.await.map_err(|e| SelectionError::Body(e.to_string()))?;
            match kind {
                BodyKind::Json => DeleteSelection::from_json(&body),
                _ => Ok(DeleteSelection::from_urlencoded(&body)),
            }
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    UrlEncoded,
    Multipart,
    Json,
}

/// A missing content type is read as urlencoded
fn body_kind(req: &HttpRequest) -> Result<BodyKind, SelectionError> {
    let mime = req
        .mime_type()
        .map_err(|e| SelectionError::Body(e.to_string()))?;

    match mime.as_ref().map(|m| m.essence_str()) {
        None | Some("application/x-www-form-urlencoded") => Ok(BodyKind::UrlEncoded),
        Some("multipart/form-data") => Ok(BodyKind::Multipart),
        Some("application/json") => Ok(BodyKind::Json),
        Some(other) => Err(SelectionError::UnsupportedType(other.to_string())),
    }
}

async fn read_multipart_names(mut multipart: Multipart) -> Result<DeleteSelection, SelectionError> {
    let mut selection = DeleteSelection::default();

    while let Some(mut field) = multipart
        .try_next()
        .await
        .map_err(|e| SelectionError::Multipart(e.to_string()))?
    {
        if let Some(name) = field.name() {
            selection.push(name.to_string());
        }
        while field
            .try_next()
            .await
            .map_err(|e| SelectionError::Multipart(e.to_string()))?
            .is_some()
        {}
    }

    Ok(selection)
}
