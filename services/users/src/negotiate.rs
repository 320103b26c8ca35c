//! Response content negotiation
//!
//! JSON is the canonical representation; XML is produced when the client
//! prefers it. A request whose `Accept` header lists only media types we
//! cannot produce is answered with 406.

use axum::{
    Json, async_trait,
    extract::FromRequestParts,
    http::{HeaderValue, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::error::ApiError;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Output format selected for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Xml,
}

impl Format {
    /// Pick a format from an `Accept` header value
    ///
    /// Ranges are tried by descending `q`, ties in header order. Returns
    /// `None` when nothing acceptable can be produced.
    pub fn from_accept(accept: Option<&str>) -> Option<Self> {
        let accept = match accept.map(str::trim) {
            None | Some("") => return Some(Format::Json),
            Some(accept) => accept,
        };

        let mut ranges: Vec<(&str, f32)> = accept
            .split(',')
            .filter_map(|range| {
                let mut parts = range.split(';');
                let media_type = parts.next()?.trim();
                let quality = parts
                    .filter_map(|param| param.trim().strip_prefix("q="))
                    .find_map(|q| q.trim().parse::<f32>().ok())
                    .unwrap_or(1.0);
                (!media_type.is_empty() && quality > 0.0).then_some((media_type, quality))
            })
            .collect();

        // stable, so equal weights keep header order
        ranges.sort_by(|a, b| b.1.total_cmp(&a.1));

        ranges
            .into_iter()
            .find_map(|(media_type, _)| Self::from_media_type(media_type))
    }

    fn from_media_type(media_type: &str) -> Option<Self> {
        let media_type = media_type.to_ascii_lowercase();
        match media_type.as_str() {
            "*/*" | "application/*" | "application/json" | "text/json" => Some(Format::Json),
            "application/xml" | "text/xml" => Some(Format::Xml),
            other if other.starts_with("application/") && other.ends_with("+json") => {
                Some(Format::Json)
            }
            _ => None,
        }
    }

    /// Serialize `value` in this format; `root` names the XML document element
    pub fn render<T: Serialize>(self, root: &str, value: &T) -> Result<Response, ApiError> {
        match self {
            Format::Json => Ok(Json(value).into_response()),
            Format::Xml => {
                let body = quick_xml::se::to_string_with_root(root, value).map_err(|e| {
                    error!("Failed to serialize {} as XML: {}", root, e);
                    ApiError::Internal(e.to_string())
                })?;

                Ok((
                    [(header::CONTENT_TYPE, HeaderValue::from_static(XML_CONTENT_TYPE))],
                    body,
                )
                    .into_response())
            }
        }
    }

    /// Serialize a sequence of users; in XML each item becomes a `UserDto`
    /// element inside a `root` element
    pub fn render_list<T: Serialize>(self, root: &str, items: &[T]) -> Result<Response, ApiError> {
        match self {
            Format::Json => Ok(Json(items).into_response()),
            Format::Xml => self.render(root, &UserDtoArray { items }),
        }
    }
}

#[derive(Serialize)]
struct UserDtoArray<'a, T> {
    #[serde(rename = "UserDto")]
    items: &'a [T],
}

#[async_trait]
impl<S> FromRequestParts<S> for Format
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let accept = parts
            .headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok());

        Format::from_accept(accept).ok_or(ApiError::NotAcceptable)
    }
}
