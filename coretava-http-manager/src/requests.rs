//! Constructors for [`HttpRequest`] values. Nothing is sent until the
//! request reaches [`crate::HttpManager::on_effects`].

use crate::{HttpError, HttpMethod, HttpRequest, HttpResponse};
use std::sync::Arc;

fn request<Msg>(
    method: HttpMethod,
    url: String,
    body: Option<Vec<u8>>,
    returns: impl Fn(Result<HttpResponse, HttpError>) -> Msg + Send + Sync + 'static,
) -> HttpRequest<Msg> {
    HttpRequest {
        method,
        url,
        headers: Vec::new(),
        body,
        returns: Arc::new(returns),
    }
}

pub fn get<Msg>(
    url: impl Into<String>,
    returns: impl Fn(Result<HttpResponse, HttpError>) -> Msg + Send + Sync + 'static,
) -> HttpRequest<Msg> {
    request(HttpMethod::Get, url.into(), None, returns)
}

/// `body` is sent as-is; set `Content-Type` with [`HttpRequest::with_header`].
pub fn post<Msg>(
    url: impl Into<String>,
    body: impl Into<Vec<u8>>,
    returns: impl Fn(Result<HttpResponse, HttpError>) -> Msg + Send + Sync + 'static,
) -> HttpRequest<Msg> {
    request(HttpMethod::Post, url.into(), Some(body.into()), returns)
}
