//! HTTP effect manager for coretava units.
//!
//! Requests are plain values carrying a `returns` continuation. The manager
//! runs each one on a spawned task and routes the continuation's message back
//! to the event loop; nothing is retried and nothing blocks the loop.

pub mod campaign;
pub mod requests;
mod transport;

pub use requests::{get, post};
pub use transport::{HttpCall, HttpFuture, HttpTransport, ReqwestTransport};

use coretava_core::Router;
use coretava_macros::Request;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

#[derive(Clone, Request)]
pub struct HttpRequest<Msg> {
    pub method: HttpMethod,
    /// Query values (customer ids) are hidden in logs.
    #[redact(with = redact_query)]
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Event bodies carry customer ids, keep them out of logs.
    #[redact]
    pub body: Option<Vec<u8>>,
    pub returns: Arc<dyn Fn(Result<HttpResponse, HttpError>) -> Msg + Send + Sync>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct HttpError {
    pub message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl<Msg: 'static> HttpRequest<Msg> {
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    fn into_parts(self) -> (HttpCall, Arc<dyn Fn(Result<HttpResponse, HttpError>) -> Msg + Send + Sync>) {
        let call = HttpCall {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
        };
        (call, self.returns)
    }
}

/// `url` with every query value replaced by `<redacted>`, for logging.
pub fn redact_query(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let pairs: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((key, _)) => format!("{key}=<redacted>"),
            None => pair.to_string(),
        })
        .collect();
    format!("{base}?{}", pairs.join("&"))
}

/// HTTP effect manager. Holds the transport; has no per-request state since
/// in-flight requests are never cancelled.
#[derive(Clone)]
pub struct HttpManager {
    transport: Arc<dyn HttpTransport>,
}

impl HttpManager {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Manager backed by reqwest with the configured request timeout.
    pub fn from_config(config: &coretava_core::CoretavaConfig) -> Result<Self, HttpError> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::new(Arc::new(transport)))
    }

    /// Spawn every request. Must be called from within a tokio runtime.
    pub fn on_effects<Msg: Send + 'static>(&self, router: &Router<Msg>, effects: Vec<HttpRequest<Msg>>) {
        for req in effects {
            let (call, returns) = req.into_parts();
            let method = call.method;
            let url = redact_query(&call.url);
            let pending = self.transport.execute(call);
            let app_sender = router.app_sender();
            tokio::spawn(async move {
                let result = pending.await;
                match &result {
                    Ok(resp) => tracing::debug!(?method, %url, status = resp.status, "http request finished"),
                    Err(e) => tracing::debug!(?method, %url, error = %e, "http request failed"),
                }
                if app_sender.send(returns(result)).is_err() {
                    tracing::trace!(%url, "event loop closed, dropping response");
                }
            });
        }
    }
}
