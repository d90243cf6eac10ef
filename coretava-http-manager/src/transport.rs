use crate::{HttpError, HttpMethod, HttpResponse};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// A request with its continuation stripped off.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpCall {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

pub type HttpFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'static>>;

/// Executes one call. Non-2xx statuses are responses, not errors.
pub trait HttpTransport: Send + Sync + 'static {
    fn execute(&self, call: HttpCall) -> HttpFuture;
}

#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(|e| HttpError::new(format!("failed to build http client: {e}")))?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, call: HttpCall) -> HttpFuture {
        let client = self.client.clone();
        Box::pin(async move {
            let method = match call.method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
            };
            let mut req = client.request(method, &call.url);
            for (name, value) in &call.headers {
                req = req.header(name.as_str(), value.as_str());
            }
            if let Some(body) = call.body {
                req = req.body(body);
            }

            let resp = req.send().await.map_err(|e| HttpError::new(e.to_string()))?;
            let status = resp.status().as_u16();
            let headers = resp
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or_default().to_string()))
                .collect();
            let body = resp
                .bytes()
                .await
                .map_err(|e| HttpError::new(format!("failed to read body: {e}")))?
                .to_vec();
            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        })
    }
}
