//! Requests against the Coretava ecommerce API and decoding of their results.

use crate::{get, post, HttpError, HttpRequest, HttpResponse};
use coretava_core::campaign::{Campaign, CampaignApiResponse, CampaignProducts};
use coretava_core::{ConfigError, CoretavaConfig, CoretavaError, ImpressionEvent};
use reqwest::Url;

const PLACEMENT_PATH: [&str; 4] = ["v2", "ecommerce", "campaign-notification", "placement"];
const METRICS_PATH: [&str; 3] = ["v2", "ecommerce", "campaign-metrics"];
const PRODUCTS_PATH: [&str; 4] = ["v2", "ecommerce", "campaigns", "campaign-products"];

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, CoretavaError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CoretavaError::PreconditionMissing { field });
    }
    Ok(value)
}

fn endpoint(config: &CoretavaConfig, path: &[&str], tail: Option<&str>) -> Result<Url, CoretavaError> {
    let invalid = |reason: String| {
        CoretavaError::Config(ConfigError::Invalid {
            field: "api_url",
            reason,
        })
    };
    let mut url = Url::parse(config.api_url.trim()).map_err(|e| invalid(e.to_string()))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|()| invalid(format!("{} cannot be a base url", config.api_url)))?;
        segments.pop_if_empty().extend(path);
        if let Some(tail) = tail {
            segments.push(tail);
        }
    }
    Ok(url)
}

fn with_app_headers<Msg: 'static>(
    req: HttpRequest<Msg>,
    config: &CoretavaConfig,
    app_id: &str,
) -> HttpRequest<Msg> {
    req.with_header(config.app_id_header.clone(), app_id)
        .with_header("Content-Type", "application/json")
}

fn success_body(result: Result<HttpResponse, HttpError>) -> Result<Vec<u8>, CoretavaError> {
    let resp = result.map_err(|e| CoretavaError::network(e.message))?;
    if !resp.is_success() {
        return Err(CoretavaError::network(format!("HTTP {}", resp.status)));
    }
    Ok(resp.body)
}

/// `GET .../campaign-notification/placement/{placementId}?customerId={id}`.
pub fn fetch_campaign<Msg: 'static>(
    config: &CoretavaConfig,
    placement_id: &str,
    customer_id: &str,
    app_id: &str,
    returns: impl Fn(Result<HttpResponse, HttpError>) -> Msg + Send + Sync + 'static,
) -> Result<HttpRequest<Msg>, CoretavaError> {
    let placement_id = require(placement_id, "placementId")?;
    let customer_id = require(customer_id, "customerId")?;
    let app_id = require(app_id, "appId")?;

    let mut url = endpoint(config, &PLACEMENT_PATH, Some(placement_id))?;
    url.query_pairs_mut().append_pair("customerId", customer_id);
    Ok(with_app_headers(get(url.as_str(), returns), config, app_id))
}

/// Both halves present or `DataUnavailable`; transport and status failures
/// are `NetworkFailure`.
pub fn decode_campaign(result: Result<HttpResponse, HttpError>) -> Result<Campaign, CoretavaError> {
    let body = success_body(result)?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(CoretavaError::unavailable("empty response body"));
    }
    let parsed: CampaignApiResponse = serde_json::from_slice(&body)
        .map_err(|e| CoretavaError::unavailable(format!("unreadable payload: {e}")))?;
    parsed.into_campaign()
}

/// `POST .../campaign-metrics` with the event as JSON.
pub fn send_event<Msg: 'static>(
    config: &CoretavaConfig,
    event: &ImpressionEvent,
    returns: impl Fn(Result<HttpResponse, HttpError>) -> Msg + Send + Sync + 'static,
) -> Result<HttpRequest<Msg>, CoretavaError> {
    let app_id = require(&event.app_id, "appId")?;
    let url = endpoint(config, &METRICS_PATH, None)?;
    let body = serde_json::to_vec(event)?;
    Ok(with_app_headers(post(url.as_str(), body, returns), config, app_id))
}

/// The sink's response body is not consumed; only the outcome matters.
pub fn check_delivery(result: Result<HttpResponse, HttpError>) -> Result<(), CoretavaError> {
    success_body(result).map(|_| ())
}

/// `GET .../campaigns/campaign-products/{campaignId}`.
pub fn fetch_campaign_products<Msg: 'static>(
    config: &CoretavaConfig,
    campaign_id: &str,
    app_id: &str,
    returns: impl Fn(Result<HttpResponse, HttpError>) -> Msg + Send + Sync + 'static,
) -> Result<HttpRequest<Msg>, CoretavaError> {
    let campaign_id = require(campaign_id, "campaignId")?;
    let app_id = require(app_id, "appId")?;
    let url = endpoint(config, &PRODUCTS_PATH, Some(campaign_id))?;
    Ok(with_app_headers(get(url.as_str(), returns), config, app_id))
}

pub fn decode_campaign_products(
    result: Result<HttpResponse, HttpError>,
) -> Result<Vec<String>, CoretavaError> {
    let body = success_body(result)?;
    let products: CampaignProducts = serde_json::from_slice(&body)
        .map_err(|e| CoretavaError::unavailable(format!("unreadable payload: {e}")))?;
    Ok(products
        .ids
        .into_iter()
        .filter(|id| !id.trim().is_empty())
        .collect())
}
