use chrono::{TimeZone, Utc};
use coretava_core::{CoretavaConfig, CoretavaError, DimensionTags, EventContext, EventKind, ImpressionEvent};
use coretava_http_manager::campaign::{
    check_delivery, decode_campaign, decode_campaign_products, fetch_campaign,
    fetch_campaign_products, send_event,
};
use coretava_http_manager::{HttpError, HttpMethod, HttpResponse};

fn ok(body: &str) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse {
        status: 200,
        headers: vec![],
        body: body.as_bytes().to_vec(),
    })
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

#[test]
fn placement_request_shape() {
    let config = CoretavaConfig::default();
    let req = fetch_campaign(&config, "home top", "cust-1", "app-1", |_| ()).expect("request");
    assert_eq!(req.method, HttpMethod::Get);
    assert_eq!(
        req.url,
        "https://api.staging.coretava.com/v2/ecommerce/campaign-notification/placement/home%20top?customerId=cust-1"
    );
    assert_eq!(header(&req.headers, "gamix-app-id"), Some("app-1"));
    assert_eq!(header(&req.headers, "Content-Type"), Some("application/json"));
    assert!(req.body.is_none());
}

#[test]
fn logged_placement_request_hides_the_customer() {
    let config = CoretavaConfig::default();
    let req = fetch_campaign(&config, "home-top", "cust-secret", "app-1", |_| ()).expect("request");
    let logged = format!("{req:?}");
    assert!(!logged.contains("cust-secret"), "{logged}");
    assert!(logged.contains("/placement/home-top?customerId=<redacted>"), "{logged}");
    // The wire URL is untouched.
    assert!(req.url.ends_with("customerId=cust-secret"));
}

#[test]
fn missing_identifiers_skip_the_fetch() {
    let config = CoretavaConfig::default();
    let cases = [
        ("", "cust", "app", "placementId"),
        ("p", " ", "app", "customerId"),
        ("p", "cust", "", "appId"),
    ];
    for (placement, customer, app, expected) in cases {
        match fetch_campaign(&config, placement, customer, app, |_| ()) {
            Err(CoretavaError::PreconditionMissing { field }) => assert_eq!(field, expected),
            other => panic!("expected precondition failure, got {other:?}"),
        }
    }
}

#[test]
fn decode_distinguishes_no_data_from_network_failure() {
    let campaign = decode_campaign(ok(
        r#"{"campaignNotification":{"id":"n1"},"campaignUser":{"user":"u1"}}"#,
    ))
    .expect("campaign");
    assert_eq!(campaign.banner_id(), Some("n1"));

    assert!(matches!(
        decode_campaign(ok(r#"{"campaignNotification":null}"#)),
        Err(CoretavaError::DataUnavailable { .. })
    ));
    assert!(matches!(
        decode_campaign(ok("")),
        Err(CoretavaError::DataUnavailable { .. })
    ));
    assert!(matches!(
        decode_campaign(Err(HttpError::new("connection refused"))),
        Err(CoretavaError::NetworkFailure { .. })
    ));
    assert!(matches!(
        decode_campaign(Ok(HttpResponse {
            status: 503,
            headers: vec![],
            body: vec![],
        })),
        Err(CoretavaError::NetworkFailure { .. })
    ));
}

#[test]
fn event_request_carries_json_body() {
    let mut config = CoretavaConfig::default();
    config.api_url = "http://localhost:9000/".to_string();
    config.app_id_header = "app-identifier".to_string();
    let context = EventContext {
        placement_id: "pdp".to_string(),
        banner_id: "b-1".to_string(),
        campaign_id: None,
        user_id: Some("u-1".to_string()),
        customer_id: "cust-1".to_string(),
        app_id: "app-1".to_string(),
        retail_app_id: "store".to_string(),
        tags: DimensionTags::default(),
    };
    let ts = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();
    let event = ImpressionEvent::new(EventKind::Click, &context, ts);

    let req = send_event(&config, &event, |_| ()).expect("request");
    assert_eq!(req.method, HttpMethod::Post);
    assert_eq!(req.url, "http://localhost:9000/v2/ecommerce/campaign-metrics");
    assert_eq!(header(&req.headers, "app-identifier"), Some("app-1"));

    let body: ImpressionEvent = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, event);

    let printed = format!("{req:?}");
    assert!(printed.contains("<redacted>"));
    assert!(!printed.contains("cust-1"));
}

#[test]
fn delivery_outcome_ignores_body() {
    assert!(check_delivery(ok("whatever")).is_ok());
    assert!(check_delivery(Err(HttpError::new("timeout"))).is_err());
}

#[test]
fn campaign_products_ids() {
    let config = CoretavaConfig::default();
    let req = fetch_campaign_products(&config, "camp-1", "app-1", |_| ()).unwrap();
    assert!(req
        .url
        .ends_with("/v2/ecommerce/campaigns/campaign-products/camp-1"));

    assert_eq!(
        decode_campaign_products(ok(r#"{"ids":["10","","11"]}"#)).unwrap(),
        vec!["10", "11"]
    );
    assert!(decode_campaign_products(ok("{}")).unwrap().is_empty());
    assert!(matches!(
        fetch_campaign_products(&config, "", "app-1", |_| ()),
        Err(CoretavaError::PreconditionMissing { field: "campaignId" })
    ));
}
