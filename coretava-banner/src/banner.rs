//! The promotional banner unit: fetch the placement's campaign, expose a
//! view model, and track impressions on the mounted element.

use crate::effects::Effects;
use crate::runtime::{Cmd, Request};
use crate::tracker::ImpressionTracker;
use chrono::{DateTime, Utc};
use coretava_core::campaign::Campaign;
use coretava_core::{
    unmount, CookieStore, CoretavaConfig, CoretavaError, CustomerIdManager, DedupKey,
    DimensionTags, ElementId, EventContext, FileCookieStore, MemoryCookieStore,
    ObservationHandle,
};
use coretava_http_manager::campaign::{check_delivery, decode_campaign, fetch_campaign};
use coretava_http_manager::{HttpError, HttpResponse};

/// What the host knows when it places the banner.
#[derive(Clone, Debug, Default)]
pub struct Flags {
    pub placement_id: String,
    pub app_id: String,
    pub customer_id: String,
    pub tags: DimensionTags,
    pub config: CoretavaConfig,
}

/// Read-or-create the customer id. A broken store means no id, which makes
/// the banner skip its fetch.
pub fn resolve_customer_id(
    config: &CoretavaConfig,
    store: &mut impl CookieStore,
    now: DateTime<Utc>,
) -> Option<String> {
    match CustomerIdManager::new(&config.identity).customer_id(store, now) {
        Ok(id) => Some(id),
        Err(error) => {
            tracing::warn!(%error, "customer id unavailable");
            None
        }
    }
}

/// Customer id from the configured cookie jar: the file at
/// `identity.store_path`, or a throwaway in-memory jar when none is set.
pub fn configured_customer_id(config: &CoretavaConfig, now: DateTime<Utc>) -> Option<String> {
    match &config.identity.store_path {
        Some(path) => resolve_customer_id(config, &mut FileCookieStore::new(path.clone()), now),
        None => resolve_customer_id(config, &mut MemoryCookieStore::new(), now),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BannerStatus {
    Loading,
    Ready,
    /// Nothing will be shown; the reason is for logs only.
    Unavailable(String),
}

pub struct Model {
    pub placement_id: String,
    pub app_id: String,
    pub customer_id: String,
    pub tags: DimensionTags,
    pub config: CoretavaConfig,
    pub status: BannerStatus,
    pub campaign: Option<Campaign>,
    pub tracker: ImpressionTracker,
    /// Element mounted before the campaign arrived.
    pub pending_element: Option<ElementId>,
    next_handle: u64,
}

#[derive(Clone, Debug)]
pub enum Msg {
    CampaignLoaded(Result<HttpResponse, HttpError>),
    Mounted(ElementId),
    Visibility {
        handle: ObservationHandle,
        intersecting: bool,
    },
    Clicked,
    Converted,
    EventDelivered {
        key: DedupKey,
        result: Result<HttpResponse, HttpError>,
    },
    Unmount,
}

/// Slides and click-through for a loaded banner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BannerView {
    pub placement_id: String,
    pub images: Vec<String>,
    pub click_url: Option<String>,
}

pub fn init(flags: Flags) -> (Model, Cmd<Msg>) {
    let Flags {
        placement_id,
        app_id,
        customer_id,
        tags,
        config,
    } = flags;

    let fetch = config
        .validate()
        .map_err(CoretavaError::from)
        .and_then(|()| {
            fetch_campaign(&config, &placement_id, &customer_id, &app_id, Msg::CampaignLoaded)
        });
    let (status, cmd) = match fetch {
        Ok(req) => (BannerStatus::Loading, Cmd::single(Request::Http(req))),
        Err(error) => {
            tracing::info!(placement = %placement_id, %error, "skipping campaign fetch");
            (BannerStatus::Unavailable(error.to_string()), Cmd::none())
        }
    };

    let model = Model {
        tracker: ImpressionTracker::new(config.visibility_threshold),
        placement_id,
        app_id,
        customer_id,
        tags,
        config,
        status,
        campaign: None,
        pending_element: None,
        next_handle: 0,
    };
    (model, cmd)
}

pub fn update(mut model: Model, msg: Msg) -> (Model, Cmd<Msg>) {
    match msg {
        Msg::CampaignLoaded(result) => {
            if model.status != BannerStatus::Loading {
                return (model, Cmd::none());
            }
            match decode_campaign(result) {
                Ok(campaign) => load_campaign(model, campaign),
                Err(error) => {
                    match &error {
                        CoretavaError::NetworkFailure { .. } => {
                            tracing::warn!(placement = %model.placement_id, %error, "campaign fetch failed")
                        }
                        _ => {
                            tracing::info!(placement = %model.placement_id, %error, "no campaign for placement")
                        }
                    }
                    model.status = BannerStatus::Unavailable(error.to_string());
                    (model, Cmd::none())
                }
            }
        }
        Msg::Mounted(element) => {
            if model.campaign.is_none() {
                model.pending_element = Some(element);
                return (model, Cmd::none());
            }
            attach_element(model, element)
        }
        Msg::Visibility {
            handle,
            intersecting,
        } => {
            let mut fx = Effects::new(&model.config, &mut model.next_handle);
            model.tracker.on_visibility(handle, intersecting, &mut fx);
            let cmd = fx.into_cmd();
            (model, cmd)
        }
        Msg::Clicked => {
            let mut fx = Effects::new(&model.config, &mut model.next_handle);
            model.tracker.report_click(&mut fx);
            let cmd = fx.into_cmd();
            (model, cmd)
        }
        Msg::Converted => {
            let mut fx = Effects::new(&model.config, &mut model.next_handle);
            model.tracker.report_conversion(&mut fx);
            let cmd = fx.into_cmd();
            (model, cmd)
        }
        Msg::EventDelivered { key, result } => {
            match check_delivery(result) {
                Ok(()) => tracing::debug!(%key, "impression event delivered"),
                Err(error) => tracing::warn!(%key, %error, "impression event lost"),
            }
            (model, Cmd::none())
        }
        Msg::Unmount => {
            let mut fx = Effects::new(&model.config, &mut model.next_handle);
            model.tracker.detach(&mut fx);
            let cmd = Cmd::batch([fx.into_cmd(), Cmd::single(Request::Core(unmount()))]);
            model.pending_element = None;
            (model, cmd)
        }
    }
}

fn load_campaign(mut model: Model, campaign: Campaign) -> (Model, Cmd<Msg>) {
    let context = EventContext::from_campaign(
        &campaign,
        &model.placement_id,
        &model.customer_id,
        &model.app_id,
        &model.config.retail_app_id,
        model.tags.clone(),
    );
    match context {
        Some(context) => model.tracker.bind(context),
        None => tracing::warn!(placement = %model.placement_id, "campaign names no banner, events disabled"),
    }
    model.campaign = Some(campaign);
    model.status = BannerStatus::Ready;

    match model.pending_element.take() {
        Some(element) => attach_element(model, element),
        None => (model, Cmd::none()),
    }
}

/// Observe only when events can be attributed; an unbound tracker could
/// never fire and would hold the observation until unmount.
fn attach_element(mut model: Model, element: ElementId) -> (Model, Cmd<Msg>) {
    if model.tracker.context().is_none() {
        tracing::debug!(%element, "no banner to attribute events to, not observing");
        return (model, Cmd::none());
    }
    let mut fx = Effects::new(&model.config, &mut model.next_handle);
    if let Err(error) = model.tracker.attach(element, &mut fx) {
        tracing::warn!(%error, "not tracking banner");
    }
    let cmd = fx.into_cmd();
    (model, cmd)
}

pub fn view(model: &Model) -> Option<BannerView> {
    if model.status != BannerStatus::Ready {
        return None;
    }
    let campaign = model.campaign.as_ref()?;
    Some(BannerView {
        placement_id: model.placement_id.clone(),
        images: campaign.banner_images(),
        click_url: campaign.click_url(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::TrackerPhase;
    use coretava_core::{CoreRequest, EventKind, ImpressionEvent};
    use coretava_http_manager::HttpMethod;
    use coretava_visibility_manager::VisibilityRequest;

    const CAMPAIGN: &str = r#"{
        "campaignNotification": {
            "id": "notif-1",
            "campaign": "camp-1",
            "banner": { "image": "hero.png", "webImages": ["w.png"] }
        },
        "campaignUser": {
            "user": "user-1",
            "productUrl": "shop.example/deal",
            "banners": [{ "id": "banner-7", "active": true }]
        }
    }"#;

    fn flags() -> Flags {
        Flags {
            placement_id: "home-top".to_string(),
            app_id: "app-1".to_string(),
            customer_id: "cust-1".to_string(),
            tags: DimensionTags::default(),
            config: CoretavaConfig::default(),
        }
    }

    fn ok(body: &str) -> Result<HttpResponse, HttpError> {
        Ok(HttpResponse {
            status: 200,
            headers: vec![],
            body: body.as_bytes().to_vec(),
        })
    }

    fn loaded() -> Model {
        let (model, _) = init(flags());
        let (model, cmd) = update(model, Msg::CampaignLoaded(ok(CAMPAIGN)));
        assert!(cmd.is_empty());
        model
    }

    fn observed_handle(cmd: &Cmd<Msg>) -> ObservationHandle {
        cmd.iter()
            .find_map(|req| match req {
                Request::Visibility(VisibilityRequest::Observe { handle, .. }) => Some(*handle),
                _ => None,
            })
            .expect("observe request")
    }

    fn sent_events(cmd: &Cmd<Msg>) -> Vec<ImpressionEvent> {
        cmd.iter()
            .filter_map(|req| match req {
                Request::Http(http) if http.method == HttpMethod::Post => {
                    serde_json::from_slice(http.body.as_deref()?).ok()
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn init_fetches_the_placement() {
        let (model, cmd) = init(flags());
        assert_eq!(model.status, BannerStatus::Loading);
        let reqs = cmd.into_inner();
        assert_eq!(reqs.len(), 1);
        match &reqs[0] {
            Request::Http(req) => {
                assert_eq!(req.method, HttpMethod::Get);
                assert!(req.url.contains("/placement/home-top?customerId=cust-1"));
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn missing_app_id_skips_everything() {
        let (model, cmd) = init(Flags {
            app_id: String::new(),
            ..flags()
        });
        assert!(cmd.is_empty());
        assert!(matches!(model.status, BannerStatus::Unavailable(_)));
        assert_eq!(view(&model), None);
    }

    #[test]
    fn loaded_campaign_renders_view_model() {
        let model = loaded();
        assert_eq!(
            view(&model),
            Some(BannerView {
                placement_id: "home-top".to_string(),
                images: vec!["hero.png".to_string(), "w.png".to_string()],
                click_url: Some("https://shop.example/deal".to_string()),
            })
        );
        assert_eq!(model.tracker.context().map(|c| c.banner_id.as_str()), Some("banner-7"));
    }

    #[test]
    fn null_notification_never_attaches() {
        let (model, _) = init(flags());
        let (model, cmd) = update(model, Msg::Mounted(ElementId::new("banner")));
        assert!(cmd.is_empty());
        let (model, cmd) =
            update(model, Msg::CampaignLoaded(ok(r#"{"campaignNotification":null}"#)));
        assert!(cmd.is_empty());
        let (model, cmd) = update(model, Msg::Mounted(ElementId::new("banner")));
        assert!(cmd.is_empty());
        let (model, cmd) = update(model, Msg::Clicked);
        assert!(cmd.is_empty());

        assert_eq!(model.tracker.phase(), TrackerPhase::Idle);
        assert_eq!(model.tracker.sent_keys().count(), 0);
        assert_eq!(view(&model), None);
    }

    #[test]
    fn early_mount_attaches_once_data_arrives() {
        let (model, _) = init(flags());
        let (model, _) = update(model, Msg::Mounted(ElementId::new("banner")));
        let (model, cmd) = update(model, Msg::CampaignLoaded(ok(CAMPAIGN)));
        let handle = observed_handle(&cmd);
        assert_eq!(model.tracker.active_handle(), Some(handle));
        assert_eq!(model.tracker.phase(), TrackerPhase::Calibrating);
    }

    #[test]
    fn view_event_follows_calibration_then_releases() {
        let model = loaded();
        let (model, cmd) = update(model, Msg::Mounted(ElementId::new("banner")));
        let handle = observed_handle(&cmd);

        let (model, cmd) = update(
            model,
            Msg::Visibility {
                handle,
                intersecting: true,
            },
        );
        assert!(cmd.is_empty());

        let (model, cmd) = update(
            model,
            Msg::Visibility {
                handle,
                intersecting: true,
            },
        );
        let events = sent_events(&cmd);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_kind, EventKind::View);
        assert_eq!(events[0].banner_id, "banner-7");
        assert_eq!(events[0].user_id.as_deref(), Some("user-1"));
        assert!(cmd.iter().any(|req| matches!(
            req,
            Request::Visibility(VisibilityRequest::Release { handle: h }) if *h == handle
        )));
        assert_eq!(model.tracker.phase(), TrackerPhase::Fired);
    }

    #[test]
    fn failed_delivery_is_swallowed_and_not_retried() {
        let model = loaded();
        let (model, cmd) = update(model, Msg::Clicked);
        let events = sent_events(&cmd);
        assert_eq!(events.len(), 1);
        let key = events[0].dedup_key();

        let (model, cmd) = update(
            model,
            Msg::EventDelivered {
                key: key.clone(),
                result: Err(HttpError::new("connection reset")),
            },
        );
        assert!(cmd.is_empty());
        assert!(model.tracker.has_sent(&key));

        let (_, cmd) = update(model, Msg::Clicked);
        assert!(cmd.is_empty());
    }

    #[test]
    fn unmount_releases_before_stopping() {
        let model = loaded();
        let (model, cmd) = update(model, Msg::Mounted(ElementId::new("banner")));
        let handle = observed_handle(&cmd);
        let (_, cmd) = update(model, Msg::Unmount);
        let reqs = cmd.into_inner();
        assert_eq!(reqs.len(), 2);
        assert!(matches!(
            &reqs[0],
            Request::Visibility(VisibilityRequest::Release { handle: h }) if *h == handle
        ));
        assert!(matches!(&reqs[1], Request::Core(CoreRequest::Unmount)));
    }

    #[test]
    fn customer_id_is_stable_across_visits() {
        let config = CoretavaConfig::default();
        let mut store = MemoryCookieStore::new();
        let first = resolve_customer_id(&config, &mut store, Utc::now());
        let second = resolve_customer_id(&config, &mut store, Utc::now());
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn configured_jar_survives_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CoretavaConfig::default();
        config.identity.store_path = Some(dir.path().join("cookies.json"));

        let first = configured_customer_id(&config, Utc::now()).unwrap();
        let second = configured_customer_id(&config, Utc::now()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn unreadable_jar_means_no_customer() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CoretavaConfig::default();
        // A directory cannot be read as a cookie file.
        config.identity.store_path = Some(dir.path().to_path_buf());
        assert_eq!(configured_customer_id(&config, Utc::now()), None);
    }

    #[test]
    fn invalid_config_skips_the_fetch() {
        for threshold in [1.5, 0.0, f64::NAN] {
            let mut flags = flags();
            flags.config.visibility_threshold = threshold;
            let (model, cmd) = init(flags);
            assert!(cmd.is_empty(), "threshold {threshold}");
            assert!(matches!(model.status, BannerStatus::Unavailable(_)));
        }
    }

    #[test]
    fn campaign_without_banner_id_renders_but_never_observes() {
        let (model, _) = init(flags());
        let (model, _) = update(model, Msg::Mounted(ElementId::new("banner")));
        let anonymous = r#"{
            "campaignNotification": { "campaign": "camp-1", "banner": { "image": "hero.png" } },
            "campaignUser": { "user": "user-1" }
        }"#;
        let (model, cmd) = update(model, Msg::CampaignLoaded(ok(anonymous)));
        assert!(cmd.is_empty());
        let (model, cmd) = update(model, Msg::Mounted(ElementId::new("banner")));
        assert!(cmd.is_empty());

        assert_eq!(model.tracker.phase(), TrackerPhase::Idle);
        assert_eq!(model.tracker.active_handle(), None);
        assert!(view(&model).is_some());
    }

    #[test]
    fn remount_releases_before_observing_again() {
        let model = loaded();
        let (model, cmd) = update(model, Msg::Mounted(ElementId::new("first")));
        let first = observed_handle(&cmd);
        let (model, cmd) = update(model, Msg::Mounted(ElementId::new("second")));
        let reqs = cmd.into_inner();

        assert_eq!(reqs.len(), 2);
        assert!(matches!(
            &reqs[0],
            Request::Visibility(VisibilityRequest::Release { handle }) if *handle == first
        ));
        match &reqs[1] {
            Request::Visibility(VisibilityRequest::Observe { handle, element, .. }) => {
                assert_ne!(*handle, first);
                assert_eq!(element, &ElementId::new("second"));
                assert_eq!(model.tracker.active_handle(), Some(*handle));
            }
            other => panic!("unexpected request {other:?}"),
        }
    }
}
