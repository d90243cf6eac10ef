use crate::campaign::Campaign;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// The banner was seen.
    View,
    Click,
    /// A purchase or sign-up attributed to the banner.
    Convergence,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::View => "view",
            EventKind::Click => "click",
            EventKind::Convergence => "convergence",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional analytics dimensions the host page knows about.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionTags {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

/// Everything an event needs besides its kind and timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventContext {
    pub placement_id: String,
    pub banner_id: String,
    pub campaign_id: Option<String>,
    pub user_id: Option<String>,
    pub customer_id: String,
    pub app_id: String,
    pub retail_app_id: String,
    pub tags: DimensionTags,
}

impl EventContext {
    /// `None` when the campaign names no banner to attribute events to.
    pub fn from_campaign(
        campaign: &Campaign,
        placement_id: &str,
        customer_id: &str,
        app_id: &str,
        retail_app_id: &str,
        tags: DimensionTags,
    ) -> Option<Self> {
        Some(Self {
            placement_id: placement_id.to_string(),
            banner_id: campaign.banner_id()?.to_string(),
            campaign_id: campaign.campaign_id().map(str::to_string),
            user_id: campaign.user_id().map(str::to_string),
            customer_id: customer_id.to_string(),
            app_id: app_id.to_string(),
            retail_app_id: retail_app_id.to_string(),
            tags,
        })
    }

    pub fn dedup_key(&self, kind: EventKind) -> DedupKey {
        DedupKey {
            placement_id: self.placement_id.clone(),
            banner_id: self.banner_id.clone(),
            kind,
        }
    }
}

/// Identity of a loggable event: at most one send per key per tracker.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub placement_id: String,
    pub banner_id: String,
    pub kind: EventKind,
}

impl fmt::Display for DedupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.placement_id, self.banner_id, self.kind)
    }
}

/// Body of `POST /v2/ecommerce/campaign-metrics`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpressionEvent {
    pub event_kind: EventKind,
    pub banner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub customer_id: String,
    pub app_id: String,
    pub placement_id: String,
    pub retail_app_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub tags: DimensionTags,
}

impl ImpressionEvent {
    pub fn new(kind: EventKind, context: &EventContext, timestamp: DateTime<Utc>) -> Self {
        Self {
            event_kind: kind,
            banner_id: context.banner_id.clone(),
            campaign_id: context.campaign_id.clone(),
            user_id: context.user_id.clone(),
            customer_id: context.customer_id.clone(),
            app_id: context.app_id.clone(),
            placement_id: context.placement_id.clone(),
            retail_app_id: context.retail_app_id.clone(),
            timestamp,
            tags: context.tags.clone(),
        }
    }

    pub fn dedup_key(&self) -> DedupKey {
        DedupKey {
            placement_id: self.placement_id.clone(),
            banner_id: self.banner_id.clone(),
            kind: self.event_kind,
        }
    }
}
