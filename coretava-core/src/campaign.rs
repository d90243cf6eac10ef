//! Campaign notification payloads returned by the placement endpoint.
//!
//! The API is loose about which fields it fills in, so every field decodes
//! leniently: missing and `null` both become `None` or empty.

use crate::CoretavaError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignNotification {
    pub id: Option<String>,
    pub app: Option<String>,
    pub campaign: Option<String>,
    pub date: Option<String>,
    pub communication_type: Option<String>,
    /// Localized campaign name, keyed by locale.
    #[serde(deserialize_with = "nullable")]
    pub name: BTreeMap<String, String>,
    pub message_type: Option<String>,
    pub booster_type: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub text: BTreeMap<String, String>,
    pub banner: Option<BannerAssets>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BannerAssets {
    pub image: Option<String>,
    pub placement: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub mobile_images: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub web_images: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignUser {
    pub id: Option<String>,
    pub app: Option<String>,
    pub campaign: Option<String>,
    pub user: Option<String>,
    pub discount: Option<Discount>,
    pub url: Option<String>,
    pub product_url: Option<String>,
    pub status: Option<String>,
    pub spin: Option<Spin>,
    pub wheel_option: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub banners: Vec<BannerState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Discount {
    pub id: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Spin {
    pub spin_value: Option<f64>,
    pub wheel_option: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BannerState {
    pub id: Option<String>,
    pub active: bool,
}

/// Raw body of `GET /v2/ecommerce/campaign-notification/placement/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignApiResponse {
    pub campaign_notification: Option<CampaignNotification>,
    pub campaign_user: Option<CampaignUser>,
}

impl CampaignApiResponse {
    /// A usable campaign needs both halves; anything less is "no data".
    pub fn into_campaign(self) -> Result<Campaign, CoretavaError> {
        match (self.campaign_notification, self.campaign_user) {
            (Some(notification), Some(user)) => Ok(Campaign { notification, user }),
            (None, _) => Err(CoretavaError::unavailable("campaignNotification missing")),
            (_, None) => Err(CoretavaError::unavailable("campaignUser missing")),
        }
    }
}

/// Campaign data a banner can be rendered and tracked from.
#[derive(Debug, Clone, PartialEq)]
pub struct Campaign {
    pub notification: CampaignNotification,
    pub user: CampaignUser,
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl Campaign {
    /// First active banner assigned to the user, else the notification id.
    pub fn banner_id(&self) -> Option<&str> {
        self.user
            .banners
            .iter()
            .filter(|b| b.active)
            .find_map(|b| non_empty(b.id.as_ref()))
            .or_else(|| non_empty(self.notification.id.as_ref()))
    }

    pub fn campaign_id(&self) -> Option<&str> {
        non_empty(self.notification.campaign.as_ref())
            .or_else(|| non_empty(self.user.campaign.as_ref()))
    }

    pub fn user_id(&self) -> Option<&str> {
        non_empty(self.user.user.as_ref())
    }

    /// Slides for the banner: the main image then the web images, falling
    /// back to the mobile images only when there is nothing else.
    pub fn banner_images(&self) -> Vec<String> {
        let Some(banner) = &self.notification.banner else {
            return Vec::new();
        };
        let mut images: Vec<String> = non_empty(banner.image.as_ref())
            .map(str::to_string)
            .into_iter()
            .collect();
        images.extend(banner.web_images.iter().cloned());
        if images.is_empty() {
            images.extend(banner.mobile_images.iter().cloned());
        }
        images
    }

    /// Where a click on the banner leads. Bare hosts get an `https://` scheme.
    pub fn click_url(&self) -> Option<String> {
        let url = non_empty(self.user.product_url.as_ref())?;
        if url.starts_with("http") {
            Some(url.to_string())
        } else {
            Some(format!("https://{url}"))
        }
    }
}

/// Body of `GET /v2/ecommerce/campaigns/campaign-products/{campaignId}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignProducts {
    #[serde(deserialize_with = "nullable")]
    pub ids: Vec<String>,
}
