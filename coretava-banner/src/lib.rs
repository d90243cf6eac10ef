//! Coretava promotional banner unit.
//!
//! A unit fetches the campaign for its placement, renders a [`BannerView`],
//! and reports view, click and conversion events through an
//! [`ImpressionTracker`]. [`Runtime`] drives one unit on a tokio task.

pub mod banner;
mod effects;
pub mod runtime;
pub mod tracker;

pub use banner::{
    configured_customer_id, init, resolve_customer_id, update, view, BannerStatus, BannerView,
    Flags, Model, Msg,
};
pub use runtime::{Cmd, Ports, Request, Runtime};
pub use tracker::{ImpressionTracker, Reporter, TrackerError, TrackerPhase, Visibility};
