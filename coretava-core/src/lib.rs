//! coretava-core: campaign model, configuration, identity, and the small
//! runtime primitives shared by the coretava effect managers.

mod cmd;
mod config;
mod element;
mod error;
mod event;
mod identity;
mod observation;
mod observer;
mod request;
mod router;

pub mod campaign;

pub use cmd::CoreCmd;
pub use config::{CoretavaConfig, IdentityConfig};
pub use element::{ElementId, ObservationHandle};
pub use error::{ConfigError, CoretavaError, IdentityError};
pub use event::{DedupKey, DimensionTags, EventContext, EventKind, ImpressionEvent};
pub use identity::{Cookie, CookieStore, CustomerIdManager, FileCookieStore, MemoryCookieStore};
pub use observation::Observation;
pub use observer::{tee_observer, tracing_observer, ObserverFn};
pub use request::{unmount, CoreRequest};
pub use router::{Router, RouterChannels};
