use coretava_core::{ElementId, ObservationHandle};
use coretava_macros::Request;
use std::sync::Arc;

pub type VisibilityCallback<Msg> = Arc<dyn Fn(ObservationHandle, bool) -> Msg + Send + Sync>;

/// Visibility effect requests.
#[derive(Clone, Request)]
pub enum VisibilityRequest<Msg> {
    /// Start observing `element`. One callback is delivered right away with
    /// the current state, then one per threshold crossing.
    Observe {
        handle: ObservationHandle,
        element: ElementId,
        threshold: f64,
        returns: VisibilityCallback<Msg>,
    },
    /// Stop observing; nothing is delivered for `handle` afterwards.
    Release { handle: ObservationHandle },
}

pub fn observe<Msg>(
    handle: ObservationHandle,
    element: ElementId,
    threshold: f64,
    returns: impl Fn(ObservationHandle, bool) -> Msg + Send + Sync + 'static,
) -> VisibilityRequest<Msg> {
    VisibilityRequest::Observe {
        handle,
        element,
        threshold,
        returns: Arc::new(returns),
    }
}

pub fn release<Msg>(handle: ObservationHandle) -> VisibilityRequest<Msg> {
    VisibilityRequest::Release { handle }
}
