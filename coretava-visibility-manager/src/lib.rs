//! coretava-visibility-manager: the visibility primitive for coretava units.
//!
//! The host reports layout (viewport and element bounds) as it changes; the
//! manager evaluates each live observation against its threshold and
//! delivers a callback on observe and whenever the intersecting state flips.

mod geometry;
mod requests;

pub use geometry::{intersection_ratio, is_intersecting, Rect};
pub use requests::{observe, release, VisibilityCallback, VisibilityRequest};

use coretava_core::{ElementId, ObservationHandle, Router};
use std::collections::HashMap;

/// Layout facts pushed by the host.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutChange {
    /// The viewport moved (scroll) or resized.
    Viewport(Rect),
    /// An element was laid out or moved.
    Element { element: ElementId, bounds: Rect },
    /// An element left the document.
    Removed(ElementId),
}

struct Observed<Msg> {
    element: ElementId,
    threshold: f64,
    intersecting: bool,
    returns: VisibilityCallback<Msg>,
}

/// Current layout plus the live observations.
pub struct VisibilityState<Msg> {
    viewport: Rect,
    bounds: HashMap<ElementId, Rect>,
    observations: HashMap<ObservationHandle, Observed<Msg>>,
}

impl<Msg> Default for VisibilityState<Msg> {
    fn default() -> Self {
        Self {
            viewport: Rect::default(),
            bounds: HashMap::new(),
            observations: HashMap::new(),
        }
    }
}

impl<Msg> VisibilityState<Msg> {
    pub fn is_observing(&self, handle: ObservationHandle) -> bool {
        self.observations.contains_key(&handle)
    }

    pub fn live_observations(&self) -> usize {
        self.observations.len()
    }

    fn evaluate(&self, element: &ElementId, threshold: f64) -> bool {
        self.bounds
            .get(element)
            .is_some_and(|b| is_intersecting(b, &self.viewport, threshold))
    }
}

pub struct VisibilityManager;

impl VisibilityManager {
    pub fn init<Msg>() -> VisibilityState<Msg> {
        VisibilityState::default()
    }

    pub fn on_effects<Msg: Send + 'static>(
        &self,
        router: &Router<Msg>,
        mut state: VisibilityState<Msg>,
        effects: Vec<VisibilityRequest<Msg>>,
    ) -> VisibilityState<Msg> {
        for req in effects {
            match req {
                VisibilityRequest::Observe {
                    handle,
                    element,
                    threshold,
                    returns,
                } => {
                    let intersecting = state.evaluate(&element, threshold);
                    tracing::debug!(%handle, %element, threshold, intersecting, "observe");
                    router.send_to_app(returns(handle, intersecting));
                    state.observations.insert(
                        handle,
                        Observed {
                            element,
                            threshold,
                            intersecting,
                            returns,
                        },
                    );
                }
                VisibilityRequest::Release { handle } => {
                    if state.observations.remove(&handle).is_some() {
                        tracing::debug!(%handle, "release");
                    }
                }
            }
        }
        state
    }

    pub fn on_layout<Msg: Send + 'static>(
        &self,
        router: &Router<Msg>,
        mut state: VisibilityState<Msg>,
        change: LayoutChange,
    ) -> VisibilityState<Msg> {
        match change {
            LayoutChange::Viewport(rect) => state.viewport = rect,
            LayoutChange::Element { element, bounds } => {
                state.bounds.insert(element, bounds);
            }
            LayoutChange::Removed(element) => {
                state.bounds.remove(&element);
            }
        }

        let mut handles: Vec<ObservationHandle> = state.observations.keys().copied().collect();
        handles.sort();
        for handle in handles {
            let Some(observed) = state.observations.get(&handle) else {
                continue;
            };
            let now = state.evaluate(&observed.element, observed.threshold);
            if now == observed.intersecting {
                continue;
            }
            tracing::trace!(%handle, intersecting = now, "threshold crossed");
            router.send_to_app((observed.returns)(handle, now));
            if let Some(observed) = state.observations.get_mut(&handle) {
                observed.intersecting = now;
            }
        }
        state
    }
}
