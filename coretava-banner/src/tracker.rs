//! Viewport-driven impression tracker.
//!
//! One tracker belongs to one banner unit. It watches a single element
//! through an injected [`Visibility`] capability and hands events to a
//! [`Reporter`]; neither call blocks, and delivery failures never come back
//! here. Every event kind is sent at most once per
//! `(placement, banner, kind)` for the tracker's lifetime.

use chrono::Utc;
use coretava_core::{DedupKey, ElementId, EventContext, EventKind, ImpressionEvent, ObservationHandle};
use std::collections::HashSet;

/// Starts and stops visibility observations. Callbacks come back later via
/// [`ImpressionTracker::on_visibility`].
pub trait Visibility {
    fn observe(&mut self, element: &ElementId, threshold: f64) -> ObservationHandle;
    fn release(&mut self, handle: ObservationHandle);
}

/// Fire-and-forget event sink.
pub trait Reporter {
    fn report(&mut self, event: ImpressionEvent);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerPhase {
    /// Nothing attached.
    Idle,
    /// Observing; the first callback has not arrived yet.
    Calibrating,
    /// Waiting for an intersecting callback.
    Armed,
    /// The View event went out and the observation was released.
    Fired,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    #[error("cannot observe an empty element reference")]
    EmptyElement,
}

pub struct ImpressionTracker {
    context: Option<EventContext>,
    threshold: f64,
    phase: TrackerPhase,
    element: Option<ElementId>,
    active: Option<ObservationHandle>,
    sent_keys: HashSet<DedupKey>,
}

impl ImpressionTracker {
    pub fn new(threshold: f64) -> Self {
        Self {
            context: None,
            threshold,
            phase: TrackerPhase::Idle,
            element: None,
            active: None,
            sent_keys: HashSet::new(),
        }
    }

    /// Attribute future events to `context`. Until this is called the
    /// tracker knows no banner and every send is a no-op.
    pub fn bind(&mut self, context: EventContext) {
        tracing::debug!(
            placement = %context.placement_id,
            banner = %context.banner_id,
            "tracker bound"
        );
        self.context = Some(context);
    }

    pub fn context(&self) -> Option<&EventContext> {
        self.context.as_ref()
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    pub fn element(&self) -> Option<&ElementId> {
        self.element.as_ref()
    }

    pub fn active_handle(&self) -> Option<ObservationHandle> {
        self.active
    }

    pub fn has_sent(&self, key: &DedupKey) -> bool {
        self.sent_keys.contains(key)
    }

    pub fn sent_keys(&self) -> impl Iterator<Item = &DedupKey> {
        self.sent_keys.iter()
    }

    /// Begin observing `element`, releasing any earlier observation first.
    ///
    /// Once the View event has fired the element is recorded but not
    /// observed again.
    pub fn attach(
        &mut self,
        element: ElementId,
        visibility: &mut impl Visibility,
    ) -> Result<(), TrackerError> {
        if element.is_empty() {
            return Err(TrackerError::EmptyElement);
        }
        if let Some(previous) = self.active.take() {
            visibility.release(previous);
        }

        if self.phase == TrackerPhase::Fired {
            tracing::debug!(%element, "view already sent, not observing");
            self.element = Some(element);
            return Ok(());
        }

        let handle = visibility.observe(&element, self.threshold);
        tracing::debug!(%element, %handle, "calibrating");
        self.element = Some(element);
        self.active = Some(handle);
        self.phase = TrackerPhase::Calibrating;
        Ok(())
    }

    /// Feed one callback from the visibility primitive.
    ///
    /// The first callback after `attach` only calibrates, whatever it says.
    /// After that the first intersecting callback sends the View event and
    /// releases the observation.
    pub fn on_visibility<C>(&mut self, handle: ObservationHandle, intersecting: bool, caps: &mut C)
    where
        C: Visibility + Reporter,
    {
        if self.active != Some(handle) {
            tracing::trace!(%handle, "ignoring stale visibility callback");
            return;
        }

        match self.phase {
            TrackerPhase::Calibrating => {
                tracing::debug!(%handle, intersecting, "calibrated");
                self.phase = TrackerPhase::Armed;
            }
            TrackerPhase::Armed if intersecting => {
                if self.context.is_none() {
                    tracing::debug!(%handle, "visible before any banner is known");
                    return;
                }
                self.send(EventKind::View, caps);
                if let Some(handle) = self.active.take() {
                    caps.release(handle);
                }
                self.phase = TrackerPhase::Fired;
            }
            TrackerPhase::Armed | TrackerPhase::Idle | TrackerPhase::Fired => {}
        }
    }

    /// Returns whether a Click event was handed to the reporter.
    pub fn report_click(&mut self, reporter: &mut impl Reporter) -> bool {
        self.send(EventKind::Click, reporter)
    }

    pub fn report_conversion(&mut self, reporter: &mut impl Reporter) -> bool {
        self.send(EventKind::Convergence, reporter)
    }

    /// Teardown: release the live observation, if any.
    pub fn detach(&mut self, visibility: &mut impl Visibility) {
        if let Some(handle) = self.active.take() {
            visibility.release(handle);
        }
        self.element = None;
        if self.phase != TrackerPhase::Fired {
            self.phase = TrackerPhase::Idle;
        }
    }

    fn send(&mut self, kind: EventKind, reporter: &mut impl Reporter) -> bool {
        let Some(context) = &self.context else {
            tracing::debug!(%kind, "no banner known, not sending");
            return false;
        };
        let key = context.dedup_key(kind);
        if self.sent_keys.contains(&key) {
            tracing::debug!(%key, "already sent");
            return false;
        }

        let event = ImpressionEvent::new(kind, context, Utc::now());
        // Recorded before the send: a failed delivery is not retried.
        self.sent_keys.insert(key.clone());
        tracing::info!(%key, "reporting impression event");
        reporter.report(event);
        true
    }
}
