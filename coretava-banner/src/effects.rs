use crate::banner::Msg;
use crate::runtime::{Cmd, Request};
use crate::tracker::{Reporter, Visibility};
use coretava_core::{CoretavaConfig, ElementId, ImpressionEvent, ObservationHandle};
use coretava_http_manager::{campaign, HttpError, HttpResponse};
use coretava_visibility_manager::{observe, release};

/// Turns tracker capability calls into runtime requests, collected in the
/// order the tracker made them.
pub(crate) struct Effects<'a> {
    config: &'a CoretavaConfig,
    next_handle: &'a mut u64,
    cmd: Cmd<Msg>,
}

impl<'a> Effects<'a> {
    pub(crate) fn new(config: &'a CoretavaConfig, next_handle: &'a mut u64) -> Self {
        Self {
            config,
            next_handle,
            cmd: Cmd::none(),
        }
    }

    pub(crate) fn into_cmd(self) -> Cmd<Msg> {
        self.cmd
    }
}

impl Visibility for Effects<'_> {
    fn observe(&mut self, element: &ElementId, threshold: f64) -> ObservationHandle {
        *self.next_handle += 1;
        let handle = ObservationHandle(*self.next_handle);
        self.cmd.push(Request::Visibility(observe(
            handle,
            element.clone(),
            threshold,
            |handle, intersecting| Msg::Visibility {
                handle,
                intersecting,
            },
        )));
        handle
    }

    fn release(&mut self, handle: ObservationHandle) {
        self.cmd.push(Request::Visibility(release(handle)));
    }
}

impl Reporter for Effects<'_> {
    fn report(&mut self, event: ImpressionEvent) {
        let key = event.dedup_key();
        let returns = {
            let key = key.clone();
            move |result: Result<HttpResponse, HttpError>| Msg::EventDelivered {
                key: key.clone(),
                result,
            }
        };
        match campaign::send_event(self.config, &event, returns) {
            Ok(req) => self.cmd.push(Request::Http(req)),
            Err(error) => tracing::warn!(%key, %error, "dropping impression event"),
        }
    }
}
