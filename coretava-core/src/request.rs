/// Runtime-level requests (no callbacks).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub enum CoreRequest {
    /// Tear down the unit and stop its event loop. In-flight network sends
    /// are left to finish on their own.
    Unmount,
}

pub fn unmount() -> CoreRequest {
    CoreRequest::Unmount
}
