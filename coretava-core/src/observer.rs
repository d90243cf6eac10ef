use crate::Observation;
use std::fmt::Debug;
use std::sync::Arc;

/// Called by the event loop for every message and every dispatched effect.
pub type ObserverFn<E, C> = Arc<dyn Fn(&Observation<E, C>) + Send + Sync>;

/// Messages at `info` under `coretava::Msg`, effects at `debug` under
/// `coretava::Cmd`. Request types print through their `Debug`, which keeps
/// redacted fields out of the log.
pub fn tracing_observer<E, C>() -> ObserverFn<E, C>
where
    E: Debug + 'static,
    C: Debug + 'static,
{
    Arc::new(|observation: &Observation<E, C>| match observation {
        Observation::Event { data, .. } => tracing::info!(target: "coretava::Msg", ?data),
        Observation::Effect { data, .. } => tracing::debug!(target: "coretava::Cmd", ?data),
    })
}

/// Fan one observation out to several observers, in order.
pub fn tee_observer<E: 'static, C: 'static>(observers: Vec<ObserverFn<E, C>>) -> ObserverFn<E, C> {
    Arc::new(move |observation: &Observation<E, C>| {
        observers.iter().for_each(|observer| observer(observation))
    })
}
