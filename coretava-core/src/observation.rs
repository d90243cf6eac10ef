use std::time::SystemTime;

/// What the event loop reports to observers: every message it feeds to
/// `update`, and every effect request it dispatches.
#[derive(Clone, Debug)]
pub enum Observation<EventType, CommandType> {
    Event { ts: SystemTime, data: EventType },
    Effect { ts: SystemTime, data: CommandType },
}

impl<EventType, CommandType> Observation<EventType, CommandType> {
    pub fn event(data: EventType) -> Self {
        Observation::Event {
            ts: SystemTime::now(),
            data,
        }
    }

    pub fn effect(data: CommandType) -> Self {
        Observation::Effect {
            ts: SystemTime::now(),
            data,
        }
    }
}
