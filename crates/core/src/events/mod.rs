//! Service events module.
//!
//! Provides the event type exchanged between supervised services and the
//! publish/subscribe bus that carries it. A service owns a bus; dependent
//! services subscribe their inbox sink to it.

mod event_bus;
mod service_event;

pub use event_bus::{EventBus, EventSink};
pub use service_event::ServiceEvent;
