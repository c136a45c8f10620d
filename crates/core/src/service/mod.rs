//! Supervised background services.
//!
//! A [`Service`] provides one unit of work; a [`Supervisor`] owns its run loop,
//! its inbox and the bus it publishes on. The loop waits up to the service's
//! interval for an event, runs the unit of work on each wakeup, and exits when
//! it receives [`ServiceEvent::Stop`].
//!
//! [`ServiceEvent::Stop`]: crate::events::ServiceEvent::Stop

mod service_traits;
mod supervisor;

pub use service_traits::{Service, Wakeup};
pub use supervisor::{ServiceState, Supervisor};
