use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};
use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use super::{Service, Wakeup};
use crate::errors::{Error, Result};
use crate::events::{EventBus, EventSink, ServiceEvent};

/// Lifecycle of a supervised service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceState {
    Created,
    Running,
    StopRequested,
    Stopped,
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ServiceState::Created => "created",
            ServiceState::Running => "running",
            ServiceState::StopRequested => "stop requested",
            ServiceState::Stopped => "stopped",
        };
        f.write_str(label)
    }
}

struct Pending {
    service: Box<dyn Service>,
    inbox: mpsc::UnboundedReceiver<ServiceEvent>,
}

/// Owns the run loop of one [`Service`].
///
/// The supervisor holds the service's inbox sink, so other buses can deliver
/// events to it, and the bus on which the service's own events are published.
pub struct Supervisor {
    name: &'static str,
    sink: EventSink,
    bus: EventBus,
    state: Arc<watch::Sender<ServiceState>>,
    pending: Mutex<Option<Pending>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Supervisor {
    pub fn new<S: Service>(service: S) -> Self {
        let (sink, inbox) = EventSink::channel();
        let (state, _) = watch::channel(ServiceState::Created);

        Self {
            name: service.name(),
            sink,
            bus: EventBus::new(),
            state: Arc::new(state),
            pending: Mutex::new(Some(Pending {
                service: Box::new(service),
                inbox,
            })),
            handle: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Bus carrying the events this service publishes.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Inbox of this service, for subscribing it to another bus.
    pub fn sink(&self) -> EventSink {
        self.sink.clone()
    }

    pub fn state(&self) -> ServiceState {
        *self.state.borrow()
    }

    /// Spawns the run loop on the current tokio runtime.
    ///
    /// A supervisor starts at most once.
    pub fn start(&self) -> Result<()> {
        let pending = lock(&self.pending)
            .take()
            .ok_or_else(|| Error::Service(format!("{} service was already started", self.name)))?;

        self.state.send_if_modified(|state| {
            if *state == ServiceState::Created {
                *state = ServiceState::Running;
                true
            } else {
                false
            }
        });

        let handle = tokio::spawn(run_loop(
            pending.service,
            pending.inbox,
            self.bus.clone(),
            Arc::clone(&self.state),
        ));
        *lock(&self.handle) = Some(handle);
        Ok(())
    }

    /// Asks the run loop to exit. Returns immediately; safe to call repeatedly.
    pub fn stop(&self) {
        let requested = self.state.send_if_modified(|state| match state {
            ServiceState::Created | ServiceState::Running => {
                *state = ServiceState::StopRequested;
                true
            }
            ServiceState::StopRequested | ServiceState::Stopped => false,
        });

        if requested {
            debug!("Stop requested for {} service", self.name);
            self.sink.send(ServiceEvent::Stop);
        }
    }

    /// Waits until the run loop has exited.
    ///
    /// Returns immediately for a service that was never started.
    pub async fn await_termination(&self) {
        let handle = lock(&self.handle).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!("{} service task failed: {}", self.name, e);
                self.state.send_replace(ServiceState::Stopped);
            }
            return;
        }

        if lock(&self.pending).is_some() {
            return;
        }

        // Another caller owns the join handle; follow the state instead.
        let mut state = self.state.subscribe();
        let _ = state.wait_for(|s| *s == ServiceState::Stopped).await;
    }
}

async fn run_loop(
    mut service: Box<dyn Service>,
    mut inbox: mpsc::UnboundedReceiver<ServiceEvent>,
    bus: EventBus,
    state: Arc<watch::Sender<ServiceState>>,
) {
    let name = service.name();
    info!("{} service started", name);

    if service.run_on_start() {
        run_unit(service.as_mut(), Wakeup::Startup, &bus).await;
    }

    loop {
        let wakeup = match tokio::time::timeout(service.interval(), inbox.recv()).await {
            Err(_) => Wakeup::Timeout,
            Ok(None) => {
                warn!("{} service inbox closed", name);
                break;
            }
            Ok(Some(first)) => {
                let mut events = vec![first];
                while let Ok(event) = inbox.try_recv() {
                    events.push(event);
                }
                if events.iter().any(ServiceEvent::is_stop) {
                    break;
                }
                Wakeup::Events(events)
            }
        };

        run_unit(service.as_mut(), wakeup, &bus).await;
    }

    state.send_replace(ServiceState::Stopped);
    info!("{} service stopped", name);
}

async fn run_unit(service: &mut dyn Service, wakeup: Wakeup, bus: &EventBus) {
    match service.run_once(wakeup).await {
        Ok(Some(event)) => bus.publish(event),
        Ok(None) => {}
        Err(e) => error!("{} service run failed: {}", service.name(), e),
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
