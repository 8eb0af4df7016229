use super::MonitorEngine;
use crate::error::Result;
use crate::process::{ActionOutcome, ProcessAction, ProcessActions, ProcessDetails, ProcessSource, SystemStats};
use log::{debug, error, info};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRequest {
    Refresh,
    Details(u32),
    Action(ProcessAction, u32),
    Shutdown,
}

#[derive(Debug)]
pub enum WorkerEvent {
    Refreshed { generation: u64, system: SystemStats },
    Details { pid: u32, result: Result<ProcessDetails> },
    ActionDone { action: ProcessAction, pid: u32, outcome: ActionOutcome },
}

/// Runs refreshes on a dedicated thread.
///
/// Requests are queued on a channel, so at most one refresh is in flight and
/// cache writes never interleave. The engine sits behind an `RwLock`; the
/// slow sampling step holds only a read guard, the publish step a short
/// write guard.
pub struct Refresher {
    engine: Arc<RwLock<MonitorEngine>>,
    requests: Sender<RefreshRequest>,
    events: Receiver<WorkerEvent>,
    handle: Option<JoinHandle<()>>,
}

impl Refresher {
    /// `notify` is called after every handled request, e.g. to wake the UI.
    pub fn spawn<S, A, N>(engine: MonitorEngine, source: S, actions: A, notify: N) -> Self
    where
        S: ProcessSource + 'static,
        A: ProcessActions + 'static,
        N: Fn() + Send + 'static,
    {
        let interval = match engine.config().refresh_interval_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };
        let engine = Arc::new(RwLock::new(engine));
        let (request_tx, request_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = Worker {
            engine: Arc::clone(&engine),
            source,
            actions,
            events: event_tx,
        };
        let handle = thread::Builder::new()
            .name("procsight-refresh".into())
            .spawn(move || worker.run(request_rx, interval, notify))
            .map_err(|e| error!("Failed to start refresh worker: {}", e))
            .ok();

        Self {
            engine,
            requests: request_tx,
            events: event_rx,
            handle,
        }
    }

    pub fn engine(&self) -> RwLockReadGuard<'_, MonitorEngine> {
        self.engine.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn request_refresh(&self) {
        self.send(RefreshRequest::Refresh);
    }

    pub fn request_details(&self, pid: u32) {
        self.send(RefreshRequest::Details(pid));
    }

    pub fn request_action(&self, action: ProcessAction, pid: u32) {
        self.send(RefreshRequest::Action(action, pid));
    }

    /// Events produced since the last call.
    pub fn poll_events(&self) -> Vec<WorkerEvent> {
        self.events.try_iter().collect()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn send(&self, request: RefreshRequest) {
        if self.requests.send(request).is_err() {
            debug!("Refresh worker is gone; dropping {:?}", request);
        }
    }
}

impl Drop for Refresher {
    fn drop(&mut self) {
        let _ = self.requests.send(RefreshRequest::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

struct Worker<S, A> {
    engine: Arc<RwLock<MonitorEngine>>,
    source: S,
    actions: A,
    events: Sender<WorkerEvent>,
}

impl<S: ProcessSource, A: ProcessActions> Worker<S, A> {
    fn run<N: Fn()>(mut self, requests: Receiver<RefreshRequest>, interval: Option<Duration>, notify: N) {
        info!("Refresh worker started (interval: {:?})", interval);
        loop {
            let request = match interval {
                Some(every) => match requests.recv_timeout(every) {
                    Ok(request) => request,
                    Err(RecvTimeoutError::Timeout) => RefreshRequest::Refresh,
                    Err(RecvTimeoutError::Disconnected) => break,
                },
                None => match requests.recv() {
                    Ok(request) => request,
                    Err(_) => break,
                },
            };

            let delivered = match request {
                RefreshRequest::Refresh => self.refresh(),
                RefreshRequest::Details(pid) => {
                    let result = self.source.process_details(pid);
                    self.events.send(WorkerEvent::Details { pid, result }).is_ok()
                }
                RefreshRequest::Action(action, pid) => {
                    let outcome = self.actions.run(action, pid);
                    self.events
                        .send(WorkerEvent::ActionDone {
                            action,
                            pid,
                            outcome,
                        })
                        .is_ok()
                        && self.refresh()
                }
                RefreshRequest::Shutdown => break,
            };
            if !delivered {
                break;
            }
            notify();
        }
        info!("Refresh worker stopped");
    }

    fn refresh(&mut self) -> bool {
        let read = self
            .engine
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .fetch(&mut self.source);
        let generation = self
            .engine
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(read)
            .generation;
        let system = self.source.system_stats();
        self.events
            .send(WorkerEvent::Refreshed { generation, system })
            .is_ok()
    }
}
