//! Single-flight job scheduler with a queue depth of one.
//!
//! At most one run of the job is in flight. Requests that arrive while it runs
//! collapse into a single pending rerun, started as soon as the current run
//! finishes.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;

type BoxedRun = Pin<Box<dyn Future<Output = ()> + Send>>;
type Job = Arc<dyn Fn() -> BoxedRun + Send + Sync>;

#[derive(Default)]
struct State {
    running: bool,
    pending: bool,
    handle: Option<JoinHandle<()>>,
}

pub struct SingleFlight {
    job: Job,
    state: Arc<Mutex<State>>,
}

impl SingleFlight {
    pub fn new<F, Fut>(job: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            job: Arc::new(move || Box::pin(job()) as BoxedRun),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Ask for a run. Starts one immediately when idle, otherwise marks a
    /// rerun as pending. Must be called from within a tokio runtime.
    pub fn request(&self) {
        {
            let mut state = lock(&self.state);
            if state.running {
                state.pending = true;
                return;
            }
            state.running = true;
        }

        let job = Arc::clone(&self.job);
        let shared = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            loop {
                job().await;
                let again = {
                    let mut state = lock(&shared);
                    if state.pending {
                        state.pending = false;
                        true
                    } else {
                        state.running = false;
                        false
                    }
                };
                if !again {
                    break;
                }
            }
        });
        lock(&self.state).handle = Some(handle);
    }

    pub fn is_running(&self) -> bool {
        lock(&self.state).running
    }

    /// Resolve once no run is in flight or pending.
    pub async fn wait_idle(&self) {
        loop {
            let handle = lock(&self.state).handle.take();
            match handle {
                Some(handle) => {
                    if let Err(err) = handle.await {
                        tracing::error!(error = %err, "scheduled job panicked");
                        // The loop never reached its bookkeeping.
                        let mut state = lock(&self.state);
                        state.running = false;
                        state.pending = false;
                    }
                }
                None => return,
            }
        }
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
