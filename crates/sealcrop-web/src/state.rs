use std::sync::{Arc, Mutex, MutexGuard};

use sealcrop_core::{ExportOptions, Exporter, Session};

use crate::error::HttpError;

pub type SharedState = Arc<AppState>;

/// The single operator session and where it exports to.
///
/// The session is only locked from the blocking thread pool, see
/// [`with_session`]. Runtime worker threads never wait on the mutex.
#[derive(Debug)]
pub struct AppState {
    session: Mutex<Session>,
    exporter: Exporter,
}

impl AppState {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            session: Mutex::new(Session::new()),
            exporter: Exporter::new(options),
        }
    }

    pub fn shared(options: ExportOptions) -> SharedState {
        Arc::new(Self::new(options))
    }

    pub fn session(&self) -> Result<MutexGuard<'_, Session>, HttpError> {
        self.session
            .lock()
            .map_err(|_| HttpError::internal("Session state is unavailable"))
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }
}

/// Run decode/encode or file work on the blocking thread pool.
pub async fn run_blocking<T, F>(f: F) -> Result<T, HttpError>
where
    F: FnOnce() -> Result<T, HttpError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        tracing::error!(error = %e, "Blocking task failed");
        HttpError::internal("Background task failed")
    })?
}

/// Lock the session on the blocking thread pool and run one transition.
pub async fn with_session<T, F>(state: &SharedState, f: F) -> Result<T, HttpError>
where
    F: FnOnce(&mut Session, &Exporter) -> Result<T, HttpError> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    run_blocking(move || {
        let mut session = state.session()?;
        f(&mut session, state.exporter())
    })
    .await
}
