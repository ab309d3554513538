//! OS signal handling for the supervisor
//!
//! The pipeline is thread based, so signals are awaited on a small dedicated
//! thread running a current-thread tokio runtime. Handlers are registered on
//! the calling thread before [`SignalListener::install`] returns, so there is
//! no window where a signal still takes its default action.
//!
//! The first termination signal runs the [`ShutdownHandle`] sequence (set the
//! signal, push a sentinel). A second one exits the process at once with
//! [`FORCED_EXIT_CODE`], for when the graceful path is stuck waiting on a
//! worker. Dropping the [`SignalListener`] stops the thread.
//!
//! ## Unix
//! SIGINT, SIGTERM and SIGQUIT are handled.
//!
//! ## Other platforms
//! Only Ctrl-C is handled.

use crate::error::Result;
use crate::pipeline::shutdown::ShutdownHandle;
use std::thread::JoinHandle;
use tokio::sync::oneshot;

/// Process exit code after a repeated termination signal (128 + SIGINT)
pub const FORCED_EXIT_CODE: i32 = 130;

/// Registered termination signal streams
#[cfg(unix)]
struct ShutdownSignals {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
    sigquit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ShutdownSignals {
    /// Must run inside a tokio runtime context
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    /// Next signal received, `None` once the streams are closed
    async fn recv(&mut self) -> Option<&'static str> {
        tokio::select! {
            r = self.sigint.recv() => r.map(|_| "SIGINT"),
            r = self.sigterm.recv() => r.map(|_| "SIGTERM"),
            r = self.sigquit.recv() => r.map(|_| "SIGQUIT"),
        }
    }
}

#[cfg(not(unix))]
struct ShutdownSignals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(not(unix))]
impl ShutdownSignals {
    fn register() -> std::io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(&mut self) -> Option<&'static str> {
        self.ctrl_c.recv().await.map(|_| "Ctrl-C")
    }
}

/// Background thread turning OS signals into a pipeline shutdown
#[derive(Debug)]
pub struct SignalListener {
    cancel: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl SignalListener {
    /// Start listening; `handle` is triggered on the first termination signal
    ///
    /// Handlers are in place when this returns.
    pub fn install(handle: ShutdownHandle) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let mut signals = {
            let _context = runtime.enter();
            ShutdownSignals::register()?
        };
        let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

        let thread = std::thread::Builder::new()
            .name("speakline-signals".to_string())
            .spawn(move || {
                runtime.block_on(async move {
                    let mut open = true;
                    let mut received = false;

                    loop {
                        tokio::select! {
                            name = signals.recv(), if open => match name {
                                Some(name) if !received => {
                                    received = true;
                                    tracing::info!("Received {}, shutting down", name);
                                    handle.trigger();
                                }
                                Some(name) => {
                                    tracing::error!("Received {} again, exiting immediately", name);
                                    std::process::exit(FORCED_EXIT_CODE);
                                }
                                None => {
                                    tracing::warn!("Signal streams closed");
                                    open = false;
                                }
                            },
                            _ = &mut cancel_rx => {
                                tracing::trace!("Signal listener cancelled");
                                break;
                            }
                        }
                    }
                });
            })?;

        Ok(Self {
            cancel: Some(cancel_tx),
            thread: Some(thread),
        })
    }

    /// Stop listening and wait for the listener thread
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            // Err means the listener thread is already gone
            let _ = cancel.send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::warn!("Signal listener thread panicked");
            }
        }
    }
}

impl Drop for SignalListener {
    fn drop(&mut self) {
        self.shutdown();
    }
}
