//! Printer / speech worker pipeline
//!
//! Two worker threads connected by a bounded queue, coordinated by a shared
//! shutdown signal and run by a [`Supervisor`].
//!
//! # Architecture
//!
//! ```text
//!                 ┌──────────────► stdout
//! [PrinterWorker] ┤
//!                 └──► [MessageQueue] ──► [SpeechWorker] ──► SpeechEngine
//!
//!        ShutdownSignal (observed by both, set by Supervisor / SignalListener)
//! ```
//!
//! # Design
//!
//! - **Bounded everything** - queue pushes, pops, sleeps and joins all take a
//!   timeout, so no thread can wedge shutdown.
//! - **Cooperative cancellation** - the signal plus a sentinel item; threads
//!   are never killed.
//! - **Thread-confined engine** - the speech worker builds its own engine from
//!   a factory and is the only code that touches it.

pub mod printer;
pub mod queue;
pub mod shutdown;
pub mod signals;
pub mod speaker;
pub mod status;
pub mod supervisor;

pub use printer::{PrinterOptions, PrinterWorker};
pub use queue::{MessageQueue, PopOutcome, PushOutcome, QueueItem, DEFAULT_QUEUE_CAPACITY};
pub use shutdown::{ShutdownHandle, ShutdownSignal};
pub use signals::SignalListener;
pub use speaker::SpeechWorker;
pub use status::WorkerStatus;
pub use supervisor::{Output, Supervisor};
