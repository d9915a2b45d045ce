//! Continuous voice monitoring.
//!
//! The capture loop classifies fixed-size frames and feeds the segment
//! accumulator; completed segments go to the single-slot dispatch scheduler,
//! which transcribes, resolves and executes on its own thread.

pub mod accumulator;
pub mod debounce;
pub mod flight;
pub mod report;
pub mod scheduler;
pub mod session;
pub mod types;

pub use accumulator::{AccumulatorConfig, Phase, SegmentAccumulator};
pub use debounce::DebounceClock;
pub use flight::{FlightLock, FlightToken};
pub use report::{ErrorReporter, LogReporter, StageError};
pub use scheduler::{DispatchScheduler, DispatchWorker, ListeningGate, SessionStats};
pub use session::{MonitorSession, SessionConfig, SessionHandle};
pub use types::{Frame, Segment, SegmentEvent};
