mod break_scheduler;
mod session_recorder;
#[cfg(test)]
mod test_support;
mod timer_engine;
mod timers;

pub use break_scheduler::{fits_before_end, BreakScheduler};
pub use session_recorder::{RecorderError, SessionRecorder};
pub use timer_engine::{EngineEvent, InvalidTransition, PopupStatus, StatusSnapshot, TimerEngine};
pub use timers::{TimerId, TimerQueue};
