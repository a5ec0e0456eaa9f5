mod notifier;
mod presenter;
mod timer;

pub use notifier::{NotifierActor, NotifierHandle, NotifierSound};
pub use presenter::DesktopBreakPresenter;
pub use timer::{CommandOutcome, TimerActor, TimerHandle, TimerMessage};
