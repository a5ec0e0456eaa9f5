use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use cadence_core::{BreakPresenter, PopupRequest, PopupToken};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{NotifierHandle, TimerHandle};

/// Break countdowns as desktop notifications. Each popup owns a countdown
/// task that reports the token back to the timer when it runs out.
pub struct DesktopBreakPresenter {
    timer: TimerHandle,
    notifier: Option<NotifierHandle>,
    countdowns: Mutex<HashMap<PopupToken, JoinHandle<()>>>,
}

impl DesktopBreakPresenter {
    pub fn new(timer: TimerHandle, notifier: Option<NotifierHandle>) -> Self {
        Self {
            timer,
            notifier,
            countdowns: Mutex::new(HashMap::new()),
        }
    }

    /// A countdown task never panics under the lock, so a poisoned map is
    /// still consistent.
    fn countdowns(&self) -> MutexGuard<'_, HashMap<PopupToken, JoinHandle<()>>> {
        self.countdowns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[cfg(test)]
    fn running(&self) -> usize {
        self.countdowns()
            .values()
            .filter(|countdown| !countdown.is_finished())
            .count()
    }
}

impl BreakPresenter for DesktopBreakPresenter {
    fn show_countdown(&self, request: PopupRequest) {
        if let Some(ref notifier) = self.notifier {
            notifier.send_break_started(request.kind, request.duration);
        }

        let timer = self.timer.clone();
        let token = request.token;
        let duration = request.duration;
        let countdown = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if let Err(error) = timer.popup_finished(token).await {
                warn!(%error, %token, "failed to report break completion");
            }
        });

        let mut countdowns = self.countdowns();
        countdowns.retain(|_, countdown| !countdown.is_finished());
        countdowns.insert(token, countdown);
        debug!(%token, kind = ?request.kind, seconds = duration.as_secs(), "break countdown shown");
    }

    fn dismiss(&self, token: PopupToken) {
        if let Some(countdown) = self.countdowns().remove(&token) {
            countdown.abort();
            debug!(%token, "break countdown withdrawn");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actors::TimerMessage;
    use cadence_core::PopupKind;
    use std::time::Duration;

    fn request(token: u64, millis: u64) -> PopupRequest {
        PopupRequest {
            token: PopupToken::new(token),
            kind: PopupKind::ShortBreak,
            duration: Duration::from_millis(millis),
        }
    }

    #[tokio::test]
    async fn countdown_reports_completion_once() {
        let (timer, mut receiver) = TimerHandle::channel();
        let presenter = DesktopBreakPresenter::new(timer, None);

        presenter.show_countdown(request(1, 20));

        let message = tokio::time::timeout(Duration::from_secs(1), receiver.recv())
            .await
            .unwrap();
        match message {
            Some(TimerMessage::PopupFinished { token }) => assert_eq!(token, PopupToken::new(1)),
            _ => panic!("expected popup completion"),
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn dismissed_countdown_never_completes() {
        let (timer, mut receiver) = TimerHandle::channel();
        let presenter = DesktopBreakPresenter::new(timer, None);

        presenter.show_countdown(request(1, 30));
        presenter.dismiss(PopupToken::new(1));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(receiver.try_recv().is_err());
        assert_eq!(presenter.running(), 0);
    }

    #[tokio::test]
    async fn dismissing_unknown_token_is_harmless() {
        let (timer, _receiver) = TimerHandle::channel();
        let presenter = DesktopBreakPresenter::new(timer, None);

        presenter.show_countdown(request(2, 10_000));
        presenter.dismiss(PopupToken::new(7));

        assert_eq!(presenter.running(), 1);
        presenter.dismiss(PopupToken::new(2));
    }

    #[tokio::test]
    async fn countdowns_keep_working_after_a_panic_under_the_lock() {
        let (timer, _receiver) = TimerHandle::channel();
        let presenter = DesktopBreakPresenter::new(timer, None);

        std::thread::scope(|scope| {
            let holder = scope.spawn(|| {
                let _guard = presenter.countdowns.lock().unwrap();
                panic!("panicked while holding the countdown map");
            });
            assert!(holder.join().is_err());
        });
        assert!(presenter.countdowns.is_poisoned());

        presenter.show_countdown(request(3, 10_000));
        assert_eq!(presenter.running(), 1);
        presenter.dismiss(PopupToken::new(3));
        assert_eq!(presenter.running(), 0);
    }
}
