use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A fixed-period tick source running as its own task.
///
/// Each period it sends a tick over a channel. Dropping or cancelling the
/// timer aborts the task, so no tick is delivered after cancellation.
pub struct TickTimer {
    handle: JoinHandle<()>,
}

/// Signal delivered once per period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick;

impl TickTimer {
    /// Start a timer firing every `period`. The first tick arrives one full
    /// period after the call.
    pub fn start(period: Duration, tx: mpsc::UnboundedSender<Tick>) -> Self {
        let handle = tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut interval = tokio::time::interval_at(start, period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if tx.send(Tick).is_err() {
                    break;
                }
            }
        });
        tracing::debug!(period_ms = period.as_millis() as u64, "Tick timer started");
        Self { handle }
    }

    pub fn cancel(self) {
        // Drop does the work
    }
}

impl Drop for TickTimer {
    fn drop(&mut self) {
        self.handle.abort();
        tracing::debug!("Tick timer stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn ticks_arrive_each_period() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _timer = TickTimer::start(Duration::from_millis(100), tx);

        tokio::time::sleep(Duration::from_millis(350)).await;
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        assert_eq!(count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_stops_ticking() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = TickTimer::start(Duration::from_millis(100), tx);
        tokio::time::sleep(Duration::from_millis(150)).await;
        timer.cancel();
        while rx.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_millis(500)).await;
        // Sender was dropped with the aborted task
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }
}
