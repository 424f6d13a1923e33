// ── Manual entry debouncer ──
//
// Holds the operator's input field. Every edit restarts a timer; when
// the timer runs out with a non-blank field the trimmed value is sent on
// the submission channel. Pressing Enter submits at once.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct Debouncer {
    text: String,
    delay: Duration,
    tx: mpsc::UnboundedSender<String>,
    pending: Option<CancellationToken>,
}

impl Debouncer {
    /// Create a debouncer and the receiver its submissions arrive on.
    ///
    /// Must be used from within a tokio runtime: edits spawn the timer.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            text: String::new(),
            delay,
            tx,
            pending: None,
        };
        (debouncer, rx)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether a timer is armed and has not fired yet.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    // ── Edits ────────────────────────────────────────────────────

    /// Replace the whole field (a paste, or a scanner typing into it).
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.restart();
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
        self.restart();
    }

    /// Delete the last character. Deleting from an empty field is not an edit.
    pub fn backspace(&mut self) {
        if self.text.pop().is_some() {
            self.restart();
        }
    }

    // ── Submission ───────────────────────────────────────────────

    /// Submit the field now, cancelling any armed timer.
    ///
    /// Returns `false` (and sends nothing) when the field is blank.
    pub fn submit_now(&mut self) -> bool {
        self.cancel_pending();
        let value = self.text.trim();
        if value.is_empty() {
            return false;
        }
        self.tx.send(value.to_owned()).is_ok()
    }

    /// Empty the field and disarm the timer.
    pub fn clear(&mut self) {
        self.text.clear();
        self.cancel_pending();
    }

    fn cancel_pending(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    fn restart(&mut self) {
        self.cancel_pending();

        // A blank field never submits, so there is nothing to arm.
        let value = self.text.trim().to_owned();
        if value.is_empty() {
            return;
        }

        let token = CancellationToken::new();
        let guard = token.clone();
        let tx = self.tx.clone();
        let deadline = Instant::now() + self.delay;

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = guard.cancelled() => {}
                () = tokio::time::sleep_until(deadline) => {
                    let _ = tx.send(value);
                    guard.cancel();
                }
            }
        });

        self.pending = Some(token);
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::advance;

    use super::*;

    const DELAY: Duration = Duration::from_millis(1500);

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn edits_within_delay_coalesce() {
        let (mut debouncer, mut rx) = Debouncer::new(DELAY);
        let started = Instant::now();

        debouncer.push('A');
        advance(Duration::from_millis(1000)).await;
        debouncer.push('1');
        advance(Duration::from_millis(1000)).await;
        settle().await;
        assert!(rx.try_recv().is_err(), "timer restarted by second edit");

        assert_eq!(rx.recv().await.as_deref(), Some("A1"));
        assert!(started.elapsed() >= Duration::from_millis(2500));

        settle().await;
        assert!(rx.try_recv().is_err(), "exactly one submission");
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn submit_now_cancels_timer() {
        let (mut debouncer, mut rx) = Debouncer::new(DELAY);

        debouncer.set_text(" P-7 ");
        assert!(debouncer.is_pending());
        assert!(debouncer.submit_now());
        assert_eq!(rx.try_recv().ok().as_deref(), Some("P-7"));
        assert!(!debouncer.is_pending());

        advance(DELAY * 2).await;
        settle().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn blank_values_never_submit() {
        let (mut debouncer, mut rx) = Debouncer::new(DELAY);

        debouncer.set_text("   ");
        assert!(!debouncer.is_pending());
        assert!(!debouncer.submit_now());

        debouncer.push('x');
        debouncer.backspace();
        advance(DELAY * 2).await;
        settle().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_and_drop_cancel_the_timer() {
        let (mut debouncer, mut rx) = Debouncer::new(DELAY);

        debouncer.set_text("A1");
        debouncer.clear();
        assert_eq!(debouncer.text(), "");
        advance(DELAY * 2).await;
        settle().await;
        assert!(rx.try_recv().is_err());

        debouncer.set_text("B2");
        drop(debouncer);
        // Every sender is gone once the cancelled timer task exits.
        assert_eq!(rx.recv().await, None);
    }
}
