// ── Barcode poller ──
//
// Watches the server's single barcode slot and feeds new codes into the
// session. A code is acknowledged (nullified) once the session has
// accepted or rejected it, so the scanner gateway can deliver the next.

use std::future::Future;
use std::time::Duration;

use stockscan_api::InventoryClient;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::session::ScanSession;

/// Somewhere scanned codes can be read from and acknowledged.
///
/// The HTTP client is the only implementation shipped; a push-based
/// gateway would implement this instead of being polled.
pub trait BarcodeSource: Send + Sync + 'static {
    /// The pending code, if any.
    fn pending(&self) -> impl Future<Output = Result<Option<String>, CoreError>> + Send;

    /// Mark `code` as consumed.
    fn acknowledge(&self, code: &str) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl BarcodeSource for InventoryClient {
    async fn pending(&self) -> Result<Option<String>, CoreError> {
        Ok(self.latest_barcode().await?)
    }

    async fn acknowledge(&self, code: &str) -> Result<(), CoreError> {
        self.nullify_barcode(code).await?;
        Ok(())
    }
}

/// The code last handed to the session. It is kept while the slot may
/// still hold it and forgotten once acknowledged or not processed.
#[derive(Debug, Default)]
struct SlotMemory {
    last: Option<String>,
}

impl SlotMemory {
    /// Whether `code` should go to the session; remembers it if so.
    fn take_new(&mut self, code: &str) -> bool {
        if self.last.as_deref() == Some(code) {
            return false;
        }
        self.last = Some(code.to_owned());
        true
    }

    fn forget(&mut self) {
        self.last = None;
    }
}

/// Poll `source` until `cancel` fires.
///
/// Poll failures are logged and retried on the next tick. The last code
/// handed to the session is remembered so a slot that still holds it (an
/// acknowledgement that failed) does not count it twice.
pub(crate) async fn poll_task<S: BarcodeSource>(
    source: S,
    session: ScanSession,
    period: Duration,
    settle: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut slot = SlotMemory::default();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }

        let polled = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            polled = source.pending() => polled,
        };

        let code = match polled {
            Ok(Some(code)) => code,
            Ok(None) => continue,
            Err(e) => {
                debug!(error = %e, "barcode poll failed");
                continue;
            }
        };
        if !slot.take_new(&code) {
            continue;
        }
        debug!(%code, "new barcode in slot");

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(settle) => {}
        }

        match session.submit_scan(&code).await {
            Ok(_) => {}
            Err(CoreError::SessionClosed) => break,
            Err(e) => {
                warn!(error = %e, %code, "scanned code not processed, retrying next tick");
                slot.forget();
                continue;
            }
        }

        match source.acknowledge(&code).await {
            Ok(()) => {
                debug!(%code, "barcode acknowledged");
                slot.forget();
            }
            Err(e) => {
                warn!(error = %e, %code, "barcode acknowledgement failed");
                session.notifier().error(format!(
                    "Impossible d'acquitter le code-barres {code} sur le serveur : {}",
                    e.notice()
                ));
            }
        }
    }

    debug!("barcode poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_code_is_taken_once_until_forgotten() {
        let mut slot = SlotMemory::default();
        assert!(slot.take_new("A1"));
        assert!(!slot.take_new("A1"));
        assert!(slot.take_new("B2"));

        // A code the session did not process is handed over again.
        slot.forget();
        assert!(slot.take_new("B2"));
    }
}
