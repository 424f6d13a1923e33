// ── Scan session ──
//
// Owns one operator's scan loop: the product catalog, the counters, the
// barcode poller and the exporter. Counter mutations happen only on the
// session task, fed through a bounded command channel; everything else
// observes through snapshots and notifications.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use chrono::Local;
use serde::Serialize;
use stockscan_api::InventoryClient;
use tokio::sync::{Mutex, broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::accumulator::{Accumulator, BucketLine, ScanOutcome};
use crate::command::{Command, CommandEnvelope, CommandResult, ScanOrigin};
use crate::config::SessionConfig;
use crate::error::CoreError;
use crate::export::{self, ExportReport};
use crate::model::{Bucket, Catalog, Notification, Notifier, ReconciliationRow, reconcile};
use crate::poller::{self, BarcodeSource};

const COMMAND_CHANNEL_SIZE: usize = 64;
const NOTIFICATION_CHANNEL_SIZE: usize = 128;

// ── SessionSnapshot ──────────────────────────────────────────────

/// Counters of every bucket at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub active: Bucket,
    pub entries: Vec<BucketLine>,
    pub exits: Vec<BucketLine>,
    pub validated: Vec<BucketLine>,
}

impl SessionSnapshot {
    fn empty(active: Bucket) -> Self {
        Self {
            active,
            entries: Vec::new(),
            exits: Vec::new(),
            validated: Vec::new(),
        }
    }

    pub fn lines(&self, bucket: Bucket) -> &[BucketLine] {
        match bucket {
            Bucket::Entries => &self.entries,
            Bucket::Exits => &self.exits,
            Bucket::Validated => &self.validated,
        }
    }

    pub fn active_lines(&self) -> &[BucketLine] {
        self.lines(self.active)
    }

    /// Count recorded for `product_id` in `bucket` (zero when absent).
    pub fn count(&self, bucket: Bucket, product_id: &str) -> u32 {
        self.lines(bucket)
            .iter()
            .find(|l| l.product_id == product_id)
            .map_or(0, |l| l.count)
    }
}

// ── ScanSession ──────────────────────────────────────────────────

/// Handle to a running scan session.
///
/// Cheaply cloneable. Created idle: call [`start()`](Self::start) to load
/// the catalog and spawn the background tasks, and
/// [`shutdown()`](Self::shutdown) to stop them.
#[derive(Clone)]
pub struct ScanSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: SessionConfig,
    client: InventoryClient,
    start_bucket: Bucket,
    catalog: ArcSwap<Catalog>,
    notifier: Notifier,
    snapshot: watch::Sender<SessionSnapshot>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    running: AtomicBool,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl ScanSession {
    /// Create a session counting into `start`. A session started on
    /// [`Bucket::Validated`] is a validation session and never toggles.
    pub fn new(config: SessionConfig, start: Bucket) -> Result<Self, CoreError> {
        let client = config.client()?;
        Ok(Self::with_client(config, client, start))
    }

    /// Create a session around an existing API client.
    pub fn with_client(config: SessionConfig, client: InventoryClient, start: Bucket) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::empty(start));
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Self {
            inner: Arc::new(SessionInner {
                config,
                client,
                start_bucket: start,
                catalog: ArcSwap::from_pointee(Catalog::default()),
                notifier: Notifier::new(NOTIFICATION_CHANNEL_SIZE),
                snapshot,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                running: AtomicBool::new(false),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &InventoryClient {
        &self.inner.client
    }

    pub fn is_validation(&self) -> bool {
        self.inner.start_bucket == Bucket::Validated
    }

    pub(crate) fn notifier(&self) -> &Notifier {
        &self.inner.notifier
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Load the catalog, then spawn the session task and a barcode poller
    /// reading the server slot.
    pub async fn start(&self) -> Result<(), CoreError> {
        let source = self.inner.client.clone();
        self.start_with_source(source).await
    }

    /// Like [`start()`](Self::start) with a custom barcode source.
    ///
    /// No poller runs when the configured poll interval is zero.
    pub async fn start_with_source<S: BarcodeSource>(&self, source: S) -> Result<(), CoreError> {
        let products = self.refresh_catalog().await?;

        let Some(rx) = self.inner.command_rx.lock().await.take() else {
            return Err(CoreError::Internal("scan session already started".into()));
        };

        let mut handles = self.inner.task_handles.lock().await;
        handles.push(tokio::spawn(command_processor_task(self.clone(), rx)));
        self.inner.running.store(true, Ordering::SeqCst);

        let config = &self.inner.config;
        if !config.poll_interval.is_zero() {
            handles.push(tokio::spawn(poller::poll_task(
                source,
                self.clone(),
                config.poll_interval,
                config.settle_delay,
                self.inner.cancel.clone(),
            )));
        }

        info!(bucket = %self.inner.start_bucket, products, "scan session started");
        Ok(())
    }

    /// Stop the poller and the session task. Commands still queued are
    /// answered with [`CoreError::SessionClosed`].
    pub async fn shutdown(&self) {
        self.inner.running.store(false, Ordering::SeqCst);
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        info!("scan session stopped");
    }

    // ── Catalog ──────────────────────────────────────────────────

    /// Reload the catalog from the inventory. Scans already queued are
    /// validated against whichever snapshot is current when they run.
    pub async fn refresh_catalog(&self) -> Result<usize, CoreError> {
        match self.inner.client.list_inventory().await {
            Ok(items) => {
                let catalog = Catalog::from_inventory(items);
                let products = catalog.len();
                self.inner.catalog.store(Arc::new(catalog));
                debug!(products, "catalog refreshed");
                Ok(products)
            }
            Err(e) => {
                let err = CoreError::from(e);
                self.inner.notifier.error(format!(
                    "Impossible de charger l'inventaire : {}",
                    err.notice()
                ));
                Err(err)
            }
        }
    }

    pub fn catalog(&self) -> Arc<Catalog> {
        self.inner.catalog.load_full()
    }

    // ── Commands ─────────────────────────────────────────────────

    /// Submit a typed or pasted identifier.
    pub async fn submit(&self, raw: impl Into<String>) -> Result<ScanOutcome, CoreError> {
        self.scan(raw.into(), ScanOrigin::Manual).await
    }

    pub(crate) async fn submit_scan(&self, code: &str) -> Result<ScanOutcome, CoreError> {
        self.scan(code.to_owned(), ScanOrigin::Scanner).await
    }

    async fn scan(&self, raw: String, origin: ScanOrigin) -> Result<ScanOutcome, CoreError> {
        match self.execute(Command::Scan { raw, origin }).await? {
            CommandResult::Scanned(outcome) => Ok(outcome),
            other => Err(unexpected(&other)),
        }
    }

    /// Switch between entries and exits. Returns the new active bucket.
    pub async fn toggle_mode(&self) -> Result<Bucket, CoreError> {
        match self.execute(Command::ToggleMode).await? {
            CommandResult::Toggled(bucket) => Ok(bucket),
            other => Err(unexpected(&other)),
        }
    }

    /// Export the active bucket; it is cleared only if this returns `Ok`.
    pub async fn export(&self) -> Result<ExportReport, CoreError> {
        match self.execute(Command::Export).await? {
            CommandResult::Exported(report) => Ok(report),
            other => Err(unexpected(&other)),
        }
    }

    async fn execute(&self, command: Command) -> Result<CommandResult, CoreError> {
        if !self.inner.running.load(Ordering::SeqCst) {
            return Err(CoreError::SessionClosed);
        }

        let (tx, rx) = oneshot::channel();
        self.inner
            .command_tx
            .send(CommandEnvelope {
                command,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::SessionClosed)?;

        rx.await.map_err(|_| CoreError::SessionClosed)?
    }

    // ── Observation ──────────────────────────────────────────────

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    /// Receiver that is marked changed after every processed command.
    pub fn watch_snapshot(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshot.subscribe()
    }

    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.inner.notifier.subscribe()
    }

    /// Catalog stock next to the validated counts.
    pub fn reconciliation(&self) -> Vec<ReconciliationRow> {
        reconcile(&self.catalog(), &self.snapshot().validated)
    }
}

fn unexpected(result: &CommandResult) -> CoreError {
    CoreError::Internal(format!("unexpected command result: {result:?}"))
}

// ── Session task ─────────────────────────────────────────────────

struct SessionState {
    active: Bucket,
    accumulator: Accumulator,
}

async fn command_processor_task(session: ScanSession, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = session.inner.cancel.clone();
    let mut state = SessionState {
        active: session.inner.start_bucket,
        accumulator: Accumulator::new(),
    };

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&session, &mut state, envelope.command).await;
                publish_snapshot(&session, &state);
                let _ = envelope.response_tx.send(result);
            }
        }
    }
    debug!("session task stopped");
}

async fn route_command(
    session: &ScanSession,
    state: &mut SessionState,
    command: Command,
) -> Result<CommandResult, CoreError> {
    let inner = &session.inner;

    match command {
        Command::Scan { raw, origin } => {
            let catalog = inner.catalog.load();
            let outcome = state.accumulator.accept(state.active, &catalog, &raw);
            match &outcome {
                ScanOutcome::Accepted {
                    bucket,
                    product_id,
                    count,
                    ..
                } => {
                    debug!(%origin, %bucket, %product_id, count, "scan accepted");
                    inner.notifier.success(accepted_message(*bucket, product_id));
                }
                ScanOutcome::Rejected { code } => {
                    debug!(%origin, %code, "scan rejected");
                    inner.notifier.error(format!(
                        "Le produit \"{code}\" n'existe pas dans l'inventaire."
                    ));
                }
                ScanOutcome::Ignored => {}
            }
            Ok(CommandResult::Scanned(outcome))
        }

        Command::ToggleMode => {
            let Some(next) = state.active.toggled() else {
                return Err(CoreError::ValidationFailed {
                    message: "a validation session counts into a single bucket".into(),
                });
            };
            state.active = next;
            inner.notifier.info(format!("Mode : {}", next.label()));
            Ok(CommandResult::Toggled(next))
        }

        Command::Export => {
            let bucket = state.active;
            if state.accumulator.is_empty(bucket) {
                inner.notifier.warning(empty_message(bucket));
                return Err(CoreError::EmptyBucket { bucket });
            }

            let catalog = inner.catalog.load_full();
            let lines = state.accumulator.lines(bucket, &catalog);
            let report = export::export_bucket(
                &inner.client,
                &inner.config.export_dir,
                bucket,
                &lines,
                &catalog,
                &inner.notifier,
                Local::now().date_naive(),
            )
            .await?;

            state.accumulator.clear(bucket);
            info!(%bucket, "bucket cleared after export");
            Ok(CommandResult::Exported(report))
        }
    }
}

fn publish_snapshot(session: &ScanSession, state: &SessionState) {
    let catalog = session.inner.catalog.load();
    let snapshot = SessionSnapshot {
        active: state.active,
        entries: state.accumulator.lines(Bucket::Entries, &catalog),
        exits: state.accumulator.lines(Bucket::Exits, &catalog),
        validated: state.accumulator.lines(Bucket::Validated, &catalog),
    };
    session.inner.snapshot.send_replace(snapshot);
}

fn accepted_message(bucket: Bucket, product_id: &str) -> String {
    match bucket {
        Bucket::Validated => format!("Produit {product_id} validé."),
        movement => format!("Produit {product_id} ajouté aux {}.", movement.label()),
    }
}

fn empty_message(bucket: Bucket) -> &'static str {
    match bucket {
        Bucket::Entries => "Aucune entrée à exporter.",
        Bucket::Exits => "Aucune sortie à exporter.",
        Bucket::Validated => "Aucun produit validé à exporter.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_bucket() {
        assert_eq!(
            accepted_message(Bucket::Entries, "A1"),
            "Produit A1 ajouté aux entrées."
        );
        assert_eq!(
            accepted_message(Bucket::Exits, "A1"),
            "Produit A1 ajouté aux sorties."
        );
        assert_eq!(accepted_message(Bucket::Validated, "A1"), "Produit A1 validé.");
        assert_eq!(empty_message(Bucket::Exits), "Aucune sortie à exporter.");
    }

    #[test]
    fn snapshot_lookup_defaults_to_zero() {
        let mut snapshot = SessionSnapshot::empty(Bucket::Exits);
        snapshot.exits.push(BucketLine {
            product_id: "A1".into(),
            display_name: "Widget".into(),
            count: 2,
        });
        assert_eq!(snapshot.count(Bucket::Exits, "A1"), 2);
        assert_eq!(snapshot.count(Bucket::Entries, "A1"), 0);
        assert_eq!(snapshot.active_lines().len(), 1);
    }
}
