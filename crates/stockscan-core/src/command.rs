// ── Session commands ──
//
// Every mutation of a session's counters travels through this enum and
// is applied by the session task one at a time.

use tokio::sync::oneshot;

use crate::accumulator::ScanOutcome;
use crate::error::CoreError;
use crate::export::ExportReport;
use crate::model::Bucket;

/// Where a scanned value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ScanOrigin {
    /// The barcode slot on the server, via the poller.
    Scanner,
    /// Typed or pasted by the operator.
    Manual,
}

/// A command envelope sent through the command channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: oneshot::Sender<Result<CommandResult, CoreError>>,
}

#[derive(Debug, Clone)]
pub(crate) enum Command {
    Scan { raw: String, origin: ScanOrigin },
    ToggleMode,
    Export,
}

#[derive(Debug, Clone)]
pub(crate) enum CommandResult {
    Scanned(ScanOutcome),
    Toggled(Bucket),
    Exported(ExportReport),
}
