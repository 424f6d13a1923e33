// ── Reconciliation exporter ──
//
// Renders a bucket to a spreadsheet on disk, then (for movement buckets)
// pushes the same rows to the inventory and the transaction log. The
// caller clears the bucket only when this returns `Ok`.

pub mod workbook;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Serialize;
use stockscan_api::{InventoryClient, MovementKind, MovementUpdate};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::accumulator::BucketLine;
use crate::error::CoreError;
use crate::model::{Bucket, Catalog, Notifier, reconcile};

/// MIME type of the files written by the exporter.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// What an export produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportReport {
    pub bucket: Bucket,
    pub path: PathBuf,
    /// Data rows written to the sheet.
    pub rows: usize,
    /// Sum of the exported counts.
    pub total: u64,
    /// Whether the rows were pushed to the server.
    pub submitted: bool,
}

/// `{entrees|sorties|inventory_validation}_{YYYY-MM-DD}.xlsx`
pub fn file_name(bucket: Bucket, date: NaiveDate) -> String {
    numbered_file_name(bucket, date, 0)
}

/// Name of the `n`th file of the day: `n == 0` is [`file_name`], later
/// ones carry ` (n)` before the extension.
pub fn numbered_file_name(bucket: Bucket, date: NaiveDate, n: u32) -> String {
    let stem = format!("{}_{}", bucket.export_stem(), date.format("%Y-%m-%d"));
    if n == 0 {
        format!("{stem}.xlsx")
    } else {
        format!("{stem} ({n}).xlsx")
    }
}

/// Bulk request body for a movement bucket.
pub fn movement_updates(kind: MovementKind, lines: &[BucketLine]) -> Vec<MovementUpdate> {
    lines
        .iter()
        .map(|line| MovementUpdate {
            kind,
            product: line.product_id.clone(),
            quantity: line.count,
        })
        .collect()
}

/// Export one non-empty bucket.
///
/// A file error is reported and the server is not contacted. A server
/// error is reported after the file has been written; the error carries
/// the file path.
pub(crate) async fn export_bucket(
    client: &InventoryClient,
    export_dir: &Path,
    bucket: Bucket,
    lines: &[BucketLine],
    catalog: &Catalog,
    notifier: &Notifier,
    date: NaiveDate,
) -> Result<ExportReport, CoreError> {
    let total = lines.iter().map(|l| u64::from(l.count)).sum();

    let (bytes, rows) = if bucket.is_movement() {
        (workbook::movement_workbook(bucket, lines, date), lines.len())
    } else {
        let table = reconcile(catalog, lines);
        (workbook::validation_workbook(&table, date), table.len())
    };

    let path = match write_new_file(export_dir, bucket, date, bytes).await {
        Ok(path) => path,
        Err(e) => {
            warn!(error = %e, dir = %export_dir.display(), "export file write failed");
            notifier.error("Erreur lors de la génération du fichier Excel.");
            return Err(e);
        }
    };
    info!(%bucket, rows, path = %path.display(), "spreadsheet written");
    notifier.success(format!(
        "{} exporté : {}",
        bucket.document_title(),
        path.display()
    ));

    let mut report = ExportReport {
        bucket,
        path,
        rows,
        total,
        submitted: false,
    };

    let Some(kind) = bucket.movement_kind() else {
        return Ok(report);
    };

    let updates = movement_updates(kind, lines);
    if let Err(message) = submit_movements(client, &updates).await {
        warn!(%bucket, %message, "server update failed, keeping local counts");
        notifier.error(format!(
            "Erreur de mise à jour serveur: {message}. Les données locales n'ont pas été effacées."
        ));
        return Err(CoreError::Submission {
            message,
            file: report.path,
        });
    }

    info!(%bucket, rows = updates.len(), "inventory and transaction log updated");
    notifier.success("Inventaire et journal des transactions mis à jour avec succès sur le serveur.");
    report.submitted = true;
    Ok(report)
}

/// Write the workbook under the first free name of the day. Existing
/// slips are never replaced.
async fn write_new_file(
    dir: &Path,
    bucket: Bucket,
    date: NaiveDate,
    bytes: Result<Vec<u8>, CoreError>,
) -> Result<PathBuf, CoreError> {
    let bytes = bytes?;
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| CoreError::Export {
            message: format!("cannot create {}: {e}", dir.display()),
        })?;

    let mut n = 0;
    loop {
        let path = dir.join(numbered_file_name(bucket, date, n));
        let opened = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;
        match opened {
            Ok(mut file) => {
                let written = match file.write_all(&bytes).await {
                    Ok(()) => file.flush().await,
                    Err(e) => Err(e),
                };
                return match written {
                    Ok(()) => Ok(path),
                    Err(e) => Err(CoreError::Export {
                        message: format!("cannot write {}: {e}", path.display()),
                    }),
                };
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => {
                return Err(CoreError::Export {
                    message: format!("cannot create {}: {e}", path.display()),
                });
            }
        }
    }
}

/// Send the same rows to both bulk endpoints at once. Both must succeed.
async fn submit_movements(
    client: &InventoryClient,
    updates: &[MovementUpdate],
) -> Result<(), String> {
    let (inventory, log) = tokio::join!(client.update_inventory(updates), client.append_log(updates));

    let failures: Vec<String> = [
        inventory.err().map(|e| format!("[Inventaire] Échec de la mise à jour en lot: {}", api_message(e))),
        log.err().map(|e| format!("[Journal] Échec de la mise à jour en lot: {}", api_message(e))),
    ]
    .into_iter()
    .flatten()
    .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("; "))
    }
}

fn api_message(err: stockscan_api::Error) -> String {
    CoreError::from(err).notice()
}
