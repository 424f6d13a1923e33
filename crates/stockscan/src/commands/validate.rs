//! Stock validation: count the shelves and compare with the inventory.

use tabled::Tabled;

use stockscan_core::{Bucket, ReconciliationRow, ScanSession, SessionConfig};

use crate::cli::{GlobalOpts, SessionArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::scan;

#[derive(Tabled)]
struct ReconciliationTableRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Stock")]
    stock: i64,
    #[tabled(rename = "Validated")]
    validated: u32,
    #[tabled(rename = "Difference")]
    difference: String,
}

impl From<&ReconciliationRow> for ReconciliationTableRow {
    fn from(r: &ReconciliationRow) -> Self {
        Self {
            id: r.product_id.clone(),
            name: r.display_name.clone(),
            stock: r.inventory_stock,
            validated: r.validated_count,
            difference: format!("{:+}", r.difference),
        }
    }
}

pub(crate) fn reconciliation_table(rows: &[ReconciliationRow]) -> String {
    let table: Vec<ReconciliationTableRow> = rows.iter().map(ReconciliationTableRow::from).collect();
    output::render_table(&table)
}

pub async fn handle(
    args: SessionArgs,
    mut session_config: SessionConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    config::apply_session_args(&mut session_config, &args);
    let session = ScanSession::new(session_config, Bucket::Validated)?;

    scan::run(&session, &args, global).await?;

    // Counts not exported yet are still worth seeing.
    if session.snapshot().validated.is_empty() {
        return Ok(());
    }
    let rows = session.reconciliation();
    let out = output::render_list(
        &global.output,
        &rows,
        |r| ReconciliationTableRow::from(r),
        |r| format!("{}\t{}\t{}", r.product_id, r.validated_count, r.difference),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
