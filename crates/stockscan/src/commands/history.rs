//! Transaction history handler.

use tabled::Tabled;

use stockscan_api::InventoryClient;
use stockscan_core::history::{self, HistoryFilter};
use stockscan_core::{Transaction, TransactionType};

use crate::cli::{GlobalOpts, HistoryArgs, TransactionKind};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct TransactionRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Product")]
    product: String,
    #[tabled(rename = "Quantity")]
    quantity: i64,
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        Self {
            date: display_timestamp(t),
            kind: t.kind.to_string(),
            product: t.product.clone(),
            quantity: t.quantity,
        }
    }
}

/// Local time when the log value parsed, else the raw value.
fn display_timestamp(t: &Transaction) -> String {
    t.timestamp.map_or_else(
        || t.raw_timestamp.clone().unwrap_or_else(|| "-".into()),
        |ts| ts.format("%d/%m/%Y %H:%M:%S").to_string(),
    )
}

impl From<TransactionKind> for TransactionType {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Entree => Self::Entree,
            TransactionKind::Sortie => Self::Sortie,
        }
    }
}

pub async fn handle(
    client: &InventoryClient,
    args: HistoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let filter = HistoryFilter {
        kind: args.kind.map(TransactionType::from),
        limit: args.limit,
    };
    let transactions = history::select(history::fetch_transactions(client).await?, &filter);

    let out = output::render_list(
        &global.output,
        &transactions,
        |t| TransactionRow::from(t),
        |t| format!("{}\t{}\t{}\t{}", display_timestamp(t), t.kind, t.product, t.quantity),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
