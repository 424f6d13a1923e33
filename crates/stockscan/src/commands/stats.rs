//! Movement statistics handler.

use std::fmt::Write as _;

use serde::Serialize;

use stockscan_api::InventoryClient;
use stockscan_core::{MovementStats, StatsFilter, history, stats};

use crate::cli::{GlobalOpts, StatsArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct StatsReport {
    #[serde(flatten)]
    stats: MovementStats,
    /// Distinct products anywhere in the log, before filtering.
    products_in_log: usize,
}

fn detail(report: &StatsReport) -> String {
    let s = &report.stats;
    let mut out = format!(
        "Entries:  {} units in {} transactions\n\
         Exits:    {} units in {} transactions\n\
         Products: {} in the log",
        s.total_entries, s.entry_count, s.total_exits, s.exit_count, report.products_in_log
    );
    if !s.top_products.is_empty() {
        out.push_str("\n\nMost active products:");
        for (rank, p) in s.top_products.iter().enumerate() {
            let _ = write!(out, "\n  {}. {} ({} transactions)", rank + 1, p.product, p.transactions);
        }
    }
    out
}

pub async fn handle(
    client: &InventoryClient,
    args: StatsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let filter = StatsFilter {
        product: args.product,
        from: args.from.as_deref().map(|d| util::parse_date("from", d)).transpose()?,
        to: args.to.as_deref().map(|d| util::parse_date("to", d)).transpose()?,
    };
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(CliError::Validation {
                field: "from".into(),
                reason: format!("{from} is after {to}"),
            });
        }
    }

    let transactions = history::fetch_transactions(client).await?;
    let report = StatsReport {
        stats: MovementStats::compute(&transactions, &filter),
        products_in_log: stats::products(&transactions).len(),
    };

    let out = output::render_single(&global.output, &report, detail, |r| {
        format!("{}\t{}", r.stats.total_entries, r.stats.total_exits)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
