//! Barcode slot handlers.

use serde::Serialize;

use stockscan_api::InventoryClient;

use crate::cli::{BarcodeArgs, BarcodeCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct Pending {
    barcode: Option<String>,
}

pub async fn handle(
    client: &InventoryClient,
    args: BarcodeArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        BarcodeCommand::Pending => {
            let pending = Pending {
                barcode: client.latest_barcode().await?,
            };
            let out = output::render_single(
                &global.output,
                &pending,
                |p| p.barcode.clone().unwrap_or_else(|| "(slot empty)".into()),
                |p| p.barcode.clone().unwrap_or_default(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        BarcodeCommand::Ack { code } => {
            let code = util::require_non_empty("code", &code)?;
            let reply = client.nullify_barcode(&code).await?;
            let message = reply.message.unwrap_or_else(|| format!("Barcode {code} acknowledged"));
            util::note(global, &format!("✓ {message}"));
            Ok(())
        }
    }
}
