//! Integration tests for the `stockscan` CLI binary.
//!
//! Parsing, help and error paths run without a server; the rest drive
//! the binary against a wiremock inventory server.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `stockscan` binary with env isolation.
///
/// Clears every `STOCKSCAN_*` variable and points the config file into
/// `home`, so tests never touch the user's real configuration.
fn stockscan_cmd(home: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("stockscan");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home)
        .env("STOCKSCAN_CONFIG", home.join("config.toml"))
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("STOCKSCAN_PROFILE")
        .env_remove("STOCKSCAN_API_URL")
        .env_remove("STOCKSCAN_API_TOKEN")
        .env_remove("STOCKSCAN_EXPORT_DIR")
        .env_remove("STOCKSCAN_OUTPUT")
        .env_remove("STOCKSCAN_LOG_FILE")
        .env_remove("STOCKSCAN_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run a blocking command off the runtime the mock server answers on.
async fn run(mut cmd: assert_cmd::Command) -> std::process::Output {
    tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap()
}

async fn inventory_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/inventory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "productId": "ProductID", "name": "Nom", "quantity": "Quantité" },
            { "productId": "A1", "name": "Widget", "quantity": 10, "dailyTransactions": 2 },
            { "productId": 2002, "name": "Gadget", "quantity": "4", "dailyTransactions": "5" }
        ])))
        .mount(&server)
        .await;
    server
}

async fn mount_log(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/transaction-log"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "type": "Type", "product": "Produit", "quantity": "Quantité", "timestamp": "Date" },
            { "type": "Entrée", "product": "A1", "quantity": 3, "timestamp": "2026-03-01 09:00:00" },
            { "type": "Sortie", "product": "A1", "quantity": 1, "timestamp": "2026-03-02 10:00:00" },
            { "type": "Entree", "product": "2002", "quantity": 5, "timestamp": "2026-03-03 11:00:00" }
        ])))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = stockscan_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    stockscan_cmd(home.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("scan")
            .and(predicate::str::contains("validate"))
            .and(predicate::str::contains("inventory"))
            .and(predicate::str::contains("history")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    stockscan_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("stockscan"));
}

#[test]
fn test_completions() {
    let home = TempDir::new().unwrap();
    stockscan_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
    stockscan_cmd(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    let output = stockscan_cmd(home.path()).arg("restock").output().unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("restock"));
}

#[test]
fn test_no_server_configured() {
    let home = TempDir::new().unwrap();
    let output = stockscan_cmd(home.path())
        .args(["inventory", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("No inventory server configured"),
        "Expected a missing-config error:\n{text}"
    );
}

#[test]
fn test_unreachable_server_exits_with_connection_code() {
    let home = TempDir::new().unwrap();
    let output = stockscan_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:9", "--timeout", "5"])
        .args(["inventory", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(7), "{}", combined_output(&output));
}

#[test]
fn test_inventory_set_validates_before_calling_server() {
    let home = TempDir::new().unwrap();
    let base = ["--api-url", "http://127.0.0.1:9", "inventory", "set"];

    let output = stockscan_cmd(home.path())
        .args(base)
        .args(["A1", "--name", "  ", "--quantity", "3"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("name"));

    let output = stockscan_cmd(home.path())
        .args(base)
        .args(["A1", "--name", "Widget", "--quantity=-3"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("quantity"));
}

#[test]
fn test_stats_rejects_bad_dates() {
    let home = TempDir::new().unwrap();
    let output = stockscan_cmd(home.path())
        .args(["--api-url", "http://127.0.0.1:9", "stats", "--from", "03/01/2026"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("YYYY-MM-DD"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_honours_override() {
    let home = TempDir::new().unwrap();
    stockscan_cmd(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_show_without_file() {
    let home = TempDir::new().unwrap();
    stockscan_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_profile"));
}

#[test]
fn test_config_use_and_show_masks_tokens() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("config.toml"),
        r#"
default_profile = "shop"

[profiles.shop]
api_url = "http://shop.local"

[profiles.depot]
api_url = "http://depot.local"
api_token = "s3cret"
"#,
    )
    .unwrap();

    stockscan_cmd(home.path())
        .args(["config", "use", "depot"])
        .assert()
        .success();
    stockscan_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#"default_profile = "depot""#)
                .and(predicate::str::contains("s3cret").not()),
        );

    let output = stockscan_cmd(home.path())
        .args(["config", "use", "warehouse"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("warehouse"));
}

#[test]
fn test_unknown_profile_flag_is_an_error() {
    let home = TempDir::new().unwrap();
    let output = stockscan_cmd(home.path())
        .args(["--profile", "nowhere", "history"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("nowhere"));
}

// ── Against a server ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_inventory_list_json_skips_header_row() {
    let home = TempDir::new().unwrap();
    let server = inventory_server().await;

    let mut cmd = stockscan_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "-o", "json", "inventory", "list"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let products: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        products,
        json!([
            { "product_id": "A1", "display_name": "Widget", "stock": 10, "daily_transactions": 2 },
            { "product_id": "2002", "display_name": "Gadget", "stock": 4, "daily_transactions": 5 }
        ])
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_inventory_list_sorts_by_daily_transactions() {
    let home = TempDir::new().unwrap();
    let server = inventory_server().await;

    let mut cmd = stockscan_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "inventory", "list", "--sort", "daily", "--reverse"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Today"), "{stdout}");
    let gadget = stdout.find("Gadget").unwrap();
    let widget = stdout.find("Widget").unwrap();
    assert!(gadget < widget, "{stdout}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_inventory_set_posts_trimmed_product() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/inventory"))
        .and(body_json(json!({ "productId": "C3", "name": "Gizmo", "quantity": 7 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = stockscan_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "inventory", "set", " C3 "])
        .args(["--name", "Gizmo ", "--quantity", "7"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_history_filters_newest_first() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_log(&server).await;

    let mut cmd = stockscan_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "-o", "plain", "history", "--type", "entree"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "{stdout}");
    assert!(lines[0].contains("2002") && lines[0].contains("03/03/2026"));
    assert!(lines[1].contains("A1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stats_totals() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_log(&server).await;

    let mut cmd = stockscan_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "-o", "json", "stats", "--from", "2026-03-02"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stats: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(stats["total_entries"], 5);
    assert_eq!(stats["total_exits"], 1);
    assert_eq!(stats["entry_count"], 1);
    assert_eq!(stats["products_in_log"], 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_barcode_pending_and_ack() {
    let home = TempDir::new().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/get-latest-barcode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "barcode": "A1" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/nullify-barcode"))
        .and(body_json(json!({ "barcode": "A1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "Barcode nullified" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = stockscan_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "-o", "plain", "barcode", "pending"]);
    let output = run(cmd).await;
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "A1");

    let mut cmd = stockscan_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "barcode", "ack", "A1"]);
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Barcode nullified"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_scan_line_mode_counts_exports_and_submits() {
    let home = TempDir::new().unwrap();
    let exports = TempDir::new().unwrap();
    let server = inventory_server().await;

    let expected = json!([
        { "type": "Entree", "product": "A1", "quantity": 2 },
        { "type": "Entree", "product": "2002", "quantity": 1 }
    ]);
    Mock::given(method("POST"))
        .and(path("/api/update-inventory"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "updated": 2 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/update-log"))
        .and(body_json(&expected))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = stockscan_cmd(home.path());
    cmd.args(["--api-url", &server.uri()])
        .arg("--export-dir")
        .arg(exports.path())
        .args(["scan", "--no-poll"])
        .write_stdin("A1\nB2\nA1\n2002\n:export\n:quit\n");
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Produit A1 ajouté aux entrées."), "{stderr}");
    assert!(stderr.contains("n'existe pas dans l'inventaire"), "{stderr}");
    assert!(stderr.contains("mis à jour avec succès"), "{stderr}");
    assert!(!stderr.contains("Unexported"), "{stderr}");

    let file = format!("entrees_{}.xlsx", chrono::Local::now().format("%Y-%m-%d"));
    assert!(exports.path().join(&file).exists(), "missing {file}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_scan_empty_export_and_unexported_warning() {
    let home = TempDir::new().unwrap();
    let exports = TempDir::new().unwrap();
    let server = inventory_server().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let mut cmd = stockscan_cmd(home.path());
    cmd.args(["--api-url", &server.uri()])
        .arg("--export-dir")
        .arg(exports.path())
        .args(["scan", "--no-poll", "--mode", "exits"])
        .write_stdin(":export\n:toggle\nA1\n:bogus\n");
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Aucune sortie à exporter."), "{stderr}");
    assert!(stderr.contains("Mode : entrées"), "{stderr}");
    assert!(stderr.contains("Commande inconnue"), "{stderr}");
    assert!(stderr.contains("Unexported scans discarded (entries: 1 units)"), "{stderr}");
    assert_eq!(std::fs::read_dir(exports.path()).unwrap().count(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_validate_prints_reconciliation() {
    let home = TempDir::new().unwrap();
    let server = inventory_server().await;

    let mut cmd = stockscan_cmd(home.path());
    cmd.args(["--api-url", &server.uri(), "-o", "json", "validate", "--no-poll"])
        .write_stdin("A1\nA1\n:toggle\n:quit\n");
    let output = run(cmd).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let rows: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows[0]["product_id"], "A1");
    assert_eq!(rows[0]["validated_count"], 2);
    assert_eq!(rows[0]["difference"], 8);
    assert_eq!(rows[1]["validated_count"], 0);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Produit A1 validé."), "{stderr}");
    assert!(stderr.contains("single bucket"), "{stderr}");
}
