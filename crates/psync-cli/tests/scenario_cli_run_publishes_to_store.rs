//! Live `psync run` against a mock store: managed skus are updated by id,
//! unknown skus are created, overridden skus are left alone, and the run
//! state is written afterwards.

use assert_cmd::Command;
use httpmock::prelude::*;
use serde_json::{json, Value};

const MEGASUR: &str = "EAN;NAME;DESCRIPTION;STOCK_DISPONIBLE;PVD;URL_IMG;ID_FAMILIA;FAMILIA;ID_SUBFAMILIA;SUBFAMILIA\n\
    100;Teclado;Teclado USB;2;12,50;;;;;\n\
    200;Raton;Raton USB;5;8,00;;;;;\n\
    300;Altavoz;Altavoz;3;20,00;;;;;\n";

#[test]
fn cli_run_publishes_plan_and_saves_state() -> anyhow::Result<()> {
    let server = MockServer::start();
    let page1 = server.mock(|when, then| {
        when.method(GET)
            .path("/wp-json/wc/v3/products")
            .query_param("page", "1");
        then.status(200).json_body(json!([
            { "id": 7, "sku": "100", "tags": [{ "id": 790, "name": "bot", "slug": "bot" }] },
            { "id": 9, "sku": "300", "tags": [] }
        ]));
    });
    let page2 = server.mock(|when, then| {
        when.method(GET)
            .path("/wp-json/wc/v3/products")
            .query_param("page", "2");
        then.status(200).json_body(json!([]));
    });
    let update = server.mock(|when, then| {
        when.method(POST)
            .path("/wp-json/wc/v3/products/batch")
            .body_contains("\"update\"")
            .body_contains("\"id\":7");
        then.status(200).json_body(json!({ "update": [{ "id": 7 }] }));
    });
    let create = server.mock(|when, then| {
        when.method(POST)
            .path("/wp-json/wc/v3/products/batch")
            .body_contains("\"create\"")
            .body_contains("\"sku\":\"200\"");
        then.status(200).json_body(json!({ "create": [{ "id": 11 }] }));
    });

    let dir = tempfile::tempdir()?;
    let root = dir.path();
    let work = root.join("work");
    std::fs::create_dir_all(&work)?;
    std::fs::write(work.join("megasur.csv"), MEGASUR)?;
    std::fs::write(root.join("allow.csv"), "100\n200\n300\n")?;
    let state = root.join("state").join("psync-state.json");

    let config = root.join("psync.yaml");
    std::fs::write(
        &config,
        format!(
            "dryrun: false\n\
             work_dir: '{work}'\n\
             state_path: '{state}'\n\
             batch_size: 10\n\
             sources:\n\
             \x20 - name: megasur\n\
             \x20   type: endpoint\n\
             \x20   download_url: 'http://127.0.0.1:9/megasur.csv'\n\
             allow_list:\n\
             \x20 path: '{allow}'\n\
             destination:\n\
             \x20 base_url: '{base}'\n\
             \x20 page_size: 50\n",
            work = work.display(),
            state = state.display(),
            allow = root.join("allow.csv").display(),
            base = server.base_url(),
        ),
    )?;

    Command::cargo_bin("psync")?
        .current_dir(root)
        .env("RUST_LOG", "info")
        .env("WOO_CONSUMER_KEY", "key-for-tests")
        .env("WOO_CONSUMER_SECRET", "secret-for-tests")
        .arg("run")
        .arg("--config")
        .arg(&config)
        .arg("--use-local")
        .assert()
        .success();

    page1.assert();
    page2.assert();
    update.assert();
    create.assert();

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&state)?)?;
    assert!(saved["last_check"].as_str().is_some_and(|s| !s.is_empty()));
    assert!(!work.join("megasur.csv").exists());
    Ok(())
}
