//! Local-file pipeline through the binary: `merge`, `run --dryrun` and
//! `plan --sink memory` over a supplier file already in the work dir.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

const MEGASUR: &str = "EAN;NAME;DESCRIPTION;STOCK_DISPONIBLE;PVD;URL_IMG;ID_FAMILIA;FAMILIA;ID_SUBFAMILIA;SUBFAMILIA\n\
    100;Teclado;Teclado USB;2;12,50;https://img.example/100.jpg;1;Perifericos;;\n\
    200;Raton;Raton USB;5;8,00;;;;;\n\
    300;Altavoz;Altavoz;3;20,00;;;;;\n\
    400;Monitor;Monitor;0;99,00;;;;;\n";

struct Fixture {
    _dir: tempfile::TempDir,
    root: PathBuf,
    config: PathBuf,
}

impl Fixture {
    fn new() -> anyhow::Result<Self> {
        let dir = tempfile::tempdir()?;
        let root = dir.path().to_path_buf();
        let work = root.join("work");
        std::fs::create_dir_all(&work)?;
        std::fs::write(work.join("megasur.csv"), MEGASUR)?;
        // 300 is not listed; 400 has no stock.
        std::fs::write(root.join("allow.csv"), "100\n200\n400\n")?;

        let config = root.join("psync.yaml");
        std::fs::write(
            &config,
            format!(
                "work_dir: '{work}'\n\
                 output_path: '{out}'\n\
                 state_path: '{state}'\n\
                 sources:\n\
                 \x20 - name: megasur\n\
                 \x20   type: endpoint\n\
                 \x20   download_url: 'http://127.0.0.1:9/megasur.csv'\n\
                 differential_price:\n\
                 \x20 inf: 2.0\n\
                 allow_list:\n\
                 \x20 path: '{allow}'\n",
                work = work.display(),
                out = root.join("out").join("products.json").display(),
                state = root.join("state.json").display(),
                allow = root.join("allow.csv").display(),
            ),
        )?;
        Ok(Self {
            _dir: dir,
            root,
            config,
        })
    }

    fn psync(&self) -> anyhow::Result<Command> {
        let mut cmd = Command::cargo_bin("psync")?;
        cmd.current_dir(&self.root)
            .env("RUST_LOG", "info")
            .env_remove("WOO_CONSUMER_KEY")
            .env_remove("WOO_CONSUMER_SECRET");
        Ok(cmd)
    }

    fn source_file(&self) -> PathBuf {
        self.root.join("work").join("megasur.csv")
    }
}

fn read_products(path: &Path) -> anyhow::Result<Vec<Value>> {
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}

#[test]
fn cli_merge_writes_filtered_tiered_products() -> anyhow::Result<()> {
    let fx = Fixture::new()?;
    let out = fx.root.join("merged.json");

    fx.psync()?
        .arg("merge")
        .arg("--config")
        .arg(&fx.config)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("products=2"));

    let products = read_products(&out)?;
    let skus: Vec<&str> = products.iter().filter_map(|p| p["sku"].as_str()).collect();
    assert_eq!(skus, vec!["100", "200"]);
    assert_eq!(products[0]["regular_price"], 25.0);
    assert_eq!(products[0]["name"], "Teclado");
    assert_eq!(products[0]["tags"][0]["id"], 790);

    // merge never removes its inputs
    assert!(fx.source_file().exists());
    Ok(())
}

#[test]
fn cli_dry_run_writes_output_and_cleans_up() -> anyhow::Result<()> {
    let fx = Fixture::new()?;

    fx.psync()?
        .arg("run")
        .arg("--config")
        .arg(&fx.config)
        .arg("--dryrun")
        .arg("--use-local")
        .assert()
        .success();

    let products = read_products(&fx.root.join("out").join("products.json"))?;
    assert_eq!(products.len(), 2);
    assert!(!fx.source_file().exists());
    assert!(!fx.root.join("state.json").exists());
    Ok(())
}

#[test]
fn cli_dry_run_no_cleanup_keeps_source_files() -> anyhow::Result<()> {
    let fx = Fixture::new()?;

    fx.psync()?
        .arg("run")
        .arg("--config")
        .arg(&fx.config)
        .arg("--use-local")
        .arg("--no-cleanup")
        .assert()
        .success();

    // dryrun defaults to true
    assert!(fx.root.join("out").join("products.json").exists());
    assert!(fx.source_file().exists());
    Ok(())
}

#[test]
fn cli_live_run_without_secrets_fails() -> anyhow::Result<()> {
    let fx = Fixture::new()?;

    fx.psync()?
        .arg("run")
        .arg("--config")
        .arg(&fx.config)
        .arg("--no-dryrun")
        .arg("--use-local")
        .arg("--no-cleanup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SECRETS_MISSING"));

    assert!(!fx.root.join("state.json").exists());
    Ok(())
}

#[test]
fn cli_plan_against_empty_memory_sink_creates_everything() -> anyhow::Result<()> {
    let fx = Fixture::new()?;

    fx.psync()?
        .arg("plan")
        .arg("--config")
        .arg(&fx.config)
        .arg("--sink")
        .arg("memory")
        .arg("--use-local")
        .arg("--no-cleanup")
        .assert()
        .success()
        .stdout(predicate::str::contains("create=2"))
        .stdout(predicate::str::contains("update=0"))
        .stdout(predicate::str::contains("skip=0"));
    Ok(())
}
