use assert_cmd::Command;
use predicates::prelude::*;

/// `psync config-hash` prints the hash line then the canonical JSON, and the
/// hash does not depend on key order in the YAML.
#[test]
fn cli_config_hash_is_order_independent() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let a = dir.path().join("a.yaml");
    let b = dir.path().join("b.yaml");
    std::fs::write(&a, "tax: 0.21\nwork_dir: 'work'\nbatch_size: 50\n")?;
    std::fs::write(&b, "batch_size: 50\ntax: 0.21\nwork_dir: 'work'\n")?;

    let run = |path: &std::path::Path| -> anyhow::Result<String> {
        let out = Command::cargo_bin("psync")?
            .arg("config-hash")
            .arg(path)
            .output()?;
        assert!(out.status.success());
        Ok(String::from_utf8(out.stdout)?)
    };

    let first = run(&a)?;
    let second = run(&b)?;
    assert_eq!(first, second);

    let mut lines = first.lines();
    let hash_line = lines.next().unwrap_or_default();
    let hash = hash_line.strip_prefix("config_hash=").unwrap_or_default();
    assert_eq!(hash.len(), 64);
    assert_eq!(
        lines.next(),
        Some(r#"{"batch_size":50,"tax":0.21,"work_dir":"work"}"#)
    );
    Ok(())
}

#[test]
fn cli_config_hash_rejects_secret_literals() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("leaky.yaml");
    std::fs::write(&path, "destination:\n  consumer_key: 'ck_0123456789abcdef'\n")?;

    Command::cargo_bin("psync")?
        .arg("config-hash")
        .arg(&path)
        .env("RUST_LOG", "info")
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_SECRET_DETECTED"))
        .stdout(predicate::str::contains("config_hash=").not());
    Ok(())
}
