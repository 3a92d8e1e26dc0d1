use psync_config::{load_layered_yaml_from_strings, report_unused_keys, RunMode, UnusedKeyPolicy};

/// Unused keys are reported under Warn, fatal under Fail, nested keys under a
/// consumed prefix are never flagged, and ordering is deterministic.

const YAML: &str = r#"
dryrun: false
sources:
  - name: mcr
    type: endpoint
    download_url: "https://feeds.example/mcr.csv"
destination:
  base_url: "https://shop.example"
  page_size: 50
legacy_ftp_host: "ftp.example"
skus_doc_url: "https://docs.example/d/abc"
"#;

#[test]
fn warn_mode_reports_unused_keys_without_error() {
    let loaded = load_layered_yaml_from_strings(&[YAML]).expect("config load must succeed");
    let report =
        report_unused_keys(RunMode::Run, &loaded.config_json, UnusedKeyPolicy::Warn).unwrap();

    assert_eq!(
        report.unused_leaf_pointers,
        vec!["/legacy_ftp_host".to_string(), "/skus_doc_url".to_string()]
    );
}

#[test]
fn fail_mode_errors_on_unused_keys() {
    let loaded = load_layered_yaml_from_strings(&[YAML]).expect("config load must succeed");
    let err = report_unused_keys(RunMode::Run, &loaded.config_json, UnusedKeyPolicy::Fail)
        .unwrap_err();
    assert!(format!("{err:?}").contains("CONFIG_UNUSED_KEYS"));
}

#[test]
fn merge_mode_does_not_consume_destination() {
    let loaded = load_layered_yaml_from_strings(&[YAML]).expect("config load must succeed");
    let report =
        report_unused_keys(RunMode::Merge, &loaded.config_json, UnusedKeyPolicy::Warn).unwrap();

    assert!(report
        .unused_leaf_pointers
        .contains(&"/destination/page_size".to_string()));
    assert!(report.unused_leaf_pointers.contains(&"/dryrun".to_string()));
    assert!(!report
        .unused_leaf_pointers
        .iter()
        .any(|p| p.starts_with("/sources")));
}
