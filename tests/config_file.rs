use docs_search::config::{load_config, load_config_or_default};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_full_config() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("docs-search.toml");
    fs::write(
        &path,
        r#"
[server]
bind = "0.0.0.0:8080"

[embedding]
model = "text-embedding-3-large"
timeout_secs = 5

[index]
timeout_secs = 3

[search]
default_top_k = 3
max_top_k = 10
description_chars = 80
"#,
    )
    .unwrap();

    let cfg = load_config(&path).unwrap();
    assert_eq!(cfg.embedding.model, "text-embedding-3-large");
    assert_eq!(cfg.embedding.timeout_secs, 5);
    assert_eq!(cfg.index.timeout_secs, 3);
    assert_eq!(cfg.search.default_top_k, 3);
    assert_eq!(cfg.search.max_top_k, 10);
    assert_eq!(cfg.search.description_chars, 80);
    assert_eq!(cfg.search.min_query_chars, 2);
}

#[test]
fn test_invalid_limits_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("docs-search.toml");
    fs::write(
        &path,
        r#"
[search]
default_top_k = 20
max_top_k = 10
"#,
    )
    .unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("max_top_k"), "got: {}", err);
}

#[test]
fn test_unparseable_file_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("docs-search.toml");
    fs::write(&path, "[search\ndefault_top_k = ").unwrap();
    assert!(load_config(&path).is_err());
}

#[test]
fn test_missing_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("absent.toml");

    assert!(load_config(&path).is_err());

    let cfg = load_config_or_default(&path).unwrap();
    assert_eq!(cfg.search.default_top_k, 5);
    assert_eq!(cfg.search.description_chars, 150);
}
