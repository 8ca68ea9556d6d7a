use pretty_assertions::assert_eq;
use prr_fs::config::load_config;
use rstest::rstest;
use serde::Deserialize;
use std::fs;
use tempfile::TempDir;

#[derive(Debug, Deserialize, PartialEq)]
struct TestConfig {
    address: String,
    timeout: u64,
}

#[rstest]
#[case("config.toml", "address = \"list@example.org\"\ntimeout = 42\n")]
#[case("config.json", r#"{"address": "list@example.org", "timeout": 42}"#)]
#[case("config.yaml", "address: list@example.org\ntimeout: 42\n")]
#[case("config.YML", "address: list@example.org\ntimeout: 42\n")]
fn test_load_by_extension(#[case] name: &str, #[case] content: &str) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(name);
    fs::write(&path, content).unwrap();

    let config: TestConfig = load_config(&path).unwrap();

    assert_eq!(
        config,
        TestConfig {
            address: "list@example.org".into(),
            timeout: 42,
        }
    );
}

#[test]
fn test_unsupported_extension_checked_before_reading() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing.ini");

    let result: prr_fs::Result<TestConfig> = load_config(&path);
    match result {
        Err(prr_fs::Error::UnsupportedFormat { extension }) => assert_eq!(extension, "ini"),
        other => panic!("expected UnsupportedFormat, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let temp = TempDir::new().unwrap();
    let result: prr_fs::Result<TestConfig> = load_config(&temp.path().join("config.toml"));
    assert!(matches!(result, Err(prr_fs::Error::Io { .. })));
}

#[test]
fn test_parse_error_mentions_path_and_format() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");
    fs::write(&path, "{\"address\": ").unwrap();

    let err = load_config::<TestConfig>(&path).unwrap_err();
    assert!(matches!(err, prr_fs::Error::ConfigParse { .. }));
    let message = err.to_string();
    assert!(message.contains("config.json"));
    assert!(message.contains("JSON"));
}
