use std::fs;

use pretty_assertions::assert_eq;
use prr_core::gpgconf::{PREFERENCES, apply_preferences};
use prr_fs::RobustnessConfig;
use tempfile::TempDir;

#[test]
fn test_apply_creates_missing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join(".gnupg").join("gpg.conf");

    let changed = apply_preferences(&path, RobustnessConfig::default()).unwrap();

    assert!(changed);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        format!("{}\n", PREFERENCES.join("\n"))
    );
}

#[test]
fn test_apply_keeps_other_options() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("gpg.conf");
    fs::write(
        &path,
        "use-agent\npersonal-cipher-preferences AES\n\n   keyid-format 0xlong   \n",
    )
    .unwrap();

    apply_preferences(&path, RobustnessConfig::default()).unwrap();

    let lines: Vec<String> = fs::read_to_string(&path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    assert_eq!(&lines[..2], &["use-agent", "keyid-format 0xlong"]);
    assert_eq!(&lines[2..], &PREFERENCES);
}

#[test]
fn test_second_apply_changes_nothing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("gpg.conf");
    fs::write(&path, "no-greeting\n").unwrap();

    assert!(apply_preferences(&path, RobustnessConfig::default()).unwrap());
    let first = fs::read(&path).unwrap();
    assert!(!apply_preferences(&path, RobustnessConfig::default()).unwrap());
    assert_eq!(fs::read(&path).unwrap(), first);
}

#[cfg(unix)]
#[test]
fn test_missing_gnupg_home_is_created_private() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let home = temp.path().join("newhome").join(".gnupg");
    let path = home.join("gpg.conf");

    apply_preferences(&path, RobustnessConfig::default()).unwrap();

    let mode = |p: &std::path::Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode(&home), 0o700);
    assert_eq!(mode(&path) & 0o077, 0);
}

#[cfg(unix)]
#[test]
fn test_existing_gpg_conf_keeps_its_mode() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("gpg.conf");
    fs::write(&path, "use-agent\n").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

    assert!(apply_preferences(&path, RobustnessConfig::default()).unwrap());

    assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o600);
}
