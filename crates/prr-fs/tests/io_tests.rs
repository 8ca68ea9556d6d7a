use prr_fs::{RobustnessConfig, io};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("test.txt");

    io::write_atomic(&path, b"hello world", RobustnessConfig::default()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "hello world");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("test.txt");
    fs::write(&path, "original").unwrap();

    io::write_atomic(&path, b"updated", RobustnessConfig::default()).unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "updated");
}

#[test]
fn test_write_atomic_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pgprules.xml");

    io::write_atomic(&path, b"<pgpRuleList/>", RobustnessConfig::default()).unwrap();

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {:?}", leftovers);
}

#[test]
fn test_write_atomic_creates_parent_dirs() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("deeper").join("file.txt");

    io::write_atomic(&path, b"content", RobustnessConfig::default()).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "content");
}

#[test]
fn test_read_text_existing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("test.txt");
    fs::write(&path, "hello").unwrap();

    let content = io::read_text(&path).unwrap();
    assert_eq!(content, "hello");
}

#[test]
fn test_read_text_nonexistent_file() {
    let temp = TempDir::new().unwrap();
    let result = io::read_text(&temp.path().join("missing.txt"));
    assert!(matches!(result, Err(prr_fs::Error::Io { .. })));
}

#[test]
fn test_read_text_or_empty_missing_file() {
    let temp = TempDir::new().unwrap();
    let content = io::read_text_or_empty(&temp.path().join("gpg.conf")).unwrap();
    assert!(content.is_empty());
}

#[test]
fn test_write_locked_keeps_lock_across_read_and_write() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("doc.txt");
    fs::write(&path, "1").unwrap();

    let lock = prr_fs::FileLock::acquire(&path, std::time::Duration::from_secs(1)).unwrap();
    let current: u32 = io::read_text(&path).unwrap().trim().parse().unwrap();
    io::write_locked(&lock, (current + 1).to_string().as_bytes(), RobustnessConfig::default())
        .unwrap();
    drop(lock);

    assert_eq!(fs::read_to_string(&path).unwrap(), "2");
}

#[test]
fn test_lock_file_stays_next_to_target_and_is_released() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("pgprules.xml");

    io::write_atomic(&path, b"<pgpRuleList/>", RobustnessConfig::default()).unwrap();

    let mut names: Vec<String> = fs::read_dir(temp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["pgprules.xml", "pgprules.xml.lock"]);
    assert_eq!(io::lock_path(&path), temp.path().join("pgprules.xml.lock"));

    let relock = prr_fs::FileLock::acquire(&path, std::time::Duration::from_millis(50));
    assert!(relock.is_ok());
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::{PermissionsExt, symlink};

    fn mode(path: &std::path::Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[test]
    fn test_rewrite_keeps_existing_mode() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pgprules.xml");
        fs::write(&path, "<pgpRuleList/>").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        io::write_atomic(&path, b"<pgpRuleList></pgpRuleList>", RobustnessConfig::default())
            .unwrap();

        assert_eq!(mode(&path), 0o600);
        assert_eq!(fs::read_to_string(&path).unwrap(), "<pgpRuleList></pgpRuleList>");
    }

    #[test]
    fn test_rewrite_keeps_wider_mode_too() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gpg.conf");
        fs::write(&path, "use-agent\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).unwrap();

        io::write_atomic(&path, b"no-greeting\n", RobustnessConfig::default()).unwrap();

        assert_eq!(mode(&path), 0o640);
    }

    #[test]
    fn test_new_file_is_private() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gpg.conf");

        io::write_atomic(&path, b"use-agent\n", RobustnessConfig::default()).unwrap();

        assert_eq!(mode(&path) & 0o077, 0);
    }

    #[test]
    fn test_symlinked_target_is_written_through() {
        let temp = TempDir::new().unwrap();
        let real_dir = temp.path().join("real");
        fs::create_dir(&real_dir).unwrap();
        let real = real_dir.join("real.xml");
        fs::write(&real, "old").unwrap();
        let link = temp.path().join("pgprules.xml");
        symlink(&real, &link).unwrap();

        io::write_atomic(&link, b"new", RobustnessConfig::default()).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), "new");
        assert!(real_dir.join("real.xml.lock").exists());
        let temp_files: Vec<_> = fs::read_dir(&real_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(temp_files.is_empty());
    }

    #[test]
    fn test_create_private_dir_sets_owner_only_mode() {
        let temp = TempDir::new().unwrap();
        let home = temp.path().join("newhome").join(".gnupg");

        io::create_private_dir(&home).unwrap();

        assert_eq!(mode(&home), 0o700);
        // existing directories are accepted
        io::create_private_dir(&home).unwrap();
    }
}
