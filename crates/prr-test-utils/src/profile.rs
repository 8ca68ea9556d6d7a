//! [`TestProfile`] builder for synchronization scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::fixtures;

/// A scratch directory laid out like a mail profile plus local copies of
/// the roster and key bundle.
///
/// # Example
///
/// ```rust,no_run
/// use prr_test_utils::TestProfile;
///
/// let profile = TestProfile::new().with_sample_rules();
/// let membership = profile.write_source("membership.txt", "group pgpnet@groups.io=\n");
/// profile.assert_rules_contain("{pgpnet@groups.io}");
/// ```
pub struct TestProfile {
    temp_dir: TempDir,
}

impl Default for TestProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl TestProfile {
    /// Create an empty scratch directory with a `profile/` subdirectory.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("profile")).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Where the rule store lives, whether or not it has been written.
    pub fn rule_store(&self) -> PathBuf {
        self.root().join("profile").join("pgprules.xml")
    }

    pub fn with_rules(self, xml: &str) -> Self {
        fs::write(self.rule_store(), xml).unwrap();
        self
    }

    pub fn with_sample_rules(self) -> Self {
        let rules = fixtures::sample_rules();
        self.with_rules(&rules)
    }

    /// Write a source file and return a URL for it.
    pub fn write_source(&self, name: &str, content: &str) -> String {
        let path = self.root().join(name);
        fs::write(&path, content).unwrap();
        file_url(&path)
    }

    /// Write the sample roster and key bundle; returns `(membership, keys)` URLs.
    pub fn write_sample_sources(&self) -> (String, String) {
        (
            self.write_source("membership.txt", &fixtures::sample_membership()),
            self.write_source("keys.asc", &fixtures::sample_keys()),
        )
    }

    pub fn read_rules(&self) -> String {
        fs::read_to_string(self.rule_store()).unwrap()
    }

    pub fn read_rules_bytes(&self) -> Vec<u8> {
        fs::read(self.rule_store()).unwrap()
    }

    /// # Panics
    /// Panics if the rule store does not contain `content`.
    pub fn assert_rules_contain(&self, content: &str) {
        let rules = self.read_rules();
        assert!(
            rules.contains(content),
            "Expected rule store to contain '{}'\nActual:\n{}",
            content,
            rules
        );
    }

    /// Install a fake key-management program under `bin/`.
    #[cfg(unix)]
    pub fn fake_gpg(&self, exit_code: i32, stderr: &str) -> FakeGpg {
        FakeGpg::install(&self.root().join("bin"), exit_code, stderr)
    }
}

/// `file://` URL on unix, plain path elsewhere.
pub fn file_url(path: &Path) -> String {
    if cfg!(unix) {
        format!("file://{}", path.display())
    } else {
        path.display().to_string()
    }
}

/// A shell script standing in for gpg. It records its arguments and stdin
/// next to itself and exits with a fixed code.
pub struct FakeGpg {
    program: PathBuf,
    dir: PathBuf,
}

impl FakeGpg {
    #[cfg(unix)]
    pub fn install(dir: &Path, exit_code: i32, stderr: &str) -> Self {
        use std::io::Write;
        use std::os::unix::fs::PermissionsExt;

        fs::create_dir_all(dir).unwrap();
        let program = dir.join("gpg");
        let script = format!(
            "#!/bin/sh\necho \"$@\" > '{dir}/args'\ncat > '{dir}/stdin'\nprintf '%s' '{stderr}' >&2\nexit {exit_code}\n",
            dir = dir.display(),
            stderr = stderr.replace('\'', ""),
            exit_code = exit_code,
        );

        {
            let mut file = fs::File::create(&program).unwrap();
            file.write_all(script.as_bytes()).unwrap();
            file.sync_all().unwrap();
        }
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();

        Self {
            program,
            dir: dir.to_path_buf(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn was_called(&self) -> bool {
        self.dir.join("args").exists()
    }

    /// Arguments of the last call, space separated.
    pub fn args(&self) -> Option<String> {
        fs::read_to_string(self.dir.join("args"))
            .ok()
            .map(|s| s.trim_end().to_string())
    }

    /// Bytes received on stdin in the last call.
    pub fn stdin(&self) -> Option<String> {
        fs::read_to_string(self.dir.join("stdin")).ok()
    }
}
