//! Rule store merges against real files

use std::fs;
use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use prr_core::{ErrorKind, KeyIdentifier, PolicyFlags, RuleStore};
use prr_test_utils::TestProfile;
use prr_test_utils::fixtures::{self, SAMPLE_KEY_IDS};
use rstest::rstest;

const PGPNET: &str = "{pgpnet@groups.io}";

fn ids(raw: &[&str]) -> Vec<KeyIdentifier> {
    raw.iter().map(|s| KeyIdentifier::parse(s).unwrap()).collect()
}

#[test]
fn test_merge_matches_golden_file() {
    let profile = TestProfile::new().with_sample_rules();
    let store = RuleStore::new(profile.rule_store());

    store
        .merge_rule(PGPNET, &ids(&SAMPLE_KEY_IDS), PolicyFlags::ALWAYS)
        .unwrap();

    assert_eq!(profile.read_rules(), fixtures::expected_rules());
}

#[test]
fn test_merge_is_idempotent_byte_for_byte() {
    let profile = TestProfile::new().with_sample_rules();
    let store = RuleStore::new(profile.rule_store());
    let key_ids = ids(&SAMPLE_KEY_IDS);

    store.merge_rule(PGPNET, &key_ids, PolicyFlags::ALWAYS).unwrap();
    let first = profile.read_rules_bytes();
    store.merge_rule(PGPNET, &key_ids, PolicyFlags::ALWAYS).unwrap();

    assert_eq!(profile.read_rules_bytes(), first);
}

#[test]
fn test_merge_into_store_with_only_other_rules() {
    let profile = TestProfile::new().with_rules(
        r#"<?xml version="1.0"?>
<pgpRuleList>
  <pgpRule email="{alice@example.org}" keyId="0x1111111111111111" sign="1" encrypt="1" pgpMime="1" negateRule="0"/>
</pgpRuleList>
"#,
    );
    let store = RuleStore::new(profile.rule_store());

    let written = store
        .merge_rule(
            PGPNET,
            &ids(&["0xAAAAAAAAAAAAAAAA", "0xBBBBBBBBBBBBBBBB"]),
            PolicyFlags::ALWAYS,
        )
        .unwrap();

    let emails: Vec<&str> = written.iter().map(|r| r.email()).collect();
    assert_eq!(emails, vec![PGPNET, "{alice@example.org}"]);
    let governed = written.find(PGPNET).unwrap();
    assert_eq!(governed.key_ids(), "0xAAAAAAAAAAAAAAAA, 0xBBBBBBBBBBBBBBBB");
    assert_eq!(governed.attribute("encrypt"), Some("2"));
    assert_eq!(governed.attribute("sign"), Some("2"));
    assert_eq!(governed.attribute("negateRule"), Some("0"));
    assert_eq!(governed.attribute("pgpMime"), Some("2"));
}

#[test]
fn test_every_duplicate_governed_rule_is_replaced() {
    let profile = TestProfile::new().with_rules(
        r#"<pgpRuleList>
<pgpRule email="{pgpnet@groups.io}" keyId="0x0000000000000001"/>
<pgpRule email="{alice@example.org}"/>
<pgpRule email="{pgpnet@groups.io}" keyId="0x0000000000000002"/>
</pgpRuleList>"#,
    );
    let store = RuleStore::new(profile.rule_store());

    store
        .merge_rule(PGPNET, &ids(&["0xAAAAAAAAAAAAAAAA"]), PolicyFlags::ALWAYS)
        .unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.iter().filter(|r| r.matches(PGPNET)).count(), 1);
    assert_eq!(loaded.rules()[0].key_ids(), "0xAAAAAAAAAAAAAAAA");
    assert_eq!(loaded.len(), 2);
}

#[test]
fn test_empty_key_list_writes_empty_attribute() {
    let profile = TestProfile::new().with_sample_rules();
    let store = RuleStore::new(profile.rule_store());

    store.merge_rule(PGPNET, &[], PolicyFlags::ALWAYS).unwrap();

    assert_eq!(store.load().unwrap().rules()[0].key_ids(), "");
    profile.assert_rules_contain(r#"keyId="""#);
}

#[rstest]
#[case::not_xml("this is not xml")]
#[case::wrong_root("<rules><pgpRule email=\"a\"/></rules>")]
#[case::truncated("<pgpRuleList><pgpRule email=\"a\"/>")]
#[case::empty("")]
fn test_malformed_store_is_left_untouched(#[case] content: &str) {
    let profile = TestProfile::new().with_rules(content);
    let store = RuleStore::new(profile.rule_store());

    let err = store
        .merge_rule(PGPNET, &ids(&["0xAAAAAAAAAAAAAAAA"]), PolicyFlags::ALWAYS)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(profile.read_rules(), content);
}

#[test]
fn test_missing_profile_directory_is_io_error() {
    let profile = TestProfile::new();
    let store = RuleStore::new(profile.root().join("gone").join("pgprules.xml"));

    let err = store.merge_rule(PGPNET, &[], PolicyFlags::ALWAYS).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(!profile.root().join("gone").exists());
}

#[test]
fn test_no_temporary_files_left_behind() {
    let profile = TestProfile::new().with_sample_rules();
    let store = RuleStore::new(profile.rule_store());

    store
        .merge_rule(PGPNET, &ids(&SAMPLE_KEY_IDS), PolicyFlags::ALWAYS)
        .unwrap();

    let leftovers: Vec<String> = fs::read_dir(profile.rule_store().parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "leftover temp files: {:?}", leftovers);
}

#[test]
fn test_concurrent_merges_leave_one_governed_rule() {
    let profile = TestProfile::new().with_sample_rules();
    let store = Arc::new(RuleStore::new(profile.rule_store()));

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let id = format!("0x{:016X}", 0xA0 + i);
                store
                    .merge_rule(PGPNET, &ids(&[id.as_str()]), PolicyFlags::ALWAYS)
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let loaded = store.load().unwrap();
    assert_eq!(loaded.iter().filter(|r| r.matches(PGPNET)).count(), 1);
    assert_eq!(loaded.rules()[0].email(), PGPNET);
    assert_eq!(loaded.len(), 3);
}

#[test]
fn test_other_rules_keep_escaped_line_breaks() {
    let profile = TestProfile::new().with_rules(
        r#"<?xml version="1.0"?>
<pgpRuleList>
  <pgpRule email="{alice@example.org}&#10;{erin@example.org}" keyId="0x1111111111111111&#9;" sign="1" encrypt="1" pgpMime="1" negateRule="0"/>
</pgpRuleList>
"#,
    );
    let store = RuleStore::new(profile.rule_store());

    store
        .merge_rule(PGPNET, &ids(&SAMPLE_KEY_IDS), PolicyFlags::ALWAYS)
        .unwrap();

    let written = profile.read_rules();
    assert!(written.contains(
        r#"<pgpRule email="{alice@example.org}&#10;{erin@example.org}" keyId="0x1111111111111111&#9;""#
    ));
    assert_eq!(written.lines().count(), 5);
    assert_eq!(
        store.load().unwrap().rules()[1].email(),
        "{alice@example.org}\n{erin@example.org}"
    );
}

#[test]
fn test_merge_leaves_only_store_and_lock_file() {
    let profile = TestProfile::new().with_sample_rules();
    let store = RuleStore::new(profile.rule_store());

    store
        .merge_rule(PGPNET, &ids(&SAMPLE_KEY_IDS), PolicyFlags::ALWAYS)
        .unwrap();

    let mut names: Vec<String> = fs::read_dir(profile.rule_store().parent().unwrap())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["pgprules.xml", "pgprules.xml.lock"]);
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::{PermissionsExt, symlink};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_merge_keeps_private_store_private() {
        let profile = TestProfile::new().with_sample_rules();
        let path = profile.rule_store();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();

        RuleStore::new(&path)
            .merge_rule(PGPNET, &ids(&SAMPLE_KEY_IDS), PolicyFlags::ALWAYS)
            .unwrap();

        assert_eq!(fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o600);
        assert_eq!(profile.read_rules(), fixtures::expected_rules());
    }

    #[test]
    fn test_merge_through_symlinked_store() {
        let profile = TestProfile::new();
        let real = profile.root().join("synced").join("pgprules.xml");
        fs::create_dir_all(real.parent().unwrap()).unwrap();
        fs::write(&real, fixtures::sample_rules()).unwrap();
        let link = profile.rule_store();
        fs::create_dir_all(link.parent().unwrap()).unwrap();
        symlink(&real, &link).unwrap();

        RuleStore::new(&link)
            .merge_rule(PGPNET, &ids(&SAMPLE_KEY_IDS), PolicyFlags::ALWAYS)
            .unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(&real).unwrap(), fixtures::expected_rules());
    }
}
