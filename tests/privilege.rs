// tests/privilege.rs

use std::io;

use paladin::errors::{IdentityKind, LaunchError};
use paladin::privilege::mock::StaticIdentity;
use paladin::privilege::{resolve_credentials, Credentials, SystemIdentity};

#[test]
fn empty_names_inherit_the_supervisor_ids() {
    let creds = resolve_credentials(&StaticIdentity::new(), "", "  ").unwrap();
    assert!(creds.is_inherited());
    assert_eq!(creds, Credentials::default());
    assert_eq!(creds.ids(), (0, 0));
}

#[test]
fn names_resolve_through_the_lookup() {
    let lookup = StaticIdentity::new()
        .with_user("www", 33)
        .with_group("www-data", 34);

    let creds = resolve_credentials(&lookup, "www", "www-data").unwrap();
    assert_eq!(creds.uid, Some(33));
    assert_eq!(creds.gid, Some(34));
    assert!(!creds.is_inherited());
}

#[test]
fn only_group_set_keeps_uid_inherited() {
    let lookup = StaticIdentity::new().with_group("staff", 50);

    let creds = resolve_credentials(&lookup, "", "staff").unwrap();
    assert_eq!(creds.uid, None);
    assert_eq!(creds.gid, Some(50));
    assert_eq!(creds.ids(), (0, 50));
}

#[test]
fn numeric_names_bypass_the_lookup() {
    let creds = resolve_credentials(&StaticIdentity::new(), "1000", "0").unwrap();
    assert_eq!(creds.uid, Some(1000));
    assert_eq!(creds.gid, Some(0));
}

#[test]
fn out_of_range_numeric_id_is_a_parse_error() {
    let err = resolve_credentials(&StaticIdentity::new(), "99999999999", "").unwrap_err();
    match err {
        LaunchError::Parse { kind, name, .. } => {
            assert_eq!(kind, IdentityKind::User);
            assert_eq!(name, "99999999999");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn unknown_name_is_a_lookup_error_without_source() {
    let err = resolve_credentials(&StaticIdentity::new(), "", "nogroup-paladin").unwrap_err();
    match err {
        LaunchError::Lookup { kind, name, source } => {
            assert_eq!(kind, IdentityKind::Group);
            assert_eq!(name, "nogroup-paladin");
            assert!(source.is_none());
        }
        other => panic!("expected lookup error, got {other:?}"),
    }
}

#[test]
fn unreadable_database_is_a_lookup_error_with_source() {
    let lookup = StaticIdentity::new().failing(io::ErrorKind::PermissionDenied);

    let err = resolve_credentials(&lookup, "www", "").unwrap_err();
    match err {
        LaunchError::Lookup {
            source: Some(source),
            ..
        } => assert_eq!(source.kind(), io::ErrorKind::PermissionDenied),
        other => panic!("expected lookup error with source, got {other:?}"),
    }
    assert!(!LaunchError::Lookup {
        kind: IdentityKind::User,
        name: "www".into(),
        source: None,
    }
    .is_runtime());
}

#[test]
fn system_lookup_knows_root() {
    let creds = resolve_credentials(&SystemIdentity, "root", "").unwrap();
    assert_eq!(creds.uid, Some(0));
}
