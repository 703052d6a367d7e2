use super::*;
use crate::test_helpers::{analyze, analyze_err, class, user};

#[test]
fn hash_known_values() {
    assert_eq!(class_id_hash("A"), Some(8));
    assert_eq!(class_id_hash("AI"), Some(136));
    assert_eq!(class_id_hash("BA"), Some(136));
    assert_eq!(class_id_hash(""), Some(0));
}

#[test]
fn hash_rejects_foreign_characters() {
    assert_eq!(class_id_hash("Foo$"), None);
    assert_eq!(class_id_hash("a-b"), None);
    assert_eq!(class_id_hash("Über"), None);
}

#[test]
fn hash_stays_within_28_bits() {
    let long = "Abcdefghijklmnopqrstuvwxyz_0123456789>".repeat(8);
    let id = class_id_hash(&long).unwrap();
    assert!(id < (1 << 28));
}

#[test]
fn qualified_name_is_root_first() {
    let session = analyze(vec![
        class("Base", None, &[]),
        class("Mid", Some("Base"), &[]),
        class("Leaf", Some("Mid"), &[]),
    ]);
    let leaf = user(&session, "Leaf").class().unwrap();
    assert_eq!(leaf.class_name, "Base>Mid>Leaf");
    assert_eq!(leaf.class_id, class_id_hash("Base>Mid>Leaf").unwrap());
    assert_eq!(user(&session, "Base").class().unwrap().class_name, "Base");
}

#[test]
fn ids_are_registered() {
    let mut session = analyze(vec![class("Base", None, &[]), class("Leaf", Some("Base"), &[])]);
    for name in ["Base", "Leaf"] {
        let id = session.lookup(name).unwrap();
        let class_id = session.user(id).unwrap().class().unwrap().class_id;
        assert_eq!(session.claim_class_id(class_id, id), Ok(()));
    }
    let (base, leaf) = (session.lookup("Base").unwrap(), session.lookup("Leaf").unwrap());
    let leaf_id = user(&session, "Leaf").class().unwrap().class_id;
    assert_eq!(session.claim_class_id(leaf_id, base), Err(leaf));
    assert_ne!(
        user(&session, "Base").class().unwrap().class_id,
        user(&session, "Leaf").class().unwrap().class_id
    );
}

#[test]
fn colliding_ids_are_rejected() {
    let err = analyze_err(vec![class("AI", None, &[]), class("BA", None, &[])]);
    assert_eq!(err.code(), Some(ErrorCode::E2008));
    assert!(err
        .to_string()
        .contains("duplicate class id 136: `BA` collides with `AI` (test.flat_js:1)"));
}

#[test]
fn unhashable_name_is_rejected() {
    let err = analyze_err(vec![class("Node$", None, &[])]);
    assert_eq!(err.code(), Some(ErrorCode::E2009));
    assert!(err.to_string().contains("`Node$`"));
}
