use pretty_assertions::assert_eq;

use super::*;
use crate::test_helpers::{analyze, analyze_err, class, method, user, with_virtual};
use crate::UserDefn;

fn class_id(session: &Session, name: &str) -> u32 {
    user(session, name).class().unwrap().class_id
}

fn vtable<'a>(session: &'a Session, name: &str) -> &'a [Virtual] {
    &user(session, name).class().unwrap().vtable
}

fn chain() -> Vec<UserDefn> {
    vec![
        with_virtual(class("Base", None, &[]), "area"),
        class("Mid", Some("Base"), &[]),
        with_virtual(class("Leaf", Some("Mid"), &[]), "area"),
    ]
}

#[test]
fn impl_names() {
    assert_eq!(impl_name("Shape", "area"), "Shape.area_impl");
}

#[test]
fn root_dispatches_whole_subtree() {
    let session = analyze(chain());
    let (base, mid, leaf) = (
        class_id(&session, "Base"),
        class_id(&session, "Mid"),
        class_id(&session, "Leaf"),
    );
    let table = vtable(&session, "Base");
    assert_eq!(table.len(), 1);
    assert_eq!(table[0].name, "area");
    assert_eq!(
        table[0].reverse_cases,
        vec![
            ("Base.area_impl".to_string(), vec![base, mid]),
            ("Leaf.area_impl".to_string(), vec![leaf]),
        ]
    );
    assert_eq!(table[0].default, None);
}

#[test]
fn inherited_name_gets_base_default() {
    let session = analyze(chain());
    let leaf = class_id(&session, "Leaf");
    let table = vtable(&session, "Mid");
    assert_eq!(table.len(), 1);
    assert_eq!(
        table[0].reverse_cases,
        vec![("Leaf.area_impl".to_string(), vec![leaf])]
    );
    assert_eq!(table[0].default.as_deref(), Some("Base.area_impl"));
}

#[test]
fn overriding_leaf_has_no_default() {
    let session = analyze(chain());
    let leaf = class_id(&session, "Leaf");
    let table = vtable(&session, "Leaf");
    assert_eq!(
        table[0].reverse_cases,
        vec![("Leaf.area_impl".to_string(), vec![leaf])]
    );
    assert_eq!(table[0].default, None);
}

#[test]
fn subtree_is_preorder_in_registration_order() {
    let session = analyze(vec![
        with_virtual(class("Base", None, &[]), "run"),
        class("A", Some("Base"), &[]),
        class("B", Some("Base"), &[]),
        class("A1", Some("A"), &[]),
    ]);
    let ids: Vec<u32> = ["Base", "A", "A1", "B"]
        .iter()
        .map(|name| class_id(&session, name))
        .collect();
    let table = vtable(&session, "Base");
    assert_eq!(table[0].reverse_cases, vec![("Base.run_impl".to_string(), ids)]);
}

#[test]
fn virtual_declared_below_is_not_visible_above() {
    let session = analyze(vec![
        class("Base", None, &[]),
        with_virtual(class("Derived", Some("Base"), &[]), "draw"),
    ]);
    assert!(vtable(&session, "Base").is_empty());
    assert_eq!(vtable(&session, "Derived").len(), 1);
}

#[test]
fn signature_comes_from_nearest_declaration() {
    let mut base = class("Base", None, &[]);
    base.add_method(method(MethodKind::Virtual, "step", &["dt"]));
    let mut derived = class("Derived", Some("Base"), &[]);
    derived.add_method(method(MethodKind::Virtual, "step", &["delta"]));
    let session = analyze(vec![base, derived]);
    assert_eq!(vtable(&session, "Derived")[0].signature.as_slice(), ["delta"]);
    assert_eq!(vtable(&session, "Base")[0].signature.as_slice(), ["dt"]);
}

#[test]
fn several_virtuals_keep_declaration_order() {
    let base = with_virtual(with_virtual(class("Base", None, &[]), "a"), "b");
    let derived = with_virtual(class("Derived", Some("Base"), &[]), "c");
    let session = analyze(vec![base, derived]);
    let names: Vec<&str> = vtable(&session, "Derived")
        .iter()
        .map(|v| v.name.as_str())
        .collect();
    assert_eq!(names, vec!["c", "a", "b"]);
}

#[test]
fn plain_method_shadowing_virtual_is_rejected() {
    let mut derived = class("Derived", Some("Base"), &[]);
    derived.add_method(method(MethodKind::NonVirtual, "area", &[]));
    let err = analyze_err(vec![with_virtual(class("Base", None, &[]), "area"), derived]);
    assert_eq!(err.code(), Some(ErrorCode::E2011));
    assert!(err.to_string().contains("overrides virtual `Base.area`"));
}

#[test]
fn unrelated_plain_method_is_fine() {
    let mut derived = class("Derived", Some("Base"), &[]);
    derived.add_method(method(MethodKind::NonVirtual, "helper", &[]));
    let session = analyze(vec![with_virtual(class("Base", None, &[]), "area"), derived]);
    assert_eq!(vtable(&session, "Derived")[0].default.as_deref(), Some("Base.area_impl"));
}

#[test]
fn structs_have_no_vtable() {
    let session = analyze(vec![crate::test_helpers::strukt("S", &[("x", "int32")])]);
    assert!(user(&session, "S").class().is_none());
}
