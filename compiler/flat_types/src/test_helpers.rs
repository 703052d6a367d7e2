//! Builders shared by the unit tests of every pass.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use flat_diagnostic::CompileError;

use crate::{Method, MethodKind, Prop, Qual, Session, Signature, UserDefn};

/// Field from a compact descriptor: `int32`, `int32.atomic`, `Vec3.Array`.
fn prop(name: &str, desc: &str, line: u32) -> Prop {
    let mut parts = desc.split('.');
    let mut prop = Prop::new(name, parts.next().unwrap(), line);
    for part in parts {
        match part {
            "Array" => prop = prop.array(),
            qual => prop = prop.with_qual(Qual::from_keyword(qual).unwrap()),
        }
    }
    prop
}

pub(crate) fn strukt(name: &str, fields: &[(&str, &str)]) -> UserDefn {
    let mut defn = UserDefn::new_struct(name, "test.flat_js", 1);
    for (line, (field, desc)) in (2..).zip(fields) {
        defn.props.push(prop(field, desc, line));
    }
    defn
}

pub(crate) fn class(name: &str, base: Option<&str>, fields: &[(&str, &str)]) -> UserDefn {
    let mut defn = UserDefn::new_class(name, base.map(str::to_string), "test.flat_js", 1);
    for (line, (field, desc)) in (2..).zip(fields) {
        defn.props.push(prop(field, desc, line));
    }
    defn
}

pub(crate) fn method(kind: MethodKind, name: &str, params: &[&str]) -> Method {
    Method {
        kind,
        name: name.to_string(),
        signature: params.iter().map(|p| (*p).to_string()).collect::<Signature>(),
        body: " return 0; ".to_string(),
        line: 9,
    }
}

pub(crate) fn with_virtual(mut defn: UserDefn, name: &str) -> UserDefn {
    defn.add_method(method(MethodKind::Virtual, name, &[]));
    defn
}

pub(crate) fn try_analyze(defs: Vec<UserDefn>) -> Result<Session, CompileError> {
    let mut session = Session::new();
    for defn in defs {
        session.register(defn)?;
    }
    session.analyze()?;
    Ok(session)
}

pub(crate) fn analyze(defs: Vec<UserDefn>) -> Session {
    try_analyze(defs).unwrap()
}

pub(crate) fn analyze_err(defs: Vec<UserDefn>) -> CompileError {
    try_analyze(defs).unwrap_err()
}

pub(crate) fn user<'a>(session: &'a Session, name: &str) -> &'a UserDefn {
    session.user(session.lookup(name).unwrap()).unwrap()
}

/// `(path, offset)` for every map entry.
pub(crate) fn offsets(session: &Session, name: &str) -> Vec<(String, u32)> {
    user(session, name)
        .map
        .iter()
        .map(|entry| (entry.name.clone(), entry.offset))
        .collect()
}
