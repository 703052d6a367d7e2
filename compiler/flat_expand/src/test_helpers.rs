//! Shared setup for the expansion tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use flat_parse::{parse_file, ParsedFile};
use flat_types::{Session, UserDefn};

pub(crate) const FILE: &str = "test.flat_js";

/// Parse and analyze one source file.
pub(crate) fn analyzed(src: &str) -> (Session, ParsedFile) {
    let parsed = parse_file(FILE, src).unwrap();
    let mut session = Session::new();
    for defn in &parsed.defs {
        session.register(defn.clone()).unwrap();
    }
    session.analyze().unwrap();
    (session, parsed)
}

pub(crate) fn session(src: &str) -> Session {
    analyzed(src).0
}

pub(crate) fn user<'a>(session: &'a Session, name: &str) -> &'a UserDefn {
    session.user(session.lookup(name).unwrap()).unwrap()
}

pub(crate) const SHAPES: &str = "\
@flatjs struct Vec3 {
  x: float64;
  y: float64;
  z: float64;
} @end
@flatjs struct Ray {
  tag: int32;
  origin: Vec3;
  dir: Vec3;
} @end
@flatjs class Node {
  hits: int32.atomic;
  flag: int32.synchronic;
  weight: float32;
  pos: Vec3;
  next: Node;
  items: float64.Array;
  lane: float32x4;
  @method touch(SELF) { return SELF; }
  @virtual area(SELF) { return 0; }
} @end
";
