//! The fixed table of accessor operations.

use std::fmt;

/// An operation on a field, array element or struct value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Op {
    Get,
    Set,
    Ref,
    Add,
    Sub,
    And,
    Or,
    Xor,
    CompareExchange,
    LoadWhenEqual,
    LoadWhenNotEqual,
    ExpectUpdate,
    Notify,
}

impl Op {
    pub const ALL: [Op; 13] = [
        Op::Get,
        Op::Set,
        Op::Ref,
        Op::Add,
        Op::Sub,
        Op::And,
        Op::Or,
        Op::Xor,
        Op::CompareExchange,
        Op::LoadWhenEqual,
        Op::LoadWhenNotEqual,
        Op::ExpectUpdate,
        Op::Notify,
    ];

    pub fn from_name(name: &str) -> Option<Op> {
        Op::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Op::Get => "get",
            Op::Set => "set",
            Op::Ref => "ref",
            Op::Add => "add",
            Op::Sub => "sub",
            Op::And => "and",
            Op::Or => "or",
            Op::Xor => "xor",
            Op::CompareExchange => "compareExchange",
            Op::LoadWhenEqual => "loadWhenEqual",
            Op::LoadWhenNotEqual => "loadWhenNotEqual",
            Op::ExpectUpdate => "expectUpdate",
            Op::Notify => "notify",
        }
    }

    /// Argument count, counting the address (or `SELF`) argument.
    pub fn arity(self) -> usize {
        match self {
            Op::Get | Op::Ref | Op::Notify => 1,
            Op::Set
            | Op::Add
            | Op::Sub
            | Op::And
            | Op::Or
            | Op::Xor
            | Op::LoadWhenEqual
            | Op::LoadWhenNotEqual => 2,
            Op::CompareExchange | Op::ExpectUpdate => 3,
        }
    }

    /// The operation an assignment operator stands for: `=` is `set`,
    /// `+=` is `add`, and so on. `None` for the other compound operators.
    pub fn from_assignment(operator: &str) -> Option<Op> {
        match operator {
            "=" => Some(Op::Set),
            "+=" => Some(Op::Add),
            "-=" => Some(Op::Sub),
            "&=" => Some(Op::And),
            "|=" => Some(Op::Or),
            "^=" => Some(Op::Xor),
            _ => None,
        }
    }

    /// Vanilla fields map these onto a compound assignment.
    pub(crate) fn assignment(self) -> Option<&'static str> {
        match self {
            Op::Set => Some("="),
            Op::Add => Some("+="),
            Op::Sub => Some("-="),
            Op::And => Some("&="),
            Op::Or => Some("|="),
            Op::Xor => Some("^="),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
