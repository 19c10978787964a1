//! Builtin named constants and functions
//!
//! | Function | Arity | | Function | Arity |
//! |----------|-------|-|----------|-------|
//! | `abs`    | 1 | | `gt`    | 2 |
//! | `acos`   | 1 | | `log`   | 1 |
//! | `asin`   | 1 | | `log10` | 1 |
//! | `atan`   | 1 | | `log2`  | 1 |
//! | `atan2`  | 2 | | `lt`    | 2 |
//! | `ceil`   | 1 | | `mod`   | 2 |
//! | `cos`    | 1 | | `pow`   | 2 |
//! | `cosh`   | 1 | | `sin`   | 1 |
//! | `exp`    | 1 | | `sinh`  | 1 |
//! | `eq`     | 2 | | `sqrt`  | 1 |
//! | `floor`  | 1 | | `tan`   | 1 |
//! |          |   | | `tanh`  | 1 |
//!
//! Function names are looked up through a perfect hash over
//! `(length, first byte, second byte)`, so a lookup costs two table reads and
//! one string comparison.

use crate::node::{BinaryOp, UnaryOp};
use num_traits::{Float, FloatConst};

/// A resolved builtin function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Unary(UnaryOp),
    Binary(BinaryOp),
}

impl Builtin {
    pub fn arity(&self) -> usize {
        match self {
            Self::Unary(_) => 1,
            Self::Binary(_) => 2,
        }
    }
}

/// Names accepted by [`constant`]
pub const CONSTANTS: [&str; 2] = ["e", "pi"];

/// Named constant value, if `name` is `pi` or `e`
pub fn constant<T: Float + FloatConst>(name: &[u8]) -> Option<T> {
    match name {
        b"pi" => Some(T::PI()),
        b"e" => Some(T::E()),
        _ => None,
    }
}

const MIN_WORD_LENGTH: usize = 2;
const MAX_WORD_LENGTH: usize = 5;
const MIN_HASH_VALUE: usize = 2;
const MAX_HASH_VALUE: usize = 26;

/// Per-byte hash contributions; bytes not listed contribute 27, which pushes
/// any key containing them past `MAX_HASH_VALUE`.
const ASSO_VALUES: [u8; 129] = {
    let mut table = [27u8; 129];
    table[b'a' as usize] = 2;
    table[b'b' as usize] = 4;
    table[b'c' as usize] = 0;
    table[b'd' as usize] = 18;
    table[b'e' as usize] = 8;
    table[b'f' as usize] = 13;
    table[b'g' as usize] = 0;
    table[b'j' as usize] = 6;
    table[b'l' as usize] = 2;
    table[b'm' as usize] = 8;
    table[b'p' as usize] = 5;
    table[b'r' as usize] = 12;
    table[b's' as usize] = 5;
    table[b't' as usize] = 12;
    table[b'u' as usize] = 0;
    table[b'y' as usize] = 12;
    table
};

static FUNCTIONS: [(&str, Option<Builtin>); MAX_HASH_VALUE + 1] = [
    ("", None),
    ("", None),
    ("gt", Some(Builtin::Binary(BinaryOp::Gt))),
    ("", None),
    ("lt", Some(Builtin::Binary(BinaryOp::Lt))),
    ("abs", Some(Builtin::Unary(UnaryOp::Abs))),
    ("atan", Some(Builtin::Unary(UnaryOp::Atan))),
    ("atan2", Some(Builtin::Binary(BinaryOp::Atan2))),
    ("cos", Some(Builtin::Unary(UnaryOp::Cos))),
    ("cosh", Some(Builtin::Unary(UnaryOp::Cosh))),
    ("log", Some(Builtin::Unary(UnaryOp::Log))),
    ("log2", Some(Builtin::Unary(UnaryOp::Log2))),
    ("log10", Some(Builtin::Unary(UnaryOp::Log10))),
    ("pow", Some(Builtin::Binary(BinaryOp::Pow))),
    ("sin", Some(Builtin::Unary(UnaryOp::Sin))),
    ("sinh", Some(Builtin::Unary(UnaryOp::Sinh))),
    ("mod", Some(Builtin::Binary(BinaryOp::Mod))),
    ("ceil", Some(Builtin::Unary(UnaryOp::Ceil))),
    ("asin", Some(Builtin::Unary(UnaryOp::Asin))),
    ("tan", Some(Builtin::Unary(UnaryOp::Tan))),
    ("tanh", Some(Builtin::Unary(UnaryOp::Tanh))),
    ("sqrt", Some(Builtin::Unary(UnaryOp::Sqrt))),
    ("eq", Some(Builtin::Binary(BinaryOp::Eq))),
    ("exp", Some(Builtin::Unary(UnaryOp::Exp))),
    ("acos", Some(Builtin::Unary(UnaryOp::Acos))),
    ("", None),
    ("floor", Some(Builtin::Unary(UnaryOp::Floor))),
];

fn asso(byte: usize) -> usize {
    ASSO_VALUES.get(byte).copied().unwrap_or(27) as usize
}

fn hash(name: &[u8]) -> usize {
    name.len() + asso(name[1] as usize + 1) + asso(name[0] as usize)
}

/// Look up a builtin function by name
pub fn function(name: &[u8]) -> Option<Builtin> {
    if !(MIN_WORD_LENGTH..=MAX_WORD_LENGTH).contains(&name.len()) {
        return None;
    }
    let key = hash(name);
    if !(MIN_HASH_VALUE..=MAX_HASH_VALUE).contains(&key) {
        return None;
    }
    let (stored, builtin) = FUNCTIONS[key];
    if stored.as_bytes() != name {
        return None;
    }
    builtin
}

/// All builtin function names with their arity, in table order
pub fn names() -> impl Iterator<Item = (&'static str, usize)> {
    FUNCTIONS
        .iter()
        .filter_map(|(name, builtin)| builtin.map(|b| (*name, b.arity())))
}
