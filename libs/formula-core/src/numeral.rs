//! Numeric literal scanner
//!
//! A numeral is recognized by a small state machine with an explicit
//! transition table:
//!
//! ```text
//! integer ──.──> radix point ──digit──> fractional
//!    │                                      │
//!    └──────────e/E──────┬─────────e/E──────┘
//!                        v
//!                 exponent marker ──+/-──> exponent sign
//!                        │                     │
//!                        └──digit──> exponent <┘
//! ```
//!
//! `integer`, `fractional` and `exponent` are accepting: any character that
//! has no transition from them ends the numeral without being consumed.

use crate::error::{FormulaError, Result};
use num_traits::Float;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Integer = 0,
    RadixPoint = 1,
    Fractional = 2,
    ExponentMarker = 3,
    ExponentSign = 4,
    Exponent = 5,
    End = 6,
}

/// `TRANSITIONS[from][to]`; there is no row for `End`
const TRANSITIONS: [[bool; 7]; 6] = [
    // int    point  frac   e-mark e-sign exp    end
    [true, true, false, true, false, false, true],    // integer
    [false, false, true, false, false, false, false], // radix point
    [false, false, true, true, false, false, true],   // fractional
    [false, false, false, false, true, true, false],  // exponent marker
    [false, false, false, false, false, true, false], // exponent sign
    [false, false, false, false, false, true, true],  // exponent
];

fn can(from: State, to: State) -> bool {
    TRANSITIONS[from as usize][to as usize]
}

fn cast<T: Float>(value: u8) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

/// Scan the numeral starting at `start`
///
/// Returns the value and the offset one past its last character. The byte at
/// `start` must be an ASCII digit.
pub fn scan<T: Float>(text: &[u8], start: usize) -> Result<(T, usize)> {
    let ten: T = cast(10);
    let mut state = State::Integer;
    let mut integer = T::zero();
    let mut fractional = T::zero();
    let mut divisor = T::one();
    let mut exp_sign = T::one();
    let mut exponent = T::zero();

    let mut pos = start;
    loop {
        let c = text.get(pos).copied();
        let next = match c {
            Some(d @ b'0'..=b'9') => {
                let digit: T = cast(d - b'0');
                if can(state, State::Integer) {
                    integer = integer * ten + digit;
                    Some(State::Integer)
                } else if can(state, State::Fractional) {
                    fractional = fractional * ten + digit;
                    divisor = divisor * ten;
                    Some(State::Fractional)
                } else if can(state, State::Exponent) {
                    exponent = exponent * ten + digit;
                    Some(State::Exponent)
                } else {
                    None
                }
            },
            Some(b'.') => can(state, State::RadixPoint).then_some(State::RadixPoint),
            Some(b'e' | b'E') => can(state, State::ExponentMarker).then_some(State::ExponentMarker),
            Some(sign @ (b'+' | b'-')) => {
                if can(state, State::ExponentSign) {
                    if sign == b'-' {
                        exp_sign = -T::one();
                    }
                    Some(State::ExponentSign)
                } else if can(state, State::End) {
                    Some(State::End)
                } else {
                    None
                }
            },
            _ => can(state, State::End).then_some(State::End),
        };

        match next {
            Some(State::End) => break,
            Some(to) => {
                state = to;
                pos += 1;
            },
            None => return Err(FormulaError::syntax(pos)),
        }
    }

    let value = (integer * divisor + fractional) * ten.powf(exp_sign * exponent) / divisor;
    Ok((value, pos))
}
