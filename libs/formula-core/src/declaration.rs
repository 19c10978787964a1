//! Definition text preprocessing
//!
//! A definition has the form `<expression> [; <name>]*`. Everything before
//! the first `;` is the expression; each following segment declares one
//! variable, in order.

use crate::error::{FormulaError, Result};

/// Definition text split into its expression and declared variable names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declarations<'a> {
    pub expression: &'a str,
    pub variables: Vec<&'a str>,
}

pub fn is_identifier_head(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

pub fn is_identifier_tail(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

fn is_blank(c: u8) -> bool {
    c == b' ' || c == b'\t'
}

/// Split `text` at `;` and validate every declared name
pub fn split(text: &str) -> Result<Declarations<'_>> {
    let mut segments = text.split(';');
    let expression = segments.next().unwrap_or_default();

    let mut offset = expression.len() + 1;
    let mut variables = Vec::new();
    for segment in segments {
        variables.push(variable_name(segment, offset)?);
        offset += segment.len() + 1;
    }

    Ok(Declarations {
        expression,
        variables,
    })
}

/// Trim blanks around one declared segment and check identifier syntax
///
/// `base` is the offset of the segment in the full definition text.
fn variable_name(segment: &str, base: usize) -> Result<&str> {
    let bytes = segment.as_bytes();
    let start = bytes
        .iter()
        .position(|c| !is_blank(*c))
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|c| !is_blank(*c))
        .map_or(start, |last| last + 1);

    let name = &bytes[start..end];
    match name.split_first() {
        None => Err(FormulaError::invalid_variable_name(base + bytes.len())),
        Some((head, _)) if !is_identifier_head(*head) => {
            Err(FormulaError::invalid_variable_name(base + start))
        },
        Some((_, tail)) => match tail.iter().position(|c| !is_identifier_tail(*c)) {
            Some(bad) => Err(FormulaError::invalid_variable_name(base + start + 1 + bad)),
            None => Ok(&segment[start..end]),
        },
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn test_no_declarations() {
        let decl = split("2 + 3").unwrap();
        assert_eq!(decl.expression, "2 + 3");
        assert!(decl.variables.is_empty());
    }

    #[test]
    fn test_trims_and_orders_names() {
        let decl = split("sqrt(x*x + y*y); x;\ty_2 ").unwrap();
        assert_eq!(decl.expression, "sqrt(x*x + y*y)");
        assert_eq!(decl.variables, ["x", "y_2"]);
    }

    #[test]
    fn test_invalid_names() {
        // Leading digit
        assert_eq!(
            split("sin(x); 1x"),
            Err(FormulaError::invalid_variable_name(8))
        );
        // Leading underscore
        assert_eq!(split("x; _x"), Err(FormulaError::invalid_variable_name(3)));
        // Inner blank
        assert_eq!(split("x; a b"), Err(FormulaError::invalid_variable_name(4)));
        // Illegal character in the tail
        assert_eq!(split("x;ab-c"), Err(FormulaError::invalid_variable_name(4)));
        // Non-ASCII letter
        assert_eq!(split("x; é"), Err(FormulaError::invalid_variable_name(3)));
    }

    #[test]
    fn test_empty_segments() {
        assert_eq!(split("x;"), Err(FormulaError::invalid_variable_name(2)));
        assert_eq!(split("x; ;y"), Err(FormulaError::invalid_variable_name(3)));
        assert_eq!(split("x;; y"), Err(FormulaError::invalid_variable_name(2)));
    }

    #[test]
    fn test_second_segment_offset() {
        assert_eq!(
            split("a + b; a; 2b"),
            Err(FormulaError::invalid_variable_name(10))
        );
    }
}
