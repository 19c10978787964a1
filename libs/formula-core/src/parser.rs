//! Recursive-descent parser
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := term (('+' | '-') term)*
//! term    := factor (('*' | '/') factor)*
//! factor  := number
//!          | identifier ['(' expr (',' expr)? ')']
//!          | '(' expr ')'
//!          | ('+' | '-') factor
//! ```
//!
//! Every rule works inside an explicit `end` bound. A parenthesized group is
//! first located by a depth-counting scan, then its contents are parsed as a
//! complete expression bounded by the closing bracket, so an unbalanced
//! bracket is reported before anything inside it.
//!
//! # Limits
//!
//! Each nesting level (bracket, unary sign or call) adds a few stack frames,
//! here and again in the evaluator. Nesting in the low thousands can exhaust
//! the default 2 MiB stack of a spawned thread; hosts that accept such input
//! should parse and evaluate on a thread with a larger stack.

use crate::builtin_functions::{self, Builtin};
use crate::declaration::{is_identifier_head, is_identifier_tail};
use crate::error::{FormulaError, Result};
use crate::node::{BinaryOp, NodeId, NodeStore, UnaryOp};
use crate::numeral;
use num_traits::{Float, FloatConst};
use tracing::trace;

/// Parse `expression` into `store` and return the root node
///
/// `variables` are the declared names; a node referring to a variable holds
/// its position in this slice.
pub fn parse<T: Float + FloatConst>(
    expression: &str,
    variables: &[&str],
    store: &mut NodeStore<T>,
) -> Result<NodeId> {
    let mut parser = Parser {
        text: expression.as_bytes(),
        pos: 0,
        variables,
        store,
    };
    parser.expression(expression.len())
}

struct Parser<'a, 's, T> {
    text: &'a [u8],
    pos: usize,
    variables: &'s [&'s str],
    store: &'s mut NodeStore<T>,
}

impl<T: Float + FloatConst> Parser<'_, '_, T> {
    fn peek(&self, end: usize) -> Option<u8> {
        if self.pos < end {
            Some(self.text[self.pos])
        } else {
            None
        }
    }

    fn skip_blanks(&mut self, end: usize) {
        while matches!(self.peek(end), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    /// `expr`: must consume everything up to `end`
    fn expression(&mut self, end: usize) -> Result<NodeId> {
        let mut left = self.term(end)?;
        loop {
            self.skip_blanks(end);
            let op = match self.peek(end) {
                Some(b'+') => BinaryOp::Add,
                Some(b'-') => BinaryOp::Subtract,
                None => return Ok(left),
                Some(_) => return Err(FormulaError::syntax(self.pos)),
            };
            self.pos += 1;
            let right = self.term(end)?;
            left = self.store.binary(op, left, right);
        }
    }

    fn term(&mut self, end: usize) -> Result<NodeId> {
        let mut left = self.factor(end)?;
        loop {
            self.skip_blanks(end);
            let op = match self.peek(end) {
                Some(b'*') => BinaryOp::Multiply,
                Some(b'/') => BinaryOp::Divide,
                Some(b'+' | b'-') | None => return Ok(left),
                Some(_) => return Err(FormulaError::syntax(self.pos)),
            };
            self.pos += 1;
            let right = self.factor(end)?;
            left = self.store.binary(op, left, right);
        }
    }

    fn factor(&mut self, end: usize) -> Result<NodeId> {
        self.skip_blanks(end);
        match self.peek(end) {
            Some(c) if c.is_ascii_digit() => {
                let (value, next) = numeral::scan(&self.text[..end], self.pos)?;
                self.pos = next;
                Ok(self.store.constant(value))
            },
            Some(c) if is_identifier_head(c) => self.symbol(end),
            Some(b'(') => self.group(end),
            Some(b'+') => {
                self.pos += 1;
                self.factor(end)
            },
            Some(b'-') => {
                self.pos += 1;
                let operand = self.factor(end)?;
                Ok(self.store.unary(UnaryOp::Negate, operand))
            },
            _ => Err(FormulaError::syntax(self.pos)),
        }
    }

    /// Identifier: variable, named constant or function call
    fn symbol(&mut self, end: usize) -> Result<NodeId> {
        let start = self.pos;
        while matches!(self.peek(end), Some(c) if is_identifier_tail(c)) {
            self.pos += 1;
        }
        let name = &self.text[start..self.pos];

        if let Some(slot) = self
            .variables
            .iter()
            .position(|variable| variable.as_bytes() == name)
        {
            return Ok(self.store.variable(slot));
        }

        if let Some(value) = builtin_functions::constant(name) {
            return Ok(self.store.constant(value));
        }

        self.skip_blanks(end);
        if self.peek(end) != Some(b'(') {
            return Err(FormulaError::unknown_symbol(start));
        }

        let builtin =
            builtin_functions::function(name).ok_or(FormulaError::unknown_symbol(start))?;
        trace!(
            name = std::str::from_utf8(name).unwrap_or_default(),
            arity = builtin.arity(),
            offset = start,
            "builtin call"
        );

        match builtin {
            Builtin::Unary(op) => {
                let operand = self.group(end)?;
                Ok(self.store.unary(op, operand))
            },
            Builtin::Binary(op) => {
                let (left, right) = self.arguments(end)?;
                Ok(self.store.binary(op, left, right))
            },
        }
    }

    /// Offset of the `)` matching the `(` at `open`
    fn matching(&self, open: usize, end: usize) -> Result<usize> {
        let mut depth = 0usize;
        for (i, &c) in self.text[..end].iter().enumerate().skip(open) {
            match c {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                },
                _ => {},
            }
        }
        Err(FormulaError::unmatched_parentheses(open))
    }

    /// `'(' expr ')'` starting at the current position
    fn group(&mut self, end: usize) -> Result<NodeId> {
        let open = self.pos;
        let close = self.matching(open, end)?;
        self.pos = open + 1;
        let node = self.expression(close)?;
        self.pos = close + 1;
        Ok(node)
    }

    /// `'(' expr ',' expr ')'` starting at the current position
    fn arguments(&mut self, end: usize) -> Result<(NodeId, NodeId)> {
        let open = self.pos;
        let close = self.matching(open, end)?;

        let mut comma = None;
        let mut depth = 0usize;
        for (i, &c) in self.text[..close].iter().enumerate().skip(open + 1) {
            match c {
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b',' if depth == 0 => {
                    if comma.is_some() {
                        return Err(FormulaError::syntax(i));
                    }
                    comma = Some(i);
                },
                _ => {},
            }
        }
        let comma = comma.ok_or(FormulaError::syntax(close))?;

        self.pos = open + 1;
        let left = self.expression(comma)?;
        self.pos = comma + 1;
        let right = self.expression(close)?;
        self.pos = close + 1;
        Ok((left, right))
    }
}
