//! formula-core - Run-time compiled numeric formulas
//!
//! Turns a formula typed by a user or read from a configuration file into a
//! reusable numeric function of named variables.
//!
//! # Features
//!
//! - **Arithmetic**: `+ - * /` with the usual precedence, unary `+`/`-`, parentheses
//! - **Constants**: `pi`, `e`, and numerals such as `12`, `0.5`, `6.02e23`
//! - **Functions**: 17 unary and 6 binary builtins (see [`builtin_functions`])
//! - **Variables**: declared after the expression, bound by position
//! - **Precision**: generic over `f64` (default) and `f32`
//! - **Quadrature**: Gauss-Legendre rules on `[-1, 1]^D` for integrating formulas (see [`quadrature`])
//!
//! # Example
//!
//! ```rust
//! use formula_core::{ErrorKind, Formula};
//!
//! // Declared variables follow the expression, separated by `;`
//! let mut integrand = Formula::<f64>::parse("exp(-(t - 5)*(t - 5)/0.1); t").unwrap();
//! assert_eq!(integrand.evaluate(&[5.0]), 1.0);
//!
//! // Comparisons yield 1 or 0
//! let mut step = Formula::<f64>::parse("gt(x, 0); x").unwrap();
//! assert_eq!(step.evaluate(&[2.0]), 1.0);
//! assert_eq!(step.evaluate(&[-2.0]), 0.0);
//!
//! // Errors report the kind and the byte offset
//! let err = Formula::<f64>::parse("(1+2").unwrap_err();
//! assert_eq!(err.kind(), Some(ErrorKind::UnmatchedParentheses));
//! assert_eq!(err.offset(), Some(0));
//! ```
//!
//! # Errors
//!
//! | Kind | Code | Trigger |
//! |------|------|---------|
//! | `UnmatchedParentheses` | 1 | a `(` without its `)` |
//! | `SyntaxError` | 2 | unexpected character, malformed numeral, wrong argument count |
//! | `UnknownSymbol` | 3 | identifier that is not a variable, constant or builtin |
//! | `InvalidVariableName` | 4 | declared name that is not an identifier |

pub mod builtin_functions;
pub mod declaration;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod node;
pub mod numeral;
pub mod parser;
pub mod quadrature;

// Re-exports for convenience
pub use error::{ErrorKind, ErrorReport, FormulaError, Result};
pub use formula::Formula;
pub use node::{BinaryOp, Node, NodeId, NodeStore, UnaryOp};
pub use quadrature::QuadratureNode;
