//! Tree-walking evaluator
//!
//! Evaluation is a pure function of the node store, the root id and the
//! current variable bindings. Nothing is cached between calls, so identical
//! bindings always give bit-identical results.

use crate::node::{Node, NodeId, NodeStore};
use num_traits::Float;

/// Evaluate the subtree rooted at `id`
///
/// `slots` holds the bound variable values in declaration order; every
/// `Node::Variable` index in the store must be in range.
pub fn evaluate<T: Float>(store: &NodeStore<T>, id: NodeId, slots: &[T]) -> T {
    match store.node(id) {
        Node::Variable(slot) => slots[slot],
        Node::Constant(value) => value,
        Node::Unary { op, operand } => op.apply(evaluate(store, operand, slots)),
        Node::Binary { op, left, right } => {
            let a = evaluate(store, left, slots);
            let b = evaluate(store, right, slots);
            op.apply(a, b)
        },
    }
}
