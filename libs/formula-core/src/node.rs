//! Node store - append-only arena holding a formula's AST
//!
//! Nodes refer to each other through [`NodeId`] indices into the owning
//! [`NodeStore`]. Nodes are never removed one at a time; the whole store is
//! cleared when the formula is redefined.

use num_traits::Float;

/// Stable index of a node inside its [`NodeStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// One-operand operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Negate,
    Abs,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Log,
    Log2,
    Log10,
    Sqrt,
    Ceil,
    Floor,
}

impl UnaryOp {
    pub fn apply<T: Float>(self, a: T) -> T {
        match self {
            Self::Negate => -a,
            Self::Abs => a.abs(),
            Self::Sin => a.sin(),
            Self::Cos => a.cos(),
            Self::Tan => a.tan(),
            Self::Asin => a.asin(),
            Self::Acos => a.acos(),
            Self::Atan => a.atan(),
            Self::Sinh => a.sinh(),
            Self::Cosh => a.cosh(),
            Self::Tanh => a.tanh(),
            Self::Exp => a.exp(),
            Self::Log => a.ln(),
            Self::Log2 => a.log2(),
            Self::Log10 => a.log10(),
            Self::Sqrt => a.sqrt(),
            Self::Ceil => a.ceil(),
            Self::Floor => a.floor(),
        }
    }
}

/// Two-operand operations
///
/// `Eq`, `Gt` and `Lt` produce exactly one or zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Pow,
    Mod,
    Atan2,
    Eq,
    Gt,
    Lt,
}

impl BinaryOp {
    pub fn apply<T: Float>(self, a: T, b: T) -> T {
        match self {
            Self::Add => a + b,
            Self::Subtract => a - b,
            Self::Multiply => a * b,
            Self::Divide => a / b,
            Self::Pow => a.powf(b),
            // Truncated remainder, sign follows the dividend
            Self::Mod => a % b,
            Self::Atan2 => a.atan2(b),
            Self::Eq => truth(a == b),
            Self::Gt => truth(a > b),
            Self::Lt => truth(a < b),
        }
    }
}

fn truth<T: Float>(value: bool) -> T {
    if value {
        T::one()
    } else {
        T::zero()
    }
}

/// AST node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node<T> {
    /// Index into the formula's variable slots
    Variable(usize),
    Constant(T),
    Unary {
        op: UnaryOp,
        operand: NodeId,
    },
    Binary {
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
    },
}

/// Append-only node arena
#[derive(Debug, Clone)]
pub struct NodeStore<T> {
    nodes: Vec<Node<T>>,
}

impl<T> Default for NodeStore<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<T: Copy> NodeStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its id
    pub fn push(&mut self, node: Node<T>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn variable(&mut self, slot: usize) -> NodeId {
        self.push(Node::Variable(slot))
    }

    pub fn constant(&mut self, value: T) -> NodeId {
        self.push(Node::Constant(value))
    }

    pub fn unary(&mut self, op: UnaryOp, operand: NodeId) -> NodeId {
        self.push(Node::Unary { op, operand })
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        self.push(Node::Binary { op, left, right })
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id.index())
    }

    /// Node lookup for ids issued by this store
    ///
    /// # Panics
    /// Panics if `id` was issued by another store or before the last clear.
    pub fn node(&self, id: NodeId) -> Node<T> {
        self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
