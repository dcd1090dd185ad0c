//! Structural document nodes.
//!
//! The node set is language-neutral but concrete enough to express the
//! shapes quick fixes operate on: literals, reads, calls, assignments,
//! increments, constructions, and the statement forms they live in.
//! Children are `NodeId` indices into the document arena; statement lists
//! are plain `Vec`s because the document supports in-place structural
//! mutation.

use std::fmt;

use smallvec::SmallVec;

use crate::{Name, NodeId};

/// Inline child list. Most nodes have at most four children.
pub type ChildList = SmallVec<[NodeId; 4]>;

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    NotEq,
    Lt,
    Gt,
    /// Short-circuit conjunction.
    And,
    /// Short-circuit disjunction.
    Or,
}

impl BinaryOp {
    /// Whether the right operand is control-dependent on the left.
    #[inline]
    pub const fn is_short_circuit(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// Rendered operator text.
    pub const fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    /// Rendered operator text.
    pub const fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }
}

/// Node variants.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeKind {
    /// Integer literal: 42
    Int(i64),

    /// Boolean literal: true, false
    Bool(bool),

    /// String literal (interned)
    Str(Name),

    /// Variable reference
    Ident(Name),

    /// Unit: ()
    Unit,

    /// Binary operation: left op right
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },

    /// Unary operation: op operand
    Unary { op: UnaryOp, operand: NodeId },

    /// Free function call: f(args...)
    Call { callee: Name, args: Vec<NodeId> },

    /// Method call: receiver.method(args...)
    MethodCall {
        receiver: NodeId,
        method: Name,
        args: Vec<NodeId>,
    },

    /// Assignment: target = value
    Assign { target: NodeId, value: NodeId },

    /// Increment: target++
    Increment { target: NodeId },

    /// Decrement: target--
    Decrement { target: NodeId },

    /// Object construction: new Class(args...)
    New { class: Name, args: Vec<NodeId> },

    /// Expression statement: expr;
    ExprStmt(NodeId),

    /// Let binding: let name = init;
    Let { name: Name, init: NodeId },

    /// Conditional statement
    If {
        cond: NodeId,
        then_block: NodeId,
        else_block: Option<NodeId>,
    },

    /// Return statement
    Return(Option<NodeId>),

    /// Statement block
    Block(Vec<NodeId>),
}

/// Fieldless discriminant of `NodeKind`.
///
/// Stored inside a `NodePath` so resolution can verify the target is
/// still the kind of node the path was created for.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeTag {
    Int,
    Bool,
    Str,
    Ident,
    Unit,
    Binary,
    Unary,
    Call,
    MethodCall,
    Assign,
    Increment,
    Decrement,
    New,
    ExprStmt,
    Let,
    If,
    Return,
    Block,
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl NodeKind {
    /// The fieldless discriminant of this node.
    pub const fn tag(&self) -> NodeTag {
        match self {
            NodeKind::Int(_) => NodeTag::Int,
            NodeKind::Bool(_) => NodeTag::Bool,
            NodeKind::Str(_) => NodeTag::Str,
            NodeKind::Ident(_) => NodeTag::Ident,
            NodeKind::Unit => NodeTag::Unit,
            NodeKind::Binary { .. } => NodeTag::Binary,
            NodeKind::Unary { .. } => NodeTag::Unary,
            NodeKind::Call { .. } => NodeTag::Call,
            NodeKind::MethodCall { .. } => NodeTag::MethodCall,
            NodeKind::Assign { .. } => NodeTag::Assign,
            NodeKind::Increment { .. } => NodeTag::Increment,
            NodeKind::Decrement { .. } => NodeTag::Decrement,
            NodeKind::New { .. } => NodeTag::New,
            NodeKind::ExprStmt(_) => NodeTag::ExprStmt,
            NodeKind::Let { .. } => NodeTag::Let,
            NodeKind::If { .. } => NodeTag::If,
            NodeKind::Return(_) => NodeTag::Return,
            NodeKind::Block(_) => NodeTag::Block,
        }
    }

    /// Whether this node is a statement form.
    pub const fn is_statement(&self) -> bool {
        matches!(
            self,
            NodeKind::ExprStmt(_)
                | NodeKind::Let { .. }
                | NodeKind::If { .. }
                | NodeKind::Return(_)
                | NodeKind::Block(_)
        )
    }

    /// Children in structural (left-to-right) order.
    pub fn children(&self) -> ChildList {
        let mut out = ChildList::new();
        match self {
            NodeKind::Int(_)
            | NodeKind::Bool(_)
            | NodeKind::Str(_)
            | NodeKind::Ident(_)
            | NodeKind::Unit => {}
            NodeKind::Binary { lhs, rhs, .. } => {
                out.push(*lhs);
                out.push(*rhs);
            }
            NodeKind::Unary { operand, .. } => out.push(*operand),
            NodeKind::Call { args, .. } | NodeKind::New { args, .. } => {
                out.extend(args.iter().copied());
            }
            NodeKind::MethodCall { receiver, args, .. } => {
                out.push(*receiver);
                out.extend(args.iter().copied());
            }
            NodeKind::Assign { target, value } => {
                out.push(*target);
                out.push(*value);
            }
            NodeKind::Increment { target } | NodeKind::Decrement { target } => {
                out.push(*target);
            }
            NodeKind::ExprStmt(expr) => out.push(*expr),
            NodeKind::Let { init, .. } => out.push(*init),
            NodeKind::If {
                cond,
                then_block,
                else_block,
            } => {
                out.push(*cond);
                out.push(*then_block);
                if let Some(else_block) = else_block {
                    out.push(*else_block);
                }
            }
            NodeKind::Return(expr) => {
                if let Some(expr) = expr {
                    out.push(*expr);
                }
            }
            NodeKind::Block(stmts) => out.extend(stmts.iter().copied()),
        }
        out
    }

    /// Child at the given structural index.
    pub fn child_at(&self, index: usize) -> Option<NodeId> {
        self.children().get(index).copied()
    }

    /// Rebuild this variant with its children replaced.
    ///
    /// # Panics
    /// Panics if `new_children` does not match this variant's arity.
    pub fn with_children(&self, new_children: &[NodeId]) -> NodeKind {
        let arity = self.children().len();
        assert_eq!(
            arity,
            new_children.len(),
            "child arity mismatch for {:?}",
            self.tag()
        );
        match self {
            NodeKind::Int(_)
            | NodeKind::Bool(_)
            | NodeKind::Str(_)
            | NodeKind::Ident(_)
            | NodeKind::Unit => self.clone(),
            NodeKind::Binary { op, .. } => NodeKind::Binary {
                op: *op,
                lhs: new_children[0],
                rhs: new_children[1],
            },
            NodeKind::Unary { op, .. } => NodeKind::Unary {
                op: *op,
                operand: new_children[0],
            },
            NodeKind::Call { callee, .. } => NodeKind::Call {
                callee: *callee,
                args: new_children.to_vec(),
            },
            NodeKind::New { class, .. } => NodeKind::New {
                class: *class,
                args: new_children.to_vec(),
            },
            NodeKind::MethodCall { method, .. } => NodeKind::MethodCall {
                receiver: new_children[0],
                method: *method,
                args: new_children[1..].to_vec(),
            },
            NodeKind::Assign { .. } => NodeKind::Assign {
                target: new_children[0],
                value: new_children[1],
            },
            NodeKind::Increment { .. } => NodeKind::Increment {
                target: new_children[0],
            },
            NodeKind::Decrement { .. } => NodeKind::Decrement {
                target: new_children[0],
            },
            NodeKind::ExprStmt(_) => NodeKind::ExprStmt(new_children[0]),
            NodeKind::Let { name, .. } => NodeKind::Let {
                name: *name,
                init: new_children[0],
            },
            NodeKind::If { .. } => NodeKind::If {
                cond: new_children[0],
                then_block: new_children[1],
                else_block: new_children.get(2).copied(),
            },
            NodeKind::Return(expr) => {
                if expr.is_some() {
                    NodeKind::Return(Some(new_children[0]))
                } else {
                    NodeKind::Return(None)
                }
            }
            NodeKind::Block(_) => NodeKind::Block(new_children.to_vec()),
        }
    }

    /// Replace one child ID with another. Returns false if `old` is not a
    /// direct child.
    pub fn replace_child(&mut self, old: NodeId, new: NodeId) -> bool {
        let mut children = self.children();
        let Some(pos) = children.iter().position(|&c| c == old) else {
            return false;
        };
        children[pos] = new;
        *self = self.with_children(&children);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_matches_variant() {
        let node = NodeKind::Int(7);
        assert_eq!(node.tag(), NodeTag::Int);
        assert!(!node.is_statement());

        let stmt = NodeKind::ExprStmt(NodeId::new(0));
        assert_eq!(stmt.tag(), NodeTag::ExprStmt);
        assert!(stmt.is_statement());
    }

    #[test]
    fn test_children_order() {
        let node = NodeKind::Binary {
            op: BinaryOp::Add,
            lhs: NodeId::new(1),
            rhs: NodeId::new(2),
        };
        let children = node.children();
        assert_eq!(children.as_slice(), &[NodeId::new(1), NodeId::new(2)]);
    }

    #[test]
    fn test_method_call_children_include_receiver() {
        let node = NodeKind::MethodCall {
            receiver: NodeId::new(3),
            method: Name::from_raw(0),
            args: vec![NodeId::new(4), NodeId::new(5)],
        };
        assert_eq!(
            node.children().as_slice(),
            &[NodeId::new(3), NodeId::new(4), NodeId::new(5)]
        );
    }

    #[test]
    fn test_replace_child() {
        let mut node = NodeKind::Unary {
            op: UnaryOp::Not,
            operand: NodeId::new(1),
        };
        assert!(node.replace_child(NodeId::new(1), NodeId::new(9)));
        assert_eq!(node.child_at(0), Some(NodeId::new(9)));
        assert!(!node.replace_child(NodeId::new(1), NodeId::new(2)));
    }

    #[test]
    fn test_with_children_preserves_optional_else() {
        let without_else = NodeKind::If {
            cond: NodeId::new(1),
            then_block: NodeId::new(2),
            else_block: None,
        };
        let rebuilt = without_else.with_children(&[NodeId::new(7), NodeId::new(8)]);
        assert_eq!(
            rebuilt,
            NodeKind::If {
                cond: NodeId::new(7),
                then_block: NodeId::new(8),
                else_block: None,
            }
        );
    }
}
