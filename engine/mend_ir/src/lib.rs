//! mend IR - structural document model for the quick-fix engine
//!
//! This crate contains the data structures the transformation command
//! engine operates on:
//! - `Span` for rendered-text locations
//! - `Name` for interned identifiers
//! - `NodeKind` / `NodeId` - the flat, arena-allocated document tree
//! - `NodePath` - rebind-safe target references
//! - `TreeDocument` - the mutable document with snapshot support
//!
//! # Design Philosophy
//!
//! - **Intern identifiers**: strings become `Name(u32)`
//! - **Flatten the tree**: no `Box<Node>`, children are `NodeId(u32)`
//!   indices into one contiguous arena
//! - **Paths, not pointers**: external handles are structural `NodePath`s
//!   that re-resolve against the live tree and fail safe when stale
//!
//! Spans are derived from rendering and never stored in nodes: the
//! document is the source of truth, its text a projection.

mod arena;
pub mod ast;
mod document;
mod name;
mod node_id;
mod path;
mod printer;
mod span;

pub use arena::NodeArena;
pub use ast::{BinaryOp, NodeKind, NodeTag, UnaryOp};
pub use document::{shared, DocError, SharedDocument, TreeDocument};
pub use name::{Name, StringInterner};
pub use node_id::NodeId;
pub use path::NodePath;
pub use printer::Printer;
pub use span::Span;
