//! Document rendering.
//!
//! Renders the structural tree to text and records the byte span each
//! node occupied. Spans feed `Presentation` highlight ranges, offset
//! lookup, and the byte-for-byte document comparisons the apply engine's
//! atomicity guarantees are tested against.

use rustc_hash::FxHashMap;

use crate::{NodeId, NodeKind, Span, TreeDocument};

const INDENT: &str = "    ";

/// Tree-to-text printer.
///
/// One-shot: construct via `render`/`render_with_spans`.
pub struct Printer {
    out: String,
    indent: usize,
    spans: FxHashMap<NodeId, Span>,
}

impl Printer {
    /// Render a document to text.
    pub fn render(doc: &TreeDocument) -> String {
        Self::run(doc).0
    }

    /// Render a document and the span table for every reachable node.
    pub fn render_with_spans(doc: &TreeDocument) -> (String, FxHashMap<NodeId, Span>) {
        Self::run(doc)
    }

    fn run(doc: &TreeDocument) -> (String, FxHashMap<NodeId, Span>) {
        let mut printer = Printer {
            out: String::new(),
            indent: 0,
            spans: FxHashMap::default(),
        };
        let root = doc.root();
        if let NodeKind::Block(stmts) = doc.node(root) {
            for &stmt in stmts {
                printer.print_stmt(doc, stmt);
            }
        }
        let end = printer.offset();
        printer.spans.insert(root, Span::new(0, end));
        (printer.out, printer.spans)
    }

    fn offset(&self) -> u32 {
        u32::try_from(self.out.len()).unwrap_or(u32::MAX)
    }

    fn push_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(INDENT);
        }
    }

    fn record(&mut self, id: NodeId, start: u32) {
        let end = self.offset();
        self.spans.insert(id, Span::new(start, end));
    }

    fn print_stmt(&mut self, doc: &TreeDocument, id: NodeId) {
        self.push_indent();
        let start = self.offset();
        match doc.node(id) {
            NodeKind::ExprStmt(expr) => {
                self.print_expr(doc, *expr);
                self.out.push(';');
            }
            NodeKind::Let { name, init } => {
                self.out.push_str("let ");
                self.out.push_str(doc.name(*name));
                self.out.push_str(" = ");
                self.print_expr(doc, *init);
                self.out.push(';');
            }
            NodeKind::Return(expr) => {
                self.out.push_str("return");
                if let Some(expr) = expr {
                    self.out.push(' ');
                    self.print_expr(doc, *expr);
                }
                self.out.push(';');
            }
            NodeKind::If {
                cond,
                then_block,
                else_block,
            } => {
                self.out.push_str("if (");
                self.print_expr(doc, *cond);
                self.out.push_str(") ");
                self.print_block(doc, *then_block);
                if let Some(else_block) = else_block {
                    self.out.push_str(" else ");
                    self.print_block(doc, *else_block);
                }
            }
            NodeKind::Block(_) => self.print_block(doc, id),
            // Bare expression in statement position: render it anyway so a
            // malformed tree still produces inspectable text.
            _ => {
                self.print_expr(doc, id);
                self.out.push(';');
                self.out.push('\n');
                return;
            }
        }
        self.record(id, start);
        self.out.push('\n');
    }

    fn print_block(&mut self, doc: &TreeDocument, id: NodeId) {
        let start = self.offset();
        self.out.push_str("{\n");
        self.indent += 1;
        if let NodeKind::Block(stmts) = doc.node(id) {
            for &stmt in stmts {
                self.print_stmt(doc, stmt);
            }
        }
        self.indent -= 1;
        self.push_indent();
        self.out.push('}');
        self.record(id, start);
    }

    fn print_expr(&mut self, doc: &TreeDocument, id: NodeId) {
        let start = self.offset();
        match doc.node(id) {
            NodeKind::Int(value) => {
                self.out.push_str(&value.to_string());
            }
            NodeKind::Bool(value) => {
                self.out.push_str(if *value { "true" } else { "false" });
            }
            NodeKind::Str(name) => {
                self.out.push('"');
                self.out.push_str(doc.name(*name));
                self.out.push('"');
            }
            NodeKind::Ident(name) => {
                self.out.push_str(doc.name(*name));
            }
            NodeKind::Unit => self.out.push_str("()"),
            NodeKind::Binary { op, lhs, rhs } => {
                self.print_expr(doc, *lhs);
                self.out.push(' ');
                self.out.push_str(op.symbol());
                self.out.push(' ');
                self.print_expr(doc, *rhs);
            }
            NodeKind::Unary { op, operand } => {
                self.out.push_str(op.symbol());
                self.print_expr(doc, *operand);
            }
            NodeKind::Call { callee, args } => {
                self.out.push_str(doc.name(*callee));
                self.print_args(doc, args);
            }
            NodeKind::MethodCall {
                receiver,
                method,
                args,
            } => {
                self.print_expr(doc, *receiver);
                self.out.push('.');
                self.out.push_str(doc.name(*method));
                self.print_args(doc, args);
            }
            NodeKind::Assign { target, value } => {
                self.print_expr(doc, *target);
                self.out.push_str(" = ");
                self.print_expr(doc, *value);
            }
            NodeKind::Increment { target } => {
                self.print_expr(doc, *target);
                self.out.push_str("++");
            }
            NodeKind::Decrement { target } => {
                self.print_expr(doc, *target);
                self.out.push_str("--");
            }
            NodeKind::New { class, args } => {
                self.out.push_str("new ");
                self.out.push_str(doc.name(*class));
                self.print_args(doc, args);
            }
            // Statement form in expression position: render as-is.
            _ => self.print_stmt(doc, id),
        }
        self.record(id, start);
    }

    fn print_args(&mut self, doc: &TreeDocument, args: &[NodeId]) {
        self.out.push('(');
        for (i, &arg) in args.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            self.print_expr(doc, arg);
        }
        self.out.push(')');
    }
}
