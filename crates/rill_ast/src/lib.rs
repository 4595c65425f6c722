//! rill_ast: Syntax tree definitions for rill.
//!
//! The binder consumes nothing but these types: every node exposes a
//! [`SyntaxKind`] and a `TextSpan`, and tokens expose their text and literal
//! value.

pub mod node;
pub mod syntax_kind;
pub mod tree;
pub mod types;

pub use node::*;
pub use syntax_kind::SyntaxKind;
pub use tree::SyntaxNode;
pub use types::{LiteralValue, TokenFlags};

use rill_diagnostics::Diagnostic;

/// A parsed submission: its text, root node and the syntax diagnostics
/// produced while scanning and parsing it.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    file: Option<String>,
    text: String,
    root: CompilationUnitSyntax,
    diagnostics: Vec<Diagnostic>,
}

impl SyntaxTree {
    pub fn new(text: String, root: CompilationUnitSyntax, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            file: None,
            text,
            root,
            diagnostics,
        }
    }

    /// Attribute this tree, and its syntax diagnostics, to `file`.
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        let file = file.into();
        for diagnostic in &mut self.diagnostics {
            diagnostic.file = Some(file.clone());
        }
        self.file = Some(file);
        self
    }

    /// The file this tree was read from; `None` for interactive input.
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn root(&self) -> &CompilationUnitSyntax {
        &self.root
    }

    /// The root as a generic node, for walking or printing the whole tree.
    pub fn root_node(&self) -> SyntaxNode<'_> {
        SyntaxNode::CompilationUnit(&self.root)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}
