//! rill_binder: Semantic analysis and lowering.
//!
//! The binder resolves names against a scope chain, checks types and produces
//! the bound tree. The lowerer rewrites that tree into a flat label/goto form,
//! and the control-flow graph verifies that value-returning functions return
//! on every path.

mod binder;
pub mod bound_tree;
pub mod control_flow;
mod conversion;
mod lowerer;
pub mod operators;
mod printer;
mod rewriter;
mod scope;
mod symbol;

pub use binder::Binder;
pub use bound_tree::{BoundGlobalScope, BoundProgram};
pub use control_flow::ControlFlowGraph;
pub use conversion::Conversion;
pub use lowerer::Lowerer;
pub use rewriter::BoundTreeRewriter;
pub use scope::{create_parent_scopes, create_root_scope, BoundScope, Lookup};
pub use symbol::{
    builtin_functions, BoundLabel, BuiltinFunction, FunctionSymbol, Symbol, SymbolKind, TypeSymbol,
    VariableSymbol,
};
