//! Lexical scopes for the binder.

use crate::symbol::{builtin_functions, FunctionSymbol, Symbol, VariableSymbol};
use crate::BoundGlobalScope;
use rill_core::collections::FxIndexMap;

/// A scope in the binding phase. Scopes form a chain from inner to outer.
#[derive(Debug, Default)]
pub struct BoundScope {
    /// Declared symbols in declaration order.
    symbols: FxIndexMap<String, Symbol>,
    /// The parent scope (None for the root scope).
    parent: Option<Box<BoundScope>>,
}

/// Outcome of a typed name lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    /// The innermost symbol with that name has a different kind.
    WrongKind(Symbol),
}

impl BoundScope {
    pub fn new(parent: Option<Box<BoundScope>>) -> Self {
        Self {
            symbols: FxIndexMap::default(),
            parent,
        }
    }

    pub fn parent(&self) -> Option<&BoundScope> {
        self.parent.as_deref()
    }

    /// Detach and return the parent scope.
    pub fn into_parent(self) -> Option<Box<BoundScope>> {
        self.parent
    }

    /// Declare `symbol` in this scope. Returns false if the name is already
    /// declared here; names in outer scopes may be shadowed.
    pub fn declare(&mut self, symbol: Symbol) -> bool {
        if self.symbols.contains_key(symbol.name()) {
            return false;
        }
        self.symbols.insert(symbol.name().to_string(), symbol);
        true
    }

    pub fn try_declare_variable(&mut self, variable: VariableSymbol) -> bool {
        self.declare(Symbol::Variable(variable))
    }

    pub fn try_declare_function(&mut self, function: FunctionSymbol) -> bool {
        self.declare(Symbol::Function(function))
    }

    /// Find the innermost symbol named `name`, whatever its kind.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(symbol) = current.symbols.get(name) {
                return Some(symbol);
            }
            scope = current.parent();
        }
        None
    }

    pub fn lookup_variable(&self, name: &str) -> Lookup<VariableSymbol> {
        match self.lookup(name) {
            Some(Symbol::Variable(variable)) => Lookup::Found(variable.clone()),
            Some(other) => Lookup::WrongKind(other.clone()),
            None => Lookup::NotFound,
        }
    }

    pub fn lookup_function(&self, name: &str) -> Lookup<FunctionSymbol> {
        match self.lookup(name) {
            Some(Symbol::Function(function)) => Lookup::Found(function.clone()),
            Some(other) => Lookup::WrongKind(other.clone()),
            None => Lookup::NotFound,
        }
    }

    /// Variables declared directly in this scope, in declaration order.
    pub fn declared_variables(&self) -> Vec<VariableSymbol> {
        self.symbols
            .values()
            .filter_map(|symbol| match symbol {
                Symbol::Variable(variable) => Some(variable.clone()),
                _ => None,
            })
            .collect()
    }

    /// Functions declared directly in this scope, in declaration order.
    pub fn declared_functions(&self) -> Vec<FunctionSymbol> {
        self.symbols
            .values()
            .filter_map(|symbol| match symbol {
                Symbol::Function(function) => Some(function.clone()),
                _ => None,
            })
            .collect()
    }
}

/// The scope holding the built-in functions.
pub fn create_root_scope() -> BoundScope {
    let mut scope = BoundScope::new(None);
    for function in builtin_functions() {
        scope.try_declare_function(function);
    }
    scope
}

/// Rebuild the scope chain for a new submission: the root scope, then one
/// scope per previous submission, oldest outermost.
pub fn create_parent_scopes(previous: Option<&BoundGlobalScope>) -> Box<BoundScope> {
    let mut chain = Vec::new();
    let mut current = previous;
    while let Some(global_scope) = current {
        chain.push(global_scope);
        current = global_scope.previous.as_deref();
    }

    let mut parent = Box::new(create_root_scope());
    for global_scope in chain.into_iter().rev() {
        let mut scope = BoundScope::new(Some(parent));
        for function in &global_scope.functions {
            scope.try_declare_function(function.clone());
        }
        for variable in &global_scope.variables {
            scope.try_declare_variable(variable.clone());
        }
        parent = Box::new(scope);
    }
    parent
}
