//! Symbol and type definitions.
//!
//! Variable and function symbols are cheap reference-counted handles. They
//! compare and hash by identity: two declarations with the same name and type
//! are still two different symbols, and the evaluator keys storage on them.

use rill_ast::FunctionDeclarationSyntax;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// The closed set of types in the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeSymbol {
    /// Produced when binding failed; absorbs further diagnostics.
    Error,
    Bool,
    Int,
    String,
    Void,
}

impl TypeSymbol {
    pub fn name(self) -> &'static str {
        match self {
            TypeSymbol::Error => "?",
            TypeSymbol::Bool => "bool",
            TypeSymbol::Int => "int",
            TypeSymbol::String => "string",
            TypeSymbol::Void => "void",
        }
    }

    /// Resolve a type name written in source. `void` is not nameable.
    pub fn lookup(name: &str) -> Option<TypeSymbol> {
        match name {
            "bool" => Some(TypeSymbol::Bool),
            "int" => Some(TypeSymbol::Int),
            "string" => Some(TypeSymbol::String),
            _ => None,
        }
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    GlobalVariable,
    LocalVariable,
    Parameter,
    Function,
    Label,
}

// ============================================================================
// Variables
// ============================================================================

#[derive(Debug)]
struct VariableData {
    name: String,
    kind: SymbolKind,
    is_read_only: bool,
    ty: TypeSymbol,
}

/// A global variable, local variable or parameter.
#[derive(Clone)]
pub struct VariableSymbol(Rc<VariableData>);

impl VariableSymbol {
    fn new(name: impl Into<String>, kind: SymbolKind, is_read_only: bool, ty: TypeSymbol) -> Self {
        Self(Rc::new(VariableData {
            name: name.into(),
            kind,
            is_read_only,
            ty,
        }))
    }

    pub fn global(name: impl Into<String>, is_read_only: bool, ty: TypeSymbol) -> Self {
        Self::new(name, SymbolKind::GlobalVariable, is_read_only, ty)
    }

    pub fn local(name: impl Into<String>, is_read_only: bool, ty: TypeSymbol) -> Self {
        Self::new(name, SymbolKind::LocalVariable, is_read_only, ty)
    }

    /// Parameters are never read-only.
    pub fn parameter(name: impl Into<String>, ty: TypeSymbol) -> Self {
        Self::new(name, SymbolKind::Parameter, false, ty)
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.0.kind
    }

    pub fn is_global(&self) -> bool {
        self.0.kind == SymbolKind::GlobalVariable
    }

    pub fn is_read_only(&self) -> bool {
        self.0.is_read_only
    }

    pub fn ty(&self) -> TypeSymbol {
        self.0.ty
    }
}

impl PartialEq for VariableSymbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for VariableSymbol {}

impl Hash for VariableSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for VariableSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({}: {})", self.kind(), self.name(), self.ty())
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Functions implemented by the host rather than by a lowered body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFunction {
    Print,
    Input,
    Rand,
}

#[derive(Debug)]
struct FunctionData {
    name: String,
    parameters: Vec<VariableSymbol>,
    return_type: TypeSymbol,
    declaration: Option<Rc<FunctionDeclarationSyntax>>,
    /// The file holding the declaration, for attributing body diagnostics.
    file: Option<String>,
    builtin: Option<BuiltinFunction>,
}

#[derive(Clone)]
pub struct FunctionSymbol(Rc<FunctionData>);

impl FunctionSymbol {
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<VariableSymbol>,
        return_type: TypeSymbol,
        declaration: Option<Rc<FunctionDeclarationSyntax>>,
        file: Option<String>,
    ) -> Self {
        Self(Rc::new(FunctionData {
            name: name.into(),
            parameters,
            return_type,
            declaration,
            file,
            builtin: None,
        }))
    }

    fn builtin(
        builtin: BuiltinFunction,
        name: &str,
        parameters: Vec<VariableSymbol>,
        return_type: TypeSymbol,
    ) -> Self {
        Self(Rc::new(FunctionData {
            name: name.to_string(),
            parameters,
            return_type,
            declaration: None,
            file: None,
            builtin: Some(builtin),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn parameters(&self) -> &[VariableSymbol] {
        &self.0.parameters
    }

    pub fn return_type(&self) -> TypeSymbol {
        self.0.return_type
    }

    pub fn declaration(&self) -> Option<&Rc<FunctionDeclarationSyntax>> {
        self.0.declaration.as_ref()
    }

    pub fn file(&self) -> Option<&str> {
        self.0.file.as_deref()
    }

    pub fn builtin_kind(&self) -> Option<BuiltinFunction> {
        self.0.builtin
    }
}

impl PartialEq for FunctionSymbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for FunctionSymbol {}

impl Hash for FunctionSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Rc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for FunctionSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({}(", self.name())?;
        for (i, parameter) in self.parameters().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", parameter.name(), parameter.ty())?;
        }
        write!(f, "): {})", self.return_type())
    }
}

/// The functions every root scope starts with.
pub fn builtin_functions() -> Vec<FunctionSymbol> {
    vec![
        FunctionSymbol::builtin(
            BuiltinFunction::Print,
            "print",
            vec![VariableSymbol::parameter("text", TypeSymbol::String)],
            TypeSymbol::Void,
        ),
        FunctionSymbol::builtin(BuiltinFunction::Input, "input", Vec::new(), TypeSymbol::String),
        FunctionSymbol::builtin(
            BuiltinFunction::Rand,
            "rand",
            vec![VariableSymbol::parameter("max", TypeSymbol::Int)],
            TypeSymbol::Int,
        ),
    ]
}

// ============================================================================
// Labels
// ============================================================================

/// A jump target. Labels are unique by name within one lowered body.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundLabel {
    name: Rc<str>,
}

impl BoundLabel {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BoundLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ============================================================================
// Symbol
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    Variable(VariableSymbol),
    Function(FunctionSymbol),
    Label(BoundLabel),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Variable(variable) => variable.name(),
            Symbol::Function(function) => function.name(),
            Symbol::Label(label) => label.name(),
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Variable(variable) => variable.kind(),
            Symbol::Function(_) => SymbolKind::Function,
            Symbol::Label(_) => SymbolKind::Label,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_compare_by_identity() {
        let a = VariableSymbol::global("x", false, TypeSymbol::Int);
        let b = VariableSymbol::global("x", false, TypeSymbol::Int);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());

        let f = FunctionSymbol::new("f", Vec::new(), TypeSymbol::Void, None, None);
        let g = FunctionSymbol::new("f", Vec::new(), TypeSymbol::Void, None, None);
        assert_ne!(f, g);
    }

    #[test]
    fn test_type_lookup() {
        assert_eq!(TypeSymbol::lookup("int"), Some(TypeSymbol::Int));
        assert_eq!(TypeSymbol::lookup("void"), None);
        assert_eq!(TypeSymbol::Error.to_string(), "?");
    }

    #[test]
    fn test_builtins() {
        let builtins = builtin_functions();
        let names: Vec<_> = builtins.iter().map(FunctionSymbol::name).collect();
        assert_eq!(names, vec!["print", "input", "rand"]);
        assert_eq!(builtins[0].parameters()[0].kind(), SymbolKind::Parameter);
        assert_eq!(builtins[2].builtin_kind(), Some(BuiltinFunction::Rand));
    }
}
