//! Conversion classification between types.

use crate::symbol::TypeSymbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    None,
    Identity,
    Implicit,
    Explicit,
}

impl Conversion {
    pub fn classify(from: TypeSymbol, to: TypeSymbol) -> Conversion {
        if from == to {
            return Conversion::Identity;
        }
        match (from, to) {
            (TypeSymbol::Bool | TypeSymbol::Int, TypeSymbol::String) => Conversion::Explicit,
            _ => Conversion::None,
        }
    }

    pub fn exists(self) -> bool {
        self != Conversion::None
    }

    pub fn is_identity(self) -> bool {
        self == Conversion::Identity
    }

    /// Identity counts as implicit.
    pub fn is_implicit(self) -> bool {
        matches!(self, Conversion::Identity | Conversion::Implicit)
    }

    pub fn is_explicit(self) -> bool {
        self == Conversion::Explicit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let conversion = Conversion::classify(TypeSymbol::Bool, TypeSymbol::Bool);
        assert!(conversion.is_identity());
        assert!(conversion.is_implicit());
        assert!(conversion.exists());
    }

    #[test]
    fn test_to_string_is_explicit_only() {
        for from in [TypeSymbol::Bool, TypeSymbol::Int] {
            let conversion = Conversion::classify(from, TypeSymbol::String);
            assert!(conversion.is_explicit());
            assert!(!conversion.is_implicit());
        }
    }

    #[test]
    fn test_no_conversion() {
        assert_eq!(Conversion::classify(TypeSymbol::String, TypeSymbol::Int), Conversion::None);
        assert_eq!(Conversion::classify(TypeSymbol::Int, TypeSymbol::Bool), Conversion::None);
        assert!(!Conversion::classify(TypeSymbol::Void, TypeSymbol::String).exists());
    }
}
