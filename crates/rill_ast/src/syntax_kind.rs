//! SyntaxKind enum - every token and node kind in the rill syntax tree.

use std::fmt;

/// The kind of a syntax token or node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum SyntaxKind {
    // ========================================================================
    // Tokens
    // ========================================================================
    BadToken = 0,
    EndOfFileToken,

    // Literals
    NumberToken,
    StringToken,
    IdentifierToken,

    // Punctuation
    PlusToken,
    MinusToken,
    StarToken,
    SlashToken,
    BangToken,
    TildeToken,
    HatToken,
    AmpersandToken,
    AmpersandAmpersandToken,
    PipeToken,
    PipePipeToken,
    EqualsToken,
    EqualsEqualsToken,
    BangEqualsToken,
    LessToken,
    LessOrEqualsToken,
    GreaterToken,
    GreaterOrEqualsToken,
    OpenParenToken,
    CloseParenToken,
    OpenBraceToken,
    CloseBraceToken,
    ColonToken,
    CommaToken,
    DotDotToken,
    DotDotEqualsToken,

    // ========================================================================
    // Keywords
    // ========================================================================
    BreakKeyword,
    ContinueKeyword,
    DoKeyword,
    ElseKeyword,
    FalseKeyword,
    ForKeyword,
    FunctionKeyword,
    IfKeyword,
    InKeyword,
    LetKeyword,
    ReturnKeyword,
    TrueKeyword,
    VarKeyword,
    WhileKeyword,

    // ========================================================================
    // Nodes
    // ========================================================================
    CompilationUnit,
    FunctionDeclaration,
    GlobalStatement,
    Parameter,
    TypeClause,
    ElseClause,

    // Statements
    BlockStatement,
    VariableDeclaration,
    IfStatement,
    WhileStatement,
    DoWhileStatement,
    ForStatement,
    BreakStatement,
    ContinueStatement,
    ReturnStatement,
    ExpressionStatement,

    // Expressions
    LiteralExpression,
    NameExpression,
    AssignmentExpression,
    UnaryExpression,
    BinaryExpression,
    ParenthesizedExpression,
    CallExpression,
}

impl SyntaxKind {
    /// Whether this kind represents a keyword.
    #[inline]
    pub fn is_keyword(self) -> bool {
        let v = self as u16;
        v >= SyntaxKind::BreakKeyword as u16 && v <= SyntaxKind::WhileKeyword as u16
    }

    /// Whether this kind is a token (as opposed to a node).
    #[inline]
    pub fn is_token(self) -> bool {
        (self as u16) <= SyntaxKind::WhileKeyword as u16
    }

    /// Map identifier text to its keyword kind.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        Some(match text {
            "break" => SyntaxKind::BreakKeyword,
            "continue" => SyntaxKind::ContinueKeyword,
            "do" => SyntaxKind::DoKeyword,
            "else" => SyntaxKind::ElseKeyword,
            "false" => SyntaxKind::FalseKeyword,
            "for" => SyntaxKind::ForKeyword,
            "function" => SyntaxKind::FunctionKeyword,
            "if" => SyntaxKind::IfKeyword,
            "in" => SyntaxKind::InKeyword,
            "let" => SyntaxKind::LetKeyword,
            "return" => SyntaxKind::ReturnKeyword,
            "true" => SyntaxKind::TrueKeyword,
            "var" => SyntaxKind::VarKeyword,
            "while" => SyntaxKind::WhileKeyword,
            _ => return None,
        })
    }

    /// The fixed source text of punctuation and keyword tokens.
    pub fn text(self) -> Option<&'static str> {
        Some(match self {
            SyntaxKind::PlusToken => "+",
            SyntaxKind::MinusToken => "-",
            SyntaxKind::StarToken => "*",
            SyntaxKind::SlashToken => "/",
            SyntaxKind::BangToken => "!",
            SyntaxKind::TildeToken => "~",
            SyntaxKind::HatToken => "^",
            SyntaxKind::AmpersandToken => "&",
            SyntaxKind::AmpersandAmpersandToken => "&&",
            SyntaxKind::PipeToken => "|",
            SyntaxKind::PipePipeToken => "||",
            SyntaxKind::EqualsToken => "=",
            SyntaxKind::EqualsEqualsToken => "==",
            SyntaxKind::BangEqualsToken => "!=",
            SyntaxKind::LessToken => "<",
            SyntaxKind::LessOrEqualsToken => "<=",
            SyntaxKind::GreaterToken => ">",
            SyntaxKind::GreaterOrEqualsToken => ">=",
            SyntaxKind::OpenParenToken => "(",
            SyntaxKind::CloseParenToken => ")",
            SyntaxKind::OpenBraceToken => "{",
            SyntaxKind::CloseBraceToken => "}",
            SyntaxKind::ColonToken => ":",
            SyntaxKind::CommaToken => ",",
            SyntaxKind::DotDotToken => "..",
            SyntaxKind::DotDotEqualsToken => "..=",
            SyntaxKind::BreakKeyword => "break",
            SyntaxKind::ContinueKeyword => "continue",
            SyntaxKind::DoKeyword => "do",
            SyntaxKind::ElseKeyword => "else",
            SyntaxKind::FalseKeyword => "false",
            SyntaxKind::ForKeyword => "for",
            SyntaxKind::FunctionKeyword => "function",
            SyntaxKind::IfKeyword => "if",
            SyntaxKind::InKeyword => "in",
            SyntaxKind::LetKeyword => "let",
            SyntaxKind::ReturnKeyword => "return",
            SyntaxKind::TrueKeyword => "true",
            SyntaxKind::VarKeyword => "var",
            SyntaxKind::WhileKeyword => "while",
            _ => return None,
        })
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
