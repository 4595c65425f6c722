//! Scanner integration tests.

use rill_ast::{LiteralValue, SyntaxKind};
use rill_scanner::scan_tokens;

/// Helper: scan source and return the kinds of all tokens before end of file.
fn kinds(source: &str) -> Vec<SyntaxKind> {
    let (tokens, _) = scan_tokens(source);
    tokens
        .into_iter()
        .map(|t| t.kind)
        .filter(|k| *k != SyntaxKind::EndOfFileToken)
        .collect()
}

/// Helper: scan source and return diagnostic messages.
fn diagnostics(source: &str) -> Vec<String> {
    let (_, diagnostics) = scan_tokens(source);
    diagnostics.into_iter().map(|d| d.message_text).collect()
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_scan_compound_operators() {
    assert_eq!(
        kinds("&& || == != <= >= & | ! < >"),
        vec![
            SyntaxKind::AmpersandAmpersandToken,
            SyntaxKind::PipePipeToken,
            SyntaxKind::EqualsEqualsToken,
            SyntaxKind::BangEqualsToken,
            SyntaxKind::LessOrEqualsToken,
            SyntaxKind::GreaterOrEqualsToken,
            SyntaxKind::AmpersandToken,
            SyntaxKind::PipeToken,
            SyntaxKind::BangToken,
            SyntaxKind::LessToken,
            SyntaxKind::GreaterToken,
        ]
    );
}

#[test]
fn test_scan_adjacent_tokens_without_whitespace() {
    assert_eq!(
        kinds("a=-1"),
        vec![
            SyntaxKind::IdentifierToken,
            SyntaxKind::EqualsToken,
            SyntaxKind::MinusToken,
            SyntaxKind::NumberToken,
        ]
    );
}

// ============================================================================
// Literals and keywords
// ============================================================================

#[test]
fn test_scan_keywords_and_identifiers() {
    assert_eq!(
        kinds("for i in function fn letter"),
        vec![
            SyntaxKind::ForKeyword,
            SyntaxKind::IdentifierToken,
            SyntaxKind::InKeyword,
            SyntaxKind::FunctionKeyword,
            SyntaxKind::IdentifierToken,
            SyntaxKind::IdentifierToken,
        ]
    );
}

#[test]
fn test_scan_boolean_values() {
    let (tokens, _) = scan_tokens("true false");
    assert_eq!(tokens[0].value, Some(LiteralValue::Bool(true)));
    assert_eq!(tokens[1].value, Some(LiteralValue::Bool(false)));
}

#[test]
fn test_scan_string_with_doubled_quote() {
    let (tokens, diagnostics) = scan_tokens(r#""say ""hi""""#);
    assert!(diagnostics.is_empty());
    assert_eq!(tokens[0].kind, SyntaxKind::StringToken);
    assert_eq!(tokens[0].value, Some(LiteralValue::String("say \"hi\"".to_string())));
}

#[test]
fn test_scan_number_value_and_span() {
    let (tokens, _) = scan_tokens("  1234");
    assert_eq!(tokens[0].value, Some(LiteralValue::Int(1234)));
    assert_eq!(tokens[0].span.start, 2);
    assert_eq!(tokens[0].span.length, 4);
}

#[test]
fn test_scan_skips_comments() {
    assert_eq!(
        kinds("1 // one\n/* two\n */ 3"),
        vec![SyntaxKind::NumberToken, SyntaxKind::NumberToken]
    );
}

#[test]
fn test_scan_unicode_identifier() {
    let (tokens, diagnostics) = scan_tokens("größe");
    assert!(diagnostics.is_empty());
    assert_eq!(tokens[0].kind, SyntaxKind::IdentifierToken);
    assert_eq!(tokens[0].text, "größe");
    assert_eq!(tokens[0].span.length as usize, "größe".len());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_scan_bad_character() {
    let messages = diagnostics("1 $ 2");
    assert_eq!(messages, vec!["Bad character input: '$'.".to_string()]);
    assert_eq!(
        kinds("1 $ 2"),
        vec![SyntaxKind::NumberToken, SyntaxKind::BadToken, SyntaxKind::NumberToken]
    );
}

#[test]
fn test_scan_unterminated_string() {
    let messages = diagnostics("\"abc\nx");
    assert_eq!(messages, vec!["Unterminated string literal.".to_string()]);
}

#[test]
fn test_scan_number_out_of_range() {
    let messages = diagnostics("99999999999");
    assert_eq!(messages, vec!["The number 99999999999 isn't a valid int.".to_string()]);
}
