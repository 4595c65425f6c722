//! The rill scanner.
//!
//! Converts source text into tokens on demand. Positions are byte offsets into
//! the text, so spans can be handed straight to diagnostic renderers.

use crate::char_codes::*;
use rill_ast::{LiteralValue, SyntaxKind, SyntaxToken, TokenFlags};
use rill_core::text::TextSpan;
use rill_diagnostics::{messages, DiagnosticBag};

/// The scanner converts rill source text into tokens.
pub struct Scanner {
    text: String,
    /// Current byte position in the text.
    pos: usize,
    /// Start of the current token (after leading trivia).
    token_start: usize,
    token: SyntaxKind,
    /// Literal value of the current number, string or boolean token.
    token_value: Option<LiteralValue>,
    token_flags: TokenFlags,
    diagnostics: DiagnosticBag,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            pos: 0,
            token_start: 0,
            token: SyntaxKind::BadToken,
            token_value: None,
            token_flags: TokenFlags::NONE,
            diagnostics: DiagnosticBag::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Look ahead: save position, call f, restore position and return result.
    ///
    /// Diagnostics reported while looking ahead are discarded; the tokens are
    /// scanned again for real afterwards.
    pub fn look_ahead<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        let save_pos = self.pos;
        let save_start = self.token_start;
        let save_token = self.token;
        let save_value = self.token_value.clone();
        let save_flags = self.token_flags;
        let save_diagnostics = self.diagnostics.len();
        let result = f(self);
        self.pos = save_pos;
        self.token_start = save_start;
        self.token = save_token;
        self.token_value = save_value;
        self.token_flags = save_flags;
        if self.diagnostics.len() != save_diagnostics {
            let mut kept = DiagnosticBag::new();
            kept.extend_from_slice(&self.diagnostics.diagnostics()[..save_diagnostics]);
            self.diagnostics = kept;
        }
        result
    }

    #[inline]
    pub fn token(&self) -> SyntaxKind {
        self.token
    }

    /// The source text of the current token.
    #[inline]
    pub fn token_text(&self) -> &str {
        &self.text[self.token_start..self.pos]
    }

    #[inline]
    pub fn token_value(&self) -> Option<&LiteralValue> {
        self.token_value.as_ref()
    }

    #[inline]
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// Get the current position (end of current token).
    #[inline]
    pub fn token_end(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn token_span(&self) -> TextSpan {
        TextSpan::from_bounds(self.token_start as u32, self.pos as u32)
    }

    #[inline]
    pub fn token_flags(&self) -> TokenFlags {
        self.token_flags
    }

    #[inline]
    pub fn has_preceding_line_break(&self) -> bool {
        self.token_flags.contains(TokenFlags::PRECEDING_LINE_BREAK)
    }

    pub fn diagnostics(&self) -> &DiagnosticBag {
        &self.diagnostics
    }

    /// Take the accumulated diagnostics, leaving an empty collection.
    pub fn take_diagnostics(&mut self) -> DiagnosticBag {
        std::mem::take(&mut self.diagnostics)
    }

    /// Materialize the current token.
    pub fn token_info(&self) -> SyntaxToken {
        SyntaxToken::new(
            self.token,
            self.token_span(),
            self.token_text().to_string(),
            self.token_value.clone(),
        )
        .with_flags(self.token_flags)
    }

    // ========================================================================
    // Core scanning
    // ========================================================================

    #[inline]
    fn current_char(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// Look at the character `offset` characters past the current one.
    #[inline]
    fn char_at(&self, offset: usize) -> Option<char> {
        self.text[self.pos..].chars().nth(offset)
    }

    #[inline]
    fn advance(&mut self, ch: char) {
        self.pos += ch.len_utf8();
    }

    /// Skip whitespace and comments, setting token_flags for line breaks.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.current_char() {
            match ch {
                '\r' => {
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.pos += 1;
                    if self.current_char() == Some('\n') {
                        self.pos += 1;
                    }
                }
                c if is_line_break(c) => {
                    self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
                    self.advance(c);
                }
                '/' if self.char_at(1) == Some('/') => {
                    self.pos += 2;
                    while let Some(c) = self.current_char() {
                        if is_line_break(c) {
                            break;
                        }
                        self.advance(c);
                    }
                }
                '/' if self.char_at(1) == Some('*') => self.skip_multi_line_comment(),
                c if is_white_space_single_line(c) => self.advance(c),
                _ => return,
            }
        }
    }

    fn skip_multi_line_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        while let Some(c) = self.current_char() {
            if c == '*' && self.char_at(1) == Some('/') {
                self.pos += 2;
                return;
            }
            if is_line_break(c) {
                self.token_flags |= TokenFlags::PRECEDING_LINE_BREAK;
            }
            self.advance(c);
        }
        self.diagnostics.report(
            TextSpan::new(start as u32, 2),
            &messages::UNTERMINATED_COMMENT,
            &[],
        );
    }

    /// Scan the next token and return its kind.
    pub fn scan(&mut self) -> SyntaxKind {
        self.token_flags = TokenFlags::NONE;
        self.token_value = None;

        self.skip_trivia();
        self.token_start = self.pos;

        let Some(ch) = self.current_char() else {
            self.token = SyntaxKind::EndOfFileToken;
            return self.token;
        };

        self.token = match ch {
            '+' => { self.pos += 1; SyntaxKind::PlusToken }
            '-' => { self.pos += 1; SyntaxKind::MinusToken }
            '*' => { self.pos += 1; SyntaxKind::StarToken }
            '/' => { self.pos += 1; SyntaxKind::SlashToken }
            '~' => { self.pos += 1; SyntaxKind::TildeToken }
            '^' => { self.pos += 1; SyntaxKind::HatToken }
            '(' => { self.pos += 1; SyntaxKind::OpenParenToken }
            ')' => { self.pos += 1; SyntaxKind::CloseParenToken }
            '{' => { self.pos += 1; SyntaxKind::OpenBraceToken }
            '}' => { self.pos += 1; SyntaxKind::CloseBraceToken }
            ':' => { self.pos += 1; SyntaxKind::ColonToken }
            ',' => { self.pos += 1; SyntaxKind::CommaToken }

            '&' => self.scan_doubled('&', SyntaxKind::AmpersandToken, SyntaxKind::AmpersandAmpersandToken),
            '|' => self.scan_doubled('|', SyntaxKind::PipeToken, SyntaxKind::PipePipeToken),
            '=' => self.scan_doubled('=', SyntaxKind::EqualsToken, SyntaxKind::EqualsEqualsToken),
            '!' => self.scan_doubled('=', SyntaxKind::BangToken, SyntaxKind::BangEqualsToken),
            '<' => self.scan_doubled('=', SyntaxKind::LessToken, SyntaxKind::LessOrEqualsToken),
            '>' => self.scan_doubled('=', SyntaxKind::GreaterToken, SyntaxKind::GreaterOrEqualsToken),
            '.' => self.scan_dot(),

            '"' => self.scan_string_literal(),

            '0'..='9' => self.scan_number(),

            _ if is_identifier_start(ch) => self.scan_identifier(),

            _ => {
                self.advance(ch);
                let text = ch.to_string();
                self.diagnostics.report(self.token_span(), &messages::BAD_CHARACTER, &[&text]);
                SyntaxKind::BadToken
            }
        };

        self.token
    }

    // ========================================================================
    // Token-specific scanning methods
    // ========================================================================

    /// Scan a one-character operator that may be followed by `second`.
    fn scan_doubled(&mut self, second: char, single: SyntaxKind, double: SyntaxKind) -> SyntaxKind {
        if self.char_at(1) == Some(second) {
            self.pos += 2;
            double
        } else {
            self.pos += 1;
            single
        }
    }

    fn scan_dot(&mut self) -> SyntaxKind {
        if self.char_at(1) != Some('.') {
            self.pos += 1;
            self.diagnostics.report(self.token_span(), &messages::BAD_CHARACTER, &["."]);
            return SyntaxKind::BadToken;
        }
        if self.char_at(2) == Some('=') {
            self.pos += 3;
            SyntaxKind::DotDotEqualsToken
        } else {
            self.pos += 2;
            SyntaxKind::DotDotToken
        }
    }

    /// Strings are delimited by `"`; a doubled `""` stands for one quote.
    fn scan_string_literal(&mut self) -> SyntaxKind {
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.current_char() {
                None => {
                    self.report_unterminated_string();
                    break;
                }
                Some(c) if is_line_break(c) => {
                    self.report_unterminated_string();
                    break;
                }
                Some('"') => {
                    if self.char_at(1) == Some('"') {
                        value.push('"');
                        self.pos += 2;
                    } else {
                        self.pos += 1;
                        break;
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance(c);
                }
            }
        }
        self.token_value = Some(LiteralValue::String(value));
        SyntaxKind::StringToken
    }

    fn report_unterminated_string(&mut self) {
        self.token_flags |= TokenFlags::UNTERMINATED;
        self.diagnostics.report(
            TextSpan::new(self.token_start as u32, 1),
            &messages::UNTERMINATED_STRING_LITERAL,
            &[],
        );
    }

    fn scan_number(&mut self) -> SyntaxKind {
        while self.current_char().map_or(false, is_digit) {
            self.pos += 1;
        }
        let value = match self.token_text().parse::<i32>() {
            Ok(value) => value,
            Err(_) => {
                let text = self.token_text().to_string();
                self.diagnostics.report(self.token_span(), &messages::INVALID_NUMBER, &[&text, "int"]);
                0
            }
        };
        self.token_value = Some(LiteralValue::Int(value));
        SyntaxKind::NumberToken
    }

    fn scan_identifier(&mut self) -> SyntaxKind {
        while let Some(c) = self.current_char() {
            if !is_identifier_part(c) {
                break;
            }
            self.advance(c);
        }
        match SyntaxKind::from_keyword(self.token_text()) {
            Some(SyntaxKind::TrueKeyword) => {
                self.token_value = Some(LiteralValue::Bool(true));
                SyntaxKind::TrueKeyword
            }
            Some(SyntaxKind::FalseKeyword) => {
                self.token_value = Some(LiteralValue::Bool(false));
                SyntaxKind::FalseKeyword
            }
            Some(keyword) => keyword,
            None => SyntaxKind::IdentifierToken,
        }
    }
}

/// Scan all of `text`, returning every token up to and including end of file.
pub fn scan_tokens(text: &str) -> (Vec<SyntaxToken>, DiagnosticBag) {
    let mut scanner = Scanner::new(text);
    let mut tokens = Vec::new();
    loop {
        let kind = scanner.scan();
        tokens.push(scanner.token_info());
        if kind == SyntaxKind::EndOfFileToken {
            break;
        }
    }
    let diagnostics = scanner.take_diagnostics();
    (tokens, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_range_tokens() {
        let mut scanner = Scanner::new("1..10 1..=10");
        let kinds: Vec<_> = std::iter::from_fn(|| {
            let kind = scanner.scan();
            (kind != SyntaxKind::EndOfFileToken).then_some(kind)
        })
        .collect();
        assert_eq!(
            kinds,
            vec![
                SyntaxKind::NumberToken,
                SyntaxKind::DotDotToken,
                SyntaxKind::NumberToken,
                SyntaxKind::NumberToken,
                SyntaxKind::DotDotEqualsToken,
                SyntaxKind::NumberToken,
            ]
        );
    }

    #[test]
    fn test_look_ahead_restores_state() {
        let mut scanner = Scanner::new("a = 1");
        scanner.scan();
        let next = scanner.look_ahead(|s| s.scan());
        assert_eq!(next, SyntaxKind::EqualsToken);
        assert_eq!(scanner.token(), SyntaxKind::IdentifierToken);
        assert_eq!(scanner.token_text(), "a");
    }

    #[test]
    fn test_line_break_flag() {
        let mut scanner = Scanner::new("return\n1");
        scanner.scan();
        assert!(!scanner.has_preceding_line_break());
        scanner.scan();
        assert!(scanner.has_preceding_line_break());
    }
}
