//! Core tokenization for the Text Mode lexer
//!
//! Raw tokenization is handled entirely by logos. Characters no rule matches
//! become `Invalid` tokens with an Error diagnostic; lexing never stops early.

use logos::Logos;

use crate::ast::Span;
use crate::diagnostics::Diagnostic;
use crate::lexer::tokens::Token;

/// Tokenize source text into raw tokens with byte spans
pub fn tokenize(source: &str) -> (Vec<(Token, Span)>, Vec<Diagnostic>) {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();

    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                diagnostics.push(Diagnostic::error(
                    format!("invalid character {:?}", lexer.slice()),
                    span,
                ));
                tokens.push((Token::Invalid, span));
            }
        }
    }

    (tokens, diagnostics)
}

/// Strip the surrounding quotes and resolve backslash escapes of a `Str` token
pub fn unquote(literal: &str) -> String {
    let inner = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(escaped) => out.push(escaped),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_with_spans() {
        let (tokens, diagnostics) = tokenize("y = x");
        assert!(diagnostics.is_empty());
        assert_eq!(
            tokens,
            vec![
                (Token::Ident, Span::new(0, 1)),
                (Token::Equals, Span::new(2, 3)),
                (Token::Ident, Span::new(4, 5)),
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let (tokens, diagnostics) = tokenize("");
        assert!(tokens.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_invalid_character_keeps_lexing() {
        let (tokens, diagnostics) = tokenize("1 ? 2");
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].is_error());
        assert_eq!(
            tokens.iter().map(|(t, _)| *t).collect::<Vec<_>>(),
            vec![Token::Number, Token::Invalid, Token::Number]
        );
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote(r#""plain""#), "plain");
        assert_eq!(unquote(r#""a\"b""#), "a\"b");
        assert_eq!(unquote(r#""line\nbreak""#), "line\nbreak");
    }
}
