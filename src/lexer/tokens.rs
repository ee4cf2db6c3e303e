//! Token definitions for the Text Mode language
//!
//! Tokens are defined with the logos derive macro. Keywords (`table`, `image`,
//! `settings`, `folder`, `ticker`, `for`, `integral`, `sum`, `product`, `of`,
//! `with`) are not separate token kinds: they lex as `Ident` and the parser
//! recognizes them contextually, so `table(1)` can still be a function call.

use logos::Logos;

/// All token kinds produced by the lexer
///
/// Tokens carry no payload; the parser slices the literal text out of the
/// source through the span the lexer driver pairs with each token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    /// Optional leading dot, optional exponent; never a trailing dot, so
    /// `1...5` lexes as number, ellipsis, number
    #[regex(r"(\d+(\.\d+)?|\.\d+)([eE][+-]?\d+)?")]
    Number,

    /// Plain identifier or a numeric token reference like `$3`
    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*|\$\d+")]
    Ident,

    /// Double-quoted string with backslash escapes
    #[regex(r#""(\\.|[^"\\])*""#)]
    Str,

    /// One or more `'`; the span length is the derivative order
    #[regex(r"'+")]
    Prime,

    #[token("<=")]
    LessEq,
    #[token(">=")]
    GreaterEq,
    #[token("->")]
    Arrow,
    #[token("...")]
    Ellipsis,
    #[token("d/d")]
    DOverD,
    #[token("@{")]
    StyleOpen,
    #[token("#{")]
    ParamsOpen,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("=")]
    Equals,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("!")]
    Bang,
    #[token(".")]
    Dot,
    #[token("|")]
    Pipe,
    #[token("~")]
    Tilde,

    #[token(";")]
    Semicolon,
    #[token("\n")]
    Newline,

    /// Statement terminator: produced by the separator transformation from a
    /// semicolon or a run of two-or-more newlines
    Separator,

    /// A character no rule matches; the driver records a diagnostic and keeps
    /// lexing
    Invalid,
}

/// The keyword subset recognized contextually by the parser
pub const KEYWORDS: &[&str] = &[
    "table", "image", "settings", "folder", "ticker", "for", "integral", "sum", "product", "of",
    "with",
];

impl Token {
    /// True for the tokens that can begin an expression
    pub fn starts_expression(&self) -> bool {
        matches!(
            self,
            Token::Number
                | Token::Ident
                | Token::Str
                | Token::Minus
                | Token::LParen
                | Token::LBracket
                | Token::LBrace
                | Token::Pipe
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logos::Logos;

    fn all(source: &str) -> Vec<Token> {
        Token::lexer(source).map(|r| r.unwrap_or(Token::Invalid)).collect()
    }

    #[test]
    fn test_numbers() {
        assert_eq!(all("1 1.5 .5 2e10 3.1e-2"), vec![Token::Number; 5]);
    }

    #[test]
    fn test_range_does_not_eat_trailing_dot() {
        assert_eq!(
            all("1...5"),
            vec![Token::Number, Token::Ellipsis, Token::Number]
        );
    }

    #[test]
    fn test_leading_dot_after_ellipsis() {
        assert_eq!(all("....5"), vec![Token::Ellipsis, Token::Number]);
    }

    #[test]
    fn test_multi_char_punctuation() {
        assert_eq!(
            all("<= >= -> @{ #{ d/d"),
            vec![
                Token::LessEq,
                Token::GreaterEq,
                Token::Arrow,
                Token::StyleOpen,
                Token::ParamsOpen,
                Token::DOverD,
            ]
        );
    }

    #[test]
    fn test_d_over_d_binds_before_ident() {
        assert_eq!(all("d/dx"), vec![Token::DOverD, Token::Ident]);
        assert_eq!(all("d/2"), vec![Token::Ident, Token::Slash, Token::Number]);
    }

    #[test]
    fn test_token_reference_identifier() {
        assert_eq!(all("$12"), vec![Token::Ident]);
    }

    #[test]
    fn test_primes() {
        assert_eq!(
            all("f''"),
            vec![Token::Ident, Token::Prime]
        );
    }

    #[test]
    fn test_string_with_escape() {
        assert_eq!(all(r#""a\"b""#), vec![Token::Str]);
    }

    #[test]
    fn test_invalid_character() {
        let tokens: Vec<_> = Token::lexer("1 € 2").collect();
        assert_eq!(tokens.len(), 3);
        assert!(tokens[1].is_err());
    }
}
