//! Token-stream transformations applied after raw tokenization
//!
//! The only transformation is separator collapsing: the grammar treats a
//! semicolon and a run of two-or-more consecutive line breaks as the same
//! statement terminator, so both become one `Separator` token here and lone
//! newlines disappear. The parser never sees `Newline` or `Semicolon`.

use crate::ast::Span;
use crate::lexer::tokens::Token;

/// Collapse newline runs and semicolons into `Separator` tokens
pub fn collapse_separators(tokens: Vec<(Token, Span)>) -> Vec<(Token, Span)> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    while let Some((token, span)) = iter.next() {
        match token {
            Token::Semicolon => out.push((Token::Separator, span)),
            Token::Newline => {
                let mut run_span = span;
                let mut run_len = 1;
                while let Some((Token::Newline, next_span)) = iter.peek() {
                    run_span = run_span.to(*next_span);
                    run_len += 1;
                    iter.next();
                }
                if run_len >= 2 {
                    out.push((Token::Separator, run_span));
                }
            }
            _ => out.push((token, span)),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lexer_impl::tokenize;

    fn kinds(source: &str) -> Vec<Token> {
        collapse_separators(tokenize(source).0)
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_run_of_three_newlines_is_one_separator() {
        assert_eq!(
            kinds("a\n\n\nb"),
            vec![Token::Ident, Token::Separator, Token::Ident]
        );
    }

    #[test]
    fn test_lone_newline_vanishes() {
        assert_eq!(kinds("a\nb"), vec![Token::Ident, Token::Ident]);
    }

    #[test]
    fn test_separator_span_covers_the_run() {
        let tokens = collapse_separators(tokenize("a\n\nb").0);
        assert_eq!(tokens[1], (Token::Separator, Span::new(1, 3)));
    }

    #[test]
    fn test_comment_between_blank_lines_still_separates() {
        assert_eq!(
            kinds("a\n// note\n\nb"),
            vec![Token::Ident, Token::Separator, Token::Ident]
        );
    }
}
