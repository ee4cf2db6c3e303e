//! Recursive-descent, precedence-climbing parser for the Text Mode language
//!
//! The parser drives a statement-list loop over the token stream produced by
//! [`crate::lexer::lex`]. A parse failure inside a statement is a local,
//! statement-scoped error (`StatementError`) caught by the loop, which records
//! an Error diagnostic and discards tokens up to the next statement boundary,
//! always advancing so malformed input terminates. End-of-input mid-expression
//! is fatal to the current statement only.
//!
//! Statement ids are assigned at parse time from a mutable [`ids::IdContext`]
//! owned by the parser and are never mutated afterward.

pub mod binding;
pub mod expr;
pub mod ids;
pub mod statement;

use std::collections::HashMap;

use crate::ast::{Program, Span, Statement};
use crate::diagnostics::Diagnostic;
use crate::lexer::{self, Token};
use crate::parser::ids::{IdContext, IdRange};

/// Everything `parse` returns: the AST, ordered diagnostics, and an
/// id -> document-order index map over all statements including folder
/// children and table columns
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
    pub id_map: HashMap<String, usize>,
}

/// Parse a full document
///
/// `id_hints` is the caller-owned incremental-id state: prior `(span, id)`
/// ranges used to keep statement ids stable across re-parses of edited text.
pub fn parse(source: &str, id_hints: &[IdRange]) -> ParseResult {
    let (tokens, lex_diagnostics) = lexer::lex(source);
    let mut parser = Parser::new(source, tokens, id_hints.to_vec());
    parser.diagnostics = lex_diagnostics;

    let statements = parser.parse_statement_list(false);
    let span = match (statements.first(), statements.last()) {
        (Some(first), Some(last)) => first.span().to(last.span()),
        _ => Span::new(0, source.len()),
    };
    let program = Program { statements, span };

    let mut id_map = HashMap::new();
    collect_ids(&program.statements, &mut id_map);

    ParseResult {
        program,
        diagnostics: parser.diagnostics,
        id_map,
    }
}

fn collect_ids(statements: &[Statement], id_map: &mut HashMap<String, usize>) {
    for statement in statements {
        id_map.insert(statement.id().to_string(), statement.index());
        match statement {
            Statement::Folder(folder) => collect_ids(&folder.children, id_map),
            Statement::Table(table) => {
                for column in &table.columns {
                    id_map.insert(column.id.clone(), column.index);
                }
            }
            _ => {}
        }
    }
}

/// A failure fatal to the current statement; caught by the statement loop
#[derive(Debug, Clone, PartialEq)]
pub struct StatementError {
    pub message: String,
    pub span: Span,
}

impl StatementError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        StatementError {
            message: message.into(),
            span,
        }
    }
}

pub(crate) type StmtResult<T> = Result<T, StatementError>;

/// Parser state: token cursor, diagnostics, and id bookkeeping
pub struct Parser<'a> {
    source: &'a str,
    tokens: Vec<(Token, Span)>,
    pos: usize,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) ids: IdContext,
    pub(crate) next_index: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, tokens: Vec<(Token, Span)>, id_hints: Vec<IdRange>) -> Self {
        Parser {
            source,
            tokens,
            pos: 0,
            diagnostics: Vec::new(),
            ids: IdContext::new(id_hints),
            next_index: 0,
        }
    }

    pub(crate) fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).map(|(t, _)| *t)
    }

    pub(crate) fn peek_nth(&self, n: usize) -> Option<Token> {
        self.tokens.get(self.pos + n).map(|(t, _)| *t)
    }

    pub(crate) fn peek_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, span)) => *span,
            None => Span::new(self.source.len(), self.source.len()),
        }
    }

    /// Source text of the token `n` ahead of the cursor
    pub(crate) fn peek_text(&self, n: usize) -> &'a str {
        match self.tokens.get(self.pos + n) {
            Some((_, span)) => &self.source[span.start..span.end],
            None => "",
        }
    }

    pub(crate) fn advance(&mut self) -> Option<(Token, Span)> {
        let entry = self.tokens.get(self.pos).copied();
        if entry.is_some() {
            self.pos += 1;
        }
        entry
    }

    /// Consume the next token if it has the given kind
    pub(crate) fn eat(&mut self, token: Token) -> Option<Span> {
        if self.peek() == Some(token) {
            let span = self.peek_span();
            self.pos += 1;
            Some(span)
        } else {
            None
        }
    }

    /// Consume the next token or fail the statement
    pub(crate) fn expect(&mut self, token: Token, what: &str) -> StmtResult<Span> {
        match self.eat(token) {
            Some(span) => Ok(span),
            None => Err(StatementError::new(
                format!("expected {}", what),
                self.peek_span(),
            )),
        }
    }

    /// True if the next identifier token is the given contextual keyword
    pub(crate) fn at_keyword(&self, keyword: &str) -> bool {
        self.peek() == Some(Token::Ident) && self.peek_text(0) == keyword
    }

    pub(crate) fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Skip tokens up to and including the next statement boundary
    ///
    /// Guarantees progress: the cursor always ends past `start_pos`.
    pub(crate) fn synchronize(&mut self, start_pos: usize, stop_at_brace: bool) {
        if self.pos == start_pos && !self.at_end() {
            self.pos += 1;
        }
        while let Some(token) = self.peek() {
            match token {
                Token::Separator => {
                    self.pos += 1;
                    return;
                }
                Token::RBrace if stop_at_brace => return,
                _ => self.pos += 1,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;

    #[test]
    fn test_bad_statement_does_not_abort_document() {
        let result = parse("y = ^ 2; z = 3", &[]);
        assert_eq!(result.program.statements.len(), 1);
        assert!(result.diagnostics.iter().any(|d| d.is_error()));
        match &result.program.statements[0] {
            Statement::Expr(s) => match &s.expr {
                Expr::Comparator { .. } => {}
                other => panic!("expected comparator, got {:?}", other),
            },
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_determinism() {
        let a = parse("y = x ^ 2\n\nz = [1, 2, 3]", &[]);
        let b = parse("y = x ^ 2\n\nz = [1, 2, 3]", &[]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_eof_mid_expression_is_statement_local() {
        let result = parse("1 + 2\n\ny = (3 +", &[]);
        assert_eq!(result.program.statements.len(), 1);
        assert!(result.diagnostics.iter().any(|d| d.is_error()));
    }

    #[test]
    fn test_id_map_covers_children() {
        let result = parse("folder \"f\" { a = 1 }\n\ntable { x1 = [1] }", &[]);
        assert!(result.diagnostics.is_empty());
        // folder, child, table, column
        assert_eq!(result.id_map.len(), 4);
    }
}
