//! Statement parsing and the recovery loop
//!
//! Statement forms are selected by the leading token; the keyword statements
//! (`table`, `folder`, `image`, `settings`, `ticker`) are recognized
//! contextually, so the same words remain usable as ordinary identifiers.

use crate::ast::{
    Expr, ExprStatement, FolderStatement, ImageStatement, MappingEntry, RegressionParameters,
    SettingsStatement, Span, Statement, StyleMapping, StyleValueNode, TableStatement,
    TextStatement, TickerStatement,
};
use crate::diagnostics::Diagnostic;
use crate::lexer::lexer_impl::unquote;
use crate::lexer::Token;
use crate::parser::ids::valid_explicit_id;
use crate::parser::{binding, Parser, StatementError, StmtResult};

impl<'a> Parser<'a> {
    /// Parse statements until end of input, or until `}` when inside a folder
    ///
    /// Statement failures are converted to Error diagnostics here and the
    /// cursor resynchronizes at the next statement boundary.
    pub(crate) fn parse_statement_list(&mut self, inside_folder: bool) -> Vec<Statement> {
        let mut statements = Vec::new();
        loop {
            while self.eat(Token::Separator).is_some() {}
            if self.at_end() {
                break;
            }
            if inside_folder && self.peek() == Some(Token::RBrace) {
                break;
            }
            let start = self.pos;
            match self.parse_statement() {
                Ok(statement) => {
                    statements.push(statement);
                    match self.peek() {
                        None | Some(Token::Separator) => {}
                        Some(Token::RBrace) if inside_folder => {}
                        Some(_) => {
                            self.diagnostics.push(Diagnostic::error(
                                "expected the end of the statement",
                                self.peek_span(),
                            ));
                            self.synchronize(self.pos, inside_folder);
                        }
                    }
                }
                Err(error) => {
                    self.diagnostics
                        .push(Diagnostic::error(error.message, error.span));
                    self.synchronize(start, inside_folder);
                }
            }
        }
        statements
    }

    fn parse_statement(&mut self) -> StmtResult<Statement> {
        let index = self.next_index;
        self.next_index += 1;

        if self.at_keyword("table") && self.peek_nth(1) == Some(Token::LBrace) {
            return self.parse_table(index);
        }
        if self.at_keyword("folder") && self.peek_nth(1) == Some(Token::Str) {
            return self.parse_folder(index);
        }
        if self.at_keyword("image") && self.peek_nth(1) == Some(Token::Str) {
            return self.parse_image(index);
        }
        if self.at_keyword("settings") && is_statement_tail(self.peek_nth(1)) {
            return self.parse_settings(index);
        }
        let ticker_tail = self.peek_nth(1);
        if self.at_keyword("ticker")
            && (ticker_tail == Some(Token::StyleOpen)
                || ticker_tail.is_some_and(|t| t.starts_expression()))
        {
            return self.parse_ticker(index);
        }
        if self.peek() == Some(Token::Str) && is_statement_tail(self.peek_nth(1)) {
            return self.parse_text(index);
        }

        // expression statement, optionally with regression parameters
        let start_span = self.peek_span();
        let expr = self.parse_expr(binding::TOP)?;
        let parameters = if self.peek() == Some(Token::ParamsOpen) {
            Some(self.parse_regression_parameters()?)
        } else {
            None
        };
        let style = self.try_style()?;
        let span = statement_span(start_span, expr.span(), &style);
        let mut id = self.ids.assign(span);
        self.apply_id_override(&mut id, &style);
        Ok(Statement::Expr(ExprStatement {
            id,
            index,
            expr,
            parameters,
            style,
            span,
        }))
    }

    fn parse_table(&mut self, index: usize) -> StmtResult<Statement> {
        let keyword_span = self.peek_span();
        self.advance();
        self.expect(Token::LBrace, "{ after table")?;

        let mut columns = Vec::new();
        let close = loop {
            while self.eat(Token::Separator).is_some() {}
            if let Some(close) = self.eat(Token::RBrace) {
                break close;
            }
            if self.at_end() {
                return Err(StatementError::new("unclosed table", keyword_span));
            }
            columns.push(self.parse_table_column()?);
            match self.peek() {
                Some(Token::Separator) | Some(Token::RBrace) => {}
                _ => {
                    return Err(StatementError::new(
                        "expected the end of the column",
                        self.peek_span(),
                    ))
                }
            }
        };

        let style = self.try_style()?;
        let span = statement_span(keyword_span, close, &style);
        let mut id = self.ids.assign(span);
        self.apply_id_override(&mut id, &style);
        Ok(Statement::Table(TableStatement {
            id,
            index,
            columns,
            style,
            span,
        }))
    }

    fn parse_table_column(&mut self) -> StmtResult<ExprStatement> {
        let index = self.next_index;
        self.next_index += 1;
        let start_span = self.peek_span();
        let expr = self.parse_expr(binding::TOP)?;
        let style = self.try_style()?;
        let span = statement_span(start_span, expr.span(), &style);
        let mut id = self.ids.assign(span);
        self.apply_id_override(&mut id, &style);
        Ok(ExprStatement {
            id,
            index,
            expr,
            parameters: None,
            style,
            span,
        })
    }

    fn parse_folder(&mut self, index: usize) -> StmtResult<Statement> {
        let keyword_span = self.peek_span();
        self.advance();
        let title = unquote(self.peek_text(0));
        self.advance();
        self.expect(Token::LBrace, "{ after the folder title")?;
        let children = self.parse_statement_list(true);
        let close = self.expect(Token::RBrace, "a closing } for the folder")?;
        let style = self.try_style()?;
        let span = statement_span(keyword_span, close, &style);
        let mut id = self.ids.assign(span);
        self.apply_id_override(&mut id, &style);
        Ok(Statement::Folder(FolderStatement {
            id,
            index,
            title,
            children,
            style,
            span,
        }))
    }

    fn parse_image(&mut self, index: usize) -> StmtResult<Statement> {
        let keyword_span = self.peek_span();
        self.advance();
        let name = unquote(self.peek_text(0));
        let name_span = self.peek_span();
        self.advance();
        let style = self.try_style()?;
        let span = statement_span(keyword_span, name_span, &style);
        let mut id = self.ids.assign(span);
        self.apply_id_override(&mut id, &style);
        Ok(Statement::Image(ImageStatement {
            id,
            index,
            name,
            style,
            span,
        }))
    }

    fn parse_settings(&mut self, index: usize) -> StmtResult<Statement> {
        let keyword_span = self.peek_span();
        self.advance();
        let style = self.try_style()?;
        let span = statement_span(keyword_span, keyword_span, &style);
        let id = self.ids.assign(span);
        Ok(Statement::Settings(SettingsStatement {
            id,
            index,
            style,
            span,
        }))
    }

    fn parse_ticker(&mut self, index: usize) -> StmtResult<Statement> {
        let keyword_span = self.peek_span();
        self.advance();
        let handler = if self.peek() == Some(Token::StyleOpen) {
            None
        } else {
            Some(self.parse_expr(binding::TOP)?)
        };
        let style = self.try_style()?;
        let end = handler.as_ref().map(|h| h.span()).unwrap_or(keyword_span);
        let span = statement_span(keyword_span, end, &style);
        let mut id = self.ids.assign(span);
        self.apply_id_override(&mut id, &style);
        Ok(Statement::Ticker(TickerStatement {
            id,
            index,
            handler,
            style,
            span,
        }))
    }

    fn parse_text(&mut self, index: usize) -> StmtResult<Statement> {
        let text_span = self.peek_span();
        let text = unquote(self.peek_text(0));
        self.advance();
        let style = self.try_style()?;
        let span = statement_span(text_span, text_span, &style);
        let mut id = self.ids.assign(span);
        self.apply_id_override(&mut id, &style);
        Ok(Statement::Text(TextStatement {
            id,
            index,
            text,
            style,
            span,
        }))
    }

    fn try_style(&mut self) -> StmtResult<Option<StyleMapping>> {
        if self.peek() == Some(Token::StyleOpen) {
            Ok(Some(self.parse_style_mapping()?))
        } else {
            Ok(None)
        }
    }

    pub(crate) fn parse_style_mapping(&mut self) -> StmtResult<StyleMapping> {
        let open = self.expect(Token::StyleOpen, "@{")?;
        let mut entries = Vec::new();
        if self.peek() != Some(Token::RBrace) {
            loop {
                let property = self.parse_ident("a style property name")?;
                self.expect(Token::Colon, ": after the property name")?;
                let value = if self.peek() == Some(Token::StyleOpen) {
                    StyleValueNode::Map(self.parse_style_mapping()?)
                } else {
                    StyleValueNode::Expr(self.parse_expr(binding::SEQ)?)
                };
                entries.push(MappingEntry { property, value });
                if self.eat(Token::Comma).is_none() || self.peek() == Some(Token::RBrace) {
                    break;
                }
            }
        }
        let close = self.expect(Token::RBrace, "a closing } for the style mapping")?;
        Ok(StyleMapping {
            entries,
            span: open.to(close),
        })
    }

    fn parse_regression_parameters(&mut self) -> StmtResult<RegressionParameters> {
        let open = self.expect(Token::ParamsOpen, "#{")?;
        let mut entries = Vec::new();
        if self.peek() != Some(Token::RBrace) {
            loop {
                let name = self.parse_ident("a parameter name")?;
                self.expect(Token::Equals, "= after the parameter name")?;
                let value = self.parse_expr(binding::SEQ)?;
                entries.push((name, value));
                if self.eat(Token::Comma).is_none() || self.peek() == Some(Token::RBrace) {
                    break;
                }
            }
        }
        let close = self.expect(Token::RBrace, "a closing } for the parameter block")?;
        Ok(RegressionParameters {
            entries,
            span: open.to(close),
        })
    }

    /// An explicit `id:` style entry overrides the computed id when the
    /// literal has at least one non-digit character and is outside the
    /// reserved `__` namespace; duplicate `id:` entries are an error.
    fn apply_id_override(&mut self, id: &mut String, style: &Option<StyleMapping>) {
        let Some(mapping) = style else { return };
        let entries: Vec<&MappingEntry> = mapping.entries_named("id").collect();
        let Some(first) = entries.first() else { return };
        for duplicate in entries.iter().skip(1) {
            self.diagnostics.push(Diagnostic::error(
                "duplicate id property",
                duplicate.property.span,
            ));
        }
        if let StyleValueNode::Expr(Expr::Str { value, .. }) = &first.value {
            if valid_explicit_id(value) {
                self.ids.replace(id, value);
                *id = value.clone();
            } else {
                self.diagnostics.push(Diagnostic::warning(
                    format!("ignoring invalid explicit id {:?}", value),
                    first.property.span,
                ));
            }
        }
    }
}

/// Tokens that may legally follow a complete statement
fn is_statement_tail(token: Option<Token>) -> bool {
    matches!(
        token,
        None | Some(Token::Separator) | Some(Token::RBrace) | Some(Token::StyleOpen)
    )
}

fn statement_span(start: Span, body_end: Span, style: &Option<StyleMapping>) -> Span {
    let end = style.as_ref().map(|s| s.span).unwrap_or(body_end);
    start.to(body_end).to(end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ids::IdRange;
    use crate::parser::parse;

    #[test]
    fn test_statement_kinds() {
        let result = parse(
            "y = x\n\ntable { x1 = [1] }\n\nfolder \"t\" { 1 }\n\nimage \"i\" @{url: \"u\"}\n\nsettings @{degreeMode: true}\n\nticker a -> a + 1\n\n\"a note\"",
            &[],
        );
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        let kinds: Vec<_> = result
            .program
            .statements
            .iter()
            .map(|s| match s {
                Statement::Expr(_) => "expr",
                Statement::Table(_) => "table",
                Statement::Image(_) => "image",
                Statement::Text(_) => "text",
                Statement::Folder(_) => "folder",
                Statement::Settings(_) => "settings",
                Statement::Ticker(_) => "ticker",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["expr", "table", "folder", "image", "settings", "ticker", "text"]
        );
    }

    #[test]
    fn test_keywords_are_contextual() {
        let result = parse("table = 7; sum(L); folder + 1", &[]);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        assert!(result
            .program
            .statements
            .iter()
            .all(|s| matches!(s, Statement::Expr(_))));
    }

    #[test]
    fn test_indexes_are_document_order() {
        let result = parse("a = 1\n\nfolder \"f\" { b = 2\n\nc = 3 }\n\nd = 4", &[]);
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.program.statements[0].index(), 0);
        match &result.program.statements[1] {
            Statement::Folder(folder) => {
                assert_eq!(folder.index, 1);
                assert_eq!(folder.children[0].index(), 2);
                assert_eq!(folder.children[1].index(), 3);
            }
            other => panic!("expected folder, got {:?}", other),
        }
        assert_eq!(result.program.statements[2].index(), 4);
    }

    #[test]
    fn test_id_hint_reuse() {
        let source = "a = 1\n\nb = 2";
        let hints = vec![IdRange {
            from: 7,
            to: 12,
            id: "42".into(),
        }];
        let result = parse(source, &hints);
        assert_eq!(result.program.statements[0].id(), "1");
        assert_eq!(result.program.statements[1].id(), "42");
    }

    #[test]
    fn test_edit_outside_ranges_gets_fresh_id() {
        let hints = vec![IdRange {
            from: 0,
            to: 5,
            id: "3".into(),
        }];
        let result = parse("a = 1\n\nb = 2", &hints);
        assert_eq!(result.program.statements[0].id(), "3");
        // "3" was reused; the fresh id skips nothing and starts at "1"
        assert_eq!(result.program.statements[1].id(), "1");
    }

    #[test]
    fn test_explicit_id_override() {
        let result = parse("y = x @{id: \"loss\"}", &[]);
        assert_eq!(result.program.statements[0].id(), "loss");
    }

    #[test]
    fn test_numeric_explicit_id_is_ignored() {
        let result = parse("y = x @{id: \"123\"}", &[]);
        assert_eq!(result.program.statements[0].id(), "1");
        assert!(result.diagnostics.iter().any(|d| !d.is_error()));
    }

    #[test]
    fn test_duplicate_explicit_id_is_an_error() {
        let result = parse("y = x @{id: \"a1\", id: \"b2\"}", &[]);
        assert!(result.diagnostics.iter().any(|d| d.is_error()));
        assert_eq!(result.program.statements[0].id(), "a1");
    }

    #[test]
    fn test_regression_parameter_block() {
        let result = parse("y1 ~ m * x1 + b #{m = 1, b = 2}", &[]);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        match &result.program.statements[0] {
            Statement::Expr(s) => {
                assert!(matches!(s.expr, Expr::Regression { .. }));
                assert_eq!(s.parameters.as_ref().unwrap().entries.len(), 2);
            }
            other => panic!("expected expression statement, got {:?}", other),
        }
    }

    #[test]
    fn test_recovery_inside_folder() {
        let result = parse("folder \"f\" { a = ^; b = 2 }", &[]);
        assert!(result.diagnostics.iter().any(|d| d.is_error()));
        match &result.program.statements[0] {
            Statement::Folder(folder) => assert_eq!(folder.children.len(), 1),
            other => panic!("expected folder, got {:?}", other),
        }
    }

    #[test]
    fn test_ticker_without_handler() {
        let result = parse("ticker @{minStep: 100}", &[]);
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
        match &result.program.statements[0] {
            Statement::Ticker(ticker) => assert!(ticker.handler.is_none()),
            other => panic!("expected ticker, got {:?}", other),
        }
    }
}
