//! Expression parsing: the precedence-climbing core
//!
//! `parse_expr(min_bp)` parses an initial ("prefix") form selected by the
//! leading token, then folds infix and postfix continuations while their
//! binding power exceeds `min_bp`. See [`crate::parser::binding`] for the
//! tier list.

use crate::ast::{
    AssignmentEntry, BinaryOp, ComparatorOp, Expr, Ident, PiecewiseBranch, RepeatedOp, Span,
};
use crate::lexer::lexer_impl::unquote;
use crate::lexer::Token;
use crate::parser::binding;
use crate::parser::{Parser, StatementError, StmtResult};

impl<'a> Parser<'a> {
    pub(crate) fn parse_expr(&mut self, min_bp: u8) -> StmtResult<Expr> {
        let mut lhs = self.parse_initial()?;

        loop {
            let Some(token) = self.peek() else { break };
            match token {
                Token::Plus if binding::ADD > min_bp => {
                    self.advance();
                    lhs = self.binary(BinaryOp::Add, lhs, binding::ADD)?;
                }
                Token::Minus if binding::ADD > min_bp => {
                    self.advance();
                    lhs = self.binary(BinaryOp::Sub, lhs, binding::ADD)?;
                }
                Token::Star if binding::MUL > min_bp => {
                    self.advance();
                    lhs = self.binary(BinaryOp::Mul, lhs, binding::MUL)?;
                }
                Token::Slash if binding::MUL > min_bp => {
                    self.advance();
                    lhs = self.binary(BinaryOp::Div, lhs, binding::MUL)?;
                }
                Token::Caret if binding::POW > min_bp => {
                    self.advance();
                    // right-associative: the right operand re-admits `^`
                    lhs = self.binary(BinaryOp::Pow, lhs, binding::POW - 1)?;
                }
                Token::Bang if binding::POSTFIX > min_bp => {
                    let bang = self.peek_span();
                    self.advance();
                    let span = lhs.span().to(bang);
                    lhs = Expr::Factorial {
                        arg: Box::new(lhs),
                        span,
                    };
                }
                Token::Prime if binding::POSTFIX > min_bp => {
                    lhs = self.parse_prime(lhs)?;
                }
                Token::LParen if binding::CALL > min_bp => {
                    self.advance();
                    let (args, close) = self.parse_call_args()?;
                    let span = lhs.span().to(close);
                    lhs = Expr::Call {
                        callee: Box::new(lhs),
                        args,
                        span,
                    };
                }
                Token::LBracket if binding::ACCESS > min_bp => {
                    let open = self.peek_span();
                    self.advance();
                    let index = self.parse_bracket_tail(open, false)?;
                    let span = lhs.span().to(index.span());
                    lhs = Expr::ListAccess {
                        list: Box::new(lhs),
                        index: Box::new(index),
                        span,
                    };
                }
                Token::Dot if binding::MEMBER > min_bp => {
                    self.advance();
                    let property = self.parse_ident("a property name")?;
                    let span = lhs.span().to(property.span);
                    lhs = Expr::Member {
                        object: Box::new(lhs),
                        property,
                        span,
                    };
                }
                Token::Equals | Token::Less | Token::LessEq | Token::Greater | Token::GreaterEq
                    if binding::REL > min_bp =>
                {
                    lhs = self.parse_comparator(lhs, token)?;
                }
                Token::Tilde if binding::SIM > min_bp => {
                    self.advance();
                    let right = self.parse_expr(binding::SIM)?;
                    let span = lhs.span().to(right.span());
                    lhs = Expr::Regression {
                        left: Box::new(lhs),
                        right: Box::new(right),
                        span,
                    };
                }
                Token::Arrow if binding::UPDATE > min_bp => {
                    self.advance();
                    let value = self.parse_expr(binding::UPDATE)?;
                    let span = lhs.span().to(value.span());
                    lhs = Expr::UpdateRule {
                        variable: Box::new(lhs),
                        value: Box::new(value),
                        span,
                    };
                }
                Token::Comma if binding::SEQ > min_bp => {
                    self.advance();
                    // right-associative
                    let right = self.parse_expr(binding::SEQ - 1)?;
                    let span = lhs.span().to(right.span());
                    lhs = Expr::Sequence {
                        left: Box::new(lhs),
                        right: Box::new(right),
                        parenthesized: false,
                        span,
                    };
                }
                Token::Ident if binding::SUBST > min_bp && self.at_keyword("with") => {
                    self.advance();
                    let assignments = self.parse_assignment_list(binding::SUBST)?;
                    let last = assignments.last().map(|a| a.span).unwrap_or(lhs.span());
                    let span = lhs.span().to(last);
                    lhs = Expr::Substitution {
                        body: Box::new(lhs),
                        assignments,
                        span,
                    };
                }
                _ => break,
            }
        }

        Ok(lhs)
    }

    fn binary(&mut self, op: BinaryOp, left: Expr, right_bp: u8) -> StmtResult<Expr> {
        let right = self.parse_expr(right_bp)?;
        let span = left.span().to(right.span());
        Ok(Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        })
    }

    fn parse_comparator(&mut self, lhs: Expr, token: Token) -> StmtResult<Expr> {
        let op = match token {
            Token::Equals => ComparatorOp::Eq,
            Token::Less => ComparatorOp::Lt,
            Token::LessEq => ComparatorOp::Le,
            Token::GreaterEq => ComparatorOp::Ge,
            Token::Greater => ComparatorOp::Gt,
            _ => unreachable!("caller checked the token"),
        };
        let op_span = self.peek_span();
        self.advance();
        let right = self.parse_expr(binding::REL)?;

        match lhs {
            Expr::Comparator {
                op: left_op,
                left,
                right: middle,
                span,
            } => match (left_op.direction(), op.direction()) {
                (Some(a), Some(b)) if a == b => {
                    let span = span.to(right.span());
                    Ok(Expr::DoubleInequality {
                        left,
                        left_op,
                        middle,
                        right_op: op,
                        right: Box::new(right),
                        span,
                    })
                }
                _ => Err(StatementError::new(
                    "chained comparisons must point the same direction",
                    op_span,
                )),
            },
            Expr::DoubleInequality { .. } => Err(StatementError::new(
                "cannot chain more than two comparisons",
                op_span,
            )),
            _ => {
                let span = lhs.span().to(right.span());
                Ok(Expr::Comparator {
                    op,
                    left: Box::new(lhs),
                    right: Box::new(right),
                    span,
                })
            }
        }
    }

    fn parse_initial(&mut self) -> StmtResult<Expr> {
        let Some(token) = self.peek() else {
            return Err(StatementError::new(
                "unexpected end of input",
                self.peek_span(),
            ));
        };
        let span = self.peek_span();

        match token {
            Token::Number => {
                let text = self.peek_text(0);
                let value: f64 = text.parse().map_err(|_| {
                    StatementError::new(format!("malformed number {:?}", text), span)
                })?;
                self.advance();
                Ok(Expr::Number { value, span })
            }
            Token::Str => {
                let value = unquote(self.peek_text(0));
                self.advance();
                Ok(Expr::Str { value, span })
            }
            Token::Ident => {
                let text = self.peek_text(0);
                let repeated = match text {
                    "sum" => Some(RepeatedOp::Sum),
                    "product" => Some(RepeatedOp::Product),
                    "integral" => Some(RepeatedOp::Integral),
                    _ => None,
                };
                // the repeated form requires `sum v = (...)`; anything else
                // leaves the word an ordinary identifier
                if let Some(op) = repeated {
                    if self.peek_nth(1) == Some(Token::Ident)
                        && self.peek_nth(2) == Some(Token::Equals)
                    {
                        return self.parse_repeated(op);
                    }
                }
                let ident = Ident::new(text, span);
                self.advance();
                Ok(Expr::Identifier(ident))
            }
            Token::Minus => {
                self.advance();
                let arg = self.parse_expr(binding::PREFIX)?;
                let full = span.to(arg.span());
                Ok(Expr::Negative {
                    arg: Box::new(arg),
                    span: full,
                })
            }
            Token::LParen => self.parse_paren(),
            Token::Pipe => {
                self.advance();
                let arg = self.parse_expr(binding::TOP)?;
                let close = self.expect(Token::Pipe, "a closing |")?;
                Ok(Expr::Norm {
                    arg: Box::new(arg),
                    span: span.to(close),
                })
            }
            Token::LBracket => {
                self.advance();
                self.parse_bracket_tail(span, true)
            }
            Token::LBrace => self.parse_piecewise(),
            _ => Err(StatementError::new(
                format!("unexpected token {:?}", self.peek_text(0)),
                span,
            )),
        }
    }

    /// Grouping, a point literal, or the `(d/d x)` derivative special form
    fn parse_paren(&mut self) -> StmtResult<Expr> {
        let open = self.peek_span();
        self.advance();

        if self.peek() == Some(Token::DOverD) {
            self.advance();
            let variable = self.parse_ident("a differentiation variable")?;
            self.expect(Token::RParen, "a closing )")?;
            let body = self.parse_expr(binding::DERIV)?;
            let span = open.to(body.span());
            return Ok(Expr::Derivative {
                variable,
                body: Box::new(body),
                span,
            });
        }

        let inner = self.parse_expr(binding::TOP)?;
        let close = self.expect(Token::RParen, "a closing )")?;
        match inner {
            Expr::Sequence {
                left,
                right,
                parenthesized: _,
                ..
            } => Ok(Expr::Sequence {
                left,
                right,
                parenthesized: true,
                span: open.to(close),
            }),
            other => Ok(other),
        }
    }

    /// Contents of a bracket whose `[` is already consumed
    ///
    /// With `literal` set (a list literal), a single element produces a
    /// one-element list; without it (an access index), the bare expression is
    /// returned. Ranges and comprehensions are available either way.
    pub(crate) fn parse_bracket_tail(&mut self, open: Span, literal: bool) -> StmtResult<Expr> {
        if let Some(close) = self.eat(Token::RBracket) {
            return Ok(Expr::List {
                elements: Vec::new(),
                span: open.to(close),
            });
        }

        let first = self.parse_expr(binding::SEQ)?;

        if self.at_keyword("for") {
            self.advance();
            let assignments = self.parse_assignment_list(binding::SEQ)?;
            let close = self.expect(Token::RBracket, "a closing ]")?;
            return Ok(Expr::ListComprehension {
                body: Box::new(first),
                assignments,
                span: open.to(close),
            });
        }

        let mut elements = vec![first];
        loop {
            if let Some(close) = self.eat(Token::RBracket) {
                if !literal && elements.len() == 1 {
                    if let Some(single) = elements.pop() {
                        return Ok(single);
                    }
                }
                return Ok(Expr::List {
                    elements,
                    span: open.to(close),
                });
            }
            if self.eat(Token::Ellipsis).is_some() {
                let mut end = vec![self.parse_expr(binding::SEQ)?];
                while self.eat(Token::Comma).is_some() {
                    end.push(self.parse_expr(binding::SEQ)?);
                }
                let close = self.expect(Token::RBracket, "a closing ]")?;
                return Ok(Expr::Range {
                    start: elements,
                    end,
                    span: open.to(close),
                });
            }
            self.expect(Token::Comma, "a comma, ... or ]")?;
            elements.push(self.parse_expr(binding::SEQ)?);
        }
    }

    fn parse_piecewise(&mut self) -> StmtResult<Expr> {
        let open = self.peek_span();
        self.advance();

        if self.peek() == Some(Token::RBrace) {
            return Err(StatementError::new("empty piecewise", self.peek_span()));
        }

        let mut entries: Vec<(Expr, Option<Expr>, Span)> = Vec::new();
        loop {
            let condition = self.parse_expr(binding::SEQ)?;
            let mut entry_span = condition.span();
            let value = if self.eat(Token::Colon).is_some() {
                let value = self.parse_expr(binding::SEQ)?;
                entry_span = entry_span.to(value.span());
                Some(value)
            } else {
                None
            };
            entries.push((condition, value, entry_span));
            if self.eat(Token::Comma).is_none() {
                break;
            }
        }
        let close = self.expect(Token::RBrace, "a closing }")?;

        // the first branch's implicit form decides how bare entries read:
        // explicit first branch => a bare entry is the final else; implicit
        // first branch => bare entries are further conditions
        let bare_entries_are_conditions = entries[0].1.is_none();
        let mut branches = Vec::new();
        let mut otherwise = None;
        let count = entries.len();
        for (i, (condition, value, entry_span)) in entries.into_iter().enumerate() {
            if value.is_none() && !bare_entries_are_conditions && i > 0 {
                if i + 1 != count {
                    return Err(StatementError::new(
                        "the else branch must come last",
                        entry_span,
                    ));
                }
                otherwise = Some(Box::new(condition));
            } else {
                branches.push(PiecewiseBranch {
                    condition,
                    value,
                    span: entry_span,
                });
            }
        }

        Ok(Expr::Piecewise {
            branches,
            otherwise,
            span: open.to(close),
        })
    }

    fn parse_repeated(&mut self, op: RepeatedOp) -> StmtResult<Expr> {
        let keyword_span = self.peek_span();
        self.advance();
        let variable = self.parse_ident("an index variable")?;
        self.expect(Token::Equals, "=")?;
        self.expect(Token::LParen, "( before the bounds")?;
        let start = self.parse_expr(binding::SEQ)?;
        self.expect(Token::Ellipsis, "... between the bounds")?;
        let end = self.parse_expr(binding::SEQ)?;
        self.expect(Token::RParen, ") after the bounds")?;
        if !self.at_keyword("of") {
            return Err(StatementError::new(
                format!("expected of after the {} bounds", op.keyword()),
                self.peek_span(),
            ));
        }
        self.advance();
        let body = self.parse_expr(binding::DERIV)?;
        let span = keyword_span.to(body.span());
        Ok(Expr::Repeated {
            op,
            variable,
            start: Box::new(start),
            end: Box::new(end),
            body: Box::new(body),
            span,
        })
    }

    fn parse_prime(&mut self, lhs: Expr) -> StmtResult<Expr> {
        let prime_span = self.peek_span();
        let order = prime_span.end - prime_span.start;
        let callee = match lhs {
            Expr::Identifier(ident) => ident,
            other => {
                return Err(StatementError::new(
                    "prime requires a function name on its left",
                    other.span(),
                ))
            }
        };
        self.advance();
        self.expect(Token::LParen, "( after the prime")?;
        let (args, close) = self.parse_call_args()?;
        let span = callee.span.to(close);
        Ok(Expr::Prime {
            callee,
            order,
            args,
            span,
        })
    }

    /// Arguments of a call whose `(` is already consumed
    fn parse_call_args(&mut self) -> StmtResult<(Vec<Expr>, Span)> {
        if let Some(close) = self.eat(Token::RParen) {
            return Ok((Vec::new(), close));
        }
        let mut args = vec![self.parse_expr(binding::SEQ)?];
        while self.eat(Token::Comma).is_some() {
            args.push(self.parse_expr(binding::SEQ)?);
        }
        let close = self.expect(Token::RParen, "a closing )")?;
        Ok((args, close))
    }

    /// `v = expr` bindings separated by commas, as in `with` and `for`
    ///
    /// A comma continues the list only when followed by another `v =` head;
    /// otherwise it belongs to the surrounding expression.
    fn parse_assignment_list(&mut self, value_bp: u8) -> StmtResult<Vec<AssignmentEntry>> {
        let mut assignments = vec![self.parse_assignment_entry(value_bp)?];
        while self.peek() == Some(Token::Comma)
            && self.peek_nth(1) == Some(Token::Ident)
            && self.peek_nth(2) == Some(Token::Equals)
        {
            self.advance();
            assignments.push(self.parse_assignment_entry(value_bp)?);
        }
        Ok(assignments)
    }

    fn parse_assignment_entry(&mut self, value_bp: u8) -> StmtResult<AssignmentEntry> {
        let variable = self.parse_ident("a variable name")?;
        self.expect(Token::Equals, "=")?;
        let value = self.parse_expr(value_bp)?;
        let span = variable.span.to(value.span());
        Ok(AssignmentEntry {
            variable,
            value,
            span,
        })
    }

    pub(crate) fn parse_ident(&mut self, what: &str) -> StmtResult<Ident> {
        if self.peek() == Some(Token::Ident) {
            let ident = Ident::new(self.peek_text(0), self.peek_span());
            self.advance();
            Ok(ident)
        } else {
            Err(StatementError::new(
                format!("expected {}", what),
                self.peek_span(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer;

    fn expr(source: &str) -> Expr {
        let (tokens, diagnostics) = lexer::lex(source);
        assert!(diagnostics.is_empty(), "lex diagnostics: {:?}", diagnostics);
        let mut parser = Parser::new(source, tokens, vec![]);
        let parsed = parser.parse_expr(binding::TOP).expect("parse failed");
        assert!(parser.at_end(), "trailing tokens after expression");
        parsed
    }

    fn expr_err(source: &str) -> StatementError {
        let (tokens, _) = lexer::lex(source);
        let mut parser = Parser::new(source, tokens, vec![]);
        match parser.parse_expr(binding::TOP) {
            Err(e) => e,
            Ok(parsed) => panic!("expected a parse error, got {:?}", parsed),
        }
    }

    #[test]
    fn test_precedence_add_mul() {
        // 1 + 2 * 3 parses as 1 + (2 * 3)
        match expr("1 + 2 * 3") {
            Expr::Binary {
                op: BinaryOp::Add,
                right,
                ..
            } => assert!(matches!(
                *right,
                Expr::Binary {
                    op: BinaryOp::Mul,
                    ..
                }
            )),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_pow_right_associative() {
        // 2 ^ 3 ^ 4 parses as 2 ^ (3 ^ 4)
        match expr("2 ^ 3 ^ 4") {
            Expr::Binary {
                op: BinaryOp::Pow,
                left,
                right,
                ..
            } => {
                assert!(matches!(*left, Expr::Number { .. }));
                assert!(matches!(
                    *right,
                    Expr::Binary {
                        op: BinaryOp::Pow,
                        ..
                    }
                ));
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_unary_minus_binds_below_pow() {
        // -x^2 parses as -(x^2)
        match expr("-x^2") {
            Expr::Negative { arg, .. } => assert!(matches!(
                *arg,
                Expr::Binary {
                    op: BinaryOp::Pow,
                    ..
                }
            )),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_double_inequality_same_direction() {
        assert!(matches!(expr("2 < x < 5"), Expr::DoubleInequality { .. }));
        assert!(matches!(expr("5 >= x > 2"), Expr::DoubleInequality { .. }));
    }

    #[test]
    fn test_double_inequality_mixed_direction_fails() {
        let err = expr_err("2 < x > 5");
        assert!(err.message.contains("same direction"));
    }

    #[test]
    fn test_triple_chain_fails() {
        let err = expr_err("1 < x < 5 < 9");
        assert!(err.message.contains("chain"));
    }

    #[test]
    fn test_range_and_list() {
        assert!(matches!(expr("[1, 2, 3]"), Expr::List { .. }));
        match expr("[1, 2 ... 9, 10]") {
            Expr::Range { start, end, .. } => {
                assert_eq!(start.len(), 2);
                assert_eq!(end.len(), 2);
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_list_comprehension() {
        match expr("[x + 1 for x = [1, 2], y = [3]]") {
            Expr::ListComprehension { assignments, .. } => assert_eq!(assignments.len(), 2),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_access_index_is_not_wrapped() {
        match expr("L[2]") {
            Expr::ListAccess { index, .. } => assert!(matches!(*index, Expr::Number { .. })),
            other => panic!("unexpected shape {:?}", other),
        }
        match expr("L[1 ... 3]") {
            Expr::ListAccess { index, .. } => assert!(matches!(*index, Expr::Range { .. })),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_piecewise_forms() {
        match expr("{x > 1: 2, 7}") {
            Expr::Piecewise {
                branches,
                otherwise,
                ..
            } => {
                assert_eq!(branches.len(), 1);
                assert!(otherwise.is_some());
            }
            other => panic!("unexpected shape {:?}", other),
        }
        match expr("{x > 1, x < 5}") {
            Expr::Piecewise {
                branches,
                otherwise,
                ..
            } => {
                assert_eq!(branches.len(), 2);
                assert!(otherwise.is_none());
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_else_must_be_last() {
        let err = expr_err("{x > 1: 2, 7, x < 5: 3}");
        assert!(err.message.contains("last"));
    }

    #[test]
    fn test_prime_folds_into_call() {
        match expr("f''(x)") {
            Expr::Prime { order, args, .. } => {
                assert_eq!(order, 2);
                assert_eq!(args.len(), 1);
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_derivative_special_form() {
        match expr("(d/d x) x^2 + 1") {
            Expr::Derivative { variable, body, .. } => {
                assert_eq!(variable.name, "x");
                // additive binds inside the derivative body
                assert!(matches!(
                    *body,
                    Expr::Binary {
                        op: BinaryOp::Add,
                        ..
                    }
                ));
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_repeated_operator() {
        match expr("sum n = (1 ... 5) of n^2") {
            Expr::Repeated {
                op: RepeatedOp::Sum,
                variable,
                ..
            } => assert_eq!(variable.name, "n"),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_sum_without_binding_is_an_identifier() {
        assert!(matches!(expr("sum(L)"), Expr::Call { .. }));
    }

    #[test]
    fn test_substitution_assignment_list() {
        match expr("a + b with a = 1, b = 2") {
            Expr::Substitution { assignments, .. } => assert_eq!(assignments.len(), 2),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_update_rule_sequence() {
        match expr("a -> a + 1, b -> b - 1") {
            Expr::Sequence {
                left,
                right,
                parenthesized,
                ..
            } => {
                assert!(!parenthesized);
                assert!(matches!(*left, Expr::UpdateRule { .. }));
                assert!(matches!(*right, Expr::UpdateRule { .. }));
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_point_literal_is_marked_parenthesized() {
        match expr("(1, 2)") {
            Expr::Sequence { parenthesized, .. } => assert!(parenthesized),
            other => panic!("unexpected shape {:?}", other),
        }
    }

    #[test]
    fn test_member_and_norm() {
        assert!(matches!(expr("P.x"), Expr::Member { .. }));
        assert!(matches!(expr("|x - 1|"), Expr::Norm { .. }));
    }

    #[test]
    fn test_spans_nest() {
        let parsed = expr("1 + 2 * 3");
        let outer = parsed.span();
        match parsed {
            Expr::Binary { left, right, .. } => {
                assert!(outer.contains(&left.span()));
                assert!(outer.contains(&right.span()));
            }
            other => panic!("unexpected shape {:?}", other),
        }
    }
}
