//! Statement nodes and the program root
//!
//! A [`Program`] is an ordered sequence of statements. Every statement carries
//! a stable string id, a sequential document-order index, an optional trailing
//! style mapping, and a source span. Folders contain child statements (one
//! nesting level only); tables contain columns, which reuse the expression
//! statement shape.

use serde::{Deserialize, Serialize};

use crate::ast::expr::{Expr, Ident};
use crate::ast::span::Span;

/// The root node of a parsed document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub span: Span,
}

impl Program {
    pub fn empty() -> Self {
        Program {
            statements: Vec::new(),
            span: Span::SYNTHETIC,
        }
    }

    /// Look up a statement (including folder children and table columns) by id
    pub fn statement_with_id(&self, id: &str) -> Option<&Statement> {
        fn search<'a>(statements: &'a [Statement], id: &str) -> Option<&'a Statement> {
            for statement in statements {
                if statement.id() == id {
                    return Some(statement);
                }
                if let Statement::Folder(folder) = statement {
                    if let Some(found) = search(&folder.children, id) {
                        return Some(found);
                    }
                }
            }
            None
        }
        search(&self.statements, id)
    }

    /// A copy with every span made synthetic and every id/index cleared
    ///
    /// Ids and spans are parse-time bookkeeping, not syntax; round-trip tests
    /// compare normalized programs.
    pub fn normalized(&self) -> Program {
        let mut copy = self.clone();
        copy.span = Span::SYNTHETIC;
        for statement in &mut copy.statements {
            normalize_statement(statement);
        }
        copy
    }
}

fn normalize_statement(statement: &mut Statement) {
    match statement {
        Statement::Expr(s) => normalize_expr_statement(s),
        Statement::Table(s) => {
            s.id.clear();
            s.index = 0;
            s.span = Span::SYNTHETIC;
            for column in &mut s.columns {
                normalize_expr_statement(column);
            }
            normalize_style(&mut s.style);
        }
        Statement::Image(s) => {
            s.id.clear();
            s.index = 0;
            s.span = Span::SYNTHETIC;
            normalize_style(&mut s.style);
        }
        Statement::Text(s) => {
            s.id.clear();
            s.index = 0;
            s.span = Span::SYNTHETIC;
            normalize_style(&mut s.style);
        }
        Statement::Folder(s) => {
            s.id.clear();
            s.index = 0;
            s.span = Span::SYNTHETIC;
            for child in &mut s.children {
                normalize_statement(child);
            }
            normalize_style(&mut s.style);
        }
        Statement::Settings(s) => {
            s.id.clear();
            s.index = 0;
            s.span = Span::SYNTHETIC;
            normalize_style(&mut s.style);
        }
        Statement::Ticker(s) => {
            s.id.clear();
            s.index = 0;
            s.span = Span::SYNTHETIC;
            if let Some(handler) = &mut s.handler {
                normalize_expr(handler);
            }
            normalize_style(&mut s.style);
        }
    }
}

fn normalize_expr_statement(statement: &mut ExprStatement) {
    statement.id.clear();
    statement.index = 0;
    statement.span = Span::SYNTHETIC;
    normalize_expr(&mut statement.expr);
    if let Some(parameters) = &mut statement.parameters {
        parameters.span = Span::SYNTHETIC;
        for (name, value) in &mut parameters.entries {
            name.span = Span::SYNTHETIC;
            normalize_expr(value);
        }
    }
    normalize_style(&mut statement.style);
}

fn normalize_style(style: &mut Option<StyleMapping>) {
    if let Some(mapping) = style {
        normalize_mapping(mapping);
    }
}

fn normalize_mapping(mapping: &mut StyleMapping) {
    mapping.span = Span::SYNTHETIC;
    for entry in &mut mapping.entries {
        entry.property.span = Span::SYNTHETIC;
        match &mut entry.value {
            StyleValueNode::Expr(expr) => normalize_expr(expr),
            StyleValueNode::Map(nested) => normalize_mapping(nested),
        }
    }
}

fn normalize_expr(expr: &mut Expr) {
    match expr {
        Expr::Number { span, .. } | Expr::Str { span, .. } => *span = Span::SYNTHETIC,
        Expr::Identifier(ident) => ident.span = Span::SYNTHETIC,
        Expr::List { elements, span } => {
            *span = Span::SYNTHETIC;
            elements.iter_mut().for_each(normalize_expr);
        }
        Expr::Range { start, end, span } => {
            *span = Span::SYNTHETIC;
            start.iter_mut().for_each(normalize_expr);
            end.iter_mut().for_each(normalize_expr);
        }
        Expr::ListComprehension {
            body,
            assignments,
            span,
        }
        | Expr::Substitution {
            body,
            assignments,
            span,
        } => {
            *span = Span::SYNTHETIC;
            normalize_expr(body);
            for assignment in assignments {
                assignment.span = Span::SYNTHETIC;
                assignment.variable.span = Span::SYNTHETIC;
                normalize_expr(&mut assignment.value);
            }
        }
        Expr::Piecewise {
            branches,
            otherwise,
            span,
        } => {
            *span = Span::SYNTHETIC;
            for branch in branches {
                branch.span = Span::SYNTHETIC;
                normalize_expr(&mut branch.condition);
                if let Some(value) = &mut branch.value {
                    normalize_expr(value);
                }
            }
            if let Some(otherwise) = otherwise {
                normalize_expr(otherwise);
            }
        }
        Expr::Negative { arg, span }
        | Expr::Factorial { arg, span }
        | Expr::Norm { arg, span } => {
            *span = Span::SYNTHETIC;
            normalize_expr(arg);
        }
        Expr::Binary {
            left, right, span, ..
        }
        | Expr::Comparator {
            left, right, span, ..
        }
        | Expr::Regression { left, right, span } => {
            *span = Span::SYNTHETIC;
            normalize_expr(left);
            normalize_expr(right);
        }
        Expr::DoubleInequality {
            left,
            middle,
            right,
            span,
            ..
        } => {
            *span = Span::SYNTHETIC;
            normalize_expr(left);
            normalize_expr(middle);
            normalize_expr(right);
        }
        Expr::Member {
            object,
            property,
            span,
        } => {
            *span = Span::SYNTHETIC;
            property.span = Span::SYNTHETIC;
            normalize_expr(object);
        }
        Expr::ListAccess { list, index, span } => {
            *span = Span::SYNTHETIC;
            normalize_expr(list);
            normalize_expr(index);
        }
        Expr::Call { callee, args, span } => {
            *span = Span::SYNTHETIC;
            normalize_expr(callee);
            args.iter_mut().for_each(normalize_expr);
        }
        Expr::Prime {
            callee, args, span, ..
        } => {
            *span = Span::SYNTHETIC;
            callee.span = Span::SYNTHETIC;
            args.iter_mut().for_each(normalize_expr);
        }
        Expr::Derivative {
            variable,
            body,
            span,
        } => {
            *span = Span::SYNTHETIC;
            variable.span = Span::SYNTHETIC;
            normalize_expr(body);
        }
        Expr::UpdateRule {
            variable,
            value,
            span,
        } => {
            *span = Span::SYNTHETIC;
            normalize_expr(variable);
            normalize_expr(value);
        }
        Expr::Sequence {
            left, right, span, ..
        } => {
            *span = Span::SYNTHETIC;
            normalize_expr(left);
            normalize_expr(right);
        }
        Expr::Repeated {
            variable,
            start,
            end,
            body,
            span,
            ..
        } => {
            *span = Span::SYNTHETIC;
            variable.span = Span::SYNTHETIC;
            normalize_expr(start);
            normalize_expr(end);
            normalize_expr(body);
        }
    }
}

/// The closed set of statement kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Expr(ExprStatement),
    Table(TableStatement),
    Image(ImageStatement),
    Text(TextStatement),
    Folder(FolderStatement),
    Settings(SettingsStatement),
    Ticker(TickerStatement),
}

impl Statement {
    pub fn id(&self) -> &str {
        match self {
            Statement::Expr(s) => &s.id,
            Statement::Table(s) => &s.id,
            Statement::Image(s) => &s.id,
            Statement::Text(s) => &s.id,
            Statement::Folder(s) => &s.id,
            Statement::Settings(s) => &s.id,
            Statement::Ticker(s) => &s.id,
        }
    }

    pub fn set_id(&mut self, id: String) {
        match self {
            Statement::Expr(s) => s.id = id,
            Statement::Table(s) => s.id = id,
            Statement::Image(s) => s.id = id,
            Statement::Text(s) => s.id = id,
            Statement::Folder(s) => s.id = id,
            Statement::Settings(s) => s.id = id,
            Statement::Ticker(s) => s.id = id,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Statement::Expr(s) => s.index,
            Statement::Table(s) => s.index,
            Statement::Image(s) => s.index,
            Statement::Text(s) => s.index,
            Statement::Folder(s) => s.index,
            Statement::Settings(s) => s.index,
            Statement::Ticker(s) => s.index,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Statement::Expr(s) => s.span,
            Statement::Table(s) => s.span,
            Statement::Image(s) => s.span,
            Statement::Text(s) => s.span,
            Statement::Folder(s) => s.span,
            Statement::Settings(s) => s.span,
            Statement::Ticker(s) => s.span,
        }
    }

    pub fn style(&self) -> Option<&StyleMapping> {
        match self {
            Statement::Expr(s) => s.style.as_ref(),
            Statement::Table(s) => s.style.as_ref(),
            Statement::Image(s) => s.style.as_ref(),
            Statement::Text(s) => s.style.as_ref(),
            Statement::Folder(s) => s.style.as_ref(),
            Statement::Settings(s) => s.style.as_ref(),
            Statement::Ticker(s) => s.style.as_ref(),
        }
    }
}

/// An expression statement; also the shape of a table column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprStatement {
    pub id: String,
    pub index: usize,
    pub expr: Expr,
    /// A trailing `#{ name = value, ... }` regression-parameter block
    pub parameters: Option<RegressionParameters>,
    pub style: Option<StyleMapping>,
    pub span: Span,
}

/// The `#{ a = 1, b = 2 }` block after a regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionParameters {
    pub entries: Vec<(Ident, Expr)>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStatement {
    pub id: String,
    pub index: usize,
    pub columns: Vec<ExprStatement>,
    pub style: Option<StyleMapping>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageStatement {
    pub id: String,
    pub index: usize,
    pub name: String,
    pub style: Option<StyleMapping>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStatement {
    pub id: String,
    pub index: usize,
    pub text: String,
    pub style: Option<StyleMapping>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderStatement {
    pub id: String,
    pub index: usize,
    pub title: String,
    pub children: Vec<Statement>,
    pub style: Option<StyleMapping>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsStatement {
    pub id: String,
    pub index: usize,
    pub style: Option<StyleMapping>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerStatement {
    pub id: String,
    pub index: usize,
    pub handler: Option<Expr>,
    pub style: Option<StyleMapping>,
    pub span: Span,
}

/// The `@{ key: value, ... }` block trailing a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleMapping {
    pub entries: Vec<MappingEntry>,
    pub span: Span,
}

impl StyleMapping {
    /// All entries whose property name equals `name`, in order
    pub fn entries_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a MappingEntry> {
        self.entries.iter().filter(move |e| e.property.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub property: Ident,
    pub value: StyleValueNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StyleValueNode {
    Expr(Expr),
    Map(StyleMapping),
}
