//! A small layout algebra for the printer
//!
//! Statements build a [`Doc`] tree; [`render`] walks it once, deciding per
//! [`Doc::Group`] whether the grouped content fits on the current line. The
//! two suppression switches in [`PrintOptions`] produce the compact forms:
//! with `suppress_spaces` every optional space vanishes, and a
//! [`Doc::WordBoundary`] keeps exactly the spaces that stop two word tokens
//! from fusing into one.

/// Lines longer than this break any group that spans them
pub const MAX_WIDTH: usize = 80;

const INDENT: usize = 4;

/// Output shaping switches
///
/// Both default to off, producing the human layout. `suppress_newlines`
/// replaces statement separators with `;` and renders every group flat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrintOptions {
    pub suppress_spaces: bool,
    pub suppress_newlines: bool,
}

/// The layout tree
#[derive(Debug, Clone, PartialEq)]
pub enum Doc {
    Text(String),
    Concat(Vec<Doc>),
    /// Rendered flat when its flat width fits the current line
    Group(Box<Doc>),
    /// Deeper indentation for line breaks inside
    Indent(Box<Doc>),
    /// Nothing when flat, a line break when the group breaks
    SoftLine,
    /// An optional space when flat, a line break when the group breaks
    Line,
    /// Always a line break; nothing when newlines are suppressed
    HardLine,
    /// A space unless spaces are suppressed
    OptionalSpace,
    /// A space that suppression keeps wherever dropping it would fuse two
    /// word tokens
    WordBoundary,
    /// Between statements: a blank line, or `;` when newlines are suppressed
    StatementSep,
}

impl Doc {
    pub fn text(text: impl Into<String>) -> Doc {
        Doc::Text(text.into())
    }

    pub fn concat(parts: Vec<Doc>) -> Doc {
        Doc::Concat(parts)
    }

    pub fn group(inner: Doc) -> Doc {
        Doc::Group(Box::new(inner))
    }

    pub fn indent(inner: Doc) -> Doc {
        Doc::Indent(Box::new(inner))
    }

    /// Interleave `separator` between the given parts
    pub fn join(parts: Vec<Doc>, separator: Doc) -> Doc {
        let mut out = Vec::with_capacity(parts.len() * 2);
        for part in parts {
            if !out.is_empty() {
                out.push(separator.clone());
            }
            out.push(part);
        }
        Doc::Concat(out)
    }
}

/// Render a document to text
pub fn render(doc: &Doc, options: &PrintOptions) -> String {
    let mut renderer = Renderer {
        out: String::new(),
        column: 0,
        pending_word: false,
        options: *options,
    };
    renderer.walk(doc, 0, options.suppress_newlines);
    renderer.out
}

struct Renderer {
    out: String,
    column: usize,
    pending_word: bool,
    options: PrintOptions,
}

impl Renderer {
    fn walk(&mut self, doc: &Doc, indent: usize, flat: bool) {
        match doc {
            Doc::Text(text) => self.emit(text),
            Doc::Concat(parts) => {
                for part in parts {
                    self.walk(part, indent, flat);
                }
            }
            Doc::Group(inner) => {
                let flatten = flat || self.fits(inner);
                self.walk(inner, indent, flatten);
            }
            Doc::Indent(inner) => self.walk(inner, indent + INDENT, flat),
            Doc::SoftLine => {
                if !flat {
                    self.newline(indent);
                }
            }
            Doc::Line => {
                if flat {
                    self.space();
                } else {
                    self.newline(indent);
                }
            }
            Doc::HardLine => {
                if !self.options.suppress_newlines {
                    self.newline(indent);
                }
            }
            Doc::OptionalSpace => self.space(),
            Doc::WordBoundary => {
                if self.options.suppress_spaces {
                    self.pending_word = true;
                } else {
                    self.emit(" ");
                }
            }
            Doc::StatementSep => {
                if self.options.suppress_newlines {
                    self.emit(";");
                } else {
                    self.out.push('\n');
                    self.newline(indent);
                }
            }
        }
    }

    fn space(&mut self) {
        if !self.options.suppress_spaces {
            self.emit(" ");
        }
    }

    fn emit(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.pending_word {
            self.pending_word = false;
            let fuses = self.out.chars().last().is_some_and(is_word)
                && text.chars().next().is_some_and(is_word);
            if fuses {
                self.out.push(' ');
                self.column += 1;
            }
        }
        self.out.push_str(text);
        self.column += text.chars().count();
    }

    fn newline(&mut self, indent: usize) {
        self.pending_word = false;
        self.out.push('\n');
        for _ in 0..indent {
            self.out.push(' ');
        }
        self.column = indent;
    }

    fn fits(&self, doc: &Doc) -> bool {
        match flat_width(doc, &self.options) {
            Some(width) => self.column + width <= MAX_WIDTH,
            None => false,
        }
    }
}

/// Adjacent occurrences of these would lex as a single token
fn is_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Width of `doc` rendered flat; `None` if it contains a forced break
fn flat_width(doc: &Doc, options: &PrintOptions) -> Option<usize> {
    match doc {
        Doc::Text(text) => Some(text.chars().count()),
        Doc::Concat(parts) => {
            let mut total = 0;
            for part in parts {
                total += flat_width(part, options)?;
            }
            Some(total)
        }
        Doc::Group(inner) | Doc::Indent(inner) => flat_width(inner, options),
        Doc::SoftLine => Some(0),
        Doc::Line | Doc::OptionalSpace => Some(if options.suppress_spaces { 0 } else { 1 }),
        Doc::WordBoundary => Some(1),
        Doc::HardLine | Doc::StatementSep => None,
    }
}
