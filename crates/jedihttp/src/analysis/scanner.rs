//! Python tokenizer.
//!
//! Built on `logos`. The raw token stream is post-processed to:
//!
//! - drop newlines inside brackets and blank lines, so every remaining
//!   [`TokenKind::Newline`] ends a logical line
//! - record the bracket depth of every token
//! - translate byte spans into 1-based lines and 0-based character columns
//!
//! The scanner never fails. Characters Python does not allow (`$`, `?`, a
//! stray quote) are dropped, which keeps half-typed buffers analyzable.

use logos::{Lexer, Logos};

/// Token kinds produced by the scanner.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\f\r]+")]
#[logos(skip r"\\\r?\n")]
pub enum TokenKind {
    /// End of a logical line
    #[token("\n")]
    Newline,

    /// `# ...` up to the end of the line
    #[regex(r"#[^\n]*")]
    Comment,

    /// Identifier or keyword
    #[regex(r"[a-zA-Z_\u{80}-\u{10FFFF}][a-zA-Z0-9_\u{80}-\u{10FFFF}]*")]
    Name,

    /// Numeric literal
    #[regex(r"[0-9][0-9_]*(\.[0-9_]*)?([eE][+-]?[0-9_]+)?[jJ]?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9_]+)?[jJ]?")]
    #[regex(r"0[xXoObB][0-9a-fA-F_]+")]
    Number,

    /// String or bytes literal, any prefix, single or triple quoted
    #[regex(r#"[rRbBuUfF]?[rRbBuUfF]?"([^"\\\n]|\\.|\\\n)*""#)]
    #[regex(r#"[rRbBuUfF]?[rRbBuUfF]?'([^'\\\n]|\\.|\\\n)*'"#)]
    #[regex(r#"[rRbBuUfF]?[rRbBuUfF]?""""#, |lex| triple_quoted(lex, "\"\"\""))]
    #[regex(r#"[rRbBuUfF]?[rRbBuUfF]?'''"#, |lex| triple_quoted(lex, "'''"))]
    Str,

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

    #[token(".")]
    Dot,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Assign,
    #[token(":=")]
    Walrus,

    /// `+=`, `-=` and the other in-place operators
    #[token("+=")]
    #[token("-=")]
    #[token("*=")]
    #[token("/=")]
    #[token("//=")]
    #[token("%=")]
    #[token("@=")]
    #[token("&=")]
    #[token("|=")]
    #[token("^=")]
    #[token(">>=")]
    #[token("<<=")]
    #[token("**=")]
    AugAssign,

    /// Every other operator
    #[token("+")]
    #[token("-")]
    #[token("*")]
    #[token("/")]
    #[token("%")]
    #[token("@")]
    #[token("&")]
    #[token("|")]
    #[token("^")]
    #[token("~")]
    #[token("<")]
    #[token(">")]
    #[token("==")]
    #[token("!=")]
    #[token("<=")]
    #[token(">=")]
    #[token("**")]
    #[token("//")]
    #[token("<<")]
    #[token(">>")]
    #[token("->")]
    #[token("...")]
    Op,
}

/// Consume a triple-quoted body up to and including `close`.
///
/// An unterminated literal runs to the end of the buffer.
fn triple_quoted(lex: &mut Lexer<TokenKind>, close: &str) -> bool {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            i += 2;
            continue;
        }
        if bytes[i..].starts_with(close.as_bytes()) {
            lex.bump(i + close.len());
            return true;
        }
        i += 1;
    }
    let len = bytes.len();
    lex.bump(len);
    true
}

/// A token with its position in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    /// 1-based line of the first character
    pub line: usize,
    /// 0-based character column of the first character
    pub col: usize,
    pub end_line: usize,
    /// Column one past the last character
    pub end_col: usize,
    /// Open brackets enclosing the token; a bracket pair shares its depth
    pub depth: usize,
}

impl Token<'_> {
    /// Whether `(line, col)` falls on this token, end exclusive.
    pub fn contains(&self, line: usize, col: usize) -> bool {
        (self.line, self.col) <= (line, col) && (line, col) < (self.end_line, self.end_col)
    }

    pub fn is_name(&self, text: &str) -> bool {
        self.kind == TokenKind::Name && self.text == text
    }
}

/// Byte offset to (line, column) translation.
struct LineIndex<'src> {
    source: &'src str,
    starts: Vec<usize>,
}

impl<'src> LineIndex<'src> {
    fn new(source: &'src str) -> Self {
        let mut starts = vec![0];
        starts.extend(source.match_indices('\n').map(|(i, _)| i + 1));
        Self { source, starts }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        let idx = self.starts.partition_point(|&start| start <= offset) - 1;
        let col = self.source[self.starts[idx]..offset].chars().count();
        (idx + 1, col)
    }
}

/// Tokenize `source`.
///
/// Comments are kept in the stream; callers filter them as needed.
pub fn tokenize(source: &str) -> Vec<Token<'_>> {
    let index = LineIndex::new(source);
    let mut lexer = TokenKind::lexer(source);
    let mut tokens: Vec<Token<'_>> = Vec::new();
    let mut depth = 0usize;

    while let Some(result) = lexer.next() {
        let Ok(kind) = result else {
            continue;
        };
        let span = lexer.span();

        if kind == TokenKind::Newline {
            let last_code = tokens.iter().rev().find(|t| t.kind != TokenKind::Comment);
            let ends_statement = matches!(last_code, Some(t) if t.kind != TokenKind::Newline);
            if depth > 0 || !ends_statement {
                continue;
            }
        }

        let token_depth = match kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                depth += 1;
                depth - 1
            }
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                depth = depth.saturating_sub(1);
                depth
            }
            _ => depth,
        };

        let (line, col) = index.position(span.start);
        let (end_line, end_col) = index.position(span.end);
        tokens.push(Token {
            kind,
            text: lexer.slice(),
            line,
            col,
            end_line,
            end_col,
            depth: token_depth,
        });
    }

    tokens
}
