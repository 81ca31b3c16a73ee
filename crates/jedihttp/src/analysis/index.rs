//! Per-buffer index: logical statements and the names they bind.
//!
//! Built once per request from the token stream. Scopes are not modeled;
//! every binding in the file is visible everywhere, and lookups prefer the
//! closest binding at or before the cursor.

use super::builtins::{is_keyword, LiteralType};
use super::scanner::{tokenize, Token, TokenKind};
use std::ops::Range;

/// Statements whose header ends at a top-level `:`
const COMPOUND_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "while", "for", "with", "try", "except", "finally", "def", "class",
    "async",
];

/// Longest alias chain followed by goto-definition
pub const MAX_ALIAS_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Function,
    Class,
    Assignment,
    Loop,
    Import,
    /// `as NAME` in imports, `with` and `except`
    Alias,
    Param,
    /// `obj.NAME = ...`
    Attribute,
}

#[derive(Debug, Clone)]
pub struct Binding<'src> {
    pub name: &'src str,
    pub kind: BindingKind,
    pub line: usize,
    pub col: usize,
    /// Statement making the binding
    pub statement: usize,
    /// Name tokens the assigned value is a plain reference to
    pub aliases: Vec<usize>,
    /// Type of the assigned value when it is a literal
    pub literal: Option<LiteralType>,
    pub docstring: String,
}

impl Binding<'_> {
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.col)
    }

    /// Reachable as `obj.NAME`: attribute assignments and methods.
    pub fn is_member(&self) -> bool {
        match self.kind {
            BindingKind::Attribute => true,
            BindingKind::Function => self.col > 0,
            _ => false,
        }
    }
}

pub struct SourceIndex<'src> {
    lines: Vec<&'src str>,
    tokens: Vec<Token<'src>>,
    comments: Vec<Token<'src>>,
    statements: Vec<Range<usize>>,
    bindings: Vec<Binding<'src>>,
}

impl<'src> SourceIndex<'src> {
    pub fn new(source: &'src str) -> Self {
        let lines = source
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        let (comments, tokens): (Vec<_>, Vec<_>) = tokenize(source)
            .into_iter()
            .partition(|t| t.kind == TokenKind::Comment);
        let statements = split_statements(&tokens);

        let mut index = Self {
            lines,
            tokens,
            comments,
            statements,
            bindings: Vec::new(),
        };
        index.bindings = index.find_bindings();
        index
    }

    pub fn tokens(&self) -> &[Token<'src>] {
        &self.tokens
    }

    pub fn bindings(&self) -> &[Binding<'src>] {
        &self.bindings
    }

    pub fn line(&self, line: usize) -> &'src str {
        line.checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
            .copied()
            .unwrap_or("")
    }

    // ========================================================================
    // Cursor queries
    // ========================================================================

    /// Whether the cursor sits inside a string literal or a comment.
    pub fn in_string_or_comment(&self, line: usize, col: usize) -> bool {
        let in_comment = self
            .comments
            .iter()
            .any(|c| c.line == line && c.col < col);
        let in_string = self
            .tokens
            .iter()
            .any(|t| {
                t.kind == TokenKind::Str && t.contains(line, col) && (t.line, t.col) != (line, col)
            });
        in_comment || in_string
    }

    /// Name token under the cursor, including one ending right at it.
    pub fn name_at(&self, line: usize, col: usize) -> Option<usize> {
        self.tokens.iter().position(|t| {
            t.kind == TokenKind::Name && t.line == line && t.col <= col && col <= t.end_col
        })
    }

    /// `.` token ending exactly at `(line, col)`.
    pub fn dot_ending_at(&self, line: usize, col: usize) -> Option<usize> {
        self.tokens
            .iter()
            .position(|t| t.kind == TokenKind::Dot && (t.end_line, t.end_col) == (line, col))
    }

    /// Whether the token at `idx` follows a `.`.
    pub fn is_member_access(&self, idx: usize) -> bool {
        idx > 0 && self.tokens[idx - 1].kind == TokenKind::Dot
    }

    /// Literal type of the receiver before the `.` at `dot`.
    pub fn receiver_type(&self, dot: usize) -> Option<LiteralType> {
        let receiver = self.tokens.get(dot.checked_sub(1)?)?;
        match receiver.kind {
            TokenKind::Str => Some(string_type(receiver.text)),
            TokenKind::Name => self
                .nearest_binding(receiver.text, (receiver.line, receiver.col))
                .and_then(|b| b.literal),
            _ => None,
        }
    }

    // ========================================================================
    // Binding lookups
    // ========================================================================

    /// Closest binding of `name` at or before `pos`, else the first one.
    pub fn nearest_binding(&self, name: &str, pos: (usize, usize)) -> Option<&Binding<'src>> {
        let mut first = None;
        let mut before = None;
        for binding in self.bindings.iter().filter(|b| is_named(b, name)) {
            first = first.or(Some(binding));
            if binding.position() <= pos {
                before = Some(binding);
            }
        }
        before.or(first)
    }

    /// Closest binding of `name` strictly before `pos`, else the first one
    /// not at `pos`.
    pub fn binding_before(&self, name: &str, pos: (usize, usize)) -> Option<&Binding<'src>> {
        let mut first = None;
        let mut before = None;
        let candidates = self
            .bindings
            .iter()
            .filter(|b| is_named(b, name) && b.position() != pos);
        for binding in candidates {
            first = first.or(Some(binding));
            if binding.position() < pos {
                before = Some(binding);
            }
        }
        before.or(first)
    }

    /// Binding made by the token at `idx`, if any.
    pub fn binding_at(&self, idx: usize) -> Option<&Binding<'src>> {
        let token = self.tokens.get(idx)?;
        self.bindings
            .iter()
            .find(|b| b.position() == (token.line, token.col))
    }

    /// Members (`obj.NAME`) named `name`.
    pub fn members(&self, name: &str) -> Vec<&Binding<'src>> {
        self.bindings
            .iter()
            .filter(|b| b.name == name && b.is_member())
            .collect()
    }

    // ========================================================================
    // Descriptions
    // ========================================================================

    /// `def f`, `class C`, `param x`, or the binding statement.
    pub fn describe(&self, binding: &Binding<'_>) -> String {
        match binding.kind {
            BindingKind::Function => format!("def {}", binding.name),
            BindingKind::Class => format!("class {}", binding.name),
            BindingKind::Param => format!("param {}", binding.name),
            _ => self.statement_text(binding.statement),
        }
    }

    /// Source text of the statement holding the token at `idx`.
    pub fn describe_token(&self, idx: usize) -> String {
        match self.statement_of(idx) {
            Some(statement) => self.statement_text(statement),
            None => self
                .tokens
                .get(idx)
                .map(|t| self.line(t.line).trim().to_string())
                .unwrap_or_default(),
        }
    }

    fn statement_of(&self, idx: usize) -> Option<usize> {
        let after = self.statements.partition_point(|r| r.start <= idx);
        let candidate = after.checked_sub(1)?;
        self.statements[candidate].contains(&idx).then_some(candidate)
    }

    fn statement_text(&self, statement: usize) -> String {
        let Some(range) = self.statements.get(statement) else {
            return String::new();
        };
        let first = self.tokens[range.start];
        let last = self.tokens[range.end - 1];
        self.text_between((first.line, first.col), (last.end_line, last.end_col))
    }

    /// Text from `start` to `end`; multi-line spans are joined with single
    /// spaces.
    fn text_between(&self, start: (usize, usize), end: (usize, usize)) -> String {
        if start.0 == end.0 {
            return self
                .line(start.0)
                .chars()
                .skip(start.1)
                .take(end.1.saturating_sub(start.1))
                .collect();
        }

        let mut parts = Vec::new();
        for line in start.0..=end.0 {
            let text = self.line(line);
            let part: String = if line == start.0 {
                text.chars().skip(start.1).collect()
            } else if line == end.0 {
                text.chars().take(end.1).collect()
            } else {
                text.to_string()
            };
            let part = part.trim();
            if !part.is_empty() {
                parts.push(part.to_string());
            }
        }
        parts.join(" ")
    }

    // ========================================================================
    // Binding discovery
    // ========================================================================

    fn find_bindings(&self) -> Vec<Binding<'src>> {
        let mut out = Vec::new();
        for (statement, range) in self.statements.iter().enumerate() {
            self.statement_bindings(statement, range.clone(), &mut out);
        }
        out.sort_by_key(|b| b.position());
        out
    }

    fn statement_bindings(&self, statement: usize, range: Range<usize>, out: &mut Vec<Binding<'src>>) {
        let mut lead = range.start;
        if self.tokens[lead].is_name("async") && lead + 1 < range.end {
            lead += 1;
        }

        match self.tokens[lead].text {
            "def" if self.tokens[lead].kind == TokenKind::Name => {
                self.function_bindings(statement, lead, range.end, out);
                return;
            }
            "class" if self.tokens[lead].kind == TokenKind::Name => {
                self.class_binding(statement, lead, range.end, out);
                return;
            }
            "import" if self.tokens[lead].kind == TokenKind::Name => {
                self.import_bindings(statement, lead + 1..range.end, out);
            }
            "from" if self.tokens[lead].kind == TokenKind::Name => {
                if let Some(import) = (lead..range.end).find(|&i| self.tokens[i].is_name("import")) {
                    self.import_bindings(statement, import + 1..range.end, out);
                }
            }
            _ => {}
        }

        for i in range.clone() {
            let token = self.tokens[i];
            if token.is_name("for") {
                self.loop_bindings(statement, i, range.end, out);
            } else if token.is_name("as") && i + 1 < range.end && self.is_plain_name(i + 1) {
                out.push(self.binding(i + 1, BindingKind::Alias, statement));
            } else if token.kind == TokenKind::Walrus && i > range.start && self.is_plain_name(i - 1) {
                out.push(self.binding(i - 1, BindingKind::Assignment, statement));
            }
        }

        self.assignment_bindings(statement, range, out);
    }

    fn function_bindings(
        &self,
        statement: usize,
        def: usize,
        header_end: usize,
        out: &mut Vec<Binding<'src>>,
    ) {
        let name = def + 1;
        if name >= header_end || !self.is_plain_name(name) {
            return;
        }

        let params = self
            .tokens
            .get(name + 1)
            .filter(|t| t.kind == TokenKind::LParen)
            .and_then(|_| Some((name + 1, self.matching_close(name + 1)?)));

        let signature = match params {
            Some((open, close)) => {
                let (o, c) = (self.tokens[open], self.tokens[close]);
                let inner = self.text_between((o.end_line, o.end_col), (c.line, c.col));
                format!(
                    "{}({})",
                    self.tokens[name].text,
                    inner.split_whitespace().collect::<Vec<_>>().join(" ")
                )
            }
            None => format!("{}()", self.tokens[name].text),
        };
        let doc = self.body_docstring(header_end);
        let mut binding = self.binding(name, BindingKind::Function, statement);
        binding.docstring = if doc.is_empty() {
            signature
        } else {
            format!("{}\n\n{}", signature, doc)
        };
        out.push(binding);

        if let Some((open, close)) = params {
            let depth = self.tokens[open].depth + 1;
            for i in open + 1..close {
                let prev = self.tokens[i - 1];
                let after_separator = matches!(prev.kind, TokenKind::LParen | TokenKind::Comma)
                    || (prev.kind == TokenKind::Op && matches!(prev.text, "*" | "**"));
                if self.tokens[i].depth == depth && after_separator && self.is_plain_name(i) {
                    out.push(self.binding(i, BindingKind::Param, statement));
                }
            }
        }
    }

    fn class_binding(
        &self,
        statement: usize,
        class: usize,
        header_end: usize,
        out: &mut Vec<Binding<'src>>,
    ) {
        let name = class + 1;
        if name < header_end && self.is_plain_name(name) {
            let mut binding = self.binding(name, BindingKind::Class, statement);
            binding.docstring = self.body_docstring(header_end);
            out.push(binding);
        }
    }

    /// `import a.b, c` binds `a` and `c`; `from m import x, y` binds `x`
    /// and `y`. Items renamed with `as` are left to the alias rule.
    fn import_bindings(&self, statement: usize, items: Range<usize>, out: &mut Vec<Binding<'src>>) {
        let mut item_start = items.start;
        for i in items.start..=items.end {
            let at_end = i == items.end || self.tokens[i].kind == TokenKind::Comma;
            if !at_end {
                continue;
            }
            let item = item_start..i;
            item_start = i + 1;

            if item.clone().any(|k| self.tokens[k].is_name("as")) {
                continue;
            }
            if let Some(first) = item
                .clone()
                .find(|&k| self.tokens[k].kind == TokenKind::Name)
            {
                if !is_keyword(self.tokens[first].text) {
                    out.push(self.binding(first, BindingKind::Import, statement));
                }
            }
        }
    }

    /// Targets between `for` and its `in`; covers comprehensions too.
    fn loop_bindings(&self, statement: usize, for_idx: usize, end: usize, out: &mut Vec<Binding<'src>>) {
        let depth = self.tokens[for_idx].depth;
        for i in for_idx + 1..end {
            let token = self.tokens[i];
            if token.is_name("in") && token.depth == depth {
                break;
            }
            if self.is_target_name(i) {
                out.push(self.binding(i, BindingKind::Loop, statement));
            }
        }
    }

    fn assignment_bindings(&self, statement: usize, range: Range<usize>, out: &mut Vec<Binding<'src>>) {
        let base = self.tokens[range.start].depth;
        let mut ops = Vec::new();
        for i in range.clone() {
            let token = self.tokens[i];
            if token.depth != base {
                continue;
            }
            if token.is_name("lambda") {
                break;
            }
            if matches!(token.kind, TokenKind::Assign | TokenKind::AugAssign) {
                ops.push(i);
            }
        }
        let Some(&last_op) = ops.last() else {
            return;
        };

        let value = last_op + 1..range.end;
        let (aliases, literal) = if self.tokens[last_op].kind == TokenKind::Assign {
            (self.alias_candidates(value.clone(), base), self.literal_type(value))
        } else {
            (Vec::new(), None)
        };

        let mut target_start = range.start;
        for &op in &ops {
            // `x: int = 1` annotates the target
            let target_end = (target_start..op)
                .find(|&k| self.tokens[k].kind == TokenKind::Colon && self.tokens[k].depth == base)
                .unwrap_or(op);

            for idx in self.target_names(target_start..target_end) {
                let kind = if self.is_member_access(idx) {
                    BindingKind::Attribute
                } else {
                    BindingKind::Assignment
                };
                let mut binding = self.binding(idx, kind, statement);
                binding.aliases = aliases.clone();
                binding.literal = literal;
                out.push(binding);
            }
            target_start = op + 1;
        }
    }

    /// Names bound by an assignment target list. Calls and subscripts are
    /// skipped, so `a[i] = x` binds nothing and `a.b = x` binds member `b`.
    fn target_names(&self, target: Range<usize>) -> Vec<usize> {
        let mut names = Vec::new();
        let mut skip_depth: Option<usize> = None;
        for i in target.clone() {
            let token = self.tokens[i];
            if let Some(depth) = skip_depth {
                if token.depth == depth && is_closer(token.kind) {
                    skip_depth = None;
                }
                continue;
            }
            match token.kind {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => {
                    let applied = i > target.start
                        && matches!(
                            self.tokens[i - 1].kind,
                            TokenKind::Name | TokenKind::RParen | TokenKind::RBracket | TokenKind::Str
                        );
                    if applied {
                        skip_depth = Some(token.depth);
                    }
                }
                TokenKind::Name => {
                    let continued = matches!(
                        self.tokens.get(i + 1).map(|t| t.kind),
                        Some(TokenKind::Dot | TokenKind::LParen | TokenKind::LBracket)
                    );
                    if !continued && !is_keyword(token.text) {
                        names.push(i);
                    }
                }
                _ => {}
            }
        }
        names
    }

    /// Name tokens a value expression evaluates to directly: `b` in `a = b`,
    /// both branches of `x if c else y`, the operands of `or`/`and`.
    fn alias_candidates(&self, value: Range<usize>, base: usize) -> Vec<usize> {
        let mut candidates = Vec::new();
        let mut part = Vec::new();
        let mut in_condition = false;

        let flush = |part: &mut Vec<usize>, in_condition: bool, candidates: &mut Vec<usize>| {
            if !in_condition && part.len() == 1 && self.is_plain_name(part[0]) {
                candidates.push(part[0]);
            }
            part.clear();
        };

        for i in value {
            let token = self.tokens[i];
            if token.depth == base && token.kind == TokenKind::Name {
                match token.text {
                    "if" => {
                        flush(&mut part, in_condition, &mut candidates);
                        in_condition = true;
                        continue;
                    }
                    "else" => {
                        flush(&mut part, in_condition, &mut candidates);
                        in_condition = false;
                        continue;
                    }
                    "or" | "and" => {
                        flush(&mut part, in_condition, &mut candidates);
                        continue;
                    }
                    "lambda" | "for" => return Vec::new(),
                    _ => {}
                }
            }
            if token.depth == base && token.kind == TokenKind::Comma {
                return Vec::new();
            }
            part.push(i);
        }
        flush(&mut part, in_condition, &mut candidates);
        candidates
    }

    fn literal_type(&self, value: Range<usize>) -> Option<LiteralType> {
        let tokens = self.tokens.get(value.clone())?;
        let first = tokens.first()?;
        let last = value.end - 1;

        match first.kind {
            TokenKind::Str if tokens.iter().all(|t| t.kind == TokenKind::Str) => {
                Some(string_type(first.text))
            }
            TokenKind::Number if tokens.len() == 1 => number_type(first.text),
            TokenKind::LBracket | TokenKind::LParen | TokenKind::LBrace => {
                let close = self.matching_close(value.start)?;
                if close != last {
                    return None;
                }
                let empty = close == value.start + 1;
                let inner = |kind: TokenKind| {
                    (value.start + 1..close)
                        .any(|k| self.tokens[k].kind == kind && self.tokens[k].depth == first.depth + 1)
                };
                match first.kind {
                    TokenKind::LBracket => Some(LiteralType::List),
                    TokenKind::LParen if empty || inner(TokenKind::Comma) => Some(LiteralType::Tuple),
                    TokenKind::LBrace if empty || inner(TokenKind::Colon) => Some(LiteralType::Dict),
                    TokenKind::LBrace => Some(LiteralType::Set),
                    _ => None,
                }
            }
            TokenKind::Name if tokens.get(1).map(|t| t.kind) == Some(TokenKind::LParen) => {
                if self.matching_close(value.start + 1)? != last {
                    return None;
                }
                LiteralType::from_constructor(first.text)
            }
            _ => None,
        }
    }

    /// Docstring of the block opened by the `:` at `colon`.
    fn body_docstring(&self, colon: usize) -> String {
        if self.tokens.get(colon).map(|t| t.kind) != Some(TokenKind::Colon) {
            return String::new();
        }
        let mut first = colon + 1;
        if self.tokens.get(first).map(|t| t.kind) == Some(TokenKind::Newline) {
            first += 1;
        }
        let Some(token) = self.tokens.get(first).filter(|t| t.kind == TokenKind::Str) else {
            return String::new();
        };
        let alone = matches!(
            self.tokens.get(first + 1).map(|t| t.kind),
            None | Some(TokenKind::Newline | TokenKind::Semicolon)
        );
        if alone {
            clean_docstring(token.text)
        } else {
            String::new()
        }
    }

    // ========================================================================
    // Token helpers
    // ========================================================================

    fn binding(&self, idx: usize, kind: BindingKind, statement: usize) -> Binding<'src> {
        let token = self.tokens[idx];
        Binding {
            name: token.text,
            kind,
            line: token.line,
            col: token.col,
            statement,
            aliases: Vec::new(),
            literal: None,
            docstring: String::new(),
        }
    }

    fn is_plain_name(&self, idx: usize) -> bool {
        self.tokens
            .get(idx)
            .is_some_and(|t| t.kind == TokenKind::Name && !is_keyword(t.text))
    }

    fn is_target_name(&self, idx: usize) -> bool {
        let next = self.tokens.get(idx + 1).map(|t| t.kind);
        self.is_plain_name(idx)
            && !self.is_member_access(idx)
            && !matches!(
                next,
                Some(TokenKind::Dot | TokenKind::LParen | TokenKind::LBracket)
            )
    }

    fn matching_close(&self, open: usize) -> Option<usize> {
        let depth = self.tokens.get(open)?.depth;
        (open + 1..self.tokens.len())
            .find(|&i| self.tokens[i].depth == depth && is_closer(self.tokens[i].kind))
    }
}

/// Plain name lookups skip attribute assignments.
fn is_named(binding: &Binding<'_>, name: &str) -> bool {
    binding.name == name && binding.kind != BindingKind::Attribute
}

fn is_closer(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace)
}

/// Split the token stream into logical statements.
///
/// Newlines and top-level `;` end a statement, and so does the `:` ending a
/// compound statement header, so `if x: y = 1` yields `if x` and `y = 1`.
/// Separators are not part of any statement.
fn split_statements(tokens: &[Token<'_>]) -> Vec<Range<usize>> {
    let mut statements = Vec::new();
    let mut start = 0;
    let mut header = false;

    for (i, token) in tokens.iter().enumerate() {
        if i == start {
            header = token.kind == TokenKind::Name && COMPOUND_KEYWORDS.contains(&token.text);
        }
        let base = tokens[start].depth;
        let ends = match token.kind {
            TokenKind::Newline => true,
            TokenKind::Semicolon => token.depth == base,
            TokenKind::Colon => header && token.depth == base,
            _ => false,
        };
        if ends {
            if i > start {
                statements.push(start..i);
            }
            start = i + 1;
        }
    }
    if start < tokens.len() {
        statements.push(start..tokens.len());
    }
    statements
}

fn string_type(literal: &str) -> LiteralType {
    let prefix = literal.split(['"', '\'']).next().unwrap_or("");
    if prefix.contains(['b', 'B']) {
        LiteralType::Bytes
    } else {
        LiteralType::Str
    }
}

fn number_type(literal: &str) -> Option<LiteralType> {
    let lower = literal.to_ascii_lowercase();
    if lower.ends_with('j') {
        None
    } else if lower.starts_with("0x") || lower.starts_with("0o") || lower.starts_with("0b") {
        Some(LiteralType::Int)
    } else if lower.contains(['.', 'e']) {
        Some(LiteralType::Float)
    } else {
        Some(LiteralType::Int)
    }
}

/// Strip quotes from a string literal and clean it the way Python's
/// `inspect.cleandoc` does: first line left-stripped, common indentation
/// of the rest removed, blank leading and trailing lines dropped.
pub fn clean_docstring(literal: &str) -> String {
    let body = literal.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    let quote = if body.starts_with("\"\"\"") || body.starts_with("'''") {
        &body[..3]
    } else if body.starts_with(['"', '\'']) {
        &body[..1]
    } else {
        return String::new();
    };
    let inner = &body[quote.len()..];
    let inner = if inner.len() >= quote.len() && inner.ends_with(quote) {
        &inner[..inner.len() - quote.len()]
    } else {
        inner
    };

    let lines: Vec<&str> = inner.lines().collect();
    let margin = lines
        .iter()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    let mut cleaned: Vec<&str> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            cleaned.push(line.trim_start());
        } else {
            cleaned.push(line.get(margin..).unwrap_or("").trim_end());
        }
    }
    while cleaned.last().is_some_and(|line| line.trim().is_empty()) {
        cleaned.pop();
    }
    while cleaned.first().is_some_and(|line| line.trim().is_empty()) {
        cleaned.remove(0);
    }
    cleaned.join("\n")
}
