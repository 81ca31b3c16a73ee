//! Built-in Python analysis engine.

use super::builtins::{builtin_description, builtin_names, is_keyword, KEYWORDS};
use super::index::{Binding, BindingKind, SourceIndex, MAX_ALIAS_DEPTH};
use super::scanner::TokenKind;
use super::{check_position, AnalysisError, Analyzer};
use crate::domain::types::{AnalysisRequest, Completion, Definition};
use std::collections::btree_map::{BTreeMap, Entry};
use std::collections::HashSet;

/// Token-based Python analyzer.
///
/// Stateless: every request re-tokenizes its buffer, so one instance serves
/// all workers.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexicalAnalyzer;

impl LexicalAnalyzer {
    /// Create the engine. It holds no state.
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for LexicalAnalyzer {
    fn completions(&self, request: &AnalysisRequest) -> Result<Vec<Completion>, AnalysisError> {
        Ok(Query::new(request)?.completions())
    }

    fn goto_definitions(&self, request: &AnalysisRequest) -> Result<Vec<Definition>, AnalysisError> {
        Ok(Query::new(request)?.goto_definitions())
    }

    fn goto_assignments(&self, request: &AnalysisRequest) -> Result<Vec<Definition>, AnalysisError> {
        Ok(Query::new(request)?.goto_assignments())
    }

    fn usages(&self, request: &AnalysisRequest) -> Result<Vec<Definition>, AnalysisError> {
        Ok(Query::new(request)?.usages())
    }
}

/// A validated cursor over one indexed buffer.
struct Query<'req> {
    index: SourceIndex<'req>,
    path: &'req str,
    line: usize,
    col: usize,
}

impl<'req> Query<'req> {
    fn new(request: &'req AnalysisRequest) -> Result<Self, AnalysisError> {
        check_position(&request.source, request.line, request.col)?;
        Ok(Self {
            index: SourceIndex::new(&request.source),
            path: &request.source_path,
            line: request.line,
            col: request.col,
        })
    }

    fn cursor(&self) -> (usize, usize) {
        (self.line, self.col)
    }

    // ========================================================================
    // Completions
    // ========================================================================

    fn completions(&self) -> Vec<Completion> {
        if self.index.in_string_or_comment(self.line, self.col) {
            return Vec::new();
        }

        let chars: Vec<char> = self.index.line(self.line).chars().collect();
        let mut start = self.col.min(chars.len());
        while start > 0 && is_identifier_char(chars[start - 1]) {
            start -= 1;
        }
        let prefix: String = chars[start..self.col.min(chars.len())].iter().collect();
        if prefix.starts_with(|c: char| c.is_ascii_digit()) {
            return Vec::new();
        }

        match self.index.dot_ending_at(self.line, start) {
            Some(dot) => self.member_completions(dot, &prefix, start),
            None => self.name_completions(&prefix, start),
        }
    }

    /// After `receiver.`: members of a literal receiver's type, then every
    /// member name the file defines or accesses.
    fn member_completions(&self, dot: usize, prefix: &str, start: usize) -> Vec<Completion> {
        let typed = (self.line, start);
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        if let Some(literal) = self.index.receiver_type(dot) {
            let mut members: Vec<&str> = literal.members().to_vec();
            members.sort_unstable();
            for member in members {
                if member.starts_with(prefix) && seen.insert(member.to_string()) {
                    out.push(builtin_completion(member, format!("def {}", member)));
                }
            }
        }

        let mut file = Vec::new();
        for binding in self.index.bindings().iter().filter(|b| b.is_member()) {
            if binding.position() != typed
                && binding.name.starts_with(prefix)
                && seen.insert(binding.name.to_string())
            {
                file.push(self.completion(binding));
            }
        }
        for (idx, token) in self.index.tokens().iter().enumerate() {
            let accessed = token.kind == TokenKind::Name && self.index.is_member_access(idx);
            if accessed
                && (token.line, token.col) != typed
                && token.text.starts_with(prefix)
                && seen.insert(token.text.to_string())
            {
                file.push(Completion {
                    name: token.text.to_string(),
                    description: self.index.describe_token(idx),
                    docstring: String::new(),
                    module_path: Some(self.path.to_string()),
                    line: Some(token.line),
                    column: Some(token.col),
                });
            }
        }
        file.sort_by(|a, b| a.name.cmp(&b.name));

        out.extend(file);
        out
    }

    /// File bindings, then builtins, then keywords.
    fn name_completions(&self, prefix: &str, start: usize) -> Vec<Completion> {
        let typed = (self.line, start);
        let mut chosen: BTreeMap<&str, &Binding<'_>> = BTreeMap::new();
        for binding in self.index.bindings() {
            if binding.kind == BindingKind::Attribute
                || binding.position() == typed
                || !binding.name.starts_with(prefix)
            {
                continue;
            }
            match chosen.entry(binding.name) {
                Entry::Vacant(entry) => {
                    entry.insert(binding);
                }
                Entry::Occupied(mut entry) => {
                    if binding.position() <= self.cursor() {
                        entry.insert(binding);
                    }
                }
            }
        }

        let mut out: Vec<Completion> = chosen.values().map(|b| self.completion(b)).collect();
        let mut seen: HashSet<String> = chosen.keys().map(|name| name.to_string()).collect();

        for name in builtin_names().filter(|name| name.starts_with(prefix)) {
            if let Some(description) = builtin_description(name) {
                if seen.insert(name.to_string()) {
                    out.push(builtin_completion(name, description));
                }
            }
        }
        for keyword in KEYWORDS.iter().filter(|k| k.starts_with(prefix)) {
            if seen.insert(keyword.to_string()) {
                out.push(builtin_completion(keyword, format!("keyword: {}", keyword)));
            }
        }
        out
    }

    // ========================================================================
    // Definitions, assignments and usages
    // ========================================================================

    fn goto_assignments(&self) -> Vec<Definition> {
        let Some(idx) = self.index.name_at(self.line, self.col) else {
            return Vec::new();
        };
        let name = self.index.tokens()[idx].text;
        if is_keyword(name) {
            return Vec::new();
        }
        if self.index.is_member_access(idx) {
            return self.member_definitions(name);
        }

        match self.index.nearest_binding(name, self.cursor()) {
            Some(binding) => vec![self.definition(binding)],
            None => builtin_definition(name).into_iter().collect(),
        }
    }

    fn goto_definitions(&self) -> Vec<Definition> {
        let Some(idx) = self.index.name_at(self.line, self.col) else {
            return Vec::new();
        };
        let name = self.index.tokens()[idx].text;
        if is_keyword(name) {
            return vec![keyword_definition(name)];
        }
        if self.index.is_member_access(idx) {
            return self.member_definitions(name);
        }

        match self.index.nearest_binding(name, self.cursor()) {
            Some(binding) => {
                let mut out = Vec::new();
                let mut visited = HashSet::new();
                self.resolve(binding, 0, &mut visited, &mut out);
                out
            }
            None => builtin_definition(name).into_iter().collect(),
        }
    }

    /// Follow `a = b` aliases to the bindings they refer to. A binding whose
    /// aliases lead nowhere is its own definition.
    fn resolve(
        &self,
        binding: &Binding<'_>,
        depth: usize,
        visited: &mut HashSet<(usize, usize)>,
        out: &mut Vec<Definition>,
    ) {
        if !visited.insert(binding.position()) {
            return;
        }

        if depth < MAX_ALIAS_DEPTH && !binding.aliases.is_empty() {
            let found = out.len();
            for &alias in &binding.aliases {
                let target = self.index.tokens()[alias].text;
                match self.index.binding_before(target, binding.position()) {
                    Some(next) => self.resolve(next, depth + 1, visited, out),
                    None => out.extend(builtin_definition(target)),
                }
            }
            if out.len() > found {
                return;
            }
        }

        out.push(self.definition(binding));
    }

    fn usages(&self) -> Vec<Definition> {
        let Some(idx) = self.index.name_at(self.line, self.col) else {
            return Vec::new();
        };
        let name = self.index.tokens()[idx].text;
        if is_keyword(name) {
            return Vec::new();
        }
        let member = self.index.is_member_access(idx);

        let mut out = Vec::new();
        for (i, token) in self.index.tokens().iter().enumerate() {
            if !token.is_name(name) {
                continue;
            }
            let binding = self.index.binding_at(i);
            let accessed = self.index.is_member_access(i);
            let matches = if member {
                accessed || binding.is_some_and(|b| b.is_member())
            } else {
                !accessed
            };
            if !matches {
                continue;
            }

            let declared = binding.filter(|b| matches!(b.kind, BindingKind::Function | BindingKind::Class));
            out.push(match declared {
                Some(binding) => self.definition(binding),
                None => Definition {
                    module_path: Some(self.path.to_string()),
                    line: Some(token.line),
                    column: Some(token.col),
                    in_builtin_module: false,
                    is_keyword: false,
                    description: self.index.describe_token(i),
                    docstring: String::new(),
                },
            });
        }
        out
    }

    fn member_definitions(&self, name: &str) -> Vec<Definition> {
        self.index
            .members(name)
            .into_iter()
            .map(|b| self.definition(b))
            .collect()
    }

    fn definition(&self, binding: &Binding<'_>) -> Definition {
        Definition {
            module_path: Some(self.path.to_string()),
            line: Some(binding.line),
            column: Some(binding.col),
            in_builtin_module: false,
            is_keyword: false,
            description: self.index.describe(binding),
            docstring: binding.docstring.clone(),
        }
    }

    fn completion(&self, binding: &Binding<'_>) -> Completion {
        Completion {
            name: binding.name.to_string(),
            description: self.index.describe(binding),
            docstring: binding.docstring.clone(),
            module_path: Some(self.path.to_string()),
            line: Some(binding.line),
            column: Some(binding.col),
        }
    }
}

fn is_identifier_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

fn builtin_completion(name: &str, description: String) -> Completion {
    Completion {
        name: name.to_string(),
        description,
        docstring: String::new(),
        module_path: None,
        line: None,
        column: None,
    }
}

fn builtin_definition(name: &str) -> Option<Definition> {
    Some(Definition {
        module_path: None,
        line: None,
        column: None,
        in_builtin_module: true,
        is_keyword: false,
        description: builtin_description(name)?,
        docstring: String::new(),
    })
}

fn keyword_definition(name: &str) -> Definition {
    Definition {
        module_path: None,
        line: None,
        column: None,
        in_builtin_module: true,
        is_keyword: true,
        description: format!("keyword: {}", name),
        docstring: String::new(),
    }
}
