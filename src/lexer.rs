//! Table-driven regex lexer used for the embedded sub-languages.
//!
//! A lexer is a set of named states, each an ordered rule list. The first rule
//! whose pattern matches at the cursor wins. Text no rule accepts becomes a
//! one-character `Error` token, so the output always covers the input.

use regex::Regex;
use std::collections::HashMap;

use crate::token::Category;

#[derive(Debug, Clone)]
pub enum Action {
    Token(Category),
    /// One category per capture group; the groups must tile the match.
    Groups(Vec<Category>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Push(&'static str),
    Pop,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pattern: Regex,
    action: Action,
    transition: Transition,
}

impl Rule {
    /// Patterns are anchored at the cursor; a bad pattern is a bug in the
    /// lexer tables, hence the panic.
    pub fn new(pattern: &str, action: Action, transition: Transition) -> Self {
        let anchored = format!("^(?:{})", pattern);
        Rule {
            pattern: Regex::new(&anchored)
                .unwrap_or_else(|e| panic!("invalid lexer pattern {:?}: {}", pattern, e)),
            action,
            transition,
        }
    }

    pub fn token(pattern: &str, category: Category) -> Self {
        Rule::new(pattern, Action::Token(category), Transition::Stay)
    }

    pub fn groups(pattern: &str, categories: &[Category]) -> Self {
        Rule::new(pattern, Action::Groups(categories.to_vec()), Transition::Stay)
    }

    pub fn push(pattern: &str, category: Category, state: &'static str) -> Self {
        Rule::new(pattern, Action::Token(category), Transition::Push(state))
    }

    pub fn pop(pattern: &str, category: Category) -> Self {
        Rule::new(pattern, Action::Token(category), Transition::Pop)
    }
}

/// A token relative to the start of the lexed text.
pub type LexToken = (usize, Category, String);

#[derive(Debug, Clone, Default)]
pub struct RegexLexer {
    states: HashMap<&'static str, Vec<Rule>>,
}

impl RegexLexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, name: &'static str, rules: Vec<Rule>) -> Self {
        self.states.insert(name, rules);
        self
    }

    /// Appends a copy of another state's rules to `name`.
    pub fn include(mut self, name: &'static str, from: &'static str) -> Self {
        let borrowed = self.states.get(from).cloned().unwrap_or_default();
        self.states.entry(name).or_default().extend(borrowed);
        self
    }

    pub fn tokens(&self, text: &str) -> Vec<LexToken> {
        self.tokens_from(text, "root")
    }

    pub fn tokens_from(&self, text: &str, initial: &'static str) -> Vec<LexToken> {
        let mut out: Vec<LexToken> = Vec::new();
        let mut stack = vec![initial];
        let mut pos = 0;

        'outer: while pos < text.len() {
            let state = stack.last().copied().unwrap_or(initial);
            let rest = &text[pos..];
            for rule in self.states.get(state).map(Vec::as_slice).unwrap_or_default() {
                let Some(caps) = rule.pattern.captures(rest) else {
                    continue;
                };
                let whole = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
                // An empty match only makes progress when it leaves the state.
                if whole.is_empty() && (rule.transition != Transition::Pop || stack.len() == 1) {
                    continue;
                }
                match &rule.action {
                    Action::Token(category) => emit(&mut out, pos, *category, whole),
                    Action::Groups(categories) => {
                        let mut cursor = 0;
                        let mut last = categories.first().copied().unwrap_or(Category::Text);
                        for (index, category) in categories.iter().enumerate() {
                            let Some(group) = caps.get(index + 1) else {
                                continue;
                            };
                            if group.start() < cursor {
                                continue;
                            }
                            if group.start() > cursor {
                                emit(&mut out, pos + cursor, last, &whole[cursor..group.start()]);
                            }
                            emit(&mut out, pos + group.start(), *category, group.as_str());
                            cursor = group.end();
                            last = *category;
                        }
                        if cursor < whole.len() {
                            emit(&mut out, pos + cursor, last, &whole[cursor..]);
                        }
                    }
                }
                match rule.transition {
                    Transition::Stay => {}
                    Transition::Push(next) => stack.push(next),
                    Transition::Pop => {
                        if stack.len() > 1 {
                            stack.pop();
                        }
                    }
                }
                pos += whole.len();
                continue 'outer;
            }

            // Nothing matched: consume one character as an error.
            let ch = rest.chars().next().map(char::len_utf8).unwrap_or(1);
            if &rest[..ch] == "\n" {
                stack.truncate(1);
                emit(&mut out, pos, Category::Whitespace, "\n");
            } else {
                emit(&mut out, pos, Category::Error, &rest[..ch]);
            }
            pos += ch;
        }

        out
    }
}

fn emit(out: &mut Vec<LexToken>, offset: usize, category: Category, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some((_, last_category, last_text)) = out.last_mut() {
        if *last_category == category {
            last_text.push_str(text);
            return;
        }
    }
    out.push((offset, category, text.to_string()));
}
