//! Semantic tokenizer for editor highlighting.
//!
//! The structural pass walks the parse tree and tags every leaf with either a
//! terminal [`Category`] or the [`SubLanguage`] it belongs to. The expansion
//! pass re-lexes each embedded span and shifts its offsets into file space.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use crate::error::{CompileError, Result};
use crate::merge::merge;
use crate::sublexers::{FormatStringLexer, HostLexer, ScriptLexer, SubLexer};
use crate::token::{Category, Run, SemanticToken, SubLanguage, TokenKind};
use crate::tree::{rules, ParseNode, TemplateParser};
use crate::visitor::{HandlerTable, Value};

type Handler = fn(&mut (), &ParseNode, Vec<Value<Run>>) -> Result<Value<Run>>;

fn terminal(category: Category, node: &ParseNode) -> Result<Value<Run>> {
    Ok(Value::Item((TokenKind::Terminal(category), node.text.clone())))
}

fn embedded(language: SubLanguage, node: &ParseNode) -> Result<Value<Run>> {
    Ok(Value::Item((TokenKind::Embedded(language), node.text.clone())))
}

fn structural_table() -> HandlerTable<(), Run> {
    let host: Handler = |_, node, _| embedded(SubLanguage::Host, node);
    let script: Handler = |_, node, _| embedded(SubLanguage::Script, node);

    HandlerTable::new()
        .on_all(
            &[
                rules::HOST_CODE,
                rules::HOST_COMMENT,
                rules::HOST_STRING,
                rules::COMPONENT_NAME,
            ],
            host,
        )
        .on(rules::FORMAT_STRING, |_, node, _| {
            embedded(SubLanguage::FormatString, node)
        })
        // Imports are lexed whole; the specifier child needs no category.
        .on_all(
            &[rules::CLIENT_EXPR, rules::SCRIPT_CODE, rules::STATIC_IMPORT],
            script,
        )
        .on(rules::SPACE, |_, node, _| terminal(Category::Whitespace, node))
        .on(rules::PUNCT, |_, node, _| terminal(Category::Punctuation, node))
        .on(rules::ELEMENT_PUNCT, |_, node, _| {
            terminal(Category::ElementPunctuation, node)
        })
        .on(rules::ELEMENT_NAME, |_, node, _| {
            if node.text.chars().next().is_some_and(char::is_lowercase) {
                terminal(Category::NameElement, node)
            } else {
                terminal(Category::NameComponent, node)
            }
        })
        .on(rules::ATTRIBUTE_NAME, |_, node, _| {
            terminal(Category::NameAttribute, node)
        })
        .on(rules::OPERATOR, |_, node, _| terminal(Category::Operator, node))
        .on(rules::QUOTED_VALUE, |_, node, _| terminal(Category::String, node))
        .on(rules::MARKUP_TEXT, |_, node, _| terminal(Category::MarkupText, node))
        .on(rules::MARKUP_COMMENT, |_, node, _| {
            terminal(Category::MarkupComment, node)
        })
        .on(rules::SERVER_EMBED_DELIM, |_, node, _| {
            terminal(Category::ServerEmbedPunctuation, node)
        })
        .on(rules::CLIENT_EMBED_DELIM, |_, node, _| {
            terminal(Category::ClientEmbedPunctuation, node)
        })
}

/// Produces a gap-free `(offset, category, text)` stream for one file.
///
/// Holds one [`SubLexer`] per embedded language. Replacing or removing a
/// lexer is allowed; a span whose language has no lexer fails the call with
/// `UnresolvedSubLanguage`.
pub struct SemanticTokenizer {
    table: HandlerTable<(), Run>,
    lexers: HashMap<SubLanguage, Arc<dyn SubLexer>>,
}

impl Default for SemanticTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticTokenizer {
    pub fn new() -> Self {
        let mut lexers: HashMap<SubLanguage, Arc<dyn SubLexer>> = HashMap::new();
        lexers.insert(SubLanguage::Host, Arc::new(HostLexer));
        lexers.insert(SubLanguage::Script, Arc::new(ScriptLexer));
        lexers.insert(SubLanguage::FormatString, Arc::new(FormatStringLexer));
        SemanticTokenizer {
            table: structural_table(),
            lexers,
        }
    }

    pub fn with_lexer(mut self, language: SubLanguage, lexer: Arc<dyn SubLexer>) -> Self {
        self.lexers.insert(language, lexer);
        self
    }

    pub fn without_lexer(mut self, language: SubLanguage) -> Self {
        self.lexers.remove(&language);
        self
    }

    /// Structural pass only: merged runs, embedded spans not yet expanded.
    pub fn runs(&self, tree: &ParseNode) -> Result<Vec<Run>> {
        merge(self.table.visit(&mut (), tree)?)
    }

    pub fn tokenize_tree(&self, tree: &ParseNode) -> Result<TokenStream<'_>> {
        let runs = self.runs(tree)?;
        for (kind, _) in &runs {
            if let TokenKind::Embedded(language) = kind {
                if !self.lexers.contains_key(language) {
                    return Err(CompileError::UnresolvedSubLanguage(*language));
                }
            }
        }
        Ok(TokenStream {
            lexers: &self.lexers,
            runs: runs.into_iter().collect(),
            offset: tree.start,
            pending: VecDeque::new(),
        })
    }

    pub fn tokenize<P: TemplateParser>(&self, parser: &P, source: &str) -> Result<TokenStream<'_>> {
        let tree = parser
            .parse(source)
            .map_err(|e| CompileError::grammar("<content>", source, e.offset, e.message))?;
        self.tokenize_tree(&tree)
    }
}

/// Lazily expands merged runs into semantic tokens, one run at a time.
pub struct TokenStream<'a> {
    lexers: &'a HashMap<SubLanguage, Arc<dyn SubLexer>>,
    runs: VecDeque<Run>,
    offset: usize,
    pending: VecDeque<SemanticToken>,
}

impl Iterator for TokenStream<'_> {
    type Item = SemanticToken;

    fn next(&mut self) -> Option<SemanticToken> {
        while self.pending.is_empty() {
            let (kind, text) = self.runs.pop_front()?;
            let start = self.offset;
            self.offset += text.len();
            match kind {
                TokenKind::Terminal(category) => self.pending.push_back(SemanticToken {
                    offset: start,
                    category,
                    text,
                }),
                TokenKind::Embedded(language) => {
                    // Checked up front in `tokenize_tree`.
                    let Some(lexer) = self.lexers.get(&language) else {
                        continue;
                    };
                    self.pending.extend(lexer.lex(&text).into_iter().map(
                        |(offset, category, text)| SemanticToken {
                            offset: start + offset,
                            category,
                            text,
                        },
                    ));
                }
            }
        }
        self.pending.pop_front()
    }
}
