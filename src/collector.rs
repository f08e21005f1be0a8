//! Utility-attribute collection.
//!
//! Two strategies feed the same [`AttributeSet`]: [`RegexCollector`] scans raw
//! markup with patterns, [`TreeCollector`] walks the parse tree. Either way
//! every (key, raw value) pair goes through [`AttributeSet::collect_kv`].

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::error::{CompileError, Result};
use crate::html::{HtmlAttributeTable, StandardHtmlAttributes};
use crate::tree::{rules, ParseNode, TemplateParser};
use crate::visitor::{first_child, last_child, suppress, HandlerTable, Value};

/// Names that bind the class list, plain and short-hand.
pub const CLASS_KEYS: [&str; 2] = ["class", "$class"];

/// Accumulated class names and per-key utility values.
///
/// Lifecycle: construct, feed through `collect_*` for every file of a run,
/// then read with [`AttributeSet::iter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    classes: BTreeSet<String>,
    attrs: BTreeMap<String, BTreeSet<String>>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one key/raw-value pair. A missing value counts as empty, one
    /// pair of matching quotes is stripped, and the rest is split on
    /// whitespace. Empty and class keys feed the class set.
    pub fn collect_kv(&mut self, key: &str, raw: Option<&str>) {
        let value = unquote(raw.unwrap_or(""));
        let tokens = value.split_whitespace().map(str::to_string);
        if key.is_empty() || CLASS_KEYS.contains(&key) {
            self.classes.extend(tokens);
        } else {
            self.attrs.entry(key.to_string()).or_default().extend(tokens);
        }
    }

    /// Records a bare `key=value key2 ...` literal, one pair per word.
    pub fn collect_literal(&mut self, literal: &str) {
        for word in literal.split_whitespace() {
            match word.split_once('=') {
                Some((key, value)) => self.collect_kv(key, Some(value)),
                None => self.collect_kv(word, Some("")),
            }
        }
    }

    pub fn classes(&self) -> &BTreeSet<String> {
        &self.classes
    }

    pub fn values(&self, key: &str) -> Option<&BTreeSet<String>> {
        self.attrs.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.attrs.is_empty()
    }

    /// Classes first as `("", class)`, then every key's values. A key
    /// recorded without any value yields a single `(key, "")`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        let classes = self.classes.iter().map(|c| ("", c.as_str()));
        let attrs = self.attrs.iter().flat_map(|(key, values)| {
            let lone = values.is_empty().then_some((key.as_str(), ""));
            lone.into_iter()
                .chain(values.iter().map(move |v| (key.as_str(), v.as_str())))
        });
        classes.chain(attrs)
    }
}

fn unquote(raw: &str) -> &str {
    let bytes = raw.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

/// A strategy that reads one file's content into an [`AttributeSet`].
pub trait Collector {
    fn collect_from_content(&mut self, source: &str) -> Result<()>;

    fn attributes(&self) -> &AttributeSet;

    fn collect_file(&mut self, path: &Path) -> Result<()> {
        let source = fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
        match self.collect_from_content(&source) {
            Err(CompileError::Grammar { location, message, .. }) => Err(CompileError::Grammar {
                file: path.to_string_lossy().to_string(),
                location,
                message,
            }),
            other => other,
        }
    }

    fn all_attrs(&self) -> Box<dyn Iterator<Item = (&str, &str)> + '_> {
        Box::new(self.attributes().iter())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HEURISTIC STRATEGY
// ═══════════════════════════════════════════════════════════════════════════════

/// Tags whose attributes never carry utilities.
pub const IGNORED_TAGS: [&str; 7] = ["head", "title", "meta", "style", "link", "script", "template"];

lazy_static! {
    static ref START_TAG_RE: Regex =
        Regex::new(r#"<([a-zA-Z0-9]+)((?:[^"'>]+|"[^"]*"|'[^']*')*)/?>"#).unwrap();
    static ref ATTR_RE: Regex =
        Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*('[^']*'|"[^"]*"|[^\s"'=><`]+))?"#).unwrap();
}

/// Pattern-based scan of raw markup. Needs no parser, so it also works on
/// plain HTML files.
#[derive(Debug, Default)]
pub struct RegexCollector {
    attrs: AttributeSet,
}

impl RegexCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_attributes(self) -> AttributeSet {
        self.attrs
    }
}

impl Collector for RegexCollector {
    fn collect_from_content(&mut self, source: &str) -> Result<()> {
        for tag in START_TAG_RE.captures_iter(source) {
            let name = &tag[1];
            let attrs = tag.get(2).map(|m| m.as_str()).unwrap_or_default();
            if IGNORED_TAGS.contains(&name) || attrs.trim().is_empty() {
                continue;
            }
            for attr in ATTR_RE.captures_iter(attrs) {
                self.attrs
                    .collect_kv(&attr[1], attr.get(2).map(|m| m.as_str()));
            }
        }
        Ok(())
    }

    fn attributes(&self) -> &AttributeSet {
        &self.attrs
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CANONICAL STRATEGY
// ═══════════════════════════════════════════════════════════════════════════════

/// What attribute nodes hand up to their tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    Pair { key: String, value: Option<String> },
    Literal(String),
}

struct CollectState<'a> {
    attrs: &'a mut AttributeSet,
    table: &'a dyn HtmlAttributeTable,
}

fn collect_tag(state: &mut CollectState<'_>, node: &ParseNode, children: Vec<Value<Attr>>) -> Result<Value<Attr>> {
    let name = node
        .child(rules::ELEMENT_NAME)
        .map(|n| n.text.as_str())
        .unwrap_or_default();
    // Capitalized names are component references; their own file is scanned
    // when it is visited.
    if !name.chars().next().is_some_and(char::is_lowercase) {
        return Ok(Value::Empty);
    }
    let attributes = children.into_iter().nth(2).unwrap_or(Value::Empty);
    for attr in attributes.into_items() {
        match attr {
            Attr::Literal(literal) => state.attrs.collect_literal(&literal),
            Attr::Pair { key, value } => {
                if !CLASS_KEYS.contains(&key.as_str()) && state.table.is_valid_html_attribute(name, &key) {
                    continue;
                }
                state.attrs.collect_kv(&key, value.as_deref());
            }
        }
    }
    Ok(Value::Empty)
}

fn collect_kv_attribute(_: &mut CollectState<'_>, node: &ParseNode, children: Vec<Value<Attr>>) -> Result<Value<Attr>> {
    let key = attribute_name(node);
    match children.into_iter().last() {
        Some(Value::Text(raw)) => Ok(Value::Item(Attr::Pair { key, value: Some(raw) })),
        _ => Ok(Value::Empty),
    }
}

fn collect_novalue_attribute(_: &mut CollectState<'_>, node: &ParseNode, _: Vec<Value<Attr>>) -> Result<Value<Attr>> {
    Ok(Value::Item(Attr::Pair {
        key: attribute_name(node),
        value: None,
    }))
}

fn collect_utility_literal(_: &mut CollectState<'_>, node: &ParseNode, _: Vec<Value<Attr>>) -> Result<Value<Attr>> {
    Ok(Value::Item(Attr::Literal(unquote(&node.text).to_string())))
}

fn attribute_name(node: &ParseNode) -> String {
    node.child(rules::ATTRIBUTE_NAME)
        .map(|n| n.text.trim().to_string())
        .unwrap_or_default()
}

fn collect_table<'a>() -> HandlerTable<CollectState<'a>, Attr> {
    HandlerTable::new()
        .on_all(&[rules::START_TAG, rules::SELF_CLOSING_ELEMENT], collect_tag)
        .on(rules::KV_ATTRIBUTE, collect_kv_attribute)
        .on(rules::NOVALUE_ATTRIBUTE, collect_novalue_attribute)
        .on(rules::UTILITY_LITERAL, collect_utility_literal)
        .on_all(&[rules::SPACED_ATTRIBUTE], last_child)
        .on_all(&[rules::ATTRIBUTE, rules::ATTRIBUTE_VALUE], first_child)
        .on_all(
            &[
                rules::SPREAD_ATTRIBUTE,
                rules::SAME_NAME_ATTRIBUTE,
                rules::SERVER_EMBED,
                rules::CLIENT_EMBED,
                rules::JOINT_EMBED,
                rules::FORMAT_STRING,
                rules::WEB_SCRIPT,
            ],
            suppress,
        )
}

/// Walks parse trees produced by `P`, collecting only from lowercase
/// elements and skipping attributes the capability table recognizes.
pub struct TreeCollector<P, H = StandardHtmlAttributes> {
    parser: P,
    table: H,
    attrs: AttributeSet,
}

impl<P: TemplateParser> TreeCollector<P> {
    pub fn new(parser: P) -> Self {
        Self::with_table(parser, StandardHtmlAttributes)
    }
}

impl<P: TemplateParser, H: HtmlAttributeTable> TreeCollector<P, H> {
    pub fn with_table(parser: P, table: H) -> Self {
        TreeCollector {
            parser,
            table,
            attrs: AttributeSet::new(),
        }
    }

    pub fn collect_tree(&mut self, tree: &ParseNode) -> Result<()> {
        let mut state = CollectState {
            attrs: &mut self.attrs,
            table: &self.table,
        };
        collect_table().visit(&mut state, tree)?;
        Ok(())
    }

    pub fn into_attributes(self) -> AttributeSet {
        self.attrs
    }
}

impl<P: TemplateParser, H: HtmlAttributeTable> Collector for TreeCollector<P, H> {
    fn collect_from_content(&mut self, source: &str) -> Result<()> {
        let tree = self
            .parser
            .parse(source)
            .map_err(|e| CompileError::grammar("<content>", source, e.offset, e.message))?;
        self.collect_tree(&tree)
    }

    fn attributes(&self) -> &AttributeSet {
        &self.attrs
    }
}
