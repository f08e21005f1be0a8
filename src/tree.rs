//! Parse tree boundary.
//!
//! The grammar lives outside this crate. Whatever parser is plugged in hands
//! back a [`ParseNode`] tree tagged with the kinds listed in [`rules`]; every
//! consumer in the crate walks that same shape.

use std::fmt;

/// One node of the typed parse tree.
///
/// `start` is the absolute byte offset of `text` in the parsed source. The
/// children of a branch cover its text contiguously and in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseNode {
    pub kind: &'static str,
    pub start: usize,
    pub text: String,
    pub children: Vec<ParseNode>,
}

impl ParseNode {
    pub fn leaf(kind: &'static str, text: impl Into<String>) -> Self {
        ParseNode {
            kind,
            start: 0,
            text: text.into(),
            children: Vec::new(),
        }
    }

    /// Builds a branch whose text is the concatenation of its children.
    /// Offsets are relative to the branch until [`ParseNode::rebase`] runs.
    pub fn branch(kind: &'static str, children: Vec<ParseNode>) -> Self {
        let mut node = ParseNode {
            kind,
            start: 0,
            text: children.iter().map(|c| c.text.as_str()).collect(),
            children,
        };
        node.rebase(0);
        node
    }

    /// Moves this subtree so that it starts at `start`, shifting every
    /// descendant along with it.
    pub fn rebase(&mut self, start: usize) {
        self.start = start;
        let mut cursor = start;
        for child in &mut self.children {
            child.rebase(cursor);
            cursor += child.text.len();
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// First direct child of the given kind.
    pub fn child(&self, kind: &str) -> Option<&ParseNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// First descendant (pre-order, self included) of the given kind.
    pub fn find(&self, kind: &str) -> Option<&ParseNode> {
        if self.kind == kind {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(kind))
    }
}

/// Failure reported by the external grammar, positioned by byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        ParseError {
            offset,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.offset)
    }
}

impl std::error::Error for ParseError {}

/// The grammar seam. Implementations turn hybrid source text into a tree
/// rooted at a [`rules::DOCUMENT`] node.
pub trait TemplateParser {
    fn parse(&self, source: &str) -> Result<ParseNode, ParseError>;
}

impl<F> TemplateParser for F
where
    F: Fn(&str) -> Result<ParseNode, ParseError>,
{
    fn parse(&self, source: &str) -> Result<ParseNode, ParseError> {
        self(source)
    }
}

/// Node-kind vocabulary shared by the grammar and every handler table.
pub mod rules {
    pub const DOCUMENT: &str = "document";

    // Host language
    pub const HOST_CODE: &str = "host_code";
    pub const HOST_COMMENT: &str = "host_comment";
    pub const HOST_STRING: &str = "host_string";
    pub const FORMAT_STRING: &str = "format_string";

    // Components
    pub const COMPONENT: &str = "component";
    pub const COMPONENT_HEADER: &str = "component_header";
    pub const COMPONENT_NAME: &str = "component_name";
    pub const COMPONENT_BODY: &str = "component_body";

    // Markup
    pub const ELEMENT: &str = "element";
    pub const SELF_CLOSING_ELEMENT: &str = "self_closing_element";
    pub const PAIRED_ELEMENT: &str = "paired_element";
    pub const START_TAG: &str = "start_tag";
    pub const END_TAG: &str = "end_tag";
    pub const FRAGMENT: &str = "fragment";
    pub const ELEMENT_CHILDREN: &str = "element_children";
    pub const ELEMENT_PUNCT: &str = "element_punct";
    pub const ELEMENT_NAME: &str = "element_name";
    pub const MARKUP_TEXT: &str = "markup_text";
    pub const MARKUP_COMMENT: &str = "markup_comment";
    pub const SPACE: &str = "space";
    pub const PUNCT: &str = "punct";

    // Attributes
    pub const ATTRIBUTES: &str = "attributes";
    pub const SPACED_ATTRIBUTE: &str = "spaced_attribute";
    pub const ATTRIBUTE: &str = "attribute";
    pub const KV_ATTRIBUTE: &str = "kv_attribute";
    pub const NOVALUE_ATTRIBUTE: &str = "novalue_attribute";
    pub const SPREAD_ATTRIBUTE: &str = "spread_attribute";
    pub const SAME_NAME_ATTRIBUTE: &str = "same_name_attribute";
    pub const UTILITY_LITERAL: &str = "utility_literal";
    pub const ATTRIBUTE_NAME: &str = "attribute_name";
    pub const ATTRIBUTE_VALUE: &str = "attribute_value";
    pub const OPERATOR: &str = "operator";
    pub const QUOTED_VALUE: &str = "quoted_value";

    // Embeds
    pub const SERVER_EMBED: &str = "server_embed";
    pub const SERVER_EMBED_DELIM: &str = "server_embed_delim";
    pub const CLIENT_EMBED: &str = "client_embed";
    pub const CLIENT_EMBED_DELIM: &str = "client_embed_delim";
    pub const CLIENT_EXPR: &str = "client_expr";
    pub const JOINT_EMBED: &str = "joint_embed";

    // Client script blocks
    pub const ELEMENT_WITH_SCRIPT: &str = "element_with_script";
    pub const WEB_SCRIPT: &str = "web_script";
    pub const SCRIPT_BODY: &str = "script_body";
    pub const SCRIPT_CODE: &str = "script_code";
    pub const STATIC_IMPORT: &str = "static_import";
    pub const MODULE_SPECIFIER: &str = "module_specifier";
}
