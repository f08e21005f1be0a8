use serde::{Serialize, Serializer};
use std::fmt;

/// Terminal categories of the semantic token stream. The dotted names follow
/// the usual highlighting-theme hierarchy so renderers can fall back from
/// `Name.ComponentElement` to `Name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Text,
    Whitespace,
    Error,
    Keyword,
    KeywordConstant,
    KeywordDeclaration,
    KeywordNamespace,
    Name,
    NameBuiltin,
    NameFunction,
    NameClass,
    NameDecorator,
    NameOther,
    NameAttribute,
    NameElement,
    NameComponent,
    String,
    StringAffix,
    StringEscape,
    StringInterpol,
    StringBacktick,
    Number,
    Operator,
    Punctuation,
    ElementPunctuation,
    ServerEmbedPunctuation,
    ClientEmbedPunctuation,
    Comment,
    CommentSingle,
    CommentMultiline,
    MarkupText,
    MarkupComment,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Text => "Text",
            Category::Whitespace => "Text.Whitespace",
            Category::Error => "Error",
            Category::Keyword => "Keyword",
            Category::KeywordConstant => "Keyword.Constant",
            Category::KeywordDeclaration => "Keyword.Declaration",
            Category::KeywordNamespace => "Keyword.Namespace",
            Category::Name => "Name",
            Category::NameBuiltin => "Name.Builtin",
            Category::NameFunction => "Name.Function",
            Category::NameClass => "Name.Class",
            Category::NameDecorator => "Name.Decorator",
            Category::NameOther => "Name.Other",
            Category::NameAttribute => "Name.Attribute",
            Category::NameElement => "Name.HtmlElement",
            Category::NameComponent => "Name.ComponentElement",
            Category::String => "Literal.String",
            Category::StringAffix => "Literal.String.Affix",
            Category::StringEscape => "Literal.String.Escape",
            Category::StringInterpol => "Literal.String.Interpol",
            Category::StringBacktick => "Literal.String.Backtick",
            Category::Number => "Literal.Number",
            Category::Operator => "Operator",
            Category::Punctuation => "Punctuation",
            Category::ElementPunctuation => "Punctuation.ElementPunctuation",
            Category::ServerEmbedPunctuation => "Punctuation.ServerEmbedPunctuation",
            Category::ClientEmbedPunctuation => "Punctuation.ClientEmbedPunctuation",
            Category::Comment => "Comment",
            Category::CommentSingle => "Comment.Single",
            Category::CommentMultiline => "Comment.Multiline",
            Category::MarkupText => "Text.HtmlText",
            Category::MarkupComment => "Comment.HtmlComment",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Embedded languages whose spans are re-lexed by a dedicated lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubLanguage {
    /// Server-side host expressions and surrounding host code.
    Host,
    /// Client-side script.
    Script,
    /// Format-string literals (`f"..."`), interpolations included.
    FormatString,
}

impl fmt::Display for SubLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubLanguage::Host => "host",
            SubLanguage::Script => "script",
            SubLanguage::FormatString => "format-string",
        })
    }
}

/// Either a terminal category or a marker for a span still to be re-lexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Terminal(Category),
    Embedded(SubLanguage),
}

/// A categorized run before offsets are assigned.
pub type Run = (TokenKind, String);

/// One entry of the final token stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SemanticToken {
    pub offset: usize,
    pub category: Category,
    pub text: String,
}
