//! Tree builders for tests. Every helper derives offsets from child text, so
//! a built document's text is exactly the source it stands for.

use std::collections::HashMap;

use crate::tree::{rules, ParseError, ParseNode};

pub fn leaf(kind: &'static str, text: &str) -> ParseNode {
    ParseNode::leaf(kind, text)
}

pub fn branch(kind: &'static str, children: Vec<ParseNode>) -> ParseNode {
    ParseNode::branch(kind, children)
}

pub fn document(items: Vec<ParseNode>) -> ParseNode {
    branch(rules::DOCUMENT, items)
}

pub fn host(code: &str) -> ParseNode {
    leaf(rules::HOST_CODE, code)
}

/// `def <Name>():` followed by the body items.
pub fn component(name: &str, body: Vec<ParseNode>) -> ParseNode {
    branch(
        rules::COMPONENT,
        vec![
            branch(
                rules::COMPONENT_HEADER,
                vec![
                    host("def "),
                    leaf(rules::COMPONENT_NAME, name),
                    host("():\n    "),
                ],
            ),
            branch(rules::COMPONENT_BODY, body),
        ],
    )
}

fn attributes(attrs: Vec<ParseNode>) -> ParseNode {
    branch(rules::ATTRIBUTES, attrs)
}

fn start_tag(kind: &'static str, name: &str, attrs: Vec<ParseNode>, close: &str) -> ParseNode {
    branch(
        kind,
        vec![
            leaf(rules::ELEMENT_PUNCT, "<"),
            leaf(rules::ELEMENT_NAME, name),
            attributes(attrs),
            leaf(rules::SPACE, ""),
            leaf(rules::ELEMENT_PUNCT, close),
        ],
    )
}

fn end_tag(name: &str) -> ParseNode {
    branch(
        rules::END_TAG,
        vec![
            leaf(rules::ELEMENT_PUNCT, "</"),
            leaf(rules::ELEMENT_NAME, name),
            leaf(rules::SPACE, ""),
            leaf(rules::ELEMENT_PUNCT, ">"),
        ],
    )
}

pub fn self_closing(name: &str, attrs: Vec<ParseNode>) -> ParseNode {
    branch(
        rules::ELEMENT,
        vec![start_tag(rules::SELF_CLOSING_ELEMENT, name, attrs, " />")],
    )
}

pub fn element(name: &str, attrs: Vec<ParseNode>, children: Vec<ParseNode>) -> ParseNode {
    branch(
        rules::ELEMENT,
        vec![branch(
            rules::PAIRED_ELEMENT,
            vec![
                start_tag(rules::START_TAG, name, attrs, ">"),
                branch(rules::ELEMENT_CHILDREN, children),
                end_tag(name),
            ],
        )],
    )
}

pub fn text(content: &str) -> ParseNode {
    leaf(rules::MARKUP_TEXT, content)
}

fn spaced(attribute: ParseNode) -> ParseNode {
    branch(
        rules::SPACED_ATTRIBUTE,
        vec![
            leaf(rules::SPACE, " "),
            branch(rules::ATTRIBUTE, vec![attribute]),
        ],
    )
}

pub fn kv(name: &str, value: ParseNode) -> ParseNode {
    spaced(branch(
        rules::KV_ATTRIBUTE,
        vec![
            leaf(rules::ATTRIBUTE_NAME, name),
            leaf(rules::SPACE, ""),
            leaf(rules::OPERATOR, "="),
            leaf(rules::SPACE, ""),
            branch(rules::ATTRIBUTE_VALUE, vec![value]),
        ],
    ))
}

pub fn novalue(name: &str) -> ParseNode {
    spaced(branch(
        rules::NOVALUE_ATTRIBUTE,
        vec![leaf(rules::ATTRIBUTE_NAME, name)],
    ))
}

pub fn same_name(name: &str) -> ParseNode {
    spaced(branch(
        rules::SAME_NAME_ATTRIBUTE,
        vec![
            leaf(rules::SERVER_EMBED_DELIM, "{"),
            leaf(rules::SPACE, ""),
            host(name),
            leaf(rules::SPACE, ""),
            leaf(rules::SERVER_EMBED_DELIM, "}"),
        ],
    ))
}

pub fn spread(code: &str) -> ParseNode {
    spaced(branch(
        rules::SPREAD_ATTRIBUTE,
        vec![
            leaf(rules::SERVER_EMBED_DELIM, "{"),
            host(code),
            leaf(rules::SERVER_EMBED_DELIM, "}"),
        ],
    ))
}

pub fn utility(literal: &str) -> ParseNode {
    spaced(branch(
        rules::UTILITY_LITERAL,
        vec![leaf(rules::QUOTED_VALUE, literal)],
    ))
}

pub fn quoted(value: &str) -> ParseNode {
    leaf(rules::QUOTED_VALUE, value)
}

pub fn server_embed(code: &str) -> ParseNode {
    branch(
        rules::SERVER_EMBED,
        vec![
            leaf(rules::SERVER_EMBED_DELIM, "{"),
            host(code),
            leaf(rules::SERVER_EMBED_DELIM, "}"),
        ],
    )
}

pub fn client_embed(code: &str) -> ParseNode {
    branch(
        rules::CLIENT_EMBED,
        vec![
            leaf(rules::CLIENT_EMBED_DELIM, "{%"),
            leaf(rules::CLIENT_EXPR, code),
            leaf(rules::CLIENT_EMBED_DELIM, "%}"),
        ],
    )
}

pub fn joint_embed(server: &str, client: &str) -> ParseNode {
    branch(
        rules::JOINT_EMBED,
        vec![server_embed(server), leaf(rules::SPACE, " "), client_embed(client)],
    )
}

pub fn script_code(code: &str) -> ParseNode {
    leaf(rules::SCRIPT_CODE, code)
}

/// `import <names> from <specifier>;` with the specifier quoted as given.
pub fn static_import(names: &str, specifier: &str) -> ParseNode {
    branch(
        rules::STATIC_IMPORT,
        vec![
            script_code(&format!("import {} from ", names)),
            leaf(rules::MODULE_SPECIFIER, specifier),
            script_code(";"),
        ],
    )
}

pub fn web_script(attrs: Vec<ParseNode>, body: Vec<ParseNode>) -> ParseNode {
    branch(
        rules::WEB_SCRIPT,
        vec![
            leaf(rules::ELEMENT_PUNCT, "<"),
            leaf(rules::ELEMENT_NAME, "script"),
            attributes(attrs),
            leaf(rules::SPACE, ""),
            leaf(rules::ELEMENT_PUNCT, ">"),
            branch(rules::SCRIPT_BODY, body),
            end_tag("script"),
        ],
    )
}

pub fn with_script(element: ParseNode, script: ParseNode) -> ParseNode {
    branch(
        rules::ELEMENT_WITH_SCRIPT,
        vec![
            element,
            leaf(rules::SPACE, "\n"),
            leaf(rules::PUNCT, ""),
            leaf(rules::SPACE, ""),
            script,
        ],
    )
}

/// A parser that knows exactly the given documents, keyed by their text.
pub fn fixed_parser(documents: Vec<ParseNode>) -> impl Fn(&str) -> Result<ParseNode, ParseError> {
    let known: HashMap<String, ParseNode> = documents
        .into_iter()
        .map(|doc| (doc.text.clone(), doc))
        .collect();
    move |source: &str| {
        known
            .get(source)
            .cloned()
            .ok_or_else(|| ParseError::new(0, "unexpected input"))
    }
}

/// A counter component whose script uses one import and reads a ref.
pub fn counter(name: &str, label: &str) -> ParseNode {
    component(
        name,
        vec![with_script(
            element(
                "button",
                vec![kv("ref", quoted("'btn'"))],
                vec![text(label)],
            ),
            web_script(
                vec![],
                vec![
                    script_code("\n"),
                    static_import("{ signal }", "'weft'"),
                    script_code("\nconst clicks = signal(0);\nbtn.onclick = () => clicks.value++;\n"),
                ],
            ),
        )],
    )
}
