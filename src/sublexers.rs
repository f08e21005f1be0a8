//! Lexers for the languages embedded in a template: host expressions, client
//! script and format-string literals.

use lazy_static::lazy_static;

use crate::lexer::{LexToken, RegexLexer, Rule};
use crate::token::Category::*;

/// Re-lexes one embedded span. Offsets in the result are relative to `text`
/// and the tokens cover it exactly.
pub trait SubLexer: Send + Sync {
    fn lex(&self, text: &str) -> Vec<LexToken>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// HOST EXPRESSIONS
// ═══════════════════════════════════════════════════════════════════════════════

const HOST_KEYWORDS: &str = r"(?:and|as|assert|async|await|break|continue|del|elif|else|except|finally|for|global|if|in|is|lambda|nonlocal|not|or|pass|raise|return|try|while|with|yield)\b";

const HOST_BUILTINS: &str = r"(?:abs|all|any|bool|dict|enumerate|filter|float|getattr|hasattr|int|isinstance|len|list|map|max|min|open|print|range|repr|set|sorted|str|sum|super|tuple|type|zip)\b";

fn host_rules() -> Vec<Rule> {
    vec![
        Rule::token(r"\s+", Whitespace),
        Rule::token(r"\\\n", Text),
        Rule::token(r"#[^\n]*", CommentSingle),
        Rule::groups(r#"(?s)((?i:[rbuf]{0,2}))("""(?:[^\\]|\\.)*?""")"#, &[StringAffix, String]),
        Rule::groups(r"(?s)((?i:[rbuf]{0,2}))('''(?:[^\\]|\\.)*?''')", &[StringAffix, String]),
        Rule::groups(r#"((?i:[rbuf]{0,2}))("(?:[^"\\\n]|\\.)*")"#, &[StringAffix, String]),
        Rule::groups(r"((?i:[rbuf]{0,2}))('(?:[^'\\\n]|\\.)*')", &[StringAffix, String]),
        Rule::groups(r"(def)(\s+)([^\W\d]\w*)", &[Keyword, Whitespace, NameFunction]),
        Rule::groups(r"(class)(\s+)([^\W\d]\w*)", &[Keyword, Whitespace, NameClass]),
        Rule::token(r"(?:import|from)\b", KeywordNamespace),
        Rule::token(r"(?:True|False|None)\b", KeywordConstant),
        Rule::token(HOST_KEYWORDS, Keyword),
        Rule::token(HOST_BUILTINS, NameBuiltin),
        Rule::token(r"@[^\W\d][\w.]*", NameDecorator),
        Rule::token(r"[^\W\d]\w*", Name),
        Rule::token(
            r"0[xX][0-9a-fA-F_]+|0[bB][01_]+|0[oO][0-7_]+|(?:\d[\d_]*)?\.\d[\d_]*(?:[eE][+-]?\d+)?j?|\d[\d_]*(?:\.[\d_]*)?(?:[eE][+-]?\d+)?j?",
            Number,
        ),
        Rule::token(r"\*\*=?|//=?|->|:=|<<=?|>>=?|[-+*/%@&|^~<>=!]=?", Operator),
        Rule::token(r"[()\[\]{}:,;.]", Punctuation),
    ]
}

lazy_static! {
    static ref HOST_LEXER: RegexLexer = RegexLexer::new().state("root", host_rules());

    static ref SCRIPT_LEXER: RegexLexer = {
        let root = vec![
            Rule::token(r"\s+", Whitespace),
            Rule::token(r"//[^\n]*", CommentSingle),
            Rule::token(r"(?s)/\*.*?\*/", CommentMultiline),
            Rule::push(r"`", StringBacktick, "template"),
            Rule::token(r#""(?:[^"\\\n]|\\.)*""#, String),
            Rule::token(r"'(?:[^'\\\n]|\\.)*'", String),
            Rule::token(r"(?:import|export|from)\b", KeywordNamespace),
            Rule::token(r"(?:var|let|const|function|class)\b", KeywordDeclaration),
            Rule::token(r"(?:true|false|null|undefined|NaN|Infinity)\b", KeywordConstant),
            Rule::token(
                r"(?:if|else|for|while|do|break|continue|return|new|delete|typeof|instanceof|in|of|switch|case|default|try|catch|finally|throw|async|await|yield|extends|super|this|void|static|get|set)\b",
                Keyword,
            ),
            Rule::token(
                r"(?:Array|Boolean|Date|Error|Function|JSON|Map|Math|Number|Object|Promise|RegExp|Set|String|console|document|window|parseInt|parseFloat)\b",
                NameBuiltin,
            ),
            Rule::token(r"[A-Za-z_$][\w$]*", NameOther),
            Rule::token(
                r"0[xX][0-9a-fA-F_]+n?|0[bB][01_]+n?|0[oO][0-7_]+n?|(?:\d[\d_]*)?\.?\d[\d_]*(?:[eE][+-]?\d+)?n?",
                Number,
            ),
            Rule::token(
                r"=>|\.\.\.|\?\?=?|\?\.|&&=?|\|\|=?|\*\*=?|>>>=?|<<=?|>>=?|===?|!==?|\+\+|--|[-+*/%&|^~<>=!?]=?",
                Operator,
            ),
            Rule::token(r"[()\[\]{};,.:]", Punctuation),
        ];
        RegexLexer::new()
            .state("root", root)
            .state(
                "template",
                vec![
                    Rule::pop(r"`", StringBacktick),
                    Rule::token(r"(?s)\\.", StringEscape),
                    Rule::push(r"\$\{", StringInterpol, "interp"),
                    Rule::token(r"[^`\\$]+", StringBacktick),
                    Rule::token(r"\$", StringBacktick),
                ],
            )
            .state(
                "interp",
                vec![
                    Rule::pop(r"\}", StringInterpol),
                    Rule::push(r"\{", Punctuation, "brace"),
                ],
            )
            .include("interp", "root")
            .state(
                "brace",
                vec![
                    Rule::pop(r"\}", Punctuation),
                    Rule::push(r"\{", Punctuation, "brace"),
                ],
            )
            .include("brace", "root")
    };

    static ref FORMAT_STRING_LEXER: RegexLexer = {
        let opening = || Rule::groups(r#"((?i:[rbuf]{0,3}))("""|'''|"|')"#, &[StringAffix, String]);
        RegexLexer::new()
            .state("root", host_rules())
            .state(
                "single",
                vec![
                    opening(),
                    Rule::token(r"\{\{|\}\}", StringEscape),
                    Rule::push(r"\{", StringInterpol, "interp"),
                    Rule::token(r"\\.", StringEscape),
                    Rule::token(r#"[^{}\\\n"']+"#, String),
                ],
            )
            .state(
                "triple",
                vec![
                    opening(),
                    Rule::token(r"\{\{|\}\}", StringEscape),
                    Rule::push(r"\{", StringInterpol, "interp"),
                    Rule::token(r"(?s)\\.", StringEscape),
                    Rule::token(r#"[^{}\\"']+"#, String),
                ],
            )
            .state(
                "interp",
                vec![
                    Rule::pop(r"\}", StringInterpol),
                    Rule::token(r"![rsa]", StringInterpol),
                    Rule::push(r"\{", Punctuation, "brace"),
                ],
            )
            .include("interp", "root")
            .state(
                "brace",
                vec![
                    Rule::pop(r"\}", Punctuation),
                    Rule::push(r"\{", Punctuation, "brace"),
                ],
            )
            .include("brace", "root")
    };
}

pub struct HostLexer;

impl SubLexer for HostLexer {
    fn lex(&self, text: &str) -> Vec<LexToken> {
        HOST_LEXER.tokens(text)
    }
}

pub struct ScriptLexer;

impl SubLexer for ScriptLexer {
    fn lex(&self, text: &str) -> Vec<LexToken> {
        SCRIPT_LEXER.tokens(text)
    }
}

pub struct FormatStringLexer;

impl FormatStringLexer {
    /// Triple-quoted literals may span lines; single-quoted ones may not.
    pub fn start_state(text: &str) -> &'static str {
        let body = text.trim_start_matches(|c: char| "rRbBuUfF".contains(c));
        if body.starts_with("\"\"\"") || body.starts_with("'''") {
            "triple"
        } else {
            "single"
        }
    }
}

impl SubLexer for FormatStringLexer {
    fn lex(&self, text: &str) -> Vec<LexToken> {
        FORMAT_STRING_LEXER.tokens_from(text, Self::start_state(text))
    }
}
