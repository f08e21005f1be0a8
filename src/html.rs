use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

/// Answers whether an attribute is genuine markup for an element. Attributes
/// that are, are not utility tokens and the collector leaves them alone.
pub trait HtmlAttributeTable {
    fn is_valid_html_attribute(&self, element: &str, attribute: &str) -> bool;
}

impl<F> HtmlAttributeTable for F
where
    F: Fn(&str, &str) -> bool,
{
    fn is_valid_html_attribute(&self, element: &str, attribute: &str) -> bool {
        self(element, attribute)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUILT-IN TABLE
// ═══════════════════════════════════════════════════════════════════════════════

lazy_static! {
    static ref GLOBAL_ATTRIBUTES: HashSet<&'static str> = [
        "accesskey", "autocapitalize", "autofocus", "contenteditable", "dir", "draggable",
        "enterkeyhint", "hidden", "id", "inert", "inputmode", "is", "itemid", "itemprop",
        "itemref", "itemscope", "itemtype", "lang", "nonce", "part", "popover", "role", "slot",
        "spellcheck", "style", "tabindex", "title", "translate",
    ]
    .into_iter()
    .collect();

    static ref ELEMENT_ATTRIBUTES: HashMap<&'static str, &'static [&'static str]> = {
        let mut m: HashMap<&'static str, &'static [&'static str]> = HashMap::new();
        m.insert("a", &["download", "href", "hreflang", "ping", "referrerpolicy", "rel", "target", "type"]);
        m.insert("area", &["alt", "coords", "download", "href", "ping", "referrerpolicy", "rel", "shape", "target"]);
        m.insert("audio", &["autoplay", "controls", "crossorigin", "loop", "muted", "preload", "src"]);
        m.insert("base", &["href", "target"]);
        m.insert("blockquote", &["cite"]);
        m.insert("button", &["disabled", "form", "formaction", "formenctype", "formmethod", "formnovalidate", "formtarget", "name", "popovertarget", "popovertargetaction", "type", "value"]);
        m.insert("canvas", &["height", "width"]);
        m.insert("col", &["span"]);
        m.insert("colgroup", &["span"]);
        m.insert("data", &["value"]);
        m.insert("del", &["cite", "datetime"]);
        m.insert("details", &["name", "open"]);
        m.insert("dialog", &["open"]);
        m.insert("embed", &["height", "src", "type", "width"]);
        m.insert("fieldset", &["disabled", "form", "name"]);
        m.insert("form", &["accept-charset", "action", "autocomplete", "enctype", "method", "name", "novalidate", "rel", "target"]);
        m.insert("iframe", &["allow", "allowfullscreen", "height", "loading", "name", "referrerpolicy", "sandbox", "src", "srcdoc", "width"]);
        m.insert("img", &["alt", "crossorigin", "decoding", "fetchpriority", "height", "ismap", "loading", "referrerpolicy", "sizes", "src", "srcset", "usemap", "width"]);
        m.insert("input", &["accept", "alt", "autocomplete", "checked", "dirname", "disabled", "form", "formaction", "formenctype", "formmethod", "formnovalidate", "formtarget", "height", "list", "max", "maxlength", "min", "minlength", "multiple", "name", "pattern", "placeholder", "popovertarget", "readonly", "required", "size", "src", "step", "type", "value", "width"]);
        m.insert("ins", &["cite", "datetime"]);
        m.insert("label", &["for"]);
        m.insert("li", &["value"]);
        m.insert("link", &["as", "crossorigin", "href", "hreflang", "integrity", "media", "referrerpolicy", "rel", "sizes", "type"]);
        m.insert("map", &["name"]);
        m.insert("meta", &["charset", "content", "http-equiv", "media", "name"]);
        m.insert("meter", &["high", "low", "max", "min", "optimum", "value"]);
        m.insert("object", &["data", "form", "height", "name", "type", "width"]);
        m.insert("ol", &["reversed", "start", "type"]);
        m.insert("optgroup", &["disabled", "label"]);
        m.insert("option", &["disabled", "label", "selected", "value"]);
        m.insert("output", &["for", "form", "name"]);
        m.insert("progress", &["max", "value"]);
        m.insert("q", &["cite"]);
        m.insert("script", &["async", "crossorigin", "defer", "integrity", "nomodule", "referrerpolicy", "src", "type"]);
        m.insert("select", &["autocomplete", "disabled", "form", "multiple", "name", "required", "size"]);
        m.insert("slot", &["name"]);
        m.insert("source", &["height", "media", "sizes", "src", "srcset", "type", "width"]);
        m.insert("style", &["media"]);
        m.insert("td", &["colspan", "headers", "rowspan"]);
        m.insert("template", &["shadowrootmode"]);
        m.insert("textarea", &["autocomplete", "cols", "dirname", "disabled", "form", "maxlength", "minlength", "name", "placeholder", "readonly", "required", "rows", "wrap"]);
        m.insert("th", &["abbr", "colspan", "headers", "rowspan", "scope"]);
        m.insert("time", &["datetime"]);
        m.insert("track", &["default", "kind", "label", "src", "srclang"]);
        m.insert("video", &["autoplay", "controls", "crossorigin", "height", "loop", "muted", "playsinline", "poster", "preload", "src", "width"]);
        m
    };
}

/// Global attributes, `on*` handlers, `aria-*`/`data-*`, plus a per-element
/// list for the common elements.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardHtmlAttributes;

impl HtmlAttributeTable for StandardHtmlAttributes {
    fn is_valid_html_attribute(&self, element: &str, attribute: &str) -> bool {
        if attribute.is_empty() {
            return false;
        }
        if GLOBAL_ATTRIBUTES.contains(attribute)
            || attribute.starts_with("aria-")
            || attribute.starts_with("data-")
        {
            return true;
        }
        if attribute.len() > 2
            && attribute.starts_with("on")
            && attribute[2..].chars().all(|c| c.is_ascii_lowercase())
        {
            return true;
        }
        ELEMENT_ATTRIBUTES
            .get(element)
            .map(|attrs| attrs.contains(&attribute))
            .unwrap_or(false)
    }
}
