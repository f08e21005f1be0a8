//! Component script extraction.
//!
//! For each component the extractor gathers `ref`/`refall` bindings, client
//! embeds, the optional script block and its static imports, then renders a
//! wrapper module exporting an async `setup` for the hydration runtime.
//!
//! ## Invariants
//!
//! 1. **Reset per component**: everything collected while a component body is
//!    traversed belongs to that component. A component starts from a clean
//!    slate; anything gathered outside components is discarded with a warning.
//! 2. **Unique bindings**: a name may be bound once, by either `ref` or
//!    `refall`. A second binding fails with `DuplicateBinding` at once.
//! 3. **Document order**: embeds are emitted in source order, whatever order
//!    their handlers fire in.
//! 4. **Hoisting**: static imports leave the script body and precede `setup`
//!    in their original order, so they run once per module load.
//! 5. **No empty modules**: a component without script, embeds or bindings
//!    produces nothing.
//! 6. **Failed files leave no trace**: relative imports of a file only reach
//!    the run's dependency set when the whole file extracts cleanly.

use indexmap::IndexSet;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::discovery::SourceFile;
use crate::error::{BindingKind, CompileError, Result, SourceLocation};
use crate::identity::component_identifier;
use crate::tree::{rules, ParseNode, TemplateParser};
use crate::visitor::{first_child, last_child, suppress, HandlerTable, Value};

pub const REF_ATTR: &str = "ref";
pub const REFALL_ATTR: &str = "refall";

/// Property of the runtime instance holding arguments for `setup`.
pub const ARGS_PROPERTY: &str = "weftArgs";
/// Property of the runtime instance receiving the evaluated embeds.
pub const EMBEDS_PROPERTY: &str = "weftEmbeds";

/// A directory the bundler must be able to resolve relative imports from,
/// with the root it is mirrored relative to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub dir: PathBuf,
    pub root: PathBuf,
}

/// Everything needed to write one wrapper module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDescriptor {
    pub name: String,
    pub identifier: String,
    pub args: Vec<String>,
    pub embeds: Vec<String>,
    pub imports: Vec<String>,
    pub script: String,
}

impl ComponentDescriptor {
    pub fn file_name(&self) -> String {
        format!("{}.js", self.identifier)
    }

    pub fn render_module(&self) -> String {
        let imports = self.imports.join("\n");
        let args = if self.args.is_empty() {
            String::new()
        } else {
            format!("let {{ {} }} = this.{};", self.args.join(", "), ARGS_PROPERTY)
        };
        format!(
            "{imports}\nexport const setup = async function () {{\n    {args}\n    {script}\n    this.{embeds_property} = [{embeds}];\n}};\n",
            imports = imports,
            args = args,
            script = self.script,
            embeds_property = EMBEDS_PROPERTY,
            embeds = self.embeds.join(", "),
        )
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PER-COMPONENT STATE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct PendingComponent {
    refs: IndexSet<String>,
    refalls: IndexSet<String>,
    args: IndexSet<String>,
    /// Script block as written, imports included; `None` without a block.
    script_source: Option<String>,
    script: String,
    embeds: Vec<(usize, String)>,
    imports: Vec<String>,
}

impl PendingComponent {
    fn is_presentational(&self) -> bool {
        self.script_source
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
            && self.embeds.is_empty()
            && self.refs.is_empty()
            && self.refalls.is_empty()
    }

    fn is_untouched(&self) -> bool {
        self.is_presentational() && self.args.is_empty() && self.imports.is_empty()
    }

    fn into_descriptor(mut self, name: &str, source: &str) -> ComponentDescriptor {
        self.embeds.sort_by_key(|(offset, _)| *offset);
        let args: IndexSet<String> = self
            .refs
            .into_iter()
            .chain(self.refalls)
            .chain(self.args)
            .collect();
        ComponentDescriptor {
            name: name.to_string(),
            identifier: component_identifier(name, source),
            args: args.into_iter().collect(),
            embeds: self.embeds.into_iter().map(|(_, code)| code).collect(),
            imports: self.imports,
            script: self.script,
        }
    }
}

/// Values attribute and embed nodes hand up the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptItem {
    Embed { offset: usize, code: String },
    Name(String),
}

#[derive(Default)]
struct ExtractState {
    file: String,
    source: String,
    origin: Option<SourceFile>,
    pending: PendingComponent,
    components: Vec<ComponentDescriptor>,
    /// Dependencies of the file being extracted.
    file_dependencies: HashSet<Dependency>,
    dependencies: HashSet<Dependency>,
}

impl ExtractState {
    /// Drops whatever was gathered outside a component.
    fn discard_stray(&mut self) {
        if !self.pending.is_untouched() {
            warn!(file = %self.file, "client script found outside any component, ignored");
        }
        self.pending = PendingComponent::default();
    }

    fn location(&self, offset: usize) -> SourceLocation {
        SourceLocation::from_offset(&self.source, offset)
    }

    fn bind(&mut self, name: String, kind: BindingKind, offset: usize) -> Result<()> {
        if self.pending.refs.contains(&name) || self.pending.refalls.contains(&name) {
            return Err(CompileError::DuplicateBinding {
                name,
                kind,
                file: self.file.clone(),
                location: self.location(offset),
            });
        }
        match kind {
            BindingKind::Ref => self.pending.refs.insert(name),
            BindingKind::RefAll => self.pending.refalls.insert(name),
        };
        Ok(())
    }

    /// `./x` depends on the current directory, `../x` on its parent.
    fn check_module(&mut self, specifier: &str) {
        let Some(origin) = &self.origin else {
            return;
        };
        let specifier = specifier.trim().trim_matches(|c| c == '"' || c == '\'' || c == '`');
        let dir = if specifier.starts_with("./") {
            Some(origin.dir())
        } else if specifier.starts_with("../") {
            origin.dir().parent().map(|p| p.to_path_buf())
        } else {
            None
        };
        if let Some(dir) = dir {
            self.file_dependencies.insert(Dependency {
                dir,
                root: origin.root.clone(),
            });
        }
    }

    fn push_embed(&mut self, value: Value<ScriptItem>) {
        if let Value::Item(ScriptItem::Embed { offset, code }) = value {
            self.pending.embeds.push((offset, code));
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HANDLERS
// ═══════════════════════════════════════════════════════════════════════════════

type Out = Result<Value<ScriptItem>>;

fn start_component(state: &mut ExtractState, _: &ParseNode) -> Result<()> {
    state.discard_stray();
    Ok(())
}

fn finish_component(state: &mut ExtractState, node: &ParseNode, _: Vec<Value<ScriptItem>>) -> Out {
    let name = node
        .child(rules::COMPONENT_HEADER)
        .and_then(|header| header.find(rules::COMPONENT_NAME))
        .or_else(|| node.find(rules::COMPONENT_NAME))
        .map(|n| n.text.trim().to_string())
        .unwrap_or_default();
    let pending = std::mem::take(&mut state.pending);
    if pending.is_presentational() {
        debug!(component = %name, "no client behavior, nothing to emit");
        return Ok(Value::Empty);
    }
    let descriptor = pending.into_descriptor(&name, &node.text);
    debug!(
        component = %name,
        identifier = %descriptor.identifier,
        embeds = descriptor.embeds.len(),
        imports = descriptor.imports.len(),
        "component script extracted"
    );
    state.components.push(descriptor);
    Ok(Value::Empty)
}

fn extract_kv_attribute(state: &mut ExtractState, node: &ParseNode, children: Vec<Value<ScriptItem>>) -> Out {
    let name = attribute_name(node);
    let value = children.into_iter().last().unwrap_or(Value::Empty);
    let kind = match name.as_str() {
        REF_ATTR => BindingKind::Ref,
        REFALL_ATTR => BindingKind::RefAll,
        _ => {
            state.push_embed(value);
            return Ok(Value::Item(ScriptItem::Name(name)));
        }
    };
    let target = match value {
        Value::Item(ScriptItem::Embed { code, .. }) => code.trim().to_string(),
        Value::Text(raw) => raw
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .trim()
            .to_string(),
        _ => String::new(),
    };
    if target.is_empty() {
        return Err(CompileError::grammar(
            &state.file,
            &state.source,
            node.start,
            format!("'{}' needs a binding name", name),
        ));
    }
    state.bind(target, kind, node.start)?;
    Ok(Value::Empty)
}

fn extract_novalue_attribute(_: &mut ExtractState, node: &ParseNode, _: Vec<Value<ScriptItem>>) -> Out {
    Ok(Value::Item(ScriptItem::Name(attribute_name(node))))
}

fn extract_same_name_attribute(_: &mut ExtractState, node: &ParseNode, _: Vec<Value<ScriptItem>>) -> Out {
    let name = node
        .child(rules::HOST_CODE)
        .map(|n| n.text.trim().to_string())
        .unwrap_or_default();
    Ok(Value::Item(ScriptItem::Name(name)))
}

fn extract_client_embed(_: &mut ExtractState, node: &ParseNode, _: Vec<Value<ScriptItem>>) -> Out {
    let code = node
        .child(rules::CLIENT_EXPR)
        .map(|n| n.text.clone())
        .unwrap_or_default();
    Ok(Value::Item(ScriptItem::Embed {
        offset: node.start,
        code,
    }))
}

fn extract_joint_embed(state: &mut ExtractState, _: &ParseNode, children: Vec<Value<ScriptItem>>) -> Out {
    if let Some(embed) = children.into_iter().last() {
        state.push_embed(embed);
    }
    Ok(Value::Empty)
}

/// Client embeds placed directly between an element's children.
fn extract_element_children(state: &mut ExtractState, _: &ParseNode, children: Vec<Value<ScriptItem>>) -> Out {
    for child in children {
        state.push_embed(child);
    }
    Ok(Value::Empty)
}

fn extract_web_script(state: &mut ExtractState, node: &ParseNode, mut children: Vec<Value<ScriptItem>>) -> Out {
    if state.pending.script_source.is_some() {
        return Err(CompileError::grammar(
            &state.file,
            &state.source,
            node.start,
            "a component takes at most one script block",
        ));
    }
    let attributes = take(&mut children, 2);
    let body = take(&mut children, 5);
    for item in attributes.into_items() {
        if let ScriptItem::Name(name) = item {
            if !name.is_empty() {
                state.pending.args.insert(name);
            }
        }
    }
    state.pending.script = body.joined_text();
    state.pending.script_source = Some(
        node.child(rules::SCRIPT_BODY)
            .map(|n| n.text.clone())
            .unwrap_or_default(),
    );
    Ok(Value::Empty)
}

fn extract_script_body(_: &mut ExtractState, _: &ParseNode, children: Vec<Value<ScriptItem>>) -> Out {
    Ok(Value::Text(Value::List(children).joined_text()))
}

fn extract_static_import(state: &mut ExtractState, node: &ParseNode, _: Vec<Value<ScriptItem>>) -> Out {
    if let Some(specifier) = node.find(rules::MODULE_SPECIFIER) {
        state.check_module(&specifier.text);
    }
    state.pending.imports.push(node.text.trim().to_string());
    Ok(Value::Text(String::new()))
}

fn finish_document(state: &mut ExtractState, _: &ParseNode, _: Vec<Value<ScriptItem>>) -> Out {
    state.discard_stray();
    Ok(Value::Empty)
}

fn attribute_name(node: &ParseNode) -> String {
    node.child(rules::ATTRIBUTE_NAME)
        .map(|n| n.text.trim().to_string())
        .unwrap_or_default()
}

fn take<T>(children: &mut [Value<T>], index: usize) -> Value<T> {
    children
        .get_mut(index)
        .map(|v| std::mem::replace(v, Value::Empty))
        .unwrap_or(Value::Empty)
}

fn extract_table() -> HandlerTable<ExtractState, ScriptItem> {
    HandlerTable::new()
        .on(rules::DOCUMENT, finish_document)
        .on_enter(rules::COMPONENT, start_component)
        .on(rules::COMPONENT, finish_component)
        .on(rules::KV_ATTRIBUTE, extract_kv_attribute)
        .on(rules::NOVALUE_ATTRIBUTE, extract_novalue_attribute)
        .on(rules::SAME_NAME_ATTRIBUTE, extract_same_name_attribute)
        .on(rules::CLIENT_EMBED, extract_client_embed)
        .on(rules::JOINT_EMBED, extract_joint_embed)
        .on(rules::ELEMENT_CHILDREN, extract_element_children)
        .on(rules::WEB_SCRIPT, extract_web_script)
        .on(rules::SCRIPT_BODY, extract_script_body)
        .on(rules::STATIC_IMPORT, extract_static_import)
        .on(rules::SPACED_ATTRIBUTE, last_child)
        .on_all(&[rules::ATTRIBUTE, rules::ATTRIBUTE_VALUE], first_child)
        .on_all(&[rules::SPREAD_ATTRIBUTE, rules::UTILITY_LITERAL], suppress)
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXTRACTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Run-scoped extractor. Feed it one file at a time; the dependency set keeps
/// growing across files until the run ends.
pub struct ComponentScriptExtractor {
    table: HandlerTable<ExtractState, ScriptItem>,
    state: ExtractState,
}

impl Default for ComponentScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentScriptExtractor {
    pub fn new() -> Self {
        ComponentScriptExtractor {
            table: extract_table(),
            state: ExtractState::default(),
        }
    }

    /// Components of one parsed file that need a wrapper module, in document
    /// order. `origin` enables dependency tracking for relative imports.
    pub fn extract(
        &mut self,
        tree: &ParseNode,
        source: &str,
        origin: Option<&SourceFile>,
    ) -> Result<Vec<ComponentDescriptor>> {
        self.state.file = origin
            .map(SourceFile::display_name)
            .unwrap_or_else(|| "<content>".to_string());
        self.state.source = source.to_string();
        self.state.origin = origin.cloned();

        let visited = self.table.visit(&mut self.state, tree);
        let components = std::mem::take(&mut self.state.components);
        let file_dependencies = std::mem::take(&mut self.state.file_dependencies);
        self.state.pending = PendingComponent::default();
        visited?;
        self.state.dependencies.extend(file_dependencies);
        Ok(components)
    }

    pub fn extract_source<P: TemplateParser>(
        &mut self,
        parser: &P,
        source: &str,
        origin: Option<&SourceFile>,
    ) -> Result<Vec<ComponentDescriptor>> {
        let file = origin
            .map(SourceFile::display_name)
            .unwrap_or_else(|| "<content>".to_string());
        let tree = parser
            .parse(source)
            .map_err(|e| CompileError::grammar(&file, source, e.offset, e.message))?;
        self.extract(&tree, source, origin)
    }

    pub fn dependencies(&self) -> &HashSet<Dependency> {
        &self.state.dependencies
    }

    pub fn take_dependencies(&mut self) -> HashSet<Dependency> {
        std::mem::take(&mut self.state.dependencies)
    }
}
