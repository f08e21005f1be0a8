use std::collections::HashMap;

use crate::error::Result;
use crate::tree::ParseNode;

/// What a handler hands back to its parent.
///
/// `Empty` suppresses the subtree from the consumer's output, `Text` is the
/// pass-through of a leaf's matched text, `List` carries transformed children
/// upward untouched, `Item` is a consumer-specific value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<T> {
    Empty,
    Text(String),
    List(Vec<Value<T>>),
    Item(T),
}

impl<T> Value<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_item(self) -> Option<T> {
        match self {
            Value::Item(item) => Some(item),
            _ => None,
        }
    }

    /// All items in the value, depth first, in order.
    pub fn into_items(self) -> Vec<T> {
        let mut out = Vec::new();
        self.collect_items(&mut out);
        out
    }

    fn collect_items(self, out: &mut Vec<T>) {
        match self {
            Value::Item(item) => out.push(item),
            Value::List(values) => {
                for value in values {
                    value.collect_items(out);
                }
            }
            Value::Empty | Value::Text(_) => {}
        }
    }

    /// Concatenation of every `Text` in the value, depth first.
    pub fn joined_text(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Value::Text(text) => out.push_str(text),
            Value::List(values) => values.iter().for_each(|v| v.push_text(out)),
            Value::Empty | Value::Item(_) => {}
        }
    }
}

/// A transform for one node kind. Receives the consumer's state, the node,
/// and the node's already-transformed children.
pub type Handler<S, T> = fn(&mut S, &ParseNode, Vec<Value<T>>) -> Result<Value<T>>;

/// Runs when the traversal reaches a node, before any of its children.
pub type EnterHook<S> = fn(&mut S, &ParseNode) -> Result<()>;

/// Maps node kinds to handlers for one consumer.
///
/// Traversal is post-order. Kinds without a handler fall back to
/// [`default_handler`]. Tables hold no state of their own; everything a
/// consumer accumulates lives in the `S` it passes to [`HandlerTable::visit`].
pub struct HandlerTable<S, T> {
    handlers: HashMap<&'static str, Handler<S, T>>,
    enter_hooks: HashMap<&'static str, EnterHook<S>>,
}

impl<S, T> Default for HandlerTable<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, T> HandlerTable<S, T> {
    pub fn new() -> Self {
        HandlerTable {
            handlers: HashMap::new(),
            enter_hooks: HashMap::new(),
        }
    }

    pub fn on(mut self, kind: &'static str, handler: Handler<S, T>) -> Self {
        self.handlers.insert(kind, handler);
        self
    }

    pub fn on_all(mut self, kinds: &[&'static str], handler: Handler<S, T>) -> Self {
        for kind in kinds {
            self.handlers.insert(*kind, handler);
        }
        self
    }

    /// Registers a hook that fires on entry to every `kind` node.
    pub fn on_enter(mut self, kind: &'static str, hook: EnterHook<S>) -> Self {
        self.enter_hooks.insert(kind, hook);
        self
    }

    pub fn handles(&self, kind: &str) -> bool {
        self.handlers.contains_key(kind)
    }

    pub fn visit(&self, state: &mut S, node: &ParseNode) -> Result<Value<T>> {
        if let Some(hook) = self.enter_hooks.get(node.kind) {
            hook(state, node)?;
        }
        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            children.push(self.visit(state, child)?);
        }
        match self.handlers.get(node.kind) {
            Some(handler) => handler(state, node, children),
            None => Ok(default_handler(node, children)),
        }
    }
}

/// Children unchanged if there are any, else the node's matched text.
pub fn default_handler<T>(node: &ParseNode, children: Vec<Value<T>>) -> Value<T> {
    if children.is_empty() {
        Value::Text(node.text.clone())
    } else {
        Value::List(children)
    }
}

// Handlers shared by several tables.

pub fn suppress<S, T>(_: &mut S, _: &ParseNode, _: Vec<Value<T>>) -> Result<Value<T>> {
    Ok(Value::Empty)
}

pub fn first_child<S, T>(_: &mut S, _: &ParseNode, children: Vec<Value<T>>) -> Result<Value<T>> {
    Ok(children.into_iter().next().unwrap_or(Value::Empty))
}

pub fn last_child<S, T>(_: &mut S, _: &ParseNode, children: Vec<Value<T>>) -> Result<Value<T>> {
    Ok(children.into_iter().last().unwrap_or(Value::Empty))
}

pub fn node_text<S, T>(_: &mut S, node: &ParseNode, _: Vec<Value<T>>) -> Result<Value<T>> {
    Ok(Value::Text(node.text.clone()))
}
