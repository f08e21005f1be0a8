use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::token::SubLanguage;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_GRAMMAR: &str = "WEFT-ERR-GRAMMAR";
pub const ERR_DUPLICATE_BINDING: &str = "WEFT-ERR-DUPLICATE-BINDING";
pub const ERR_UNRESOLVED_SUBLANGUAGE: &str = "WEFT-ERR-UNRESOLVED-SUBLANGUAGE";
pub const ERR_UNTYPED_FRAGMENT: &str = "WEFT-ERR-UNTYPED-FRAGMENT";
pub const ERR_EXTERNAL_TOOL: &str = "WEFT-ERR-EXTERNAL-TOOL";
pub const ERR_IO: &str = "WEFT-ERR-IO";

pub type Result<T> = std::result::Result<T, CompileError>;

/// Line/column pair, both 1-based. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn from_offset(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let before = &source[..offset];
        let line = before.matches('\n').count() as u32 + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = before[line_start..].chars().count() as u32 + 1;
        SourceLocation { line, column }
    }
}

/// Which binding set a duplicated name collided in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Ref,
    RefAll,
}

impl std::fmt::Display for BindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingKind::Ref => f.write_str("ref"),
            BindingKind::RefAll => f.write_str("refall"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("{file}:{}:{}: {message}", .location.line, .location.column)]
    Grammar {
        file: String,
        location: SourceLocation,
        message: String,
    },

    #[error("{file}:{}:{}: duplicate {kind} name '{name}', ref and refall names must be unique within a component", .location.line, .location.column)]
    DuplicateBinding {
        name: String,
        kind: BindingKind,
        file: String,
        location: SourceLocation,
    },

    #[error("no lexer registered for sub-language '{0}'")]
    UnresolvedSubLanguage(SubLanguage),

    #[error("untyped fragment {text:?} reached the token merger")]
    UntypedFragment { text: String },

    #[error("external tool '{tool}' failed: {message}")]
    ExternalTool { tool: String, message: String },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    pub fn grammar(file: &str, source: &str, offset: usize, message: impl Into<String>) -> Self {
        CompileError::Grammar {
            file: file.to_string(),
            location: SourceLocation::from_offset(source, offset),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CompileError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CompileError::Grammar { .. } => ERR_GRAMMAR,
            CompileError::DuplicateBinding { .. } => ERR_DUPLICATE_BINDING,
            CompileError::UnresolvedSubLanguage(_) => ERR_UNRESOLVED_SUBLANGUAGE,
            CompileError::UntypedFragment { .. } => ERR_UNTYPED_FRAGMENT,
            CompileError::ExternalTool { .. } => ERR_EXTERNAL_TOOL,
            CompileError::Io { .. } => ERR_IO,
        }
    }

    /// Errors scoped to one source file; the pipeline records them and moves on.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            CompileError::Grammar { .. } | CompileError::DuplicateBinding { .. }
        )
    }
}
