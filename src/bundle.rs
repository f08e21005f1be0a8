//! Bundling glue: entry module synthesis, dependency mirroring and the
//! external bundler call.
//!
//! ## Invariants
//!
//! 1. **No-op without modules**: when the scratch tree holds no wrapper
//!    module, nothing is written and the bundler is not started.
//! 2. **Discovery order**: the entry's setup mapping lists modules in the
//!    order they were written, then any other wrapper found in the scratch
//!    tree, sorted by path.
//! 3. **Mirror once**: a dependency file lands in the scratch tree at most
//!    once per relative location, and never from inside the scratch tree.
//! 4. **Entry last**: the entry module is written after mirroring, and no
//!    mirrored file may take its place.

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

use crate::config::{BuildConfig, BundlerConfig};
use crate::discovery::{find_component_modules, find_script_files, is_component_module};
use crate::error::{CompileError, Result};
use crate::extractor::Dependency;

pub const ENTRY_FILE: &str = "index.js";
/// Specifier the entry imports the runtime helper under.
pub const RUNTIME_MODULE: &str = "weft";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BundleOutcome {
    #[default]
    NothingToBundle,
    Bundled {
        output: PathBuf,
        components: Vec<String>,
        mirrored: usize,
    },
    Failed {
        code: String,
        message: String,
    },
}

impl BundleOutcome {
    pub fn is_bundled(&self) -> bool {
        matches!(self, BundleOutcome::Bundled { .. })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY MODULE
// ═══════════════════════════════════════════════════════════════════════════════

/// One wrapper as the entry sees it: the mapping key (its file stem) and the
/// specifier it is imported from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryImport {
    pub key: String,
    pub specifier: String,
}

impl EntryImport {
    /// `None` when `module` is not a wrapper module under `scratch`.
    pub fn new(scratch: &Path, module: &Path) -> Option<Self> {
        if !is_component_module(module) {
            return None;
        }
        let key = module.file_stem()?.to_str()?.to_string();
        let relative = module.strip_prefix(scratch).ok()?.with_extension("");
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        Some(EntryImport {
            key,
            specifier: format!("./{}", parts.join("/")),
        })
    }
}

/// Written modules first, in order, then the rest of `scanned`. A key seen
/// twice names the same component with the same bytes, so only the first
/// occurrence is kept.
pub fn order_entry_imports(scratch: &Path, written: &[PathBuf], scanned: &[PathBuf]) -> Vec<EntryImport> {
    let scanned_set: BTreeSet<&PathBuf> = scanned.iter().collect();
    let mut seen = HashSet::new();
    written
        .iter()
        .filter(|path| scanned_set.contains(path))
        .chain(scanned.iter())
        .filter_map(|path| EntryImport::new(scratch, path))
        .filter(|import| seen.insert(import.key.clone()))
        .collect()
}

pub fn compose_entry(imports: &[EntryImport]) -> String {
    let mut js = String::new();
    for import in imports {
        js.push_str(&format!(
            "import {{ setup as {} }} from \"{}\";\n",
            import.key, import.specifier
        ));
    }
    js.push_str(&format!(
        "import {{ hydrate as hydrateWithSetups }} from \"{}\";\n\n",
        RUNTIME_MODULE
    ));
    js.push_str("const setups = {\n");
    for import in imports {
        js.push_str(&format!("    {0}: {0},\n", import.key));
    }
    js.push_str("};\n\n");
    js.push_str("export const hydrate = async (rootElement) => await hydrateWithSetups(rootElement, setups);\n");
    js
}

/// Writes `index.js` into `scratch`. Returns the entry path and its keys, or
/// `None` when there is no wrapper to import.
pub fn write_entry(scratch: &Path, written: &[PathBuf]) -> Result<Option<(PathBuf, Vec<String>)>> {
    let scanned = find_component_modules(scratch);
    if scanned.is_empty() {
        return Ok(None);
    }
    let imports = order_entry_imports(scratch, written, &scanned);
    let entry = scratch.join(ENTRY_FILE);
    fs::write(&entry, compose_entry(&imports)).map_err(|e| CompileError::io(&entry, e))?;
    debug!(entry = %entry.display(), components = imports.len(), "entry module written");
    Ok(Some((entry, imports.into_iter().map(|i| i.key).collect())))
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEPENDENCY MIRRORING
// ═══════════════════════════════════════════════════════════════════════════════

fn is_inside(path: &Path, dir: &Path) -> bool {
    if path.starts_with(dir) {
        return true;
    }
    match (fs::canonicalize(path), fs::canonicalize(dir)) {
        (Ok(path), Ok(dir)) => path.starts_with(dir),
        _ => false,
    }
}

/// Copies the script files of every dependency directory into `scratch`,
/// keeping their location relative to the dependency's root. A file that
/// would land on the entry module is skipped. Returns the number of files
/// copied.
pub fn mirror_dependencies(dependencies: &HashSet<Dependency>, scratch: &Path) -> Result<usize> {
    let mut ordered: Vec<&Dependency> = dependencies.iter().collect();
    ordered.sort_by(|a, b| (&a.dir, &a.root).cmp(&(&b.dir, &b.root)));
    let entry = scratch.join(ENTRY_FILE);

    let mut copied: HashSet<(PathBuf, PathBuf)> = HashSet::new();
    for dependency in ordered {
        if !dependency.dir.is_dir() {
            warn!(dir = %dependency.dir.display(), "dependency directory missing, skipped");
            continue;
        }
        for file in find_script_files(&dependency.dir) {
            if is_inside(&file, scratch) {
                continue;
            }
            let Some(parent) = file.parent() else {
                continue;
            };
            let Ok(relative) = parent.strip_prefix(&dependency.root) else {
                warn!(
                    file = %file.display(),
                    root = %dependency.root.display(),
                    "dependency outside its root, skipped"
                );
                continue;
            };
            let Some(name) = file.file_name() else {
                continue;
            };
            let target_dir = scratch.join(relative);
            let target = target_dir.join(name);
            if target == entry {
                warn!(file = %file.display(), "dependency would replace the entry module, skipped");
                continue;
            }
            if !copied.insert((file.clone(), relative.to_path_buf())) {
                continue;
            }
            fs::create_dir_all(&target_dir).map_err(|e| CompileError::io(&target_dir, e))?;
            fs::copy(&file, &target).map_err(|e| CompileError::io(&file, e))?;
        }
    }
    Ok(copied.len())
}

// ═══════════════════════════════════════════════════════════════════════════════
// BUNDLER
// ═══════════════════════════════════════════════════════════════════════════════

pub struct Bundler<'a> {
    config: &'a BundlerConfig,
    runtime_dir: &'a Path,
}

impl<'a> Bundler<'a> {
    pub fn new(config: &'a BundlerConfig, runtime_dir: &'a Path) -> Self {
        Bundler { config, runtime_dir }
    }

    fn program(&self) -> Result<(PathBuf, Vec<String>)> {
        match &self.config.program {
            Some(program) => Ok((program.clone(), self.config.leading_args.clone())),
            None => {
                let npx = which::which("npx").map_err(|e| CompileError::ExternalTool {
                    tool: "npx".to_string(),
                    message: e.to_string(),
                })?;
                let mut args = vec!["esbuild".to_string()];
                args.extend(self.config.leading_args.iter().cloned());
                Ok((npx, args))
            }
        }
    }

    /// The runtime directory appended to whatever module path is already set.
    fn module_path(&self) -> OsString {
        let mut paths: Vec<PathBuf> = env::var_os(&self.config.module_path_env)
            .map(|existing| env::split_paths(&existing).collect())
            .unwrap_or_default();
        paths.push(self.runtime_dir.to_path_buf());
        env::join_paths(&paths).unwrap_or_else(|_| self.runtime_dir.as_os_str().to_os_string())
    }

    pub fn command(&self, entry: &Path, output: &Path) -> Result<Command> {
        let (program, args) = self.program()?;
        let mut command = Command::new(program);
        command
            .args(args)
            .arg("--format=esm")
            .arg("--bundle")
            .arg("--minify")
            .arg("--sourcemap")
            .arg(format!("--outfile={}", output.display()))
            .arg(entry)
            .env(&self.config.module_path_env, self.module_path());
        Ok(command)
    }

    pub fn run(&self, entry: &Path, output: &Path) -> Result<()> {
        let mut command = self.command(entry, output)?;
        let tool = command.get_program().to_string_lossy().to_string();
        let result = command.output().map_err(|e| CompileError::ExternalTool {
            tool: tool.clone(),
            message: e.to_string(),
        })?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            return Err(CompileError::ExternalTool {
                tool,
                message: format!("{} {}", result.status, stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// The whole bundling step over a finished scratch tree.
pub fn bundle(
    scratch: &Path,
    written: &[PathBuf],
    dependencies: &HashSet<Dependency>,
    config: &BuildConfig,
) -> Result<BundleOutcome> {
    if find_component_modules(scratch).is_empty() {
        warn!("no component modules generated, bundling skipped");
        return Ok(BundleOutcome::NothingToBundle);
    }
    let mirrored = mirror_dependencies(dependencies, scratch)?;
    debug!(mirrored, "dependencies mirrored");

    let Some((entry, components)) = write_entry(scratch, written)? else {
        return Ok(BundleOutcome::NothingToBundle);
    };

    Bundler::new(&config.bundler, &config.runtime_dir).run(&entry, &config.output_file)?;
    info!(output = %config.output_file.display(), components = components.len(), "bundle written");
    Ok(BundleOutcome::Bundled {
        output: config.output_file.clone(),
        components,
        mirrored,
    })
}
