//! The build run: sources in, wrapper modules and one bundle out.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info};

use crate::bundle::{self, BundleOutcome};
use crate::collector::{AttributeSet, Collector, TreeCollector};
use crate::config::BuildConfig;
use crate::discovery::{discover_sources, SourceFile};
use crate::error::{CompileError, Result};
use crate::extractor::ComponentScriptExtractor;
use crate::token::SemanticToken;
use crate::tokenizer::SemanticTokenizer;
use crate::tree::{ParseError, ParseNode, TemplateParser};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrittenModule {
    pub source: PathBuf,
    pub component: String,
    pub identifier: String,
    /// Location inside the scratch tree.
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFailure {
    pub file: PathBuf,
    pub code: String,
    pub message: String,
}

impl FileFailure {
    fn new(file: &Path, err: &CompileError) -> Self {
        FileFailure {
            file: file.to_path_buf(),
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub modules: Vec<WrittenModule>,
    pub failures: Vec<FileFailure>,
    pub bundle: BundleOutcome,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() && !matches!(self.bundle, BundleOutcome::Failed { .. })
    }
}

pub struct BuildPipeline<P> {
    parser: P,
    config: BuildConfig,
}

impl<P: TemplateParser> BuildPipeline<P> {
    pub fn new(parser: P, config: BuildConfig) -> Self {
        BuildPipeline { parser, config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    fn parse(&self, source: &str) -> std::result::Result<ParseNode, ParseError> {
        self.parser.parse(source)
    }

    /// Discovers sources under `root` with the configured extensions and runs
    /// them.
    pub fn run_dir(&self, root: &Path) -> Result<BuildReport> {
        let sources = discover_sources(root, &self.config.source_extensions);
        info!(root = %root.display(), files = sources.len(), "sources discovered");
        self.run(&sources)
    }

    pub fn run(&self, sources: &[SourceFile]) -> Result<BuildReport> {
        let started = Instant::now();
        self.prepare_output()?;

        fs::create_dir_all(&self.config.scratch_parent)
            .map_err(|e| CompileError::io(&self.config.scratch_parent, e))?;
        let scratch = tempfile::Builder::new()
            .prefix(&self.config.scratch_prefix)
            .tempdir_in(&self.config.scratch_parent)
            .map_err(|e| CompileError::io(&self.config.scratch_parent, e))?;
        debug!(scratch = %scratch.path().display(), "scratch directory created");

        let mut extractor = ComponentScriptExtractor::new();
        let mut report = BuildReport::default();
        for source in sources {
            let file_started = Instant::now();
            match self.compile_file(&mut extractor, source, scratch.path()) {
                Ok(written) => {
                    info!(
                        file = %source.path.display(),
                        modules = written.len(),
                        elapsed_ms = file_started.elapsed().as_millis() as u64,
                        "compiled"
                    );
                    report.modules.extend(written);
                }
                Err(err) if err.is_per_file() => {
                    error!(file = %source.path.display(), code = err.code(), "{}", err);
                    report.failures.push(FileFailure::new(&source.path, &err));
                }
                Err(err) => return Err(err),
            }
        }

        let written: Vec<PathBuf> = report
            .modules
            .iter()
            .map(|module| scratch.path().join(&module.path))
            .collect();
        let dependencies = extractor.take_dependencies();
        let bundle_started = Instant::now();
        report.bundle = match bundle::bundle(scratch.path(), &written, &dependencies, &self.config) {
            Ok(outcome) => outcome,
            Err(err @ CompileError::ExternalTool { .. }) => {
                error!(code = err.code(), "{}", err);
                BundleOutcome::Failed {
                    code: err.code().to_string(),
                    message: err.to_string(),
                }
            }
            Err(err) => return Err(err),
        };
        debug!(elapsed_ms = bundle_started.elapsed().as_millis() as u64, "bundling finished");

        let scratch_path = scratch.path().to_path_buf();
        scratch.close().map_err(|e| CompileError::io(scratch_path, e))?;

        info!(
            modules = report.modules.len(),
            failures = report.failures.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "build finished"
        );
        Ok(report)
    }

    fn prepare_output(&self) -> Result<()> {
        let output_dir = self.config.output_dir();
        if !output_dir.as_os_str().is_empty() {
            fs::create_dir_all(&output_dir).map_err(|e| CompileError::io(&output_dir, e))?;
        }
        if self.config.clean {
            let map = PathBuf::from(format!("{}.map", self.config.output_file.display()));
            for stale in [&self.config.output_file, &map] {
                if stale.is_file() {
                    fs::remove_file(stale).map_err(|e| CompileError::io(stale, e))?;
                    debug!(file = %stale.display(), "previous bundle removed");
                }
            }
        }
        Ok(())
    }

    /// Parses one file and writes its wrapper modules into
    /// `scratch/<relative dir>/`.
    fn compile_file(
        &self,
        extractor: &mut ComponentScriptExtractor,
        source: &SourceFile,
        scratch: &Path,
    ) -> Result<Vec<WrittenModule>> {
        let text = fs::read_to_string(&source.path).map_err(|e| CompileError::io(&source.path, e))?;
        let components = extractor.extract_source(&|s: &str| self.parse(s), &text, Some(source))?;
        if components.is_empty() {
            return Ok(Vec::new());
        }

        let relative_dir = source.relative_dir();
        let target_dir = scratch.join(&relative_dir);
        fs::create_dir_all(&target_dir).map_err(|e| CompileError::io(&target_dir, e))?;

        let mut written = Vec::with_capacity(components.len());
        for component in components {
            let path = target_dir.join(component.file_name());
            fs::write(&path, component.render_module()).map_err(|e| CompileError::io(&path, e))?;
            written.push(WrittenModule {
                source: source.path.clone(),
                component: component.name.clone(),
                identifier: component.identifier.clone(),
                path: relative_dir.join(component.file_name()),
            });
        }
        Ok(written)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // OTHER CONSUMERS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Utility attributes referenced by `sources`, through the tree strategy.
    pub fn collect_utilities(&self, sources: &[SourceFile]) -> Result<AttributeSet> {
        let mut collector = TreeCollector::new(|s: &str| self.parse(s));
        for source in sources {
            collector.collect_file(&source.path)?;
        }
        Ok(collector.into_attributes())
    }

    pub fn tokenize(&self, source: &str) -> Result<Vec<SemanticToken>> {
        let tokenizer = SemanticTokenizer::new();
        let tokens: Vec<SemanticToken> = tokenizer.tokenize(&|s: &str| self.parse(s), source)?.collect();
        Ok(tokens)
    }
}
