use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CompileError, Result};

pub const BUNDLER_ENV: &str = "WEFT_BUNDLER";
pub const RUNTIME_DIR_ENV: &str = "WEFT_RUNTIME_DIR";

/// Runtime helpers shipped with the crate; `weft.js` lives here.
pub fn default_runtime_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("runtime")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BundlerConfig {
    /// Executable to run. Unset means `npx esbuild`, with `npx` looked up on
    /// `PATH`.
    pub program: Option<PathBuf>,
    /// Arguments placed before the generated flags.
    pub leading_args: Vec<String>,
    /// Environment variable extended with the runtime directory so that
    /// `import ... from "weft"` resolves.
    pub module_path_env: String,
}

impl Default for BundlerConfig {
    fn default() -> Self {
        BundlerConfig {
            program: None,
            leading_args: Vec::new(),
            module_path_env: "NODE_PATH".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BuildConfig {
    /// Final bundle location; its directory is created when missing.
    pub output_file: PathBuf,
    /// Where the per-run scratch directory is created.
    pub scratch_parent: PathBuf,
    pub scratch_prefix: String,
    pub runtime_dir: PathBuf,
    /// Remove the previous bundle before building.
    pub clean: bool,
    /// Extensions of template sources, without the dot.
    pub source_extensions: Vec<String>,
    pub bundler: BundlerConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            output_file: PathBuf::from("static/js/weft/index.js"),
            scratch_parent: PathBuf::from("."),
            scratch_prefix: ".wefttmp_".to_string(),
            runtime_dir: default_runtime_dir(),
            clean: false,
            source_extensions: vec!["weft".to_string()],
            bundler: BundlerConfig::default(),
        }
    }
}

impl BuildConfig {
    /// Reads a JSON config; missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path).map_err(|e| CompileError::io(path, e))?;
        let config: BuildConfig = serde_json::from_str(&data).map_err(|e| {
            CompileError::io(path, std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;
        Ok(config.with_env_overrides())
    }

    /// `WEFT_BUNDLER` replaces the bundler executable, `WEFT_RUNTIME_DIR` the
    /// runtime helper directory.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(program) = env::var_os(BUNDLER_ENV).filter(|v| !v.is_empty()) {
            self.bundler.program = Some(PathBuf::from(program));
        }
        if let Some(dir) = env::var_os(RUNTIME_DIR_ENV).filter(|v| !v.is_empty()) {
            self.runtime_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }
}
