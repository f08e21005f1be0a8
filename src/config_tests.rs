#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    use crate::config::{default_runtime_dir, BuildConfig, BUNDLER_ENV, RUNTIME_DIR_ENV};

    #[test]
    fn test_defaults() {
        let config = BuildConfig::default();
        assert_eq!(config.source_extensions, vec!["weft".to_string()]);
        assert_eq!(config.bundler.module_path_env, "NODE_PATH");
        assert!(config.bundler.program.is_none());
        assert_eq!(config.output_dir(), PathBuf::from("static/js/weft"));
        assert!(default_runtime_dir().join("weft.js").is_file());
    }

    // Environment overrides live in the same test as file loading so the two
    // never observe each other's variables.
    #[test]
    fn test_from_file_and_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weft.json");
        fs::write(
            &path,
            r#"{ "outputFile": "public/app.js", "clean": true, "bundler": { "leadingArgs": ["--log-level=error"] } }"#,
        )
        .unwrap();

        env::remove_var(BUNDLER_ENV);
        env::remove_var(RUNTIME_DIR_ENV);
        let config = BuildConfig::from_file(&path).unwrap();
        assert_eq!(config.output_file, PathBuf::from("public/app.js"));
        assert!(config.clean);
        assert_eq!(config.bundler.leading_args, vec!["--log-level=error".to_string()]);
        assert_eq!(config.scratch_prefix, ".wefttmp_");

        env::set_var(BUNDLER_ENV, "/usr/local/bin/esbuild");
        env::set_var(RUNTIME_DIR_ENV, "/opt/weft/runtime");
        let config = BuildConfig::from_file(&path).unwrap();
        env::remove_var(BUNDLER_ENV);
        env::remove_var(RUNTIME_DIR_ENV);
        assert_eq!(config.bundler.program, Some(PathBuf::from("/usr/local/bin/esbuild")));
        assert_eq!(config.runtime_dir, PathBuf::from("/opt/weft/runtime"));

        fs::write(&path, "{ not json").unwrap();
        let err = BuildConfig::from_file(&path).unwrap_err();
        assert_eq!(err.code(), crate::error::ERR_IO);
    }
}
