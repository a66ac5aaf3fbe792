use exprscope_core::{ConfigError, EngineConfig, ExpressionEngine, Settings};
use exprscope_host::ClassRegistry;
use std::path::Path;
use std::sync::Arc;

/// Builds an engine over the bundled standard library.
///
/// Wildcard imports of `java.util` and `java.util.function` are added so the
/// collection and functional types resolve by simple name.
pub fn build_default_engine(settings: Settings) -> ExpressionEngine {
    let registry = ClassRegistry::standard();
    tracing::debug!("standard registry holds {} classes", registry.len());
    let mut settings = settings;
    for package in ["java.util", "java.util.function"] {
        if !settings.imported_packages.iter().any(|p| p == package) {
            settings.imported_packages.push(package.to_string());
        }
    }
    ExpressionEngine::new(Arc::new(registry), settings)
}

/// Like [`build_default_engine`], with settings read from a JSON config file.
pub fn build_engine_from_config(path: &Path) -> Result<ExpressionEngine, ConfigError> {
    let settings = EngineConfig::load(path)?.into_settings()?;
    Ok(build_default_engine(settings))
}

/// Logging for a binary `component`; keep the returned guard until exit.
pub fn init_logging(component: &str, to_stderr: bool) -> Option<impl Drop> {
    exprscope_core::logging::init_logging(component, to_stderr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use exprscope_core::EvaluationMode;
    use std::io::Write;

    #[test]
    fn test_default_engine_resolves_collections() {
        let engine = build_default_engine(Settings::default());
        let info = engine.evaluate("new ArrayList().size()", &exprscope_api::Value::Null).unwrap();
        assert!(matches!(info.value(), Some(exprscope_api::Value::Int(0))));
    }

    #[test]
    fn test_engine_from_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"evaluation_mode": "mixed", "variables": [{{"name": "n", "value": 41}}]}}"#
        )
        .unwrap();
        let engine = build_engine_from_config(file.path()).unwrap();
        assert_eq!(engine.settings().evaluation_mode, EvaluationMode::Mixed);
        assert!(engine.settings().imported_packages.iter().any(|p| p == "java.util"));
        let info = engine.evaluate("n + 1", &exprscope_api::Value::Null).unwrap();
        assert!(matches!(info.value(), Some(exprscope_api::Value::Int(42))));
    }
}
