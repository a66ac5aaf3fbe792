//! Engine settings and their JSON configuration form.

use crate::error::ConfigError;
use crate::evaluation::EvaluationMode;
use crate::variables::Variable;
use exprscope_api::{AccessModifier, HierarchyNode, PrimitiveKind, TypeRef, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Which part of the token under the caret a completion replaces.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompletionMode {
    #[default]
    ReplaceUntilCaret,
    ReplaceWholeToken,
}

/// A caller-defined variable.
#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: String,
    pub value: Value,
    pub declared_type: TypeRef,
    pub is_final: bool,
}

impl VariableDecl {
    pub fn to_variable(&self) -> Variable {
        Variable::new(
            self.name.clone(),
            self.value.clone(),
            self.declared_type.clone(),
            self.is_final,
        )
    }
}

/// Immutable engine settings; build with [`Settings::builder`].
#[derive(Clone)]
pub struct Settings {
    pub minimum_field_access: AccessModifier,
    pub minimum_method_access: AccessModifier,
    pub minimum_class_access: AccessModifier,
    /// Fully qualified names of explicitly imported classes
    pub imported_classes: Vec<String>,
    /// Packages imported with a wildcard
    pub imported_packages: Vec<String>,
    pub variables: Vec<VariableDecl>,
    pub evaluation_mode: EvaluationMode,
    pub completion_mode: CompletionMode,
    pub custom_hierarchy_root: Option<Arc<dyn HierarchyNode>>,
    /// Suggest classes that are not imported once a prefix has been typed
    pub complete_all_classes: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            minimum_field_access: AccessModifier::Public,
            minimum_method_access: AccessModifier::Public,
            minimum_class_access: AccessModifier::Public,
            imported_classes: Vec::new(),
            imported_packages: Vec::new(),
            variables: Vec::new(),
            evaluation_mode: EvaluationMode::default(),
            completion_mode: CompletionMode::default(),
            custom_hierarchy_root: None,
            complete_all_classes: true,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("minimum_field_access", &self.minimum_field_access)
            .field("minimum_method_access", &self.minimum_method_access)
            .field("minimum_class_access", &self.minimum_class_access)
            .field("imported_classes", &self.imported_classes)
            .field("imported_packages", &self.imported_packages)
            .field("variables", &self.variables)
            .field("evaluation_mode", &self.evaluation_mode)
            .field("completion_mode", &self.completion_mode)
            .field("custom_hierarchy", &self.custom_hierarchy_root.is_some())
            .field("complete_all_classes", &self.complete_all_classes)
            .finish()
    }
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    /// Copy of these settings with a different evaluation mode.
    pub fn with_evaluation_mode(&self, mode: EvaluationMode) -> Self {
        Self {
            evaluation_mode: mode,
            ..self.clone()
        }
    }
}

#[derive(Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn minimum_field_access(mut self, access: AccessModifier) -> Self {
        self.settings.minimum_field_access = access;
        self
    }

    pub fn minimum_method_access(mut self, access: AccessModifier) -> Self {
        self.settings.minimum_method_access = access;
        self
    }

    pub fn minimum_class_access(mut self, access: AccessModifier) -> Self {
        self.settings.minimum_class_access = access;
        self
    }

    /// Set all three minimum access levels at once.
    pub fn minimum_access(self, access: AccessModifier) -> Self {
        self.minimum_field_access(access)
            .minimum_method_access(access)
            .minimum_class_access(access)
    }

    pub fn import_class(mut self, fqn: impl Into<String>) -> Self {
        self.settings.imported_classes.push(fqn.into());
        self
    }

    pub fn import_package(mut self, package: impl Into<String>) -> Self {
        self.settings.imported_packages.push(package.into());
        self
    }

    pub fn variable(
        mut self,
        name: impl Into<String>,
        value: Value,
        declared_type: TypeRef,
        is_final: bool,
    ) -> Self {
        self.settings.variables.push(VariableDecl {
            name: name.into(),
            value,
            declared_type,
            is_final,
        });
        self
    }

    pub fn evaluation_mode(mut self, mode: EvaluationMode) -> Self {
        self.settings.evaluation_mode = mode;
        self
    }

    pub fn completion_mode(mut self, mode: CompletionMode) -> Self {
        self.settings.completion_mode = mode;
        self
    }

    pub fn custom_hierarchy_root(mut self, root: Arc<dyn HierarchyNode>) -> Self {
        self.settings.custom_hierarchy_root = Some(root);
        self
    }

    pub fn complete_all_classes(mut self, enabled: bool) -> Self {
        self.settings.complete_all_classes = enabled;
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}

/// A variable as written in a configuration file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct VariableConfig {
    pub name: String,
    /// Declared type (`int`, `java.lang.String`, ...); inferred from the value when absent
    #[serde(default, rename = "type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub value: serde_json::Value,
    #[serde(default, rename = "final")]
    pub is_final: bool,
}

/// The serializable subset of [`Settings`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub minimum_field_access: AccessModifier,
    pub minimum_method_access: AccessModifier,
    pub minimum_class_access: AccessModifier,
    pub imported_classes: Vec<String>,
    pub imported_packages: Vec<String>,
    pub variables: Vec<VariableConfig>,
    pub evaluation_mode: EvaluationMode,
    pub completion_mode: CompletionMode,
    pub complete_all_classes: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let defaults = Settings::default();
        Self {
            minimum_field_access: defaults.minimum_field_access,
            minimum_method_access: defaults.minimum_method_access,
            minimum_class_access: defaults.minimum_class_access,
            imported_classes: Vec::new(),
            imported_packages: Vec::new(),
            variables: Vec::new(),
            evaluation_mode: defaults.evaluation_mode,
            completion_mode: defaults.completion_mode,
            complete_all_classes: defaults.complete_all_classes,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn into_settings(self) -> Result<Settings, ConfigError> {
        let mut builder = Settings::builder()
            .minimum_field_access(self.minimum_field_access)
            .minimum_method_access(self.minimum_method_access)
            .minimum_class_access(self.minimum_class_access)
            .evaluation_mode(self.evaluation_mode)
            .completion_mode(self.completion_mode)
            .complete_all_classes(self.complete_all_classes);
        for class in self.imported_classes {
            builder = builder.import_class(class);
        }
        for package in self.imported_packages {
            builder = builder.import_package(package);
        }
        for variable in self.variables {
            let (value, declared_type) = variable_value(&variable)?;
            builder = builder.variable(variable.name, value, declared_type, variable.is_final);
        }
        Ok(builder.build())
    }
}

fn parse_type_name(name: &str) -> TypeRef {
    if let Some(element) = name.strip_suffix("[]") {
        return TypeRef::array_of(parse_type_name(element));
    }
    match PrimitiveKind::from_name(name) {
        Some(kind) => TypeRef::Primitive(kind),
        None => TypeRef::class(name),
    }
}

fn variable_value(config: &VariableConfig) -> Result<(Value, TypeRef), ConfigError> {
    use serde_json::Value as Json;
    let invalid = |what: &str| {
        ConfigError::Invalid(format!("variable '{}': {what}", config.name))
    };
    let declared = config.type_name.as_deref().map(parse_type_name);
    let value = match (&config.value, declared.as_ref().and_then(TypeRef::unboxed)) {
        (Json::Null, _) => Value::Null,
        (Json::Bool(b), _) => Value::Boolean(*b),
        (Json::String(s), Some(PrimitiveKind::Char)) => {
            let mut units = s.encode_utf16();
            match (units.next(), units.next()) {
                (Some(c), None) => Value::Char(c),
                _ => return Err(invalid("char values must be a single character")),
            }
        }
        (Json::String(s), _) => Value::string(s),
        (Json::Number(n), Some(kind)) if kind.is_integral() => {
            let v = n.as_i64().ok_or_else(|| invalid("expected an integral number"))?;
            crate::types::convert_primitive(&Value::Long(v), kind)
        }
        (Json::Number(n), Some(kind)) if kind.is_floating() => {
            let v = n.as_f64().ok_or_else(|| invalid("expected a number"))?;
            crate::types::convert_primitive(&Value::Double(v), kind)
        }
        (Json::Number(n), _) => match n.as_i64() {
            Some(v) => match i32::try_from(v) {
                Ok(v) => Value::Int(v),
                Err(_) => Value::Long(v),
            },
            None => Value::Double(n.as_f64().ok_or_else(|| invalid("unsupported number"))?),
        },
        (Json::Array(_) | Json::Object(_), _) => {
            return Err(invalid("only scalar values are supported"));
        }
    };
    let declared = match declared {
        Some(declared) => declared,
        None => match value.primitive_kind() {
            Some(kind) => TypeRef::Primitive(kind),
            None if value.is_null() => TypeRef::object(),
            None => value.runtime_type(),
        },
    };
    Ok((value, declared))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builder_defaults() {
        let settings = Settings::builder()
            .import_package("java.util")
            .variable("x", Value::Int(1), TypeRef::INT, false)
            .build();
        assert_eq!(settings.evaluation_mode, EvaluationMode::DynamicTyping);
        assert_eq!(settings.completion_mode, CompletionMode::ReplaceUntilCaret);
        assert_eq!(settings.imported_packages, vec!["java.util"]);
        assert_eq!(settings.variables.len(), 1);
        assert!(settings.complete_all_classes);
    }

    #[test]
    fn test_config_from_json() {
        let config = EngineConfig::from_json_str(
            r#"{
                "minimum_field_access": "private",
                "imported_packages": ["java.util"],
                "evaluation_mode": "mixed",
                "variables": [
                    {"name": "count", "value": 3},
                    {"name": "ratio", "value": 1.5, "final": true},
                    {"name": "small", "type": "byte", "value": 7},
                    {"name": "label", "value": "hi"},
                    {"name": "initial", "type": "char", "value": "c"}
                ]
            }"#,
        )
        .unwrap();
        let settings = config.into_settings().unwrap();
        assert_eq!(settings.minimum_field_access, AccessModifier::Private);
        assert_eq!(settings.minimum_method_access, AccessModifier::Public);
        assert_eq!(settings.evaluation_mode, EvaluationMode::Mixed);

        let vars = &settings.variables;
        assert_eq!(vars[0].declared_type, TypeRef::INT);
        assert!(vars[1].is_final);
        assert_eq!(vars[1].declared_type, TypeRef::DOUBLE);
        assert!(matches!(vars[2].value, Value::Byte(7)));
        assert_eq!(vars[3].declared_type, TypeRef::string());
        assert!(matches!(vars[4].value, Value::Char(c) if c == u16::from(b'c')));
    }

    #[test]
    fn test_config_rejects_structured_values() {
        let config =
            EngineConfig::from_json_str(r#"{"variables": [{"name": "v", "value": [1]}]}"#).unwrap();
        assert!(matches!(config.into_settings(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_config_load_and_save() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"imported_classes": ["java.util.ArrayList"]}}"#).unwrap();
        let config = EngineConfig::load(file.path()).unwrap();
        assert_eq!(config.imported_classes, vec!["java.util.ArrayList"]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.json");
        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            EngineConfig::load(dir.path().join("absent.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
