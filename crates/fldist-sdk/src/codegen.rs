//! Release constants generation.
//!
//! Renders the Dart source file that exposes build metadata to the
//! application at compile time. The output is produced by direct string
//! templating against one fixed class shape and is deterministic: the same
//! field list yields byte-identical source, so regenerated files diff
//! cleanly between reproducible builds.

use std::path::Path;

use crate::types::DistError;

/// Default class name for the generated constants.
pub const DEFAULT_CLASS_NAME: &str = "Release";

const BANNER: &str = "// GENERATED CODE - DO NOT MODIFY BY HAND";

/// A typed constant in the generated release class. Field order is
/// preserved in the output.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseField {
    pub name: String,
    pub value: FieldValue,
}

impl ReleaseField {
    pub fn string(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: FieldValue::Str(value.into()),
        }
    }

    pub fn int(name: &str, value: i64) -> Self {
        Self {
            name: name.to_string(),
            value: FieldValue::Int(value),
        }
    }

    pub fn bool(name: &str, value: bool) -> Self {
        Self {
            name: name.to_string(),
            value: FieldValue::Bool(value),
        }
    }
}

/// Literal value of a release field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl FieldValue {
    fn dart_type(&self) -> &'static str {
        match self {
            FieldValue::Str(_) => "String",
            FieldValue::Int(_) => "int",
            FieldValue::Bool(_) => "bool",
        }
    }

    fn dart_literal(&self) -> String {
        match self {
            FieldValue::Str(value) => format!("'{}'", escape_dart_string(value)),
            FieldValue::Int(value) => value.to_string(),
            FieldValue::Bool(value) => value.to_string(),
        }
    }
}

/// Renders the Dart class for the given fields.
pub fn render_release_class(fields: &[ReleaseField], class_name: &str) -> String {
    let mut source = String::new();
    source.push_str(BANNER);
    source.push_str("\n\n");
    source.push_str(&format!("class {} {{\n", class_name));
    // Private constructor: the class is a namespace, never instantiated.
    source.push_str(&format!("  {}._();\n\n", class_name));
    for field in fields {
        source.push_str(&format!(
            "  static const {} {} = {};\n",
            field.value.dart_type(),
            field.name,
            field.value.dart_literal()
        ));
    }
    source.push_str("}\n");
    source
}

/// Writes the generated class to `path`, overwriting any previous run's
/// output and creating parent directories as needed.
pub fn write_release_class(
    path: &Path,
    fields: &[ReleaseField],
    class_name: &str,
) -> Result<(), DistError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, render_release_class(fields, class_name))?;
    Ok(())
}

/// Escapes a value for a single-quoted Dart string literal. `$` starts an
/// interpolation in Dart and must be escaped too.
fn escape_dart_string(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '$' => escaped.push_str("\\$"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> Vec<ReleaseField> {
        vec![
            ReleaseField::string("appName", "demo_app"),
            ReleaseField::string("versionName", "1.2.0"),
            ReleaseField::int("versionCode", 7),
            ReleaseField::string("env", "prod"),
            ReleaseField::bool("sealed", true),
            ReleaseField::string("buildTime", "2024-01-01 10:00:00"),
            ReleaseField::string("commitRef", "ab12cd3"),
        ]
    }

    #[test]
    fn renders_expected_dart_source() {
        let source = render_release_class(&sample_fields(), DEFAULT_CLASS_NAME);
        let expected = "\
// GENERATED CODE - DO NOT MODIFY BY HAND

class Release {
  Release._();

  static const String appName = 'demo_app';
  static const String versionName = '1.2.0';
  static const int versionCode = 7;
  static const String env = 'prod';
  static const bool sealed = true;
  static const String buildTime = '2024-01-01 10:00:00';
  static const String commitRef = 'ab12cd3';
}
";
        assert_eq!(source, expected);
    }

    #[test]
    fn output_is_deterministic() {
        let first = render_release_class(&sample_fields(), DEFAULT_CLASS_NAME);
        let second = render_release_class(&sample_fields(), DEFAULT_CLASS_NAME);
        assert_eq!(first, second);
    }

    #[test]
    fn escapes_dart_string_metacharacters() {
        let fields = vec![ReleaseField::string("note", "it's $5 \\ two")];
        let source = render_release_class(&fields, DEFAULT_CLASS_NAME);
        assert!(source.contains(r"static const String note = 'it\'s \$5 \\ two';"));
    }

    #[test]
    fn writes_and_overwrites_the_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lib/constants/release.dart");

        write_release_class(&path, &sample_fields(), DEFAULT_CLASS_NAME).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        assert!(first.contains("class Release {"));

        let fewer = vec![ReleaseField::string("env", "dev")];
        write_release_class(&path, &fewer, DEFAULT_CLASS_NAME).unwrap();
        let second = std::fs::read_to_string(&path).unwrap();
        assert!(!second.contains("appName"));
    }
}
