//! CR-004: Recipe loading and validation.
//!
//! A recipe names a service, its lifecycle events, its custom commands, and
//! the compute templates it can be deployed on. The `lifecycle` and
//! `custom_commands` sections are free-form in YAML and are classified into
//! [`EntriesMap`]s on load.

use super::classifier::classify_map;
use super::template::ComputeTemplate;
use super::types::{EntriesMap, ExecutableEntry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml_ng::Value;
use std::path::Path;

/// Sections holding executable entries, in display order.
pub const ENTRY_SECTIONS: [&str; 2] = ["lifecycle", "custom_commands"];

/// A loaded recipe with classified entries.
#[derive(Debug, Clone, Serialize)]
pub struct Recipe {
    pub name: String,
    pub description: Option<String>,
    pub lifecycle: EntriesMap,
    pub custom_commands: EntriesMap,
    pub templates: IndexMap<String, ComputeTemplate>,
}

/// Recipe as written, before classification.
#[derive(Debug, Deserialize)]
struct RawRecipe {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    lifecycle: Value,
    #[serde(default)]
    custom_commands: Value,
    #[serde(default)]
    templates: IndexMap<String, ComputeTemplate>,
}

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Recipe {
    /// Entries of a section by name (`lifecycle` or `custom_commands`).
    pub fn section(&self, name: &str) -> Option<&EntriesMap> {
        match name {
            "lifecycle" => Some(&self.lifecycle),
            "custom_commands" => Some(&self.custom_commands),
            _ => None,
        }
    }

    /// Look up an entry by path, e.g. `lifecycle/start` or
    /// `custom_commands/db/backup`.
    pub fn find(&self, path: &str) -> Option<&ExecutableEntry> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let section = self.section(segments.next()?)?;
        let entry = section.get(segments.next()?)?;
        let rest: Vec<&str> = segments.collect();
        entry.find(&rest.join("/"))
    }
}

/// Load a recipe from a YAML file.
pub fn load_recipe(path: &Path) -> Result<Recipe, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read recipe {}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), bytes = content.len(), "loading recipe");
    parse_recipe(&content)
}

/// Parse a recipe from a YAML string and classify its entry sections.
pub fn parse_recipe(yaml: &str) -> Result<Recipe, String> {
    let raw: RawRecipe =
        serde_yaml_ng::from_str(yaml).map_err(|e| format!("recipe parse error: {}", e))?;

    let lifecycle = classify_section(&raw.lifecycle, "lifecycle")?;
    let custom_commands = classify_section(&raw.custom_commands, "custom_commands")?;

    tracing::debug!(
        recipe = %raw.name,
        lifecycle = lifecycle.len(),
        custom_commands = custom_commands.len(),
        templates = raw.templates.len(),
        "classified recipe"
    );

    Ok(Recipe {
        name: raw.name,
        description: raw.description,
        lifecycle,
        custom_commands,
        templates: raw.templates,
    })
}

/// Absent sections are empty.
fn classify_section(value: &Value, name: &str) -> Result<EntriesMap, String> {
    if value.is_null() {
        tracing::trace!(section = name, "section absent");
        return Ok(EntriesMap::new());
    }
    classify_map(value, name).map_err(|e| format!("recipe classification error: {}", e))
}

/// Validate a loaded recipe. Returns a list of errors (empty = valid).
pub fn validate_recipe(recipe: &Recipe) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if recipe.name.trim().is_empty() {
        errors.push(ValidationError {
            message: "name must not be empty".to_string(),
        });
    }

    for (name, template) in &recipe.templates {
        if let Err(e) = template.validate() {
            errors.push(ValidationError {
                message: format!("template '{}': {}", name, e),
            });
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECIPE_YAML: &str = r#"
name: tomcat
description: "Tomcat application server"
lifecycle:
  init: install.sh
  start: [catalina.sh start, tail -f logs/catalina.out]
  stop: !script |
    shutdown(grace: 30)
  monitors:
    jmx: jmx-probe.sh
    http: [curl -sf localhost:8080, echo ok]
custom_commands:
  rebuild: build.sh
templates:
  small:
    image_id: ubuntu-22.04
    machine_memory_mb: 1600
    remote_directory: /opt/app
    local_directory: upload
"#;

    #[test]
    fn test_cr004_parse_recipe() {
        let recipe = parse_recipe(RECIPE_YAML).unwrap();
        assert_eq!(recipe.name, "tomcat");
        assert_eq!(recipe.lifecycle.len(), 4);
        assert_eq!(recipe.custom_commands.len(), 1);
        assert_eq!(recipe.templates.len(), 1);
        assert_eq!(recipe.templates["small"].machine_memory_mb, 1600);
    }

    #[test]
    fn test_cr004_sections_classified() {
        let recipe = parse_recipe(RECIPE_YAML).unwrap();
        assert_eq!(recipe.lifecycle["init"].as_command(), Some("install.sh"));
        assert_eq!(
            recipe.lifecycle["start"].as_commands().unwrap(),
            ["catalina.sh start", "tail -f logs/catalina.out"]
        );
        assert_eq!(
            recipe.lifecycle["stop"].as_script().map(|s| s.source()),
            Some("shutdown(grace: 30)\n")
        );
        assert!(recipe.lifecycle["monitors"].as_map().is_some());
        assert_eq!(
            recipe.custom_commands["rebuild"].as_command(),
            Some("build.sh")
        );
    }

    #[test]
    fn test_cr004_find_paths() {
        let recipe = parse_recipe(RECIPE_YAML).unwrap();
        assert_eq!(
            recipe.find("lifecycle/monitors/jmx").and_then(|e| e.as_command()),
            Some("jmx-probe.sh")
        );
        assert!(recipe.find("lifecycle/monitors").is_some());
        assert!(recipe.find("lifecycle").is_none());
        assert!(recipe.find("templates/small").is_none());
        assert!(recipe.find("lifecycle/missing").is_none());
    }

    #[test]
    fn test_cr004_absent_sections_empty() {
        let recipe = parse_recipe("name: bare\n").unwrap();
        assert!(recipe.lifecycle.is_empty());
        assert!(recipe.custom_commands.is_empty());
        assert!(recipe.templates.is_empty());
        let recipe = parse_recipe("name: bare\nlifecycle:\n").unwrap();
        assert!(recipe.lifecycle.is_empty());
    }

    #[test]
    fn test_cr004_classification_error_surfaces() {
        let yaml = "name: bad\nlifecycle:\n  start: 42\n";
        let err = parse_recipe(yaml).unwrap_err();
        assert!(err.starts_with("recipe classification error:"), "{err}");
        assert!(err.contains("'start'"), "{err}");
        assert!(err.contains("integer"), "{err}");
    }

    #[test]
    fn test_cr004_lifecycle_must_be_mapping() {
        let err = parse_recipe("name: bad\nlifecycle: run.sh\n").unwrap_err();
        assert!(err.contains("must be a mapping"), "{err}");
        assert!(err.contains("'lifecycle'"), "{err}");
    }

    #[test]
    fn test_cr004_non_string_key_in_custom_commands() {
        let err = parse_recipe("name: bad\ncustom_commands:\n  1: run.sh\n").unwrap_err();
        assert!(err.contains("'custom_commands'"), "{err}");
        assert!(err.contains("not a string: 1"), "{err}");
    }

    #[test]
    fn test_cr004_parse_invalid_yaml() {
        let err = parse_recipe("name: [valid: yaml: {{").unwrap_err();
        assert!(err.starts_with("recipe parse error"));
    }

    #[test]
    fn test_cr004_missing_name() {
        assert!(parse_recipe("lifecycle: {}\n").is_err());
    }

    #[test]
    fn test_cr004_validate_ok() {
        let recipe = parse_recipe(RECIPE_YAML).unwrap();
        let errors = validate_recipe(&recipe);
        assert!(
            errors.is_empty(),
            "unexpected errors: {:?}",
            errors.iter().map(|e| &e.message).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_cr004_validate_empty_name() {
        let recipe = parse_recipe("name: \"  \"\n").unwrap();
        let errors = validate_recipe(&recipe);
        assert!(errors.iter().any(|e| e.message.contains("name must not be empty")));
    }

    #[test]
    fn test_cr004_validate_template_errors_named() {
        let yaml = r#"
name: svc
templates:
  good:
    remote_directory: /opt
    local_directory: up
  bad:
    local_directory: up
  placeholder:
    remote_directory: /opt
    local_directory: up
    key_file: ENTER_KEY_FILE_NAME
"#;
        let recipe = parse_recipe(yaml).unwrap();
        let errors = validate_recipe(&recipe);
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .any(|e| e.message == "template 'bad': remote directory for template is missing"));
        assert!(errors
            .iter()
            .any(|e| e.message.starts_with("template 'placeholder': key file")));
    }

    #[test]
    fn test_cr004_load_recipe_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tomcat.yaml");
        std::fs::write(&path, RECIPE_YAML).unwrap();
        let recipe = load_recipe(&path).unwrap();
        assert_eq!(recipe.name, "tomcat");
    }

    #[test]
    fn test_cr004_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_recipe(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(err.starts_with("cannot read recipe"));
    }
}
