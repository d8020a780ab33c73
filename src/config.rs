//! Resolver configuration loaded from YAML.
//!
//! ```yaml
//! default_inline_resolver: preserve_marker   # or: apply (default)
//! template_dir: templates/inline             # every *.hbs, keyed by file stem
//! templates:
//!   tweet: "<blockquote>{{model.text}}</blockquote>"
//! model_variables:
//!   site: Dancing Goat
//! ```

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::rich_text::template::HandlebarsTemplateResolver;
use crate::rich_text::DefaultInlinePolicy;

/// Declarative part of the engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolverConfig {
    /// Whether the default inline resolver renders unhandled embedded items.
    #[serde(default)]
    pub default_inline_resolver: DefaultInlinePolicy,

    /// Inline handlebars templates keyed by content type.
    #[serde(default)]
    pub templates: BTreeMap<String, String>,

    /// Directory of `*.hbs` templates. Relative paths resolve against the
    /// config file's directory when loaded with [`ResolverConfig::from_path`].
    #[serde(default)]
    pub template_dir: Option<PathBuf>,

    /// Variables added to every template model.
    #[serde(default)]
    pub model_variables: BTreeMap<String, Value>,
}

impl ResolverConfig {
    /// Load configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml_str(&content)?;
        if let (Some(dir), Some(base)) = (&config.template_dir, path.parent()) {
            if dir.is_relative() {
                config.template_dir = Some(base.join(dir));
            }
        }
        Ok(config)
    }

    /// True when the config declares any template source.
    pub fn has_templates(&self) -> bool {
        !self.templates.is_empty() || self.template_dir.is_some()
    }

    /// Handlebars resolver holding every configured template. Directory
    /// templates are registered first, so an inline template with the same
    /// content type replaces it.
    pub fn template_resolver(&self) -> Result<HandlebarsTemplateResolver> {
        let mut resolver = HandlebarsTemplateResolver::new();
        if let Some(dir) = &self.template_dir {
            resolver.register_template_dir(dir)?;
        }
        for (content_type, source) in &self.templates {
            resolver.register_template(content_type, source)?;
        }
        Ok(resolver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config.default_inline_resolver, DefaultInlinePolicy::Apply);
        assert!(!config.has_templates());
    }

    #[test]
    fn test_load_config() {
        let yaml = r#"
default_inline_resolver: preserve_marker
templates:
  tweet: "<blockquote>{{model.text}}</blockquote>"
model_variables:
  site: Dancing Goat
  year: 2019
"#;
        let config = ResolverConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(
            config.default_inline_resolver,
            DefaultInlinePolicy::PreserveMarker
        );
        assert_eq!(config.model_variables["year"], serde_json::json!(2019));

        let resolver = config.template_resolver().unwrap();
        assert!(resolver.has_template("tweet"));
    }

    #[test]
    fn test_invalid_policy_is_config_error() {
        let err = ResolverConfig::from_yaml_str("default_inline_resolver: sometimes").unwrap_err();
        assert_eq!(err.code(), "CONFIG");
    }

    #[test]
    fn test_relative_template_dir_resolves_against_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("inline")).unwrap();
        std::fs::write(dir.path().join("inline/video.hbs"), "<video>{{model.url}}</video>").unwrap();
        let config_path = dir.path().join("resolver.yaml");
        std::fs::write(&config_path, "template_dir: inline\n").unwrap();

        let config = ResolverConfig::from_path(&config_path).unwrap();
        assert_eq!(config.template_dir, Some(dir.path().join("inline")));
        assert!(config.template_resolver().unwrap().has_template("video"));
    }
}
