//! Template expansion.
//!
//! Every templated string in the model and every packager descriptor goes
//! through a [`TemplateEngine`]. The default engine is Handlebars with HTML
//! escaping disabled, so templates may produce Ruby, YAML, JSON or shell
//! text verbatim. Missing keys render as empty strings.

mod builtin;
mod materialize;

pub use builtin::builtin_templates;
pub use materialize::{TemplateFile, TemplateSource, collect_templates, materialize, trim_tpl};

use crate::release::{
    error::{Error, Result},
    props::{self, PropertyContext},
};
use handlebars::{Handlebars, handlebars_helper};
use serde_json::Value;
use std::sync::LazyLock;

/// Expands a template string against a property context.
pub trait TemplateEngine {
    /// Renders `template`. `name` only identifies the template in errors.
    fn render(&self, name: &str, template: &str, props: &PropertyContext) -> Result<String>;
}

handlebars_helper!(lower: |s: str| s.to_lowercase());
handlebars_helper!(upper: |s: str| s.to_uppercase());
handlebars_helper!(capitalize: |s: str| props::capitalize(s));
handlebars_helper!(underscore: |s: str| props::underscore(s));
handlebars_helper!(dash: |s: str| props::dash(s));
handlebars_helper!(class_name: |s: str| props::class_name(s));

/// Handlebars backed [`TemplateEngine`].
pub struct HandlebarsEngine {
    registry: Handlebars<'static>,
}

impl HandlebarsEngine {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(false);
        registry.register_helper("lower", Box::new(lower));
        registry.register_helper("upper", Box::new(upper));
        registry.register_helper("capitalize", Box::new(capitalize));
        registry.register_helper("underscore", Box::new(underscore));
        registry.register_helper("dash", Box::new(dash));
        registry.register_helper("class_name", Box::new(class_name));
        Self { registry }
    }
}

impl Default for HandlebarsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for HandlebarsEngine {
    fn render(&self, name: &str, template: &str, props: &PropertyContext) -> Result<String> {
        self.registry
            .render_template(template, props.as_map())
            .map_err(|e| Error::Template {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}

static ENGINE: LazyLock<HandlebarsEngine> = LazyLock::new(HandlebarsEngine::new);

/// Shared default engine.
pub fn engine() -> &'static HandlebarsEngine {
    &ENGINE
}

/// Renders `template` with the default engine. Plain strings are returned
/// without a trip through the engine.
pub fn render_str(name: &str, template: &str, props: &PropertyContext) -> Result<String> {
    if !template.contains("{{") {
        return Ok(template.to_string());
    }
    ENGINE.render(name, template, props)
}

/// Renders every string value of `source` against `props` and stores the
/// result in `props` under the same key.
pub fn apply_templates(props: &mut PropertyContext, source: &PropertyContext) -> Result<()> {
    for (key, value) in source.iter() {
        let rendered = match value {
            Value::String(template) => Value::String(render_str(key, template, props)?),
            other => other.clone(),
        };
        props.put(key.clone(), rendered);
    }
    Ok(())
}
