use crate::templates::{README_TEMPLATE, VIEW_TEMPLATE};
use eyre::{Context, Result};
use handlebars::{Handlebars, handlebars_helper};
use std::fs;
use std::path::Path;

pub const VIEW: &str = "view";
pub const README: &str = "readme";

const VIEW_TEMPLATE_FILE: &str = "view_template.md";
const README_TEMPLATE_FILE: &str = "readme_template.md";

/// Renders a named template against JSON data. Same inputs, same output.
pub trait TemplateEngine {
    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String>;
}

handlebars_helper!(format_string: |s: str| title_case(s));

/// `code_generation` -> `Code Generation`
pub fn title_case(s: &str) -> String {
    s.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct HandlebarsEngine {
    registry: Handlebars<'static>,
}

impl HandlebarsEngine {
    /// Built-in view and README templates.
    pub fn new() -> Result<Self> {
        Self::with_templates(VIEW_TEMPLATE, README_TEMPLATE)
    }

    pub fn with_templates(view: &str, readme: &str) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_helper("format_string", Box::new(format_string));

        registry
            .register_template_string(VIEW, view)
            .context("Failed to register view template")?;
        registry
            .register_template_string(README, readme)
            .context("Failed to register readme template")?;

        Ok(Self { registry })
    }

    /// Built-in templates, each replaced by its file in `templates_dir` when
    /// that file exists.
    pub fn from_dir(templates_dir: &Path) -> Result<Self> {
        if !templates_dir.is_dir() {
            log::debug!("No templates directory at {}, using built-ins", templates_dir.display());
            return Self::new();
        }
        let view = load_override(templates_dir, VIEW_TEMPLATE_FILE)?;
        let readme = load_override(templates_dir, README_TEMPLATE_FILE)?;
        Self::with_templates(
            view.as_deref().unwrap_or(VIEW_TEMPLATE),
            readme.as_deref().unwrap_or(README_TEMPLATE),
        )
    }
}

fn load_override(templates_dir: &Path, file_name: &str) -> Result<Option<String>> {
    let path = templates_dir.join(file_name);
    if !path.is_file() {
        log::debug!("No template at {}, using built-in", path.display());
        return Ok(None);
    }
    let content = fs::read_to_string(&path).context(format!("Failed to read template {}", path.display()))?;
    log::info!("Using template {}", path.display());
    Ok(Some(content))
}

impl TemplateEngine for HandlebarsEngine {
    fn render(&self, name: &str, data: &serde_json::Value) -> Result<String> {
        self.registry
            .render(name, data)
            .context(format!("Failed to render {} template", name))
    }
}

/// Write the built-in templates into `templates_dir`, keeping existing files.
pub fn write_default_templates(templates_dir: &Path) -> Result<Vec<String>> {
    fs::create_dir_all(templates_dir).context("Failed to create templates directory")?;
    let mut written = Vec::new();
    for (file_name, content) in [(VIEW_TEMPLATE_FILE, VIEW_TEMPLATE), (README_TEMPLATE_FILE, README_TEMPLATE)] {
        let path = templates_dir.join(file_name);
        if path.exists() {
            continue;
        }
        fs::write(&path, content).context(format!("Failed to write {}", path.display()))?;
        written.push(file_name.to_string());
    }
    Ok(written)
}
