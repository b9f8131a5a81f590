use crate::context::RunContext;
use crate::entry::{self, Entry};
use crate::metadata::Metadata;
use crate::render::{README, TemplateEngine, VIEW};
use eyre::{Context, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path};
use std::sync::LazyLock;

static BLANK_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("static regex"));

/// One line of the README index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub path: String,
    pub subcategories: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
struct CategoryView<'a> {
    name: &'a str,
    prompts: &'a [PromptSummary],
}

/// What a render pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewReport {
    pub rendered: usize,
    pub skipped: Vec<String>,
    pub categories: Vec<String>,
}

pub struct ViewRenderer<'a, T: TemplateEngine> {
    ctx: &'a RunContext,
    engine: &'a T,
}

impl<'a, T: TemplateEngine> ViewRenderer<'a, T> {
    pub fn new(ctx: &'a RunContext, engine: &'a T) -> Self {
        Self { ctx, engine }
    }

    /// Render every entry's view and the README index.
    pub fn run(&self) -> Result<ViewReport> {
        log::info!("Starting update_views process");
        let files = &self.ctx.config.files;
        let root = self.ctx.prompts_dir();
        let readme_path = self.ctx.config.readme_path(&self.ctx.work_dir);

        let mut report = ViewReport::default();
        let mut categories: BTreeMap<String, Vec<PromptSummary>> = BTreeMap::new();

        for entry in entry::discover(&root, &[files.prompt.as_str(), files.metadata.as_str()]) {
            match self.render_entry(&entry)? {
                Some(metadata) => {
                    let category = if metadata.primary_category.trim().is_empty() {
                        self.ctx.config.render.default_category.clone()
                    } else {
                        metadata.primary_category.clone()
                    };
                    let summary = summarize(&entry, &metadata, &files.view, readme_path.parent());
                    log::debug!("Added prompt to category: {}", category);
                    categories.entry(category).or_default().push(summary);
                    report.rendered += 1;
                }
                None => report.skipped.push(entry.name()),
            }
        }

        categories.retain(|_, prompts| !prompts.is_empty());
        report.categories = categories.keys().cloned().collect();

        let listing: Vec<CategoryView> = categories
            .iter()
            .map(|(name, prompts)| CategoryView { name, prompts })
            .collect();

        log::info!("Generating README content");
        let readme = self
            .engine
            .render(README, &serde_json::json!({ "categories": listing }))?;
        if let Some(parent) = readme_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).context(format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&readme_path, normalize_blank_lines(&readme))
            .context(format!("Failed to write {}", readme_path.display()))?;
        log::info!("Wrote README content to {}", readme_path.display());

        log::info!("update_views process completed");
        Ok(report)
    }

    /// Render one view. `None` when the entry lacks its prompt or metadata.
    fn render_entry(&self, entry: &Entry) -> Result<Option<Metadata>> {
        let files = &self.ctx.config.files;
        let prompt_path = entry.prompt_path(files);
        let metadata_path = entry.metadata_path(files);
        log::info!("Processing prompt directory: {}", entry.name());

        if !prompt_path.is_file() {
            log::warn!("No {} in {}, skipping", files.prompt, entry.dir.display());
            return Ok(None);
        }
        if !metadata_path.is_file() {
            log::warn!("No {} in {}, skipping", files.metadata, entry.dir.display());
            return Ok(None);
        }

        let prompt_bytes = fs::read(&prompt_path).context(format!("Failed to read {}", prompt_path.display()))?;
        let prompt_content = match String::from_utf8(prompt_bytes) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("{} is not valid UTF-8, rendering it lossily", prompt_path.display());
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };
        let metadata = match Metadata::load(&metadata_path) {
            Ok(metadata) => metadata,
            Err(e) => {
                log::warn!("Skipping {}: {:#}", entry.name(), e);
                return Ok(None);
            }
        };

        let metadata_value = match serde_json::to_value(&metadata) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Skipping {}: metadata cannot be passed to the template: {}", entry.name(), e);
                return Ok(None);
            }
        };
        let view = self.engine.render(
            VIEW,
            &serde_json::json!({
                "metadata": metadata_value,
                "prompt_content": prompt_content,
            }),
        )?;

        let view_path = entry.view_path(files);
        fs::write(&view_path, view).context(format!("Failed to write {}", view_path.display()))?;
        log::info!("Wrote view content to {}", view_path.display());
        Ok(Some(metadata))
    }
}

fn summarize(entry: &Entry, metadata: &Metadata, view_file: &str, readme_dir: Option<&Path>) -> PromptSummary {
    let view_path = entry.dir.join(view_file);
    let relative = readme_dir
        .and_then(|dir| relative_to(&view_path, dir))
        .unwrap_or(view_path);

    PromptSummary {
        id: entry
            .rel
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        title: non_blank(&metadata.title, "Untitled"),
        description: non_blank(&metadata.one_line_description, "No description"),
        path: to_link(&relative),
        subcategories: metadata.subcategories.clone(),
    }
}

fn non_blank(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// `path` as seen from `base`, with `..` steps where they diverge.
fn relative_to(path: &Path, base: &Path) -> Option<std::path::PathBuf> {
    if path.is_absolute() == base.is_absolute() {
        return pathdiff::diff_paths(path, base);
    }
    let path = std::path::absolute(path).ok()?;
    let base = std::path::absolute(base).ok()?;
    pathdiff::diff_paths(path, base)
}

/// Forward-slash link text for a relative path.
fn to_link(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            Component::ParentDir => Some("..".to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Collapse runs of blank lines to a single one and end with one newline.
pub fn normalize_blank_lines(text: &str) -> String {
    let collapsed = BLANK_RUNS.replace_all(text, "\n\n");
    format!("{}\n", collapsed.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::metadata::Variable;
    use crate::render::HandlebarsEngine;
    use std::path::PathBuf;
    use std::cell::RefCell;
    use tempfile::{TempDir, tempdir};

    fn metadata(title: &str, category: &str, directory: &str) -> Metadata {
        Metadata {
            title: title.to_string(),
            primary_category: category.to_string(),
            subcategories: vec!["sub_one".to_string()],
            directory: directory.to_string(),
            tags: vec!["t".to_string()],
            one_line_description: format!("{} in one line", title),
            description: "Longer".to_string(),
            variables: vec![Variable {
                name: "{{X}}".to_string(),
                role: "The thing".to_string(),
                optional_for_user: false,
            }],
            ..Default::default()
        }
    }

    fn add_entry(root: &Path, rel: &str, prompt: Option<&str>, meta: Option<&Metadata>) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        if let Some(prompt) = prompt {
            fs::write(dir.join("prompt.md"), prompt).unwrap();
        }
        if let Some(meta) = meta {
            meta.save_with_hash(&dir.join("metadata.yml"), "hash").unwrap();
        }
    }

    fn context(dir: &TempDir) -> RunContext {
        RunContext::new(dir.path(), Config::default(), false, None)
    }

    /// Records every render call and returns a fixed string.
    struct RecordingEngine {
        calls: RefCell<Vec<(String, serde_json::Value)>>,
    }

    impl TemplateEngine for RecordingEngine {
        fn render(&self, name: &str, data: &serde_json::Value) -> Result<String> {
            self.calls.borrow_mut().push((name.to_string(), data.clone()));
            Ok(format!("rendered {}", name))
        }
    }

    #[test]
    fn test_categories_sorted_and_missing_metadata_excluded() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("prompts");
        add_entry(&root, "b/one", Some("p1"), Some(&metadata("B One", "b", "one")));
        add_entry(&root, "a/two", Some("p2"), Some(&metadata("A Two", "a", "two")));
        add_entry(&root, "a/three", Some("p3"), Some(&metadata("A Three", "a", "three")));
        add_entry(&root, "a/orphan", Some("p4"), None);
        let ctx = context(&dir);
        let engine = HandlebarsEngine::new().unwrap();

        let report = ViewRenderer::new(&ctx, &engine).run().unwrap();

        assert_eq!(report.rendered, 3);
        assert_eq!(report.skipped, vec!["a/orphan".to_string()]);
        assert_eq!(report.categories, vec!["a".to_string(), "b".to_string()]);
        assert!(!root.join("a/orphan/view.md").exists());

        let readme = fs::read_to_string(dir.path().join("README.md")).unwrap();
        let a = readme.find("## A\n").unwrap();
        let b = readme.find("## B\n").unwrap();
        assert!(a < b);
        assert!(readme.contains("[A Two](prompts/a/two/view.md) - A Two in one line"));
        assert!(readme.contains("[B One](prompts/b/one/view.md)"));
        assert!(!readme.contains("orphan"));
        assert!(!readme.contains("\n\n\n"));
        assert!(readme.ends_with("\n") && !readme.ends_with("\n\n"));
    }

    #[test]
    fn test_view_contains_metadata_and_prompt() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("prompts");
        add_entry(
            &root,
            "code_generation/w",
            Some("Write <code> for {{X}}"),
            Some(&metadata("Widget", "code_generation", "w")),
        );
        let ctx = context(&dir);
        let engine = HandlebarsEngine::new().unwrap();

        ViewRenderer::new(&ctx, &engine).run().unwrap();

        let view = fs::read_to_string(root.join("code_generation/w/view.md")).unwrap();
        assert!(view.starts_with("# Widget\n"));
        assert!(view.contains("**Category**: Code Generation"));
        assert!(view.contains("**Subcategories**: Sub One"));
        assert!(view.contains("Write <code> for {{X}}"));
    }

    #[test]
    fn test_entry_without_prompt_is_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("prompts");
        add_entry(&root, "tools/meta-only", None, Some(&metadata("M", "tools", "meta-only")));
        let ctx = context(&dir);
        let engine = RecordingEngine {
            calls: RefCell::new(vec![]),
        };

        let report = ViewRenderer::new(&ctx, &engine).run().unwrap();

        assert_eq!(report.rendered, 0);
        assert_eq!(report.skipped, vec!["tools/meta-only".to_string()]);
        let calls = engine.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, README);
        assert_eq!(calls[0].1["categories"], serde_json::json!([]));
    }

    #[test]
    fn test_unreadable_metadata_is_skipped() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("prompts");
        add_entry(&root, "tools/broken", Some("p"), None);
        fs::write(root.join("tools/broken/metadata.yml"), "title: [unclosed\n").unwrap();
        let ctx = context(&dir);
        let engine = HandlebarsEngine::new().unwrap();

        let report = ViewRenderer::new(&ctx, &engine).run().unwrap();

        assert_eq!(report.skipped, vec!["tools/broken".to_string()]);
    }

    #[test]
    fn test_view_receives_full_metadata_record() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("prompts");
        let meta = metadata("Full", "tools", "full");
        add_entry(&root, "tools/full", Some("body"), Some(&meta));
        let ctx = context(&dir);
        let engine = RecordingEngine {
            calls: RefCell::new(vec![]),
        };

        ViewRenderer::new(&ctx, &engine).run().unwrap();

        let calls = engine.calls.borrow();
        let (name, data) = &calls[0];
        assert_eq!(name, VIEW);
        assert_eq!(data["prompt_content"], "body");
        let mut expected = meta.clone();
        expected.content_hash = Some("hash".to_string());
        let seen: Metadata = serde_json::from_value(data["metadata"].clone()).unwrap();
        assert_eq!(seen, expected);
        assert_eq!(fs::read_to_string(root.join("tools/full/view.md")).unwrap(), "rendered view");
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("prompts");
        add_entry(&root, "a/x", Some("p"), Some(&metadata("X", "a", "x")));
        let ctx = context(&dir);
        let engine = HandlebarsEngine::new().unwrap();
        let renderer = ViewRenderer::new(&ctx, &engine);

        renderer.run().unwrap();
        let first = fs::read_to_string(dir.path().join("README.md")).unwrap();
        renderer.run().unwrap();
        let second = fs::read_to_string(dir.path().join("README.md")).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_partial_metadata_uses_fallbacks() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("prompts");
        add_entry(&root, "tools/w", Some("p"), None);
        fs::write(
            root.join("tools/w/metadata.yml"),
            "directory: w\none_line_description: d\ncontent_hash: abc\n",
        )
        .unwrap();
        let ctx = context(&dir);
        let engine = HandlebarsEngine::new().unwrap();

        let report = ViewRenderer::new(&ctx, &engine).run().unwrap();

        assert_eq!(report.rendered, 1);
        assert!(report.skipped.is_empty());
        assert_eq!(report.categories, vec!["uncategorized".to_string()]);
        let readme = fs::read_to_string(dir.path().join("README.md")).unwrap();
        assert!(readme.contains("## Uncategorized"));
        assert!(readme.contains("[Untitled](prompts/tools/w/view.md) - d"));
    }

    #[test]
    fn test_role_variables_and_extra_keys_reach_the_view() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("prompts");
        add_entry(&root, "tools/w", Some("Use {{X}}"), None);
        let text = r#"title: W
primary_category: tools
directory: w
one_line_description: d
variables:
  - name: '{{X}}'
    role: the input
fragments:
  - category: common
    name: formatting
content_hash: abc
"#;
        fs::write(root.join("tools/w/metadata.yml"), text).unwrap();
        let ctx = context(&dir);
        let engine = HandlebarsEngine::new().unwrap();

        let report = ViewRenderer::new(&ctx, &engine).run().unwrap();

        assert_eq!(report.rendered, 1);
        let view = fs::read_to_string(root.join("tools/w/view.md")).unwrap();
        assert!(view.contains("- `{{X}}`: the input"));

        let recorder = RecordingEngine {
            calls: RefCell::new(vec![]),
        };
        ViewRenderer::new(&ctx, &recorder).run().unwrap();
        let calls = recorder.calls.borrow();
        assert_eq!(calls[0].1["metadata"]["fragments"][0]["name"], "formatting");
    }

    #[test]
    fn test_links_are_relative_to_readme_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("prompts");
        add_entry(&root, "tools/w", Some("p"), Some(&metadata("W", "tools", "w")));
        let mut config = Config::default();
        config.paths.readme = PathBuf::from("docs/README.md");
        let ctx = RunContext::new(dir.path(), config, false, None);
        let engine = HandlebarsEngine::new().unwrap();

        ViewRenderer::new(&ctx, &engine).run().unwrap();

        let readme = fs::read_to_string(dir.path().join("docs/README.md")).unwrap();
        assert!(readme.contains("[W](../prompts/tools/w/view.md)"));
    }

    #[test]
    fn test_relative_to_work_dir_readme() {
        assert_eq!(
            relative_to(Path::new("./prompts/a/x/view.md"), Path::new(".")),
            Some(PathBuf::from("prompts/a/x/view.md"))
        );
        assert_eq!(
            relative_to(Path::new("./prompts/a/x/view.md"), Path::new("./docs")),
            Some(PathBuf::from("../prompts/a/x/view.md"))
        );
    }

    #[test]
    fn test_non_utf8_prompt_does_not_abort() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("prompts");
        add_entry(&root, "tools/bin", None, Some(&metadata("Bin", "tools", "bin")));
        fs::write(root.join("tools/bin/prompt.md"), b"ok \xff end").unwrap();
        add_entry(&root, "tools/w", Some("p"), Some(&metadata("W", "tools", "w")));
        let ctx = context(&dir);
        let engine = HandlebarsEngine::new().unwrap();

        let report = ViewRenderer::new(&ctx, &engine).run().unwrap();

        assert_eq!(report.rendered, 2);
        let view = fs::read_to_string(root.join("tools/bin/view.md")).unwrap();
        assert!(view.contains("ok \u{FFFD} end"));
        assert!(dir.path().join("README.md").exists());
    }

    #[test]
    fn test_normalize_blank_lines() {
        assert_eq!(normalize_blank_lines("a\n\n\n\nb\n\n"), "a\n\nb\n");
        assert_eq!(normalize_blank_lines("\n\nx"), "x\n");
    }
}
