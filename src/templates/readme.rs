/// Default README index template
pub const README_TEMPLATE: &str = r#"# Prompt Library

A categorized collection of prompts. Each entry links to a rendered view with
its description, variables and the full prompt text.

{{#each categories}}
## {{format_string this.name}}

{{#each this.prompts}}
- [{{this.title}}]({{this.path}}) - {{this.description}}
{{/each}}

{{/each}}
"#;
