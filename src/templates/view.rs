/// Default per-entry view template
pub const VIEW_TEMPLATE: &str = r#"# {{metadata.title}}

{{metadata.one_line_description}}

- **Category**: {{format_string metadata.primary_category}}
{{#if metadata.subcategories}}
- **Subcategories**: {{#each metadata.subcategories}}{{#unless @first}}, {{/unless}}{{format_string this}}{{/each}}
{{/if}}
{{#if metadata.tags}}
- **Tags**: {{#each metadata.tags}}{{#unless @first}}, {{/unless}}`{{this}}`{{/each}}
{{/if}}

## Description

{{metadata.description}}

{{#if metadata.variables}}
## Variables

{{#each metadata.variables}}
- `{{this.name}}`{{#if this.role}}: {{this.role}}{{/if}}{{#if this.optional_for_user}} (optional){{/if}}
{{/each}}

{{/if}}
## Prompt

```markdown
{{prompt_content}}
```
"#;
