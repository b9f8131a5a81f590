/// Placeholder replaced with the prompt under analysis
pub const PROMPT_PLACEHOLDER: &str = "{{PROMPT}}";

/// Default analyzer prompt, used when no analyzer prompt file is present
pub const ANALYZER_PROMPT: &str = r#"You are cataloguing prompts for a prompt library. Analyze the prompt below and
produce metadata that lets a reader find it by category and understand it at a
glance.

<prompt>
{{PROMPT}}
</prompt>

## Instructions

1. Read the prompt carefully and work out what task it performs.
2. Choose ONE primary category in snake_case (for example `coding`,
   `writing`, `analysis`, `prompt_engineering`, `tools`).
3. Choose up to three subcategories in snake_case.
4. Choose a directory name: short, lowercase, words joined with hyphens or
   underscores, no slashes.
5. List the template variables the prompt expects, written as they appear
   (for example `{{TOPIC}}`), each with a short role describing what the user
   should supply.

## Output format

Reply with a YAML mapping wrapped in <output> tags and nothing inside the tags
except YAML:

<output>
title: Short human readable title
primary_category: category_name
subcategories:
  - first_subcategory
directory: directory-name
tags:
  - tag
one_line_description: One sentence describing the prompt
description: |
  Two or three sentences describing what the prompt does and when to use it.
variables:
  - name: "{{VARIABLE}}"
    role: What the user should supply for this variable
</output>
"#;
