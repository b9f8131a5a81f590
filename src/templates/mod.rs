mod analyzer;
mod readme;
mod view;

pub use analyzer::{ANALYZER_PROMPT, PROMPT_PLACEHOLDER};
pub use readme::README_TEMPLATE;
pub use view::VIEW_TEMPLATE;
