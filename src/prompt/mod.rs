mod bias;
mod common;

pub use bias::{build_prompt, coverage_comparison_prompt, single_article_prompt, AnalysisContext};
pub use common::*;
