pub mod analysis;
pub mod environment;
pub mod llm;
pub mod logging;
pub mod map;
pub mod outlet;
pub mod prompt;
pub mod rss;
pub mod session;

pub use analysis::{AnalysisResult, Analyzer};
pub use environment::Config;
pub use llm::LlmClient;
pub use outlet::Outlet;
pub use rss::Article;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_LLM_REQUEST: &str = "llm_request";
