//! Installed tool resolution
//!
//! - [`candidates`]: the testing and analysis tools, in priority order
//! - [`resolver`]: [`ToolResolver`], a side-effect-free lookup in `vendor/bin`

pub mod candidates;
pub mod resolver;

pub use candidates::{AnalysisTool, TestTool, ANALYSIS_CANDIDATES, TEST_CANDIDATES};
pub use resolver::{Resolved, ToolNotFound, ToolResolver};
