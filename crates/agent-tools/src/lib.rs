//! Tool management and execution framework for invest-assist
//!
//! Tools are the functions a research agent may call while answering: price
//! lookups, analyst recommendations, web searches.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::Tool;
