//! Tool system for function calling.

pub mod arguments;
pub mod currency;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use currency::{currency_calculator, currency_calculator_tool, exchange_rate, Currency};
pub use tool::{AgentTool, Tool, ToolExecutionContext};
pub use types::AgentToolParameters;
