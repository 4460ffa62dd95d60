//! 工具层：Tool trait、按节点声明构建的注册表与四种适配器

pub mod chat;
pub mod image_generator;
pub mod llm_process;
pub mod registry;
pub mod text_analyzer;

pub use chat::ChatTool;
pub use image_generator::ImageGeneratorTool;
pub use llm_process::LlmProcessTool;
pub use registry::{Tool, ToolDescriptor, ToolOutput, ToolRegistry};
pub use text_analyzer::TextAnalyzerTool;
