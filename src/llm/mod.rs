//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Mock）

pub mod mock;
pub mod openai;
pub mod traits;

pub use mock::{FailingLlmClient, MockLlmClient};
pub use openai::OpenAiClient;
pub use traits::{Completion, CompletionUsage, LlmClient, LlmError};

/// 粗略 token 估算：约 4 字符一个 token（后端未上报用量时的占位值）
pub fn estimate_tokens(text: &str) -> u64 {
    (text.chars().count() as u64 / 4).max(1)
}
