//! Mock LLM 客户端（用于测试与离线演示，无需 API）
//!
//! MockLlmClient 回显最后一条 User 消息并按字符数估算用量；
//! FailingLlmClient 恒定失败，用于验证顶层兜底路径。

use async_trait::async_trait;

use crate::core::message::{last_user_content, Message};
use crate::llm::{estimate_tokens, Completion, CompletionUsage, LlmClient, LlmError};

/// Mock 客户端：回显用户最后一条消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<Completion, LlmError> {
        let last_user = last_user_content(messages);
        let prompt_chars: u64 = messages.iter().map(|m| m.content.chars().count() as u64).sum();
        let text = format!("Echo from Mock: {}", last_user);
        Ok(Completion {
            usage: Some(CompletionUsage {
                input_tokens: (prompt_chars / 4).max(1),
                output_tokens: estimate_tokens(&text),
            }),
            text,
        })
    }
}

/// 恒定失败客户端：模拟后端不可用
#[derive(Debug, Default)]
pub struct FailingLlmClient;

#[async_trait]
impl LlmClient for FailingLlmClient {
    async fn complete(&self, _messages: &[Message]) -> Result<Completion, LlmError> {
        Err(LlmError::Request("simulated backend failure".to_string()))
    }
}
