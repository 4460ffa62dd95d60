//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 LlmClient：complete（非流式，带用量）、
//! complete_stream（流式 Token，默认实现为单块回退）。
//! 每个 Agent 只依赖此 trait，测试时注入 Mock 即可。

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{stream, Stream};
use thiserror::Error;

use crate::core::message::Message;

/// 单次完成的 token 用量（由后端上报，可能缺失）
#[derive(Clone, Copy, Debug, Default)]
pub struct CompletionUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// 一次模型完成：文本与可选用量
#[derive(Clone, Debug)]
pub struct Completion {
    pub text: String,
    pub usage: Option<CompletionUsage>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }
}

/// LLM 调用错误
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("empty completion")]
    EmptyCompletion,
}

/// LLM 客户端 trait
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(&self, messages: &[Message]) -> Result<Completion, LlmError>;

    /// 流式完成，返回 Token 流；默认实现退化为单块输出
    async fn complete_stream(
        &self,
        messages: &[Message],
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>, LlmError> {
        let completion = self.complete(messages).await?;
        Ok(Box::pin(stream::iter(vec![Ok(completion.text)])))
    }
}
