//! 增强对话路径：单次调用产出结构化回复
//!
//! system 提示词强制要求六段标签输出，原始文本交给纯解析器（structured.rs）。
//! 模型调用失败时返回固定兜底：道歉文本 + error 类别 + confidence 0.3，
//! 本 Agent 对外不抛错 —— 它本身就是顶层的最后一道兜底。

use std::sync::Arc;

use crate::config::ModelPricing;
use crate::core::message::{last_user_content, Message};
use crate::core::state::{AgentState, StateUpdate};
use crate::llm::LlmClient;
use crate::workflow::types::{ResponseMetadata, ResponseType, StructuredAiResponse};

use super::structured::parse_structured_response;

/// 模型调用失败时的兜底置信度
const FALLBACK_CONFIDENCE: f32 = 0.3;

const STRUCTURED_PROMPT: &str = "\
You are a helpful assistant. You MUST structure every reply with exactly these \
tagged sections, in this order:

<thinking>Your private reasoning about the request.</thinking>
<objectives>Goals for this reply, separated by semicolons.</objectives>
<response>The reply shown to the user.</response>
<summary>One-sentence summary of the exchange.</summary>
<confidence>A number between 0 and 1.</confidence>
<metadata>
response_type: one of greeting, question, task, conversation, error
requires_followup: true or false
suggested_actions: comma-separated follow-up suggestions
</metadata>";

pub struct EnhancedConversationalAgent {
    llm: Arc<dyn LlmClient>,
    pricing: ModelPricing,
}

impl EnhancedConversationalAgent {
    pub fn new(llm: Arc<dyn LlmClient>, pricing: ModelPricing) -> Self {
        Self { llm, pricing }
    }

    /// 一次调用 + 确定性解析；永不失败。
    /// 返回结构化回复与本次调用的状态增量（用量 / 消息）。
    pub async fn generate_structured_response(
        &self,
        state: &AgentState,
    ) -> (StructuredAiResponse, StateUpdate) {
        let user_input = last_user_content(&state.messages).to_string();
        let messages = vec![
            Message::system(STRUCTURED_PROMPT.to_string()),
            Message::user(user_input.clone()),
        ];

        match self.llm.complete(&messages).await {
            Ok(completion) => {
                let (token_usage, model_costs) = super::usage_delta(&completion, self.pricing);
                let structured = parse_structured_response(&completion.text, &user_input);
                let update = StateUpdate {
                    messages: vec![Message::assistant(structured.response.clone())],
                    token_usage,
                    model_costs,
                    ..Default::default()
                };
                (structured, update)
            }
            Err(e) => {
                tracing::warn!(error = %e, "structured response call failed, using fixed fallback");
                (Self::error_fallback(&e.to_string()), StateUpdate::default())
            }
        }
    }

    /// 模型不可用时的固定兜底回复
    fn error_fallback(error: &str) -> StructuredAiResponse {
        StructuredAiResponse {
            response: "I apologize, but I'm having trouble processing your request right now. \
                       Please try again in a moment."
                .to_string(),
            thinking: Some(error.to_string()),
            objectives: None,
            summary: None,
            confidence: Some(FALLBACK_CONFIDENCE),
            metadata: ResponseMetadata {
                response_type: ResponseType::Error,
                requires_followup: true,
                suggested_actions: Vec::new(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Completion, FailingLlmClient, LlmClient, LlmError};
    use async_trait::async_trait;

    struct TaggedLlm;

    #[async_trait]
    impl LlmClient for TaggedLlm {
        async fn complete(&self, _messages: &[Message]) -> Result<Completion, LlmError> {
            Ok(Completion::new(
                "<response>Bonjour!</response><confidence>0.8</confidence>\
                 <metadata>\nresponse_type: greeting\n</metadata>",
            ))
        }
    }

    fn state() -> AgentState {
        AgentState::new(vec![Message::user("Hi!")], "w", "s", "u", Vec::new())
    }

    #[tokio::test]
    async fn tagged_reply_is_parsed_into_structured_response() {
        let agent = EnhancedConversationalAgent::new(Arc::new(TaggedLlm), ModelPricing::default());
        let (structured, update) = agent.generate_structured_response(&state()).await;
        assert_eq!(structured.response, "Bonjour!");
        assert_eq!(structured.metadata.response_type, ResponseType::Greeting);
        assert_eq!(update.messages.len(), 1);
    }

    #[tokio::test]
    async fn llm_failure_yields_fixed_error_fallback() {
        let agent =
            EnhancedConversationalAgent::new(Arc::new(FailingLlmClient), ModelPricing::default());
        let (structured, _) = agent.generate_structured_response(&state()).await;
        assert_eq!(structured.metadata.response_type, ResponseType::Error);
        assert!(structured.metadata.requires_followup);
        assert_eq!(structured.confidence, Some(0.3));
        assert!(structured.thinking.unwrap().contains("simulated backend failure"));
    }
}
