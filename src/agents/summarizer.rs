//! Summarizer：由原始请求与全部执行结果生成面向用户的最终文本

use std::sync::Arc;

use crate::config::ModelPricing;
use crate::core::message::{Message, Role};
use crate::core::state::{AgentState, Phase, StateUpdate};
use crate::core::AgentError;
use crate::llm::LlmClient;

pub struct SummarizerAgent {
    llm: Arc<dyn LlmClient>,
    pricing: ModelPricing,
}

impl SummarizerAgent {
    pub fn new(llm: Arc<dyn LlmClient>, pricing: ModelPricing) -> Self {
        Self { llm, pricing }
    }

    /// summarize(state) -> 追加最终回复消息，current_step = Completed（终态）
    pub async fn summarize(&self, state: &AgentState) -> Result<StateUpdate, AgentError> {
        // 原始请求取首条 User 消息，而非最新一条
        let original_request = state
            .messages
            .iter()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("");

        let results_json = serde_json::to_string_pretty(&state.execution_history)
            .map_err(|e| AgentError::JsonParse(e.to_string()))?;

        let messages = vec![
            Message::system(
                "You are a summarizer. Given the user's original request and the workflow \
                 execution results, write a clear, helpful answer for the user. \
                 Do not mention internal tooling."
                    .to_string(),
            ),
            Message::user(format!(
                "Original request: {}\n\nExecution results:\n{}",
                original_request, results_json
            )),
        ];

        let completion = self.llm.complete(&messages).await?;
        let (token_usage, model_costs) = super::usage_delta(&completion, self.pricing);

        tracing::info!(workflow_id = %state.workflow_id, "summarizer completed workflow");

        Ok(StateUpdate {
            messages: vec![Message::assistant(completion.text)],
            current_step: Some(Phase::Completed),
            token_usage,
            model_costs,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Completion, LlmError};
    use async_trait::async_trait;

    struct RecordingLlm(std::sync::Mutex<Vec<String>>);

    #[async_trait]
    impl LlmClient for RecordingLlm {
        async fn complete(&self, messages: &[Message]) -> Result<Completion, LlmError> {
            self.0
                .lock()
                .unwrap()
                .push(messages.last().unwrap().content.clone());
            Ok(Completion::new("All done."))
        }
    }

    #[tokio::test]
    async fn summarize_embeds_first_user_message_and_completes() {
        let llm = Arc::new(RecordingLlm(std::sync::Mutex::new(Vec::new())));
        let summarizer = SummarizerAgent::new(llm.clone(), ModelPricing::default());
        let mut state = AgentState::new(
            vec![Message::user("first request"), Message::user("follow-up")],
            "w",
            "s",
            "u",
            Vec::new(),
        );
        state.execution_history = Vec::new();

        let update = summarizer.summarize(&state).await.unwrap();
        assert_eq!(update.current_step, Some(Phase::Completed));
        assert_eq!(update.messages.len(), 1);
        let prompt = llm.0.lock().unwrap().pop().unwrap();
        assert!(prompt.contains("first request"));
        assert!(!prompt.contains("Original request: follow-up"));
    }
}
