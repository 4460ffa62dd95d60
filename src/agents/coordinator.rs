//! Coordinator：检视最近一批结果，决定回环重试还是收尾
//!
//! 无失败步骤时直接 Finish，不发起模型调用；有失败时做一次分类调用，
//! 回复文本含 "continue"（不区分大小写）才回环，否则默认 Finish ——
//! 刻意偏向终止，避免无界重试。

use std::sync::Arc;

use crate::config::ModelPricing;
use crate::core::message::Message;
use crate::core::state::{AgentState, Phase, StateUpdate};
use crate::core::AgentError;
use crate::llm::LlmClient;

pub struct CoordinatorAgent {
    llm: Arc<dyn LlmClient>,
    pricing: ModelPricing,
}

impl CoordinatorAgent {
    pub fn new(llm: Arc<dyn LlmClient>, pricing: ModelPricing) -> Self {
        Self { llm, pricing }
    }

    /// coordinate(state) -> current_step = Continue | Finish
    pub async fn coordinate(&self, state: &AgentState) -> Result<StateUpdate, AgentError> {
        let failed: Vec<_> = state
            .latest_results
            .iter()
            .filter(|r| r.is_failed())
            .collect();

        if failed.is_empty() {
            return Ok(StateUpdate {
                current_step: Some(Phase::Finish),
                ..Default::default()
            });
        }

        let failed_json = serde_json::to_string(&failed)
            .map_err(|e| AgentError::JsonParse(e.to_string()))?;
        let messages = vec![
            Message::system(
                "You are a workflow coordinator. Some execution steps failed. \
                 Decide whether the workflow should retry the failed steps or stop. \
                 Reply with exactly one word: \"continue\" or \"finish\"."
                    .to_string(),
            ),
            Message::user(format!("Failed steps:\n{}", failed_json)),
        ];

        let completion = self.llm.complete(&messages).await?;
        let (token_usage, model_costs) = super::usage_delta(&completion, self.pricing);

        let decision = if completion.text.to_lowercase().contains("continue") {
            Phase::Continue
        } else {
            Phase::Finish
        };
        tracing::info!(
            workflow_id = %state.workflow_id,
            failed = failed.len(),
            decision = decision.as_str(),
            "coordinator decision"
        );

        Ok(StateUpdate {
            current_step: Some(decision),
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
    use crate::workflow::types::{ExecutionResult, ExecutionStep};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingLlm {
        reply: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmClient for CountingLlm {
        async fn complete(&self, _messages: &[Message]) -> Result<Completion, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Completion::new(self.reply.clone()))
        }
    }

    fn step() -> ExecutionStep {
        ExecutionStep {
            tool_name: "chat_c1".to_string(),
            parameters: serde_json::json!({}),
        }
    }

    fn state_with_results(results: Vec<ExecutionResult>) -> AgentState {
        let mut state = AgentState::new(vec![Message::user("go")], "w", "s", "u", Vec::new());
        state.latest_results = results;
        state
    }

    #[tokio::test]
    async fn all_success_finishes_without_model_call() {
        let llm = Arc::new(CountingLlm {
            reply: "continue".to_string(),
            calls: AtomicUsize::new(0),
        });
        let coordinator = CoordinatorAgent::new(llm.clone(), ModelPricing::default());
        let state = state_with_results(vec![ExecutionResult::success(step(), serde_json::json!(1))]);
        let update = coordinator.coordinate(&state).await.unwrap();
        assert_eq!(update.current_step, Some(Phase::Finish));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_with_continue_reply_loops_back() {
        let llm = Arc::new(CountingLlm {
            reply: "I think we should CONTINUE with the retry.".to_string(),
            calls: AtomicUsize::new(0),
        });
        let coordinator = CoordinatorAgent::new(llm.clone(), ModelPricing::default());
        let state = state_with_results(vec![ExecutionResult::failed(step(), "boom")]);
        let update = coordinator.coordinate(&state).await.unwrap();
        assert_eq!(update.current_step, Some(Phase::Continue));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn ambiguous_reply_defaults_to_finish() {
        let llm = Arc::new(CountingLlm {
            reply: "The failures look permanent, better stop.".to_string(),
            calls: AtomicUsize::new(0),
        });
        let coordinator = CoordinatorAgent::new(llm, ModelPricing::default());
        let state = state_with_results(vec![ExecutionResult::failed(step(), "boom")]);
        let update = coordinator.coordinate(&state).await.unwrap();
        assert_eq!(update.current_step, Some(Phase::Finish));
    }
}
