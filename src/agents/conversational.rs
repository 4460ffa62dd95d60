//! 简单对话路径：状态图之外的独立多轮聊天
//!
//! 由人设 / 背景 / 已有轮次拼 system 提示词，一次模型调用，
//! 更新 last_response 并递增轮数；调用方用 should_continue_conversation 驱动自己的循环。

use std::sync::Arc;

use crate::config::ModelPricing;
use crate::core::message::{last_user_content, Message, Role};
use crate::core::state::{AgentState, StateUpdate};
use crate::core::AgentError;
use crate::llm::LlmClient;

/// system 提示词里保留的最近消息条数
const HISTORY_WINDOW: usize = 10;

/// 外部循环守卫：轮数未达上限才继续
pub fn should_continue_conversation(state: &AgentState) -> bool {
    state.conversation.turn < state.conversation.max_turns
}

pub struct ConversationalAgent {
    llm: Arc<dyn LlmClient>,
    pricing: ModelPricing,
}

impl ConversationalAgent {
    pub fn new(llm: Arc<dyn LlmClient>, pricing: ModelPricing) -> Self {
        Self { llm, pricing }
    }

    fn system_prompt(state: &AgentState) -> String {
        let mut prompt = state
            .conversation
            .personality
            .clone()
            .unwrap_or_else(|| "You are a helpful, friendly assistant.".to_string());

        if let Some(context) = &state.conversation.context {
            prompt.push_str("\n\nContext:\n");
            prompt.push_str(context);
        }

        let history: Vec<String> = state
            .messages
            .iter()
            .rev()
            .take(HISTORY_WINDOW)
            .map(|m| {
                let role = match m.role {
                    Role::User => "User",
                    Role::Assistant => "Assistant",
                    Role::System => "System",
                };
                format!("{}: {}", role, m.content)
            })
            .collect();
        if !history.is_empty() {
            prompt.push_str("\n\nConversation so far:\n");
            for line in history.iter().rev() {
                prompt.push_str(line);
                prompt.push('\n');
            }
        }
        prompt
    }

    /// converse(state) -> 追加回复消息，更新 last_response 与轮数计数
    pub async fn converse(&self, state: &AgentState) -> Result<StateUpdate, AgentError> {
        let messages = vec![
            Message::system(Self::system_prompt(state)),
            Message::user(last_user_content(&state.messages).to_string()),
        ];

        let completion = self.llm.complete(&messages).await?;
        let (token_usage, model_costs) = super::usage_delta(&completion, self.pricing);

        let mut conversation = state.conversation.clone();
        conversation.last_response = Some(completion.text.clone());
        conversation.turn += 1;

        Ok(StateUpdate {
            messages: vec![Message::assistant(completion.text)],
            conversation: Some(conversation),
            token_usage,
            model_costs,
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn state() -> AgentState {
        AgentState::new(vec![Message::user("hello")], "w", "s", "u", Vec::new())
    }

    #[tokio::test]
    async fn converse_updates_turn_and_last_response() {
        let agent = ConversationalAgent::new(Arc::new(MockLlmClient), ModelPricing::default());
        let state = state();
        let update = agent.converse(&state).await.unwrap();
        let conversation = update.conversation.unwrap();
        assert_eq!(conversation.turn, 1);
        assert!(conversation.last_response.unwrap().contains("hello"));
        assert_eq!(update.messages.len(), 1);
    }

    #[test]
    fn continue_guard_is_strict_at_the_boundary() {
        let mut state = state();
        state.conversation.max_turns = 50;

        state.conversation.turn = 49;
        assert!(should_continue_conversation(&state));

        state.conversation.turn = 50;
        assert!(!should_continue_conversation(&state));
    }
}
