//! 智能体层
//!
//! 状态图四节点（Planner / Executor / Coordinator / Summarizer）与两条对话路径
//! （ConversationalAgent / EnhancedConversationalAgent）。每个 Agent 只读 AgentState，
//! 产出 StateUpdate，由状态图统一合并。

pub mod conversational;
pub mod coordinator;
pub mod enhanced;
pub mod executor;
pub mod planner;
pub mod structured;
pub mod summarizer;

pub use conversational::{should_continue_conversation, ConversationalAgent};
pub use coordinator::CoordinatorAgent;
pub use enhanced::EnhancedConversationalAgent;
pub use executor::ExecutorAgent;
pub use planner::{extract_json_object, PlannerAgent};
pub use structured::{classify_response_type, parse_structured_response};
pub use summarizer::SummarizerAgent;

use crate::config::ModelPricing;
use crate::core::state::TokenUsage;
use crate::llm::Completion;

/// 把一次完成的用量折算为状态增量（后端未上报用量则为零增量）
pub(crate) fn usage_delta(completion: &Completion, pricing: ModelPricing) -> (TokenUsage, f64) {
    match completion.usage {
        Some(usage) => (
            TokenUsage {
                input: usage.input_tokens,
                output: usage.output_tokens,
            },
            pricing.cost(&usage),
        ),
        None => (TokenUsage::default(), 0.0),
    }
}
