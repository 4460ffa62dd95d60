//! 核心层：错误类型、消息、执行状态与部分更新合并规则

pub mod error;
pub mod message;
pub mod state;

pub use error::AgentError;
pub use message::{Message, Role};
pub use state::{AgentState, ConversationContext, Phase, StateUpdate, TokenUsage};
