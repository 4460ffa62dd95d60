//! 执行状态：AgentState 与部分更新（StateUpdate）合并规则
//!
//! 一次顶层 execute() 创建一个 AgentState，各 Agent 返回 StateUpdate，
//! 由状态图按统一规则合并：消息与执行历史只追加，token 与成本只累加，
//! 其余字段以最新写入为准。调用结束即销毁，不跨调用持久化。

use serde::{Deserialize, Serialize};

use crate::core::message::Message;
use crate::tools::ToolDescriptor;
use crate::workflow::types::{ExecutionPlan, ExecutionResult};

/// 默认对话轮数上限（简单对话路径的外部守卫）
pub const DEFAULT_MAX_CONVERSATION_TURNS: u32 = 50;

/// Token 使用统计（单调不减）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: u64,
    pub output: u64,
}

impl TokenUsage {
    pub fn add(&mut self, other: TokenUsage) {
        self.input += other.input;
        self.output += other.output;
    }

    pub fn total(&self) -> u64 {
        self.input + self.output
    }
}

/// 状态图阶段标签：封闭枚举，既是数据也是转移函数的路由键
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Start,
    Planned,
    Executed,
    Continue,
    Finish,
    Completed,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Start => "start",
            Phase::Planned => "planned",
            Phase::Executed => "executed",
            Phase::Continue => "continue",
            Phase::Finish => "finish",
            Phase::Completed => "completed",
        }
    }
}

/// 对话路径的上下文：人设、背景、最近回复与轮数计数
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConversationContext {
    pub personality: Option<String>,
    pub context: Option<String>,
    pub last_response: Option<String>,
    pub turn: u32,
    pub max_turns: u32,
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self {
            personality: None,
            context: None,
            last_response: None,
            turn: 0,
            max_turns: DEFAULT_MAX_CONVERSATION_TURNS,
        }
    }
}

/// 一次执行贯穿始终的可变上下文
#[derive(Clone, Debug)]
pub struct AgentState {
    /// 角色标记消息序列（只追加）
    pub messages: Vec<Message>,
    pub workflow_id: String,
    pub session_id: String,
    pub user_id: String,
    /// Planner 产出的执行计划
    pub plan: Option<ExecutionPlan>,
    /// 最近一批执行结果（Coordinator 据此决策）
    pub latest_results: Vec<ExecutionResult>,
    /// 对话路径上下文
    pub conversation: ConversationContext,
    pub current_step: Phase,
    /// 全部执行结果（只追加）
    pub execution_history: Vec<ExecutionResult>,
    /// 本次运行可用工具快照
    pub available_tools: Vec<ToolDescriptor>,
    pub token_usage: TokenUsage,
    pub model_costs: f64,
}

impl AgentState {
    pub fn new(
        messages: Vec<Message>,
        workflow_id: impl Into<String>,
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        available_tools: Vec<ToolDescriptor>,
    ) -> Self {
        Self {
            messages,
            workflow_id: workflow_id.into(),
            session_id: session_id.into(),
            user_id: user_id.into(),
            plan: None,
            latest_results: Vec::new(),
            conversation: ConversationContext::default(),
            current_step: Phase::Start,
            execution_history: Vec::new(),
            available_tools,
            token_usage: TokenUsage::default(),
            model_costs: 0.0,
        }
    }

    /// 合并一条部分更新：
    /// 消息与执行历史拼接、token 与成本累加（保证单调不减）、其余字段以最新写入为准。
    pub fn apply(&mut self, update: StateUpdate) {
        self.messages.extend(update.messages);
        self.execution_history.extend(update.execution_history);
        self.token_usage.add(update.token_usage);
        self.model_costs += update.model_costs;
        if let Some(plan) = update.plan {
            self.plan = Some(plan);
        }
        if let Some(results) = update.latest_results {
            self.latest_results = results;
        }
        if let Some(conversation) = update.conversation {
            self.conversation = conversation;
        }
        if let Some(step) = update.current_step {
            self.current_step = step;
        }
    }
}

/// Agent 返回的部分更新；token_usage 与 model_costs 为本次增量
#[derive(Debug, Default)]
pub struct StateUpdate {
    pub messages: Vec<Message>,
    pub execution_history: Vec<ExecutionResult>,
    pub plan: Option<ExecutionPlan>,
    pub latest_results: Option<Vec<ExecutionResult>>,
    pub conversation: Option<ConversationContext>,
    pub current_step: Option<Phase>,
    pub token_usage: TokenUsage,
    pub model_costs: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::types::{ExecutionResult, ExecutionStep};

    fn empty_state() -> AgentState {
        AgentState::new(vec![Message::user("hi")], "w1", "s1", "u1", Vec::new())
    }

    #[test]
    fn apply_concatenates_messages_and_history() {
        let mut state = empty_state();
        let step = ExecutionStep {
            tool_name: "chat_c1".to_string(),
            parameters: serde_json::json!({}),
        };
        state.apply(StateUpdate {
            messages: vec![Message::assistant("a")],
            execution_history: vec![ExecutionResult::success(step.clone(), serde_json::json!(1))],
            ..Default::default()
        });
        state.apply(StateUpdate {
            messages: vec![Message::assistant("b")],
            execution_history: vec![ExecutionResult::failed(step, "boom")],
            ..Default::default()
        });
        assert_eq!(state.messages.len(), 3);
        assert_eq!(state.execution_history.len(), 2);
    }

    #[test]
    fn apply_accumulates_usage_and_costs() {
        let mut state = empty_state();
        state.apply(StateUpdate {
            token_usage: TokenUsage { input: 10, output: 5 },
            model_costs: 0.25,
            ..Default::default()
        });
        state.apply(StateUpdate {
            token_usage: TokenUsage { input: 1, output: 2 },
            model_costs: 0.5,
            ..Default::default()
        });
        assert_eq!(state.token_usage, TokenUsage { input: 11, output: 7 });
        assert!((state.model_costs - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn apply_last_write_wins_for_scalar_fields() {
        let mut state = empty_state();
        state.apply(StateUpdate {
            current_step: Some(Phase::Planned),
            ..Default::default()
        });
        state.apply(StateUpdate {
            current_step: Some(Phase::Executed),
            ..Default::default()
        });
        assert_eq!(state.current_step, Phase::Executed);
    }
}
