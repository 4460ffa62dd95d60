//! Agent 错误类型
//!
//! 步骤级失败是数据（ExecutionResult::Failed），不走这里；
//! 本枚举只覆盖会让状态图整体失败、并在 WorkflowExecutor 边界触发兜底的错误。

use thiserror::Error;

use crate::llm::LlmError;

/// 状态图运行过程中可能出现的错误（LLM 调用、解析、递归上限）
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    /// 状态图转移次数超过上限，是 Executor <-> Coordinator 循环的唯一终止保证
    #[error("Recursion limit of {0} exceeded")]
    RecursionLimitExceeded(usize),
}

impl From<LlmError> for AgentError {
    fn from(e: LlmError) -> Self {
        AgentError::Llm(e.to_string())
    }
}
