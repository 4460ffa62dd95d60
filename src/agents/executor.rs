//! Executor：按计划顺序执行工具，容忍单步失败
//!
//! 步骤严格顺序执行（后续步骤可能依赖前面的副作用）；每一步必产出恰好一条结果，
//! 失败不会中断剩余步骤。工具自报的用量与成本并入运行总计。

use std::sync::Arc;

use crate::core::state::{AgentState, Phase, StateUpdate, TokenUsage};
use crate::core::AgentError;
use crate::tools::ToolRegistry;
use crate::workflow::types::ExecutionResult;

/// 工具名动词前缀；剥掉后得到注册表里的裸节点 id
const TOOL_VERB_PREFIXES: &[&str] = &["generate_image_", "analyze_text_", "llm_process_", "chat_"];

/// "chat_c1" -> "c1"；没有已知前缀时原样返回
pub fn strip_verb_prefix(tool_name: &str) -> &str {
    for prefix in TOOL_VERB_PREFIXES {
        if let Some(rest) = tool_name.strip_prefix(prefix) {
            return rest;
        }
    }
    tool_name
}

/// Executor Agent：持有本次运行的工具注册表
pub struct ExecutorAgent {
    registry: Arc<ToolRegistry>,
}

impl ExecutorAgent {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// execute(state) -> 部分更新：本批结果（latest_results 覆盖、execution_history 追加）、
    /// current_step = Executed。空计划合法，产出空批次。
    pub async fn execute(&self, state: &AgentState) -> Result<StateUpdate, AgentError> {
        let steps = state
            .plan
            .as_ref()
            .map(|p| p.steps.clone())
            .unwrap_or_default();

        let mut results = Vec::with_capacity(steps.len());
        let mut token_usage = TokenUsage::default();
        let mut model_costs = 0.0;

        for step in steps {
            let tool_id = strip_verb_prefix(&step.tool_name);
            let Some(tool) = self.registry.get(tool_id) else {
                tracing::warn!(tool_name = %step.tool_name, "tool not found in registry");
                results.push(ExecutionResult::failed(step, "Tool not found"));
                continue;
            };

            match tool.execute(step.parameters.clone()).await {
                Ok(output) => {
                    if let Some(usage) = output.usage {
                        token_usage.add(TokenUsage {
                            input: usage.input_tokens,
                            output: usage.output_tokens,
                        });
                        model_costs += output.cost;
                    }
                    results.push(ExecutionResult::success(step, output.value));
                }
                Err(error) => {
                    tracing::warn!(tool_name = %step.tool_name, %error, "tool execution failed");
                    results.push(ExecutionResult::failed(step, error));
                }
            }
        }

        tracing::info!(
            workflow_id = %state.workflow_id,
            total = results.len(),
            failed = results.iter().filter(|r| r.is_failed()).count(),
            "executor finished batch"
        );

        Ok(StateUpdate {
            execution_history: results.clone(),
            latest_results: Some(results),
            current_step: Some(Phase::Executed),
            token_usage,
            model_costs,
            ..Default::default()
        })
    }
}
