//! 顶层 WorkflowExecutor
//!
//! 构建注册表与初始状态、编译状态图并调用；任何图级错误（含递归超限）
//! 都在这一层被整体兜底到增强对话路径 —— execute() 的调用方永远拿到
//! 一个格式完好的结果，绝不会收到异常。可用性优先于保真。

use std::sync::Arc;

use crate::agents::EnhancedConversationalAgent;
use crate::config::AppConfig;
use crate::core::message::Message;
use crate::core::state::{AgentState, TokenUsage};
use crate::llm::{estimate_tokens, LlmClient};
use crate::tools::ToolRegistry;
use crate::workflow::graph::WorkflowGraph;
use crate::workflow::types::{
    ExecutionResult, ExecutionStep, NodeDeclaration, WorkflowExecutionResult,
};

pub struct WorkflowExecutor {
    llm: Arc<dyn LlmClient>,
    config: AppConfig,
}

impl WorkflowExecutor {
    pub fn new(llm: Arc<dyn LlmClient>, config: AppConfig) -> Self {
        Self { llm, config }
    }

    /// 顶层入口；签名即契约：不返回 Result
    pub async fn execute(
        &self,
        messages: Vec<Message>,
        workflow_id: &str,
        session_id: &str,
        user_id: &str,
        nodes: &[NodeDeclaration],
    ) -> WorkflowExecutionResult {
        let run_id = uuid::Uuid::new_v4();
        let pricing = self.config.llm.pricing;

        let registry = Arc::new(ToolRegistry::from_nodes(nodes, self.llm.clone(), pricing));
        tracing::info!(
            %run_id,
            workflow_id,
            session_id,
            user_id,
            tools = registry.len(),
            "starting workflow execution"
        );

        let mut state = AgentState::new(
            messages.clone(),
            workflow_id,
            session_id,
            user_id,
            registry.descriptors(),
        );
        state.conversation.max_turns = self.config.workflow.max_conversation_turns;

        let graph = WorkflowGraph::new(
            self.llm.clone(),
            registry,
            pricing,
            self.config.workflow.recursion_limit,
        );

        match graph.invoke(state).await {
            Ok(final_state) => {
                let response = final_state
                    .messages
                    .last()
                    .map(|m| m.content.clone())
                    .unwrap_or_default();

                // 旁路观测：结构化视图尽力而为，失败只影响 structured_response 字段
                let enhanced = EnhancedConversationalAgent::new(self.llm.clone(), pricing);
                let (structured, _) = enhanced.generate_structured_response(&final_state).await;

                tracing::info!(
                    %run_id,
                    tokens = final_state.token_usage.total(),
                    steps = final_state.execution_history.len(),
                    "workflow completed"
                );
                WorkflowExecutionResult {
                    response,
                    structured_response: Some(structured),
                    token_usage: final_state.token_usage,
                    model_costs: final_state.model_costs,
                    execution_history: final_state.execution_history,
                }
            }
            Err(e) => {
                tracing::warn!(%run_id, error = %e, "graph failed, falling back to conversational path");
                self.conversational_fallback(messages, workflow_id, session_id, user_id, &e.to_string())
                    .await
            }
        }
    }

    /// 整体兜底：零历史新状态 + 增强对话路径；用量为估算占位值
    async fn conversational_fallback(
        &self,
        messages: Vec<Message>,
        workflow_id: &str,
        session_id: &str,
        user_id: &str,
        reason: &str,
    ) -> WorkflowExecutionResult {
        let pricing = self.config.llm.pricing;
        let state = AgentState::new(messages, workflow_id, session_id, user_id, Vec::new());

        let enhanced = EnhancedConversationalAgent::new(self.llm.clone(), pricing);
        let (structured, update) = enhanced.generate_structured_response(&state).await;

        let token_usage = if update.token_usage.total() > 0 {
            update.token_usage
        } else {
            // 后端未上报或调用失败：按字符数估算占位
            let input: u64 = state
                .messages
                .iter()
                .map(|m| estimate_tokens(&m.content))
                .sum();
            TokenUsage {
                input,
                output: estimate_tokens(&structured.response),
            }
        };

        let fallback_record = ExecutionResult::success(
            ExecutionStep {
                tool_name: "conversational_fallback".to_string(),
                parameters: serde_json::json!({ "reason": reason }),
            },
            serde_json::json!({ "response": structured.response }),
        );

        WorkflowExecutionResult {
            response: structured.response.clone(),
            model_costs: update.model_costs,
            structured_response: Some(structured),
            token_usage,
            execution_history: vec![fallback_record],
        }
    }
}
