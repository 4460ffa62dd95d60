//! 工作流状态图
//!
//! START -> Planner -> Executor -> Coordinator -(Continue)-> Executor（回环，沿用原计划）
//!                                           \-(Finish)--> Summarizer -> END
//! 转移由纯函数 next_node 决定，封闭枚举可被穷尽检查；
//! invoke 以硬性 recursion_limit 计数每次节点访问，这是对抗恒定 continue 的唯一终止保证。

use std::sync::Arc;

use crate::agents::{CoordinatorAgent, ExecutorAgent, PlannerAgent, SummarizerAgent};
use crate::config::ModelPricing;
use crate::core::state::{AgentState, Phase};
use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::tools::ToolRegistry;

/// 状态图节点
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphNode {
    Planner,
    Executor,
    Coordinator,
    Summarizer,
}

/// 纯转移函数：(state, 刚执行完的节点) -> 下一个节点；None 表示 END
pub fn next_node(state: &AgentState, last: GraphNode) -> Option<GraphNode> {
    match last {
        GraphNode::Planner => Some(GraphNode::Executor),
        GraphNode::Executor => Some(GraphNode::Coordinator),
        // 回环重试沿用原计划，不回到 Planner（廉价重试策略，见 DESIGN.md）
        GraphNode::Coordinator => match state.current_step {
            Phase::Continue => Some(GraphNode::Executor),
            _ => Some(GraphNode::Summarizer),
        },
        GraphNode::Summarizer => None,
    }
}

/// 编译后的状态图：四个 Agent 与递归上限
pub struct WorkflowGraph {
    planner: PlannerAgent,
    executor: ExecutorAgent,
    coordinator: CoordinatorAgent,
    summarizer: SummarizerAgent,
    recursion_limit: usize,
}

impl WorkflowGraph {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        registry: Arc<ToolRegistry>,
        pricing: ModelPricing,
        recursion_limit: usize,
    ) -> Self {
        Self {
            planner: PlannerAgent::new(llm.clone(), pricing),
            executor: ExecutorAgent::new(registry),
            coordinator: CoordinatorAgent::new(llm.clone(), pricing),
            summarizer: SummarizerAgent::new(llm, pricing),
            recursion_limit,
        }
    }

    /// 从 Planner 跑到 END；每次节点访问计一次转移，超限即错（由上层兜底）
    pub async fn invoke(&self, mut state: AgentState) -> Result<AgentState, AgentError> {
        let mut node = GraphNode::Planner;
        let mut transitions = 0usize;

        loop {
            transitions += 1;
            if transitions > self.recursion_limit {
                tracing::warn!(
                    workflow_id = %state.workflow_id,
                    limit = self.recursion_limit,
                    "recursion limit exceeded"
                );
                return Err(AgentError::RecursionLimitExceeded(self.recursion_limit));
            }

            tracing::debug!(?node, transitions, "graph step");
            let update = match node {
                GraphNode::Planner => self.planner.plan(&state).await?,
                GraphNode::Executor => self.executor.execute(&state).await?,
                GraphNode::Coordinator => self.coordinator.coordinate(&state).await?,
                GraphNode::Summarizer => self.summarizer.summarize(&state).await?,
            };
            state.apply(update);

            match next_node(&state, node) {
                Some(next) => node = next,
                None => return Ok(state),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Message;
    use crate::llm::{Completion, LlmError, MockLlmClient};
    use crate::workflow::types::NodeDeclaration;
    use async_trait::async_trait;

    fn state(registry: &ToolRegistry) -> AgentState {
        AgentState::new(
            vec![Message::user("Hello")],
            "w",
            "s",
            "u",
            registry.descriptors(),
        )
    }

    fn chat_registry(llm: Arc<dyn LlmClient>) -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::from_nodes(
            &[NodeDeclaration::new("c1", "chat", serde_json::json!({}))],
            llm,
            ModelPricing::default(),
        ))
    }

    #[test]
    fn transition_function_routes_on_coordinator_decision() {
        let registry = chat_registry(Arc::new(MockLlmClient));
        let mut s = state(&registry);

        assert_eq!(next_node(&s, GraphNode::Planner), Some(GraphNode::Executor));
        assert_eq!(next_node(&s, GraphNode::Executor), Some(GraphNode::Coordinator));

        s.current_step = Phase::Continue;
        assert_eq!(next_node(&s, GraphNode::Coordinator), Some(GraphNode::Executor));

        s.current_step = Phase::Finish;
        assert_eq!(next_node(&s, GraphNode::Coordinator), Some(GraphNode::Summarizer));

        assert_eq!(next_node(&s, GraphNode::Summarizer), None);
    }

    #[tokio::test]
    async fn happy_path_terminates_in_completed_state() {
        // Mock 不产出 JSON 计划 -> 空计划 -> 无失败 -> 直接 Finish -> Summarizer
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient);
        let registry = chat_registry(llm.clone());
        let graph = WorkflowGraph::new(llm, registry.clone(), ModelPricing::default(), 10);

        let final_state = graph.invoke(state(&registry)).await.unwrap();
        assert_eq!(final_state.current_step, Phase::Completed);
        assert!(final_state.messages.len() >= 3);
    }

    /// 总是回答 continue 的模型：计划一个必然失败的步骤，驱动无限回环
    struct AlwaysContinueLlm;

    #[async_trait]
    impl LlmClient for AlwaysContinueLlm {
        async fn complete(&self, messages: &[Message]) -> Result<Completion, LlmError> {
            let system = &messages[0].content;
            if system.contains("workflow planner") {
                Ok(Completion::new(
                    r#"{"steps": [{"tool_name": "chat_missing", "parameters": {}}], "reasoning": "r"}"#,
                ))
            } else {
                Ok(Completion::new("continue"))
            }
        }
    }

    #[tokio::test]
    async fn adversarial_coordinator_hits_recursion_limit() {
        let llm: Arc<dyn LlmClient> = Arc::new(AlwaysContinueLlm);
        let registry = chat_registry(llm.clone());
        let graph = WorkflowGraph::new(llm, registry.clone(), ModelPricing::default(), 10);

        let err = graph.invoke(state(&registry)).await.unwrap_err();
        assert!(matches!(err, AgentError::RecursionLimitExceeded(10)));
    }
}
