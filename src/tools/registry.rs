//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / description / parameters_schema / execute），
//! ToolRegistry::from_nodes 按节点 type 分发到对应适配器，以节点 id 为键存储；
//! 不认识的 type 静默跳过。工具不直接改 AgentState，只能在 ToolOutput 里上报自己的用量与成本。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::config::ModelPricing;
use crate::llm::{CompletionUsage, LlmClient};
use crate::tools::{ChatTool, ImageGeneratorTool, LlmProcessTool, TextAnalyzerTool};
use crate::workflow::types::NodeDeclaration;

/// 依序尝试多个键名取字符串参数（LLM 生成的参数键名不稳定）
pub(crate) fn string_arg<'a>(args: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| args.get(k).and_then(|v| v.as_str()))
}

/// 工具执行输出：结果值与该工具自己消耗的 token / 成本
#[derive(Debug)]
pub struct ToolOutput {
    pub value: Value,
    pub usage: Option<CompletionUsage>,
    pub cost: f64,
}

impl ToolOutput {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            usage: None,
            cost: 0.0,
        }
    }

    pub fn with_usage(mut self, usage: CompletionUsage, cost: f64) -> Self {
        self.usage = Some(usage);
        self.cost = cost;
        self
    }
}

/// 工具 trait：名称（含动词前缀）、描述（供 Planner 提示词）、参数 schema、异步执行
#[async_trait]
pub trait Tool: Send + Sync {
    /// 完整工具名，形如 "chat_<id>"
    fn name(&self) -> &str;

    /// 工具描述（供 LLM 理解功能）
    fn description(&self) -> &str;

    /// 参数 JSON Schema（仅用于对外说明，execute 内部不强制校验）
    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    /// 执行工具；错误以文本返回，由 Executor 记为失败步骤
    async fn execute(&self, args: Value) -> Result<ToolOutput, String>;
}

/// 工具快照（写入 AgentState.available_tools，供 Planner 提示词）
#[derive(Clone, Debug, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

/// 工具注册表：以节点 id 为键存储 Arc<dyn Tool>
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// 按节点声明构建注册表；同一输入产出相同结果，id 唯一性由调用方保证
    pub fn from_nodes(
        nodes: &[NodeDeclaration],
        llm: Arc<dyn LlmClient>,
        pricing: ModelPricing,
    ) -> Self {
        let mut tools: HashMap<String, Arc<dyn Tool>> = HashMap::new();
        for node in nodes {
            let tool: Arc<dyn Tool> = match node.node_type.as_str() {
                "chat" => Arc::new(ChatTool::new(node, llm.clone(), pricing)),
                "llm" => Arc::new(LlmProcessTool::new(node, llm.clone(), pricing)),
                "text_analyzer" => Arc::new(TextAnalyzerTool::new(node, llm.clone(), pricing)),
                "image_generator" => Arc::new(ImageGeneratorTool::new(node, llm.clone(), pricing)),
                other => {
                    tracing::debug!(node_id = %node.id, node_type = %other, "skipping unsupported node type");
                    continue;
                }
            };
            tools.insert(node.id.clone(), tool);
        }
        Self { tools }
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// 返回 (name, description) 快照，用于生成 prompt 中的 Available tools 段落
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut list: Vec<ToolDescriptor> = self
            .tools
            .values()
            .map(|tool| ToolDescriptor {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    fn node(id: &str, node_type: &str) -> NodeDeclaration {
        NodeDeclaration::new(id, node_type, serde_json::json!({}))
    }

    fn build(nodes: &[NodeDeclaration]) -> ToolRegistry {
        ToolRegistry::from_nodes(nodes, Arc::new(MockLlmClient), ModelPricing::default())
    }

    #[test]
    fn registry_size_counts_only_supported_types() {
        let nodes = vec![
            node("c1", "chat"),
            node("l1", "llm"),
            node("t1", "text_analyzer"),
            node("i1", "image_generator"),
            node("x1", "video_editor"),
            node("x2", "unknown"),
        ];
        let registry = build(&nodes);
        assert_eq!(registry.len(), 4);
        assert!(registry.get("x1").is_none());
    }

    #[test]
    fn tool_names_carry_verb_prefix_per_type() {
        let nodes = vec![
            node("c1", "chat"),
            node("l1", "llm"),
            node("t1", "text_analyzer"),
            node("i1", "image_generator"),
        ];
        let registry = build(&nodes);
        assert_eq!(registry.get("c1").unwrap().name(), "chat_c1");
        assert_eq!(registry.get("l1").unwrap().name(), "llm_process_l1");
        assert_eq!(registry.get("t1").unwrap().name(), "analyze_text_t1");
        assert_eq!(registry.get("i1").unwrap().name(), "generate_image_i1");
    }

    #[test]
    fn descriptors_are_sorted_and_complete() {
        let nodes = vec![node("b", "chat"), node("a", "chat")];
        let registry = build(&nodes);
        let descriptors = registry.descriptors();
        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[0].name, "chat_a");
        assert_eq!(descriptors[1].name, "chat_b");
    }
}
