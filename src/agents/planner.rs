//! Planner：把最新用户请求与可用工具转为有序执行计划
//!
//! 一次模型调用，从自由文本回复中做括号配平的 JSON 提取；
//! 含 steps 字段则采用，否则降级为空计划（reasoning 保留原始文本），不视为错误。

use std::sync::Arc;

use serde::Deserialize;

use crate::config::ModelPricing;
use crate::core::message::{last_user_content, Message};
use crate::core::state::{AgentState, Phase, StateUpdate};
use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::workflow::types::{ExecutionPlan, ExecutionStep};

/// 括号配平的 JSON 对象提取：跳过字符串字面量与转义，返回首个配平的 {...} 片段
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' if in_string => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// 模型回复里期望的计划形态；steps 缺失时整体视为无效
#[derive(Debug, Deserialize)]
struct RawPlan {
    steps: Option<Vec<ExecutionStep>>,
    #[serde(default)]
    reasoning: Option<String>,
}

/// 从模型原始回复解析计划；任何解析问题都降级为空计划
fn parse_plan(raw: &str) -> ExecutionPlan {
    if let Some(json) = extract_json_object(raw) {
        if let Ok(parsed) = serde_json::from_str::<RawPlan>(json) {
            if let Some(steps) = parsed.steps {
                return ExecutionPlan {
                    steps,
                    reasoning: parsed.reasoning.unwrap_or_default(),
                };
            }
        }
    }
    ExecutionPlan {
        steps: Vec::new(),
        reasoning: raw.trim().to_string(),
    }
}

/// Planner Agent：持有 LLM 与计价
pub struct PlannerAgent {
    llm: Arc<dyn LlmClient>,
    pricing: ModelPricing,
}

impl PlannerAgent {
    pub fn new(llm: Arc<dyn LlmClient>, pricing: ModelPricing) -> Self {
        Self { llm, pricing }
    }

    fn system_prompt(state: &AgentState) -> String {
        let mut prompt = String::from(
            "You are a workflow planner. Given the user's request and the available tools, \
             produce an execution plan as a JSON object: \
             {\"steps\": [{\"tool_name\": \"...\", \"parameters\": {...}}], \"reasoning\": \"...\"}. \
             Use only the tools listed below. Reply with the JSON object only.\n\nAvailable tools:\n",
        );
        for tool in &state.available_tools {
            prompt.push_str(&format!("- {}: {}\n", tool.name, tool.description));
        }
        prompt
    }

    /// plan(state) -> 部分更新：计划、原始回复消息、current_step = Planned
    pub async fn plan(&self, state: &AgentState) -> Result<StateUpdate, AgentError> {
        let request = last_user_content(&state.messages);
        let messages = vec![
            Message::system(Self::system_prompt(state)),
            Message::user(format!("Plan execution for: {}", request)),
        ];

        let completion = self.llm.complete(&messages).await?;
        let (token_usage, model_costs) = super::usage_delta(&completion, self.pricing);

        let plan = parse_plan(&completion.text);
        tracing::info!(
            workflow_id = %state.workflow_id,
            steps = plan.steps.len(),
            "planner produced execution plan"
        );

        Ok(StateUpdate {
            // 原始回复进消息历史，便于审计
            messages: vec![Message::assistant(completion.text)],
            plan: Some(plan),
            current_step: Some(Phase::Planned),
            token_usage,
            model_costs,
            ..Default::default()
        })
    }
}
