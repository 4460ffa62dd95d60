//! 工作流数据模型
//!
//! 执行计划 / 步骤 / 结果、节点声明、结构化回复与顶层执行结果。
//! ExecutionResult 用 status 标签枚举保证 result 与 error 在序列化时恰好出现一个。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::state::TokenUsage;

/// 调用方声明的工作流节点；type 为受支持集合之外时会被工厂静默跳过
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeDeclaration {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default)]
    pub data: Value,
}

impl NodeDeclaration {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            data,
        }
    }
}

/// 计划中的单个工具调用
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionStep {
    pub tool_name: String,
    #[serde(default = "empty_parameters")]
    pub parameters: Value,
}

fn empty_parameters() -> Value {
    Value::Object(serde_json::Map::new())
}

/// 有序执行计划与规划理由
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ExecutionPlan {
    #[serde(default)]
    pub steps: Vec<ExecutionStep>,
    #[serde(default)]
    pub reasoning: String,
}

/// 单步结果：成功携带 result，失败携带 error，二者互斥
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Success { result: Value },
    Failed { error: String },
}

/// 一步执行的完整记录
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub step: ExecutionStep,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

impl ExecutionResult {
    pub fn success(step: ExecutionStep, result: Value) -> Self {
        Self {
            step,
            outcome: StepOutcome::Success { result },
        }
    }

    pub fn failed(step: ExecutionStep, error: impl Into<String>) -> Self {
        Self {
            step,
            outcome: StepOutcome::Failed {
                error: error.into(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, StepOutcome::Failed { .. })
    }
}

/// 结构化回复的类别
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    Greeting,
    Question,
    Task,
    Conversation,
    Error,
}

impl ResponseType {
    /// 从模型给出的文本解析；不认识的值返回 None，由调用方回退到规则分类
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "greeting" => Some(ResponseType::Greeting),
            "question" => Some(ResponseType::Question),
            "task" => Some(ResponseType::Task),
            "conversation" => Some(ResponseType::Conversation),
            "error" => Some(ResponseType::Error),
            _ => None,
        }
    }
}

/// 结构化回复的元信息
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub response_type: ResponseType,
    pub requires_followup: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggested_actions: Vec<String>,
}

impl Default for ResponseMetadata {
    fn default() -> Self {
        Self {
            response_type: ResponseType::Conversation,
            requires_followup: false,
            suggested_actions: Vec::new(),
        }
    }
}

/// 模型自由文本经标签解析后的结构化回复
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StructuredAiResponse {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objectives: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub metadata: ResponseMetadata,
}

/// 顶层 execute() 的返回值；该层永不抛错
#[derive(Clone, Debug, Serialize)]
pub struct WorkflowExecutionResult {
    pub response: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_response: Option<StructuredAiResponse>,
    pub token_usage: TokenUsage,
    pub model_costs: f64,
    pub execution_history: Vec<ExecutionResult>,
}
