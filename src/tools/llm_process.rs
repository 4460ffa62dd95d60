//! llm 节点适配器
//!
//! 通用文本处理：节点声明里的 system_prompt 决定加工方式，入参 prompt 为待处理内容。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ModelPricing;
use crate::core::message::Message;
use crate::llm::LlmClient;
use crate::tools::registry::{string_arg, Tool, ToolOutput};
use crate::workflow::types::NodeDeclaration;

pub struct LlmProcessTool {
    name: String,
    system_prompt: String,
    llm: Arc<dyn LlmClient>,
    pricing: ModelPricing,
}

impl LlmProcessTool {
    pub fn new(node: &NodeDeclaration, llm: Arc<dyn LlmClient>, pricing: ModelPricing) -> Self {
        Self {
            name: format!("llm_process_{}", node.id),
            system_prompt: node
                .data
                .get("system_prompt")
                .and_then(|v| v.as_str())
                .unwrap_or("You are a helpful text processing assistant.")
                .to_string(),
            llm,
            pricing,
        }
    }
}

#[async_trait]
impl Tool for LlmProcessTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Process text with a language model. Args: {\"prompt\": \"...\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": { "type": "string", "description": "Text to process" }
            },
            "required": ["prompt"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, String> {
        let prompt = string_arg(&args, &["prompt", "input", "text"])
            .map(String::from)
            .unwrap_or_else(|| args.to_string());

        let messages = vec![
            Message::system(self.system_prompt.clone()),
            Message::user(prompt),
        ];
        let completion = self.llm.complete(&messages).await.map_err(|e| e.to_string())?;
        let mut output = ToolOutput::new(serde_json::json!({ "output": completion.text }));
        if let Some(usage) = completion.usage {
            output = output.with_usage(usage, self.pricing.cost(&usage));
        }
        Ok(output)
    }
}
