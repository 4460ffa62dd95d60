//! chat 节点适配器
//!
//! 携带节点声明里的人设作为 system 提示词，把入参消息发给 LLM 并回传回复。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ModelPricing;
use crate::core::message::Message;
use crate::llm::LlmClient;
use crate::tools::registry::{string_arg, Tool, ToolOutput};
use crate::workflow::types::NodeDeclaration;

pub struct ChatTool {
    name: String,
    personality: Option<String>,
    llm: Arc<dyn LlmClient>,
    pricing: ModelPricing,
}

impl ChatTool {
    pub fn new(node: &NodeDeclaration, llm: Arc<dyn LlmClient>, pricing: ModelPricing) -> Self {
        Self {
            name: format!("chat_{}", node.id),
            personality: node
                .data
                .get("personality")
                .and_then(|v| v.as_str())
                .map(String::from),
            llm,
            pricing,
        }
    }
}

#[async_trait]
impl Tool for ChatTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Send a message to a conversational model and return its reply. Args: {\"message\": \"...\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "message": { "type": "string", "description": "Message to send" }
            },
            "required": ["message"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, String> {
        let message = string_arg(&args, &["message", "text", "input"])
            .map(String::from)
            .unwrap_or_else(|| args.to_string());

        let mut messages = Vec::new();
        if let Some(personality) = &self.personality {
            messages.push(Message::system(personality.clone()));
        }
        messages.push(Message::user(message));

        let completion = self.llm.complete(&messages).await.map_err(|e| e.to_string())?;
        let mut output = ToolOutput::new(serde_json::json!({ "response": completion.text }));
        if let Some(usage) = completion.usage {
            output = output.with_usage(usage, self.pricing.cost(&usage));
        }
        Ok(output)
    }
}
