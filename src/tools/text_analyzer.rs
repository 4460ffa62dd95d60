//! text_analyzer 节点适配器
//!
//! 对入参文本做情感 / 主题 / 要点分析，分析维度可由节点 data.analysis_type 指定。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ModelPricing;
use crate::core::message::Message;
use crate::llm::LlmClient;
use crate::tools::registry::{string_arg, Tool, ToolOutput};
use crate::workflow::types::NodeDeclaration;

pub struct TextAnalyzerTool {
    name: String,
    analysis_type: String,
    llm: Arc<dyn LlmClient>,
    pricing: ModelPricing,
}

impl TextAnalyzerTool {
    pub fn new(node: &NodeDeclaration, llm: Arc<dyn LlmClient>, pricing: ModelPricing) -> Self {
        Self {
            name: format!("analyze_text_{}", node.id),
            analysis_type: node
                .data
                .get("analysis_type")
                .and_then(|v| v.as_str())
                .unwrap_or("general")
                .to_string(),
            llm,
            pricing,
        }
    }
}

#[async_trait]
impl Tool for TextAnalyzerTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Analyze text for sentiment, topics and key points. Args: {\"text\": \"...\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "text": { "type": "string", "description": "Text to analyze" }
            },
            "required": ["text"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, String> {
        let text = string_arg(&args, &["text", "input", "content"])
            .map(String::from)
            .unwrap_or_else(|| args.to_string());

        let messages = vec![
            Message::system(format!(
                "You are a text analysis engine. Perform a {} analysis of the user's text \
                 and report sentiment, main topics and key points concisely.",
                self.analysis_type
            )),
            Message::user(text),
        ];
        let completion = self.llm.complete(&messages).await.map_err(|e| e.to_string())?;
        let mut output = ToolOutput::new(serde_json::json!({
            "analysis": completion.text,
            "analysis_type": self.analysis_type,
        }));
        if let Some(usage) = completion.usage {
            output = output.with_usage(usage, self.pricing.cost(&usage));
        }
        Ok(output)
    }
}
