//! image_generator 节点适配器
//!
//! 实际渲染由外部图像服务完成，不在本引擎内；这里用 LLM 把入参扩写为
//! 详细的生成提示词，产出可直接投递给图像后端的请求文档。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::config::ModelPricing;
use crate::core::message::Message;
use crate::llm::LlmClient;
use crate::tools::registry::{string_arg, Tool, ToolOutput};
use crate::workflow::types::NodeDeclaration;

pub struct ImageGeneratorTool {
    name: String,
    model: String,
    llm: Arc<dyn LlmClient>,
    pricing: ModelPricing,
}

impl ImageGeneratorTool {
    pub fn new(node: &NodeDeclaration, llm: Arc<dyn LlmClient>, pricing: ModelPricing) -> Self {
        Self {
            name: format!("generate_image_{}", node.id),
            model: node
                .data
                .get("model")
                .and_then(|v| v.as_str())
                .unwrap_or("default")
                .to_string(),
            llm,
            pricing,
        }
    }
}

#[async_trait]
impl Tool for ImageGeneratorTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Generate an image from a text description. Args: {\"prompt\": \"...\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "prompt": { "type": "string", "description": "Image description" }
            },
            "required": ["prompt"]
        })
    }

    async fn execute(&self, args: Value) -> Result<ToolOutput, String> {
        let prompt = string_arg(&args, &["prompt", "description", "text"])
            .map(String::from)
            .unwrap_or_else(|| args.to_string());

        let messages = vec![
            Message::system(
                "Expand the user's request into a single detailed image generation prompt. \
                 Describe subject, style, composition and lighting. Reply with the prompt only."
                    .to_string(),
            ),
            Message::user(prompt.clone()),
        ];
        let completion = self.llm.complete(&messages).await.map_err(|e| e.to_string())?;
        let mut output = ToolOutput::new(serde_json::json!({
            "image_prompt": completion.text,
            "source_prompt": prompt,
            "model": self.model,
        }));
        if let Some(usage) = completion.usage {
            output = output.with_usage(usage, self.pricing.cost(&usage));
        }
        Ok(output)
    }
}
