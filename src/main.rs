//! hive 演示入口
//!
//! 加载配置与 tracing，按配置构建 LLM（无 API Key 时自动退回 Mock），
//! 对命令行给出的单条消息跑一次完整工作流并打印结果。

use std::sync::Arc;

use anyhow::Result;

use hive::config::load_config;
use hive::core::Message;
use hive::llm::{LlmClient, MockLlmClient, OpenAiClient};
use hive::workflow::NodeDeclaration;
use hive::WorkflowExecutor;

#[tokio::main]
async fn main() -> Result<()> {
    hive::observability::init();

    let cfg = load_config(None)?;

    let llm: Arc<dyn LlmClient> = match cfg.llm.provider.as_str() {
        "mock" => Arc::new(MockLlmClient),
        _ => {
            let has_key = cfg.llm.api_key.is_some() || std::env::var("OPENAI_API_KEY").is_ok();
            if has_key {
                Arc::new(OpenAiClient::new(
                    cfg.llm.base_url.as_deref(),
                    &cfg.llm.model,
                    cfg.llm.api_key.as_deref(),
                ))
            } else {
                tracing::warn!("no API key configured, using mock LLM");
                Arc::new(MockLlmClient)
            }
        }
    };

    let input: String = {
        let args: Vec<String> = std::env::args().skip(1).collect();
        if args.is_empty() {
            "Hello".to_string()
        } else {
            args.join(" ")
        }
    };

    let nodes = vec![NodeDeclaration::new(
        "assistant",
        "chat",
        serde_json::json!({ "personality": "You are a concise, helpful assistant." }),
    )];

    let executor = WorkflowExecutor::new(llm, cfg);
    let result = executor
        .execute(vec![Message::user(input)], "cli", "local", "cli-user", &nodes)
        .await;

    println!("{}", result.response);
    println!(
        "---\ntokens: {} in / {} out, cost: ${:.6}, steps: {}",
        result.token_usage.input,
        result.token_usage.output,
        result.model_costs,
        result.execution_history.len()
    );
    Ok(())
}
