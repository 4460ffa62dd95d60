//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `HIVE__*` 覆盖（双下划线表示嵌套，
//! 如 `HIVE__WORKFLOW__RECURSION_LIMIT=20`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::llm::CompletionUsage;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub workflow: WorkflowSection,
}

/// [app] 段
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：后端选择与计价
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 后端：openai / mock
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub pricing: ModelPricing,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            api_key: None,
            pricing: ModelPricing::default(),
        }
    }
}

/// [llm.pricing] 段：每千 token 单价（美元），用于 model_costs 累计
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct ModelPricing {
    pub input_per_1k: f64,
    pub output_per_1k: f64,
}

impl Default for ModelPricing {
    fn default() -> Self {
        Self {
            input_per_1k: 0.0005,
            output_per_1k: 0.0015,
        }
    }
}

impl ModelPricing {
    /// 按上报用量折算本次调用成本
    pub fn cost(&self, usage: &CompletionUsage) -> f64 {
        usage.input_tokens as f64 / 1000.0 * self.input_per_1k
            + usage.output_tokens as f64 / 1000.0 * self.output_per_1k
    }
}

/// [workflow] 段：递归上限与对话轮数上限
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WorkflowSection {
    /// 状态图转移次数硬上限，防止 Coordinator 无限 continue
    pub recursion_limit: usize,
    /// 简单对话路径的轮数上限
    pub max_conversation_turns: u32,
}

impl Default for WorkflowSection {
    fn default() -> Self {
        Self {
            recursion_limit: 10,
            max_conversation_turns: crate::core::state::DEFAULT_MAX_CONVERSATION_TURNS,
        }
    }
}

/// 从 config 目录加载配置，环境变量 HIVE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 HIVE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("HIVE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
