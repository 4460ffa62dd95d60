//! Hive - 多智能体工作流执行引擎
//!
//! 将一条用户请求转化为「规划 -> 执行 -> 协调 -> 总结」的工具调用序列，
//! 或走结构化对话路径直接回复；全程累计 token 与成本，顶层保证永不抛错。
//!
//! 模块划分：
//! - **agents**: Planner / Executor / Coordinator / Summarizer 与两条对话路径
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、消息、AgentState 与部分更新合并规则
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **observability**: tracing 初始化
//! - **tools**: 节点声明到工具的工厂与四种工具适配器
//! - **workflow**: 数据模型、状态图与顶层 WorkflowExecutor

pub mod agents;
pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod tools;
pub mod workflow;

pub use workflow::{WorkflowExecutionResult, WorkflowExecutor};
