//! 工作流层：数据模型、状态图与顶层执行器

pub mod executor;
pub mod graph;
pub mod types;

pub use executor::WorkflowExecutor;
pub use graph::{next_node, GraphNode, WorkflowGraph};
pub use types::{
    ExecutionPlan, ExecutionResult, ExecutionStep, NodeDeclaration, ResponseMetadata,
    ResponseType, StepOutcome, StructuredAiResponse, WorkflowExecutionResult,
};
