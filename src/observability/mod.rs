//! 可观测性：tracing 订阅器初始化
//!
//! 默认 info 级别，可用 RUST_LOG 覆盖（如 RUST_LOG=hive=debug）。

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hive=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}
