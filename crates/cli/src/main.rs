//! # Qibla Compass CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 配置加载与验证
//! - 导航引擎编排与生命周期管理
//! - 单次查询 (prayer status / qibla)

mod cli;
mod commands;
mod error;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_navigator, run_qibla, run_status, run_validate};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    observability::init_logging(cli.log_format.into(), cli.log_level())?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Qibla Compass CLI starting"
    );

    // Execute command
    let result = match &cli.command {
        Commands::Run(args) => run_navigator(args).await,
        Commands::Status(args) => run_status(args).await,
        Commands::Qibla(args) => run_qibla(args),
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}
