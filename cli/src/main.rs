//! bodyback 命令行

mod app;
mod command;

use std::process::ExitCode;

use bodyback_config::AppConfig;
use bodyback_errors::ApiError;
use clap::Parser;
use tracing::debug;

use crate::command::Cli;

/// 后端错误显示面向用户的提示，其余错误显示完整链路
fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ApiError>() {
        Some(api) => {
            debug!(error = %api, "Command failed");
            eprintln!("{}", api.user_message());
        }
        None => eprintln!("error: {err:#}"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env 不存在时忽略
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    bodyback_telemetry::init(
        &config.telemetry.log_level,
        config.telemetry.json || config.is_production(),
    );

    let result = match app::build_client(&config) {
        Ok(client) => app::run(cli.command, &client, &config).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}
