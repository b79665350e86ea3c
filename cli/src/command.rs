//! 命令行定义

use std::str::FromStr;

use bodyback_common::SessionVolumeId;
use bodyback_domain_core::SessionVolumeStatus;
use clap::{Parser, Subcommand};

/// bodyback - 健身课时量客户端
#[derive(Parser, Debug)]
#[command(name = "bodyback")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// 配置目录（default.toml 与 <APP_ENV>.toml 所在位置）
    #[arg(long, env = "BODYBACK_CONFIG_DIR", default_value = "config")]
    pub config_dir: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sign in (falls back to BODYBACK_AUTH__EMAIL / BODYBACK_AUTH__PASSWORD)
    Login {
        email: Option<String>,
        password: Option<String>,
    },

    /// End the session and clear local credentials
    Logout,

    /// Show the cached identity
    #[command(name = "whoami")]
    WhoAmI,

    /// List your session volumes, optionally by status
    #[command(alias = "ls")]
    Volumes {
        #[arg(value_parser = parse_status)]
        status: Option<SessionVolumeStatus>,

        /// Page number, starting at 1
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// Records per page
        #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..=1000))]
        page_size: u32,
    },

    /// Approve a submitted session volume
    Approve {
        #[arg(value_parser = parse_id)]
        id: SessionVolumeId,

        /// Optional comment, remaining words are joined
        #[arg(num_args = 0.., trailing_var_arg = true)]
        notes: Vec<String>,
    },

    /// Reject a session volume with a reason
    Reject {
        #[arg(value_parser = parse_id)]
        id: SessionVolumeId,

        /// Reason for the rejection, remaining words are joined
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        notes: Vec<String>,
    },

    /// Show trainer statistics
    Stats,
}

fn parse_id(raw: &str) -> Result<SessionVolumeId, String> {
    SessionVolumeId::from_string(raw).map_err(|_| format!("'{raw}' is not a session volume id"))
}

fn parse_status(raw: &str) -> Result<SessionVolumeStatus, String> {
    SessionVolumeStatus::from_str(raw).map_err(|e| e.detail().to_string())
}

/// 多个词拼接为一段文字，空白视为未提供
pub fn join_words(words: &[String]) -> Option<String> {
    let joined = words.join(" ");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
