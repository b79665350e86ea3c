//! 命令执行

use std::sync::Arc;

use anyhow::{anyhow, bail, Context};
use bodyback_adapter_http::ReqwestTransport;
use bodyback_adapter_storage::FileStore;
use bodyback_client::BodybackClient;
use bodyback_common::Pagination;
use bodyback_config::AppConfig;
use bodyback_domain_core::{SessionVolume, SessionVolumeFilter};
use secrecy::ExposeSecret;
use tracing::info;

use crate::command::{join_words, Command};

/// 按配置组装真实传输层与文件存储
pub fn build_client(config: &AppConfig) -> anyhow::Result<BodybackClient> {
    let transport = ReqwestTransport::new(&config.api.base_url, config.api.timeout())
        .context("failed to create HTTP transport")?;
    let store = FileStore::new(config.storage.path.clone());

    info!(
        base_url = %config.api.base_url,
        storage = %config.storage.path.display(),
        "Client initialized"
    );
    Ok(BodybackClient::new(
        Arc::new(transport),
        Arc::new(store),
        config.api.base_url.clone(),
    ))
}

fn describe(volume: &SessionVolume, for_trainer: bool) -> String {
    let counterpart = if for_trainer {
        volume.customer.as_ref()
    } else {
        volume.trainer.as_ref()
    };
    let name = counterpart
        .map(|u| u.display_name())
        .unwrap_or_else(|| {
            if for_trainer {
                volume.customer_id.to_string()
            } else {
                volume.trainer_id.to_string()
            }
        });
    format!(
        "{}  {}  {:<9}  {:>3} sessions  {}",
        volume.id,
        volume.period,
        volume.status.as_str(),
        volume.session_count,
        name
    )
}

pub async fn run(command: Command, client: &BodybackClient, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let email = email
                .or_else(|| config.auth.email.clone())
                .ok_or_else(|| anyhow!("an email is required to log in"))?;
            let password = password
                .or_else(|| {
                    config
                        .auth
                        .password
                        .as_ref()
                        .map(|p| p.expose_secret().clone())
                })
                .ok_or_else(|| anyhow!("a password is required to log in"))?;

            let identity = client.auth().login(&email, &password).await?;
            println!(
                "Logged in as {} ({})",
                identity.display_name(),
                identity.role.as_deref().unwrap_or("no role")
            );
        }
        Command::Logout => {
            client.auth().logout().await?;
            println!("Logged out");
        }
        Command::WhoAmI => match client.auth().current_user().await? {
            Some(identity) => println!(
                "{} <{}> role={} id={}",
                identity.display_name(),
                identity.email,
                identity.role.as_deref().unwrap_or("-"),
                identity.user_id
            ),
            None => println!("Not logged in"),
        },
        Command::Volumes {
            status,
            page,
            page_size,
        } => {
            let Some(identity) = client.auth().current_user().await? else {
                bail!("not logged in");
            };
            let mut filter = if identity.is_trainer() {
                SessionVolumeFilter::for_trainer(identity.user_id)
            } else {
                SessionVolumeFilter::for_customer(identity.user_id)
            };
            if let Some(status) = status {
                filter = filter.with_status(status);
            }
            filter = filter.paginate(Pagination::from_page(page, page_size));

            let volumes = client.session_volumes().list(&filter).await?;
            if volumes.is_empty() {
                println!("No session volumes");
            }
            for volume in &volumes {
                println!("{}", describe(volume, identity.is_trainer()));
            }
        }
        Command::Approve { id, notes } => {
            let notes = join_words(&notes);
            let decision = client.session_volumes().approve(id, notes.as_deref()).await?;
            println!("{} (status: {})", decision.message, decision.new_status);
        }
        Command::Reject { id, notes } => {
            let notes = join_words(&notes).unwrap_or_default();
            let decision = client.session_volumes().reject(id, &notes).await?;
            println!("{} (status: {})", decision.message, decision.new_status);
        }
        Command::Stats => {
            let stats = client.trainers().my_stats().await?;
            println!(
                "customers: {} ({} active), sessions: {} total, {} this month",
                stats.total_customers,
                stats.active_customers,
                stats.total_sessions,
                stats.sessions_this_month
            );
        }
    }
    Ok(())
}
