use wikirace::{ServerConfig, WikiraceError, WikiraceServer, logging};

#[tokio::main]
async fn main() -> Result<(), WikiraceError> {
    logging::init();

    let config = ServerConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        idle_timeout = ?config.idle_timeout,
        max_players_limit = config.room.max_players_limit,
        "starting wikirace server"
    );

    let server = WikiraceServer::builder().config(config).build().await?;
    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await
}
