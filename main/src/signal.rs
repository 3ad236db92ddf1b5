use trace::{error, info};

pub async fn block_waiting_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {}", e);
        return;
    }
    info!("received ctrl-c, shutting down");
}
