//! Session Loop
//!
//! TCP acceptor and per-connection line loop. Every connection gets the
//! protocol greeting, then lines are fed one at a time through the shared
//! [`Daemon`]; whatever it produces is written back and flushed before the
//! next line is read.

use crate::daemon::Daemon;
use crate::protocol;
use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Accept connections forever, one task per client.
pub async fn serve(daemon: Arc<Daemon>, listener: TcpListener) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        info!("🔌 Client connected: {}", peer);
        let daemon = daemon.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(daemon, stream).await {
                warn!("client {} error: {}", peer, e);
            }
            info!("client disconnected: {}", peer);
        });
    }
}

async fn handle_client(daemon: Arc<Daemon>, stream: TcpStream) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    writer.write_all(protocol::greeting().as_bytes()).await?;
    writer.flush().await?;

    let mut line = String::new();
    loop {
        line.clear();
        let read = reader.read_line(&mut line).await?;
        if read == 0 {
            // EOF, client hung up
            return Ok(());
        }
        debug!("<- {}", line.trim_end());
        if let Some(response) = daemon.handle_line(&line).await {
            writer.write_all(response.as_bytes()).await?;
            writer.flush().await?;
        }
    }
}
