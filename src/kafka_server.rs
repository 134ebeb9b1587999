use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task;
use tracing::{debug, info, warn};

use crate::broker::Broker;
use crate::error::ServerError;
use crate::message::read_frame;

/// Accepts connections and feeds their request frames through a shared
/// [`Broker`]. Requests on one connection are answered in order.
pub struct KafkaServer {
    listener: TcpListener,
    broker: Arc<Broker>,
    max_message_size: usize,
}

impl KafkaServer {
    pub async fn bind(
        address: &str,
        broker: Arc<Broker>,
        max_message_size: usize,
    ) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(address).await?;
        info!(address = %listener.local_addr()?, "server bound");
        Ok(KafkaServer {
            listener,
            broker,
            max_message_size,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    pub async fn run(self) -> Result<(), std::io::Error> {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            info!(%peer, "client connected");

            let broker = Arc::clone(&self.broker);
            let max_message_size = self.max_message_size;
            task::spawn(async move {
                if let Err(e) = handle_client(stream, peer, broker, max_message_size).await {
                    warn!(%peer, error = %e, "client handling error");
                }
            });
        }
    }
}

async fn handle_client(
    mut stream: TcpStream,
    peer: SocketAddr,
    broker: Arc<Broker>,
    max_message_size: usize,
) -> Result<(), ServerError> {
    loop {
        let frame = match read_frame(&mut stream, max_message_size).await {
            Ok(frame) => frame,
            Err(ServerError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                info!(%peer, "client disconnected");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        // A rejected request gets no reply; the client times it out and the
        // connection stays usable for the next frame.
        match broker.process_request(&frame) {
            Ok(response) => {
                stream.write_all(&response).await?;
                debug!(%peer, bytes = response.len(), "response sent");
            }
            Err(e) => {
                warn!(%peer, error = %e, code = i16::from(e.error_code()), "request failed");
            }
        }
    }
}
