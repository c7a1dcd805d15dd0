//! Plain TCP stand-in for the event source client.
//!
//! Connects a socket to the configured endpoint and treats the open
//! stream as the session: ready once connected, finished when the remote
//! side closes. Activation only records the hand-off.
//!
//! TODO: replace with the websocket protocol client (handshake,
//! subscription, remote invocation) once it lands.

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::config::binder::ComponentInstance;
use crate::config::settings::EventSourceSettings;
use crate::connection::{ConnectionError, ConnectionFactory, EventSourceConnection};

pub struct TcpConnectionFactory {
    settings: EventSourceSettings,
}

impl TcpConnectionFactory {
    pub fn new(settings: EventSourceSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl ConnectionFactory for TcpConnectionFactory {
    async fn open(&self) -> Result<Box<dyn EventSourceConnection>, ConnectionError> {
        let addr = format!("{}:{}", self.settings.host, self.settings.port);
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|e| ConnectionError::Unreachable(format!("{addr}: {e}")))?;
        tracing::debug!(addr = %addr, "Event source socket connected");
        Ok(Box::new(TcpConnection {
            stream: Some(stream),
        }))
    }
}

struct TcpConnection {
    stream: Option<TcpStream>,
}

#[async_trait]
impl EventSourceConnection for TcpConnection {
    fn is_ready(&self) -> bool {
        self.stream.is_some()
    }

    async fn activate(
        &mut self,
        components: Vec<ComponentInstance>,
    ) -> Result<(), ConnectionError> {
        for component in &components {
            tracing::info!(id = %component.id, class = %component.class_name, "Component activated");
        }
        Ok(())
    }

    async fn run(&mut self) -> Result<(), ConnectionError> {
        let Some(mut stream) = self.stream.take() else {
            return Err(ConnectionError::Lost("session already finished".to_string()));
        };

        // Drain until EOF; remote close ends the generation.
        let mut buf = [0u8; 4096];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) => return Ok(()),
                Ok(_) => {}
                Err(e) => return Err(ConnectionError::Lost(e.to_string())),
            }
        }
    }
}
