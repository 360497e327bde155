use std::{
    net::{SocketAddr, UdpSocket},
    time::{Duration, SystemTime},
};

use anyhow::Result;
use blanks_core::ClientEvent;
use log::{debug, warn};
use renet::{
    transport::{ClientAuthentication, NetcodeClientTransport},
    ConnectionConfig, DefaultChannel, RenetClient,
};

/// Text messages over a renet netcode connection: each inbound message is one
/// JSON batch, each outbound message one intent.
pub struct Connection {
    client: RenetClient,
    transport: NetcodeClientTransport,
}

impl Connection {
    pub fn open(server_addr: SocketAddr, protocol_id: u64) -> Result<Self> {
        let client = RenetClient::new(ConnectionConfig::default());
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        let current_time = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH)?;
        let authentication = ClientAuthentication::Unsecure {
            server_addr,
            client_id: current_time.as_millis() as u64,
            user_data: None,
            protocol_id,
        };
        let transport = NetcodeClientTransport::new(current_time, authentication, socket)?;
        Ok(Connection { client, transport })
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_connected()
    }

    pub fn is_disconnected(&self) -> bool {
        self.client.is_disconnected()
    }

    /// Advances the connection and returns the batches that arrived.
    pub fn update(&mut self, duration: Duration) -> Result<Vec<String>> {
        self.client.update(duration);
        self.transport.update(duration, &mut self.client)?;

        let mut batches = vec![];
        while let Some(message) = self.client.receive_message(DefaultChannel::ReliableOrdered) {
            match String::from_utf8(message.into()) {
                Ok(text) => batches.push(text),
                Err(e) => warn!("dropping non-UTF-8 message: {e}"),
            }
        }
        Ok(batches)
    }

    pub fn send(&mut self, event: &ClientEvent) -> Result<()> {
        let text = event.to_json()?;
        debug!("sending {text}");
        self.client
            .send_message(DefaultChannel::ReliableOrdered, text.into_bytes());
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.transport.send_packets(&mut self.client)?;
        Ok(())
    }

    pub fn disconnect(&mut self) {
        self.transport.disconnect();
    }
}
