//! WebSocket client for the Usb2Snes bridge.

use futures::{Sink, SinkExt, Stream, StreamExt};
use std::io::ErrorKind;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, error::ProtocolError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use super::protocol::{Opcode, Reply, Request};
use crate::input::{InputSnapshot, MemoryRegion};
use crate::{Error, Result};

/// WebSocket stream returned by [`Client::connect`].
pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Message stream the client can run over.
pub trait Transport:
    Stream<Item = std::result::Result<Message, tungstenite::Error>>
    + Sink<Message, Error = tungstenite::Error>
    + Unpin
    + Send
{
}

impl<T> Transport for T where
    T: Stream<Item = std::result::Result<Message, tungstenite::Error>>
        + Sink<Message, Error = tungstenite::Error>
        + Unpin
        + Send
{
}

/// Device information from an Info request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub version: String,
    pub dev_type: String,
    pub game: String,
    pub flags: Vec<String>,
}

impl DeviceInfo {
    /// Parses `[version, type, game, flags...]`.
    pub fn from_results(results: Vec<String>) -> Result<Self> {
        if results.len() < 3 {
            return Err(Error::InvalidInfo(results));
        }
        let mut fields = results.into_iter();
        let version = fields.next().unwrap_or_default();
        let dev_type = fields.next().unwrap_or_default();
        let game = fields.next().unwrap_or_default();
        Ok(Self {
            version,
            dev_type,
            game,
            flags: fields.collect(),
        })
    }
}

/// Usb2Snes client over a single connection.
pub struct Client<S = WsStream> {
    stream: S,
}

impl Client<WsStream> {
    /// Opens the WebSocket connection.
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, response) = connect_async(url).await.map_err(|source| Error::Connect {
            url: url.to_string(),
            source,
        })?;
        info!("Connected to {} (HTTP {})", url, response.status());
        Ok(Self::new(stream))
    }
}

impl<S: Transport> Client<S> {
    /// Wraps an established stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Sends one request without waiting for a reply.
    async fn send(&mut self, request: &Request) -> Result<()> {
        let json = serde_json::to_string(request)?;
        debug!("Sending: {}", json);
        self.stream
            .send(Message::text(json))
            .await
            .map_err(transport_error)
    }

    /// Returns the next text or binary message.
    async fn next_message(&mut self) -> Result<Message> {
        loop {
            match self.stream.next().await {
                None => return Err(Error::ConnectionClosed),
                Some(Err(e)) => return Err(transport_error(e)),
                Some(Ok(Message::Close(frame))) => {
                    debug!("Bridge closed the connection: {:?}", frame);
                    return Err(Error::ConnectionClosed);
                }
                Some(Ok(message @ (Message::Text(_) | Message::Binary(_)))) => return Ok(message),
                // Ping, pong and raw frames
                Some(Ok(_)) => continue,
            }
        }
    }

    /// Sends a request and returns the first reply message as is.
    async fn exchange(&mut self, request: &Request) -> Result<Message> {
        debug_assert!(request.opcode.has_reply());
        self.send(request).await?;
        self.next_message().await
    }

    /// Sends a request and parses its JSON reply.
    async fn call(&mut self, request: &Request) -> Result<Reply> {
        match self.exchange(request).await? {
            Message::Text(text) => {
                debug!("Received: {}", text);
                Ok(serde_json::from_str(&text)?)
            }
            _ => Err(Error::UnexpectedReply {
                opcode: request.opcode,
                frame: "binary",
            }),
        }
    }

    /// Returns every device the bridge reports.
    pub async fn devices(&mut self) -> Result<Vec<String>> {
        Ok(self.call(&Request::device_list()).await?.results)
    }

    /// Returns the first device the bridge reports.
    pub async fn list_devices(&mut self) -> Result<String> {
        self.devices()
            .await?
            .into_iter()
            .next()
            .ok_or(Error::NoDevice)
    }

    /// Attaches to a device. The bridge does not reply.
    pub async fn attach(&mut self, device: &str) -> Result<()> {
        self.send(&Request::attach(device)).await
    }

    /// Attaches to the first listed device and returns its id.
    pub async fn attach_first(&mut self) -> Result<String> {
        let device = self.list_devices().await?;
        self.attach(&device).await?;
        info!("Attached to {}", device);
        Ok(device)
    }

    /// Announces the client name. The bridge does not reply.
    pub async fn set_name(&mut self, name: &str) -> Result<()> {
        self.send(&Request::name(name)).await
    }

    /// Queries the attached device.
    pub async fn info(&mut self) -> Result<DeviceInfo> {
        let reply = self.call(&Request::info()).await?;
        DeviceInfo::from_results(reply.results)
    }

    /// Reads `region.length` bytes at `region.address`.
    ///
    /// The bridge may split the payload over several binary frames.
    pub async fn read_memory(&mut self, region: MemoryRegion) -> Result<Vec<u8>> {
        if region.length == 0 {
            return Ok(Vec::new());
        }

        let mut data = Vec::with_capacity(region.length);
        let mut message = self.exchange(&Request::get_address(region)).await?;
        loop {
            match message {
                Message::Binary(chunk) => data.extend_from_slice(&chunk),
                _ => {
                    return Err(Error::UnexpectedReply {
                        opcode: Opcode::GetAddress,
                        frame: "text",
                    })
                }
            }
            if data.len() >= region.length {
                break;
            }
            message = self.next_message().await?;
        }

        if data.len() != region.length {
            return Err(Error::ReadLength {
                expected: region.length,
                actual: data.len(),
            });
        }
        Ok(data)
    }

    /// Reads and decodes the controller input word.
    pub async fn read_inputs(&mut self, region: MemoryRegion) -> Result<InputSnapshot> {
        let data = self.read_memory(region).await?;
        InputSnapshot::try_from(data.as_slice())
    }

    /// Closes the connection.
    pub async fn close(&mut self) -> Result<()> {
        match self.stream.close().await.map_err(transport_error) {
            Err(Error::ConnectionClosed) | Ok(()) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

/// Folds the ways a dropped connection shows up into `ConnectionClosed`.
fn transport_error(error: tungstenite::Error) -> Error {
    match error {
        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
            Error::ConnectionClosed
        }
        tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
            Error::ConnectionClosed
        }
        tungstenite::Error::Io(ref e)
            if matches!(
                e.kind(),
                ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted | ErrorKind::BrokenPipe
            ) =>
        {
            Error::ConnectionClosed
        }
        other => Error::WebSocket(other),
    }
}
