//! Delta Feed - Live Pixel Updates
//!
//! Holds one websocket connection to the canvas service at a time and applies
//! every `pixel` message to the [`CanvasState`] in arrival order.
//!
//! # Lifecycle
//!
//! ```text
//! connect ──> read ──> parse ──> apply_batch (blocks while a refresh holds the gate)
//!    ^          │
//!    └─ delay ──┘ on error or close
//! ```
//!
//! The socket has a read timeout so the loop can observe the stop signal
//! between messages. The reconnect delay waits on the same signal, so a stop
//! request never sits out a full delay.

use std::io;
use std::net::TcpStream;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use serde::Deserialize;
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use crate::canvas::{CanvasState, PixelDelta};

type Socket = WebSocket<MaybeTlsStream<TcpStream>>;

/// Feed connection settings.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    /// `ws://` or `wss://` endpoint
    pub url: String,
    pub reconnect_delay: Duration,
    /// Socket read timeout; bounds how long a stop request goes unnoticed
    pub poll_interval: Duration,
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum FeedMessage {
    Pixel {
        pixels: Vec<RawPixel>,
    },
    #[serde(other)]
    Other,
}

/// Coordinates as sent; validated before they reach the board.
#[derive(Debug, Deserialize)]
struct RawPixel {
    x: i64,
    y: i64,
    color: i64,
}

impl RawPixel {
    fn to_delta(&self) -> Option<PixelDelta> {
        Some(PixelDelta::new(
            u32::try_from(self.x).ok()?,
            u32::try_from(self.y).ok()?,
            u8::try_from(self.color).ok()?,
        ))
    }
}

/// Deltas carried by one feed message; empty for message types other than `pixel`.
///
/// Updates whose fields don't fit the board's coordinate or color range are
/// dropped here.
pub fn parse_message(text: &str) -> serde_json::Result<Vec<PixelDelta>> {
    let FeedMessage::Pixel { pixels } = serde_json::from_str(text)? else {
        return Ok(Vec::new());
    };
    Ok(pixels
        .iter()
        .filter_map(|raw| {
            let delta = raw.to_delta();
            if delta.is_none() {
                crate::log!("feed"; "ignoring pixel ({}, {}) with color {}", raw.x, raw.y, raw.color);
            }
            delta
        })
        .collect())
}

// ============================================================================
// Feed thread
// ============================================================================

/// Handle to a running feed thread.
pub struct FeedHandle {
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

impl FeedHandle {
    /// Signal the feed to close its connection and wait for the thread.
    pub fn stop(self) {
        let _ = self.stop.send(());
        if self.thread.join().is_err() {
            crate::log!("error"; "feed thread panicked");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// How a connection ended.
enum SessionEnd {
    Stopped,
    Closed,
}

pub struct DeltaFeed {
    options: FeedOptions,
    state: Arc<CanvasState>,
}

impl DeltaFeed {
    pub fn new(options: FeedOptions, state: Arc<CanvasState>) -> Self {
        Self { options, state }
    }

    /// Start the receive loop on its own thread.
    pub fn spawn(self) -> io::Result<FeedHandle> {
        let (stop, stopped) = channel::bounded(1);
        let thread = thread::Builder::new()
            .name("delta-feed".into())
            .spawn(move || self.run(&stopped))?;
        Ok(FeedHandle { stop, thread })
    }

    fn run(self, stopped: &Receiver<()>) {
        loop {
            match self.session(stopped) {
                Ok(SessionEnd::Stopped) => break,
                Ok(SessionEnd::Closed) => crate::log!("feed"; "connection closed, reconnecting"),
                Err(e) => crate::log!("feed"; "disconnected: {}, reconnecting", e),
            }
            match stopped.recv_timeout(self.options.reconnect_delay) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        crate::debug!("feed"; "stopped");
    }

    fn session(&self, stopped: &Receiver<()>) -> tungstenite::Result<SessionEnd> {
        let (mut socket, _) = tungstenite::connect(self.options.url.as_str())?;
        set_read_timeout(&socket, self.options.poll_interval)?;
        crate::log!("feed"; "connected to {}", self.options.url);

        loop {
            match stopped.try_recv() {
                Err(TryRecvError::Empty) => {}
                Ok(()) | Err(TryRecvError::Disconnected) => {
                    let _ = socket.close(None);
                    let _ = socket.flush();
                    return Ok(SessionEnd::Stopped);
                }
            }

            let message = match socket.read() {
                Ok(message) => message,
                Err(tungstenite::Error::Io(e)) if is_timeout(&e) => continue,
                Err(tungstenite::Error::ConnectionClosed) => return Ok(SessionEnd::Closed),
                Err(e) => return Err(e),
            };
            match message {
                Message::Text(text) => self.handle(text.as_str()),
                Message::Close(_) => return Ok(SessionEnd::Closed),
                _ => {}
            }
        }
    }

    fn handle(&self, text: &str) {
        match parse_message(text) {
            Ok(deltas) if deltas.is_empty() => {}
            Ok(deltas) => {
                let applied = self.state.apply_batch(&deltas);
                crate::debug!("feed"; "applied {}/{} pixel(s)", applied, deltas.len());
            }
            Err(e) => crate::log!("feed"; "unreadable message: {}", e),
        }
    }
}

fn set_read_timeout(socket: &Socket, timeout: Duration) -> io::Result<()> {
    match socket.get_ref() {
        MaybeTlsStream::Plain(stream) => stream.set_read_timeout(Some(timeout)),
        MaybeTlsStream::Rustls(stream) => stream.get_ref().set_read_timeout(Some(timeout)),
        _ => Ok(()),
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}
