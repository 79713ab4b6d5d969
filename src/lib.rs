//! Multi-room WebSocket Chat Relay Library
//!
//! A WebSocket chat relay built with tokio-tungstenite using the Actor
//! pattern for state management.
//!
//! # Features
//! - Named rooms, created on first use
//! - Per-room message history (last 100 messages) replayed on join
//! - Presence: user list broadcast on every membership change
//! - Typing indicators that expire after 3 seconds without a refresh
//! - Room switching and disconnection handling
//! - Read-only HTTP health and room listing endpoints
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `ChatServer` is the central actor owning all session and room state
//! - Each connection has a `handler` task pair communicating with the server
//! - No locks needed - all state access goes through message passing
//!
//! # Example
//! ```ignore
//! use tokio::net::TcpListener;
//! use tokio::sync::mpsc;
//! use room_relay::{accept_connections, ChatServer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let listener = TcpListener::bind("127.0.0.1:5000").await.unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::channel(256);
//!
//!     tokio::spawn(ChatServer::new(cmd_rx).run());
//!     accept_connections(listener, cmd_tx).await;
//! }
//! ```

pub mod broadcaster;
pub mod chat;
pub mod config;
pub mod connection;
pub mod error;
pub mod handler;
pub mod http;
pub mod message;
pub mod room;
pub mod server;
pub mod session;
pub mod types;
pub mod typing;

// Re-export main types for convenience
pub use chat::{ChatMessage, MessageBody};
pub use config::Config;
pub use error::{AppError, JoinError, SendError, SessionError};
pub use handler::{accept_connections, handle_connection};
pub use http::ServerHandle;
pub use message::{ClientEvent, ErrorCode, ServerEvent};
pub use room::{Room, RoomRegistry, HISTORY_LIMIT};
pub use server::{ChatServer, ServerCommand};
pub use session::{ConnectionRegistry, User};
pub use types::{ClientId, MessageId, RoomName, DEFAULT_ROOM};
