// src/types.rs
use std::fmt;
use crate::drivers::{Channel, DecodedChunk, PortSettings};

/// Identifies one connect of one channel; chunks from older sessions are stale.
pub type SessionId = u64;

// 连接模式
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum ConnectionMode {
    Simulation,
    Hardware,
}

// 端口状态 (面板上的状态文字)
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    NotConnected,
    Connected,
    Failed(String),
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::NotConnected => f.write_str("Not Connected"),
            ConnectionStatus::Connected => f.write_str("Connected"),
            ConnectionStatus::Failed(reason) => f.write_str(reason),
        }
    }
}

// GUI 发给后台的命令
#[derive(Clone, Debug)]
pub enum GuiCommand {
    Connect {
        channel: Channel,
        mode: ConnectionMode,
        settings: PortSettings,
    },
    Disconnect(Channel),
    RefreshPorts,
}

// 后台发给 GUI 的消息
#[derive(Clone, Debug)]
pub enum ScopeMessage {
    Log(String),
    Ports(Vec<String>),
    Connected {
        channel: Channel,
        session: SessionId,
        port: String,
    },
    ConnectFailed {
        channel: Channel,
        error: String,
    },
    Chunk {
        channel: Channel,
        session: SessionId,
        chunk: DecodedChunk,
    },
    Disconnected {
        channel: Channel,
        session: SessionId,
        /// `None` when the user asked for it.
        reason: Option<String>,
    },
}
