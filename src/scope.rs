// src/scope.rs
use crate::drivers::{BitTraceBuffer, Channel, ScopeConfig, TraceFrame};
use crate::types::*;
use log::trace;
use std::collections::VecDeque;

const LOG_CAPACITY: usize = 8;

struct ChannelState {
    trace: BitTraceBuffer,
    terminal: String,
    status: ConnectionStatus,
    session: Option<SessionId>,
    port: Option<String>,
}

impl ChannelState {
    fn new(window_len: usize) -> Self {
        Self {
            trace: BitTraceBuffer::zeroed(window_len),
            terminal: String::new(),
            status: ConnectionStatus::NotConnected,
            session: None,
            port: None,
        }
    }
}

/// Everything the window shows, owned by the UI thread and fed by engine messages.
pub struct Scope {
    config: ScopeConfig,
    channels: [ChannelState; 2],
    ports: Vec<String>,
    log_messages: VecDeque<String>,
    active_terminal: Channel,
}

impl Scope {
    pub fn new(config: ScopeConfig) -> Self {
        let channels = Channel::ALL.map(|ch| ChannelState::new(config.channel(ch).window_len));
        Self {
            config,
            channels,
            ports: Vec::new(),
            log_messages: VecDeque::with_capacity(LOG_CAPACITY),
            active_terminal: Channel::One,
        }
    }

    pub fn apply(&mut self, msg: ScopeMessage) {
        match msg {
            ScopeMessage::Log(s) => self.log(s),
            ScopeMessage::Ports(ports) => self.ports = ports,
            ScopeMessage::Connected {
                channel,
                session,
                port,
            } => {
                let state = self.state_mut(channel);
                state.session = Some(session);
                state.status = ConnectionStatus::Connected;
                state.port = Some(port.clone());
                self.active_terminal = channel;
                self.log(format!("{channel} connected to {port}"));
            }
            ScopeMessage::ConnectFailed { channel, error } => {
                let state = self.state_mut(channel);
                state.session = None;
                state.port = None;
                state.status = ConnectionStatus::Failed(error.clone());
                self.log(format!("{channel}: {error}"));
            }
            ScopeMessage::Chunk {
                channel,
                session,
                chunk,
            } => {
                let capacity = self.config.terminal_capacity;
                let state = self.state_mut(channel);
                if state.session != Some(session) {
                    trace!("{channel}: dropping chunk from stale session {session}");
                    return;
                }
                push_terminal(&mut state.terminal, &chunk.text, capacity);
                for bit in chunk.bits {
                    state.trace.append(bit);
                }
            }
            ScopeMessage::Disconnected {
                channel,
                session,
                reason,
            } => {
                let state = self.state_mut(channel);
                if state.session != Some(session) {
                    return;
                }
                state.session = None;
                state.port = None;
                state.status = match reason {
                    Some(reason) => ConnectionStatus::Failed(reason),
                    None => ConnectionStatus::NotConnected,
                };
                let status = state.status.to_string();
                self.log(format!("{channel}: {status}"));
            }
        }
    }

    /// Narrows every channel's window by its configured step.
    pub fn zoom_in(&mut self) {
        for ch in Channel::ALL {
            let step = self.config.channel(ch).zoom_step;
            self.state_mut(ch).trace.zoom_in(step);
        }
    }

    /// Widens every channel's window by its configured step.
    pub fn zoom_out(&mut self) {
        let max_len = self.config.max_window_len;
        for ch in Channel::ALL {
            let step = self.config.channel(ch).zoom_step;
            self.state_mut(ch).trace.zoom_out(step, max_len);
        }
    }

    /// Back to the configured window lengths.
    pub fn reset_traces(&mut self) {
        for ch in Channel::ALL {
            let window_len = self.config.channel(ch).window_len;
            self.state_mut(ch).trace.clear_to(window_len);
        }
    }

    /// Local validation failure (e.g. a bad baud rate) shown in the channel's status.
    pub fn mark_failed(&mut self, channel: Channel, error: impl Into<String>) {
        let error = error.into();
        self.state_mut(channel).status = ConnectionStatus::Failed(error.clone());
        self.log(format!("{channel}: {error}"));
    }

    pub fn clear_terminal(&mut self, channel: Channel) {
        self.state_mut(channel).terminal.clear();
    }

    pub fn frame(&self, channel: Channel) -> TraceFrame {
        self.state(channel).trace.snapshot(channel)
    }

    pub fn frames(&self) -> Vec<TraceFrame> {
        Channel::ALL.iter().map(|&ch| self.frame(ch)).collect()
    }

    pub fn terminal(&self, channel: Channel) -> &str {
        &self.state(channel).terminal
    }

    pub fn status(&self, channel: Channel) -> &ConnectionStatus {
        &self.state(channel).status
    }

    /// Status text for the setup panel, naming the port while connected.
    pub fn status_line(&self, channel: Channel) -> String {
        let state = self.state(channel);
        match (&state.status, &state.port) {
            (ConnectionStatus::Connected, Some(port)) => format!("{} ({port})", state.status),
            (status, _) => status.to_string(),
        }
    }

    pub fn is_connected(&self, channel: Channel) -> bool {
        self.state(channel).status.is_connected()
    }

    pub fn any_connected(&self) -> bool {
        Channel::ALL.iter().any(|&ch| self.is_connected(ch))
    }

    pub fn ports(&self) -> &[String] {
        &self.ports
    }

    pub fn log_messages(&self) -> impl Iterator<Item = &String> {
        self.log_messages.iter()
    }

    pub fn active_terminal(&self) -> Channel {
        self.active_terminal
    }

    pub fn set_active_terminal(&mut self, channel: Channel) {
        self.active_terminal = channel;
    }

    fn log(&mut self, msg: String) {
        if self.log_messages.len() == LOG_CAPACITY {
            self.log_messages.pop_front();
        }
        self.log_messages.push_back(format!("> {}", msg));
    }

    fn state(&self, channel: Channel) -> &ChannelState {
        &self.channels[channel.index()]
    }

    fn state_mut(&mut self, channel: Channel) -> &mut ChannelState {
        &mut self.channels[channel.index()]
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new(ScopeConfig::default())
    }
}

/// Appends `text`, then trims the oldest text so at most `capacity` bytes remain.
fn push_terminal(terminal: &mut String, text: &str, capacity: usize) {
    terminal.push_str(text);
    if terminal.len() > capacity {
        let mut cut = terminal.len() - capacity;
        while !terminal.is_char_boundary(cut) {
            cut += 1;
        }
        terminal.drain(..cut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::{ChannelConfig, LineDecoder};

    fn small_config() -> ScopeConfig {
        ScopeConfig {
            channels: [
                ChannelConfig {
                    window_len: 8,
                    zoom_step: 4,
                },
                ChannelConfig {
                    window_len: 4,
                    zoom_step: 2,
                },
            ],
            max_window_len: 12,
            terminal_capacity: 16,
        }
    }

    fn chunk(channel: Channel, session: SessionId, bytes: &[u8]) -> ScopeMessage {
        ScopeMessage::Chunk {
            channel,
            session,
            chunk: LineDecoder::decode(bytes),
        }
    }

    fn connected(channel: Channel, session: SessionId) -> ScopeMessage {
        ScopeMessage::Connected {
            channel,
            session,
            port: "COM3".into(),
        }
    }

    #[test]
    fn chunks_update_only_their_channel() {
        let mut scope = Scope::new(small_config());
        scope.apply(connected(Channel::Two, 1));
        scope.apply(chunk(Channel::Two, 1, b"1\x000\x002\x001"));
        assert_eq!(scope.terminal(Channel::Two), "1021");
        assert_eq!(scope.frame(Channel::Two).y, vec![1, 0, 0, 1]);
        assert_eq!(scope.frame(Channel::One).y, vec![0; 8]);
        assert_eq!(scope.terminal(Channel::One), "");
        assert_eq!(scope.active_terminal(), Channel::Two);
        assert_eq!(scope.status_line(Channel::Two), "Connected (COM3)");
        assert_eq!(scope.status_line(Channel::One), "Not Connected");
    }

    #[test]
    fn stale_sessions_are_ignored() {
        let mut scope = Scope::new(small_config());
        scope.apply(connected(Channel::One, 1));
        scope.apply(ScopeMessage::Disconnected {
            channel: Channel::One,
            session: 1,
            reason: None,
        });
        scope.apply(chunk(Channel::One, 1, b"111"));
        assert_eq!(scope.frame(Channel::One).y, vec![0; 8]);
        assert_eq!(scope.status(Channel::One), &ConnectionStatus::NotConnected);

        scope.apply(connected(Channel::One, 2));
        scope.apply(chunk(Channel::One, 1, b"1"));
        // A late error from the old reader must not knock out the new session.
        scope.apply(ScopeMessage::Disconnected {
            channel: Channel::One,
            session: 1,
            reason: Some("gone".into()),
        });
        assert!(scope.is_connected(Channel::One));
        assert_eq!(scope.terminal(Channel::One), "");
        scope.apply(chunk(Channel::One, 2, b"1"));
        assert_eq!(scope.terminal(Channel::One), "1");
    }

    #[test]
    fn read_failure_shows_reason() {
        let mut scope = Scope::new(small_config());
        scope.apply(connected(Channel::One, 5));
        scope.apply(ScopeMessage::Disconnected {
            channel: Channel::One,
            session: 5,
            reason: Some("serial i/o failed: broken pipe".into()),
        });
        assert!(!scope.any_connected());
        assert_eq!(
            scope.status_line(Channel::One),
            "serial i/o failed: broken pipe"
        );
        assert_eq!(
            scope.status(Channel::One).to_string(),
            "serial i/o failed: broken pipe"
        );
    }

    #[test]
    fn connect_failure_sets_status_text() {
        let mut scope = Scope::new(small_config());
        scope.apply(ScopeMessage::ConnectFailed {
            channel: Channel::Two,
            error: "Port Already In Use".into(),
        });
        assert_eq!(scope.status(Channel::Two).to_string(), "Port Already In Use");
        assert!(scope.log_messages().any(|m| m.contains("Port Already In Use")));
    }

    #[test]
    fn zoom_uses_per_channel_steps_and_round_trips() {
        let mut scope = Scope::new(small_config());
        scope.apply(connected(Channel::One, 1));
        scope.apply(chunk(Channel::One, 1, b"1011"));
        let before = scope.frames();
        scope.zoom_out();
        assert_eq!(scope.frame(Channel::One).len(), 12);
        assert_eq!(scope.frame(Channel::Two).len(), 6);
        scope.zoom_in();
        assert_eq!(scope.frames(), before);
        scope.zoom_out();
        scope.zoom_out();
        // Channel 1 is already at the cap.
        assert_eq!(scope.frame(Channel::One).len(), 12);
        assert_eq!(scope.frame(Channel::Two).len(), 8);
        for _ in 0..10 {
            scope.zoom_in();
        }
        assert_eq!(scope.frame(Channel::One).len(), 2);
        assert_eq!(scope.frame(Channel::Two).len(), 2);
        scope.reset_traces();
        assert_eq!(scope.frame(Channel::One).len(), 8);
        assert_eq!(scope.frame(Channel::Two).len(), 4);
    }

    #[test]
    fn terminal_is_bounded_at_char_boundary() {
        let mut terminal = String::new();
        push_terminal(&mut terminal, "0123456789", 8);
        assert_eq!(terminal, "23456789");
        push_terminal(&mut terminal, "é1", 8);
        assert!(terminal.len() <= 8);
        assert!(terminal.ends_with("é1"));
    }

    #[test]
    fn log_keeps_latest_entries() {
        let mut scope = Scope::default();
        for i in 0..20 {
            scope.apply(ScopeMessage::Log(format!("line {i}")));
        }
        let lines: Vec<_> = scope.log_messages().cloned().collect();
        assert_eq!(lines.len(), LOG_CAPACITY);
        assert_eq!(lines.last().map(String::as_str), Some("> line 19"));
    }
}
