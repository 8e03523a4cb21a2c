use std::fmt;
/// One of the two traces shown by the scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    One,
    Two,
}
impl Channel {
    pub const ALL: [Channel; 2] = [Channel::One, Channel::Two];
    /// Position in `Channel::ALL`, used to key per-channel arrays.
    pub fn index(self) -> usize {
        match self {
            Channel::One => 0,
            Channel::Two => 1,
        }
    }
    pub fn label(self) -> &'static str {
        match self {
            Channel::One => "Channel 1",
            Channel::Two => "Channel 2",
        }
    }
}
impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Number of points in the initial window.
    pub window_len: usize,
    /// Points added by one zoom-out and removed by one zoom-in.
    pub zoom_step: usize,
}
#[derive(Clone, Debug)]
pub struct ScopeConfig {
    pub channels: [ChannelConfig; 2],
    /// Upper bound for a window widened by zooming out.
    pub max_window_len: usize,
    /// Bytes of terminal text kept per channel.
    pub terminal_capacity: usize,
}
impl ScopeConfig {
    pub fn channel(&self, channel: Channel) -> ChannelConfig {
        self.channels[channel.index()]
    }
}
impl Default for ScopeConfig {
    fn default() -> Self {
        // The zoom steps differ per channel on purpose; keep them here rather than
        // in the buffer code.
        Self {
            channels: [
                ChannelConfig {
                    window_len: 40,
                    zoom_step: 4,
                },
                ChannelConfig {
                    window_len: 20,
                    zoom_step: 2,
                },
            ],
            max_window_len: 4096,
            terminal_capacity: 64 * 1024,
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn channel_indexes_match_all_order() {
        for (i, ch) in Channel::ALL.iter().enumerate() {
            assert_eq!(ch.index(), i);
        }
        assert_eq!(Channel::Two.to_string(), "Channel 2");
    }
    #[test]
    fn default_config_keeps_asymmetric_zoom() {
        let config = ScopeConfig::default();
        assert_eq!(config.channel(Channel::One).window_len, 40);
        assert_eq!(config.channel(Channel::One).zoom_step, 4);
        assert_eq!(config.channel(Channel::Two).window_len, 20);
        assert_eq!(config.channel(Channel::Two).zoom_step, 2);
    }
}
