use gamewire_frame::FrameConfig;

/// Behavior of a [`Connection`](crate::Connection).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Decoded packets buffered ahead of the application. Default: 1.
    pub inbound_capacity: usize,
    /// Packets queued for the send loop. Default: 1.
    pub outbound_capacity: usize,
    /// Skip frames with an unregistered id instead of closing.
    pub drop_unknown_packets: bool,
    /// Payload limit and socket timeouts for both directions.
    pub frame: FrameConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            inbound_capacity: 1,
            outbound_capacity: 1,
            drop_unknown_packets: false,
            frame: FrameConfig::default(),
        }
    }
}
