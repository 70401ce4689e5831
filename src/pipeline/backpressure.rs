/// Every inter-operator channel in the pipeline shares one configured bound
/// (`pipeline.buffer_limit`); there is no per-channel strategy to select
/// between. A full channel simply blocks its producer until the consumer
/// drains it — this type exists only to keep that one number from being
/// threaded around as a bare `usize`.
#[derive(Debug, Clone, Copy)]
pub struct BackpressureHandler {
    buffer_limit: usize,
}

impl BackpressureHandler {
    pub fn new(buffer_limit: usize) -> Self {
        Self { buffer_limit }
    }

    /// The bound to use when creating every `mpsc` channel in the pipeline.
    pub fn channel_buffer_size(&self) -> usize {
        self.buffer_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_buffer_size_matches_configured_limit() {
        let handler = BackpressureHandler::new(64);
        assert_eq!(handler.channel_buffer_size(), 64);
    }
}
