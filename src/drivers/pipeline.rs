use crate::drivers::decoder::{DecodedChunk, LineDecoder};
use crate::drivers::error::ScopeError;
use crate::drivers::source::ByteSource;
use crate::drivers::Channel;
use log::trace;
/// Pulls raw reads from a source and turns them into decoded chunks for one channel.
pub struct ChannelPipeline<S: ByteSource> {
    channel: Channel,
    source: S,
    chunks_decoded: u64,
    bits_decoded: u64,
}
impl<S: ByteSource> ChannelPipeline<S> {
    pub fn new(channel: Channel, source: S) -> Self {
        Self {
            channel,
            source,
            chunks_decoded: 0,
            bits_decoded: 0,
        }
    }
    pub fn source_name(&self) -> &str {
        self.source.name()
    }
    /// Reads whatever is buffered and decodes it. Reads that are empty once the
    /// sentinels are gone are swallowed.
    pub fn pump_once(&mut self) -> Result<Option<DecodedChunk>, ScopeError> {
        let Some(bytes) = self.source.read_available()? else {
            return Ok(None);
        };
        let chunk = LineDecoder::decode(&bytes);
        if chunk.is_empty() {
            trace!("{}: {} bytes of padding only", self.channel, bytes.len());
            return Ok(None);
        }
        self.chunks_decoded += 1;
        self.bits_decoded += chunk.bits.len() as u64;
        Ok(Some(chunk))
    }
    /// `(chunks, bits)` decoded so far.
    pub fn totals(&self) -> (u64, u64) {
        (self.chunks_decoded, self.bits_decoded)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::source::ManualSource;
    use crate::drivers::{Bit, BitTraceBuffer};
    #[test]
    fn pipeline_decodes_into_trace() {
        let source = ManualSource::new(vec![b"1\x00".to_vec(), b"\x00\x00".to_vec(), b"0x1".to_vec()]);
        let mut pipeline = ChannelPipeline::new(Channel::One, source);
        let mut trace = BitTraceBuffer::zeroed(4);
        let first = pipeline.pump_once().unwrap().unwrap();
        assert_eq!(first.text, "1");
        assert_eq!(first.bits, vec![Bit::High]);
        // A read of pure padding decodes to nothing.
        assert!(pipeline.pump_once().unwrap().is_none());
        let third = pipeline.pump_once().unwrap().unwrap();
        assert_eq!(third.text, "0x1");
        for bit in first.bits.into_iter().chain(third.bits) {
            trace.append(bit);
        }
        assert_eq!(trace.snapshot(Channel::One).y, vec![1, 0, 0, 1]);
        assert_eq!(pipeline.totals(), (2, 3));
        assert!(pipeline.pump_once().unwrap().is_none());
    }
    #[test]
    fn read_errors_propagate() {
        let source = ManualSource::new(Vec::new()).failing_when_drained();
        let mut pipeline = ChannelPipeline::new(Channel::Two, Box::new(source) as Box<dyn ByteSource>);
        assert!(matches!(pipeline.pump_once(), Err(ScopeError::Io(_))));
        assert_eq!(pipeline.source_name(), "manual");
    }
}
