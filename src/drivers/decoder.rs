/// Null bytes show up as padding in serial reads and render as garbage.
pub const SENTINEL: char = '\0';
/// A single decoded sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bit {
    Low,
    High,
}
impl Bit {
    pub fn value(self) -> u8 {
        match self {
            Bit::Low => 0,
            Bit::High => 1,
        }
    }
    fn from_char(c: char) -> Option<Self> {
        match c.to_digit(10)? {
            0 => Some(Bit::Low),
            1 => Some(Bit::High),
            _ => None,
        }
    }
}
/// Text and bits recovered from one raw read.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodedChunk {
    pub text: String,
    pub bits: Vec<Bit>,
}
impl DecodedChunk {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.bits.is_empty()
    }
}
/// Stateless filter from raw serial bytes to bit events.
///
/// Every call is independent. Only single characters carry meaning, so a chunk
/// boundary can never split a token.
#[derive(Clone, Copy, Debug, Default)]
pub struct LineDecoder;
impl LineDecoder {
    pub fn strip_sentinels(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).replace(SENTINEL, "")
    }
    /// Yields the `0`/`1` characters of `text` in order, skipping everything else.
    pub fn decode_bits(text: &str) -> impl Iterator<Item = Bit> + '_ {
        text.chars().filter_map(Bit::from_char)
    }
    pub fn decode(bytes: &[u8]) -> DecodedChunk {
        let text = Self::strip_sentinels(bytes);
        let bits = Self::decode_bits(&text).collect();
        DecodedChunk { text, bits }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    fn values(bytes: &[u8]) -> Vec<u8> {
        LineDecoder::decode(bytes).bits.iter().map(|b| b.value()).collect()
    }
    #[test]
    fn strips_nulls_and_drops_other_digits() {
        assert_eq!(values(b"1\x000\x002\x001"), vec![1, 0, 1]);
        assert_eq!(LineDecoder::decode(b"1\x000\x002\x001").text, "1021");
    }
    #[test]
    fn empty_and_non_digit_input_yield_nothing() {
        assert!(values(b"").is_empty());
        assert!(values(b"abc \r\n-+.").is_empty());
        assert!(LineDecoder::decode(b"").is_empty());
    }
    #[test]
    fn keeps_arrival_order_around_noise() {
        assert_eq!(values(b"x1y1z0\n9\x0080 1"), vec![1, 1, 0, 0, 1]);
    }
    #[test]
    fn invalid_utf8_is_discarded_not_fatal() {
        let chunk = LineDecoder::decode(&[0xff, b'1', 0x00, 0xfe, b'0']);
        assert_eq!(chunk.bits, vec![Bit::High, Bit::Low]);
        assert!(!chunk.text.contains(SENTINEL));
    }
    #[test]
    fn chunks_are_independent() {
        let mut all = values(b"10");
        all.extend(values(b"\x001"));
        assert_eq!(all, values(b"10\x001"));
    }
}
