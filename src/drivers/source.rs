use std::collections::VecDeque;
use std::io::Read;
use std::time::{Duration, Instant};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serialport::SerialPort;
use crate::drivers::decoder::SENTINEL;
use crate::drivers::ScopeError;
/// Anything that can hand over the bytes received since the last call.
pub trait ByteSource: Send {
    /// `Ok(None)` means nothing is buffered right now.
    fn read_available(&mut self) -> Result<Option<Vec<u8>>, ScopeError>;
    fn name(&self) -> &str;
}
impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    fn read_available(&mut self) -> Result<Option<Vec<u8>>, ScopeError> {
        (**self).read_available()
    }
    fn name(&self) -> &str {
        (**self).name()
    }
}
/// Real serial port, drained of whatever the driver has buffered.
pub struct SerialSource {
    name: String,
    port: Box<dyn SerialPort>,
}
impl SerialSource {
    pub fn new(name: impl Into<String>, port: Box<dyn SerialPort>) -> Self {
        Self {
            name: name.into(),
            port,
        }
    }
}
impl ByteSource for SerialSource {
    fn read_available(&mut self) -> Result<Option<Vec<u8>>, ScopeError> {
        let pending = self.port.bytes_to_read()? as usize;
        if pending == 0 {
            return Ok(None);
        }
        let mut buf = vec![0u8; pending];
        let read = self.port.read(&mut buf)?;
        buf.truncate(read);
        Ok(Some(buf))
    }
    fn name(&self) -> &str {
        &self.name
    }
}
/// Generates a noisy bit stream so the scope can be tried without hardware.
pub struct SimulatedSource {
    name: String,
    rng: StdRng,
    interval: Duration,
    last_emit: Option<Instant>,
}
impl SimulatedSource {
    pub fn new(name: impl Into<String>, interval: Duration) -> Self {
        Self {
            name: name.into(),
            rng: StdRng::from_entropy(),
            interval,
            last_emit: None,
        }
    }
    fn next_chunk(&mut self) -> Vec<u8> {
        let len = self.rng.gen_range(1..=4);
        let mut chunk = Vec::with_capacity(len * 2);
        for _ in 0..len {
            chunk.push(if self.rng.gen_bool(0.5) { b'1' } else { b'0' });
            // Mimic the padding and line noise seen on real links.
            if self.rng.gen_bool(0.2) {
                chunk.push(SENTINEL as u8);
            }
            if self.rng.gen_bool(0.05) {
                chunk.push(b'\n');
            }
        }
        chunk
    }
}
impl ByteSource for SimulatedSource {
    fn read_available(&mut self) -> Result<Option<Vec<u8>>, ScopeError> {
        let now = Instant::now();
        if let Some(last) = self.last_emit {
            if now.duration_since(last) < self.interval {
                return Ok(None);
            }
        }
        self.last_emit = Some(now);
        Ok(Some(self.next_chunk()))
    }
    fn name(&self) -> &str {
        &self.name
    }
}
/// In-memory source useful for tests and deterministic playback.
pub struct ManualSource {
    name: String,
    queue: VecDeque<Vec<u8>>,
    fail_when_drained: bool,
}
impl ManualSource {
    pub fn new(chunks: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            name: "manual".to_owned(),
            queue: chunks.into_iter().collect(),
            fail_when_drained: false,
        }
    }
    /// Reports an i/o error once every chunk has been read, like an unplugged cable.
    pub fn failing_when_drained(mut self) -> Self {
        self.fail_when_drained = true;
        self
    }
}
impl ByteSource for ManualSource {
    fn read_available(&mut self) -> Result<Option<Vec<u8>>, ScopeError> {
        match self.queue.pop_front() {
            Some(chunk) => Ok(Some(chunk)),
            None if self.fail_when_drained => Err(ScopeError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "device disconnected",
            ))),
            None => Ok(None),
        }
    }
    fn name(&self) -> &str {
        &self.name
    }
}
