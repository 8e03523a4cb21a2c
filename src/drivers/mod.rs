// src/drivers/mod.rs
// 声明同级目录下的子模块文件
pub mod config;
pub mod decoder;
pub mod error;
pub mod pipeline;
pub mod plot;
pub mod port;
pub mod source;
pub mod trace;
// 公开导出这些模块里的结构体，方便外部调用
pub use config::{Channel, ChannelConfig, ScopeConfig};
pub use decoder::{Bit, DecodedChunk, LineDecoder};
pub use error::ScopeError;
pub use pipeline::ChannelPipeline;
pub use plot::{render_trace_png, PlotStyle};
pub use port::{available_ports, open_port, parse_baud, resolve_port, PortSettings};
pub use source::{ByteSource, ManualSource, SerialSource, SimulatedSource};
pub use trace::{BitTraceBuffer, TraceFrame};
