//! Bundled hooks and transports

pub mod logstash;
pub mod network;
pub mod writer;

pub use logstash::{logstash_field_map, logstash_hook, with_logstash_defaults, LogstashFormatter};
pub use network::TcpWriter;
pub use writer::WriterHook;
