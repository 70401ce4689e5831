pub mod backpressure;
pub mod channel;
pub mod classifier;
pub mod correlator;
pub mod failure_parse;
pub mod fanout;
pub mod merge;
pub mod parse_line;
pub mod runner;
pub mod sequencer;
pub mod suspect;
pub mod throughput;
pub mod types;

pub use backpressure::BackpressureHandler;
pub use channel::{create_channel, Receiver, Sender};
pub use runner::{run, RunError, Summary};
