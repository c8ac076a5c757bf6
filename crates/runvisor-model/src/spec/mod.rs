mod process;
pub use process::ProcessSpec;

mod sink;
pub use sink::OutputSink;
