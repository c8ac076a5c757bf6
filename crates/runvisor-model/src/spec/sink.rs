use std::{fmt, fs::File};

use tokio::io::AsyncWrite;

/// Destination for one output stream (stdout or stderr) of the child.
///
/// Output is forwarded as-is: nothing is buffered beyond what the sink itself does,
/// and nothing is parsed.
#[derive(Default)]
pub enum OutputSink {
    /// Share the stream of the supervising process.
    #[default]
    Inherit,
    /// Discard the stream.
    Null,
    /// Hand a file descriptor straight to the child.
    File(File),
    /// Copy the stream into an async writer owned by the caller.
    Writer(Box<dyn AsyncWrite + Send + Unpin>),
}

impl OutputSink {
    pub fn writer<W>(w: W) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::Writer(Box::new(w))
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            OutputSink::Inherit => "inherit",
            OutputSink::Null => "null",
            OutputSink::File(_) => "file",
            OutputSink::Writer(_) => "writer",
        }
    }
}

impl fmt::Debug for OutputSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputSink::File(file) => f.debug_tuple("File").field(file).finish(),
            other => f.write_str(other.kind()),
        }
    }
}
