use std::{io, process::Stdio};

use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    task::JoinHandle,
};
use tracing::trace;

use runvisor_model::OutputSink;

/// Writer that still needs the child's pipe once the process is spawned.
pub(crate) type PendingWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Split a sink into what `Command` takes and what has to be pumped later.
pub(crate) fn into_stdio(sink: OutputSink) -> (Stdio, Option<PendingWriter>) {
    match sink {
        OutputSink::Inherit => (Stdio::inherit(), None),
        OutputSink::Null => (Stdio::null(), None),
        OutputSink::File(file) => (Stdio::from(file), None),
        OutputSink::Writer(w) => (Stdio::piped(), Some(w)),
    }
}

/// Copy a child pipe into the caller's writer until EOF.
///
/// Bytes are forwarded as they arrive, the writer is flushed and shut down at the end.
pub(crate) fn spawn_pump<R>(
    stream: &'static str,
    mut reader: R,
    mut writer: PendingWriter,
) -> JoinHandle<io::Result<u64>>
where
    R: AsyncRead + Send + Unpin + 'static,
{
    tokio::spawn(async move {
        let copied = tokio::io::copy(&mut reader, &mut writer).await?;
        writer.shutdown().await?;
        trace!(stream, bytes = copied, "output stream drained");
        Ok(copied)
    })
}
