//! Stream-to-Frame Bridge
//!
//! Turns a continuous inbound byte stream (a probe encoder posting MPEG-TS
//! over HTTP) into discrete broadcast frames. Reads happen in bounded chunks;
//! every non-empty chunk goes straight to the hub as one frame with no
//! reassembly or minimum size. The loop ends on end-of-stream or read error,
//! and a new bridge instance is created per inbound connection — there is no
//! reconnect here.

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::probe::ProbeHub;

/// Upper bound on a single frame read from the inbound stream.
pub const MAX_FRAME_BYTES: usize = 1024;

/// Pump `source` into `hub` until the stream ends.
///
/// Returns the number of frames forwarded. A short read is forwarded as-is;
/// data handed over before an error surfaces is never dropped.
pub async fn run<R>(mut source: R, hub: &ProbeHub) -> u64
where
    R: AsyncRead + Unpin,
{
    let mut buf = [0u8; MAX_FRAME_BYTES];
    let mut frames: u64 = 0;

    loop {
        match source.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                hub.broadcast(Bytes::copy_from_slice(&buf[..n]));
                frames += 1;
            }
            Err(e) => {
                tracing::debug!(channel = hub.channel(), error = %e, "probe stream read error");
                break;
            }
        }
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    #[tokio::test]
    async fn chunks_become_frames_in_order() {
        let hub = ProbeHub::spawn(1);
        let (tx, mut rx) = mpsc::channel(8);
        hub.register(Uuid::new_v4(), tx);

        let (mut writer, reader) = tokio::io::duplex(4096);
        let bridge_hub = hub.clone();
        let bridge = tokio::spawn(async move { run(reader, &bridge_hub).await });

        writer.write_all(b"first").await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"first"));

        writer.write_all(b"second").await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), Bytes::from_static(b"second"));

        drop(writer);
        assert_eq!(bridge.await.unwrap(), 2);
    }

    #[tokio::test]
    async fn empty_stream_forwards_nothing() {
        let hub = ProbeHub::spawn(1);
        let frames = run(&b""[..], &hub).await;
        assert_eq!(frames, 0);
    }

    #[tokio::test]
    async fn oversized_input_is_split_into_bounded_frames() {
        let hub = ProbeHub::spawn(1);
        let (tx, mut rx) = mpsc::channel(8);
        hub.register(Uuid::new_v4(), tx);

        let payload = vec![0xAB; MAX_FRAME_BYTES + 100];
        let frames = run(&payload[..], &hub).await;
        assert_eq!(frames, 2);

        assert_eq!(rx.recv().await.unwrap().len(), MAX_FRAME_BYTES);
        assert_eq!(rx.recv().await.unwrap().len(), 100);
    }

    #[tokio::test]
    async fn read_error_ends_the_bridge() {
        use std::io;
        use std::pin::Pin;
        use std::task::{Context, Poll};

        struct FailingReader;

        impl AsyncRead for FailingReader {
            fn poll_read(
                self: Pin<&mut Self>,
                _: &mut Context<'_>,
                _: &mut tokio::io::ReadBuf<'_>,
            ) -> Poll<io::Result<()>> {
                Poll::Ready(Err(io::Error::new(io::ErrorKind::ConnectionReset, "gone")))
            }
        }

        let hub = ProbeHub::spawn(1);
        let frames = run(FailingReader, &hub).await;
        assert_eq!(frames, 0);
    }
}
