//! Streaming response body relay.
//!
//! [`RelayBody`] wraps a backend response body on its way to the caller.
//! Frames pass through untouched; the wrapper only observes the stream so
//! that failures after the status line has been committed still end up in
//! the logs. Dropping it drops the backend body, which releases the
//! backend connection on every exit path.

use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use bytes::Bytes;
use hyper::body::{Body as HttpBody, Frame, SizeHint};

pub struct RelayBody {
    inner: Body,
    backend: String,
    request_id: String,
    relayed_bytes: u64,
    finished: bool,
}

impl RelayBody {
    #[must_use]
    pub fn new(inner: Body, backend: String, request_id: String) -> Self {
        Self {
            inner,
            backend,
            request_id,
            relayed_bytes: 0,
            finished: false,
        }
    }
}

impl HttpBody for RelayBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => {
                if let Some(data) = frame.data_ref() {
                    this.relayed_bytes += data.len() as u64;
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Poll::Ready(Some(Err(e))) => {
                this.finished = true;
                tracing::warn!(
                    request_id = %this.request_id,
                    backend = %this.backend,
                    relayed_bytes = this.relayed_bytes,
                    error = %e,
                    "response body relay failed"
                );
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.finished = true;
                tracing::debug!(
                    request_id = %this.request_id,
                    backend = %this.backend,
                    relayed_bytes = this.relayed_bytes,
                    "response body relayed"
                );
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for RelayBody {
    fn drop(&mut self) {
        if !self.finished && !self.inner.is_end_stream() {
            tracing::warn!(
                request_id = %self.request_id,
                backend = %self.backend,
                relayed_bytes = self.relayed_bytes,
                "caller went away before the response body completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;

    use http_body_util::BodyExt;

    use super::*;

    /// Backend body that yields the queued chunks in order, then ends.
    struct Scripted(VecDeque<Result<Bytes, io::Error>>);

    impl Scripted {
        fn body(chunks: impl IntoIterator<Item = Result<Bytes, io::Error>>) -> Body {
            Body::new(Self(chunks.into_iter().collect()))
        }
    }

    impl HttpBody for Scripted {
        type Data = Bytes;
        type Error = io::Error;

        fn poll_frame(
            mut self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
        ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
            Poll::Ready(self.0.pop_front().map(|chunk| chunk.map(Frame::data)))
        }
    }

    #[tokio::test]
    async fn passes_frames_through_unchanged() {
        let relay = RelayBody::new(Body::from("hello backend"), "http://b".into(), "r1".into());
        let collected = relay.collect().await.unwrap().to_bytes();
        assert_eq!(&collected[..], b"hello backend");
    }

    #[tokio::test]
    async fn tracks_relayed_bytes_and_completion() {
        let mut relay = RelayBody::new(Body::from("12345"), "http://b".into(), "r2".into());
        while let Some(frame) = relay.frame().await {
            frame.unwrap();
        }
        assert_eq!(relay.relayed_bytes, 5);
        assert!(relay.finished);
    }

    #[tokio::test]
    async fn surfaces_mid_stream_failure_once() {
        let inner = Scripted::body([
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "backend reset")),
        ]);
        let mut relay = RelayBody::new(inner, "http://b".into(), "r4".into());

        let first = relay.frame().await.unwrap().unwrap();
        assert_eq!(first.data_ref().map(|d| &d[..]), Some(&b"partial"[..]));
        assert!(!relay.finished);

        let err = relay.frame().await.unwrap().unwrap_err();
        assert!(err.to_string().contains("backend reset"), "{err}");
        assert_eq!(relay.relayed_bytes, 7);
        assert!(relay.finished);

        assert!(relay.frame().await.is_none());
    }

    #[tokio::test]
    async fn dropping_unfinished_relay_releases_backend_body() {
        let inner = Scripted::body([
            Ok(Bytes::from_static(b"first")),
            Ok(Bytes::from_static(b"never read")),
        ]);
        let mut relay = RelayBody::new(inner, "http://b".into(), "r5".into());

        relay.frame().await.unwrap().unwrap();
        assert_eq!(relay.relayed_bytes, 5);
        assert!(!relay.finished);
        assert!(!relay.is_end_stream());
        drop(relay);
    }

    #[test]
    fn size_hint_follows_inner_body() {
        let relay = RelayBody::new(Body::from("abc"), "http://b".into(), "r3".into());
        assert_eq!(relay.size_hint().exact(), Some(3));
    }
}
