//! Stream codec for JSON values
//!
//! A [`Codec`] is bound to one duplex byte stream and moves exactly one JSON
//! value per `encode` / `decode` call. There is no framing header: values are
//! self-delimiting, so the decoder simply parses as far as the bytes it has
//! allow and reads more when the value is incomplete.
//!
//! # Reading
//!
//! Bytes read past the end of one value stay buffered for the next `decode`,
//! which makes the codec indifferent to how the peer's writes are split into
//! reads:
//!
//! - a value split across several reads is reassembled
//! - several values arriving in one read are returned one at a time
//! - whitespace and newlines between values are skipped
//!
//! # Writing
//!
//! Each encoded value is followed by a single `\n`, which keeps traffic
//! readable in socket traces and is accepted by every JSON stream parser.
//!
//! # Examples
//!
//! ```rust
//! use sockrpc_core::Codec;
//! use serde_json::{json, Value};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (left, right) = tokio::io::duplex(1024);
//! let mut client = Codec::new(left);
//! let mut server = Codec::new(right);
//!
//! client.encode(&json!({"method": "spdk_get_version"})).await.unwrap();
//! let received: Value = server.decode().await.unwrap();
//! assert_eq!(received["method"], "spdk_get_version");
//! # }
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Largest single value the decoder will buffer (100MB)
pub const MAX_MESSAGE_SIZE: usize = 100 * 1024 * 1024;

const READ_CHUNK: usize = 8 * 1024;

/// Failure of a single encode or decode
///
/// Codec errors carry no method context; the client attaches it when it
/// converts them into `sockrpc_core::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Serialization or the write to the stream failed
    #[error("{0}")]
    Encode(String),
    /// The stream ended, the bytes were not valid JSON, or the value did not
    /// have the expected shape
    #[error("{0}")]
    Decode(String),
}

/// Encoder/decoder pair bound to one stream
pub struct Codec<S> {
    stream: S,
    buffer: Vec<u8>,
}

impl<S> Codec<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Bind a codec to a stream
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: Vec::new(),
        }
    }

    /// Serialize one value onto the stream
    pub async fn encode<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), CodecError> {
        let mut bytes = serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string()))?;
        bytes.push(b'\n');

        self.stream
            .write_all(&bytes)
            .await
            .map_err(|e| CodecError::Encode(e.to_string()))?;
        self.stream
            .flush()
            .await
            .map_err(|e| CodecError::Encode(e.to_string()))?;

        tracing::trace!(bytes = bytes.len(), "Value encoded");
        Ok(())
    }

    /// Read exactly one value from the stream and deserialize it as `T`
    ///
    /// Waits until a complete value is available. A peer that closes the
    /// stream first, malformed JSON, and a value that does not fit `T` are
    /// all reported as `CodecError::Decode`.
    pub async fn decode<T: DeserializeOwned>(&mut self) -> Result<T, CodecError> {
        let value = self.decode_value().await?;
        serde_json::from_value(value).map_err(|e| CodecError::Decode(e.to_string()))
    }

    async fn decode_value(&mut self) -> Result<Value, CodecError> {
        loop {
            if let Some(value) = self.take_buffered()? {
                return Ok(value);
            }

            if self.buffer.len() > MAX_MESSAGE_SIZE {
                return Err(CodecError::Decode(format!(
                    "message exceeds maximum of {} bytes",
                    MAX_MESSAGE_SIZE
                )));
            }

            let mut chunk = [0u8; READ_CHUNK];
            let read = self
                .stream
                .read(&mut chunk)
                .await
                .map_err(|e| CodecError::Decode(e.to_string()))?;

            if read == 0 {
                return Err(CodecError::Decode(if self.buffer.is_empty() {
                    "connection closed by peer".to_string()
                } else {
                    "connection closed by peer mid-message".to_string()
                }));
            }

            self.buffer.extend_from_slice(&chunk[..read]);
        }
    }

    /// Pop the first complete value off the buffer, if there is one
    fn take_buffered(&mut self) -> Result<Option<Value>, CodecError> {
        let start = match self.buffer.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(start) => start,
            None => {
                self.buffer.clear();
                return Ok(None);
            }
        };

        let (next, offset) = {
            let mut values =
                serde_json::Deserializer::from_slice(&self.buffer[start..]).into_iter::<Value>();
            let next = values.next();
            (next, values.byte_offset())
        };

        match next {
            Some(Ok(value)) => {
                self.buffer.drain(..start + offset);
                Ok(Some(value))
            }
            Some(Err(e)) if e.is_eof() => Ok(None),
            Some(Err(e)) => Err(CodecError::Decode(e.to_string())),
            None => Ok(None),
        }
    }

    /// Shut down the write half of the stream
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        self.stream.shutdown().await
    }

    /// Borrow the underlying stream
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Release the underlying stream
    pub fn into_inner(self) -> S {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Params, Request, RequestId, Response};
    use serde_json::json;
    use tokio::io::duplex;

    #[tokio::test]
    async fn test_request_roundtrip_preserves_fields() {
        let (left, right) = duplex(4096);
        let mut client = Codec::new(left);
        let mut server = Codec::new(right);

        let params = Params::from_value(json!({"name": "Malloc0", "num_blocks": 32768})).unwrap();
        let request = Request::new("bdev_malloc_create", params, RequestId::new(3).unwrap());
        client.encode(&request).await.unwrap();

        let decoded: Request = server.decode().await.unwrap();
        assert_eq!(decoded, request);
    }

    #[tokio::test]
    async fn test_encode_appends_newline() {
        let (left, mut right) = duplex(4096);
        let mut client = Codec::new(left);

        client.encode(&json!([1, 2])).await.unwrap();
        drop(client);

        let mut raw = String::new();
        right.read_to_string(&mut raw).await.unwrap();
        assert_eq!(raw, "[1,2]\n");
    }

    #[tokio::test]
    async fn test_decode_split_across_writes() {
        let (left, mut right) = duplex(4096);
        let mut codec = Codec::new(left);

        let reader = tokio::spawn(async move { codec.decode::<Response>().await });

        right.write_all(br#"{"jsonrpc":"2.0","#).await.unwrap();
        tokio::task::yield_now().await;
        right.write_all(br#""result":[],"id":1}"#).await.unwrap();

        let response = reader.await.unwrap().unwrap();
        assert_eq!(response, Response::success(json!([]), Some(1)));
    }

    #[tokio::test]
    async fn test_decode_multiple_values_in_one_read() {
        let (left, mut right) = duplex(4096);
        let mut codec = Codec::new(left);

        right
            .write_all(b"{\"id\":1,\"result\":1}\n  {\"id\":2,\"result\":2}")
            .await
            .unwrap();

        let first: Response = codec.decode().await.unwrap();
        let second: Response = codec.decode().await.unwrap();
        assert_eq!(first.id(), Some(1));
        assert_eq!(second.id(), Some(2));
    }

    #[tokio::test]
    async fn test_decode_peer_closed() {
        let (left, right) = duplex(64);
        let mut codec = Codec::new(left);
        drop(right);

        let result = codec.decode::<Value>().await;
        assert_eq!(
            result.unwrap_err(),
            CodecError::Decode("connection closed by peer".to_string())
        );
    }

    #[tokio::test]
    async fn test_decode_peer_closed_mid_message() {
        let (left, mut right) = duplex(64);
        let mut codec = Codec::new(left);

        right.write_all(br#"{"jsonrpc":"2.0","#).await.unwrap();
        drop(right);

        let error = codec.decode::<Value>().await.unwrap_err();
        assert!(error.to_string().contains("mid-message"));
    }

    #[tokio::test]
    async fn test_decode_malformed_json() {
        let (left, mut right) = duplex(64);
        let mut codec = Codec::new(left);

        right.write_all(b"{\"id\": oops}").await.unwrap();

        let result = codec.decode::<Value>().await;
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[tokio::test]
    async fn test_decode_wrong_shape() {
        let (left, mut right) = duplex(64);
        let mut codec = Codec::new(left);

        right.write_all(br#"{"id":"not-a-number"}"#).await.unwrap();

        let result = codec.decode::<Response>().await;
        assert!(matches!(result, Err(CodecError::Decode(_))));
    }

    #[tokio::test]
    async fn test_encode_to_closed_peer_fails() {
        let (left, right) = duplex(64);
        let mut codec = Codec::new(left);
        drop(right);

        let result = codec.encode(&json!({"method": "x"})).await;
        assert!(matches!(result, Err(CodecError::Encode(_))));
    }
}
