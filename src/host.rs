//! Framed stdio transport for a running native-messaging host.
//!
//! The wire format is a 4-byte native-endian length prefix followed by that
//! many bytes of UTF-8 JSON. The host reads frames from stdin and writes
//! replies to stdout; everything else, logging included, must stay off
//! stdout or the stream is corrupted.

use serde::Serialize;
use std::io::{self, Read, Write};

/// Host to browser frame cap. Chrome rejects larger messages.
pub const MAX_TO_BROWSER: usize = 1_048_576;
/// Browser to host frame cap, per Chrome's documented limit.
pub const MAX_FROM_BROWSER: usize = 64 * 1_048_576;

/// Encode a serializable value into one native-messaging frame.
pub fn encode_message<T: Serialize>(msg: &T) -> io::Result<Vec<u8>> {
    let body = serde_json::to_vec(msg)?;
    if body.len() > MAX_TO_BROWSER {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("outgoing message is {} bytes, cap is {MAX_TO_BROWSER}", body.len()),
        ));
    }
    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_ne_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Encode `msg` and write the frame to `writer`.
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, msg: &T) -> io::Result<()> {
    let frame = encode_message(msg)?;
    writer.write_all(&frame)?;
    writer.flush()
}

/// Read one frame body from `reader`, capped at `max_size` bytes.
///
/// EOF before the length prefix means the browser disconnected, which is a
/// normal shutdown for a host; it surfaces as `UnexpectedEof`.
pub fn decode_message<R: Read>(reader: &mut R, max_size: usize) -> io::Result<String> {
    let mut prefix = [0u8; 4];
    reader.read_exact(&mut prefix)?;
    let len = u32::from_ne_bytes(prefix) as usize;
    let cap = max_size.min(MAX_FROM_BROWSER);
    if len > cap {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("incoming message is {len} bytes, cap is {cap}"),
        ));
    }
    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    String::from_utf8(body).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// Read one frame from `reader` with the default browser-to-host cap.
pub fn read_message<R: Read>(reader: &mut R) -> io::Result<String> {
    decode_message(reader, MAX_FROM_BROWSER)
}

/// Read one message from stdin without blocking the async runtime.
#[cfg(feature = "tokio")]
pub async fn get_message() -> io::Result<String> {
    tokio::task::spawn_blocking(|| read_message(&mut io::stdin()))
        .await
        .expect("stdin reader task panicked")
}

/// Write one message to stdout without blocking the async runtime.
#[cfg(feature = "tokio")]
pub async fn send_message<T: Serialize>(msg: &T) -> io::Result<()> {
    let frame = encode_message(msg)?;
    tokio::task::spawn_blocking(move || {
        let mut stdout = io::stdout();
        stdout.write_all(&frame)?;
        stdout.flush()
    })
    .await
    .expect("stdout writer task panicked")
}

/// Run `handler` for every incoming message until the browser disconnects.
///
/// Disconnect (EOF on stdin) ends the loop with `Ok(())`; handler errors and
/// other read errors propagate.
#[cfg(feature = "tokio")]
pub async fn event_loop<F, Fut>(mut handler: F) -> io::Result<()>
where
    F: FnMut(String) -> Fut,
    Fut: std::future::Future<Output = io::Result<()>>,
{
    loop {
        let msg = match get_message().await {
            Ok(msg) => msg,
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => return Ok(()),
            Err(err) => return Err(err),
        };
        handler(msg).await?;
    }
}
