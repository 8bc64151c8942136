//! Request line framing
//!
//! Accumulates bytes until the first LF, enforcing the request ceiling as
//! data arrives so an endless line is never buffered in full.

use memchr::memchr;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::constants::network::READ_CHUNK;

/// What the client sent before the line ended or the socket closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A request line without its CR/LF
    Line(Vec<u8>),
    /// More than the allowed number of bytes without a complete line
    TooLarge,
    /// EOF before any byte arrived
    Closed,
}

/// Strip one trailing CR left over from a CRLF terminator
fn trim_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Read one request line of at most `max` content bytes
///
/// A partial line followed by EOF is returned as a line. Bytes after the
/// first LF are ignored.
pub async fn read_request_line<R>(reader: &mut R, max: usize) -> std::io::Result<ReadOutcome>
where
    R: AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(READ_CHUNK.min(max + 2));
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(ReadOutcome::Closed);
            }
            let line = trim_cr(&buf);
            if line.len() > max {
                return Ok(ReadOutcome::TooLarge);
            }
            return Ok(ReadOutcome::Line(line.to_vec()));
        }

        let scanned = buf.len();
        buf.extend_from_slice(&chunk[..n]);

        if let Some(pos) = memchr(b'\n', &buf[scanned..]) {
            let line = trim_cr(&buf[..scanned + pos]);
            if line.len() > max {
                return Ok(ReadOutcome::TooLarge);
            }
            return Ok(ReadOutcome::Line(line.to_vec()));
        }

        // One extra byte may be the CR of a CRLF still in flight
        if buf.len() > max + 1 {
            return Ok(ReadOutcome::TooLarge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read(input: &[u8], max: usize) -> ReadOutcome {
        let mut reader = input;
        read_request_line(&mut reader, max).await.unwrap()
    }

    #[tokio::test]
    async fn test_crlf_line() {
        assert_eq!(read(b"/docs\r\n", 64).await, ReadOutcome::Line(b"/docs".to_vec()));
    }

    #[tokio::test]
    async fn test_bare_lf_line() {
        assert_eq!(read(b"/docs\n", 64).await, ReadOutcome::Line(b"/docs".to_vec()));
    }

    #[tokio::test]
    async fn test_empty_line() {
        assert_eq!(read(b"\r\n", 64).await, ReadOutcome::Line(Vec::new()));
    }

    #[tokio::test]
    async fn test_eof_without_data() {
        assert_eq!(read(b"", 64).await, ReadOutcome::Closed);
    }

    #[tokio::test]
    async fn test_partial_line_then_eof() {
        assert_eq!(read(b"/partial", 64).await, ReadOutcome::Line(b"/partial".to_vec()));
    }

    #[tokio::test]
    async fn test_trailing_bytes_ignored() {
        assert_eq!(
            read(b"/first\r\n/second\r\n", 64).await,
            ReadOutcome::Line(b"/first".to_vec())
        );
    }

    #[tokio::test]
    async fn test_exactly_max_accepted() {
        let mut input = vec![b'a'; 16];
        input.extend_from_slice(b"\r\n");
        assert_eq!(read(&input, 16).await, ReadOutcome::Line(vec![b'a'; 16]));
    }

    #[tokio::test]
    async fn test_over_max_rejected() {
        let mut input = vec![b'a'; 17];
        input.extend_from_slice(b"\r\n");
        assert_eq!(read(&input, 16).await, ReadOutcome::TooLarge);
    }

    #[tokio::test]
    async fn test_unterminated_flood_rejected() {
        let input = vec![b'a'; 4096];
        assert_eq!(read(&input, 1024).await, ReadOutcome::TooLarge);
    }

    #[tokio::test]
    async fn test_line_split_across_reads() {
        let (mut client, mut server) = tokio::io::duplex(64);
        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            client.write_all(b"/sp").await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            client.write_all(b"lit\r\n").await.unwrap();
            client
        });
        let outcome = read_request_line(&mut server, 64).await.unwrap();
        assert_eq!(outcome, ReadOutcome::Line(b"/split".to_vec()));
        drop(writer.await.unwrap());
    }
}
