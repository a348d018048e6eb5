//! Line framing between the client's byte stream and the MCP service
//!
//! Inbound lines are screened before they reach the service. A line that is
//! not UTF-8, not JSON, or not a client JSON-RPC message is answered here with
//! an error response and dropped, and the session carries on with the next
//! line.

use rmcp::model::{ClientJsonRpcMessage, ErrorCode, ErrorData};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// What to do with one inbound line
#[derive(Debug, Clone, PartialEq)]
pub enum Screened {
    /// Decodable message, passed to the service unchanged
    Forward(String),
    /// Encoded error response, written straight back to the client
    Reply(String),
    /// Blank line or undecodable notification
    Skip,
}

/// Classify one raw line (pure function)
pub fn screen_line(raw: &[u8]) -> Screened {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text.trim(),
        Err(e) => {
            return Screened::Reply(error_response(
                Value::Null,
                ErrorCode::PARSE_ERROR,
                format!("Parse error: line is not valid UTF-8 ({e})"),
            ));
        }
    };

    if text.is_empty() {
        return Screened::Skip;
    }

    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => {
            return Screened::Reply(error_response(
                Value::Null,
                ErrorCode::PARSE_ERROR,
                format!("Parse error: {e}"),
            ));
        }
    };

    if !value.is_object() {
        return Screened::Reply(error_response(
            Value::Null,
            ErrorCode::INVALID_REQUEST,
            "Invalid request: expected a JSON object".to_string(),
        ));
    }

    let id = value.get("id").cloned();
    match serde_json::from_value::<ClientJsonRpcMessage>(value) {
        Ok(_) => Screened::Forward(text.to_string()),
        Err(e) => match id {
            Some(id) => Screened::Reply(error_response(
                id,
                ErrorCode::INVALID_REQUEST,
                format!("Invalid request: {e}"),
            )),
            None => {
                debug!(error = %e, "Dropping undecodable notification");
                Screened::Skip
            }
        },
    }
}

fn error_response(id: Value, code: ErrorCode, message: String) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": ErrorData::new(code, message, None),
    })
    .to_string()
}

/// Read `reader` line by line until EOF, forwarding decodable messages to
/// `service` and error responses to `replies`
pub async fn screen_input<R, W>(
    reader: R,
    mut service: W,
    replies: mpsc::Sender<String>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        match screen_line(&buf) {
            Screened::Forward(mut line) => {
                line.push('\n');
                service.write_all(line.as_bytes()).await?;
                service.flush().await?;
            }
            Screened::Reply(response) => {
                warn!("Rejected malformed input line");
                if replies.send(response).await.is_err() {
                    break;
                }
            }
            Screened::Skip => {}
        }
    }

    debug!("Input closed");
    service.shutdown().await
}

/// Pass every line the service writes on to `replies`
pub async fn relay_lines<R>(service: R, replies: mpsc::Sender<String>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(service).lines();
    while let Some(line) = lines.next_line().await? {
        if replies.send(line).await.is_err() {
            break;
        }
    }
    Ok(())
}

/// Single writer for the client stream; one flushed line per message
pub async fn write_lines<W>(mut replies: mpsc::Receiver<String>, mut writer: W) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(mut line) = replies.recv().await {
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    Ok(())
}
