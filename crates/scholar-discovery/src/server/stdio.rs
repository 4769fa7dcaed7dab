//! Stdio transport for MCP protocol.
//!
//! Handles JSON-RPC 2.0 over stdin/stdout, one message per line.

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::transport::{self, JsonRpcRequest, JsonRpcResponse};
use crate::tools::{McpTool, ToolContext};

/// Handle MCP protocol over stdio.
///
/// # Errors
///
/// Returns error on I/O failure.
pub async fn run_stdio(tools: Vec<Box<dyn McpTool>>, ctx: ToolContext) -> anyhow::Result<()> {
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut line = String::new();

    tracing::info!("MCP stdio server ready, waiting for requests");

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            tracing::info!("Stdin closed, shutting down");
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(req) => req,
            Err(e) => {
                let response =
                    JsonRpcResponse::error(None, transport::PARSE_ERROR, format!("Parse error: {e}"));
                write_response(&mut stdout, &response).await?;
                continue;
            }
        };

        tracing::debug!(method = %request.method, "Received request");

        // Notifications get no reply.
        if let Some(response) = transport::dispatch(&request, &tools, &ctx).await {
            write_response(&mut stdout, &response).await?;
        }
    }

    Ok(())
}

async fn write_response<W>(out: &mut W, response: &JsonRpcResponse) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = serde_json::to_string(response)?;
    out.write_all(json.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_response_is_line_delimited() {
        let mut out = Vec::new();
        let response = JsonRpcResponse::success(Some(serde_json::json!(1)), serde_json::json!({}));
        write_response(&mut out, &response).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.ends_with('\n'));
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("\"jsonrpc\":\"2.0\""));
    }
}
