#![forbid(unsafe_code)]

use super::framing::{TransportMode, detect_mode_from_first_line, read_content_length_frame};
use crate::server::McpServer;
use crate::{JsonRpcRequest, json_rpc_error};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};

/// Serves MCP over stdin/stdout until EOF. Framing is auto-detected once per
/// process so responses never interleave styles on the same transport.
pub(crate) fn run_stdio(server: &mut McpServer) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = std::io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut stdout = std::io::stdout().lock();

    let mut mode: Option<TransportMode> = None;

    loop {
        match mode {
            None => {
                let mut peek = String::new();
                let read = reader.read_line(&mut peek)?;
                if read == 0 {
                    break;
                }
                let Some(detected) = detect_mode_from_first_line(&peek) else {
                    continue;
                };
                mode = Some(detected);
                match detected {
                    TransportMode::NewlineJson => {
                        handle_request(server, &mut stdout, detected, peek.trim())?;
                    }
                    TransportMode::ContentLength => {
                        let Some(body) = read_content_length_frame(&mut reader, Some(peek))?
                        else {
                            break;
                        };
                        handle_request(
                            server,
                            &mut stdout,
                            detected,
                            String::from_utf8_lossy(&body).as_ref(),
                        )?;
                    }
                }
            }
            Some(TransportMode::NewlineJson) => {
                let mut line = String::new();
                let read = reader.read_line(&mut line)?;
                if read == 0 {
                    break;
                }
                let raw = line.trim();
                if raw.is_empty() {
                    continue;
                }
                handle_request(server, &mut stdout, TransportMode::NewlineJson, raw)?;
            }
            Some(TransportMode::ContentLength) => {
                let Some(body) = read_content_length_frame(&mut reader, None)? else {
                    break;
                };
                handle_request(
                    server,
                    &mut stdout,
                    TransportMode::ContentLength,
                    String::from_utf8_lossy(&body).as_ref(),
                )?;
            }
        }
    }

    Ok(())
}

fn handle_request(
    server: &mut McpServer,
    stdout: &mut std::io::StdoutLock<'_>,
    mode: TransportMode,
    raw: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let data: Value = match serde_json::from_str(raw) {
        Ok(v) => v,
        Err(e) => {
            let resp = json_rpc_error(None, -32700, &format!("Parse error: {e}"));
            return write_response(stdout, mode, &resp);
        }
    };

    let (id, has_method) = match data.as_object() {
        Some(obj) => (obj.get("id").cloned(), obj.contains_key("method")),
        None => {
            let resp = json_rpc_error(None, -32600, "Invalid Request");
            return write_response(stdout, mode, &resp);
        }
    };
    if !has_method {
        let resp = json_rpc_error(id, -32600, "Invalid Request");
        return write_response(stdout, mode, &resp);
    }

    let request: JsonRpcRequest = match serde_json::from_value(data) {
        Ok(v) => v,
        Err(e) => {
            let resp = json_rpc_error(id, -32600, &format!("Invalid Request: {e}"));
            return write_response(stdout, mode, &resp);
        }
    };

    // Notifications produce no response frame.
    if let Some(resp) = server.handle(request) {
        write_response(stdout, mode, &resp)?;
    }
    Ok(())
}

fn write_response(
    stdout: &mut std::io::StdoutLock<'_>,
    mode: TransportMode,
    resp: &Value,
) -> Result<(), Box<dyn std::error::Error>> {
    match mode {
        TransportMode::NewlineJson => {
            writeln!(stdout, "{}", serde_json::to_string(resp)?)?;
        }
        TransportMode::ContentLength => {
            let body = serde_json::to_vec(resp)?;
            write!(stdout, "Content-Length: {}\r\n\r\n", body.len())?;
            stdout.write_all(&body)?;
        }
    }
    stdout.flush()?;
    Ok(())
}
