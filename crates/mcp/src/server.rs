#![forbid(unsafe_code)]

use serde_json::{Value, json};
use ttaat_storage::SqliteStore;

pub(crate) struct McpServer {
    initialized: bool,
    store: SqliteStore,
}

impl McpServer {
    pub(crate) fn new(store: SqliteStore) -> Self {
        Self {
            initialized: false,
            store,
        }
    }

    pub(crate) fn handle(&mut self, request: crate::JsonRpcRequest) -> Option<Value> {
        let method = request.method.as_str();

        if method == "initialize" {
            // Some clients skip notifications/initialized; treat a completed
            // initialize as enough to unlock the tool surface.
            self.initialized = true;
            return Some(crate::json_rpc_response(
                request.id,
                json!({
                    "protocolVersion": crate::MCP_VERSION,
                    "serverInfo": { "name": crate::SERVER_NAME, "version": crate::SERVER_VERSION },
                    "capabilities": { "tools": {} }
                }),
            ));
        }

        if !self.initialized && method != "notifications/initialized" {
            return Some(crate::json_rpc_error(
                request.id,
                -32002,
                "Server not initialized",
            ));
        }

        if method == "notifications/initialized" {
            return None;
        }

        if method == "ping" {
            return Some(crate::json_rpc_response(request.id, json!({})));
        }

        // Some clients probe the optional resources surface by default; keep
        // it deterministic and empty.
        if method == "resources/list" {
            return Some(crate::json_rpc_response(
                request.id,
                json!({ "resources": [] }),
            ));
        }
        if method == "resources/read" {
            return Some(crate::json_rpc_response(
                request.id,
                json!({ "contents": [] }),
            ));
        }

        if method == "tools/list" {
            return Some(crate::json_rpc_response(
                request.id,
                json!({ "tools": crate::tools::tool_definitions() }),
            ));
        }

        if method == "tools/call" {
            let Some(params_obj) = request.params.as_ref().and_then(|v| v.as_object()) else {
                return Some(crate::json_rpc_error(
                    request.id,
                    -32602,
                    "params must be an object",
                ));
            };

            let tool_name = params_obj
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            let args = params_obj
                .get("arguments")
                .cloned()
                .unwrap_or_else(|| json!({}));
            let payload = crate::tools::dispatch(&mut self.store, tool_name, &args);

            let is_error = !payload
                .get("success")
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            return Some(crate::json_rpc_response(
                request.id,
                json!({
                    "content": [crate::tool_text_content(&payload)],
                    "isError": is_error
                }),
            ));
        }

        // Unknown notifications are dropped; unknown requests get an error.
        if request.id.is_none() {
            return None;
        }
        Some(crate::json_rpc_error(request.id, -32601, "Method not found"))
    }
}
