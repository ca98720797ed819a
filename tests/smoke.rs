//! End-to-end smoke tests for the server binary.
//!
//! Each test spawns the real `toolbox-mcp` executable and drives it over
//! its stdio transport: write one request line, block on exactly one
//! response line. The child is terminated gracefully (stdin closed, wait)
//! and killed if it does not exit within the timeout.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{Duration, Instant};

use serde_json::{json, Value};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Client side of the line-delimited JSON-RPC transport.
struct McpClient {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    next_id: i64,
}

impl McpClient {
    /// Spawns the server binary with piped stdio.
    fn spawn() -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_toolbox-mcp"))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("failed to spawn toolbox-mcp");

        let stdin = child.stdin.take().expect("child stdin");
        let stdout = BufReader::new(child.stdout.take().expect("child stdout"));

        // Give the server a moment to come up before the first write.
        std::thread::sleep(Duration::from_millis(100));

        Self {
            child,
            stdin: Some(stdin),
            stdout,
            next_id: 0,
        }
    }

    /// Writes one JSON value as a line and flushes.
    fn send(&mut self, value: &Value) {
        let stdin = self.stdin.as_mut().expect("stdin already closed");
        let line = serde_json::to_string(value).expect("serialise request");
        writeln!(stdin, "{line}").expect("write request");
        stdin.flush().expect("flush request");
    }

    /// Blocks reading exactly one response line.
    fn read_line(&mut self) -> Value {
        let mut line = String::new();
        let n = self.stdout.read_line(&mut line).expect("read response");
        assert!(n > 0, "server closed stdout before responding");
        serde_json::from_str(&line).expect("response is not valid JSON")
    }

    /// Sends a request and reads its response, asserting the id matches.
    fn request(&mut self, method: &str, params: Value) -> Value {
        self.next_id += 1;
        let id = self.next_id;
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }));

        let response = self.read_line();
        assert_eq!(response["jsonrpc"], "2.0");
        assert_eq!(response["id"], id, "response out of order");
        response
    }

    /// Sends a notification; no response is read.
    fn notify(&mut self, method: &str) {
        self.send(&json!({
            "jsonrpc": "2.0",
            "method": method,
        }));
    }

    /// Performs the initialize / initialized handshake.
    fn handshake(&mut self) -> Value {
        let response = self.request(
            "initialize",
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {"tools": {}},
                "clientInfo": {"name": "smoke-test", "version": "1.0.0"}
            }),
        );
        self.notify("notifications/initialized");
        response
    }

    /// Calls a tool and returns the full response.
    fn call_tool(&mut self, name: &str, arguments: Value) -> Value {
        self.request(
            "tools/call",
            json!({"name": name, "arguments": arguments}),
        )
    }

    /// Closes stdin and waits for the child; kills it after the timeout.
    fn shutdown(mut self) {
        drop(self.stdin.take());

        let deadline = Instant::now() + SHUTDOWN_TIMEOUT;
        loop {
            match self.child.try_wait().expect("wait on child") {
                Some(status) => {
                    assert!(status.success(), "server exited with {status}");
                    return;
                }
                None if Instant::now() >= deadline => {
                    self.child.kill().expect("kill child");
                    let _ = self.child.wait();
                    panic!("server did not exit within {SHUTDOWN_TIMEOUT:?} after EOF");
                }
                None => std::thread::sleep(Duration::from_millis(50)),
            }
        }
    }
}

impl Drop for McpClient {
    fn drop(&mut self) {
        // Forceful cleanup if a test failed before shutdown().
        if matches!(self.child.try_wait(), Ok(None)) {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn first_text(response: &Value) -> &str {
    response["result"]["content"][0]["text"]
        .as_str()
        .expect("response has no text content")
}

#[test]
fn scripted_conversation() {
    let mut client = McpClient::spawn();

    let init = client.handshake();
    assert_eq!(init["result"]["serverInfo"]["name"], "toolbox-mcp");
    assert_eq!(init["result"]["protocolVersion"], PROTOCOL_VERSION);
    assert!(init["result"]["capabilities"]["tools"].is_object());

    let list = client.request("tools/list", json!({}));
    let tools = list["result"]["tools"].as_array().expect("tools array");
    let names: Vec<&str> = tools
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["get_current_time", "calculate", "echo"]);
    for tool in tools {
        assert!(!tool["description"].as_str().unwrap().is_empty());
    }

    let echo = client.call_tool("echo", json!({"text": "hello"}));
    assert_eq!(first_text(&echo), "Echo: hello");

    let calc = client.call_tool("calculate", json!({"expression": "2+2"}));
    assert!(first_text(&calc).contains('4'));

    let time = client.call_tool("get_current_time", json!({"timezone": "Bangkok"}));
    assert!(first_text(&time).starts_with("Current time (Bangkok): "));

    let bad = client.call_tool("calculate", json!({"expression": "1/0"}));
    assert!(bad["error"].is_null(), "handler failure must not be a protocol error");
    assert!(first_text(&bad).contains("division by zero"));

    client.shutdown();
}

#[test]
fn echo_preserves_non_ascii() {
    let mut client = McpClient::spawn();
    client.handshake();

    let response = client.call_tool("echo", json!({"text": "สวัสดี MCP Server!"}));
    assert_eq!(first_text(&response), "Echo: สวัสดี MCP Server!");

    client.shutdown();
}

#[test]
fn calculate_respects_precedence() {
    let mut client = McpClient::spawn();
    client.handshake();

    let response = client.call_tool("calculate", json!({"expression": "10 + 5 * 2 - 3"}));
    assert_eq!(
        first_text(&response),
        "Expression: 10 + 5 * 2 - 3\nResult: 17"
    );

    client.shutdown();
}

#[test]
fn unknown_tool_yields_error_and_server_keeps_serving() {
    let mut client = McpClient::spawn();
    client.handshake();

    let response = client.call_tool("no_such_tool", json!({}));
    let error = &response["error"];
    assert!(error.is_object(), "expected an error response");
    assert!(error["code"].is_i64());
    assert!(error["message"]
        .as_str()
        .unwrap()
        .contains("Unknown tool: no_such_tool"));

    // The process must survive and answer the next request.
    let response = client.call_tool("echo", json!({"text": "alive"}));
    assert_eq!(first_text(&response), "Echo: alive");

    client.shutdown();
}

#[test]
fn tools_list_stable_within_session() {
    let mut client = McpClient::spawn();
    client.handshake();

    let first = client.request("tools/list", json!({}));
    let second = client.request("tools/list", json!({}));
    assert_eq!(first["result"], second["result"]);

    client.shutdown();
}

#[test]
fn request_before_initialize_is_rejected_not_fatal() {
    let mut client = McpClient::spawn();

    let response = client.request("tools/list", json!({}));
    assert!(response["error"].is_object());

    // The handshake still succeeds on the same process.
    let init = client.handshake();
    assert_eq!(init["result"]["serverInfo"]["name"], "toolbox-mcp");

    client.shutdown();
}

#[test]
fn malformed_line_is_skipped() {
    let mut client = McpClient::spawn();

    client
        .stdin
        .as_mut()
        .unwrap()
        .write_all(b"this is not json\n")
        .unwrap();
    client.stdin.as_mut().unwrap().flush().unwrap();

    // Parse error carries no id.
    let response = client.read_line();
    assert_eq!(response["error"]["code"], -32700);
    assert!(response.get("id").is_none() || response["id"].is_null());

    // The loop continues: the handshake works afterwards.
    let init = client.handshake();
    assert_eq!(init["result"]["serverInfo"]["name"], "toolbox-mcp");

    client.shutdown();
}

#[test]
fn unknown_method_yields_method_not_found() {
    let mut client = McpClient::spawn();
    client.handshake();

    let response = client.request("resources/list", json!({}));
    assert_eq!(response["error"]["code"], -32601);

    client.shutdown();
}
