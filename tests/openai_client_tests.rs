use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_test::{assert_err, assert_ok};

use gpt5_mcp::providers::openai::EMPTY_RESPONSE_TEXT;
use gpt5_mcp::{Adapter, AdapterConfig, ChatBackend, Error, Message, OpenAiClient};

/// What the fake endpoint saw
struct CapturedRequest
{   head: String
  , body: Value
}

fn find_header_end(buf: &[u8]) -> Option<usize>
{   buf.windows(4)
      .position(|w| w == b"\r\n\r\n")
      .map(|p| p + 4)
}

/// Answer exactly one HTTP request with a canned status and body
async fn serve_once(status: u16, body: &str)
  -> (String, oneshot::Receiver<CapturedRequest>)
{   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();
    let body = body.to_string();

    tokio::spawn(async move {
      let (mut socket, _) = listener.accept().await.unwrap();
      let mut buf = Vec::new();
      let mut chunk = [0u8; 4096];

      let header_end = loop
      {   let n = socket.read(&mut chunk).await.unwrap();
          assert!(n > 0, "connection closed before headers");
          buf.extend_from_slice(&chunk[..n]);
          if let Some(end) = find_header_end(&buf)
          {   break end;
          }
      };
      let head = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
      let content_length = head.lines()
        .find_map(|line| {
          let (name, value) = line.split_once(':')?;
          if name.trim() == "content-length"
          {   value.trim().parse::<usize>().ok()
          } else
          {   None
          }
        })
        .unwrap_or(0);
      while buf.len() < header_end + content_length
      {   let n = socket.read(&mut chunk).await.unwrap();
          assert!(n > 0, "connection closed before body");
          buf.extend_from_slice(&chunk[..n]);
      }
      let request_body = serde_json::from_slice(
        &buf[header_end..header_end + content_length]
      ).unwrap_or(Value::Null);

      let response = format!(
        "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status, body.len(), body
      );
      socket.write_all(response.as_bytes()).await.unwrap();
      let _ = socket.shutdown().await;
      let _ = tx.send(CapturedRequest { head, body: request_body });
    });

    (format!("http://{}/v1", addr), rx)
}

fn client_for(base: &str) -> OpenAiClient
{   let config = AdapterConfig
    {   api_key: "test-key".to_string()
      , api_base: Some(base.to_string())
      , timeout_secs: Some(5)
    };
    assert_ok!(OpenAiClient::new(&config))
}

#[tokio::test]
async fn test_success_returns_first_choice_content()
{   let (base, captured) = serve_once(
      200,
      r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#
    ).await;
    let client = client_for(&base);

    let text = assert_ok!(
      client.complete(vec![Message::user("hi")], 256).await
    );
    assert_eq!(text, "hello");

    let captured = captured.await.unwrap();
    assert!(captured.head.starts_with("post /v1/chat/completions "));
    assert!(captured.head.contains("authorization: bearer test-key"));
    assert!(captured.head.contains("content-type: application/json"));
    assert_eq!(captured.body["model"], "gpt-5");
    assert_eq!(captured.body["max_completion_tokens"], 256);
    assert_eq!(captured.body["temperature"], json!(1.0));
    assert_eq!(
      captured.body["messages"],
      json!([{ "role": "user", "content": "hi" }])
    );
}

#[tokio::test]
async fn test_caller_temperature_never_reaches_the_wire()
{   for temperature in [json!(0), json!(0.7), json!(2)]
    {   let (base, captured) = serve_once(
          200,
          r#"{"choices":[{"message":{"content":"ok"}}]}"#
        ).await;
        let adapter = Adapter::new(Arc::new(client_for(&base)));

        let result = adapter
          .dispatch(
            "gpt5_generate",
            json!({ "prompt": "x", "temperature": temperature })
          )
          .await;

        assert_eq!(result.first_text(), Some("ok"));
        let captured = captured.await.unwrap();
        assert_eq!(captured.body["temperature"], json!(1.0));
    }
}

#[tokio::test]
async fn test_error_status_carries_code_and_body()
{   let (base, _captured) = serve_once(401, "invalid key").await;
    let client = client_for(&base);

    let err = assert_err!(
      client.complete(vec![Message::user("hi")], 10).await
    );
    assert_eq!(
      err,
      Error::RemoteApi { status: 401, body: "invalid key".to_string() }
    );
}

#[tokio::test]
async fn test_error_status_is_rendered_in_band()
{   let (base, _captured) = serve_once(401, "invalid key").await;
    let adapter = Adapter::new(Arc::new(client_for(&base)));

    let result = adapter
      .dispatch("gpt5_generate", json!({ "prompt": "hi" }))
      .await;

    let text = result.first_text().unwrap();
    assert!(text.starts_with("Error: "));
    assert!(text.contains("401"));
    assert!(text.contains("invalid key"));
}

#[tokio::test]
async fn test_missing_content_yields_placeholder()
{   let bodies = [
      r#"{}"#,
      r#"{"choices":[]}"#,
      r#"{"choices":null}"#,
      r#"{"choices":[{"message":{"role":"assistant"}}]}"#,
      r#"{"choices":[{"message":{"content":null}}]}"#,
      r#"{"choices":[{"message":{"content":""}}]}"#,
    ];
    for body in bodies
    {   let (base, _captured) = serve_once(200, body).await;
        let client = client_for(&base);

        let text = assert_ok!(
          client.complete(vec![Message::user("hi")], 10).await
        );
        assert_eq!(text, EMPTY_RESPONSE_TEXT, "body: {}", body);
    }
}

#[tokio::test]
async fn test_malformed_body_is_a_transport_error()
{   let (base, _captured) = serve_once(200, "<html>oops</html>").await;
    let client = client_for(&base);

    let err = assert_err!(
      client.complete(vec![Message::user("hi")], 10).await
    );
    assert!(matches!(err, Error::Transport(_)), "{:?}", err);
}

#[tokio::test]
async fn test_connection_refused_is_a_transport_error()
{   let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let adapter = Adapter::new(
      Arc::new(client_for(&format!("http://{}/v1", addr)))
    );

    let result = adapter
      .dispatch("gpt5_messages", json!({
        "messages": [{ "role": "user", "content": "hi" }]
      }))
      .await;

    assert!(result.first_text().unwrap().starts_with("Error: HTTP error: "));
}

#[tokio::test]
#[ignore]
async fn test_live_generate()
{   let config = match AdapterConfig::from_env()
    {   Ok(c) => c
      , Err(e) => {
          println!("Skipping: {}", e);
          return;
        }
    };
    let client = assert_ok!(OpenAiClient::new(&config));

    match client.complete(vec![Message::user("Say hello")], 50).await
    {   Ok(response) => {
          println!("Response: {}", response);
          assert!(!response.is_empty());
        }
      , Err(e) => {
          println!("API Error: {}", e);
        }
    }
}
