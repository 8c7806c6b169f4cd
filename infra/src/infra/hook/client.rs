use anyhow::Result;
use bifrost_base::error::BifrostError;
use model::Hook;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// delivered json: `{"hook": {...}, "data": ...}`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct HookPayload {
    pub hook: HookRef,
    pub data: serde_json::Value,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct HookRef {
    pub id: i64,
    pub event: String,
    pub target: String,
}

impl HookPayload {
    pub fn new(hook: &Hook, target: &str, data: serde_json::Value) -> Self {
        Self {
            hook: HookRef {
                id: hook.id,
                event: hook.data.event.clone(),
                target: target.to_string(),
            },
            data,
        }
    }
}

/// http client posting hook payloads to their targets
#[derive(Clone, Debug)]
pub struct WebhookClientImpl {
    client: reqwest::Client,
}

impl WebhookClientImpl {
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Self::DEFAULT_TIMEOUT)
            .build()
            .map_err(BifrostError::ReqwestError)?;
        Ok(Self { client })
    }

    /// returns the response status code (non 2xx is an error)
    pub async fn deliver(&self, payload: &HookPayload) -> Result<u16> {
        let parsed_url = url::Url::parse(&payload.hook.target).map_err(|e| {
            BifrostError::InvalidParameter(format!(
                "invalid hook target {}: {:?}",
                &payload.hook.target, e
            ))
        })?;
        let res = self
            .client
            .post(parsed_url)
            .json(payload)
            .send()
            .await
            .map_err(BifrostError::ReqwestError)?;
        let status = res.status();
        res.error_for_status().map_err(BifrostError::ReqwestError)?;
        Ok(status.as_u16())
    }
}

pub trait UseWebhookClient {
    fn webhook_client(&self) -> &WebhookClientImpl;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use model::HookData;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn hook() -> Hook {
        Hook {
            id: 7,
            data: HookData {
                user_id: 1,
                event: "workflowlevel1.added".to_string(),
                target: "http://subscriber.example/".to_string(),
            },
            created: Utc::now(),
            updated: Utc::now(),
        }
    }

    #[test]
    fn test_payload_overrides_target() {
        let payload = HookPayload::new(
            &hook(),
            "http://productsservice:8080/webhook/",
            serde_json::json!({"id": 1}),
        );
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            serde_json::json!({
                "hook": {"id": 7, "event": "workflowlevel1.added", "target": "http://productsservice:8080/webhook/"},
                "data": {"id": 1}
            })
        );
    }

    #[tokio::test]
    async fn test_deliver_posts_json() -> Result<()> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await?;
            let mut buf = vec![0u8; 8192];
            let mut received = Vec::new();
            // read until the json body is complete
            loop {
                let n = socket.read(&mut buf).await?;
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                if received.ends_with(b"}}") {
                    break;
                }
            }
            socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .await?;
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&received).to_string())
        });
        let client = WebhookClientImpl::new()?;
        let payload = HookPayload::new(
            &hook(),
            &format!("http://{}/webhook/", addr),
            serde_json::json!({"name": "wl1"}),
        );
        let status = client.deliver(&payload).await?;
        assert_eq!(status, 200);
        let request = server.await??;
        assert!(request.starts_with("POST /webhook/ HTTP/1.1"));
        assert!(request.contains("\"event\":\"workflowlevel1.added\""));
        assert!(request.contains("\"data\":{\"name\":\"wl1\"}"));
        Ok(())
    }

    #[tokio::test]
    async fn test_deliver_invalid_target() {
        let client = WebhookClientImpl::new().unwrap();
        let payload = HookPayload::new(&hook(), "not a url", serde_json::Value::Null);
        assert!(client.deliver(&payload).await.is_err());
    }
}
