use super::UNKNOWN_ERROR;
use crate::auth::ClientContext;
use crate::{Error, Result};
use reqwest::multipart::Form;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde_json::Value;

/// Successful reply: a populated `data` field plus what is needed to report
/// a follow-up failure against the same response.
#[derive(Debug, Clone)]
pub struct ApiReply {
    pub data: Value,
    pub message: Option<String>,
    pub body: String,
}

impl ApiReply {
    /// Upload failure carrying this reply's platform message and raw body.
    pub fn error(&self, context: &str) -> Error {
        upload_error(context, self.message.as_deref(), &self.body)
    }
}

/// Thin wrapper around the configured reqwest client.
#[derive(Debug, Clone)]
pub struct TikTokHttpClient {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
}

impl TikTokHttpClient {
    pub fn new(context: ClientContext) -> Self {
        Self {
            client: context.client,
            base_url: context.base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Configuration(format!("Invalid endpoint path '{}': {}", path, e)))
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        query: &[(&str, &str)],
        form: Form,
        context: &str,
    ) -> Result<ApiReply> {
        let url = self.url(path)?;
        tracing::debug!("POST {}", url);
        let request = self.client.post(url).query(query).multipart(form);
        self.execute(request, context).await
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)], context: &str) -> Result<ApiReply> {
        let url = self.url(path)?;
        tracing::debug!("GET {}", url);
        let request = self.client.get(url).query(query);
        self.execute(request, context).await
    }

    async fn execute(&self, request: RequestBuilder, context: &str) -> Result<ApiReply> {
        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to send request to TikTok: {}", e);
            e
        })?;

        let status = response.status();
        let body = response.text().await?;
        parse_reply(status, body, context)
    }
}

/// Accept a response only if it is 2xx and carries a non-empty `data` field.
pub(crate) fn parse_reply(status: StatusCode, body: String, context: &str) -> Result<ApiReply> {
    // `message` (Business API) or `msg` (ads-manager), whichever is a non-empty string.
    let envelope: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    let message = ["message", "msg"]
        .iter()
        .filter_map(|field| envelope.get(field).and_then(Value::as_str))
        .find(|message| !message.is_empty())
        .map(str::to_string);

    if !status.is_success() {
        tracing::error!("TikTok API error (status {}): {}", status, body);
        return Err(upload_error(context, message.as_deref(), &body));
    }

    match envelope.get("data").cloned() {
        Some(data) if is_populated(&data) => Ok(ApiReply {
            data,
            message,
            body,
        }),
        _ => {
            tracing::error!("TikTok API returned no data: {}", body);
            Err(upload_error(context, message.as_deref(), &body))
        }
    }
}

fn upload_error(context: &str, message: Option<&str>, body: &str) -> Error {
    let message = message.filter(|m| !m.is_empty()).unwrap_or(UNKNOWN_ERROR);
    Error::Upload {
        message: format!("{}: {}", context, message),
        body: body.to_string(),
    }
}

fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_reply_success() {
        let body = json!({ "code": 0, "message": "OK", "data": { "image_id": "x" } }).to_string();
        let reply = parse_reply(StatusCode::OK, body, "Failed to upload image").unwrap();

        assert_eq!(reply.data, json!({ "image_id": "x" }));
        assert_eq!(reply.message.as_deref(), Some("OK"));
    }

    #[test]
    fn test_parse_reply_empty_data() {
        let body = json!({ "code": 40002, "message": "Invalid file", "data": {} }).to_string();
        let err = parse_reply(StatusCode::OK, body.clone(), "Failed to upload image").unwrap_err();

        assert_eq!(err.to_string(), "Failed to upload image: Invalid file");
        assert_eq!(err.body(), Some(body.as_str()));
    }

    #[test]
    fn test_parse_reply_uses_msg_field() {
        let body = json!({ "code": 1, "msg": "session expired" }).to_string();
        let err = parse_reply(StatusCode::OK, body, "Failed to upload image").unwrap_err();
        assert_eq!(err.to_string(), "Failed to upload image: session expired");
    }

    #[test]
    fn test_parse_reply_tolerates_odd_field_types() {
        let body =
            json!({ "code": 0, "message": 0, "msg": "ok", "data": { "url": "u" } }).to_string();
        let reply = parse_reply(StatusCode::OK, body, "Failed to upload image").unwrap();
        assert_eq!(reply.data, json!({ "url": "u" }));
        assert_eq!(reply.message.as_deref(), Some("ok"));

        let body = json!({ "message": ["bad"], "data": [] }).to_string();
        let err = parse_reply(StatusCode::OK, body, "Failed to upload image").unwrap_err();
        assert_eq!(err.to_string(), "Failed to upload image: Unknown error");
    }

    #[test]
    fn test_parse_reply_non_success_status() {
        let body = json!({ "message": "rate limited", "data": { "x": 1 } }).to_string();
        let err = parse_reply(StatusCode::TOO_MANY_REQUESTS, body, "Failed to upload video")
            .unwrap_err();
        assert!(matches!(err, Error::Upload { .. }));
        assert_eq!(err.to_string(), "Failed to upload video: rate limited");
    }

    #[test]
    fn test_parse_reply_non_json_body() {
        let err = parse_reply(
            StatusCode::BAD_GATEWAY,
            "<html>bad gateway</html>".to_string(),
            "Failed to upload image",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Failed to upload image: Unknown error");
        assert_eq!(err.body(), Some("<html>bad gateway</html>"));
    }

    #[test]
    fn test_is_populated() {
        assert!(!is_populated(&Value::Null));
        assert!(!is_populated(&json!([])));
        assert!(!is_populated(&json!({})));
        assert!(!is_populated(&json!("")));
        assert!(is_populated(&json!([{ "video_id": "v1" }])));
        assert!(is_populated(&json!(7)));
    }
}
