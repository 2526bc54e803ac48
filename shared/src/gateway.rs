//! Single chokepoint for outbound requests.
//!
//! Every handler goes through [`Gateway`], which never returns an error:
//! transport and decoding failures are folded into an [`ApiResponse`] with
//! `success == false` and [`NETWORK_ERROR_MESSAGE`]. Callers only ever branch
//! on `success`.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ClientError, TransportError, NETWORK_ERROR_MESSAGE};

pub const JSON_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Text(String),
    File(UploadFile),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

impl FormPart {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        Self { name: name.to_string(), value: FormValue::Text(value.into()) }
    }

    pub fn file(name: &str, file: UploadFile) -> Self {
        Self { name: name.to_string(), value: FormValue::File(file) }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(String),
    Multipart(Vec<FormPart>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

/// What the transport actually puts on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Sends a request and hands back the raw response body. Implementations
/// must not interpret HTTP status codes: the backend reports failures in the
/// body.
#[async_trait(?Send)]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<String, TransportError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<P> {
    pub success: bool,
    pub message: Option<String>,
    pub payload: Option<P>,
}

impl<P> ApiResponse<P> {
    pub fn network_failure() -> Self {
        Self {
            success: false,
            message: Some(NETWORK_ERROR_MESSAGE.to_string()),
            payload: None,
        }
    }

    pub fn message_or(&self, default: &str) -> String {
        self.message.clone().unwrap_or_else(|| default.to_string())
    }

    /// The payload of a successful response.
    pub fn ok(self) -> Option<P> {
        if self.success { self.payload } else { None }
    }
}

impl<P: DeserializeOwned> ApiResponse<P> {
    pub fn decode(body: &str) -> Result<Self, ClientError> {
        let value: Value = serde_json::from_str(body)?;
        let success = value.get("success").and_then(Value::as_bool).unwrap_or(false);
        let message = value.get("message").and_then(Value::as_str).map(str::to_string);
        let payload = if success {
            Some(serde_json::from_value(value)?)
        } else {
            None
        };
        Ok(Self { success, message, payload })
    }
}

#[derive(Debug, Clone)]
pub struct Gateway<T> {
    transport: T,
}

impl<T: Transport> Gateway<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn call<P: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> ApiResponse<P> {
        match self.try_call(path, options).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(path, error = %err, "request failed, reporting network error");
                ApiResponse::network_failure()
            }
        }
    }

    async fn try_call<P: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<ApiResponse<P>, ClientError> {
        let request = ApiRequest {
            method: options.method,
            path: path.to_string(),
            headers: merge_headers(&options.body, options.headers),
            body: options.body,
        };
        tracing::debug!(method = ?request.method, path, "sending request");

        let body = self.transport.send(request).await?;
        let response = ApiResponse::decode(&body)?;
        if !response.success {
            tracing::debug!(path, reason = ?response.message, "request rejected by server");
        }
        Ok(response)
    }

    pub async fn get<P: DeserializeOwned>(&self, path: &str) -> ApiResponse<P> {
        self.call(path, RequestOptions::default()).await
    }

    pub async fn post_empty<P: DeserializeOwned>(&self, path: &str) -> ApiResponse<P> {
        self.call(path, RequestOptions { method: Method::Post, ..Default::default() }).await
    }

    pub async fn post_json<B: Serialize, P: DeserializeOwned>(&self, path: &str, body: &B) -> ApiResponse<P> {
        let body = match serde_json::to_string(body) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(path, error = %err, "request body could not be encoded");
                return ApiResponse::network_failure();
            }
        };
        self.call(path, RequestOptions {
            method: Method::Post,
            body: RequestBody::Json(body),
            ..Default::default()
        }).await
    }

    pub async fn post_multipart<P: DeserializeOwned>(&self, path: &str, parts: Vec<FormPart>) -> ApiResponse<P> {
        self.call(path, RequestOptions {
            method: Method::Post,
            body: RequestBody::Multipart(parts),
            ..Default::default()
        }).await
    }
}

/// JSON content type first, caller headers layered on top. Multipart bodies
/// get no content type so the transport can add the boundary itself.
fn merge_headers(body: &RequestBody, extra: Vec<(String, String)>) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    if !matches!(body, RequestBody::Multipart(_)) {
        headers.push(("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()));
    }
    for (name, value) in extra {
        headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        headers.push((name, value));
    }
    headers
}
