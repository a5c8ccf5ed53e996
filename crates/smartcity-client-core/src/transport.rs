use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{InputError, TransportError};

pub const STATS_PATH: &str = "/api/stats";
pub const NOTIFICATIONS_PATH: &str = "/api/notifications";
pub const DEVICES_PATH: &str = "/api/devices";
pub const PAYMENT_PATH: &str = "/api/payment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            body,
        }
    }
}

/// A response whose body parsed as JSON. The status is carried along but does
/// not decide success; that is the body's job.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    #[must_use]
    pub fn is_success_status(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

pub fn device_control_path(device_id: &str) -> Result<String, InputError> {
    let device_id = device_id.trim();
    if device_id.is_empty() {
        return Err(InputError::EmptyDeviceId);
    }
    Ok(format!(
        "/api/device/{}/control",
        urlencoding::encode(device_id)
    ))
}

pub fn routine_path(routine_type: &str) -> Result<String, InputError> {
    let routine_type = routine_type.trim();
    if routine_type.is_empty() {
        return Err(InputError::EmptyRoutineType);
    }
    Ok(format!("/api/routine/{}", urlencoding::encode(routine_type)))
}

/// Parses a raw body; anything that is not JSON is a transport failure.
pub fn decode_body(status: u16, raw: &str) -> Result<ApiResponse, TransportError> {
    serde_json::from_str(raw)
        .map(|body| ApiResponse { status, body })
        .map_err(|error| TransportError::Decode {
            status,
            message: error.to_string(),
        })
}

/// GET that requires a 2xx status and a body decoding as `T`.
pub async fn get_json<T: DeserializeOwned>(
    transport: &dyn HttpTransport,
    path: &str,
) -> Result<T, TransportError> {
    let response = transport.send(ApiRequest::get(path)).await?;
    if !response.is_success_status() {
        return Err(TransportError::Decode {
            status: response.status,
            message: format!("request failed with status {}", response.status),
        });
    }
    serde_json::from_value(response.body).map_err(|error| TransportError::Decode {
        status: response.status,
        message: error.to_string(),
    })
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::ReqwestTransport;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Duration;

    use async_trait::async_trait;
    use uuid::Uuid;

    use super::{ApiRequest, ApiResponse, HttpMethod, HttpTransport, decode_body};
    use crate::config::ClientConfig;
    use crate::error::TransportError;

    /// Transport for hosts outside the browser.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        config: ClientConfig,
        timeout: Duration,
        http: reqwest::Client,
    }

    impl ReqwestTransport {
        pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
            if config.base_url.is_empty() {
                return Err(TransportError::BaseUrlMissing);
            }
            Ok(Self {
                config: config.clone(),
                timeout: config.request_timeout.max(Duration::from_millis(250)),
                http: reqwest::Client::new(),
            })
        }

        #[must_use]
        pub fn endpoint(&self, path: &str) -> Option<String> {
            if path.trim().is_empty() {
                return None;
            }
            Some(self.config.endpoint(path))
        }
    }

    #[async_trait(?Send)]
    impl HttpTransport for ReqwestTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
            let url = self
                .endpoint(&request.path)
                .ok_or(TransportError::InvalidPath)?;
            let mut builder = match request.method {
                HttpMethod::Get => self.http.get(url.as_str()),
                HttpMethod::Post => self.http.post(url.as_str()),
            }
            .header("x-request-id", format!("req_{}", Uuid::new_v4().simple()))
            .timeout(self.timeout);
            if let Some(body) = request.body.as_ref() {
                builder = builder.json(body);
            }

            let response = builder
                .send()
                .await
                .map_err(|error| TransportError::request(error.to_string()))?;
            let status = response.status().as_u16();
            let raw = response.text().await.map_err(|error| TransportError::Read {
                message: error.to_string(),
            })?;
            decode_body(status, &raw)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn requires_an_absolute_base_url() {
            assert_eq!(
                ReqwestTransport::new(&ClientConfig::default()).err(),
                Some(TransportError::BaseUrlMissing)
            );
        }

        #[test]
        fn endpoint_builder_normalizes_paths() {
            let config = ClientConfig::with_base_url("http://127.0.0.1:5000/").expect("config");
            let transport = ReqwestTransport::new(&config).expect("transport");
            assert_eq!(
                transport.endpoint("/api/stats"),
                Some("http://127.0.0.1:5000/api/stats".to_string())
            );
            assert_eq!(
                transport.endpoint("api/devices"),
                Some("http://127.0.0.1:5000/api/devices".to_string())
            );
            assert_eq!(transport.endpoint(" "), None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_helpers_encode_single_segments() {
        assert_eq!(
            device_control_path(" SL001 ").as_deref(),
            Ok("/api/device/SL001/control")
        );
        assert_eq!(
            device_control_path("a/b c").as_deref(),
            Ok("/api/device/a%2Fb%20c/control")
        );
        assert_eq!(routine_path("sunrise").as_deref(), Ok("/api/routine/sunrise"));
        assert_eq!(device_control_path("  "), Err(InputError::EmptyDeviceId));
        assert_eq!(routine_path(""), Err(InputError::EmptyRoutineType));
    }

    #[test]
    fn decode_body_keeps_status_and_rejects_non_json() {
        let response = decode_body(400, "{\"error\":\"Invalid action\"}").expect("json");
        assert_eq!(response.status, 400);
        assert_eq!(response.body, json!({"error": "Invalid action"}));
        assert!(!response.is_success_status());

        assert!(matches!(
            decode_body(502, "<html>Bad Gateway</html>"),
            Err(TransportError::Decode { status: 502, .. })
        ));
    }
}
