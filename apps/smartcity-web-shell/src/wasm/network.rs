use super::*;

/// Same-origin by default. A page may set `window.__SMARTCITY_API_BASE__`
/// to point the client at another backend origin.
pub(super) fn resolve_config() -> ClientConfig {
    let Some(window) = web_sys::window() else {
        return ClientConfig::default();
    };
    let override_value =
        js_sys::Reflect::get(&window, &JsValue::from_str(API_BASE_OVERRIDE_GLOBAL))
            .ok()
            .and_then(|value| value.as_string());
    let Some(base_url) = override_value else {
        return ClientConfig::default();
    };
    match ClientConfig::with_base_url(&base_url) {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!(error = %error, "ignoring invalid api base override");
            ClientConfig::default()
        }
    }
}

pub(super) struct FetchTransport {
    config: ClientConfig,
}

impl FetchTransport {
    pub(super) fn new(config: ClientConfig) -> Self {
        Self { config }
    }
}

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        if request.path.trim().is_empty() {
            return Err(TransportError::InvalidPath);
        }
        let url = self.config.endpoint(&request.path);
        let builder = match request.method {
            HttpMethod::Get => Request::get(&url),
            HttpMethod::Post => Request::post(&url),
        }
        .header("accept", "application/json");

        let prepared = match request.body.as_ref() {
            Some(body) => builder.json(body),
            None => builder.build(),
        }
        .map_err(|error| TransportError::request(error.to_string()))?;

        let response = prepared
            .send()
            .await
            .map_err(|error| TransportError::request(error.to_string()))?;
        let status = response.status();
        let raw = response.text().await.map_err(|error| TransportError::Read {
            message: error.to_string(),
        })?;
        decode_body(status, &raw)
    }
}
