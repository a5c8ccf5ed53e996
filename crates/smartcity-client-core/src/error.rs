use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("base url must use http:// or https:// and include a host")]
    InvalidBaseUrl,
    #[error("stats poll interval must be a positive number of milliseconds, got {raw:?}")]
    InvalidPollInterval { raw: String },
}

/// Transport-tier failures: the request never produced a usable JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("transport_base_url_missing")]
    BaseUrlMissing,
    #[error("transport_invalid_path")]
    InvalidPath,
    #[error("request_failed:{message}")]
    Request { message: String },
    #[error("response_read_failed:{message}")]
    Read { message: String },
    #[error("response_decode_failed(status={status}):{message}")]
    Decode { status: u16, message: String },
}

impl TransportError {
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage is unavailable")]
    Unavailable,
    #[error("storage quota exceeded: {message}")]
    Quota { message: String },
    #[error("storage backend failed: {message}")]
    Backend { message: String },
}

/// Client-side input rejected before any request is built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Invalid payment amount")]
    InvalidAmount,
    #[error("Device id must not be empty")]
    EmptyDeviceId,
    #[error("Routine type must not be empty")]
    EmptyRoutineType,
}
