use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::InputError;
use crate::host::{EventLoop, PageSurface};
use crate::notify::{NotificationEmitter, Severity};
use crate::projector::StatusProjector;
use crate::transport::{
    ApiRequest, HttpTransport, PAYMENT_PATH, device_control_path, routine_path,
};

pub const PAYMENT_CURRENCY: &str = "USD";
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Connection error. Please check your network and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    DeviceControl,
    Routine,
    Payment,
}

/// User-facing copy for one operation kind.
#[derive(Debug)]
pub struct FeedbackPolicy {
    pub kind: OperationKind,
    pub fallback_error: &'static str,
}

static DEVICE_CONTROL_POLICY: FeedbackPolicy = FeedbackPolicy {
    kind: OperationKind::DeviceControl,
    fallback_error: "Failed to control device",
};

static ROUTINE_POLICY: FeedbackPolicy = FeedbackPolicy {
    kind: OperationKind::Routine,
    fallback_error: "Failed to execute routine",
};

static PAYMENT_POLICY: FeedbackPolicy = FeedbackPolicy {
    kind: OperationKind::Payment,
    fallback_error: "Payment failed",
};

impl OperationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeviceControl => "device_control",
            Self::Routine => "routine",
            Self::Payment => "payment",
        }
    }

    #[must_use]
    pub fn policy(self) -> &'static FeedbackPolicy {
        match self {
            Self::DeviceControl => &DEVICE_CONTROL_POLICY,
            Self::Routine => &ROUTINE_POLICY,
            Self::Payment => &PAYMENT_POLICY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub currency: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandRequest {
    DeviceControl { device_id: String, action: String },
    Routine { routine_type: String },
    Payment(PaymentRequest),
}

impl CommandRequest {
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::DeviceControl { .. } => OperationKind::DeviceControl,
            Self::Routine { .. } => OperationKind::Routine,
            Self::Payment(_) => OperationKind::Payment,
        }
    }

    #[must_use]
    pub fn target(&self) -> &str {
        match self {
            Self::DeviceControl { device_id, .. } => device_id,
            Self::Routine { routine_type } => routine_type,
            Self::Payment(payment) => &payment.kind,
        }
    }

    pub fn to_api_request(&self) -> Result<ApiRequest, InputError> {
        match self {
            Self::DeviceControl { device_id, action } => Ok(ApiRequest::post(
                device_control_path(device_id)?,
                Some(json!({ "action": action })),
            )),
            Self::Routine { routine_type } => {
                Ok(ApiRequest::post(routine_path(routine_type)?, None))
            }
            Self::Payment(payment) => Ok(ApiRequest::post(
                PAYMENT_PATH,
                serde_json::to_value(payment).ok(),
            )),
        }
    }

    fn success_message(&self, result: &CommandResult) -> String {
        match self {
            Self::DeviceControl { device_id, action } => {
                format!("Device {device_id}: {action} command sent successfully")
            }
            Self::Routine { routine_type } => result
                .payload_str("message")
                .map(ToString::to_string)
                .unwrap_or_else(|| format!("{routine_type} routine executed")),
            Self::Payment(payment) => {
                format!("Payment of ${:.2} processed successfully", payment.amount)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl CommandResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            payload: None,
        }
    }

    /// Only a literal `"success": true` counts as success. Remaining fields
    /// other than `error` become the payload.
    #[must_use]
    pub fn from_response_body(body: Value) -> Self {
        let Value::Object(mut fields) = body else {
            return Self {
                success: false,
                error: None,
                payload: Some(body),
            };
        };
        let success = matches!(fields.remove("success"), Some(Value::Bool(true)));
        let error = match fields.remove("error") {
            Some(Value::String(message)) => Some(message),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let payload = (!fields.is_empty()).then(|| Value::Object(fields));
        Self {
            success,
            error,
            payload,
        }
    }

    #[must_use]
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload
            .as_ref()
            .and_then(Value::as_object)
            .and_then(|fields: &Map<String, Value>| fields.get(key))
            .and_then(Value::as_str)
    }
}

/// Coerces a form value to a payment amount using its leading numeric prefix,
/// so `"10.5"` and `" 7 USD"` are accepted. Non-finite results are rejected.
pub fn coerce_amount(raw: &str) -> Result<f64, InputError> {
    let trimmed = raw.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut digits = end - int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return Err(InputError::InvalidAmount);
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    match trimmed[..end].parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(InputError::InvalidAmount),
    }
}

/// Sends device, routine and payment commands and turns every outcome into
/// user feedback plus a [`CommandResult`]. Never returns an error.
pub struct CommandDispatcher {
    transport: Rc<dyn HttpTransport>,
    notifier: Rc<NotificationEmitter>,
    projector: StatusProjector,
    page: Rc<dyn PageSurface>,
    event_loop: Rc<dyn EventLoop>,
    reload_delay: Duration,
}

impl CommandDispatcher {
    pub fn new(
        transport: Rc<dyn HttpTransport>,
        notifier: Rc<NotificationEmitter>,
        page: Rc<dyn PageSurface>,
        event_loop: Rc<dyn EventLoop>,
        reload_delay: Duration,
    ) -> Self {
        Self {
            transport,
            notifier,
            projector: StatusProjector::new(Rc::clone(&page)),
            page,
            event_loop,
            reload_delay,
        }
    }

    pub async fn control_device(&self, device_id: &str, action: &str) -> CommandResult {
        let request = CommandRequest::DeviceControl {
            device_id: device_id.trim().to_string(),
            action: action.to_string(),
        };
        let result = self.dispatch(&request).await;
        if result.success {
            self.projector.apply_device_status(request.target(), action);
        }
        result
    }

    pub async fn execute_routine(&self, routine_type: &str) -> CommandResult {
        let request = CommandRequest::Routine {
            routine_type: routine_type.trim().to_string(),
        };
        let result = self.dispatch(&request).await;
        if result.success {
            let page = Rc::clone(&self.page);
            self.event_loop
                .set_timeout(self.reload_delay, Box::new(move || page.reload()));
        }
        result
    }

    pub async fn process_payment(
        &self,
        amount: &str,
        kind: &str,
        description: &str,
    ) -> CommandResult {
        let amount = match coerce_amount(amount) {
            Ok(amount) => amount,
            Err(error) => return self.reject_input(OperationKind::Payment, &error),
        };
        let request = CommandRequest::Payment(PaymentRequest {
            amount,
            kind: kind.to_string(),
            currency: PAYMENT_CURRENCY.to_string(),
            description: description.to_string(),
        });
        self.dispatch(&request).await
    }

    async fn dispatch(&self, request: &CommandRequest) -> CommandResult {
        let kind = request.kind();
        let api_request = match request.to_api_request() {
            Ok(api_request) => api_request,
            Err(error) => return self.reject_input(kind, &error),
        };

        let response = match self.transport.send(api_request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(
                    operation = kind.as_str(),
                    target = %request.target(),
                    error = %error,
                    "command dispatch failed in transport"
                );
                self.notifier
                    .notify(CONNECTION_ERROR_MESSAGE, Severity::Error);
                return CommandResult::failure(error.to_string());
            }
        };

        let result = CommandResult::from_response_body(response.body);
        if result.success {
            tracing::info!(
                operation = kind.as_str(),
                target = %request.target(),
                "command succeeded"
            );
            self.notifier
                .notify(request.success_message(&result), Severity::Success);
        } else {
            let message = result
                .error
                .clone()
                .unwrap_or_else(|| kind.policy().fallback_error.to_string());
            tracing::warn!(
                operation = kind.as_str(),
                target = %request.target(),
                status = response.status,
                error = %message,
                "command rejected by backend"
            );
            self.notifier.notify(message, Severity::Error);
        }
        result
    }

    fn reject_input(&self, kind: OperationKind, error: &InputError) -> CommandResult {
        tracing::warn!(operation = kind.as_str(), error = %error, "command input rejected");
        self.notifier.notify(error.to_string(), Severity::Error);
        CommandResult::failure(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_its_own_policy() {
        for kind in [
            OperationKind::DeviceControl,
            OperationKind::Routine,
            OperationKind::Payment,
        ] {
            assert_eq!(kind.policy().kind, kind);
        }
        assert_eq!(
            OperationKind::DeviceControl.policy().fallback_error,
            "Failed to control device"
        );
        assert_eq!(
            OperationKind::Routine.policy().fallback_error,
            "Failed to execute routine"
        );
        assert_eq!(
            OperationKind::Payment.policy().fallback_error,
            "Payment failed"
        );
    }

    #[test]
    fn coerce_amount_uses_leading_numeric_prefix() {
        assert_eq!(coerce_amount("10.5"), Ok(10.5));
        assert_eq!(coerce_amount("  7 USD"), Ok(7.0));
        assert_eq!(coerce_amount(".25"), Ok(0.25));
        assert_eq!(coerce_amount("3."), Ok(3.0));
        assert_eq!(coerce_amount("-2e3x"), Ok(-2000.0));
        assert_eq!(coerce_amount("1e"), Ok(1.0));
        assert_eq!(coerce_amount("abc"), Err(InputError::InvalidAmount));
        assert_eq!(coerce_amount("."), Err(InputError::InvalidAmount));
        assert_eq!(coerce_amount(""), Err(InputError::InvalidAmount));
        assert_eq!(coerce_amount("1e999"), Err(InputError::InvalidAmount));
    }

    #[test]
    fn result_requires_literal_true() {
        let ok = CommandResult::from_response_body(json!({"success": true, "result": "ok"}));
        assert!(ok.success);
        assert_eq!(ok.payload, Some(json!({"result": "ok"})));

        let truthy = CommandResult::from_response_body(json!({"success": "true"}));
        assert!(!truthy.success);

        let rejected = CommandResult::from_response_body(json!({
            "success": false,
            "error": "Insufficient funds",
        }));
        assert!(!rejected.success);
        assert_eq!(rejected.error.as_deref(), Some("Insufficient funds"));
        assert_eq!(rejected.payload, None);

        let invalid = CommandResult::from_response_body(json!({"error": "Invalid action"}));
        assert!(!invalid.success);
        assert_eq!(invalid.error.as_deref(), Some("Invalid action"));

        let array = CommandResult::from_response_body(json!([1]));
        assert!(!array.success);
        assert_eq!(array.error, None);
    }

    #[test]
    fn payment_request_serializes_wire_names() {
        let request = CommandRequest::Payment(PaymentRequest {
            amount: 10.5,
            kind: "deposit".to_string(),
            currency: PAYMENT_CURRENCY.to_string(),
            description: "rent".to_string(),
        });
        let api_request = request.to_api_request().expect("api request");
        assert_eq!(api_request.path, "/api/payment");
        assert_eq!(
            api_request.body,
            Some(json!({
                "amount": 10.5,
                "type": "deposit",
                "currency": "USD",
                "description": "rent",
            }))
        );
        assert_eq!(
            serde_json::to_string(&api_request.body).expect("serialize"),
            "{\"amount\":10.5,\"type\":\"deposit\",\"currency\":\"USD\",\"description\":\"rent\"}"
        );
    }

    #[test]
    fn routine_request_has_no_body() {
        let request = CommandRequest::Routine {
            routine_type: "sunset".to_string(),
        };
        let api_request = request.to_api_request().expect("api request");
        assert_eq!(api_request.path, "/api/routine/sunset");
        assert_eq!(api_request.body, None);
    }
}
