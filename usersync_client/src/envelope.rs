use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::ClientError;

/// Client-side view of the server's standard response envelope
#[derive(Debug, Clone)]
pub struct Envelope {
    pub result: Value,
    pub status: u16,
    pub errors: Vec<String>,
    pub exception_details: Option<String>,
}

impl Envelope {
    /// Detect and parse the standard envelope shape
    ///
    /// A body qualifies only if it is an object carrying `result`, a numeric
    /// `status`, and an `errors` array; anything else passes through the
    /// pipeline untouched.
    pub fn from_value(body: &Value) -> Option<Self> {
        let obj = body.as_object()?;
        if !obj.contains_key("result") {
            return None;
        }
        let status = obj.get("status")?.as_u64()? as u16;
        let errors = obj
            .get("errors")?
            .as_array()?
            .iter()
            .map(|e| e.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?;
        let exception_details = obj
            .get("exceptionDetails")
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Self {
            result: obj.get("result").cloned().unwrap_or(Value::Null),
            status,
            errors,
            exception_details,
        })
    }

    /// An empty error list is the sole success predicate
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Unwrap the payload on success, or synthesize the structured error
    pub fn unwrap_result<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        if self.is_success() {
            serde_json::from_value(self.result).map_err(|e| ClientError::Decode(e.to_string()))
        } else {
            Err(ClientError::Api {
                status: self.status,
                errors: self.errors,
                exception_details: self.exception_details,
            })
        }
    }
}
