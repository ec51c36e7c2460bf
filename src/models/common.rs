use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Outcome marker of the JSON envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

/// `{status, message?, data?}` envelope shared by every endpoint.
///
/// Deserialization also accepts the older `{success: bool, ...}` dialect so
/// clients written against either shape read responses the same way.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T> {
    pub status: ResponseStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            message: Some(message.into()),
            data: None,
        }
    }
}

impl<'de, T> Deserialize<'de> for ApiResponse<T>
where
    T: serde::de::DeserializeOwned,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let status = match (raw.get("status"), raw.get("success")) {
            (Some(Value::String(s)), _) if s == "success" => ResponseStatus::Success,
            (Some(Value::String(s)), _) if s == "error" => ResponseStatus::Error,
            (_, Some(Value::Bool(true))) => ResponseStatus::Success,
            (_, Some(Value::Bool(false))) => ResponseStatus::Error,
            _ => {
                return Err(serde::de::Error::custom(
                    "envelope carries neither `status` nor `success`",
                ));
            }
        };

        // legacy errors nest the message under `error.message`
        let message = raw
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| raw.pointer("/error/message").and_then(Value::as_str))
            .map(str::to_string);

        let data = match raw.get("data") {
            None | Some(Value::Null) => None,
            Some(v) => Some(T::deserialize(v.clone()).map_err(<D::Error as serde::de::Error>::custom)?),
        };

        Ok(Self {
            status,
            message,
            data,
        })
    }
}
