pub mod heartbeat;
pub mod readings;

pub use heartbeat::handle_heartbeat;
pub use readings::{handle_reading, reading_worker};

use crate::shared::errors::{AppError, ErrorType};
use serde::{de::DeserializeOwned, Deserialize};

/// Payload of every device topic: the module's credentials next to the
/// measurement fields.
#[derive(Debug, Deserialize)]
pub struct DeviceMessage<T> {
    pub device_id: String,
    #[serde(default)]
    pub secret: String,
    #[serde(flatten)]
    pub body: T,
}

pub fn parse_message<T: DeserializeOwned>(payload: &str) -> Result<DeviceMessage<T>, AppError> {
    serde_json::from_str(payload).map_err(|e| {
        AppError::new(
            &format!("Malformed device message: {}", e),
            ErrorType::BadRequest,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::iot::ingest::ReadingInput;

    #[test]
    fn credentials_sit_next_to_the_reading() {
        let message: DeviceMessage<ReadingInput> = parse_message(
            r#"{"device_id":"IOT-1","secret":"s3cret","flow_rate":2.5,"total_volume":10.0}"#,
        )
        .unwrap();
        assert_eq!(message.device_id, "IOT-1");
        assert_eq!(message.secret, "s3cret");
        assert_eq!(message.body.flow_rate, Some(2.5));
        assert_eq!(message.body.total_volume, Some(10.0));
    }

    #[test]
    fn garbage_is_a_bad_request() {
        let err = parse_message::<ReadingInput>("not json").unwrap_err();
        assert_eq!(err.err_type, ErrorType::BadRequest);
    }
}
