//! MQTT adapter error types.

use pumphouse_domain::error::PumphouseError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client returned an error.
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),

    /// Failed to parse an incoming payload as a sensor value.
    #[error("unparseable MQTT payload on {topic}")]
    PayloadParse { topic: String },
}

impl From<MqttError> for PumphouseError {
    fn from(err: MqttError) -> Self {
        Self::Storage(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_payload_parse_error_with_topic() {
        let err = MqttError::PayloadParse {
            topic: "pumphouse/temperature".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unparseable MQTT payload on pumphouse/temperature"
        );
    }

    #[test]
    fn should_convert_to_storage_error() {
        let err: PumphouseError = MqttError::PayloadParse {
            topic: "t".to_string(),
        }
        .into();
        assert!(matches!(err, PumphouseError::Storage(_)));
    }
}
