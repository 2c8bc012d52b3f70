//! Tests for error classification and display.

use std::time::Duration;

use loregate::{ContentCategory, GatewayError};

#[test]
fn backend_errors_count_against_the_circuit() {
    assert!(GatewayError::Timeout(Duration::from_secs(30)).is_circuit_failure());
    assert!(
        GatewayError::Backend {
            status: Some(500),
            message: "boom".to_string()
        }
        .is_circuit_failure()
    );
    assert!(!GatewayError::Cache("down".to_string()).is_circuit_failure());
    assert!(!GatewayError::UnknownCategory("x".to_string()).is_circuit_failure());
    assert!(!GatewayError::QueueOverflow { capacity: 10 }.is_circuit_failure());
}

#[test]
fn configuration_errors_are_classified() {
    assert!(GatewayError::UnknownCategory("x".to_string()).is_configuration());
    assert!(
        GatewayError::InvalidParameters {
            category: "npc".to_string(),
            message: "missing".to_string()
        }
        .is_configuration()
    );
    assert!(!GatewayError::Timeout(Duration::from_secs(1)).is_configuration());
    assert!(!GatewayError::Parse("bad".to_string()).is_configuration());
}

#[test]
fn backend_error_display_includes_status() {
    let err = GatewayError::Backend {
        status: Some(503),
        message: "model is loading".to_string(),
    };
    assert_eq!(err.to_string(), "backend error (503): model is loading");

    let err = GatewayError::Backend {
        status: None,
        message: "connection refused".to_string(),
    };
    assert_eq!(err.to_string(), "backend error (transport): connection refused");
}

#[test]
fn unknown_category_parse_keeps_input() {
    let err = "Dragon".parse::<ContentCategory>().unwrap_err();
    assert_eq!(err.to_string(), "unknown content category: Dragon");
    assert_eq!(" NPC ".parse::<ContentCategory>().unwrap(), ContentCategory::Npc);
}

#[test]
fn json_errors_convert() {
    let err: GatewayError = serde_json::from_str::<serde_json::Value>("{")
        .unwrap_err()
        .into();
    assert!(matches!(err, GatewayError::Json(_)));
}
