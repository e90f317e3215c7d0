//! JSON decoding of push frames.

use chainview_core::error::AppError;

use super::types::PushEvent;
use super::validator::validate_inbound;

/// Validate and decode one inbound frame.
pub fn decode_event(raw: &str, max_bytes: usize) -> Result<PushEvent, AppError> {
    validate_inbound(raw, max_bytes)?;
    Ok(serde_json::from_str(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainview_core::error::ErrorKind;

    const MAX: usize = 65_536;

    #[test]
    fn test_decodes_read_event_with_summary() {
        let raw = r#"{
            "type": "notification_read",
            "notification_ids": ["n1", "n2"],
            "summary": { "total_count": 3, "unread_count": 1, "last_updated": "2026-03-01T10:00:00Z" },
            "timestamp": "2026-03-01T10:00:01Z"
        }"#;
        let event = decode_event(raw, MAX).unwrap();
        assert_eq!(event.event_type(), "notification_read");
        assert_eq!(event.summary().map(|s| s.unread_count), Some(1));
        assert!(event.timestamp().is_some());
    }

    #[test]
    fn test_decodes_new_notification_without_summary() {
        let raw = r#"{
            "type": "new_notification",
            "notification": {
                "id": "n7", "user_id": "u1", "company_id": "c1",
                "type": "system_alert", "title": "Maintenance", "message": "Tonight",
                "priority": "high", "status": "unread",
                "created_at": "2026-03-01T10:00:00Z"
            }
        }"#;
        let event = decode_event(raw, MAX).unwrap();
        assert!(event.summary().is_none());
        match event {
            PushEvent::NewNotification { notification, .. } => {
                assert_eq!(notification.id.as_str(), "n7");
                assert!(notification.is_high_priority());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_type_and_garbage() {
        let err = decode_event(r#"{"type":"presence_change"}"#, MAX).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
        assert!(decode_event("not json", MAX).is_err());
        assert_eq!(decode_event("   ", MAX).unwrap_err().kind, ErrorKind::Validation);
    }

    #[test]
    fn test_rejects_oversized_frame() {
        let raw = format!(r#"{{"type":"summary_updated","pad":"{}"}}"#, "x".repeat(64));
        assert_eq!(decode_event(&raw, 32).unwrap_err().kind, ErrorKind::Validation);
    }
}
