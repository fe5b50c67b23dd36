//! Wire protocol events.
//!
//! One JSON object per WebSocket text frame, tagged with `event` and
//! carrying camelCase payload fields. Missing `register` fields
//! deserialize to empty strings so the registry's ignore-malformed-input
//! policy applies uniformly to absent and empty values.

use serde::{Deserialize, Serialize};

use super::message::{Message, PresenceEvent};

/// Events received from clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Claim a logical identity for this connection.
    #[serde(rename_all = "camelCase")]
    Register {
        #[serde(default)]
        user_id: String,
        #[serde(default)]
        username: String,
    },
    /// Ephemeral typing notice, to a user or a room.
    #[serde(rename_all = "camelCase")]
    Typing {
        #[serde(default)]
        to_user_id: Option<String>,
        #[serde(default)]
        room: Option<String>,
    },
    /// Create and route a chat message.
    #[serde(rename_all = "camelCase")]
    SendMessage {
        #[serde(default)]
        text: String,
        #[serde(default)]
        to_user_id: Option<String>,
        #[serde(default)]
        room: Option<String>,
    },
}

/// Events delivered to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Recent message replay, sent once after a successful register.
    History { messages: Vec<Message> },
    /// Join/leave notification.
    Presence(PresenceEvent),
    /// Relayed typing notice.
    #[serde(rename_all = "camelCase")]
    Typing { from_user_id: String },
    /// A routed chat message.
    Message(Message),
    /// Delivery acknowledgement, sent only to the sender of a DM.
    #[serde(rename = "message:ack")]
    MessageAck { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::message::PresenceKind;

    #[test]
    fn test_register_deserialize() {
        let json = r#"{"event": "register", "userId": "u1", "username": "Alice"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::Register {
                user_id: "u1".to_string(),
                username: "Alice".to_string(),
            }
        );
    }

    #[test]
    fn test_register_missing_fields_default_to_empty() {
        let json = r#"{"event": "register"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            ClientEvent::Register {
                user_id: String::new(),
                username: String::new(),
            }
        );
    }

    #[test]
    fn test_typing_deserialize() {
        let json = r#"{"event": "typing", "toUserId": "u2"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        match event {
            ClientEvent::Typing { to_user_id, room } => {
                assert_eq!(to_user_id.as_deref(), Some("u2"));
                assert!(room.is_none());
            }
            other => panic!("expected typing, got {other:?}"),
        }
    }

    #[test]
    fn test_send_message_deserialize() {
        let json = r#"{"event": "send_message", "text": "hi", "room": "global"}"#;
        let event: ClientEvent = serde_json::from_str(json).unwrap();
        match event {
            ClientEvent::SendMessage { text, to_user_id, room } => {
                assert_eq!(text, "hi");
                assert!(to_user_id.is_none());
                assert_eq!(room.as_deref(), Some("global"));
            }
            other => panic!("expected send_message, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_event_is_rejected() {
        let json = r#"{"event": "shutdown"}"#;
        assert!(serde_json::from_str::<ClientEvent>(json).is_err());
    }

    #[test]
    fn test_history_serialize() {
        let event = ServerEvent::History {
            messages: vec![Message::room("u1", "global", "hi")],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "history");
        assert_eq!(json["messages"][0]["text"], "hi");
    }

    #[test]
    fn test_presence_payload_is_flattened() {
        let event = ServerEvent::Presence(PresenceEvent::join("u1", "Alice"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "presence");
        assert_eq!(json["type"], "join");
        assert_eq!(json["userId"], "u1");
    }

    #[test]
    fn test_message_payload_is_flattened() {
        let event = ServerEvent::Message(Message::direct("u1", "u2", "psst"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "message");
        assert_eq!(json["fromUserId"], "u1");
        assert_eq!(json["toUserId"], "u2");
    }

    #[test]
    fn test_message_ack_event_name() {
        let event = ServerEvent::MessageAck { id: "123-abc".to_string() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "message:ack");
        assert_eq!(json["id"], "123-abc");
    }

    #[test]
    fn test_server_event_roundtrip() {
        let events = vec![
            ServerEvent::History { messages: vec![] },
            ServerEvent::Presence(PresenceEvent::leave("u1", "Alice")),
            ServerEvent::Typing { from_user_id: "u1".to_string() },
            ServerEvent::Message(Message::room("u1", "global", "hi")),
            ServerEvent::MessageAck { id: "1-1".to_string() },
        ];
        for event in events {
            let json = serde_json::to_string(&event).unwrap();
            let back: ServerEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(back, event);
        }
    }

    #[test]
    fn test_presence_leave_kind() {
        let event = ServerEvent::Presence(PresenceEvent::leave("u1", "Alice"));
        match event {
            ServerEvent::Presence(presence) => assert_eq!(presence.kind, PresenceKind::Leave),
            other => panic!("expected presence, got {other:?}"),
        }
    }
}
