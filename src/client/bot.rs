//! Auto-reply rules for the helper bot.

use chrono::Local;

use crate::relay::{ClientEvent, Destination, ServerEvent};

/// Whether a message text mentions the bot.
fn mentions_bot(text: &str) -> bool {
    text.to_lowercase().contains("@bot")
}

/// The helper bot's reply rule.
///
/// Replies when someone else mentions the bot: a mention in a DM is
/// answered with a DM back to the sender, a mention in a room is
/// answered in that room. Everything else is ignored.
pub fn reply_to(event: &ServerEvent, bot_user_id: &str) -> Option<ClientEvent> {
    let ServerEvent::Message(message) = event else {
        return None;
    };
    if message.from_user_id == bot_user_id || !mentions_bot(&message.text) {
        return None;
    }

    let text = format!(
        "Hi! You mentioned me. Time: {}",
        Local::now().format("%H:%M:%S")
    );
    Some(match &message.destination {
        Destination::Direct { .. } => ClientEvent::SendMessage {
            text,
            to_user_id: Some(message.from_user_id.clone()),
            room: None,
        },
        Destination::Room { room } => ClientEvent::SendMessage {
            text,
            to_user_id: None,
            room: Some(room.clone()),
        },
    })
}
