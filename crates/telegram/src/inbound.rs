use {
    teloxide::types::{Message, Update, UpdateKind},
    tracing::debug,
};

use relaydesk_channels::{InboundEvent, ReplyContent};

/// Classify a webhook update into a relayable event.
///
/// Returns `None` for update kinds the relay does not handle (edits,
/// channel posts, non-private chats, unsupported media). The operator's
/// own private messages fall through to the user branches unless they
/// reply to a forwarded message.
pub fn classify_update(update: &Update, forward_to_id: &str) -> Option<InboundEvent> {
    let UpdateKind::Message(msg) = &update.kind else {
        debug!(update_id = update.id.0, "ignoring non-message update");
        return None;
    };

    let chat_id = msg.chat.id.0.to_string();

    if chat_id == forward_to_id {
        if let Some(quoted) = msg.reply_to_message() {
            return classify_operator_reply(msg, quoted);
        }
    }

    if !msg.chat.is_private() {
        return None;
    }

    let display_name = msg
        .chat
        .first_name()
        .unwrap_or("Unknown")
        .to_string();

    if let Some(text) = msg.text() {
        return Some(InboundEvent::UserText {
            user_id: chat_id,
            display_name,
            text: text.to_string(),
        });
    }

    if let Some(file_id) = largest_photo_id(msg) {
        return Some(InboundEvent::UserPhoto {
            user_id: chat_id,
            display_name,
            file_id,
            caption: msg.caption().unwrap_or_default().to_string(),
        });
    }

    None
}

fn classify_operator_reply(msg: &Message, quoted: &Message) -> Option<InboundEvent> {
    // The forwarded message embeds the correlation marker in its caption
    // (photos) or text.
    let quoted_text = quoted
        .caption()
        .or_else(|| quoted.text())
        .unwrap_or_default()
        .to_string();

    let content = if let Some(file_id) = largest_photo_id(msg) {
        ReplyContent::Photo {
            file_id,
            caption: msg.caption().unwrap_or_default().to_string(),
        }
    } else if let Some(text) = msg.text() {
        ReplyContent::Text(text.to_string())
    } else {
        return None;
    };

    Some(InboundEvent::OperatorReply {
        quoted_text,
        content,
    })
}

/// File id of the largest photo size (last in Telegram's array).
fn largest_photo_id(msg: &Message) -> Option<String> {
    msg.photo()
        .and_then(|sizes| sizes.last())
        .map(|ps| ps.file.id.clone())
}
