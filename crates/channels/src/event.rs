/// Content of an operator reply: plain text, or a photo with an optional
/// caption.
#[derive(Debug, Clone)]
pub enum ReplyContent {
    Text(String),
    Photo {
        file_id: String,
        caption: String,
    },
}

/// One inbound platform event, classified for the relay.
///
/// `user_id` is the sender's chat id rendered as a string; display names
/// fall back to "Unknown" at classification time, so they are always
/// present here.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    /// A private text message from an end user.
    UserText {
        user_id: String,
        display_name: String,
        text: String,
    },
    /// A private photo from an end user.
    UserPhoto {
        user_id: String,
        display_name: String,
        file_id: String,
        caption: String,
    },
    /// The operator replied to a previously forwarded message. The quoted
    /// text carries the correlation marker for the original sender.
    OperatorReply {
        quoted_text: String,
        content: ReplyContent,
    },
}
