use relaydesk_channels::{Error, Result};

/// Delimiter embedded in every operator-facing forwarded message.
const ID_MARKER: &str = "ID:";

/// Extract the target user id from the text of a quoted forwarded
/// message.
///
/// The forward formats (`forward_text`, `forward_photo_caption`) embed
/// `"(ID: <id>)"`; the substring between the `ID:` marker and the next
/// `)`, trimmed, is the id. A quoted message without the marker cannot
/// be correlated and no relay is attempted.
pub fn extract_target_id(quoted_text: &str) -> Result<String> {
    let (_, after) = quoted_text
        .split_once(ID_MARKER)
        .ok_or_else(|| Error::correlation("no user id marker in quoted message"))?;

    let id = after
        .split_once(')')
        .map_or(after, |(before, _)| before)
        .trim();

    if id.is_empty() {
        return Err(Error::correlation("empty user id in quoted message"));
    }
    Ok(id.to_string())
}

/// Forward format for a user text message, carrying the correlation
/// marker for the operator's eventual reply.
pub fn forward_text(display_name: &str, user_id: &str, text: &str) -> String {
    format!("User {display_name} (ID: {user_id}) says:\n{text}")
}

/// Forward caption for a user photo.
pub fn forward_photo_caption(display_name: &str, user_id: &str, caption: &str) -> String {
    format!("User {display_name} (ID: {user_id}) sent a photo: {caption}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_text_forward() {
        let forwarded = forward_text("Alice", "12345", "hi there");
        assert_eq!(extract_target_id(&forwarded).unwrap(), "12345");
    }

    #[test]
    fn round_trips_through_photo_caption() {
        let caption = forward_photo_caption("Bob", "98765", "look at this");
        assert_eq!(extract_target_id(&caption).unwrap(), "98765");
    }

    #[test]
    fn missing_marker_fails() {
        let err = extract_target_id("just some ordinary text").unwrap_err();
        assert!(matches!(
            err,
            Error::Correlation { .. }
        ));
    }

    #[test]
    fn missing_terminator_takes_remainder() {
        assert_eq!(extract_target_id("blah ID: 42").unwrap(), "42");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        assert_eq!(extract_target_id("(ID:   7 )").unwrap(), "7");
    }

    #[test]
    fn empty_id_fails() {
        assert!(extract_target_id("(ID: )").is_err());
    }
}
