//! Provider-specific transcript sanitization.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::{Message, Role, SEED_AUTHOR};

const MAX_NAME_LEN: usize = 64;

fn invalid_name_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]+").expect("static regex"))
}

/// Turn a display name into a chat `name` field (`[A-Za-z0-9_-]{1,64}`).
///
/// Returns `None` when nothing usable is left.
pub fn participant_name(author: &str) -> Option<String> {
    let replaced = invalid_name_chars().replace_all(author.trim(), "_");
    let trimmed = replaced.trim_matches('_');
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(MAX_NAME_LEN).collect())
}

/// Name to attach to a history message, if any.
///
/// System messages and the seed never carry a participant name.
pub fn name_for_message(message: &Message) -> Option<String> {
    if message.role == Role::System || message.author == SEED_AUTHOR {
        return None;
    }
    participant_name(&message.author)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_and_punctuation_collapse_to_underscores() {
        assert_eq!(
            participant_name("product manager").as_deref(),
            Some("product_manager")
        );
        assert_eq!(participant_name("Dev (lead)!").as_deref(), Some("Dev_lead"));
    }

    #[test]
    fn unusable_names_are_dropped() {
        assert_eq!(participant_name("  "), None);
        assert_eq!(participant_name("???"), None);
    }

    #[test]
    fn long_names_are_truncated() {
        let name = participant_name(&"a".repeat(100)).unwrap();
        assert_eq!(name.len(), MAX_NAME_LEN);
    }

    #[test]
    fn seed_message_has_no_name() {
        assert_eq!(name_for_message(&Message::seed("hello")), None);
        assert_eq!(
            name_for_message(&Message::assistant("customer", "hi")).as_deref(),
            Some("customer")
        );
    }
}
