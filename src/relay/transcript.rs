use crate::upstream::types::{ChatMessage, Role};

/// Flattens chat turns into `User: ...` / `Assistant: ...` lines.
///
/// Messages with any other role are skipped. Content is copied verbatim.
pub fn format_messages(messages: &[ChatMessage]) -> String {
    let mut transcript = String::new();
    for msg in messages {
        let label = match msg.role() {
            Some(Role::User) => "User",
            Some(Role::Assistant) => "Assistant",
            None => continue,
        };
        transcript.push_str(label);
        transcript.push_str(": ");
        transcript.push_str(&msg.content);
        transcript.push('\n');
    }
    transcript
}
