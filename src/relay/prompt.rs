/// Builds the completion prompt for augmented chat.
///
/// `history` is the formatted transcript of the turns before `query` and
/// already ends in a newline when non-empty.
pub fn build_augmented_prompt(context: &str, history: &str, query: &str) -> String {
    let mut prompt = String::with_capacity(context.len() + history.len() + query.len() + 128);
    prompt.push_str("Given these documents and the conversation so far, answer the question.\n");
    prompt.push_str("Documents:\n");
    prompt.push_str(context.trim_end());
    prompt.push('\n');
    prompt.push_str("Conversation:\n");
    prompt.push_str(history);
    prompt.push_str("Question: ");
    prompt.push_str(query);
    prompt.push('\n');
    prompt.push_str("Answer:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_embeds_context_history_and_question() {
        let prompt = build_augmented_prompt(
            "doc one\n\ndoc two\n",
            "User: hi\nAssistant: hello\n",
            "why?",
        );

        assert_eq!(
            prompt,
            "Given these documents and the conversation so far, answer the question.\n\
             Documents:\n\
             doc one\n\n\
             doc two\n\
             Conversation:\n\
             User: hi\n\
             Assistant: hello\n\
             Question: why?\n\
             Answer:"
        );
    }

    #[test]
    fn first_turn_has_empty_conversation_section() {
        let prompt = build_augmented_prompt("foo", "", "hi");
        assert!(prompt.contains("Documents:\nfoo\nConversation:\nQuestion: hi\nAnswer:"));
    }
}
