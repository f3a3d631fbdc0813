//! Fixed prompt templates for the retrieval-augmented flows. The wording
//! is product copy; the contract is the shape: retrieved context block,
//! then the question, then an answer slot.

pub const SUMMARY_QUESTION: &str =
    "Summarize this lesson for me. I am a teacher and need to understand it quickly. \
     Put it in bullet points.";

pub fn lesson_summary_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following context to summarize the lesson for a teacher.\n\
         Provide bullet points only, keeping the answer concise.\n\
         If you don't know the answer, say you don't know.\n\n\
         Context:\n{}\n\n\
         Question: {}\n\n\
         Helpful Answer:",
        context, question
    )
}

pub fn wellness_prompt(context: &str, history: &str, question: &str) -> String {
    let history_block = if history.is_empty() {
        String::new()
    } else {
        format!("Conversation so far:\n{}\n\n", history)
    };

    format!(
        "Use the following pieces of context to answer the question at the end.\n\
         Use three sentences maximum. Ask clarifying questions to better understand \
         the problem. Be empathetic and understanding; you are counselling teachers.\n\n\
         Context:\n{}\n\n\
         {}Question: {}\n\n\
         Helpful Answer:",
        context, history_block, question
    )
}

/// Retrieved chunks joined into one context block, retrieval order kept.
pub fn assemble_context(chunks: &[String]) -> String {
    chunks.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_prompt_carries_context_and_question() {
        let prompt = lesson_summary_prompt("photosynthesis happens in chloroplasts", "what is it?");
        assert!(prompt.contains("photosynthesis happens in chloroplasts"));
        assert!(prompt.contains("Question: what is it?"));
        assert!(prompt.contains("bullet points"));
    }

    #[test]
    fn wellness_prompt_includes_history_only_when_present() {
        let bare = wellness_prompt("ctx", "", "I feel stressed");
        assert!(!bare.contains("Conversation so far"));

        let with_history = wellness_prompt("ctx", "user: hi\nassistant: hello", "I feel stressed");
        assert!(with_history.contains("Conversation so far"));
        assert!(with_history.contains("assistant: hello"));
    }

    #[test]
    fn context_preserves_retrieval_order() {
        let chunks = vec!["first".to_string(), "second".to_string()];
        let context = assemble_context(&chunks);
        assert!(context.find("first").unwrap() < context.find("second").unwrap());
    }
}
