use log::debug;

/// Instruction placed ahead of every transcript
pub const SUMMARY_INSTRUCTION: &str = "Summarize the following video:\n";

/// Build the summarization prompt for a transcript. The transcript is never truncated.
pub fn build_prompt(transcript: &str) -> String {
    debug!("Building prompt from {} byte transcript", transcript.len());

    let mut prompt = String::with_capacity(SUMMARY_INSTRUCTION.len() + 1 + transcript.len());
    prompt.push_str(SUMMARY_INSTRUCTION);
    prompt.push(' ');
    prompt.push_str(transcript);
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt() {
        assert_eq!(
            build_prompt("hallo welt"),
            "Summarize the following video:\n hallo welt"
        );
    }

    #[test]
    fn test_build_prompt_keeps_long_transcripts() {
        let transcript = "word ".repeat(200_000);
        let prompt = build_prompt(&transcript);
        assert!(prompt.ends_with(&transcript));
        assert_eq!(prompt.len(), SUMMARY_INSTRUCTION.len() + 1 + transcript.len());
    }
}
