//! Per-session turn handling.
//!
//! The first submission of a session is a video URL: it is resolved, its
//! transcript fetched and wrapped in the summarization prompt. Every later
//! submission is a follow-up question sent to the model as-is, together with
//! the session's history.

use log::{debug, info};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ChatError, Result};
use crate::fetcher::TranscriptFetcher;
use crate::llm::ChatModel;
use crate::memory::MemoryStore;
use crate::prompt::build_prompt;
use crate::resolver::resolve;
use crate::youtube::CaptionService;
use crate::ContentType;

/// One completed question/answer exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    /// What the user typed
    pub question: String,
    /// What the model was sent
    pub input: String,
    pub answer: String,
}

pub struct Conversation<S, M, H> {
    session_id: String,
    fetcher: TranscriptFetcher<S>,
    model: M,
    memory: H,
}

impl<S, M, H> Conversation<S, M, H>
where
    S: CaptionService,
    M: ChatModel,
    H: MemoryStore,
{
    pub fn new(fetcher: TranscriptFetcher<S>, model: M, memory: H) -> Self {
        Self::with_session_id(Uuid::new_v4().to_string(), fetcher, model, memory)
    }

    pub fn with_session_id(session_id: impl Into<String>, fetcher: TranscriptFetcher<S>, model: M, memory: H) -> Self {
        Conversation {
            session_id: session_id.into(),
            fetcher,
            model,
            memory,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn history(&self) -> Vec<Turn> {
        self.memory.get(&self.session_id)
    }

    /// True until the first turn has been answered
    pub fn awaiting_url(&self) -> bool {
        self.history().is_empty()
    }

    /// Handle one submission. Returns `Ok(None)` for blank input.
    ///
    /// Memory is only touched once the model has answered.
    pub async fn submit(&mut self, input: &str) -> Result<Option<Turn>> {
        let question = input.trim();
        if question.is_empty() {
            return Ok(None);
        }

        let history = self.history();
        let model_input = if history.is_empty() {
            self.summary_prompt(question).await?
        } else {
            debug!("Follow-up question for session {}", self.session_id);
            question.to_string()
        };

        let answer = self.model.complete(&history, &model_input).await?;

        let turn = Turn {
            question: question.to_string(),
            input: model_input,
            answer,
        };
        self.memory.append(&self.session_id, turn.clone());
        Ok(Some(turn))
    }

    /// Forget the conversation; the next submission is treated as a new URL
    pub fn reset(&mut self) {
        info!("Clearing memory for session {}", self.session_id);
        self.memory.clear(&self.session_id);
    }

    async fn summary_prompt(&self, url: &str) -> Result<String> {
        let (video_id, content_type) = resolve(url)?;
        let transcript = match content_type {
            ContentType::YouTube => self.fetcher.fetch(&video_id).await?,
        };

        match transcript {
            Some(text) => Ok(build_prompt(&text)),
            None => Err(ChatError::NoSupportedLanguage {
                video_id: video_id.to_string(),
                languages: self.fetcher.languages().to_vec(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::fetcher::tests::FakeCaptions;
    use crate::memory::InMemoryStore;

    /// Echoes the input back and records what it was called with
    #[derive(Default)]
    struct FakeModel {
        calls: Mutex<Vec<(usize, String)>>,
        fail_with: Option<ChatError>,
    }

    impl ChatModel for FakeModel {
        async fn complete(&self, history: &[Turn], input: &str) -> Result<String> {
            self.calls.lock().unwrap().push((history.len(), input.to_string()));
            match &self.fail_with {
                Some(e) => Err(e.clone()),
                None => Ok(format!("answer {}", history.len() + 1)),
            }
        }
    }

    fn conversation(captions: FakeCaptions, model: FakeModel) -> Conversation<FakeCaptions, FakeModel, InMemoryStore> {
        Conversation::with_session_id("session-1", TranscriptFetcher::new(captions), model, InMemoryStore::new())
    }

    fn captions() -> FakeCaptions {
        FakeCaptions::default()
            .with_video("abc123", vec![("en", vec!["hello", "world"]), ("de", vec!["hallo", "welt"])])
            .with_video("italian", vec![("it", vec!["ciao"])])
    }

    #[tokio::test]
    async fn test_first_turn_summarizes_transcript() {
        let mut convo = conversation(captions(), FakeModel::default());

        let turn = convo.submit("https://youtu.be/abc123").await.unwrap().unwrap();
        assert_eq!(turn.question, "https://youtu.be/abc123");
        assert_eq!(turn.input, "Summarize the following video:\n hallo welt");
        assert_eq!(turn.answer, "answer 1");
        assert_eq!(convo.history(), vec![turn]);
        assert!(!convo.awaiting_url());
    }

    #[tokio::test]
    async fn test_follow_up_skips_fetch_and_carries_history() {
        let mut convo = conversation(captions(), FakeModel::default());
        convo.submit("https://www.youtube.com/watch?v=abc123").await.unwrap();

        let turn = convo.submit("  What language is it?  ").await.unwrap().unwrap();
        assert_eq!(turn.input, "What language is it?");
        assert_eq!(turn.answer, "answer 2");
        assert_eq!(*convo.fetcher.service().list_calls.lock().unwrap(), 1);
        assert_eq!(convo.model.calls.lock().unwrap()[1], (1, "What language is it?".to_string()));
        assert_eq!(convo.history().len(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_source_leaves_memory_untouched() {
        let mut convo = conversation(captions(), FakeModel::default());

        let err = convo.submit("https://example.com/video").await.unwrap_err();
        assert!(matches!(err, ChatError::UnsupportedSource(_)));
        assert!(convo.awaiting_url());
        assert!(convo.model.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_no_supported_language() {
        let mut convo = conversation(captions(), FakeModel::default());

        let err = convo.submit("https://youtu.be/italian").await.unwrap_err();
        assert_eq!(
            err,
            ChatError::NoSupportedLanguage {
                video_id: "italian".to_string(),
                languages: vec!["de".into(), "fr".into(), "en".into(), "es".into()],
            }
        );
        assert!(convo.awaiting_url());
    }

    #[tokio::test]
    async fn test_transcripts_disabled_is_not_no_content() {
        let fake = FakeCaptions::default().with_error("off", ChatError::TranscriptsDisabled("off".to_string()));
        let mut convo = conversation(fake, FakeModel::default());

        let err = convo.submit("https://youtu.be/off").await.unwrap_err();
        assert_eq!(err, ChatError::TranscriptsDisabled("off".to_string()));
    }

    #[tokio::test]
    async fn test_model_failure_records_nothing() {
        let model = FakeModel {
            fail_with: Some(ChatError::DownstreamModelError("rate limited".to_string())),
            ..Default::default()
        };
        let mut convo = conversation(captions(), model);

        let err = convo.submit("https://youtu.be/abc123").await.unwrap_err();
        assert_eq!(err, ChatError::DownstreamModelError("rate limited".to_string()));
        assert!(convo.history().is_empty());
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let mut convo = conversation(captions(), FakeModel::default());
        assert_eq!(convo.submit("   ").await.unwrap(), None);
        assert!(convo.model.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_starts_over() {
        let mut convo = conversation(captions(), FakeModel::default());
        convo.submit("https://youtu.be/abc123").await.unwrap();

        convo.reset();
        assert!(convo.awaiting_url());

        let turn = convo.submit("https://youtu.be/abc123/").await.unwrap().unwrap();
        assert_eq!(turn.input, "Summarize the following video:\n hallo welt");
        assert_eq!(*convo.fetcher.service().list_calls.lock().unwrap(), 2);
    }

    #[test]
    fn test_new_allocates_session_id() {
        let a = Conversation::new(TranscriptFetcher::new(captions()), FakeModel::default(), InMemoryStore::new());
        let b = Conversation::new(TranscriptFetcher::new(captions()), FakeModel::default(), InMemoryStore::new());
        assert_ne!(a.session_id(), b.session_id());
        assert_eq!(a.session_id().len(), 36);
    }
}
