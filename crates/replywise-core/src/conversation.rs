//! The conversation log and its suggestion/refinement lifecycle.
//!
//! A generation can be driven in one call with the async `submit_*`
//! methods, or split in two for front ends that run the request on a
//! background task: `begin_*` validates and moves to `Generating`,
//! [`Conversation::finish`] applies the outcome.

use chrono::Utc;

use crate::ai::{ReplyGenerator, ReplyRequest};
use crate::error::{GenerateError, ReplyError, ValidationError};
use crate::model::{Goal, Message, MessageKind, Role};

/// Canned refinement instructions offered next to the free-text box
pub const QUICK_REFINEMENTS: [&str; 5] = [
    "Make it shorter",
    "More formal",
    "Be friendlier",
    "Add urgency",
    "Softer tone",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Generating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    /// Draft a reply to a freshly received message
    Reply,
    /// Rewrite the latest suggestion following an instruction
    Refinement,
}

/// A request that has been started but not yet finished
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    kind: GenerationKind,
    epoch: u64,
    request: ReplyRequest,
}

impl PendingGeneration {
    pub fn kind(&self) -> GenerationKind {
        self.kind
    }

    pub fn request(&self) -> &ReplyRequest {
        &self.request
    }
}

/// What [`Conversation::finish`] did with a successful reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Appended(Message),
    Replaced(Message),
    /// The conversation was cleared while the request was in flight
    Discarded,
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    selected_role: Option<Role>,
    selected_goal: Option<Goal>,
    phase: Phase,
    refinement_open: bool,
    // Bumped by clear() so late completions can be recognised
    epoch: u64,
    next_seq: u64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            selected_role: None,
            selected_goal: None,
            phase: Phase::Idle,
            refinement_open: false,
            epoch: 0,
            next_seq: 0,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn selected_role(&self) -> Option<&Role> {
        self.selected_role.as_ref()
    }

    pub fn selected_goal(&self) -> Option<&Goal> {
        self.selected_goal.as_ref()
    }

    pub fn select_role(&mut self, role: Option<Role>) {
        self.selected_role = role;
    }

    pub fn select_goal(&mut self, goal: Option<Goal>) {
        self.selected_goal = goal;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_generating(&self) -> bool {
        self.phase == Phase::Generating
    }

    pub fn is_refinement_open(&self) -> bool {
        self.refinement_open
    }

    /// The last suggested message, the only one that can be refined
    pub fn latest_suggestion(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_suggestion())
    }

    pub fn latest_suggestion_index(&self) -> Option<usize> {
        self.messages.iter().rposition(|m| m.is_suggestion())
    }

    pub fn request_regeneration(&mut self) {
        self.refinement_open = true;
    }

    pub fn cancel_refinement(&mut self) {
        self.refinement_open = false;
    }

    /// Drop every message. The selected role and goal are kept.
    pub fn clear(&mut self) {
        tracing::debug!(messages = self.messages.len(), "conversation cleared");
        self.messages.clear();
        self.refinement_open = false;
        self.phase = Phase::Idle;
        self.epoch += 1;
    }

    /// Append a received message and, when role and goal are set, start
    /// drafting a reply to it.
    ///
    /// The message is kept even when a missing role or goal stops the
    /// generation from starting.
    pub fn begin_reply(&mut self, text: &str) -> Result<PendingGeneration, ValidationError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        if self.is_generating() {
            return Err(ValidationError::AlreadyGenerating);
        }

        self.push(text.to_string(), MessageKind::Received);

        let request = self.build_request(None)?;
        Ok(self.start(GenerationKind::Reply, request))
    }

    /// Start rewriting the latest suggestion. Closes the refinement prompt.
    pub fn begin_refinement(
        &mut self,
        instruction: &str,
    ) -> Result<PendingGeneration, ValidationError> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(ValidationError::EmptyInstruction);
        }
        if self.is_generating() {
            return Err(ValidationError::AlreadyGenerating);
        }
        if self.messages.is_empty() {
            return Err(ValidationError::NoMessages);
        }

        let request = self.build_request(Some(instruction))?;
        self.refinement_open = false;
        Ok(self.start(GenerationKind::Refinement, request))
    }

    /// Apply the outcome of a pending generation and return to `Idle`.
    ///
    /// Errors leave the log exactly as it was. A refinement with no
    /// suggestion to replace is appended as a new suggestion instead.
    pub fn finish(
        &mut self,
        pending: PendingGeneration,
        result: Result<String, GenerateError>,
    ) -> Result<Completion, GenerateError> {
        if pending.epoch != self.epoch {
            tracing::debug!(kind = ?pending.kind, "discarding stale generation result");
            return Ok(Completion::Discarded);
        }

        self.phase = Phase::Idle;

        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(kind = ?pending.kind, error = %err, "generation failed");
                return Err(err);
            }
        };

        if pending.kind == GenerationKind::Refinement {
            if let Some(idx) = self.latest_suggestion_index() {
                let message = &mut self.messages[idx];
                message.content = reply;
                message.timestamp = Utc::now();
                tracing::debug!(id = %message.id, "suggestion replaced");
                return Ok(Completion::Replaced(message.clone()));
            }
        }

        let message = self.push(reply, MessageKind::Suggested).clone();
        tracing::debug!(id = %message.id, "suggestion appended");
        Ok(Completion::Appended(message))
    }

    pub async fn submit_received_message<G>(
        &mut self,
        text: &str,
        generator: &G,
    ) -> Result<Completion, ReplyError>
    where
        G: ReplyGenerator + ?Sized,
    {
        let pending = self.begin_reply(text)?;
        let result = generator.generate(pending.request()).await;
        Ok(self.finish(pending, result)?)
    }

    pub async fn submit_refinement<G>(
        &mut self,
        instruction: &str,
        generator: &G,
    ) -> Result<Completion, ReplyError>
    where
        G: ReplyGenerator + ?Sized,
    {
        let pending = self.begin_refinement(instruction)?;
        let result = generator.generate(pending.request()).await;
        Ok(self.finish(pending, result)?)
    }

    fn build_request(&self, instruction: Option<&str>) -> Result<ReplyRequest, ValidationError> {
        let role = self
            .selected_role
            .as_ref()
            .ok_or(ValidationError::NoRoleSelected)?;
        let goal = self
            .selected_goal
            .as_ref()
            .ok_or(ValidationError::NoGoalSelected)?;
        Ok(ReplyRequest::new(&self.messages, role, goal, instruction))
    }

    fn start(&mut self, kind: GenerationKind, request: ReplyRequest) -> PendingGeneration {
        tracing::info!(
            kind = ?kind,
            history = request.messages.len(),
            role = %request.role.name,
            goal = %request.goal.label,
            "generation started"
        );
        self.phase = Phase::Generating;
        PendingGeneration {
            kind,
            epoch: self.epoch,
            request,
        }
    }

    fn push(&mut self, content: String, kind: MessageKind) -> &Message {
        self.next_seq += 1;
        let now = Utc::now();
        self.messages.push(Message {
            id: format!("{}-{}", now.timestamp_millis(), self.next_seq),
            content,
            kind,
            timestamp: now,
        });
        &self.messages[self.messages.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{default_goals, default_roles};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Answers with queued results and records every request it sees
    #[derive(Default)]
    struct ScriptedGenerator {
        replies: Mutex<VecDeque<Result<String, GenerateError>>>,
        seen: Mutex<Vec<ReplyRequest>>,
    }

    impl ScriptedGenerator {
        fn answering(replies: Vec<Result<String, GenerateError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }

        fn last_request(&self) -> ReplyRequest {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl ReplyGenerator for ScriptedGenerator {
        async fn generate(&self, request: &ReplyRequest) -> Result<String, GenerateError> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenerateError::EmptyResponse))
        }
    }

    fn role(id: &str) -> Role {
        default_roles().into_iter().find(|r| r.id == id).unwrap()
    }

    fn goal(id: &str) -> Goal {
        default_goals().into_iter().find(|g| g.id == id).unwrap()
    }

    fn ready() -> Conversation {
        let mut conversation = Conversation::new();
        conversation.select_role(Some(role("freelancer")));
        conversation.select_goal(Some(goal("book-call")));
        conversation
    }

    #[tokio::test]
    async fn test_missing_selection_keeps_message_and_skips_generator() {
        let generator = ScriptedGenerator::default();
        let mut conversation = Conversation::new();

        let result = conversation.submit_received_message("hi", &generator).await;

        assert_eq!(
            result,
            Err(ReplyError::Validation(ValidationError::NoRoleSelected))
        );
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].kind, MessageKind::Received);
        assert_eq!(generator.calls(), 0);
        assert_eq!(conversation.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_missing_goal_is_reported() {
        let generator = ScriptedGenerator::default();
        let mut conversation = Conversation::new();
        conversation.select_role(Some(role("student")));

        let result = conversation.submit_received_message("hi", &generator).await;
        assert_eq!(
            result,
            Err(ReplyError::Validation(ValidationError::NoGoalSelected))
        );
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_message_is_ignored() {
        let generator = ScriptedGenerator::default();
        let mut conversation = ready();

        let result = conversation.submit_received_message("   \n\t", &generator).await;
        assert_eq!(
            result,
            Err(ReplyError::Validation(ValidationError::EmptyMessage))
        );
        assert!(conversation.messages().is_empty());
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_received_message_produces_one_suggestion() {
        let generator = ScriptedGenerator::answering(vec![Ok("Sure, Tuesday works...".to_string())]);
        let mut conversation = ready();

        let pending = conversation.begin_reply("Can we meet Tuesday?").unwrap();
        assert!(conversation.is_generating());
        assert_eq!(pending.kind(), GenerationKind::Reply);
        assert_eq!(pending.request().messages.len(), 1);
        assert_eq!(pending.request().role.name, "Freelancer");
        assert_eq!(pending.request().refinement_instruction, None);

        let result = generator.generate(pending.request()).await;
        let completion = conversation.finish(pending, result).unwrap();

        assert!(matches!(completion, Completion::Appended(_)));
        assert_eq!(conversation.phase(), Phase::Idle);

        let messages = conversation.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].kind, MessageKind::Received);
        assert_eq!(messages[0].content, "Can we meet Tuesday?");
        assert_eq!(messages[1].kind, MessageKind::Suggested);
        assert_eq!(messages[1].content, "Sure, Tuesday works...");
        assert_ne!(messages[0].id, messages[1].id);
    }

    #[tokio::test]
    async fn test_refinement_replaces_latest_suggestion_in_place() {
        let generator = ScriptedGenerator::answering(vec![Ok("X".to_string()), Ok("Y".to_string())]);
        let mut conversation = ready();
        conversation
            .submit_received_message("Can we meet Tuesday?", &generator)
            .await
            .unwrap();

        let before = conversation.latest_suggestion().unwrap().clone();
        assert_eq!(before.content, "X");
        let len = conversation.messages().len();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        conversation.request_regeneration();
        assert!(conversation.is_refinement_open());

        let completion = conversation
            .submit_refinement("make it shorter", &generator)
            .await
            .unwrap();

        let after = conversation.latest_suggestion().unwrap();
        assert!(matches!(completion, Completion::Replaced(_)));
        assert_eq!(conversation.messages().len(), len);
        assert_eq!(after.id, before.id);
        assert_eq!(after.content, "Y");
        assert!(after.timestamp > before.timestamp);
        assert!(!conversation.is_refinement_open());

        let request = generator.last_request();
        assert_eq!(request.refinement_instruction.as_deref(), Some("make it shorter"));
        assert_eq!(request.messages.len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_leaves_only_received_message() {
        let generator = ScriptedGenerator::answering(vec![Err(GenerateError::RateLimited)]);
        let mut conversation = ready();

        let result = conversation
            .submit_received_message("Can we meet Tuesday?", &generator)
            .await;

        assert_eq!(result, Err(ReplyError::Generate(GenerateError::RateLimited)));
        assert_eq!(conversation.messages().len(), 1);
        assert_eq!(conversation.messages()[0].kind, MessageKind::Received);
        assert_eq!(conversation.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_failed_refinement_keeps_suggestion() {
        let generator = ScriptedGenerator::answering(vec![
            Ok("Original".to_string()),
            Err(GenerateError::QuotaExhausted),
        ]);
        let mut conversation = ready();
        conversation.submit_received_message("hello", &generator).await.unwrap();
        let before = conversation.messages().to_vec();

        let result = conversation.submit_refinement("Softer tone", &generator).await;

        assert_eq!(result, Err(ReplyError::Generate(GenerateError::QuotaExhausted)));
        assert_eq!(conversation.messages(), before.as_slice());
        assert!(!conversation.is_generating());
    }

    #[tokio::test]
    async fn test_refinement_validation_order() {
        let generator = ScriptedGenerator::default();
        let mut conversation = Conversation::new();

        assert_eq!(
            conversation.submit_refinement("  ", &generator).await,
            Err(ReplyError::Validation(ValidationError::EmptyInstruction))
        );
        assert_eq!(
            conversation.submit_refinement("shorter", &generator).await,
            Err(ReplyError::Validation(ValidationError::NoMessages))
        );

        let _ = conversation.begin_reply("hi");
        assert_eq!(
            conversation.submit_refinement("shorter", &generator).await,
            Err(ReplyError::Validation(ValidationError::NoRoleSelected))
        );

        conversation.select_role(Some(role("manager")));
        assert_eq!(
            conversation.submit_refinement("shorter", &generator).await,
            Err(ReplyError::Validation(ValidationError::NoGoalSelected))
        );
        assert_eq!(generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_refinement_without_suggestion_appends() {
        let generator = ScriptedGenerator::answering(vec![
            Err(GenerateError::Transport("offline".to_string())),
            Ok("Fresh draft".to_string()),
        ]);
        let mut conversation = ready();
        let _ = conversation.submit_received_message("hi there", &generator).await;
        assert!(conversation.latest_suggestion().is_none());

        let completion = conversation
            .submit_refinement(QUICK_REFINEMENTS[2], &generator)
            .await
            .unwrap();

        assert!(matches!(completion, Completion::Appended(_)));
        assert_eq!(conversation.messages().len(), 2);
        assert_eq!(conversation.latest_suggestion().unwrap().content, "Fresh draft");
    }

    #[test]
    fn test_second_generation_is_rejected_while_busy() {
        let mut conversation = ready();
        let _pending = conversation.begin_reply("first").unwrap();

        assert_eq!(
            conversation.begin_reply("second").unwrap_err(),
            ValidationError::AlreadyGenerating
        );
        assert_eq!(
            conversation.begin_refinement("shorter").unwrap_err(),
            ValidationError::AlreadyGenerating
        );
        assert_eq!(conversation.messages().len(), 1);
    }

    #[test]
    fn test_result_after_clear_is_discarded() {
        let mut conversation = ready();
        let pending = conversation.begin_reply("hello").unwrap();

        conversation.clear();
        let next = conversation.begin_reply("again").unwrap();

        let stale = conversation.finish(pending, Ok("late".to_string())).unwrap();
        assert_eq!(stale, Completion::Discarded);
        assert!(conversation.is_generating());
        assert_eq!(conversation.messages().len(), 1);

        conversation.finish(next, Ok("on time".to_string())).unwrap();
        assert_eq!(conversation.messages().len(), 2);
        assert!(!conversation.is_generating());
    }

    #[test]
    fn test_clear_is_idempotent_and_keeps_selection() {
        let mut conversation = ready();
        let _ = conversation.begin_reply("hello");
        conversation.request_regeneration();

        conversation.clear();
        let messages_once = conversation.messages().to_vec();
        let phase_once = conversation.phase();
        let open_once = conversation.is_refinement_open();

        conversation.clear();
        assert_eq!(conversation.messages(), messages_once.as_slice());
        assert_eq!(conversation.phase(), phase_once);
        assert_eq!(conversation.is_refinement_open(), open_once);

        assert!(conversation.messages().is_empty());
        assert_eq!(conversation.phase(), Phase::Idle);
        assert!(!conversation.is_refinement_open());
        assert_eq!(conversation.selected_role().unwrap().id, "freelancer");
        assert_eq!(conversation.selected_goal().unwrap().id, "book-call");
    }

    #[test]
    fn test_request_and_cancel_refinement_only_toggle_flag() {
        let mut conversation = ready();
        conversation.request_regeneration();
        assert!(conversation.is_refinement_open());
        assert!(!conversation.is_generating());
        conversation.cancel_refinement();
        assert!(!conversation.is_refinement_open());
        assert!(conversation.messages().is_empty());
    }

    #[test]
    fn test_latest_suggestion_is_highest_suggested_index() {
        let patterns: [&[MessageKind]; 5] = [
            &[MessageKind::Received],
            &[MessageKind::Received, MessageKind::Suggested],
            &[MessageKind::Received, MessageKind::Suggested, MessageKind::Received],
            &[
                MessageKind::Received,
                MessageKind::Suggested,
                MessageKind::Received,
                MessageKind::Suggested,
            ],
            &[MessageKind::Suggested, MessageKind::Suggested, MessageKind::Received],
        ];

        for pattern in patterns {
            let mut conversation = Conversation::new();
            for (i, kind) in pattern.iter().enumerate() {
                conversation.push(format!("m{}", i), *kind);
            }

            let expected = pattern.iter().rposition(|k| *k == MessageKind::Suggested);
            assert_eq!(conversation.latest_suggestion_index(), expected);
            assert_eq!(
                conversation.latest_suggestion().map(|m| m.content.clone()),
                expected.map(|i| format!("m{}", i))
            );
        }
    }
}
