//! Turns a [`ReplyRequest`] into the chat transcript sent to a model.
//!
//! From the model's point of view the roles are reversed: messages the
//! user received are the human side of the chat, and replies drafted
//! earlier are the assistant's own turns.

use crate::ai::ReplyRequest;
use crate::model::MessageKind;
use crate::state::ChatMessage;

/// The system directive describing persona, goal and task
pub fn build_directive(request: &ReplyRequest) -> String {
    let role = &request.role;
    let goal = &request.goal;

    let mut prompt = String::new();
    prompt.push_str(
        "You are an expert communication assistant helping someone craft the perfect reply to a message.\n\n",
    );

    prompt.push_str("## Your User's Persona\n");
    prompt.push_str(&format!("- **Role**: {}\n", role.name));
    prompt.push_str(&format!("- **Description**: {}\n", role.description));
    prompt.push_str(&format!("- **Tone**: {}\n", role.tone.as_str()));
    prompt.push_str(&format!(
        "- **Message Length Preference**: {}\n\n",
        role.message_length.as_str()
    ));

    prompt.push_str("## Conversation Goal\n");
    prompt.push_str(&format!("- **Goal**: {}\n", goal.label));
    prompt.push_str(&format!("- **What they want to achieve**: {}\n\n", goal.description));

    prompt.push_str("## Your Task\n");
    prompt.push_str("Generate a reply that:\n");
    prompt.push_str("1. Matches the persona's communication style and tone\n");
    prompt.push_str("2. Works toward achieving the stated goal\n");
    prompt.push_str("3. Sounds natural and human (not robotic or AI-generated)\n");
    prompt.push_str("4. Is appropriate for the relationship and context\n");
    prompt.push_str(&format!(
        "5. Respects the message length preference ({})\n\n",
        role.message_length.guidance()
    ));

    if let Some(instruction) = &request.refinement_instruction {
        prompt.push_str("## Refinement Request\n");
        prompt.push_str(&format!(
            "The user wants you to modify the previous reply: \"{}\"\n\n",
            instruction
        ));
    }

    prompt.push_str(
        "Reply ONLY with the message text itself. No quotes, no explanations, no preamble. Just the reply they should send.",
    );

    prompt
}

/// Directive, then the conversation, then the refinement turn if any
pub fn build_transcript(request: &ReplyRequest) -> Vec<ChatMessage> {
    let mut transcript = Vec::with_capacity(request.messages.len() + 2);
    transcript.push(ChatMessage::system(build_directive(request)));

    for entry in &request.messages {
        transcript.push(match entry.kind {
            MessageKind::Received => ChatMessage::user(entry.content.clone()),
            MessageKind::Suggested => ChatMessage::assistant(entry.content.clone()),
        });
    }

    if let Some(instruction) = &request.refinement_instruction {
        transcript.push(ChatMessage::user(format!(
            "Please refine the previous reply: {}",
            instruction
        )));
    }

    transcript
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{GoalContext, HistoryEntry, RoleContext};
    use crate::model::{MessageLength, Tone};
    use crate::state::ChatRole;

    fn request(instruction: Option<&str>) -> ReplyRequest {
        ReplyRequest {
            messages: vec![
                HistoryEntry {
                    content: "Can we meet Tuesday?".to_string(),
                    kind: MessageKind::Received,
                },
                HistoryEntry {
                    content: "Sure, Tuesday works.".to_string(),
                    kind: MessageKind::Suggested,
                },
            ],
            role: RoleContext {
                name: "Freelancer".to_string(),
                description: "Professional yet approachable".to_string(),
                tone: Tone::Professional,
                message_length: MessageLength::Concise,
            },
            goal: GoalContext {
                label: "Book a call".to_string(),
                description: "Schedule a meeting or discussion".to_string(),
            },
            refinement_instruction: instruction.map(str::to_string),
        }
    }

    #[test]
    fn test_directive_mentions_persona_and_goal() {
        let directive = build_directive(&request(None));
        assert!(directive.contains("- **Role**: Freelancer"));
        assert!(directive.contains("- **Tone**: professional"));
        assert!(directive.contains("- **Goal**: Book a call"));
        assert!(directive.contains("keep it brief and to the point"));
        assert!(!directive.contains("Refinement Request"));
    }

    #[test]
    fn test_transcript_reverses_roles() {
        let transcript = build_transcript(&request(None));
        let roles: Vec<_> = transcript.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![ChatRole::System, ChatRole::User, ChatRole::Assistant]);
        assert_eq!(transcript[1].content, "Can we meet Tuesday?");
    }

    #[test]
    fn test_refinement_appears_twice() {
        let req = request(Some("make it shorter"));
        let transcript = build_transcript(&req);

        assert!(transcript[0].content.contains("## Refinement Request"));
        assert!(transcript[0].content.contains("\"make it shorter\""));

        let last = transcript.last().unwrap();
        assert_eq!(last.role, ChatRole::User);
        assert_eq!(last.content, "Please refine the previous reply: make it shorter");
        assert_eq!(transcript.len(), 4);
    }
}
