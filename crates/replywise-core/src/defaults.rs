//! Built-in roles and goals every session starts with.

use crate::model::{Goal, MessageLength, Role, Tone};

fn role(
    id: &str,
    name: &str,
    description: &str,
    tone: Tone,
    message_length: MessageLength,
    icon: &str,
) -> Role {
    Role {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        tone,
        message_length,
        icon: icon.to_string(),
        is_favorite: None,
    }
}

fn goal(id: &str, label: &str, description: &str, icon: &str) -> Goal {
    Goal {
        id: id.to_string(),
        label: label.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        is_favorite: None,
    }
}

pub fn default_roles() -> Vec<Role> {
    vec![
        role(
            "freelancer",
            "Freelancer",
            "Professional yet approachable for client communications",
            Tone::Professional,
            MessageLength::Moderate,
            "💼",
        ),
        role(
            "student",
            "Student",
            "Respectful and clear for academic contexts",
            Tone::Formal,
            MessageLength::Concise,
            "📚",
        ),
        role(
            "friend",
            "Personal",
            "Warm and casual for friends and family",
            Tone::Friendly,
            MessageLength::Moderate,
            "💬",
        ),
        role(
            "manager",
            "Manager",
            "Clear, decisive leadership communication",
            Tone::Professional,
            MessageLength::Concise,
            "👔",
        ),
    ]
}

pub fn default_goals() -> Vec<Goal> {
    vec![
        goal("get-job", "Get the job", "Impress and secure the opportunity", "🎯"),
        goal("book-call", "Book a call", "Schedule a meeting or discussion", "📅"),
        goal("negotiate", "Negotiate politely", "Find middle ground respectfully", "🤝"),
        goal("follow-up", "Follow up", "Re-engage after no reply", "📨"),
        goal("decline", "Decline respectfully", "Say no while preserving relationship", "🙏"),
        goal("de-escalate", "De-escalate", "Calm a tense situation", "🕊️"),
        goal("clarify", "Clarify", "Get or provide clear information", "💡"),
        goal("build-rapport", "Build rapport", "Strengthen the relationship", "❤️"),
    ]
}
