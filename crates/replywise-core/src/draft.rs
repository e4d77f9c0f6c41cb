//! Form drafts for creating and editing roles and goals.

use crate::error::ValidationError;
use crate::model::{Goal, MessageLength, Role, Tone};

pub const DEFAULT_ROLE_ICON: &str = "💼";
pub const DEFAULT_GOAL_ICON: &str = "🎯";

fn custom_id() -> String {
    format!("custom-{}", uuid::Uuid::new_v4())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDraft {
    pub name: String,
    pub description: String,
    pub tone: Tone,
    pub message_length: MessageLength,
    pub icon: String,
}

impl Default for RoleDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            tone: Tone::Professional,
            message_length: MessageLength::Moderate,
            icon: DEFAULT_ROLE_ICON.to_string(),
        }
    }
}

impl RoleDraft {
    pub fn from_role(role: &Role) -> Self {
        Self {
            name: role.name.clone(),
            description: role.description.clone(),
            tone: role.tone,
            message_length: role.message_length,
            icon: role.icon.clone(),
        }
    }

    /// Build a role from the draft. When `existing` is given the result
    /// keeps its id and favorite flag, otherwise a new id is generated.
    pub fn build(&self, existing: Option<&Role>) -> Result<Role, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyField("Name"));
        }

        let description = match self.description.trim() {
            "" => format!("Custom {} role", name),
            d => d.to_string(),
        };

        Ok(Role {
            id: existing.map(|r| r.id.clone()).unwrap_or_else(custom_id),
            name: name.to_string(),
            description,
            tone: self.tone,
            message_length: self.message_length,
            icon: self.icon.clone(),
            is_favorite: existing.and_then(|r| r.is_favorite),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalDraft {
    pub label: String,
    pub description: String,
    pub icon: String,
}

impl Default for GoalDraft {
    fn default() -> Self {
        Self {
            label: String::new(),
            description: String::new(),
            icon: DEFAULT_GOAL_ICON.to_string(),
        }
    }
}

impl GoalDraft {
    pub fn from_goal(goal: &Goal) -> Self {
        Self {
            label: goal.label.clone(),
            description: goal.description.clone(),
            icon: goal.icon.clone(),
        }
    }

    pub fn build(&self, existing: Option<&Goal>) -> Result<Goal, ValidationError> {
        let label = self.label.trim();
        if label.is_empty() {
            return Err(ValidationError::EmptyField("Label"));
        }

        let description = match self.description.trim() {
            "" => format!("Achieve: {}", label),
            d => d.to_string(),
        };

        Ok(Goal {
            id: existing.map(|g| g.id.clone()).unwrap_or_else(custom_id),
            label: label.to_string(),
            description,
            icon: self.icon.clone(),
            is_favorite: existing.and_then(|g| g.is_favorite),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{default_goals, default_roles};

    #[test]
    fn test_role_draft_requires_name() {
        let draft = RoleDraft {
            name: "   ".to_string(),
            ..RoleDraft::default()
        };
        assert_eq!(draft.build(None), Err(ValidationError::EmptyField("Name")));
    }

    #[test]
    fn test_role_draft_defaults_description() {
        let draft = RoleDraft {
            name: "  Landlord ".to_string(),
            ..RoleDraft::default()
        };
        let role = draft.build(None).unwrap();
        assert_eq!(role.name, "Landlord");
        assert_eq!(role.description, "Custom Landlord role");
        assert_eq!(role.tone, Tone::Professional);
        assert_eq!(role.message_length, MessageLength::Moderate);
        assert!(role.id.starts_with("custom-"));
        assert_eq!(role.is_favorite, None);
    }

    #[test]
    fn test_new_ids_do_not_collide() {
        let draft = GoalDraft {
            label: "Say thanks".to_string(),
            ..GoalDraft::default()
        };
        let a = draft.build(None).unwrap();
        let b = draft.build(None).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.description, "Achieve: Say thanks");
    }

    #[test]
    fn test_edit_keeps_id_and_favorite() {
        let mut original = default_roles().remove(0);
        original.is_favorite = Some(true);

        let mut draft = RoleDraft::from_role(&original);
        draft.tone = Tone::Casual;
        let edited = draft.build(Some(&original)).unwrap();

        assert_eq!(edited.id, original.id);
        assert_eq!(edited.is_favorite, Some(true));
        assert_eq!(edited.tone, Tone::Casual);
        assert_eq!(edited.description, original.description);
    }

    #[test]
    fn test_goal_edit_roundtrip() {
        let original = default_goals().remove(1);
        let edited = GoalDraft::from_goal(&original).build(Some(&original)).unwrap();
        assert_eq!(edited, original);
    }
}
