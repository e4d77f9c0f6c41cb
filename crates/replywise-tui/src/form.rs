//! Create/edit dialogs for roles and goals.

use replywise_core::{Goal, GoalDraft, MessageLength, Role, RoleDraft, Tone, ValidationError};

use crate::icons::{self, GOAL_ICONS, ROLE_ICONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Choice,
}

#[derive(Debug, Clone)]
pub struct RoleForm {
    pub draft: RoleDraft,
    pub editing: Option<Role>,
    pub field: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GoalForm {
    pub draft: GoalDraft,
    pub editing: Option<Goal>,
    pub field: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Form {
    Role(RoleForm),
    Goal(GoalForm),
}

const ROLE_FIELDS: [(&str, FieldKind); 5] = [
    ("Name", FieldKind::Text),
    ("Description", FieldKind::Text),
    ("Tone", FieldKind::Choice),
    ("Length", FieldKind::Choice),
    ("Icon", FieldKind::Choice),
];

const GOAL_FIELDS: [(&str, FieldKind); 3] = [
    ("Label", FieldKind::Text),
    ("Description", FieldKind::Text),
    ("Icon", FieldKind::Choice),
];

fn step<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let len = all.len();
    let i = all.iter().position(|v| *v == current).unwrap_or(0);
    if forward {
        all[(i + 1) % len]
    } else {
        all[(i + len - 1) % len]
    }
}

impl Form {
    pub fn new_role() -> Self {
        Form::Role(RoleForm {
            draft: RoleDraft::default(),
            editing: None,
            field: 0,
            error: None,
        })
    }

    pub fn edit_role(role: &Role) -> Self {
        Form::Role(RoleForm {
            draft: RoleDraft::from_role(role),
            editing: Some(role.clone()),
            field: 0,
            error: None,
        })
    }

    pub fn new_goal() -> Self {
        Form::Goal(GoalForm {
            draft: GoalDraft::default(),
            editing: None,
            field: 0,
            error: None,
        })
    }

    pub fn edit_goal(goal: &Goal) -> Self {
        Form::Goal(GoalForm {
            draft: GoalDraft::from_goal(goal),
            editing: Some(goal.clone()),
            field: 0,
            error: None,
        })
    }

    pub fn title(&self) -> &'static str {
        match self {
            Form::Role(f) if f.editing.is_some() => " Edit Role ",
            Form::Role(_) => " Create Role ",
            Form::Goal(f) if f.editing.is_some() => " Edit Goal ",
            Form::Goal(_) => " Create Goal ",
        }
    }

    fn fields(&self) -> &'static [(&'static str, FieldKind)] {
        match self {
            Form::Role(_) => &ROLE_FIELDS,
            Form::Goal(_) => &GOAL_FIELDS,
        }
    }

    pub fn field(&self) -> usize {
        match self {
            Form::Role(f) => f.field,
            Form::Goal(f) => f.field,
        }
    }

    fn field_mut(&mut self) -> &mut usize {
        match self {
            Form::Role(f) => &mut f.field,
            Form::Goal(f) => &mut f.field,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Form::Role(f) => f.error.as_deref(),
            Form::Goal(f) => f.error.as_deref(),
        }
    }

    fn set_error(&mut self, error: Option<String>) {
        match self {
            Form::Role(f) => f.error = error,
            Form::Goal(f) => f.error = error,
        }
    }

    pub fn field_kind(&self) -> FieldKind {
        self.kind_at(self.field())
    }

    pub fn kind_at(&self, field: usize) -> FieldKind {
        self.fields()
            .get(field)
            .map(|(_, kind)| *kind)
            .unwrap_or(FieldKind::Text)
    }

    /// Label and current value of every field, in display order
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let values: Vec<String> = match self {
            Form::Role(f) => vec![
                f.draft.name.clone(),
                f.draft.description.clone(),
                f.draft.tone.display_name().to_string(),
                f.draft.message_length.display_name().to_string(),
                icons::glyph(&f.draft.icon).to_string(),
            ],
            Form::Goal(f) => vec![
                f.draft.label.clone(),
                f.draft.description.clone(),
                icons::glyph(&f.draft.icon).to_string(),
            ],
        };
        self.fields()
            .iter()
            .map(|(label, _)| *label)
            .zip(values)
            .collect()
    }

    pub fn next_field(&mut self) {
        let len = self.fields().len();
        let field = self.field_mut();
        *field = (*field + 1) % len;
    }

    pub fn prev_field(&mut self) {
        let len = self.fields().len();
        let field = self.field_mut();
        *field = (*field + len - 1) % len;
    }

    fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            Form::Role(f) => match f.field {
                0 => Some(&mut f.draft.name),
                1 => Some(&mut f.draft.description),
                _ => None,
            },
            Form::Goal(f) => match f.field {
                0 => Some(&mut f.draft.label),
                1 => Some(&mut f.draft.description),
                _ => None,
            },
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(text) = self.text_mut() {
            text.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(text) = self.text_mut() {
            text.pop();
        }
    }

    /// Step a choice field (tone, length, icon) forward or back
    pub fn cycle_choice(&mut self, forward: bool) {
        match self {
            Form::Role(f) => match f.field {
                2 => f.draft.tone = step(&Tone::all(), f.draft.tone, forward),
                3 => {
                    f.draft.message_length =
                        step(&MessageLength::all(), f.draft.message_length, forward)
                }
                4 => f.draft.icon = icons::cycle(ROLE_ICONS, &f.draft.icon, forward).to_string(),
                _ => {}
            },
            Form::Goal(f) => {
                if f.field == 2 {
                    f.draft.icon = icons::cycle(GOAL_ICONS, &f.draft.icon, forward).to_string();
                }
            }
        }
    }

    /// Validate the form. On failure the error is kept for display.
    pub fn submit(&mut self) -> Result<Submitted, ValidationError> {
        let result = match self {
            Form::Role(f) => f.draft.build(f.editing.as_ref()).map(|role| {
                if f.editing.is_some() {
                    Submitted::UpdatedRole(role)
                } else {
                    Submitted::NewRole(role)
                }
            }),
            Form::Goal(f) => f.draft.build(f.editing.as_ref()).map(|goal| {
                if f.editing.is_some() {
                    Submitted::UpdatedGoal(goal)
                } else {
                    Submitted::NewGoal(goal)
                }
            }),
        };

        if let Err(err) = &result {
            self.set_error(Some(err.to_string()));
        }
        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submitted {
    NewRole(Role),
    UpdatedRole(Role),
    NewGoal(Goal),
    UpdatedGoal(Goal),
}

#[cfg(test)]
mod tests {
    use super::*;
    use replywise_core::defaults::default_roles;

    fn type_text(form: &mut Form, text: &str) {
        for c in text.chars() {
            form.push_char(c);
        }
    }

    #[test]
    fn test_new_role_form() {
        let mut form = Form::new_role();
        assert_eq!(form.title(), " Create Role ");
        type_text(&mut form, "Landlordx");
        form.pop_char();

        form.next_field();
        form.next_field();
        assert_eq!(form.field_kind(), FieldKind::Choice);
        form.cycle_choice(true);

        match form.submit().unwrap() {
            Submitted::NewRole(role) => {
                assert_eq!(role.name, "Landlord");
                assert_eq!(role.tone, Tone::Formal);
                assert_eq!(role.description, "Custom Landlord role");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_empty_name_sets_error() {
        let mut form = Form::new_goal();
        assert!(form.submit().is_err());
        assert_eq!(form.error(), Some("Label cannot be empty"));
    }

    #[test]
    fn test_edit_role_keeps_id() {
        let role = default_roles().remove(0);
        let mut form = Form::edit_role(&role);
        assert_eq!(form.title(), " Edit Role ");
        form.prev_field();
        assert_eq!(form.field(), 4);
        form.cycle_choice(true);

        match form.submit().unwrap() {
            Submitted::UpdatedRole(edited) => {
                assert_eq!(edited.id, role.id);
                assert_eq!(edited.icon, "📚");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_choice_fields_ignore_typing() {
        let mut form = Form::new_goal();
        form.prev_field();
        type_text(&mut form, "abc");
        let rows = form.rows();
        assert_eq!(rows[0], ("Label", String::new()));
        assert_eq!(rows[2], ("Icon", "🎯".to_string()));
    }
}
