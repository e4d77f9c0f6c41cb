use std::sync::Arc;

use ratatui::widgets::ListState;
use replywise_core::{
    build_generator, Completion, Config, Conversation, Entity, GenerateError, Goal, Library,
    OllamaClient, PendingGeneration, Provider, ReplyGenerator, Role,
    QUICK_REFINEMENTS,
};
use tokio::task::JoinHandle;

use crate::form::{Form, Submitted};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Roles,
    Conversation,
    Goals,
    Input,
}

impl FocusPane {
    pub fn next(self) -> Self {
        match self {
            FocusPane::Roles => FocusPane::Conversation,
            FocusPane::Conversation => FocusPane::Goals,
            FocusPane::Goals => FocusPane::Input,
            FocusPane::Input => FocusPane::Roles,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FocusPane::Roles => FocusPane::Input,
            FocusPane::Conversation => FocusPane::Roles,
            FocusPane::Goals => FocusPane::Conversation,
            FocusPane::Input => FocusPane::Goals,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Error,
}

/// A transient message shown in the status line
#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
    ticks_left: u16,
}

// ~6 seconds at the 300ms tick
const NOTICE_TICKS: u16 = 20;

type ReplyTask = JoinHandle<Result<String, GenerateError>>;

/// Header label for the active backend. The hosted reply function picks
/// its own model, so only the provider is shown for it.
fn generator_label(config: &Config, provider: Provider) -> String {
    match provider {
        Provider::Gateway => provider.display_name().to_string(),
        _ => format!("{}: {}", provider.display_name(), config.model_for(provider)),
    }
}

pub struct App {
    pub should_quit: bool,
    pub focus: FocusPane,
    pub input_mode: InputMode,

    // Session state
    pub library: Library,
    pub conversation: Conversation,

    // List selection (indexes into the sorted listings)
    pub role_state: ListState,
    pub goal_state: ListState,
    /// Selected message in the conversation pane; None follows the latest suggestion
    pub message_idx: Option<usize>,

    // Input box
    pub input: String,
    pub input_cursor: usize,

    pub form: Option<Form>,
    pub notice: Option<Notice>,

    // Reply generation
    generator: Option<Arc<dyn ReplyGenerator>>,
    pub generator_label: String,
    pending: Option<(PendingGeneration, ReplyTask)>,

    pub animation_frame: u8,
    pub chat_scroll: u16,

    clipboard: Option<arboard::Clipboard>,
}

impl App {
    pub async fn new(config: &Config) -> Self {
        let provider = config.provider().unwrap_or(Provider::Gateway);
        let label = generator_label(config, provider);

        let mut app = match build_generator(config) {
            Ok(generator) => Self::with_generator(Library::new(), Some(generator), label),
            Err(err) => {
                tracing::warn!(error = %err, "reply generator unavailable");
                let mut app = Self::with_generator(Library::new(), None, label);
                app.notify(
                    format!("Reply service not configured: {}", err),
                    NoticeKind::Error,
                );
                app
            }
        };

        if provider == Provider::Ollama {
            app.check_ollama_model(config).await;
        }

        app
    }

    pub fn with_generator(
        library: Library,
        generator: Option<Arc<dyn ReplyGenerator>>,
        generator_label: String,
    ) -> Self {
        let mut role_state = ListState::default();
        role_state.select(Some(0));
        let mut goal_state = ListState::default();
        goal_state.select(Some(0));

        Self {
            should_quit: false,
            focus: FocusPane::Roles,
            input_mode: InputMode::Normal,

            library,
            conversation: Conversation::new(),

            role_state,
            goal_state,
            message_idx: None,

            input: String::new(),
            input_cursor: 0,

            form: None,
            notice: Some(Notice {
                text: "Pick a role and a goal, then paste the message you received".to_string(),
                kind: NoticeKind::Info,
                ticks_left: NOTICE_TICKS,
            }),

            generator,
            generator_label,
            pending: None,

            animation_frame: 0,
            chat_scroll: 0,

            clipboard: None,
        }
    }

    async fn check_ollama_model(&mut self, config: &Config) {
        let url = config
            .ollama_url
            .as_deref()
            .unwrap_or(replywise_core::ai::ollama::DEFAULT_URL);
        let client = OllamaClient::new(url, &config.model_for(Provider::Ollama));

        match client.list_models().await {
            Ok(models) if !models.iter().any(|m| m == client.model()) => {
                self.notify(
                    format!("Model {} is not pulled. Run: ollama pull {}", client.model(), client.model()),
                    NoticeKind::Error,
                );
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "ollama not reachable");
                self.notify(
                    "Ollama is not reachable. Start it with: ollama serve".to_string(),
                    NoticeKind::Error,
                );
            }
        }
    }

    pub fn notify(&mut self, text: String, kind: NoticeKind) {
        self.notice = Some(Notice {
            text,
            kind,
            ticks_left: NOTICE_TICKS,
        });
    }

    pub fn tick(&mut self) {
        if self.conversation.is_generating() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        if let Some(notice) = &mut self.notice {
            notice.ticks_left = notice.ticks_left.saturating_sub(1);
            if notice.ticks_left == 0 {
                self.notice = None;
            }
        }
    }

    // Listings in display order

    pub fn sorted_roles(&self) -> Vec<&Role> {
        self.library.roles.sorted()
    }

    pub fn sorted_goals(&self) -> Vec<&Goal> {
        self.library.goals.sorted()
    }

    pub fn highlighted_role(&self) -> Option<&Role> {
        self.role_state
            .selected()
            .and_then(|i| self.sorted_roles().get(i).copied())
    }

    pub fn highlighted_goal(&self) -> Option<&Goal> {
        self.goal_state
            .selected()
            .and_then(|i| self.sorted_goals().get(i).copied())
    }

    pub fn list_nav(&mut self, down: bool) {
        let (state, len) = match self.focus {
            FocusPane::Roles => (&mut self.role_state, self.library.roles.len()),
            FocusPane::Goals => (&mut self.goal_state, self.library.goals.len()),
            _ => return,
        };
        if len == 0 {
            state.select(None);
            return;
        }
        let i = state.selected().unwrap_or(0);
        let next = if down { (i + 1).min(len - 1) } else { i.saturating_sub(1) };
        state.select(Some(next));
    }

    /// Move the highlight onto the entity with this id (after a re-sort)
    fn follow<T: Entity>(state: &mut ListState, sorted: &[&T], id: &str) {
        if let Some(pos) = sorted.iter().position(|e| e.id() == id) {
            state.select(Some(pos));
        } else if sorted.is_empty() {
            state.select(None);
        } else {
            let i = state.selected().unwrap_or(0).min(sorted.len() - 1);
            state.select(Some(i));
        }
    }

    fn refollow_roles(&mut self, id: &str) {
        let sorted = self.library.roles.sorted();
        Self::follow(&mut self.role_state, &sorted, id);
    }

    fn refollow_goals(&mut self, id: &str) {
        let sorted = self.library.goals.sorted();
        Self::follow(&mut self.goal_state, &sorted, id);
    }

    pub fn select_highlighted(&mut self) {
        match self.focus {
            FocusPane::Roles => {
                if let Some(role) = self.highlighted_role().cloned() {
                    self.notify(format!("Writing as {}", role.name), NoticeKind::Info);
                    self.conversation.select_role(Some(role));
                }
            }
            FocusPane::Goals => {
                if let Some(goal) = self.highlighted_goal().cloned() {
                    self.notify(format!("Goal: {}", goal.label), NoticeKind::Info);
                    self.conversation.select_goal(Some(goal));
                }
            }
            _ => {}
        }
    }

    pub fn toggle_favorite(&mut self) {
        match self.focus {
            FocusPane::Roles => {
                if let Some(id) = self.highlighted_role().map(|r| r.id.clone()) {
                    self.library.roles.toggle_favorite(&id);
                    self.sync_selected_role(&id);
                    self.refollow_roles(&id);
                }
            }
            FocusPane::Goals => {
                if let Some(id) = self.highlighted_goal().map(|g| g.id.clone()) {
                    self.library.goals.toggle_favorite(&id);
                    self.sync_selected_goal(&id);
                    self.refollow_goals(&id);
                }
            }
            _ => {}
        }
    }

    pub fn delete_highlighted(&mut self) {
        match self.focus {
            FocusPane::Roles => {
                let Some(id) = self.highlighted_role().map(|r| r.id.clone()) else {
                    return;
                };
                if let Some(role) = self.library.roles.delete(&id) {
                    if self.conversation.selected_role().map(|r| r.id.as_str()) == Some(id.as_str()) {
                        self.conversation.select_role(None);
                    }
                    self.notify(format!("Role \"{}\" deleted!", role.name), NoticeKind::Success);
                }
                self.refollow_roles(&id);
            }
            FocusPane::Goals => {
                let Some(id) = self.highlighted_goal().map(|g| g.id.clone()) else {
                    return;
                };
                if let Some(goal) = self.library.goals.delete(&id) {
                    if self.conversation.selected_goal().map(|g| g.id.as_str()) == Some(id.as_str()) {
                        self.conversation.select_goal(None);
                    }
                    self.notify(format!("Goal \"{}\" deleted!", goal.label), NoticeKind::Success);
                }
                self.refollow_goals(&id);
            }
            _ => {}
        }
    }

    pub fn open_new_form(&mut self) {
        self.form = match self.focus {
            FocusPane::Roles => Some(Form::new_role()),
            FocusPane::Goals => Some(Form::new_goal()),
            _ => None,
        };
    }

    pub fn open_edit_form(&mut self) {
        self.form = match self.focus {
            FocusPane::Roles => self.highlighted_role().map(Form::edit_role),
            FocusPane::Goals => self.highlighted_goal().map(Form::edit_goal),
            _ => None,
        };
    }

    /// Save the open form. The form stays open when validation fails.
    pub fn submit_form(&mut self) {
        let Some(form) = &mut self.form else {
            return;
        };
        let Ok(submitted) = form.submit() else {
            return;
        };
        self.form = None;

        match submitted {
            Submitted::NewRole(role) => {
                let id = role.id.clone();
                let name = self.library.roles.add(role).name.clone();
                self.notify(format!("Role \"{}\" created!", name), NoticeKind::Success);
                self.refollow_roles(&id);
            }
            Submitted::UpdatedRole(role) => {
                let id = role.id.clone();
                let name = role.name.clone();
                if self.library.roles.update(role) {
                    self.notify(format!("Role \"{}\" updated!", name), NoticeKind::Success);
                }
                self.sync_selected_role(&id);
                self.refollow_roles(&id);
            }
            Submitted::NewGoal(goal) => {
                let id = goal.id.clone();
                let label = self.library.goals.add(goal).label.clone();
                self.notify(format!("Goal \"{}\" created!", label), NoticeKind::Success);
                self.refollow_goals(&id);
            }
            Submitted::UpdatedGoal(goal) => {
                let id = goal.id.clone();
                let label = goal.label.clone();
                if self.library.goals.update(goal) {
                    self.notify(format!("Goal \"{}\" updated!", label), NoticeKind::Success);
                }
                self.sync_selected_goal(&id);
                self.refollow_goals(&id);
            }
        }
    }

    // The conversation holds copies of the selected role/goal; keep them
    // in step with library edits.
    fn sync_selected_role(&mut self, id: &str) {
        if self.conversation.selected_role().map(|r| r.id.as_str()) == Some(id) {
            let role = self.library.roles.get(id).cloned();
            self.conversation.select_role(role);
        }
    }

    fn sync_selected_goal(&mut self, id: &str) {
        if self.conversation.selected_goal().map(|g| g.id.as_str()) == Some(id) {
            let goal = self.library.goals.get(id).cloned();
            self.conversation.select_goal(goal);
        }
    }

    // Conversation pane

    /// Message the copy action applies to
    pub fn selected_message_idx(&self) -> Option<usize> {
        self.message_idx
            .filter(|i| *i < self.conversation.messages().len())
            .or_else(|| self.conversation.latest_suggestion_index())
    }

    pub fn message_nav(&mut self, down: bool) {
        let len = self.conversation.messages().len();
        if len == 0 {
            self.message_idx = None;
            return;
        }
        let current = self.selected_message_idx().unwrap_or(len - 1);
        self.message_idx = Some(if down {
            (current + 1).min(len - 1)
        } else {
            current.saturating_sub(1)
        });
    }

    pub fn copy_selected_message(&mut self) {
        let Some(idx) = self.selected_message_idx() else {
            self.notify("Nothing to copy yet".to_string(), NoticeKind::Info);
            return;
        };
        let text = self.conversation.messages()[idx].content.clone();

        if self.clipboard.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(err) => {
                    tracing::warn!(error = %err, "clipboard unavailable");
                    self.notify(format!("Clipboard unavailable: {}", err), NoticeKind::Error);
                    return;
                }
            }
        }

        let result = match self.clipboard.as_mut() {
            Some(clipboard) => clipboard.set_text(text),
            None => return,
        };
        match result {
            Ok(()) => self.notify("Copied to clipboard".to_string(), NoticeKind::Success),
            Err(err) => self.notify(format!("Copy failed: {}", err), NoticeKind::Error),
        }
    }

    pub fn open_refinement(&mut self) {
        if self.conversation.latest_suggestion().is_none() {
            self.notify("No suggestion to improve yet".to_string(), NoticeKind::Info);
            return;
        }
        self.conversation.request_regeneration();
        self.input.clear();
        self.input_cursor = 0;
        self.focus = FocusPane::Input;
        self.input_mode = InputMode::Editing;
    }

    pub fn cancel_refinement(&mut self) {
        self.conversation.cancel_refinement();
        self.input.clear();
        self.input_cursor = 0;
    }

    pub fn clear_conversation(&mut self) {
        if let Some((_, task)) = self.pending.take() {
            task.abort();
        }
        self.conversation.clear();
        self.message_idx = None;
        self.chat_scroll = 0;
        self.notify("Conversation cleared".to_string(), NoticeKind::Info);
    }

    // Input box and generation

    /// Send the input box: a received message, or a refinement instruction
    /// while the refinement prompt is open.
    pub fn submit_input(&mut self) {
        if self.conversation.is_generating() {
            return;
        }
        let text = std::mem::take(&mut self.input);
        self.input_cursor = 0;

        let started = if self.conversation.is_refinement_open() {
            self.conversation.begin_refinement(&text)
        } else {
            self.conversation.begin_reply(&text)
        };

        match started {
            Ok(pending) => {
                self.message_idx = None;
                self.start_generation(pending);
            }
            Err(err) => {
                // a rejected instruction stays in the box for another try
                if self.conversation.is_refinement_open() {
                    self.input = text;
                    self.input_cursor = self.input.chars().count();
                }
                self.notify(err.to_string(), NoticeKind::Error);
            }
        }
    }

    pub fn quick_refinement(&mut self, idx: usize) {
        if let Some(instruction) = QUICK_REFINEMENTS.get(idx) {
            self.input = instruction.to_string();
            self.submit_input();
        }
    }

    fn start_generation(&mut self, pending: PendingGeneration) {
        let Some(generator) = self.generator.clone() else {
            let result = Err(GenerateError::Transport(
                "no reply service is configured".to_string(),
            ));
            self.apply_result(pending, result);
            return;
        };

        let request = pending.request().clone();
        let task = tokio::spawn(async move { generator.generate(&request).await });
        self.pending = Some((pending, task));
    }

    /// Collect the reply task once it has finished
    pub async fn poll_generation(&mut self) {
        let finished = matches!(&self.pending, Some((_, task)) if task.is_finished());
        if !finished {
            return;
        }
        let Some((pending, task)) = self.pending.take() else {
            return;
        };

        let result = match task.await {
            Ok(result) => result,
            Err(err) => Err(GenerateError::Transport(err.to_string())),
        };
        self.apply_result(pending, result);
    }

    fn apply_result(&mut self, pending: PendingGeneration, result: Result<String, GenerateError>) {
        match self.conversation.finish(pending, result) {
            Ok(Completion::Appended(_)) => {
                self.notify("Reply generated! Press c to copy.".to_string(), NoticeKind::Success)
            }
            Ok(Completion::Replaced(_)) => {
                self.notify("Reply updated! Press c to copy.".to_string(), NoticeKind::Success)
            }
            Ok(Completion::Discarded) => {}
            Err(err) => self.notify(err.to_string(), NoticeKind::Error),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some() || self.conversation.is_generating()
    }
}
