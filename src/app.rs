//! Terminal application state and key handling
//!
//! Keys are translated into state machine events; everything the screen shows
//! comes from the runtime's [`AppState`] plus the local input buffers here.

use crate::agent::{ActionKind, AgentService};
use crate::attachment::{ImageAttachment, SelectionError};
use crate::runtime::ConversationRuntime;
use crate::state_machine::{AppState, Event, FactCheckField, View};
use crate::tui::AppEvent;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Lines moved per PageUp/PageDown
const SCROLL_STEP: u16 = 5;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map_or(s.len(), |(i, _)| i)
}

/// Single-line text buffer with a character cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    cursor: usize,
}

impl TextInput {
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cursor position in characters
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Apply an editing key; returns whether the value changed
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                let at = char_to_byte_index(&self.value, self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            KeyCode::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                let at = char_to_byte_index(&self.value, self.cursor);
                self.value.remove(at);
                true
            }
            KeyCode::Delete if self.cursor < self.value.chars().count() => {
                let at = char_to_byte_index(&self.value, self.cursor);
                self.value.remove(at);
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                false
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.value.chars().count());
                false
            }
            KeyCode::Home => {
                self.cursor = 0;
                false
            }
            KeyCode::End => {
                self.cursor = self.value.chars().count();
                false
            }
            _ => false,
        }
    }
}

/// Which chat input receives typed characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatFocus {
    Composer,
    ImagePath,
}

pub struct App<A: AgentService + 'static> {
    runtime: ConversationRuntime<A>,
    pub composer: TextInput,
    pub image_path: TextInput,
    /// Image attached to the next query
    pub image: Option<ImageAttachment>,
    pub chat_focus: ChatFocus,
    /// Local problem with the image selection, never sent anywhere
    pub notice: Option<String>,
    pub fact_field: FactCheckField,
    pub fact_query: TextInput,
    pub fact_answer: TextInput,
    /// Lines scrolled up from the bottom of the conversation
    pub chat_scroll: u16,
    pub animation_frame: u8,
    pub should_quit: bool,
}

impl<A: AgentService + 'static> App<A> {
    pub fn new(agent: A) -> Self {
        Self {
            runtime: ConversationRuntime::new(agent),
            composer: TextInput::default(),
            image_path: TextInput::default(),
            image: None,
            chat_focus: ChatFocus::Composer,
            notice: None,
            fact_field: FactCheckField::OriginalQuery,
            fact_query: TextInput::default(),
            fact_answer: TextInput::default(),
            chat_scroll: 0,
            animation_frame: 0,
            should_quit: false,
        }
    }

    pub fn state(&self) -> &AppState {
        self.runtime.state()
    }

    pub fn base_url(&self) -> &str {
        self.runtime.agent().base_url()
    }

    pub async fn next_completion(&mut self) -> Option<Event> {
        self.runtime.next_completion().await
    }

    pub fn handle_completion(&mut self, event: Event) {
        self.runtime.handle_completion(event);
        self.chat_scroll = 0;
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize => {}
            AppEvent::Tick => self.animation_frame = (self.animation_frame + 1) % 3,
        }
    }

    fn dispatch(&mut self, event: Event) -> bool {
        self.runtime.dispatch(event).is_ok()
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.state().view() {
            View::Landing => self.handle_landing_key(key),
            View::Chat => self.handle_chat_key(key),
            View::FactChecker => self.handle_fact_checker_key(key),
        }
    }

    // ========================================================================
    // Landing
    // ========================================================================

    fn handle_landing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.dispatch(Event::Start);
            }
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    // ========================================================================
    // Chat
    // ========================================================================

    fn handle_chat_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            KeyCode::Char('o') if ctrl => {
                self.chat_focus = match self.chat_focus {
                    ChatFocus::Composer => ChatFocus::ImagePath,
                    ChatFocus::ImagePath => ChatFocus::Composer,
                };
            }
            KeyCode::Char('e') if ctrl => self.run_action(ActionKind::Eli5),
            KeyCode::Char('d') if ctrl => self.run_action(ActionKind::DeepDive),
            KeyCode::Char('s') if ctrl => self.run_action(ActionKind::SuggestQuestions),
            KeyCode::Char('f') if ctrl => {
                self.dispatch(Event::NavigateFactChecker);
            }
            KeyCode::Char(c @ '1'..='9') if alt => {
                let index = (c as usize) - ('1' as usize);
                self.select_suggestion(index);
            }
            KeyCode::PageUp => self.chat_scroll = self.chat_scroll.saturating_add(SCROLL_STEP),
            KeyCode::PageDown => self.chat_scroll = self.chat_scroll.saturating_sub(SCROLL_STEP),
            _ => match self.chat_focus {
                ChatFocus::Composer => self.handle_composer_key(key),
                ChatFocus::ImagePath => self.handle_image_path_key(key),
            },
        }
    }

    fn handle_composer_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Enter {
            self.submit_query();
        } else {
            self.composer.handle_key(key);
        }
    }

    fn handle_image_path_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.select_image(),
            KeyCode::Esc => {
                self.notice = None;
                self.chat_focus = ChatFocus::Composer;
            }
            _ => {
                self.image_path.handle_key(key);
            }
        }
    }

    fn submit_query(&mut self) {
        let event = Event::SubmitQuery {
            text: self.composer.value().to_string(),
            image: self.image.clone(),
        };
        // Inputs are kept when validation fails so the user can fix them
        if self.dispatch(event) && self.state().chat().is_pending() {
            self.composer.clear();
            self.image_path.clear();
            self.image = None;
            self.chat_scroll = 0;
        }
    }

    fn select_image(&mut self) {
        match ImageAttachment::from_path(self.image_path.value().trim()) {
            Ok(image) => {
                tracing::info!(
                    path = %image.path().display(),
                    media_type = image.media_type(),
                    "Image selected"
                );
                self.image = Some(image);
                self.notice = None;
                self.chat_focus = ChatFocus::Composer;
            }
            Err(SelectionError::Empty) => {
                self.image = None;
                self.notice = None;
                self.chat_focus = ChatFocus::Composer;
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn run_action(&mut self, action: ActionKind) {
        if self.state().chat().latest_actionable().is_some() {
            self.dispatch(Event::RunAction { action });
            self.chat_scroll = 0;
        }
    }

    fn select_suggestion(&mut self, index: usize) {
        let question = self
            .state()
            .chat()
            .latest_suggestions()
            .and_then(|suggestions| suggestions.get(index))
            .cloned();
        if let Some(question) = question {
            self.dispatch(Event::SelectSuggestion { question });
            self.chat_scroll = 0;
        }
    }

    // ========================================================================
    // Fact checker
    // ========================================================================

    fn handle_fact_checker_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => {
                self.dispatch(Event::BackToChat);
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                self.fact_field = match self.fact_field {
                    FactCheckField::OriginalQuery => FactCheckField::AnswerToCheck,
                    FactCheckField::AnswerToCheck => FactCheckField::OriginalQuery,
                };
            }
            KeyCode::Enter => {
                self.dispatch(Event::SubmitFactCheck);
            }
            KeyCode::Char('l') if ctrl => {
                if self.dispatch(Event::ClearFactCheck) {
                    self.fact_query.clear();
                    self.fact_answer.clear();
                    self.fact_field = FactCheckField::OriginalQuery;
                }
            }
            _ => {
                let field = self.fact_field;
                let input = self.fact_input_mut(field);
                if input.handle_key(key) {
                    let value = input.value().to_string();
                    self.dispatch(Event::FactCheckInput { field, value });
                }
            }
        }
    }

    pub fn fact_input(&self, field: FactCheckField) -> &TextInput {
        match field {
            FactCheckField::OriginalQuery => &self.fact_query,
            FactCheckField::AnswerToCheck => &self.fact_answer,
        }
    }

    fn fact_input_mut(&mut self, field: FactCheckField) -> &mut TextInput {
        match field {
            FactCheckField::OriginalQuery => &mut self.fact_query,
            FactCheckField::AnswerToCheck => &mut self.fact_answer,
        }
    }

    #[cfg(test)]
    pub(crate) async fn settle(&mut self) {
        self.runtime.settle().await;
    }
}
