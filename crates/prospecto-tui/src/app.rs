use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use prospecto_config::AppConfig;
use prospecto_core::select::MultiSelect;
use prospecto_core::session::FormSession;
use prospecto_core::time::now_utc;
use prospecto_core::CoreError;

use crate::actions::Action;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Form,
    SelectPopup(SelectTarget),
    PrefixPopup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectTarget {
    Projects,
    UnitTypes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Rut,
    Prefix,
    Phone,
    Email,
    Projects,
    UnitTypes,
    Terms,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupFocus {
    Search,
    List,
}

enum TextEdit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

#[derive(Debug)]
pub struct App {
    pub session: FormSession,
    pub mode: Mode,
    pub focus: Focus,
    pub should_quit: bool,
    pub name_cursor: usize,
    pub rut_cursor: usize,
    pub phone_cursor: usize,
    pub email_cursor: usize,
    pub search_cursor: usize,
    pub popup_focus: PopupFocus,
    pub list_index: usize,
    pub prefix_index: usize,
    pub prefixes: Vec<String>,
    pub success_message: String,
    pub success_dismiss: Duration,
    pub success_shown_at: Option<Instant>,
    pub captured: usize,
    actions: VecDeque<Action>,
}

const FOCUS_ORDER: [Focus; 9] = [
    Focus::Name,
    Focus::Rut,
    Focus::Prefix,
    Focus::Phone,
    Focus::Email,
    Focus::Projects,
    Focus::UnitTypes,
    Focus::Terms,
    Focus::Submit,
];

impl App {
    pub fn new(config: &AppConfig) -> Result<Self, CoreError> {
        let projects = MultiSelect::new(
            config
                .projects
                .iter()
                .map(|entry| (entry.id.clone(), entry.label.clone())),
        )?;
        let unit_types = MultiSelect::new(
            config
                .unit_types
                .iter()
                .map(|entry| (entry.id.clone(), entry.label.clone())),
        )?;
        let session = FormSession::new(projects, unit_types, &config.default_prefix)?;
        Ok(Self {
            session,
            mode: Mode::Form,
            focus: Focus::Name,
            should_quit: false,
            name_cursor: 0,
            rut_cursor: 0,
            phone_cursor: 0,
            email_cursor: 0,
            search_cursor: 0,
            popup_focus: PopupFocus::List,
            list_index: 0,
            prefix_index: 0,
            prefixes: config.phone_prefixes.clone(),
            success_message: config.success_message.clone(),
            success_dismiss: Duration::from_secs(config.success_dismiss_secs),
            success_shown_at: None,
            captured: 0,
            actions: VecDeque::new(),
        })
    }

    pub fn enqueue(&mut self, action: Action) {
        self.actions.push_back(action);
    }

    pub fn next_action(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }

    pub fn lead_captured(&mut self, now: Instant) {
        self.captured += 1;
        self.success_shown_at = Some(now);
    }

    pub fn success_visible(&self) -> bool {
        self.success_shown_at.is_some()
    }

    // The banner auto-dismiss is cosmetic; nothing else hangs off the timer.
    pub fn tick(&mut self, now: Instant) {
        if let Some(shown) = self.success_shown_at {
            if now.duration_since(shown) >= self.success_dismiss {
                self.success_shown_at = None;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press && key.kind != KeyEventKind::Repeat {
            return;
        }

        if matches!(
            key,
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            }
        ) {
            self.should_quit = true;
            return;
        }

        match self.mode {
            Mode::Form => self.handle_form_key(key),
            Mode::SelectPopup(target) => self.handle_select_key(target, key),
            Mode::PrefixPopup => self.handle_prefix_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.success_shown_at = None;
            }
            KeyCode::Tab | KeyCode::Down => self.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.focus_prev(),
            KeyCode::Enter => match self.focus {
                Focus::Projects => self.open_select_popup(SelectTarget::Projects),
                Focus::UnitTypes => self.open_select_popup(SelectTarget::UnitTypes),
                Focus::Prefix => self.open_prefix_popup(),
                Focus::Terms => self.session.set_terms(!self.session.terms_accepted()),
                Focus::Submit => self.submit(),
                _ => self.focus_next(),
            },
            KeyCode::Char(' ') if self.focus == Focus::Terms => {
                self.session.set_terms(!self.session.terms_accepted());
            }
            KeyCode::Backspace if self.focus == Focus::Projects => {
                if let Some(id) = self.session.projects().selected_ids().pop() {
                    self.session.remove_project(&id);
                    self.ensure_focus_valid();
                }
            }
            KeyCode::Backspace if self.focus == Focus::UnitTypes => {
                if let Some(id) = self.session.unit_types().selected_ids().pop() {
                    self.session.remove_unit_type(&id);
                }
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.edit_active_text(TextEdit::Insert(ch));
            }
            KeyCode::Backspace => self.edit_active_text(TextEdit::Backspace),
            KeyCode::Delete => self.edit_active_text(TextEdit::Delete),
            KeyCode::Left => self.edit_active_text(TextEdit::Left),
            KeyCode::Right => self.edit_active_text(TextEdit::Right),
            KeyCode::Home => self.edit_active_text(TextEdit::Home),
            KeyCode::End => self.edit_active_text(TextEdit::End),
            _ => {}
        }
    }

    fn handle_select_key(&mut self, target: SelectTarget, key: KeyEvent) {
        let searchable = target == SelectTarget::Projects;
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Form;
                self.ensure_focus_valid();
            }
            KeyCode::Tab | KeyCode::BackTab if searchable => {
                self.popup_focus = match self.popup_focus {
                    PopupFocus::Search => PopupFocus::List,
                    PopupFocus::List => PopupFocus::Search,
                };
            }
            KeyCode::Up => self.move_list(target, -1),
            KeyCode::Down => self.move_list(target, 1),
            KeyCode::Enter => match self.popup_focus {
                PopupFocus::Search => self.popup_focus = PopupFocus::List,
                PopupFocus::List => self.toggle_popup_row(target),
            },
            KeyCode::Char(' ') if self.popup_focus == PopupFocus::List => {
                self.toggle_popup_row(target);
            }
            KeyCode::Char(ch)
                if searchable
                    && self.popup_focus == PopupFocus::Search
                    && !key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                self.edit_search(TextEdit::Insert(ch));
            }
            KeyCode::Backspace if searchable && self.popup_focus == PopupFocus::Search => {
                self.edit_search(TextEdit::Backspace);
            }
            KeyCode::Delete if searchable && self.popup_focus == PopupFocus::Search => {
                self.edit_search(TextEdit::Delete);
            }
            KeyCode::Left if searchable && self.popup_focus == PopupFocus::Search => {
                self.edit_search(TextEdit::Left);
            }
            KeyCode::Right if searchable && self.popup_focus == PopupFocus::Search => {
                self.edit_search(TextEdit::Right);
            }
            _ => {}
        }
    }

    fn handle_prefix_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.mode = Mode::Form,
            KeyCode::Up => {
                if self.prefix_index > 0 {
                    self.prefix_index -= 1;
                }
            }
            KeyCode::Down => {
                if self.prefix_index + 1 < self.prefixes.len() {
                    self.prefix_index += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(prefix) = self.prefixes.get(self.prefix_index).cloned() {
                    // Prefixes come pre-normalized from the config loader.
                    let _ = self.session.set_prefix(&prefix);
                }
                self.mode = Mode::Form;
            }
            _ => {}
        }
    }

    fn submit(&mut self) {
        if let Ok(lead) = self.session.submit(now_utc()) {
            self.name_cursor = 0;
            self.rut_cursor = 0;
            self.phone_cursor = 0;
            self.email_cursor = 0;
            self.search_cursor = 0;
            self.focus = Focus::Name;
            self.enqueue(Action::LeadCaptured(lead));
        }
    }

    fn open_select_popup(&mut self, target: SelectTarget) {
        self.popup_focus = match target {
            SelectTarget::Projects => PopupFocus::Search,
            SelectTarget::UnitTypes => PopupFocus::List,
        };
        self.list_index = 0;
        self.mode = Mode::SelectPopup(target);
    }

    fn open_prefix_popup(&mut self) {
        self.prefix_index = self
            .prefixes
            .iter()
            .position(|prefix| prefix == self.session.prefix())
            .unwrap_or(0);
        self.mode = Mode::PrefixPopup;
    }

    pub fn select_for(&self, target: SelectTarget) -> &MultiSelect {
        match target {
            SelectTarget::Projects => self.session.projects(),
            SelectTarget::UnitTypes => self.session.unit_types(),
        }
    }

    pub fn popup_row_count(&self, target: SelectTarget) -> usize {
        let select = self.select_for(target);
        let aggregate = usize::from(select.aggregate_visible());
        aggregate + select.visible_options().count()
    }

    fn move_list(&mut self, target: SelectTarget, delta: i32) {
        let len = self.popup_row_count(target) as i32;
        if len == 0 {
            self.list_index = 0;
            return;
        }
        let mut next = self.list_index as i32 + delta;
        if next < 0 {
            next = 0;
        }
        if next >= len {
            next = len - 1;
        }
        self.list_index = next as usize;
    }

    fn toggle_popup_row(&mut self, target: SelectTarget) {
        let select = self.select_for(target);
        let aggregate = select.aggregate_visible();
        let ids: Vec<String> = select
            .visible_options()
            .map(|option| option.id.clone())
            .collect();

        if aggregate && self.list_index == 0 {
            match target {
                SelectTarget::Projects => self.session.toggle_all_projects(),
                SelectTarget::UnitTypes => self.session.toggle_all_unit_types(),
            }
            return;
        }

        let option_index = self.list_index - usize::from(aggregate);
        if let Some(id) = ids.get(option_index) {
            match target {
                SelectTarget::Projects => self.session.toggle_project(id),
                SelectTarget::UnitTypes => self.session.toggle_unit_type(id),
            }
        }
    }

    fn edit_search(&mut self, edit: TextEdit) {
        let value = self.session.projects().search().to_string();
        let chars: Vec<char> = value.chars().collect();
        let cursor = self.search_cursor.min(chars.len());
        match edit {
            TextEdit::Insert(ch) => {
                let mut chars = chars;
                chars.insert(cursor, ch);
                let raw: String = chars.into_iter().collect();
                self.session.search_projects(&raw);
                self.search_cursor = cursor + 1;
            }
            TextEdit::Backspace => {
                if cursor > 0 {
                    let mut chars = chars;
                    chars.remove(cursor - 1);
                    let raw: String = chars.into_iter().collect();
                    self.session.search_projects(&raw);
                    self.search_cursor = cursor - 1;
                }
            }
            TextEdit::Delete => {
                if cursor < chars.len() {
                    let mut chars = chars;
                    chars.remove(cursor);
                    let raw: String = chars.into_iter().collect();
                    self.session.search_projects(&raw);
                    self.search_cursor = cursor;
                }
            }
            TextEdit::Left => self.search_cursor = cursor.saturating_sub(1),
            TextEdit::Right => self.search_cursor = (cursor + 1).min(chars.len()),
            TextEdit::Home => self.search_cursor = 0,
            TextEdit::End => self.search_cursor = chars.len(),
        }
        let rows = self.popup_row_count(SelectTarget::Projects);
        if self.list_index >= rows {
            self.list_index = rows.saturating_sub(1);
        }
    }

    fn edit_active_text(&mut self, edit: TextEdit) {
        let (value, cursor) = match self.focus {
            Focus::Name => (self.session.name().to_string(), self.name_cursor),
            Focus::Rut => (self.session.rut().to_string(), self.rut_cursor),
            Focus::Phone => (self.session.phone().to_string(), self.phone_cursor),
            Focus::Email => (self.session.email().to_string(), self.email_cursor),
            _ => return,
        };
        let chars: Vec<char> = value.chars().collect();
        let cursor = cursor.min(chars.len());

        match edit {
            TextEdit::Insert(ch) => {
                let mut chars = chars;
                chars.insert(cursor, ch);
                let raw: String = chars.into_iter().collect();
                self.apply_text(&raw, cursor + 1);
            }
            TextEdit::Backspace => {
                if cursor > 0 {
                    let mut chars = chars;
                    chars.remove(cursor - 1);
                    let raw: String = chars.into_iter().collect();
                    self.apply_text(&raw, cursor - 1);
                }
            }
            TextEdit::Delete => {
                if cursor < chars.len() {
                    let mut chars = chars;
                    chars.remove(cursor);
                    let raw: String = chars.into_iter().collect();
                    self.apply_text(&raw, cursor);
                }
            }
            TextEdit::Left => self.set_active_cursor(cursor.saturating_sub(1)),
            TextEdit::Right => self.set_active_cursor((cursor + 1).min(chars.len())),
            TextEdit::Home => self.set_active_cursor(0),
            TextEdit::End => self.set_active_cursor(chars.len()),
        }
    }

    fn apply_text(&mut self, raw: &str, cursor: usize) {
        let new_cursor = match self.focus {
            Focus::Name => self.session.edit_name(raw, cursor),
            Focus::Rut => self.session.edit_rut(raw, cursor),
            Focus::Phone => self.session.edit_phone(raw, cursor),
            Focus::Email => self.session.edit_email(raw, cursor),
            _ => return,
        };
        self.set_active_cursor(new_cursor);
    }

    fn set_active_cursor(&mut self, cursor: usize) {
        match self.focus {
            Focus::Name => self.name_cursor = cursor,
            Focus::Rut => self.rut_cursor = cursor,
            Focus::Phone => self.phone_cursor = cursor,
            Focus::Email => self.email_cursor = cursor,
            _ => {}
        }
    }

    pub fn active_cursor(&self) -> Option<usize> {
        match self.focus {
            Focus::Name => Some(self.name_cursor),
            Focus::Rut => Some(self.rut_cursor),
            Focus::Phone => Some(self.phone_cursor),
            Focus::Email => Some(self.email_cursor),
            _ => None,
        }
    }

    fn focus_enabled(&self, focus: Focus) -> bool {
        focus != Focus::UnitTypes || self.session.unit_types_visible()
    }

    fn focus_next(&mut self) {
        let mut idx = FOCUS_ORDER
            .iter()
            .position(|focus| *focus == self.focus)
            .unwrap_or(0);
        loop {
            idx = (idx + 1) % FOCUS_ORDER.len();
            if self.focus_enabled(FOCUS_ORDER[idx]) {
                break;
            }
        }
        self.focus = FOCUS_ORDER[idx];
    }

    fn focus_prev(&mut self) {
        let mut idx = FOCUS_ORDER
            .iter()
            .position(|focus| *focus == self.focus)
            .unwrap_or(0);
        loop {
            idx = (idx + FOCUS_ORDER.len() - 1) % FOCUS_ORDER.len();
            if self.focus_enabled(FOCUS_ORDER[idx]) {
                break;
            }
        }
        self.focus = FOCUS_ORDER[idx];
    }

    fn ensure_focus_valid(&mut self) {
        if !self.focus_enabled(self.focus) {
            self.focus = Focus::Projects;
        }
    }
}
