//! TUI application state and key handling
//!
//! The app wraps the [`Driver`] (which owns the session) and the
//! [`InputCollector`]. Views read from it; only key presses and applied
//! completions change the session.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::debug;

use crate::input::{InputCollector, InputError};
use crate::orchestrator::{Driver, Rejected, Session};

/// Lines moved per PageUp/PageDown
const PAGE_SCROLL: isize = 10;

/// Interactive application state
pub struct App {
    driver: Driver,
    input: InputCollector,
    /// Scroll offset of the reflections pane
    pub scroll: usize,
    /// Upper scroll bound, computed during render
    pub max_scroll: usize,
    /// Transient notice shown above the reflections (not an error banner)
    notice: Option<String>,
    spinner_frame: usize,
    should_quit: bool,
}

impl App {
    pub fn new(driver: Driver) -> Self {
        Self {
            driver,
            input: InputCollector::new(),
            scroll: 0,
            max_scroll: 0,
            notice: None,
            spinner_frame: 0,
            should_quit: false,
        }
    }

    pub fn session(&self) -> &Session {
        self.driver.session()
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn input(&self) -> &InputCollector {
        &self.input
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn spinner_frame(&self) -> usize {
        self.spinner_frame
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Wait for the outstanding call and apply it to the session
    pub async fn next_completion(&mut self) -> bool {
        let changed = self.driver.next_completion().await;
        if changed {
            debug!(phase = self.session().phase().label(), "next_completion: session updated");
            self.sync_input();
        }
        changed
    }

    /// Step the loading spinner
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }

    fn sync_input(&mut self) {
        let enabled = self.driver.session().input_enabled();
        if enabled && !self.input.is_enabled() {
            // Any notice up to now explained a refusal that no longer applies
            self.notice = None;
        }
        self.input.set_enabled(enabled);
    }

    /// Handle a key press; returns true when the app should exit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        debug!(?key, "handle_key: called");

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.should_quit = true;
            }
            KeyCode::Char('n') if ctrl => self.continue_reflection(),
            KeyCode::Char('u') if ctrl => {
                self.input.clear();
            }
            KeyCode::Tab => self.continue_reflection(),
            KeyCode::Esc => self.cancel(),
            KeyCode::Enter => self.submit(),
            KeyCode::Backspace => {
                self.input.backspace();
            }
            KeyCode::Delete => {
                self.input.delete();
            }
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Up => self.scroll_by(-1),
            KeyCode::Down => self.scroll_by(1),
            KeyCode::PageUp => self.scroll_by(-PAGE_SCROLL),
            KeyCode::PageDown => self.scroll_by(PAGE_SCROLL),
            KeyCode::Char(c) if !ctrl => {
                if !self.input.insert(c) {
                    self.notice = Some("Input is disabled while a reflection is being prepared.".to_string());
                }
            }
            _ => {}
        }

        self.sync_input();
        self.should_quit
    }

    fn submit(&mut self) {
        self.notice = None;
        match self.input.submit() {
            Ok(description) => match self.driver.submit(&description) {
                Ok(ticket) => {
                    debug!(%ticket, "submit: request issued");
                    self.scroll = 0;
                }
                // Recorded on the session already
                Err(Rejected::Blank(_)) => {}
                Err(e) => self.notice = Some(e.to_string()),
            },
            Err(InputError::Blank(e)) => self.driver.record_validation_error(e),
            Err(e @ InputError::Disabled) => self.notice = Some(e.to_string()),
        }
    }

    fn continue_reflection(&mut self) {
        if !self.session().continue_visible() {
            return;
        }
        self.notice = None;
        match self.driver.advance() {
            Ok(ticket) => debug!(%ticket, "continue_reflection: request issued"),
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn cancel(&mut self) {
        if let Some(ticket) = self.driver.cancel() {
            debug!(%ticket, "cancel: request abandoned");
            self.sync_input();
            self.notice = Some("Request cancelled.".to_string());
        }
    }

    /// Move the reflections pane; negative is up
    pub fn scroll_by(&mut self, lines: isize) {
        self.scroll = self.scroll.saturating_add_signed(lines).min(self.max_scroll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::config::ReflectionConfig;
    use crate::llm::client::mock::MockLlmClient;
    use crate::orchestrator::Phase;
    use crate::reflection::Reflector;

    fn app(mock: Arc<MockLlmClient>) -> App {
        App::new(Driver::new(Arc::new(Reflector::new(mock, &ReflectionConfig::default()))))
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    async fn settle(app: &mut App) {
        let applied = tokio::time::timeout(Duration::from_secs(1), app.next_completion()).await;
        assert_eq!(applied, Ok(true), "session never settled");
    }

    #[tokio::test]
    async fn test_enter_submits_and_tab_continues() {
        let mock = Arc::new(MockLlmClient::with_texts(&["Reflection A", "Reflection B"]));
        let mut app = app(mock.clone());

        type_text(&mut app, "I feel anxious");
        press(&mut app, KeyCode::Enter);
        assert!(!app.input().is_enabled());
        settle(&mut app).await;

        assert_eq!(app.session().phase(), Phase::Ready);
        assert!(app.input().is_enabled());

        press(&mut app, KeyCode::Tab);
        settle(&mut app).await;

        assert_eq!(app.session().phase(), Phase::Complete);
        assert_eq!(app.session().secondary_text(), Some("Reflection B"));
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn test_blank_enter_shows_validation_error() {
        let mock = Arc::new(MockLlmClient::with_texts(&["unused"]));
        let mut app = app(mock.clone());

        type_text(&mut app, "   ");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.session().phase(), Phase::Idle);
        assert_eq!(
            app.session().error_message(),
            Some("Please describe the concern you wish to explore.")
        );
        assert_eq!(app.driver().calls_issued(), 0);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_typing_refused_while_loading() {
        let mock = Arc::new(MockLlmClient::with_texts(&["A"]).with_delay(Duration::from_millis(30)));
        let mut app = app(mock.clone());

        type_text(&mut app, "grief");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.input().draft(), "grief");
        assert!(app.notice().is_some());
        settle(&mut app).await;
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_tab_ignored_unless_ready() {
        let mock = Arc::new(MockLlmClient::with_texts(&["A"]));
        let mut app = app(mock.clone());

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.session().phase(), Phase::Idle);
        assert_eq!(app.driver().calls_issued(), 0);
    }

    #[tokio::test]
    async fn test_esc_cancels_outstanding_request() {
        let mock = Arc::new(MockLlmClient::with_texts(&["late"]).with_delay(Duration::from_millis(30)));
        let mut app = app(mock);

        type_text(&mut app, "grief");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.session().phase(), Phase::Idle);
        assert!(app.input().is_enabled());
        assert_eq!(app.notice(), Some("Request cancelled."));
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!app.driver().has_outstanding());
        assert!(app.session().initial_text().is_none());
    }

    #[tokio::test]
    async fn test_refusal_notice_clears_when_reflection_arrives() {
        let mock = Arc::new(MockLlmClient::with_texts(&["A"]).with_delay(Duration::from_millis(30)));
        let mut app = app(mock);

        type_text(&mut app, "grief");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(
            app.notice(),
            Some("Input is disabled while a reflection is being prepared.")
        );

        settle(&mut app).await;

        assert_eq!(app.session().phase(), Phase::Ready);
        assert!(app.input().is_enabled());
        assert!(app.notice().is_none());
    }

    #[tokio::test]
    async fn test_ctrl_c_quits() {
        let mut app = app(Arc::new(MockLlmClient::new(vec![])));
        assert!(app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(app.should_quit());
    }

    #[tokio::test]
    async fn test_scroll_clamped() {
        let mut app = app(Arc::new(MockLlmClient::new(vec![])));
        app.max_scroll = 5;
        press(&mut app, KeyCode::PageDown);
        assert_eq!(app.scroll, 5);
        press(&mut app, KeyCode::Up);
        assert_eq!(app.scroll, 4);
        press(&mut app, KeyCode::PageUp);
        assert_eq!(app.scroll, 0);
    }
}
