use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::debug;

use crate::config::Config;
use crate::form::ParamForm;
use crate::sim::{AnimationController, Scene};

pub struct App {
    pub should_quit: bool,
    pub controller: AnimationController<Scene>,
    pub form: ParamForm,
    /// One-shot hint shown in the status bar until the next key.
    pub notice: Option<String>,
    /// When the next frame is due; at most one is pending.
    deadline: Option<Instant>,
}

/// Deadline of the next frame. A freshly scheduled delay wins; otherwise a
/// pending deadline is kept, and a running animation without one is due now.
pub fn next_deadline(
    current: Option<Instant>,
    running: bool,
    schedule: Option<Duration>,
    now: Instant,
) -> Option<Instant> {
    match (schedule, current) {
        (Some(delay), _) => Some(now + delay),
        (None, Some(pending)) => Some(pending),
        (None, None) if running => Some(now),
        (None, None) => None,
    }
}

impl App {
    pub fn new(config: &Config) -> Self {
        let scene = Scene::new(config.canvas.width, config.canvas.height);
        let mut app = Self {
            should_quit: false,
            controller: AnimationController::new(scene, config.defaults, config.controller_options()),
            form: ParamForm::new(config.defaults),
            notice: None,
            deadline: None,
        };
        app.reset();
        app
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Run the due frame; its deadline is spent.
    pub fn on_tick(&mut self) {
        self.deadline = None;
        self.controller.tick();
    }

    /// Schedule the next frame from the measured work of the last one.
    pub fn frame_done(&mut self, work: Duration) {
        let delay = self.controller.schedule(work);
        self.deadline = next_deadline(None, self.controller.is_running(), delay, Instant::now());
    }

    pub fn on_key(&mut self, key: KeyEvent) {
        self.handle_key(key);
        self.deadline =
            next_deadline(self.deadline, self.controller.is_running(), None, Instant::now());
    }

    fn handle_key(&mut self, key: KeyEvent) {
        // Ctrl+C always quits
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        self.notice = None;

        // While typing into an entry, intercept all input
        if self.form.is_editing() {
            self.handle_edit_input(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') | KeyCode::Char('p') | KeyCode::Char('P') => {
                self.controller.play_pause()
            }
            KeyCode::Char('s') | KeyCode::Char('S') => self.controller.stop(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.read(),
            KeyCode::Char('d') | KeyCode::Char('D') => self.reset(),
            KeyCode::Char('+') | KeyCode::Char('=') => self.controller.scale_time(true),
            KeyCode::Char('-') | KeyCode::Char('_') => self.controller.scale_time(false),
            KeyCode::Up | KeyCode::BackTab => self.form.select_prev(),
            KeyCode::Down | KeyCode::Tab => self.form.select_next(),
            KeyCode::Enter | KeyCode::Char('e') | KeyCode::Char('E') => {
                if !self.form.begin_edit(self.controller.is_running()) {
                    let label = self.form.selected().label();
                    debug!("edit of {} refused while playing", label);
                    self.notice = Some(format!("{} is locked while playing", label));
                }
            }
            _ => {}
        }
    }

    fn handle_edit_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.form.commit_edit();
                self.read();
            }
            KeyCode::Esc => self.form.cancel_edit(),
            KeyCode::Backspace => self.form.pop_char(),
            KeyCode::Delete => self.form.clear_buffer(),
            KeyCode::Char(c) => self.form.push_char(c),
            _ => {}
        }
    }

    /// Parse the entries into the simulation.
    fn read(&mut self) {
        let setup = self.form.read();
        self.controller.apply(setup);
    }

    /// Default entries and time scale, then read them.
    fn reset(&mut self) {
        self.form.restore_defaults();
        self.controller.restore_timescale();
        self.read();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{ParamField, RunState};

    fn press(app: &mut App, code: KeyCode) {
        app.on_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn space_toggles_and_s_stops() {
        let mut app = App::new(&Config::default());
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.controller.run_state(), RunState::Running);
        app.on_tick();
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.controller.run_state(), RunState::Paused);
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.controller.run_state(), RunState::Idle);
        assert_eq!(app.controller.state(), Config::default().defaults.initial_state());
    }

    #[test]
    fn typing_garbage_then_enter_restores_default_text() {
        let mut app = App::new(&Config::default());
        // select B
        for _ in 0..6 {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Delete);
        type_text(&mut app, "abc");
        assert_eq!(app.form.edit_buffer(), Some("abc"));
        press(&mut app, KeyCode::Enter);
        assert!(!app.form.is_editing());
        assert_eq!(app.form.text(ParamField::Field), "1.000e-3");
        assert_eq!(app.controller.physics().field, 1e-3);
    }

    #[test]
    fn static_entry_is_locked_while_playing() {
        let mut app = App::new(&Config::default());
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);
        assert!(!app.form.is_editing());
        assert!(app.notice.as_deref().unwrap_or_default().contains("locked"));
    }

    #[test]
    fn live_edit_reaches_the_running_simulation() {
        let mut app = App::new(&Config::default());
        press(&mut app, KeyCode::Char(' '));
        app.on_tick();
        let before = app.controller.state();
        // select E
        for _ in 0..7 {
            press(&mut app, KeyCode::Down);
        }
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Delete);
        type_text(&mut app, "20");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.controller.physics().amplitude, 20.0);
        assert_eq!(app.controller.state(), before);
        assert_eq!(app.controller.run_state(), RunState::Running);
    }

    #[test]
    fn reset_restores_timescale_and_entries() {
        let mut app = App::new(&Config::default());
        press(&mut app, KeyCode::Char('+'));
        assert!(app.controller.timescale() > 6.7e-5);
        app.form.set_text(ParamField::Gap, "0.1");
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.controller.timescale(), 6.7e-5);
        assert_eq!(app.form.text(ParamField::Gap), "2.000e-2");
    }

    #[test]
    fn next_deadline_prefers_a_fresh_schedule() {
        let now = Instant::now();
        let pending = now + Duration::from_millis(3);
        let delay = Duration::from_millis(10);
        assert_eq!(next_deadline(Some(pending), true, Some(delay), now), Some(now + delay));
        assert_eq!(next_deadline(Some(pending), true, None, now), Some(pending));
        assert_eq!(next_deadline(Some(pending), false, None, now), Some(pending));
        assert_eq!(next_deadline(None, true, None, now), Some(now));
        assert_eq!(next_deadline(None, false, None, now), None);
    }

    #[test]
    fn play_pause_toggles_keep_a_single_pending_frame() {
        let mut app = App::new(&Config::default());
        assert_eq!(app.deadline(), None);
        press(&mut app, KeyCode::Char(' '));
        let first = app.deadline();
        assert!(first.is_some());

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.controller.run_state(), RunState::Paused);
        assert_eq!(app.deadline(), first);
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.controller.run_state(), RunState::Running);
        assert_eq!(app.deadline(), first);
    }

    #[test]
    fn running_frame_schedules_the_next_one() {
        let mut app = App::new(&Config::default());
        press(&mut app, KeyCode::Char(' '));
        app.on_tick();
        assert_eq!(app.deadline(), None);
        let before = Instant::now();
        app.frame_done(Duration::ZERO);
        // default fps is 100
        let due = app.deadline().unwrap();
        assert!(due >= before + Duration::from_millis(10));
    }

    #[test]
    fn stop_lets_the_due_frame_run_then_schedules_nothing() {
        let mut app = App::new(&Config::default());
        press(&mut app, KeyCode::Char(' '));
        let due = app.deadline();
        press(&mut app, KeyCode::Char('s'));
        assert_eq!(app.controller.run_state(), RunState::Idle);
        assert_eq!(app.deadline(), due);

        app.on_tick();
        app.frame_done(Duration::ZERO);
        assert_eq!(app.deadline(), None);
        assert_eq!(app.controller.state(), Config::default().defaults.initial_state());
    }

    #[test]
    fn ended_run_schedules_nothing() {
        let mut config = Config::default();
        config.timescale = 1.0;
        config.defaults.vx0 = 1000.0;
        config.defaults.field = 0.0;
        let mut app = App::new(&config);
        press(&mut app, KeyCode::Char(' '));
        // 10 m in one frame on a 1 m wide canvas
        app.on_tick();
        assert_eq!(app.controller.run_state(), RunState::Ended);
        app.frame_done(Duration::ZERO);
        assert_eq!(app.deadline(), None);

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.deadline(), None);
    }

    #[test]
    fn q_quits() {
        let mut app = App::new(&Config::default());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
