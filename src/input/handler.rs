use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use crate::event::Action;
use crate::store::{CommandStatus, State};

/// Maps terminal events to pipeline actions for the current state. While a
/// command awaits input, keystrokes feed the line editor instead of
/// triggering anything.
#[derive(Default)]
pub struct InputRouter {
    editor: Input,
}

impl InputRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stdin line being edited, for rendering.
    pub fn editor(&self) -> &Input {
        &self.editor
    }

    pub fn route(&mut self, event: &Event, state: &State) -> Option<Action> {
        match event {
            Event::Key(key) if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) => {
                self.route_key(*key, state)
            }
            _ => None,
        }
    }

    fn route_key(&mut self, key: KeyEvent, state: &State) -> Option<Action> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Action::ExitApp);
        }

        if current_status(state) == Some(CommandStatus::InputRequired) {
            return self.route_editor_key(key);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::ExitApp),
            KeyCode::Char(' ') if state.app.wait_for_trigger => trigger_action(state),
            _ => None,
        }
    }

    fn route_editor_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => {
                let line = self.editor.value().to_string();
                self.editor.reset();
                Some(Action::InputReceived(line))
            }
            _ => {
                self.editor.handle_event(&Event::Key(key));
                None
            }
        }
    }
}

/// The transition a trigger means right now, if any: run an unstarted
/// command, advance past a finished one or past a command-less page.
fn trigger_action(state: &State) -> Option<Action> {
    let page = state.pages.current.as_ref()?;
    match &page.command {
        None => Some(Action::Completed),
        Some(command) => match command.status {
            CommandStatus::Unstarted => Some(Action::RunCommand),
            CommandStatus::Finished => Some(Action::Completed),
            CommandStatus::Running | CommandStatus::InputRequired => None,
        },
    }
}

fn current_status(state: &State) -> Option<CommandStatus> {
    state
        .pages
        .current
        .as_ref()?
        .command
        .as_ref()
        .map(|command| command.status)
}

#[cfg(test)]
mod tests {
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

    use super::InputRouter;
    use crate::event::Action;
    use crate::store::{
        AppFlags, CommandStatus, CurrentCommand, CurrentPage, Pages, State,
    };

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn state(status: Option<CommandStatus>, wait_for_trigger: bool) -> State {
        State {
            app: AppFlags {
                wait_for_trigger,
                pin_output: false,
                exit: false,
            },
            pages: Pages {
                completed: Vec::new(),
                current: Some(CurrentPage {
                    title: None,
                    subtitle: None,
                    body: "a page".to_string(),
                    command: status.map(|status| CurrentCommand {
                        filename: "command".to_string(),
                        args: Vec::new(),
                        status,
                        output: Some(Vec::new()),
                        error: false,
                    }),
                }),
                next: Vec::new(),
            },
            ..State::default()
        }
    }

    #[test]
    fn space_runs_an_unstarted_command() {
        let mut router = InputRouter::new();
        let state = state(Some(CommandStatus::Unstarted), true);

        assert_eq!(
            router.route(&key(KeyCode::Char(' ')), &state),
            Some(Action::RunCommand)
        );
    }

    #[test]
    fn space_advances_past_a_finished_command() {
        let mut router = InputRouter::new();
        let state = state(Some(CommandStatus::Finished), true);

        assert_eq!(
            router.route(&key(KeyCode::Char(' ')), &state),
            Some(Action::Completed)
        );
    }

    #[test]
    fn space_advances_past_a_page_without_a_command() {
        let mut router = InputRouter::new();
        let state = state(None, true);

        assert_eq!(
            router.route(&key(KeyCode::Char(' ')), &state),
            Some(Action::Completed)
        );
    }

    #[test]
    fn space_is_inert_while_a_command_runs() {
        let mut router = InputRouter::new();
        let state = state(Some(CommandStatus::Running), true);

        assert_eq!(router.route(&key(KeyCode::Char(' ')), &state), None);
    }

    #[test]
    fn triggers_are_reserved_for_interactive_mode() {
        let mut router = InputRouter::new();
        let state = state(Some(CommandStatus::Unstarted), false);

        assert_eq!(router.route(&key(KeyCode::Char(' ')), &state), None);
    }

    #[test]
    fn typed_input_is_buffered_and_submitted_on_enter() {
        let mut router = InputRouter::new();
        let state = state(Some(CommandStatus::InputRequired), true);

        for ch in "yes".chars() {
            assert_eq!(router.route(&key(KeyCode::Char(ch)), &state), None);
        }
        assert_eq!(
            router.route(&key(KeyCode::Enter), &state),
            Some(Action::InputReceived("yes".to_string()))
        );
        assert_eq!(router.editor().value(), "");
    }

    #[test]
    fn quit_keys_are_not_swallowed_by_the_editor() {
        let mut router = InputRouter::new();
        let editing = state(Some(CommandStatus::InputRequired), true);

        // `q` is text while editing...
        assert_eq!(router.route(&key(KeyCode::Char('q')), &editing), None);
        assert_eq!(router.editor().value(), "q");

        // ...but ctrl-c always quits.
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(router.route(&ctrl_c, &editing), Some(Action::ExitApp));
    }

    #[test]
    fn q_and_escape_quit_outside_the_editor() {
        let mut router = InputRouter::new();
        let state = state(Some(CommandStatus::Unstarted), true);

        assert_eq!(router.route(&key(KeyCode::Char('q')), &state), Some(Action::ExitApp));
        assert_eq!(router.route(&key(KeyCode::Esc), &state), Some(Action::ExitApp));
    }

    #[test]
    fn key_release_events_are_ignored() {
        let mut router = InputRouter::new();
        let state = state(Some(CommandStatus::Unstarted), true);
        let mut release = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE);
        release.kind = crossterm::event::KeyEventKind::Release;

        assert_eq!(router.route(&Event::Key(release), &state), None);
    }
}
