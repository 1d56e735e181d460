use crate::error::AppResult;
use crate::event::{Action, DomainEvent};
use crate::input::InputRouter;
use crate::store::{CommandStatus, State, Store};
use crate::ui;

use super::core::App;
use super::event_bus::EventBusRuntime;
use super::terminal_session::TerminalSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub command_failed: bool,
}

impl App {
    pub async fn run(&mut self) -> AppResult<RunOutcome> {
        let (events_tx, mut events_rx, mut bus) = EventBusRuntime::spawn();
        let mut store = self.build_store(&events_tx);
        let mut router = InputRouter::new();
        let mut session = TerminalSession::enter()?;

        loop {
            advance_until_waiting(&mut store);
            if store.state().app.exit {
                break;
            }
            session.draw(|frame| ui::draw(frame, store.state(), router.editor()))?;

            match events_rx.recv().await {
                None => break,
                Some(DomainEvent::Terminal(event)) => {
                    if let Some(action) = router.route(&event, store.state()) {
                        store.dispatch(action);
                    }
                }
                Some(DomainEvent::TerminalError(_)) => {}
                Some(DomainEvent::Action(action)) => store.dispatch(action),
            }
        }

        bus.shutdown();
        session.restore()?;
        Ok(RunOutcome {
            command_failed: failed_command(store.state()),
        })
    }
}

/// Dispatch every transition the state already implies before sleeping on
/// the channel: an exhausted page list ends the run; in the auto-advance
/// modes, unstarted commands run and finished pages complete without a
/// user trigger.
pub(crate) fn advance_until_waiting(store: &mut Store) {
    loop {
        let state = store.state();
        if state.app.exit {
            return;
        }
        match pending_transition(state) {
            Some(action) => store.dispatch(action),
            None => return,
        }
    }
}

fn pending_transition(state: &State) -> Option<Action> {
    let Some(page) = state.pages.current.as_ref() else {
        return Some(Action::ExitApp);
    };
    if state.app.wait_for_trigger {
        return None;
    }
    match page.command.as_ref() {
        None => Some(Action::Completed),
        Some(command) => match command.status {
            CommandStatus::Unstarted => Some(Action::RunCommand),
            CommandStatus::Finished => Some(Action::Completed),
            CommandStatus::Running | CommandStatus::InputRequired => None,
        },
    }
}

fn failed_command(state: &State) -> bool {
    state
        .pages
        .current
        .as_ref()
        .and_then(|page| page.command.as_ref())
        .is_some_and(|command| command.error)
}
