use crate::event::Action;

use super::state::{CommandStatus, CurrentCommand, OutputLine, State};

/// Fold one action into state. Pure: the caller's state is untouched and a
/// fresh value is returned for every transition.
pub fn reduce(state: &State, action: &Action) -> State {
    match action {
        Action::Started => with_current_command(state, |command| {
            command.status = CommandStatus::Running;
        }),
        Action::OutputReceived { text, uid } => with_current_command(state, |command| {
            command.output.get_or_insert_with(Vec::new).push(OutputLine {
                text: text.clone(),
                uid: *uid,
            });
        }),
        Action::InputRequired => with_current_command(state, |command| {
            command.status = CommandStatus::InputRequired;
        }),
        Action::InputReceived(_) => with_current_command(state, |command| {
            command.status = CommandStatus::Running;
        }),
        Action::Finished { error } => {
            let mut next = with_current_command(state, |command| {
                command.status = CommandStatus::Finished;
                command.error = error.is_some();
            });
            if error.is_some() {
                next.app.exit = true;
            }
            next
        }
        Action::Completed => advance_page(state),
        Action::UpdateCfContext(patch) => {
            let mut next = state.clone();
            next.cf_context.merge(patch.clone());
            next
        }
        Action::ExitApp => {
            let mut next = state.clone();
            next.app.exit = true;
            next
        }
        // Orchestration-only trigger; no state transition of its own.
        Action::RunCommand => state.clone(),
    }
}

fn with_current_command(state: &State, apply: impl FnOnce(&mut CurrentCommand)) -> State {
    let mut next = state.clone();
    if let Some(page) = next.pages.current.as_mut()
        && let Some(command) = page.command.as_mut()
    {
        apply(command);
    }
    next
}

/// Snapshot the current page into `completed` and activate the head of
/// `next` against the accumulated context, or leave `current` absent when
/// the tutorial is exhausted.
fn advance_page(state: &State) -> State {
    let mut next = state.clone();
    let Some(current) = next.pages.current.take() else {
        return next;
    };
    next.pages.completed.push(current.snapshot());
    if !next.pages.next.is_empty() {
        let page = next.pages.next.remove(0);
        next.pages.current = Some(page.activate(&next.cf_context));
    }
    next
}
