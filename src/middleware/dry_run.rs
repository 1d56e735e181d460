use crate::event::Action;
use crate::store::{Flow, Middleware, State, Uid};

/// Substitute for [`super::CommandRuntime`] in dry runs: pretends every
/// command succeeds without spawning anything. The run trigger itself is
/// consumed; the simulated lifecycle actions stand in for it.
#[derive(Debug, Default)]
pub struct DryRun;

impl Middleware for DryRun {
    fn handle(
        &mut self,
        action: &Action,
        state: &State,
        emit: &mut dyn FnMut(Action),
    ) -> Flow {
        let Action::RunCommand = action else {
            return Flow::Forward;
        };
        if let Some(command) = state
            .pages
            .current
            .as_ref()
            .and_then(|page| page.command.as_ref())
        {
            emit(Action::Started);
            emit(Action::OutputReceived {
                text: format!("pretending to run \"{}\"", command.command_line()),
                uid: Uid::next(),
            });
            emit(Action::Finished { error: None });
        }
        Flow::Suppress
    }
}

#[cfg(test)]
mod tests {
    use super::DryRun;
    use crate::event::Action;
    use crate::store::{
        CommandStatus, CurrentCommand, CurrentPage, Flow, Middleware, Pages, State, Store,
    };

    fn state_with_command() -> State {
        State {
            pages: Pages {
                completed: Vec::new(),
                current: Some(CurrentPage {
                    title: None,
                    subtitle: None,
                    body: "Let us pretend to run a real command".to_string(),
                    command: Some(CurrentCommand {
                        filename: "a".to_string(),
                        args: vec!["real".to_string(), "command".to_string()],
                        status: CommandStatus::Unstarted,
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
    fn run_command_is_simulated_and_consumed() {
        let mut dry = DryRun;
        let state = state_with_command();
        let mut emitted = Vec::new();

        let flow = dry.handle(&Action::RunCommand, &state, &mut |action| {
            emitted.push(action);
        });

        assert_eq!(flow, Flow::Suppress);
        assert_eq!(emitted.len(), 3);
        assert_eq!(emitted[0], Action::Started);
        match &emitted[1] {
            Action::OutputReceived { text, .. } => {
                assert_eq!(text, "pretending to run \"a real command\"");
            }
            other => panic!("expected pretend output, got {other:?}"),
        }
        assert_eq!(emitted[2], Action::Finished { error: None });
    }

    #[test]
    fn other_actions_pass_through_untouched() {
        let mut dry = DryRun;
        let state = state_with_command();
        let mut emitted = Vec::new();

        let flow = dry.handle(&Action::ExitApp, &state, &mut |action| {
            emitted.push(action);
        });

        assert_eq!(flow, Flow::Forward);
        assert!(emitted.is_empty());
    }

    #[test]
    fn the_simulated_cascade_settles_within_one_dispatch() {
        let mut store = Store::new(state_with_command(), vec![Box::new(DryRun)]);

        store.dispatch(Action::RunCommand);

        let command = store
            .state()
            .pages
            .current
            .as_ref()
            .expect("current page should survive the dry run")
            .command
            .as_ref()
            .expect("current command should survive the dry run");
        assert_eq!(command.status, CommandStatus::Finished);
        assert!(!command.error);
        let output = command.output.as_ref().expect("pretend output should be recorded");
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].text, "pretending to run \"a real command\"");
    }
}
