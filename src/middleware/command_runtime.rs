use tokio::sync::mpsc::UnboundedSender;

use crate::event::{Action, DomainEvent};
use crate::exec::{CommandRunner, CommandSpec, ProcessHandlers, RunningCommand};
use crate::store::{Flow, Middleware, State, Uid};

/// Trailing-prompt heuristic for detecting a process blocked on stdin.
/// Approximate by nature; the sole signal this pipeline uses.
pub const INPUT_PROMPT_SENTINEL: &str = "> ";

/// Drives the one live external process: reacts to run/input/exit actions,
/// translates process lifecycle callbacks back into actions on the loop
/// channel, and forwards everything it consumes.
pub struct CommandRuntime {
    runner: Box<dyn CommandRunner>,
    events_tx: UnboundedSender<DomainEvent>,
    running: Option<RunningCommand>,
}

impl CommandRuntime {
    pub(crate) fn new(runner: Box<dyn CommandRunner>, events_tx: UnboundedSender<DomainEvent>) -> Self {
        Self {
            runner,
            events_tx,
            running: None,
        }
    }

    fn start_current(&mut self, state: &State, emit: &mut dyn FnMut(Action)) {
        let Some(command) = state
            .pages
            .current
            .as_ref()
            .and_then(|page| page.command.as_ref())
        else {
            return;
        };
        let spec = CommandSpec {
            filename: command.filename.clone(),
            args: command.args.clone(),
        };
        match self.runner.start(&spec, Self::handlers(self.events_tx.clone())) {
            Ok(running) => {
                self.running = Some(running);
                emit(Action::Started);
            }
            Err(err) => emit(Action::Finished {
                error: Some(format!("{spec}: {err}")),
            }),
        }
    }

    fn handlers(events: UnboundedSender<DomainEvent>) -> ProcessHandlers {
        let stdout_events = events.clone();
        let stderr_events = events.clone();
        ProcessHandlers {
            stdout: Box::new(move |text| {
                let awaits_input = text.ends_with(INPUT_PROMPT_SENTINEL);
                let _ = stdout_events.send(DomainEvent::Action(Action::OutputReceived {
                    text,
                    uid: Uid::next(),
                }));
                if awaits_input {
                    let _ = stdout_events.send(DomainEvent::Action(Action::InputRequired));
                }
            }),
            stderr: Box::new(move |text| {
                let _ = stderr_events.send(DomainEvent::Action(Action::OutputReceived {
                    text,
                    uid: Uid::next(),
                }));
            }),
            exit: Box::new(move |error| {
                let _ = events.send(DomainEvent::Action(Action::Finished { error }));
            }),
        }
    }
}

impl Middleware for CommandRuntime {
    fn handle(
        &mut self,
        action: &Action,
        state: &State,
        emit: &mut dyn FnMut(Action),
    ) -> Flow {
        match action {
            Action::RunCommand => {
                // A second trigger while a process is live is ignored; the
                // handle is never silently replaced.
                if self.running.is_none() {
                    self.start_current(state, emit);
                }
            }
            Action::InputReceived(input) => {
                if let Some(running) = &self.running {
                    let _ = running.write_input(format!("{input}\n"));
                }
            }
            Action::Finished { .. } => {
                self.running = None;
            }
            Action::ExitApp => {
                if let Some(mut running) = self.running.take() {
                    running.cancel();
                }
            }
            _ => {}
        }
        Flow::Forward
    }
}
