use crate::context::Context;
use crate::store::Uid;

/// Actions flowing through the store pipeline.
///
/// Middlewares react to these and may emit follow-ups; the reducer folds
/// whatever survives the chain into state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Trigger for the current page's command. Consumed by the runtime
    /// middlewares; the reducer treats it as a no-op.
    RunCommand,
    Started,
    OutputReceived { text: String, uid: Uid },
    InputRequired,
    /// User input destined for the running command's stdin.
    InputReceived(String),
    /// Terminal for a command. An abnormal exit carries its description.
    Finished { error: Option<String> },
    /// Advance past the current page.
    Completed,
    UpdateCfContext(Context),
    ExitApp,
}

#[derive(Debug)]
pub(crate) enum DomainEvent {
    Terminal(crossterm::event::Event),
    TerminalError(String),
    Action(Action),
}
