mod middleware;
mod reducer;
mod state;

pub use middleware::{Flow, Middleware};
pub use reducer::reduce;
pub use state::{
    AppFlags, CommandStatus, CompletedCommand, CompletedPage, CurrentCommand, CurrentPage,
    OutputLine, Page, PageCommand, Pages, State, Uid,
};

use std::collections::VecDeque;

use crate::event::Action;

/// Owns the canonical state and the middleware chain. Dispatch drains the
/// whole queue before returning, so a synchronous action cascade settles
/// within one call; processing is strictly one action at a time in arrival
/// order.
pub struct Store {
    state: State,
    middlewares: Vec<Box<dyn Middleware>>,
    queue: VecDeque<Action>,
}

impl Store {
    pub fn new(initial: State, middlewares: Vec<Box<dyn Middleware>>) -> Self {
        Self {
            state: initial,
            middlewares,
            queue: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn dispatch(&mut self, action: Action) {
        self.queue.push_back(action);
        while let Some(action) = self.queue.pop_front() {
            let mut emitted = Vec::new();
            let mut flow = Flow::Forward;
            for middleware in &mut self.middlewares {
                match middleware.handle(&action, &self.state, &mut |follow_up| {
                    emitted.push(follow_up);
                }) {
                    Flow::Forward => {}
                    Flow::Suppress => {
                        flow = Flow::Suppress;
                        break;
                    }
                }
            }
            if flow == Flow::Forward {
                self.state = reduce(&self.state, &action);
            }
            self.queue.extend(emitted);
        }
    }
}
