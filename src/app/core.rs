use tokio::sync::mpsc::UnboundedSender;

use crate::config::Config;
use crate::event::DomainEvent;
use crate::exec::ProcessRunner;
use crate::middleware::{CfContextExtractor, CommandRuntime, DryRun};
use crate::store::{Middleware, Store};

pub struct App {
    pub(crate) config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Wire the pipeline for the configured run mode: the dry-run
    /// middleware substitutes for the command runtime when execution is
    /// simulated; context extraction observes either way.
    pub(crate) fn build_store(&self, events_tx: &UnboundedSender<DomainEvent>) -> Store {
        let runtime: Box<dyn Middleware> = if self.config.mode.is_dry() {
            Box::new(DryRun)
        } else {
            Box::new(CommandRuntime::new(
                Box::new(ProcessRunner),
                events_tx.clone(),
            ))
        };
        let middlewares: Vec<Box<dyn Middleware>> =
            vec![runtime, Box::new(CfContextExtractor::new())];
        Store::new(self.config.initial_state(), middlewares)
    }
}
