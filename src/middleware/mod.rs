mod cf_context;
mod command_runtime;
mod dry_run;

pub use cf_context::CfContextExtractor;
pub use command_runtime::{CommandRuntime, INPUT_PROMPT_SENTINEL};
pub use dry_run::DryRun;
