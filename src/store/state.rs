use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::Context;
use crate::template::{render, render_args};

/// Identity of one output record. Output chunks carry no natural key, so
/// each record gets a process-wide unique id for display keying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uid(u64);

static NEXT_UID: AtomicU64 = AtomicU64::new(1);

impl Uid {
    pub fn next() -> Self {
        Self(NEXT_UID.fetch_add(1, Ordering::Relaxed))
    }

    #[cfg(test)]
    pub(crate) fn fixed(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "out-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandStatus {
    #[default]
    Unstarted,
    Running,
    InputRequired,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub text: String,
    pub uid: Uid,
}

/// A command template as configured, before placeholder resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCommand {
    pub filename: String,
    pub args: Vec<String>,
}

/// One tutorial step as configured. Immutable; activation produces the
/// live [`CurrentPage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: String,
    pub command: Option<PageCommand>,
}

impl Page {
    /// Resolve this page's placeholders against `context` and attach a live
    /// command, making it ready to become the current page.
    pub fn activate(&self, context: &Context) -> CurrentPage {
        CurrentPage {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            body: render(&self.body, context),
            command: self.command.as_ref().map(|command| CurrentCommand {
                filename: render(&command.filename, context),
                args: render_args(&command.args, context),
                status: CommandStatus::Unstarted,
                output: Some(Vec::new()),
                error: false,
            }),
        }
    }
}

/// The live, mutable command bound to the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentCommand {
    pub filename: String,
    pub args: Vec<String>,
    pub status: CommandStatus,
    /// `None` until the first output record initializes it.
    pub output: Option<Vec<OutputLine>>,
    pub error: bool,
}

impl CurrentCommand {
    pub fn command_line(&self) -> String {
        let mut line = self.filename.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentPage {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub body: String,
    pub command: Option<CurrentCommand>,
}

impl CurrentPage {
    /// Reduce this page to its completed-page record: body and command
    /// essentials survive, transient display fields do not.
    pub fn snapshot(&self) -> CompletedPage {
        CompletedPage {
            body: self.body.clone(),
            command: self.command.as_ref().map(|command| CompletedCommand {
                filename: command.filename.clone(),
                args: command.args.clone(),
                output: command.output.clone().unwrap_or_default(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedCommand {
    pub filename: String,
    pub args: Vec<String>,
    pub output: Vec<OutputLine>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPage {
    pub body: String,
    pub command: Option<CompletedCommand>,
}

/// The three ordered partitions of the page list. Pages only ever move
/// left-to-right: `next` → `current` → `completed`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pages {
    pub completed: Vec<CompletedPage>,
    pub current: Option<CurrentPage>,
    pub next: Vec<Page>,
}

impl Pages {
    pub fn total(&self) -> usize {
        self.completed.len() + usize::from(self.current.is_some()) + self.next.len()
    }

    pub fn position(&self) -> usize {
        self.completed.len() + usize::from(self.current.is_some())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppFlags {
    /// Whether advancing requires an explicit user trigger; cleared in the
    /// auto-advancing run modes.
    pub wait_for_trigger: bool,
    pub pin_output: bool,
    /// Terminal flag; once set the run is over.
    pub exit: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    pub app: AppFlags,
    pub cf_context: Context,
    pub pages: Pages,
}
