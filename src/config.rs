use std::fs;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

use crate::context::Context;
use crate::error::{AppError, AppResult};
use crate::store::{AppFlags, Page, PageCommand, Pages, State};

const DEFAULT_TUTORIAL: &str = include_str!("../tutorials/cfpush.toml");

#[derive(Debug, Parser)]
#[command(
    name = "cftutor",
    about = "An interactive Cloud Foundry tutorial in your terminal"
)]
pub struct Cli {
    /// Tutorial document to play; the built-in tutorial when absent.
    pub tutorial: Option<PathBuf>,
    /// Simulate command execution without spawning processes.
    #[arg(long, conflicts_with = "ci")]
    pub dry: bool,
    /// Auto-advance through pages with real execution.
    #[arg(long)]
    pub ci: bool,
    /// Keep the output view pinned to the latest lines.
    #[arg(long)]
    pub pin_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Interactive: every page waits for its trigger.
    Tutorial,
    /// Auto-advance, simulated execution.
    Dry,
    /// Auto-advance, real execution.
    Ci,
}

impl RunMode {
    pub fn from_flags(dry: bool, ci: bool) -> Self {
        if ci {
            Self::Ci
        } else if dry {
            Self::Dry
        } else {
            Self::Tutorial
        }
    }

    pub fn wait_for_trigger(self) -> bool {
        matches!(self, Self::Tutorial)
    }

    pub fn is_dry(self) -> bool {
        matches!(self, Self::Dry)
    }
}

#[derive(Debug, Deserialize)]
struct TutorialDoc {
    #[serde(default)]
    page: Vec<PageDoc>,
}

#[derive(Debug, Deserialize)]
struct PageDoc {
    title: Option<String>,
    subtitle: Option<String>,
    body: String,
    command: Option<String>,
}

/// Login material for the non-interactive CI rewrite of the SSO login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CiCredentials {
    pub username: String,
    pub password: String,
    pub org: String,
    pub space: String,
}

impl CiCredentials {
    pub fn from_env() -> Option<Self> {
        let read = |name: &str| std::env::var(name).ok().filter(|value| !value.is_empty());
        Some(Self {
            username: read("CF_USERNAME")?,
            password: read("CF_PASSWORD")?,
            org: read("CF_ORG")?,
            space: read("CF_SPACE")?,
        })
    }

    fn login_command(&self) -> PageCommand {
        PageCommand {
            filename: "cf".to_string(),
            args: vec![
                "login".to_string(),
                "-a".to_string(),
                "api.run.pivotal.io".to_string(),
                "-u".to_string(),
                self.username.clone(),
                "-p".to_string(),
                self.password.clone(),
                "-o".to_string(),
                self.org.clone(),
                "-s".to_string(),
                self.space.clone(),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: RunMode,
    pub pin_output: bool,
    pages: Vec<Page>,
}

impl Config {
    pub fn load(cli: &Cli) -> AppResult<Self> {
        let raw = match &cli.tutorial {
            Some(path) => fs::read_to_string(path).map_err(|source| {
                AppError::io_with_context(
                    source,
                    format!("failed to read tutorial: {}", path.display()),
                )
            })?,
            None => DEFAULT_TUTORIAL.to_string(),
        };
        let mode = RunMode::from_flags(cli.dry, cli.ci);
        let credentials = if mode == RunMode::Ci {
            Some(CiCredentials::from_env().ok_or_else(|| {
                AppError::invalid_argument(
                    "ci mode requires CF_USERNAME, CF_PASSWORD, CF_ORG and CF_SPACE",
                )
            })?)
        } else {
            None
        };
        Self::parse(&raw, mode, cli.pin_output, credentials.as_ref())
    }

    pub fn parse(
        raw: &str,
        mode: RunMode,
        pin_output: bool,
        credentials: Option<&CiCredentials>,
    ) -> AppResult<Self> {
        let doc: TutorialDoc = toml::from_str(raw)
            .map_err(|source| AppError::tutorial(format!("failed to parse tutorial: {source}")))?;
        if doc.page.is_empty() {
            return Err(AppError::tutorial("tutorial has no pages"));
        }
        let pages = doc
            .page
            .into_iter()
            .map(|page| page_from_doc(page, credentials))
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self {
            mode,
            pin_output,
            pages,
        })
    }

    /// The state a run begins from: first page activated against the empty
    /// context, everything else still in `next`.
    pub fn initial_state(&self) -> State {
        let mut next = self.pages.clone();
        let first = next.remove(0);
        let cf_context = Context::new();
        State {
            app: AppFlags {
                wait_for_trigger: self.mode.wait_for_trigger(),
                pin_output: self.pin_output,
                exit: false,
            },
            pages: Pages {
                completed: Vec::new(),
                current: Some(first.activate(&cf_context)),
                next,
            },
            cf_context,
        }
    }
}

fn page_from_doc(page: PageDoc, credentials: Option<&CiCredentials>) -> AppResult<Page> {
    let command = page.command.map(|line| parse_command_line(&line)).transpose()?;
    let command = match (command, credentials) {
        (Some(command), Some(credentials)) if is_cf_login(&command) => {
            Some(credentials.login_command())
        }
        (command, _) => command,
    };
    Ok(Page {
        title: page.title,
        subtitle: page.subtitle,
        body: page.body,
        command,
    })
}

fn parse_command_line(line: &str) -> AppResult<PageCommand> {
    let mut parts = line.split_whitespace().map(str::to_string);
    let Some(filename) = parts.next() else {
        return Err(AppError::tutorial("page command is empty"));
    };
    Ok(PageCommand {
        filename,
        args: parts.collect(),
    })
}

fn is_cf_login(command: &PageCommand) -> bool {
    command.filename == "cf" && command.args.first().map(String::as_str) == Some("login")
}
