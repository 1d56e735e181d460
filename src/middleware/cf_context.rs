use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::context::{Context, ContextValue};
use crate::event::Action;
use crate::store::{CurrentCommand, Flow, Middleware, State};

fn route_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?m)^\s*routes:\s+([A-Za-z0-9][A-Za-z0-9-]*(?:\.[A-Za-z0-9-]+)+)")
            .expect("route pattern should compile")
    })
}

/// Read-only observer of command output. When the current command is a
/// route-reporting `cf` invocation, the assigned route is lifted into the
/// context under the app's name so later pages can reference it. No match
/// is the common case and produces nothing.
pub struct CfContextExtractor {
    rules: Vec<ExtractionRule>,
}

struct ExtractionRule {
    /// `cf` subcommand whose output this rule scans.
    subcommand: &'static str,
}

impl ExtractionRule {
    /// The app name, when `command` is an invocation this rule covers.
    fn applies_to<'a>(&self, command: &'a CurrentCommand) -> Option<&'a str> {
        if command.filename != "cf" {
            return None;
        }
        let mut args = command.args.iter();
        if args.next().map(String::as_str) != Some(self.subcommand) {
            return None;
        }
        args.next()
            .map(String::as_str)
            .filter(|arg| !arg.starts_with('-'))
    }
}

impl CfContextExtractor {
    pub fn new() -> Self {
        Self {
            rules: vec![
                ExtractionRule { subcommand: "push" },
                ExtractionRule { subcommand: "app" },
            ],
        }
    }

    fn scan(&self, command: &CurrentCommand, chunk: &str) -> Option<Action> {
        // A route may arrive split across chunks; scan the accumulated
        // output plus the chunk that has not reached state yet. A partial
        // early match is healed by a later, complete one (later patch wins).
        let mut haystack = String::new();
        for line in command.output.iter().flatten() {
            haystack.push_str(&line.text);
        }
        haystack.push_str(chunk);

        for rule in &self.rules {
            let Some(app) = rule.applies_to(command) else {
                continue;
            };
            let Some(captures) = route_pattern().captures(&haystack) else {
                continue;
            };
            let route = captures[1].to_string();
            let hostname = route
                .split('.')
                .next()
                .unwrap_or(route.as_str())
                .to_string();
            return Some(Action::UpdateCfContext(route_patch(app, route, hostname)));
        }
        None
    }
}

impl Default for CfContextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn route_patch(app: &str, route: String, hostname: String) -> Context {
    let mut fields = BTreeMap::new();
    fields.insert("route".to_string(), ContextValue::Scalar(route));
    fields.insert("hostname".to_string(), ContextValue::Scalar(hostname));
    let mut patch = BTreeMap::new();
    patch.insert(app.to_string(), ContextValue::Mapping(fields));
    Context::from_mapping(patch)
}

impl Middleware for CfContextExtractor {
    fn handle(
        &mut self,
        action: &Action,
        state: &State,
        emit: &mut dyn FnMut(Action),
    ) -> Flow {
        if let Action::OutputReceived { text, .. } = action
            && let Some(command) = state
                .pages
                .current
                .as_ref()
                .and_then(|page| page.command.as_ref())
            && let Some(update) = self.scan(command, text)
        {
            emit(update);
        }
        Flow::Forward
    }
}
