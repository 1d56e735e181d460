use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::context::Context;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder pattern should compile"))
}

/// Substitute every `{{dotted.path}}` in `text` with the scalar at that
/// path in `context`. A placeholder whose path cannot be resolved to a
/// scalar is left literal.
pub fn render(text: &str, context: &Context) -> String {
    placeholder_pattern()
        .replace_all(text, |caps: &Captures<'_>| {
            let path = caps[1].trim();
            match context.lookup(path) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Render each argument independently. An argument is never re-tokenized:
/// a substituted value containing whitespace stays one argument.
pub fn render_args(args: &[String], context: &Context) -> Vec<String> {
    args.iter().map(|arg| render(arg, context)).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{render, render_args};
    use crate::context::Context;

    #[test]
    fn text_without_placeholders_is_returned_unchanged() {
        let context = Context::from(json!({"some": "context"}));

        assert_eq!(render("no placeholders here", &context), "no placeholders here");
    }

    #[test]
    fn placeholders_resolve_against_nested_context() {
        let context = Context::from(json!({"here": {"is": {"some": "context"}}}));

        assert_eq!(
            render("This page needs some {{here.is.some}}", &context),
            "This page needs some context"
        );
    }

    #[test]
    fn numeric_segments_index_into_sequences() {
        let context = Context::from(json!({"context": {"to": {"render": {"from": ["love"]}}}}));

        assert_eq!(
            render("this page body needs some {{context.to.render.from.0}}", &context),
            "this page body needs some love"
        );
    }

    #[test]
    fn unresolvable_placeholders_stay_literal() {
        let context = Context::from(json!({"known": "value"}));

        assert_eq!(
            render("got {{known}} but not {{un.known}}", &context),
            "got value but not {{un.known}}"
        );
    }

    #[test]
    fn surrounding_whitespace_in_a_placeholder_is_ignored() {
        let context = Context::from(json!({"app": {"route": "app.example.com"}}));

        assert_eq!(render("at {{ app.route }}", &context), "at app.example.com");
    }

    #[test]
    fn arguments_render_element_wise_without_re_tokenizing() {
        let context = Context::from(json!({"app": {"hostname": "chat app"}}));
        let args = vec![
            "--hostname".to_string(),
            "{{app.hostname}}".to_string(),
            "{{app.missing}}".to_string(),
        ];

        let rendered = render_args(&args, &context);

        assert_eq!(
            rendered,
            vec![
                "--hostname".to_string(),
                "chat app".to_string(),
                "{{app.missing}}".to_string(),
            ]
        );
    }
}
