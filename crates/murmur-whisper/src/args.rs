// SPDX-FileCopyrightText: 2026 Murmur Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argument templates for the transcriber program.

/// Placeholder replaced with the media URL.
pub const URL_PLACEHOLDER: &str = "{url}";

/// Placeholder replaced with the resolved model name.
pub const MODEL_PLACEHOLDER: &str = "{model}";

/// Expands `{url}` and `{model}` in every template argument.
///
/// When no argument mentions `{url}`, the URL is appended as the last argument.
pub fn render_args(template: &[String], url: &str, model: &str) -> Vec<String> {
    let mut args: Vec<String> = template
        .iter()
        .map(|arg| {
            arg.split(URL_PLACEHOLDER)
                .map(|part| part.replace(MODEL_PLACEHOLDER, model))
                .collect::<Vec<_>>()
                .join(url)
        })
        .collect();

    if !template.iter().any(|arg| arg.contains(URL_PLACEHOLDER)) {
        args.push(url.to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn placeholders_are_substituted() {
        let args = render_args(
            &template(&["--model", "{model}", "{url}"]),
            "http://example.com/a",
            "small",
        );
        assert_eq!(args, vec!["--model", "small", "http://example.com/a"]);
    }

    #[test]
    fn placeholders_inside_arguments() {
        let args = render_args(&template(&["--model={model}", "--input={url}"]), "u", "tiny");
        assert_eq!(args, vec!["--model=tiny", "--input=u"]);
    }

    #[test]
    fn url_is_appended_without_placeholder() {
        let args = render_args(&template(&["-m", "{model}"]), "http://x", "base");
        assert_eq!(args, vec!["-m", "base", "http://x"]);
    }

    #[test]
    fn model_is_not_expanded_into_url() {
        // A URL containing a placeholder-looking sequence stays intact.
        let args = render_args(&template(&["{url}"]), "http://x/{model}", "large");
        assert_eq!(args, vec!["http://x/{model}"]);
    }
}
