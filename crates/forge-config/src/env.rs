use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Substitute `{{ env.NAME }}` placeholders in raw config text
///
/// `{{ env.NAME | default("value") }}` falls back to `value` when `NAME` is
/// unset. Comment lines are left untouched so disabled settings never require
/// their variables.
pub fn expand_env(input: &str) -> Result<String, String> {
    let mut lines = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            lines.push(line.to_string());
        } else {
            lines.push(expand_line(line)?);
        }
    }

    let mut output = lines.join("\n");
    if input.ends_with('\n') {
        output.push('\n');
    }

    Ok(output)
}

fn placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\{\{\s*([a-zA-Z0-9_.]+)\s*(?:\|\s*default\("([^"]*)"\))?\s*\}\}"#).expect("must be valid regex")
    })
}

fn expand_line(line: &str) -> Result<String, String> {
    let mut failure = None;

    let expanded = placeholder().replace_all(line, |caps: &Captures<'_>| {
        match resolve(&caps[1], caps.get(2).map(|m| m.as_str())) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                String::new()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(expanded.into_owned()),
    }
}

fn resolve(key: &str, default: Option<&str>) -> Result<String, String> {
    let Some(name) = key.strip_prefix("env.").filter(|n| !n.is_empty() && !n.contains('.')) else {
        return Err(format!("only variables scoped with 'env.' are supported: `{key}`"));
    };

    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(value),
        (Err(_), Some(fallback)) => Ok(fallback.to_string()),
        (Err(_), None) => Err(format!("environment variable not found: `{name}`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_without_placeholders_is_unchanged() {
        let input = "[backend]\nurl = \"https://project.example.co\"\n";
        assert_eq!(expand_env(input).unwrap(), input);
    }

    #[test]
    fn substitutes_backend_keys() {
        let vars = [("FORGE_ANON", Some("anon")), ("FORGE_SERVICE", Some("service"))];
        temp_env::with_vars(vars, || {
            let result =
                expand_env("anon_key = \"{{ env.FORGE_ANON }}\"\nservice_role_key = \"{{env.FORGE_SERVICE}}\"")
                    .unwrap();
            assert_eq!(result, "anon_key = \"anon\"\nservice_role_key = \"service\"");
        });
    }

    #[test]
    fn unset_variable_is_an_error() {
        temp_env::with_var_unset("FORGE_REPLICATE_KEY", || {
            let err = expand_env("api_key = \"{{ env.FORGE_REPLICATE_KEY }}\"").unwrap_err();
            assert!(err.contains("FORGE_REPLICATE_KEY"));
        });
    }

    #[test]
    fn non_env_scope_is_rejected() {
        let err = expand_env("key = \"{{ vault.KEY }}\"").unwrap_err();
        assert!(err.contains("only variables scoped with 'env.'"));
    }

    #[test]
    fn comment_lines_are_not_expanded() {
        temp_env::with_var_unset("FORGE_UNSET", || {
            let input = "  # api_key = \"{{ env.FORGE_UNSET }}\"";
            assert_eq!(expand_env(input).unwrap(), input);
        });
    }

    #[test]
    fn default_applies_only_when_unset() {
        temp_env::with_var_unset("FORGE_MODEL", || {
            let result = expand_env("model = \"{{ env.FORGE_MODEL | default(\"bytedance/seedream-4\") }}\"").unwrap();
            assert_eq!(result, "model = \"bytedance/seedream-4\"");
        });

        temp_env::with_var("FORGE_MODEL", Some("owner/other"), || {
            let result = expand_env("model = \"{{ env.FORGE_MODEL | default(\"bytedance/seedream-4\") }}\"").unwrap();
            assert_eq!(result, "model = \"owner/other\"");
        });
    }

    #[test]
    fn empty_default_is_allowed() {
        temp_env::with_var_unset("FORGE_OPTIONAL", || {
            let result = expand_env("key = \"{{ env.FORGE_OPTIONAL | default(\"\") }}\"").unwrap();
            assert_eq!(result, "key = \"\"");
        });
    }
}
