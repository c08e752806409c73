//! Environment variable fallbacks for configuration values.

/// Prefix shared by every variable this tool reads.
pub const ENV_PREFIX: &str = "KODEGEN_";

/// Turns a free-form key into an environment variable name.
///
/// `homebrew_github-token` becomes `KODEGEN_HOMEBREW_GITHUB_TOKEN`.
pub fn var_name(key: &str) -> String {
    let normalized: String = key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    if normalized.starts_with(ENV_PREFIX) {
        normalized
    } else {
        format!("{}{}", ENV_PREFIX, normalized)
    }
}

/// Returns the configured value when it is not blank, else the variable
/// derived from `key`.
pub fn resolve(key: &str, configured: Option<&str>) -> Option<String> {
    if let Some(value) = configured.filter(|v| !v.trim().is_empty()) {
        return Some(value.to_string());
    }
    lookup(key)
}

/// Reads the variable derived from `key`, ignoring blank values.
pub fn lookup(key: &str) -> Option<String> {
    std::env::var(var_name(key))
        .ok()
        .filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_prefixed_once() {
        assert_eq!(var_name("homebrew_github-token"), "KODEGEN_HOMEBREW_GITHUB_TOKEN");
        assert_eq!(var_name("KODEGEN_PROJECT_VERSION"), "KODEGEN_PROJECT_VERSION");
    }

    #[test]
    fn configured_value_wins() {
        assert_eq!(
            resolve("never_set_in_tests", Some("explicit")),
            Some("explicit".to_string())
        );
        assert_eq!(resolve("never_set_in_tests_either", Some("  ")), None);
    }
}
