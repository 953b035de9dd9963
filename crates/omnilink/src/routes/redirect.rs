// Redirect-target composition for flow outcomes.

/// Build the error-page target carrying the provider and error params.
pub fn error_redirect(base: &str, provider: &str, error: &str) -> String {
    let sep = if base.contains('?') { '&' } else { '?' };
    format!(
        "{base}{sep}provider={}&error={}",
        urlencoding::encode(provider),
        urlencoding::encode(error)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_redirect_encodes_params() {
        let url = error_redirect("/auth/error", "github", "email has already been taken");
        assert_eq!(
            url,
            "/auth/error?provider=github&error=email%20has%20already%20been%20taken"
        );
    }

    #[test]
    fn test_error_redirect_appends_to_existing_query() {
        let url = error_redirect("/auth/error?from=callback", "ldap", "denied");
        assert_eq!(url, "/auth/error?from=callback&provider=ldap&error=denied");
    }

    #[test]
    fn test_error_redirect_with_empty_error() {
        let url = error_redirect("/auth/error", "github", "");
        assert_eq!(url, "/auth/error?provider=github&error=");
    }
}
