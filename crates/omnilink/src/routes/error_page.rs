// Error page — the single page this library renders, shown when
// provisioning fails and the deployment has no page of its own.

use serde::Deserialize;

use omnilink_core::error::HttpStatus;

/// Error page query parameters (as produced by `error_redirect`).
#[derive(Debug, Default, Deserialize)]
pub struct ErrorPageQuery {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// The status the error page is served with.
pub fn error_page_status() -> HttpStatus {
    HttpStatus::UnprocessableEntity
}

/// Render a self-contained HTML error page.
pub fn render_error_page(query: &ErrorPageQuery) -> String {
    let provider = query.provider.as_deref().unwrap_or("unknown");
    let error = query.error.as_deref().filter(|e| !e.is_empty()).unwrap_or(
        "Sign-in could not be completed. Please try again.",
    );

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Sign-in Error</title>
    <style>
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            display: flex;
            align-items: center;
            justify-content: center;
            min-height: 100vh;
            background: #f8f9fa;
            color: #333;
        }}
        .container {{
            text-align: center;
            max-width: 480px;
            padding: 2rem;
        }}
        h1 {{
            font-size: 1.5rem;
            margin-bottom: 0.5rem;
            color: #dc3545;
        }}
        .provider {{
            font-family: monospace;
            background: #f1f3f5;
            padding: 0.25rem 0.5rem;
            border-radius: 4px;
            font-size: 0.875rem;
            color: #666;
            margin-bottom: 1rem;
            display: inline-block;
        }}
        p {{
            color: #666;
            line-height: 1.6;
        }}
        a {{
            color: #007bff;
            text-decoration: none;
            margin-top: 1.5rem;
            display: inline-block;
        }}
        a:hover {{ text-decoration: underline; }}
    </style>
</head>
<body>
    <div class="container">
        <h1>Sign-in Error</h1>
        <div class="provider">{provider}</div>
        <p>{error}</p>
        <a href="/">&larr; Return Home</a>
    </div>
</body>
</html>"#,
        provider = provider,
        error = error,
    )
}
