//! Static file serving under a URL prefix.
//!
//! # Responsibilities
//! - Strip the literal URL prefix from the request path
//! - Resolve the remainder under the static root via `ServeDir`
//! - Keep trailing-slash redirects inside the prefix
//! - List directories that have no `index.html`
//!
//! # Design Decisions
//! - Prefix stripping is a plain string operation, matching the dispatcher
//! - `ServeDir` owns file semantics: index.html, 404, traversal rejection
//! - Listings are only rendered after `ServeDir` has answered 404

use std::path::{Component, Path, PathBuf};

use axum::body::Body;
use axum::http::uri::PathAndQuery;
use axum::http::{header, HeaderMap, HeaderValue, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeDir;

/// Serves files from `root` for requests under `prefix`.
#[derive(Clone)]
pub struct StaticFiles {
    prefix: String,
    root: PathBuf,
    service: ServeDir,
}

impl StaticFiles {
    pub fn new(prefix: impl Into<String>, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            prefix: prefix.into(),
            service: ServeDir::new(&root),
            root,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Serve a request whose path starts with the prefix.
    pub async fn serve(&self, mut request: Request<Body>) -> Response {
        *request.uri_mut() = strip_prefix(request.uri(), &self.prefix);
        let path = request.uri().path().to_string();

        let mut response = match self.service.clone().oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        };

        if response.status().is_redirection() {
            self.restore_prefix(response.headers_mut());
        } else if response.status() == StatusCode::NOT_FOUND && path.ends_with('/') {
            if let Some(listing) = self.list_directory(&path).await {
                return listing;
            }
        }
        response
    }

    /// `ServeDir` builds redirect targets from the stripped path.
    fn restore_prefix(&self, headers: &mut HeaderMap) {
        let Some(location) = headers.get(header::LOCATION).and_then(|v| v.to_str().ok()) else {
            return;
        };
        if !location.starts_with('/') {
            return;
        }

        let restored = format!("{}{}", self.prefix.trim_end_matches('/'), location);
        if let Ok(value) = HeaderValue::from_str(&restored) {
            headers.insert(header::LOCATION, value);
        }
    }

    /// Render `<pre>` links for a directory under the root, if it is one.
    async fn list_directory(&self, path: &str) -> Option<Response> {
        let dir = self.resolve(path)?;
        let mut entries = tokio::fs::read_dir(&dir).await.ok()?;

        let mut names = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let mut name = entry.file_name().to_string_lossy().into_owned();
                    if entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false) {
                        name.push('/');
                    }
                    names.push(name);
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "Failed to read directory");
                    return None;
                }
            }
        }
        names.sort();

        Some(
            (
                [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
                render_listing(&names),
            )
                .into_response(),
        )
    }

    /// Map a decoded request path onto the root, refusing anything but
    /// plain child segments.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let decoded = urlencoding::decode(path).ok()?;
        let mut dir = self.root.clone();
        for component in Path::new(decoded.trim_start_matches('/')).components() {
            match component {
                Component::Normal(segment) => dir.push(segment),
                Component::CurDir => {}
                _ => return None,
            }
        }
        Some(dir)
    }
}

fn render_listing(names: &[String]) -> String {
    let mut html = String::from("<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n");
    for name in names {
        // Keep the trailing slash out of the encoding so directory links stay relative.
        let (stem, slash) = match name.strip_suffix('/') {
            Some(stem) => (stem, "/"),
            None => (name.as_str(), ""),
        };
        html.push_str(&format!(
            "<a href=\"{}{}\">{}</a>\n",
            urlencoding::encode(stem),
            slash,
            escape_html(name)
        ));
    }
    html.push_str("</pre>\n");
    html
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Remove `prefix` from the path, keeping the query and a leading `/`.
fn strip_prefix(uri: &Uri, prefix: &str) -> Uri {
    let path = uri.path();
    let rest = path.strip_prefix(prefix).unwrap_or(path);
    let rest = if rest.starts_with('/') {
        rest.to_string()
    } else {
        format!("/{}", rest)
    };
    let path_and_query = match uri.query() {
        Some(query) => format!("{}?{}", rest, query),
        None => rest,
    };

    match PathAndQuery::try_from(path_and_query) {
        Ok(pq) => {
            let mut parts = uri.clone().into_parts();
            parts.path_and_query = Some(pq);
            Uri::from_parts(parts).unwrap_or_else(|_| uri.clone())
        }
        Err(_) => uri.clone(),
    }
}
