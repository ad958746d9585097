use std::path::{Path, PathBuf};

use axum::{
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tracing::debug;

const CODE_DIR: &str = "Code";
const INDEX_FILE: &str = "index.html";

/// First-segment prefixes served from the project root even when the file
/// is missing.
const ROOT_PREFIXES: [&str; 2] = ["A.I.s", "Images"];

/// Maps request paths onto files under the project root.
///
/// `/` is the site entry point `Code/index.html`. Any other path is looked
/// up at the root first; if nothing is there, provider assets (`/A.I.s`) and
/// images (`/Images`) stay at the root and everything else moves under
/// `Code/`.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
    hidden: Vec<PathBuf>,
}

impl StaticFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            hidden: Vec::new(),
        }
    }

    /// Never serve `path`, even when a request resolves to it.
    pub fn hide(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.hidden
            .push(path.canonicalize().unwrap_or_else(|_| path.to_path_buf()));
        self
    }

    /// Returns `None` for paths that escape the root or point at hidden files.
    pub fn resolve(&self, uri_path: &str) -> Option<PathBuf> {
        let decoded = percent_decode_str(uri_path).decode_utf8().ok()?;

        let mut segments = Vec::new();
        for segment in decoded.split('/') {
            match segment {
                "" | "." => {}
                ".." => return None,
                segment if segment.contains('\\') || segment.contains('\0') => return None,
                segment => segments.push(segment),
            }
        }

        let mut candidate = if segments.is_empty() {
            self.root.join(CODE_DIR).join(INDEX_FILE)
        } else {
            let relative = segments.iter().collect::<PathBuf>();
            let at_root = self.root.join(&relative);
            let root_prefixed = ROOT_PREFIXES
                .iter()
                .any(|prefix| segments[0].starts_with(prefix));
            if at_root.exists() || root_prefixed {
                at_root
            } else {
                self.root.join(CODE_DIR).join(relative)
            }
        };

        if candidate.is_dir() {
            candidate.push(INDEX_FILE);
        }

        if let Ok(canonical) = candidate.canonicalize() {
            if self.hidden.contains(&canonical) {
                return None;
            }
        }

        Some(candidate)
    }

    pub async fn serve(&self, request: Request) -> Response {
        let Some(path) = self.resolve(request.uri().path()) else {
            debug!(uri = %request.uri(), "refusing static path");
            return StatusCode::NOT_FOUND.into_response();
        };

        debug!(path = %path.display(), "serving static file");
        match ServeFile::new(&path).oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        }
    }
}
