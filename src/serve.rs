//! Development server for the generated tree.
//!
//! A lightweight HTTP server built on `tiny_http` that serves
//! `config.build.output` the way the deployed site will be served:
//!
//! - The production base path is accepted and stripped from request paths
//! - Extensionless routes resolve to `<route>/index.html`
//! - Graceful shutdown on Ctrl+C
//!
//! # Request Resolution
//!
//! | Request (base path `/P`) | File served |
//! |--------------------------|-------------|
//! | `/P/` or `/` | `index.html` |
//! | `/P/about/` | `about/index.html` |
//! | `/P/blog/a` | `blog/a/index.html` |
//! | `/P/styles/main.css` | `styles/main.css` |
//! | `/P/../secret` | 404 |

use crate::{
    config::{BasePath, SiteConfig},
    log,
};
use anyhow::{Context, Result};
use std::{
    fs,
    io::{Cursor, ErrorKind},
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};
use tiny_http::{Header, Request, Response, Server, StatusCode};

/// Try binding to port, retry with incremented port if in use
const MAX_PORT_RETRIES: u16 = 10;

const INDEX_FILE: &str = crate::site::route::INDEX_FILE;

// ============================================================================
// Server Entry Point
// ============================================================================

/// Start the development server.
///
/// This function:
/// 1. Binds to the configured interface and port (with auto-retry on port conflict)
/// 2. Sets up Ctrl+C handler for graceful shutdown
/// 3. Enters the main request handling loop
///
/// The server blocks until Ctrl+C is received.
pub fn serve_site(config: &SiteConfig) -> Result<()> {
    let interface: std::net::IpAddr = config
        .serve
        .interface
        .parse()
        .with_context(|| format!("Invalid interface `{}`", config.serve.interface))?;
    let base_port = config.serve.port;

    let (server, addr) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
    let server = Arc::new(server);

    // Set up Ctrl+C handler for graceful shutdown
    let server_for_signal = Arc::clone(&server);
    ctrlc::set_handler(move || {
        log!("serve"; "shutting down...");
        server_for_signal.unblock();
    })
    .context("Failed to set Ctrl+C handler")?;

    let base_path = config.base_path();
    log!("serve"; "http://{}{}/", addr, base_path);

    // Handle requests in main thread (blocks until Ctrl+C)
    for request in server.incoming_requests() {
        if let Err(e) = handle_request(request, &config.build.output, &base_path) {
            log!("serve"; "request error: {e}");
        }
    }

    Ok(())
}

/// Try to bind to a port, retrying with incremented port numbers if in use.
fn try_bind_port(
    interface: std::net::IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                return Ok((server, addr));
            }
            // Will retry silently
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        max_retries,
        base_port,
        base_port.saturating_add(max_retries.saturating_sub(1)),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

// ============================================================================
// Request Handling
// ============================================================================

/// Response to a request, before it is sent.
#[derive(Debug, PartialEq, Eq)]
struct Reply {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Reply {
    fn not_found() -> Self {
        Self {
            status: 404,
            content_type: "text/plain",
            body: b"404 - File Not Found".to_vec(),
        }
    }

    fn server_error() -> Self {
        Self {
            status: 500,
            content_type: "text/plain",
            body: b"500 - Server Error".to_vec(),
        }
    }
}

/// Handle a single HTTP request.
fn handle_request(request: Request, serve_root: &Path, base_path: &BasePath) -> Result<()> {
    let reply = match resolve_path(request.url(), base_path) {
        Some(relative) => load(serve_root, &relative),
        None => Reply::not_found(),
    };

    if reply.status >= 500 {
        log!("error"; "{} {}", reply.status, request.url());
    }

    let len = reply.body.len();
    let response = Response::new(
        StatusCode(reply.status),
        vec![content_type_header(reply.content_type)?],
        Cursor::new(reply.body),
        Some(len),
        None,
    );
    request.respond(response)?;
    Ok(())
}

fn content_type_header(content_type: &str) -> Result<Header> {
    Header::from_bytes("Content-Type", content_type)
        .map_err(|()| anyhow::anyhow!("Invalid content type header: {content_type}"))
}

/// Map a request URL to a file path relative to the serve root.
///
/// Returns `None` for paths that would leave the serve root.
fn resolve_path(url: &str, base_path: &BasePath) -> Option<PathBuf> {
    // Strip query string and fragment before decoding
    let raw = url.split(['?', '#']).next().unwrap_or_default();

    // Decode URL-encoded characters (e.g., %20 → space)
    let decoded = urlencoding::decode(raw).ok()?;

    let path = base_path.strip(&decoded);
    let path = path.trim_matches('/');

    if path.is_empty() {
        return Some(PathBuf::from(INDEX_FILE));
    }

    let mut relative = PathBuf::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if segment == ".." || segment.contains('\\') {
            return None;
        }
        relative.push(segment);
    }

    // Extensionless paths are routes
    if relative.extension().is_none() {
        relative.push(INDEX_FILE);
    }
    Some(relative)
}

/// Read a file below `root` into a reply.
fn load(root: &Path, relative: &Path) -> Reply {
    let path = root.join(relative);
    match fs::read(&path) {
        Ok(body) => Reply {
            status: 200,
            content_type: guess_content_type(&path),
            body,
        },
        Err(err) if err.kind() == ErrorKind::NotFound => Reply::not_found(),
        Err(_) => Reply::server_error(),
    }
}

// ============================================================================
// Content Type Detection
// ============================================================================

/// Guess MIME content type from file extension.
///
/// Returns `text/plain` for unknown extensions.
fn guess_content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("png") => "image/png",
        Some("jpg") => "image/jpeg",
        _ => "text/plain",
    }
}
