//! Served dashboard for mdvs.
//!
//! A lightweight HTTP server (sync, via `tiny_http`) that owns one
//! [`Dashboard`] and serves:
//! - the full dashboard page (`/`, `?tab=` switches tabs)
//! - HTML fragments the page script swaps in (search results, export preview,
//!   detail panel, charts at a new width, export status)
//! - `POST /export`, which proxies the PDF with a download filename
//!
//! Launched via `mdvs web` (default: `http://127.0.0.1:9812`).

mod frontend;
mod routes;

use std::io::Read;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::api::{Api, HttpClient};
use crate::config::MdvsConfig;
use crate::dashboard::{Dashboard, Settings};
use crate::ui::debounce::{Clock, SystemClock};

pub use routes::{Reply, dispatch};

const PAGE_TITLE: &str = "MDVS - Medicine Data Visualization System";

/// The full dashboard page as a standalone HTML document.
pub fn render_document<A: Api, C: Clock>(dashboard: &Dashboard<A, C>) -> String {
    frontend::page(PAGE_TITLE, &dashboard.render_page())
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the dashboard server on `addr`.
///
/// Blocks the current thread. Requests are handled sequentially against the
/// single dashboard state; a failing request never stops the server.
pub fn serve(config: &MdvsConfig, addr: &str, open: bool) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let mut dashboard = Dashboard::new(
        HttpClient::from_config(&config.api),
        SystemClock::new(),
        Settings::from_config(config),
    );
    dashboard.start();

    println!("mdvs dashboard running at http://{addr}");
    println!("API: {}", dashboard.api().base_url());
    if let Some(alert) = dashboard.health().and_then(|h| h.alert()) {
        println!("{alert}");
    }
    println!("Press Ctrl+C to stop.\n");

    if open {
        let _ = open_browser(&format!("http://{addr}"));
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        // Read body up-front for methods that carry one
        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = Vec::new();
            let _ = request.as_reader().read_to_end(&mut buf);
            Some(buf)
        } else {
            None
        };

        dashboard.tick();
        let reply = match dispatch(&mut dashboard, &method, &url, body.as_deref()) {
            Ok(reply) => reply,
            Err(e) => Reply::json(500, &serde_json::json!({ "error": format!("{e:#}") })),
        };
        let status = reply.status;
        let _ = request.respond(into_response(reply));

        // Brief access log
        println!(
            "{} {} {} {}",
            chrono::Local::now().format("%H:%M:%S"),
            method,
            url,
            status
        );
    }

    Ok(())
}

/// Convert a [`Reply`] into a `tiny_http` response. Headers that are not
/// valid HTTP are dropped.
fn into_response(reply: Reply) -> Response<std::io::Cursor<Vec<u8>>> {
    let mut response =
        Response::from_data(reply.body).with_status_code(StatusCode(reply.status));
    let headers = std::iter::once(("Content-Type".to_string(), reply.content_type.to_string()))
        .chain(reply.headers);
    for (name, value) in headers {
        if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
            response = response.with_header(header);
        }
    }
    response
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}
