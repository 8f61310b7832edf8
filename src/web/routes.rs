//! Request routing for the served dashboard.
//!
//! Handlers work on a `&mut Dashboard` and return a plain [`Reply`], so the
//! routing table can be exercised without a socket.

use anyhow::{Context, Result};
use serde::Deserialize;
use tiny_http::Method;

use crate::api::Api;
use crate::dashboard::Dashboard;
use crate::ui::debounce::Clock;
use crate::ui::detail::DetailKey;
use crate::ui::filters::{FilterControls, FilterKey, FilterSet};
use crate::ui::search::render_results;
use crate::ui::tabs::Tab;
use crate::ui::view::{Node, el};

use super::render_document;

// ---------------------------------------------------------------------------
// Reply
// ---------------------------------------------------------------------------

/// Response produced by a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Reply {
    pub fn html(status: u16, html: String) -> Self {
        Self {
            status,
            content_type: "text/html; charset=utf-8",
            headers: Vec::new(),
            body: html.into_bytes(),
        }
    }

    /// An HTML fragment for the page script to swap in.
    pub fn fragment(node: Node) -> Self {
        Self::html(200, node.to_html())
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: "application/json; charset=utf-8",
            headers: Vec::new(),
            body: value.to_string().into_bytes(),
        }
    }

    fn pdf(file_name: &str, bytes: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: "application/pdf",
            headers: vec![(
                "Content-Disposition".to_string(),
                format!("attachment; filename=\"{file_name}\""),
            )],
            body: bytes,
        }
    }

    fn not_found() -> Self {
        Self::json(404, &serde_json::json!({ "error": "not found" }))
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
pub fn dispatch<A: Api, C: Clock>(
    dashboard: &mut Dashboard<A, C>,
    method: &Method,
    url: &str,
    body: Option<&[u8]>,
) -> Result<Reply> {
    let path = url.split('?').next().unwrap_or(url);
    let params = query_params(url);

    let reply = match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => {
            if let Some(tab) = param(&params, "tab").and_then(|t| t.parse::<Tab>().ok()) {
                dashboard.activate_tab(tab);
            }
            Reply::html(200, render_document(dashboard))
        }

        (&Method::Get, "/search") => {
            dashboard.search(param(&params, "q").unwrap_or_default());
            Reply::fragment(
                el("div")
                    .id("results")
                    .child(render_results(dashboard.search_widget().state()))
                    .into(),
            )
        }

        (&Method::Get, "/preview") => {
            dashboard.apply_filters(FilterControls::from_set(&filters_from_params(&params)));
            Reply::fragment(
                el("div")
                    .id("export-preview")
                    .child(dashboard.preview().render())
                    .into(),
            )
        }

        (&Method::Post, "/export") => post_export(dashboard, body.unwrap_or_default())?,
        (&Method::Get, "/export/status") => Reply::fragment(dashboard.exporter().render_status()),

        (&Method::Get, "/charts") => {
            if let Some(width) = param(&params, "width")
                .and_then(|w| w.parse::<f64>().ok())
                .filter(|w| *w > 0.0)
            {
                dashboard.set_container_width(width);
            }
            Reply::fragment(dashboard.render_charts_grid())
        }

        (&Method::Get, "/detail/close") => {
            dashboard.close_detail();
            Reply::fragment(dashboard.detail().render())
        }
        (&Method::Get, p) if p.starts_with("/detail/") => match detail_key(p) {
            Some(key) => {
                dashboard.open_detail(key);
                Reply::fragment(dashboard.detail().render())
            }
            None => Reply::not_found(),
        },

        _ => Reply::not_found(),
    };
    Ok(reply)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct ExportBody {
    #[serde(default)]
    filters: FilterSet,
}

/// `POST /export`: PDF on success, the rendered status line (502) on failure.
fn post_export<A: Api, C: Clock>(dashboard: &mut Dashboard<A, C>, body: &[u8]) -> Result<Reply> {
    let request: ExportBody = if body.iter().all(u8::is_ascii_whitespace) {
        ExportBody::default()
    } else {
        serde_json::from_slice(body).context("invalid export request body")?
    };
    dashboard.apply_filters(FilterControls::from_set(&request.filters));

    Ok(match dashboard.export() {
        Some(download) => Reply::pdf(&download.file_name, download.bytes),
        None => Reply::html(502, dashboard.exporter().render_status().to_html()),
    })
}

/// `/detail/{category|manufacturer}/{escaped name}`
fn detail_key(path: &str) -> Option<DetailKey> {
    let rest = path.strip_prefix("/detail/")?;
    let (kind, raw) = rest.split_once('/')?;
    let name = urlencoding::decode(raw).ok()?.into_owned();
    if name.is_empty() {
        return None;
    }
    match kind {
        "category" => Some(DetailKey::Category(name)),
        "manufacturer" => Some(DetailKey::Manufacturer(name)),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Query strings
// ---------------------------------------------------------------------------

/// Decoded `key=value` pairs of the URL's query string.
fn query_params(url: &str) -> Vec<(String, String)> {
    let Some((_, query)) = url.split_once('?') else {
        return Vec::new();
    };
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(k), decode_component(v))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn filters_from_params(params: &[(String, String)]) -> FilterSet {
    FilterSet::from_pairs(
        params
            .iter()
            .filter_map(|(k, v)| FilterKey::parse(k).map(|key| (key, v.trim()))),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::api::testing::{FakeApi, Recorded};
    use crate::dashboard::Settings;
    use crate::ui::debounce::ManualClock;
    use serde_json::json;

    fn dashboard(api: FakeApi) -> Dashboard<FakeApi, ManualClock> {
        Dashboard::new(api, ManualClock::new(), Settings::default())
    }

    fn get(d: &mut Dashboard<FakeApi, ManualClock>, url: &str) -> Reply {
        dispatch(d, &Method::Get, url, None).unwrap()
    }

    #[test]
    fn query_params_decode_plus_and_percent() {
        let params = query_params("/preview?q=ibu+profen&category=Pain%20Relief&empty=");
        assert_eq!(param(&params, "q"), Some("ibu profen"));
        assert_eq!(param(&params, "category"), Some("Pain Relief"));
        assert_eq!(param(&params, "empty"), Some(""));
        assert!(query_params("/").is_empty());
    }

    #[test]
    fn detail_paths_parse() {
        assert_eq!(
            detail_key("/detail/manufacturer/Smith%20%26%20Sons"),
            Some(DetailKey::Manufacturer("Smith & Sons".into()))
        );
        assert_eq!(detail_key("/detail/widget/x"), None);
        assert_eq!(detail_key("/detail/category/"), None);
    }

    #[test]
    fn page_with_tab_param_activates_tab() {
        let mut d = dashboard(FakeApi::new());
        let reply = get(&mut d, "/?tab=export");
        assert_eq!(reply.status, 200);
        assert!(reply.content_type.starts_with("text/html"));
        assert_eq!(d.tabs().active(), Tab::Export);
        assert!(reply.body_text().contains("<section id=\"export\" class=\"tab-panel active\">"));
    }

    #[test]
    fn preview_route_applies_filters() {
        let api = FakeApi::new().with_json(
            "/api/medicines?category=Antibiotics&limit=10000",
            json!({"results": [{"medicine_id": 1, "name": "Amoxicillin"}]}),
        );
        let mut d = dashboard(api);
        let reply = get(&mut d, "/preview?category=Antibiotics&classification=");
        assert_eq!(
            reply.body_text(),
            "<div id=\"export-preview\"><strong>1</strong> medicines will be exported with current filters</div>"
        );
    }

    #[test]
    fn detail_route_opens_and_close_hides() {
        let api = FakeApi::new().with_json(
            "/api/insights/categories/Pain%20Relief",
            json!({
                "category": {"category": "Pain Relief", "medicine_count": 3, "manufacturer_count": 1},
                "top_manufacturers": [], "dosage_forms": []
            }),
        );
        let mut d = dashboard(api);
        let opened = get(&mut d, "/detail/category/Pain%20Relief");
        assert!(opened.body_text().contains("Category Details"));
        assert!(d.detail().is_visible());

        let closed = get(&mut d, "/detail/close");
        assert!(closed.body_text().contains("style=\"display:none\""));
    }

    #[test]
    fn export_route_returns_pdf_with_filename() {
        let api = FakeApi::new().with_post("/api/export/pdf", Ok(b"%PDF".to_vec()));
        let mut d = dashboard(api);
        let body = br#"{"filters":{"category":"Antibiotics"}}"#;
        let reply = dispatch(&mut d, &Method::Post, "/export", Some(body)).unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(reply.content_type, "application/pdf");
        assert_eq!(reply.body, b"%PDF");
        let disposition = reply.header("content-disposition").unwrap();
        assert!(disposition.starts_with("attachment; filename=\"medicine_report_"));
        assert!(disposition.ends_with(".pdf\""));
        assert!(d.api().requests().contains(&Recorded::Post(
            "/api/export/pdf".into(),
            json!({"filters": {"category": "Antibiotics"}})
        )));
    }

    #[test]
    fn failed_export_returns_status_line() {
        let api = FakeApi::new().with_post(
            "/api/export/pdf",
            Err(ApiError::Network("connection refused".into())),
        );
        let mut d = dashboard(api);
        let reply = dispatch(&mut d, &Method::Post, "/export", Some(b"")).unwrap();
        assert_eq!(reply.status, 502);
        assert!(reply
            .body_text()
            .contains("Export failed: network error: connection refused"));
    }

    #[test]
    fn malformed_export_body_is_an_error() {
        let mut d = dashboard(FakeApi::new());
        assert!(dispatch(&mut d, &Method::Post, "/export", Some(b"{nope")).is_err());
    }

    #[test]
    fn unknown_route_is_404() {
        let mut d = dashboard(FakeApi::new());
        assert_eq!(get(&mut d, "/nope").status, 404);
        assert_eq!(get(&mut d, "/detail/widget/x").status, 404);
    }
}
