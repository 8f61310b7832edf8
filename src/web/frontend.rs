//! Page shell for the served dashboard.
//!
//! The body is rendered server-side from the dashboard view tree. The shell
//! adds the stylesheet and a small script that forwards browser events
//! (typing, selects, clicks, resizes) to the server routes and swaps the
//! returned fragments into place. No external assets, no CDN.

use crate::ui::view::{Node, escape};

/// Wrap a rendered dashboard body in a complete HTML document.
pub fn page(title: &str, body: &Node) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{}\n<script>{SCRIPT}</script>\n</body>\n</html>\n",
        escape(title),
        body.to_html(),
    )
}

const STYLE: &str = r#"
:root {
  --bg: #f8fafc;
  --surface: #ffffff;
  --border: #e2e8f0;
  --text: #0f172a;
  --text-muted: #64748b;
  --primary: #2563eb;
  --success: #10b981;
  --error: #ef4444;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: var(--font); font-size: 14px; line-height: 1.5; }

.app { max-width: 1200px; margin: 0 auto; padding: 24px; }
header { display: flex; align-items: center; justify-content: space-between; margin-bottom: 24px; padding-bottom: 16px; border-bottom: 1px solid var(--border); }
header h1 { font-size: 22px; font-weight: 600; }

.nav { display: flex; gap: 4px; }
.nav-link { padding: 6px 14px; border-radius: var(--radius); color: var(--text-muted); text-decoration: none; }
.nav-link.active { background: var(--primary); color: #fff; }

.tab-panel { display: none; }
.tab-panel.active { display: block; }

.alert { padding: 12px 16px; border-radius: var(--radius); margin-bottom: 16px; }
.alert-error { background: #fef2f2; border: 1px solid #fecaca; color: var(--error); }

.search-bar { display: flex; gap: 8px; margin-bottom: 16px; }
.search-input, .filter-select { padding: 8px 12px; border: 1px solid var(--border); border-radius: var(--radius); font-size: 14px; }
.search-input { flex: 1; }
.btn { padding: 8px 16px; border: none; border-radius: var(--radius); background: var(--primary); color: #fff; cursor: pointer; }
.btn-secondary { background: var(--border); color: var(--text); margin-top: 1rem; }
.result-item { padding: 12px; border-bottom: 1px solid var(--border); cursor: pointer; }
.result-item small { color: var(--text-muted); }

.stats-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 16px; margin-bottom: 24px; }
.stat-card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 16px; text-align: center; }
.stat-card-error { grid-column: 1 / -1; }
.stat-card-error .stat-value { color: var(--error); font-size: 1rem; }
.stat-icon { font-size: 1.5rem; }
.stat-value { font-size: 1.5rem; font-weight: 700; }
.stat-label { color: var(--text-muted); font-size: 12px; }

.charts-grid { display: grid; gap: 24px; }
.chart-card { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 16px; }
.chart-title { font-size: 16px; margin-bottom: 12px; }
.chart-container { min-height: 120px; }
.chart-error { text-align: center; padding: 2rem; color: var(--error); }
.axis-label[data-detail], .bar[data-detail] { cursor: pointer; }

.loading-spinner { width: 32px; height: 32px; margin: 2rem auto; border: 3px solid var(--border); border-top-color: var(--primary); border-radius: 50%; animation: spin 0.8s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }

.tooltip { position: fixed; pointer-events: none; background: #0f172a; color: #fff; padding: 8px 10px; border-radius: 6px; font-size: 12px; opacity: 0; transition: opacity 0.15s; }
.tooltip.visible { opacity: 1; }

.detail-panel { margin-top: 24px; background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 16px; }
.panel-title { margin-bottom: 12px; }
.detail-grid { display: grid; grid-template-columns: repeat(3, 1fr); gap: 16px; }
.detail-name { font-weight: 600; }
.detail-meta { color: var(--text-muted); }
.detail-list { list-style: none; }
.detail-list li { display: flex; justify-content: space-between; padding: 4px 0; border-bottom: 1px solid var(--border); }
.detail-error { color: var(--error); }

.export-panel { background: var(--surface); border: 1px solid var(--border); border-radius: var(--radius); padding: 24px; }
.export-header { margin-bottom: 16px; }
.export-filters-section { background: #eff6ff; border: 1px solid #bfdbfe; border-radius: var(--radius); padding: 1rem; margin-bottom: 1.5rem; }
.export-filters-title { font-weight: 600; color: #1e40af; margin-bottom: 0.75rem; }
.export-filters-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 0.75rem; }
#export-preview { margin-top: 0.75rem; font-size: 0.8rem; color: var(--text-muted); }
.export-btn-main { width: 100%; padding: 12px; border: none; border-radius: var(--radius); background: var(--primary); color: #fff; font-size: 15px; cursor: pointer; }
.export-status { display: flex; gap: 8px; margin-top: 12px; padding: 10px 12px; border-radius: var(--radius); }
.export-status.loading { background: #eff6ff; }
.export-status.success { background: #ecfdf5; color: #065f46; }
.export-status.error { background: #fef2f2; color: var(--error); }
.export-tip { margin-top: 16px; color: var(--text-muted); font-size: 12px; }
"#;

const SCRIPT: &str = r#"
(function () {
  const $ = (sel) => document.querySelector(sel);

  function debounce(fn, wait) {
    let timer;
    return (...args) => {
      clearTimeout(timer);
      timer = setTimeout(() => fn(...args), wait);
    };
  }

  async function swap(url, target, init) {
    const resp = await fetch(url, init);
    const html = await resp.text();
    const el = $(target);
    if (el) el.outerHTML = html;
    return resp;
  }

  // Search
  const searchBtn = $('#search-btn');
  if (searchBtn) {
    const run = () => {
      const q = $('#search-input').value.trim();
      $('#results').innerHTML = '<p>Searching...</p>';
      swap('/search?q=' + encodeURIComponent(q), '#results');
    };
    searchBtn.addEventListener('click', run);
    $('#search-input').addEventListener('keydown', (e) => { if (e.key === 'Enter') run(); });
  }

  // Export filters and preview
  const controls = ['export-search', 'export-category', 'export-manufacturer', 'export-classification'];
  function filterQuery() {
    const params = new URLSearchParams();
    for (const id of controls) {
      const el = document.getElementById(id);
      if (el && el.value.trim()) params.set(el.name, el.value.trim());
    }
    return params;
  }
  function filterObject() {
    return Object.fromEntries(filterQuery().entries());
  }
  const updatePreview = () => swap('/preview?' + filterQuery().toString(), '#export-preview');
  for (const id of controls) {
    const el = document.getElementById(id);
    if (!el) continue;
    if (el.tagName === 'SELECT') el.addEventListener('change', updatePreview);
    else el.addEventListener('input', debounce(updatePreview, 300));
  }

  const exportBtn = $('#export-btn');
  if (exportBtn) {
    exportBtn.addEventListener('click', async () => {
      const status = $('#export-status');
      status.style.display = 'flex';
      status.className = 'export-status loading';
      status.innerHTML = '<span>⏳</span><span>Generating PDF...</span>';
      const resp = await fetch('/export', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ filters: filterObject() }),
      });
      if (resp.ok) {
        const blob = await resp.blob();
        const disposition = resp.headers.get('Content-Disposition') || '';
        const match = disposition.match(/filename="([^"]+)"/);
        const a = document.createElement('a');
        a.href = URL.createObjectURL(blob);
        a.download = match ? match[1] : 'medicine_report.pdf';
        document.body.appendChild(a);
        a.click();
        URL.revokeObjectURL(a.href);
        a.remove();
        setTimeout(() => swap('/export/status', '#export-status'), 3000);
      }
      swap('/export/status', '#export-status');
    });
  }

  // Chart tooltips
  const tooltip = $('.tooltip');
  document.addEventListener('mouseover', (e) => {
    const bar = e.target.closest('.bar[data-tooltip]');
    if (!bar || !tooltip) return;
    const [first, ...rest] = bar.dataset.tooltip.split('\n');
    tooltip.innerHTML = '';
    const strong = document.createElement('strong');
    strong.textContent = first;
    tooltip.appendChild(strong);
    for (const line of rest) {
      tooltip.appendChild(document.createElement('br'));
      tooltip.appendChild(document.createTextNode(line));
    }
    tooltip.classList.add('visible');
    bar.style.opacity = '0.8';
  });
  document.addEventListener('mousemove', (e) => {
    if (!tooltip) return;
    tooltip.style.left = (e.pageX + 15) + 'px';
    tooltip.style.top = (e.pageY - 10) + 'px';
  });
  document.addEventListener('mouseout', (e) => {
    const bar = e.target.closest('.bar[data-tooltip]');
    if (!bar || !tooltip) return;
    tooltip.classList.remove('visible');
    bar.style.opacity = '1';
  });

  // Drill-down and close
  document.addEventListener('click', (e) => {
    const target = e.target.closest('[data-detail]');
    if (target) {
      swap(target.dataset.detail, '#detail-panel')
        .then(() => $('#detail-panel').scrollIntoView({ behavior: 'smooth' }));
      return;
    }
    if (e.target.closest('[data-action="close-detail"]')) {
      swap('/detail/close', '#detail-panel');
    }
  });

  // Resize: re-render every chart at the new container width
  const charts = $('#charts');
  if (charts) {
    window.addEventListener('resize', debounce(() => {
      const width = $('.chart-container').clientWidth;
      swap('/charts?width=' + width, '#charts');
    }, 250));
  }
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::view::el;

    #[test]
    fn page_embeds_body_and_escapes_title() {
        let body: Node = el("div").id("root").text("hi").into();
        let html = page("A & B", &body);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>A &amp; B</title>"));
        assert!(html.contains("<div id=\"root\">hi</div>"));
        assert!(html.contains("<script>"));
    }
}
