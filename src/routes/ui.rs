use axum::{extract::State, response::Html, routing::get, Router};
use tracing::warn;

use crate::models::{AppState, LogEntry};
use crate::utils::escape_html;

/// How many log rows the landing page shows.
pub const RECENT_LOG_LIMIT: i64 = 50;

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(index)).with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    render_page(&state, None).await
}

/// Render the submission form with an optional outcome message and the most
/// recent request logs. A failed log fetch degrades to an empty table.
pub async fn render_page(state: &AppState, message: Option<&str>) -> Html<String> {
    let (logs, notice) = match state.logs.recent_logs(RECENT_LOG_LIMIT).await {
        Ok(logs) => (logs, None),
        Err(e) => {
            warn!(error = %e, "Failed to load recent logs");
            (Vec::new(), Some("Recent logs are unavailable right now."))
        }
    };
    Html(page(message, &logs, notice))
}

fn page(message: Option<&str>, logs: &[LogEntry], notice: Option<&str>) -> String {
    let message_html = message
        .map(|m| format!(r#"<p class="message">{}</p>"#, escape_html(m)))
        .unwrap_or_default();

    let mut rows = String::new();
    for entry in logs {
        rows.push_str(&format!(
            r#"<tr><td>{when}</td><td class="lvl-{level}">{level}</td><td>{message}</td><td>{source}</td></tr>"#,
            when = entry.created_at.format("%Y-%m-%d %H:%M:%S"),
            level = escape_html(&entry.level),
            message = escape_html(&entry.message),
            source = escape_html(&entry.source),
        ));
    }
    if let Some(notice) = notice {
        rows.push_str(&format!(r#"<tr><td colspan="4">{}</td></tr>"#, escape_html(notice)));
    }

    let template = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Newsdesk - Add News</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 2rem; color: #1d1d1f; }
    h1 { margin-bottom: 0.5rem; }
    .card { border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
    label { display: block; margin-top: 0.75rem; font-weight: 600; }
    input, textarea { width: 100%; padding: 0.5rem; }
    button { margin-top: 1rem; padding: 0.6rem 1rem; }
    .message { background: #f6f8fa; padding: 0.75rem; border-radius: 6px; }
    table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
    th, td { border-bottom: 1px solid #ddd; text-align: left; padding: .4rem; }
    .lvl-INFO { color: #1a7f37; }
    .lvl-WARN { color: #9a6700; }
    .lvl-ERROR { color: #cf222e; }
  </style>
</head>
<body>
  <h1>Add News</h1>
  __MESSAGE__
  <div class="card">
    <form action="/add" method="post" enctype="multipart/form-data">
      <label for="slug">Slug</label>
      <input id="slug" name="slug" required />
      <label for="title">Title</label>
      <input id="title" name="title" required />
      <label for="source_url">Source URL</label>
      <input id="source_url" name="source_url" type="url" required />
      <label for="description">Description</label>
      <textarea id="description" name="description" rows="5" required></textarea>
      <label for="image">Image</label>
      <input id="image" name="image" type="file" accept="image/*" />
      <button type="submit">Submit</button>
    </form>
  </div>
  <div class="card">
    <h2>Recent requests</h2>
    <table>
      <thead><tr><th>When</th><th>Level</th><th>Message</th><th>Source</th></tr></thead>
      <tbody>__LOGS__</tbody>
    </table>
  </div>
</body>
</html>"#;

    template
        .replace("__MESSAGE__", &message_html)
        .replace("__LOGS__", &rows)
}
