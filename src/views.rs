//! HTML pages. Every dynamic value passes through [`escape_html`].

use crate::check_record::CheckRecord;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem auto; max-width: 60rem; color: #222; }
nav a { margin-right: 1rem; }
form { margin: 1.5rem 0; }
input[type=url], input[type=text] { width: 28rem; padding: .4rem; }
.result { padding: 1rem; border-radius: .4rem; background: #f3f3f3; }
table { border-collapse: collapse; width: 100%; font-size: .9rem; }
th, td { border: 1px solid #ccc; padding: .3rem .5rem; text-align: left; }
tr.level-ERROR td { background: #fdecea; }
"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title} - phishwatch</title>
<style>{STYLE}</style>
</head>
<body>
<nav><a href="/">Check a URL</a><a href="/dashboard">Dashboard</a><a href="/about">About</a></nav>
{body}
</body>
</html>
"#,
        title = escape_html(title),
    )
}

/// Outcome shown under the form after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub message: String,
    pub method_used: String,
}

pub fn render_index(csrf_token: &str, outcome: Option<&CheckOutcome>) -> String {
    let result = match outcome {
        Some(o) => format!(
            r#"<div class="result"><p><strong>Method:</strong> {}</p><p>{}</p></div>"#,
            escape_html(&o.method_used),
            escape_html(&o.message),
        ),
        None => String::new(),
    };

    let body = format!(
        r#"<h1>Phishing URL Checker</h1>
<form method="post" action="/">
<input type="hidden" name="csrf_token" value="{token}">
<p><input type="text" name="url" placeholder="https://example.com" autofocus></p>
<p>
<label><input type="radio" name="method" value="dummy" checked> Keyword matching</label>
<label><input type="radio" name="method" value="google"> Google Safe Browsing</label>
</p>
<p><button type="submit">Check</button></p>
</form>
{result}"#,
        token = escape_html(csrf_token),
    );
    layout("Check a URL", &body)
}

pub fn render_about() -> String {
    layout(
        "About",
        r#"<h1>About</h1>
<p>Submit a URL to check it either against a short list of words common in
phishing links, or against the Google Safe Browsing threat lists.</p>
<p>Every Safe Browsing lookup is recorded in the check log with the scheme and
host only; paths and query strings are never stored. The dashboard lists the
most recent lookups.</p>"#,
    )
}

pub fn render_dashboard(records: &[CheckRecord]) -> String {
    let rows: String = records
        .iter()
        .map(|r| {
            format!(
                r#"<tr class="level-{level}"><td>{time}</td><td>{level}</td><td>{url}</td><td>{status}</td><td>{result}</td></tr>
"#,
                time = escape_html(&r.timestamp),
                level = escape_html(&r.level),
                url = escape_html(&r.sanitized_url),
                status = escape_html(&r.status),
                result = escape_html(&r.result),
            )
        })
        .collect();

    let body = format!(
        r#"<h1>API Monitor Dashboard</h1>
<p>{count} most recent checks, newest first.</p>
<table>
<thead><tr><th>Time</th><th>Level</th><th>URL</th><th>Status</th><th>Result</th></tr></thead>
<tbody>
{rows}</tbody>
</table>"#,
        count = records.len(),
    );
    layout("Dashboard", &body)
}
