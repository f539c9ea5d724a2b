//! HTML helpers: escaping and the inline stylesheet.

/// Escapes text for use in HTML element content and quoted attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Inline CSS styles
pub fn inline_css() -> &'static str {
    r#"
* {
    box-sizing: border-box;
    margin: 0;
    padding: 0;
}

body {
    font-family: system-ui, -apple-system, 'Segoe UI', sans-serif;
    line-height: 1.5;
    color: #111827;
    background: #ffffff;
}

.layout {
    display: grid;
    grid-template-columns: 240px 1fr;
    min-height: 100vh;
}

aside {
    background: #f3f4f6;
    padding: 1.5rem 1rem;
    border-right: 1px solid #e5e7eb;
}

aside h2 {
    font-size: 1.1rem;
    margin-bottom: 1rem;
}

aside label {
    display: block;
    font-size: 0.875rem;
    font-weight: 600;
    margin-bottom: 0.25rem;
}

aside select {
    width: 100%;
    min-height: 8rem;
    padding: 0.25rem;
    border: 1px solid #d1d5db;
    border-radius: 0.375rem;
}

aside .hint {
    font-size: 0.75rem;
    color: #6b7280;
    margin: 0.5rem 0 1rem;
}

aside button,
aside a.reset {
    display: inline-block;
    font-size: 0.875rem;
    padding: 0.4rem 0.9rem;
    border-radius: 0.375rem;
    border: 1px solid #3b82f6;
    background: #3b82f6;
    color: #ffffff;
    text-decoration: none;
    cursor: pointer;
}

aside a.reset {
    background: transparent;
    color: #3b82f6;
    margin-left: 0.5rem;
}

main {
    padding: 2rem;
    max-width: 1400px;
}

header {
    margin-bottom: 1.5rem;
    padding-bottom: 1rem;
    border-bottom: 2px solid #e5e7eb;
}

header h1 {
    font-size: 2rem;
    font-weight: 700;
}

header .caption {
    color: #6b7280;
    font-size: 0.9rem;
}

.metrics {
    display: grid;
    grid-template-columns: repeat(4, minmax(0, 1fr));
    gap: 1rem;
    margin-bottom: 2rem;
}

.metric {
    background: #f9fafb;
    padding: 1rem;
    border-radius: 0.5rem;
    border-left: 4px solid #3b82f6;
}

.metric .label {
    font-size: 0.875rem;
    font-weight: 600;
    color: #6b7280;
}

.metric .value {
    font-size: 1.75rem;
    font-weight: 700;
}

section {
    margin-bottom: 2.5rem;
}

section h2 {
    font-size: 1.35rem;
    margin-bottom: 0.75rem;
}

h3.chart-title {
    font-size: 1rem;
    font-weight: 600;
    color: #374151;
    margin-bottom: 0.5rem;
}

.columns {
    display: grid;
    grid-template-columns: repeat(2, minmax(0, 1fr));
    gap: 1.5rem;
}

svg.chart {
    display: block;
    max-width: 100%;
    height: auto;
}

svg.chart text {
    font-size: 12px;
    fill: #374151;
}

svg.chart .tick {
    font-size: 11px;
    fill: #6b7280;
}

svg.chart .axis {
    stroke: #9ca3af;
    stroke-width: 1;
}

svg.chart .axis-title {
    font-weight: 600;
}

.chart-empty {
    color: #6b7280;
    font-style: italic;
    padding: 1rem 0;
}

.error {
    background: #fef2f2;
    border: 1px solid #fecaca;
    border-left: 4px solid #dc2626;
    color: #991b1b;
    padding: 1rem;
    border-radius: 0.5rem;
}

.error pre {
    white-space: pre-wrap;
    margin-top: 0.5rem;
    font-size: 0.875rem;
}

footer {
    margin-top: 2rem;
    padding-top: 1rem;
    border-top: 1px solid #e5e7eb;
    color: #6b7280;
    font-size: 0.875rem;
}
"#
}
