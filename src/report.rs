//! Report generation for audit results

use anyhow::Result;
use minijinja::{context, Environment};
use std::fs;
use std::path::Path;

use crate::models::AuditResult;

/// Trait for report generators
pub trait Reporter {
    fn render(&self, result: &AuditResult) -> Result<String>;

    fn generate(&self, result: &AuditResult, output_path: &Path) -> Result<()> {
        fs::write(output_path, self.render(result)?)?;
        Ok(())
    }
}

/// JSON report generator
#[derive(Debug, Default)]
pub struct JsonReporter;

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for JsonReporter {
    fn render(&self, result: &AuditResult) -> Result<String> {
        Ok(serde_json::to_string_pretty(result)?)
    }
}

/// HTML report generator
#[derive(Debug, Default)]
pub struct HtmlReporter;

impl HtmlReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for HtmlReporter {
    fn render(&self, result: &AuditResult) -> Result<String> {
        let mut env = Environment::new();
        env.add_template("report", HTML_TEMPLATE)?;

        let template = env.get_template("report")?;
        let html = template.render(context! {
            generated_at => &result.generated_at,
            root => &result.root,
            fingerprint => &result.fingerprint,
            decoded_images => result.decoded_images,
            total_images => result.total_images,
            images_audited => result.images_audited,
            images_with_issues => result.images_with_issues(),
            total_boxes => result.total_boxes(),
            high_count => result.high_count(),
            medium_count => result.medium_count(),
            scenes => &result.scenes,
            issues => &result.issues,
        })?;
        Ok(html)
    }
}

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>AVD Index Audit</title>
    <style>
        :root {
            --primary: #00d4ff;
            --bg-dark: #0a0a12;
            --bg-card: rgba(255, 255, 255, 0.03);
            --border: rgba(255, 255, 255, 0.08);
            --text: #e4e4e4;
            --text-muted: #888;
            --warning: #f59e0b;
            --error: #ef4444;
        }
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background: var(--bg-dark);
            color: var(--text);
            line-height: 1.6;
            padding: 2rem;
        }
        .container { max-width: 1200px; margin: 0 auto; }
        h1 { font-size: 2rem; margin-bottom: 0.5rem; color: var(--primary); }
        h2 { color: var(--primary); margin: 2rem 0 1rem; border-bottom: 1px solid var(--border); }
        .meta { color: var(--text-muted); margin-bottom: 2rem; font-size: 0.9rem; }
        .summary-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(180px, 1fr));
            gap: 1rem;
        }
        .summary-card {
            background: var(--bg-card);
            border: 1px solid var(--border);
            border-radius: 12px;
            padding: 1.5rem;
            text-align: center;
        }
        .summary-card .value { font-size: 2.5rem; font-weight: 700; }
        .summary-card .label { font-size: 0.8rem; color: var(--text-muted); }
        .high { color: var(--error); }
        .medium { color: var(--warning); }
        table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
        th, td { padding: 0.4rem 0.6rem; border-bottom: 1px solid var(--border); text-align: left; }
        td.mono { font-family: monospace; }
    </style>
</head>
<body>
    <div class="container">
        <h1>AVD Index Audit</h1>
        <p class="meta">
            Generated: {{ generated_at }} | Root: {{ root }} |
            Index: <code>{{ fingerprint[:12] }}</code> | Images decoded: {{ decoded_images }}
        </p>

        <div class="summary-grid">
            <div class="summary-card">
                <div class="value">{{ total_images }}</div>
                <div class="label">Indexed Images</div>
            </div>
            <div class="summary-card">
                <div class="value">{{ images_audited }}</div>
                <div class="label">Images Audited</div>
            </div>
            <div class="summary-card">
                <div class="value">{{ total_boxes }}</div>
                <div class="label">Boxes</div>
            </div>
            <div class="summary-card">
                <div class="value high">{{ high_count }}</div>
                <div class="label">High Severity</div>
            </div>
            <div class="summary-card">
                <div class="value medium">{{ medium_count }}</div>
                <div class="label">Medium Severity</div>
            </div>
        </div>

        <h2>Scenes ({{ scenes|length }})</h2>
        <table>
            <tr><th>Scene</th><th>Images</th><th>Annotated</th><th>Missing</th><th>Malformed</th><th>Unreadable</th><th>Boxes</th></tr>
            {% for s in scenes %}
            <tr>
                <td class="mono">{{ s.scene }}</td>
                <td>{{ s.images }}</td>
                <td>{{ s.annotated }}</td>
                <td{% if s.missing_annotations > 0 %} class="high"{% endif %}>{{ s.missing_annotations }}</td>
                <td{% if s.malformed_names > 0 %} class="medium"{% endif %}>{{ s.malformed_names }}</td>
                <td{% if s.unreadable_images > 0 %} class="high"{% endif %}>{{ s.unreadable_images }}</td>
                <td>{{ s.boxes }}</td>
            </tr>
            {% endfor %}
        </table>

        <h2>Issues ({{ issues|length }})</h2>
        <table>
            <tr><th>Image</th><th>Severity</th><th>Type</th><th>Description</th></tr>
            {% for issue in issues %}
            <tr>
                <td class="mono">{{ issue.image }}</td>
                <td class="{{ issue.severity }}">{{ issue.severity }}</td>
                <td>{{ issue["type"] }}</td>
                <td>{{ issue.description }}</td>
            </tr>
            {% endfor %}
        </table>
    </div>
</body>
</html>
"#;
