//! Catalog formatting: HTML for the renderer, plain text for the fallback.
//!
//! All functions here are pure: the same categories always produce the same
//! output.  The HTML pages are self-contained (inline CSS, no external
//! resources) so the renderer never waits on the network.

use std::fmt::Write as _;

use crate::domain::catalog::Category;

/// Placeholder shown in the HTML catalog for commands without a description.
pub const MISSING_DESCRIPTION: &str = "No description available";

const PAGE_TITLE: &str = "Command Menu";

/// Returns `(category_count, command_count)` for the catalog header.
pub fn catalog_stats(categories: &[Category]) -> (usize, usize) {
    let commands = categories.iter().map(|c| c.commands.len()).sum();
    (categories.len(), commands)
}

/// Renders the full catalog as a standalone HTML document.
///
/// The header shows the category and command counts; every category gets one
/// block and every command one row, both in input order.
pub fn format_catalog_html(categories: &[Category]) -> String {
    let (category_count, command_count) = catalog_stats(categories);

    let mut html = String::with_capacity(4096 + categories.len() * 512);
    html.push_str(CATALOG_HEAD);

    // `write!` into a String cannot fail.
    let _ = write!(
        html,
        r#"<body>
<div class="container">
  <div class="header">
    <h1>{PAGE_TITLE}</h1>
    <p>Everything this bot can do, grouped by topic</p>
    <div class="stats">
      <div class="stat-item"><span class="stat-number" id="category-count">{category_count}</span><span class="stat-label">Categories</span></div>
      <div class="stat-item"><span class="stat-number" id="command-count">{command_count}</span><span class="stat-label">Commands</span></div>
    </div>
  </div>
  <div class="categories">
"#
    );

    for category in categories {
        let _ = write!(
            html,
            r#"    <div class="category">
      <div class="category-header">
        <div class="category-title">{name}</div>
        <div class="category-count">{count} commands</div>
      </div>
      <div class="commands-grid">
"#,
            name = escape_html(&category.name),
            count = category.commands.len(),
        );

        for command in &category.commands {
            let desc = if command.desc.is_empty() {
                MISSING_DESCRIPTION
            } else {
                command.desc.as_str()
            };
            let _ = write!(
                html,
                r#"        <div class="command-item">
          <div class="command-name">{name}</div>
          <div class="command-desc">{desc}</div>
        </div>
"#,
                name = escape_html(&command.name),
                desc = escape_html(desc),
            );
        }

        html.push_str("      </div>\n    </div>\n");
    }

    let _ = write!(
        html,
        r#"  </div>
  <div class="footer"><div class="footer-text">{PAGE_TITLE} v{version}</div></div>
</div>
</body>
</html>
"#,
        version = env!("CARGO_PKG_VERSION"),
    );

    html
}

/// Renders the static branded cover page.
pub fn format_cover_html() -> String {
    COVER_HTML.to_string()
}

/// Renders the catalog as plain chat text.
///
/// `notice` is a one-line explanation of why the image is missing (renderer
/// unavailable, render failed, …).  Each command becomes one line
/// `"  • /{name} - {desc}"`, or `"  • /{name}"` when the description is empty.
pub fn format_catalog_text(categories: &[Category], editor_url: &str, notice: &str) -> String {
    let mut text = String::new();
    let _ = writeln!(text, "{PAGE_TITLE}");
    text.push('\n');
    if !notice.is_empty() {
        let _ = writeln!(text, "{notice}");
        text.push('\n');
    }

    for category in categories {
        let _ = writeln!(text, "[{}]", category.name);
        for command in &category.commands {
            if command.desc.is_empty() {
                let _ = writeln!(text, "  • /{}", command.name);
            } else {
                let _ = writeln!(text, "  • /{} - {}", command.name, command.desc);
            }
        }
        text.push('\n');
    }

    let _ = write!(text, "Manage this menu in the web editor: {editor_url}");
    text
}

/// Escapes the five HTML-significant characters.
fn escape_html(input: &str) -> String {
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

// ── Templates ─────────────────────────────────────────────────────────────────

const CATALOG_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Command Menu</title>
<style>
  body { font-family: 'Segoe UI', 'Microsoft YaHei', sans-serif; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); margin: 0; padding: 40px; color: #333; min-height: 100vh; }
  .container { max-width: 900px; margin: 0 auto; background: rgba(255, 255, 255, 0.95); border-radius: 20px; box-shadow: 0 20px 40px rgba(0, 0, 0, 0.1); overflow: hidden; }
  .header { background: linear-gradient(135deg, #4a6cf7 0%, #8b5cf6 100%); color: white; padding: 40px; text-align: center; }
  .header h1 { font-size: 2.5em; margin: 0 0 10px 0; font-weight: 800; }
  .header p { font-size: 1.2em; opacity: 0.9; margin: 0; }
  .stats { display: grid; grid-template-columns: 1fr 1fr; gap: 20px; padding: 30px; margin: 20px; border-radius: 15px; background: rgba(255, 255, 255, 0.1); }
  .stat-item { text-align: center; color: white; }
  .stat-number { font-size: 2.5em; font-weight: 800; display: block; line-height: 1; }
  .stat-label { font-size: 1em; opacity: 0.9; margin-top: 8px; display: block; }
  .categories { padding: 30px; }
  .category { background: white; border-radius: 15px; padding: 25px; margin-bottom: 25px; box-shadow: 0 8px 25px rgba(0, 0, 0, 0.1); border-left: 5px solid #4a6cf7; }
  .category-header { display: flex; justify-content: space-between; align-items: center; margin-bottom: 20px; padding-bottom: 15px; border-bottom: 2px solid #f1f5f9; }
  .category-title { font-size: 1.4em; font-weight: 700; color: #2c3e50; }
  .category-count { background: #4a6cf7; color: white; padding: 5px 12px; border-radius: 20px; font-size: 0.9em; font-weight: 600; }
  .commands-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(280px, 1fr)); gap: 15px; }
  .command-item { background: #f8fafc; border: 1px solid #e2e8f0; border-radius: 10px; padding: 15px; border-left: 3px solid #10b981; }
  .command-name { font-weight: 700; color: #1e293b; font-size: 1.1em; margin-bottom: 8px; }
  .command-name::before { content: '/'; color: #64748b; margin-right: 4px; }
  .command-desc { color: #64748b; font-size: 0.95em; line-height: 1.4; }
  .footer { background: #1e293b; color: white; padding: 25px; text-align: center; }
  .footer-text { opacity: 0.8; font-size: 0.9em; }
</style>
</head>
"#;

const COVER_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Command Menu</title>
<style>
  body { margin: 0; padding: 0; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); display: flex; justify-content: center; align-items: center; min-height: 100vh; font-family: 'Segoe UI', 'Microsoft YaHei', sans-serif; }
  .cover { width: 800px; height: 600px; background: rgba(255, 255, 255, 0.1); border-radius: 30px; box-shadow: 0 25px 50px rgba(0, 0, 0, 0.2); border: 1px solid rgba(255, 255, 255, 0.2); display: flex; flex-direction: column; justify-content: center; align-items: center; text-align: center; color: white; }
  .title { font-size: 4em; font-weight: 800; margin-bottom: 20px; }
  .subtitle { font-size: 1.8em; margin-bottom: 40px; opacity: 0.9; }
  .features { display: grid; grid-template-columns: 1fr 1fr; gap: 20px; margin-bottom: 40px; }
  .feature { background: rgba(255, 255, 255, 0.1); padding: 15px 25px; border-radius: 15px; border: 1px solid rgba(255, 255, 255, 0.2); font-size: 1.1em; }
</style>
</head>
<body>
<div class="cover">
  <div class="title">Command Menu</div>
  <div class="subtitle">Every plugin command, neatly organized</div>
  <div class="features">
    <div class="feature">Visual command management</div>
    <div class="feature">Custom categories</div>
    <div class="feature">Web editor</div>
    <div class="feature">Image menus</div>
    <div class="feature">Plain-text fallback</div>
    <div class="feature">One-step browser install</div>
  </div>
</div>
</body>
</html>
"#;

// ── Tests ─────────────────────────────────────────────────────────────────────
