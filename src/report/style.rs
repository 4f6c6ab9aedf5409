//! Inline stylesheet for the HTML report

const BASE_CSS: &str = r#"
    body { background: #1e1e1e; color: #d4d4d4; font-family: 'Segoe UI', sans-serif; padding: 2em; }
    h1, h2 { color: {accent}; }
    h2 { border-bottom: 2px solid {accent}; padding-bottom: 0.25em; }
    h3 { color: {accent}; margin-top: 1.5em; }
    table { border-collapse: collapse; width: 100%; margin-bottom: 1em; }
    th, td { border: 1px solid #333; padding: 8px; text-align: left; vertical-align: top; }
    th { background-color: #333; color: #ffffff; }
    tr:nth-child(even) { background-color: #2a2a2a; }
    tr:nth-child(odd) { background-color: #252526; }
    pre { background: #2d2d2d; padding: 1em; border-radius: 6px; overflow-x: auto; white-space: pre-wrap; }
    a { color: {accent}; }
    .emphasis { font-weight: bold; }
    .keywords-block { margin-top: 1em; font-size: 0.95em; color: #cccccc; }
    .keyword-tag { display: inline-block; background-color: #333; color: {accent}; border-radius: 12px; padding: 0.2em 0.6em; margin: 0.1em; font-weight: 500; font-size: 0.9em; white-space: nowrap; }
    footer.credits { border-top: 1px solid #444; margin-top: 3em; padding-top: 1.5em; font-size: 0.9em; color: #aaaaaa; }
    footer.credits a:hover { text-decoration: underline; }
"#;

/// Full stylesheet with the accent colour applied and `.w5`..`.w100` width classes
pub fn stylesheet(accent: &str) -> String {
    let mut css = BASE_CSS.replace("{accent}", accent);
    for pct in (5..=100).step_by(5) {
        css.push_str(&format!("    .w{pct} {{ width: {pct}%; }}\n"));
    }
    css
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accent_and_width_classes() {
        let css = stylesheet("#abcdef");
        assert!(css.contains("h1, h2 { color: #abcdef; }"));
        assert!(!css.contains("{accent}"));
        assert!(css.contains(".w5 { width: 5%; }"));
        assert!(css.contains(".w100 { width: 100%; }"));
    }
}
