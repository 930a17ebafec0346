use std::fs;
use std::path::Path;

/// Load test HTML fixture by name
pub fn load_html_fixture(fixture_name: &str) -> String {
    let path = Path::new("src/tests/fixtures").join(format!("{}.html", fixture_name));
    fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to load test fixture: {}", fixture_name))
}

/// Load a captured page that once failed to extract
pub fn load_failure_html(failure_name: &str) -> Option<String> {
    let path = Path::new("src/tests/fixtures/failures").join(format!("{}.html", failure_name));
    fs::read_to_string(path).ok()
}

/// A page shaped like the daily history site: a summary table first, then the
/// observations table with the given header and rows.
pub fn daily_page(header: &[&str], rows: &[&[&str]]) -> String {
    let mut html = String::from(
        "<html><body>\n<table class=\"summary-table\"><tr><th>High Temp</th></tr><tr><td>88</td></tr></table>\n<table class=\"observation-table\">\n<thead><tr>",
    );
    for column in header {
        html.push_str(&format!("<th>{}</th>", column));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in rows {
        html.push_str("<tr>");
        for cell in *row {
            html.push_str(&format!("<td> {} </td>", cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody></table>\n</body></html>\n");
    html
}
