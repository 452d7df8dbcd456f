//! HTML review generator.
//!
//! Produces self-contained HTML files with all CSS/JS inlined.

use anyhow::Result;
use std::path::Path;

use quizline_core::model::TestInfo;
use quizline_core::results::{AnswerReview, QuizResult};
use quizline_core::statistics::HistoryStats;
use quizline_core::view::{format_time, option_label};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn page_start(html: &mut String, title: &str) {
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");
}

fn page_end(html: &mut String) {
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");
    html.push_str("</body>\n</html>");
}

/// Generate the review page for one graded attempt. `test` supplies the
/// title when the catalog entry is available.
pub fn generate_review_html(result: &QuizResult, test: Option<&TestInfo>) -> String {
    let title = test.map(|t| t.title.as_str()).unwrap_or(&result.test_id);
    let mut html = String::new();
    page_start(&mut html, &format!("quizline review: {title}"));

    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(title)));
    html.push_str(&format!(
        "<p class=\"meta\">{} | completed {}</p>\n",
        html_escape(&result.user_id),
        result.completed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score card
    let verdict = if result.passed { "pass" } else { "fail" };
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str(&format!(
        "<div class=\"score {verdict}\"><span class=\"pct\">{}%</span><span>{}</span></div>\n",
        result.percentage,
        if result.passed { "Passed" } else { "Not passed" }
    ));
    html.push_str("<table class=\"summary\">\n<tbody>\n");
    for (label, value) in [
        (
            "Correct",
            format!("{} / {}", result.correct_count, result.total_questions),
        ),
        ("Incorrect", result.incorrect_count().to_string()),
        ("Unanswered", result.unanswered_count().to_string()),
        ("Flagged", result.flagged_count.to_string()),
        ("Passing score", format!("{}%", result.passing_score)),
        (
            "Time taken",
            format!(
                "{} of {}",
                format_time(result.elapsed_secs),
                format_time(result.allotted_secs)
            ),
        ),
    ] {
        html.push_str(&format!("<tr><th>{label}</th><td>{value}</td></tr>\n"));
    }
    html.push_str("</tbody></table>\n");

    if !result.strength_areas.is_empty() || !result.improvement_areas.is_empty() {
        html.push_str("<div class=\"areas\">\n");
        push_area_list(&mut html, "Strengths", &result.strength_areas);
        push_area_list(&mut html, "Needs work", &result.improvement_areas);
        html.push_str("</div>\n");
    }
    html.push_str("</section>\n");

    // Question review
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<label><input type=\"checkbox\" id=\"missed-only\" onchange=\"filterMissed(this.checked)\"> Show missed only</label>\n");
    for review in &result.breakdown {
        push_question(&mut html, review);
    }
    html.push_str("</section>\n");

    page_end(&mut html);
    html
}

fn push_area_list(html: &mut String, heading: &str, areas: &[String]) {
    if areas.is_empty() {
        return;
    }
    html.push_str(&format!("<h3>{heading}</h3>\n<ul>\n"));
    for area in areas {
        html.push_str(&format!("<li>{}</li>\n", html_escape(area)));
    }
    html.push_str("</ul>\n");
}

fn push_question(html: &mut String, review: &AnswerReview) {
    let class = match (review.selected, review.is_correct) {
        (None, _) => "question unanswered",
        (Some(_), true) => "question correct",
        (Some(_), false) => "question incorrect",
    };
    html.push_str(&format!("<article class=\"{class}\">\n"));
    html.push_str(&format!(
        "<h3>{}. {}{}</h3>\n",
        review.index + 1,
        html_escape(&review.prompt),
        if review.flagged {
            " <span class=\"flag\">flagged</span>"
        } else {
            ""
        }
    ));

    html.push_str("<ol class=\"options\">\n");
    for (i, option) in review.options.iter().enumerate() {
        let mut classes = Vec::new();
        if i == review.correct_option {
            classes.push("answer");
        }
        if review.selected == Some(i) {
            classes.push("chosen");
        }
        html.push_str(&format!(
            "<li class=\"{}\"><b>{}</b> {}</li>\n",
            classes.join(" "),
            option_label(i),
            html_escape(option)
        ));
    }
    html.push_str("</ol>\n");

    if review.selected.is_none() {
        html.push_str("<p class=\"note\">Not answered.</p>\n");
    }
    if !review.explanation.is_empty() {
        html.push_str(&format!(
            "<details><summary>Explanation</summary><p>{}</p></details>\n",
            html_escape(&review.explanation)
        ));
    }
    html.push_str("</article>\n");
}

/// Generate an overview page for a user's recorded results.
pub fn generate_history_html(user_id: &str, results: &[QuizResult], stats: &HistoryStats) -> String {
    let mut html = String::new();
    page_start(&mut html, &format!("quizline history: {user_id}"));

    html.push_str("<header>\n");
    html.push_str("<h1>Result history</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">{} | {} attempts | average {:.1}% | best {}% | pass rate {:.0}% | study time {}</p>\n",
        html_escape(user_id),
        stats.total_attempts,
        stats.average_score,
        stats.best_score,
        stats.pass_rate * 100.0,
        format_time(stats.total_study_secs)
    ));
    html.push_str("</header>\n");

    if !stats.per_test.is_empty() {
        html.push_str("<section class=\"dashboard\">\n<h2>Best score per test</h2>\n");
        html.push_str(&generate_bar_chart(
            stats
                .per_test
                .values()
                .map(|t| (t.test_id.as_str(), t.best_score)),
        ));
        html.push_str("</section>\n");
    }

    html.push_str("<section class=\"results\">\n<h2>Attempts</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Completed</th><th onclick=\"sortTable(1)\">Test</th><th onclick=\"sortTable(2)\">Score</th><th onclick=\"sortTable(3)\">Time</th><th onclick=\"sortTable(4)\">Result</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for r in results {
        let class = if r.passed { "pass" } else { "fail" };
        html.push_str(&format!(
            "<tr class=\"{class}\"><td>{}</td><td>{}</td><td>{}%</td><td>{}</td><td>{}</td></tr>\n",
            r.completed_at.format("%Y-%m-%d %H:%M"),
            html_escape(&r.test_id),
            r.percentage,
            format_time(r.elapsed_secs),
            if r.passed { "PASS" } else { "FAIL" }
        ));
    }
    html.push_str("</tbody></table>\n</section>\n");

    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(results).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    page_end(&mut html);
    html
}

/// Write an HTML page to a file, creating parent directories.
pub fn write_html(html: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    Ok(())
}

fn generate_bar_chart<'a>(scores: impl Iterator<Item = (&'a str, u32)>) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let scores: Vec<(&str, u32)> = scores.collect();
    let total_height = scores.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (label, score)) in scores.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (*score).min(100) as usize * max_width / 100;

        let color = if *score >= 80 {
            "#22c55e"
        } else if *score >= 50 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(label)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            score
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; --muted: #6b7280; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; max-width: 60rem; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .note { color: var(--muted); }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
.score { display: inline-flex; flex-direction: column; padding: 1rem 2rem; border-radius: 8px; }
.score .pct { font-size: 2.5rem; font-weight: bold; }
.question { border: 1px solid var(--border); border-left-width: 6px; border-radius: 8px; padding: 0.5rem 1rem; margin: 1rem 0; }
.question.correct { border-left-color: #22c55e; }
.question.incorrect { border-left-color: #ef4444; }
.question.unanswered { border-left-color: var(--muted); }
.options { list-style: none; padding-left: 0; }
.options li { padding: 0.25rem 0.5rem; border-radius: 4px; }
.options li.answer { background: var(--pass); }
.options li.chosen:not(.answer) { background: var(--fail); }
.flag { font-size: 0.75rem; padding: 0.1rem 0.4rem; border-radius: 4px; background: #eab308; color: #1a1a1a; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  if (!table) return;
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, {numeric: true}) : vb.localeCompare(va, undefined, {numeric: true});
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
function filterMissed(only) {
  document.querySelectorAll('.question.correct').forEach(q => {
    q.style.display = only ? 'none' : '';
  });
}
"#;
