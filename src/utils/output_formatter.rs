/// Output formatter for scan results
///
/// This module handles rendering violations to the console and writing the
/// text compliance report, plus optional JSON, HTML and CSV exports.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use handlebars::Handlebars;
use serde_json::json;

use crate::app::{overall_compliance, NotebookReport};
use crate::core::scanner::Violation;

const RULE_WIDTH: usize = 80;

/// Fixed remediation advice, listed only when something was found
const RECOMMENDATIONS: &[&str] = &[
    "1. Replace hardcoded paths with relative paths using Path.cwd()",
    "2. Remove full directory paths from print statements",
    "3. Use generic output messages",
];

const GUIDE_POINTER: &str = "4. See ANONYMITY_COMPLIANCE_GUIDE.md for detailed instructions";

/// Banner printed before results
pub fn format_header() -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "\n{}\n{}\n{}\n",
        rule,
        "ANONYMITY COMPLIANCE CHECKER".bold(),
        rule
    )
}

/// Format the violations of one notebook for console output
///
/// # Arguments
///
/// * `violations` - Violations in scan order
///
/// # Returns
///
/// Numbered entries, or the all-clear message when there are none
pub fn format_violations(violations: &[Violation]) -> String {
    let mut output = String::new();

    if violations.is_empty() {
        output.push_str(&format!("{}\n\n", "✅ NO ANONYMITY VIOLATIONS FOUND!".green().bold()));
        output.push_str("Your notebook appears safe for anonymous submission.\n");
        return output;
    }

    output.push_str(&format!(
        "{}\n\n",
        format!("⚠️  FOUND {} POTENTIAL ANONYMITY VIOLATIONS:", violations.len())
            .yellow()
            .bold()
    ));

    for (i, v) in violations.iter().enumerate() {
        output.push_str(&format_violation(i + 1, v));
        output.push('\n');
    }

    output
}

fn format_violation(number: usize, v: &Violation) -> String {
    let mut entry = format!(
        "{}. {} - {}\n",
        number,
        format!("Cell #{}", v.cell_index).cyan().bold(),
        v.description
    );
    entry.push_str(&format!("   Pattern: {}\n", v.pattern));
    entry.push_str(&format!("   Match: {}\n", v.matched_text.red()));
    if let Some(line) = v.line_in_cell {
        entry.push_str(&format!("   Line in cell: {}\n", line));
    }
    if v.is_output() {
        entry.push_str("   Location: Cell output (print statement or similar)\n");
    }
    if let Some(context) = v.display_context() {
        entry.push_str(&format!("   Context: ...{}...\n", context));
    }
    entry
}

/// Create a one-block summary of a run
pub fn format_summary(reports: &[NotebookReport], elapsed: Duration) -> String {
    let total: usize = reports.iter().map(|r| r.violations.len()).sum();
    let flagged = reports.iter().filter(|r| !r.violations.is_empty()).count();

    let mut output = format!("\n{}\n", "Check Complete".bold());
    output.push_str(&format!("{} {}\n", "Notebooks checked:".green(), reports.len()));
    output.push_str(&format!("{} {}\n", "Notebooks with violations:".green(), flagged));
    output.push_str(&format!("{} {}\n", "Total violations:".green(), total));
    output.push_str(&format!(
        "{} {:.2} seconds\n",
        "Time elapsed:".green(),
        elapsed.as_secs_f64()
    ));
    output
}

/// Render the text compliance report
///
/// # Arguments
///
/// * `reports` - Per-notebook results
/// * `timestamp` - Generation time shown in the header
pub fn render_text_report(reports: &[NotebookReport], timestamp: &str) -> String {
    let mut output = String::new();

    output.push_str("ANONYMITY COMPLIANCE REPORT\n");
    output.push_str(&format!("{}\n\n", "=".repeat(RULE_WIDTH)));
    output.push_str(&format!("Generated: {}\n\n", timestamp));

    for report in reports {
        let status = if report.compliance().is_compliant() {
            "✅ COMPLIANT"
        } else {
            "⚠️ VIOLATIONS FOUND"
        };
        output.push_str(&format!("Notebook: {}\n", report.notebook.display()));
        output.push_str(&format!("SHA-256: {}\n", report.fingerprint));
        output.push_str(&format!("Status: {}\n", status));
        if !report.violations.is_empty() {
            output.push_str(&format!("Violations: {}\n", report.violations.len()));
        }
        output.push('\n');
    }

    output.push_str("Recommendations:\n");
    if !overall_compliance(reports).is_compliant() {
        for line in RECOMMENDATIONS {
            output.push_str(line);
            output.push('\n');
        }
    }
    output.push_str(GUIDE_POINTER);
    output.push('\n');

    output
}

/// Write the text compliance report to a file
pub fn write_text_report(reports: &[NotebookReport], output_path: &Path) -> Result<()> {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let report = render_text_report(reports, &timestamp);

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create report directory: {}", parent.display()))?;
    }

    std::fs::write(output_path, report)
        .context(format!("Failed to write report: {}", output_path.display()))?;

    Ok(())
}

/// Export results to a JSON file
pub fn export_results_json(reports: &[NotebookReport], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create JSON output file: {}", output_path.display()))?;

    let document = json!({
        "status": overall_compliance(reports),
        "notebooks": reports
            .iter()
            .map(|r| json!({
                "notebook": r.notebook,
                "fingerprint": r.fingerprint,
                "status": r.compliance(),
                "violations": r.violations,
            }))
            .collect::<Vec<_>>(),
    });

    serde_json::to_writer_pretty(file, &document).context("Failed to write JSON data")?;

    Ok(())
}

/// Create a CSV report with one row per violation
pub fn create_csv_report(reports: &[NotebookReport], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create CSV output file: {}", output_path.display()))?;

    let mut writer = csv::Writer::from_writer(file);

    writer
        .write_record([
            "Notebook",
            "Cell",
            "Location",
            "Line",
            "Description",
            "Pattern",
            "Match",
        ])
        .context("Failed to write CSV header")?;

    for report in reports {
        let notebook = report.notebook.display().to_string();
        for v in &report.violations {
            let cell = v.cell_index.to_string();
            let location = if v.is_output() { "output" } else { "source" };
            let line = v.line_in_cell.map(|l| l.to_string()).unwrap_or_default();
            writer
                .write_record([
                    notebook.as_str(),
                    cell.as_str(),
                    location,
                    line.as_str(),
                    v.description.as_str(),
                    v.pattern.as_str(),
                    v.matched_text.as_str(),
                ])
                .context("Failed to write CSV record")?;
        }
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Create an HTML report from scan results
pub fn create_html_report(reports: &[NotebookReport], output_path: &Path) -> Result<()> {
    let mut handlebars = Handlebars::new();

    const HTML_TEMPLATE: &str = r#"
    <!DOCTYPE html>
    <html lang="en">
    <head>
        <meta charset="UTF-8">
        <title>Anonymity Compliance Report</title>
        <style>
            body { font-family: Arial, sans-serif; color: #333; max-width: 1200px; margin: 0 auto; padding: 20px; }
            h1 { color: #2c3e50; border-bottom: 2px solid #3498db; padding-bottom: 10px; }
            .timestamp { color: #7f8c8d; font-size: 0.9em; margin-bottom: 30px; }
            .notebook { background-color: #f8f9fa; border-radius: 5px; padding: 15px; margin-bottom: 20px; }
            .compliant { color: #27ae60; }
            .violations { color: #c0392b; }
            table { border-collapse: collapse; width: 100%; }
            th, td { text-align: left; padding: 6px; border-bottom: 1px solid #eee; }
            code { background-color: #eef; padding: 1px 4px; }
        </style>
    </head>
    <body>
        <h1>Anonymity Compliance Report</h1>
        <div class="timestamp">Generated on: {{timestamp}}</div>
        <p>Total violations: {{total_violations}}</p>

        {{#each notebooks}}
        <div class="notebook">
            <h2>{{name}}</h2>
            <p>SHA-256: <code>{{fingerprint}}</code></p>
            {{#if compliant}}
            <p class="compliant">COMPLIANT</p>
            {{else}}
            <p class="violations">VIOLATIONS FOUND</p>
            <table>
                <tr><th>Cell</th><th>Location</th><th>Description</th><th>Match</th><th>Context</th></tr>
                {{#each violations}}
                <tr>
                    <td>{{cell}}</td>
                    <td>{{location}}</td>
                    <td>{{description}}</td>
                    <td><code>{{matched}}</code></td>
                    <td>{{context}}</td>
                </tr>
                {{/each}}
            </table>
            {{/if}}
        </div>
        {{/each}}
    </body>
    </html>
    "#;

    handlebars
        .register_template_string("report", HTML_TEMPLATE)
        .context("Failed to register HTML template")?;

    let notebooks: Vec<_> = reports
        .iter()
        .map(|r| {
            let violations: Vec<_> = r
                .violations
                .iter()
                .map(|v| {
                    let location = match v.line_in_cell {
                        Some(line) => format!("source, line {}", line),
                        None => "output".to_string(),
                    };
                    json!({
                        "cell": v.cell_index,
                        "location": location,
                        "description": v.description,
                        "matched": v.matched_text,
                        "context": v.display_context().unwrap_or_default(),
                    })
                })
                .collect();
            json!({
                "name": r.notebook.display().to_string(),
                "fingerprint": r.fingerprint,
                "compliant": r.compliance().is_compliant(),
                "violations": violations,
            })
        })
        .collect();

    let template_data = json!({
        "timestamp": chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        "total_violations": reports.iter().map(|r| r.violations.len()).sum::<usize>(),
        "notebooks": notebooks,
    });

    let html = handlebars
        .render("report", &template_data)
        .context("Failed to render HTML template")?;

    let mut file = File::create(output_path)
        .context(format!("Failed to create HTML output file: {}", output_path.display()))?;

    file.write_all(html.as_bytes())
        .context("Failed to write HTML data")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notebook::{TextOrigin, TextUnit};
    use crate::core::patterns::DEFAULT_COMPILED_RULES;
    use crate::core::scanner::scan;
    use std::path::PathBuf;

    fn report(name: &str, units: &[TextUnit]) -> NotebookReport {
        NotebookReport {
            notebook: PathBuf::from(name),
            fingerprint: "abc123".to_string(),
            violations: scan(units, &DEFAULT_COMPILED_RULES),
        }
    }

    fn unit(origin: TextOrigin, text: &str) -> TextUnit {
        TextUnit {
            cell_index: 2,
            origin,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_format_violations_lists_each_entry() {
        colored::control::set_override(false);
        let r = report(
            "model.ipynb",
            &[
                unit(TextOrigin::Source, "x = 1\ndf = load('/home/alice/\ndata.csv')"),
                unit(TextOrigin::Output, "saved by Adetayo"),
            ],
        );

        let text = format_violations(&r.violations);
        assert!(text.contains("FOUND 2 POTENTIAL ANONYMITY VIOLATIONS"));
        assert!(text.contains("1. Cell #2 - Unix home directory"));
        assert!(text.contains("   Match: /home/alice/"));
        assert!(text.contains("   Line in cell: 2"));
        assert!(text.contains("   Context: ...x = 1 df = load('/home/alice/ data.csv')..."));
        assert!(text.contains("2. Cell #2 - Personal name"));
        assert!(text.contains("   Location: Cell output (print statement or similar)"));
    }

    #[test]
    fn test_format_violations_when_clean() {
        colored::control::set_override(false);
        let text = format_violations(&[]);
        assert!(text.contains("NO ANONYMITY VIOLATIONS FOUND!"));
    }

    #[test]
    fn test_text_report_for_compliant_notebook() {
        let r = report("clean.ipynb", &[unit(TextOrigin::Source, "print('hi')")]);
        let text = render_text_report(&[r], "2026-01-01 00:00:00");

        assert!(text.starts_with("ANONYMITY COMPLIANCE REPORT\n"));
        assert!(text.contains("Notebook: clean.ipynb\n"));
        assert!(text.contains("Status: ✅ COMPLIANT\n"));
        assert!(!text.contains("1. Replace hardcoded paths"));
        assert!(text.ends_with("4. See ANONYMITY_COMPLIANCE_GUIDE.md for detailed instructions\n"));
    }

    #[test]
    fn test_text_report_lists_recommendations_when_violations_found() {
        let r = report("leaky.ipynb", &[unit(TextOrigin::Output, "/Users/bob/")]);
        let text = render_text_report(&[r], "2026-01-01 00:00:00");

        assert!(text.contains("Status: ⚠️ VIOLATIONS FOUND\n"));
        assert!(text.contains("Violations: 1\n"));
        for line in RECOMMENDATIONS {
            assert!(text.contains(line));
        }
    }

    #[test]
    fn test_exports_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let r = report("leaky.ipynb", &[unit(TextOrigin::Source, "adetayo")]);
        let reports = vec![r];

        let json_path = dir.path().join("out.json");
        export_results_json(&reports, &json_path).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(value["status"], "VIOLATIONS_FOUND");
        assert_eq!(value["notebooks"][0]["violations"][0]["matched_text"], "adetayo");
        assert_eq!(value["notebooks"][0]["violations"][0]["origin"], "source");

        let csv_path = dir.path().join("out.csv");
        create_csv_report(&reports, &csv_path).unwrap();
        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv_text.lines().nth(1).unwrap().starts_with("leaky.ipynb,2,source,1,"));

        let html_path = dir.path().join("out.html");
        create_html_report(&reports, &html_path).unwrap();
        let html = std::fs::read_to_string(&html_path).unwrap();
        assert!(html.contains("VIOLATIONS FOUND"));
        assert!(html.contains("Personal username"));
    }
}
