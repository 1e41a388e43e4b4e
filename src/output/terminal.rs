// Colored terminal output for predictions and evaluation reports.
//
// main.rs display paths delegate here.

use colored::Colorize;

use crate::labels::mapping::UNKNOWN_TOPIC;
use crate::pipeline::evaluate::EvaluationReport;
use crate::pipeline::PredictionResult;

/// Display predictions, one block per input text.
pub fn display_predictions(results: &[PredictionResult]) {
    println!(
        "\n{}",
        format!("=== Topic Predictions ({} texts) ===", results.len()).bold()
    );
    println!();

    for (i, result) in results.iter().enumerate() {
        println!(
            "  {:>2}. \"{}\"",
            i + 1,
            super::truncate_chars(&result.input_text, 80)
        );

        if result.predicted_topics.is_empty() {
            println!("      {}", "no topics predicted".dimmed());
            println!();
            continue;
        }

        for (tag, keywords) in result.predicted_topics.iter().zip(&result.decoded_topics) {
            let keywords_str = keywords.join(", ");
            let colored_keywords = if keywords.len() == 1 && keywords[0] == UNKNOWN_TOPIC {
                keywords_str.yellow()
            } else {
                keywords_str.dimmed()
            };
            println!("      {:<10} {}", tag.bright_green(), colored_keywords);
        }
        println!();
    }
}

/// Display an evaluation report with a colored accuracy figure.
pub fn display_evaluation(report: &EvaluationReport) {
    println!("\n{}", "=== Evaluation (exact match) ===".bold());
    println!("  Rows evaluated: {}", report.rows);
    println!("  Exact matches:  {}", report.exact_matches);

    let pct = format!("{:.1}%", report.accuracy * 100.0);
    let colored_pct = if report.accuracy >= 0.75 {
        pct.green()
    } else if report.accuracy >= 0.4 {
        pct.yellow()
    } else {
        pct.red()
    };
    println!("  Accuracy:       {colored_pct}");
}
