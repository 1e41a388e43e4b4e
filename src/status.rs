// System status display: artifact directory contents and manifest.

use std::path::Path;

use colored::Colorize;

use crate::artifacts::{self, BUNDLE_FILES};
use crate::config::Config;

/// Display artifact and backend status to the terminal.
pub fn show(config: &Config) {
    let dir = &config.artifact_dir;
    println!("Backend: {}", config.backend.as_str());
    if !config.remote_endpoint.is_empty() {
        println!("Remote endpoint: {}", config.remote_endpoint);
    }
    println!(
        "API key: {}",
        if config.api_key.is_empty() {
            "not set".red().to_string()
        } else {
            format!("set (header `{}`)", config.api_key_header)
        }
    );

    println!("\nArtifacts: {}", dir.display());
    if !dir.exists() {
        println!("  not created yet");
        println!("\nRun `topicast prepare` to build the preprocessing artifacts.");
        return;
    }

    for file in BUNDLE_FILES {
        let path = dir.join(file);
        let line = match std::fs::metadata(&path) {
            Ok(meta) => format!("{:<20} {}", file, format_bytes(meta.len())),
            Err(_) => format!("{:<20} {}", file, "missing".red()),
        };
        println!("  {line}");
    }

    match artifacts::load_manifest(dir) {
        Ok(manifest) => {
            println!(
                "\nTraining run: {} (created {})",
                manifest.run_id,
                manifest.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!(
                "  {} features, {} topics",
                manifest.n_features, manifest.n_labels
            );
        }
        Err(e) => println!("\nManifest: {}", e.to_string().dimmed()),
    }

    if !artifacts::artifact_files_present(dir) && dir.join(artifacts::MANIFEST_FILE).exists() {
        print_classifier_hint(dir);
    }
}

fn print_classifier_hint(dir: &Path) {
    if !dir.join(artifacts::CLASSIFIER_FILE).exists() {
        println!(
            "\n{}",
            format!(
                "Train the classifier on {} and export it as {} to complete the bundle.",
                artifacts::TRAINING_MATRIX_FILE,
                artifacts::CLASSIFIER_FILE
            )
            .dimmed()
        );
    }
}

/// Format a byte count as a human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }
}
