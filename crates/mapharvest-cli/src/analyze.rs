//! `analyze` command and the post-scrape analysis step.

use std::path::Path;

use anyhow::Context;
use mapharvest_sentiment::{analyze_review_file, CategoryBucket, LexiconClassifier};

fn print_buckets(title: &str, buckets: &[CategoryBucket]) {
    println!("{title}");
    if buckets.is_empty() {
        println!("  (none)");
        return;
    }
    println!("  {:<15}{:<10}REVIEWS", "TOPIC", "MENTIONS");
    for bucket in buckets {
        let ids: Vec<String> = bucket.review_ids.iter().map(ToString::to_string).collect();
        println!("  {:<15}{:<10}{}", bucket.label, bucket.count, ids.join(", "));
    }
}

/// Analyze one review file and print its topic summary.
///
/// # Errors
///
/// Returns an error if the file is missing, not a CSV, unreadable, or the
/// summary cannot be written.
pub(crate) fn run_analyze(file: &Path) -> anyhow::Result<()> {
    let outcome = analyze_review_file(file, &LexiconClassifier)
        .with_context(|| format!("failed to analyze {}", file.display()))?;

    let summary = &outcome.summary;
    println!(
        "{} reviews, {} positive and {} negative mentions",
        summary.reviews_by_id.len(),
        summary.total_positive_mentions,
        summary.total_negative_mentions
    );
    print_buckets("Positive", &summary.positive_categories);
    print_buckets("Negative", &summary.negative_categories);
    println!("written to {}", outcome.json_path.display());
    Ok(())
}

/// Analyze a review file produced by a scrape. Failures are reported and
/// never affect the scrape output.
pub(crate) fn analyze_best_effort(file: &Path) {
    match analyze_review_file(file, &LexiconClassifier) {
        Ok(outcome) => println!("analysis: {}", outcome.json_path.display()),
        Err(e) => {
            eprintln!("error: failed to analyze {}: {e}", file.display());
            tracing::warn!(file = %file.display(), error = %e, "review analysis skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_writes_json_next_to_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cafe_reviews.csv");
        std::fs::write(
            &input,
            "reviewer_name,rating,date,review_text\nAna,5,a week ago,Great coffee.\n",
        )
        .unwrap();

        run_analyze(&input).unwrap();

        assert!(dir.path().join("cafe_reviews_analysis.json").is_file());
    }

    #[test]
    fn analyze_reports_missing_file() {
        let err = run_analyze(Path::new("/nonexistent/cafe_reviews.csv")).unwrap_err();
        assert!(err.to_string().contains("failed to analyze"));
    }

    #[test]
    fn best_effort_swallows_failures() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        std::fs::write(&input, "not reviews").unwrap();

        analyze_best_effort(&input);

        assert!(!dir.path().join("notes_analysis.json").exists());
    }
}
