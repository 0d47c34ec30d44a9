use std::path::PathBuf;

use super::*;

#[test]
fn parses_scrape_with_defaults() {
    let cli = Cli::try_parse_from(["mapharvest", "scrape", "--keywords", "keywords.txt"])
        .expect("expected valid cli args");

    let Commands::Scrape(args) = cli.command else {
        panic!("expected scrape command");
    };
    assert_eq!(args.language, "EN");
    assert_eq!(args.keywords, PathBuf::from("keywords.txt"));
    assert_eq!(args.output, PathBuf::from("output"));
    assert_eq!(args.shards, None);
    assert_eq!(args.max_reviews, None);
    assert!(!args.analyze);
}

#[test]
fn parses_scrape_overrides() {
    let cli = Cli::try_parse_from([
        "mapharvest",
        "scrape",
        "-l",
        "ES",
        "-k",
        "kw.txt",
        "-o",
        "/tmp/out",
        "--shards",
        "2",
        "--max-reviews",
        "50",
        "--analyze",
    ])
    .expect("expected valid cli args");

    let Commands::Scrape(args) = cli.command else {
        panic!("expected scrape command");
    };
    assert_eq!(args.language, "ES");
    assert_eq!(args.output, PathBuf::from("/tmp/out"));
    assert_eq!(args.shards, Some(2));
    assert_eq!(args.max_reviews, Some(50));
    assert!(args.analyze);
}

#[test]
fn scrape_requires_keyword_file() {
    assert!(Cli::try_parse_from(["mapharvest", "scrape"]).is_err());
}

#[test]
fn non_numeric_shards_rejected() {
    let result = Cli::try_parse_from([
        "mapharvest",
        "scrape",
        "--keywords",
        "kw.txt",
        "--shards",
        "four",
    ]);
    assert!(result.is_err());
}

#[test]
fn parses_analyze_command() {
    let cli = Cli::try_parse_from(["mapharvest", "analyze", "out/cafe_reviews.csv"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Analyze { ref file } if file == &PathBuf::from("out/cafe_reviews.csv")
    ));
}

#[test]
fn command_is_required() {
    assert!(Cli::try_parse_from(["mapharvest"]).is_err());
}
