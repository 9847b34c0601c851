// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use super::*;
use heyama_core::Pagination;
use yare::parameterized;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}

#[test]
fn test_list_defaults() {
    let cli = parse(&["heyama", "list"]).unwrap();
    match cli.command {
        Command::List { page, output } => {
            assert_eq!(page.pagination(), None);
            assert_eq!(output, OutputFormat::Text);
        }
        _ => panic!("Expected List command"),
    }
}

#[test]
fn test_list_with_page_and_limit() {
    let cli = parse(&["heyama", "list", "--page", "2", "-n", "10", "-o", "json"]).unwrap();
    match cli.command {
        Command::List { page, output } => {
            assert_eq!(page.pagination(), Some(Pagination::new(Some(2), Some(10))));
            assert_eq!(output, OutputFormat::Json);
        }
        _ => panic!("Expected List command"),
    }
}

#[parameterized(
    zero_page = { &["heyama", "list", "--page", "0"] },
    zero_limit = { &["heyama", "list", "--limit", "0"] },
    negative = { &["heyama", "list", "--page", "-1"] },
    not_a_number = { &["heyama", "list", "--limit", "ten"] },
)]
fn test_list_rejects_bad_pages(args: &[&str]) {
    assert!(parse(args).is_err());
}

#[test]
fn test_show_command() {
    let cli = parse(&["heyama", "show", "42"]).unwrap();
    match cli.command {
        Command::Show { id, output } => {
            assert_eq!(id, "42");
            assert_eq!(output, OutputFormat::Text);
        }
        _ => panic!("Expected Show command"),
    }
}

#[test]
fn test_show_requires_id() {
    assert!(parse(&["heyama", "show"]).is_err());
}

#[test]
fn test_create_command() {
    let cli = parse(&[
        "heyama",
        "create",
        "--title",
        "Chair",
        "--description",
        "A sturdy wooden chair",
        "--image",
        "chair.jpg",
    ])
    .unwrap();
    match cli.command {
        Command::Create {
            title,
            description,
            image,
            ..
        } => {
            assert_eq!(title, "Chair");
            assert_eq!(description, "A sturdy wooden chair");
            assert_eq!(image.unwrap().to_str(), Some("chair.jpg"));
        }
        _ => panic!("Expected Create command"),
    }
}

#[test]
fn test_create_short_flags() {
    let cli = parse(&["heyama", "create", "-t", "Lamp", "-d", "Brass desk lamp"]).unwrap();
    match cli.command {
        Command::Create { title, image, .. } => {
            assert_eq!(title, "Lamp");
            assert!(image.is_none());
        }
        _ => panic!("Expected Create command"),
    }
}

#[parameterized(
    missing_title = { &["heyama", "create", "-d", "A sturdy wooden chair"] },
    missing_description = { &["heyama", "create", "-t", "Chair"] },
    blank_title = { &["heyama", "create", "-t", "  ", "-d", "A sturdy wooden chair"] },
    blank_description = { &["heyama", "create", "-t", "Chair", "-d", ""] },
)]
fn test_create_rejects(args: &[&str]) {
    assert!(parse(args).is_err());
}

#[test]
fn test_update_command() {
    let cli = parse(&["heyama", "update", "7", "--title", "Desk"]).unwrap();
    match cli.command {
        Command::Update {
            id,
            title,
            description,
            ..
        } => {
            assert_eq!(id, "7");
            assert_eq!(title.as_deref(), Some("Desk"));
            assert!(description.is_none());
        }
        _ => panic!("Expected Update command"),
    }
}

#[test]
fn test_update_without_fields_parses() {
    // Rejected later with a hint rather than a usage error.
    let cli = parse(&["heyama", "update", "7"]).unwrap();
    assert!(matches!(cli.command, Command::Update { .. }));
}

#[test]
fn test_delete_command() {
    let cli = parse(&["heyama", "delete", "7"]).unwrap();
    match cli.command {
        Command::Delete { id } => assert_eq!(id, "7"),
        _ => panic!("Expected Delete command"),
    }
}

#[test]
fn test_watch_command() {
    let cli = parse(&["heyama", "watch"]).unwrap();
    assert!(matches!(cli.command, Command::Watch { events: None }));

    let cli = parse(&["heyama", "watch", "--events", "3"]).unwrap();
    assert!(matches!(cli.command, Command::Watch { events: Some(3) }));
}
