// reflow: Multi-Commit Operation Engine for Git
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use clap::Parser as _;

use super::{Command, parse_from};

#[test]
fn test_parse_reorder() {
    let cli = parse_from([
        "reflow", "reorder", "abc123", "def456", "--before", "fed789", "--base", "base000",
    ]);
    match cli.command {
        Some(Command::Reorder(args)) => {
            assert_eq!(args.commits, vec!["abc123", "def456"]);
            assert_eq!(args.before.as_deref(), Some("fed789"));
            assert_eq!(args.base.as_deref(), Some("base000"));
        }
        other => panic!("expected reorder, got {other:?}"),
    }
}

#[test]
fn test_parse_reorder_requires_commits() {
    let result = super::Cli::try_parse_from(["reflow", "reorder"]);
    assert!(result.is_err(), "reorder without commits should fail");
}

#[test]
fn test_parse_compare_defaults() {
    let cli = parse_from(["reflow", "compare"]);
    match cli.command {
        Some(Command::Compare(args)) => assert!(args.branches.is_empty()),
        other => panic!("expected compare, got {other:?}"),
    }
}

#[test]
fn test_parse_global_options() {
    let cli = parse_from([
        "reflow",
        "--repo",
        "/some/repo",
        "--dry",
        "-l",
        "4",
        "prune",
        "--watch",
    ]);
    assert_eq!(cli.global.repo_path(), std::path::PathBuf::from("/some/repo"));
    assert!(cli.global.dry);
    assert_eq!(cli.global.log_level, Some(4));
    match cli.command {
        Some(Command::Prune(args)) => assert!(args.watch),
        other => panic!("expected prune, got {other:?}"),
    }
}

#[test]
fn test_log_level_range_enforced() {
    let result = super::Cli::try_parse_from(["reflow", "-l", "9", "status"]);
    assert!(result.is_err(), "log level above 5 should be rejected");
}
