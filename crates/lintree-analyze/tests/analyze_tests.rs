use lintree_analyze::{CategoryConfig, IssueRanking};
use lintree_core::{Directory, File, Issue, Project, ViewOptions};

fn project() -> Project {
    let mut root = Directory::new(".");
    root.files.insert("main.go".into(), File::new("main.go", 40));
    let mut pkg = Directory::new("pkg");
    pkg.files.insert("lib.go".into(), File::new("pkg/lib.go", 60));
    root.subdirectories.insert("pkg".into(), pkg);

    let mut project = Project::new("/my/project", root);
    let reported = [
        ("errcheck", "Error return value of `f.Close` is not checked", "main.go", 3),
        ("errcheck", "Error return value of `w.Write` is not checked", "pkg/lib.go", 8),
        ("errcheck", "Error return value of `conn.SetDeadline` is not checked", "pkg/lib.go", 9),
        ("govet", "unreachable code", "main.go", 12),
        ("golint", "exported function `Open` should have comment or be unexported", "pkg/lib.go", 1),
        ("golint", "exported function `Close` should have comment or be unexported", "pkg/lib.go", 20),
        ("golint", "unreachable code", "pkg/lib.go", 30),
    ];
    for (linter, text, file, line) in reported {
        assert!(project.add_issue(Issue::new(linter, text, file, line, 1)));
    }
    project.seal();
    project
}

#[test]
fn test_category_config_builder() {
    let config = CategoryConfig::builder()
        .tolerance(3usize)
        .max_categories(5usize)
        .build()
        .unwrap();
    assert_eq!(config.tolerance, 3);
    assert_eq!(config.max_categories, 5);

    let default_config = CategoryConfig::default();
    assert_eq!(default_config.tolerance, 10);
    assert_eq!(default_config.max_categories, 0);
}

#[test]
fn test_rank_sorts_by_occurrences() {
    let view = project().generate_view(&ViewOptions::default());
    let report = IssueRanking::new().rank(&view);

    assert_eq!(report.issues_analyzed, 7);
    let summary: Vec<(&str, usize)> = report
        .categories
        .iter()
        .map(|c| (c.linter.as_str(), c.count()))
        .collect();
    assert_eq!(
        summary,
        vec![("errcheck", 3), ("golint", 2), ("golint", 1), ("govet", 1)]
    );
    assert_eq!(
        report.categories[0].representative,
        "Error return value of  <identifier>  is not checked"
    );
}

#[test]
fn test_same_message_from_different_linters_stays_apart() {
    let view = project().generate_view(&ViewOptions::default());
    let report = IssueRanking::new().rank(&view);

    let unreachable: Vec<&str> = report
        .categories
        .iter()
        .filter(|c| c.representative == "unreachable code")
        .map(|c| c.linter.as_str())
        .collect();
    assert_eq!(unreachable, vec!["golint", "govet"]);
}

#[test]
fn test_max_categories() {
    let view = project().generate_view(&ViewOptions::default());
    let config = CategoryConfig {
        max_categories: 2,
        ..CategoryConfig::default()
    };
    let report = IssueRanking::with_config(config).rank(&view);

    assert_eq!(report.categories.len(), 2);
    assert_eq!(report.category_count, 4);
}

#[test]
fn test_rank_follows_view_scope() {
    let view = project().generate_view(&ViewOptions::new().with_paths(["main.go"]));
    let report = IssueRanking::new().rank(&view);

    assert_eq!(report.issues_analyzed, 2);
    assert_eq!(report.categories.len(), 2);
}

#[test]
fn test_empty_view() {
    let view = project().generate_view(&ViewOptions::new().with_paths(["missing.go"]));
    let report = IssueRanking::new().rank(&view);
    assert!(report.is_empty());
    assert_eq!(report.issues_analyzed, 0);
}
