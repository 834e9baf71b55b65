use lintree_core::{
    Directory, File, InvocationStatus, Issue, LintOptions, Project, Scope, SubView, ViewOptions,
    WarningKind,
};

fn scanned_project() -> Project {
    let mut root = Directory::new(".");
    root.files.insert("file.go".into(), File::new("file.go", 32));

    let mut bar = Directory::new("bar");
    bar.files.insert("file.go".into(), File::new("bar/file.go", 4));

    let mut dir = Directory::new("foo/dir");
    dir.files.insert("file.go".into(), File::new("foo/dir/file.go", 11));
    let mut foo = Directory::new("foo");
    foo.subdirectories.insert("dir".into(), dir);

    root.subdirectories.insert("bar".into(), bar);
    root.subdirectories.insert("foo".into(), foo);
    Project::new("/my/project", root)
}

fn linted_project() -> Project {
    let mut project = scanned_project();
    project.register_linters(vec!["unused".to_string(), "govet".to_string()]);
    assert!(project.add_issue(Issue::new("unused", "u1", "bar/file.go", 3, 1)));
    assert!(project.add_issue(Issue::new("govet", "g1", "foo/dir/file.go", 7, 2)));
    assert!(project.add_issue(Issue::new("unused", "u2", "foo/dir/file.go", 2, 1)));
    assert!(project.add_issue(Issue::new("govet", "g2", "file.go", 12, 4)));
    project.seal();
    project
}

#[test]
fn test_default_view_is_whole_project() {
    let project = linted_project();
    let view = project.generate_view(&ViewOptions::default());

    assert_eq!(view.subviews.len(), 1);
    let all = &view.subviews["./..."];
    assert_eq!(all.line_count, 47);
    assert!(all.recursive);
    assert_eq!(all.issues["govet"].len(), 2);
    assert_eq!(all.issues["unused"].len(), 2);
    assert_eq!(view.linters, vec!["govet", "unused"]);

    // Sorted by file path, then line.
    let govet: Vec<&str> = all.issues["govet"].iter().map(Issue::file_path).collect();
    assert_eq!(govet, vec!["file.go", "foo/dir/file.go"]);
}

#[test]
fn test_depth_one_view() {
    let project = linted_project();
    let view = project.generate_view(&ViewOptions::new().with_depth(1));

    assert_eq!(view.subviews.len(), 3);

    let root = &view.subviews["."];
    assert_eq!(root.line_count, 32);
    assert!(!root.recursive);
    assert_eq!(root.issues["govet"].len(), 1);
    assert!(!root.issues.contains_key("unused"));

    let bar = &view.subviews["bar/..."];
    assert_eq!(bar.line_count, 4);
    assert!(bar.recursive);
    assert_eq!(bar.issue_count(), 1);

    let foo = &view.subviews["foo/..."];
    assert_eq!(foo.line_count, 11);
    assert_eq!(foo.issue_count(), 2);
}

#[test]
fn test_explicit_file_path_view() {
    let project = linted_project();
    let view = project.generate_view(&ViewOptions::new().with_paths(["bar/file.go"]));

    assert_eq!(view.subviews.len(), 1);
    let file = &view.subviews["bar/file.go"];
    assert!(!file.recursive);
    assert_eq!(file.line_count, 4);
    assert_eq!(file.issues["unused"].len(), 1);
    assert_eq!(file.issues["unused"][0].text, "u1");
}

#[test]
fn test_paths_and_depth_combined() {
    let project = linted_project();
    let view = project.generate_view(
        &ViewOptions::new()
            .with_depth(1)
            .with_paths(["foo/dir", "bar", "foo/dir"]),
    );

    // "bar" is no deeper than the depth and is dropped; "foo/dir" appears once.
    let labels: Vec<&str> = view.subviews.keys().map(String::as_str).collect();
    assert_eq!(labels, vec![".", "bar/...", "foo/...", "foo/dir/..."]);
}

#[test]
fn test_unknown_paths_are_skipped() {
    let project = linted_project();
    let view = project.generate_view(&ViewOptions::new().with_paths(["nope", "../x"]));
    assert!(view.subviews.is_empty());
    assert!(project.subview("nope").is_none());
    assert!(project.directory("foo/nope").is_none());
}

#[test]
fn test_directory_lookup() {
    let project = linted_project();
    assert_eq!(project.directory("foo/dir").unwrap().path, "foo/dir");
    assert_eq!(project.directory(".").unwrap().path, ".");
    assert_eq!(project.directory("./foo/").unwrap().path, "foo");
    assert_eq!(project.subview("foo").unwrap().path, "foo/...");
}

#[test]
fn test_generate_view_is_idempotent() {
    let project = linted_project();
    let options = ViewOptions::new().with_depth(2).with_paths(["bar/file.go"]);
    assert_eq!(project.generate_view(&options), project.generate_view(&options));
}

#[test]
fn test_maximal_partition_sums_line_counts() {
    let project = linted_project();
    let view = project.generate_view(&ViewOptions::new().with_depth(10));

    let partition_total: u64 = view.subviews.values().map(|v| v.line_count).sum();
    assert_eq!(partition_total, 32 + 4 + 11);

    let parts: Vec<&SubView> = view.subviews.values().collect();
    assert_eq!(SubView::fuse(parts).line_count, 47);
}

#[test]
fn test_unsealed_queries_match_sealed() {
    let mut project = scanned_project();
    project.add_issue(Issue::new("govet", "g", "foo/dir/file.go", 1, 1));
    let before = project.generate_view(&ViewOptions::new().with_depth(1));
    assert!(!project.is_sealed());

    project.seal();
    assert!(project.is_sealed());
    assert_eq!(project.generate_view(&ViewOptions::new().with_depth(1)), before);
}

#[test]
fn test_unresolved_issue_is_dropped_with_warning() {
    let mut project = scanned_project();
    assert!(!project.add_issue(Issue::new("govet", "g", "gone/file.go", 1, 1)));
    assert!(!project.add_issue(Issue::new("govet", "g", "/abs/file.go", 1, 1)));

    assert_eq!(project.warnings().len(), 2);
    assert_eq!(project.warnings()[0].kind, WarningKind::UnresolvedIssue);
    assert_eq!(project.warnings()[0].path, "gone/file.go");
}

#[test]
fn test_linters_registered_once() {
    let mut project = scanned_project();
    project.register_linters(vec!["unused".into(), "govet".into(), "govet".into()]);
    project.register_linters(vec!["errcheck".into()]);
    assert_eq!(project.linters(), ["govet", "unused"]);
}

#[test]
fn test_invocation_log() {
    let mut project = scanned_project();
    project.record_invocation(Scope::recursive("."), InvocationStatus::Completed);
    assert_eq!(project.invocations().len(), 1);
    assert_eq!(project.invocations()[0].scope.to_string(), "./...");
}

#[test]
fn test_lint_options_builder() {
    let options = LintOptions::builder()
        .linters(vec!["govet".to_string()])
        .config_path("/etc/golangci.yml")
        .build()
        .unwrap();
    assert_eq!(options.linters, vec!["govet"]);
    assert!(options.config_path.is_some());
    assert!(options.exclude_dirs.is_empty());
}
