//! golangci-lint command line and JSON output.

use serde::Deserialize;

use lintree_core::{Issue, LintError, LintOptions, Scope};

/// Program invoked when no other is configured.
pub const DEFAULT_PROGRAM: &str = "golangci-lint";

/// Flags passed on every invocation: findings never fail the tool, issue caps
/// and "new issues only" modes are off, output is JSON.
const BASE_ARGS: &[&str] = &[
    "run",
    "--issues-exit-code=0",
    "--max-issues-per-linter=0",
    "--max-same-issues=0",
    "--new=false",
    "--new-from-rev=",
    "--out-format=json",
];

/// Arguments shared by every invocation of one lint run.
pub fn base_args(options: &LintOptions) -> Vec<String> {
    let mut args: Vec<String> = BASE_ARGS.iter().map(|arg| arg.to_string()).collect();

    match options.config_path {
        Some(ref path) => args.push(format!("--config={}", path.display())),
        None => args.push("--no-config".to_string()),
    }

    if !options.linters.is_empty() {
        args.push("--disable-all".to_string());
        args.push(format!("--enable={}", options.linters.join(",")));
    }

    if !options.exclude_dirs.is_empty() {
        args.push(format!("--skip-dirs={}", options.exclude_dirs.join(",")));
    }

    args
}

/// Full argument list for one scoped invocation.
pub fn scoped_args(base: &[String], scope: &Scope) -> Vec<String> {
    let mut args = base.to_vec();
    args.push(scope.target());
    args
}

/// Decoded stdout of one completed invocation.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ToolOutput {
    #[serde(default)]
    pub issues: Option<Vec<Issue>>,
    #[serde(default)]
    pub report: Option<ToolReport>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ToolReport {
    #[serde(default)]
    pub linters: Vec<ReportedLinter>,
}

/// A linter listed in the tool's report.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportedLinter {
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
}

impl ToolOutput {
    /// Decode the tool's stdout for `scope`.
    pub fn decode(scope: &Scope, stdout: &[u8]) -> Result<Self, LintError> {
        serde_json::from_slice(stdout).map_err(|source| {
            tracing::error!(
                scope = %scope,
                output = %String::from_utf8_lossy(stdout),
                "Could not parse linter output"
            );
            LintError::MalformedOutput {
                scope: scope.to_string(),
                source,
            }
        })
    }

    /// Names of the linters the tool reported as enabled.
    pub fn enabled_linters(&self) -> Vec<String> {
        self.report
            .as_ref()
            .map(|report| {
                report
                    .linters
                    .iter()
                    .filter(|linter| linter.enabled)
                    .map(|linter| linter.name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn into_issues(self) -> Vec<Issue> {
        self.issues.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_args_without_options() {
        let args = base_args(&LintOptions::default());
        assert_eq!(args[0], "run");
        assert!(args.contains(&"--issues-exit-code=0".to_string()));
        assert_eq!(args.last().unwrap(), "--no-config");
        assert!(!args.iter().any(|a| a == "--disable-all"));
    }

    #[test]
    fn test_base_args_with_options() {
        let options = LintOptions {
            linters: vec!["govet".into(), "unused".into()],
            config_path: Some("/etc/golangci.yml".into()),
            exclude_dirs: vec!["gen".into(), "testdata".into()],
        };
        let args = base_args(&options);
        let tail: Vec<&str> = args[BASE_ARGS.len()..].iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "--config=/etc/golangci.yml",
                "--disable-all",
                "--enable=govet,unused",
                "--skip-dirs=gen,testdata",
            ]
        );
    }

    #[test]
    fn test_scoped_args() {
        let base = base_args(&LintOptions::default());
        let args = scoped_args(&base, &Scope::recursive("foo/dir"));
        assert_eq!(args.last().unwrap(), "./foo/dir/...");
        assert_eq!(args.len(), base.len() + 1);
    }

    #[test]
    fn test_decode_output() {
        let stdout = br#"{
            "Issues": [{"FromLinter": "govet", "Text": "bad", "Pos": {"Filename": "a.go", "Line": 3, "Column": 1}}],
            "Report": {"Linters": [
                {"Name": "unused", "Enabled": true},
                {"Name": "gofmt"},
                {"Name": "govet", "Enabled": true, "EnabledByDefault": true}
            ]}
        }"#;
        let output = ToolOutput::decode(&Scope::recursive("."), stdout).unwrap();
        assert_eq!(output.enabled_linters(), vec!["unused", "govet"]);
        let issues = output.into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].file_path(), "a.go");
    }

    #[test]
    fn test_decode_null_issues() {
        let output = ToolOutput::decode(&Scope::recursive("."), br#"{"Issues": null}"#).unwrap();
        assert!(output.enabled_linters().is_empty());
        assert!(output.into_issues().is_empty());
    }

    #[test]
    fn test_decode_malformed() {
        let err = ToolOutput::decode(&Scope::self_only("bar"), b"level=error msg=boom").unwrap_err();
        assert!(matches!(err, LintError::MalformedOutput { ref scope, .. } if scope == "bar"));
    }
}
