use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use mdnb::{Cell, CellKind, Document};
use runner::ActionMap;

#[derive(Debug, Deserialize)]
pub struct ExpectedWarning {
    /// Substring that must appear in the warning message or one of its notes.
    pub contains: String,

    /// If set, the warning's span must start on this 1-based source line.
    #[serde(default)]
    pub line: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct ExpectedCell {
    pub kind: CellKind,

    /// Checked only for code cells, and only when set.
    #[serde(default)]
    pub language: Option<String>,

    /// Exact content, checked only when set.
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Labels used when running actions.
    #[serde(default)]
    pub language_actions: ActionMap,

    /// Expected cells, in order.
    #[serde(default)]
    pub expect_cells: Option<Vec<ExpectedCell>>,

    /// Expected action output for all code cells (trimmed comparison).
    #[serde(default)]
    pub expect_output: Option<String>,

    /// If true, serializing the parsed cells must reproduce the source exactly.
    #[serde(default)]
    pub expect_roundtrip: bool,

    /// Expected lint warnings. If present (even empty), count and content are checked.
    #[serde(default)]
    pub expect_warnings: Option<Vec<ExpectedWarning>>,
}

/// Split a `.test.md` file into its TOML frontmatter and the document under test.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');

    let rest = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
        .ok_or("missing opening --- frontmatter delimiter")?;

    let (frontmatter, after) = match rest.strip_prefix("---") {
        Some(after) => ("", after),
        None => {
            let close = rest
                .find("\n---")
                .ok_or("missing closing --- frontmatter delimiter")?;
            (
                rest[..close].trim_end_matches('\r'),
                &rest[close + "\n---".len()..],
            )
        }
    };
    let document = after
        .strip_prefix("\r\n")
        .or_else(|| after.strip_prefix('\n'))
        .unwrap_or(after);

    let config: TestConfig =
        toml::from_str(frontmatter).map_err(|e| format!("TOML parse error: {}", e))?;
    Ok((config, document))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("?")
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let (description, outcome) = match std::fs::read_to_string(path) {
        Err(e) => (None, TestOutcome::Fail(format!("cannot read file: {}", e))),
        Ok(content) => match parse_test_file(&content) {
            Err(e) => (None, TestOutcome::Fail(format!("frontmatter error: {}", e))),
            Ok((config, source)) => {
                let outcome = match check(&config, source) {
                    None => TestOutcome::Pass,
                    Some(reason) => TestOutcome::Fail(reason),
                };
                (config.description, outcome)
            }
        },
    };

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    }
}

/// Check every expectation in `config`. Returns the first failure reason.
fn check(config: &TestConfig, source: &str) -> Option<String> {
    let document = mdnb::parse(source);

    if let Some(expected) = &config.expect_cells {
        if let Some(reason) = check_cells(&document, expected) {
            return Some(reason);
        }
    }

    if config.expect_roundtrip {
        let serialized = mdnb::serialize(&document);
        if serialized != source {
            return Some(format!(
                "round trip changed the document\n  expected: {:?}\n  actual:   {:?}",
                source, serialized
            ));
        }
    }

    if let Some(expected) = &config.expect_output {
        let mut output = Vec::new();
        if let Err(e) = runner::execute_document(&document, &config.language_actions, &mut output)
        {
            return Some(format!("unexpected run error: {}", e));
        }
        let actual = String::from_utf8_lossy(&output);
        if actual.trim() != expected.trim() {
            return Some(format!(
                "output mismatch\n  expected: {}\n  actual:   {}",
                expected.trim(),
                actual.trim()
            ));
        }
    }

    if let Some(expected) = &config.expect_warnings {
        return check_warnings(source, expected);
    }

    None
}

fn describe(cell: &Cell) -> String {
    match cell {
        Cell::Prose { content } => format!("prose {:?}", content),
        Cell::Code { language, content } => format!("code({}) {:?}", language, content),
    }
}

fn check_cells(document: &Document, expected: &[ExpectedCell]) -> Option<String> {
    if document.len() != expected.len() {
        let actual: Vec<String> = document.iter().map(|c| format!("  - {}", describe(c))).collect();
        return Some(format!(
            "expected {} cell(s), got {}\n  actual cells:\n{}",
            expected.len(),
            document.len(),
            actual.join("\n")
        ));
    }

    for (i, (cell, want)) in document.iter().zip(expected).enumerate() {
        if cell.kind() != want.kind {
            return Some(format!("cell[{}]: expected {:?}, got {}", i, want.kind, describe(cell)));
        }
        if let (Some(want_lang), Some(lang)) = (&want.language, cell.language()) {
            if want_lang != lang {
                return Some(format!(
                    "cell[{}]: expected language {}, got {}",
                    i, want_lang, lang
                ));
            }
        }
        if let Some(want_content) = &want.content {
            if want_content != cell.content() {
                return Some(format!(
                    "cell[{}]: expected content {:?}, got {:?}",
                    i,
                    want_content,
                    cell.content()
                ));
            }
        }
    }

    None
}

fn check_warnings(source: &str, expected: &[ExpectedWarning]) -> Option<String> {
    let actual = mdnb::lint::lint(source);

    if actual.len() != expected.len() {
        let msgs: Vec<String> = actual.iter().map(|w| format!("  - {}", w.message)).collect();
        return Some(format!(
            "expected {} warning(s), got {}\n  actual warnings:\n{}",
            expected.len(),
            actual.len(),
            if msgs.is_empty() {
                "    (none)".to_string()
            } else {
                msgs.join("\n")
            }
        ));
    }

    for (i, (warning, want)) in actual.iter().zip(expected).enumerate() {
        let matches = warning.message.contains(&want.contains)
            || warning.notes.iter().any(|n| n.contains(&want.contains));
        if !matches {
            return Some(format!(
                "warning[{}]: expected text containing \"{}\", got: {}",
                i, want.contains, warning.message
            ));
        }
        if let Some(line) = want.line {
            let actual_line = warning.line(source);
            if actual_line != line {
                return Some(format!(
                    "warning[{}]: expected on line {}, but it is on line {}",
                    i, line, actual_line
                ));
            }
        }
    }

    None
}

/// Discover `.test.md` files grouped by subfolder relative to `root`.
/// Files directly in `root` get category "".
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            collect_tests(&path, root, out);
            continue;
        }
        let is_test = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".test.md"));
        if is_test {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_name(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no .test.md files found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        eprintln!("  {} ({} tests)", category_name(cat), files.len());
    }
}

/// Terminal styling for the report.
struct Style {
    color: bool,
}

impl Style {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        } else {
            text.to_string()
        }
    }

    fn pass(&self) -> String {
        self.paint("32", "PASS")
    }

    fn fail(&self) -> String {
        self.paint("31", "FAIL")
    }

    fn bold(&self, text: &str) -> String {
        self.paint("1", text)
    }
}

/// Select the categories to run. Unknown requests are reported and skipped.
fn select<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }

    let mut selected = BTreeMap::new();
    for req in requested {
        let req = req.trim_matches('/');
        let prefix = format!("{}/", req);
        let before = selected.len();
        for (cat, files) in all {
            if cat == req || cat.starts_with(&prefix) {
                selected.insert(cat.as_str(), files);
            }
        }
        if selected.len() == before {
            let available: Vec<&str> = all.keys().map(|k| category_name(k)).collect();
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                available.join(", ")
            );
        }
    }
    selected
}

/// Run all `.test.md` files under `path` (or a single file).
/// Returns the process exit code: 0 if everything passed.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let style = Style { color: !no_color };

    let groups: Vec<(String, Vec<PathBuf>)> = if path.is_file() {
        vec![(String::new(), vec![path.to_path_buf()])]
    } else {
        let all = discover_categorized(path);
        if all.is_empty() {
            eprintln!("no .test.md files found in {}", path.display());
            return 1;
        }
        let selected = select(&all, categories);
        if selected.is_empty() {
            eprintln!("no matching categories found");
            return 1;
        }
        selected
            .into_iter()
            .map(|(cat, files)| (cat.to_string(), files.clone()))
            .collect()
    };

    let show_headers = !path.is_file();
    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &groups {
        if show_headers {
            eprintln!();
            eprintln!("{}", style.bold(category_name(cat)));
        }
        for file in files {
            let result = run_single_test(file);
            match result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", style.pass(), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", style.fail(), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!("test result: {}. {} passed, 0 failed", style.paint("32", "ok"), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            style.paint("31", "FAILED"),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}
