use std::io::Write;

use mdnb::{Cell, parse};
use runner::action::{CONTENT_SEPARATOR, run_language_action};
use runner::controller::{Alignment, RUN_LANGUAGE_ACTION_COMMAND};
use runner::{
    ActionMap, ConfigError, Controller, RunError, Settings, execute_cells, execute_document,
    resolve_label, run_action,
};

fn actions(pairs: &[(&str, &str)]) -> ActionMap {
    pairs.iter().copied().collect()
}

fn run(source: &str, map: &ActionMap) -> String {
    let document = parse(source);
    let mut output = Vec::new();
    execute_document(&document, map, &mut output).expect("execution failed");
    String::from_utf8(output).unwrap()
}

#[test]
fn default_label() {
    assert_eq!(resolve_label(&ActionMap::new(), "rust"), "Run rust action");
}

#[test]
fn configured_label() {
    let map = actions(&[("rust", "Compile")]);
    assert_eq!(resolve_label(&map, "rust"), "Compile");
    assert_eq!(resolve_label(&map, "python"), "Run python action");
}

#[test]
fn empty_label_falls_back_to_default() {
    let map = actions(&[("sql", "")]);
    assert_eq!(resolve_label(&map, "sql"), "Run sql action");
}

#[test]
fn payload_shape() {
    let map = actions(&[("sql", "Query database")]);
    let result = run_action(&Cell::code("sql", "select 1;"), &map);
    assert_eq!(result.label, "Query database");
    assert_eq!(result.language, "sql");
    assert_eq!(result.text, "Query database\n\nCell content:\nselect 1;");
}

#[test]
fn payload_with_empty_cell() {
    let result = run_action(&Cell::code("js", ""), &ActionMap::new());
    assert_eq!(result.text, "Run js action\n\nCell content:\n");
    assert!(result.text.contains(CONTENT_SEPARATOR));
}

#[test]
fn empty_language_is_plaintext() {
    let result = run_language_action("", "x", &ActionMap::new());
    assert_eq!(result.label, "Run plaintext action");
    let result = run_action(&Cell::code("", "x"), &ActionMap::new());
    assert_eq!(result.language, "plaintext");
}

#[test]
fn prose_cells_use_markdown() {
    let result = run_action(&Cell::prose("# hi"), &ActionMap::new());
    assert_eq!(result.label, "Run markdown action");
}

#[test]
fn execute_document_runs_code_cells_in_order() {
    let map = actions(&[("py", "Run Python")]);
    let out = run("Intro\n```py\n1\n```\ntext\n```js\n2\n```\n", &map);
    assert_eq!(
        out,
        "Run Python\n\nCell content:\n1\n\nRun js action\n\nCell content:\n2\n"
    );
}

#[test]
fn execute_document_without_code_writes_nothing() {
    assert_eq!(run("just prose", &ActionMap::new()), "");
}

#[test]
fn execute_cells_selects_by_index() {
    let document = parse("```a\n1\n```\n```b\n2\n```");
    let mut output = Vec::new();
    let results = execute_cells(&document, &[1, 0], &ActionMap::new(), &mut output).unwrap();
    let labels: Vec<&str> = results.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["Run b action", "Run a action"]);
}

#[test]
fn execute_cells_rejects_bad_indices() {
    let document = parse("prose\n```a\n1\n```");
    let mut sink = std::io::sink();
    let err = execute_cells(&document, &[5], &ActionMap::new(), &mut sink).unwrap_err();
    assert!(matches!(err, RunError::CellOutOfRange { index: 5, len: 2 }));
    let err = execute_cells(&document, &[0], &ActionMap::new(), &mut sink).unwrap_err();
    assert!(matches!(err, RunError::NotCode(0)));
}

#[test]
fn settings_from_toml() {
    let settings = Settings::from_toml_str(
        "supported_languages = [\"rust\"]\n\n[language_actions]\nrust = \"Compile\"\n",
    )
    .unwrap();
    assert_eq!(settings.supported_languages, vec!["rust"]);
    assert_eq!(settings.language_actions.get("rust"), Some("Compile"));
}

#[test]
fn settings_defaults() {
    let settings = Settings::from_toml_str("").unwrap();
    assert_eq!(settings, Settings::default());
    assert_eq!(
        settings.supported_languages,
        vec!["javascript", "python", "sql", "plaintext"]
    );
}

#[test]
fn settings_reject_unknown_keys() {
    let err = Settings::from_toml_str("languageActions = {}\n").unwrap_err();
    assert!(matches!(err, ConfigError::Toml(_)));
}

#[test]
fn settings_discovered_next_to_document() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("mdnb.toml")).unwrap();
    writeln!(file, "[language_actions]\npython = \"Run with Python\"").unwrap();

    let settings = Settings::discover(&dir.path().join("notes.md")).unwrap();
    assert_eq!(
        settings.language_actions.get("python"),
        Some("Run with Python")
    );
}

#[test]
fn settings_discovery_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::discover(&dir.path().join("notes.md")).unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn settings_load_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "language_actions = 3\n").unwrap();
    let err = Settings::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("broken.toml"));

    let err = Settings::load(&dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn status_items_only_for_code_cells() {
    let mut settings = Settings::default();
    settings.language_actions.insert("sql", "Query database");
    let controller = Controller::activate(settings);

    assert_eq!(controller.status_item(&Cell::prose("text")), None);

    let item = controller.status_item(&Cell::code("sql", "select 1;")).unwrap();
    assert_eq!(item.text, "Query database");
    assert_eq!(item.alignment, Alignment::Right);
    assert_eq!(item.command.id, RUN_LANGUAGE_ACTION_COMMAND);
    assert_eq!(item.command.title, "Query database");
    controller.deactivate();
}

#[test]
fn controller_execution_order_increases() {
    let mut controller = Controller::activate(Settings::default());
    let cells = [Cell::code("python", "1"), Cell::code("sql", "2")];

    let runs = controller.execute(&cells);
    assert_eq!(runs.iter().map(|r| r.order).collect::<Vec<_>>(), vec![1, 2]);
    assert!(runs.iter().all(|r| r.success && r.outputs.len() == 1));
    assert_eq!(
        runs[0].outputs[0].text,
        "Run python action\n\nCell content:\n1"
    );

    let again = controller.run_command(Some(&cells[0])).unwrap();
    assert_eq!(again.order, 3);
    assert_eq!(controller.run_command(None), None);
}

#[test]
fn controller_reconfigure_changes_labels() {
    let mut controller = Controller::activate(Settings::default());
    let cell = Cell::code("rust", "fn main() {}");
    assert_eq!(controller.status_item(&cell).unwrap().text, "Run rust action");

    let mut settings = Settings::default();
    settings.language_actions.insert("rust", "Compile");
    controller.reconfigure(settings);
    assert_eq!(controller.status_item(&cell).unwrap().text, "Compile");
    assert!(!controller.supports("rust"));
    assert!(controller.supports("python"));
}
