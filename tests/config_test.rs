use std::path::PathBuf;

use templeton::config::{asset_dir, load_config, parse_config, project_config_path, FileDescriptor};
use templeton::error::Error;
use templeton::template::Delimiters;
use templeton::validate::Rule;

#[test]
fn test_structured_config() {
    let config = parse_config(
        r##"
variables:
  Name:
    description: Project name
    default: demo
    validate: required
  Price:
    validate: "required, number"
templates:
  - path: "{{.Name}}/README.md"
    contents: "# {{.Name}}"
  - path: Makefile
    contents: "<< .Name >>"
    delims: ["<<", ">>"]
"##,
    )
    .unwrap();

    assert_eq!(config.variables.keys().collect::<Vec<_>>(), vec!["Name", "Price"]);
    assert_eq!(config.variables["Name"].description, "Project name");
    assert_eq!(config.variables["Name"].default, "demo");
    assert_eq!(config.variables["Price"].rules(), vec![Rule::Required, Rule::Number]);

    assert_eq!(
        config.templates,
        vec![
            FileDescriptor::new("{{.Name}}/README.md", "# {{.Name}}"),
            FileDescriptor::new("Makefile", "<< .Name >>").with_delimiters(Delimiters::new("<<", ">>")),
        ]
    );
}

#[test]
fn test_flat_config() {
    let config = parse_config(
        r#"
- path: a.txt
  contents: "{{.X}}"
- path: "{{.Y}}.txt"
"#,
    )
    .unwrap();

    assert!(config.variables.is_empty());
    assert_eq!(config.templates.len(), 2);
    assert_eq!(config.templates[0].delimiters, Delimiters::default());
    assert_eq!(config.templates[1].contents, "");
}

#[test]
fn test_invalid_configs() {
    assert!(matches!(parse_config("just a string"), Err(Error::ConfigError(_))));
    assert!(matches!(parse_config("variables:\n  A: {}\n"), Err(Error::ConfigError(_))));

    let err = parse_config("- path: x\n  delims: [\"<<\"]\n").unwrap_err();
    assert!(matches!(err, Error::ConfigError(ref msg) if msg.contains("exactly two")), "{err}");
    assert!(parse_config("- path: x\n  delims: [\"\", \">>\"]\n").is_err());
}

#[test]
fn test_load_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("web.yaml");
    std::fs::write(&path, "- path: index.html\n  contents: hi\n").unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.templates, vec![FileDescriptor::new("index.html", "hi")]);

    let missing = load_config(dir.path().join("missing.yaml"));
    assert!(matches!(missing, Err(Error::ConfigError(_))));
}

#[test]
fn test_paths() {
    assert_eq!(project_config_path("/home/u", "web"), PathBuf::from("/home/u/.templeton/web.yaml"));
    assert_eq!(asset_dir("templates/web.yaml"), PathBuf::from("templates/web"));
    assert_eq!(asset_dir("templates/web.yml"), PathBuf::from("templates/web.yml"));
}
