use templeton::config::FileDescriptor;
use templeton::error::Error;
use templeton::extract::{collect_config_keys, extract_keys};
use templeton::template::Delimiters;

fn keys(text: &str) -> Vec<String> {
    extract_keys(text, &Delimiters::default()).unwrap()
}

#[test]
fn test_no_placeholders() {
    assert!(keys("plain text only").is_empty());
}

#[test]
fn test_repeated_keys_keep_first_position() {
    let text = r#"{{.B}}
{{if .A}}
  {{range .C}}{{.B}}{{with .A}}{{.D}}{{end}}{{end}}
{{else if .E}}{{.A}}{{else}}{{.B}}{{end}}
{{.B}}"#;
    assert_eq!(keys(text), vec!["B", "A", "C", "D", "E"]);
}

#[test]
fn test_else_branches_are_visited() {
    assert_eq!(keys("{{range .Items}}{{else}}{{.Empty}}{{end}}"), vec!["Items", "Empty"]);
    assert_eq!(keys("{{with .W}}{{else}}{{.Other}}{{end}}"), vec!["W", "Other"]);
}

#[test]
fn test_literals_variables_and_functions_are_ignored() {
    let text = r#"{{$v := "x"}}{{$v}}{{ToUpper "lit"}}{{.}}{{print nil}}{{print 1 2.5 true}}"#;
    assert!(keys(text).is_empty());
}

#[test]
fn test_unknown_functions_do_not_fail_extraction() {
    assert_eq!(keys("{{undefinedHelper .Name}}"), vec!["Name"]);
}

#[test]
fn test_chain_on_pipeline_contributes_nothing() {
    assert!(keys("{{(print .).Sub}}").is_empty());
}

#[test]
fn test_custom_delimiters() {
    let delims = Delimiters::new("[[", "]]");
    assert_eq!(extract_keys("{{.Ignored}} [[.Used]]", &delims).unwrap(), vec!["Used"]);
}

#[test]
fn test_parse_error_is_reported() {
    let err = extract_keys("{{if .A}}", &Delimiters::default()).unwrap_err();
    assert!(matches!(err, Error::ParseError { .. }));
}

#[test]
fn test_config_keys_content_before_path() {
    let descriptors = vec![
        FileDescriptor::new("a.txt", "{{.X}}"),
        FileDescriptor::new("{{.Y}}.txt", "static"),
    ];
    let keys: Vec<String> = collect_config_keys(&descriptors).unwrap().into_iter().collect();
    assert_eq!(keys, vec!["X", "Y"]);
}

#[test]
fn test_config_keys_within_one_descriptor() {
    let descriptors = vec![
        FileDescriptor::new("{{.Dir}}/{{.Name}}.md", "# {{.Name}}"),
        FileDescriptor::new("<<.Extra>>", "<<.Dir>>").with_delimiters(Delimiters::new("<<", ">>")),
    ];
    let keys: Vec<String> = collect_config_keys(&descriptors).unwrap().into_iter().collect();
    assert_eq!(keys, vec!["Name", "Dir", "Extra"]);
}
