use templeton::context::DataMapping;
use templeton::error::Error;
use templeton::template::{Delimiters, Engine, TemplateRenderer};

fn data(pairs: &[(&str, &str)]) -> DataMapping {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn render(text: &str, pairs: &[(&str, &str)]) -> Result<String, Error> {
    Engine::new().render("test", text, &Delimiters::default(), &data(pairs))
}

#[test]
fn test_literal_text_is_unchanged() {
    let text = "no placeholders here\n  at all }} {";
    assert_eq!(render(text, &[]).unwrap(), text);
}

#[test]
fn test_to_upper_helper() {
    assert_eq!(render("Hello {{ToUpper .Name}}", &[("Name", "bob")]).unwrap(), "Hello BOB");
}

#[test]
fn test_pipeline_and_title_case() {
    let out = render("{{.Name | ToLower}} / {{ToTitle .Title}}", &[("Name", "BoB"), ("Title", "hello world")]);
    assert_eq!(out.unwrap(), "bob / Hello World");
}

#[test]
fn test_title_case_keeps_punctuation() {
    let text = "{{ToTitle .A}}|{{ToTitle .B}}|{{ToTitle .C}}";
    let out = render(text, &[("A", "my-project"), ("B", "o'brien's app"), ("C", "hello_world")]);
    assert_eq!(out.unwrap(), "My-project|O'brien's App|Hello_world");
}

#[test]
fn test_date_helper_leaves_malformed_input_alone() {
    let out = render("{{date \"2006\" .D}}", &[("D", "2024-1-5")]);
    assert_eq!(out.unwrap(), "2024-1-5");
}

#[test]
fn test_currency_and_date_helpers() {
    let out = render(
        "{{currency .Price}} on {{date \"January 2, 2006\" .Due}}",
        &[("Price", "2500.00"), ("Due", "2024-01-31")],
    );
    assert_eq!(out.unwrap(), "$2,500 on January 31, 2024");
}

#[test]
fn test_split_with_range() {
    let out = render("{{range $i, $p := split .Tags \",\"}}{{if $i}};{{end}}{{$p}}{{end}}", &[("Tags", "a,b,c")]);
    assert_eq!(out.unwrap(), "a;b;c");
}

#[test]
fn test_if_else_chain() {
    let text = "{{if eq .Kind \"lib\"}}library{{else if eq .Kind \"bin\"}}binary{{else}}other{{end}}";
    assert_eq!(render(text, &[("Kind", "bin")]).unwrap(), "binary");
    assert_eq!(render(text, &[("Kind", "x")]).unwrap(), "other");
}

#[test]
fn test_with_rebinds_dot() {
    assert_eq!(render("{{with .Name}}[{{.}}]{{else}}none{{end}}", &[("Name", "x")]).unwrap(), "[x]");
    assert_eq!(render("{{with .Name}}[{{.}}]{{else}}none{{end}}", &[("Name", "")]).unwrap(), "none");
}

#[test]
fn test_range_break_and_continue() {
    let text = "{{range split .L \"\"}}{{if eq . \"b\"}}{{continue}}{{end}}{{if eq . \"d\"}}{{break}}{{end}}{{.}}{{end}}";
    assert_eq!(render(text, &[("L", "abcde")]).unwrap(), "ac");
}

#[test]
fn test_trim_markers_and_comments() {
    let text = "a  {{- /* note */ -}}  b {{- .X }}\n";
    assert_eq!(render(text, &[("X", "!")]).unwrap(), "ab!\n");
}

#[test]
fn test_variables() {
    let text = "{{$n := .Name}}{{range split \"x,y\" \",\"}}{{$n}}{{.}} {{end}}";
    assert_eq!(render(text, &[("Name", "v")]).unwrap(), "vx vy ");
}

#[test]
fn test_custom_delimiters() {
    let delims = Delimiters::new("<<", ">>");
    let out = Engine::new().render("custom", "{{ keep }} << .Name >>", &delims, &data(&[("Name", "n")]));
    assert_eq!(out.unwrap(), "{{ keep }} n");
}

#[test]
fn test_missing_key_is_render_error() {
    match render("{{.Missing}}", &[("Name", "x")]) {
        Err(Error::RenderError { template, message }) => {
            assert_eq!(template, "test");
            assert_eq!(message, "map has no entry for key \"Missing\"");
        }
        other => panic!("Expected RenderError, got {other:?}"),
    }
}

#[test]
fn test_unknown_function_fails_only_at_render() {
    let engine = Engine::new();
    let template = engine.parse("t", "{{nope .Name}}", &Delimiters::default()).unwrap();
    let err = engine.execute(&template, &data(&[("Name", "x")])).unwrap_err();
    assert_eq!(err.to_string(), "template: t: function \"nope\" not defined");
}

#[test]
fn test_parse_errors() {
    let err = render("line one\n{{$x}}", &[]).unwrap_err();
    assert!(matches!(err, Error::ParseError { line: 2, .. }), "{err:?}");

    assert!(matches!(render("{{if .A}}open", &[]), Err(Error::ParseError { .. })));
    assert!(matches!(render("{{end}}", &[]), Err(Error::ParseError { .. })));
    assert!(matches!(render("{{break}}", &[]), Err(Error::ParseError { .. })));
}
