use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;
use templeton::cli::{resolve_config_path, Args, Settings};
use templeton::error::Error;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("templeton")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_defaults() {
    let parsed = Args::try_parse_from(make_args(&["--template", "web.yaml"])).unwrap();

    assert_eq!(parsed.root, PathBuf::from("."));
    assert_eq!(parsed.template, Some(PathBuf::from("web.yaml")));
    assert!(parsed.data.is_empty());
    assert!(parsed.project.is_none());
    assert!(!parsed.stdin);
    assert!(!parsed.verbose);
}

#[test]
fn test_data_pairs_are_comma_separated_and_repeatable() {
    let parsed = Args::try_parse_from(make_args(&[
        "--data",
        "Name=demo,Author=me",
        "--data",
        "Expr=a=b",
        "--root",
        "out",
        "-v",
    ]))
    .unwrap();

    assert_eq!(
        parsed.data,
        vec![
            ("Name".to_string(), "demo".to_string()),
            ("Author".to_string(), "me".to_string()),
            ("Expr".to_string(), "a=b".to_string()),
        ]
    );
    assert_eq!(parsed.root, PathBuf::from("out"));
    assert!(parsed.verbose);
}

#[test]
fn test_malformed_data_pair() {
    assert!(Args::try_parse_from(make_args(&["--data", "novalue"])).is_err());
    assert!(Args::try_parse_from(make_args(&["--data", "=x"])).is_err());
}

#[test]
fn test_settings_from_args() {
    let args = Args::try_parse_from(make_args(&["--template", "t.yaml", "--data", "A=1"])).unwrap();
    let settings = Settings::from_args(args).unwrap();

    assert_eq!(settings.config_path, PathBuf::from("t.yaml"));
    assert_eq!(settings.data.unwrap()["A"], "1");

    let args = Args::try_parse_from(make_args(&["--template", "t.yaml"])).unwrap();
    assert!(Settings::from_args(args).unwrap().data.is_none());
}

#[test]
fn test_config_path_resolution() {
    assert_eq!(
        resolve_config_path(Some(PathBuf::from("a.yaml")), Some("ignored")).unwrap(),
        PathBuf::from("a.yaml")
    );

    let project = resolve_config_path(None, Some("web")).unwrap();
    assert!(project.ends_with(".templeton/web.yaml"), "{}", project.display());

    match resolve_config_path(None, None) {
        Err(Error::ConfigError(msg)) => {
            assert_eq!(msg, "no yaml template specified. use --template or --project to specify one")
        }
        other => panic!("Expected ConfigError, got {other:?}"),
    }
}
