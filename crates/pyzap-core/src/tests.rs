use std::path::Path;

use super::*;

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn target_reason() -> &'static str {
    DISALLOWED_INSTALLER_ARGS
        .iter()
        .find(|(flag, _)| *flag == "--target")
        .map(|(_, reason)| *reason)
        .expect("--target must be disallowed")
}

#[test]
fn guard_rejects_empty_args_before_output() {
    assert_eq!(
        validate_build_inputs(None, &[]),
        Err(UserError::NoInstallerArgs)
    );
    assert_eq!(
        validate_build_inputs(Some(Path::new("out.pyz")), &[]),
        Err(UserError::NoInstallerArgs)
    );
}

#[test]
fn guard_rejects_missing_output_for_any_args() {
    for supplied in [args(&["requests"]), args(&["--target", "x"]), args(&["-e", "."])] {
        assert_eq!(
            validate_build_inputs(None, &supplied),
            Err(UserError::NoOutputFile)
        );
    }
}

#[test]
fn guard_returns_output_path_for_clean_args() {
    let output = Path::new("dist/app.pyz");
    let validated = validate_build_inputs(Some(output), &args(&["some-package==1.0", "-q"]))
        .expect("clean args must validate");
    assert_eq!(validated, output);
}

#[test]
fn guard_rejects_each_disallowed_flag() {
    for &(flag, reason) in DISALLOWED_INSTALLER_ARGS {
        let err = validate_installer_args(&args(&["requests", flag]))
            .expect_err("disallowed flag must be rejected");
        assert_eq!(
            err,
            UserError::DisallowedArg {
                arg: flag.to_string(),
                reason,
            }
        );
    }
}

#[test]
fn guard_matches_tokens_contained_in_disallowed_flags() {
    let err = validate_installer_args(&args(&["requests", "--targ"]))
        .expect_err("prefix of --target must be rejected");
    assert_eq!(
        err,
        UserError::DisallowedArg {
            arg: "--targ".to_string(),
            reason: target_reason(),
        }
    );
}

#[test]
fn guard_passes_tokens_that_only_contain_a_flag() {
    validate_installer_args(&args(&["--target=somewhere", "--editable-mode", "requests"]))
        .expect("tokens longer than a flag are not contained in it");
}

#[test]
fn disallowed_message_names_argument_and_reason() {
    let err = validate_installer_args(&args(&["--download"])).expect_err("must reject");
    let message = err.to_string();
    assert!(message.contains("'--download'"));
    assert!(message.contains("not merely a download"));
}

#[test]
fn environment_json_round_trip() {
    let env = Environment::new(
        "3f1c2d4e-0000-4000-8000-000000000001",
        Some("mypackage.cli:main".to_string()),
    );
    let json = env.to_json().expect("must serialize");
    assert!(json.ends_with('\n'));
    assert_eq!(Environment::from_json(&json).expect("must parse"), env);
}

#[test]
fn environment_without_entry_point_serializes_null() {
    let env = Environment::new("abc", None);
    let json = env.to_json().expect("must serialize");
    assert!(json.contains("\"entry_point\": null"));
    assert_eq!(
        json,
        Environment::new("abc", None).to_json().expect("must serialize")
    );
}

#[test]
fn parse_entry_points_reads_sections_and_continuations() {
    let raw = r#"
# generated by setuptools
[console_scripts]
mytool = mypackage.cli:main
Other: other.mod:run

[gui_scripts]
viewer = mypackage.gui:main
  [extra]
"#;
    let sections = parse_entry_points(raw).expect("must parse");
    assert_eq!(
        sections.get("console_scripts"),
        Some(&vec![
            ("mytool".to_string(), "mypackage.cli:main".to_string()),
            ("other".to_string(), "other.mod:run".to_string()),
        ])
    );
    assert_eq!(
        sections.get("gui_scripts"),
        Some(&vec![(
            "viewer".to_string(),
            "mypackage.gui:main\n[extra]".to_string()
        )])
    );
}

#[test]
fn parse_entry_points_rejects_declaration_without_section() {
    assert_eq!(
        parse_entry_points("tool = pkg:main\n"),
        Err(EntryPointParseError::MissingSectionHeader { line: 1 })
    );
}

#[test]
fn parse_entry_points_rejects_line_without_delimiter() {
    assert_eq!(
        parse_entry_points("[console_scripts]\njust-a-name\n"),
        Err(EntryPointParseError::InvalidLine {
            line: 2,
            content: "just-a-name".to_string(),
        })
    );
}

#[test]
fn entry_point_map_keeps_first_declaration() {
    let mut map = EntryPointMap::new();
    assert_eq!(
        map.merge_declarations("[console_scripts]\nmytool = first.cli:main\n")
            .expect("must merge"),
        1
    );
    assert_eq!(
        map.merge_declarations("[console_scripts]\nmytool = second.cli:main\nextra = x:y\n")
            .expect("must merge"),
        1
    );
    assert_eq!(map.get("mytool"), Some("first.cli:main"));
    assert_eq!(map.get("MyTool"), Some("first.cli:main"));
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("extra"), Some("x:y"));
}

#[test]
fn entry_point_map_ignores_other_sections() {
    let mut map = EntryPointMap::new();
    map.merge_declarations("[gui_scripts]\nviewer = pkg.gui:main\n")
        .expect("must merge");
    assert!(map.is_empty());
    assert_eq!(map.get("viewer"), None);
}

#[test]
fn parse_build_config() {
    let content = r#"
[build]
output_file = "dist/tool.pyz"
console_script = "tool"
python = "/usr/bin/env python3"
compressed = false
installer_args = ["tool==1.2.0", "--no-deps"]
"#;
    let config = BuildConfig::from_toml_str(content).expect("config should parse");
    assert_eq!(
        config.build.output_file.as_deref(),
        Some(Path::new("dist/tool.pyz"))
    );
    assert_eq!(config.build.console_script.as_deref(), Some("tool"));
    assert_eq!(config.build.compressed, Some(false));
    assert_eq!(config.build.installer_args, args(&["tool==1.2.0", "--no-deps"]));
    assert!(config.build.entry_point.is_none());
}

#[test]
fn parse_build_config_rejects_unknown_keys() {
    let err = BuildConfig::from_toml_str("[build]\noutput = \"x\"\n").expect_err("must fail");
    assert!(err.to_string().contains("failed to parse pyzap config"));
}

#[test]
fn parse_build_config_has_no_bootstrap_override() {
    BuildConfig::from_toml_str("[build]\nbootstrap_dir = \"loader\"\n")
        .expect_err("the loader is not configurable");
}

#[test]
fn parse_build_config_rejects_empty_entry_point() {
    let err =
        BuildConfig::from_toml_str("[build]\nentry_point = \"  \"\n").expect_err("must fail");
    assert_eq!(err.to_string(), "build.entry_point must not be empty");
}

#[test]
fn empty_config_is_default() {
    assert_eq!(
        BuildConfig::from_toml_str("").expect("empty config parses"),
        BuildConfig::default()
    );
}
