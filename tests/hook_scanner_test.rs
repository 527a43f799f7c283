//! Build hook scanning across every description file in a tree

use netstage::{HookPhase, HookScanner, RealFileSystem, StagerConfig, StagingError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn scan(root: &Path, phase: &HookPhase, tokens: &[&str]) -> Result<bool, StagingError> {
    let fs = RealFileSystem::new();
    let config = StagerConfig::builtin();
    HookScanner::new(&fs, &config).has_any_hook_command(root, phase, tokens)
}

const BEFORE_PUBLISH: &str = r#"<Project Sdk="Microsoft.NET.Sdk.Web">
  <Target Name="PrepublishScript" BeforeTargets="PrepareForPublish" />
  <Target Name="BeforePublish">
    <Exec Command="npm install &amp;&amp; bower install" />
  </Target>
</Project>"#;

const UNRELATED_TARGET: &str = r#"<Project Sdk="Microsoft.NET.Sdk.Web">
  <Target Name="SomeOtherScript" AfterTargets="SomeOtherTarget">
    <Exec Command="npm install" />
  </Target>
</Project>"#;

#[test]
fn test_match_in_any_project_counts() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "src/api/api.csproj", UNRELATED_TARGET);
    write(temp.path(), "src/web/web.csproj", BEFORE_PUBLISH);

    let phase = HookPhase::default();
    assert!(scan(temp.path(), &phase, &["npm"]).unwrap());
    assert!(scan(temp.path(), &phase, &["bower"]).unwrap());
    assert!(!scan(temp.path(), &phase, &["yarn"]).unwrap());
}

#[test]
fn test_ineligible_target_never_matches() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "app.csproj", UNRELATED_TARGET);

    assert!(!scan(temp.path(), &HookPhase::default(), &["npm", "bower"]).unwrap());
}

#[test]
fn test_legacy_scripts_by_phase() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "project.json",
        r#"{"scripts": {"precompile": ["another command", "npm install"], "prepublish": "bower install"}}"#,
    );

    assert!(scan(temp.path(), &HookPhase::default(), &["npm"]).unwrap());
    assert!(!scan(temp.path(), &HookPhase::default(), &["bower"]).unwrap());
    assert!(scan(temp.path(), &HookPhase::from("prepublish"), &["bower"]).unwrap());
}

#[test]
fn test_mixed_schemes() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "legacy/project.json", r#"{"scripts": {}}"#);
    write(temp.path(), "modern/modern.vbproj", BEFORE_PUBLISH);

    assert!(scan(temp.path(), &HookPhase::default(), &["bower"]).unwrap());
}

#[test]
fn test_malformed_description_propagates() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "good/project.json", r#"{"scripts": {"precompile": "npm install"}}"#);
    write(temp.path(), "bad/bad.csproj", "<Project><Target Name=");

    let err = scan(temp.path(), &HookPhase::default(), &["npm"]).unwrap_err();
    match err {
        StagingError::ParseError { path, .. } => assert!(path.ends_with("bad/bad.csproj")),
        other => panic!("Expected ParseError, got {:?}", other),
    }
}
