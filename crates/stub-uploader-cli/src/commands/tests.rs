//! Tests for command handlers

use super::*;
use crate::Cli;
use camino::Utf8Path;
use clap::Parser;
use std::fs;
use stub_uploader_core::provider::MemoryIndex;
use tempfile::TempDir;

fn write_stub(root: &Utf8Path, distribution: &str, metadata: &str) {
    let dir = root.join("stubs").join(distribution);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("METADATA.toml"), metadata).unwrap();
}

struct Checkout {
    _temp_dir: TempDir,
    typeshed: TypeshedDir,
    allowlist: AllowlistFile,
    index: MemoryIndex,
}

impl Checkout {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();

        write_stub(&root, "six", "version = \"1.16.*\"\n");
        write_stub(&root, "oauthlib", "version = \"3.2.*\"\n");
        write_stub(
            &root,
            "requests-oauthlib",
            "version = \"1.3.*\"\nrequires = [\"types-oauthlib\", \"types-requests\"]\n",
        );
        write_stub(&root, "requests", "version = \"2.31.*\"\nrequires = [\"urllib3>=2\"]\n");
        write_stub(&root, "geopandas", "version = \"0.14.*\"\nrequires = [\"pandas\"]\n");
        write_stub(
            &root,
            "PyYAML",
            "version = \"6.0.*\"\nupload = false\nobsolete_since = \"6.0.2\"\n",
        );

        let allowlist = AllowlistFile::parse(
            "allowlist.toml",
            "types-requests = [\"urllib3\"]\ntypes-geopandas = [\"pandas-stubs\"]\n",
        )
        .unwrap();
        let index = MemoryIndex::new()
            .publish("requests", ["urllib3>=1.21.1,<3", "idna>=2.5"])
            .publish("geopandas", ["pandas>=1.4.0", "shapely>=2.0.0"]);

        Self {
            _temp_dir: temp_dir,
            typeshed: TypeshedDir::open(root).unwrap(),
            allowlist,
            index,
        }
    }

    fn verifier(&self) -> Verifier<'_> {
        Verifier::new(&self.typeshed, &self.typeshed, &self.allowlist, &self.index)
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|name| name.to_string()).collect()
}

#[test]
fn test_plan_orders_dependencies_first() {
    let checkout = Checkout::new();
    let plan = plan::build(
        &checkout.verifier(),
        &names(&["requests-oauthlib", "oauthlib", "requests"]),
    )
    .unwrap();

    let order: Vec<_> = plan.iter().map(|entry| entry.distribution.as_str()).collect();
    assert_eq!(order.len(), 3);
    assert_eq!(order[2], "requests-oauthlib");

    let last = &plan[2];
    assert_eq!(last.stub_distribution, "types-requests-oauthlib");
    assert_eq!(last.version, "1.3.*");
    assert_eq!(
        last.closure.iter().map(String::as_str).collect::<Vec<_>>(),
        ["types-oauthlib", "types-requests", "types-requests-oauthlib"]
    );
    assert!(plan.iter().all(|entry| entry.upload));
}

#[test]
fn test_plan_flags_skipped_uploads() {
    let checkout = Checkout::new();
    let plan = plan::build(&checkout.verifier(), &names(&["PyYAML", "six"])).unwrap();

    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0].stub_distribution, "types-PyYAML");
    assert!(!plan[0].upload);
    assert_eq!(plan[0].obsolete_since.as_deref(), Some("6.0.2"));
    assert!(plan[1].upload);
}

#[test]
fn test_plan_aborts_on_failing_distribution() {
    let checkout = Checkout::new();
    let err = plan::build(&checkout.verifier(), &names(&["six", "geopandas"])).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected dependency pandas to be present in the stub_uploader allowlist. Did you mean pandas-stubs?"
    );
}

#[test]
fn test_plan_renders_json() {
    let checkout = Checkout::new();
    let plan = plan::build(&checkout.verifier(), &names(&["six"])).unwrap();

    let value = serde_json::to_value(&plan).unwrap();
    assert_eq!(value[0]["stub_distribution"], "types-six");
    assert_eq!(value[0]["closure"], serde_json::json!(["types-six"]));
    assert!(value[0].get("obsolete_since").is_none());
}

#[test]
fn test_verify_reports_every_failure() {
    let checkout = Checkout::new();
    let report = verify::run(
        &checkout.verifier(),
        &names(&["six", "geopandas", "requests-oauthlib", "missing"]),
    );

    assert_eq!(report.checked(), 4);
    assert_eq!(report.failed(), 2);

    let passed: Vec<_> = report.passed.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(passed, ["six", "requests-oauthlib"]);

    let (name, err) = &report.failures[0];
    assert_eq!(name, "geopandas");
    assert_eq!(err.requires_rule(), Some(stub_uploader_core::error::RequiresRule::NotAllowlisted));
    assert!(matches!(&report.failures[1].1, StubError::MetadataNotFound { .. }));
}

#[test]
fn test_verify_unsafe_ignore_skips_allowlist_only() {
    let checkout = Checkout::new();
    let verifier = checkout.verifier().with_policy(AllowlistPolicy::UnsafeIgnore);
    let report = verify::run(&verifier, &names(&["geopandas"]));
    assert_eq!(report.failed(), 0);
}

#[test]
fn test_order_reports_cycles() {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    write_stub(&root, "a", "version = \"1\"\nrequires = [\"types-b\"]\n");
    write_stub(&root, "b", "version = \"1\"\nrequires = [\"types-a\"]\n");
    let typeshed = TypeshedDir::open(root).unwrap();
    let allowlist = AllowlistFile::default();
    let index = MemoryIndex::new();
    let verifier = Verifier::new(&typeshed, &typeshed, &allowlist, &index);

    let err = order::execute(&verifier, &names(&["a", "b"]), &OutputHandler::new()).unwrap_err();
    assert!(matches!(err, StubError::CircularDependency { .. }));
}

#[test]
fn test_order_accepts_unrelated_distributions() {
    let checkout = Checkout::new();
    order::execute(&checkout.verifier(), &names(&["six", "oauthlib"]), &OutputHandler::new()).unwrap();
}

#[test]
fn test_check_python() {
    let output = OutputHandler::new();
    check_python::execute(">=3.9", &output).unwrap();

    let err = check_python::execute("<3.12", &output).unwrap_err();
    assert!(err.to_string().contains("Expected requires_python to be a '>=' specifier"));

    let err = check_python::execute(">=fake", &output).unwrap_err();
    assert!(err.to_string().contains("Invalid requires_python specifier"));
}

#[test]
fn test_suggest_similar_distribution() {
    let candidates = names(&["requests", "requests-oauthlib", "six", "PyYAML"]);

    assert_eq!(
        suggest_similar_distribution("reqests", &candidates),
        Some("requests".to_string())
    );
    assert_eq!(suggest_similar_distribution("pyyml", &candidates), Some("PyYAML".to_string()));
    assert_eq!(suggest_similar_distribution("django", &candidates), None);
}

#[test]
fn test_edit_distance() {
    assert_eq!(edit_distance("", "six"), 3);
    assert_eq!(edit_distance("six", "six"), 0);
    assert_eq!(edit_distance("kitten", "sitting"), 3);
}

#[test]
fn test_cli_parses_global_flags() {
    let cli = Cli::try_parse_from([
        "stub-uploader",
        "plan",
        "six",
        "--typeshed-dir",
        "../typeshed",
        "--json",
    ])
    .unwrap();

    assert_eq!(cli.overrides().typeshed_dir.as_deref(), Some(Utf8Path::new("../typeshed")));
    assert!(matches!(cli.command, Commands::Plan { json: true, .. }));
}

#[test]
fn test_cli_verify_arguments() {
    assert!(Cli::try_parse_from(["stub-uploader", "verify"]).is_err());
    assert!(Cli::try_parse_from(["stub-uploader", "verify", "--all", "six"]).is_err());

    let cli = Cli::try_parse_from(["stub-uploader", "verify", "--all"]).unwrap();
    assert!(matches!(cli.command, Commands::Verify { all: true, .. }));

    let cli = Cli::try_parse_from(["stub-uploader", "verify", "six", "--unsafe-ignore-allowlist"]).unwrap();
    match cli.command {
        Commands::Verify {
            distributions,
            unsafe_ignore_allowlist,
            ..
        } => {
            assert_eq!(distributions, ["six"]);
            assert!(unsafe_ignore_allowlist);
        },
        other => panic!("unexpected command {:?}", other),
    }
}
