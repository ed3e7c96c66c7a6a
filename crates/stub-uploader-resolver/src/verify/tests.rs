//! Unit tests for recursive verification

use super::*;
use crate::fixtures::{Corpus, Uploaded};
use stub_uploader_core::error::{RequiresRule, StubError};
use stub_uploader_core::provider::{MemoryAllowlist, MemoryIndex, MemoryStore};
use stub_uploader_core::types::MetadataRecord;

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|n| n.to_string()).collect()
}

#[test]
fn test_recursive_verify_single() {
    let corpus = Corpus::typeshed();
    let verifier = corpus.verifier();

    let m = verifier.load("six").unwrap();
    assert_eq!(verifier.recursive_verify(&m).unwrap(), set(&["types-six"]));
}

#[test]
fn test_recursive_verify_follows_stub_dependencies() {
    let corpus = Corpus::typeshed();
    let verifier = corpus.verifier();

    let closure = verifier.recursive_verify_distribution("requests-oauthlib").unwrap();
    assert_eq!(
        closure,
        set(&["types-requests-oauthlib", "types-requests", "types-oauthlib"])
    );
}

#[test]
fn test_recursive_verify_every_corpus_member() {
    let corpus = Corpus::typeshed();
    let verifier = corpus.verifier();

    for distribution in corpus.store.distributions().unwrap() {
        let closure = verifier.recursive_verify_distribution(&distribution).unwrap();
        assert!(closure.contains(&format!("types-{}", distribution)));
        for stub in &closure {
            verifier
                .verify_typeshed_req(&crate::fixtures::req(stub))
                .unwrap();
        }
    }
}

#[test]
fn test_recursive_verify_reports_node_error() {
    let corpus = Corpus::typeshed();
    let verifier = corpus.verifier();

    let m = Metadata::new("mypy", MetadataRecord::new("0.1").with_requires("numpy")).unwrap();
    let err = verifier.recursive_verify(&m).unwrap_err();
    assert!(err.to_string().contains("to be listed in mypy's requires_dist"));
}

#[test]
fn test_recursive_verify_checks_transitive_nodes() {
    // "top" is fine on its own but depends on "broken", whose requires_python is invalid
    let store = MemoryStore::new()
        .with("top", MetadataRecord::new("1.0").with_requires("types-broken"))
        .with("broken", MetadataRecord::new("1.0").with_requires_python("==3.10"));
    let allowlist = MemoryAllowlist::new();
    let index = MemoryIndex::new();
    let verifier = Verifier::new(&store, &store, &allowlist, &index);

    let top = verifier.load("top").unwrap();
    verifier.verify_metadata(&top).unwrap();

    let err = verifier.recursive_verify(&top).unwrap_err();
    assert_eq!(err.requires_rule(), Some(RequiresRule::RequiresPythonOperator));
}

#[test]
fn test_recursive_verify_missing_dependency_metadata() {
    // typed-ast was uploaded in the past but is no longer in the store
    let corpus = Corpus::typeshed();
    let store = MemoryStore::new().with(
        "legacy",
        MetadataRecord::new("1.0").with_requires("types-typed-ast"),
    );
    let verifier = Verifier::new(&store, &corpus.known, &corpus.allowlist, &corpus.index);

    let err = verifier.recursive_verify_distribution("legacy").unwrap_err();
    assert!(matches!(err, StubError::MetadataNotFound { distribution } if distribution == "typed-ast"));
}

#[test]
fn test_recursive_verify_tolerates_diamonds_and_cycles() {
    let store = MemoryStore::new()
        .with(
            "a",
            MetadataRecord::new("1.0")
                .with_requires("types-b")
                .with_requires("types-c"),
        )
        .with("b", MetadataRecord::new("1.0").with_requires("types-d"))
        .with("c", MetadataRecord::new("1.0").with_requires("types-d"))
        .with("d", MetadataRecord::new("1.0").with_requires("types-a"));
    let allowlist = MemoryAllowlist::new();
    let index = MemoryIndex::new();
    let verifier = Verifier::new(&store, &store, &allowlist, &index);

    let closure = verifier.recursive_verify_distribution("a").unwrap();
    assert_eq!(closure, set(&["types-a", "types-b", "types-c", "types-d"]));
}

#[test]
fn test_recursive_verify_does_not_follow_external_requirements() {
    let corpus = Corpus::typeshed();
    let verifier = corpus.verifier();

    // requests declares urllib3, which is external and never loaded
    let closure = verifier.recursive_verify_distribution("requests").unwrap();
    assert_eq!(closure, set(&["types-requests"]));
}

#[test]
fn test_policy_applies_to_requires_external() {
    let corpus = Corpus::typeshed();
    let known = Uploaded::new(["types-tool"]);
    let store = MemoryStore::new().with(
        "tool",
        MetadataRecord::new("1.0").with_requires("typing-extensions"),
    );
    let index = MemoryIndex::new().publish("tool", ["typing_extensions"]);

    let strict = Verifier::new(&store, &known, &corpus.allowlist, &index);
    assert_eq!(
        strict
            .recursive_verify_distribution("tool")
            .unwrap_err()
            .requires_rule(),
        Some(RequiresRule::NotAllowlisted)
    );

    let lenient = Verifier::new(&store, &known, &corpus.allowlist, &index)
        .with_policy(AllowlistPolicy::UnsafeIgnore);
    assert_eq!(lenient.policy(), AllowlistPolicy::UnsafeIgnore);
    assert_eq!(
        lenient.recursive_verify_distribution("tool").unwrap(),
        set(&["types-tool"])
    );
}

#[test]
fn test_policy_is_applied_per_verifier_on_shared_metadata() {
    let corpus = Corpus::typeshed();
    let known = Uploaded::new(["types-tool"]);
    let store = MemoryStore::new().with(
        "tool",
        MetadataRecord::new("1.0").with_requires("typing-extensions"),
    );
    let index = MemoryIndex::new().publish("tool", ["typing_extensions"]);

    let lenient = Verifier::new(&store, &known, &corpus.allowlist, &index)
        .with_policy(AllowlistPolicy::UnsafeIgnore);
    let strict = Verifier::new(&store, &known, &corpus.allowlist, &index);

    let m = lenient.load("tool").unwrap();
    assert_eq!(lenient.recursive_verify(&m).unwrap(), set(&["types-tool"]));
    assert_eq!(lenient.requires_external(&m).unwrap().len(), 1);

    let err = strict.recursive_verify(&m).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Expected dependency typing-extensions to be present in the stub_uploader allowlist"
    );
    assert!(strict.requires_external(&m).is_err());
}

#[test]
fn test_allowlist_is_read_per_verifier_on_shared_metadata() {
    let corpus = Corpus::typeshed();
    let known = Uploaded::new(["types-tool"]);
    let store = MemoryStore::new().with(
        "tool",
        MetadataRecord::new("1.0").with_requires("typing-extensions"),
    );
    let index = MemoryIndex::new().publish("tool", ["typing_extensions"]);
    let vetted = MemoryAllowlist::new().allow("types-tool", ["typing-extensions"]);

    let permissive = Verifier::new(&store, &known, &vetted, &index);
    let m = permissive.load("tool").unwrap();
    permissive.recursive_verify(&m).unwrap();

    let strict = Verifier::new(&store, &known, &corpus.allowlist, &index);
    assert_eq!(
        strict.recursive_verify(&m).unwrap_err().requires_rule(),
        Some(RequiresRule::NotAllowlisted)
    );
}
