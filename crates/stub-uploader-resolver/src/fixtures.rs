//! A small typeshed-like corpus shared by the resolver tests.

use std::collections::BTreeSet;

use stub_uploader_core::provider::{KnownStubs, MemoryAllowlist, MemoryIndex, MemoryStore};
use stub_uploader_core::types::{canonical_name, MetadataRecord, Requirement};

use crate::verify::Verifier;

/// Stub names uploaded from here, including ones no longer in the store
pub(crate) struct Uploaded(BTreeSet<String>);

impl Uploaded {
    pub(crate) fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self(names.into_iter().map(canonical_name).collect())
    }
}

impl KnownStubs for Uploaded {
    fn is_known_stub(&self, stub_name: &str) -> bool {
        self.0.contains(&canonical_name(stub_name))
    }
}

pub(crate) struct Corpus {
    pub(crate) store: MemoryStore,
    pub(crate) known: Uploaded,
    pub(crate) allowlist: MemoryAllowlist,
    pub(crate) index: MemoryIndex,
}

impl Corpus {
    pub(crate) fn typeshed() -> Self {
        let store = MemoryStore::new()
            .with("six", MetadataRecord::new("1.16.*"))
            .with("oauthlib", MetadataRecord::new("3.2.*"))
            .with(
                "requests",
                MetadataRecord::new("2.31.*")
                    .with_requires("urllib3>=2")
                    .with_requires_python(">=3.8"),
            )
            .with(
                "requests-oauthlib",
                MetadataRecord::new("1.3.*")
                    .with_requires("types-oauthlib")
                    .with_requires("types-requests"),
            )
            .with("geopandas", MetadataRecord::new("0.14.*").with_requires("pandas-stubs"))
            .with("setuptools", MetadataRecord::new("69.0.*").with_requires("setuptools"));

        let known = Uploaded::new([
            "types-six",
            "types-oauthlib",
            "types-requests",
            "types-requests-oauthlib",
            "types-geopandas",
            "types-setuptools",
            "types-typed-ast",
        ]);

        let allowlist = MemoryAllowlist::new()
            .allow("types-requests", ["urllib3"])
            .allow("types-geopandas", ["pandas-stubs", "shapely"]);

        let index = MemoryIndex::new()
            .publish(
                "requests",
                ["charset_normalizer<4,>=2", "idna<4,>=2.5", "urllib3<3,>=1.21.1", "certifi>=2017.4.17"],
            )
            .publish("oauthlib", Vec::<String>::new())
            .publish("requests-oauthlib", ["oauthlib>=3.0.0", "requests>=2.0.0"])
            .publish(
                "mypy",
                [
                    "typing_extensions>=4.1.0",
                    "mypy_extensions>=1.0.0",
                    "tomli>=1.1.0; python_version < \"3.11\"",
                    "psutil>=4.0; extra == \"dmypy\"",
                ],
            )
            .publish("geopandas", ["pandas>=1.4.0", "shapely>=2.0.0", "pyproj>=3.3.0"])
            .publish("six", Vec::<String>::new())
            .publish("setuptools", Vec::<String>::new());

        Self {
            store,
            known,
            allowlist,
            index,
        }
    }

    pub(crate) fn verifier(&self) -> Verifier<'_> {
        Verifier::new(&self.store, &self.known, &self.allowlist, &self.index)
    }
}

pub(crate) fn req(raw: &str) -> Requirement {
    Requirement::parse(raw).expect("fixture requirement parses")
}
