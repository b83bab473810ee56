//! Common test utilities for xavyo-ingest-csv integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use tempfile::NamedTempFile;
use xavyo_ingest::async_trait;
use xavyo_ingest::prelude::*;
use xavyo_ingest_csv::{CsvEnricherConfig, CsvEnricherSource};

pub const HEADER: &str = "resource,subresource,glossary_terms,tags,owners";

pub const DATASET_URN: &str =
    "urn:li:dataset:(urn:li:dataPlatform:hive,SampleHiveDataset,PROD)";

static INIT: Once = Once::new();

/// Install a test log writer once per test binary.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("xavyo_ingest=debug,xavyo_ingest_csv=debug")
            .with_test_writer()
            .try_init();
    });
}

/// In-memory catalog keyed by entity reference.
#[derive(Default)]
pub struct MockCatalogGraph {
    terms: Mutex<HashMap<String, GlossaryTerms>>,
    tags: Mutex<HashMap<String, GlobalTags>>,
    ownership: Mutex<HashMap<String, Ownership>>,
    schema: Mutex<HashMap<String, EditableSchemaMetadata>>,
    fetches: AtomicUsize,
}

impl MockCatalogGraph {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_tags(self: Arc<Self>, urn: &str, tags: &[&str]) -> Arc<Self> {
        let tags = tags.iter().map(|t| TagAssociation::new(*t)).collect();
        self.tags
            .lock()
            .unwrap()
            .insert(urn.to_string(), GlobalTags::new(tags));
        self
    }

    pub fn with_terms(self: Arc<Self>, urn: &str, terms: &[&str]) -> Arc<Self> {
        let terms = terms.iter().map(|t| GlossaryTermAssociation::new(*t)).collect();
        self.terms
            .lock()
            .unwrap()
            .insert(urn.to_string(), GlossaryTerms::new(terms));
        self
    }

    pub fn with_owners(self: Arc<Self>, urn: &str, owners: &[&str]) -> Arc<Self> {
        let owners = owners.iter().map(|o| Owner::new(*o)).collect();
        self.ownership
            .lock()
            .unwrap()
            .insert(urn.to_string(), Ownership::new(owners));
        self
    }

    pub fn with_schema(self: Arc<Self>, urn: &str, schema: EditableSchemaMetadata) -> Arc<Self> {
        self.schema.lock().unwrap().insert(urn.to_string(), schema);
        self
    }

    /// Persist emitted work units, as the downstream sink would.
    pub fn apply(&self, workunits: &[MetadataWorkUnit]) {
        for wu in workunits {
            let urn = wu.mcp.entity_urn.clone();
            match wu.aspect().clone() {
                Aspect::GlossaryTerms(a) => {
                    self.terms.lock().unwrap().insert(urn, a);
                }
                Aspect::GlobalTags(a) => {
                    self.tags.lock().unwrap().insert(urn, a);
                }
                Aspect::Ownership(a) => {
                    self.ownership.lock().unwrap().insert(urn, a);
                }
                Aspect::EditableSchemaMetadata(a) => {
                    self.schema.lock().unwrap().insert(urn, a);
                }
                other => panic!("unexpected aspect {other:?}"),
            }
        }
    }

    /// Number of read-backs served.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn fetched(&self) {
        self.fetches.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogGraph for MockCatalogGraph {
    async fn get_glossary_terms(&self, entity_urn: &str) -> IngestResult<Option<GlossaryTerms>> {
        self.fetched();
        Ok(self.terms.lock().unwrap().get(entity_urn).cloned())
    }

    async fn get_tags(&self, entity_urn: &str) -> IngestResult<Option<GlobalTags>> {
        self.fetched();
        Ok(self.tags.lock().unwrap().get(entity_urn).cloned())
    }

    async fn get_ownership(&self, entity_urn: &str) -> IngestResult<Option<Ownership>> {
        self.fetched();
        Ok(self.ownership.lock().unwrap().get(entity_urn).cloned())
    }

    async fn get_editable_schema_metadata(
        &self,
        entity_urn: &str,
    ) -> IngestResult<Option<EditableSchemaMetadata>> {
        self.fetched();
        Ok(self.schema.lock().unwrap().get(entity_urn).cloned())
    }
}

/// Write `rows` under the standard header to a temporary file.
pub fn csv_file<S: AsRef<str>>(rows: &[S]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{}", row.as_ref()).unwrap();
    }
    file.flush().unwrap();
    file
}

/// Source reading `file`, optionally connected to `graph`.
pub fn source_for(
    file: &NamedTempFile,
    overwrite: bool,
    graph: Option<Arc<MockCatalogGraph>>,
) -> CsvEnricherSource {
    let config = CsvEnricherConfig::new(file.path().to_string_lossy()).with_overwrite(overwrite);
    let mut ctx = PipelineContext::new("csv-test");
    if let Some(graph) = graph {
        ctx = ctx.with_graph(graph);
    }
    CsvEnricherSource::new(config, &ctx).unwrap()
}

/// Tag identifiers carried by a work unit's tags aspect.
pub fn tag_ids(wu: &MetadataWorkUnit) -> Vec<String> {
    match wu.aspect() {
        Aspect::GlobalTags(t) => t.tags.iter().map(|t| t.tag.clone()).collect(),
        other => panic!("expected globalTags, got {other:?}"),
    }
}

/// Work units for one aspect.
pub fn of_aspect<'a>(
    workunits: &'a [MetadataWorkUnit],
    name: &str,
) -> Vec<&'a MetadataWorkUnit> {
    workunits
        .iter()
        .filter(|w| w.mcp.aspect_name == name)
        .collect()
}

/// One data row with every cell quoted: resource, subresource, terms, tags, owners.
pub fn row(cells: [&str; 5]) -> String {
    cells
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(",")
}
