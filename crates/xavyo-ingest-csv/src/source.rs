//! Tabular enrichment source
//!
//! Streams annotation rows, reconciles entity-level associations as it goes,
//! and writes field-level annotations once the whole file has been read.

use std::fs::File;
use std::io::{BufReader, Read};

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info, instrument};
use xavyo_ingest::aspects::{
    GlobalTags, GlossaryTerms, Ownership, GLOSSARY_TERMS_ASPECT_NAME, OWNERSHIP_ASPECT_NAME,
    TAGS_ASPECT_NAME,
};
use xavyo_ingest::config::SourceConfig;
use xavyo_ingest::error::{IngestError, IngestResult};
use xavyo_ingest::report::SourceReport;
use xavyo_ingest::traits::{PipelineContext, Source, SourceDescriptor, SupportStatus};
use xavyo_ingest::urn::{entity_type_of, DATASET_ENTITY_TYPE};
use xavyo_ingest::workunit::MetadataWorkUnit;

use crate::accumulator::{SubResourceAccumulator, SubResourceRow};
use crate::config::CsvEnricherConfig;
use crate::extract::{AnnotationRecord, AssociationExtractor};
use crate::parser::RowReader;
use crate::reconcile::Reconciler;

/// Run report with per-aspect counters.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CsvEnricherReport {
    #[serde(flatten)]
    pub base: SourceReport,
    pub num_glossary_term_workunits_produced: u64,
    pub num_tag_workunits_produced: u64,
    pub num_owners_workunits_produced: u64,
    pub num_editable_schema_metadata_workunits_produced: u64,
}

impl CsvEnricherReport {
    fn record(&mut self, wu: &MetadataWorkUnit) {
        match wu.mcp.aspect_name.as_str() {
            GLOSSARY_TERMS_ASPECT_NAME => self.num_glossary_term_workunits_produced += 1,
            TAGS_ASPECT_NAME => self.num_tag_workunits_produced += 1,
            OWNERSHIP_ASPECT_NAME => self.num_owners_workunits_produced += 1,
            _ => self.num_editable_schema_metadata_workunits_produced += 1,
        }
        self.base.report_workunit(wu);
    }
}

/// Enriches catalog entities with tags, glossary terms and owners read from a
/// delimited annotation file.
#[derive(Debug)]
pub struct CsvEnricherSource {
    config: CsvEnricherConfig,
    extractor: AssociationExtractor,
    reconciler: Reconciler,
    report: CsvEnricherReport,
}

impl CsvEnricherSource {
    /// Platform name under which this source registers.
    pub const PLATFORM: &'static str = "CSV";

    /// Create a source. The config is validated here.
    pub fn new(config: CsvEnricherConfig, ctx: &PipelineContext) -> IngestResult<Self> {
        config.validate()?;

        debug!(
            config = ?config.redacted(),
            run_id = %ctx.run_id,
            "Creating CSV enricher source"
        );

        Ok(Self {
            extractor: AssociationExtractor::new(config.array_delimiter.clone()),
            reconciler: Reconciler::new(config.should_overwrite, ctx.graph.clone()),
            config,
            report: CsvEnricherReport::default(),
        })
    }

    /// Parse a YAML `config` block and create a source.
    pub fn from_yaml(yaml: &str, ctx: &PipelineContext) -> IngestResult<Self> {
        Self::new(CsvEnricherConfig::from_yaml(yaml)?, ctx)
    }

    /// Counters and diagnostics for this run.
    pub fn csv_report(&self) -> &CsvEnricherReport {
        &self.report
    }

    /// Process annotation rows from any reader.
    #[instrument(skip(self, reader), fields(overwrite = self.config.should_overwrite))]
    pub async fn process<R: Read + Send>(
        &mut self,
        reader: R,
    ) -> IngestResult<Vec<MetadataWorkUnit>> {
        let rows = RowReader::new(reader, self.config.delimiter_byte()?)?;
        let mut accumulator = SubResourceAccumulator::new();
        let mut workunits = Vec::new();

        for row in rows {
            let row = row?;
            let Some(record) = self.extractor.record(&row) else {
                continue;
            };

            let entity_type = match entity_type_of(&record.resource) {
                Ok(entity_type) => entity_type.to_string(),
                Err(e) => {
                    self.report.base.report_failure(
                        record.resource.clone(),
                        format!("line {}: {e}", row.line_number),
                    );
                    continue;
                }
            };

            for wu in self.reconcile_record(&record, &entity_type).await? {
                self.report.record(&wu);
                workunits.push(wu);
            }

            if let Some(field_path) = record.subresource {
                if entity_type != DATASET_ENTITY_TYPE {
                    self.report.base.report_warning(
                        record.resource,
                        format!("field annotations are only supported on datasets: {field_path}"),
                    );
                    continue;
                }
                accumulator.push(SubResourceRow {
                    entity_urn: record.resource,
                    field_path,
                    term_associations: record.term_associations,
                    tag_associations: record.tag_associations,
                });
            }
        }

        debug!(entities = accumulator.entity_count(), "Flushing field-level annotations");

        let schema_workunits = accumulator
            .flush(self.reconciler.should_overwrite(), self.reconciler.graph())
            .await?;
        for wu in schema_workunits {
            self.report.record(&wu);
            workunits.push(wu);
        }

        info!(
            workunits = workunits.len(),
            failures = self.report.base.failure_count(),
            "CSV enrichment complete"
        );

        Ok(workunits)
    }

    /// Entity-level writes for a resource row, in terms, tags, owners order.
    async fn reconcile_record(
        &self,
        record: &AnnotationRecord,
        entity_type: &str,
    ) -> IngestResult<Vec<MetadataWorkUnit>> {
        if !record.is_resource_row() {
            return Ok(Vec::new());
        }

        let urn = record.resource.as_str();
        let candidates = [
            self.reconciler
                .reconcile::<GlossaryTerms>(urn, entity_type, record.term_associations.clone())
                .await?,
            self.reconciler
                .reconcile::<GlobalTags>(urn, entity_type, record.tag_associations.clone())
                .await?,
            self.reconciler
                .reconcile::<Ownership>(urn, entity_type, record.owners.clone())
                .await?,
        ];

        Ok(candidates.into_iter().flatten().collect())
    }
}

#[async_trait]
impl Source for CsvEnricherSource {
    fn descriptor(&self) -> SourceDescriptor {
        SourceDescriptor {
            platform: Self::PLATFORM,
            support_status: SupportStatus::Incubating,
        }
    }

    async fn get_workunits(&mut self) -> IngestResult<Vec<MetadataWorkUnit>> {
        let file = File::open(&self.config.filename).map_err(|e| {
            IngestError::invalid_config(format!(
                "cannot open annotation file '{}': {e}",
                self.config.filename
            ))
        })?;
        self.process(BufReader::new(file)).await
    }

    fn report(&self) -> &SourceReport {
        &self.report.base
    }
}
