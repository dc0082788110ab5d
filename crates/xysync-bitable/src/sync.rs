//! Period-table synchronization: provision, reconcile, deduplicate, push.
//!
//! Each period moves Absent → Provisioned → Populated. Concurrent runs may
//! target the same period; the only coordination is re-reading the store
//! before every write.

use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;
use xysync_core::{DedupKey, Product, SyncResult};

use crate::client::BitableClient;
use crate::error::BitableError;
use crate::records::{dedup_key_from_fields, product_to_fields};
use crate::schema::{product_field_creates, FieldCreate, ITEM_ID_FIELD, PRODUCT_FIELDS};

/// Pause before re-listing tables after a name conflict, giving the
/// competing creation time to become visible.
const DEFAULT_REQUERY_DELAY: Duration = Duration::from_millis(500);

/// A provisioned period table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableHandle {
    pub table_id: String,
    pub name: String,
    /// `true` only when this call created the table.
    pub created: bool,
}

/// Outcome of reconciling a table's columns with [`PRODUCT_FIELDS`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldReport {
    /// Keys of the columns added by this call.
    pub created: Vec<String>,
    /// Labels of the columns that could not be added.
    pub failed: Vec<String>,
}

impl FieldReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Table name for a synchronization period.
#[must_use]
pub fn period_table_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub struct SyncEngine {
    client: BitableClient,
    requery_delay: Duration,
}

impl SyncEngine {
    #[must_use]
    pub fn new(client: BitableClient) -> Self {
        Self {
            client,
            requery_delay: DEFAULT_REQUERY_DELAY,
        }
    }

    /// Overrides the pause used during name-conflict recovery.
    #[must_use]
    pub fn with_requery_delay(mut self, delay: Duration) -> Self {
        self.requery_delay = delay;
        self
    }

    #[must_use]
    pub fn client(&self) -> &BitableClient {
        &self.client
    }

    /// Returns the table called `name`, creating it with the full declared
    /// schema when it does not exist.
    ///
    /// A name conflict on creation means another run created the table
    /// first; the table is re-queried and returned with `created = false`.
    ///
    /// # Errors
    ///
    /// - Any client error from listing or creating tables.
    /// - [`BitableError::TableUnresolved`] if a conflict was reported but the
    ///   table is still not listed.
    pub async fn get_or_create_table(&self, name: &str) -> Result<TableHandle, BitableError> {
        if let Some(table) = self.client.find_table(name).await? {
            tracing::debug!(table = name, table_id = %table.table_id, "found period table");
            return Ok(TableHandle {
                table_id: table.table_id,
                name: name.to_string(),
                created: false,
            });
        }

        match self
            .client
            .create_table(name, &product_field_creates())
            .await
        {
            Ok(table) => {
                tracing::info!(table = name, table_id = %table.table_id, "created period table");
                Ok(TableHandle {
                    table_id: table.table_id,
                    name: name.to_string(),
                    created: true,
                })
            }
            Err(e) if e.is_duplicate_name() => {
                tracing::warn!(table = name, error = %e, "table created concurrently, re-querying");
                if !self.requery_delay.is_zero() {
                    tokio::time::sleep(self.requery_delay).await;
                }
                match self.client.find_table(name).await? {
                    Some(table) => Ok(TableHandle {
                        table_id: table.table_id,
                        name: name.to_string(),
                        created: false,
                    }),
                    None => Err(BitableError::TableUnresolved {
                        name: name.to_string(),
                    }),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Adds every declared column missing from `table_id`.
    ///
    /// Existing columns are never touched. A column that fails to create is
    /// recorded in [`FieldReport::failed`] and the remaining ones are still
    /// attempted.
    ///
    /// # Errors
    ///
    /// Only if the current columns cannot be listed.
    pub async fn ensure_fields(&self, table_id: &str) -> Result<FieldReport, BitableError> {
        let existing: HashSet<String> = self
            .client
            .list_fields(table_id)
            .await?
            .into_iter()
            .map(|f| f.field_name)
            .collect();

        let mut report = FieldReport::default();
        for spec in PRODUCT_FIELDS.iter().filter(|f| !existing.contains(f.key)) {
            match self
                .client
                .create_field(table_id, &FieldCreate::from(spec))
                .await
            {
                Ok(_) => {
                    tracing::info!(table_id, field = spec.key, "created missing field");
                    report.created.push(spec.key.to_string());
                }
                Err(e) => {
                    tracing::warn!(table_id, field = spec.key, label = spec.label, error = %e, "failed to create field");
                    report.failed.push(spec.label.to_string());
                }
            }
        }
        Ok(report)
    }

    /// Keeps the records whose [`DedupKey`] is neither stored in `table_id`
    /// nor already admitted earlier in `records`. Input order is preserved.
    ///
    /// The store is queried once per distinct item id.
    ///
    /// # Errors
    ///
    /// Any client error from the record search.
    pub async fn deduplicate(
        &self,
        table_id: &str,
        records: Vec<Product>,
    ) -> Result<Vec<Product>, BitableError> {
        let mut queried: HashSet<&str> = HashSet::new();
        let mut known: HashSet<DedupKey> = HashSet::new();
        for record in &records {
            if !queried.insert(record.item_id.as_str()) {
                continue;
            }
            let stored = self
                .client
                .search_records(table_id, ITEM_ID_FIELD, &record.item_id)
                .await?;
            known.extend(
                stored
                    .iter()
                    .filter_map(|row| dedup_key_from_fields(&row.fields)),
            );
        }

        Ok(admit_new(records, known))
    }

    /// Deduplicates against the table for `name` if it exists, otherwise
    /// only within the batch. Never creates anything.
    ///
    /// # Errors
    ///
    /// Any client error from listing tables or searching records.
    pub async fn deduplicate_for_table(
        &self,
        name: &str,
        records: Vec<Product>,
    ) -> Result<Vec<Product>, BitableError> {
        match self.client.find_table(name).await? {
            Some(table) => self.deduplicate(&table.table_id, records).await,
            None => Ok(admit_new(records, HashSet::new())),
        }
    }

    /// Creates one row per record. An empty slice is a no-op.
    ///
    /// # Errors
    ///
    /// Any client error from the batch create.
    pub async fn push_to_table(
        &self,
        table_id: &str,
        records: &[Product],
    ) -> Result<usize, BitableError> {
        let rows = records.iter().map(product_to_fields).collect();
        self.client.batch_create_records(table_id, rows).await
    }

    /// Synchronizes `records` into the table for `date`.
    ///
    /// # Errors
    ///
    /// See [`SyncEngine::sync_table`].
    pub async fn sync_period(
        &self,
        date: NaiveDate,
        records: Vec<Product>,
    ) -> Result<SyncResult, BitableError> {
        self.sync_table(&period_table_name(date), records).await
    }

    /// Provisions the table called `name` and writes the records not yet in
    /// it.
    ///
    /// A freshly created table receives every distinct record without a
    /// search round trip. An existing table is
    /// first reconciled and deduplicated against; when nothing is left no
    /// push request is made. Field creation failures do not block the push
    /// but leave `success = false` with the failed labels listed.
    ///
    /// # Errors
    ///
    /// Any error from provisioning, deduplication, or the push itself.
    pub async fn sync_table(
        &self,
        name: &str,
        records: Vec<Product>,
    ) -> Result<SyncResult, BitableError> {
        let table = self.get_or_create_table(name).await?;
        let incoming = records.len();

        let (to_push, failed_fields) = if table.created {
            (admit_new(records, HashSet::new()), Vec::new())
        } else {
            let report = self.ensure_fields(&table.table_id).await?;
            let admitted = self.deduplicate(&table.table_id, records).await?;
            (admitted, report.failed)
        };
        let skipped_duplicates = incoming - to_push.len();

        if to_push.is_empty() {
            tracing::info!(table = name, skipped_duplicates, "nothing new to push");
            return Ok(SyncResult {
                success: failed_fields.is_empty(),
                message: summary_message(0, skipped_duplicates, &failed_fields),
                records_created: 0,
                records_updated: 0,
                table_id: table.table_id,
                skipped_duplicates,
                failed_fields,
            });
        }

        let records_created = self.push_to_table(&table.table_id, &to_push).await?;
        tracing::info!(
            table = name,
            table_id = %table.table_id,
            records_created,
            skipped_duplicates,
            "pushed records"
        );

        Ok(SyncResult {
            success: failed_fields.is_empty(),
            message: summary_message(records_created, skipped_duplicates, &failed_fields),
            records_created,
            records_updated: 0,
            table_id: table.table_id,
            skipped_duplicates,
            failed_fields,
        })
    }
}

fn admit_new(records: Vec<Product>, mut known: HashSet<DedupKey>) -> Vec<Product> {
    let total = records.len();
    let admitted: Vec<Product> = records
        .into_iter()
        .filter(|record| known.insert(record.dedup_key()))
        .collect();
    if admitted.len() < total {
        tracing::info!(
            duplicates = total - admitted.len(),
            "filtered duplicate records"
        );
    }
    admitted
}

fn summary_message(created: usize, skipped: usize, failed_fields: &[String]) -> String {
    let mut message = if created == 0 {
        "all records already present".to_string()
    } else {
        format!("created {created} records")
    };
    if skipped > 0 {
        message.push_str(&format!(", skipped {skipped} duplicates"));
    }
    if !failed_fields.is_empty() {
        message.push_str(&format!(
            "; failed to create fields: {}",
            failed_fields.join(", ")
        ));
    }
    message
}
