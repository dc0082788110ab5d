//! Destination-store client and the period-table sync engine.

pub mod client;
pub mod error;
pub mod records;
pub mod schema;
pub mod sync;
pub mod types;

pub use client::{BitableClient, BATCH_CREATE_LIMIT, DEFAULT_BASE_URL};
pub use error::BitableError;
pub use records::{dedup_key_from_fields, product_to_fields};
pub use schema::{product_field_creates, FieldCreate, FieldSpec, FieldType, PRODUCT_FIELDS};
pub use sync::{period_table_name, FieldReport, SyncEngine, TableHandle};
pub use types::{FieldInfo, RecordInfo, TableInfo};
