//! Complaint dashboard core: load once, filter, aggregate, present.
//!
//! PIPELINE (fixed, one-way):
//!   1. Record source   (worksheet export, workbook, JSON records)
//!   2. Table           (typed, immutable after load)
//!   3. Filter stage    (state first, then channel)
//!   4. Aggregation     (KPIs, grouped and monthly counts)
//!   5. Presentation    (KPI tiles and chart models)
//!
//! RULES:
//!   - The source is fetched exactly once per Dashboard.
//!   - Every interaction recomputes stages 3-5 from the immutable Table.
//!   - Views hold row indices, never copies of records.

pub mod aggregate;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod presentation;
pub mod record;
pub mod source;
pub mod table;
pub mod types;
