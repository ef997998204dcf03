use redress_result::Result;

use crate::Report;

#[cfg(feature = "mongodb")]
mod mongodb;
mod reference;

#[async_trait]
pub trait AbstractReports: Sync + Send {
    /// Insert a new report into the database
    async fn insert_report(&self, report: &Report) -> Result<()>;

    /// Fetch a report by its id
    async fn fetch_report(&self, id: &str) -> Result<Report>;

    /// Fetch all reports submitted by the given wallet address
    async fn fetch_reports_by_submitter(&self, submitter: &str) -> Result<Vec<Report>>;

    /// Replace a stored report if its version still matches
    async fn save_report(&self, report: &Report, expected_version: i64) -> Result<()>;
}
