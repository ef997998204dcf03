use redress_result::Result;

use crate::ReferenceDb;
use crate::Report;

use super::AbstractReports;

#[async_trait]
impl AbstractReports for ReferenceDb {
    /// Insert a new report into the database
    async fn insert_report(&self, report: &Report) -> Result<()> {
        let mut reports = self.reports.lock().await;
        if reports.contains_key(&report.id) {
            Err(create_database_error!("insert", "report"))
        } else {
            reports.insert(report.id.to_string(), report.clone());
            Ok(())
        }
    }

    /// Fetch a report by its id
    async fn fetch_report(&self, id: &str) -> Result<Report> {
        let reports = self.reports.lock().await;
        reports
            .get(id)
            .cloned()
            .ok_or_else(|| create_error!(NotFound))
    }

    /// Fetch all reports submitted by the given wallet address
    async fn fetch_reports_by_submitter(&self, submitter: &str) -> Result<Vec<Report>> {
        let reports = self.reports.lock().await;
        let mut reports: Vec<Report> = reports
            .values()
            .filter(|report| report.submitter == submitter)
            .cloned()
            .collect();
        reports.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(reports)
    }

    /// Replace a stored report if its version still matches
    async fn save_report(&self, report: &Report, expected_version: i64) -> Result<()> {
        let mut reports = self.reports.lock().await;
        match reports.get_mut(&report.id) {
            Some(stored) if stored.version == expected_version => {
                *stored = report.clone();
                Ok(())
            }
            Some(_) => {
                warn!("Rejected stale write on report {}", report.id);
                Err(create_error!(ConcurrentModification))
            }
            None => Err(create_error!(NotFound)),
        }
    }
}
