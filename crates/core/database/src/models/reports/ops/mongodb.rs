use futures::StreamExt;
use mongodb::options::FindOptions;
use redress_result::Result;

use crate::MongoDb;
use crate::Report;

use super::AbstractReports;

static COL: &str = "reports";

#[async_trait]
impl AbstractReports for MongoDb {
    /// Insert a new report into the database
    async fn insert_report(&self, report: &Report) -> Result<()> {
        query!(self, insert_one, COL, &report).map(|_| ())
    }

    /// Fetch a report by its id
    async fn fetch_report(&self, id: &str) -> Result<Report> {
        query!(self, find_one_by_id, COL, id)?.ok_or_else(|| create_error!(NotFound))
    }

    /// Fetch all reports submitted by the given wallet address
    async fn fetch_reports_by_submitter(&self, submitter: &str) -> Result<Vec<Report>> {
        Ok(self
            .col::<Report>(COL)
            .find(doc! {
                "submitter": submitter,
            })
            .with_options(
                FindOptions::builder()
                    .sort(doc! {
                        "_id": 1_i32
                    })
                    .build(),
            )
            .await
            .map_err(|_| create_database_error!("find", COL))?
            .filter_map(|s| async {
                if cfg!(debug_assertions) {
                    Some(s.unwrap())
                } else {
                    s.ok()
                }
            })
            .collect()
            .await)
    }

    /// Replace a stored report if its version still matches
    async fn save_report(&self, report: &Report, expected_version: i64) -> Result<()> {
        let result = query!(
            self,
            replace_one,
            COL,
            doc! {
                "_id": report.id.as_str(),
                "version": expected_version,
            },
            &report
        )?;

        if result.matched_count > 0 {
            return Ok(());
        }

        // A missing document and a version conflict both leave
        // matched_count at zero; look the report up to tell them apart
        let existing: Option<Report> = query!(self, find_one_by_id, COL, report.id.as_str())?;
        if existing.is_some() {
            warn!("Rejected stale write on report {}", report.id);
            Err(create_error!(ConcurrentModification))
        } else {
            Err(create_error!(NotFound))
        }
    }
}
