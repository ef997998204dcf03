use futures::StreamExt;
use mongodb::options::FindOptions;
use redress_result::Result;

use crate::MongoDb;
use crate::Question;

use super::AbstractQuestions;

static COL: &str = "questions";

#[async_trait]
impl AbstractQuestions for MongoDb {
    /// Insert a new question into the database
    async fn insert_question(&self, question: &Question) -> Result<()> {
        query!(self, insert_one, COL, &question).map(|_| ())
    }

    /// Fetch a question by its id
    async fn fetch_question(&self, id: &str) -> Result<Question> {
        query!(self, find_one_by_id, COL, id)?.ok_or_else(|| create_error!(NotFound))
    }

    /// Fetch all questions on a report, oldest first
    async fn fetch_questions_by_report(&self, report_id: &str) -> Result<Vec<Question>> {
        Ok(self
            .col::<Question>(COL)
            .find(doc! {
                "report_id": report_id,
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
}
