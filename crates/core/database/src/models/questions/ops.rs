use redress_result::Result;

use crate::Question;

#[cfg(feature = "mongodb")]
mod mongodb;
mod reference;

#[async_trait]
pub trait AbstractQuestions: Sync + Send {
    /// Insert a new question into the database
    async fn insert_question(&self, question: &Question) -> Result<()>;

    /// Fetch a question by its id
    async fn fetch_question(&self, id: &str) -> Result<Question>;

    /// Fetch all questions on a report, oldest first
    async fn fetch_questions_by_report(&self, report_id: &str) -> Result<Vec<Question>>;
}
