use redress_result::Result;

use crate::Question;
use crate::ReferenceDb;

use super::AbstractQuestions;

#[async_trait]
impl AbstractQuestions for ReferenceDb {
    /// Insert a new question into the database
    async fn insert_question(&self, question: &Question) -> Result<()> {
        let mut questions = self.questions.lock().await;
        if questions.contains_key(&question.id) {
            Err(create_database_error!("insert", "question"))
        } else {
            questions.insert(question.id.to_string(), question.clone());
            Ok(())
        }
    }

    /// Fetch a question by its id
    async fn fetch_question(&self, id: &str) -> Result<Question> {
        let questions = self.questions.lock().await;
        questions
            .get(id)
            .cloned()
            .ok_or_else(|| create_error!(NotFound))
    }

    /// Fetch all questions on a report, oldest first
    async fn fetch_questions_by_report(&self, report_id: &str) -> Result<Vec<Question>> {
        let questions = self.questions.lock().await;
        let mut questions: Vec<Question> = questions
            .values()
            .filter(|question| question.report_id == report_id)
            .cloned()
            .collect();
        questions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(questions)
    }
}
