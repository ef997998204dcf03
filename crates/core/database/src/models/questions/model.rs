use iso8601_timestamp::Timestamp;
use redress_models::v0;
use redress_result::Result;

use crate::Database;

auto_derived!(
    /// Question exchanged between submitter and reviewers on a report
    pub struct Question {
        /// Unique Id
        #[serde(rename = "_id")]
        pub id: String,
        /// Id of the report this question belongs to
        pub report_id: String,
        /// Wallet address of the author
        pub author: String,
        /// Question or answer text
        pub content: String,
        /// Id of the question this replies to, if threaded
        #[serde(skip_serializing_if = "Option::is_none")]
        pub parent: Option<String>,
        /// When this question was asked
        pub created_at: Timestamp,
    }
);

impl Question {
    /// Ask a new question on a report
    pub async fn create(
        db: &Database,
        report_id: String,
        author: String,
        data: v0::DataAskQuestion,
    ) -> Result<Question> {
        // Replies must thread onto a question of the same report
        if let Some(parent) = &data.parent {
            let parent = db.fetch_question(parent).await?;
            if parent.report_id != report_id {
                return Err(create_error!(NotFound));
            }
        }

        let question = Question {
            id: ulid::Ulid::new().to_string(),
            report_id,
            author,
            content: data.content,
            parent: data.parent,
            created_at: Timestamp::now_utc(),
        };

        db.insert_question(&question).await?;
        Ok(question)
    }
}

impl From<Question> for v0::Question {
    fn from(value: Question) -> Self {
        v0::Question {
            id: value.id,
            report_id: value.report_id,
            author: value.author,
            content: value.content,
            parent: value.parent,
            created_at: value.created_at,
        }
    }
}
