use iso8601_timestamp::Timestamp;

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

    /// New question information
    pub struct DataAskQuestion {
        /// Question or answer text
        pub content: String,
        /// Id of the question this replies to
        #[serde(skip_serializing_if = "Option::is_none")]
        pub parent: Option<String>,
    }
);
