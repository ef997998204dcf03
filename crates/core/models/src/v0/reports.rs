use iso8601_timestamp::Timestamp;

auto_derived!(
    /// User-submitted misuse report under review
    pub struct Report {
        /// Unique Id
        #[serde(rename = "_id")]
        pub id: String,
        /// Report title
        pub title: String,
        /// Wallet address of the submitting user
        pub submitter: String,
        /// Reference to the uploaded evidence file
        pub file: String,
        /// Estimated magnitude of the reported misuse
        pub misuse_range: MisuseRange,
        /// Encrypted contact handle, if one was provided
        #[serde(skip_serializing_if = "Option::is_none")]
        pub contact: Option<String>,

        /// Status derived from the current reviewer votes
        pub status: ReportStatus,
        /// Severity derived from the approving votes
        #[serde(skip_serializing_if = "Option::is_none")]
        pub severity: Option<Severity>,
        /// KYC progress of the submitter
        pub kyc_status: KycStatus,
        /// Base payment phase
        pub base_payment_status: PaymentStatus,
        /// Additional payment phase
        pub additional_payment_status: PaymentStatus,

        /// Reviewer votes, in insertion order, at most one per reviewer
        pub votes: Vec<Vote>,
    }

    /// One reviewer's decision on a report
    pub struct Vote {
        /// Wallet address of the reviewer
        pub reviewer: String,
        /// Approve or reject
        pub decision: VoteDecision,
        /// Severity assessment, expected on approving votes
        #[serde(skip_serializing_if = "Option::is_none")]
        pub severity: Option<Severity>,
        /// Free-text comment, required by policy on rejecting votes
        #[serde(skip_serializing_if = "Option::is_none")]
        pub comment: Option<String>,
        /// Whether this reviewer confirmed the base payment
        #[serde(skip_serializing_if = "crate::if_false", default)]
        pub base_payment_sent: bool,
        /// Whether this reviewer confirmed the additional payment
        #[serde(skip_serializing_if = "crate::if_false", default)]
        pub additional_payment_sent: bool,
        /// When this vote was first cast
        pub created_at: Timestamp,
    }

    /// Reviewer decision on a report
    pub enum VoteDecision {
        Approved,
        Rejected,
    }

    /// Status of the report, derived from the vote tally
    pub enum ReportStatus {
        /// Waiting for the reviewer quorum
        Pending,
        /// Majority of the seated quorum approved
        Approved,
        /// Majority of the seated quorum rejected
        Rejected,
    }

    /// Impact level assigned to approved reports, drives payout off-system
    pub enum Severity {
        High,
        Medium,
        Low,
    }

    /// KYC progress of the submitter
    pub enum KycStatus {
        Pending,
        Completed,
    }

    /// Progress of one payment confirmation phase
    pub enum PaymentStatus {
        Pending,
        Completed,
        Rejected,
    }

    /// Estimated magnitude bucket of the reported misuse
    pub enum MisuseRange {
        /// Less than 10k units
        Under10k,
        /// Between 10k and 100k units
        To100k,
        /// Between 100k and 1M units
        To1m,
        /// More than 1M units
        Over1m,
    }

    /// New report information
    pub struct DataSubmitReport {
        /// Report title
        pub title: String,
        /// Reference to the uploaded evidence file
        pub file: String,
        /// Estimated magnitude of the reported misuse
        pub misuse_range: MisuseRange,
        /// Encrypted contact handle
        #[serde(skip_serializing_if = "Option::is_none")]
        pub contact: Option<String>,
    }

    /// New vote information
    pub struct DataCastVote {
        /// Approve or reject
        pub decision: VoteDecision,
        /// Severity assessment, expected when approving
        #[serde(skip_serializing_if = "Option::is_none")]
        pub severity: Option<Severity>,
        /// Free-text comment, required by policy when rejecting
        #[serde(skip_serializing_if = "Option::is_none")]
        pub comment: Option<String>,
    }
);
