use iso8601_timestamp::Timestamp;
use redress_models::v0::{
    self, KycStatus, MisuseRange, PaymentStatus, ReportStatus, Severity, Vote, VoteDecision,
};
use redress_models::REVIEW_QUORUM;
use redress_result::Result;

use crate::Database;

auto_derived!(
    /// Misuse report under review by the reviewer panel
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
        /// Save counter used for optimistic concurrency
        #[serde(default)]
        pub version: i64,
    }
);

/// Derive the report status from the current vote collection
///
/// A report stays pending until the full quorum has voted; a single
/// rejection does not end the review early. At quorum, approvals must
/// strictly outnumber rejections, so ties resolve to rejected.
pub fn derive_status(votes: &[Vote]) -> ReportStatus {
    if votes.len() < REVIEW_QUORUM {
        return ReportStatus::Pending;
    }

    let approved = votes
        .iter()
        .filter(|vote| vote.decision == VoteDecision::Approved)
        .count();

    if approved > votes.len() - approved {
        ReportStatus::Approved
    } else {
        ReportStatus::Rejected
    }
}

/// Derive the overall severity from the approving votes
///
/// The most frequent severity wins. Ties break to the severity seen
/// first in vote order, which downstream payout amounts depend on.
/// Returns None when no approving vote carries a severity.
pub fn derive_severity(votes: &[Vote]) -> Option<Severity> {
    let mut tally: Vec<(Severity, usize)> = Vec::new();
    for vote in votes {
        if vote.decision != VoteDecision::Approved {
            continue;
        }

        if let Some(severity) = &vote.severity {
            if let Some((_, count)) = tally.iter_mut().find(|(s, _)| s == severity) {
                *count += 1;
            } else {
                tally.push((severity.clone(), 1));
            }
        }
    }

    let mut winner: Option<(Severity, usize)> = None;
    for (severity, count) in tally {
        match &winner {
            Some((_, best)) if count <= *best => {}
            _ => winner = Some((severity, count)),
        }
    }

    winner.map(|(severity, _)| severity)
}

/// Check whether every vote has confirmed the given payment flag
///
/// False for an empty vote collection.
pub fn all_confirmed<F>(votes: &[Vote], flag: F) -> bool
where
    F: Fn(&Vote) -> bool,
{
    !votes.is_empty() && votes.iter().all(flag)
}

impl Report {
    /// Create a new report awaiting review
    pub async fn create(
        db: &Database,
        submitter: String,
        data: v0::DataSubmitReport,
    ) -> Result<Report> {
        let report = Report {
            id: ulid::Ulid::new().to_string(),
            title: data.title,
            submitter,
            file: data.file,
            misuse_range: data.misuse_range,
            contact: data.contact,
            status: ReportStatus::Pending,
            severity: None,
            kyc_status: KycStatus::Pending,
            base_payment_status: PaymentStatus::Pending,
            additional_payment_status: PaymentStatus::Pending,
            votes: vec![],
            version: 0,
        };

        db.insert_report(&report).await?;
        Ok(report)
    }

    /// Record or replace this reviewer's vote, then re-derive status
    /// and severity
    pub async fn cast_vote(
        &mut self,
        db: &Database,
        reviewer: &str,
        data: v0::DataCastVote,
    ) -> Result<()> {
        if reviewer == self.submitter {
            return Err(create_error!(CannotReviewYourself));
        }

        if let Some(vote) = self.votes.iter_mut().find(|vote| vote.reviewer == reviewer) {
            // A re-vote replaces the decision in place. Payment flags and
            // the original timestamp record separate acts and are kept.
            vote.decision = data.decision;
            vote.severity = data.severity;
            vote.comment = data.comment;
        } else {
            self.votes.push(Vote {
                reviewer: reviewer.to_string(),
                decision: data.decision,
                severity: data.severity,
                comment: data.comment,
                base_payment_sent: false,
                additional_payment_sent: false,
                created_at: Timestamp::now_utc(),
            });
        }

        self.status = derive_status(&self.votes);
        if let ReportStatus::Approved = self.status {
            // Severity is sticky: it is never cleared if a later re-vote
            // moves the report away from approved.
            self.severity = derive_severity(&self.votes);
        }

        self.save(db).await
    }

    /// Mark the submitter's KYC as complete, a no-op if already done
    pub async fn confirm_kyc(&mut self, db: &Database) -> Result<()> {
        if self.kyc_status == KycStatus::Completed {
            return Ok(());
        }

        self.kyc_status = KycStatus::Completed;
        self.save(db).await
    }

    /// Record this reviewer's confirmation of the base payment
    ///
    /// The phase completes once the full quorum is seated and every
    /// vote carries the confirmation.
    pub async fn confirm_base_payment(&mut self, db: &Database, reviewer: &str) -> Result<()> {
        let vote = self
            .votes
            .iter_mut()
            .find(|vote| vote.reviewer == reviewer)
            .ok_or_else(|| create_error!(ReviewerNotFound))?;

        let mut changed = !vote.base_payment_sent;
        vote.base_payment_sent = true;

        if self.base_payment_status != PaymentStatus::Completed
            && self.votes.len() == REVIEW_QUORUM
            && all_confirmed(&self.votes, |vote| vote.base_payment_sent)
        {
            self.base_payment_status = PaymentStatus::Completed;
            changed = true;
        }

        if changed {
            self.save(db).await
        } else {
            Ok(())
        }
    }

    /// Record this reviewer's confirmation of the additional payment
    ///
    /// Only accepted once the base phase has fully completed.
    pub async fn confirm_additional_payment(
        &mut self,
        db: &Database,
        reviewer: &str,
    ) -> Result<()> {
        if self.base_payment_status != PaymentStatus::Completed {
            return Err(create_error!(PhaseOrderViolation));
        }

        let vote = self
            .votes
            .iter_mut()
            .find(|vote| vote.reviewer == reviewer)
            .ok_or_else(|| create_error!(ReviewerNotFound))?;

        let mut changed = !vote.additional_payment_sent;
        vote.additional_payment_sent = true;

        if self.additional_payment_status != PaymentStatus::Completed
            && self.votes.len() == REVIEW_QUORUM
            && all_confirmed(&self.votes, |vote| vote.additional_payment_sent)
        {
            self.additional_payment_status = PaymentStatus::Completed;
            changed = true;
        }

        if changed {
            self.save(db).await
        } else {
            Ok(())
        }
    }

    /// Persist this report, bumping its version
    async fn save(&mut self, db: &Database) -> Result<()> {
        let expected_version = self.version;
        self.version += 1;
        db.save_report(self, expected_version).await
    }
}

impl From<Report> for v0::Report {
    fn from(value: Report) -> Self {
        v0::Report {
            id: value.id,
            title: value.title,
            submitter: value.submitter,
            file: value.file,
            misuse_range: value.misuse_range,
            contact: value.contact,
            status: value.status,
            severity: value.severity,
            kyc_status: value.kyc_status,
            base_payment_status: value.base_payment_status,
            additional_payment_status: value.additional_payment_status,
            votes: value.votes,
        }
    }
}

#[cfg(test)]
mod tests {
    use iso8601_timestamp::Timestamp;
    use redress_models::v0::{
        DataCastVote, DataSubmitReport, KycStatus, MisuseRange, PaymentStatus, ReportStatus,
        Severity, Vote, VoteDecision,
    };
    use redress_result::ErrorType;

    use crate::{all_confirmed, derive_severity, derive_status, Report};

    fn vote(reviewer: &str, decision: VoteDecision, severity: Option<Severity>) -> Vote {
        Vote {
            reviewer: reviewer.to_string(),
            decision,
            severity,
            comment: None,
            base_payment_sent: false,
            additional_payment_sent: false,
            created_at: Timestamp::now_utc(),
        }
    }

    fn approve(severity: Severity) -> DataCastVote {
        DataCastVote {
            decision: VoteDecision::Approved,
            severity: Some(severity),
            comment: None,
        }
    }

    fn reject(comment: &str) -> DataCastVote {
        DataCastVote {
            decision: VoteDecision::Rejected,
            severity: None,
            comment: Some(comment.to_string()),
        }
    }

    fn submission() -> DataSubmitReport {
        DataSubmitReport {
            title: "Misappropriated grant funds".to_string(),
            file: "attachments/evidence.tar".to_string(),
            misuse_range: MisuseRange::To100k,
            contact: None,
        }
    }

    #[test]
    fn status_stays_pending_below_quorum() {
        assert_eq!(derive_status(&[]), ReportStatus::Pending);

        let votes = vec![
            vote("alice", VoteDecision::Approved, Some(Severity::High)),
            vote("bob", VoteDecision::Rejected, None),
        ];
        assert_eq!(derive_status(&votes), ReportStatus::Pending);
    }

    #[test]
    fn status_follows_majority_at_quorum() {
        let votes = vec![
            vote("alice", VoteDecision::Approved, Some(Severity::High)),
            vote("bob", VoteDecision::Rejected, None),
            vote("carol", VoteDecision::Approved, Some(Severity::Medium)),
        ];
        assert_eq!(derive_status(&votes), ReportStatus::Approved);

        let votes = vec![
            vote("alice", VoteDecision::Approved, Some(Severity::High)),
            vote("bob", VoteDecision::Rejected, None),
            vote("carol", VoteDecision::Rejected, None),
        ];
        assert_eq!(derive_status(&votes), ReportStatus::Rejected);
    }

    #[test]
    fn status_tie_resolves_to_rejected() {
        let votes = vec![
            vote("alice", VoteDecision::Approved, Some(Severity::High)),
            vote("bob", VoteDecision::Approved, Some(Severity::High)),
            vote("carol", VoteDecision::Rejected, None),
            vote("dave", VoteDecision::Rejected, None),
        ];
        assert_eq!(derive_status(&votes), ReportStatus::Rejected);
    }

    #[test]
    fn severity_takes_most_frequent_assessment() {
        let votes = vec![
            vote("alice", VoteDecision::Approved, Some(Severity::High)),
            vote("bob", VoteDecision::Approved, Some(Severity::Medium)),
            vote("carol", VoteDecision::Approved, Some(Severity::High)),
        ];
        assert_eq!(derive_severity(&votes), Some(Severity::High));
    }

    #[test]
    fn severity_tie_breaks_to_first_seen() {
        let votes = vec![
            vote("alice", VoteDecision::Approved, Some(Severity::Medium)),
            vote("bob", VoteDecision::Approved, Some(Severity::High)),
        ];
        assert_eq!(derive_severity(&votes), Some(Severity::Medium));

        let votes = vec![
            vote("alice", VoteDecision::Approved, Some(Severity::High)),
            vote("bob", VoteDecision::Approved, Some(Severity::Medium)),
        ];
        assert_eq!(derive_severity(&votes), Some(Severity::High));
    }

    #[test]
    fn severity_ignores_rejecting_votes() {
        let votes = vec![
            vote("alice", VoteDecision::Rejected, Some(Severity::High)),
            vote("bob", VoteDecision::Approved, None),
        ];
        assert_eq!(derive_severity(&votes), None);
    }

    #[test]
    fn all_confirmed_requires_non_empty_collection() {
        assert!(!all_confirmed(&[], |vote| vote.base_payment_sent));

        let mut votes = vec![
            vote("alice", VoteDecision::Approved, Some(Severity::Low)),
            vote("bob", VoteDecision::Approved, Some(Severity::Low)),
        ];
        votes[0].base_payment_sent = true;
        assert!(!all_confirmed(&votes, |vote| vote.base_payment_sent));

        votes[1].base_payment_sent = true;
        assert!(all_confirmed(&votes, |vote| vote.base_payment_sent));
    }

    #[async_std::test]
    async fn lifecycle_through_both_payment_phases() {
        database_test!(|db| async move {
            let mut report = Report::create(&db, "submitter".to_string(), submission())
                .await
                .unwrap();

            report
                .cast_vote(&db, "alice", approve(Severity::High))
                .await
                .unwrap();
            assert_eq!(report.status, ReportStatus::Pending);

            report
                .cast_vote(&db, "bob", approve(Severity::Medium))
                .await
                .unwrap();
            assert_eq!(report.status, ReportStatus::Pending);

            report
                .cast_vote(&db, "carol", approve(Severity::High))
                .await
                .unwrap();
            assert_eq!(report.status, ReportStatus::Approved);
            assert_eq!(report.severity, Some(Severity::High));

            report.confirm_kyc(&db).await.unwrap();
            report.confirm_kyc(&db).await.unwrap();
            assert_eq!(report.kyc_status, KycStatus::Completed);

            // Additional phase is gated on base completion
            let error = report
                .confirm_additional_payment(&db, "alice")
                .await
                .unwrap_err();
            assert!(matches!(error.error_type, ErrorType::PhaseOrderViolation));

            report.confirm_base_payment(&db, "alice").await.unwrap();
            report.confirm_base_payment(&db, "bob").await.unwrap();
            assert_eq!(report.base_payment_status, PaymentStatus::Pending);

            let error = report.confirm_base_payment(&db, "dave").await.unwrap_err();
            assert!(matches!(error.error_type, ErrorType::ReviewerNotFound));

            report.confirm_base_payment(&db, "carol").await.unwrap();
            assert_eq!(report.base_payment_status, PaymentStatus::Completed);

            // Re-confirmation changes nothing
            let snapshot = report.clone();
            report.confirm_base_payment(&db, "carol").await.unwrap();
            assert_eq!(report, snapshot);

            report.confirm_additional_payment(&db, "alice").await.unwrap();
            report.confirm_additional_payment(&db, "bob").await.unwrap();
            assert_eq!(report.additional_payment_status, PaymentStatus::Pending);

            report.confirm_additional_payment(&db, "carol").await.unwrap();
            assert_eq!(report.additional_payment_status, PaymentStatus::Completed);

            let fetched = db.fetch_report(&report.id).await.unwrap();
            assert_eq!(fetched, report);
        });
    }

    #[async_std::test]
    async fn revote_replaces_in_place_and_keeps_payment_flags() {
        database_test!(|db| async move {
            let mut report = Report::create(&db, "submitter".to_string(), submission())
                .await
                .unwrap();

            report
                .cast_vote(&db, "carol", reject("insufficient evidence"))
                .await
                .unwrap();
            report
                .cast_vote(&db, "alice", approve(Severity::High))
                .await
                .unwrap();
            report
                .cast_vote(&db, "bob", approve(Severity::High))
                .await
                .unwrap();
            assert_eq!(report.status, ReportStatus::Approved);
            assert_eq!(report.severity, Some(Severity::High));

            report.confirm_base_payment(&db, "carol").await.unwrap();
            let cast_at = report.votes[0].created_at;

            report
                .cast_vote(&db, "carol", approve(Severity::Low))
                .await
                .unwrap();

            assert_eq!(report.votes.len(), 3);
            assert_eq!(report.votes[0].reviewer, "carol");
            assert_eq!(report.votes[0].decision, VoteDecision::Approved);
            assert!(report.votes[0].base_payment_sent);
            assert_eq!(report.votes[0].created_at, cast_at);

            // Two high assessments still outweigh the new low one
            assert_eq!(report.status, ReportStatus::Approved);
            assert_eq!(report.severity, Some(Severity::High));
        });
    }

    #[async_std::test]
    async fn severity_sticks_when_revote_flips_status() {
        database_test!(|db| async move {
            let mut report = Report::create(&db, "submitter".to_string(), submission())
                .await
                .unwrap();

            report
                .cast_vote(&db, "alice", approve(Severity::High))
                .await
                .unwrap();
            report
                .cast_vote(&db, "bob", approve(Severity::High))
                .await
                .unwrap();
            report
                .cast_vote(&db, "carol", reject("duplicate submission"))
                .await
                .unwrap();
            assert_eq!(report.status, ReportStatus::Approved);
            assert_eq!(report.severity, Some(Severity::High));

            report
                .cast_vote(&db, "bob", reject("matches an earlier report"))
                .await
                .unwrap();
            assert_eq!(report.status, ReportStatus::Rejected);

            // Severity is sticky once assigned
            assert_eq!(report.severity, Some(Severity::High));

            let fetched = db.fetch_report(&report.id).await.unwrap();
            assert_eq!(fetched, report);
        });
    }

    #[async_std::test]
    async fn payment_gate_requires_full_quorum() {
        database_test!(|db| async move {
            let mut report = Report::create(&db, "submitter".to_string(), submission())
                .await
                .unwrap();

            report
                .cast_vote(&db, "alice", approve(Severity::Low))
                .await
                .unwrap();
            report
                .cast_vote(&db, "bob", approve(Severity::Low))
                .await
                .unwrap();

            report.confirm_base_payment(&db, "alice").await.unwrap();
            report.confirm_base_payment(&db, "bob").await.unwrap();

            // Every existing vote confirmed, but the quorum is not seated
            assert_eq!(report.base_payment_status, PaymentStatus::Pending);
        });
    }

    #[async_std::test]
    async fn stale_writes_are_rejected() {
        database_test!(|db| async move {
            let mut report = Report::create(&db, "submitter".to_string(), submission())
                .await
                .unwrap();

            let mut stale = db.fetch_report(&report.id).await.unwrap();

            report
                .cast_vote(&db, "alice", approve(Severity::High))
                .await
                .unwrap();

            let error = stale
                .cast_vote(&db, "bob", approve(Severity::Medium))
                .await
                .unwrap_err();
            assert!(matches!(
                error.error_type,
                ErrorType::ConcurrentModification
            ));

            // The concurrent write left the stored report untouched
            let fetched = db.fetch_report(&report.id).await.unwrap();
            assert_eq!(fetched, report);
        });
    }

    #[async_std::test]
    async fn saving_unknown_report_is_not_found() {
        database_test!(|db| async move {
            let mut report = Report::create(&db, "submitter".to_string(), submission())
                .await
                .unwrap();

            report.id = "01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string();
            let error = report.confirm_kyc(&db).await.unwrap_err();
            assert!(matches!(error.error_type, ErrorType::NotFound));
        });
    }

    #[async_std::test]
    async fn submitter_cannot_review_own_report() {
        database_test!(|db| async move {
            let mut report = Report::create(&db, "submitter".to_string(), submission())
                .await
                .unwrap();

            let error = report
                .cast_vote(&db, "submitter", approve(Severity::High))
                .await
                .unwrap_err();
            assert!(matches!(error.error_type, ErrorType::CannotReviewYourself));
            assert!(report.votes.is_empty());
        });
    }
}
