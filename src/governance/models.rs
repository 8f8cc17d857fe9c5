//! Governance data models
//!
//! One canonical, named-field proposal record plus the read-only views the
//! registry hands out.

use crate::governance::error::{invalid_input, GovernanceError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Sequential proposal identifier, starting at 1
pub type ProposalId = u64;

/// A member identity (wallet address or any opaque account name).
///
/// Stored trimmed and lowercased so `0xABC` and `0xabc` are the same voter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn parse(raw: &str) -> Result<Self, GovernanceError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(invalid_input("Member address must not be empty"));
        }
        Ok(Self(normalized))
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Proposal category (display only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalCategory {
    #[default]
    General,
    Funding,
    Technical,
}

/// Status as shown to members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Voting window open or awaiting execution
    Pending,
    /// Decision finalized, pass or fail
    Executed,
}

/// A governance proposal
#[derive(Debug, Clone)]
pub struct Proposal {
    pub id: ProposalId,
    pub description: String,
    pub category: ProposalCategory,
    pub proposer: MemberId,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub vote_count: u64,
    pub executed: bool,
    pub approved: bool,
    pub voters: BTreeSet<MemberId>,
    pub quorum_threshold: Option<u64>,
    pub executed_at: Option<DateTime<Utc>>,
}

impl Proposal {
    pub fn new(
        id: ProposalId,
        description: String,
        category: ProposalCategory,
        proposer: MemberId,
        created_at: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            description,
            category,
            proposer,
            created_at,
            deadline,
            vote_count: 0,
            executed: false,
            approved: false,
            voters: BTreeSet::new(),
            quorum_threshold: None,
            executed_at: None,
        }
    }

    pub fn status(&self) -> ProposalStatus {
        if self.executed {
            ProposalStatus::Executed
        } else {
            ProposalStatus::Pending
        }
    }

    /// Whole seconds left in the voting window, rounded up, zero once closed
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        let millis = (self.deadline - now).num_milliseconds();
        if millis <= 0 {
            0
        } else {
            (millis as u64).div_ceil(1000)
        }
    }

    pub fn has_voted(&self, member: &MemberId) -> bool {
        self.voters.contains(member)
    }

    /// Check that a vote may still be accepted (finalization first, then the window)
    pub fn ensure_accepting_votes(&self, now: DateTime<Utc>) -> Result<(), GovernanceError> {
        if self.executed {
            return Err(GovernanceError::AlreadyExecuted(self.id));
        }
        if now >= self.deadline {
            return Err(GovernanceError::VotingClosed(self.id));
        }
        Ok(())
    }

    /// Add a weighted vote. Returns the new tally.
    pub fn record_vote(&mut self, member: MemberId, weight: u64) -> Result<u64, GovernanceError> {
        if self.voters.contains(&member) {
            return Err(GovernanceError::AlreadyVoted {
                proposal_id: self.id,
                member,
            });
        }
        self.vote_count = self.vote_count.saturating_add(weight);
        self.voters.insert(member);
        Ok(self.vote_count)
    }

    /// Finalize the decision. `executed` is set whether or not quorum was met.
    pub fn finalize(&mut self, quorum_threshold: u64, now: DateTime<Utc>) -> ExecutionOutcome {
        self.approved = self.vote_count >= quorum_threshold;
        self.executed = true;
        self.quorum_threshold = Some(quorum_threshold);
        self.executed_at = Some(now);

        ExecutionOutcome {
            proposal_id: self.id,
            approved: self.approved,
            vote_count: self.vote_count,
            quorum_threshold,
        }
    }

    pub fn to_view(&self, now: DateTime<Utc>) -> ProposalView {
        ProposalView {
            id: self.id,
            description: self.description.clone(),
            category: self.category,
            proposer: self.proposer.clone(),
            vote_count: self.vote_count,
            voter_count: self.voters.len(),
            created_at: self.created_at,
            deadline: self.deadline,
            remaining_seconds: self.remaining_secs(now),
            status: self.status(),
            executed: self.executed,
            approved: self.approved,
            quorum_threshold: self.quorum_threshold,
            executed_at: self.executed_at,
        }
    }
}

/// Read-only snapshot of a proposal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalView {
    pub id: ProposalId,
    pub description: String,
    pub category: ProposalCategory,
    pub proposer: MemberId,
    pub vote_count: u64,
    pub voter_count: usize,
    pub created_at: DateTime<Utc>,
    pub deadline: DateTime<Utc>,
    pub remaining_seconds: u64,
    pub status: ProposalStatus,
    pub executed: bool,
    pub approved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quorum_threshold: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_at: Option<DateTime<Utc>>,
}

/// Result of finalizing a proposal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionOutcome {
    pub proposal_id: ProposalId,
    pub approved: bool,
    pub vote_count: u64,
    pub quorum_threshold: u64,
}

/// The proposal currently holding the most votes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WinningProposal {
    pub id: ProposalId,
    pub description: String,
    pub vote_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn proposal() -> Proposal {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Proposal::new(
            1,
            "Fund the docs sprint".to_string(),
            ProposalCategory::Funding,
            MemberId::parse("0xAlice").unwrap(),
            created,
            created + Duration::seconds(60),
        )
    }

    #[test]
    fn test_member_id_is_normalized() {
        let a = MemberId::parse("  0xAbC  ").unwrap();
        let b = MemberId::parse("0xabc").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "0xabc");
    }

    #[test]
    fn test_member_id_rejects_blank() {
        assert!(matches!(
            MemberId::parse("   "),
            Err(GovernanceError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_remaining_secs_rounds_up_and_clamps() {
        let p = proposal();
        assert_eq!(p.remaining_secs(p.created_at), 60);
        assert_eq!(p.remaining_secs(p.deadline - Duration::milliseconds(1)), 1);
        assert_eq!(p.remaining_secs(p.deadline), 0);
        assert_eq!(p.remaining_secs(p.deadline + Duration::hours(3)), 0);
    }

    #[test]
    fn test_executed_takes_precedence_over_closed_window() {
        let mut p = proposal();
        let after = p.deadline + Duration::seconds(1);
        assert_eq!(
            p.ensure_accepting_votes(after),
            Err(GovernanceError::VotingClosed(1))
        );

        p.finalize(0, after);
        assert_eq!(
            p.ensure_accepting_votes(after),
            Err(GovernanceError::AlreadyExecuted(1))
        );
    }

    #[test]
    fn test_finalize_marks_executed_even_when_rejected() {
        let mut p = proposal();
        p.record_vote(MemberId::parse("bob").unwrap(), 2).unwrap();

        let outcome = p.finalize(5, p.deadline);
        assert!(!outcome.approved);
        assert_eq!(outcome.vote_count, 2);
        assert!(p.executed);
        assert_eq!(p.status(), ProposalStatus::Executed);
        assert_eq!(p.quorum_threshold, Some(5));
    }

    #[test]
    fn test_category_wire_names() {
        assert_eq!(
            serde_json::to_string(&ProposalCategory::Technical).unwrap(),
            "\"TECHNICAL\""
        );
        let parsed: ProposalCategory = serde_json::from_str("\"FUNDING\"").unwrap();
        assert_eq!(parsed, ProposalCategory::Funding);
    }
}
