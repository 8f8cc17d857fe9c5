//! Governance registry
//!
//! Owns the append-only proposal collection. Each proposal sits behind its own
//! mutex so votes and executions on one proposal are linearizable while work
//! on other proposals proceeds in parallel. The outer lock is only held long
//! enough to append a proposal or clone a handle to one.
//!
//! Execution policy: a proposal may be executed once its deadline has passed,
//! and only by the owner named in the [`Membership`].
//!
//! Audit entries are written while the lock they describe is still held, with
//! the same timestamp the rules were checked against.

use crate::governance::audit::{AuditAction, AuditEntry, AuditLog};
use crate::governance::clock::Clock;
use crate::governance::error::{invalid_input, GovernanceError};
use crate::governance::membership::Membership;
use crate::governance::models::*;
use crate::governance::weight::VotingWeightProvider;
use chrono::Duration;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

pub struct GovernanceRegistry {
    proposals: RwLock<Vec<Arc<Mutex<Proposal>>>>,
    membership: Membership,
    weights: Arc<dyn VotingWeightProvider>,
    clock: Arc<dyn Clock>,
    audit: AuditLog,
}

impl GovernanceRegistry {
    pub fn new(
        membership: Membership,
        weights: Arc<dyn VotingWeightProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            proposals: RwLock::new(Vec::new()),
            membership,
            weights,
            clock,
            audit: AuditLog::new(),
        }
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Create a proposal and return its id
    pub async fn create_proposal(
        &self,
        description: &str,
        duration: Duration,
        category: ProposalCategory,
        caller: &MemberId,
    ) -> Result<ProposalId, GovernanceError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(invalid_input("Description must not be empty"));
        }
        if duration <= Duration::zero() {
            return Err(invalid_input("Duration must be positive"));
        }
        if !self.membership.is_member(caller) {
            return Err(GovernanceError::NotAMember(caller.clone()));
        }

        let created_at = self.clock.now();
        let deadline = created_at
            .checked_add_signed(duration)
            .ok_or_else(|| invalid_input("Duration is out of range"))?;

        let mut proposals = self.proposals.write().await;
        let id = proposals.len() as ProposalId + 1;
        proposals.push(Arc::new(Mutex::new(Proposal::new(
            id,
            description.to_string(),
            category,
            caller.clone(),
            created_at,
            deadline,
        ))));

        self.audit
            .record(
                AuditEntry::new(caller.clone(), AuditAction::ProposalCreated, created_at)
                    .for_proposal(id)
                    .with_details(serde_json::json!({
                        "category": category,
                        "deadline": deadline,
                    })),
            )
            .await;

        info!("Proposal {} created by {} ({:?}, closes {})", id, caller, category, deadline);
        Ok(id)
    }

    /// Cast the caller's weighted vote. Returns the updated tally.
    pub async fn vote(&self, id: ProposalId, caller: &MemberId) -> Result<u64, GovernanceError> {
        let handle = self.handle(id).await?;
        let mut proposal = handle.lock().await;

        let now = self.clock.now();
        proposal.ensure_accepting_votes(now)?;
        if !self.membership.is_member(caller) {
            return Err(GovernanceError::NotAMember(caller.clone()));
        }
        if proposal.has_voted(caller) {
            return Err(GovernanceError::AlreadyVoted {
                proposal_id: id,
                member: caller.clone(),
            });
        }

        // Looked up before anything is written, so a failure leaves no trace
        let weight = self.weights.weight_at(caller, proposal.created_at)?;
        let vote_count = proposal.record_vote(caller.clone(), weight)?;

        self.audit
            .record(
                AuditEntry::new(caller.clone(), AuditAction::VoteCast, now)
                    .for_proposal(id)
                    .with_details(serde_json::json!({
                        "weight": weight,
                        "vote_count": vote_count,
                    })),
            )
            .await;

        debug!("{} voted on proposal {} with weight {} (tally {})", caller, id, weight, vote_count);
        Ok(vote_count)
    }

    /// Finalize a proposal against a threshold chosen now
    pub async fn execute_proposal(
        &self,
        id: ProposalId,
        quorum_threshold: u64,
        caller: &MemberId,
    ) -> Result<ExecutionOutcome, GovernanceError> {
        let handle = self.handle(id).await?;
        let mut proposal = handle.lock().await;

        if proposal.executed {
            return Err(GovernanceError::AlreadyExecuted(id));
        }
        if !self.membership.is_owner(caller) {
            return Err(GovernanceError::Unauthorized(caller.clone()));
        }
        let now = self.clock.now();
        if now < proposal.deadline {
            return Err(GovernanceError::VotingOpen(id));
        }

        let outcome = proposal.finalize(quorum_threshold, now);
        self.audit
            .record(
                AuditEntry::new(caller.clone(), AuditAction::ProposalExecuted, now)
                    .for_proposal(id)
                    .with_details(serde_json::json!({
                        "quorum_threshold": outcome.quorum_threshold,
                        "vote_count": outcome.vote_count,
                        "approved": outcome.approved,
                    })),
            )
            .await;
        info!(
            "Proposal {} executed by {}: approved={} ({} votes, threshold {})",
            id, caller, outcome.approved, outcome.vote_count, quorum_threshold
        );
        Ok(outcome)
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub async fn get_proposal(&self, id: ProposalId) -> Result<ProposalView, GovernanceError> {
        let handle = self.handle(id).await?;
        let proposal = handle.lock().await;
        Ok(proposal.to_view(self.clock.now()))
    }

    /// All proposals in id order
    pub async fn all_proposals(&self) -> Vec<ProposalView> {
        let handles = self.proposals.read().await.clone();
        let now = self.clock.now();

        let mut views = Vec::with_capacity(handles.len());
        for handle in handles {
            views.push(handle.lock().await.to_view(now));
        }
        views
    }

    pub async fn proposal_count(&self) -> u64 {
        self.proposals.read().await.len() as u64
    }

    /// Seconds left to vote, zero once the deadline has passed
    pub async fn remaining_time(&self, id: ProposalId) -> Result<u64, GovernanceError> {
        let handle = self.handle(id).await?;
        let proposal = handle.lock().await;
        Ok(proposal.remaining_secs(self.clock.now()))
    }

    pub async fn has_voted(&self, id: ProposalId, member: &MemberId) -> Result<bool, GovernanceError> {
        let handle = self.handle(id).await?;
        let proposal = handle.lock().await;
        Ok(proposal.has_voted(member))
    }

    /// Proposal with the highest tally across all proposals; lowest id wins ties
    pub async fn winning_proposal(&self) -> Option<WinningProposal> {
        let handles = self.proposals.read().await.clone();

        let mut winner: Option<WinningProposal> = None;
        for handle in handles {
            let proposal = handle.lock().await;
            let leads = winner
                .as_ref()
                .map_or(true, |best| proposal.vote_count > best.vote_count);
            if leads {
                winner = Some(WinningProposal {
                    id: proposal.id,
                    description: proposal.description.clone(),
                    vote_count: proposal.vote_count,
                });
            }
        }
        winner
    }

    async fn handle(&self, id: ProposalId) -> Result<Arc<Mutex<Proposal>>, GovernanceError> {
        let proposals = self.proposals.read().await;
        id.checked_sub(1)
            .and_then(|index| proposals.get(index as usize))
            .cloned()
            .ok_or(GovernanceError::ProposalNotFound(id))
    }
}
