//! Voting power ledger
//!
//! Every account starts out delegating to itself. Delegation moves the whole
//! balance of an account to one delegate and does not chain: if A delegates to
//! B and B delegates to C, C receives B's balance but not A's.
//!
//! Each change to a delegate's power is written as a checkpoint. Votes read
//! the power in effect just before a proposal was created, so a balance that
//! moves while a proposal is open cannot be counted on it twice.

use crate::governance::{Clock, CollaboratorError, MemberId, SystemClock, VotingWeightProvider};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tracing::debug;

/// How voting power is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightMode {
    /// One member, one vote
    #[default]
    Simple,
    /// Token balance
    Weighted,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DelegationError {
    #[error("{0} holds no voting account")]
    NoAccount(MemberId),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

/// Outcome of a delegation change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delegation {
    pub previous: MemberId,
    /// Time the new power took effect
    pub effective_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy)]
struct Checkpoint {
    from: DateTime<Utc>,
    votes: u64,
}

#[derive(Debug, Default)]
struct DelegationBook {
    /// Account -> delegate, absent means self
    delegates: HashMap<MemberId, MemberId>,
    /// Delegate -> power history, oldest first
    checkpoints: HashMap<MemberId, Vec<Checkpoint>>,
}

impl DelegationBook {
    fn latest(&self, member: &MemberId) -> u64 {
        self.checkpoints
            .get(member)
            .and_then(|history| history.last())
            .map_or(0, |c| c.votes)
    }

    fn before(&self, member: &MemberId, at: DateTime<Utc>) -> u64 {
        self.checkpoints.get(member).map_or(0, |history| {
            let taken = history.partition_point(|c| c.from < at);
            taken.checked_sub(1).map_or(0, |i| history[i].votes)
        })
    }

    fn checkpoint(&mut self, member: &MemberId, now: DateTime<Utc>, votes: u64) {
        let history = self.checkpoints.entry(member.clone()).or_default();
        match history.last_mut() {
            // Same instant (or a clock that stepped back) folds into the last entry
            Some(last) if last.from >= now => last.votes = votes,
            _ => history.push(Checkpoint { from: now, votes }),
        }
    }
}

pub struct VotingPowerLedger {
    name: String,
    symbol: String,
    mode: WeightMode,
    balances: BTreeMap<MemberId, u64>,
    book: RwLock<DelegationBook>,
    clock: Arc<dyn Clock>,
}

impl VotingPowerLedger {
    /// Every member holds exactly one unit
    pub fn simple(
        name: impl Into<String>,
        symbol: impl Into<String>,
        members: impl IntoIterator<Item = MemberId>,
    ) -> Self {
        let balances = members.into_iter().map(|m| (m, 1)).collect();
        Self::build(name.into(), symbol.into(), WeightMode::Simple, balances)
    }

    /// Balances taken from an allocation table
    pub fn weighted(
        name: impl Into<String>,
        symbol: impl Into<String>,
        allocations: BTreeMap<MemberId, u64>,
    ) -> Self {
        Self::build(name.into(), symbol.into(), WeightMode::Weighted, allocations)
    }

    fn build(name: String, symbol: String, mode: WeightMode, balances: BTreeMap<MemberId, u64>) -> Self {
        // Initial balances have always been in effect
        let checkpoints = balances
            .iter()
            .map(|(m, b)| {
                let genesis = Checkpoint {
                    from: DateTime::<Utc>::MIN_UTC,
                    votes: *b,
                };
                (m.clone(), vec![genesis])
            })
            .collect();

        Self {
            name,
            symbol,
            mode,
            balances,
            book: RwLock::new(DelegationBook {
                delegates: HashMap::new(),
                checkpoints,
            }),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` to timestamp delegation checkpoints
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn mode(&self) -> WeightMode {
        self.mode
    }

    pub fn total_supply(&self) -> u64 {
        self.balances.values().copied().fold(0u64, u64::saturating_add)
    }

    pub fn balance_of(&self, member: &MemberId) -> u64 {
        self.balances.get(member).copied().unwrap_or(0)
    }

    /// Current delegate of an account, `None` if it has no account
    pub fn delegate_of(&self, member: &MemberId) -> Result<Option<MemberId>, CollaboratorError> {
        if !self.balances.contains_key(member) {
            return Ok(None);
        }
        let book = self.read()?;
        Ok(Some(book.delegates.get(member).cloned().unwrap_or_else(|| member.clone())))
    }

    /// Voting power attributed to `member` right now
    pub fn current_weight(&self, member: &MemberId) -> Result<u64, CollaboratorError> {
        Ok(self.read()?.latest(member))
    }

    /// Point `from`'s voting power at `to`
    pub fn delegate(&self, from: &MemberId, to: &MemberId) -> Result<Delegation, DelegationError> {
        let balance = *self
            .balances
            .get(from)
            .ok_or_else(|| DelegationError::NoAccount(from.clone()))?;

        let mut book = self.write()?;
        let now = self.clock.now();

        let previous = book.delegates.get(from).cloned().unwrap_or_else(|| from.clone());
        if &previous == to {
            return Ok(Delegation {
                previous,
                effective_at: now,
            });
        }

        let remaining = book.latest(&previous).saturating_sub(balance);
        book.checkpoint(&previous, now, remaining);
        let received = book.latest(to).saturating_add(balance);
        book.checkpoint(to, now, received);

        if from == to {
            book.delegates.remove(from);
        } else {
            book.delegates.insert(from.clone(), to.clone());
        }

        debug!("{} delegated {} {} from {} to {}", from, balance, self.symbol, previous, to);
        Ok(Delegation {
            previous,
            effective_at: now,
        })
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, DelegationBook>, CollaboratorError> {
        self.book
            .read()
            .map_err(|_| CollaboratorError::Unavailable("delegation book lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, DelegationBook>, CollaboratorError> {
        self.book
            .write()
            .map_err(|_| CollaboratorError::Unavailable("delegation book lock poisoned".to_string()))
    }
}

impl VotingWeightProvider for VotingPowerLedger {
    fn weight_at(&self, member: &MemberId, at: DateTime<Utc>) -> Result<u64, CollaboratorError> {
        Ok(self.read()?.before(member, at))
    }
}
