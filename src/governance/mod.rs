//! Governance Module - The proposal lifecycle and vote tally
//!
//! Members create proposals, vote on them while the voting window is open,
//! and the owner finalizes them once the window has closed:
//!
//! 1. **Create**: sequential id, immutable description and category
//! 2. **Vote**: one weighted vote per member, until the deadline
//! 3. **Execute**: quorum evaluated against a threshold chosen at execution time
//!
//! Voting power and time come from collaborators ([`VotingWeightProvider`],
//! [`Clock`]) so the registry never owns balances or reads the wall clock directly.

pub mod audit;
pub mod clock;
pub mod error;
pub mod membership;
pub mod models;
pub mod registry;
pub mod weight;

pub use audit::{AuditAction, AuditEntry, AuditLog};
pub use clock::{Clock, SystemClock};
pub use error::{invalid_input, GovernanceError};
pub use membership::Membership;
pub use models::*;
pub use registry::GovernanceRegistry;
pub use weight::{CollaboratorError, VotingWeightProvider};
