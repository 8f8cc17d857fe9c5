//! Member roster and the execution authority

use crate::governance::models::MemberId;
use std::collections::BTreeSet;

/// Who may create and vote on proposals, and who may execute them.
///
/// The owner is always a member.
#[derive(Debug, Clone)]
pub struct Membership {
    owner: MemberId,
    members: BTreeSet<MemberId>,
}

impl Membership {
    pub fn new(owner: MemberId, members: impl IntoIterator<Item = MemberId>) -> Self {
        let mut members: BTreeSet<MemberId> = members.into_iter().collect();
        members.insert(owner.clone());
        Self { owner, members }
    }

    pub fn owner(&self) -> &MemberId {
        &self.owner
    }

    pub fn is_member(&self, member: &MemberId) -> bool {
        self.members.contains(member)
    }

    pub fn is_owner(&self, member: &MemberId) -> bool {
        &self.owner == member
    }

    pub fn members(&self) -> impl Iterator<Item = &MemberId> {
        self.members.iter()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}
