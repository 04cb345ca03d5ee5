//! Community member roster ordering

use std::cmp::Ordering;

use crate::types::{Member, MemberRole};

/// Roster search as offered on the members tab
#[derive(Debug, Clone, Default)]
pub struct MemberQuery {
    /// Case-insensitive match against name or title; blank matches all
    pub search: String,
    pub role: Option<MemberRole>,
}

impl MemberQuery {
    pub fn matches(&self, member: &Member) -> bool {
        let needle = self.search.trim().to_lowercase();
        let matches_search = needle.is_empty()
            || member.name.to_lowercase().contains(&needle)
            || member.title.to_lowercase().contains(&needle);
        let matches_role = self.role.map_or(true, |role| member.role == role);
        matches_search && matches_role
    }

    /// Filter, then order with [`order_members`]
    pub fn apply(&self, members: &[Member]) -> Vec<Member> {
        let matching: Vec<Member> = members
            .iter()
            .filter(|member| self.matches(member))
            .cloned()
            .collect();
        order_members(&matching)
    }
}

/// Founders, then moderators, then members; online before offline within a
/// role; then by name. The sort is stable.
pub fn order_members(members: &[Member]) -> Vec<Member> {
    let mut ordered = members.to_vec();
    ordered.sort_by(compare_members);
    ordered
}

fn compare_members(a: &Member, b: &Member) -> Ordering {
    a.role
        .cmp(&b.role)
        .then_with(|| b.online.cmp(&a.online))
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}
