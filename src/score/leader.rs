//! Leader-change detection over aggregation results.
//!
//! The context holds the single piece of state this needs (the previously
//! observed leader) and is injected per observation cycle so the detector
//! stays independently testable.

use serde::Serialize;

use super::MemberStanding;

/// A change of the top-ranked member worth celebrating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderChange {
    pub member_id: String,
    pub name: String,
    pub total: u64,
}

/// The member with the strictly greatest total, if any.
///
/// Leadership requires a strict maximum: a tie for first place, or a zero
/// top total, declares no leader.
pub fn strict_leader(standings: &[MemberStanding]) -> Option<&MemberStanding> {
    let top = standings.iter().max_by_key(|s| s.total)?;
    if top.total == 0 {
        return None;
    }
    let contenders = standings.iter().filter(|s| s.total == top.total).count();
    if contenders > 1 {
        return None;
    }
    Some(top)
}

/// Mutable context carrying the previously observed leader between cycles.
#[derive(Debug, Default)]
pub struct LeaderContext {
    previous: Option<String>,
}

impl LeaderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a fresh aggregation result.
    ///
    /// Returns a celebration event only when a previous leader was already
    /// recorded and a different member now holds a strict, positive maximum.
    /// The first observation after load records the leader silently, so a
    /// page load never produces a false celebration. The new leader is
    /// stored whether or not an event fired.
    pub fn observe(&mut self, standings: &[MemberStanding]) -> Option<LeaderChange> {
        let leader = strict_leader(standings);

        let change = match (&self.previous, leader) {
            (Some(previous), Some(current)) if previous != &current.member_id => {
                Some(LeaderChange {
                    member_id: current.member_id.clone(),
                    name: current.name.clone(),
                    total: current.total,
                })
            }
            _ => None,
        };

        self.previous = leader.map(|s| s.member_id.clone());
        change
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standing(member_id: &str, total: u64) -> MemberStanding {
        MemberStanding {
            member_id: member_id.to_string(),
            name: member_id.to_string(),
            total,
        }
    }

    #[test]
    fn test_strict_leader_requires_strict_maximum() {
        assert!(strict_leader(&[standing("a", 10), standing("b", 10)]).is_none());
        assert_eq!(
            strict_leader(&[standing("a", 12), standing("b", 10)]).map(|s| s.member_id.as_str()),
            Some("a")
        );
    }

    #[test]
    fn test_no_leader_at_zero_points() {
        assert!(strict_leader(&[standing("a", 0), standing("b", 0)]).is_none());
        assert!(strict_leader(&[standing("a", 0)]).is_none());
    }

    #[test]
    fn test_first_observation_is_silent() {
        let mut ctx = LeaderContext::new();
        assert!(ctx.observe(&[standing("a", 10), standing("b", 5)]).is_none());
    }

    #[test]
    fn test_change_fires_after_priming() {
        let mut ctx = LeaderContext::new();
        ctx.observe(&[standing("a", 10), standing("b", 5)]);

        let change = ctx.observe(&[standing("a", 10), standing("b", 15)]);
        assert_eq!(
            change,
            Some(LeaderChange {
                member_id: "b".to_string(),
                name: "b".to_string(),
                total: 15,
            })
        );
    }

    #[test]
    fn test_same_leader_does_not_refire() {
        let mut ctx = LeaderContext::new();
        ctx.observe(&[standing("a", 10), standing("b", 5)]);
        assert!(ctx.observe(&[standing("a", 20), standing("b", 5)]).is_none());
    }

    #[test]
    fn test_tie_clears_leader_and_suppresses_next_change() {
        let mut ctx = LeaderContext::new();
        ctx.observe(&[standing("a", 10), standing("b", 5)]);
        // Tie: no leader declared, previous leader cleared
        assert!(ctx.observe(&[standing("a", 10), standing("b", 10)]).is_none());
        // Leadership emerging out of a tie has no recorded predecessor
        assert!(ctx.observe(&[standing("a", 10), standing("b", 12)]).is_none());
        // From here on changes fire again
        assert!(ctx.observe(&[standing("a", 20), standing("b", 12)]).is_some());
    }
}
