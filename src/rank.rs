//! Relevance ranking: a thin adapter over the host's fuzzy scorer.
//!
//! The fuzzy algorithm itself is a collaborator owned by the host
//! launcher; this stage only applies it uniformly to every candidate so
//! relative scores stay comparable. It does no string matching of its own.

use crate::hypervisor::Machine;

/// Factory for per-query matchers, supplied by the host launcher.
pub trait Ranking: Send + Sync {
    type Matcher: Matcher;

    /// Build a matcher for one query string. Called once per query;
    /// the same matcher scores every candidate.
    fn create(&self, query: &str) -> Self::Matcher;
}

/// Scores candidate text against the query it was created for.
pub trait Matcher {
    /// Relevance score, higher is more relevant. Anything ≤ 0 means
    /// "no match".
    fn score(&self, candidate: &str) -> i64;
}

/// A machine that passed ranking, paired with its score and the display
/// name the score was computed from.
#[derive(Debug, Clone)]
pub struct RankedMachine<M> {
    pub machine: M,
    pub name: String,
    pub score: i64,
}

/// Score each machine's display name against `query`.
///
/// An empty query includes every machine with score 0, leaving ordering
/// to the caller's default. Otherwise machines scoring ≤ 0 are excluded.
/// A machine whose name cannot be read is skipped, same defensive policy
/// as the source stage.
pub fn rank<M, R>(machines: Vec<M>, query: &str, ranking: &R) -> Vec<RankedMachine<M>>
where
    M: Machine,
    R: Ranking,
{
    let matcher = (!query.is_empty()).then(|| ranking.create(query));

    let mut ranked = Vec::new();
    for machine in machines {
        let name = match machine.name() {
            Ok(name) => name,
            Err(error) => {
                tracing::debug!(
                    machine_id = %machine.id(),
                    %error,
                    "name read failed, skipping machine"
                );
                continue;
            }
        };

        match &matcher {
            None => ranked.push(RankedMachine {
                machine,
                name,
                score: 0,
            }),
            Some(matcher) => {
                let score = matcher.score(&name);
                if score > 0 {
                    ranked.push(RankedMachine {
                        machine,
                        name,
                        score,
                    });
                }
            }
        }
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MachineState;
    use crate::testing::{MockMachine, SubsequenceRanking};

    fn fleet() -> Vec<MockMachine> {
        vec![
            MockMachine::new("Ubuntu Dev Box", MachineState::PoweredOff),
            MockMachine::new("Windows 11", MachineState::Running),
            MockMachine::new("NixOS CI", MachineState::Saved),
        ]
    }

    #[test]
    fn empty_query_includes_every_machine() {
        let ranked = rank(fleet(), "", &SubsequenceRanking);
        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|r| r.score == 0));
    }

    #[test]
    fn matching_query_scores_positively() {
        let ranked = rank(fleet(), "ubd", &SubsequenceRanking);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "Ubuntu Dev Box");
        assert!(ranked[0].score > 0);
    }

    #[test]
    fn non_matching_machines_are_excluded() {
        let ranked = rank(
            vec![MockMachine::new("Windows 11", MachineState::Running)],
            "zzz",
            &SubsequenceRanking,
        );
        assert!(ranked.is_empty());
    }

    #[test]
    fn unreadable_name_skips_machine() {
        let machines = vec![
            MockMachine::new("Ubuntu Dev Box", MachineState::PoweredOff),
            MockMachine::new("ghost", MachineState::PoweredOff).with_name_error(),
        ];
        let ranked = rank(machines, "", &SubsequenceRanking);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "Ubuntu Dev Box");
    }
}
