use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::warn;

use autospin_model::{JobId, JobName, ObservedJob};

use crate::expand::DesiredJobs;

/// A live job carrying the reserved prefix that no longer matches any desired job.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ZombieJob {
    pub name: JobName,
    pub id: JobId,
}

/// Observed state classified against desired state.
///
/// `active`, `missing` and `zombie` are pairwise disjoint and `active ∪ missing` is exactly
/// the desired key set. Jobs without the reserved prefix never appear in any of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// Desired and live: nothing to do.
    pub active: BTreeSet<JobName>,
    /// Desired but not live: to be submitted.
    pub missing: BTreeSet<JobName>,
    /// Live, owned, not desired: to be cancelled.
    pub zombie: Vec<ZombieJob>,
}

impl Classification {
    pub fn classify(desired: &DesiredJobs, observed: &[ObservedJob]) -> Self {
        let mut active = BTreeSet::new();
        let mut zombie = Vec::new();
        let mut live_count: BTreeMap<&str, usize> = BTreeMap::new();

        let owned = observed.iter().filter(|j| j.is_owned() && j.is_active());
        for job in owned {
            let Ok(name) = JobName::parse_owned(&job.name) else {
                continue;
            };
            if desired.contains(name.as_str()) {
                *live_count.entry(job.name.as_str()).or_default() += 1;
                active.insert(name);
            } else {
                zombie.push(ZombieJob { name, id: job.id });
            }
        }

        for (name, count) in live_count.into_iter().filter(|(_, c)| *c > 1) {
            warn!(job = name, count, "desired job is live more than once");
        }

        let missing = desired
            .names()
            .filter(|name| !active.contains(*name))
            .cloned()
            .collect();
        zombie.sort();

        Self {
            active,
            missing,
            zombie,
        }
    }

    /// `true` when no submit or cancel is needed.
    pub fn is_converged(&self) -> bool {
        self.missing.is_empty() && self.zombie.is_empty()
    }

    pub fn action_count(&self) -> usize {
        self.missing.len() + self.zombie.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autospin_model::JobState;

    fn desired(names: &[&str]) -> DesiredJobs {
        names
            .iter()
            .map(|n| (JobName::parse_owned(n).unwrap(), format!("script for {n}")))
            .collect()
    }

    fn names(set: &BTreeSet<JobName>) -> Vec<&str> {
        set.iter().map(JobName::as_str).collect()
    }

    #[test]
    fn nothing_observed_means_everything_missing() {
        let c = Classification::classify(&desired(&["+as-llama-0"]), &[]);
        assert!(c.active.is_empty());
        assert_eq!(names(&c.missing), vec!["+as-llama-0"]);
        assert!(c.zombie.is_empty());
        assert_eq!(c.action_count(), 1);
    }

    #[test]
    fn running_desired_job_is_active() {
        let observed = [ObservedJob::new(JobId(7), "+as-llama-0", JobState::Running)];
        let c = Classification::classify(&desired(&["+as-llama-0"]), &observed);
        assert_eq!(names(&c.active), vec!["+as-llama-0"]);
        assert!(c.is_converged());
    }

    #[test]
    fn undesired_owned_job_is_zombie() {
        let observed = [ObservedJob::new(JobId(9), "+as-qwen-0", JobState::Pending)];
        let c = Classification::classify(&desired(&["+as-llama-0"]), &observed);
        assert_eq!(names(&c.missing), vec!["+as-llama-0"]);
        assert_eq!(
            c.zombie,
            vec![ZombieJob {
                name: JobName::parse_owned("+as-qwen-0").unwrap(),
                id: JobId(9)
            }]
        );
    }

    #[test]
    fn foreign_jobs_are_invisible() {
        let observed = [
            ObservedJob::new(JobId(1), "other-team-job", JobState::Running),
            // same text as a desired name minus the prefix
            ObservedJob::new(JobId(2), "llama-0", JobState::Running),
        ];
        let c = Classification::classify(&desired(&["+as-llama-0"]), &observed);
        assert!(c.active.is_empty());
        assert!(c.zombie.is_empty());
        assert_eq!(names(&c.missing), vec!["+as-llama-0"]);
    }

    #[test]
    fn finished_jobs_count_as_absent() {
        let observed = [
            ObservedJob::new(JobId(1), "+as-llama-0", JobState::Completed),
            ObservedJob::new(JobId(2), "+as-old-0", JobState::Failed),
        ];
        let c = Classification::classify(&desired(&["+as-llama-0"]), &observed);
        assert_eq!(names(&c.missing), vec!["+as-llama-0"]);
        assert!(c.zombie.is_empty());
    }

    #[test]
    fn sets_are_disjoint_and_cover_desired() {
        let d = desired(&["+as-a-0", "+as-a-1", "+as-b-0"]);
        let observed = [
            ObservedJob::new(JobId(1), "+as-a-1", JobState::Running),
            ObservedJob::new(JobId(2), "+as-a-1", JobState::Pending),
            ObservedJob::new(JobId(3), "+as-c-0", JobState::Running),
            ObservedJob::new(JobId(4), "+as-a-2", JobState::Pending),
            ObservedJob::new(JobId(5), "jupyter", JobState::Running),
        ];
        let c = Classification::classify(&d, &observed);

        assert!(c.active.is_disjoint(&c.missing));
        for z in &c.zombie {
            assert!(!c.active.contains(&z.name) && !c.missing.contains(&z.name));
        }
        let covered: BTreeSet<&JobName> = c.active.iter().chain(c.missing.iter()).collect();
        let all: BTreeSet<&JobName> = d.names().collect();
        assert_eq!(covered, all);

        let zombie_ids: Vec<u64> = c.zombie.iter().map(|z| z.id.get()).collect();
        assert_eq!(zombie_ids, vec![4, 3]);
    }
}
