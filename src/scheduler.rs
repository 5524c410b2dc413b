use anyhow::{bail, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::models::{Activity, Plan};

/// Draw one activity name, weighted by priority after the history
/// adjustment. The caller's activity list is never mutated; the
/// adjustment is scoped to this single draw.
pub fn pick_weighted(
    activities: &[Activity],
    plans: &[Plan],
    rng: &mut impl Rng,
) -> Result<String> {
    let adjusted = adjust_priorities(activities.to_vec(), plans);
    let pool = build_pool(&adjusted);
    match pool.choose(rng) {
        Some(name) => Ok(name.clone()),
        None => bail!("no eligible activity: every priority is zero"),
    }
}

/// Walk exported plans from most recent to oldest, bumping the priority
/// of every activity that has not yet shown up. The bump is applied once
/// per scanned plan, so an activity absent from several recent plans
/// stacks up weight. Scanning stops once every activity has been seen.
pub fn adjust_priorities(mut activities: Vec<Activity>, plans: &[Plan]) -> Vec<Activity> {
    let mut plans: Vec<&Plan> = plans.iter().collect();
    plans.sort_by(|a, b| b.date.cmp(&a.date));

    let mut unaccounted: HashSet<String> =
        activities.iter().map(|a| a.name.clone()).collect();
    let mut found: HashSet<String> = HashSet::new();

    for plan in plans {
        if unaccounted.is_empty() {
            break;
        }
        for (_, name) in &plan.entries {
            if unaccounted.remove(name) {
                found.insert(name.clone());
            }
        }
        for activity in activities.iter_mut() {
            if !found.contains(&activity.name) {
                log::debug!("bumping priority of {}", activity.name);
                activity.priority += 1;
            }
        }
    }
    activities
}

/// Flat candidate pool: each name repeated priority times. Priority 0
/// means the activity is excluded from drawing entirely.
pub fn build_pool(activities: &[Activity]) -> Vec<String> {
    let mut pool = Vec::new();
    for activity in activities {
        for _ in 0..activity.priority {
            pool.push(activity.name.clone());
        }
    }
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WEEKDAYS;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn activity(name: &str, priority: u32) -> Activity {
        Activity {
            name: name.to_string(),
            priority,
        }
    }

    fn plan(day: u32, names: &[&str]) -> Plan {
        Plan {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            entries: names
                .iter()
                .enumerate()
                .map(|(i, name)| (WEEKDAYS[i % 7].to_string(), name.to_string()))
                .collect(),
        }
    }

    #[test]
    fn no_history_leaves_priorities_untouched() {
        let activities = vec![activity("Reading", 1), activity("Gaming", 3)];
        let adjusted = adjust_priorities(activities.clone(), &[]);
        assert_eq!(adjusted, activities);
    }

    #[test]
    fn unused_activity_outweighs_recently_used_one() {
        let activities = vec![activity("X", 1), activity("Y", 1)];
        let plans = vec![plan(10, &["X", "X", "X", "X", "X", "X", "X"])];

        let adjusted = adjust_priorities(activities, &plans);
        let x = adjusted.iter().find(|a| a.name == "X").unwrap();
        let y = adjusted.iter().find(|a| a.name == "Y").unwrap();
        assert!(y.priority > x.priority);
        assert_eq!(x.priority, 1);
        assert_eq!(y.priority, 2);
    }

    #[test]
    fn bump_stacks_across_older_plans() {
        // Y never appears, so it collects one bump per scanned plan. X
        // appears in the most recent plan and is exempt from then on.
        let activities = vec![activity("X", 1), activity("Y", 1), activity("Z", 1)];
        let plans = vec![
            plan(12, &["X"]),
            plan(11, &["Z"]),
            plan(10, &["X"]),
        ];

        let adjusted = adjust_priorities(activities, &plans);
        let x = adjusted.iter().find(|a| a.name == "X").unwrap();
        let y = adjusted.iter().find(|a| a.name == "Y").unwrap();
        let z = adjusted.iter().find(|a| a.name == "Z").unwrap();
        assert_eq!(x.priority, 1);
        assert_eq!(z.priority, 2);
        assert_eq!(y.priority, 4);
    }

    #[test]
    fn scan_stops_once_every_activity_is_accounted_for() {
        let activities = vec![activity("X", 1), activity("Y", 1)];
        // Both are found in the most recent plan; the older plan must
        // not contribute a second bump.
        let plans = vec![plan(12, &["X", "Y"]), plan(10, &[])];

        let adjusted = adjust_priorities(activities, &plans);
        assert!(adjusted.iter().all(|a| a.priority == 1));
    }

    #[test]
    fn plan_entries_for_unknown_activities_are_ignored() {
        let activities = vec![activity("X", 1)];
        let plans = vec![plan(10, &["Deleted long ago", "X"])];

        let adjusted = adjust_priorities(activities, &plans);
        assert_eq!(adjusted[0].priority, 1);
    }

    #[test]
    fn pool_repeats_each_name_priority_times() {
        let activities = vec![activity("Reading", 1), activity("Gaming", 3)];
        let pool = build_pool(&activities);
        assert_eq!(pool, vec!["Reading", "Gaming", "Gaming", "Gaming"]);
    }

    #[test]
    fn draw_comes_from_the_flat_pool() {
        let activities = vec![activity("Reading", 1), activity("Gaming", 3)];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let name = pick_weighted(&activities, &[], &mut rng).unwrap();
            assert!(name == "Reading" || name == "Gaming");
        }
    }

    #[test]
    fn zero_priority_is_never_drawn() {
        let activities = vec![activity("Skipped", 0), activity("Taken", 2)];
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..10_000 {
            assert_eq!(pick_weighted(&activities, &[], &mut rng).unwrap(), "Taken");
        }
    }

    #[test]
    fn empty_pool_is_an_error_not_a_silent_pick() {
        let activities = vec![activity("Skipped", 0)];
        let mut rng = StdRng::seed_from_u64(1);
        let err = pick_weighted(&activities, &[], &mut rng).unwrap_err();
        assert!(err.to_string().contains("no eligible activity"));

        assert!(pick_weighted(&[], &[], &mut rng).is_err());
    }
}
