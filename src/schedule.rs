use polars::prelude::*;

use crate::capacity::{compute_capacity, Capacity, ResourcePlan};
use crate::config::ScenarioConfig;
use crate::error::PlanError;
use crate::schema::{milestone, task, tasks, track};

/// One of the two parallel work streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Development,
    Marketing,
}

impl Track {
    pub const ALL: [Track; 2] = [Track::Development, Track::Marketing];

    pub fn as_str(self) -> &'static str {
        match self {
            Track::Development => track::DEVELOPMENT,
            Track::Marketing => track::MARKETING,
        }
    }

    pub fn from_label(label: &str) -> Result<Self, PlanError> {
        match label {
            track::DEVELOPMENT => Ok(Track::Development),
            track::MARKETING => Ok(Track::Marketing),
            other => Err(PlanError::UnknownTrack(other.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProjectTask {
    pub name: String,
    pub hours: u64,
    pub sequence: u32,
    pub track: Track,
}

/// Computed completion of one task, given all lower-sequence work on the
/// same track. `month_index` is `None` when cumulative capacity never
/// covers the requirement within the horizon; `month` then carries the
/// "Beyond Plan" sentinel label.
#[derive(Debug, Clone)]
pub struct Milestone {
    pub task: String,
    pub sequence: u32,
    pub hours: u64,
    pub cumulative_hours: u64,
    pub month_index: Option<usize>,
    pub month: String,
    pub available_hours: f64,
    pub buffer_hours: f64,
    pub track: Track,
}

pub fn find_milestone<'a>(milestones: &'a [Milestone], name: &str) -> Option<&'a Milestone> {
    milestones.iter().find(|m| m.task == name)
}

// ── Task augmentation ───────────────────────────────────────────────────────

/// Append one catch-all task per track absorbing unplanned capacity.
///
/// The catch-all gets the non-negative rounded difference between the
/// track's final cumulative capacity and its planned hours, and a sequence
/// number after every existing task. A track already over capacity gets a
/// zero-hour catch-all; the overrun itself is left for the scheduler to
/// report as Beyond Plan.
pub fn augment_tasks(source: &[ProjectTask], capacity: &Capacity) -> Vec<ProjectTask> {
    let mut out = source.to_vec();
    for (trk, name) in [
        (Track::Development, tasks::DEV_CATCH_ALL),
        (Track::Marketing, tasks::MKTG_CATCH_ALL),
    ] {
        let total = capacity
            .cumulative_for(trk)
            .last()
            .copied()
            .unwrap_or(0.0);
        let planned: u64 = out
            .iter()
            .filter(|t| t.track == trk)
            .map(|t| t.hours)
            .sum();
        let remaining = (total - planned as f64).max(0.0).round() as u64;
        let sequence = out
            .iter()
            .filter(|t| t.track == trk)
            .map(|t| t.sequence)
            .max()
            .map_or(1, |s| s + 1);
        out.push(ProjectTask {
            name: name.to_string(),
            hours: remaining,
            sequence,
            track: trk,
        });
    }
    out
}

// ── Milestone scheduling ────────────────────────────────────────────────────

/// Greedy capacity matching, independently per track: tasks consume
/// capacity strictly in sequence order, no partial overlap, no borrowing
/// between tracks. Each task completes in the first month whose cumulative
/// available hours reach the running requirement.
pub fn schedule_milestones(tasks: &[ProjectTask], capacity: &Capacity) -> Vec<Milestone> {
    let mut out = Vec::with_capacity(tasks.len());
    for trk in Track::ALL {
        let cumulative = capacity.cumulative_for(trk);
        let mut ordered: Vec<&ProjectTask> =
            tasks.iter().filter(|t| t.track == trk).collect();
        ordered.sort_by_key(|t| t.sequence);

        let mut required: u64 = 0;
        for t in ordered {
            required += t.hours;
            let needed = required as f64;
            let idx = cumulative.partition_point(|&available| available < needed);
            let (month_index, month, available_hours, buffer_hours) =
                if idx < cumulative.len() {
                    let available = cumulative[idx];
                    (
                        Some(idx),
                        capacity.months[idx].clone(),
                        available,
                        available - needed,
                    )
                } else {
                    (None, milestone::BEYOND_PLAN.to_string(), 0.0, 0.0)
                };
            out.push(Milestone {
                task: t.name.clone(),
                sequence: t.sequence,
                hours: t.hours,
                cumulative_hours: required,
                month_index,
                month,
                available_hours,
                buffer_hours,
                track: trk,
            });
        }
    }
    out
}

// ── Two-pass schedule ───────────────────────────────────────────────────────

/// Final schedule plus the capacity and augmented task list it was built
/// against.
#[derive(Debug, Clone)]
pub struct ScheduleOutcome {
    pub capacity: Capacity,
    pub tasks: Vec<ProjectTask>,
    pub milestones: Vec<Milestone>,
}

/// Run the two-pass scheduling protocol.
///
/// Pass 1 schedules against capacity with no sales deduction; pass 2
/// recomputes capacity using pass-1 milestones (diverting marketing hours
/// to sales once the foundation milestone lands) and reschedules. Exactly
/// two passes: if the recomputed capacity moves the foundation milestone
/// itself, pass 2 still stands as the final result.
pub fn plan_schedule(
    plan: &ResourcePlan,
    config: &ScenarioConfig,
    source_tasks: &[ProjectTask],
) -> Result<ScheduleOutcome, PlanError> {
    let first_capacity = compute_capacity(plan, config, &[])?;
    let first_tasks = augment_tasks(source_tasks, &first_capacity);
    let first_milestones = schedule_milestones(&first_tasks, &first_capacity);

    let capacity = compute_capacity(plan, config, &first_milestones)?;
    let tasks = augment_tasks(source_tasks, &capacity);
    let milestones = schedule_milestones(&tasks, &capacity);

    Ok(ScheduleOutcome {
        capacity,
        tasks,
        milestones,
    })
}

// ── Report tables ───────────────────────────────────────────────────────────

pub fn tasks_to_dataframe(tasks: &[ProjectTask]) -> Result<DataFrame, PlanError> {
    let names: Vec<&str> = tasks.iter().map(|t| t.name.as_str()).collect();
    let hours: Vec<u64> = tasks.iter().map(|t| t.hours).collect();
    let sequences: Vec<u32> = tasks.iter().map(|t| t.sequence).collect();
    let track_labels: Vec<&str> = tasks.iter().map(|t| t.track.as_str()).collect();

    let df = DataFrame::new(vec![
        Column::new(task::NAME.into(), &names),
        Column::new(task::HOURS.into(), &hours),
        Column::new(task::SEQUENCE.into(), &sequences),
        Column::new(task::TRACK.into(), &track_labels),
    ])?;
    Ok(df)
}

pub fn milestones_to_dataframe(milestones: &[Milestone]) -> Result<DataFrame, PlanError> {
    let names: Vec<&str> = milestones.iter().map(|m| m.task.as_str()).collect();
    let sequences: Vec<u32> = milestones.iter().map(|m| m.sequence).collect();
    let hours: Vec<u64> = milestones.iter().map(|m| m.hours).collect();
    let cum_hours: Vec<u64> = milestones.iter().map(|m| m.cumulative_hours).collect();
    let months: Vec<&str> = milestones.iter().map(|m| m.month.as_str()).collect();
    let available: Vec<f64> = milestones.iter().map(|m| m.available_hours).collect();
    let buffers: Vec<f64> = milestones.iter().map(|m| m.buffer_hours).collect();
    let track_labels: Vec<&str> = milestones.iter().map(|m| m.track.as_str()).collect();

    let df = DataFrame::new(vec![
        Column::new(milestone::TASK.into(), &names),
        Column::new(milestone::SEQUENCE.into(), &sequences),
        Column::new(milestone::HOURS.into(), &hours),
        Column::new(milestone::CUM_HOURS.into(), &cum_hours),
        Column::new(milestone::COMPLETION_MONTH.into(), &months),
        Column::new(milestone::AVAILABLE_HOURS.into(), &available),
        Column::new(milestone::BUFFER_HOURS.into(), &buffers),
        Column::new(milestone::TRACK.into(), &track_labels),
    ])?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dev_task(name: &str, hours: u64, sequence: u32) -> ProjectTask {
        ProjectTask {
            name: name.to_string(),
            hours,
            sequence,
            track: Track::Development,
        }
    }

    fn mktg_task(name: &str, hours: u64, sequence: u32) -> ProjectTask {
        ProjectTask {
            name: name.to_string(),
            hours,
            sequence,
            track: Track::Marketing,
        }
    }

    fn capacity_of(dev: &[f64], mktg: &[f64]) -> Capacity {
        let cumulate = |monthly: &[f64]| {
            let mut total = 0.0;
            monthly
                .iter()
                .map(|h| {
                    total += h;
                    total
                })
                .collect::<Vec<_>>()
        };
        Capacity {
            months: (1..=dev.len()).map(|m| format!("M{m:02}")).collect(),
            cumulative_dev: cumulate(dev),
            cumulative_mktg: cumulate(mktg),
            monthly_dev: dev.to_vec(),
            monthly_mktg: mktg.to_vec(),
        }
    }

    #[test]
    fn scheduler_matches_cumulative_capacity() {
        // Cumulative dev capacity [100, 250, 400].
        let cap = capacity_of(&[100.0, 150.0, 150.0], &[0.0, 0.0, 0.0]);
        let tasks = vec![
            dev_task("Alpha", 150, 1),
            dev_task("Beta", 100, 2),
            dev_task("Gamma", 500, 3),
        ];
        let ms = schedule_milestones(&tasks, &cap);

        assert_eq!(ms[0].month, "M02");
        assert_eq!(ms[0].cumulative_hours, 150);
        assert_eq!(ms[0].buffer_hours, 100.0);

        // 150 + 100 = 250 exactly matches month 2.
        assert_eq!(ms[1].month, "M02");
        assert_eq!(ms[1].buffer_hours, 0.0);

        assert_eq!(ms[2].month, milestone::BEYOND_PLAN);
        assert_eq!(ms[2].month_index, None);
        assert_eq!(ms[2].available_hours, 0.0);
        assert_eq!(ms[2].buffer_hours, 0.0);
    }

    #[test]
    fn milestone_months_never_decrease_within_a_track() {
        let cap = capacity_of(&[80.0, 120.0, 60.0, 200.0], &[50.0, 50.0, 50.0, 50.0]);
        let tasks = vec![
            dev_task("A", 70, 1),
            dev_task("B", 90, 2),
            dev_task("C", 10, 3),
            mktg_task("X", 60, 1),
            mktg_task("Y", 80, 2),
        ];
        let ms = schedule_milestones(&tasks, &cap);
        for trk in Track::ALL {
            let indexes: Vec<_> = ms
                .iter()
                .filter(|m| m.track == trk)
                .map(|m| m.month_index)
                .collect();
            for w in indexes.windows(2) {
                match (w[0], w[1]) {
                    (Some(a), Some(b)) => assert!(a <= b),
                    (_, None) => {}
                    (None, Some(_)) => panic!("resolved milestone after Beyond Plan"),
                }
            }
        }
    }

    #[test]
    fn ties_in_sequence_preserve_input_order() {
        let cap = capacity_of(&[1000.0], &[0.0]);
        let tasks = vec![dev_task("First", 10, 1), dev_task("Second", 10, 1)];
        let ms = schedule_milestones(&tasks, &cap);
        assert_eq!(ms[0].task, "First");
        assert_eq!(ms[1].task, "Second");
    }

    #[test]
    fn augmenter_absorbs_exactly_the_slack() {
        let cap = capacity_of(&[100.0, 150.0], &[90.0, 30.5]);
        let tasks = vec![dev_task("A", 60, 1), mktg_task("X", 20, 4)];
        let augmented = augment_tasks(&tasks, &cap);
        assert_eq!(augmented.len(), 4);

        let dev_catch = augmented
            .iter()
            .find(|t| t.name == tasks::DEV_CATCH_ALL)
            .unwrap();
        assert_eq!(dev_catch.hours, 190);
        assert_eq!(dev_catch.sequence, 2);

        let mktg_catch = augmented
            .iter()
            .find(|t| t.name == tasks::MKTG_CATCH_ALL)
            .unwrap();
        // 120.5 - 20 = 100.5, rounded to nearest.
        assert_eq!(mktg_catch.hours, 101);
        assert_eq!(mktg_catch.sequence, 5);

        // Conservation: planned hours never exceed final cumulative capacity
        // once rounding is accounted for.
        for trk in Track::ALL {
            let planned: u64 = augmented
                .iter()
                .filter(|t| t.track == trk)
                .map(|t| t.hours)
                .sum();
            let total = *cap.cumulative_for(trk).last().unwrap();
            assert!(planned as f64 <= total + 0.5);
        }
    }

    #[test]
    fn over_capacity_track_gets_zero_hour_catch_all() {
        let cap = capacity_of(&[100.0], &[100.0]);
        let tasks = vec![dev_task("Huge", 5000, 1)];
        let augmented = augment_tasks(&tasks, &cap);
        let dev_catch = augmented
            .iter()
            .find(|t| t.name == tasks::DEV_CATCH_ALL)
            .unwrap();
        assert_eq!(dev_catch.hours, 0);
    }

    #[test]
    fn catch_all_sequence_is_one_for_an_empty_track() {
        let cap = capacity_of(&[100.0], &[100.0]);
        let augmented = augment_tasks(&[], &cap);
        for t in &augmented {
            assert_eq!(t.sequence, 1);
        }
    }

    #[test]
    fn second_pass_diverts_marketing_capacity_to_sales() {
        use crate::capacity::tests::{test_config, test_plan};
        use crate::capacity::SALES_DIVERSION_HOURS;

        let plan = test_plan(12);
        // Marketing: 2 seniors * 8 * 20 = 320 h/month.
        let source = vec![
            mktg_task(tasks::MARKETING_FOUNDATION, 300, 1),
            mktg_task("Campaign", 900, 2),
        ];
        let outcome = plan_schedule(&plan, &test_config(), &source).unwrap();

        // Foundation lands in month 1 on both passes (deduction only applies
        // strictly after it).
        let foundation =
            find_milestone(&outcome.milestones, tasks::MARKETING_FOUNDATION).unwrap();
        assert_eq!(foundation.month_index, Some(0));

        // Months after the foundation run at 320 - 240 = 80 h.
        assert_eq!(outcome.capacity.monthly_mktg[0], 320.0);
        for i in 1..12 {
            assert_eq!(
                outcome.capacity.monthly_mktg[i],
                320.0 - SALES_DIVERSION_HOURS
            );
        }

        // Requirement 1200 h: reached month 4 without the deduction, but
        // only in month 12 with it (320 + 11*80 = 1200).
        let campaign = find_milestone(&outcome.milestones, "Campaign").unwrap();
        assert_eq!(campaign.month_index, Some(11));
    }

    #[test]
    fn exactly_two_passes_are_performed() {
        use crate::capacity::tests::{test_config, test_plan};

        // Foundation: 400 h against 320 h/month, landing in month 2 on both
        // passes. Capacity recomputed from the final milestones must equal
        // the pass-2 capacity, i.e. no hidden extra pass ran.
        let plan = test_plan(12);
        let source = vec![mktg_task(tasks::MARKETING_FOUNDATION, 400, 1)];
        let outcome = plan_schedule(&plan, &test_config(), &source).unwrap();
        let foundation =
            find_milestone(&outcome.milestones, tasks::MARKETING_FOUNDATION).unwrap();
        assert_eq!(foundation.month_index, Some(1));

        let recomputed =
            compute_capacity(&plan, &test_config(), &outcome.milestones).unwrap();
        assert_eq!(recomputed.monthly_mktg, outcome.capacity.monthly_mktg);
    }
}
