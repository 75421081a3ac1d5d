use polars::prelude::*;

use crate::config::ScenarioConfig;
use crate::error::PlanError;
use crate::schedule::{find_milestone, Milestone, Track};
use crate::schema::{capacity, tasks};

pub const HOURS_PER_DAY: f64 = 8.0;

/// One senior-marketer month (8 h × 30 d), permanently reassigned to sales
/// once the marketing-foundation milestone lands.
pub const SALES_DIVERSION_HOURS: f64 = 240.0;

/// Staffing plan, one entry per modeled month across all vectors.
#[derive(Debug, Clone)]
pub struct ResourcePlan {
    pub months: Vec<String>,
    pub work_days: Vec<f64>,
    pub senior_devs: Vec<f64>,
    pub intern_devs: Vec<f64>,
    pub senior_marketers: Vec<f64>,
    pub intern_marketers: Vec<f64>,
    pub dev_efficiency: Vec<f64>,
    pub mktg_efficiency: Vec<f64>,
}

impl ResourcePlan {
    /// Fail loudly on an empty or misaligned plan rather than producing
    /// misaligned capacity series.
    pub fn validate(&self) -> Result<(), PlanError> {
        let n = self.months.len();
        if n == 0 {
            return Err(PlanError::Validation("resource plan is empty".into()));
        }
        let series = [
            (self.work_days.len(), "work_days"),
            (self.senior_devs.len(), "senior_devs"),
            (self.intern_devs.len(), "intern_devs"),
            (self.senior_marketers.len(), "senior_marketers"),
            (self.intern_marketers.len(), "intern_marketers"),
            (self.dev_efficiency.len(), "dev_efficiency"),
            (self.mktg_efficiency.len(), "mktg_efficiency"),
        ];
        for (len, name) in series {
            if len != n {
                return Err(PlanError::Validation(format!(
                    "resource plan column '{name}' has {len} rows, expected {n}"
                )));
            }
        }
        Ok(())
    }

    pub fn horizon(&self) -> usize {
        self.months.len()
    }
}

/// Monthly and cumulative available work-hours per track.
#[derive(Debug, Clone)]
pub struct Capacity {
    pub months: Vec<String>,
    pub monthly_dev: Vec<f64>,
    pub monthly_mktg: Vec<f64>,
    pub cumulative_dev: Vec<f64>,
    pub cumulative_mktg: Vec<f64>,
}

impl Capacity {
    pub fn cumulative_for(&self, track: Track) -> &[f64] {
        match track {
            Track::Development => &self.cumulative_dev,
            Track::Marketing => &self.cumulative_mktg,
        }
    }

    pub fn to_dataframe(&self) -> Result<DataFrame, PlanError> {
        let df = DataFrame::new(vec![
            Column::new(capacity::MONTH.into(), &self.months),
            Column::new(capacity::DEV_HOURS.into(), &self.monthly_dev),
            Column::new(capacity::MKTG_HOURS.into(), &self.monthly_mktg),
            Column::new(capacity::CUM_DEV_HOURS.into(), &self.cumulative_dev),
            Column::new(capacity::CUM_MKTG_HOURS.into(), &self.cumulative_mktg),
        ])?;
        Ok(df)
    }
}

fn prefix_sum(monthly: &[f64]) -> Vec<f64> {
    let mut total = 0.0;
    monthly
        .iter()
        .map(|h| {
            total += h;
            total
        })
        .collect()
}

/// Convert the staffing plan into available hours per month and track.
///
/// When `milestones` contains a resolved "Marketing Foundation" milestone,
/// every month strictly after its completion loses
/// [`SALES_DIVERSION_HOURS`] of marketing capacity, clamped at zero.
/// Pass an empty slice for the first scheduling pass.
pub fn compute_capacity(
    plan: &ResourcePlan,
    config: &ScenarioConfig,
    milestones: &[Milestone],
) -> Result<Capacity, PlanError> {
    plan.validate()?;
    let n = plan.horizon();

    let mut monthly_dev = Vec::with_capacity(n);
    let mut monthly_mktg = Vec::with_capacity(n);
    for i in 0..n {
        let day_hours = HOURS_PER_DAY * plan.work_days[i];
        let dev_heads = plan.senior_devs[i] * config.dev_productivity
            + plan.intern_devs[i] * config.intern_productivity;
        monthly_dev.push(dev_heads * day_hours * plan.dev_efficiency[i]);

        let mktg_heads = plan.senior_marketers[i] * config.mktg_productivity
            + plan.intern_marketers[i] * config.intern_productivity;
        monthly_mktg.push(mktg_heads * day_hours * plan.mktg_efficiency[i]);
    }

    let foundation = find_milestone(milestones, tasks::MARKETING_FOUNDATION)
        .and_then(|m| m.month_index);
    if let Some(s) = foundation {
        for hours in monthly_mktg.iter_mut().skip(s + 1) {
            *hours = (*hours - SALES_DIVERSION_HOURS).max(0.0);
        }
    }

    Ok(Capacity {
        months: plan.months.clone(),
        cumulative_dev: prefix_sum(&monthly_dev),
        cumulative_mktg: prefix_sum(&monthly_mktg),
        monthly_dev,
        monthly_mktg,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schema::milestone;

    pub(crate) fn test_config() -> ScenarioConfig {
        use crate::config::GrowthFactors;
        let g = GrowthFactors {
            year_one: 2.0,
            year_two: 1.5,
        };
        ScenarioConfig {
            dev_productivity: 1.0,
            mktg_productivity: 1.0,
            intern_productivity: 0.5,
            subscription_growth: g,
            b2b_growth: g,
            marketplace_growth: g,
        }
    }

    pub(crate) fn test_plan(months: usize) -> ResourcePlan {
        ResourcePlan {
            months: (1..=months).map(|m| format!("M{m:02}")).collect(),
            work_days: vec![20.0; months],
            senior_devs: vec![2.0; months],
            intern_devs: vec![2.0; months],
            senior_marketers: vec![2.0; months],
            intern_marketers: vec![0.0; months],
            dev_efficiency: vec![1.0; months],
            mktg_efficiency: vec![1.0; months],
        }
    }

    fn foundation_at(index: usize) -> Milestone {
        Milestone {
            task: tasks::MARKETING_FOUNDATION.to_string(),
            sequence: 1,
            hours: 100,
            cumulative_hours: 100,
            month_index: Some(index),
            month: format!("M{:02}", index + 1),
            available_hours: 500.0,
            buffer_hours: 400.0,
            track: Track::Marketing,
        }
    }

    #[test]
    fn monthly_hours_follow_headcount_formula() {
        let cap = compute_capacity(&test_plan(3), &test_config(), &[]).unwrap();
        // (2*1.0 + 2*0.5) * 8 * 20 * 1.0 = 480 dev hours
        assert_eq!(cap.monthly_dev[0], 480.0);
        // (2*1.0 + 0*0.5) * 8 * 20 * 1.0 = 320 marketing hours
        assert_eq!(cap.monthly_mktg[0], 320.0);
    }

    #[test]
    fn cumulative_series_are_monotonic() {
        let mut plan = test_plan(6);
        plan.work_days = vec![20.0, 0.0, 15.0, 22.0, 0.0, 18.0];
        let cap = compute_capacity(&plan, &test_config(), &[]).unwrap();
        for w in cap.cumulative_dev.windows(2) {
            assert!(w[1] >= w[0]);
        }
        for w in cap.cumulative_mktg.windows(2) {
            assert!(w[1] >= w[0]);
        }
    }

    #[test]
    fn sales_diversion_starts_strictly_after_foundation_month() {
        let plan = test_plan(5);
        let base = compute_capacity(&plan, &test_config(), &[]).unwrap();
        let cap = compute_capacity(&plan, &test_config(), &[foundation_at(1)]).unwrap();
        assert_eq!(cap.monthly_mktg[0], base.monthly_mktg[0]);
        assert_eq!(cap.monthly_mktg[1], base.monthly_mktg[1]);
        for i in 2..5 {
            assert_eq!(cap.monthly_mktg[i], base.monthly_mktg[i] - SALES_DIVERSION_HOURS);
        }
        assert_eq!(cap.monthly_dev, base.monthly_dev);
    }

    #[test]
    fn sales_diversion_clamps_at_zero() {
        let mut plan = test_plan(3);
        plan.senior_marketers = vec![2.0, 2.0, 0.1];
        let cap = compute_capacity(&plan, &test_config(), &[foundation_at(0)]).unwrap();
        // 0.1 * 8 * 20 = 16 hours, well under the 240-hour diversion.
        assert_eq!(cap.monthly_mktg[2], 0.0);
    }

    #[test]
    fn unresolved_foundation_milestone_leaves_capacity_untouched() {
        let plan = test_plan(4);
        let mut beyond = foundation_at(0);
        beyond.month_index = None;
        beyond.month = milestone::BEYOND_PLAN.to_string();
        let base = compute_capacity(&plan, &test_config(), &[]).unwrap();
        let cap = compute_capacity(&plan, &test_config(), &[beyond]).unwrap();
        assert_eq!(cap.monthly_mktg, base.monthly_mktg);
    }

    #[test]
    fn misaligned_plan_fails_loudly() {
        let mut plan = test_plan(4);
        plan.work_days.pop();
        assert!(compute_capacity(&plan, &test_config(), &[]).is_err());
    }
}
