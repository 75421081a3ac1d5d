//! Single-draw stochastic revenue forecasts for the three product lines.
//!
//! Every simulated value comes from one seedable RNG stream. Draw order is
//! fixed: months chronologically; within a month, subscription then B2B
//! then marketplace; within a product, arrival draws (B2B tiers in
//! [`crate::schema::tiers::ALL`] order), then the churn draw, then the
//! product's metric draw. A zero arrival rate consumes no draw.

use polars::prelude::*;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::{Beta, Poisson};

use crate::config::{
    B2bParams, GrowthFactors, MarketplaceParams, ProductParamSet, RateCheckpoint,
    ScenarioConfig, SubscriptionParams,
};
use crate::error::PlanError;
use crate::schedule::{find_milestone, Milestone};
use crate::schema::{forecast, tasks, tiers};

/// Months between the B2B portal milestone and the first possible sale.
pub const B2B_SALES_LAG_MONTHS: usize = 2;
/// Months between the marketplace milestone and the first possible sale.
pub const MARKETPLACE_SALES_LAG_MONTHS: usize = 1;

// ── Compound growth ─────────────────────────────────────────────────────────

/// Two-regime multiplicative growth applied to an arrival rate.
///
/// `growth_month` is 1-indexed from the rate's start month: year one
/// compounds `year_one` over twelve months; from month 13 the full
/// `year_one` factor is locked in and `year_two` compounds on top.
pub fn compound_growth(base: f64, growth_month: u32, growth: GrowthFactors) -> f64 {
    if growth_month <= 12 {
        base * growth.year_one.powf(f64::from(growth_month) / 12.0)
    } else {
        base * growth.year_one * growth.year_two.powf(f64::from(growth_month - 12) / 12.0)
    }
}

/// Rate for month `index`, growing from the latest checkpoint at or before
/// it (falling back to `base` compounding from `start`). `checkpoints`
/// hold 0-based month indexes here; earlier-than-start checkpoints are
/// ignored.
fn segment_rate(
    start: usize,
    base: f64,
    checkpoints: &[(usize, f64)],
    index: usize,
    growth: GrowthFactors,
) -> f64 {
    let (seg_start, seg_base) = checkpoints
        .iter()
        .filter(|(month, _)| *month >= start && *month <= index)
        .max_by_key(|(month, _)| *month)
        .map_or((start, base), |&(month, rate)| (month, rate));
    compound_growth(seg_base, (index - seg_start + 1) as u32, growth)
}

/// First month index (0-based) at which a milestone-gated product may
/// sell, or `None` when the gate never opens within the horizon.
pub fn sales_start_index(
    milestones: &[Milestone],
    milestone_name: &str,
    lag_months: usize,
) -> Option<usize> {
    find_milestone(milestones, milestone_name)
        .and_then(|m| m.month_index)
        .map(|index| index + lag_months)
}

// ── Random draws ────────────────────────────────────────────────────────────

fn poisson_count(rng: &mut StdRng, rate: f64) -> Result<u64, PlanError> {
    if rate <= 0.0 {
        return Ok(0);
    }
    let poisson = Poisson::new(rate).map_err(|e| PlanError::Distribution(e.to_string()))?;
    Ok(Distribution::<f64>::sample(&poisson, rng) as u64)
}

fn beta_dist(alpha: f64, beta: f64) -> Result<Beta, PlanError> {
    Beta::new(alpha, beta).map_err(|e| PlanError::Distribution(e.to_string()))
}

/// Convert an annual churn rate to the monthly rate applied to totals.
fn monthly_churn(annual: f64) -> f64 {
    1.0 - (1.0 - annual).powf(1.0 / 12.0)
}

// ── Monthly records ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionMonth {
    pub month: String,
    pub new_customers: u64,
    pub purchase_rate: f64,
    pub churn_rate: f64,
    pub active_customers: f64,
    pub revenue_k: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct B2bMonth {
    pub month: String,
    pub new_firms: u64,
    /// Active firms per tier, indexed like [`tiers::ALL`], reported rounded.
    pub tier_actives: [f64; 5],
    pub churn_rate: f64,
    pub active_firms: f64,
    pub revenue_k: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketplaceMonth {
    pub month: String,
    pub new_clients: u64,
    pub matches: f64,
    pub churn_rate: f64,
    pub active_clients: f64,
    pub revenue_k: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastBundle {
    pub subscription: Vec<SubscriptionMonth>,
    pub b2b: Vec<B2bMonth>,
    pub marketplace: Vec<MarketplaceMonth>,
}

// ── Product simulators ──────────────────────────────────────────────────────

struct SubscriptionSim {
    start: usize,
    base_rate: f64,
    checkpoints: Vec<(usize, f64)>,
    growth: GrowthFactors,
    churn: Beta,
    purchase: Beta,
    unit_price: f64,
    active: f64,
}

impl SubscriptionSim {
    fn new(params: &SubscriptionParams, growth: GrowthFactors) -> Result<Self, PlanError> {
        Ok(Self {
            start: params.sales_start_month - 1,
            base_rate: params.base_rate,
            checkpoints: to_indexes(&params.checkpoints),
            growth,
            churn: beta_dist(params.churn_alpha, params.churn_beta)?,
            purchase: beta_dist(params.purchase_alpha, params.purchase_beta)?,
            unit_price: params.unit_price,
            active: 0.0,
        })
    }

    fn step(
        &mut self,
        index: usize,
        month: &str,
        rng: &mut StdRng,
    ) -> Result<SubscriptionMonth, PlanError> {
        let rate = if index < self.start {
            0.0
        } else {
            segment_rate(self.start, self.base_rate, &self.checkpoints, index, self.growth)
        };
        let new_customers = poisson_count(rng, rate)?;
        let churn = monthly_churn(self.churn.sample(rng));
        let purchase_rate = self.purchase.sample(rng);

        self.active = self.active * (1.0 - churn) + new_customers as f64;
        let revenue_k = self.active * purchase_rate * self.unit_price / 1000.0;

        Ok(SubscriptionMonth {
            month: month.to_string(),
            new_customers,
            purchase_rate,
            churn_rate: churn,
            active_customers: self.active.round(),
            revenue_k,
        })
    }
}

struct B2bSim {
    start: Option<usize>,
    tier_rates: [f64; 5],
    tier_multipliers: [f64; 5],
    base_monthly_cost: f64,
    growth: GrowthFactors,
    churn: Beta,
    actives: [f64; 5],
}

impl B2bSim {
    fn new(
        params: &B2bParams,
        growth: GrowthFactors,
        start: Option<usize>,
    ) -> Result<Self, PlanError> {
        Ok(Self {
            start,
            tier_rates: params.tier_rates,
            tier_multipliers: params.tier_multipliers,
            base_monthly_cost: params.base_monthly_cost,
            growth,
            churn: beta_dist(params.churn_alpha, params.churn_beta)?,
            actives: [0.0; 5],
        })
    }

    fn step(
        &mut self,
        index: usize,
        month: &str,
        rng: &mut StdRng,
    ) -> Result<B2bMonth, PlanError> {
        let growth_month = match self.start {
            Some(start) if index >= start => Some((index - start + 1) as u32),
            _ => None,
        };

        let mut arrivals = [0u64; 5];
        for (tier, arrived) in arrivals.iter_mut().enumerate() {
            let rate = match growth_month {
                Some(m) => compound_growth(self.tier_rates[tier], m, self.growth),
                None => 0.0,
            };
            *arrived = poisson_count(rng, rate)?;
        }
        let churn = monthly_churn(self.churn.sample(rng));

        let mut revenue = 0.0;
        for tier in 0..5 {
            self.actives[tier] =
                self.actives[tier] * (1.0 - churn) + arrivals[tier] as f64;
            revenue += self.actives[tier] * self.tier_multipliers[tier];
        }
        revenue *= self.base_monthly_cost;

        let mut tier_actives = [0.0; 5];
        for tier in 0..5 {
            tier_actives[tier] = self.actives[tier].round();
        }

        Ok(B2bMonth {
            month: month.to_string(),
            new_firms: arrivals.iter().sum(),
            tier_actives,
            churn_rate: churn,
            active_firms: self.actives.iter().sum::<f64>().round(),
            revenue_k: revenue / 1000.0,
        })
    }
}

struct MarketplaceSim {
    start: Option<usize>,
    base_rate: f64,
    checkpoints: Vec<(usize, f64)>,
    growth: GrowthFactors,
    churn: Beta,
    matches: Beta,
    price_per_match: f64,
    active: f64,
}

impl MarketplaceSim {
    fn new(
        params: &MarketplaceParams,
        growth: GrowthFactors,
        start: Option<usize>,
    ) -> Result<Self, PlanError> {
        Ok(Self {
            start,
            base_rate: params.base_rate,
            checkpoints: to_indexes(&params.checkpoints),
            growth,
            churn: beta_dist(params.churn_alpha, params.churn_beta)?,
            matches: beta_dist(params.match_alpha, params.match_beta)?,
            price_per_match: params.price_per_match,
            active: 0.0,
        })
    }

    fn step(
        &mut self,
        index: usize,
        month: &str,
        rng: &mut StdRng,
    ) -> Result<MarketplaceMonth, PlanError> {
        let rate = match self.start {
            Some(start) if index >= start => {
                segment_rate(start, self.base_rate, &self.checkpoints, index, self.growth)
            }
            _ => 0.0,
        };
        let new_clients = poisson_count(rng, rate)?;
        let churn = monthly_churn(self.churn.sample(rng));
        let match_rate = self.matches.sample(rng);

        self.active = self.active * (1.0 - churn) + new_clients as f64;
        let matches = self.active * match_rate;
        let revenue_k = matches * self.price_per_match / 1000.0;

        Ok(MarketplaceMonth {
            month: month.to_string(),
            new_clients,
            matches: matches.round(),
            churn_rate: churn,
            active_clients: self.active.round(),
            revenue_k,
        })
    }
}

/// 1-indexed checkpoint months → 0-based month indexes.
fn to_indexes(checkpoints: &[RateCheckpoint]) -> Vec<(usize, f64)> {
    checkpoints.iter().map(|c| (c.month - 1, c.rate)).collect()
}

// ── Forecast run ────────────────────────────────────────────────────────────

/// Simulate all three products over the plan horizon from one seeded RNG.
///
/// `milestones` must be the authoritative (pass-2) schedule: the B2B and
/// marketplace gates are derived from it, and a Beyond Plan gate keeps the
/// product at zero activity for the whole horizon.
pub fn run_forecasts(
    months: &[String],
    milestones: &[Milestone],
    config: &ScenarioConfig,
    params: &ProductParamSet,
    seed: u64,
) -> Result<ForecastBundle, PlanError> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut subscription =
        SubscriptionSim::new(&params.subscription, config.subscription_growth)?;
    let mut b2b = B2bSim::new(
        &params.b2b,
        config.b2b_growth,
        sales_start_index(milestones, tasks::B2B_PORTAL_LAUNCH, B2B_SALES_LAG_MONTHS),
    )?;
    let mut marketplace = MarketplaceSim::new(
        &params.marketplace,
        config.marketplace_growth,
        sales_start_index(
            milestones,
            tasks::MARKETPLACE_LAUNCH,
            MARKETPLACE_SALES_LAG_MONTHS,
        ),
    )?;

    let mut bundle = ForecastBundle {
        subscription: Vec::with_capacity(months.len()),
        b2b: Vec::with_capacity(months.len()),
        marketplace: Vec::with_capacity(months.len()),
    };
    for (index, month) in months.iter().enumerate() {
        bundle
            .subscription
            .push(subscription.step(index, month, &mut rng)?);
        bundle.b2b.push(b2b.step(index, month, &mut rng)?);
        bundle
            .marketplace
            .push(marketplace.step(index, month, &mut rng)?);
    }
    Ok(bundle)
}

// ── Report tables ───────────────────────────────────────────────────────────

pub fn subscription_to_dataframe(
    records: &[SubscriptionMonth],
) -> Result<DataFrame, PlanError> {
    let months: Vec<&str> = records.iter().map(|r| r.month.as_str()).collect();
    let new_customers: Vec<u64> = records.iter().map(|r| r.new_customers).collect();
    let purchase_rates: Vec<f64> = records.iter().map(|r| r.purchase_rate).collect();
    let churn_rates: Vec<f64> = records.iter().map(|r| r.churn_rate).collect();
    let actives: Vec<f64> = records.iter().map(|r| r.active_customers).collect();
    let revenues: Vec<f64> = records.iter().map(|r| r.revenue_k).collect();

    let df = DataFrame::new(vec![
        Column::new(forecast::MONTH.into(), &months),
        Column::new(forecast::NEW_CUSTOMERS.into(), &new_customers),
        Column::new(forecast::PURCHASE_RATE.into(), &purchase_rates),
        Column::new(forecast::CHURN_RATE.into(), &churn_rates),
        Column::new(forecast::ACTIVE_CUSTOMERS.into(), &actives),
        Column::new(forecast::REVENUE_K.into(), &revenues),
    ])?;
    Ok(df)
}

pub fn b2b_to_dataframe(records: &[B2bMonth]) -> Result<DataFrame, PlanError> {
    let months: Vec<&str> = records.iter().map(|r| r.month.as_str()).collect();
    let new_firms: Vec<u64> = records.iter().map(|r| r.new_firms).collect();
    let churn_rates: Vec<f64> = records.iter().map(|r| r.churn_rate).collect();
    let actives: Vec<f64> = records.iter().map(|r| r.active_firms).collect();
    let revenues: Vec<f64> = records.iter().map(|r| r.revenue_k).collect();

    let mut columns = vec![
        Column::new(forecast::MONTH.into(), &months),
        Column::new(forecast::NEW_FIRMS.into(), &new_firms),
    ];
    for (tier, name) in tiers::ALL.iter().enumerate() {
        let values: Vec<f64> = records.iter().map(|r| r.tier_actives[tier]).collect();
        columns.push(Column::new((*name).into(), &values));
    }
    columns.push(Column::new(forecast::CHURN_RATE.into(), &churn_rates));
    columns.push(Column::new(forecast::ACTIVE_FIRMS.into(), &actives));
    columns.push(Column::new(forecast::REVENUE_K.into(), &revenues));

    let df = DataFrame::new(columns)?;
    Ok(df)
}

pub fn marketplace_to_dataframe(
    records: &[MarketplaceMonth],
) -> Result<DataFrame, PlanError> {
    let months: Vec<&str> = records.iter().map(|r| r.month.as_str()).collect();
    let new_clients: Vec<u64> = records.iter().map(|r| r.new_clients).collect();
    let matches: Vec<f64> = records.iter().map(|r| r.matches).collect();
    let churn_rates: Vec<f64> = records.iter().map(|r| r.churn_rate).collect();
    let actives: Vec<f64> = records.iter().map(|r| r.active_clients).collect();
    let revenues: Vec<f64> = records.iter().map(|r| r.revenue_k).collect();

    let df = DataFrame::new(vec![
        Column::new(forecast::MONTH.into(), &months),
        Column::new(forecast::NEW_CLIENTS.into(), &new_clients),
        Column::new(forecast::MATCHES.into(), &matches),
        Column::new(forecast::CHURN_RATE.into(), &churn_rates),
        Column::new(forecast::ACTIVE_CLIENTS.into(), &actives),
        Column::new(forecast::REVENUE_K.into(), &revenues),
    ])?;
    Ok(df)
}
