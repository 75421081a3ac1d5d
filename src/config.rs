use std::collections::HashMap;

use crate::error::PlanError;
use crate::schema::{config, products, tiers};

/// Fallback for the marketplace year-two growth factor when neither the
/// canonical key nor its misspelled alias is present.
pub const DEFAULT_MARKETPLACE_GROWTH_24M: f64 = 1.25;

/// Two-regime compound growth factors for one product.
#[derive(Debug, Clone, Copy)]
pub struct GrowthFactors {
    /// Compounds over the product's first 12 active months.
    pub year_one: f64,
    /// Compounds over active months 13+.
    pub year_two: f64,
}

/// Scalar configuration built once from the loader's flat key → value map.
///
/// The core never re-reads the map after construction; a missing key is
/// fatal here, with one documented exception (see
/// [`DEFAULT_MARKETPLACE_GROWTH_24M`]).
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub dev_productivity: f64,
    pub mktg_productivity: f64,
    pub intern_productivity: f64,
    pub subscription_growth: GrowthFactors,
    pub b2b_growth: GrowthFactors,
    pub marketplace_growth: GrowthFactors,
}

impl ScenarioConfig {
    pub fn from_values(values: &HashMap<String, f64>) -> Result<Self, PlanError> {
        let get = |key: &str| -> Result<f64, PlanError> {
            values
                .get(key)
                .copied()
                .ok_or_else(|| PlanError::MissingConfig(key.to_string()))
        };

        // Both spellings of the marketplace 24m key occur in existing
        // scenario files; keep accepting both rather than picking one.
        let marketplace_24m = values
            .get(config::MARKETPLACE_GROWTH_24M)
            .or_else(|| values.get(config::MARKETPLACE_GROWTH_24M_ALIAS))
            .copied()
            .unwrap_or(DEFAULT_MARKETPLACE_GROWTH_24M);

        Ok(Self {
            dev_productivity: get(config::DEV_PRODUCTIVITY)?,
            mktg_productivity: get(config::MKTG_PRODUCTIVITY)?,
            intern_productivity: get(config::INTERN_PRODUCTIVITY)?,
            subscription_growth: GrowthFactors {
                year_one: get(config::SUBSCRIPTION_GROWTH_12M)?,
                year_two: get(config::SUBSCRIPTION_GROWTH_24M)?,
            },
            b2b_growth: GrowthFactors {
                year_one: get(config::B2B_GROWTH_12M)?,
                year_two: get(config::B2B_GROWTH_24M)?,
            },
            marketplace_growth: GrowthFactors {
                year_one: get(config::MARKETPLACE_GROWTH_12M)?,
                year_two: marketplace_24m,
            },
        })
    }
}

// ── Per-product probability parameters ──────────────────────────────────────

/// A rate checkpoint: from `month` (1-indexed plan month) onwards the
/// arrival rate restarts at `rate` and compounds forward from there.
#[derive(Debug, Clone, Copy)]
pub struct RateCheckpoint {
    pub month: usize,
    pub rate: f64,
}

#[derive(Debug, Clone)]
pub struct SubscriptionParams {
    /// 1-indexed plan month at which sales open.
    pub sales_start_month: usize,
    pub base_rate: f64,
    pub checkpoints: Vec<RateCheckpoint>,
    pub churn_alpha: f64,
    pub churn_beta: f64,
    pub purchase_alpha: f64,
    pub purchase_beta: f64,
    pub unit_price: f64,
}

#[derive(Debug, Clone)]
pub struct B2bParams {
    /// Monthly arrival rate per tier, indexed like [`tiers::ALL`].
    pub tier_rates: [f64; 5],
    /// Revenue multiplier per tier, indexed like [`tiers::ALL`].
    pub tier_multipliers: [f64; 5],
    pub base_monthly_cost: f64,
    pub churn_alpha: f64,
    pub churn_beta: f64,
}

#[derive(Debug, Clone)]
pub struct MarketplaceParams {
    pub base_rate: f64,
    pub checkpoints: Vec<RateCheckpoint>,
    pub churn_alpha: f64,
    pub churn_beta: f64,
    pub match_alpha: f64,
    pub match_beta: f64,
    pub price_per_match: f64,
}

/// The three products' parameter sets; all are required.
#[derive(Debug, Clone)]
pub struct ProductParamSet {
    pub subscription: SubscriptionParams,
    pub b2b: B2bParams,
    pub marketplace: MarketplaceParams,
}

fn required(
    values: &HashMap<String, f64>,
    product: &str,
    key: &str,
) -> Result<f64, PlanError> {
    values
        .get(key)
        .copied()
        .ok_or_else(|| PlanError::MissingParameter(format!("{product}.{key}")))
}

/// A parameter holding a 1-indexed plan month.
fn required_month(
    values: &HashMap<String, f64>,
    product: &str,
    key: &str,
) -> Result<usize, PlanError> {
    let raw = required(values, product, key)?;
    let month = raw.round();
    if month < 1.0 {
        return Err(PlanError::Validation(format!(
            "{product}.{key} must be a 1-indexed month, got {raw}"
        )));
    }
    Ok(month as usize)
}

impl SubscriptionParams {
    pub fn from_values(values: &HashMap<String, f64>) -> Result<Self, PlanError> {
        let p = products::SUBSCRIPTION;
        let mut checkpoints = Vec::with_capacity(3);
        for k in 1..=3 {
            checkpoints.push(RateCheckpoint {
                month: required_month(values, p, &format!("reset_month_{k}"))?,
                rate: required(values, p, &format!("reset_rate_{k}"))?,
            });
        }
        Ok(Self {
            sales_start_month: required_month(values, p, "sales_start_month")?,
            base_rate: required(values, p, "base_signup_rate")?,
            checkpoints,
            churn_alpha: required(values, p, "churn_alpha")?,
            churn_beta: required(values, p, "churn_beta")?,
            purchase_alpha: required(values, p, "purchase_alpha")?,
            purchase_beta: required(values, p, "purchase_beta")?,
            unit_price: required(values, p, "unit_price")?,
        })
    }
}

impl B2bParams {
    pub fn from_values(values: &HashMap<String, f64>) -> Result<Self, PlanError> {
        let p = products::B2B;
        let mut tier_rates = [0.0; 5];
        let mut tier_multipliers = [0.0; 5];
        for (i, tier) in tiers::ALL.iter().enumerate() {
            tier_rates[i] = required(values, p, &format!("{tier}_rate"))?;
            tier_multipliers[i] = required(values, p, &format!("{tier}_multiplier"))?;
        }
        Ok(Self {
            tier_rates,
            tier_multipliers,
            base_monthly_cost: required(values, p, "base_monthly_cost")?,
            churn_alpha: required(values, p, "churn_alpha")?,
            churn_beta: required(values, p, "churn_beta")?,
        })
    }
}

impl MarketplaceParams {
    pub fn from_values(values: &HashMap<String, f64>) -> Result<Self, PlanError> {
        let p = products::MARKETPLACE;
        let mut checkpoints = Vec::with_capacity(2);
        for k in 1..=2 {
            checkpoints.push(RateCheckpoint {
                month: required_month(values, p, &format!("reset_month_{k}"))?,
                rate: required(values, p, &format!("reset_rate_{k}"))?,
            });
        }
        Ok(Self {
            base_rate: required(values, p, "base_client_rate")?,
            checkpoints,
            churn_alpha: required(values, p, "churn_alpha")?,
            churn_beta: required(values, p, "churn_beta")?,
            match_alpha: required(values, p, "match_alpha")?,
            match_beta: required(values, p, "match_beta")?,
            price_per_match: required(values, p, "price_per_match")?,
        })
    }
}

impl ProductParamSet {
    pub fn from_nested(
        params: &HashMap<String, HashMap<String, f64>>,
    ) -> Result<Self, PlanError> {
        let product = |name: &str| -> Result<&HashMap<String, f64>, PlanError> {
            params
                .get(name)
                .ok_or_else(|| PlanError::MissingProduct(name.to_string()))
        };
        Ok(Self {
            subscription: SubscriptionParams::from_values(product(products::SUBSCRIPTION)?)?,
            b2b: B2bParams::from_values(product(products::B2B)?)?,
            marketplace: MarketplaceParams::from_values(product(products::MARKETPLACE)?)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_config() -> HashMap<String, f64> {
        [
            (config::DEV_PRODUCTIVITY, 0.8),
            (config::MKTG_PRODUCTIVITY, 0.75),
            (config::INTERN_PRODUCTIVITY, 0.4),
            (config::SUBSCRIPTION_GROWTH_12M, 3.0),
            (config::SUBSCRIPTION_GROWTH_24M, 1.8),
            (config::B2B_GROWTH_12M, 2.5),
            (config::B2B_GROWTH_24M, 1.6),
            (config::MARKETPLACE_GROWTH_12M, 4.0),
            (config::MARKETPLACE_GROWTH_24M, 2.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    #[test]
    fn missing_productivity_key_is_fatal() {
        let mut values = full_config();
        values.remove(config::MKTG_PRODUCTIVITY);
        let err = ScenarioConfig::from_values(&values).unwrap_err();
        assert!(matches!(err, PlanError::MissingConfig(k) if k == config::MKTG_PRODUCTIVITY));
    }

    #[test]
    fn marketplace_24m_accepts_misspelled_alias() {
        let mut values = full_config();
        values.remove(config::MARKETPLACE_GROWTH_24M);
        values.insert(config::MARKETPLACE_GROWTH_24M_ALIAS.to_string(), 2.2);
        let cfg = ScenarioConfig::from_values(&values).unwrap();
        assert_eq!(cfg.marketplace_growth.year_two, 2.2);
    }

    #[test]
    fn marketplace_24m_falls_back_when_both_spellings_absent() {
        let mut values = full_config();
        values.remove(config::MARKETPLACE_GROWTH_24M);
        let cfg = ScenarioConfig::from_values(&values).unwrap();
        assert_eq!(cfg.marketplace_growth.year_two, DEFAULT_MARKETPLACE_GROWTH_24M);
    }

    #[test]
    fn canonical_spelling_wins_over_alias() {
        let mut values = full_config();
        values.insert(config::MARKETPLACE_GROWTH_24M_ALIAS.to_string(), 9.9);
        let cfg = ScenarioConfig::from_values(&values).unwrap();
        assert_eq!(cfg.marketplace_growth.year_two, 2.0);
    }

    #[test]
    fn missing_product_parameter_names_product_and_key() {
        let mut values = HashMap::new();
        values.insert("churn_alpha".to_string(), 2.0);
        let err = B2bParams::from_values(&values).unwrap_err();
        assert!(matches!(err, PlanError::MissingParameter(k) if k == "b2b.solo_rate"));
    }

    #[test]
    fn month_parameters_must_be_at_least_one() {
        let mut values: HashMap<String, f64> = [
            ("sales_start_month", 0.0),
            ("base_signup_rate", 5.0),
            ("reset_month_1", 3.0),
            ("reset_rate_1", 10.0),
            ("reset_month_2", 6.0),
            ("reset_rate_2", 20.0),
            ("reset_month_3", 9.0),
            ("reset_rate_3", 30.0),
            ("churn_alpha", 2.0),
            ("churn_beta", 8.0),
            ("purchase_alpha", 3.0),
            ("purchase_beta", 5.0),
            ("unit_price", 29.0),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        assert!(SubscriptionParams::from_values(&values).is_err());
        values.insert("sales_start_month".to_string(), 4.0);
        assert!(SubscriptionParams::from_values(&values).is_ok());
    }
}
