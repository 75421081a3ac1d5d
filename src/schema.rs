/// Column-name and label constants for plan-forecastkit.
/// Single source of truth - exported to Python via PyO3.

// ── Resource plan columns ───────────────────────────────────────────────────
pub mod resource {
    pub const MONTH: &str = "month";
    pub const WORK_DAYS: &str = "work_days";
    pub const SENIOR_DEVS: &str = "senior_devs";
    pub const INTERN_DEVS: &str = "intern_devs";
    pub const SENIOR_MARKETERS: &str = "senior_marketers";
    pub const INTERN_MARKETERS: &str = "intern_marketers";
    pub const DEV_EFFICIENCY: &str = "dev_efficiency";
    pub const MKTG_EFFICIENCY: &str = "mktg_efficiency";

    pub const ALL: [&str; 8] = [
        MONTH,
        WORK_DAYS,
        SENIOR_DEVS,
        INTERN_DEVS,
        SENIOR_MARKETERS,
        INTERN_MARKETERS,
        DEV_EFFICIENCY,
        MKTG_EFFICIENCY,
    ];
}

// ── Task list columns ───────────────────────────────────────────────────────
pub mod task {
    pub const NAME: &str = "task";
    pub const HOURS: &str = "hours";
    pub const SEQUENCE: &str = "sequence";
    pub const TRACK: &str = "track";

    pub const ALL: [&str; 4] = [NAME, HOURS, SEQUENCE, TRACK];
}

// ── Track labels ────────────────────────────────────────────────────────────
pub mod track {
    pub const DEVELOPMENT: &str = "Development";
    pub const MARKETING: &str = "Marketing";
}

// ── Capacity columns ────────────────────────────────────────────────────────
pub mod capacity {
    pub const MONTH: &str = "month";
    pub const DEV_HOURS: &str = "dev_hours";
    pub const MKTG_HOURS: &str = "mktg_hours";
    pub const CUM_DEV_HOURS: &str = "cum_dev_hours";
    pub const CUM_MKTG_HOURS: &str = "cum_mktg_hours";
}

// ── Milestone columns and sentinel ──────────────────────────────────────────
pub mod milestone {
    pub const TASK: &str = "task";
    pub const SEQUENCE: &str = "sequence";
    pub const HOURS: &str = "hours";
    pub const CUM_HOURS: &str = "cum_hours";
    pub const COMPLETION_MONTH: &str = "completion_month";
    pub const AVAILABLE_HOURS: &str = "available_hours";
    pub const BUFFER_HOURS: &str = "buffer_hours";
    pub const TRACK: &str = "track";

    /// Required cumulative effort is never met within the modeled horizon.
    pub const BEYOND_PLAN: &str = "Beyond Plan";
}

// ── Well-known task names ───────────────────────────────────────────────────
pub mod tasks {
    /// Marketing milestone that frees one senior marketer for sales.
    pub const MARKETING_FOUNDATION: &str = "Marketing Foundation";
    /// Gates the tiered B2B product (sales start 2 months later).
    pub const B2B_PORTAL_LAUNCH: &str = "B2B Portal Launch";
    /// Gates the marketplace product (sales start 1 month later).
    pub const MARKETPLACE_LAUNCH: &str = "Marketplace Launch";

    /// Synthetic catch-all appended to the Development track.
    pub const DEV_CATCH_ALL: &str = "Future Project Development";
    /// Synthetic catch-all appended to the Marketing track.
    pub const MKTG_CATCH_ALL: &str = "Executing Mktg & Sales";
}

// ── Product keys ────────────────────────────────────────────────────────────
pub mod products {
    pub const SUBSCRIPTION: &str = "subscription";
    pub const B2B: &str = "b2b";
    pub const MARKETPLACE: &str = "marketplace";
}

// ── B2B customer tiers ──────────────────────────────────────────────────────
pub mod tiers {
    pub const SOLO: &str = "solo";
    pub const SMALL: &str = "small";
    pub const MEDIUM: &str = "medium";
    pub const LARGE: &str = "large";
    pub const BIGLAW: &str = "biglaw";

    pub const ALL: [&str; 5] = [SOLO, SMALL, MEDIUM, LARGE, BIGLAW];
}

// ── Configuration keys ──────────────────────────────────────────────────────
pub mod config {
    pub const DEV_PRODUCTIVITY: &str = "dev_productivity";
    pub const MKTG_PRODUCTIVITY: &str = "mktg_productivity";
    pub const INTERN_PRODUCTIVITY: &str = "intern_productivity";

    pub const SUBSCRIPTION_GROWTH_12M: &str = "subscription_growth_12m";
    pub const SUBSCRIPTION_GROWTH_24M: &str = "subscription_growth_24m";
    pub const B2B_GROWTH_12M: &str = "b2b_growth_12m";
    pub const B2B_GROWTH_24M: &str = "b2b_growth_24m";
    pub const MARKETPLACE_GROWTH_12M: &str = "marketplace_growth_12m";
    pub const MARKETPLACE_GROWTH_24M: &str = "marketplace_growth_24m";
    /// Misspelled variant of MARKETPLACE_GROWTH_24M accepted on lookup.
    pub const MARKETPLACE_GROWTH_24M_ALIAS: &str = "markeplace_growth_24m";
}

// ── Forecast columns ────────────────────────────────────────────────────────
pub mod forecast {
    pub const MONTH: &str = "month";
    pub const CHURN_RATE: &str = "churn_rate";
    pub const REVENUE_K: &str = "revenue_k";

    pub const NEW_CUSTOMERS: &str = "new_customers";
    pub const PURCHASE_RATE: &str = "purchase_rate";
    pub const ACTIVE_CUSTOMERS: &str = "active_customers";

    pub const NEW_FIRMS: &str = "new_firms";
    pub const ACTIVE_FIRMS: &str = "active_firms";

    pub const NEW_CLIENTS: &str = "new_clients";
    pub const MATCHES: &str = "matches";
    pub const ACTIVE_CLIENTS: &str = "active_clients";
}
