use pyo3::prelude::*;
use pyo3::types::PyModule;

mod capacity;
mod config;
mod error;
mod forecast;
mod model;
mod schedule;
mod schema;

use model::PlanModel;

/// Export schema constants as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Track
    let track = PyModule::new(m.py(), "track")?;
    track.add("DEVELOPMENT", schema::track::DEVELOPMENT)?;
    track.add("MARKETING", schema::track::MARKETING)?;
    m.add_submodule(&track)?;

    // Resource plan
    let resource = PyModule::new(m.py(), "resource")?;
    resource.add("MONTH", schema::resource::MONTH)?;
    resource.add("WORK_DAYS", schema::resource::WORK_DAYS)?;
    resource.add("SENIOR_DEVS", schema::resource::SENIOR_DEVS)?;
    resource.add("INTERN_DEVS", schema::resource::INTERN_DEVS)?;
    resource.add("SENIOR_MARKETERS", schema::resource::SENIOR_MARKETERS)?;
    resource.add("INTERN_MARKETERS", schema::resource::INTERN_MARKETERS)?;
    resource.add("DEV_EFFICIENCY", schema::resource::DEV_EFFICIENCY)?;
    resource.add("MKTG_EFFICIENCY", schema::resource::MKTG_EFFICIENCY)?;
    m.add_submodule(&resource)?;

    // Task list
    let task = PyModule::new(m.py(), "task")?;
    task.add("NAME", schema::task::NAME)?;
    task.add("HOURS", schema::task::HOURS)?;
    task.add("SEQUENCE", schema::task::SEQUENCE)?;
    task.add("TRACK", schema::task::TRACK)?;
    m.add_submodule(&task)?;

    // Well-known task names
    let tasks = PyModule::new(m.py(), "tasks")?;
    tasks.add("MARKETING_FOUNDATION", schema::tasks::MARKETING_FOUNDATION)?;
    tasks.add("B2B_PORTAL_LAUNCH", schema::tasks::B2B_PORTAL_LAUNCH)?;
    tasks.add("MARKETPLACE_LAUNCH", schema::tasks::MARKETPLACE_LAUNCH)?;
    tasks.add("DEV_CATCH_ALL", schema::tasks::DEV_CATCH_ALL)?;
    tasks.add("MKTG_CATCH_ALL", schema::tasks::MKTG_CATCH_ALL)?;
    m.add_submodule(&tasks)?;

    // Capacity
    let capacity = PyModule::new(m.py(), "capacity")?;
    capacity.add("MONTH", schema::capacity::MONTH)?;
    capacity.add("DEV_HOURS", schema::capacity::DEV_HOURS)?;
    capacity.add("MKTG_HOURS", schema::capacity::MKTG_HOURS)?;
    capacity.add("CUM_DEV_HOURS", schema::capacity::CUM_DEV_HOURS)?;
    capacity.add("CUM_MKTG_HOURS", schema::capacity::CUM_MKTG_HOURS)?;
    m.add_submodule(&capacity)?;

    // Milestones
    let milestone = PyModule::new(m.py(), "milestone")?;
    milestone.add("TASK", schema::milestone::TASK)?;
    milestone.add("SEQUENCE", schema::milestone::SEQUENCE)?;
    milestone.add("HOURS", schema::milestone::HOURS)?;
    milestone.add("CUM_HOURS", schema::milestone::CUM_HOURS)?;
    milestone.add("COMPLETION_MONTH", schema::milestone::COMPLETION_MONTH)?;
    milestone.add("AVAILABLE_HOURS", schema::milestone::AVAILABLE_HOURS)?;
    milestone.add("BUFFER_HOURS", schema::milestone::BUFFER_HOURS)?;
    milestone.add("TRACK", schema::milestone::TRACK)?;
    milestone.add("BEYOND_PLAN", schema::milestone::BEYOND_PLAN)?;
    m.add_submodule(&milestone)?;

    // Products and tiers
    let products = PyModule::new(m.py(), "products")?;
    products.add("SUBSCRIPTION", schema::products::SUBSCRIPTION)?;
    products.add("B2B", schema::products::B2B)?;
    products.add("MARKETPLACE", schema::products::MARKETPLACE)?;
    m.add_submodule(&products)?;

    let tiers = PyModule::new(m.py(), "tiers")?;
    tiers.add("SOLO", schema::tiers::SOLO)?;
    tiers.add("SMALL", schema::tiers::SMALL)?;
    tiers.add("MEDIUM", schema::tiers::MEDIUM)?;
    tiers.add("LARGE", schema::tiers::LARGE)?;
    tiers.add("BIGLAW", schema::tiers::BIGLAW)?;
    m.add_submodule(&tiers)?;

    // Configuration keys
    let config = PyModule::new(m.py(), "config")?;
    config.add("DEV_PRODUCTIVITY", schema::config::DEV_PRODUCTIVITY)?;
    config.add("MKTG_PRODUCTIVITY", schema::config::MKTG_PRODUCTIVITY)?;
    config.add("INTERN_PRODUCTIVITY", schema::config::INTERN_PRODUCTIVITY)?;
    config.add(
        "SUBSCRIPTION_GROWTH_12M",
        schema::config::SUBSCRIPTION_GROWTH_12M,
    )?;
    config.add(
        "SUBSCRIPTION_GROWTH_24M",
        schema::config::SUBSCRIPTION_GROWTH_24M,
    )?;
    config.add("B2B_GROWTH_12M", schema::config::B2B_GROWTH_12M)?;
    config.add("B2B_GROWTH_24M", schema::config::B2B_GROWTH_24M)?;
    config.add(
        "MARKETPLACE_GROWTH_12M",
        schema::config::MARKETPLACE_GROWTH_12M,
    )?;
    config.add(
        "MARKETPLACE_GROWTH_24M",
        schema::config::MARKETPLACE_GROWTH_24M,
    )?;
    config.add(
        "MARKETPLACE_GROWTH_24M_ALIAS",
        schema::config::MARKETPLACE_GROWTH_24M_ALIAS,
    )?;
    m.add_submodule(&config)?;

    // Forecast tables
    let forecast = PyModule::new(m.py(), "forecast")?;
    forecast.add("MONTH", schema::forecast::MONTH)?;
    forecast.add("CHURN_RATE", schema::forecast::CHURN_RATE)?;
    forecast.add("REVENUE_K", schema::forecast::REVENUE_K)?;
    forecast.add("NEW_CUSTOMERS", schema::forecast::NEW_CUSTOMERS)?;
    forecast.add("PURCHASE_RATE", schema::forecast::PURCHASE_RATE)?;
    forecast.add("ACTIVE_CUSTOMERS", schema::forecast::ACTIVE_CUSTOMERS)?;
    forecast.add("NEW_FIRMS", schema::forecast::NEW_FIRMS)?;
    forecast.add("ACTIVE_FIRMS", schema::forecast::ACTIVE_FIRMS)?;
    forecast.add("NEW_CLIENTS", schema::forecast::NEW_CLIENTS)?;
    forecast.add("MATCHES", schema::forecast::MATCHES)?;
    forecast.add("ACTIVE_CLIENTS", schema::forecast::ACTIVE_CLIENTS)?;
    m.add_submodule(&forecast)?;

    Ok(())
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PlanModel>()?;
    add_schema_exports(m)?;
    Ok(())
}
