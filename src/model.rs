use std::collections::HashMap;

use polars::prelude::*;

use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;

use crate::capacity::ResourcePlan;
use crate::config::{ProductParamSet, ScenarioConfig};
use crate::error::PlanError;
use crate::forecast::{
    self, b2b_to_dataframe, marketplace_to_dataframe, subscription_to_dataframe,
    ForecastBundle,
};
use crate::schedule::{
    self, milestones_to_dataframe, tasks_to_dataframe, ProjectTask, ScheduleOutcome, Track,
};
use crate::schema::{resource, task};

struct PlanOutputs {
    schedule: ScheduleOutcome,
    forecasts: ForecastBundle,
}

/// Orchestrates one business-plan projection: typed inputs in, report
/// DataFrames out. All randomness comes from the seed passed to `run`.
#[pyclass]
pub struct PlanModel {
    config: Option<ScenarioConfig>,
    params: Option<ProductParamSet>,
    plan: Option<ResourcePlan>,
    tasks: Option<Vec<ProjectTask>>,
    outputs: Option<PlanOutputs>,
}

#[pymethods]
impl PlanModel {
    #[new]
    fn new() -> Self {
        Self {
            config: None,
            params: None,
            plan: None,
            tasks: None,
            outputs: None,
        }
    }

    // ── Inputs ──────────────────────────────────────────────────────────────

    /// Set scalar configuration from a flat key → value mapping.
    ///
    /// Productivity factors and the six compound-growth factors are
    /// required; see the `config` schema module for the accepted keys and
    /// the one tolerated misspelling.
    fn set_config(&mut self, values: HashMap<String, f64>) -> PyResult<()> {
        self.config = Some(ScenarioConfig::from_values(&values)?);
        self.outputs = None;
        Ok(())
    }

    /// Set per-product probability parameters from a product → (name →
    /// value) mapping. All three products are required.
    fn set_product_params(
        &mut self,
        params: HashMap<String, HashMap<String, f64>>,
    ) -> PyResult<()> {
        self.params = Some(ProductParamSet::from_nested(&params)?);
        self.outputs = None;
        Ok(())
    }

    /// Load the staffing plan, one row per month in chronological order.
    ///
    /// Required columns: month, work_days, senior_devs, intern_devs,
    /// senior_marketers, intern_marketers, dev_efficiency, mktg_efficiency.
    /// Numeric columns may arrive as any numeric dtype; they are cast to
    /// Float64 here. Null cells are rejected.
    fn load_resource_plan(&mut self, df: PyDataFrame) -> PyResult<()> {
        let df = df.0;
        Self::require_columns(&df, &resource::ALL)?;

        let plan = ResourcePlan {
            months: string_column(&df, resource::MONTH)?,
            work_days: float_column(&df, resource::WORK_DAYS)?,
            senior_devs: float_column(&df, resource::SENIOR_DEVS)?,
            intern_devs: float_column(&df, resource::INTERN_DEVS)?,
            senior_marketers: float_column(&df, resource::SENIOR_MARKETERS)?,
            intern_marketers: float_column(&df, resource::INTERN_MARKETERS)?,
            dev_efficiency: float_column(&df, resource::DEV_EFFICIENCY)?,
            mktg_efficiency: float_column(&df, resource::MKTG_EFFICIENCY)?,
        };
        plan.validate()?;

        self.plan = Some(plan);
        self.outputs = None;
        Ok(())
    }

    /// Load the task list, one row per task.
    ///
    /// Required columns: task, hours, sequence, track. Hours must be
    /// non-negative integers; track must be "Development" or "Marketing".
    fn load_tasks(&mut self, df: PyDataFrame) -> PyResult<()> {
        let df = df.0;
        Self::require_columns(&df, &task::ALL)?;

        let names = string_column(&df, task::NAME)?;
        let hours = unsigned_column(&df, task::HOURS)?;
        let sequences = unsigned_column(&df, task::SEQUENCE)?;
        let track_labels = string_column(&df, task::TRACK)?;

        let mut tasks = Vec::with_capacity(names.len());
        for i in 0..names.len() {
            tasks.push(ProjectTask {
                name: names[i].clone(),
                hours: hours[i],
                sequence: u32::try_from(sequences[i]).map_err(|_| {
                    PlanError::Validation(format!(
                        "task sequence {} at row {i} out of range",
                        sequences[i]
                    ))
                })?,
                track: Track::from_label(&track_labels[i])?,
            });
        }

        self.tasks = Some(tasks);
        self.outputs = None;
        Ok(())
    }

    // ── Projection ──────────────────────────────────────────────────────────

    /// Run the full projection: two-pass milestone schedule, then the three
    /// stochastic revenue forecasts from the given seed. Results are
    /// exposed through the DataFrame getters.
    fn run(&mut self, seed: u64) -> PyResult<()> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| PlanError::NotLoaded("configuration".into()))?;
        let params = self
            .params
            .as_ref()
            .ok_or_else(|| PlanError::NotLoaded("product parameters".into()))?;
        let plan = self
            .plan
            .as_ref()
            .ok_or_else(|| PlanError::NotLoaded("resource plan".into()))?;
        let tasks = self
            .tasks
            .as_ref()
            .ok_or_else(|| PlanError::NotLoaded("tasks".into()))?;

        let outcome = schedule::plan_schedule(plan, config, tasks)?;
        let forecasts =
            forecast::run_forecasts(&plan.months, &outcome.milestones, config, params, seed)?;

        self.outputs = Some(PlanOutputs {
            schedule: outcome,
            forecasts,
        });
        Ok(())
    }

    // ── Report tables ───────────────────────────────────────────────────────

    #[getter]
    fn capacity_df(&self) -> PyResult<Option<PyDataFrame>> {
        self.table(|o| o.schedule.capacity.to_dataframe())
    }

    #[getter]
    fn milestones_df(&self) -> PyResult<Option<PyDataFrame>> {
        self.table(|o| milestones_to_dataframe(&o.schedule.milestones))
    }

    /// The task list including the synthetic catch-all rows.
    #[getter]
    fn tasks_df(&self) -> PyResult<Option<PyDataFrame>> {
        self.table(|o| tasks_to_dataframe(&o.schedule.tasks))
    }

    #[getter]
    fn subscription_forecast_df(&self) -> PyResult<Option<PyDataFrame>> {
        self.table(|o| subscription_to_dataframe(&o.forecasts.subscription))
    }

    #[getter]
    fn b2b_forecast_df(&self) -> PyResult<Option<PyDataFrame>> {
        self.table(|o| b2b_to_dataframe(&o.forecasts.b2b))
    }

    #[getter]
    fn marketplace_forecast_df(&self) -> PyResult<Option<PyDataFrame>> {
        self.table(|o| marketplace_to_dataframe(&o.forecasts.marketplace))
    }
}

// ── Private helpers ─────────────────────────────────────────────────────────

impl PlanModel {
    fn table(
        &self,
        build: impl Fn(&PlanOutputs) -> Result<DataFrame, PlanError>,
    ) -> PyResult<Option<PyDataFrame>> {
        match &self.outputs {
            Some(outputs) => Ok(Some(PyDataFrame(build(outputs)?))),
            None => Ok(None),
        }
    }

    fn require_columns(df: &DataFrame, required: &[&str]) -> PyResult<()> {
        for &col_name in required {
            if df.column(col_name).is_err() {
                return Err(PlanError::MissingColumn(col_name.to_string()).into());
            }
        }
        Ok(())
    }
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>, PlanError> {
    df.column(name)?
        .str()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.map(str::to_string)
                .ok_or_else(|| PlanError::Validation(format!("null {name} at row {i}")))
        })
        .collect()
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, PlanError> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    column
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            v.ok_or_else(|| PlanError::Validation(format!("null {name} at row {i}")))
        })
        .collect()
}

fn unsigned_column(df: &DataFrame, name: &str) -> Result<Vec<u64>, PlanError> {
    let column = df.column(name)?.cast(&DataType::Int64)?;
    column
        .i64()?
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            let v =
                v.ok_or_else(|| PlanError::Validation(format!("null {name} at row {i}")))?;
            u64::try_from(v).map_err(|_| {
                PlanError::Validation(format!("negative {name} at row {i}: {v}"))
            })
        })
        .collect()
}
