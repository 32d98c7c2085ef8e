use crate::infra::{required_weights_path, ConfiguredWeightStore};
use chrono::Local;
use clap::Args;
use settlement_readiness::config::AppConfig;
use settlement_readiness::error::AppError;
use settlement_readiness::readiness::{
    ActiveWeights, JsonFileWeightStore, WeightsError, WeightsManager, WeightsOrigin,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SetWeightsArgs {
    /// Operator the change is attributed to
    #[arg(long)]
    pub(crate) operator: String,
    /// JSON document holding all nine weights
    #[arg(long)]
    pub(crate) file: PathBuf,
}

pub(crate) fn run_show_weights() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = ConfiguredWeightStore::from_path(config.scoring.weights_path.as_deref());
    if !store.is_persistent() {
        println!("APP_WEIGHTS_PATH is not set; showing built-in defaults");
    }

    let active = WeightsManager::new(Arc::new(store)).current()?;
    print!("{}", render_weights(&active));
    Ok(())
}

pub(crate) fn run_set_weights(args: SetWeightsArgs) -> Result<(), AppError> {
    let SetWeightsArgs { operator, file } = args;

    let config = AppConfig::load()?;
    let path = required_weights_path(&config.scoring)?;
    let raw = std::fs::read_to_string(&file)?;
    let payload = serde_json::from_str(&raw).map_err(|err| WeightsError::Validation {
        field: "weights",
        reason: format!("{} is not valid JSON ({err})", file.display()),
    })?;

    let manager = WeightsManager::new(Arc::new(JsonFileWeightStore::new(path)));
    let record = manager.save(&operator, &payload, Local::now().naive_local())?;
    println!(
        "Weights saved by {} at {}",
        record.updated_by, record.updated_at
    );
    print!("{}", render_weights(&record.into()));
    Ok(())
}

fn render_weights(active: &ActiveWeights) -> String {
    let weights = &active.weights;
    let source = match &active.origin {
        WeightsOrigin::Defaults => "defaults".to_string(),
        WeightsOrigin::Saved {
            updated_by,
            updated_at,
        } => format!("saved by {updated_by} at {updated_at}"),
    };

    format!(
        "Active weights ({source})\n\
         readiness: personnel {} | components {} | training {}\n\
         risk: threat {} | infrastructure {} | response {} | incidents {}\n\
         priority: risk {} | readiness gap {}\n",
        weights.personnel,
        weights.components,
        weights.training,
        weights.risk_threat,
        weights.risk_infra,
        weights.risk_response,
        weights.risk_incidents,
        weights.priority_risk,
        weights.priority_readiness,
    )
}
