// Canned payloads for `--dry-run`. They are compiled into the binary so a
// dry run works from any directory and never touches the network.

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::models::{Contract, DataConsumptionReport};

pub const CONTRACTS_JSON: &str = include_str!("fixtures/contracts.json");
pub const DATA_CONSUMPTION_JSON: &str = include_str!("fixtures/data_consumption.json");

fn load<T: DeserializeOwned>(name: &'static str, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|source| Error::Fixture { name, source })
}

pub fn contracts() -> Result<Vec<Contract>> {
    load("contracts.json", CONTRACTS_JSON)
}

pub fn data_consumption() -> Result<DataConsumptionReport> {
    load("data_consumption.json", DATA_CONSUMPTION_JSON)
}
