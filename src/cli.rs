// Command-line surface and the end-to-end workflow:
// credentials -> login (two steps) -> contracts -> data consumption.

use anyhow::{Context, Result};
use clap::Parser;

use crate::api::{ApiClient, DEFAULT_BASE_URL};
use crate::credentials::CredentialResolver;
use crate::fixtures;
use crate::models::{Contract, DataConsumptionReport, Session};
use crate::ui::Ui;

#[derive(Parser, Debug, Clone)]
#[command(name = "fraenk")]
#[command(version)]
#[command(about = "Fraenk mobile data consumption tracker", long_about = None)]
pub struct Args {
    /// Output raw JSON to stdout (pipeable)
    #[arg(short, long)]
    pub json: bool,

    /// Suppress progress messages (only applies to pretty output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Use built-in mock data (no API calls, no SMS required)
    #[arg(short, long)]
    pub dry_run: bool,

    /// Ask the server for fresh numbers instead of its cached values
    #[arg(long)]
    pub no_cache: bool,

    /// Contract id to report on (defaults to the first contract)
    #[arg(long, value_name = "ID")]
    pub contract: Option<String>,

    /// API base URL
    #[arg(long, env = "FRAENK_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,
}

/// Where contracts and consumption come from.
enum Backend {
    Live { api: ApiClient, session: Session },
    Fixtures,
}

impl Backend {
    fn contracts(&self) -> crate::Result<Vec<Contract>> {
        match self {
            Backend::Live { api, session } => api.get_contracts(session),
            Backend::Fixtures => fixtures::contracts(),
        }
    }

    fn data_consumption(
        &self,
        contract: &Contract,
        use_cache: bool,
    ) -> crate::Result<DataConsumptionReport> {
        match self {
            Backend::Live { api, session } => api.get_data_consumption(session, contract, use_cache),
            Backend::Fixtures => fixtures::data_consumption(),
        }
    }
}

/// Run the workflow and return the report for printing.
pub fn run(args: &Args) -> Result<DataConsumptionReport> {
    let ui = Ui::new(args.json, args.quiet);

    let backend = if args.dry_run {
        ui.info("Running in DRY-RUN mode (using fixtures)");
        Backend::Fixtures
    } else {
        let api = ApiClient::new(args.api_url.as_str()).context("Failed to build HTTP client")?;
        let session = authenticate(&api, &ui)?;
        Backend::Live { api, session }
    };

    ui.info("\nFetching contracts...");
    let contracts = backend.contracts().context("Failed to fetch contracts")?;
    ui.info(&format!("Found {} contract(s)", contracts.len()));
    let contract = select_contract(&contracts, args.contract.as_deref())?;

    let spinner = ui.info_spinner("Fetching data consumption...");
    let report = backend.data_consumption(contract, !args.no_cache);
    spinner.finish_and_clear();
    report.context("Failed to fetch data consumption")
}

/// Resolve credentials and perform the two-step MFA login.
fn authenticate(api: &ApiClient, ui: &Ui) -> Result<Session> {
    let creds = CredentialResolver::new().resolve()?;

    let spinner = ui.spinner("Initiating login (MFA SMS will be sent)...");
    let challenge = api.login_initiate(&creds.username, &creds.password);
    spinner.finish_and_clear();
    let challenge = challenge.context("Login initiation failed")?;
    if !ui.json {
        eprintln!("{}", challenge.description);
    }

    let sms_code = ui.prompt_sms_code()?;

    let spinner = ui.spinner("Completing login with SMS code...");
    let session = api.login_complete(
        &creds.username,
        &creds.password,
        &sms_code,
        &challenge.mfa_token,
    );
    spinner.finish_and_clear();
    let session = session.context("Login completion failed")?;
    if !ui.json {
        eprintln!("Login successful!");
    }
    Ok(session)
}

/// Pick the requested contract, or the first one.
pub fn select_contract<'a>(contracts: &'a [Contract], wanted: Option<&str>) -> Result<&'a Contract> {
    match wanted {
        Some(id) => contracts
            .iter()
            .find(|c| c.id == id)
            .with_context(|| format!("Contract {id} not found")),
        None => contracts.first().context("No contracts found for this account"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(id: &str) -> Contract {
        serde_json::from_value(serde_json::json!({"id": id, "status": "ACTIVE"})).unwrap()
    }

    #[test]
    fn parses_flags() {
        let args = Args::try_parse_from(["fraenk", "-j", "-d", "--no-cache", "--contract", "87654321"])
            .unwrap();
        assert!(args.json);
        assert!(args.dry_run);
        assert!(args.no_cache);
        assert!(!args.quiet);
        assert_eq!(args.contract.as_deref(), Some("87654321"));
    }

    #[test]
    fn selects_first_contract_by_default() {
        let contracts = vec![contract("1"), contract("2")];
        assert_eq!(select_contract(&contracts, None).unwrap().id, "1");
        assert_eq!(select_contract(&contracts, Some("2")).unwrap().id, "2");
    }

    #[test]
    fn unknown_or_missing_contract_is_an_error() {
        let contracts = vec![contract("1")];
        let err = select_contract(&contracts, Some("9")).unwrap_err();
        assert_eq!(err.to_string(), "Contract 9 not found");
        assert!(select_contract(&[], None).is_err());
    }
}
