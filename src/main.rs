//! Recipient guard command line entry point.
//!
//! Screens recipient addresses and manages the per-user lists the screening
//! relies on. Verdicts and listings are printed to stdout as JSON; logs go to
//! stderr.
//!
//! # Commands
//! - `assess`: risk verdict for a recipient (exit code 2 when unsafe)
//! - `blocklist add|remove|list`: the user's blocked addresses
//! - `contacts add|remove|list`: the user's trusted contacts
//! - `reports add|check|list`: community fraud reports
//! - `receipts list|show`: receipts of completed transfers
//!
//! # Flow
//! 1. Loads `.env` and sets up logging
//! 2. Loads and validates the configuration document
//! 3. Wires the services and runs the requested command

use anyhow::Context;
use clap::{Arg, ArgMatches, Command};
use dotenvy::dotenv;
use serde::Serialize;
use std::path::Path;
use tracing::{error, info};

use wallet_guard::{
	bootstrap::{initialize_services, GuardServices},
	models::{
		AddedBy, Chain, ConfigError, ConfigLoader, GuardConfig, ReportCategory,
		DEFAULT_CONFIG_PATH,
	},
	repositories::{FileUserRepository, DEFAULT_REPORT_LIST_LIMIT},
	utils::{
		logging::{setup_logging, DEFAULT_LOG_DIRECTIVE},
		normalize,
	},
};

/// Exit code of `assess` when the verdict does not allow the transfer
const UNSAFE_EXIT_CODE: i32 = 2;

fn user_arg() -> Arg {
	Arg::new("user")
		.long("user")
		.short('u')
		.help("Id of the user whose lists are used")
		.value_name("USER_ID")
		.required(true)
}

fn chain_arg() -> Arg {
	Arg::new("chain")
		.long("chain")
		.help("Chain of the address (solana, ethereum)")
		.value_name("CHAIN")
		.default_value("solana")
}

fn address_arg(help: &'static str) -> Arg {
	Arg::new("address")
		.help(help)
		.value_name("ADDRESS")
		.required(true)
}

fn cli() -> Command {
	Command::new("wallet-guard")
		.version(env!("CARGO_PKG_VERSION"))
		.about(
			"Screens transfer recipients against the user's blocklist, an abuse registry and \
			 their on-chain activity before funds are sent.",
		)
		.subcommand_required(true)
		.arg_required_else_help(true)
		.arg(
			Arg::new("config")
				.long("config")
				.help("Path to the configuration document")
				.value_name("PATH")
				.default_value(DEFAULT_CONFIG_PATH)
				.global(true),
		)
		.arg(
			Arg::new("log-level")
				.long("log-level")
				.help("Log directive used when RUST_LOG is not set (trace, debug, info, warn, error)")
				.value_name("LEVEL")
				.global(true),
		)
		.subcommand(
			Command::new("assess")
				.about("Assess the risk of sending to a recipient")
				.arg(address_arg("Address, payment URI or link of the recipient"))
				.arg(user_arg())
				.arg(chain_arg()),
		)
		.subcommand(
			Command::new("blocklist")
				.about("Manage the user's blocklist")
				.subcommand_required(true)
				.subcommand(
					Command::new("add")
						.about("Block an address")
						.arg(address_arg("Address to block"))
						.arg(user_arg())
						.arg(chain_arg())
						.arg(
							Arg::new("reason")
								.long("reason")
								.help("Why the address is blocked")
								.value_name("TEXT"),
						),
				)
				.subcommand(
					Command::new("remove")
						.about("Unblock an address")
						.arg(address_arg("Address to unblock"))
						.arg(user_arg())
						.arg(chain_arg()),
				)
				.subcommand(
					Command::new("list")
						.about("List blocked addresses")
						.arg(user_arg()),
				),
		)
		.subcommand(
			Command::new("contacts")
				.about("Manage the user's trusted contacts")
				.subcommand_required(true)
				.subcommand(
					Command::new("add")
						.about("Add a trusted contact")
						.arg(address_arg("Address of the contact"))
						.arg(user_arg())
						.arg(chain_arg())
						.arg(
							Arg::new("name")
								.long("name")
								.help("Display name of the contact")
								.value_name("NAME")
								.required(true),
						)
						.arg(
							Arg::new("notes")
								.long("notes")
								.help("Free-form notes")
								.value_name("TEXT"),
						),
				)
				.subcommand(
					Command::new("remove")
						.about("Remove a trusted contact")
						.arg(address_arg("Address of the contact"))
						.arg(user_arg())
						.arg(chain_arg()),
				)
				.subcommand(
					Command::new("list")
						.about("List trusted contacts")
						.arg(user_arg()),
				),
		)
		.subcommand(
			Command::new("reports")
				.about("Community fraud reports")
				.subcommand_required(true)
				.subcommand(
					Command::new("add")
						.about("Report an address as fraudulent")
						.arg(address_arg("Address to report"))
						.arg(user_arg().help("Id of the reporting user"))
						.arg(chain_arg())
						.arg(
							Arg::new("category")
								.long("category")
								.help("Kind of fraud observed")
								.value_name("CATEGORY")
								.value_parser(ReportCategory::ALL.map(|c| c.as_str()))
								.ignore_case(true)
								.required(true),
						)
						.arg(
							Arg::new("note")
								.long("note")
								.help("What happened")
								.value_name("TEXT"),
						),
				)
				.subcommand(
					Command::new("check")
						.about("Show the reports filed against an address")
						.arg(address_arg("Address to look up"))
						.arg(chain_arg()),
				)
				.subcommand(
					Command::new("list")
						.about("List reported addresses, most reported first")
						.arg(
							Arg::new("limit")
								.long("limit")
								.help("Maximum number of reports to print")
								.value_name("N")
								.value_parser(clap::value_parser!(usize))
								.default_value("100"),
						),
				),
		)
		.subcommand(
			Command::new("receipts")
				.about("Inspect transfer receipts")
				.subcommand_required(true)
				.subcommand(
					Command::new("list")
						.about("List receipts of completed transfers")
						.arg(user_arg())
						.arg(
							Arg::new("wallet")
								.long("wallet")
								.help("Only transfers sent from this wallet address")
								.value_name("ADDRESS"),
						)
						.arg(chain_arg()),
				)
				.subcommand(
					Command::new("show")
						.about("Show the receipt of one transaction")
						.arg(
							Arg::new("signature")
								.help("Transaction signature or hash")
								.value_name("SIGNATURE")
								.required(true),
						)
						.arg(user_arg()),
				),
		)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
	let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
	println!("{}", json);
	Ok(())
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> anyhow::Result<&'a str> {
	matches
		.get_one::<String>(id)
		.map(String::as_str)
		.ok_or_else(|| anyhow::anyhow!("missing argument {}", id))
}

fn chain_of(matches: &ArgMatches) -> anyhow::Result<Chain> {
	required(matches, "chain")?
		.parse::<Chain>()
		.map_err(|e| anyhow::anyhow!(e))
}

fn load_config(path: &str) -> anyhow::Result<GuardConfig> {
	GuardConfig::load_from_path(Path::new(path))
		.with_context(|| format!("Failed to load configuration from {}", path))
}

async fn run_assess(
	config: &GuardConfig,
	services: &GuardServices<FileUserRepository>,
	matches: &ArgMatches,
) -> anyhow::Result<bool> {
	let user_id = required(matches, "user")?;
	let chain = chain_of(matches)?;
	if config.chain(chain).is_none() {
		return Err(ConfigError::chain_not_configured(chain).into());
	}
	let address = normalize(required(matches, "address")?, chain)?;

	if let Some(contact) = services.contacts.get_contact(user_id, &address).await? {
		info!(contact = %contact.name, "recipient is a trusted contact");
	}

	let verdict = services.aggregator.assess(user_id, &address).await;
	print_json(&verdict)?;
	Ok(verdict.safe())
}

async fn run_blocklist(
	services: &GuardServices<FileUserRepository>,
	matches: &ArgMatches,
) -> anyhow::Result<()> {
	match matches.subcommand() {
		Some(("add", sub)) => {
			let address = normalize(required(sub, "address")?, chain_of(sub)?)?;
			let entry = services
				.blocklist
				.add_entry(
					required(sub, "user")?,
					&address,
					sub.get_one::<String>("reason").cloned(),
					AddedBy::Manual,
				)
				.await?;
			print_json(&entry)
		}
		Some(("remove", sub)) => {
			let address = normalize(required(sub, "address")?, chain_of(sub)?)?;
			services
				.blocklist
				.remove_entry(required(sub, "user")?, &address)
				.await?;
			info!(address = %address, "address removed from blocklist");
			Ok(())
		}
		Some(("list", sub)) => {
			let entries = services
				.blocklist
				.list_entries(required(sub, "user")?)
				.await?;
			print_json(&entries)
		}
		_ => Err(anyhow::anyhow!("unknown blocklist command")),
	}
}

async fn run_contacts(
	services: &GuardServices<FileUserRepository>,
	matches: &ArgMatches,
) -> anyhow::Result<()> {
	match matches.subcommand() {
		Some(("add", sub)) => {
			let address = normalize(required(sub, "address")?, chain_of(sub)?)?;
			let contact = services
				.contacts
				.add_contact(
					required(sub, "user")?,
					&address,
					required(sub, "name")?,
					sub.get_one::<String>("notes").cloned(),
				)
				.await?;
			print_json(&contact)
		}
		Some(("remove", sub)) => {
			let address = normalize(required(sub, "address")?, chain_of(sub)?)?;
			services
				.contacts
				.remove_contact(required(sub, "user")?, &address)
				.await?;
			info!(address = %address, "contact removed");
			Ok(())
		}
		Some(("list", sub)) => {
			let contacts = services
				.contacts
				.list_contacts(required(sub, "user")?)
				.await?;
			print_json(&contacts)
		}
		_ => Err(anyhow::anyhow!("unknown contacts command")),
	}
}

async fn run_reports(
	services: &GuardServices<FileUserRepository>,
	matches: &ArgMatches,
) -> anyhow::Result<()> {
	match matches.subcommand() {
		Some(("add", sub)) => {
			let address = normalize(required(sub, "address")?, chain_of(sub)?)?;
			let category = required(sub, "category")?
				.parse::<ReportCategory>()
				.map_err(|e| anyhow::anyhow!(e))?;
			let report = services
				.reports
				.submit_report(
					required(sub, "user")?,
					&address,
					category,
					sub.get_one::<String>("note").cloned(),
				)
				.await?;
			print_json(&report)
		}
		Some(("check", sub)) => {
			let address = normalize(required(sub, "address")?, chain_of(sub)?)?;
			let report = services.reports.check_report(&address).await?;
			print_json(&report)
		}
		Some(("list", sub)) => {
			let limit = sub
				.get_one::<usize>("limit")
				.copied()
				.unwrap_or(DEFAULT_REPORT_LIST_LIMIT);
			let reports = services.reports.list_reports(limit).await?;
			print_json(&reports)
		}
		_ => Err(anyhow::anyhow!("unknown reports command")),
	}
}

async fn run_receipts(
	services: &GuardServices<FileUserRepository>,
	matches: &ArgMatches,
) -> anyhow::Result<()> {
	match matches.subcommand() {
		Some(("list", sub)) => {
			let user_id = required(sub, "user")?;
			let receipts = match sub.get_one::<String>("wallet") {
				Some(wallet) => {
					let wallet = normalize(wallet, chain_of(sub)?)?;
					services.receipts.list_by_wallet(user_id, &wallet).await?
				}
				None => services.receipts.list(user_id).await?,
			};
			print_json(&receipts)
		}
		Some(("show", sub)) => {
			let receipt = services
				.receipts
				.find_by_signature(required(sub, "user")?, required(sub, "signature")?)
				.await?
				.ok_or_else(|| anyhow::anyhow!("no receipt with that signature"))?;
			print_json(&receipt)
		}
		_ => Err(anyhow::anyhow!("unknown receipts command")),
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let matches = cli().get_matches();

	// Load environment variables from .env file
	dotenv().ok();

	let directive = matches
		.get_one::<String>("log-level")
		.map(String::as_str)
		.unwrap_or(DEFAULT_LOG_DIRECTIVE);
	setup_logging(directive).unwrap_or_else(|e| {
		eprintln!("Failed to setup logging: {}", e);
	});

	let config = load_config(required(&matches, "config")?)?;
	let services = initialize_services(&config)
		.map_err(|e| anyhow::anyhow!("Failed to initialize services: {}", e))?;

	let result = match matches.subcommand() {
		Some(("assess", sub)) => match run_assess(&config, &services, sub).await {
			Ok(true) => Ok(()),
			Ok(false) => std::process::exit(UNSAFE_EXIT_CODE),
			Err(e) => Err(e),
		},
		Some(("blocklist", sub)) => run_blocklist(&services, sub).await,
		Some(("contacts", sub)) => run_contacts(&services, sub).await,
		Some(("reports", sub)) => run_reports(&services, sub).await,
		Some(("receipts", sub)) => run_receipts(&services, sub).await,
		_ => Err(anyhow::anyhow!("unknown command")),
	};

	if let Err(e) = &result {
		error!(error = %format!("{:#}", e), "command failed");
	}
	result
}
