use anyhow::{bail, Context, Result};
use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

// Use library instead of local modules
use ledger_api::{logging::init_logging, open_database, Config, Ledger, ListQuery};

const USAGE: &str = "Usage:
  ledger init <balance>   create the account or reset its balance
  ledger balance          print the current balance
  ledger list [IBAN]      print transactions, optionally for one IBAN";

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let config = Config::load()?;
    init_logging(&config);

    match args.first().map(String::as_str) {
        Some("init") => {
            let Some(raw) = args.get(1) else {
                bail!("missing <balance>\n{}", USAGE);
            };
            let balance =
                Decimal::from_str(raw).with_context(|| format!("Invalid balance: {}", raw))?;
            run_init(&config, balance)
        }
        Some("balance") => run_balance(&config),
        Some("list") => run_list(&config, args.get(1).cloned()),
        _ => bail!("{}", USAGE),
    }
}

fn open_ledger(config: &Config) -> Result<Ledger> {
    let conn = open_database(&config.database_path)?;
    Ok(Ledger::new(conn, config.reference_mode))
}

fn run_init(config: &Config, balance: Decimal) -> Result<()> {
    let ledger = open_ledger(config)?;
    let account = ledger.open_account(balance)?;

    println!("Account {} balance set to {}", account.id, account.balance);
    Ok(())
}

fn run_balance(config: &Config) -> Result<()> {
    let ledger = open_ledger(config)?;
    let account = ledger.account()?;

    println!("{}", account.balance);
    Ok(())
}

fn run_list(config: &Config, iban: Option<String>) -> Result<()> {
    let ledger = open_ledger(config)?;
    let query = ListQuery {
        iban,
        sort_amount: None,
    };

    for tx in ledger.list_transactions(&query)? {
        println!("{}", serde_json::to_string(&tx)?);
    }
    Ok(())
}
