//! Script-style command line over the configured JSON book.

use std::{
    env,
    io::{self, BufRead},
    sync::Arc,
};

use chrono::NaiveDate;
use shopbook_config::{Config, ConfigManager};
use shopbook_core::{
    time::{Clock, SystemClock},
    NewInvestorEntry, NewItem, NewPurchase, NewSale, PaymentRequest, PurchaseTerms,
};
use shopbook_domain::{
    format_cop, names_match, today_iso, DebtorKind, InvestorEntryKind, PaymentMethod,
    SalePayment, CREDIT_LABEL,
};
use shopbook_storage_json::{JsonRecordStore, StorePaths};
use strsim::levenshtein;

use crate::{bookkeeper::Bookkeeper, errors::AppError, output};

const COMMANDS: &[&str] = &[
    "settle-customer",
    "settle-supplier",
    "ledger",
    "balances",
    "debtors",
    "balance",
    "add-item",
    "items",
    "sale",
    "purchase",
    "expense",
    "investor",
    "report",
    "warnings",
    "backup",
    "backups",
    "restore",
    "config",
    "script",
    "help",
];

/// Entry point of `shopbook_cli`: runs one command, or a script read from stdin.
pub fn run_cli() -> Result<(), AppError> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        print_usage();
        return Err(AppError::usage("no command given"));
    };
    if command == "help" {
        print_usage();
        return Ok(());
    }

    let mut session = Session::open()?;
    if command == "script" {
        return session.run_script(io::stdin().lock());
    }
    let output = session.execute(command, rest)?;
    println!("{output}");
    Ok(())
}

/// The loaded configuration, the JSON store and the bookkeeping session over it.
pub struct Session {
    bookkeeper: Bookkeeper,
    store: Arc<JsonRecordStore>,
    config: Config,
    config_manager: ConfigManager,
}

impl Session {
    /// Reads configuration from the default data root (or `$SHOPBOOK_HOME`).
    pub fn open() -> Result<Self, AppError> {
        let config_manager = ConfigManager::with_base_dir(Config::default().resolve_data_root())?;
        let config = config_manager.load()?;
        Self::open_with(config, config_manager)
    }

    pub fn open_with(config: Config, config_manager: ConfigManager) -> Result<Self, AppError> {
        let root = config.resolve_data_root();
        let store = Arc::new(JsonRecordStore::with_retention(
            StorePaths::under(&root),
            config.backup_retention,
        )?);
        let bookkeeper = Bookkeeper::open(Box::new(Arc::clone(&store)))?;
        tracing::debug!(root = %root.display(), "session opened");
        Ok(Self {
            bookkeeper,
            store,
            config,
            config_manager,
        })
    }

    pub fn bookkeeper(&self) -> &Bookkeeper {
        &self.bookkeeper
    }

    /// Executes commands line by line. Blank lines and `#` comments are skipped;
    /// `exit` stops early. Failures are reported and the script continues.
    pub fn run_script(&mut self, input: impl BufRead) -> Result<(), AppError> {
        let mut failures = 0usize;
        for line in input.lines() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let words = match shell_words::split(trimmed) {
                Ok(words) => words,
                Err(err) => {
                    eprintln!("Error: {err}");
                    failures += 1;
                    continue;
                }
            };
            let Some((command, rest)) = words.split_first() else {
                continue;
            };
            if command == "exit" || command == "quit" {
                break;
            }
            match self.execute(command, rest) {
                Ok(output) => println!("{output}"),
                Err(err) => {
                    eprintln!("Error: {err}");
                    failures += 1;
                }
            }
        }
        if failures > 0 {
            return Err(AppError::usage(format!("{failures} script command(s) failed")));
        }
        Ok(())
    }

    /// Runs one command and returns its printable output.
    pub fn execute(&mut self, command: &str, args: &[String]) -> Result<String, AppError> {
        match command {
            "settle-customer" => self.settle(DebtorKind::Customer, args),
            "settle-supplier" => self.settle(DebtorKind::Supplier, args),
            "ledger" => {
                let from = optional_date(args.first())?;
                let to = optional_date(args.get(1))?;
                let movements = self.bookkeeper.ledger(from.as_deref(), to.as_deref())?;
                Ok(output::ledger(&movements))
            }
            "balances" => Ok(output::balances(&self.bookkeeper.balances()?)),
            "debtors" => {
                let kind = parse_side(arg(args, 0, "customers|suppliers")?)?;
                Ok(output::debtors(&self.bookkeeper.debtors(kind)?))
            }
            "balance" => {
                let kind = parse_side(arg(args, 0, "customer|supplier")?)?;
                let name = arg(args, 1, "name")?;
                let open = self.bookkeeper.open_balance(kind, name)?;
                Ok(format!("{name}: {}", output::money(open)))
            }
            "add-item" => self.add_item(args),
            "items" => Ok(output::items(&self.bookkeeper.items()?)),
            "sale" => self.sale(args),
            "purchase" => self.purchase(args),
            "expense" => self.expense(args),
            "investor" => self.investor(args),
            "report" => self.report(args),
            "warnings" => {
                let warnings = self.bookkeeper.warnings()?;
                if warnings.is_empty() {
                    Ok("No warnings".to_string())
                } else {
                    Ok(warnings.join("\n"))
                }
            }
            "backup" => {
                let note = (!args.is_empty()).then(|| args.join(" "));
                let info = self.store.backup(note.as_deref())?;
                Ok(format!("Backup created: {}", info.id))
            }
            "backups" => {
                let backups = self.store.list_backups()?;
                if backups.is_empty() {
                    return Ok("No backups".to_string());
                }
                Ok(backups
                    .iter()
                    .map(|info| format!("{}  {} bytes", info.id, info.size_bytes))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            "restore" => {
                let id = arg(args, 0, "backup id")?;
                let info = self
                    .store
                    .list_backups()?
                    .into_iter()
                    .find(|info| info.id == id)
                    .ok_or_else(|| AppError::usage(format!("unknown backup `{id}`")))?;
                self.store.restore_backup(&info)?;
                self.bookkeeper.reload()?;
                Ok(format!("Restored {}", info.id))
            }
            "config" => self.configure(args),
            "help" => Ok(usage_text()),
            other => Err(unknown_command(other)),
        }
    }

    fn settle(&mut self, kind: DebtorKind, args: &[String]) -> Result<String, AppError> {
        let name = arg(args, 0, "name")?;
        let amount = parse_amount(arg(args, 1, "amount")?)?;
        let date = optional_date(args.get(2))?.unwrap_or_else(today_iso);
        let method = match args.get(3) {
            Some(raw) => parse_method(raw)?,
            None => PaymentMethod::Cash,
        };
        let request = PaymentRequest::new(name, amount, date, method.label())
            .with_notes(args.get(4..).map(|rest| rest.join(" ")).unwrap_or_default());
        let outcome = match kind {
            DebtorKind::Customer => self.bookkeeper.settle_customer(&request)?,
            DebtorKind::Supplier => self.bookkeeper.settle_supplier(&request)?,
        };
        Ok(output::settlement(&kind.to_string(), name.trim(), &outcome))
    }

    fn add_item(&mut self, args: &[String]) -> Result<String, AppError> {
        let (flags, args): (Vec<&String>, Vec<&String>) =
            args.iter().partition(|value| value.as_str() == "--inv");
        let name = args
            .first()
            .ok_or_else(|| AppError::usage("missing <name>"))?;
        let cost = parse_amount(args.get(1).ok_or_else(|| AppError::usage("missing <cost>"))?)?;
        let price = parse_amount(args.get(2).ok_or_else(|| AppError::usage("missing <price>"))?)?;
        let stock = args
            .get(3)
            .map(|raw| parse_quantity(raw))
            .transpose()?
            .unwrap_or(0);
        let item = self.bookkeeper.add_item(NewItem {
            name: name.to_string(),
            brand: args.get(4).map(|brand| brand.to_string()).unwrap_or_default(),
            cost,
            price,
            stock,
            investor_owned: !flags.is_empty(),
            ..NewItem::default()
        })?;
        Ok(format!("Added item {} ({})", item.id, item.name))
    }

    fn sale(&mut self, args: &[String]) -> Result<String, AppError> {
        let item_id = self.resolve_item(arg(args, 0, "item")?)?;
        let quantity = parse_quantity(arg(args, 1, "quantity")?)?;
        let payment = SalePayment::parse(arg(args, 2, "payment")?).ok_or_else(|| {
            AppError::usage(format!(
                "payment must be one of Efectivo, Transferencia, Tarjeta, {CREDIT_LABEL}"
            ))
        })?;
        let date = optional_date(args.get(3))?.unwrap_or_else(today_iso);
        let mut input = NewSale::new(item_id, quantity, date, payment);
        input.customer = args.get(4).cloned().unwrap_or_default();
        input.unit_price = args.get(5).map(|raw| parse_amount(raw)).transpose()?;
        let sale = self.bookkeeper.record_sale(input)?;
        Ok(format!(
            "Recorded sale {}: {} x {} = {} ({})",
            sale.id,
            sale.quantity,
            format_cop(sale.unit_price),
            format_cop(sale.total()),
            sale.payment
        ))
    }

    fn purchase(&mut self, args: &[String]) -> Result<String, AppError> {
        let item_id = self.resolve_item(arg(args, 0, "item")?)?;
        let quantity = parse_quantity(arg(args, 1, "quantity")?)?;
        let unit_cost = parse_amount(arg(args, 2, "unit cost")?)?;
        let terms = parse_terms(arg(args, 3, "method|credit")?)?;
        let date = optional_date(args.get(4))?.unwrap_or_else(today_iso);
        let input = NewPurchase::stock(item_id, quantity, unit_cost, date, terms)
            .with_supplier(args.get(5).cloned().unwrap_or_default());
        let purchase = self.bookkeeper.record_purchase(input)?;
        Ok(format!(
            "Recorded purchase {}: {} x {} = {}",
            purchase.id,
            purchase.quantity,
            format_cop(purchase.unit_cost),
            format_cop(purchase.total())
        ))
    }

    fn expense(&mut self, args: &[String]) -> Result<String, AppError> {
        let amount = parse_amount(arg(args, 0, "amount")?)?;
        let terms = parse_terms(arg(args, 1, "method|credit")?)?;
        let date = optional_date(args.get(2))?.unwrap_or_else(today_iso);
        let mut input = NewPurchase::expense(amount, date, terms)
            .with_supplier(args.get(3).cloned().unwrap_or_default());
        input.notes = args.get(4..).map(|rest| rest.join(" ")).unwrap_or_default();
        let purchase = self.bookkeeper.record_purchase(input)?;
        Ok(format!(
            "Recorded expense {}: {}",
            purchase.id,
            format_cop(purchase.total())
        ))
    }

    fn investor(&mut self, args: &[String]) -> Result<String, AppError> {
        let kind = InvestorEntryKind::parse(arg(args, 0, "aporte|retiro|utilidad")?)
            .ok_or_else(|| AppError::usage("entry type must be aporte, retiro or utilidad"))?;
        let amount = parse_amount(arg(args, 1, "amount")?)?;
        let date = optional_date(args.get(2))?.unwrap_or_else(today_iso);
        let entry = self.bookkeeper.record_investor_entry(NewInvestorEntry {
            kind,
            amount,
            date,
            notes: args.get(3..).map(|rest| rest.join(" ")).unwrap_or_default(),
        })?;
        let summary = self.bookkeeper.investor_summary()?;
        Ok(format!(
            "Recorded {} {}; net capital {}",
            entry.kind,
            format_cop(entry.amount),
            output::money(summary.net_capital)
        ))
    }

    fn report(&mut self, args: &[String]) -> Result<String, AppError> {
        let (from, to) = match (optional_date(args.first())?, optional_date(args.get(1))?) {
            (None, None) => SystemClock.current_month(),
            (from, to) => (from.unwrap_or_default(), to.unwrap_or_else(today_iso)),
        };
        let report = self.bookkeeper.profit_report(
            Some(from.as_str()),
            Some(to.as_str()),
            self.config.investor_share_percent(),
        )?;
        Ok(format!(
            "{from} .. {to}\n{}",
            output::profit(&report, &self.bookkeeper.investor_summary()?)
        ))
    }

    fn configure(&mut self, args: &[String]) -> Result<String, AppError> {
        match args.first().map(String::as_str) {
            None | Some("show") => Ok(serde_json::to_string_pretty(&self.config)
                .map_err(|err| AppError::usage(err.to_string()))?),
            Some("set") => {
                let key = arg(args, 1, "key")?;
                let value = args.get(2..).map(|rest| rest.join(" ")).unwrap_or_default();
                self.config = self.config_manager.update(&self.config, key, &value)?;
                Ok(format!("Updated {key}"))
            }
            Some("backups") => {
                let backups = self.config_manager.list_backups()?;
                if backups.is_empty() {
                    return Ok("No config backups".to_string());
                }
                Ok(backups
                    .into_iter()
                    .map(|backup| backup.name)
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Some("restore") => {
                self.config = self.config_manager.restore(arg(args, 1, "backup name")?)?;
                Ok("Configuration restored".to_string())
            }
            Some(other) => Err(AppError::usage(format!("unknown config action `{other}`"))),
        }
    }

    /// Accepts an item id or a unique case-insensitive item name.
    fn resolve_item(&self, key: &str) -> Result<String, AppError> {
        let items = self.bookkeeper.items()?;
        if let Some(item) = items.iter().find(|item| item.id == key) {
            return Ok(item.id.clone());
        }
        let matches: Vec<_> = items
            .iter()
            .filter(|item| names_match(&item.name, key))
            .collect();
        match matches.as_slice() {
            [item] => Ok(item.id.clone()),
            [] => Err(AppError::usage(format!("unknown item `{key}`"))),
            _ => Err(AppError::usage(format!(
                "`{key}` matches several items; use the item id"
            ))),
        }
    }
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str, AppError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| AppError::usage(format!("missing <{name}>")))
}

fn parse_amount(raw: &str) -> Result<f64, AppError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| AppError::usage(format!("invalid amount `{raw}`")))
}

fn parse_quantity(raw: &str) -> Result<i64, AppError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::usage(format!("invalid quantity `{raw}`")))
}

/// `today` (or `-`) means the current date; otherwise `YYYY-MM-DD`.
fn optional_date(raw: Option<&String>) -> Result<Option<String>, AppError> {
    let Some(raw) = raw.map(|value| value.trim()) else {
        return Ok(None);
    };
    if raw == "today" || raw == "-" {
        return Ok(Some(today_iso()));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|date| Some(date.format("%Y-%m-%d").to_string()))
        .map_err(|_| AppError::usage(format!("invalid date `{raw}`, expected YYYY-MM-DD")))
}

fn parse_method(raw: &str) -> Result<PaymentMethod, AppError> {
    PaymentMethod::parse(raw).ok_or_else(|| {
        AppError::usage(format!(
            "unknown method `{raw}`; use Efectivo, Transferencia or Tarjeta"
        ))
    })
}

fn parse_terms(raw: &str) -> Result<PurchaseTerms, AppError> {
    match raw.trim().to_lowercase().as_str() {
        "credit" | "credito" | "crédito" => Ok(PurchaseTerms::SupplierCredit { due_date: None }),
        _ => parse_method(raw).map(PurchaseTerms::Cash),
    }
}

fn parse_side(raw: &str) -> Result<DebtorKind, AppError> {
    match raw.trim().to_lowercase().as_str() {
        "customer" | "customers" | "clientes" => Ok(DebtorKind::Customer),
        "supplier" | "suppliers" | "proveedores" => Ok(DebtorKind::Supplier),
        _ => Err(AppError::usage(format!(
            "expected customers or suppliers, got `{raw}`"
        ))),
    }
}

fn unknown_command(input: &str) -> AppError {
    let suggestion = COMMANDS
        .iter()
        .map(|name| (levenshtein(name, input), *name))
        .min_by_key(|(distance, _)| *distance)
        .filter(|(distance, _)| *distance <= 3);
    match suggestion {
        Some((_, best)) => AppError::usage(format!(
            "unknown command `{input}`. Suggestion: `{best}`?"
        )),
        None => AppError::usage(format!(
            "unknown command `{input}`. Run `shopbook_cli help` for usage."
        )),
    }
}

fn usage_text() -> String {
    "Usage: shopbook_cli <command>\n\
     Commands:\n  \
     settle-customer <name> <amount> [date] [method] [notes]\n  \
     settle-supplier <name> <amount> [date] [method] [notes]\n  \
     ledger [from] [to]\n  \
     balances\n  \
     debtors customers|suppliers\n  \
     balance customer|supplier <name>\n  \
     add-item <name> <cost> <price> [stock] [brand] [--inv]\n  \
     items\n  \
     sale <item> <quantity> <payment> [date] [customer] [unit price]\n  \
     purchase <item> <quantity> <unit cost> <method|credit> [date] [supplier]\n  \
     expense <amount> <method|credit> [date] [supplier] [notes]\n  \
     investor aporte|retiro|utilidad <amount> [date] [notes]\n  \
     report [from] [to]\n  \
     warnings\n  \
     backup [note] | backups | restore <backup id>\n  \
     config [show] | config set <key> <value> | config backups | config restore <name>\n  \
     script < commands.txt"
        .to_string()
}

fn print_usage() {
    eprintln!("{}", usage_text());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_commands() {
        let err = unknown_command("balnces");
        assert!(err.to_string().contains("Suggestion: `balances`?"));
        let err = unknown_command("zzzzzzzzzzzz");
        assert!(!err.to_string().contains("Suggestion"));
    }

    #[test]
    fn dates_are_validated() {
        assert_eq!(
            optional_date(Some(&"2024-02-29".to_string())).unwrap(),
            Some("2024-02-29".to_string())
        );
        assert!(optional_date(Some(&"2023-02-29".to_string())).is_err());
        assert_eq!(optional_date(None).unwrap(), None);
    }

    #[test]
    fn purchase_terms_accept_credit_aliases() {
        assert_eq!(
            parse_terms("Crédito").unwrap(),
            PurchaseTerms::SupplierCredit { due_date: None }
        );
        assert_eq!(
            parse_terms("tarjeta").unwrap(),
            PurchaseTerms::Cash(PaymentMethod::Card)
        );
        assert!(parse_terms("barter").is_err());
    }
}
