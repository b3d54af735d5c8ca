//! split-ledger CLI
//!
//! Run balance and settlement queries over a JSON snapshot of events and
//! expenses.
//!
//! # Usage
//!
//! ```bash
//! # Balances and settling payments of one event
//! split-ledger settle --input snapshot.json --event trip-2024
//!
//! # What the session user owes and is owed, per currency
//! split-ledger exposure --input snapshot.json --format json
//!
//! # Direct payments between the session user and one contact
//! split-ledger pairwise --input snapshot.json --contact c-42
//!
//! # Generate a random snapshot for testing
//! split-ledger generate --participants 10 --events 5
//! ```

use serde::Serialize;
use split_ledger::core::currency::{CurrencyCode, CurrencyFormat, SymbolFormat};
use split_ledger::core::event::Event;
use split_ledger::core::party::{merge_session_participant, ParticipantId};
use split_ledger::core::snapshot::Snapshot;
use split_ledger::optimization::exposure::{Direction, EventSettlement, ExposureAggregator};
use split_ledger::optimization::spending::SpendingSummary;
use split_ledger::simulation::stress_test::{generate_random_snapshot, NetworkConfig};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"split-ledger — balances and debt settlement for shared expenses

USAGE:
    split-ledger <COMMAND> [OPTIONS]

COMMANDS:
    balances    Net balance of every participant in each event
    settle      Settling payments for each event
    exposure    What you owe and are owed, per currency
    pairwise    Direct payments between you and one contact
    generate    Generate a random snapshot (for testing)
    help        Show this message

OPTIONS (balances, settle, exposure, pairwise):
    --input <FILE>      Path to JSON snapshot file
    --format <FORMAT>   Output format: text (default) or json
    --event <ID>        Only this event (balances, settle)
    --contact <ID>      Contact to compare against (pairwise, required)

OPTIONS (generate):
    --participants <N>  Contact pool size (default: 8)
    --events <N>        Number of events (default: 3)
    --expenses <N>      Expenses per event (default: 10)
    --currencies <LIST> Comma-separated currency codes (default: USD)
    --output <FILE>     Write to file instead of stdout

Set RUST_LOG=debug for per-event diagnostics."#
    );
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

#[derive(Default)]
struct QueryOptions {
    input: Option<String>,
    format: Option<String>,
    event: Option<String>,
    contact: Option<String>,
}

impl QueryOptions {
    fn parse(args: &[String]) -> Self {
        let mut options = Self::default();
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            i += 1;
            let value = args
                .get(i)
                .cloned()
                .unwrap_or_else(|| fail(format!("{} requires a value", flag)));
            match flag {
                "--input" => options.input = Some(value),
                "--format" => options.format = Some(value),
                "--event" => options.event = Some(value),
                "--contact" => options.contact = Some(value),
                _ => fail(format!("unknown option: {}", flag)),
            }
            i += 1;
        }
        options
    }

    fn json(&self) -> bool {
        match self.format.as_deref() {
            None | Some("text") => false,
            Some("json") => true,
            Some(other) => fail(format!("unknown format '{}', expected text or json", other)),
        }
    }

    fn snapshot(&self) -> Snapshot {
        let path = self
            .input
            .as_deref()
            .unwrap_or_else(|| fail("--input <FILE> is required"));
        let content = fs::read_to_string(path)
            .unwrap_or_else(|e| fail(format!("cannot read '{}': {}", path, e)));
        Snapshot::from_json(&content).unwrap_or_else(|e| {
            eprintln!("Expected format:");
            eprintln!(
                r#"{{
  "session": {{ "id": "u-1", "name": "Olena", "email": "olena@example.com" }},
  "events": [ {{ "id": "trip", "currency": "EUR", "participants": [ {{ "id": "c-1", "name": "Taras" }} ] }} ],
  "expenses": [ {{ "id": "x-1", "event_id": "trip", "amount": 40,
                 "paid_by": [ {{ "user_id": "u-1", "amount": 40 }} ],
                 "split_between": [ {{ "contact_id": "c-1", "amount": 40 }} ] }} ]
}}"#
            );
            fail(format!("invalid snapshot JSON: {}", e))
        })
    }

    /// Events selected by `--event`, or all of them.
    fn events<'a>(&self, snapshot: &'a Snapshot) -> Vec<&'a Event> {
        match &self.event {
            Some(id) => match snapshot.event(id) {
                Some(event) => vec![event],
                None => fail(format!("no event with id '{}'", id)),
            },
            None => snapshot.events.iter().collect(),
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail(format!("cannot serialize output: {}", e)),
    }
}

fn settlements(
    options: &QueryOptions,
    snapshot: &Snapshot,
) -> Vec<(EventSettlement, SpendingSummary)> {
    let expenses = snapshot.expenses_by_event();
    options
        .events(snapshot)
        .into_iter()
        .map(|event| {
            let event_expenses = expenses.for_event(&event.id);
            let settlement =
                ExposureAggregator::event_settlement(event, event_expenses, &snapshot.session)
                    .unwrap_or_else(|e| fail(e));
            let summary = SpendingSummary::for_event(event, event_expenses, &snapshot.session);
            (settlement, summary)
        })
        .collect()
}

fn display_name(snapshot: &Snapshot, event_id: &str, id: &ParticipantId) -> String {
    let listed = snapshot
        .event(event_id)
        .map(|event| merge_session_participant(&event.participants, &snapshot.session))
        .unwrap_or_default();
    listed
        .into_iter()
        .find(|p| &p.id == id)
        .map(|p| p.name)
        .unwrap_or_else(|| id.to_string())
}

fn cmd_balances(args: &[String]) {
    let options = QueryOptions::parse(args);
    let snapshot = options.snapshot();
    let results = settlements(&options, &snapshot);

    if options.json() {
        #[derive(Serialize)]
        struct BalancesOutput<'a> {
            event_id: &'a str,
            currency: &'a CurrencyCode,
            balances: &'a split_ledger::core::ledger::Ledger,
            totals: &'a SpendingSummary,
        }
        let output: Vec<BalancesOutput> = results
            .iter()
            .map(|(settlement, summary)| BalancesOutput {
                event_id: &settlement.event_id,
                currency: &settlement.currency,
                balances: &settlement.ledger,
                totals: summary,
            })
            .collect();
        print_json(&output);
        return;
    }

    for (settlement, summary) in &results {
        println!("=== Event {} ({}) ===", settlement.event_id, settlement.currency);
        for (id, balance) in settlement.ledger.iter() {
            let marker = if id == &settlement.session_participant {
                " (you)"
            } else {
                ""
            };
            println!(
                "  {:<24} {:>14}{}",
                display_name(&snapshot, &settlement.event_id, id),
                SymbolFormat.format_signed(balance, &settlement.currency),
                marker
            );
        }
        println!("  You owe:      {}", SymbolFormat.format(summary.you_owe, &summary.currency));
        println!("  Owed to you:  {}", SymbolFormat.format(summary.owed_to_you, &summary.currency));
        if !summary.spent.is_empty() {
            println!("  Total spent:");
            for spend in &summary.spent {
                println!(
                    "    {:<22} {:>14}",
                    spend.name,
                    SymbolFormat.format(spend.amount, &summary.currency)
                );
            }
        }
        println!();
    }
}

fn cmd_settle(args: &[String]) {
    let options = QueryOptions::parse(args);
    let snapshot = options.snapshot();
    let results = settlements(&options, &snapshot);

    if options.json() {
        let output: Vec<&EventSettlement> = results.iter().map(|(s, _)| s).collect();
        print_json(&output);
        return;
    }

    for (settlement, _) in &results {
        println!("=== Event {} ({}) ===", settlement.event_id, settlement.currency);
        if settlement.transactions.is_empty() {
            println!("  Settled.");
        }
        for tx in &settlement.transactions {
            println!(
                "  {} pays {} {}",
                display_name(&snapshot, &settlement.event_id, &tx.from),
                display_name(&snapshot, &settlement.event_id, &tx.to),
                SymbolFormat.format(tx.amount, &settlement.currency)
            );
        }
        println!();
    }
}

fn cmd_exposure(args: &[String]) {
    let options = QueryOptions::parse(args);
    let snapshot = options.snapshot();
    let report = ExposureAggregator::exposure_report(
        &snapshot.events,
        &snapshot.expenses_by_event(),
        &snapshot.session,
    );
    for err in &report.failed {
        eprintln!("Warning: left out of totals: {}", err);
    }
    let exposure = report.exposure;

    if options.json() {
        print_json(&exposure);
        return;
    }

    println!("You owe:");
    if exposure.owe_by_currency.is_empty() {
        println!("  nothing");
    }
    for (currency, amount) in &exposure.owe_by_currency {
        println!("  {}", SymbolFormat.format(*amount, currency));
    }
    println!("Owed to you:");
    if exposure.owed_by_currency.is_empty() {
        println!("  nothing");
    }
    for (currency, amount) in &exposure.owed_by_currency {
        println!("  {}", SymbolFormat.format(*amount, currency));
    }
}

fn cmd_pairwise(args: &[String]) {
    let options = QueryOptions::parse(args);
    let contact = options
        .contact
        .clone()
        .map(ParticipantId::new)
        .unwrap_or_else(|| fail("--contact <ID> is required"));
    let snapshot = options.snapshot();
    let records = ExposureAggregator::pairwise_exposure(
        &snapshot.events,
        &snapshot.expenses_by_event(),
        &snapshot.session,
        &contact,
    )
    .unwrap_or_else(|e| fail(e));

    if options.json() {
        print_json(&records);
        return;
    }

    if records.is_empty() {
        println!("Nothing to settle with {}.", contact);
    }
    for record in &records {
        let amount = SymbolFormat.format(record.amount, &record.currency);
        match record.direction {
            Direction::YouOwe => println!("  {}: you owe {}", record.event_id, amount),
            Direction::TheyOwe => println!("  {}: they owe you {}", record.event_id, amount),
        }
    }
}

fn cmd_generate(args: &[String]) {
    let mut config = NetworkConfig::default();
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        i += 1;
        let value = args
            .get(i)
            .cloned()
            .unwrap_or_else(|| fail(format!("{} requires a value", flag)));
        let number = || {
            value
                .parse::<usize>()
                .unwrap_or_else(|_| fail(format!("{} requires a number", flag)))
        };
        match flag {
            "--participants" => config.participant_count = number(),
            "--events" => config.event_count = number(),
            "--expenses" => config.expenses_per_event = number(),
            "--currencies" => {
                config.currencies = value
                    .split(',')
                    .map(|s| CurrencyCode::new(s.trim()))
                    .collect()
            }
            "--output" => output_path = Some(value.clone()),
            _ => fail(format!("unknown option: {}", flag)),
        }
        i += 1;
    }

    let snapshot = generate_random_snapshot(&config);
    let json = serde_json::to_string_pretty(&snapshot)
        .unwrap_or_else(|e| fail(format!("cannot serialize snapshot: {}", e)));

    if let Some(path) = output_path {
        fs::write(&path, &json)
            .unwrap_or_else(|e| fail(format!("cannot write '{}': {}", path, e)));
        eprintln!(
            "Generated {} expenses across {} events → {}",
            snapshot.expenses.len(),
            snapshot.events.len(),
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "balances" => cmd_balances(rest),
        "settle" => cmd_settle(rest),
        "exposure" => cmd_exposure(rest),
        "pairwise" => cmd_pairwise(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
