//! Weekend trip settlement example.
//!
//! Three friends share a trip in EUR while the signed-in user, who is not
//! listed on the trip, also pays for dinner. Shows the balances, the
//! settling payments, and the per-currency rollup.

use split_ledger::core::currency::{CurrencyCode, CurrencyFormat, SymbolFormat};
use split_ledger::core::event::Event;
use split_ledger::core::expense::{AllocationRef, Expense, ExpensesByEvent};
use split_ledger::core::party::{Participant, SessionIdentity};
use split_ledger::optimization::exposure::{Direction, ExposureAggregator};
use rust_decimal_macros::dec;

fn main() {
    println!("╔══════════════════════════════════════════╗");
    println!("║  split-ledger: Weekend Trip Settlement   ║");
    println!("╚══════════════════════════════════════════╝\n");

    let eur = CurrencyCode::new("EUR");
    let me = SessionIdentity::new("u-olena", "Olena", "olena@example.com");

    let trip = Event::new("lviv-weekend", eur.clone())
        .with_participant(Participant::new("c-taras", "Taras").with_email("taras@example.com"))
        .with_participant(Participant::new("c-iryna", "Iryna"));

    let expenses: ExpensesByEvent = vec![
        Expense::new("hotel", "lviv-weekend", dec!(240))
            .paid_by(AllocationRef::contact("c-taras"), dec!(240))
            .split_between(AllocationRef::user("u-olena"), dec!(80))
            .split_between(AllocationRef::contact("c-taras"), dec!(80))
            .split_between(AllocationRef::contact("c-iryna"), dec!(80)),
        Expense::new("dinner", "lviv-weekend", dec!(96))
            .paid_by(AllocationRef::user("u-olena"), dec!(96))
            .split_between(AllocationRef::user("u-olena"), dec!(32))
            .split_between(AllocationRef::contact("c-taras"), dec!(32))
            .split_between(AllocationRef::contact("c-iryna"), dec!(32)),
        Expense::new("museum", "lviv-weekend", dec!(30))
            .paid_by(AllocationRef::contact("c-iryna"), dec!(30))
            .split_between(AllocationRef::contact("c-iryna"), dec!(15))
            .split_between(AllocationRef::user("u-olena"), dec!(15)),
    ]
    .into_iter()
    .collect();

    let settlement = match ExposureAggregator::event_settlement(
        &trip,
        expenses.for_event(&trip.id),
        &me,
    ) {
        Ok(settlement) => settlement,
        Err(e) => {
            eprintln!("cannot settle trip: {}", e);
            return;
        }
    };

    println!("━━━ Balances ━━━\n");
    for (id, balance) in settlement.ledger.iter() {
        println!("  {:<10} {:>10}", id, SymbolFormat.format_signed(balance, &eur));
    }

    println!("\n━━━ Settling payments ━━━\n");
    for tx in &settlement.transactions {
        println!(
            "  {} → {}: {}",
            tx.from,
            tx.to,
            SymbolFormat.format(tx.amount, &eur)
        );
    }

    let events = [trip];
    if let Ok(exposure) = ExposureAggregator::aggregate_exposure(&events, &expenses, &me) {
        println!("\n{}", exposure);
    }

    if let Ok(records) =
        ExposureAggregator::pairwise_exposure(&events, &expenses, &me, &"c-taras".into())
    {
        for record in records {
            let verb = match record.direction {
                Direction::YouOwe => "you owe Taras",
                Direction::TheyOwe => "Taras owes you",
            };
            println!(
                "{}: {} {}",
                record.event_id,
                verb,
                SymbolFormat.format(record.amount, &record.currency)
            );
        }
    }
}
