// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use hotelbook::commands::{
    bookings, customers, doctor, hotels, invoices, payments, reports, settings,
};
use hotelbook::config::Config;
use hotelbook::models::PaymentMethod;
use hotelbook::{cli, Engine, EngineError, SqliteStore, Store};
use rust_decimal_macros::dec;

type Handler = fn(&Engine<SqliteStore>, &clap::ArgMatches) -> anyhow::Result<()>;

fn run(engine: &Engine<SqliteStore>, args: &[&str]) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from(args.iter().copied());
    let (name, sub) = matches.subcommand().expect("no subcommand");
    let handler: Handler = match name {
        "config" => settings::handle,
        "customer" => customers::handle,
        "hotel" => hotels::handle,
        "booking" => bookings::handle,
        "invoice" => invoices::handle,
        "payment" => payments::handle,
        "report" => reports::handle,
        "doctor" => doctor::handle,
        other => panic!("unexpected subcommand {}", other),
    };
    handler(engine, sub)
}

fn setup() -> Engine<SqliteStore> {
    let engine = Engine::new(SqliteStore::open_in_memory().unwrap());
    run(
        &engine,
        &[
            "hotelbook", "customer", "add", "--name", "Aisha Rahman", "--address", "Jeddah",
            "--phone", "+966500000001", "--email", "aisha@example.com",
        ],
    )
    .unwrap();
    run(
        &engine,
        &[
            "hotelbook", "hotel", "add", "--name", "Hilton Makkah", "--location", "Makkah",
            "--room-type", "double", "--meal-package", "fullboard", "--base-price", "200",
            "--markup", "20",
        ],
    )
    .unwrap();
    engine
}

fn book(engine: &Engine<SqliteStore>) {
    run(
        engine,
        &[
            "hotelbook", "booking", "create", "--customer", "1", "--hotel", "1", "--check-in",
            "2024-01-01", "--check-out", "2024-01-03", "--rooms", "2",
        ],
    )
    .unwrap();
}

#[test]
fn add_commands_persist_records() {
    let engine = setup();
    let customers = engine.store().list_customers().unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].email, "aisha@example.com");

    let listings = hotels::listings(&engine).unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].rate_card.room_type.as_str(), "double");
    assert_eq!(listings[0].selling_price_per_night, dec!(240));
}

#[test]
fn hotel_add_rejects_bad_enum_and_price() {
    let engine = setup();
    assert!(
        run(
            &engine,
            &[
                "hotelbook", "hotel", "add", "--name", "X", "--location", "Y", "--room-type",
                "single", "--meal-package", "fullboard", "--base-price", "100", "--markup", "5",
            ],
        )
        .is_err()
    );
    let err = run(
        &engine,
        &[
            "hotelbook", "hotel", "add", "--name", "X", "--location", "Y", "--room-type",
            "quad", "--meal-package", "halfboard", "--base-price", "0", "--markup", "5",
        ],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::InvalidRateCard(_))
    ));
    assert_eq!(engine.store().list_rate_cards().unwrap().len(), 1);
}

#[test]
fn customer_update_changes_only_given_fields() {
    let engine = setup();
    run(
        &engine,
        &["hotelbook", "customer", "update", "1", "--phone", "+966511111111"],
    )
    .unwrap();
    let c = engine.store().get_customer(1).unwrap().unwrap();
    assert_eq!(c.phone, "+966511111111");
    assert_eq!(c.name, "Aisha Rahman");
}

#[test]
fn booking_preview_commits_nothing_and_create_does() {
    let engine = setup();
    run(
        &engine,
        &[
            "hotelbook", "booking", "preview", "--customer", "1", "--hotel", "1", "--check-in",
            "2024-01-01", "--check-out", "2024-01-03", "--rooms", "2", "--json",
        ],
    )
    .unwrap();
    assert!(engine.list_bookings().unwrap().is_empty());

    book(&engine);
    let bookings = engine.list_bookings().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0].total_price, dec!(960));
}

#[test]
fn booking_with_inverted_dates_fails() {
    let engine = setup();
    let err = run(
        &engine,
        &[
            "hotelbook", "booking", "create", "--customer", "1", "--hotel", "1", "--check-in",
            "2024-01-03", "--check-out", "2024-01-01",
        ],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::InvalidDateRange { .. })
    ));
}

#[test]
fn payment_record_enforces_balance() {
    let engine = setup();
    book(&engine);
    run(
        &engine,
        &["hotelbook", "payment", "record", "--booking", "1", "--amount", "900", "--method", "bank-transfer"],
    )
    .unwrap();
    let err = run(
        &engine,
        &["hotelbook", "payment", "record", "--booking", "1", "--amount", "60.01"],
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::OverpaymentRejected { .. })
    ));

    let payments = engine.store().list_payments().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].payment_method, PaymentMethod::BankTransfer);

    let number = payments[0].invoice_number.clone();
    run(&engine, &["hotelbook", "invoice", "show", &number]).unwrap();
    run(&engine, &["hotelbook", "invoice", "show", "INV-MISSING"]).unwrap();
}

#[test]
fn remove_booked_customer_is_refused() {
    let engine = setup();
    book(&engine);
    let err = run(&engine, &["hotelbook", "customer", "rm", "1"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::ReferentialConflict(_))
    ));
}

#[test]
fn reports_run_and_validate_filters() {
    let engine = setup();
    book(&engine);
    run(&engine, &["hotelbook", "report", "profit-loss"]).unwrap();
    run(&engine, &["hotelbook", "report", "outstanding", "--jsonl"]).unwrap();
    run(
        &engine,
        &["hotelbook", "report", "monthly", "--year", "2024", "--month", "1"],
    )
    .unwrap();
    let err = run(&engine, &["hotelbook", "report", "monthly", "--month", "13"]).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<EngineError>(),
        Some(EngineError::InvalidReportFilter(_))
    ));
}

#[test]
fn profit_loss_totals_sum_columns() {
    let engine = setup();
    book(&engine);
    book(&engine);
    let rows = engine.profit_loss_report().unwrap();
    let (base, selling, profit) = reports::profit_loss_totals(&rows);
    assert_eq!(base, dec!(1600));
    assert_eq!(selling, dec!(1920));
    assert_eq!(profit, dec!(320));
}

#[test]
fn config_commands_update_settings() {
    let engine = setup();
    run(&engine, &["hotelbook", "config", "set-currency", "usd"]).unwrap();
    run(&engine, &["hotelbook", "config", "set-invoice-prefix", "hb"]).unwrap();
    assert!(run(&engine, &["hotelbook", "config", "set-invoice-prefix", "H-B"]).is_err());
    let cfg = Config::load(engine.store()).unwrap();
    assert_eq!(cfg.currency, "USD");
    assert_eq!(cfg.invoice_prefix, "HB");
}

#[test]
fn doctor_is_clean_then_flags_pricing_drift() {
    let engine = setup();
    book(&engine);
    run(&engine, &["hotelbook", "doctor"]).unwrap();
    assert!(doctor::find_issues(&engine).unwrap().is_empty());

    run(&engine, &["hotelbook", "hotel", "update", "1", "--markup", "25"]).unwrap();
    let issues = doctor::find_issues(&engine).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, "pricing_drift");
}
