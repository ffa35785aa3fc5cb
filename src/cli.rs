// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, Arg, ArgAction, Command};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

fn required(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).required(true).help(help)
}

fn optional(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).help(help)
}

fn stay_args(cmd: Command) -> Command {
    cmd.arg(required("customer", "Customer id"))
        .arg(required("hotel", "Hotel rate card id"))
        .arg(required("check-in", "Check-in date YYYY-MM-DD"))
        .arg(required("check-out", "Check-out date YYYY-MM-DD"))
        .arg(
            Arg::new("rooms")
                .long("rooms")
                .default_value("1")
                .help("Number of rooms"),
        )
}

pub fn build_cli() -> Command {
    Command::new("hotelbook")
        .version(crate_version!())
        .about("Hotel booking back office: pricing, invoices, payments and reports")
        .subcommand(Command::new("init").about("Create the database if it does not exist"))
        .subcommand(
            Command::new("config")
                .about("Show or change persistent settings")
                .subcommand(json_args(Command::new("show")))
                .subcommand(
                    Command::new("set-currency")
                        .about("Currency label used when printing amounts")
                        .arg(Arg::new("code").required(true)),
                )
                .subcommand(
                    Command::new("set-invoice-prefix")
                        .about("Prefix for newly issued invoice numbers")
                        .arg(Arg::new("prefix").required(true)),
                ),
        )
        .subcommand(
            Command::new("customer")
                .about("Manage customers")
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Full name"))
                        .arg(required("address", "Postal address"))
                        .arg(required("phone", "Phone number"))
                        .arg(required("email", "Email address")),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(
                    Command::new("update")
                        .arg(Arg::new("id").required(true))
                        .arg(optional("name", "Full name"))
                        .arg(optional("address", "Postal address"))
                        .arg(optional("phone", "Phone number"))
                        .arg(optional("email", "Email address")),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").required(true))),
        )
        .subcommand(
            Command::new("hotel")
                .about("Manage hotel rate cards")
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Hotel name"))
                        .arg(required("location", "City or area"))
                        .arg(required("room-type", "double|triple|quad"))
                        .arg(required("meal-package", "fullboard|halfboard"))
                        .arg(required("base-price", "Cost price per room per night"))
                        .arg(required("markup", "Markup percentage")),
                )
                .subcommand(json_args(Command::new("list")))
                .subcommand(
                    Command::new("update")
                        .arg(Arg::new("id").required(true))
                        .arg(optional("name", "Hotel name"))
                        .arg(optional("location", "City or area"))
                        .arg(optional("room-type", "double|triple|quad"))
                        .arg(optional("meal-package", "fullboard|halfboard"))
                        .arg(optional("base-price", "Cost price per room per night"))
                        .arg(optional("markup", "Markup percentage")),
                )
                .subcommand(Command::new("rm").arg(Arg::new("id").required(true))),
        )
        .subcommand(
            Command::new("booking")
                .about("Price and create bookings")
                .subcommand(json_args(stay_args(
                    Command::new("preview").about("Price a stay without booking it"),
                )))
                .subcommand(json_args(stay_args(
                    Command::new("create").about("Book a stay and issue its invoice"),
                )))
                .subcommand(json_args(Command::new("list"))),
        )
        .subcommand(
            Command::new("invoice")
                .about("Look up invoices")
                .subcommand(json_args(
                    Command::new("show").arg(Arg::new("number").required(true)),
                )),
        )
        .subcommand(
            Command::new("payment")
                .about("Record payments against invoices")
                .subcommand(json_args(
                    Command::new("record")
                        .arg(required("booking", "Booking id"))
                        .arg(required("amount", "Amount paid"))
                        .arg(
                            Arg::new("method")
                                .long("method")
                                .default_value("cash")
                                .help("cash|card|bank_transfer|online"),
                        ),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Financial reports")
                .subcommand(json_args(Command::new("profit-loss")))
                .subcommand(json_args(
                    Command::new("monthly")
                        .arg(
                            Arg::new("year")
                                .long("year")
                                .value_parser(clap::value_parser!(i32)),
                        )
                        .arg(
                            Arg::new("month")
                                .long("month")
                                .value_parser(clap::value_parser!(u32)),
                        ),
                ))
                .subcommand(json_args(Command::new("outstanding"))),
        )
        .subcommand(
            Command::new("export")
                .about("Export records to a file")
                .subcommand(
                    Command::new("bookings")
                        .arg(required("format", "csv|json"))
                        .arg(required("out", "Output path")),
                )
                .subcommand(
                    Command::new("payments")
                        .arg(required("format", "csv|json"))
                        .arg(required("out", "Output path")),
                ),
        )
        .subcommand(json_args(
            Command::new("doctor").about("Check stored data for inconsistencies"),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        build_cli().debug_assert();
    }
}
