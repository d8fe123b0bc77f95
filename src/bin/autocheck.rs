use clap::{Arg, ArgMatches, Command};
use log::debug;
use std::path::{Path, PathBuf};

use autocheck::checkout::{CheckoutExport, CheckoutForm};
use autocheck::client_auth::ClientSessionStore;
use autocheck::error::{Error, Result};
use autocheck::export;
use autocheck::intake::{CheckinExport, CheckinWizard};
use autocheck::parts::{PartsExport, PartsForm};
use autocheck::portal::PortalView;
use autocheck::staff::StaffRole;
use autocheck::AutoCheck;

fn client_number_arg() -> Arg<'static> {
    Arg::new("client-number")
        .help("Client number, e.g. CL-000123")
        .required(true)
}

fn draft_arg() -> Arg<'static> {
    Arg::new("draft")
        .help("JSON draft in the export format")
        .required(true)
}

fn export_dir_arg() -> Arg<'static> {
    Arg::new("export-dir")
        .long("export-dir")
        .value_name("DIR")
        .help("Also write the JSON export into this directory")
        .takes_value(true)
}

fn text_arg(name: &'static str, help: &'static str, required: bool) -> Arg<'static> {
    Arg::new(name)
        .long(name)
        .value_name("TEXT")
        .help(help)
        .takes_value(true)
        .required(required)
}

fn cli() -> Command<'static> {
    Command::new("autocheck")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Vehicle service-shop intake, approvals and tracking")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("session-file")
                .long("session-file")
                .value_name("FILE")
                .help("Where the customer session is kept")
                .takes_value(true)
                .global(true),
        )
        .subcommand(
            Command::new("portal")
                .about("Show status and progress of a client's visit")
                .arg(client_number_arg()),
        )
        .subcommand(
            Command::new("approve-checkin")
                .about("Approve the check-in report")
                .arg(client_number_arg()),
        )
        .subcommand(
            Command::new("approve-service")
                .about("Approve one proposed service")
                .arg(client_number_arg())
                .arg(Arg::new("service-id").required(true))
                .arg(text_arg("notes", "Note for the shop", false)),
        )
        .subcommand(
            Command::new("approve-checkout")
                .about("Approve the checkout")
                .arg(client_number_arg()),
        )
        .subcommand(Command::new("next-number").about("Generate a client number"))
        .subcommand(
            Command::new("login")
                .about("Sign in as a customer")
                .arg(client_number_arg())
                .arg(text_arg("password", "Portal password", true)),
        )
        .subcommand(Command::new("logout").about("Forget the customer session"))
        .subcommand(Command::new("stats").about("Client data quality counts"))
        .subcommand(Command::new("incomplete").about("List clients missing contact details"))
        .subcommand(Command::new("cleanup").about("Delete stale placeholder clients"))
        .subcommand(
            Command::new("recover")
                .about("Complete an incomplete client")
                .arg(Arg::new("client-id").required(true))
                .arg(text_arg("name", "Customer name", true))
                .arg(text_arg("phone", "Customer phone", true))
                .arg(text_arg("email", "Customer email", true)),
        )
        .subcommand(
            Command::new("checkin")
                .about("Submit a check-in draft")
                .arg(draft_arg())
                .arg(export_dir_arg()),
        )
        .subcommand(
            Command::new("parts")
                .about("Save a parts and service draft for a client")
                .arg(client_number_arg())
                .arg(draft_arg())
                .arg(export_dir_arg()),
        )
        .subcommand(
            Command::new("checkout")
                .about("Save a checkout draft for a client")
                .arg(client_number_arg())
                .arg(draft_arg())
                .arg(export_dir_arg()),
        )
        .subcommand(
            Command::new("signup")
                .about("Register a staff member")
                .arg(text_arg("email", "Staff email", true))
                .arg(text_arg("password", "Password", true))
                .arg(text_arg("name", "Display name", false)),
        )
        .subcommand(
            Command::new("reset-password")
                .about("Send a staff password reset email")
                .arg(text_arg("email", "Staff email", true)),
        )
        .subcommand(
            Command::new("has-role")
                .about("Check whether the signed-in staff member holds a role")
                .arg(Arg::new("role").required(true).possible_values(["mechanic", "supervisor"])),
        )
}

fn required<'m>(matches: &'m ArgMatches, name: &str) -> Result<&'m str> {
    matches
        .value_of(name)
        .ok_or_else(|| Error::validation(format!("missing <{}>", name)))
}

/// Signs in staff from `AUTOCHECK_STAFF_EMAIL` / `AUTOCHECK_STAFF_PASSWORD` when both are set
async fn staff_sign_in(shop: &AutoCheck) -> Result<bool> {
    match (
        std::env::var("AUTOCHECK_STAFF_EMAIL"),
        std::env::var("AUTOCHECK_STAFF_PASSWORD"),
    ) {
        (Ok(email), Ok(password)) if !email.is_empty() => {
            shop.staff().sign_in(&email, &password).await?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Customers may only act on their own number; signed-in staff on any
fn authorize(store: &ClientSessionStore, client_number: &str, staff: bool) -> Result<()> {
    if staff {
        return Ok(());
    }
    match store.load() {
        Some(session) if session.authorizes(client_number) => Ok(()),
        Some(session) => Err(Error::auth(format!(
            "signed in as {}, not {}",
            session.client_number, client_number
        ))),
        None => Err(Error::auth("not signed in; run `autocheck login` first")),
    }
}

fn print_portal(view: &PortalView) {
    println!(
        "{} ({})",
        view.client.display_name(),
        view.client.client_number
    );
    if !view.client.is_complete() {
        println!("  contact details incomplete");
    }
    println!("  stage:    {}", view.stage());
    println!("  progress: {}", view.progress());
    for milestone in view.milestones() {
        let mark = if milestone.done { "x" } else { " " };
        println!("  [{}] {}", mark, milestone.label);
    }
    if let Some(checkin) = &view.checkin {
        println!(
            "  vehicle:  {} {} {}",
            checkin.car_model.as_deref().unwrap_or("-"),
            checkin.car_year.as_deref().unwrap_or("-"),
            checkin.plate.as_deref().unwrap_or("-"),
        );
    }
    for service in &view.services {
        let cost = service
            .estimated_cost
            .map(|cost| format!("{:.2}", cost))
            .unwrap_or_else(|| "-".to_string());
        let state = if service.is_approved() { "approved" } else { "pending" };
        println!(
            "  service {}: {} (est. {}) {}",
            service.id, service.service_description, cost, state
        );
    }
    if view.checkout_available() {
        println!("  checkout ready for approval");
    }
}

fn write_export<T: serde::Serialize>(dir: Option<&str>, file_name: &str, value: &T) -> Result<()> {
    if let Some(dir) = dir {
        let path = export::write_json(Path::new(dir), file_name, value)?;
        println!("exported {}", path.display());
    }
    Ok(())
}

async fn run(matches: ArgMatches) -> Result<()> {
    let shop = AutoCheck::from_env()?;
    let store = matches
        .value_of("session-file")
        .map(ClientSessionStore::new)
        .unwrap_or_default();
    debug!("Customer session file: {}", store.path().display());

    let (command, args) = matches
        .subcommand()
        .ok_or_else(|| Error::validation("no command given"))?;

    match command {
        "portal" => {
            let number = required(args, "client-number")?;
            let staff = staff_sign_in(&shop).await?;
            authorize(&store, number, staff)?;
            let view = shop.portal().load(number).await?;
            print_portal(&view);
        }
        "approve-checkin" | "approve-checkout" => {
            let number = required(args, "client-number")?;
            let staff = staff_sign_in(&shop).await?;
            authorize(&store, number, staff)?;
            let portal = shop.portal();
            let mut view = portal.load(number).await?;
            if command == "approve-checkin" {
                portal.approve_checkin(&mut view).await?;
            } else {
                portal.approve_checkout(&mut view).await?;
            }
            print_portal(&view);
        }
        "approve-service" => {
            let number = required(args, "client-number")?;
            let service_id = required(args, "service-id")?;
            let staff = staff_sign_in(&shop).await?;
            authorize(&store, number, staff)?;
            let portal = shop.portal();
            let mut view = portal.load(number).await?;
            portal
                .approve_service(&mut view, service_id, args.value_of("notes"))
                .await?;
            print_portal(&view);
        }
        "next-number" => {
            println!("{}", shop.clients().generate_client_number().await?);
        }
        "login" => {
            let number = required(args, "client-number")?;
            let password = required(args, "password")?;
            let session = shop.client_auth().sign_in(number, password).await?;
            store.save(&session)?;
            println!("signed in as {} ({})", session.customer_name, session.client_number);
        }
        "logout" => {
            store.clear()?;
            println!("signed out");
        }
        "stats" => {
            staff_sign_in(&shop).await?;
            let stats = shop.quality().client_stats().await?;
            println!("total:    {}", stats.total);
            println!("pending:  {}", stats.pending);
            println!("complete: {}", stats.complete);
            println!("rate:     {:.1}%", stats.completion_rate);
        }
        "incomplete" => {
            staff_sign_in(&shop).await?;
            for client in shop.quality().incomplete_clients().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    client.id,
                    client.client_number,
                    client.customer_name.as_deref().unwrap_or("-"),
                    if client.has_checkin { "has check-in" } else { "no check-in" }
                );
            }
        }
        "cleanup" => {
            staff_sign_in(&shop).await?;
            let cleaned = shop.quality().cleanup_pending_clients().await?;
            println!("removed {} pending clients", cleaned);
        }
        "recover" => {
            staff_sign_in(&shop).await?;
            let recovered = shop
                .clients()
                .recover_incomplete(
                    required(args, "client-id")?,
                    required(args, "name")?,
                    required(args, "phone")?,
                    required(args, "email")?,
                )
                .await?;
            if !recovered {
                return Err(Error::validation("please fill in all customer information fields"));
            }
            println!("client completed");
        }
        "checkin" => {
            staff_sign_in(&shop).await?;
            let draft: CheckinExport = export::read_json(&PathBuf::from(required(args, "draft")?))?;
            let mut wizard = CheckinWizard::from_export(&draft)?;
            let receipt = wizard.submit(&shop).await?;
            println!("client number: {}", receipt.client_number);
            println!("check-in:      {}", receipt.checkin_id);
            println!(
                "uploaded {} media files, recorded {} media and {} checklist rows",
                receipt.media_uploaded, receipt.media_recorded, receipt.items_recorded
            );
            if let Some(password) = &receipt.password {
                println!("portal password: {}", password);
            }
            if let Some(url) = &receipt.portal_url {
                println!("tracking link: {}", url);
            }
            if let Some(url) = &receipt.completion_url {
                println!("confirmation:  {}", url);
            }
            let exported = wizard.export();
            write_export(args.value_of("export-dir"), &exported.file_name(), &exported)?;
        }
        "parts" => {
            staff_sign_in(&shop).await?;
            let client = shop
                .clients()
                .find_by_number(required(args, "client-number")?)
                .await?;
            let draft: PartsExport = export::read_json(&PathBuf::from(required(args, "draft")?))?;
            let mut form = PartsForm::from_export(&draft)?;
            let row = form.save(&shop, &client).await?;
            println!("saved parts session {}", row.id);
            let exported = form.export();
            write_export(args.value_of("export-dir"), &exported.file_name(), &exported)?;
        }
        "checkout" => {
            staff_sign_in(&shop).await?;
            let client = shop
                .clients()
                .find_by_number(required(args, "client-number")?)
                .await?;
            let draft: CheckoutExport =
                export::read_json(&PathBuf::from(required(args, "draft")?))?;
            let mut form = CheckoutForm::from_export(&draft)?;
            let row = form.save(&shop, &client).await?;
            println!(
                "saved checkout session {} ({}/{} approved)",
                row.id,
                form.approved_count(),
                form.total()
            );
            let exported = form.export();
            write_export(args.value_of("export-dir"), &exported.file_name(), &exported)?;
        }
        "signup" => {
            let outcome = shop
                .staff()
                .sign_up(
                    required(args, "email")?,
                    required(args, "password")?,
                    args.value_of("name"),
                )
                .await?;
            println!("registered {}", outcome.user().id);
        }
        "reset-password" => {
            let email = required(args, "email")?;
            shop.staff().reset_password(email).await?;
            println!("reset link sent to {}", email);
        }
        "has-role" => {
            if !staff_sign_in(&shop).await? {
                return Err(Error::auth(
                    "set AUTOCHECK_STAFF_EMAIL and AUTOCHECK_STAFF_PASSWORD to sign in",
                ));
            }
            let role: StaffRole = required(args, "role")?.parse()?;
            println!("{}", shop.staff().current_has_role(role).await?);
        }
        other => return Err(Error::validation(format!("unknown command {}", other))),
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    if let Err(e) = run(cli().get_matches()).await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
