//! Session commands: show, login, logout, touch.

use chrono::Utc;
use sarsync::{Outcome, Services, SessionRecord, SessionUpdate};
use serde_json::json;

use crate::cli::{LoginArgs, SessionCommand, TouchArgs};
use crate::output::{OutputFormat, print_json};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Run a `session` subcommand
pub fn run(services: &Services, command: &SessionCommand, format: OutputFormat) -> CmdResult {
    let session = services.session();
    match command {
        SessionCommand::Show => show(services, format),
        SessionCommand::Login(args) => report(login(services, args), format),
        SessionCommand::Logout => report(session.logout(None), format),
        SessionCommand::Touch(args) => report(session.update_session(touch_update(args)), format),
    }
}

fn show(services: &Services, format: OutputFormat) -> CmdResult {
    // require_auth redirects to the login page when there is no valid session
    let record = services.session().require_auth(None);
    match format {
        OutputFormat::Json => print_json(&json!({ "session": record })),
        OutputFormat::Human => {
            match record {
                Some(record) => print_record(&record),
                None => println!("No active session."),
            }
            Ok(())
        }
    }
}

fn login(services: &Services, args: &LoginArgs) -> Outcome {
    let user = SessionRecord::new(
        args.id.clone(),
        args.email.clone(),
        args.name.clone(),
        args.role.into(),
        Utc::now(),
    );
    services.session().login(user)
}

fn touch_update(args: &TouchArgs) -> SessionUpdate {
    let mut update = SessionUpdate::new();
    if let Some(name) = &args.name {
        update = update.name(name.clone());
    }
    if let Some(email) = &args.email {
        update = update.email(email.clone());
    }
    update
}

fn print_record(record: &SessionRecord) {
    println!("User:        {} <{}>", record.name, record.email);
    println!("ID:          {}", record.id);
    println!("Role:        {}", record.role);
    println!("Last login:  {}", record.last_login.to_rfc3339());
    if let Some(remaining) = record.remaining_millis(Utc::now().timestamp_millis()) {
        println!("Expires in:  {}m", remaining / 60_000);
    }
}

fn report(outcome: Outcome, format: OutputFormat) -> CmdResult {
    match format {
        OutputFormat::Json => print_json(&json!({
            "applied": outcome.is_applied(),
            "outcome": outcome.to_string(),
        }))?,
        OutputFormat::Human => println!("{outcome}"),
    }
    if outcome.is_failed() {
        return Err(outcome.to_string().into());
    }
    Ok(())
}
