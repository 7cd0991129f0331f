//! `rfid-checkin` - CLI for the RFID check-in station

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, Write};
use std::path::Path;

use clap::Parser;
use rfid_checkin_cli::cli::{
    format_user_row, user_table_header, Cli, Command, ConfigCommand, RunCommand, StatsCommand,
    UsersCommand,
};
use rfid_checkin_cli::{init_logging, Config, Error, Result, Station, Storage};
use rfid_checkin_pcsc::{acr122u, smart_card::SmartCardContext, PcscTagReader};
use tracing::info;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::Run(run_cmd) => handle_run(&config, &run_cmd)?,
        Command::Readers => handle_readers()?,
        Command::Users(users_cmd) => handle_users(&config, users_cmd)?,
        Command::Stats(stats_cmd) => handle_stats(&config, &stats_cmd)?,
        Command::Config(config_cmd) => handle_config(&config, cli.config.as_deref(), &config_cmd)?,
    }

    Ok(())
}

fn handle_run(config: &Config, cmd: &RunCommand) -> Result<()> {
    let storage = Storage::open(config.database_path())?;

    let name_prefix = cmd
        .reader
        .as_deref()
        .or(config.reader.name_prefix.as_deref());
    let reader = PcscTagReader::open(name_prefix, config.feedback())?;
    println!("Using reader: {}", reader.reader_name());

    let mut station = Station::new(reader, &storage)
        .with_poll_interval(config.poll_interval())
        .with_tap_cooldown(config.tap_cooldown());

    let stdout = io::stdout();
    let taps = station.run(&mut stdout.lock(), cmd.limit)?;
    info!(taps, "Stopped");
    Ok(())
}

fn handle_readers() -> Result<()> {
    let context = SmartCardContext::establish()?;
    let mut found = false;

    for reader in context.get_readers()? {
        found = true;
        if acr122u::is_acr122u(&reader.name) {
            println!("{} (ACR122U)", reader.name);
        } else {
            println!("{}", reader.name);
        }
    }

    if !found {
        println!("No smart card readers found.");
    }
    Ok(())
}

fn handle_users(config: &Config, cmd: UsersCommand) -> Result<()> {
    let storage = Storage::open(config.database_path())?;
    let mut out = io::stdout().lock();

    match cmd {
        UsersCommand::List { json } => {
            let users = storage.list_users()?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&users)?)?;
            } else if users.is_empty() {
                writeln!(out, "No users registered.")?;
            } else {
                writeln!(out, "{}", user_table_header())?;
                for user in &users {
                    writeln!(out, "{}", format_user_row(user))?;
                }
            }
        }
        UsersCommand::Show { uid, json } => {
            let user = storage
                .find_user(&uid)?
                .ok_or_else(|| Error::unknown_user(&uid))?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&user)?)?;
            } else {
                writeln!(out, "{}", user_table_header())?;
                writeln!(out, "{}", format_user_row(&user))?;
            }
        }
        UsersCommand::Add { uid, username } => {
            storage.add_user(&uid, &username)?;
            writeln!(out, "Added {uid} as {username}.")?;
        }
        UsersCommand::Rename { uid, username } => {
            storage.set_username(&uid, &username)?;
            writeln!(out, "Renamed {uid} to {username}.")?;
        }
        UsersCommand::Remove { uid } => {
            storage.remove_user(&uid)?;
            writeln!(out, "Removed {uid}.")?;
        }
        UsersCommand::Reset { uid } => {
            storage.reset_taps(&uid)?;
            writeln!(out, "Reset tap count of {uid}.")?;
        }
    }

    Ok(())
}

fn handle_stats(config: &Config, cmd: &StatsCommand) -> Result<()> {
    let storage = Storage::open(config.database_path())?;
    let stats = storage.stats()?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("Database:    {}", storage.path().display());
        println!("Users:       {}", stats.users);
        println!("Checked in:  {}", stats.checked_in);
        println!("Total taps:  {}", stats.total_taps);
    }
    Ok(())
}

fn handle_config(config: &Config, config_path: Option<&Path>, cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        ConfigCommand::Path => {
            let path = config_path.map_or_else(Config::default_config_path, Path::to_path_buf);
            println!("{}", path.display());
        }
    }
    Ok(())
}
