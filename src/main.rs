//! Whaletown - agent addressing and session tools
//!
//! Main entry point for the wt CLI.

mod commands;

use commands::{
    AddressCommands, BeadCommands, Cli, Commands, ConfigCommands, DoctorCommands, MailCommands,
    NudgeCommands, ProtocolCommands, RigCommands, RoleCommands, SessionCommands,
};
use clap::Parser;
use serde::Serialize;
use serde_json::json;
use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::process;
use whaletown::beads::{address_to_agent_bead_id, agent_bead_id_to_address};
use whaletown::config::{config_warnings, validate_config, TownConfig};
use whaletown::connection::parse_address;
use whaletown::doctor::{Check, CheckStatus, OrphanSessionCheck, StaticSessionLister};
use whaletown::mail::{resolve_nudge_pattern, Resolver};
use whaletown::protocol::{
    extract_polecat, parse_message_type, MergeFailedPayload, MergeReadyPayload, MergedPayload,
    MessageType, ReworkRequestPayload,
};
use whaletown::session::{
    categorize_session, categorize_session_with_rigs, parse_session_name, AgentIdentity,
    AgentRecord,
};
use whaletown::workspace::{
    detect_rig_from_path, detect_role, find_town_root, identity_from_env, role_env, role_home,
    sender_from_env, OVERSEER,
};
use whaletown::{Result, WhaletownError};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = whaletown::logging::init(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(TownConfig::default_path);

    let config = match &cli.command {
        Commands::Config(_) => TownConfig::default(),
        _ if cli.config.is_some() => TownConfig::load(&config_path)?,
        _ => TownConfig::load_or_default(&config_path)?,
    };
    let town_flag = cli.town.as_deref();

    match cli.command {
        Commands::Address(AddressCommands::Parse { address }) => {
            let addr = parse_address(&address)?;
            if cli.json {
                print_json(&json!({
                    "machine": addr.machine,
                    "rig": addr.rig,
                    "polecat": addr.polecat,
                    "local": addr.is_local(),
                    "broadcast": addr.is_broadcast(),
                }))?;
            } else {
                println!("Machine:   {}", display_or_dash(&addr.machine));
                println!("Rig:       {}", addr.rig);
                println!("Polecat:   {}", display_or_dash(&addr.polecat));
                println!("Broadcast: {}", addr.is_broadcast());
                println!("Canonical: {}", addr);
            }
        }

        Commands::Session(SessionCommands::Parse { name }) => {
            let identity = parse_session_name(&name)?;
            print_identity(&identity, cli.json)?;
        }

        Commands::Session(SessionCommands::Name { role, rig, name }) => {
            let rig = rig.unwrap_or_default();
            let name = name.unwrap_or_default();
            let identity = AgentIdentity::from_parts(role, &rig, &name).ok_or_else(|| {
                WhaletownError::Other(format!("{} needs {}", role, required_flags(role)))
            })?;
            if cli.json {
                print_json(&json!({ "session": identity.session_name() }))?;
            } else {
                println!("{}", identity.session_name());
            }
        }

        Commands::Bead(BeadCommands::Id { address }) => {
            let id = address_to_agent_bead_id(&address);
            if id.is_empty() {
                return Err(WhaletownError::Other(format!("not an agent address: {}", address)));
            }
            print_value("id", &id, cli.json)?;
        }

        Commands::Bead(BeadCommands::Address { id }) => {
            let address = agent_bead_id_to_address(&id);
            if address.is_empty() {
                return Err(WhaletownError::Other(format!("not an agent bead ID: {}", id)));
            }
            print_value("address", &address, cli.json)?;
        }

        Commands::Categorize { sessions, rigs } => {
            let sessions = read_sessions(sessions)?;
            let rigs: Vec<String> = if rigs.is_empty() { config.rigs.clone() } else { rigs };

            #[derive(Serialize)]
            struct Row<'a> {
                session: &'a str,
                agent: Option<AgentRecord>,
            }

            let rows: Vec<Row> = sessions
                .iter()
                .map(|session| Row {
                    session: session.as_str(),
                    agent: categorize_session_with_rigs(session, rigs.as_slice()),
                })
                .collect();

            if cli.json {
                print_json(&rows)?;
            } else {
                for row in &rows {
                    match &row.agent {
                        Some(agent) => println!(
                            "{}\t{}\t{}\t{}",
                            row.session,
                            agent.role,
                            display_or_dash(&agent.rig),
                            display_or_dash(&agent.name)
                        ),
                        None => println!("{}\t-", row.session),
                    }
                }
            }
        }

        Commands::Nudge(NudgeCommands::Resolve { pattern, sessions }) => {
            let roster = roster(read_sessions(sessions)?, &config.rigs);
            let targets = resolve_nudge_pattern(&pattern, &roster);
            if cli.json {
                print_json(&targets)?;
            } else if targets.is_empty() {
                println!("No sessions match '{}'", pattern);
            } else {
                for target in targets {
                    println!("{}", target);
                }
            }
        }

        Commands::Mail(MailCommands::Resolve { address, sessions }) => {
            let roster = roster(read_sessions(sessions)?, &config.rigs);
            let recipients = Resolver::new(&roster).resolve(&address)?;
            if cli.json {
                print_json(&recipients)?;
            } else {
                for recipient in recipients {
                    println!("{}\t{:?}", recipient, recipient.kind);
                }
            }
        }

        Commands::Role(cmd) => handle_role_command(cmd, town_flag, &config, cli.json)?,

        Commands::Rig(RigCommands::Detect { path }) => {
            let town = town_root(town_flag, &config)?;
            let path = match path {
                Some(path) => path,
                None => std::env::current_dir()?,
            };
            let rig = detect_rig_from_path(&town, &path).ok_or_else(|| {
                WhaletownError::Workspace(format!("{} is not inside a rig", path.display()))
            })?;
            print_value("rig", &rig, cli.json)?;
        }

        Commands::Doctor(DoctorCommands::Orphans { sessions, targets }) => {
            let town = town_root(town_flag, &config)?;
            let mut check = OrphanSessionCheck::new(StaticSessionLister::new(read_sessions(sessions)?));
            let result = check.run(&town)?;

            if targets {
                let kill = check.fix_targets();
                if cli.json {
                    print_json(&kill)?;
                } else {
                    for session in kill {
                        println!("{}", session);
                    }
                }
                return Ok(());
            }

            if cli.json {
                print_json(&result)?;
            } else {
                let mark = match result.status {
                    CheckStatus::Ok => "✓",
                    CheckStatus::Warning => "⚠",
                    CheckStatus::Error => "✗",
                };
                println!("{} {}: {}", mark, result.name, result.message);
                for detail in &result.details {
                    println!("    {}", detail);
                }
                if let Some(hint) = &result.fix_hint {
                    println!("    → {}", hint);
                }
            }
        }

        Commands::Protocol(ProtocolCommands::Parse { subject, body }) => {
            let kind = parse_message_type(&subject).ok_or_else(|| {
                WhaletownError::Protocol(format!("not a protocol message: {}", subject))
            })?;
            let polecat = extract_polecat(&subject);
            let payload = match body.as_deref() {
                Some(body) => Some(payload_json(kind, body)?),
                None => None,
            };

            if cli.json {
                print_json(&json!({ "type": kind, "polecat": polecat, "payload": payload }))?;
            } else {
                println!("Type:    {}", kind);
                println!("Polecat: {}", display_or_dash(&polecat));
                if let Some(payload) = payload {
                    println!("{}", serde_json::to_string_pretty(&payload)?);
                }
            }
        }

        Commands::Whoami => {
            let sender = sender_from_env(|key| std::env::var(key).ok());
            if cli.json {
                print_json(&json!({ "sender": sender, "overseer": config.overseer.name }))?;
            } else if sender == OVERSEER {
                println!("{} ({})", sender, config.overseer.name);
            } else {
                println!("{}", sender);
            }
        }

        Commands::Config(cmd) => handle_config_command(&cmd, &config_path, cli.json)?,
    }

    Ok(())
}

fn handle_role_command(
    cmd: RoleCommands,
    town_flag: Option<&Path>,
    config: &TownConfig,
    json_output: bool,
) -> Result<()> {
    let town = town_root(town_flag, config)?;
    let cwd = std::env::current_dir()?;

    match cmd {
        RoleCommands::Home { role, rig, polecat } => {
            let identity = match role {
                Some(role) => {
                    let rig = rig.unwrap_or_default();
                    let name = polecat.unwrap_or_default();
                    AgentIdentity::from_parts(role, &rig, &name).ok_or_else(|| {
                        WhaletownError::Other(format!("{} needs {}", role, required_flags(role)))
                    })?
                }
                None => current_identity(&town, &cwd)?,
            };
            print_value("home", &role_home(&town, &identity).display().to_string(), json_output)?;
        }

        RoleCommands::Detect => {
            let detected = detect_role(&town, &cwd);
            let from_env = identity_from_env(|key| std::env::var(key).ok());

            if json_output {
                return print_json(&json!({ "cwd": detected, "env": from_env }));
            }

            match &detected {
                Some(identity) => {
                    println!("Role: {} (from cwd)", identity.role());
                    if let Some(rig) = identity.rig() {
                        println!("Rig: {}", rig);
                    }
                    if let Some(name) = identity.name() {
                        println!("Worker: {}", name);
                    }
                }
                None => println!("Role: unknown (from cwd)"),
            }

            if let (Some(env), Some(cwd_identity)) = (&from_env, &detected) {
                if env != cwd_identity {
                    println!(
                        "⚠ Mismatch: WT_ROLE={} ({}) but cwd is {}",
                        env.role(),
                        env,
                        cwd_identity
                    );
                }
            }
        }

        RoleCommands::Env => {
            let identity = current_identity(&town, &cwd)?;
            let env = role_env(&town, &identity);
            if json_output {
                let map: serde_json::Map<String, serde_json::Value> = env
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::String(v)))
                    .collect();
                print_json(&map)?;
            } else {
                for (key, value) in env {
                    println!("export {}={}", key, value);
                }
            }
        }
    }

    Ok(())
}

fn handle_config_command(cmd: &ConfigCommands, path: &Path, json_output: bool) -> Result<()> {
    match cmd {
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                return Err(WhaletownError::Config(format!(
                    "Config file already exists: {} (use --force to overwrite)",
                    path.display()
                )));
            }
            TownConfig::new().save(path)?;
            println!("Created {}", path.display());
        }

        ConfigCommands::Show => {
            let config = TownConfig::load_or_default(path)?;
            if json_output {
                print_json(&config)?;
            } else {
                print!("{}", serde_yaml::to_string(&config)?);
            }
        }

        ConfigCommands::Validate => {
            let config = TownConfig::load(path)?;
            for warning in config_warnings(&config) {
                println!("⚠ {}", warning);
            }
            match validate_config(&config) {
                Ok(()) => println!("✓ {} is valid", path.display()),
                Err(errors) => {
                    for error in &errors {
                        println!("✗ {}", error);
                    }
                    return Err(WhaletownError::Config(format!(
                        "{} problem(s) found",
                        errors.len()
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Town root from the flag, the config file, or the working directory
fn town_root(town_flag: Option<&Path>, config: &TownConfig) -> Result<PathBuf> {
    if let Some(town) = town_flag.map(Path::to_path_buf).or_else(|| config.town_root.clone()) {
        return Ok(town);
    }
    let cwd = std::env::current_dir()?;
    find_town_root(&cwd).ok_or_else(|| {
        WhaletownError::Workspace("not inside a town (no mayor/rigs.json found)".to_string())
    })
}

/// Identity from a complete WT_* environment, else from the working directory
fn current_identity(town: &Path, cwd: &Path) -> Result<AgentIdentity> {
    identity_from_env(|key| std::env::var(key).ok())
        .or_else(|| detect_role(town, cwd))
        .ok_or_else(|| {
            WhaletownError::Workspace(format!("no agent role for {}", cwd.display()))
        })
}

/// Session names from arguments, or from stdin when none were given
fn read_sessions(sessions: Vec<String>) -> Result<Vec<String>> {
    if !sessions.is_empty() {
        return Ok(sessions);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for line in stdin.lock().lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            out.push(line.to_string());
        }
    }
    Ok(out)
}

fn roster(sessions: Vec<String>, rigs: &[String]) -> Vec<AgentRecord> {
    sessions
        .iter()
        .filter_map(|session| {
            if rigs.is_empty() {
                categorize_session(session)
            } else {
                categorize_session_with_rigs(session, rigs)
            }
        })
        .collect()
}

fn payload_json(kind: MessageType, body: &str) -> Result<serde_json::Value> {
    let value = match kind {
        MessageType::MergeReady => serde_json::to_value(MergeReadyPayload::from_body(body))?,
        MessageType::Merged => serde_json::to_value(MergedPayload::from_body(body))?,
        MessageType::MergeFailed => serde_json::to_value(MergeFailedPayload::from_body(body))?,
        MessageType::ReworkRequest => serde_json::to_value(ReworkRequestPayload::from_body(body))?,
    };
    Ok(value)
}

fn print_identity(identity: &AgentIdentity, json_output: bool) -> Result<()> {
    if json_output {
        return print_json(&json!({
            "identity": identity,
            "session": identity.session_name(),
            "address": identity.address(),
        }));
    }
    println!("Role:    {}", identity.role());
    if let Some(rig) = identity.rig() {
        println!("Rig:     {}", rig);
    }
    if let Some(name) = identity.name() {
        println!("Name:    {}", name);
    }
    println!("Address: {}", identity.address());
    Ok(())
}

fn print_value(key: &str, value: &str, json_output: bool) -> Result<()> {
    if json_output {
        let mut map = serde_json::Map::new();
        map.insert(key.to_string(), serde_json::Value::String(value.to_string()));
        print_json(&map)
    } else {
        println!("{}", value);
        Ok(())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn display_or_dash(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}

fn required_flags(role: whaletown::session::Role) -> &'static str {
    if role.is_worker() {
        "--rig and a worker name"
    } else if role.is_town_level() {
        "nothing"
    } else {
        "--rig"
    }
}
