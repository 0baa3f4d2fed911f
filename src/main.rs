use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use gadgeter::cli::{Cli, Commands};
use gadgeter::inject::InjectionAction;
use gadgeter::workflow::{InjectionReport, LocateReport};
use gadgeter::{run_inject_workflow, run_locate, InjectError};
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Inject(opts) => {
            let cfg = opts.to_config();
            match run_inject_workflow(&opts.target.target, &cfg) {
                Ok(report) if opts.target.json => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                Ok(report) => print_report(&report),
                Err(err) => return Ok(fail(&err)),
            }
        }
        Commands::Locate(opts) => {
            let cfg = opts.to_config();
            match run_locate(&opts.target.target, &cfg) {
                Ok(report) if opts.target.json => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                Ok(report) => print_sites(&report),
                Err(err) => return Ok(fail(&err)),
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "gadgeter=warn",
        1 => "gadgeter=debug",
        _ => "gadgeter=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(err: &InjectError) -> ExitCode {
    eprintln!("[-]  {}", err.user_message());
    ExitCode::FAILURE
}

fn print_report(report: &InjectionReport) {
    let outcome = &report.outcome;
    let verb = if report.persisted { "Patched" } else { "Would patch" };
    println!(
        "[+]  {verb} {} (level {}, {})",
        report.unit.display(),
        outcome.level.number(),
        outcome.method
    );
    match &outcome.action {
        InjectionAction::Spliced {
            method_line,
            insert_at,
            registers,
        } => {
            println!(
                "[*]  Method at line {}, payload inserted at line {}",
                method_line + 1,
                insert_at + 1
            );
            if let Some(growth) = registers {
                println!(
                    "[*]  {} {} -> {}",
                    growth.directive.keyword(),
                    growth.from,
                    growth.to
                );
            }
        }
        InjectionAction::Synthesized { insert_at } => {
            println!("[*]  New <clinit> inserted at line {}", insert_at + 1);
        }
    }
    println!("[*]  Loads lib{}.so", report.lib_name);
}

fn print_sites(report: &LocateReport) {
    println!("[*]  {}", report.unit.display());
    for entry in &report.levels {
        match &entry.site {
            Some(site) => {
                let decl = site
                    .declaration
                    .map(|(directive, count)| format!("{} {count}", directive.keyword()))
                    .unwrap_or_else(|| "no register declaration".to_string());
                println!(
                    "[+]  level {} {:<18} line {:<5} {decl}, {} param slots, insert at line {}",
                    entry.level.number(),
                    entry.method,
                    site.method_line + 1,
                    site.param_slots,
                    site.insert_at + 1
                );
                if site.overloads > 1 {
                    println!(
                        "[*]  {} overloads of {}, only the first is patched",
                        site.overloads, entry.method
                    );
                }
            }
            None if entry.method == "<clinit>" => {
                println!(
                    "[*]  level {} {:<18} absent, would be synthesized",
                    entry.level.number(),
                    entry.method
                );
            }
            None => {
                println!(
                    "[-]  level {} {:<18} absent",
                    entry.level.number(),
                    entry.method
                );
            }
        }
    }
}
