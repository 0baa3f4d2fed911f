use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::{Config, DEFAULT_FALLBACK_ORDER, DEFAULT_LIB_NAME};
use crate::smali::SlotCounting;

#[derive(Parser, Debug)]
#[command(
    name = "gadgeter",
    about = "Make a disassembled Android class load a native library early",
    version,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Splice System.loadLibrary into a class, trying fallback levels in order.
    Inject(InjectCommand),
    /// Show where each fallback level would inject, without editing.
    Locate(LocateCommand),
}

#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// A .smali file, or a disassembly directory when --class is given.
    pub target: PathBuf,

    /// Class to patch inside the TARGET directory (com.example.App or Lcom/example/App;).
    #[arg(long = "class", value_name = "CLASS")]
    pub class_name: Option<String>,

    /// Count long/double parameters as two registers.
    #[arg(long = "wide-params", action = ArgAction::SetTrue)]
    pub wide_params: bool,

    /// Print the result as JSON.
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InjectCommand {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Fallback level to try (1 attachBaseContext, 2 <clinit>, 3 onCreate); repeatable.
    #[arg(short, long = "level", value_name = "LEVEL", value_parser = clap::value_parser!(u8))]
    pub levels: Vec<u8>,

    /// Native library name passed to System.loadLibrary.
    #[arg(long = "lib", value_name = "NAME", default_value = DEFAULT_LIB_NAME)]
    pub lib_name: String,

    /// Run the injector but leave the file untouched.
    #[arg(long = "dry-run", action = ArgAction::SetTrue)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LocateCommand {
    #[command(flatten)]
    pub target: TargetArgs,
}

impl TargetArgs {
    fn apply(&self, cfg: &mut Config) {
        cfg.class_name = self.class_name.clone();
        if self.wide_params {
            cfg.slot_counting = SlotCounting::Dalvik;
        }
    }
}

impl InjectCommand {
    pub fn to_config(&self) -> Config {
        let mut cfg = Config::default();
        self.target.apply(&mut cfg);
        cfg.lib_name = self.lib_name.clone();
        cfg.levels = if self.levels.is_empty() {
            DEFAULT_FALLBACK_ORDER.to_vec()
        } else {
            self.levels.clone()
        };
        cfg.dry_run = self.dry_run;
        cfg
    }
}

impl LocateCommand {
    pub fn to_config(&self) -> Config {
        let mut cfg = Config::default();
        self.target.apply(&mut cfg);
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::Parser;

    fn parse_inject(args: &[&str]) -> (InjectCommand, Config) {
        let mut argv = vec!["gadgeter", "inject"];
        argv.extend(args);
        let cli = Cli::try_parse_from(&argv).expect("parse inject command");
        match cli.command {
            Commands::Inject(cmd) => {
                let cfg = cmd.to_config();
                (cmd, cfg)
            }
            _ => panic!("expected inject command"),
        }
    }

    #[test]
    fn inject_defaults() {
        let (cmd, cfg) = parse_inject(&["App.smali"]);
        assert_eq!(cmd.target.target, PathBuf::from("App.smali"));
        assert_eq!(cfg.lib_name, "frida-gadget");
        assert_eq!(cfg.levels, vec![1, 2, 3]);
        assert_eq!(cfg.slot_counting, SlotCounting::Observed);
        assert_eq!(cfg.class_name, None);
        assert!(!cfg.dry_run);
        assert!(!cmd.target.json);
    }

    #[test]
    fn inject_options_map_into_config() {
        let (cmd, cfg) = parse_inject(&[
            "out/smali",
            "--class",
            "com.example.App",
            "--level",
            "3",
            "-l",
            "1",
            "--lib",
            "gadget",
            "--wide-params",
            "--dry-run",
            "--json",
        ]);
        assert_eq!(cfg.class_name.as_deref(), Some("com.example.App"));
        assert_eq!(cfg.levels, vec![3, 1]);
        assert_eq!(cfg.lib_name, "gadget");
        assert_eq!(cfg.slot_counting, SlotCounting::Dalvik);
        assert!(cfg.dry_run);
        assert!(cmd.target.json);
    }

    #[test]
    fn out_of_range_level_reaches_injector() {
        let (_, cfg) = parse_inject(&["App.smali", "--level", "7"]);
        assert_eq!(cfg.levels, vec![7]);
    }

    #[test]
    fn locate_parses_with_global_verbose() {
        let cli = Cli::try_parse_from(["gadgeter", "-vv", "locate", "App.smali", "--wide-params"])
            .expect("parse locate command");
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Locate(cmd) => {
                assert_eq!(cmd.to_config().slot_counting, SlotCounting::Dalvik);
            }
            _ => panic!("expected locate command"),
        }
    }
}
