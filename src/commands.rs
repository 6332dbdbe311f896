use std::path::PathBuf;

use argh::FromArgs;
use exitcode::ExitCode;
use scrape_supervisor::builder::build_scrape_config;
use scrape_supervisor::config::{Arguments, load_from_path};
use tracing::{error, info};

#[derive(FromArgs)]
#[argh(
    description = "Keeps a Prometheus scrape engine in line with its arguments",
    help_triggers("-h", "--help")
)]
pub struct RootCommand {
    #[argh(switch, short = 'v', description = "show version")]
    version: bool,

    #[argh(
        option,
        short = 'l',
        default = "\"info\".to_string()",
        description = "log level"
    )]
    pub log_level: String,

    #[argh(subcommand)]
    sub_commands: Option<SubCommands>,
}

impl RootCommand {
    #![allow(clippy::print_stdout)]
    fn show_version(&self) {
        println!(
            "{} {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        );
    }

    pub fn run(&self) -> Result<(), ExitCode> {
        if self.version {
            self.show_version();
            return Ok(());
        }

        match &self.sub_commands {
            Some(SubCommands::Validate(validate)) => validate.run(),
            Some(SubCommands::Generate(generate)) => generate.run(),
            None => {
                error!(message = "no subcommand specified, see --help");
                Err(exitcode::USAGE)
            }
        }
    }
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(subcommand)]
enum SubCommands {
    Validate(Validate),
    Generate(Generate),
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "validate",
    description = "Validate scrape arguments and print the resulting job config, then exit"
)]
struct Validate {
    #[argh(option, short = 'c', description = "read arguments from this file")]
    config: PathBuf,

    #[argh(
        option,
        default = "\"prometheus.scrape.default\".to_string()",
        description = "instance id, used as job name unless job_name is set"
    )]
    id: String,
}

impl Validate {
    #![allow(clippy::print_stdout)]
    fn run(&self) -> Result<(), ExitCode> {
        let args = load_from_path(&self.config).map_err(|err| {
            error!(message = "load arguments failed", path = ?self.config, %err);
            exitcode::CONFIG
        })?;

        let config = build_scrape_config(&self.id, &args).map_err(|err| {
            error!(message = "invalid scrape_config", path = ?self.config, %err);
            exitcode::CONFIG
        })?;

        let text = serde_yaml::to_string(&config).map_err(|err| {
            error!(message = "encode scrape_config failed", %err);
            exitcode::SOFTWARE
        })?;

        info!(
            message = "arguments validated",
            path = ?self.config,
            targets = args.targets.len()
        );
        println!("{text}");

        Ok(())
    }
}

#[derive(FromArgs, PartialEq, Debug)]
#[argh(
    subcommand,
    name = "generate",
    description = "Print an example arguments file"
)]
struct Generate {}

impl Generate {
    #![allow(clippy::print_stdout)]
    fn run(&self) -> Result<(), ExitCode> {
        let text = serde_yaml::to_string(&Arguments::example()).map_err(|err| {
            error!(message = "encode example failed", %err);
            exitcode::SOFTWARE
        })?;

        println!("{text}");

        Ok(())
    }
}
