use std::ffi::OsString;

use clap::{value_parser, Arg, ArgAction, ArgMatches, ColorChoice, Command};

use crate::monitor::settings::{Output, Settings};

pub struct Cli {
    /// Arguments passed by user
    matches: ArgMatches,
}

impl Cli {
    /// Build new command line interface.
    /// Prints usage and exits with status 1 on invalid arguments.
    pub fn new() -> Self {
        Self::from_args(std::env::args_os()).unwrap_or_else(|e| {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 1 } else { 0 })
        })
    }

    /// Parses given arguments, the first one being the program name
    pub fn from_args<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Ok(Self {
            matches: Self::command().try_get_matches_from(args)?,
        })
    }

    fn command() -> Command {
        Command::new("pvt-monitor")
            .author("Guillaume W. Bres, <guillaume.bressaix@gmail.com>")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Live monitor of the PVT solutions a GNSS receiver streams over UDP")
            .color(ColorChoice::Always)
            .arg_required_else_help(true)
            .arg(
                Arg::new("port")
                    .value_name("PORT")
                    .required(true)
                    .value_parser(value_parser!(u16).range(1..))
                    .help("Local UDP port the receiver publishes PVT solutions to"),
            )
            .next_help_heading("Output")
            .arg(
                Arg::new("json")
                    .long("json")
                    .action(ArgAction::SetTrue)
                    .help("Headless mode: print one JSON object per solution instead of the dashboard"),
            )
    }

    /// Returns local UDP port
    pub fn port(&self) -> u16 {
        *self
            .matches
            .get_one::<u16>("port")
            .expect("port is a required argument")
    }

    fn json(&self) -> bool {
        self.matches.get_flag("json")
    }

    pub fn settings(&self) -> Settings {
        Settings {
            port: self.port(),
            output: if self.json() {
                Output::Json
            } else {
                Output::Dashboard
            },
        }
    }
}
