/*
 * PVT-MONITOR is part of the rtk-rs framework.
 * Authors: Guillaume W. Bres <guillaume.bressaix@gmail.com> et al,
 * (cf. https://github.com/rtk-rs/pvt-monitor/graphs/contributors)
 * This framework is shipped under Mozilla Public V2 license.
 *
 * Documentation: https://github.com/rtk-rs/pvt-monitor
 */

use std::io;

use env_logger::{Builder, Target};

use log::info;

use tokio::signal;

use pvt_monitor::{cli::Cli, prelude::*};

/// Exit status once interrupted (128 + SIGINT)
const INTERRUPTED: i32 = 130;

#[tokio::main(flavor = "current_thread")]
pub async fn main() {
    // stdout belongs to the dashboard
    let mut builder = Builder::from_default_env();

    builder
        .target(Target::Stderr)
        .format_timestamp_secs()
        .format_module_path(false)
        .init();

    // cli
    let cli = Cli::new();
    let settings = cli.settings();

    match run(&settings).await {
        Ok(_) => {
            info!("interrupted");
            std::process::exit(INTERRUPTED);
        },
        Err(e) => {
            // terminal session is restored at this point
            eprintln!("{}", e);
            std::process::exit(1);
        },
    }
}

/// Binds first, so a failed bind never leaves the terminal altered.
/// Only returns on interruption or fatal error.
async fn run(settings: &Settings) -> Result<(), Error> {
    let mut monitor = Monitor::bind(settings.port).await?;

    info!("listening on UDP port {}", settings.port);

    match settings.output {
        Output::Dashboard => {
            let _session = TerminalSession::open()?;
            let mut dashboard = Dashboard::new(io::stdout());
            until_interrupted(&mut monitor, &mut dashboard).await
        },
        Output::Json => {
            let mut json = JsonLines::new(io::stdout());
            until_interrupted(&mut monitor, &mut json).await
        },
    }
}

async fn until_interrupted<R: Renderer>(monitor: &mut Monitor, renderer: &mut R) -> Result<(), Error> {
    let ret = tokio::select! {
        ret = monitor.run(renderer) => ret,
        ret = signal::ctrl_c() => ret.map_err(Error::from),
    };

    let (decoded, dropped) = monitor.statistics();
    info!("{} solutions rendered, {} datagrams dropped", decoded, dropped);

    ret
}
