use std::time::Duration;

use clap::Parser;
use cli::Cli;
use color_eyre::eyre::{Result, WrapErr, eyre};
use futures::executor;
use tokio::sync::mpsc;

use crate::{app::App, config::Config};

mod action;
mod app;
mod cli;
mod components;
mod config;
mod errors;
mod layout;
mod logging;
mod reorder;
mod shared;
mod transport;
mod tui;
mod widgets;

fn main() -> Result<()> {
    bootstrap(|| {
        let args = Cli::parse();
        let config = Config::new(args.base_url)?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (evt_tx, evt_rx) = mpsc::unbounded_channel();
        let transport_thread = transport::start_async(&config, cmd_rx, evt_tx)?;

        let app = App::new(config, args.tick_rate, args.frame_rate, cmd_tx, evt_rx)?;
        executor::block_on(app.run())?;

        transport_thread
            .join()
            .map_err(|_| eyre!("transport thread panicked"))?;
        Ok(())
    })
}

fn bootstrap(fn_do_run: fn() -> Result<()>) -> Result<()> {
    crate::errors::init()?;
    crate::logging::init()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err_with(|| "Failed to start Tokio runtime")?;
    let _guard = runtime.enter();

    let result = fn_do_run();
    runtime.shutdown_timeout(Duration::from_secs(5));

    result
}
