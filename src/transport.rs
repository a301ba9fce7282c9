use color_eyre::{Result, eyre::WrapErr};
use tokio::{
    runtime::Builder,
    select,
    sync::mpsc::{UnboundedReceiver, UnboundedSender},
    task::LocalSet,
};
use tracing::{debug, info, warn};

mod client;
mod handle;
pub mod model;
pub use model::*;

use crate::config::Config;
use client::ApiClient;

/// Starts the thread that talks to the CMS. Commands are handled one after the
/// other, so requests reach the backend in the order they were issued.
pub fn start_async(
    config: &Config,
    cmd_rx: UnboundedReceiver<Command>,
    evt_tx: UnboundedSender<Event>,
) -> Result<std::thread::JoinHandle<()>> {
    let handler = TransportHandler {
        client: ApiClient::new(&config.api, config.collections.clone())?,
        cmd_rx,
        evt_tx,
    };
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("building runtime of transport thread")?;
    let handle = std::thread::Builder::new()
        .name("transport".into())
        .spawn(move || {
            let local = LocalSet::new();
            local.spawn_local(handler.run());
            runtime.block_on(local);
        })?;
    Ok(handle)
}

struct TransportHandler {
    client: ApiClient,
    cmd_rx: UnboundedReceiver<Command>,
    evt_tx: UnboundedSender<Event>,
}

impl TransportHandler {
    async fn run(mut self) {
        loop {
            select! {
                biased; // Stop should take prio
                _ = self.evt_tx.closed() => {
                    debug!("Transport events channel closed, shutting down transport handler...");
                    self.cmd_rx.close();
                    while let Ok(leftover_cmd) = self.cmd_rx.try_recv() {
                        warn!("Still handling leftover command {leftover_cmd:?}");
                        self.try_handle(leftover_cmd).await;
                    }
                    return;
                },
                work_opt = self.cmd_rx.recv() => {
                    let Some(work) = work_opt else {
                        debug!("Transport commands channel closed, shutting down transport handler...");
                        return;
                    };
                    info!("Transport command: {work:?}");
                    self.try_handle(work).await;
                }
            }
        }
    }

    async fn try_handle(&mut self, cmd: Command) {
        let event = handle::handle(&self.client, cmd).await;
        if let Err(err) = self.evt_tx.send(event) {
            debug!("Unable to send transport event: {err:?}");
        }
    }
}
