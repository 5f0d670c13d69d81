#![deny(static_mut_refs)]

//! Emulates a USB pen tablet through the Linux raw-gadget interface.
//!
//! Requires the `raw_gadget` kernel module and a bound UDC; with
//! `dummy_hcd` loaded the defaults attach the tablet to the local host.

use clap::Parser;

/// User-space USB pen tablet emulator.
#[derive(Parser)]
#[command(name = "tabletd", about = "USB pen tablet emulator over raw-gadget")]
struct Cli {
    /// UDC device name (as listed under /sys/class/udc)
    #[arg(default_value = "dummy_udc.0")]
    device: String,
    /// UDC driver name
    #[arg(default_value = "dummy_udc")]
    driver: String,
    /// Path of the raw-gadget character device
    #[arg(long, default_value = "/dev/raw-gadget")]
    gadget_path: String,
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let default_filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[cfg(target_os = "linux")]
fn main() -> anyhow::Result<()> {
    use std::sync::Arc;

    use anyhow::Context;
    use softtablet_raw_gadget::{GadgetTransport, RawGadget, Speed};
    use tracing::info;

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let gadget = RawGadget::open_at(&cli.gadget_path)
        .with_context(|| format!("is the raw_gadget module loaded? ({})", cli.gadget_path))?;
    gadget.init(&cli.driver, &cli.device, Speed::High)?;
    gadget.run()?;
    info!(device = %cli.device, driver = %cli.driver, "gadget bound, waiting for the host");

    let transport: Arc<dyn GadgetTransport> = Arc::new(gadget);
    tabletd::run_event_loop(transport)?;
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    anyhow::bail!("tabletd requires the Linux raw-gadget interface")
}
