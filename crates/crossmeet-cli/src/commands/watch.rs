//! Watch command: live timing from decoder lines on stdin.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use anyhow::Result;
use crossmeet_core::decoder::pump_events;
use crossmeet_core::time::parse_tod;
use crossmeet_core::{LogAnnouncer, Meet};
use tracing::{error, info};

use crate::cli::OutputFormat;

use super::{load_meet, results, save_meet};

pub fn run(event: &str, arm: bool, start: Option<&str>) -> Result<()> {
    let shutdown = setup_shutdown_handler()?;
    let meet = load_meet(event)?.with_announcer(Box::new(LogAnnouncer));

    if let Some(start) = start {
        let t = parse_tod(start)?;
        meet.arm_start()?;
        meet.start(t)?;
    } else if arm {
        meet.arm_start()?;
        println!("Start armed, waiting for trigger...");
    }

    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = io::stdin();
        match pump_events(stdin.lock(), &tx) {
            Ok(count) => info!("Decoder input closed after {} events", count),
            Err(e) => error!("Decoder input error: {}", e),
        }
    });

    println!("Timing {} (Ctrl+C to stop)", meet.title());
    meet.run(&rx, &shutdown);
    finish(&meet, event)
}

fn finish(meet: &Meet, event: &str) -> Result<()> {
    save_meet(meet, event)?;
    println!("{}", results::render(meet, None, OutputFormat::Console)?);
    println!("Shutdown complete.");
    Ok(())
}

/// Setup graceful shutdown handler with Ctrl+C
fn setup_shutdown_handler() -> Result<Arc<AtomicBool>> {
    let shutdown = Arc::new(AtomicBool::new(false));

    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        println!("\nShutting down...");
        shutdown_ctrlc.store(true, Ordering::SeqCst);
    })?;

    println!("crossmeet v{}", env!("CARGO_PKG_VERSION"));
    Ok(shutdown)
}
