mod cli;
mod config;
mod pipeline;
mod selector;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use env_logger::Env;
use log::{error, info};
use rusqlite::Connection;

use cli::{Args, Command};
use scheduler::CancellationToken;
use sink::{SchemaMode, SqliteSink};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

fn install_cancel_handler(token: &CancellationToken) {
    let token = token.clone();
    let armed = Arc::new(AtomicBool::new(false));
    ctrlc::set_handler(move || {
        if armed.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        log::warn!("interrupt received, cancelling in-flight work (press again to force-exit)");
        token.cancel();
    })
    .expect("failed to install Ctrl-C handler");
}

fn run() -> Result<()> {
    let args = Args::parse();

    let mut cfg = config::load()?;
    cfg = config::apply_env_overrides(cfg);
    if let Some(data) = args.data {
        cfg.data_dir = data;
    }
    if let Some(dest) = args.dest {
        cfg.dest_dir = dest;
    }

    rayon::ThreadPoolBuilder::new()
        .thread_name(|i| format!("audiodex-worker-{i}"))
        .build_global()
        .ok();

    let token = CancellationToken::new();
    install_cancel_handler(&token);

    match args.command {
        Command::InsertArchive { insert_deadline } => {
            let conn = Connection::open(&cfg.db_conn)?;
            let mut sink = SqliteSink::open(conn, SchemaMode::Denormalized)?;
            pipeline::insert_archive(&cfg, &mut sink, &token, insert_deadline)?;
        }
        Command::Generate { generate_deadline } => {
            let conn = Connection::open(&cfg.db_conn)?;
            let mut sink = SqliteSink::open(conn, SchemaMode::Denormalized)?;
            pipeline::generate(&cfg, &mut sink, &token, generate_deadline)?;
        }
        Command::ExtractAllSoundbank { extract_deadline } => {
            pipeline::extract_all_soundbank(&cfg, &token, extract_deadline)?;
        }
        Command::ExtractSoundbank { extract_deadline } => {
            let mut selector = selector::StdinSelector;
            pipeline::extract_soundbank(&cfg, &token, extract_deadline, &mut selector)?;
        }
    }

    info!("done");
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{e:#}");
        std::process::exit(1);
    }
}
