// src/main.rs

mod core;
mod shell;
mod tree;

use crate::core::{CoreSettingsStore, SettingsStoreOperations, TreeSettings};
use crate::shell::{CoreFileActionHandler, FileSystemNamespace, ProcessClipboard};
use crate::tree::{InteractionHandler, QueueMessagePoster, TreeMessage, TreeSynchronizer};

use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, channel};
use std::time::Duration;

const APP_NAME: &str = "ShellTree";

fn init_logging() {
    let log_config = ConfigBuilder::new()
        .set_time_format_custom(time::macros::format_description!(
            "[hour]:[minute]:[second].[subsecond digits:3]"
        ))
        .build();
    if let Err(e) = CombinedLogger::init(vec![TermLogger::new(
        LevelFilter::Debug,
        log_config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]) {
        eprintln!("Logger initialization failed: {e}");
    }
}

/*
 * Feeds posted background results back into the synchronizer until the
 * queue goes quiet. A real host dispatches these from its message loop;
 * the headless driver just polls with a short timeout.
 */
fn drain_messages(receiver: &Receiver<TreeMessage>, sync: &mut TreeSynchronizer) {
    while let Ok(message) = receiver.recv_timeout(Duration::from_millis(250)) {
        if let Err(e) = sync.on_message(message) {
            log::warn!("Message handling failed: {e}");
        }
    }
}

fn print_tree(sync: &TreeSynchronizer, node: tree::NodeId, depth: usize) {
    if let Some(n) = sync.view().node(node) {
        let affordance = if n.has_children_hint { "+" } else { " " };
        let cut = if n.cut { " (cut)" } else { "" };
        let icon = n
            .icon
            .map(|icon| icon.index.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("{}{affordance} [{icon}] {}{cut}", "  ".repeat(depth), n.label);
    }
    for child in sync.view().children_of(node) {
        print_tree(sync, child, depth + 1);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let settings_store = CoreSettingsStore::new();
    let settings = match settings_store.load_settings(APP_NAME) {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Could not load settings ({e}), using defaults.");
            TreeSettings::default()
        }
    };

    let mount = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .map_or_else(std::env::current_dir, Ok)?;
    log::info!("Mounting namespace at {mount:?}");

    let namespace = Arc::new(FileSystemNamespace::new(mount)?);
    let (sender, receiver) = channel();
    let poster = Arc::new(QueueMessagePoster::new(sender));
    let mut sync = TreeSynchronizer::new(namespace, poster, settings)?;

    let mut interactions = InteractionHandler::new(
        Arc::new(ProcessClipboard::new()),
        Arc::new(CoreFileActionHandler::new(APP_NAME)),
    );

    // Populate the root level and resolve display data for everything
    // currently visible, the way a host control would on first paint.
    let root = sync.add_root()?;
    let visible: Vec<_> = sync.view().iter_ids().collect();
    for node in visible {
        sync.display_info(node)?;
    }
    drain_messages(&receiver, &mut sync);

    // Mark the first child cut, as a host would on Ctrl+X.
    if let Some(first_child) = sync.view().children_of(root).first().copied() {
        interactions.copy_or_cut(&mut sync, first_child, false)?;
    }

    print_tree(&sync, root, 0);
    if let Some(identity) = sync.selected_item_identity() {
        log::info!("Selected item: '{identity}'");
    }

    interactions.flush_on_shutdown();
    sync.shutdown();
    Ok(())
}
