mod config;
mod catalog;
mod filter;
mod launch;
mod model;
mod sources;
mod state;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;
use anyhow::{Context, Result};
use calloop::EventLoop;
use calloop_wayland_source::WaylandSource;
use smithay_client_toolkit::{
    shell::wlr_layer::{Layer, KeyboardInteractivity, Anchor},
    shell::WaylandSurface,
};
use wayland_client::{Connection, globals::registry_queue_init};
use crate::catalog::Catalog;
use crate::config::{load_config, Config};
use crate::launch::{LaunchError, SystemLaunchSurface};
use crate::state::AppState;
use crate::ui::wayland::WaylandApp;
use crate::ui::render::Renderer;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Search and open system settings panels", long_about = None)]
struct Args {
    /// Config file to use instead of the per-user one
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the catalog labels instead of opening the window
    #[arg(short, long)]
    list: bool,

    /// Initial search text (also filters --list)
    #[arg(short, long, default_value = "")]
    query: String,

    /// Launch the entry with this exact label and exit
    #[arg(long, value_name = "LABEL", conflicts_with = "list")]
    launch: Option<String>,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    // 1. Load Config & build the catalog
    let config = load_config(args.config.as_deref())?;
    let catalog = Catalog::from_entries(sources::collect_entries(&config.catalog));
    if catalog.is_empty() {
        log::warn!("Catalog is empty, nothing will match");
    }

    let surface = SystemLaunchSurface::new(&config.launch);
    let mut app_state = AppState::new(catalog, config.general.query_mode(), surface);
    app_state.update_query(&args.query);

    // 2. Headless modes
    if args.list {
        for label in &app_state.filtered {
            println!("{}", label);
        }
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(label) = &args.launch {
        return Ok(launch_headless(&mut app_state, label));
    }

    run_ui(config, app_state)?;
    Ok(ExitCode::SUCCESS)
}

fn launch_headless(app_state: &mut AppState, label: &str) -> ExitCode {
    // Selection must come from the catalog, same as in the window.
    app_state.update_query("");
    let index = app_state.filtered.iter().position(|l| l == label);
    let result = match index {
        Some(i) if app_state.select(i) => app_state.launch_selected(),
        _ => Err(LaunchError::TokenNotFound(label.to_string())),
    };

    match result {
        Ok(attempt) => {
            log::debug!("Headless launch finished: {:?}", attempt);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}: {}", err.title(), err);
            ExitCode::FAILURE
        }
    }
}

fn run_ui(config: Config, app_state: AppState) -> Result<()> {
    // 3. Setup Wayland Connection & Event Loop
    let mut event_loop: EventLoop<WaylandApp> = EventLoop::try_new()?;
    let conn = Connection::connect_to_env().context("connecting to the Wayland display")?;
    let (globals, event_queue) = registry_queue_init::<WaylandApp>(&conn)?;
    let qh = event_queue.handle();

    // 4. Init UI
    let renderer = Renderer::new(config.theme.clone());
    let mut app = WaylandApp::new(&globals, &qh, app_state, renderer, config.general.close_on_launch)?;

    // 5. Create Layer Surface
    let surface = app.compositor_state.create_surface(&qh);
    let layer_surface = app.layer_shell_state.create_layer_surface(
        &qh,
        surface,
        Layer::Overlay,
        Some("panel-launcher"),
        None,
    );

    layer_surface.set_anchor(Anchor::empty());
    layer_surface.set_size(config.theme.width, config.theme.height);
    layer_surface.set_keyboard_interactivity(KeyboardInteractivity::Exclusive);
    layer_surface.commit();
    app.layer_surface = Some(layer_surface);

    event_loop.handle().insert_source(
        WaylandSource::new(conn.clone(), event_queue),
        |_, queue, app| {
            queue.dispatch_pending(app)
        }
    ).map_err(|err| anyhow::anyhow!("inserting Wayland source: {}", err.error))?;

    // 6. Run Loop
    loop {
        if app.should_exit {
            break;
        }
        event_loop.dispatch(None, &mut app)?;
    }

    Ok(())
}
