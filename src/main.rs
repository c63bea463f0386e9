use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;

use eurovision_control::mini::{self, Message};
use eurovision_control::mixer::{Mixer, ObsMixer};
use eurovision_control::mock::MockMixer;
use eurovision_control::player::RodioPlayer;
use eurovision_control::{config, spawn_device_watch, spawn_ticker};
use eurovision_control::{Config, Engine, Event, InputDevice, Layout, Menu, OutputDevice};

/// Launchpad Mini control surface for the Eurovision show: OBS scenes, music and LED effects.
#[derive(Parser, Debug)]
#[command(name = "eurovision-control")]
#[command(version, about = "Eurovision show control center")]
struct Args {
    /// Configuration file, created with defaults if missing
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Button layout file (default: the built-in show layout)
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Part of the controller's MIDI port name (overrides the configuration)
    #[arg(short, long)]
    device: Option<String>,

    /// Don't connect to OBS; scene switches are only logged
    #[arg(long)]
    offline: bool,

    /// Print every button binding and exit
    #[arg(long)]
    list_bindings: bool,

    /// Default log filter, overridden by RUST_LOG
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&args.log_level)).init();

    let layout = match &args.layout {
        Some(path) => Layout::load(path)
            .with_context(|| format!("loading layout {}", path.display()))?,
        None => Layout::builtin().context("loading the built-in layout")?,
    };

    if args.list_bindings {
        print_bindings(&layout);
        return Ok(());
    }

    let mut config = Config::load_or_create(&args.config)?;
    if let Some(device) = args.device {
        config.controller.device_keyword = device;
    }
    for (key, path) in config.missing_music_files() {
        log::warn!("Music file for {:?} not found: {}", key, path.display());
    }

    log::info!("Starting Eurovision Control Center...");
    let runtime = tokio::runtime::Runtime::new().context("starting the async runtime")?;
    let (sender, receiver) = mpsc::channel();

    let keyword = config.controller.device_keyword.clone();
    let input_sender = sender.clone();
    let _input = mini::Input::guess_named(&keyword, move |msg| forward(msg, &input_sender))
        .with_context(|| format!("connecting to {} input", keyword))?;
    let output = mini::Output::guess_named(&keyword)
        .with_context(|| format!("connecting to {} output", keyword))?;
    log::info!("Connected to {}", keyword);

    let mixer: Box<dyn Mixer> = if args.offline {
        log::warn!("Offline mode: scene switches are only logged");
        Box::new(MockMixer::default())
    } else {
        let mixer = ObsMixer::connect(runtime.handle().clone(), &config)
            .with_context(|| format!("connecting to OBS at {}:{}", config.obs.host, config.obs.port))?;
        Box::new(mixer)
    };
    let player = RodioPlayer::new().context("opening the audio output")?;

    let shutdown_sender = sender.clone();
    runtime.spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_sender.send(Event::Shutdown);
            }
            Err(e) => log::error!("Can't listen for Ctrl-C: {}", e),
        }
    });
    spawn_ticker(Duration::from_millis(config.controller.tick_ms), sender.clone());
    spawn_device_watch(keyword, Duration::from_secs(1), sender);

    log::info!("Use the round buttons to switch menus: 1 SCENES | 2 MUSIC | 3 EFFECTS | 4 UTILITY");
    log::info!("The top right round button is the emergency stop");
    log::info!("Press Ctrl+C to stop");

    let mut engine = Engine::new(layout, config, mixer, Box::new(player), Box::new(output));
    engine.run(&receiver).context("lost the controller")?;

    log::info!("Eurovision Control Center stopped");
    Ok(())
}

/// Turns controller messages into engine events. Runs on midir's thread.
fn forward(msg: Message, events: &Sender<Event>) {
    if let Some(event) = msg.to_event() {
        // the engine is gone once it shuts down
        let _ = events.send(event);
    }
}

fn print_bindings(layout: &Layout) {
    for menu in Menu::ALL {
        println!("{} (select: {})", menu, layout.select_button(menu));
        for (button, action) in layout.bindings(menu) {
            println!(
                "  {:>3}  {:<28} {:?}",
                button.note(),
                action.to_string(),
                layout.color(menu, button)
            );
        }
    }
}
