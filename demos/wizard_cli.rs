//! Command-line front end for WiZ lights.
//!
//! Discovers bulbs, shows and changes their state, and keeps display names
//! and custom presets in a preference file.
//!
//! Run with: cargo run --example wizard_cli -- --help

use clap::{Parser, Subcommand};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;
use wizard_lights::{
    Brightness, BulbClass, Color, CustomPreset, DeviceHandle, Discovery, Kelvin, PreferenceStore,
    RetryPolicy, ScenePresetStore,
};

#[derive(Parser)]
#[command(name = "wizard-cli")]
#[command(about = "Control WiZ smart lights from the command line", long_about = None)]
struct Cli {
    /// IP address of the bulb (not required for discover, scenes and names)
    #[arg(short, long, global = true)]
    ip: Option<Ipv4Addr>,

    /// Preference file holding display names and presets
    #[arg(long, global = true, default_value = "wizard-prefs.json")]
    prefs: PathBuf,

    /// Retry requests that get no reply
    #[arg(long, global = true)]
    retry: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover all bulbs on the network
    Discover {
        /// Broadcast address of the local subnet
        #[arg(short, long, default_value = "255.255.255.255")]
        broadcast: Ipv4Addr,

        /// How long to collect replies, in seconds
        #[arg(short, long, default_value = "5")]
        window: u64,
    },

    /// Show the current state of the bulb
    Status {
        /// Print the state as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show module name and firmware of the bulb
    Info,

    /// Turn the bulb on
    On,

    /// Turn the bulb off
    Off,

    /// Set an RGB color given as r,g,b (0-255 each)
    Color {
        color: Color,

        /// Brightness in percent (0-100)
        #[arg(short, long, default_value = "100")]
        brightness: u8,
    },

    /// Set a white color temperature in Kelvin (1000-10000)
    Temperature {
        kelvin: u16,

        /// Brightness in percent (0-100)
        #[arg(short, long, default_value = "100")]
        brightness: u8,
    },

    /// Start a built-in scene or a saved preset by name
    Scene { name: String },

    /// List the built-in scenes
    Scenes,

    /// Give the bulb a display name
    Name { name: String },

    /// List the known bulbs and their display names
    Names,

    /// Manage custom presets of the bulb
    Preset {
        #[command(subcommand)]
        command: PresetCommands,
    },
}

#[derive(Subcommand)]
enum PresetCommands {
    /// Save the bulb's current color and brightness under a name
    Save { name: String },

    /// List the saved presets
    List,

    /// Remove a saved preset
    Remove { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let retry = if cli.retry {
        RetryPolicy::default()
    } else {
        RetryPolicy::none()
    };
    let mut prefs = PreferenceStore::load(&cli.prefs)?;

    match cli.command {
        Commands::Discover { broadcast, window } => {
            println!("Discovering bulbs via {broadcast} ({window}s)...");
            let bulbs = Discovery::new(broadcast)
                .window(Duration::from_secs(window))
                .run()
                .await?;

            if bulbs.is_empty() {
                println!("No bulbs found on the network.");
            } else {
                println!("\nFound {} bulb(s):", bulbs.len());
                for bulb in &bulbs {
                    prefs.ensure_device(bulb.mac());
                    println!(
                        "  {:21}  {:14}  {}",
                        bulb.addr().to_string(),
                        bulb.mac(),
                        prefs.display_name(bulb.mac())
                    );
                }
                prefs.save(&cli.prefs)?;
            }
        }

        Commands::Scenes => {
            for (name, id) in ScenePresetStore::builtin().iter() {
                println!("  {id:4}  {name}");
            }
        }

        Commands::Names => {
            for (mac, profile) in prefs.devices() {
                println!("  {mac:14}  {}", profile.name().unwrap_or("-"));
            }
        }

        command => {
            let ip = cli
                .ip
                .ok_or("IP address is required for this command. Use --ip <IP>")?;
            let probe = DeviceHandle::new("", ip);
            let config = retry.run(|| probe.system_config()).await?;
            let bulb = DeviceHandle::new(&config.mac, ip);
            let label = prefs.display_name(bulb.mac()).to_string();
            let class = config.bulb_class().unwrap_or(BulbClass::Rgb);

            match command {
                Commands::Status { json } => {
                    let state = retry.run(|| bulb.query_state()).await?;
                    if json {
                        println!("{}", serde_json::to_string_pretty(&state)?);
                        return Ok(());
                    }
                    println!("{label} ({ip}):");
                    println!("  Power: {}", if state.power() { "ON" } else { "OFF" });
                    if let Some(color) = state.color() {
                        println!(
                            "  Color: RGB({}, {}, {})",
                            color.red(),
                            color.green(),
                            color.blue()
                        );
                    }
                    if let Some(brightness) = state.brightness() {
                        println!("  Brightness: {}%", brightness.value());
                    }
                    if let Some(temp) = state.temp() {
                        println!("  Temperature: {}K", temp.kelvin());
                    }
                    match (state.scene_name(), state.scene_id()) {
                        (Some(name), _) => println!("  Scene: {name}"),
                        (None, Some(id)) => println!("  Scene: #{id}"),
                        (None, None) => {}
                    }
                    if let Some(rssi) = state.rssi() {
                        println!("  Signal: {rssi} dBm");
                    }
                }

                Commands::Info => {
                    println!("{label} ({ip}):");
                    println!("  MAC: {}", config.mac);
                    if let Some(module) = &config.module_name {
                        println!("  Module: {module}");
                    }
                    println!("  Class: {class:?}");
                    if let Some(fw) = &config.fw_version {
                        println!("  Firmware: {fw}");
                    }
                }

                Commands::On => {
                    retry.run(|| bulb.turn_on()).await?;
                    println!("{label} turned ON");
                }

                Commands::Off => {
                    retry.run(|| bulb.turn_off()).await?;
                    println!("{label} turned OFF");
                }

                Commands::Color { color, brightness } => {
                    if !class.supports_color() {
                        return Err(format!("{label} is a {class:?} bulb without color").into());
                    }
                    let brightness =
                        Brightness::create(brightness).ok_or("brightness must be 0-100")?;
                    retry.run(|| bulb.set_color(&color, &brightness)).await?;
                    println!(
                        "{label} set to RGB({}, {}, {})",
                        color.red(),
                        color.green(),
                        color.blue()
                    );
                }

                Commands::Temperature { kelvin, brightness } => {
                    let temp = Kelvin::create(kelvin).ok_or("temperature must be 1000-10000K")?;
                    let brightness =
                        Brightness::create(brightness).ok_or("brightness must be 0-100")?;
                    retry.run(|| bulb.set_temperature(&temp, &brightness)).await?;
                    println!("{label} set to {kelvin}K");
                }

                Commands::Scene { name } => {
                    let scenes = ScenePresetStore::builtin();
                    if scenes.contains(&name) && !class.supports_scenes() {
                        return Err(format!("{label} is a {class:?} bulb without scenes").into());
                    }
                    let command = prefs.resolve(bulb.mac(), &name, scenes)?;
                    retry.run(|| bulb.execute(&command)).await?;
                    println!("{label} set to '{name}'");
                }

                Commands::Name { name } => {
                    prefs.set_display_name(bulb.mac(), &name);
                    prefs.save(&cli.prefs)?;
                    println!("{} is now '{name}'", bulb.mac());
                }

                Commands::Preset { command } => match command {
                    PresetCommands::Save { name } => {
                        if ScenePresetStore::builtin().contains(&name) {
                            return Err(format!("'{name}' is a built-in scene name").into());
                        }
                        let state = retry.run(|| bulb.query_state()).await?;
                        let preset = CustomPreset::from_snapshot(&state)
                            .ok_or("the bulb is not showing a plain color")?;
                        prefs.save_preset(bulb.mac(), &name, preset);
                        prefs.save(&cli.prefs)?;
                        println!("Saved '{name}' for {label}");
                    }
                    PresetCommands::List => {
                        for (name, preset) in prefs.presets(bulb.mac()) {
                            let color = preset.color();
                            println!(
                                "  {name}: RGB({}, {}, {}) at {}%",
                                color.red(),
                                color.green(),
                                color.blue(),
                                preset.brightness().value()
                            );
                        }
                    }
                    PresetCommands::Remove { name } => {
                        if prefs.remove_preset(bulb.mac(), &name).is_some() {
                            prefs.save(&cli.prefs)?;
                            println!("Removed '{name}'");
                        } else {
                            println!("No preset named '{name}' for {label}");
                        }
                    }
                },

                Commands::Discover { .. } | Commands::Scenes | Commands::Names => unreachable!(),
            }
        }
    }

    Ok(())
}
