//! Discover all WiZ bulbs on the network and set them to red.
//!
//! Run with: cargo run --example discover_and_set_red -- [BROADCAST_ADDR]

use std::net::Ipv4Addr;
use std::time::Duration;
use wizard_lights::{Brightness, Color, discover};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let broadcast = match std::env::args().nth(1) {
        Some(addr) => addr.parse()?,
        None => Ipv4Addr::BROADCAST,
    };

    println!("Discovering bulbs via {broadcast}...");
    let bulbs = discover(broadcast, Duration::from_secs(5)).await?;

    if bulbs.is_empty() {
        println!("No bulbs found on the network.");
        return Ok(());
    }

    println!("Found {} bulb(s):", bulbs.len());
    for bulb in &bulbs {
        println!("  - {} at {}", bulb.mac(), bulb.addr());
    }

    let red = Color::rgb(255, 0, 0);
    let brightness = Brightness::new();

    println!("\nSetting all bulbs to red...");

    // Each handle is independent, so the requests go out together.
    let results =
        futures::future::join_all(bulbs.iter().map(|bulb| bulb.set_color(&red, &brightness)))
            .await;

    for (bulb, result) in bulbs.iter().zip(results) {
        match result {
            Ok(()) => println!("  ✓ {} is red", bulb.mac()),
            Err(e) => eprintln!("  ✗ {}: {}", bulb.mac(), e),
        }
    }

    println!("\nDone!");
    Ok(())
}
