//! Reference embedder loop (base spec §10): wires `tracing_subscriber`, a
//! [`World`], and a [`PluginHost`] together, ticking at a fixed rate and
//! polling the plugin host for hot-reloads every frame.
//!
//! Run with `cargo run -p crucible-demo-runtime -- <plugin-dir>`. Drop a
//! rebuilt `combat_plugin` cdylib into the watched directory while this is
//! running to see it hot-reload (§8 scenario S6).

use std::time::{Duration, Instant};

use anyhow::Context;
use crucible_core::{World, WorldConfig};
use crucible_inspect::InspectAdapter;
use crucible_plugin::{PluginHost, PluginHostConfig};

const TICK_RATE: Duration = Duration::from_millis(1000 / 60);
const DEMO_TICKS: u64 = 600;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let plugin_dir = std::env::args().nth(1).unwrap_or_else(|| "plugins".to_string());
    let mut world = World::new(WorldConfig { max_entities: 5000 });
    let mut host = PluginHost::new(PluginHostConfig::new(&plugin_dir), &mut world)
        .with_context(|| format!("failed to start plugin host watching {plugin_dir}"))?;
    let adapter = InspectAdapter::new(crucible_inspect::InspectRegistry::new());

    tracing::info!(plugin_dir, "crucible demo runtime starting");

    for tick in 0..DEMO_TICKS {
        let frame_start = Instant::now();

        host.poll(&mut world);
        if let Err(err) = world.tick(TICK_RATE.as_secs_f32()) {
            tracing::error!(%err, "tick failed");
        }

        if tick % 60 == 0 {
            let status = adapter.world_status(&world);
            tracing::info!(
                tick,
                systems = status.system_count,
                services = status.service_count,
                plugins = host.loaded_count(),
                "status"
            );
        }

        if let Some(remaining) = TICK_RATE.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    tracing::info!("crucible demo runtime exiting");
    Ok(())
}
