use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = ring_visualizer::config::Config::parse();
    if cfg.list_devices {
        ring_visualizer::audio::list_input_devices()?;
        return Ok(());
    }

    ring_visualizer::app::run(cfg)
}
