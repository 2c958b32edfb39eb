use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use circular_buffer::RingStore;

mod config;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = config::get()?;

    let mut store = RingStore::<u32>::new(config.capacity)?;
    for value in 0..config.item_count {
        store.put(value);
    }
    info!(count = store.count(), range = ?store.range(), "filled ring store");

    {
        let selective = store.selective(&config.indexes)?;
        for (position, value) in selective.iter().enumerate() {
            info!(position, slot = config.indexes[position], value, "selected");
        }
    }

    store.selective_mut(&config.indexes)?.fill(config.fill_value);

    let window = store.sub_buffer();
    info!(items = ?window.iter().collect::<Vec<_>>(), "window after fill");
    Ok(())
}
