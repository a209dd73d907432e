use std::io;
use std::rc::Rc;

use anyhow::Context;

use stockroom_cli::{Config, Console, Shell};
use stockroom_storage::FileStore;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("invalid configuration")?;
    stockroom_observability::init(config.log_format);

    if config.credentials.is_default() {
        tracing::warn!("STOCKROOM_USERNAME/STOCKROOM_PASSWORD not set; using built-in credentials");
    }

    let storage = FileStore::open(&config.data_file)
        .with_context(|| format!("failed to open store at {:?}", config.data_file))?;
    tracing::info!(path = %storage.path().display(), "store opened");

    let console = Rc::new(Console::new(io::stdin().lock(), io::stdout()));
    let mut shell = Shell::new(Rc::new(storage), config.credentials, console)
        .context("failed to load inventory")?;

    shell.run().context("terminal i/o failed")?;
    Ok(())
}
