//! Summary command

use invsnap_engine::commands::current_summary;
use invsnap_engine::RebuildConfig;

pub fn execute(config: &RebuildConfig) -> anyhow::Result<()> {
    print!("{}", current_summary(&config.data_dir)?);
    Ok(())
}
