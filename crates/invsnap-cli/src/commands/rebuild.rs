//! Rebuild command

use anyhow::Context;
use invsnap_engine::commands::rebuild;
use invsnap_engine::RebuildConfig;

pub fn execute(config: &RebuildConfig) -> anyhow::Result<()> {
    let outcome = rebuild(config).with_context(|| {
        format!(
            "rebuild of {} from {} failed",
            config.data_dir.display(),
            config.input_dir.display()
        )
    })?;

    for file in &outcome.files {
        for issue in &file.issues {
            eprintln!(
                "warning: {}:{}: {:?}: {}",
                file.source_file, issue.line, issue.kind, issue.message
            );
        }
    }
    for warning in &outcome.prior_warnings {
        eprintln!("warning: {}", warning);
    }

    println!(
        "Rebuilt {} snapshot(s) ({} reused, {} new, {} row issue(s)) into {}",
        outcome.snapshot_count(),
        outcome.reused_count(),
        outcome.minted_count(),
        outcome.issue_count(),
        config.data_dir.display()
    );
    match &outcome.current {
        Some(current) => println!(
            "Current: {} ({}, uploaded {})",
            current.meta.source_file, current.meta.snapshot_date, current.meta.uploaded_at
        ),
        None => println!("Current: none"),
    }

    Ok(())
}
