use std::error::Error;

use gitid::{identify_metadata, permalink, IdentifierOptions};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let raw = gitid::sample_metadata();
    let result = identify_metadata(
        &raw,
        &IdentifierOptions {
            include_metadata: true,
            ..Default::default()
        },
    )?;

    println!("identifier: {}", result.identifier);
    println!("short:      {}", result.short);

    if let Some(meta) = result.metadata {
        println!(
            "permalink:  {}",
            permalink("github.com", &meta.owner, &meta.repo, &meta.commit_hash, &meta.file_path),
        );
    }

    Ok(())
}
