use std::path::Path;

use tscore_trainer::TrainerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = TrainerConfig::from_env();

    println!(
        "trainer-selfcheck: starting with output_dir={}",
        config.output_dir
    );
    ensure_output_dir(&config.output_dir).await?;
    ensure_env_present(&["YOUTUBE_API_KEY", "VISION_API_KEY"])?;

    println!("trainer-selfcheck: ok");
    Ok(())
}

async fn ensure_output_dir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;

    let probe = path.join(".selfcheck");
    tokio::fs::write(&probe, b"ok")
        .await
        .map_err(|e| anyhow::anyhow!("output dir {} not writable: {}", path.display(), e))?;
    tokio::fs::remove_file(&probe).await?;
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        if std::env::var(var).is_err() {
            return Err(anyhow::anyhow!("missing required env var {}", var));
        }
    }
    Ok(())
}
