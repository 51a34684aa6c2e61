use std::path::Path;

use anyhow::Result;

use crate::commands::read_config;
use crate::crud::DB;
use crate::palette::Palette;
use crate::utils::ask_yn;

pub async fn run(db: &DB, path: &Path, symbols: Option<String>, yes: bool) -> Result<()> {
    let (_, fingerprint) = read_config(path, symbols)?;

    if db.state_updated_at(&fingerprint).await?.is_none() {
        println!("{}", Palette::dim("No saved answers for this exercise."));
        return Ok(());
    }

    if !yes && !ask_yn(format!("Forget saved answers for {}?", path.display()))? {
        return Ok(());
    }

    if db.clear_state(&fingerprint).await? {
        println!(
            "{} {}",
            Palette::paint(Palette::SUCCESS, "Forgot saved answers for"),
            path.display()
        );
    }
    Ok(())
}
