//! The configure-gpg command

use std::path::Path;

use colored::Colorize;
use prr_core::{ConfigResolver, gpgconf};
use prr_fs::RobustnessConfig;

use crate::error::Result;

pub fn run_configure_gpg(resolver: &ConfigResolver, gpg_conf: Option<&Path>) -> Result<()> {
    let path = match gpg_conf {
        Some(path) => path.to_path_buf(),
        None => resolver.environment().gpg_conf()?,
    };

    if gpgconf::apply_preferences(&path, RobustnessConfig::default())? {
        println!("{} Updated {}", "OK".green().bold(), path.display());
    } else {
        println!("{} {} already up to date", "OK".green().bold(), path.display());
    }
    Ok(())
}
