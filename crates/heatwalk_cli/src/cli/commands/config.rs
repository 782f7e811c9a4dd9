use anyhow::Result;
use heatwalk_core::config::{ENV_API_KEY, ENV_BASE_URL, is_graphhopper_cloud, normalize_base_url};

use crate::cli::Loaded;
use crate::ui::{info, warning};

pub fn run(loaded: &Loaded) -> Result<()> {
    match &loaded.path {
        Some(p) => info(format!("Config file: {}", p.display())),
        None => info("Config file: none (using defaults)"),
    }
    println!("Environment overrides: {ENV_BASE_URL}, {ENV_API_KEY}");
    println!();

    let routing = &loaded.cfg.routing;
    match normalize_base_url(&routing.base_url) {
        Some(base) if is_graphhopper_cloud(&base) && routing.api_key.is_none() => {
            warning(format!("{base} is GraphHopper cloud but no API key is set"));
        }
        Some(_) => {}
        None => warning(format!("Base URL '{}' is not usable", routing.base_url)),
    }

    // keep the key out of terminal scrollback
    let mut shown = loaded.cfg.clone();
    if shown.routing.api_key.is_some() {
        shown.routing.api_key = Some("***".to_string());
    }
    println!("{}", serde_json::to_string_pretty(&shown)?);
    Ok(())
}
