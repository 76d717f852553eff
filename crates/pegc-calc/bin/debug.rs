use std::{io::Read, str::FromStr};

use anyhow::Context;
use pegc_backend::ParseOptions;

fn main() -> anyhow::Result<()> {
    let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_owned());
    let level = log::LevelFilter::from_str(&level)?;

    simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_time_format_custom(&[])
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Never,
    )?;

    let parser = pegc_calc::parser().map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::anyhow!("Invalid grammar:\n{}", messages.join("\n"))
    })?;

    if log::log_enabled!(log::Level::Debug) {
        let mut buf = String::new();
        parser.grammar().display_into(&mut buf)?;
        log::debug!("{buf}");
    }

    let (input, source) = match std::env::args().nth(1) {
        Some(file) => {
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {file}"))?;
            (contents, Some(file.into()))
        }
        None => {
            let mut contents = String::new();
            std::io::stdin().read_to_string(&mut contents)?;
            (contents, None)
        }
    };

    let options = ParseOptions {
        start_rule: None,
        source,
    };
    match parser.parse_with(input.trim_end(), &options) {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(err) => {
            log::error!("{}: {}", err.location, err.message);
            println!("{}", serde_json::to_string_pretty(&err)?);
            std::process::exit(1);
        }
    }
}
