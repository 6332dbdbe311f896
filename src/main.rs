mod commands;

use std::io::IsTerminal;

use crate::commands::RootCommand;

fn main() {
    let opts: RootCommand = argh::from_env();

    let levels = std::env::var("SCRAPE_LOG").unwrap_or_else(|_| match opts.log_level.as_str() {
        "off" => "off".to_owned(),
        level => [
            format!("scrape_supervisor={level}"),
            format!("scrape={level}"),
        ]
        .join(","),
    });
    let color = std::io::stderr().is_terminal();
    scrape_supervisor::trace::init(color, false, &levels);

    if let Err(code) = opts.run() {
        std::process::exit(code);
    }
}
