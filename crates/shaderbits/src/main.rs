mod cli;
mod paths;
mod run;

use anyhow::Result;
use cli::{Command, ControlsArgs, ListArgs};
use effects::EffectKind;
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Command::List(args) => run_list(args),
        Command::Controls(args) => run_controls(args),
        Command::Run(args) => run::run(args),
        Command::Where => run_where(),
    }
}

fn run_list(args: ListArgs) -> Result<()> {
    let query = args.search.unwrap_or_default();
    let cards = effects::search(&query);
    if cards.is_empty() {
        println!("No effects match '{}'", query.trim());
        return Ok(());
    }
    for card in cards {
        let kind = card.kind;
        println!(
            "{:>2}. {:<16} {:<10} {}",
            card.number,
            kind.title(),
            kind.name(),
            kind.description()
        );
    }
    Ok(())
}

fn run_controls(args: ControlsArgs) -> Result<()> {
    let kind: EffectKind = args.effect;
    let effect = effects::create(kind);
    println!("{} ({kind}) controls:", kind.title());
    for control in effect.controls() {
        println!(
            "  {:<18} {:<20} default={:<10} range={}",
            control.id,
            control.label,
            control.display_value(),
            control.describe_range()
        );
    }
    Ok(())
}

fn run_where() -> Result<()> {
    let paths = AppPaths::discover()?;
    let config_file = paths.config_file();
    println!("Directories:");
    println!("  config:  {}", paths.config_dir().display());
    println!("  data:    {}", paths.data_dir().display());
    println!("  cache:   {}", paths.cache_dir().display());
    println!(
        "Gallery config: {} ({})",
        config_file.display(),
        if config_file.is_file() {
            "present"
        } else {
            "not found"
        }
    );
    Ok(())
}
