use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use effects::EffectKind;
use presets::AntialiasSetting;

#[derive(Parser, Debug)]
#[command(
    name = "shaderbits",
    author,
    version,
    about = "Gallery of interactive GPU shader effects",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the numbered effect catalog.
    List(ListArgs),
    /// Show the dock controls of an effect with their defaults.
    Controls(ControlsArgs),
    /// Open the gallery window.
    Run(RunArgs),
    /// Print resolved config, data and cache directories.
    Where,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive filter on effect title or description.
    #[arg(long, short, value_name = "TEXT")]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct ControlsArgs {
    #[arg(value_name = "EFFECT", value_parser = parse_effect)]
    pub effect: EffectKind,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Effect shown first (defaults to the config's `defaults.effect`, then aurora).
    #[arg(value_name = "EFFECT", value_parser = parse_effect)]
    pub effect: Option<EffectKind>,

    /// Override a control of the starting effect; repeatable.
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Gallery config file (defaults to `<config_dir>/gallery.toml` when present).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Initial window size.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = presets::parse_size)]
    pub size: Option<(u32, u32)>,

    /// Frame rate cap; `0` renders as fast as the display allows.
    #[arg(long, value_name = "FPS", value_parser = parse_fps)]
    pub fps: Option<f32>,

    /// Freeze the animation at this many seconds.
    #[arg(long, value_name = "SECONDS", value_parser = parse_still_time)]
    pub still_time: Option<f32>,

    /// MSAA mode: `auto`, `off`, or a sample count (2/4/8/16).
    #[arg(long, value_name = "MODE", value_parser = presets::parse_antialias)]
    pub antialias: Option<AntialiasSetting>,

    /// Cycle through effects using the config's `[tour]` table.
    #[arg(long)]
    pub tour: bool,

    /// Present opaque frames even for effects with a transparent background.
    #[arg(long)]
    pub opaque: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_effect(value: &str) -> Result<EffectKind, String> {
    value.parse::<EffectKind>()
}

/// Splits `key=value`; the key is trimmed, the value kept verbatim apart
/// from surrounding whitespace.
pub fn parse_assignment(value: &str) -> Result<(String, String), String> {
    let (key, rest) = value
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{value}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing control name in '{value}'"));
    }
    Ok((key.to_string(), rest.trim().to_string()))
}

pub fn parse_fps(value: &str) -> Result<f32, String> {
    let fps: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid frame rate '{value}'"))?;
    if !fps.is_finite() || fps < 0.0 {
        return Err("frame rate must be a non-negative number".into());
    }
    Ok(fps)
}

pub fn parse_still_time(value: &str) -> Result<f32, String> {
    let seconds: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid still time '{value}'; expected seconds"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err("still time must be a non-negative number of seconds".into());
    }
    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignments_split_on_first_equals() {
        assert_eq!(
            parse_assignment("preset=Cosmic").unwrap(),
            ("preset".to_string(), "Cosmic".to_string())
        );
        assert_eq!(
            parse_assignment(" color = #ff00aa=x ").unwrap(),
            ("color".to_string(), "#ff00aa=x".to_string())
        );
        assert!(parse_assignment("preset").is_err());
        assert!(parse_assignment("=1").is_err());
    }

    #[test]
    fn fps_and_still_time_reject_negatives() {
        assert_eq!(parse_fps("30").unwrap(), 30.0);
        assert_eq!(parse_fps("0").unwrap(), 0.0);
        assert!(parse_fps("-1").is_err());
        assert!(parse_fps("fast").is_err());

        assert_eq!(parse_still_time("2.5").unwrap(), 2.5);
        assert!(parse_still_time("-0.5").is_err());
        assert!(parse_still_time("inf").is_err());
    }

    #[test]
    fn run_subcommand_collects_repeated_sets() {
        let cli = Cli::try_parse_from([
            "shaderbits",
            "run",
            "galaxy",
            "--set",
            "preset=Cosmic",
            "--set",
            "star_speed=1.5",
            "--size",
            "800x600",
            "--antialias",
            "4",
            "--tour",
        ])
        .unwrap();
        let Command::Run(args) = cli.command else {
            panic!("expected run subcommand");
        };
        assert_eq!(args.effect, Some(EffectKind::Galaxy));
        assert_eq!(args.set.len(), 2);
        assert_eq!(args.set[1], ("star_speed".to_string(), "1.5".to_string()));
        assert_eq!(args.size, Some((800, 600)));
        assert_eq!(args.antialias, Some(AntialiasSetting::Samples4));
        assert!(args.tour);
        assert!(!args.opaque);
    }

    #[test]
    fn unknown_effect_is_a_usage_error() {
        assert!(Cli::try_parse_from(["shaderbits", "controls", "lava"]).is_err());
        assert!(Cli::try_parse_from(["shaderbits", "run", "--size", "big"]).is_err());
    }
}
