use std::path::PathBuf;

use clap::Parser;
use renderer::{Antialiasing, ColorSpaceMode, GpuPowerPreference};

/// Every option is optional so values from the config file can fill the gaps.
#[derive(Parser, Debug, Default)]
#[command(
    name = "backdrop",
    author,
    version,
    about = "Animated procedural background",
    arg_required_else_help = false
)]
pub struct Args {
    /// Config file; defaults to `<config dir>/backdrop/backdrop.toml` when present.
    #[arg(long, value_name = "PATH", env = "BACKDROP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Window or headless frame size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT")]
    pub size: Option<String>,

    /// Cover the whole monitor with a borderless window.
    #[arg(long)]
    pub fullscreen: bool,

    /// Evaluate frames on the CPU without opening a window.
    #[arg(long)]
    pub headless: bool,

    /// Number of frames to evaluate in headless mode.
    #[arg(long, value_name = "N")]
    pub frames: Option<u32>,

    /// Freeze the animation at this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub still_time: Option<f32>,

    /// Anti-aliasing policy: `auto`, `off`, or an explicit MSAA sample count (e.g. `4`).
    #[arg(long, value_name = "MODE", value_parser = parse_antialias)]
    pub antialias: Option<Antialiasing>,

    /// Output color space handling: `auto`, `gamma`, or `linear`.
    #[arg(long, value_name = "MODE", value_parser = parse_color_space)]
    pub color_space: Option<ColorSpaceMode>,

    /// GPU selection hint: `low` (integrated) or `high` (discrete).
    #[arg(long, value_name = "PREFERENCE", value_parser = parse_power)]
    pub power: Option<GpuPowerPreference>,

    /// Window title.
    #[arg(long)]
    pub title: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}

pub fn parse_antialias(value: &str) -> Result<Antialiasing, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("anti-alias mode must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" | "max" | "default" => Ok(Antialiasing::Auto),
        "off" | "none" | "disable" | "disabled" | "0" => Ok(Antialiasing::Off),
        _ => {
            let samples: u32 = normalized.parse().map_err(|_| {
                format!("invalid anti-alias sample count '{trimmed}'; use auto/off or 2/4/8/16")
            })?;

            if samples == 1 {
                return Ok(Antialiasing::Off);
            }

            if !matches!(samples, 2 | 4 | 8 | 16) {
                return Err(format!(
                    "unsupported sample count {samples}; supported values are 2, 4, 8, or 16"
                ));
            }

            Ok(Antialiasing::Samples(samples))
        }
    }
}

pub fn parse_color_space(value: &str) -> Result<ColorSpaceMode, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("color space must not be empty".to_string());
    }

    let normalized = trimmed.to_ascii_lowercase();
    match normalized.as_str() {
        "auto" => Ok(ColorSpaceMode::Auto),
        "gamma" | "srgb-off" => Ok(ColorSpaceMode::Gamma),
        "linear" | "srgb" => Ok(ColorSpaceMode::Linear),
        other => Err(format!(
            "unknown color space '{other}'; expected auto, gamma, or linear"
        )),
    }
}

pub fn parse_power(value: &str) -> Result<GpuPowerPreference, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "low" | "low-power" | "integrated" => Ok(GpuPowerPreference::Low),
        "high" | "high-performance" | "discrete" => Ok(GpuPowerPreference::High),
        "" => Err("power preference must not be empty".to_string()),
        other => Err(format!(
            "unknown power preference '{other}'; expected low or high"
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antialias_accepts_keywords_and_sample_counts() {
        assert_eq!(parse_antialias("AUTO").unwrap(), Antialiasing::Auto);
        assert_eq!(parse_antialias(" off ").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("1").unwrap(), Antialiasing::Off);
        assert_eq!(parse_antialias("4").unwrap(), Antialiasing::Samples(4));
        assert!(parse_antialias("3").is_err());
        assert!(parse_antialias("lots").is_err());
        assert!(parse_antialias("").is_err());
    }

    #[test]
    fn color_space_aliases() {
        assert_eq!(parse_color_space("srgb").unwrap(), ColorSpaceMode::Linear);
        assert_eq!(parse_color_space("Gamma").unwrap(), ColorSpaceMode::Gamma);
        assert!(parse_color_space("hdr").is_err());
    }

    #[test]
    fn power_preference_aliases() {
        assert_eq!(parse_power("discrete").unwrap(), GpuPowerPreference::High);
        assert_eq!(parse_power("low").unwrap(), GpuPowerPreference::Low);
        assert!(parse_power("").is_err());
        assert!(parse_power("turbo").is_err());
    }

    #[test]
    fn flags_parse_into_optional_overrides() {
        let args = Args::try_parse_from([
            "backdrop",
            "--headless",
            "--frames",
            "12",
            "--size",
            "640x360",
            "--antialias",
            "off",
        ])
        .unwrap();
        assert!(args.headless);
        assert_eq!(args.frames, Some(12));
        assert_eq!(args.size.as_deref(), Some("640x360"));
        assert_eq!(args.antialias, Some(Antialiasing::Off));
        assert_eq!(args.color_space, None);
        assert_eq!(args.still_time, None);
    }
}
