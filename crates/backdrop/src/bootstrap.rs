use anyhow::{anyhow, Context, Result};
use renderer::{RenderMode, RenderPolicy, RendererConfig};

use crate::cli::{parse_antialias, parse_color_space, parse_power, Args};
use crate::config::{default_config_path, FileConfig};

pub fn parse_surface_size(value: &str) -> Result<(u32, u32)> {
    let trimmed = value.trim();
    let (width, height) = trimmed
        .split_once(['x', 'X', '×'])
        .ok_or_else(|| anyhow!("expected WxH format, e.g. 1920x1080"))?;

    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid width in size specification"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| anyhow!("invalid height in size specification"))?;

    if width == 0 || height == 0 {
        anyhow::bail!("surface dimensions must be greater than zero");
    }

    Ok((width, height))
}

/// Loads `--config` (must exist) or the default file (may be absent).
pub fn load_file_config(args: &Args) -> Result<FileConfig> {
    if let Some(path) = args.config.as_deref() {
        tracing::debug!(path = %path.display(), "loading config file");
        return FileConfig::load(path)
            .with_context(|| format!("failed to load config file {}", path.display()));
    }

    let Some(path) = default_config_path() else {
        tracing::debug!("no platform config directory; using built-in defaults");
        return Ok(FileConfig::default());
    };
    match FileConfig::load_optional(&path)
        .with_context(|| format!("failed to load config file {}", path.display()))?
    {
        Some(config) => {
            tracing::debug!(path = %path.display(), "loaded default config file");
            Ok(config)
        }
        None => Ok(FileConfig::default()),
    }
}

/// Merges built-in defaults, the config file, then command-line flags.
pub fn build_renderer_config(args: &Args, file: &FileConfig) -> Result<RendererConfig> {
    let mut config = RendererConfig::default();

    if let Some(size) = args.size.as_deref().or(file.window.size.as_deref()) {
        config.surface_size = parse_surface_size(size)
            .with_context(|| format!("invalid surface size '{size}'"))?;
    }

    config.fullscreen = args.fullscreen || file.window.fullscreen.unwrap_or(false);
    if let Some(title) = args.title.as_ref().or(file.window.title.as_ref()) {
        config.title = title.clone();
    }

    if args.headless {
        config.mode = RenderMode::Headless;
    }

    config.antialiasing = match (args.antialias, file.render.antialias.as_deref()) {
        (Some(mode), _) => mode,
        (None, Some(value)) => {
            parse_antialias(value).map_err(|err| anyhow!("render.antialias: {err}"))?
        }
        (None, None) => config.antialiasing,
    };
    config.color_space = match (args.color_space, file.render.color_space.as_deref()) {
        (Some(mode), _) => mode,
        (None, Some(value)) => {
            parse_color_space(value).map_err(|err| anyhow!("render.color_space: {err}"))?
        }
        (None, None) => config.color_space,
    };
    config.power_preference = match (args.power, file.render.power.as_deref()) {
        (Some(preference), _) => preference,
        (None, Some(value)) => parse_power(value).map_err(|err| anyhow!("render.power: {err}"))?,
        (None, None) => config.power_preference,
    };

    if let Some(time) = args.still_time.or(file.render.still_time) {
        if !time.is_finite() || time < 0.0 {
            anyhow::bail!("still time must be a non-negative number of seconds, got {time}");
        }
        config.policy = RenderPolicy::Still { time };
    }

    if let Some(frames) = args.frames.or(file.headless.frames) {
        config.headless_frames = frames;
    }
    if let Some(step) = file.headless.step {
        config.headless_step = step;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use renderer::{Antialiasing, ColorSpaceMode, GpuPowerPreference};

    use super::*;

    #[test]
    fn parses_surface_sizes() {
        assert_eq!(parse_surface_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_surface_size(" 800 X 600 ").unwrap(), (800, 600));
        assert_eq!(parse_surface_size("640×480").unwrap(), (640, 480));
    }

    #[test]
    fn rejects_bad_surface_sizes() {
        assert!(parse_surface_size("0x10").is_err());
        assert!(parse_surface_size("10x0").is_err());
        assert!(parse_surface_size("1280").is_err());
        assert!(parse_surface_size("widex720").is_err());
    }

    #[test]
    fn defaults_apply_without_flags_or_file() {
        let config = build_renderer_config(&Args::default(), &FileConfig::default()).unwrap();
        assert_eq!(config.surface_size, (1280, 720));
        assert_eq!(config.mode, RenderMode::Windowed);
        assert_eq!(config.policy, RenderPolicy::Animate);
        assert!(!config.fullscreen);
    }

    #[test]
    fn file_values_fill_in_missing_flags() {
        let file = FileConfig::from_toml_str(
            r#"
            [window]
            size = "320x200"
            fullscreen = true
            [render]
            antialias = "2"
            color_space = "linear"
            power = "high"
            still_time = 4.0
            [headless]
            frames = 9
            step = 0.5
            "#,
        )
        .unwrap();
        let config = build_renderer_config(&Args::default(), &file).unwrap();
        assert_eq!(config.surface_size, (320, 200));
        assert!(config.fullscreen);
        assert_eq!(config.antialiasing, Antialiasing::Samples(2));
        assert_eq!(config.color_space, ColorSpaceMode::Linear);
        assert_eq!(config.power_preference, GpuPowerPreference::High);
        assert_eq!(config.policy, RenderPolicy::Still { time: 4.0 });
        assert_eq!(config.headless_frames, 9);
        assert_eq!(config.headless_step, 0.5);
    }

    #[test]
    fn flags_override_the_file() {
        let file = FileConfig::from_toml_str(
            "[window]\nsize = \"320x200\"\n[render]\nantialias = \"4\"\n[headless]\nframes = 9\n",
        )
        .unwrap();
        let args = Args {
            size: Some("64x48".to_string()),
            antialias: Some(Antialiasing::Off),
            frames: Some(3),
            headless: true,
            ..Args::default()
        };
        let config = build_renderer_config(&args, &file).unwrap();
        assert_eq!(config.surface_size, (64, 48));
        assert_eq!(config.antialiasing, Antialiasing::Off);
        assert_eq!(config.headless_frames, 3);
        assert_eq!(config.mode, RenderMode::Headless);
    }

    #[test]
    fn bad_file_vocabulary_is_reported() {
        let file = FileConfig::from_toml_str("[render]\npower = \"turbo\"\n").unwrap();
        let err = build_renderer_config(&Args::default(), &file).unwrap_err();
        assert!(err.to_string().contains("render.power"));
    }

    #[test]
    fn negative_still_time_flag_is_rejected() {
        let args = Args {
            still_time: Some(-2.0),
            ..Args::default()
        };
        assert!(build_renderer_config(&args, &FileConfig::default()).is_err());
    }
}
