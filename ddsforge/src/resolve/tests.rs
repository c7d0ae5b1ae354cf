use super::*;
use crate::config::{PatternList, PatternRules};
use crate::source::SourceLocation;
use image::{Rgba, RgbaImage};
use proptest::prelude::*;

fn source(relative_dir: &str, name: &str) -> SourceFile {
    SourceFile {
        location: SourceLocation::File(format!("/in/{}{}.tga", relative_dir, name).into()),
        relative_dir: relative_dir.to_string(),
        name: name.to_string(),
        extension: "tga".to_string(),
        size: 0,
    }
}

fn opaque() -> Frame {
    Frame::new(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255])))
}

fn binary_alpha() -> Frame {
    let mut image = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
    image.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
    Frame::new(image)
}

fn gradient_alpha() -> Frame {
    Frame::new(RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128])))
}

fn rules() -> PatternRules {
    let mut rules = PatternRules::default();
    rules.normal = PatternList::parse("*_norm.*").unwrap();
    rules.height = PatternList::parse("*_bump.*").unwrap();
    rules.set_force(TextureFormat::Dxt3, PatternList::parse("hud/*").unwrap());
    rules.set_force(TextureFormat::Bgra, PatternList::parse("*_raw.*").unwrap());
    rules.set_force(TextureFormat::Dxt4, PatternList::parse("*_pm.*").unwrap());
    rules
}

fn config() -> ConversionConfig {
    ConversionConfig::default().with_patterns(rules())
}

#[test]
fn test_default_heuristic() {
    let config = config();
    let resolver = FormatResolver::new(&config);

    let opaque = resolver.resolve(&opaque(), &source("", "wall"));
    assert_eq!(opaque.format, TextureFormat::Dxt1);
    assert_eq!(opaque.swizzle, SwizzleMode::None);
    assert_eq!(opaque.backend, BackendKind::Weighted);
    assert_eq!(opaque.weights, None);

    let binary = resolver.resolve(&binary_alpha(), &source("", "fence"));
    assert_eq!(binary.format, TextureFormat::Dxt1);

    let gradient = resolver.resolve(&gradient_alpha(), &source("", "glass"));
    assert_eq!(gradient.format, TextureFormat::Dxt5);
}

#[test]
fn test_height_map_is_dxt1_even_with_alpha() {
    let config = config();
    let resolver = FormatResolver::new(&config);
    let decision = resolver.resolve(&gradient_alpha(), &source("", "rock_bump"));
    assert_eq!(decision.format, TextureFormat::Dxt1);
}

#[test]
fn test_normal_map_without_swizzle_switch() {
    let config = config();
    let resolver = FormatResolver::new(&config);
    let decision = resolver.resolve(&opaque(), &source("", "rock_norm"));
    assert_eq!(decision.format, TextureFormat::Dxt1);
    assert_eq!(decision.backend, BackendKind::Ispc);
    assert_eq!(decision.weights, None);
}

#[test]
fn test_swizzled_normal_map() {
    let config = config().with_swizzled_normals(true);
    let resolver = FormatResolver::new(&config);
    let decision = resolver.resolve(&opaque(), &source("", "rock_norm"));
    assert_eq!(decision.format, TextureFormat::Dxt5Xgbr);
    assert_eq!(decision.swizzle, SwizzleMode::NormalRotate);
    assert_eq!(decision.backend, BackendKind::Ispc);
}

#[test]
fn test_weighted_backend_weights() {
    let config = config()
        .with_swizzled_normals(true)
        .with_backend(BackendMode::Weighted);
    let resolver = FormatResolver::new(&config);

    let xgbr = resolver.resolve(&opaque(), &source("", "rock_norm"));
    assert_eq!(xgbr.backend, BackendKind::Weighted);
    assert_eq!(xgbr.weights, Some(ChannelWeights::SWIZZLED_NORMAL));

    let config = self::config().with_backend(BackendMode::Weighted);
    let resolver = FormatResolver::new(&config);
    let plain = resolver.resolve(&opaque(), &source("", "rock_norm"));
    assert_eq!(plain.weights, Some(ChannelWeights::NORMAL));

    let other = resolver.resolve(&opaque(), &source("", "rock"));
    assert_eq!(other.weights, None);
}

#[test]
fn test_force_list_overrides_heuristic() {
    let config = config();
    let resolver = FormatResolver::new(&config);
    let decision = resolver.resolve(&gradient_alpha(), &source("hud/", "ammo"));
    assert_eq!(decision.format, TextureFormat::Dxt3);
    assert_eq!(decision.swizzle, SwizzleMode::None);
}

#[test]
fn test_premultiplied_swizzle() {
    let config = config();
    let resolver = FormatResolver::new(&config);
    let decision = resolver.resolve(&gradient_alpha(), &source("", "smoke_pm"));
    assert_eq!(decision.format, TextureFormat::Dxt4);
    assert_eq!(decision.swizzle, SwizzleMode::Premultiply);
}

#[test]
fn test_forced_format_beats_force_lists() {
    let config = config().with_forced_format(Some(TextureFormat::Dxt5));
    let resolver = FormatResolver::new(&config);
    let decision = resolver.resolve(&gradient_alpha(), &source("hud/", "ammo"));
    assert_eq!(decision.format, TextureFormat::Dxt5);
}

#[test]
fn test_alpha_formats_downgrade_without_alpha() {
    let config = config();
    let resolver = FormatResolver::new(&config);

    // hud/* forces DXT3, but the frame is opaque
    let decision = resolver.resolve(&opaque(), &source("hud/", "ammo"));
    assert_eq!(decision.format, TextureFormat::Dxt1);

    let config = self::config().with_forced_format(Some(TextureFormat::Dxt4));
    let resolver = FormatResolver::new(&config);
    let decision = resolver.resolve(&opaque(), &source("", "wall"));
    assert_eq!(decision.format, TextureFormat::Dxt1);
    assert_eq!(decision.swizzle, SwizzleMode::None);
}

#[test]
fn test_bgra_forces_raw_backend() {
    let config = config().with_backend(BackendMode::Ispc);
    let resolver = FormatResolver::new(&config);
    let decision = resolver.resolve(&opaque(), &source("", "font_raw"));
    assert_eq!(decision.format, TextureFormat::Bgra);
    assert_eq!(decision.backend, BackendKind::Raw);
    assert_eq!(decision.weights, None);
}

#[test]
fn test_backend_lists_apply_in_auto_mode_only() {
    let mut rules = rules();
    rules.set_backend(BackendKind::Ispc, PatternList::parse("sky_*").unwrap());
    let config = ConversionConfig::default().with_patterns(rules);
    let resolver = FormatResolver::new(&config);
    assert_eq!(
        resolver.resolve(&opaque(), &source("env/", "sky_up")).backend,
        BackendKind::Ispc
    );

    let config = config.with_backend(BackendMode::Weighted);
    let resolver = FormatResolver::new(&config);
    assert_eq!(
        resolver.resolve(&opaque(), &source("env/", "sky_up")).backend,
        BackendKind::Weighted
    );
}

#[test]
fn test_swizzle_for() {
    assert_eq!(swizzle_for(TextureFormat::Dxt1), SwizzleMode::None);
    assert_eq!(swizzle_for(TextureFormat::Dxt2), SwizzleMode::Premultiply);
    assert_eq!(swizzle_for(TextureFormat::Dxt5Xgbr), SwizzleMode::NormalRotate);
    assert_eq!(swizzle_for(TextureFormat::Bgra), SwizzleMode::None);
}

proptest! {
    #[test]
    fn prop_downgrade_idempotent(fmt in 0usize..7, has_alpha: bool) {
        let format = TextureFormat::ALL[fmt];
        let once = downgrade_for_alpha(format, has_alpha);
        prop_assert_eq!(downgrade_for_alpha(once, has_alpha), once);
        if !has_alpha {
            prop_assert!(!once.requires_alpha());
        }
        if has_alpha {
            prop_assert_eq!(once, format);
        }
    }
}
