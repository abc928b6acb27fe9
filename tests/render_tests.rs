//! Integration tests for frame rendering

use led_ornament::colors::{BATTERY_GREEN, OFF, RED, flags};
use led_ornament::render::BLINK_WINDOWS;
use led_ornament::{
    BatteryLevel, ModeTable, Pattern, Pixel, RenderParams, presets, progress_at, render,
};

const LEDS: usize = 10;

fn gauge(level: BatteryLevel, progress: u8) -> [Pixel; LEDS] {
    render(
        &Pattern::BatteryBar(BATTERY_GREEN),
        progress,
        &RenderParams { battery: level },
    )
}

fn lit_count(frame: &[Pixel]) -> usize {
    frame.iter().filter(|&&p| p != OFF).count()
}

#[test]
fn empty_battery_renders_all_dark() {
    for progress in [0, 1, 100, 254] {
        assert_eq!(lit_count(&gauge(BatteryLevel::whole(0), progress)), 0);
    }
}

#[test]
fn full_battery_renders_all_lit() {
    for progress in [0, 1, 100, 254] {
        let frame = gauge(BatteryLevel::whole(LEDS as u8), progress);
        assert!(frame.iter().all(|&p| p == BATTERY_GREEN));
    }
}

#[test]
fn gauge_is_monotonic_in_level() {
    for progress in [0u8, 1] {
        let mut previous = 0;
        for lit in 0..=LEDS as u8 {
            let count = lit_count(&gauge(BatteryLevel::whole(lit), progress));
            assert_eq!(count, lit as usize);
            assert!(count >= previous);
            previous = count;
        }
    }
}

#[test]
fn partial_pixel_flickers_with_progress() {
    let level = BatteryLevel { lit: 3, fraction: 128 };
    assert_eq!(lit_count(&gauge(level, 10)), 4);
    assert_eq!(lit_count(&gauge(level, 11)), 3);
}

#[test]
fn out_of_range_level_is_clamped_to_strip() {
    let frame = gauge(BatteryLevel { lit: 200, fraction: 77 }, 0);
    assert_eq!(lit_count(&frame), LEDS);
}

#[test]
fn blink_is_lit_exactly_inside_its_windows() {
    let params = RenderParams::default();
    for progress in 0..255u8 {
        let frame: [Pixel; LEDS] = render(&Pattern::Blink(RED), progress, &params);
        let expected = BLINK_WINDOWS
            .iter()
            .any(|&(start, end)| progress >= start && progress <= end);
        assert_eq!(frame[0] == RED, expected, "progress {progress}");
    }
}

#[test]
fn rainbow_rotates_with_progress() {
    let params = RenderParams::default();
    let first: [Pixel; LEDS] = render(&Pattern::Rainbow, 0, &params);
    let later: [Pixel; LEDS] = render(&Pattern::Rainbow, 40, &params);
    assert_ne!(first, later);
    assert_eq!(first, render::<LEDS>(&Pattern::Rainbow, 0, &params));
}

#[test]
fn stripes_are_mirrored() {
    let frame: [Pixel; LEDS] = render(&Pattern::Stripes(&flags::LGBT), 0, &RenderParams::default());
    for index in 0..LEDS / 2 {
        assert_eq!(frame[index], frame[LEDS - 1 - index]);
    }
    assert_eq!(frame[0], flags::LGBT[0]);
}

#[test]
fn trans_preset_on_ten_leds_is_mirrored_about_the_middle() {
    let frame: [Pixel; LEDS] =
        render(&Pattern::Stripes(&flags::TRANS), 0, &RenderParams::default());
    let expected = [0, 1, 2, 3, 4, 4, 3, 2, 1, 0].map(|stripe| flags::TRANS[stripe]);
    assert_eq!(frame, expected);
}

#[test]
fn every_preset_mode_renders_without_panicking() {
    let table = ModeTable::<16>::from_entries(&presets::FULL).unwrap();
    let params = RenderParams {
        battery: BatteryLevel { lit: 2, fraction: 10 },
    };
    for (_, entry) in table.iter() {
        for progress in [0u8, 30, 127, 254] {
            let _: [Pixel; 1] = render(&entry.pattern, progress, &params);
            let _: [Pixel; 7] = render(&entry.pattern, progress, &params);
            let _: [Pixel; 16] = render(&entry.pattern, progress, &params);
        }
    }
}

#[test]
fn progress_advances_one_step_per_interval() {
    assert_eq!(progress_at(17, 18), 0);
    assert_eq!(progress_at(18, 18), 1);
    assert_eq!(progress_at(18 * 300, 18), (300 % 255) as u8);
}
