//! Behavioral properties of the public transform API.

use pixmend::imaging::{
    Color, PixelBuffer, ResizeQuality, Transparency, TransformError, convert_to_grayscale, crop,
    crop_by_percentage, flip_horizontally, flip_vertically, invert_colors, is_color_within_range,
    replace_color, resize, rotate_by_90_degrees, rotate_by_180_degrees, rotate_by_270_degrees,
};
use std::borrow::Cow;

fn pattern(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::from_fn(width, height, Transparency::Translucent, |x, y| {
        Color::rgba(
            (x * 17 % 256) as u8,
            (y * 29 % 256) as u8,
            ((x + y) * 5 % 256) as u8,
            (200 + (x + y) % 56) as u8,
        )
    })
}

#[test]
fn same_size_resize_is_the_input() {
    let src = pattern(12, 7);
    let out = resize(&src, 12, 7, ResizeQuality::HighQuality).unwrap();
    assert!(matches!(out, Cow::Borrowed(_)));
    assert_eq!(*out, src);
}

#[test]
fn resize_derives_missing_dimension() {
    let src = pattern(100, 100);
    let out = resize(&src, 0, 50, ResizeQuality::Fast).unwrap();
    assert_eq!(out.dimensions(), (50, 50));
}

#[test]
fn resize_rejects_bad_targets() {
    let src = pattern(10, 10);
    for (w, h) in [(0, 0), (-1, 10), (10, -1)] {
        let err = resize(&src, w, h, ResizeQuality::HighQuality).unwrap_err();
        assert!(matches!(err, TransformError::InvalidArgument(_)), "{w}x{h}");
    }
}

#[test]
fn double_flips_are_identities() {
    let src = pattern(9, 5);
    assert_eq!(flip_horizontally(&flip_horizontally(&src)), src);
    assert_eq!(flip_vertically(&flip_vertically(&src)), src);
}

#[test]
fn rotations_compose() {
    let src = pattern(7, 3);
    let quarter = rotate_by_90_degrees(&src);
    assert_eq!(quarter.dimensions(), (3, 7));

    let full = rotate_by_90_degrees(&rotate_by_90_degrees(&rotate_by_90_degrees(&quarter)));
    assert_eq!(full, src);

    assert_eq!(rotate_by_90_degrees(&quarter), rotate_by_180_degrees(&src));
    assert_eq!(rotate_by_270_degrees(&quarter), src);
}

#[test]
fn zero_crops_are_identities() {
    let src = pattern(6, 4);
    assert_eq!(crop(&src, 0, 0, 0, 0).unwrap(), src);
    assert_eq!(crop_by_percentage(&src, 0, 0, 0, 0).unwrap(), src);
}

#[test]
fn crop_keeps_middle_rows() {
    let src = pattern(10, 10);
    let out = crop(&src, 3, 0, 3, 0).unwrap();
    assert_eq!(out.dimensions(), (10, 4));
    for (x, y, color) in out.enumerate_colors() {
        assert_eq!(color, src.pixel(x, y + 3));
    }
}

#[test]
fn percentage_crop_over_100_fails() {
    let src = pattern(10, 10);
    assert!(crop_by_percentage(&src, 51, 0, 50, 0).is_err());
}

#[test]
fn range_check_is_symmetric() {
    let a = Color::rgb(10, 200, 30);
    let b = Color::rgb(25, 190, 30);
    for threshold in [0, 10, 15, 255] {
        assert_eq!(
            is_color_within_range(Some(a), Some(b), threshold).unwrap(),
            is_color_within_range(Some(b), Some(a), threshold).unwrap()
        );
    }
    assert!(!is_color_within_range(None, Some(b), 0).unwrap());
}

#[test]
fn invert_twice_restores_and_keeps_alpha() {
    let src = pattern(8, 8);
    let once = invert_colors(&src);
    for (x, y, color) in once.enumerate_colors() {
        assert_eq!(color.a, src.pixel(x, y).a);
    }
    assert_eq!(invert_colors(&once), src);
}

#[test]
fn grayscale_has_equal_channels() {
    let out = convert_to_grayscale(&pattern(8, 8));
    assert!(out.colors().all(|c| c.r == c.g && c.g == c.b));
}

#[test]
fn red_to_green_on_opaque_buffer() {
    let red = PixelBuffer::from_fn(4, 4, Transparency::Opaque, |_, _| Color::rgb(255, 0, 0));
    let out = replace_color(&red, Color::rgb(255, 0, 0), Color::rgb(0, 255, 0), 0).unwrap();
    assert!(out.colors().all(|c| c == Color::rgba(0, 255, 0, 255)));
}
