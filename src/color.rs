use std::ops::{ Add, Sub, Mul };

use crate::feq;

/// A color.
///
/// Represented conventionally with red-green-blue (RGB) values. While
/// shading, components may exceed 1.0; they are only clamped when the final
/// pixel is written (see `clamp` and `to_rgb`).
///
/// # Examples
///
/// Construct the color red:
///
/// ```
/// # use scene_tracer::color::Color;
/// let red = Color::red();
/// assert_eq!(red, Color::rgb(1.0, 0.0, 0.0));
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Partial equality on two colors.
///
/// Similar to the `PartialEq` implementation on `Vector3`, `Color`s are
/// compared component-wise, accounting for possible floating point error in
/// comparisons.
impl PartialEq for Color {
    fn eq(&self, other: &Color) -> bool {
        feq(self.r, other.r) &&
            feq(self.g, other.g) &&
            feq(self.b, other.b)
    }
}

impl From<[f64; 3]> for Color {
    fn from(v: [f64; 3]) -> Color {
        Color { r: v[0], g: v[1], b: v[2] }
    }
}

impl Color {
    /// Creates a color with red, green and blue values.
    pub fn rgb(r: f64, g: f64, b: f64) -> Color {
        Color { r, g, b }
    }

    /// The color black.
    pub fn black() -> Color {
        Color {
            r: 0.0,
            g: 0.0,
            b: 0.0
        }
    }

    /// The color white.
    pub fn white() -> Color {
        Color {
            r: 1.0,
            g: 1.0,
            b: 1.0
        }
    }

    /// The color red.
    pub fn red() -> Color {
        Color {
            r: 1.0,
            g: 0.0,
            b: 0.0
        }
    }

    /// Computes the Hadamard (Schur) product of two colors.
    ///
    /// This is provided as an associated function of `Color` to prevent
    /// possible confusion with the `*` operator.
    ///
    /// # Examples
    ///
    /// ```
    /// # use scene_tracer::color::Color;
    /// let yellow = Color::rgb(1.0, 1.0, 0.0);
    /// let purple = Color::rgb(1.0, 0.0, 1.0);
    /// let product = Color::hadamard(&yellow, &purple);
    /// assert_eq!(product, Color::red());
    /// ```
    pub fn hadamard(c1: &Color, c2: &Color) -> Color {
        let r = c1.r * c2.r;
        let g = c1.g * c2.g;
        let b = c1.b * c2.b;

        Color { r, g, b }
    }

    /// Whether every component is exactly zero.
    pub fn is_black(&self) -> bool {
        self.r == 0.0 && self.g == 0.0 && self.b == 0.0
    }

    /// Clamps each channel to `[0, 1]`.
    pub fn clamp(&self) -> Color {
        Color {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }

    /// Packs the clamped color into a 24-bit `0xRRGGBB` integer.
    ///
    /// Each channel is scaled to 255 and rounded to the nearest integer.
    ///
    /// ```
    /// # use scene_tracer::color::Color;
    /// assert_eq!(Color::rgb(1.0, 0.5, 2.0).to_rgb(), 0xff80ff);
    /// ```
    pub fn to_rgb(&self) -> u32 {
        let c = self.clamp();
        let r = (c.r * 255.0).round() as u32;
        let g = (c.g * 255.0).round() as u32;
        let b = (c.b * 255.0).round() as u32;

        (r << 16) | (g << 8) | b
    }
}

/// Adds two colors together.
///
/// Components are added together individually.
impl Add<Color> for Color {
    type Output = Color;

    fn add(self, other: Color) -> Self::Output {
        Color {
            r: self.r + other.r,
            g: self.g + other.g,
            b: self.b + other.b,
        }
    }
}

impl std::iter::Sum for Color {
    fn sum<I: Iterator<Item = Color>>(iter: I) -> Color {
        iter.fold(Color::black(), |acc, c| acc + c)
    }
}

/// Subtracts one color from another.
impl Sub<Color> for Color {
    type Output = Color;

    fn sub(self, other: Color) -> Self::Output {
        Color {
            r: self.r - other.r,
            g: self.g - other.g,
            b: self.b - other.b,
        }
    }
}

/// Multiplies a color by a scalar.
impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, other: f64) -> Self::Output {
        Color {
            r: self.r * other,
            g: self.g * other,
            b: self.b * other,
        }
    }
}

/// Multiplies a scalar by a color.
impl Mul<Color> for f64 {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color {
            r: self * other.r,
            g: self * other.g,
            b: self * other.b,
        }
    }
}

/// Multiplies a color by a color.
///
/// For colors `c1` and `c2`, `c1 * c2` is shorthand for
/// `Color::hadamard(&c1, &c2)`.
impl Mul<Color> for Color {
    type Output = Color;

    fn mul(self, other: Color) -> Self::Output {
        Color::hadamard(&self, &other)
    }
}

#[test]
fn add_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);
    let c3 = Color { r: 1.6, g: 0.7, b: 1.0 };

    assert_eq!(c1 + c2, c3);
}

#[test]
fn subtract_colors() {
    let c1 = Color::rgb(0.9, 0.6, 0.75);
    let c2 = Color::rgb(0.7, 0.1, 0.25);
    let c3 = Color { r: 0.2, g: 0.5, b: 0.5 };

    assert_eq!(c1 - c2, c3);
}

#[test]
fn multiply_colors() {
    let c1 = Color::rgb(0.2, 0.3, 0.4);

    assert_eq!(c1 * 2.0, Color::rgb(0.4, 0.6, 0.8));
    assert_eq!(c1 * Color::rgb(0.5, 0.0, 2.0), Color::rgb(0.1, 0.0, 0.8));
}

#[test]
fn sum_colors() {
    let total: Color = vec![Color::red(), Color::rgb(0.0, 0.5, 0.0),
        Color::rgb(0.0, 0.0, 3.0)].into_iter().sum();

    assert_eq!(total, Color::rgb(1.0, 0.5, 3.0));
}

#[test]
fn clamp_color() {
    let c = Color::rgb(-0.5, 0.25, 7.0);

    assert_eq!(c.clamp(), Color::rgb(0.0, 0.25, 1.0));
}

#[test]
fn pack_color() {
    assert_eq!(Color::black().to_rgb(), 0x000000);
    assert_eq!(Color::white().to_rgb(), 0xffffff);
    assert_eq!(Color::rgb(1.0, 0.0, 0.0).to_rgb(), 0xff0000);
    assert_eq!(Color::rgb(-3.0, 0.2, 1.5).to_rgb(), 0x0033ff);
}

#[test]
fn black_detection() {
    assert!(Color::black().is_black());
    assert!(!Color::rgb(0.0, 1e-12, 0.0).is_black());
}
