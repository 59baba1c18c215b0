//! Deterministic per-class colors.
//!
//! Hues advance by a fixed irrational-ish angle (close to the golden angle)
//! so consecutive class ids land far apart on the color wheel.

const HUE_STEP_DEGREES: f64 = 137.508;
const SATURATION: f64 = 0.90;
const LIGHTNESS: f64 = 0.55;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    /// Degrees in `[0, 360)`.
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    pub fn to_rgb(&self) -> [u8; 3] {
        let c = (1.0 - (2.0 * self.lightness - 1.0).abs()) * self.saturation;
        let h = self.hue / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = self.lightness - c / 2.0;
        let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        [to_byte(r), to_byte(g), to_byte(b)]
    }

    /// CSS-style `#rrggbb`.
    pub fn to_hex(&self) -> String {
        let [r, g, b] = self.to_rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

pub fn color_for_class(class_id: i32) -> Hsl {
    let hue = (f64::from(class_id).abs() * HUE_STEP_DEGREES) % 360.0;
    Hsl {
        hue,
        saturation: SATURATION,
        lightness: LIGHTNESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_same_id_same_color() {
        for id in [-3, 0, 1, 7, 25, 1000] {
            assert_eq!(color_for_class(id), color_for_class(id));
        }
    }

    #[test]
    fn test_negative_id_mirrors_positive() {
        assert_eq!(color_for_class(-4), color_for_class(4));
    }

    #[test]
    fn test_hue_step() {
        assert_relative_eq!(color_for_class(0).hue, 0.0);
        assert_relative_eq!(color_for_class(1).hue, 137.508);
        assert_relative_eq!(color_for_class(3).hue, (3.0 * 137.508) % 360.0);
    }

    #[test]
    fn test_consecutive_ids_are_well_separated() {
        for id in 0..10 {
            let a = color_for_class(id).hue;
            let b = color_for_class(id + 1).hue;
            let diff = (a - b).abs();
            let circular = diff.min(360.0 - diff);
            assert!(circular > 90.0, "ids {id} and {} too close: {circular}", id + 1);
        }
    }

    #[test]
    fn test_constant_saturation_and_lightness() {
        let c = color_for_class(11);
        assert_relative_eq!(c.saturation, 0.90);
        assert_relative_eq!(c.lightness, 0.55);
    }

    #[test]
    fn test_to_rgb_primary_hues() {
        let red = Hsl {
            hue: 0.0,
            saturation: 1.0,
            lightness: 0.5,
        };
        assert_eq!(red.to_rgb(), [255, 0, 0]);

        let green = Hsl { hue: 120.0, ..red };
        assert_eq!(green.to_rgb(), [0, 255, 0]);

        let blue = Hsl { hue: 240.0, ..red };
        assert_eq!(blue.to_rgb(), [0, 0, 255]);
    }

    #[test]
    fn test_to_hex() {
        let red = Hsl {
            hue: 0.0,
            saturation: 1.0,
            lightness: 0.5,
        };
        assert_eq!(red.to_hex(), "#ff0000");
    }
}
