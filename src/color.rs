use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            to_color32(rgb)
        })
        .collect()
}

fn to_color32(rgb: Srgb) -> Color32 {
    let rgb: Srgb<u8> = rgb.into_format();
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

// ---------------------------------------------------------------------------
// Category colours: annotation class name → Color32
// ---------------------------------------------------------------------------

/// Fixed colours of the standard nuScenes classes, as drawn by the devkit.
const DEVKIT_COLORS: [(&str, [u8; 3]); 24] = [
    ("noise", [0, 0, 0]),
    ("animal", [70, 130, 180]),
    ("human.pedestrian.adult", [0, 0, 230]),
    ("human.pedestrian.child", [135, 206, 235]),
    ("human.pedestrian.construction_worker", [100, 149, 237]),
    ("human.pedestrian.personal_mobility", [219, 112, 147]),
    ("human.pedestrian.police_officer", [0, 0, 128]),
    ("human.pedestrian.stroller", [240, 128, 128]),
    ("human.pedestrian.wheelchair", [138, 43, 226]),
    ("movable_object.barrier", [112, 128, 144]),
    ("movable_object.debris", [210, 105, 30]),
    ("movable_object.pushable_pullable", [105, 105, 105]),
    ("movable_object.trafficcone", [47, 79, 79]),
    ("static_object.bicycle_rack", [188, 143, 143]),
    ("vehicle.bicycle", [220, 20, 60]),
    ("vehicle.bus.bendy", [255, 127, 80]),
    ("vehicle.bus.rigid", [255, 69, 0]),
    ("vehicle.car", [255, 158, 0]),
    ("vehicle.construction", [233, 150, 70]),
    ("vehicle.emergency.ambulance", [255, 83, 0]),
    ("vehicle.emergency.police", [255, 215, 0]),
    ("vehicle.motorcycle", [255, 61, 99]),
    ("vehicle.trailer", [255, 140, 0]),
    ("vehicle.truck", [255, 99, 71]),
];

fn devkit_color(name: &str) -> Option<Color32> {
    DEVKIT_COLORS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|&(_, [r, g, b])| Color32::from_rgb(r, g, b))
}

/// Colour per annotation category. Standard classes keep their devkit colour;
/// any other name gets a palette colour assigned over the sorted leftovers.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl Default for CategoryColors {
    fn default() -> Self {
        Self {
            mapping: BTreeMap::new(),
            default_color: Color32::from_rgb(255, 158, 0),
        }
    }
}

impl CategoryColors {
    pub fn new(names: &[String]) -> Self {
        let mut mapping = BTreeMap::new();
        let mut unknown = Vec::new();
        for name in names {
            match devkit_color(name) {
                Some(color) => {
                    mapping.insert(name.clone(), color);
                }
                None => unknown.push(name.clone()),
            }
        }
        unknown.sort();
        unknown.dedup();

        let palette = generate_palette(unknown.len());
        mapping.extend(unknown.into_iter().zip(palette));
        CategoryColors {
            mapping,
            ..Default::default()
        }
    }

    pub fn color_for(&self, category: &str) -> Color32 {
        self.mapping
            .get(category)
            .copied()
            .unwrap_or(self.default_color)
    }
}

// ---------------------------------------------------------------------------
// Height colormap: z → Color32
// ---------------------------------------------------------------------------

/// Sequential light-to-dark blue ramp (ColorBrewer "Blues").
const BLUES: [[u8; 3]; 9] = [
    [0xf7, 0xfb, 0xff],
    [0xde, 0xeb, 0xf7],
    [0xc6, 0xdb, 0xef],
    [0x9e, 0xca, 0xe1],
    [0x6b, 0xae, 0xd6],
    [0x42, 0x92, 0xc6],
    [0x21, 0x71, 0xb5],
    [0x08, 0x51, 0x9c],
    [0x08, 0x30, 0x6b],
];

/// Maps point height onto a colour ramp, clamping outside `[min, max]`.
#[derive(Debug, Clone)]
pub struct HeightColorMap {
    min: f32,
    max: f32,
    stops: Vec<Srgb>,
}

impl HeightColorMap {
    pub fn blues(min: f32, max: f32) -> Self {
        let stops = BLUES
            .iter()
            .map(|&[r, g, b]| Srgb::new(r, g, b).into_format())
            .collect();
        HeightColorMap { min, max, stops }
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Position of `z` on the ramp, in `[0, 1]`.
    pub fn normalize(&self, z: f32) -> f32 {
        let span = self.max - self.min;
        if span <= f32::EPSILON {
            return 0.0;
        }
        ((z - self.min) / span).clamp(0.0, 1.0)
    }

    /// Colour at ramp position `t` (clamped to `[0, 1]`).
    pub fn color_at(&self, t: f32) -> Color32 {
        let t = t.clamp(0.0, 1.0);
        let last = self.stops.len() - 1;
        let scaled = t * last as f32;
        let lo = (scaled.floor() as usize).min(last);
        let hi = (lo + 1).min(last);
        to_color32(self.stops[lo].mix(self.stops[hi], scaled - lo as f32))
    }

    /// Index of the colour bin `z` falls into, out of `bins` equal slices.
    pub fn bin_for(&self, z: f32, bins: usize) -> usize {
        ((self.normalize(z) * bins as f32) as usize).min(bins.saturating_sub(1))
    }

    /// Representative colour of each bin (its centre).
    pub fn bin_colors(&self, bins: usize) -> Vec<Color32> {
        (0..bins)
            .map(|i| self.color_at((i as f32 + 0.5) / bins as f32))
            .collect()
    }
}
