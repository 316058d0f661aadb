//! Room footprint detection from a seed click on a raster plan.
//!
//! The free area around the seed is flood filled, then its outline is
//! approximated by marching rays out from the centre of the filled bounding
//! box. Concave rooms come out star-shaped; callers fall back to manual
//! drawing whenever extraction fails.

use crate::error::LoadError;
use crate::geometry::Point;
use image::RgbImage;
use std::path::Path;
use tracing::debug;

/// Tuning for [`extract_region_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionConfig {
    /// Pixels whose mean RGB is below this are wall ink.
    pub ink_threshold: f64,
    /// Number of rays cast, evenly spaced in angle.
    pub ray_count: usize,
    /// March step along each ray, in pixels.
    pub ray_step: f64,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            ink_threshold: 120.0,
            ray_count: 36,
            ray_step: 2.0,
        }
    }
}

/// Opens a plan image from disk as RGB.
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<RgbImage, LoadError> {
    let path_ref = path.as_ref();
    image::open(path_ref)
        .map(|img| img.to_rgb8())
        .map_err(|source| LoadError::Image {
            path: path_ref.to_path_buf(),
            source,
        })
}

/// [`extract_region_with`] using the default configuration.
#[must_use]
pub fn extract_region(image: &RgbImage, seed: Point) -> Option<Vec<Point>> {
    extract_region_with(image, seed, &RegionConfig::default())
}

/// Approximates the outline of the free region containing `seed`.
///
/// Returns `None` when the seed lies outside the image or on wall ink, or
/// when fewer than three distinct outline points are found.
#[must_use]
pub fn extract_region_with(
    image: &RgbImage,
    seed: Point,
    config: &RegionConfig,
) -> Option<Vec<Point>> {
    let width = i64::from(image.width());
    let height = i64::from(image.height());
    let sx = seed.x.round() as i64;
    let sy = seed.y.round() as i64;

    if sx < 0 || sy < 0 || sx >= width || sy >= height {
        debug!(x = sx, y = sy, "seed outside plan bounds");
        return None;
    }

    let is_ink = |x: i64, y: i64| {
        let [r, g, b] = image.get_pixel(x as u32, y as u32).0;
        (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0 < config.ink_threshold
    };

    if is_ink(sx, sy) {
        debug!(x = sx, y = sy, "seed on wall ink");
        return None;
    }

    let fill = flood_fill(width, height, (sx, sy), is_ink);
    let outline = cast_rays(&fill, config);

    debug!(
        filled = fill.count,
        outline = outline.len(),
        "region extracted"
    );

    (outline.len() >= 3).then_some(outline)
}

struct Fill {
    visited: Vec<bool>,
    width: i64,
    count: usize,
    min_x: i64,
    max_x: i64,
    min_y: i64,
    max_y: i64,
}

impl Fill {
    fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.min_x
            && x <= self.max_x
            && y >= self.min_y
            && y <= self.max_y
            && self.visited[(y * self.width + x) as usize]
    }
}

/// 4-connected fill over non-ink pixels. The visited set only grows and is
/// bounded by the image, so the loop terminates.
fn flood_fill(width: i64, height: i64, seed: (i64, i64), is_ink: impl Fn(i64, i64) -> bool) -> Fill {
    let mut fill = Fill {
        visited: vec![false; (width * height) as usize],
        width,
        count: 0,
        min_x: width,
        max_x: 0,
        min_y: height,
        max_y: 0,
    };
    let mut stack = vec![seed];

    while let Some((x, y)) = stack.pop() {
        if x < 0 || y < 0 || x >= width || y >= height {
            continue;
        }
        let idx = (y * width + x) as usize;
        if fill.visited[idx] || is_ink(x, y) {
            continue;
        }

        fill.visited[idx] = true;
        fill.count += 1;
        fill.min_x = fill.min_x.min(x);
        fill.max_x = fill.max_x.max(x);
        fill.min_y = fill.min_y.min(y);
        fill.max_y = fill.max_y.max(y);

        stack.extend([(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)]);
    }

    fill
}

fn cast_rays(fill: &Fill, config: &RegionConfig) -> Vec<Point> {
    let cx = (fill.min_x + fill.max_x) as f64 / 2.0;
    let cy = (fill.min_y + fill.max_y) as f64 / 2.0;
    let step = config.ray_step.max(1.0);
    let mut outline: Vec<Point> = Vec::with_capacity(config.ray_count);

    for i in 0..config.ray_count {
        let angle = (i as f64 / config.ray_count as f64) * std::f64::consts::TAU;
        let (dy, dx) = angle.sin_cos();
        let (mut x, mut y) = (cx, cy);

        // Each step moves at least one pixel along the dominant axis and the
        // box is finite, so the march ends.
        loop {
            let nx = (x + dx * step).round();
            let ny = (y + dy * step).round();
            if !fill.contains(nx as i64, ny as i64) {
                break;
            }
            x = nx;
            y = ny;
        }

        let point = Point::new(x, y);
        if outline.last() != Some(&point) {
            outline.push(point);
        }
    }

    if outline.len() > 1 && outline.first() == outline.last() {
        outline.pop();
    }

    outline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::polygon_area_perimeter;
    use image::Rgb;

    const INK: Rgb<u8> = Rgb([20, 20, 20]);
    const PAPER: Rgb<u8> = Rgb([250, 250, 250]);

    /// 100x80 sheet with a room drawn from (10,10) to (70,50).
    fn room_plan() -> RgbImage {
        let mut img = RgbImage::from_pixel(100, 80, PAPER);
        for x in 10..=70 {
            img.put_pixel(x, 10, INK);
            img.put_pixel(x, 50, INK);
        }
        for y in 10..=50 {
            img.put_pixel(10, y, INK);
            img.put_pixel(70, y, INK);
        }
        img
    }

    #[test]
    fn test_seed_on_ink_returns_none() {
        let img = room_plan();
        assert!(extract_region(&img, Point::new(10.0, 30.0)).is_none());

        let dark = RgbImage::from_pixel(10, 10, Rgb([119, 119, 119]));
        assert!(extract_region(&dark, Point::new(5.0, 5.0)).is_none());
    }

    #[test]
    fn test_seed_outside_image_returns_none() {
        let img = room_plan();
        assert!(extract_region(&img, Point::new(-3.0, 5.0)).is_none());
        assert!(extract_region(&img, Point::new(100.0, 5.0)).is_none());
    }

    #[test]
    fn test_rectangular_room_is_approximated() {
        let img = room_plan();
        let outline = extract_region(&img, Point::new(40.0, 30.0)).unwrap();
        assert!(outline.len() >= 3);

        for p in &outline {
            assert!(p.x > 10.0 && p.x < 70.0, "x out of room: {p:?}");
            assert!(p.y > 10.0 && p.y < 50.0, "y out of room: {p:?}");
        }

        // Interior is 59 x 39 px; the radial outline underestimates corners.
        let area = polygon_area_perimeter(&outline).unwrap().area;
        assert!(area > 59.0 * 39.0 * 0.6, "area too small: {area}");
        assert!(area <= 59.0 * 39.0, "area too large: {area}");
    }

    #[test]
    fn test_single_pixel_pocket_fails() {
        let mut img = RgbImage::from_pixel(5, 5, INK);
        img.put_pixel(2, 2, PAPER);
        assert!(extract_region(&img, Point::new(2.0, 2.0)).is_none());
    }

    #[test]
    fn test_load_plan_round_trip_and_errors() {
        let path = std::env::temp_dir().join(format!("metraj-{}-plan.png", std::process::id()));
        room_plan().save(&path).unwrap();

        let loaded = load_plan(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded.dimensions(), (100, 80));
        assert!(extract_region(&loaded, Point::new(40.0, 30.0)).is_some());

        assert!(matches!(
            load_plan("/nonexistent/metraj/plan.png"),
            Err(LoadError::Image { .. })
        ));
    }
}
