use serde::{Deserialize, Serialize};

/// Axis-aligned box in CSS pixels, origin top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// Share of `element`'s area inside `viewport`, in `[0, 1]`. Elements with
/// no area are never visible.
pub fn intersection_ratio(element: &Rect, viewport: &Rect) -> f64 {
    let area = element.area();
    if area <= 0.0 {
        return 0.0;
    }
    let visible = element.intersection(viewport).map_or(0.0, |r| r.area());
    (visible / area).clamp(0.0, 1.0)
}

/// Intersecting means at least `threshold` of the element is on screen.
pub fn is_intersecting(element: &Rect, viewport: &Rect, threshold: f64) -> bool {
    let ratio = intersection_ratio(element, viewport);
    ratio > 0.0 && ratio >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 1000.0, 800.0);

    #[test]
    fn ratio_of_partially_scrolled_element() {
        let half_below = Rect::new(0.0, 700.0, 1000.0, 200.0);
        assert_eq!(intersection_ratio(&half_below, &VIEWPORT), 0.5);
        assert!(is_intersecting(&half_below, &VIEWPORT, 0.5));

        let mostly_below = Rect::new(0.0, 750.0, 1000.0, 200.0);
        assert_eq!(intersection_ratio(&mostly_below, &VIEWPORT), 0.25);
        assert!(!is_intersecting(&mostly_below, &VIEWPORT, 0.5));
    }

    #[test]
    fn touching_edges_do_not_intersect() {
        let below = Rect::new(0.0, 800.0, 1000.0, 200.0);
        assert_eq!(intersection_ratio(&below, &VIEWPORT), 0.0);
    }

    #[test]
    fn empty_element_is_never_visible() {
        let collapsed = Rect::new(10.0, 10.0, 0.0, 300.0);
        assert_eq!(intersection_ratio(&collapsed, &VIEWPORT), 0.0);
        assert!(!is_intersecting(&collapsed, &VIEWPORT, 0.01));
    }
}
