//! Integer pixel geometry shared by layout, culling and hit-testing.

/// Size of the visible widget area in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportSize {
    pub width: i64,
    pub height: i64,
}

impl ViewportSize {
    pub fn new(width: i64, height: i64) -> Self {
        Self {
            width: width.max(0),
            height: height.max(0),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned rectangle, `left`/`top` inclusive and `right`/`bottom` exclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PixelRect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl PixelRect {
    pub fn new(left: i64, top: i64, right: i64, bottom: i64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_size(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    pub fn width(&self) -> i64 {
        self.right - self.left
    }

    pub fn height(&self) -> i64 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Shrink every side by `inset`.
    pub fn shrink(&self, inset: i64) -> Self {
        Self::new(
            self.left + inset,
            self.top + inset,
            self.right - inset,
            self.bottom - inset,
        )
    }

    /// Overlapping part of two rectangles (may be empty).
    pub fn intersect(&self, other: &Self) -> Self {
        Self::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        )
    }

    /// Largest rectangle with the given aspect ratio centered inside `self`.
    pub fn fit_aspect(&self, image_width: u32, image_height: u32) -> Self {
        if image_width == 0 || image_height == 0 || self.is_empty() {
            return *self;
        }
        let (w, h) = (self.width(), self.height());
        let (iw, ih) = (i64::from(image_width), i64::from(image_height));

        if iw * h > ih * w {
            // Wider than the box: full width, letterboxed
            let fitted = w * ih / iw;
            let pad = (h - fitted) / 2;
            Self::new(self.left, self.top + pad, self.right, self.top + pad + fitted)
        } else {
            let fitted = h * iw / ih;
            let pad = (w - fitted) / 2;
            Self::new(self.left + pad, self.top, self.left + pad + fitted, self.bottom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let rect = PixelRect::new(10, 10, 20, 20);
        assert!(rect.contains(10, 10));
        assert!(rect.contains(19, 19));
        assert!(!rect.contains(20, 15));
        assert!(!rect.contains(15, 20));
    }

    #[test]
    fn test_intersect() {
        let a = PixelRect::new(0, 0, 10, 10);
        let b = PixelRect::new(5, -5, 15, 5);
        assert_eq!(a.intersect(&b), PixelRect::new(5, 0, 10, 5));
        assert!(a.intersect(&PixelRect::new(20, 20, 30, 30)).is_empty());
    }

    #[test]
    fn test_fit_aspect_wide_image() {
        let cell = PixelRect::new(0, 0, 80, 80);
        let fitted = cell.fit_aspect(200, 100);
        assert_eq!(fitted, PixelRect::new(0, 20, 80, 60));
    }

    #[test]
    fn test_fit_aspect_tall_image() {
        let cell = PixelRect::new(0, 0, 80, 40);
        let fitted = cell.fit_aspect(50, 100);
        assert_eq!(fitted, PixelRect::new(30, 0, 50, 40));
    }

    #[test]
    fn test_viewport_size_clamps_negative() {
        let size = ViewportSize::new(-5, 10);
        assert_eq!(size.width, 0);
        assert!(size.is_empty());
    }
}
