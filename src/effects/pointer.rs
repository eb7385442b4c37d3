//! Pointer-driven effects: the cursor glow and magnetic buttons.

use serde::{Deserialize, Serialize};

/// A point in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An element's bounding rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Rect {
    /// Center of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            self.left + self.width / 2.0,
            self.top + self.height / 2.0,
        )
    }
}

/// Translation that pulls a button toward the pointer.
#[must_use]
pub fn magnetic_offset(rect: &Rect, pointer: Point, strength: f64) -> Point {
    let center = rect.center();
    Point::new(
        (pointer.x - center.x) * strength,
        (pointer.y - center.y) * strength,
    )
}

/// Soft glow that trails the pointer.
///
/// Each frame covers `ease` of the remaining distance. The glow is inactive
/// until the first pointer move and after the pointer leaves the page; the
/// host only runs its frame loop while it is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursorGlow {
    ease: f64,
    target: Point,
    current: Point,
    active: bool,
}

impl CursorGlow {
    /// Create an inactive glow at the origin.
    #[must_use]
    pub const fn new(ease: f64) -> Self {
        Self {
            ease,
            target: Point::new(0.0, 0.0),
            current: Point::new(0.0, 0.0),
            active: false,
        }
    }

    /// Record a pointer move.
    ///
    /// Returns `true` if this move activated the glow, in which case the host
    /// must start its frame loop.
    pub fn pointer_moved(&mut self, x: f64, y: f64) -> bool {
        self.target = Point::new(x, y);
        if self.active {
            false
        } else {
            self.active = true;
            true
        }
    }

    /// The pointer left the page.
    pub fn pointer_left(&mut self) {
        self.active = false;
    }

    /// Whether the frame loop should keep running.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Current glow position.
    #[must_use]
    pub const fn position(&self) -> Point {
        self.current
    }

    /// Advance one frame. `None` means the loop should stop.
    pub fn frame(&mut self) -> Option<Point> {
        if !self.active {
            return None;
        }
        self.current.x += (self.target.x - self.current.x) * self.ease;
        self.current.y += (self.target.y - self.current.y) * self.ease;
        Some(self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnetic_offset() {
        let rect = Rect {
            left: 100.0,
            top: 50.0,
            width: 200.0,
            height: 40.0,
        };
        let offset = magnetic_offset(&rect, Point::new(300.0, 50.0), 0.15);
        assert!((offset.x - 15.0).abs() < 1e-9);
        assert!((offset.y + 3.0).abs() < 1e-9);

        let centered = magnetic_offset(&rect, rect.center(), 0.15);
        assert_eq!(centered, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_glow_activation() {
        let mut glow = CursorGlow::new(0.08);
        assert!(glow.frame().is_none());

        assert!(glow.pointer_moved(100.0, 200.0));
        assert!(!glow.pointer_moved(110.0, 200.0));
        assert!(glow.is_active());

        glow.pointer_left();
        assert!(glow.frame().is_none());
        assert!(glow.pointer_moved(0.0, 0.0));
    }

    #[test]
    fn test_glow_eases_toward_pointer() {
        let mut glow = CursorGlow::new(0.08);
        glow.pointer_moved(100.0, 50.0);

        let first = glow.frame().unwrap_or_default();
        assert!((first.x - 8.0).abs() < 1e-9);
        assert!((first.y - 4.0).abs() < 1e-9);

        let second = glow.frame().unwrap_or_default();
        assert!((second.x - (8.0 + 92.0 * 0.08)).abs() < 1e-9);

        for _ in 0..500 {
            glow.frame();
        }
        assert!((glow.position().x - 100.0).abs() < 1e-6);
        assert!((glow.position().y - 50.0).abs() < 1e-6);
    }
}
