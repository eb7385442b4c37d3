//! Scroll-driven effects: parallax, anchor scrolling and nav highlighting.

/// CSS custom properties zeroed when the visitor prefers reduced motion.
pub const REDUCED_MOTION_VARS: [&str; 3] = [
    "--transition-default",
    "--transition-fast",
    "--transition-slow",
];

/// Vertical translation of the `index`-th floating card.
///
/// Cards further down the list move faster.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn parallax_offset(scroll_y: f64, speed: f64, index: usize) -> f64 {
    scroll_y * speed * (index + 1) as f64
}

/// Section id an in-page link points at.
///
/// `None` for the bare `"#"` link and for anything that is not a fragment.
#[must_use]
pub fn anchor_id(href: &str) -> Option<&str> {
    match href.strip_prefix('#') {
        Some("") | None => None,
        Some(id) => Some(id),
    }
}

/// Document offset to scroll to so a section lands below the fixed nav.
#[must_use]
pub fn scroll_target(element_top: f64, page_offset: f64, nav_offset: f64) -> f64 {
    element_top + page_offset - nav_offset
}

/// Whether a nav link should be highlighted for the visible section.
#[must_use]
pub fn is_active_link(href: &str, section_id: &str) -> bool {
    anchor_id(href) == Some(section_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallax_grows_with_index() {
        assert!((parallax_offset(1_000.0, 0.05, 0) - 50.0).abs() < 1e-9);
        assert!((parallax_offset(1_000.0, 0.05, 2) - 150.0).abs() < 1e-9);
        assert!(parallax_offset(0.0, 0.05, 5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_anchor_id() {
        assert_eq!(anchor_id("#features"), Some("features"));
        assert_eq!(anchor_id("#"), None);
        assert_eq!(anchor_id("https://example.com"), None);
    }

    #[test]
    fn test_scroll_target_accounts_for_nav() {
        assert!((scroll_target(400.0, 1_200.0, 80.0) - 1_520.0).abs() < 1e-9);
    }

    #[test]
    fn test_exactly_one_link_active() {
        let links = ["#hero", "#features", "#pricing", "#"];
        let active: Vec<bool> = links.iter().map(|h| is_active_link(h, "features")).collect();
        assert_eq!(active, [false, true, false, false]);
    }
}
