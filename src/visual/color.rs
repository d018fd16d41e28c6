//! # Color assignment for tags.
//!
//! [`ColorClass::assign`] maps a base domain to one of a fixed 4-entry
//! palette via a rolling polynomial hash folded into 32 bits. The property
//! that matters is determinism: two tags for the same domain, at different
//! times, always land in the same class. The exact hash is an implementation
//! detail; it just needs a reasonable spread over short ASCII domains.

/// Fixed palette of visual classes for tags.
///
/// The class is assigned once at tag creation and never changes for the
/// lifetime of that domain's record (and, being a pure function of the
/// domain, not across lifetimes either).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorClass {
    Slate,
    Teal,
    Violet,
    Amber,
}

/// Palette in assignment order.
const PALETTE: [ColorClass; 4] = [
    ColorClass::Slate,
    ColorClass::Teal,
    ColorClass::Violet,
    ColorClass::Amber,
];

impl ColorClass {
    /// Deterministically assigns a palette class to a base domain.
    ///
    /// # Example
    /// ```
    /// use taglet::ColorClass;
    ///
    /// let a = ColorClass::assign("tracker.example");
    /// let b = ColorClass::assign("tracker.example");
    /// assert_eq!(a, b);
    /// ```
    pub fn assign(domain: &str) -> Self {
        // h = h*31 + byte, wrapping in 32 bits, reduced modulo palette size.
        let mut h: u32 = 0;
        for b in domain.bytes() {
            h = h.wrapping_mul(31).wrapping_add(u32::from(b));
        }
        PALETTE[(h % PALETTE.len() as u32) as usize]
    }

    /// Returns a short stable label (snake_case) for use in logs/CSS hooks.
    pub fn as_label(&self) -> &'static str {
        match self {
            ColorClass::Slate => "slate",
            ColorClass::Teal => "teal",
            ColorClass::Violet => "violet",
            ColorClass::Amber => "amber",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn assignment_is_deterministic() {
        for domain in ["a.com", "tracker.example", "cdn.net", "x.co.uk"] {
            assert_eq!(ColorClass::assign(domain), ColorClass::assign(domain));
        }
    }

    #[test]
    fn palette_is_fully_used_over_many_domains() {
        let mut seen = HashSet::new();
        for i in 0..200 {
            seen.insert(ColorClass::assign(&format!("domain-{i}.com")));
        }
        assert_eq!(seen.len(), PALETTE.len(), "all classes should appear");
    }

    #[test]
    fn spread_is_roughly_uniform() {
        let mut counts = [0usize; 4];
        let n = 1000;
        for i in 0..n {
            let c = ColorClass::assign(&format!("site{i}.example.org"));
            counts[PALETTE.iter().position(|p| *p == c).unwrap()] += 1;
        }
        // No class should hog or starve badly for a decent string hash.
        for (idx, count) in counts.iter().enumerate() {
            assert!(
                *count > n / 10,
                "class {idx} underrepresented: {count}/{n}"
            );
        }
    }
}
