//! Sizing types for element axes and margins.

/// Sizing mode for one element axis (or one margin axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Length {
    /// Natural size: take whatever the content or children need.
    #[default]
    Auto,
    /// Fixed pixel size. Negative values behave like `Auto`.
    Px(i32),
    /// Percentage of the containing element's resolved size on the same axis.
    Percent(i32),
}

impl Length {
    /// Whether this length depends on the parent's resolved size.
    #[inline]
    pub fn is_relative(&self) -> bool {
        matches!(self, Length::Percent(_))
    }

    /// Resolve against the parent's resolved size on the same axis.
    ///
    /// `None` means unconstrained. An unconstrained parent counts as -1 px,
    /// so `Percent(100)` of it stays unconstrained while smaller percentages
    /// truncate to zero. A negative result is unconstrained.
    pub fn resolve(&self, parent: Option<i32>) -> Option<i32> {
        match *self {
            Length::Auto => None,
            Length::Px(px) if px < 0 => None,
            Length::Px(px) => Some(px),
            Length::Percent(pct) => {
                let px = pct * parent.unwrap_or(-1) / 100;
                (px >= 0).then_some(px)
            }
        }
    }

    /// Resolve as a margin: unconstrained margins collapse to zero.
    #[inline]
    pub fn resolve_margin(&self, container: Option<i32>) -> i32 {
        self.resolve(container).unwrap_or(0)
    }
}

impl From<i32> for Length {
    fn from(px: i32) -> Self {
        Length::Px(px)
    }
}

/// Resolved width/height of an element; `None` on an axis means unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedSize {
    pub width: Option<i32>,
    pub height: Option<i32>,
}

impl ResolvedSize {
    pub const UNCONSTRAINED: Self = Self {
        width: None,
        height: None,
    };

    #[inline]
    pub const fn new(width: Option<i32>, height: Option<i32>) -> Self {
        Self { width, height }
    }
}
