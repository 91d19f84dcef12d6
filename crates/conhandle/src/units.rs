/// A 2d vector.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vec2<T> {
    pub x: T,
    pub y: T,
}

/// Width and height in character cells (or pixels, for font sizes).
pub type Size = Vec2<i16>;

/// A zero-based cell coordinate.
pub type Position = Vec2<i16>;

impl<T: Copy> Vec2<T> {
    #[inline]
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn splat(n: T) -> Self {
        Self::new(n, n)
    }

    #[inline]
    #[must_use]
    pub fn min(&self, rhs: Self) -> Self
    where
        T: Ord,
    {
        self.join(rhs, T::min)
    }

    #[inline]
    #[must_use]
    pub fn max(&self, rhs: Self) -> Self
    where
        T: Ord,
    {
        self.join(rhs, T::max)
    }

    #[inline]
    pub fn lt(&self, rhs: Self) -> Comparison
    where
        T: Ord,
    {
        self.cmp(rhs, T::lt)
    }

    #[inline]
    pub fn gt(&self, rhs: Self) -> Comparison
    where
        T: Ord,
    {
        self.cmp(rhs, T::gt)
    }

    #[inline]
    pub fn le(&self, rhs: Self) -> Comparison
    where
        T: Ord,
    {
        self.cmp(rhs, T::le)
    }

    #[inline]
    pub fn ge(&self, rhs: Self) -> Comparison
    where
        T: Ord,
    {
        self.cmp(rhs, T::ge)
    }

    #[inline]
    fn join<U>(self, rhs: Self, f: impl Fn(T, T) -> U) -> Vec2<U> {
        Vec2 {
            x: f(self.x, rhs.x),
            y: f(self.y, rhs.y),
        }
    }

    #[inline]
    fn cmp(self, rhs: Self, f: impl Fn(&T, &T) -> bool) -> Comparison {
        Comparison {
            x: f(&self.x, &rhs.x),
            y: f(&self.y, &rhs.y),
        }
    }
}

impl<T: Copy> From<[T; 2]> for Vec2<T> {
    #[inline]
    fn from(value: [T; 2]) -> Self {
        Self {
            x: value[0],
            y: value[1],
        }
    }
}

impl<T> From<Vec2<T>> for [T; 2] {
    #[inline]
    fn from(value: Vec2<T>) -> Self {
        [value.x, value.y]
    }
}

impl<T> From<(T, T)> for Vec2<T> {
    #[inline]
    fn from((x, y): (T, T)) -> Self {
        Self { x, y }
    }
}

impl<T> From<Vec2<T>> for (T, T) {
    #[inline]
    fn from(value: Vec2<T>) -> Self {
        (value.x, value.y)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Comparison {
    pub x: bool,
    pub y: bool,
}

impl Comparison {
    #[inline]
    pub fn both(&self) -> bool {
        self.x && self.y
    }

    #[inline]
    pub fn either(&self) -> bool {
        self.x || self.y
    }
}

/// An inclusive rectangle of cells, as the console reports its window.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i16,
    pub top: i16,
    pub right: i16,
    pub bottom: i16,
}

impl Rect {
    /// The rect anchored at the origin that covers `size` cells.
    #[inline]
    pub fn from_size(size: Size) -> Self {
        Self {
            left: 0,
            top: 0,
            right: size.x - 1,
            bottom: size.y - 1,
        }
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.right - self.left + 1, self.bottom - self.top + 1)
    }
}

/// A snapshot of the screen buffer geometry.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenBufferInfo {
    pub buffer_size: Size,
    pub window: Rect,
    pub cursor: Position,
}

impl ScreenBufferInfo {
    #[inline]
    pub fn window_size(&self) -> Size {
        self.window.size()
    }
}

#[cfg(test)]
mod tests {
    use super::{Rect, Size};

    #[test]
    fn rect_round_trips_size() {
        let size = Size::new(80, 25);
        let rect = Rect::from_size(size);

        assert_eq!(rect.right, 79);
        assert_eq!(rect.bottom, 24);
        assert_eq!(rect.size(), size);
    }

    #[test]
    fn comparisons() {
        let max = Size::new(120, 40);

        assert!(Size::new(121, 10).gt(max).either());
        assert!(!Size::new(121, 10).gt(max).both());
        assert!(Size::new(120, 40).le(max).both());
        assert_eq!(Size::new(200, 10).min(max), Size::new(120, 10));
    }
}
