#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    pub fn union(&self, other: &Rectangle) -> Rectangle {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = (self.x + self.width).max(other.x + other.width);
        let y2 = (self.y + self.height).max(other.y + other.height);
        Rectangle::new(x1, y1, x2 - x1, y2 - y1)
    }

    pub fn intersects(&self, other: &Rectangle) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        !self.is_empty()
            && x >= self.x as f64
            && x < (self.x + self.width) as f64
            && y >= self.y as f64
            && y < (self.y + self.height) as f64
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rectangle {
        Rectangle::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Shrinks by `amount` on every side.
    pub fn inset(&self, amount: i32) -> Rectangle {
        Rectangle::new(
            self.x + amount,
            self.y + amount,
            self.width - 2 * amount,
            self.height - 2 * amount,
        )
    }

    /// Grows by `amount` on every side.
    pub fn outset(&self, amount: i32) -> Rectangle {
        self.inset(-amount)
    }

    /// Places a `width`x`height` box at the center of `self`, in `self`'s space.
    pub fn centered(&self, width: i32, height: i32) -> Rectangle {
        Rectangle::new(
            self.x + self.width / 2 - width / 2,
            self.y + self.height / 2 - height / 2,
            width,
            height,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment_is_half_open() {
        let r = Rectangle::new(10, 10, 20, 20);
        assert!(r.contains(10.0, 10.0));
        assert!(r.contains(29.9, 29.9));
        assert!(!r.contains(30.0, 15.0));
        assert!(!r.contains(15.0, 30.0));
        assert!(!Rectangle::new(0, 0, 0, 10).contains(0.0, 0.0));
    }

    #[test]
    fn union_skips_empty() {
        let a = Rectangle::new(0, 0, 10, 10);
        let b = Rectangle::new(20, 5, 10, 10);
        assert_eq!(a.union(&b), Rectangle::new(0, 0, 30, 15));
        assert_eq!(Rectangle::default().union(&b), b);
    }

    #[test]
    fn inset_and_center() {
        let r = Rectangle::new(0, 20, 100, 80);
        assert_eq!(r.inset(4), Rectangle::new(4, 24, 92, 72));
        assert_eq!(r.inset(4).outset(4), r);
        assert_eq!(Rectangle::new(0, 0, 1920, 1080).centered(200, 100), Rectangle::new(860, 490, 200, 100));
    }
}
