//! Integer line rasterization with early termination.
//!
//! [`LineWalker`] yields the 8-connected pixel path between two points using
//! the incremental error-accumulator scheme: every step advances the dominant
//! axis and, when the accumulated error allows, the minor axis too. The path
//! always ends exactly on the target point.

use std::ops::ControlFlow;

use nalgebra::Point2;

/// Lazy pixel sequence from `from` to `to`, both inclusive.
#[derive(Clone, Debug)]
pub struct LineWalker {
    x: i32,
    y: i32,
    x1: i32,
    y1: i32,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl LineWalker {
    pub fn new(from: Point2<i32>, to: Point2<i32>) -> Self {
        let dx = (to.x - from.x).abs();
        let dy = -(to.y - from.y).abs();
        Self {
            x: from.x,
            y: from.y,
            x1: to.x,
            y1: to.y,
            dx,
            dy,
            sx: if from.x < to.x { 1 } else { -1 },
            sy: if from.y < to.y { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for LineWalker {
    type Item = Point2<i32>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let p = Point2::new(self.x, self.y);
        if self.x == self.x1 && self.y == self.y1 {
            self.done = true;
            return Some(p);
        }
        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let rest = (self.x1 - self.x).unsigned_abs().max((self.y1 - self.y).unsigned_abs()) as usize + 1;
        (rest, Some(rest))
    }
}

impl std::iter::FusedIterator for LineWalker {}

/// Visit every pixel on the segment until `visit` breaks.
///
/// Returns `ControlFlow::Continue(())` when the walk reached `to`, or
/// `ControlFlow::Break(())` when the visitor stopped it early.
#[inline]
pub fn walk_line<F>(from: Point2<i32>, to: Point2<i32>, mut visit: F) -> ControlFlow<()>
where
    F: FnMut(Point2<i32>) -> ControlFlow<()>,
{
    LineWalker::new(from, to).try_for_each(|p| visit(p))
}
