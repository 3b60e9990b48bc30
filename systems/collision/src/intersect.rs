//! Exact integer intersection tests between travel segments and obstacle
//! features.
//!
//! Every quantity stays in raw ticks. The circle solver evaluates its
//! quadratic in a fixed order so no intermediate product carries more than
//! three factors of a coordinate magnitude; rearranging the algebra (for
//! example forming `b * b - 4 * a * c` directly) produces four-factor terms that
//! overflow `i64` at ordinary arena sizes.

use rally_core::{ArithmeticResult, Circle, Int, Line, Pt};

/// Intersection of `line` with the vertical segment `target`.
///
/// `target` must have equal `x` coordinates at both ends. When `line` is
/// itself vertical and overlaps the target, the overlap point nearest to
/// `line.start` is returned.
pub fn intersect_vertical(line: Line, target: Line) -> ArithmeticResult<Option<Pt>> {
    let x = target.start.x;
    let (min_x, max_x) = ordered(line.start.x, line.end.x);
    if x < min_x || x > max_x {
        return Ok(None);
    }

    let (target_min_y, target_max_y) = ordered(target.start.y, target.end.y);
    let (min_y, max_y) = ordered(line.start.y, line.end.y);
    if max_y < target_min_y || min_y > target_max_y {
        return Ok(None);
    }

    let y = if line.start.x == line.end.x {
        line.start.y.clamp(target_min_y, target_max_y)
    } else {
        x.sub(line.start.x)?
            .mul(line.end.y.sub(line.start.y)?)?
            .div(line.end.x.sub(line.start.x)?)?
            .add(line.start.y)?
    };

    if y < target_min_y || y > target_max_y {
        return Ok(None);
    }

    Ok(Some(Pt::new(x, y)))
}

/// Intersection of `line` with the horizontal segment `target`.
///
/// Mirrors [`intersect_vertical`] with the axes exchanged.
pub fn intersect_horizontal(line: Line, target: Line) -> ArithmeticResult<Option<Pt>> {
    Ok(intersect_vertical(transpose_line(line), transpose_line(target))?.map(transpose))
}

/// First point at which `line` meets the boundary of `circle`, travelling
/// from `line.start`.
///
/// The radius is rounded up and the per-axis offset `k` is enlarged by one
/// tick, so near misses may be reported as hits but true contacts are never
/// lost. Zero-length segments never intersect, and a segment that starts
/// inside the circle reports no entry point.
pub fn intersect_circle(line: Line, circle: Circle) -> ArithmeticResult<Option<Pt>> {
    if line.is_degenerate() {
        return Ok(None);
    }

    let direction = line.direction()?;
    let offset = line.start.sub(circle.center)?;
    let radius = circle.radius()?;

    let quadratic = Quadratic {
        a: direction.dot(direction)?,
        b: Int::TWO.mul(offset.dot(direction)?)?,
        c: offset.dot(offset)?.sub(radius.square()?)?,
    };

    let Some(x) = quadratic.solve_axis(line.start.x, line.end.x)? else {
        return Ok(None);
    };
    let Some(y) = quadratic.solve_axis(line.start.y, line.end.y)? else {
        return Ok(None);
    };

    Ok(Some(Pt::new(x, y)))
}

/// Coefficients of `a t^2 + b t + c = 0` for the segment parameter `t`.
#[derive(Clone, Copy, Debug)]
struct Quadratic {
    a: Int,
    b: Int,
    c: Int,
}

impl Quadratic {
    /// Projects the nearer root onto one axis of the segment.
    ///
    /// With `dist = |end - start|` on this axis the root is
    /// `start + sign * (k + sqrt(k^2 - l))`, where `k = b * dist / 2a` and
    /// `l = (c * dist / a) * dist`. This equals `start + t * (end - start)`
    /// without ever forming the discriminant.
    fn solve_axis(self, start: Int, end: Int) -> ArithmeticResult<Option<Int>> {
        let dist = end.sub(start)?.abs()?;
        let sign = if end > start { Int::new(-1) } else { Int::ONE };

        let mut k = self.b.mul(dist)?.div(Int::TWO.mul(self.a)?)?;
        // Division truncates toward zero; widen by a tick to stay on the
        // colliding side. An axis the segment does not move along pins the
        // coordinate to `start` and must stay exact.
        if !dist.is_zero() {
            k = if k.is_negative() { k.dec()? } else { k.inc()? };
        }

        let l = self.c.mul(dist)?.div(self.a)?.mul(dist)?;
        let m = k.square()?.sub(l)?;
        if m.is_negative() {
            return Ok(None);
        }

        let coordinate = start.add(sign.mul(k.add(m.sqrt()?)?)?)?;
        let (low, high) = ordered(start, end);
        if coordinate < low || coordinate > high {
            return Ok(None);
        }

        Ok(Some(coordinate))
    }
}

fn ordered(a: Int, b: Int) -> (Int, Int) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn transpose(point: Pt) -> Pt {
    Pt::new(point.y, point.x)
}

fn transpose_line(line: Line) -> Line {
    Line::new(transpose(line.start), transpose(line.end))
}
