//! Core types for the layout engine

use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A 2D point in diagram coordinates (y axis pointing down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from this one in the direction `angle` (radians)
    pub fn polar_offset(self, radius: f64, angle: f64) -> Point {
        Point::new(self.x + radius * angle.cos(), self.y + radius * angle.sin())
    }

    /// Angle of the vector from this point to `other`
    pub fn angle_to(self, other: Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    pub fn distance(self, other: Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Halfway point between this point and `other`
    pub fn midpoint(self, other: Point) -> Point {
        Point::new(
            self.x + (other.x - self.x) / 2.0,
            self.y + (other.y - self.y) / 2.0,
        )
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// The drawing area of a map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Canvas {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1000.0, 1000.0)
    }
}

/// Stoichiometric side of a reaction
///
/// Substrates (negative coefficients) sit on the minus side, products on the
/// plus side. A zero coefficient counts as plus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Minus,
    Plus,
}

impl Side {
    pub fn of(coefficient: f64) -> Side {
        if coefficient >= 0.0 {
            Side::Plus
        } else {
            Side::Minus
        }
    }

    pub fn is_plus(self) -> bool {
        self == Side::Plus
    }

    /// Direction offset from the reaction axis towards this side
    ///
    /// Products extend along the axis, substrates opposite to it.
    pub fn axis_offset(self) -> f64 {
        match self {
            Side::Plus => 0.0,
            Side::Minus => PI,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Minus => 0,
            Side::Plus => 1,
        }
    }
}

/// A value kept once per reaction side
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerSide<T> {
    pub minus: T,
    pub plus: T,
}

impl<T> PerSide<T> {
    pub fn new(minus: T, plus: T) -> Self {
        Self { minus, plus }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::Minus => &self.minus,
            Side::Plus => &self.plus,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Minus => &mut self.minus,
            Side::Plus => &mut self.plus,
        }
    }
}
