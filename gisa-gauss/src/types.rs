//! Core types for polygonal backbone chains.

use gisa_core::hash::sha256_f64;
use gisa_core::{Annotated, ContentAddressable, GisaError, Result, Summarizable};

/// A point in 3D Cartesian space.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    /// Create a new point.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The origin.
    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Whether every coordinate is finite.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point3D) -> f64 {
        self.sub(other).norm()
    }

    /// Dot product.
    pub fn dot(&self, other: &Point3D) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Cross product.
    pub fn cross(&self, other: &Point3D) -> Point3D {
        Point3D {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    /// Vector magnitude.
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Vector addition.
    pub fn add(&self, other: &Point3D) -> Point3D {
        Point3D {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    /// Vector subtraction.
    pub fn sub(&self, other: &Point3D) -> Point3D {
        Point3D {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }

    /// Scalar multiplication.
    pub fn scale(&self, s: f64) -> Point3D {
        Point3D {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }
}

impl From<[f64; 3]> for Point3D {
    fn from(c: [f64; 3]) -> Self {
        Point3D::new(c[0], c[1], c[2])
    }
}

/// A directed line segment between two consecutive backbone vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    pub start: Point3D,
    pub end: Point3D,
}

impl Segment {
    /// Create a new segment.
    pub fn new(start: Point3D, end: Point3D) -> Self {
        Self { start, end }
    }

    /// Direction vector `end - start`.
    pub fn direction(&self) -> Point3D {
        self.end.sub(&self.start)
    }

    /// Segment length.
    pub fn length(&self) -> f64 {
        self.direction().norm()
    }
}

/// An ordered polygonal chain `P_0 .. P_L` with `L` directed segments.
///
/// Segment `k` runs from `P_k` to `P_{k+1}`. The vertices are usually the
/// Cα coordinates of one protein chain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PolygonalChain {
    /// Chain label (e.g. the PDB chain id).
    pub id: String,
    vertices: Vec<Point3D>,
}

impl PolygonalChain {
    /// Build a chain from its vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if any coordinate is NaN or infinite.
    pub fn new(id: impl Into<String>, vertices: Vec<Point3D>) -> Result<Self> {
        if let Some(k) = vertices.iter().position(|p| !p.is_finite()) {
            return Err(GisaError::InvalidInput(format!(
                "vertex {k} has a non-finite coordinate"
            )));
        }
        Ok(Self {
            id: id.into(),
            vertices,
        })
    }

    /// Build an unlabelled chain from raw coordinate triples.
    pub fn from_points(points: &[[f64; 3]]) -> Result<Self> {
        Self::new("", points.iter().copied().map(Point3D::from).collect())
    }

    /// Number of segments `L`.
    pub fn len(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Whether the chain has no segments.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of vertices (`L + 1` for a non-empty chain).
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// The vertices in chain order.
    pub fn vertices(&self) -> &[Point3D] {
        &self.vertices
    }

    /// Segment `k`, or `None` when `k >= L`.
    pub fn segment(&self, k: usize) -> Option<Segment> {
        if k < self.len() {
            Some(Segment::new(self.vertices[k], self.vertices[k + 1]))
        } else {
            None
        }
    }

    /// All segments in chain order.
    pub fn segments(&self) -> Vec<Segment> {
        self.vertices
            .windows(2)
            .map(|w| Segment::new(w[0], w[1]))
            .collect()
    }

    /// Copy of this chain with `replacement` written over the vertices
    /// starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns an error if the replaced range runs past the last vertex or
    /// the replacement contains non-finite coordinates.
    pub fn with_vertices_replaced(&self, start: usize, replacement: &[Point3D]) -> Result<Self> {
        let end = start
            .checked_add(replacement.len())
            .filter(|&end| end <= self.vertices.len())
            .ok_or_else(|| {
                GisaError::InvalidInput(format!(
                    "vertex range {}..{} exceeds the {} vertices of chain '{}'",
                    start,
                    start.saturating_add(replacement.len()),
                    self.vertices.len(),
                    self.id
                ))
            })?;
        let mut vertices = self.vertices.clone();
        vertices[start..end].copy_from_slice(replacement);
        Self::new(self.id.clone(), vertices)
    }

    /// Split the chain wherever two consecutive vertices are farther apart
    /// than `max_link`.
    ///
    /// Missing residues in a Cα trace show up as over-long links; each piece
    /// is an independent chain whose id carries a `/k` suffix when a split
    /// happened. Single-vertex pieces are kept so indices stay traceable.
    pub fn split_at_gaps(&self, max_link: f64) -> Vec<PolygonalChain> {
        let mut pieces: Vec<Vec<Point3D>> = Vec::new();
        let mut current: Vec<Point3D> = Vec::new();
        for p in &self.vertices {
            if let Some(last) = current.last() {
                if last.distance_to(p) > max_link {
                    pieces.push(core::mem::take(&mut current));
                }
            }
            current.push(*p);
        }
        if !current.is_empty() {
            pieces.push(current);
        }

        let split = pieces.len() > 1;
        pieces
            .into_iter()
            .enumerate()
            .map(|(k, vertices)| PolygonalChain {
                id: if split {
                    format!("{}/{}", self.id, k)
                } else {
                    self.id.clone()
                },
                vertices,
            })
            .collect()
    }
}

impl Annotated for PolygonalChain {
    fn name(&self) -> &str {
        &self.id
    }
}

impl Summarizable for PolygonalChain {
    fn summary(&self) -> String {
        let contour: f64 = self
            .vertices
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum();
        format!(
            "PolygonalChain '{}' — {} segment(s), contour length {:.2}",
            self.name(),
            self.len(),
            contour,
        )
    }
}

impl ContentAddressable for PolygonalChain {
    fn content_hash(&self) -> String {
        sha256_f64(self.vertices.iter().flat_map(|p| [p.x, p.y, p.z]))
    }
}
