//! Blendshape Rig
//!
//! A neutral vertex configuration plus a bank of per-vertex offsets, one per
//! named expression target. Blending is linear:
//!
//! ```text
//! result[v] = neutral[v] + Σ_k coefficient[k] * delta[k][v]
//! ```
//!
//! Deltas are stored target-major in one contiguous array:
//! `[Target0 all verts | Target1 all verts | ...]`, so each target's offsets
//! are a single slice.

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::errors::{FaceMeshError, Result};

/// Named coefficients resolved against a rig.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedCoefficients {
    /// `(blendshape index, value)` pairs for the names the rig knows.
    pub pairs: Vec<(usize, f32)>,
    /// Names the rig does not know, in input order.
    pub unknown: Vec<String>,
}

impl ResolvedCoefficients {
    /// Dense coefficient vector: resolved values on top of `base`.
    #[must_use]
    pub fn apply_to(&self, base: &[f32]) -> Vec<f32> {
        let mut out = base.to_vec();
        for &(index, value) in &self.pairs {
            if let Some(slot) = out.get_mut(index) {
                *slot = value;
            }
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct BlendshapeRig {
    neutral: Vec<Vec3>,
    names: Vec<String>,
    index: FxHashMap<String, usize>,
    /// Target-major deltas, `names.len() * neutral.len()` rows.
    deltas: Vec<Vec3>,
}

impl BlendshapeRig {
    /// Builds a rig from a neutral pose and named per-vertex deltas.
    ///
    /// Every delta array must have one row per neutral vertex, and names
    /// must be unique.
    pub fn new(neutral: Vec<Vec3>, targets: Vec<(String, Vec<Vec3>)>) -> Result<Self> {
        let vertex_count = neutral.len();
        let mut names = Vec::with_capacity(targets.len());
        let mut index = FxHashMap::default();
        let mut deltas = Vec::with_capacity(targets.len() * vertex_count);

        for (name, delta) in targets {
            if delta.len() != vertex_count {
                return Err(FaceMeshError::ShapeMismatch {
                    context: "blendshape delta",
                    expected: vertex_count,
                    actual: delta.len(),
                });
            }
            if index.contains_key(&name) {
                return Err(FaceMeshError::DuplicateBlendshape(name));
            }
            index.insert(name.clone(), names.len());
            names.push(name);
            deltas.extend_from_slice(&delta);
        }

        Ok(Self {
            neutral,
            names,
            index,
            deltas,
        })
    }

    /// Builds a rig from full target poses; each delta is `target - neutral`.
    pub fn from_target_meshes(neutral: Vec<Vec3>, targets: Vec<(String, Vec<Vec3>)>) -> Result<Self> {
        let targets = targets
            .into_iter()
            .map(|(name, target)| {
                if target.len() != neutral.len() {
                    return Err(FaceMeshError::ShapeMismatch {
                        context: "blendshape target",
                        expected: neutral.len(),
                        actual: target.len(),
                    });
                }
                let delta = target.iter().zip(&neutral).map(|(t, n)| *t - *n).collect();
                Ok((name, delta))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(neutral, targets)
    }

    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.neutral.len()
    }

    #[inline]
    #[must_use]
    pub fn n_blendshapes(&self) -> usize {
        self.names.len()
    }

    /// Blendshape names in coefficient order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn neutral(&self) -> &[Vec3] {
        &self.neutral
    }

    /// Offsets of one target, or `None` if out of range.
    #[must_use]
    pub fn delta(&self, blendshape: usize) -> Option<&[Vec3]> {
        let n = self.vertex_count();
        let start = blendshape.checked_mul(n)?;
        self.deltas.get(start..start + n)
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| FaceMeshError::UnknownBlendshape(name.to_string()))
    }

    /// Blends the rig with the given coefficients into a new position array.
    ///
    /// All-zero coefficients reproduce the neutral pose exactly.
    pub fn synthesize(&self, coefficients: &[f32]) -> Result<Vec<Vec3>> {
        let mut out = vec![Vec3::ZERO; self.vertex_count()];
        self.synthesize_into(coefficients, &mut out)?;
        Ok(out)
    }

    /// Like [`BlendshapeRig::synthesize`], writing into a caller-owned buffer.
    pub fn synthesize_into(&self, coefficients: &[f32], out: &mut [Vec3]) -> Result<()> {
        if coefficients.len() != self.n_blendshapes() {
            return Err(FaceMeshError::CoefficientLengthMismatch {
                expected: self.n_blendshapes(),
                actual: coefficients.len(),
            });
        }
        if out.len() != self.vertex_count() {
            return Err(FaceMeshError::ShapeMismatch {
                context: "synthesized positions",
                expected: self.vertex_count(),
                actual: out.len(),
            });
        }

        out.copy_from_slice(&self.neutral);
        if self.vertex_count() == 0 {
            return Ok(());
        }

        // Accumulate in blendshape order so results are reproducible.
        for (&c, delta) in coefficients.iter().zip(self.deltas.chunks_exact(self.vertex_count())) {
            if c == 0.0 {
                continue;
            }
            for (dst, d) in out.iter_mut().zip(delta) {
                *dst += *d * c;
            }
        }
        Ok(())
    }

    /// The neutral pose.
    #[must_use]
    pub fn reset(&self) -> Vec<Vec3> {
        self.neutral.clone()
    }

    /// Maps `(name, value)` pairs to indices, collecting unknown names.
    pub fn resolve_named<'a, I>(&self, named: I) -> ResolvedCoefficients
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        let mut resolved = ResolvedCoefficients::default();
        for (name, value) in named {
            match self.index.get(name) {
                Some(&i) => resolved.pairs.push((i, value)),
                None => resolved.unknown.push(name.to_string()),
            }
        }
        resolved
    }
}
