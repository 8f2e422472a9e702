/// Version tracker - used to mark resource changes
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeTracker {
    version: u64,
}

impl ChangeTracker {
    #[must_use]
    pub fn new() -> Self {
        Self { version: 0 }
    }

    /// Marks as modified, increments version by 1
    pub fn changed(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    /// Gets the current version number
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Snapshot of the versions of the two mutable vertex columns.
///
/// Consumers (the flattened buffer, the device mirror) keep their own
/// snapshot and compare it against the geometry's current one to find out
/// which columns need rewriting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnVersions {
    pub positions: u64,
    pub normals: u64,
}

impl ColumnVersions {
    /// Columns whose version differs between `self` (last seen) and `current`.
    #[must_use]
    pub fn changed_since(&self, current: &ColumnVersions) -> DirtyColumns {
        DirtyColumns {
            positions: self.positions != current.positions,
            normals: self.normals != current.normals,
        }
    }
}

/// Which mutable columns changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyColumns {
    pub positions: bool,
    pub normals: bool,
}

impl DirtyColumns {
    pub const NONE: Self = Self {
        positions: false,
        normals: false,
    };

    #[inline]
    #[must_use]
    pub fn any(&self) -> bool {
        self.positions || self.normals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracker_wraps_instead_of_overflowing() {
        let mut t = ChangeTracker { version: u64::MAX };
        t.changed();
        assert_eq!(t.version(), 0);
    }

    #[test]
    fn changed_since_reports_each_column() {
        let seen = ColumnVersions { positions: 1, normals: 4 };
        let now = ColumnVersions { positions: 2, normals: 4 };
        let dirty = seen.changed_since(&now);
        assert!(dirty.positions);
        assert!(!dirty.normals);
        assert!(dirty.any());
        assert!(!seen.changed_since(&seen).any());
    }
}
