use attrdb::{AttributeEnumGuard, AttributeGuard, Generation, MappingGuard};

/// Target side of a [`CompositeReadGuard`].
#[derive(Debug)]
pub enum TargetGuard {
    Plain(AttributeGuard),
    /// Also keeps enum handles of the target stable.
    Enum(AttributeEnumGuard),
}

impl TargetGuard {
    #[inline]
    pub fn generation(&self) -> Generation {
        match self {
            Self::Plain(guard) => guard.generation(),
            Self::Enum(guard) => guard.generation(),
        }
    }
}

/// Retains one generation of a reference attribute and one of its target
/// attribute for as long as it is held.
///
/// This is a retention token only. Values are read through an
/// [`crate::ImportedAttribute`], and one built by
/// [`crate::ImportedAttribute::make_read_guard`] owns its guard.
#[derive(Debug)]
#[must_use = "Both generations are only retained while the guard is held"]
pub struct CompositeReadGuard {
    mapping: MappingGuard,
    target: TargetGuard,
}

impl CompositeReadGuard {
    pub fn new(mapping: MappingGuard, target: TargetGuard) -> Self {
        Self { mapping, target }
    }

    #[inline]
    pub fn mapping_generation(&self) -> Generation {
        self.mapping.generation()
    }

    #[inline]
    pub fn target_generation(&self) -> Generation {
        self.target.generation()
    }

    /// Whether the target side holds an enum guard.
    #[inline]
    pub fn is_enum_stable(&self) -> bool {
        matches!(self.target, TargetGuard::Enum(_))
    }
}
