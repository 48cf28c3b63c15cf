//! Elements and materials.

use crate::count::{NodeRef, RefCount, RefCounted};

/// A chemical element, identified by atomic number and weight.
#[derive(Debug)]
pub struct Element {
    name: String,
    symbol: String,
    atomic_number: f64,
    atomic_weight: f64,
    owners: RefCount,
}

impl Element {
    /// Create an element.
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        atomic_number: f64,
        atomic_weight: f64,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            atomic_number,
            atomic_weight,
            owners: RefCount::new(),
        }
    }

    /// Element name (e.g. "Iron").
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Chemical symbol (e.g. "Fe").
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Atomic number Z.
    pub fn atomic_number(&self) -> f64 {
        self.atomic_number
    }

    /// Atomic weight A.
    pub fn atomic_weight(&self) -> f64 {
        self.atomic_weight
    }
}

impl RefCounted for Element {
    fn owner_count(&self) -> &RefCount {
        &self.owners
    }
}

/// A material: a density plus weighted element components.
///
/// The component list is sealed at construction — there is no way to add
/// components to a built material — and the fractions are normalized to
/// sum to one.
#[derive(Debug)]
pub struct Material {
    name: String,
    density: f64,
    components: Vec<(NodeRef<Element>, f64)>,
    owners: RefCount,
}

impl Material {
    /// Create a material from weighted components.
    ///
    /// Fractions are taken as relative weights and normalized.
    pub fn new(
        name: impl Into<String>,
        density: f64,
        components: Vec<(NodeRef<Element>, f64)>,
    ) -> Self {
        let sum: f64 = components.iter().map(|(_, f)| f).sum();
        let components = if sum > 0.0 {
            components
                .into_iter()
                .map(|(e, f)| (e, f / sum))
                .collect()
        } else {
            components
        };
        Self {
            name: name.into(),
            density,
            components,
            owners: RefCount::new(),
        }
    }

    /// Material name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Density.
    pub fn density(&self) -> f64 {
        self.density
    }

    /// The sealed `(element, fraction)` component list, in storage order.
    pub fn components(&self) -> &[(NodeRef<Element>, f64)] {
        &self.components
    }

    /// Number of element components.
    pub fn num_components(&self) -> usize {
        self.components.len()
    }
}

impl RefCounted for Material {
    fn owner_count(&self) -> &RefCount {
        &self.owners
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fractions_are_normalized() {
        let h = NodeRef::new(Element::new("Hydrogen", "H", 1.0, 1.008));
        let o = NodeRef::new(Element::new("Oxygen", "O", 8.0, 15.999));
        let water = Material::new("Water", 1.0, vec![(h, 2.0 * 1.008), (o, 15.999)]);
        let total: f64 = water.components().iter().map(|(_, f)| f).sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert_eq!(water.num_components(), 2);
    }

    #[test]
    fn empty_material_is_allowed() {
        let vacuum = Material::new("Vacuum", 1e-25, Vec::new());
        assert_eq!(vacuum.num_components(), 0);
    }

    #[test]
    fn elements_are_shared_between_materials() {
        let fe = NodeRef::new(Element::new("Iron", "Fe", 26.0, 55.845));
        let a = Material::new("Steel", 7.9, vec![(fe.clone(), 1.0)]);
        let b = Material::new("Iron", 7.87, vec![(fe.clone(), 1.0)]);
        assert_eq!(fe.owners(), 3);
        drop(a);
        drop(b);
        assert_eq!(fe.owners(), 1);
    }
}
