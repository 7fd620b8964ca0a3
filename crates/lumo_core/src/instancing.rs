//! Named-object instancing.
//!
//! `ObjectRegistry::begin` hands out an [`ObjectBuilder`] that owns the
//! object's records while it is open. Only [`ObjectRegistry::finish`] makes
//! the object visible, so an object can never be instantiated half built.

use std::collections::HashMap;

use lumo_math::Transform;

use crate::error::{Result, SceneError};
use crate::scene::{PrimitiveRecord, SceneRecords};

/// An object under construction.
#[derive(Debug)]
pub struct ObjectBuilder {
    name: String,
    records: SceneRecords,
}

impl ObjectBuilder {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where directives go while this object is open.
    pub fn records_mut(&mut self) -> &mut SceneRecords {
        &mut self.records
    }
}

/// Finished named objects.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: HashMap<String, SceneRecords>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self, name: &str) -> ObjectBuilder {
        log::debug!("Begin object \"{}\"", name);
        ObjectBuilder {
            name: name.to_string(),
            records: SceneRecords::new(),
        }
    }

    /// Register a finished object. A previous object of the same name is replaced.
    pub fn finish(&mut self, builder: ObjectBuilder) {
        log::debug!(
            "End object \"{}\": {} primitives, {} lights",
            builder.name,
            builder.records.primitives.len(),
            builder.records.lights.len()
        );
        if self.objects.contains_key(&builder.name) {
            log::warn!("Object \"{}\" redefined", builder.name);
        }
        self.objects.insert(builder.name, builder.records);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&SceneRecords> {
        self.objects.get(name)
    }

    /// Copies of the object's records placed under `ctm`.
    ///
    /// Each primitive's stored transform `L` becomes `ctm ∘ L`. The stored
    /// template is left untouched.
    pub fn instantiate(&self, name: &str, ctm: &Transform) -> Result<SceneRecords> {
        let template = self
            .objects
            .get(name)
            .ok_or_else(|| SceneError::UnknownObject(name.to_string()))?;

        Ok(SceneRecords {
            primitives: template
                .primitives
                .iter()
                .map(|record| PrimitiveRecord {
                    shape: record.shape.clone(),
                    material: record.material.clone(),
                    transform: ctm.update(&record.transform),
                })
                .collect(),
            lights: template.lights.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lumo_math::Vec3;

    use crate::material::Material;
    use crate::param::ParamSet;
    use crate::scene::ShapeDescriptor;

    fn sphere_record(transform: Transform) -> PrimitiveRecord {
        PrimitiveRecord {
            shape: ShapeDescriptor::Params(ParamSet::new().with("type", "sphere")),
            material: Arc::new(Material::default()),
            transform,
        }
    }

    #[test]
    fn test_object_invisible_until_finished() {
        let mut registry = ObjectRegistry::new();
        let mut builder = registry.begin("tree");
        builder.records_mut().push_primitive(sphere_record(Transform::identity()));

        assert!(!registry.contains("tree"));
        assert!(matches!(
            registry.instantiate("tree", &Transform::identity()),
            Err(SceneError::UnknownObject(_))
        ));

        registry.finish(builder);
        assert!(registry.contains("tree"));
    }

    #[test]
    fn test_instances_compose_and_leave_template_alone() {
        let local = Transform::scale(Vec3::splat(2.0));
        let mut registry = ObjectRegistry::new();
        let mut builder = registry.begin("ball");
        builder.records_mut().push_primitive(sphere_record(local));
        registry.finish(builder);

        let t1 = Transform::translate(Vec3::new(10.0, 0.0, 0.0));
        let t2 = Transform::translate(Vec3::new(0.0, -10.0, 0.0));
        let a = registry.instantiate("ball", &t1).unwrap();
        let b = registry.instantiate("ball", &t2).unwrap();

        let p = Vec3::ONE;
        assert_eq!(a.primitives[0].transform, t1.update(&local));
        assert_eq!(a.primitives[0].transform.apply_point(p), Vec3::new(12.0, 2.0, 2.0));
        assert_eq!(b.primitives[0].transform.apply_point(p), Vec3::new(2.0, -8.0, 2.0));

        let template = registry.get("ball").unwrap();
        assert_eq!(template.primitives[0].transform, local);
    }
}
