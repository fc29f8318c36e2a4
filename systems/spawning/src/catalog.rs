//! Name-keyed spawn templates and the regions enemies appear in.

use std::collections::HashMap;

use arena_core::{RandomSource, SpawnRegion, TemplateId, WorldPoint};

/// Errors raised while assembling a [`SpawnCatalog`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two templates were registered under the same key.
    #[error("spawn template `{key}` is registered more than once")]
    DuplicateTemplate {
        /// Key that appeared twice.
        key: String,
    },
    /// More templates were registered than identifiers can address.
    #[error("spawn catalog holds more than {} templates", u32::MAX)]
    TooManyTemplates,
}

/// Lookup of spawnable templates plus the list of spawn regions.
#[derive(Clone, Debug, Default)]
pub struct SpawnCatalog {
    templates: Vec<String>,
    index: HashMap<String, TemplateId>,
    regions: Vec<SpawnRegion>,
}

impl SpawnCatalog {
    /// Registers templates in order; their positions become [`TemplateId`]s.
    pub fn new<I, S>(templates: I, regions: Vec<SpawnRegion>) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self {
            regions,
            ..Self::default()
        };
        for key in templates {
            let key = key.into();
            if catalog.index.contains_key(&key) {
                return Err(CatalogError::DuplicateTemplate { key });
            }
            let raw = u32::try_from(catalog.templates.len())
                .map_err(|_| CatalogError::TooManyTemplates)?;
            let id = TemplateId::new(raw);
            let _ = catalog.index.insert(key.clone(), id);
            catalog.templates.push(key);
        }
        Ok(catalog)
    }

    /// Resolves a template key.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<TemplateId> {
        self.index.get(key).copied()
    }

    /// Key the template was registered under.
    #[must_use]
    pub fn template_key(&self, id: TemplateId) -> Option<&str> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.templates.get(index))
            .map(String::as_str)
    }

    /// Number of registered templates.
    #[must_use]
    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Regions spawn positions are drawn from.
    #[must_use]
    pub fn regions(&self) -> &[SpawnRegion] {
        &self.regions
    }

    /// Picks a template uniformly, or `None` when no template is registered.
    pub fn random_template(&self, random: &mut impl RandomSource) -> Option<TemplateId> {
        if self.templates.is_empty() {
            return None;
        }
        let index = random.index(self.templates.len());
        u32::try_from(index).ok().map(TemplateId::new)
    }

    /// Picks a region uniformly and a point uniformly inside it, or `None`
    /// when no region is configured.
    pub fn random_position(&self, random: &mut impl RandomSource) -> Option<WorldPoint> {
        if self.regions.is_empty() {
            return None;
        }
        let region = self.regions[random.index(self.regions.len())];
        Some(region.sample(random))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        index: usize,
    }

    impl RandomSource for Fixed {
        fn index(&mut self, len: usize) -> usize {
            self.index % len
        }

        fn between(&mut self, min: f32, max: f32) -> f32 {
            (min + max) / 2.0
        }
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let error = SpawnCatalog::new(["slime", "bat", "slime"], Vec::new())
            .expect_err("duplicate key");
        assert_eq!(
            error,
            CatalogError::DuplicateTemplate {
                key: "slime".to_owned()
            }
        );
    }

    #[test]
    fn keys_resolve_to_registration_order() {
        let catalog = SpawnCatalog::new(["slime", "bat"], Vec::new()).expect("catalog");

        assert_eq!(catalog.resolve("bat"), Some(TemplateId::new(1)));
        assert_eq!(catalog.resolve("dragon"), None);
        assert_eq!(catalog.template_key(TemplateId::new(0)), Some("slime"));
        assert_eq!(catalog.template_count(), 2);
    }

    #[test]
    fn empty_catalog_yields_nothing() {
        let catalog = SpawnCatalog::default();
        let mut random = Fixed { index: 0 };

        assert!(catalog.random_template(&mut random).is_none());
        assert!(catalog.random_position(&mut random).is_none());
    }

    #[test]
    fn position_is_drawn_from_the_chosen_region() {
        let catalog = SpawnCatalog::new(
            ["slime"],
            vec![
                SpawnRegion::new(0.0, 2.0, 0.0, 2.0),
                SpawnRegion::new(10.0, 20.0, -4.0, 4.0),
            ],
        )
        .expect("catalog");
        let mut random = Fixed { index: 1 };

        let position = catalog.random_position(&mut random).expect("position");

        assert_eq!(position, WorldPoint::new(15.0, 0.0));
    }
}
