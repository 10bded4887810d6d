//! Points of interest and their model points

use std::collections::BTreeMap;

use girder_fem::prelude::PoiId;
use serde::{Deserialize, Serialize};

/// A location on a girder: a segment and a distance from its start
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub segment: usize,
    pub distance: f64,
}

impl PointOfInterest {
    pub fn new(segment: usize, distance: f64) -> Self {
        Self { segment, distance }
    }
}

/// Bidirectional map between points of interest and model points
///
/// A model point is created the first time a point of interest is mapped and
/// reused afterwards. The same id is valid in both structural models of a
/// girder line. Points of interest on different segments at the same station
/// share one model point.
#[derive(Debug, Clone, Default)]
pub struct PoiMap {
    resolution: f64,
    forward: BTreeMap<(usize, i64), PoiId>,
    reverse: BTreeMap<PoiId, Vec<PointOfInterest>>,
}

impl PoiMap {
    /// Points closer than `resolution` on the same segment are the same point
    pub fn new(resolution: f64) -> Self {
        Self {
            resolution: resolution.max(f64::EPSILON),
            ..Self::default()
        }
    }

    fn key(&self, poi: &PointOfInterest) -> (usize, i64) {
        (poi.segment, (poi.distance / self.resolution).round() as i64)
    }

    /// Model point of a point of interest, if it was mapped before
    pub fn model_point(&self, poi: &PointOfInterest) -> Option<PoiId> {
        self.forward.get(&self.key(poi)).copied()
    }

    /// Point of interest first mapped to a model point
    pub fn poi(&self, id: PoiId) -> Option<PointOfInterest> {
        self.pois_at(id).first().copied()
    }

    /// Every point of interest mapped to a model point, in mapping order
    pub fn pois_at(&self, id: PoiId) -> &[PointOfInterest] {
        self.reverse.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Model point of `poi`, created with `create` when it is new
    pub fn get_or_insert_with<E>(
        &mut self,
        poi: &PointOfInterest,
        create: impl FnOnce() -> Result<PoiId, E>,
    ) -> Result<PoiId, E> {
        let key = self.key(poi);
        if let Some(id) = self.forward.get(&key) {
            return Ok(*id);
        }
        let id = create()?;
        self.forward.insert(key, id);
        self.reverse.entry(id).or_default().push(*poi);
        Ok(id)
    }

    /// Number of mapped points of interest
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_is_created_once() {
        let mut map = PoiMap::new(1.0e-6);
        let mut created = 0;
        let poi = PointOfInterest::new(1, 12.5);
        for _ in 0..3 {
            let id = map
                .get_or_insert_with::<()>(&poi, || {
                    created += 1;
                    Ok(7)
                })
                .unwrap();
            assert_eq!(id, 7);
        }
        assert_eq!(created, 1);
        assert_eq!(map.len(), 1);
        assert_eq!(map.poi(7), Some(poi));
        assert_eq!(map.model_point(&PointOfInterest::new(1, 12.5 + 1.0e-9)), Some(7));
        assert_eq!(map.model_point(&PointOfInterest::new(0, 12.5)), None);
    }

    #[test]
    fn test_shared_model_point_keeps_every_poi() {
        let mut map = PoiMap::new(1.0e-6);
        let end = PointOfInterest::new(0, 30.0);
        let start = PointOfInterest::new(1, 0.0);
        let a = map.get_or_insert_with::<()>(&end, || Ok(4)).unwrap();
        let b = map.get_or_insert_with::<()>(&start, || Ok(4)).unwrap();

        assert_eq!(a, b);
        assert_eq!(map.len(), 2);
        assert_eq!(map.poi(4), Some(end));
        assert_eq!(map.pois_at(4), &[end, start]);
        assert!(map.pois_at(5).is_empty());
    }
}
