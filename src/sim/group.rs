//! Same-kind entity collections
//!
//! Membership is the entity's liveness: once `remove` returns, the entity is
//! gone from both indexes and its visual is removed from the engine, so it
//! can never be ticked or looked up again.

use std::collections::{BTreeMap, HashMap};

use super::entity::{AssetManifest, EntityId, SpawnContext, Spawnable, TickContext};
use super::error::SimError;
use crate::engine::{Engine, GroupTag, VisualHandle};

/// Owns every live entity of one kind plus the visual-handle index
#[derive(Debug, Clone)]
pub struct EntityGroup<E: Spawnable> {
    tag: GroupTag,
    /// Ordered by id for stable tick order
    members: BTreeMap<EntityId, E>,
    by_visual: HashMap<VisualHandle, EntityId>,
}

impl<E: Spawnable> EntityGroup<E> {
    pub fn new(tag: GroupTag) -> Self {
        Self {
            tag,
            members: BTreeMap::new(),
            by_visual: HashMap::new(),
        }
    }

    pub fn tag(&self) -> GroupTag {
        self.tag
    }

    pub fn preload(manifest: &mut AssetManifest) {
        E::preload(manifest);
    }

    /// Create and register a new member, returning its id
    pub fn spawn_one(&mut self, cx: &mut SpawnContext<'_>, args: E::Args) -> Result<EntityId, SimError> {
        let id = cx.ids.next_id();
        let mut entity = E::build(id, args, cx.rng)?;
        let visual = cx.engine.create_visual(self.tag, entity.visual_key(), *entity.body());
        entity.attach_visual(visual);

        self.by_visual.insert(visual, id);
        self.members.insert(id, entity);
        log::debug!("Spawned {} {} ({:?})", E::KIND, id, self.tag);
        Ok(id)
    }

    /// Sync every member's body from the engine, then tick it
    pub fn tick_all(&mut self, ctx: &mut TickContext<'_>) {
        for entity in self.members.values_mut() {
            if let Some(body) = ctx.engine.body(entity.visual()) {
                *entity.body_mut() = body;
            }
            entity.tick(ctx);
        }
    }

    /// Unregister a member and remove its visual
    ///
    /// Removing an id that is not a member is an error, never a silent no-op.
    pub fn remove(&mut self, engine: &mut dyn Engine, id: EntityId) -> Result<E, SimError> {
        let Some(mut entity) = self.members.remove(&id) else {
            return Err(SimError::NotAMember { kind: E::KIND, id });
        };
        self.by_visual.remove(&entity.visual());
        if let Some(body) = engine.body(entity.visual()) {
            *entity.body_mut() = body;
        }
        engine.remove_visual(entity.visual());
        log::debug!("Removed {} {}", E::KIND, id);
        Ok(entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&E> {
        self.members.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut E> {
        self.members.get_mut(&id)
    }

    /// O(1) lookup of the member backing a visual
    pub fn id_for_visual(&self, visual: VisualHandle) -> Option<EntityId> {
        self.by_visual.get(&visual).copied()
    }

    pub fn get_by_visual(&self, visual: VisualHandle) -> Option<&E> {
        self.id_for_visual(visual).and_then(|id| self.members.get(&id))
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.members.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.members.values()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.members.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Bounds, HeadlessEngine};
    use crate::sim::entity::{Entity, IdAllocator};
    use crate::sim::explosion::{Explosion, ExplosionSpawn};
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spawn(
        group: &mut EntityGroup<Explosion>,
        engine: &mut HeadlessEngine,
        rng: &mut Pcg32,
        ids: &mut IdAllocator,
        x: f32,
    ) -> EntityId {
        let mut cx = SpawnContext { engine, rng, ids };
        group
            .spawn_one(&mut cx, ExplosionSpawn { position: Vec2::new(x, 0.0) })
            .unwrap()
    }

    #[test]
    fn test_spawn_registers_member_and_visual() {
        let mut engine = HeadlessEngine::new(Bounds::new(800.0, 600.0));
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ids = IdAllocator::default();
        let mut group = EntityGroup::<Explosion>::new(GroupTag::Explosions);

        let id = spawn(&mut group, &mut engine, &mut rng, &mut ids, 10.0);
        let visual = group.get(id).unwrap().visual();
        assert_eq!(group.len(), 1);
        assert_eq!(group.id_for_visual(visual), Some(id));
        assert!(engine.contains(visual));
        assert_eq!(engine.count(GroupTag::Explosions), 1);
    }

    #[test]
    fn test_remove_clears_both_indexes() {
        let mut engine = HeadlessEngine::new(Bounds::new(800.0, 600.0));
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ids = IdAllocator::default();
        let mut group = EntityGroup::<Explosion>::new(GroupTag::Explosions);

        let id = spawn(&mut group, &mut engine, &mut rng, &mut ids, 10.0);
        let visual = group.get(id).unwrap().visual();
        let removed = group.remove(&mut engine, id).unwrap();
        assert_eq!(removed.id(), id);
        assert!(group.is_empty());
        assert!(group.get_by_visual(visual).is_none());
        assert!(!engine.contains(visual));
    }

    #[test]
    fn test_double_remove_is_reported() {
        let mut engine = HeadlessEngine::new(Bounds::new(800.0, 600.0));
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ids = IdAllocator::default();
        let mut group = EntityGroup::<Explosion>::new(GroupTag::Explosions);

        let id = spawn(&mut group, &mut engine, &mut rng, &mut ids, 10.0);
        group.remove(&mut engine, id).unwrap();
        let err = group.remove(&mut engine, id).unwrap_err();
        assert!(matches!(err, SimError::NotAMember { id: missing, .. } if missing == id));
    }

    #[test]
    fn test_members_iterate_in_id_order() {
        let mut engine = HeadlessEngine::new(Bounds::new(800.0, 600.0));
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ids = IdAllocator::default();
        let mut group = EntityGroup::<Explosion>::new(GroupTag::Explosions);

        let spawned: Vec<EntityId> = (0..4)
            .map(|i| spawn(&mut group, &mut engine, &mut rng, &mut ids, i as f32))
            .collect();
        group.remove(&mut engine, spawned[1]).unwrap();
        let order: Vec<EntityId> = group.iter().map(|e| e.id()).collect();
        assert_eq!(order, vec![spawned[0], spawned[2], spawned[3]]);
    }
}
