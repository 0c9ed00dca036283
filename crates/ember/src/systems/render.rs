//! # Render Queue
//!
//! [`RenderSystem`] does not draw. Each update it flattens every visible
//! entity into a [`SpriteInstance`], sorts the batch back to front, and
//! exposes it as raw bytes for whatever backend uploads it.
//!
//! ```text
//! members ──> [Transform + Sprite] ──> SpriteInstance ──> stable sort by z ──> as_bytes()
//!                        │
//!                        └─ texture path ──> TextureTable ──> texture_id
//! ```

use std::any::Any;
use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use ember_core::{ComponentTypes, EcsResult, Registry, System, SystemMembers};
use tracing::debug;

use crate::components::{Sprite, Transform};

/// One sprite ready for upload. 32 bytes, no padding.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// Top-left corner in world units.
    pub position: [f32; 2],
    /// Width and height after scaling.
    pub size: [f32; 2],
    /// Rotation in degrees.
    pub rotation: f32,
    /// Draw layer.
    pub z_index: i32,
    /// Index into the system's [`TextureTable`].
    pub texture_id: u32,
    /// Owning entity id.
    pub entity: u32,
}

/// Interns texture identifiers into dense `u32` ids.
///
/// Ids are handed out in first-seen order and never change.
#[derive(Debug, Default)]
pub struct TextureTable {
    ids: HashMap<String, u32>,
    names: Vec<String>,
}

impl TextureTable {
    /// Returns the id for `texture`, assigning the next one if unseen.
    pub fn intern(&mut self, texture: &str) -> u32 {
        if let Some(&id) = self.ids.get(texture) {
            return id;
        }
        #[allow(clippy::cast_possible_truncation)]
        let id = self.names.len() as u32;
        self.ids.insert(texture.to_owned(), id);
        self.names.push(texture.to_owned());
        id
    }

    /// Returns the texture identifier for `id`.
    #[must_use]
    pub fn name(&self, id: u32) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    /// Number of distinct textures seen.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if no texture has been interned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Builds a z-sorted sprite batch from every entity with a
/// [`Transform`] and a [`Sprite`].
pub struct RenderSystem {
    members: SystemMembers,
    queue: Vec<SpriteInstance>,
    textures: TextureTable,
}

impl RenderSystem {
    /// Creates the system and registers its required components.
    ///
    /// # Errors
    ///
    /// Fails if the registry has no room left for the component types.
    pub fn new(types: &mut ComponentTypes) -> EcsResult<Self> {
        let mut members = SystemMembers::new();
        members
            .require_component::<Transform>(types)?
            .require_component::<Sprite>(types)?;
        Ok(Self {
            members,
            queue: Vec::new(),
            textures: TextureTable::default(),
        })
    }

    /// The batch built by the last update, lowest layer first.
    #[inline]
    #[must_use]
    pub fn queue(&self) -> &[SpriteInstance] {
        &self.queue
    }

    /// The batch as raw bytes for upload.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.queue)
    }

    /// Textures referenced by `texture_id`.
    #[inline]
    #[must_use]
    pub fn textures(&self) -> &TextureTable {
        &self.textures
    }
}

impl System for RenderSystem {
    fn members(&self) -> &SystemMembers {
        &self.members
    }

    fn members_mut(&mut self) -> &mut SystemMembers {
        &mut self.members
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn update(&mut self, registry: &mut Registry, _delta_time: f64) -> EcsResult<()> {
        self.queue.clear();

        for &entity in self.members.entities() {
            let transform = registry.get_component::<Transform>(entity)?;
            let sprite = registry.get_component::<Sprite>(entity)?;

            #[allow(clippy::cast_precision_loss)]
            let size = [
                sprite.width as f32 * transform.scale.x,
                sprite.height as f32 * transform.scale.y,
            ];
            self.queue.push(SpriteInstance {
                position: transform.position.to_array(),
                size,
                rotation: transform.rotation,
                z_index: sprite.z_index,
                texture_id: self.textures.intern(&sprite.texture),
                entity: entity.id(),
            });
        }

        // Stable: equal layers keep membership order
        self.queue.sort_by_key(|instance| instance.z_index);

        debug!(sprites = self.queue.len(), textures = self.textures.len(), "render queue built");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Vec2;

    fn spawn(registry: &mut Registry, x: f32, sprite: Sprite) -> u32 {
        let entity = registry.create_entity();
        registry.add_component(entity, Transform::at(Vec2::new(x, 0.0))).unwrap();
        registry.add_component(entity, sprite).unwrap();
        entity.id()
    }

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<SpriteInstance>(), 32);
    }

    #[test]
    fn test_queue_sorted_by_layer() {
        let mut registry = Registry::new();
        registry.add_system(RenderSystem::new).unwrap();

        let player = spawn(&mut registry, 0.0, Sprite::new("player.png", 16, 16).on_layer(4));
        let tree = spawn(&mut registry, 1.0, Sprite::new("tree.png", 32, 64).on_layer(1));
        let rock = spawn(&mut registry, 2.0, Sprite::new("rock.png", 8, 8).on_layer(1));
        let map = spawn(&mut registry, 3.0, Sprite::new("map.png", 512, 512));
        registry.update();
        registry.run_system::<RenderSystem>(0.016).unwrap();

        let render = registry.get_system::<RenderSystem>().unwrap();
        let order: Vec<u32> = render.queue().iter().map(|i| i.entity).collect();
        assert_eq!(order, vec![map, tree, rock, player]);
        assert_eq!(render.as_bytes().len(), 4 * 32);
    }

    #[test]
    fn test_textures_interned_once() {
        let mut registry = Registry::new();
        registry.add_system(RenderSystem::new).unwrap();

        spawn(&mut registry, 0.0, Sprite::new("tank.png", 32, 32));
        spawn(&mut registry, 1.0, Sprite::new("tank.png", 32, 32));
        spawn(&mut registry, 2.0, Sprite::new("truck.png", 32, 32));
        registry.update();
        registry.run_system::<RenderSystem>(0.016).unwrap();
        registry.run_system::<RenderSystem>(0.016).unwrap();

        let render = registry.get_system::<RenderSystem>().unwrap();
        assert_eq!(render.queue().len(), 3);
        assert_eq!(render.textures().len(), 2);
        assert_eq!(render.textures().name(render.queue()[2].texture_id), Some("truck.png"));
    }

    #[test]
    fn test_size_honors_scale() {
        let mut registry = Registry::new();
        registry.add_system(RenderSystem::new).unwrap();

        let entity = registry.create_entity();
        registry
            .add_component(entity, Transform::at(Vec2::ZERO).with_scale(Vec2::new(2.0, 0.5)))
            .unwrap();
        registry.add_component(entity, Sprite::new("tank.png", 32, 32)).unwrap();
        registry.update();
        registry.run_system::<RenderSystem>(0.016).unwrap();

        let render = registry.get_system::<RenderSystem>().unwrap();
        assert_eq!(render.queue()[0].size, [64.0, 16.0]);
    }
}
