//! Character system - advances every avatar's state machine

use hecs::{Entity, World};
use rand::Rng;

use crate::components::{Character, SpawnOrder};
use officesim_logic::character::{update_character, TickContext};

/// Entities in creation order. Used wherever iteration order is observable.
pub fn spawn_ordered(world: &World) -> Vec<Entity> {
    let mut order: Vec<(SpawnOrder, Entity)> = world
        .query::<&SpawnOrder>()
        .iter()
        .map(|(entity, order)| (*order, entity))
        .collect();
    order.sort_by_key(|(order, _)| *order);
    order.into_iter().map(|(_, entity)| entity).collect()
}

/// Tick every character by `dt` seconds.
pub fn character_system<R: Rng + ?Sized>(
    world: &mut World,
    delta_seconds: f32,
    ctx: &TickContext<'_>,
    rng: &mut R,
) {
    for entity in spawn_ordered(world) {
        if let Ok(mut ch) = world.get::<&mut Character>(entity) {
            update_character(&mut ch, delta_seconds, ctx, rng);
        }
    }
}
