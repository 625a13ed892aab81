//! Bubble system - decays waiting bubbles and drops expired ones

use hecs::World;

use crate::components::Bubble;

pub fn bubble_system(world: &mut World, delta_seconds: f32) {
    let mut expired = Vec::new();
    for (entity, bubble) in world.query_mut::<&mut Bubble>() {
        if !bubble.tick(delta_seconds) {
            expired.push(entity);
        }
    }
    for entity in expired {
        world.remove_one::<Bubble>(entity).ok();
    }
}
