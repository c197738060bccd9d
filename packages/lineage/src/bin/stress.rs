use std::time::Instant;

use lineage::{CommandBuffer, component, EntityBuilder, FamilySpec, World, WorldConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default)]
pub struct MyComponent(i32);

#[derive(Debug, Clone, Copy, Default)]
pub struct Marked;

component!(MyComponent, Marked);

fn main() -> Result<(), lineage::WorldError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut world = World::with_config(WorldConfig::new().with_entity_capacity(4096));
    let plain = world.build_family(&FamilySpec::new()
        .all_of::<MyComponent>()
        .none_of::<Marked>());
    let marked = world.build_family(&FamilySpec::new().all_of::<Marked>());
    let mut to_delete = Vec::new();

    let start = Instant::now();
    for round in 0..8 {
        let mut command_buffer = CommandBuffer::new();

        for entity in to_delete.drain(..) {
            command_buffer.destroy(entity);
        }

        for idx in 0..512 {
            let entity = world.create(EntityBuilder::new()
                .with(move |c: &mut MyComponent| c.0 = idx))?;

            if idx % 12 == 11 {
                command_buffer.add_default::<Marked>(entity);
                to_delete.push(entity);
            }
        }

        command_buffer.apply(&mut world)?;
        info!(
            round,
            entities = world.len(),
            plain = world.family(plain)?.len(),
            marked = world.family(marked)?.len(),
            pooled = world.pool_len::<MyComponent>(),
            "round complete");
    }

    println!("{} entities in {:?}", world.len(), start.elapsed());
    Ok(())
}
