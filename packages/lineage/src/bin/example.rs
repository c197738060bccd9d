use lineage::{CommandBuffer, component, EntityBuilder, FamilySpec, World};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default)]
pub struct Position(f32, f32);

#[derive(Debug, Clone, Copy, Default)]
pub struct Velocity(f32, f32);

#[derive(Debug, Clone, Copy, Default)]
pub struct Sleeping;

component!(Position, Velocity, Sleeping);

fn main() -> Result<(), lineage::WorldError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut world = World::new();
    let moving = world.build_family(&FamilySpec::new()
        .all_of::<Position>()
        .all_of::<Velocity>()
        .none_of::<Sleeping>());

    for idx in 0..4 {
        let speed = idx as f32;
        world.create(EntityBuilder::new()
            .with_default::<Position>()
            .with(move |v: &mut Velocity| *v = Velocity(speed, 0.0)))?;
    }

    let mut commands = CommandBuffer::new();
    for step in 0..3 {
        let members = world.family(moving)?.entities();
        for entity in members {
            let velocity = *world.get::<Velocity>(entity)?;
            let position = world.get_mut::<Position>(entity)?;
            position.0 += velocity.0;
            position.1 += velocity.1;

            if velocity.0 == 0.0 {
                commands.add_default::<Sleeping>(entity);
            }
        }
        commands.apply(&mut world)?;

        info!(step, members = world.family(moving)?.len(), "stepped");
    }

    for entity in world.entities() {
        println!("{}: {:?}", entity, world.get::<Position>(entity)?);
    }

    Ok(())
}
