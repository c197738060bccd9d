//! An entity component system.
//!
//! A `World` owns entities, the components attached to them and the families
//! that group entities by the components they hold. Families are kept up to
//! date as components come and go, so querying one never scans the world.

pub use bits::BitSet;
pub use builder::EntityBuilder;
pub use command_buffer::CommandBuffer;
pub use component::{
    Component,
    ComponentRegistry,
    ComponentTypeID,
};
pub use config::WorldConfig;
pub use entity::{EntityID, EntityTable};
pub use error::WorldError;
pub use family::{
    Family,
    FamilyID,
    FamilyMasks,
    FamilyRegistry,
    FamilySpec,
    FamilyView,
};
pub use mapper::Mapper;
pub use store::{ComponentStore, ComponentTable};
pub use world::World;

pub mod bits;
pub mod component;
pub mod entity;
pub mod store;
pub mod family;

pub mod config;
pub mod error;

mod builder;
mod mapper;
mod command_buffer;

pub mod world;
