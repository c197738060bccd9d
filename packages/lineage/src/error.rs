//! Errors reported by world operations.

use thiserror::Error;

use crate::entity::EntityID;
use crate::family::FamilyID;

/// Errors that can occur while mutating or querying a `World`.
///
/// A failed operation leaves the world exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The entity already carries a component of this type.
    #[error("{entity} already has component {component}")]
    ComponentAlreadyExists {
        entity: EntityID,
        component: &'static str,
    },

    /// The entity does not carry a component of this type.
    #[error("{entity} has no component {component}")]
    MissingComponent {
        entity: EntityID,
        component: &'static str,
    },

    /// The entity was destroyed or was never created by this world.
    #[error("{0} does not exist")]
    UnknownEntity(EntityID),

    /// The family was not built by this world.
    #[error("{0:?} is not registered with this world")]
    UnknownFamily(FamilyID),
}
