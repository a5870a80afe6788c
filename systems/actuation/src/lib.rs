#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system deciding how an actuator extends or retracts by one tile.
//!
//! Each request splits the ship at the acting actuator into the side attached
//! to end `A` and the side attached to end `B`, validates both candidate moves
//! against the same world snapshot, and then emits the commands that move
//! exactly one of them.

use glam::IVec2;
use log::debug;
use pistonworks_core::{
    ActuationOutcome, ActuatorId, Axis, Command, Endpoint, EntityId, PartSet, Stroke, TILE_SIZE,
};
use pistonworks_system_collision::{collides_if_moved, Colliders};
use pistonworks_system_connectivity as connectivity;
use pistonworks_world::{query, World};
use thiserror::Error;

/// Configuration parameters for the actuation system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    min_length_tiles: i32,
    gravity_probe: IVec2,
}

impl Config {
    /// Creates a configuration with an explicit minimum length and ground probe.
    ///
    /// `gravity_probe` is the offset used to ask whether a side rests on
    /// something; positive y points down.
    #[must_use]
    pub const fn new(min_length_tiles: i32, gravity_probe: IVec2) -> Self {
        Self {
            min_length_tiles,
            gravity_probe,
        }
    }

    /// Shortest length, in tiles, an actuator may retract to.
    #[must_use]
    pub const fn min_length_tiles(&self) -> i32 {
        self.min_length_tiles
    }

    /// Offset probed to detect a side resting on supporting geometry.
    #[must_use]
    pub const fn gravity_probe(&self) -> IVec2 {
        self.gravity_probe
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(1, IVec2::new(0, 1))
    }
}

/// Single extend or retract step requested for one actuator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActuationRequest {
    /// Actuator to move.
    pub actuator: ActuatorId,
    /// Whether to push the ends apart or pull them together.
    pub stroke: Stroke,
    /// Prefer moving the side that is not resting on anything.
    pub ground_bias: bool,
}

/// Errors reported for requests that cannot be evaluated at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ActuationError {
    /// The requested actuator does not exist.
    #[error("actuator {0:?} does not exist")]
    UnknownActuator(ActuatorId),
}

/// Pure system translating actuation requests into world commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Actuation {
    config: Config,
}

struct Side {
    parts: PartSet,
    offset: IVec2,
    free: bool,
}

impl Actuation {
    /// Creates a new actuation system using the supplied configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> Config {
        self.config
    }

    /// Evaluates `request` against `world` and emits the resulting commands.
    ///
    /// Nothing is emitted unless the outcome is [`ActuationOutcome::Ok`]. In
    /// that case `out` receives the translation of the chosen side, a refresh
    /// of the acting actuator and a flip of its tie-break flag, in that order.
    pub fn handle(
        &self,
        world: &World,
        request: ActuationRequest,
        out: &mut Vec<Command>,
    ) -> Result<ActuationOutcome, ActuationError> {
        let ActuationRequest {
            actuator: id,
            stroke,
            ground_bias,
        } = request;

        let actuator =
            query::actuator(world, id).ok_or(ActuationError::UnknownActuator(id))?;
        let length = query::actuator_length(world, id)
            .ok_or(ActuationError::UnknownActuator(id))?;

        if stroke == Stroke::Retract && length <= self.config.min_length_tiles * TILE_SIZE {
            debug!("actuator {id:?} is already at its minimum length {length}");
            return Ok(ActuationOutcome::AtMinLength);
        }

        let axis = actuator.axis();
        let step = axis.unit() * TILE_SIZE;
        let (offset_a, offset_b) = match stroke {
            Stroke::Extend => (-step, step),
            Stroke::Retract => (step, -step),
        };

        let colliders = Colliders::of(world);
        let Some(side_a) = resolve_side(world, id, Endpoint::A, offset_a, colliders) else {
            return Ok(ActuationOutcome::Stuck);
        };
        let Some(side_b) = resolve_side(world, id, Endpoint::B, offset_b, colliders) else {
            return Ok(ActuationOutcome::Stuck);
        };

        if !side_a.free && !side_b.free {
            debug!("actuator {id:?} is stuck: both sides blocked");
            return Ok(ActuationOutcome::Stuck);
        }

        let (ground_a, ground_b) = if ground_bias {
            let shared = |entity: EntityId| {
                side_a.parts.is_foreign(entity) && side_b.parts.is_foreign(entity)
            };
            let grounded = |side: &Side| {
                if side.offset == self.config.gravity_probe {
                    !side.free
                } else {
                    collides_if_moved(
                        world,
                        &side.parts,
                        self.config.gravity_probe,
                        colliders,
                        Some(&shared),
                    )
                }
            };
            (grounded(&side_a), grounded(&side_b))
        } else {
            (false, false)
        };

        let tie_break = actuator.tie_break();
        let mut move_b = !side_a.free
            || (side_b.free && (ground_a > ground_b || (ground_a == ground_b && tie_break)));

        if move_b && axis == Axis::Vertical && stroke == Stroke::Retract && side_a.free {
            let own = |entity: EntityId| side_b.parts.is_foreign(entity);
            if collides_if_moved(
                world,
                &side_b.parts,
                self.config.gravity_probe,
                colliders,
                Some(&own),
            ) {
                debug!("actuator {id:?}: side B rests on the ground, moving side A instead");
                move_b = false;
            }
        }

        let mover = if move_b { side_b } else { side_a };
        debug!(
            "actuator {id:?} {stroke:?}: moving side {:?} by {} (grounded a={ground_a} b={ground_b}, tie-break={tie_break})",
            if move_b { Endpoint::B } else { Endpoint::A },
            mover.offset,
        );

        out.push(Command::TranslateParts {
            parts: mover.parts,
            offset: mover.offset,
        });
        out.push(Command::RefreshActuator { actuator: id });
        out.push(Command::FlipTieBreak { actuator: id });

        Ok(ActuationOutcome::Ok)
    }
}

/// Resolves the parts attached to `end` and checks whether they can move by `offset`.
///
/// Returns `None` when the two ends are joined by a rigid loop.
fn resolve_side(
    world: &World,
    id: ActuatorId,
    end: Endpoint,
    offset: IVec2,
    colliders: Colliders<'_>,
) -> Option<Side> {
    let mut parts = connectivity::side(world, id, end);
    if parts.cycle_conflict() {
        debug!("actuator {id:?} closes a rigid loop, side {end:?} cannot separate");
        return None;
    }
    let _ = parts.detach_actuator(id);

    let own = |entity: EntityId| parts.is_foreign(entity);
    let free = !collides_if_moved(world, &parts, offset, colliders, Some(&own));
    Some(Side {
        parts,
        offset,
        free,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_probes_one_pixel_down() {
        let config = Config::default();
        assert_eq!(config.min_length_tiles(), 1);
        assert_eq!(config.gravity_probe(), IVec2::Y);
    }

    #[test]
    fn unknown_actuator_is_an_error() {
        let world = World::new();
        let mut commands = Vec::new();
        let missing = ActuatorId::new(7);

        let result = Actuation::default().handle(
            &world,
            ActuationRequest {
                actuator: missing,
                stroke: Stroke::Extend,
                ground_bias: false,
            },
            &mut commands,
        );

        assert_eq!(result, Err(ActuationError::UnknownActuator(missing)));
        assert!(commands.is_empty());
    }
}
