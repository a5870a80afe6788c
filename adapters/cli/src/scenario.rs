//! Scenario files describing terrain, ships and the actuation steps to replay.

use glam::IVec2;
use log::{debug, info};
use pistonworks_core::{
    ActuationOutcome, ActuatorId, Command, Event, GridParseError, Stroke, StructureId, TileGrid,
};
use pistonworks_system_actuation::{Actuation, ActuationError, ActuationRequest};
use pistonworks_system_decomposition::{Decomposition, DecompositionError};
use pistonworks_world::{self as world, query, World};
use serde::Deserialize;
use thiserror::Error;

/// Scenario as written in a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    /// Static terrain, if any.
    #[serde(default)]
    pub(crate) terrain: Option<TerrainSpec>,
    /// Ships to spawn and decompose, in order.
    #[serde(default)]
    pub(crate) ships: Vec<ShipSpec>,
    /// Actuation steps to replay, in order.
    #[serde(default)]
    pub(crate) steps: Vec<StepSpec>,
}

/// Terrain rows anchored at a pixel origin.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TerrainSpec {
    #[serde(default)]
    pub(crate) origin: IVec2,
    pub(crate) rows: Vec<String>,
}

/// Ship rows placed at a pixel position.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ShipSpec {
    #[serde(default)]
    pub(crate) position: IVec2,
    pub(crate) rows: Vec<String>,
}

/// One or more identical actuation requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct StepSpec {
    /// Index into the actuators present after every ship was decomposed,
    /// in ascending identifier order.
    pub(crate) actuator: usize,
    pub(crate) stroke: Stroke,
    #[serde(default)]
    pub(crate) ground_bias: bool,
    #[serde(default = "one")]
    pub(crate) repeat: u32,
}

fn one() -> u32 {
    1
}

impl Scenario {
    /// Parses a scenario from TOML text.
    pub(crate) fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

/// Errors raised while building or replaying a scenario.
#[derive(Debug, Error)]
pub(crate) enum ScenarioError {
    /// The terrain rows could not be parsed.
    #[error("invalid terrain layout")]
    InvalidTerrain(#[source] GridParseError),
    /// A ship's rows could not be parsed.
    #[error("invalid layout for ship {index}")]
    InvalidShip {
        /// Position of the ship in the scenario.
        index: usize,
        /// Underlying parse failure.
        #[source]
        source: GridParseError,
    },
    /// A step referred to an actuator that does not exist.
    #[error("step refers to actuator {index} but only {available} exist")]
    UnknownActuator {
        /// Requested index.
        index: usize,
        /// Number of actuators available.
        available: usize,
    },
    /// Actuation rejected a request.
    #[error(transparent)]
    Actuation(#[from] ActuationError),
    /// Decomposition rejected a request.
    #[error(transparent)]
    Decomposition(#[from] DecompositionError),
}

/// Outcome of a single replayed actuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StepReport {
    pub(crate) actuator: ActuatorId,
    pub(crate) stroke: Stroke,
    pub(crate) outcome: ActuationOutcome,
}

/// World built from a scenario together with the systems that drive it.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    actuation: Actuation,
    actuators: Vec<ActuatorId>,
}

impl Simulation {
    /// Spawns the scenario's terrain and ships, then decomposes every ship.
    pub(crate) fn build(scenario: &Scenario) -> Result<Self, ScenarioError> {
        let mut world = World::new();

        if let Some(terrain) = &scenario.terrain {
            let grid = TileGrid::from_rows(terrain.rows.as_slice())
                .map_err(ScenarioError::InvalidTerrain)?;
            let _ = pump(
                &mut world,
                vec![Command::ConfigureTerrain {
                    origin: terrain.origin,
                    grid,
                }],
            );
        }

        let mut ships = Vec::with_capacity(scenario.ships.len());
        for (index, ship) in scenario.ships.iter().enumerate() {
            let grid = TileGrid::from_rows(ship.rows.as_slice())
                .map_err(|source| ScenarioError::InvalidShip { index, source })?;
            let events = pump(
                &mut world,
                vec![Command::SpawnStructure {
                    position: ship.position,
                    grid,
                }],
            );
            ships.extend(events.iter().filter_map(|event| match event {
                Event::StructureSpawned { structure } => Some(*structure),
                _ => None,
            }));
        }

        for ship in ships {
            decompose(&mut world, ship)?;
        }

        let actuators = query::actuator_ids(&world);
        info!(
            "scenario built with {} structures and {} actuators",
            query::structure_ids(&world).len(),
            actuators.len()
        );

        Ok(Self {
            world,
            actuation: Actuation::default(),
            actuators,
        })
    }

    /// Current world state.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Replays one step, once per repetition.
    pub(crate) fn step(&mut self, step: &StepSpec) -> Result<Vec<StepReport>, ScenarioError> {
        let actuator = *self
            .actuators
            .get(step.actuator)
            .ok_or(ScenarioError::UnknownActuator {
                index: step.actuator,
                available: self.actuators.len(),
            })?;

        let mut reports = Vec::with_capacity(step.repeat as usize);
        for _ in 0..step.repeat {
            let mut commands = Vec::new();
            let outcome = self.actuation.handle(
                &self.world,
                ActuationRequest {
                    actuator,
                    stroke: step.stroke,
                    ground_bias: step.ground_bias,
                },
                &mut commands,
            )?;
            let events = pump(&mut self.world, commands);
            debug!("{actuator:?} {:?} -> {outcome:?} ({} events)", step.stroke, events.len());
            reports.push(StepReport {
                actuator,
                stroke: step.stroke,
                outcome,
            });
        }
        Ok(reports)
    }
}

fn decompose(world: &mut World, ship: StructureId) -> Result<(), ScenarioError> {
    let mut commands = Vec::new();
    Decomposition.handle(world, ship, &mut commands)?;
    let _ = pump(world, commands);
    Ok(())
}

/// Applies every command in order and returns the events they produced.
fn pump(world: &mut World, commands: Vec<Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}
