#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system splitting a structure into its connected fragments.
//!
//! The planner flood-fills the structure's solid tiles into fragments and
//! turns every piston track running between two anchors of different
//! fragments into an actuator. Tracks are queued under the tile at their far
//! end and resolved once the fill reaches that tile, which may happen while a
//! later fragment is being built.

use std::collections::BTreeMap;

use glam::IVec2;
use log::{info, trace};
use pistonworks_core::{
    canonical_ends, Axis, Command, Fragment, FragmentLink, StructureId, Tile, TileGrid, TILE_SIZE,
};
use pistonworks_world::{query, World};
use thiserror::Error;

const NEIGHBOURS: [IVec2; 4] = [IVec2::X, IVec2::Y, IVec2::NEG_X, IVec2::NEG_Y];

/// Fragments and actuators that replace a decomposed structure.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecompositionPlan {
    /// New structures, in the order their first tile appears in row-major order.
    pub fragments: Vec<Fragment>,
    /// Actuators joining fragments, in the order their tracks were discovered.
    pub links: Vec<FragmentLink>,
}

/// Errors reported for decomposition requests that cannot be evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum DecompositionError {
    /// The requested structure does not exist.
    #[error("structure {0:?} does not exist")]
    UnknownStructure(StructureId),
}

/// Pure system emitting structure replacement commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Decomposition;

impl Decomposition {
    /// Plans the decomposition of `structure` without emitting anything.
    pub fn plan(
        &self,
        world: &World,
        structure: StructureId,
    ) -> Result<DecompositionPlan, DecompositionError> {
        let state = query::structure(world, structure)
            .ok_or(DecompositionError::UnknownStructure(structure))?;
        Ok(decompose_grid(state.position(), state.grid()))
    }

    /// Emits the command replacing `structure` with its fragments.
    pub fn handle(
        &self,
        world: &World,
        structure: StructureId,
        out: &mut Vec<Command>,
    ) -> Result<(), DecompositionError> {
        let DecompositionPlan { fragments, links } = self.plan(world, structure)?;
        info!(
            "decomposing structure {structure:?} into {} fragments joined by {} actuators",
            fragments.len(),
            links.len()
        );
        out.push(Command::ReplaceStructure {
            structure,
            fragments,
            links,
        });
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
enum QueuedLink {
    Pending {
        axis: Axis,
        a: usize,
        corner_a: IVec2,
    },
    Resolved {
        axis: Axis,
        a: usize,
        corner_a: IVec2,
        b: usize,
        corner_b: IVec2,
    },
    Degenerate,
}

#[derive(Debug)]
struct Growing {
    origin: IVec2,
    grid: TileGrid,
}

impl Growing {
    fn new(origin: IVec2) -> Self {
        Self {
            origin,
            grid: TileGrid::new(1, 1),
        }
    }

    fn insert(&mut self, tile: IVec2, value: Tile) {
        let mut relative = tile - self.origin;
        let delta = self.grid.grow_to_include(relative);
        self.origin += delta;
        relative -= delta;
        self.grid.set(relative, value);
    }
}

/// Splits `grid`, placed at `position`, into 4-connected fragments of solid tiles.
///
/// Track tiles are not copied into any fragment. A track whose two anchors
/// end up in the same fragment produces no actuator.
///
/// # Panics
///
/// Panics if a queued track is still unresolved once every tile has been
/// visited, which means the grid itself is inconsistent.
#[must_use]
pub fn decompose_grid(position: IVec2, grid: &TileGrid) -> DecompositionPlan {
    let mut visited = vec![false; grid.iter().count()];
    let index = |tile: IVec2| (tile.y * grid.width() + tile.x) as usize;

    let mut fragments: Vec<Growing> = Vec::new();
    let mut queued: Vec<QueuedLink> = Vec::new();
    let mut arriving: BTreeMap<(i32, i32), Vec<usize>> = BTreeMap::new();

    for (seed, seed_tile) in grid.iter() {
        if !seed_tile.is_solid() || visited[index(seed)] {
            continue;
        }

        let current = fragments.len();
        let mut fragment = Growing::new(seed);
        let mut stack = vec![seed];

        while let Some(tile) = stack.pop() {
            let Some(value) = grid.get(tile).filter(|value| value.is_solid()) else {
                continue;
            };
            if visited[index(tile)] {
                continue;
            }
            visited[index(tile)] = true;
            fragment.insert(tile, value);

            for slot in arriving.remove(&(tile.x, tile.y)).unwrap_or_default() {
                let QueuedLink::Pending { axis, a, corner_a } = queued[slot] else {
                    panic!("track ending at tile {tile} was resolved twice");
                };
                queued[slot] = if a == current {
                    trace!("dropping track looping back into fragment {current}");
                    QueuedLink::Degenerate
                } else {
                    let corner_b = position + tile * TILE_SIZE;
                    let ((a, corner_a), (b, corner_b)) =
                        canonical_ends(axis, (a, corner_a), (current, corner_b));
                    QueuedLink::Resolved {
                        axis,
                        a,
                        corner_a,
                        b,
                        corner_b,
                    }
                };
            }

            if value.is_attachable() {
                for axis in Axis::ALL {
                    for step in [axis.unit(), -axis.unit()] {
                        let Some(far) = track_end(grid, tile, axis, step) else {
                            continue;
                        };
                        let reachable = grid.get(far).is_some_and(|far_tile| far_tile.is_attachable());
                        if !reachable || visited[index(far)] {
                            continue;
                        }
                        trace!("queueing {axis:?} track from tile {tile} to tile {far}");
                        arriving.entry((far.x, far.y)).or_default().push(queued.len());
                        queued.push(QueuedLink::Pending {
                            axis,
                            a: current,
                            corner_a: position + (tile + step) * TILE_SIZE,
                        });
                    }
                }
            }

            stack.extend(NEIGHBOURS.iter().map(|offset| tile + *offset));
        }

        trace!(
            "fragment {current} holds {} tiles",
            fragment.grid.solid_count()
        );
        fragments.push(fragment);
    }

    let fragments: Vec<Fragment> = fragments
        .into_iter()
        .map(|fragment| Fragment {
            position: position + fragment.origin * TILE_SIZE,
            grid: fragment.grid,
        })
        .collect();

    let links = queued
        .into_iter()
        .filter_map(|link| match link {
            QueuedLink::Resolved {
                axis,
                a,
                corner_a,
                b,
                corner_b,
            } => Some(FragmentLink {
                axis,
                a,
                b,
                offset_a: corner_a - fragments[a].position,
                offset_b: corner_b - fragments[b].position,
            }),
            QueuedLink::Degenerate => None,
            QueuedLink::Pending { axis, a, .. } => {
                panic!("{axis:?} track from fragment {a} never reached its far anchor")
            }
        })
        .collect();

    DecompositionPlan { fragments, links }
}

/// Walks the track starting next to `anchor` and returns the tile just past its end.
///
/// Returns `None` when no track of `axis` leaves `anchor` in direction `step`.
fn track_end(grid: &TileGrid, anchor: IVec2, axis: Axis, step: IVec2) -> Option<IVec2> {
    let mut last = anchor;
    while grid
        .get(last + step)
        .is_some_and(|tile| tile.track() == Some(axis))
    {
        last += step;
    }
    (last != anchor).then_some(last + step)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(rows: &[&str]) -> DecompositionPlan {
        decompose_grid(
            IVec2::ZERO,
            &TileGrid::from_rows(rows).expect("valid layout"),
        )
    }

    #[test]
    fn vertical_track_becomes_one_actuator() {
        let plan = plan(&["@", "|", "|", "@"]);

        assert_eq!(plan.fragments.len(), 2);
        assert_eq!(plan.fragments[0].position, IVec2::ZERO);
        assert_eq!(plan.fragments[1].position, IVec2::new(0, 3 * TILE_SIZE));
        assert_eq!(
            plan.links,
            vec![FragmentLink {
                axis: Axis::Vertical,
                a: 0,
                b: 1,
                offset_a: IVec2::new(0, TILE_SIZE),
                offset_b: IVec2::ZERO,
            }]
        );
    }

    #[test]
    fn track_discovered_from_far_end_is_reordered() {
        // The right anchor is filled first, so its track is queued leftwards.
        let plan = plan(&["..@", "..#", "@-@"]);
        let plan_links: Vec<_> = plan
            .links
            .iter()
            .map(|link| (link.axis, link.a, link.b))
            .collect();

        assert_eq!(plan.fragments.len(), 2);
        assert_eq!(plan_links, vec![(Axis::Horizontal, 1, 0)]);
        let link = plan.links[0];
        assert_eq!(
            plan.fragments[link.a].position + link.offset_a,
            IVec2::new(TILE_SIZE, 2 * TILE_SIZE)
        );
        assert_eq!(
            plan.fragments[link.b].position + link.offset_b,
            IVec2::new(2 * TILE_SIZE, 2 * TILE_SIZE)
        );
    }

    #[test]
    fn track_inside_one_fragment_is_dropped() {
        let plan = plan(&["@-@", "###"]);

        assert_eq!(plan.fragments.len(), 1);
        assert!(plan.links.is_empty());
        assert_eq!(plan.fragments[0].grid.to_rows(), vec!["@.@", "###"]);
    }

    #[test]
    fn track_ending_on_plain_solid_is_ignored() {
        let plan = plan(&["@--#"]);

        assert_eq!(plan.fragments.len(), 2);
        assert!(plan.links.is_empty());
    }

    #[test]
    fn empty_grid_has_no_fragments() {
        let plan = plan(&["..", ".|"]);
        assert_eq!(plan, DecompositionPlan::default());
    }

    #[test]
    fn fragment_grids_grow_toward_negative_coordinates() {
        // Seeded at the top right, the fill later reaches tiles left of it.
        let plan = plan(&["..#", "###"]);

        assert_eq!(plan.fragments.len(), 1);
        assert_eq!(plan.fragments[0].position, IVec2::ZERO);
        assert_eq!(plan.fragments[0].grid.to_rows(), vec!["..#", "###"]);
    }
}
