#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid pursuit for Cinderfall's blinking enemies.
//!
//! Pursuers do not walk. Whenever their blink timer expires they teleport one
//! grid cell along a breadth-first path toward the player, fade out after the
//! next interval and then blink again. Searches only run when a pursuer has
//! exhausted its path and no longer shares the player's cell.

mod bfs;

pub use bfs::GridPathfinder;

use cinderfall_core::{Command, Path, PlayerSnapshot, PursuerSnapshot};
use cinderfall_world::GridMap;

/// Pure system that advances pursuers whose blink timer expired.
#[derive(Debug, Default)]
pub struct Pursuit {
    pathfinder: GridPathfinder,
}

impl Pursuit {
    /// Emits exactly one command for every pursuer that is ready to act.
    ///
    /// Each emitted command rearms the pursuer's timer, so a pursuer never
    /// acts twice for the same expiry.
    pub fn handle(
        &mut self,
        pursuers: &[PursuerSnapshot],
        player: Option<&PlayerSnapshot>,
        grid: &GridMap,
        out: &mut Vec<Command>,
    ) {
        for pursuer in pursuers.iter().filter(|pursuer| pursuer.ready) {
            if pursuer.blinked {
                out.push(Command::FadePursuer {
                    pursuer: pursuer.id,
                });
                continue;
            }

            let mut path = pursuer.path.clone();
            if path.is_empty() {
                if let Some(player) = player {
                    let here = grid.world_to_grid(pursuer.position);
                    let prey = grid.world_to_grid(player.motion.position);
                    if here != prey {
                        path = self.pathfinder.find_path(grid, here, prey);
                    }
                }
            }

            let command = match path.pop_next() {
                // Standing on the next cell already: consume it without moving.
                Some(cell) if grid.grid_to_world(cell) == pursuer.position => {
                    Command::SetPursuerPath {
                        pursuer: pursuer.id,
                        path,
                    }
                }
                Some(cell) => Command::BlinkPursuer {
                    pursuer: pursuer.id,
                    destination: cell,
                    remaining: path,
                },
                None => Command::SetPursuerPath {
                    pursuer: pursuer.id,
                    path: Path::empty(),
                },
            };
            out.push(command);
        }
    }
}
