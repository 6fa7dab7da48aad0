use crate::{
    generators::{GenerationEvent, RegionTracker, RunContext, Step, Strategy},
    maze::{Coord, Direction, Maze},
};

/// Randomized Kruskal's algorithm.
///
/// Every interior wall is visited once in a shuffled order, which samples
/// walls without ever drawing the same one twice. A wall is removed only if
/// the cells on both sides still belong to different regions.
#[derive(Default)]
pub(crate) struct Kruskal {
    /// Walls not looked at yet, as the cell owning them and the direction
    /// of the neighbor on the other side.
    walls: Vec<(Coord, Direction)>,
    regions: Option<RegionTracker>,
    merges: usize,
}

impl Kruskal {
    /// Writes the final region ids back into the cells.
    fn relabel(maze: &mut Maze, regions: &mut RegionTracker) {
        for idx in 0..maze.cell_count() {
            let root = regions.find(idx);
            maze.set_region(maze.coord_of(idx), root);
        }
    }
}

impl Strategy for Kruskal {
    fn start(&mut self, maze: &mut Maze, ctx: &mut RunContext) {
        let (height, width) = (maze.height(), maze.width());
        self.walls = (0..height)
            .flat_map(|row| (0..width).map(move |col| (row, col)))
            .flat_map(|(row, col)| {
                [
                    (col + 1 < width).then_some(((row, col), Direction::Right)),
                    (row + 1 < height).then_some(((row, col), Direction::Down)),
                ]
            })
            .flatten()
            .collect();
        ctx.rng.shuffle(&mut self.walls);
        self.regions = Some(RegionTracker::new(maze.cell_count()));

        if maze.cell_count() == 1 {
            // No wall to remove, the only cell is the whole maze
            ctx.enter(maze, (0, 0));
        }
    }

    fn step(&mut self, maze: &mut Maze, ctx: &mut RunContext) -> Step {
        let Some(regions) = self.regions.as_mut() else {
            unreachable!("kruskal stepped before start");
        };

        if self.merges + 1 >= maze.cell_count() {
            Kruskal::relabel(maze, regions);
            return Step::Done;
        }

        while let Some((cell, dir)) = self.walls.pop() {
            let Some(next) = maze.neighbor(cell, dir) else {
                unreachable!("wall {} of {:?} is on the border", dir, cell);
            };
            let Some((loser, winner)) = regions.union(maze.index_of(cell), maze.index_of(next))
            else {
                // Both sides are already connected, removing it would create a cycle
                continue;
            };

            maze.open_passage(cell, dir);
            for coord in [cell, next] {
                if !maze[coord].visited() {
                    ctx.enter(maze, coord);
                }
            }
            ctx.emit(GenerationEvent::PassageOpened(cell, dir));
            ctx.emit(GenerationEvent::RegionsMerged { loser, winner });
            self.merges += 1;
            return Step::Continue;
        }

        unreachable!(
            "ran out of walls with {} regions left",
            regions.region_count()
        );
    }

    fn region_of(&mut self, maze: &Maze, cell: Coord) -> Option<u32> {
        let regions = self.regions.as_mut()?;
        Some(regions.find(maze.index_of(cell)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(maze: &mut Maze, seed: u64) -> RunContext {
        let mut ctx = RunContext::new(seed);
        let mut kruskal = Kruskal::default();
        kruskal.start(maze, &mut ctx);
        while kruskal.step(maze, &mut ctx) == Step::Continue {}
        ctx
    }

    #[test]
    fn test_randomized_kruskal() {
        let mut maze = Maze::new(10, 15).unwrap();
        let mut ctx = run(&mut maze, 21);
        assert!(maze.is_spanning_tree());
        assert_eq!(ctx.visited(), 150);

        let merges = ctx
            .events
            .drain(..)
            .filter(|event| matches!(event, GenerationEvent::RegionsMerged { .. }))
            .count();
        assert_eq!(merges, 149);
    }

    #[test]
    fn test_all_cells_share_a_region() {
        let mut maze = Maze::new(6, 4).unwrap();
        run(&mut maze, 2);
        let region = maze[(0, 0)].region_id();
        assert!(maze.iter().all(|(_, cell)| cell.region_id() == region));
    }

    #[test]
    fn test_live_regions_follow_merges() {
        let mut maze = Maze::new(5, 6).unwrap();
        let mut ctx = RunContext::new(13);
        let mut kruskal = Kruskal::default();
        kruskal.start(&mut maze, &mut ctx);

        let mut merges = 0;
        while kruskal.step(&mut maze, &mut ctx) == Step::Continue {
            let mut opened = None;
            for event in ctx.events.drain(..) {
                match event {
                    GenerationEvent::PassageOpened(cell, dir) => opened = Some((cell, dir)),
                    GenerationEvent::RegionsMerged { loser, winner } => {
                        let (cell, dir) = opened.take().unwrap();
                        let next = maze.neighbor(cell, dir).unwrap();
                        assert_ne!(loser, winner);
                        assert_eq!(kruskal.region_of(&maze, cell), Some(winner));
                        assert_eq!(kruskal.region_of(&maze, next), Some(winner));
                        merges += 1;
                    }
                    _ => {}
                }
            }
        }
        assert_eq!(merges, 29);
        for (coord, cell) in maze.iter() {
            assert_eq!(kruskal.region_of(&maze, coord), Some(cell.region_id()));
        }
    }

    #[test]
    fn test_single_cell() {
        let mut maze = Maze::new(1, 1).unwrap();
        let ctx = run(&mut maze, 0);
        assert_eq!(ctx.visited(), 1);
        assert_eq!(maze.open_passage_count(), 0);
    }
}
