use std::collections::HashSet;

use mazeweave::{
    MazeEngine,
    generators::{GenerationEvent, Generator},
    maze::SolveState,
    solvers::SolveEvent,
};
use proptest::prelude::*;

fn arb_generator() -> impl Strategy<Value = Generator> {
    prop::sample::select(Generator::ALL.to_vec())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn generated_maze_is_a_spanning_tree(
        height in 1u16..24,
        width in 1u16..24,
        generator in arb_generator(),
        seed in any::<u64>(),
    ) {
        let mut engine = MazeEngine::new(height, width, generator, seed).unwrap();
        let events = engine.generate().collect::<Vec<_>>();
        prop_assert_eq!(events.last(), Some(&GenerationEvent::GenerationComplete));

        let maze = engine.maze();
        prop_assert_eq!(maze.open_passage_count(), maze.cell_count() - 1);
        prop_assert!(maze.is_spanning_tree());

        let corners = [
            (0, 0),
            (0, width - 1),
            (height - 1, 0),
            (height - 1, width - 1),
        ];
        prop_assert!(corners.contains(&maze.start()));
        prop_assert!(corners.contains(&maze.stop()));
        prop_assert_eq!(
            (maze.start().0 + maze.stop().0, maze.start().1 + maze.stop().1),
            (height - 1, width - 1)
        );
    }

    #[test]
    fn generation_is_deterministic(
        height in 1u16..16,
        width in 1u16..16,
        generator in arb_generator(),
        seed in any::<u64>(),
    ) {
        let mut first = MazeEngine::new(height, width, generator, seed).unwrap();
        let mut second = MazeEngine::new(height, width, generator, seed).unwrap();
        let a = first.generate().collect::<Vec<_>>();
        let b = second.generate().collect::<Vec<_>>();
        prop_assert_eq!(a, b);
        prop_assert_eq!(first.maze().to_string(), second.maze().to_string());
    }

    #[test]
    fn solve_finds_a_simple_path(
        height in 1u16..20,
        width in 1u16..20,
        generator in arb_generator(),
        seed in any::<u64>(),
    ) {
        let mut engine = MazeEngine::new(height, width, generator, seed).unwrap();
        engine.generate().for_each(drop);

        let mut solve = engine.solve().unwrap();
        let mut dead = HashSet::new();
        let mut completed = false;
        for event in solve.by_ref() {
            match event {
                SolveEvent::CellMarkedDead(cell) => {
                    prop_assert!(dead.insert(cell));
                }
                SolveEvent::SolveComplete => completed = true,
                SolveEvent::CellMarkedOnPath(_) => {}
            }
        }
        prop_assert!(completed);
        let path = solve.path().to_vec();
        drop(solve);

        let maze = engine.maze();
        prop_assert_eq!(path.first(), Some(&maze.start()));
        prop_assert_eq!(path.last(), Some(&maze.stop()));
        let on_path = path.iter().copied().collect::<HashSet<_>>();
        prop_assert_eq!(on_path.len(), path.len());
        prop_assert!(on_path.is_disjoint(&dead));
        for pair in path.windows(2) {
            prop_assert!(
                maze.neighbors(pair[0])
                    .any(|(dir, next)| next == pair[1] && maze.is_open(pair[0], dir))
            );
        }
        for (coord, cell) in maze.iter() {
            prop_assert_eq!(cell.solve_state() == SolveState::OnPath, on_path.contains(&coord));
        }
    }

    #[test]
    fn bad_dimensions_leave_the_engine_alone(
        height in 1u16..10,
        width in 1u16..10,
        seed in any::<u64>(),
    ) {
        let mut engine = MazeEngine::new(height, width, Generator::Kruskal, seed).unwrap();
        engine.generate().for_each(drop);
        let before = engine.maze().to_string();
        prop_assert!(engine.configure(0, width, Generator::Prim, seed).is_err());
        prop_assert!(engine.configure(height, 0, Generator::Prim, seed).is_err());
        prop_assert_eq!(engine.maze().to_string(), before);
        prop_assert!(engine.is_generated());
    }
}
