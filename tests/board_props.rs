use battleships::{Board, BoardError, Cell, FireResult, GridRef, CELL_COUNT, TOTAL_SHIP_CELLS};
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng, SeedableRng};

fn random_board(seed: u64) -> Board {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut board = Board::new();
    board.place_fleet_randomly(&mut rng).unwrap();
    let shots = rng.random_range(0..CELL_COUNT);
    for _ in 0..shots {
        let target = GridRef::from_index(rng.random_range(0..CELL_COUNT)).unwrap();
        let _ = board.fire_at(target);
    }
    board
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fleet_never_overlaps_and_stays_in_bounds(seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::new();
        let placements = board.place_fleet_randomly(&mut rng).unwrap();

        let mut covered = [false; CELL_COUNT];
        for placement in &placements {
            prop_assert!(placement.in_bounds());
            for i in placement.cells() {
                prop_assert!(!covered[i], "cell {} covered twice", i);
                covered[i] = true;
            }
        }
        for (i, cell) in board.cells().iter().enumerate() {
            prop_assert_eq!(*cell == Cell::Ship, covered[i]);
        }
        prop_assert_eq!(board.ship_cells_remaining(), TOTAL_SHIP_CELLS);
    }

    #[test]
    fn firing_at_hit_cell_is_rejected_without_mutation(seed in any::<u64>(), index in 0..CELL_COUNT) {
        let mut board = random_board(seed);
        let target = GridRef::from_index(index).unwrap();
        let _ = board.fire_at(target);

        match board.cell(target) {
            Cell::Hit => {
                let before = board.clone();
                prop_assert_eq!(board.fire_at(target).unwrap_err(), BoardError::AlreadyHit);
                prop_assert_eq!(board, before);
            }
            Cell::Miss => {
                prop_assert_eq!(board.fire_at(target).unwrap(), FireResult::Miss);
                prop_assert_eq!(board.cell(target), Cell::Miss);
            }
            other => prop_assert!(false, "cell still {:?} after firing", other),
        }
    }

    #[test]
    fn hits_plus_remaining_equals_fleet_size(seed in any::<u64>()) {
        let board = random_board(seed);
        let hits = board.cells().iter().filter(|c| **c == Cell::Hit).count();
        prop_assert_eq!(hits + board.ship_cells_remaining(), TOTAL_SHIP_CELLS);
    }
}
