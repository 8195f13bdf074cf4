//! Board construction: 20 tiles with a fixed category mix at shuffled
//! positions.

use fin_core::{ProjectCard, SpecialAction, Tile, TileKind};
use rand::seq::SliceRandom;
use rand::Rng;

pub const BOARD_SIZE: usize = 20;
pub const INVESTMENT_TILES: usize = 8;
pub const FINANCING_TILES: usize = 2;
pub const EVENT_TILES: usize = 4;
pub const NEUTRAL_TILES: usize = 4;
pub const SPECIAL_TILES: usize = 2;

/// Builds the board: positions are shuffled once and sliced into the fixed
/// per-category counts. Investment tiles cycle through the project list by
/// index, so the algorithm tolerates a project list shorter or longer than
/// eight. The first two entries of the special slice become the IPO and
/// Strategy tiles, in that order, so which comes first on the board varies
/// between games.
pub fn build_board(projects: &[ProjectCard], rng: &mut impl Rng) -> Vec<Tile> {
    debug_assert!(!projects.is_empty());
    debug_assert_eq!(
        INVESTMENT_TILES + FINANCING_TILES + EVENT_TILES + NEUTRAL_TILES + SPECIAL_TILES,
        BOARD_SIZE
    );

    let mut positions: Vec<usize> = (0..BOARD_SIZE).collect();
    positions.shuffle(rng);

    let mut tiles: Vec<Option<Tile>> = vec![None; BOARD_SIZE];
    let mut slice = positions.as_slice();
    let mut take = |n: usize| {
        let (head, rest) = slice.split_at(n);
        slice = rest;
        head.to_vec()
    };

    for (i, pos) in take(INVESTMENT_TILES).into_iter().enumerate() {
        let idx = i % projects.len();
        tiles[pos] = Some(Tile {
            position: pos,
            name: format!("Investment: {}", projects[idx].name),
            kind: TileKind::Investment(idx),
        });
    }
    for pos in take(FINANCING_TILES) {
        tiles[pos] = Some(Tile {
            position: pos,
            name: "Financing Opportunity".to_string(),
            kind: TileKind::Financing,
        });
    }
    for pos in take(EVENT_TILES) {
        tiles[pos] = Some(Tile {
            position: pos,
            name: "Market Event".to_string(),
            kind: TileKind::Event,
        });
    }
    for pos in take(NEUTRAL_TILES) {
        tiles[pos] = Some(Tile {
            position: pos,
            name: "Revenue Collection".to_string(),
            kind: TileKind::Neutral,
        });
    }
    let special = take(SPECIAL_TILES);
    tiles[special[0]] = Some(Tile {
        position: special[0],
        name: "IPO Opportunity".to_string(),
        kind: TileKind::Special(SpecialAction::Ipo),
    });
    tiles[special[1]] = Some(Tile {
        position: special[1],
        name: "Strategic Decision".to_string(),
        kind: TileKind::Special(SpecialAction::Strategy),
    });

    // Every position was assigned exactly once above.
    tiles.into_iter().map(|t| t.unwrap()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_projects;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn count(board: &[Tile], pred: impl Fn(&TileKind) -> bool) -> usize {
        board.iter().filter(|t| pred(&t.kind)).count()
    }

    #[test]
    fn composition_is_fixed_regardless_of_seed() {
        let projects = default_projects();
        for seed in [0u64, 1, 7, 42, 1234, u64::MAX] {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let board = build_board(&projects, &mut rng);
            assert_eq!(board.len(), BOARD_SIZE);
            assert_eq!(
                count(&board, |k| matches!(k, TileKind::Investment(_))),
                INVESTMENT_TILES
            );
            assert_eq!(
                count(&board, |k| matches!(k, TileKind::Financing)),
                FINANCING_TILES
            );
            assert_eq!(count(&board, |k| matches!(k, TileKind::Event)), EVENT_TILES);
            assert_eq!(
                count(&board, |k| matches!(k, TileKind::Neutral)),
                NEUTRAL_TILES
            );
            assert_eq!(
                count(&board, |k| matches!(k, TileKind::Special(_))),
                SPECIAL_TILES
            );

            let positions: HashSet<usize> = board.iter().map(|t| t.position).collect();
            assert_eq!(positions.len(), BOARD_SIZE);
            for (i, tile) in board.iter().enumerate() {
                assert_eq!(tile.position, i);
            }
        }
    }

    #[test]
    fn both_special_roles_are_present() {
        let projects = default_projects();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let board = build_board(&projects, &mut rng);
        let ipo = count(&board, |k| matches!(k, TileKind::Special(SpecialAction::Ipo)));
        let strat = count(&board, |k| {
            matches!(k, TileKind::Special(SpecialAction::Strategy))
        });
        assert_eq!((ipo, strat), (1, 1));
    }

    proptest! {
        #[test]
        fn positions_cover_the_board_for_any_seed(seed in any::<u64>()) {
            let projects = default_projects();
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let board = build_board(&projects, &mut rng);
            let positions: HashSet<usize> = board.iter().map(|t| t.position).collect();
            prop_assert_eq!(positions.len(), BOARD_SIZE);
            prop_assert_eq!(
                count(&board, |k| matches!(k, TileKind::Investment(_))),
                INVESTMENT_TILES
            );
        }
    }

    #[test]
    fn investment_tiles_cycle_through_short_project_lists() {
        let projects = default_projects()[..3].to_vec();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let board = build_board(&projects, &mut rng);
        for tile in &board {
            if let TileKind::Investment(idx) = tile.kind {
                assert!(idx < projects.len());
            }
        }
    }
}
