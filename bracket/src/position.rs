use crate::options::LayoutOptions;
use serde::Serialize;

/// Top-left corner of a match cell, in layout units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Offsets accumulated by the caller and added verbatim to a position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub fn vertical(y: f64) -> Self {
        Self { x: 0.0, y }
    }
}

/// Extra inputs for placing the grand final (and its reset game).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FinalGameExtra {
    pub offset_y: f64,
    pub lower_bracket_height: f64,
    pub upper_bracket_height: f64,
    /// Height of one match cell including its round header.
    pub game_height: f64,
}

/// `row` may be fractional: later rounds sit centered between their feeders.
pub fn upper_bracket_position(row: f64, column: u32, opts: &LayoutOptions, offset: Offset) -> Position {
    grid_position(row, column, opts, offset)
}

/// Same placement as the upper bracket. `column` is already the lower-bracket
/// layout column; no doubling happens here.
pub fn lower_bracket_position(row: f64, column: u32, opts: &LayoutOptions, offset: Offset) -> Position {
    grid_position(row, column, opts, offset)
}

/// Place a final game level with the vertical middle of the taller bracket half.
pub fn final_game_position(row: f64, column: u32, opts: &LayoutOptions, extra: FinalGameExtra) -> Position {
    let tallest = extra.upper_bracket_height.max(extra.lower_bracket_height);
    Position {
        x: opts.canvas_padding + f64::from(column) * opts.column_width,
        y: opts.canvas_padding
            + extra.offset_y
            + (tallest - extra.game_height) / 2.0
            + row * opts.row_height,
    }
}

fn grid_position(row: f64, column: u32, opts: &LayoutOptions, offset: Offset) -> Position {
    Position {
        x: opts.canvas_padding + f64::from(column) * opts.column_width + offset.x,
        y: opts.canvas_padding + row * opts.row_height + offset.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{parse_partial, resolve};

    fn scenario_opts() -> LayoutOptions {
        resolve(
            &parse_partial(
                r#"{"columnWidth":200,"rowHeight":80,"boxHeight":40,"canvasPadding":20,"roundSeparatorWidth":10,"horizontalOffset":5}"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn origin_cell_is_canvas_padding() {
        let opts = scenario_opts();
        assert_eq!(upper_bracket_position(0.0, 0, &opts, Offset::default()), Position::new(20.0, 20.0));
    }

    #[test]
    fn row_and_column_scale_by_cell_size() {
        let opts = scenario_opts();
        assert_eq!(upper_bracket_position(1.0, 2, &opts, Offset::default()), Position::new(420.0, 100.0));
    }

    #[test]
    fn lower_bracket_matches_upper_formula() {
        let opts = scenario_opts();
        for row in 0..4 {
            for column in 0..6 {
                let offset = Offset::vertical(320.0);
                assert_eq!(
                    lower_bracket_position(f64::from(row), column, &opts, offset),
                    upper_bracket_position(f64::from(row), column, &opts, offset),
                );
            }
        }
        let p = lower_bracket_position(0.0, 3, &opts, Offset::vertical(320.0));
        assert_eq!(p, Position::new(620.0, 340.0));
    }

    #[test]
    fn positions_are_monotonic_in_row_and_column() {
        let opts = scenario_opts();
        for column in 0..5u32 {
            for row in 0..8 {
                let here = upper_bracket_position(f64::from(row), column, &opts, Offset::default());
                let below = upper_bracket_position(f64::from(row + 1), column, &opts, Offset::default());
                let right = upper_bracket_position(f64::from(row), column + 1, &opts, Offset::default());
                assert!(below.y > here.y, "row {row} col {column}");
                assert_eq!(below.x, here.x);
                assert!(right.x > here.x, "row {row} col {column}");
                assert_eq!(right.y, here.y);
            }
        }
    }

    #[test]
    fn horizontal_offset_is_added_to_x() {
        let opts = scenario_opts();
        let p = upper_bracket_position(0.0, 1, &opts, Offset { x: 7.0, y: 3.0 });
        assert_eq!(p, Position::new(227.0, 23.0));
    }

    #[test]
    fn final_game_centers_on_taller_half() {
        let opts = scenario_opts();
        // 4 upper rows vs 2 lower rows: the upper half decides.
        let extra = FinalGameExtra {
            offset_y: 0.0,
            upper_bracket_height: 320.0,
            lower_bracket_height: 160.0,
            game_height: 80.0,
        };
        assert_eq!(final_game_position(0.0, 4, &opts, extra), Position::new(820.0, 140.0));

        let swapped = FinalGameExtra {
            upper_bracket_height: 160.0,
            lower_bracket_height: 320.0,
            ..extra
        };
        assert_eq!(final_game_position(0.0, 4, &opts, swapped).y, 140.0);
    }

    #[test]
    fn out_of_range_input_does_not_panic() {
        let opts = scenario_opts();
        let p = upper_bracket_position(-3.0, u32::MAX, &opts, Offset::default());
        assert!(p.x.is_finite() && p.y.is_finite());
        let f = final_game_position(-1.0, 0, &opts, FinalGameExtra::default());
        assert!(f.y.is_finite());
    }
}
