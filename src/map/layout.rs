//! # Column Layout
//!
//! Assigns drawing coordinates before any links exist: one x per layer spread
//! across the usable canvas width, and for every interior layer a random node
//! count with heights that keep a minimum gap inside the column.

use crate::MapConfig;
use log::trace;
use rand::{rngs::StdRng, Rng};

/// Geometry of a single column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub layer: usize,
    pub x: i32,
    /// Node heights, ascending
    pub ys: Vec<i32>,
    /// Set when rejection sampling gave up and the heights were spread evenly
    pub evenly_spaced: bool,
}

impl ColumnLayout {
    pub fn node_count(&self) -> usize {
        self.ys.len()
    }
}

/// Plans the column geometry of one candidate map.
#[derive(Debug, Clone)]
pub struct LayoutPlanner<'a> {
    config: &'a MapConfig,
}

impl<'a> LayoutPlanner<'a> {
    /// `config` must have passed [`MapConfig::validate`].
    pub fn new(config: &'a MapConfig) -> Self {
        Self { config }
    }

    /// X coordinate of every layer, interpolated across the usable width.
    ///
    /// # Examples
    ///
    /// ```
    /// use infernal_path::{LayoutPlanner, MapConfig};
    ///
    /// let config = MapConfig::new();
    /// let xs = LayoutPlanner::new(&config).column_xs(7);
    /// assert_eq!(xs.first(), Some(&60));
    /// assert_eq!(xs.last(), Some(&740));
    /// ```
    pub fn column_xs(&self, layer_count: usize) -> Vec<i32> {
        let margin = self.config.margin_x;
        if layer_count <= 1 {
            return vec![margin; layer_count];
        }

        let usable = f64::from(self.config.canvas_width) - 2.0 * f64::from(margin);
        let last = (layer_count - 1) as f64;
        (0..layer_count)
            .map(|i| (f64::from(margin) + usable * (i as f64 / last)).round() as i32)
            .collect()
    }

    /// Plans all columns: a single start node, interior columns with a random
    /// node count, and a single castle node at a random height.
    pub fn plan(&self, layer_count: usize, rng: &mut StdRng) -> Vec<ColumnLayout> {
        let xs = self.column_xs(layer_count);
        let last = layer_count.saturating_sub(1);

        xs.into_iter()
            .enumerate()
            .map(|(layer, x)| {
                if layer == 0 {
                    ColumnLayout {
                        layer,
                        x,
                        ys: vec![self.config.start_y],
                        evenly_spaced: false,
                    }
                } else if layer == last {
                    let y = rng.gen_range(self.config.castle_y_min..=self.config.castle_y_max);
                    ColumnLayout {
                        layer,
                        x,
                        ys: vec![y],
                        evenly_spaced: false,
                    }
                } else {
                    let count = rng.gen_range(
                        self.config.min_nodes_per_layer..=self.config.max_nodes_per_layer,
                    );
                    let (ys, evenly_spaced) = self.place_column(count, rng);
                    if evenly_spaced {
                        trace!("layer {layer}: spacing {count} nodes evenly");
                    }
                    ColumnLayout {
                        layer,
                        x,
                        ys,
                        evenly_spaced,
                    }
                }
            })
            .collect()
    }

    /// Picks `count` heights at least `min_gap` apart by rejection sampling.
    ///
    /// Returns the heights in ascending order and whether the evenly spaced
    /// fallback was used.
    pub fn place_column(&self, count: usize, rng: &mut StdRng) -> (Vec<i32>, bool) {
        let config = self.config;
        let mut ys: Vec<i32> = Vec::with_capacity(count);
        let mut tries = 0;

        while ys.len() < count && tries < config.placement_tries {
            tries += 1;
            let y = rng.gen_range(config.min_y..=config.max_y);
            if ys.iter().all(|&v| v.abs_diff(y) >= config.min_gap.unsigned_abs()) {
                ys.push(y);
            }
        }

        if ys.len() < count {
            return (evenly_spaced(count, config.min_y, config.max_y), true);
        }

        ys.sort_unstable();
        (ys, false)
    }
}

/// Spreads `count` heights evenly between `min_y` and `max_y`, exclusive.
pub fn evenly_spaced(count: usize, min_y: i32, max_y: i32) -> Vec<i32> {
    let step = (f64::from(max_y) - f64::from(min_y)) / (count + 1) as f64;
    (1..=count)
        .map(|i| (f64::from(min_y) + step * i as f64).round() as i32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_column_xs_span_the_usable_width() {
        let config = MapConfig::new();
        let xs = LayoutPlanner::new(&config).column_xs(5);
        assert_eq!(xs, vec![60, 230, 400, 570, 740]);
    }

    #[test]
    fn test_plan_has_single_start_and_castle_columns() {
        let config = MapConfig::new();
        let mut rng = StdRng::seed_from_u64(7);
        let columns = LayoutPlanner::new(&config).plan(8, &mut rng);

        assert_eq!(columns.len(), 8);
        assert_eq!(columns[0].ys, vec![config.start_y]);
        assert_eq!(columns[7].node_count(), 1);
        assert!((config.castle_y_min..=config.castle_y_max).contains(&columns[7].ys[0]));

        for column in &columns[1..7] {
            assert!((1..=3).contains(&column.node_count()));
        }
    }

    #[test]
    fn test_place_column_keeps_gap() {
        let config = MapConfig::new();
        let planner = LayoutPlanner::new(&config);
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..200 {
            let (ys, evenly) = planner.place_column(3, &mut rng);
            assert_eq!(ys.len(), 3);
            assert!(ys.windows(2).all(|w| w[0] < w[1]));
            if !evenly {
                assert!(ys.windows(2).all(|w| w[1] - w[0] >= config.min_gap));
            }
        }
    }

    #[test]
    fn test_place_column_falls_back_when_gap_cannot_fit() {
        let config = MapConfig {
            min_y: 0,
            max_y: 40,
            min_gap: 30,
            ..MapConfig::new()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let (ys, evenly) = LayoutPlanner::new(&config).place_column(3, &mut rng);

        assert!(evenly);
        assert_eq!(ys, vec![10, 20, 30]);
    }

    #[test]
    fn test_evenly_spaced() {
        assert_eq!(evenly_spaced(1, 50, 210), vec![130]);
        assert_eq!(evenly_spaced(3, 50, 210), vec![90, 130, 170]);
        assert_eq!(evenly_spaced(1, i32::MIN + 1, i32::MAX), vec![0]);
    }

    #[test]
    fn test_widest_allowed_range_places_columns() {
        let config = MapConfig {
            min_y: -crate::MAX_COORDINATE,
            max_y: crate::MAX_COORDINATE,
            ..MapConfig::new()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let columns = LayoutPlanner::new(&config).plan(10, &mut rng);

        for column in &columns[1..9] {
            assert!(column.ys.windows(2).all(|w| w[0] < w[1]));
            assert!(column.ys.iter().all(|y| (config.min_y..=config.max_y).contains(y)));
        }
    }
}
