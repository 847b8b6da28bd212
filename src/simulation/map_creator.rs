//! Creation of city maps with default street layouts

use anyhow::Result;
use log::debug;

use super::city_map::{CityMap, LightColor};

/// A creator for city maps
pub trait CityMapCreator {
    /// Create a city map for a given number of rows and columns
    fn create(&self, num_rows: i32, num_cols: i32) -> Result<CityMap>;
}

/// Creator of city maps with evenly spaced full street rows and columns
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCityMapCreator {
    /// Color of the traffic lights installed at cross roads, none if unset
    pub traffic_lights: Option<LightColor>,
}

impl DefaultCityMapCreator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_traffic_lights(color: LightColor) -> Self {
        Self {
            traffic_lights: Some(color),
        }
    }

    /// First street index and distance between streets along one dimension
    fn street_spacing(size: i32) -> (i32, i32) {
        if size % 5 == 0 || size % 5 == 4 {
            (2, 5)
        } else if size % 5 == 3 {
            (1, 5)
        } else if size % 3 == 0 {
            (1, 3)
        } else if size % 7 == 0 {
            (3, 7)
        } else {
            (3, 5)
        }
    }
}

impl CityMapCreator for DefaultCityMapCreator {
    fn create(&self, num_rows: i32, num_cols: i32) -> Result<CityMap> {
        let mut map = CityMap::new(num_rows, num_cols)?;

        let (first_row, row_step) = Self::street_spacing(num_rows);
        for row in (first_row..num_rows).step_by(row_step as usize) {
            map.place_street_row(row)?;
        }

        let (first_col, col_step) = Self::street_spacing(num_cols);
        for column in (first_col..num_cols).step_by(col_step as usize) {
            map.place_street_column(column)?;
        }

        if let Some(color) = self.traffic_lights {
            map.create_default_traffic_lights(color);
        }

        debug!(
            "Created {}x{} map with {} streets and {} traffic lights",
            num_cols,
            num_rows,
            map.street_count(),
            map.traffic_light_lanes().len()
        );

        Ok(map)
    }
}
