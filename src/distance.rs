// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::f64::consts::PI;

/// Mean radius of Earth, in kilometers.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_RADIUS: f64 = 6371.0088;

/// Mean diameter of Earth, in kilometers.
/// Source: https://en.wikipedia.org/wiki/Earth_radius#Arithmetic_mean_radius
const EARTH_DIAMETER: f64 = EARTH_RADIUS + EARTH_RADIUS;

/// Number of distinct values along one axis of the 31-bit projection.
const TILES_31: f64 = (1u64 << 31) as f64;

/// Latitude limit of the Web Mercator projection.
const MAX_LATITUDE: f64 = 85.0511;

/// Calculates the great-circle distance between two lat-lon positions
/// on Earth using the `haversine formula <https://en.wikipedia.org/wiki/Haversine_formula>`_.
/// Returns the result in kilometers.
pub fn earth_distance(lat1: f32, lon1: f32, lat2: f32, lon2: f32) -> f32 {
    let lat1 = (lat1 as f64).to_radians();
    let lon1 = (lon1 as f64).to_radians();
    let lat2 = (lat2 as f64).to_radians();
    let lon2 = (lon2 as f64).to_radians();

    let sin_dlat_half = ((lat2 - lat1) * 0.5).sin();
    let sin_dlon_half = ((lon2 - lon1) * 0.5).sin();

    let h = sin_dlat_half * sin_dlat_half + lat1.cos() * lat2.cos() * sin_dlon_half * sin_dlon_half;

    (EARTH_DIAMETER * h.sqrt().asin()) as f32
}

/// Converts a longitude into the x coordinate of the 31-bit
/// [Web Mercator](https://en.wikipedia.org/wiki/Web_Mercator_projection) projection.
pub fn x31_from_lon(lon: f64) -> u32 {
    let lon = lon.clamp(-180.0, 180.0);
    let x = (lon + 180.0) / 360.0 * TILES_31;
    x.clamp(0.0, TILES_31 - 1.0) as u32
}

/// Converts a latitude into the y coordinate of the 31-bit
/// [Web Mercator](https://en.wikipedia.org/wiki/Web_Mercator_projection) projection.
/// The y axis grows southwards.
pub fn y31_from_lat(lat: f64) -> u32 {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let eval = (lat.tan() + 1.0 / lat.cos()).ln().min(PI);
    let y = (1.0 - eval / PI) / 2.0 * TILES_31;
    y.clamp(0.0, TILES_31 - 1.0) as u32
}

/// Inverse of [x31_from_lon].
pub fn lon_from_x31(x31: u32) -> f64 {
    x31 as f64 / TILES_31 * 360.0 - 180.0
}

/// Inverse of [y31_from_lat].
pub fn lat_from_y31(y31: u32) -> f64 {
    let n = PI - 2.0 * PI * y31 as f64 / TILES_31;
    n.sinh().atan().to_degrees()
}

/// Distance in meters between two points of the 31-bit projection.
pub fn measured_distance_31(x1: u32, y1: u32, x2: u32, y2: u32) -> f32 {
    if x1 == x2 && y1 == y2 {
        return 0.0;
    }
    1000.0
        * earth_distance(
            lat_from_y31(y1) as f32,
            lon_from_x31(x1) as f32,
            lat_from_y31(y2) as f32,
            lon_from_x31(x2) as f32,
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_almost_eq {
        ($a:expr, $b:expr, $eps:expr) => {
            assert!(
                (($a - $b).abs() < $eps),
                "assertion failed: {} ≈ {}",
                $a,
                $b
            )
        };
    }

    #[test]
    fn projection_round_trip() {
        let x = x31_from_lon(7.4246);
        let y = y31_from_lat(43.7384);
        assert_almost_eq!(lon_from_x31(x), 7.4246, 1e-6);
        assert_almost_eq!(lat_from_y31(y), 43.7384, 1e-6);
    }

    #[test]
    fn projection_axes() {
        assert_eq!(x31_from_lon(-180.0), 0);
        assert_eq!(x31_from_lon(0.0), 1 << 30);
        assert_eq!(y31_from_lat(0.0), 1 << 30);
        assert!(y31_from_lat(10.0) < y31_from_lat(-10.0));
    }

    #[test]
    fn measured_distance() {
        // One degree of longitude along the equator is roughly 111.2 km
        let d = measured_distance_31(
            x31_from_lon(0.0),
            y31_from_lat(0.0),
            x31_from_lon(1.0),
            y31_from_lat(0.0),
        );
        assert_almost_eq!(d, 111_195.0, 100.0);
        assert_eq!(measured_distance_31(5, 5, 5, 5), 0.0);
    }
}
