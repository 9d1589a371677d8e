/// Grid geometry for a whole-globe cylindrical raster.
/// Row 0 is the northern edge; column 0 sits at −180° longitude.
/// All coordinate math uses f64 for precision.
use std::f64::consts::PI;

/// Equatorial circumference of the Earth in km.
pub const EARTH_CIRCUMFERENCE_KM: f64 = 40_075.0;

/// A point on the sphere in geographic coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon {
    /// Latitude in degrees, -90 to +90.
    pub lat: f64,
    /// Longitude in degrees, -180 to +180.
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Latitude in degrees of the centre of `row`, via the inverse cylindrical
/// (Web-Mercator) projection:
///
///   lat = atan(sinh(π·(1 − 2·(row + 0.5)/height))) · 180/π
pub fn latitude_deg(row: usize, height: usize) -> f64 {
    let t = (row as f64 + 0.5) / height.max(1) as f64;
    (PI * (1.0 - 2.0 * t)).sinh().atan().to_degrees()
}

/// Longitude in degrees of the western edge of `col`: `(col/width)·360 − 180`.
pub fn longitude_deg(col: usize, width: usize) -> f64 {
    (col as f64 / width.max(1) as f64) * 360.0 - 180.0
}

/// Per-row latitudes, north to south. Every stage that needs latitude reads
/// from one of these tables instead of recomputing the projection per cell.
pub fn row_latitudes(height: usize) -> Vec<f64> {
    (0..height).map(|r| latitude_deg(r, height)).collect()
}

/// Row containing latitude `lat_deg`. Latitudes beyond the projection's
/// coverage clamp to the first or last row.
pub fn row_for_latitude(lat_deg: f64, height: usize) -> usize {
    if height == 0 {
        return 0;
    }
    let lat_rad = lat_deg.clamp(-89.999, 89.999).to_radians();
    let t = (1.0 - lat_rad.tan().asinh() / PI) / 2.0;
    let row = (t * height as f64).floor();
    row.clamp(0.0, (height - 1) as f64) as usize
}

/// Column containing longitude `lon_deg`; any longitude is accepted and
/// wrapped onto [−180°, 180°).
pub fn col_for_longitude(lon_deg: f64, width: usize) -> usize {
    if width == 0 {
        return 0;
    }
    let wrapped = (lon_deg + 180.0).rem_euclid(360.0);
    let col = (wrapped / 360.0 * width as f64).floor() as usize;
    col.min(width - 1)
}

/// Row-major cell index for a geographic coordinate.
pub fn cell_for_latlon(ll: LatLon, width: usize, height: usize) -> usize {
    row_for_latitude(ll.lat, height) * width + col_for_longitude(ll.lon, width)
}

/// Geographic coordinate of a cell (row centre, column western edge).
pub fn latlon_for_cell(index: usize, width: usize, height: usize) -> LatLon {
    let w = width.max(1);
    LatLon::new(latitude_deg(index / w, height), longitude_deg(index % w, width))
}

/// East-west spacing of one pixel at the equator, in km.
pub fn pixel_spacing_km(width: usize) -> f64 {
    EARTH_CIRCUMFERENCE_KM / width.max(1) as f64
}

/// Hermite smoothstep of `x` between `edge0` and `edge1`, in [0, 1].
#[inline]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latitudes_are_symmetric_and_decreasing() {
        let h = 64;
        let lats = row_latitudes(h);
        for r in 0..h {
            let mirrored = lats[h - 1 - r];
            assert!(
                (lats[r] + mirrored).abs() < 1e-9,
                "row {r}: lat {:.6} should mirror {:.6}",
                lats[r],
                mirrored
            );
        }
        for w in lats.windows(2) {
            assert!(w[0] > w[1], "latitude must decrease southward");
        }
        assert!(lats[0] < 90.0 && lats[h - 1] > -90.0);
    }

    #[test]
    fn row_roundtrip() {
        for h in [1usize, 3, 17, 256] {
            for r in 0..h {
                let lat = latitude_deg(r, h);
                assert_eq!(row_for_latitude(lat, h), r, "height {h} row {r} lat {lat:.4}");
            }
        }
    }

    #[test]
    fn longitude_wraps_into_grid() {
        let w = 360;
        assert_eq!(col_for_longitude(-180.0, w), 0);
        assert_eq!(col_for_longitude(180.0, w), 0);
        assert_eq!(col_for_longitude(179.5, w), 359);
        assert_eq!(col_for_longitude(540.0, w), 0);
        assert_eq!(col_for_longitude(-181.0, w), 359);
        for c in 0..w {
            assert_eq!(col_for_longitude(longitude_deg(c, w) + 0.5, w), c);
        }
    }

    #[test]
    fn polar_latitudes_clamp_to_edge_rows() {
        assert_eq!(row_for_latitude(90.0, 32), 0);
        assert_eq!(row_for_latitude(-90.0, 32), 31);
    }

    #[test]
    fn cell_latlon_roundtrip() {
        let (w, h) = (48, 24);
        for idx in [0usize, 47, 48, 500, w * h - 1] {
            let ll = latlon_for_cell(idx, w, h);
            let back = cell_for_latlon(LatLon::new(ll.lat, ll.lon + 0.1), w, h);
            assert_eq!(back, idx, "cell {idx} via {ll:?}");
        }
    }

    #[test]
    fn smoothstep_edges() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-12);
    }
}
