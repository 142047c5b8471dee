/// Wrap a longitude into [-180, 180)
#[inline(always)]
pub fn wrap_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Signed longitude change from `from` to `to` along the shorter way round
#[inline(always)]
pub fn shortest_lon_delta(from: f64, to: f64) -> f64 {
    wrap_lon(to - from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_lon() {
        assert_eq!(wrap_lon(190.0), -170.0);
        assert_eq!(wrap_lon(-190.0), 170.0);
        assert_eq!(wrap_lon(37.5), 37.5);
    }

    #[test]
    fn test_shortest_delta_crosses_antimeridian() {
        assert_eq!(shortest_lon_delta(170.0, -170.0), 20.0);
        assert_eq!(shortest_lon_delta(-170.0, 170.0), -20.0);
        assert_eq!(shortest_lon_delta(10.0, 40.0), 30.0);
    }
}
