//! Reuse rules for cached measurements of measure-function nodes.
use crate::layout::CachedMeasurement;
use crate::rounding::round_value_to_pixel_grid;
use trellis_types::{MeasureMode, floats_equal};

fn exact_and_matches_old_measured_size(mode: MeasureMode, size: f32, last_computed: f32) -> bool {
    mode == MeasureMode::Exactly && floats_equal(size, last_computed)
}

fn old_size_unspecified_and_still_fits(
    mode: MeasureMode,
    size: f32,
    last_mode: MeasureMode,
    last_computed: f32,
) -> bool {
    mode == MeasureMode::AtMost
        && last_mode == MeasureMode::Undefined
        && (size >= last_computed || floats_equal(size, last_computed))
}

fn new_size_stricter_and_still_valid(
    mode: MeasureMode,
    size: f32,
    last_mode: MeasureMode,
    last_size: f32,
    last_computed: f32,
) -> bool {
    last_mode == MeasureMode::AtMost
        && mode == MeasureMode::AtMost
        && !last_size.is_nan()
        && !size.is_nan()
        && !last_computed.is_nan()
        && last_size > size
        && (last_computed <= size || floats_equal(size, last_computed))
}

/// The constraints of one measurement request.
#[derive(Debug, Clone, Copy)]
pub struct MeasureRequest {
    pub width_mode: MeasureMode,
    pub width: f32,
    pub height_mode: MeasureMode,
    pub height: f32,
}

/// Decides whether `cached` answers `request`.
///
/// Besides an identical request, an entry is reused when the new constraint
/// is exact and equals the old result, when an unconstrained result fits a
/// new upper bound, or when a tighter upper bound still contains the old
/// result. `margin_row` and `margin_column` are subtracted from the requested
/// sizes before the relaxed checks. A non-zero `point_scale_factor` compares
/// requested sizes after snapping them to the pixel grid.
pub fn can_use_cached_measurement(
    request: MeasureRequest,
    cached: &CachedMeasurement,
    margin_row: f32,
    margin_column: f32,
    point_scale_factor: f32,
) -> bool {
    if (!cached.computed_height.is_nan() && cached.computed_height < 0.0)
        || (!cached.computed_width.is_nan() && cached.computed_width < 0.0)
    {
        return false;
    }

    let snap = |v: f32| {
        if point_scale_factor != 0.0 {
            round_value_to_pixel_grid(v, point_scale_factor, false, false)
        } else {
            v
        }
    };

    let same_width_spec = cached.width_mode == request.width_mode
        && floats_equal(snap(cached.available_width), snap(request.width));
    let same_height_spec = cached.height_mode == request.height_mode
        && floats_equal(snap(cached.available_height), snap(request.height));

    let width = request.width - margin_row;
    let width_compatible = same_width_spec
        || exact_and_matches_old_measured_size(request.width_mode, width, cached.computed_width)
        || old_size_unspecified_and_still_fits(
            request.width_mode,
            width,
            cached.width_mode,
            cached.computed_width,
        )
        || new_size_stricter_and_still_valid(
            request.width_mode,
            width,
            cached.width_mode,
            cached.available_width,
            cached.computed_width,
        );

    let height = request.height - margin_column;
    let height_compatible = same_height_spec
        || exact_and_matches_old_measured_size(request.height_mode, height, cached.computed_height)
        || old_size_unspecified_and_still_fits(
            request.height_mode,
            height,
            cached.height_mode,
            cached.computed_height,
        )
        || new_size_stricter_and_still_valid(
            request.height_mode,
            height,
            cached.height_mode,
            cached.available_height,
            cached.computed_height,
        );

    width_compatible && height_compatible
}

/// Strict match used for container nodes: same modes and epsilon-equal sizes.
pub fn matches_exactly(request: MeasureRequest, cached: &CachedMeasurement) -> bool {
    floats_equal(cached.available_width, request.width)
        && floats_equal(cached.available_height, request.height)
        && cached.width_mode == request.width_mode
        && cached.height_mode == request.height_mode
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_types::UNDEFINED;

    fn cached(
        width_mode: MeasureMode,
        available_width: f32,
        height_mode: MeasureMode,
        available_height: f32,
        computed: (f32, f32),
    ) -> CachedMeasurement {
        CachedMeasurement {
            available_width,
            available_height,
            width_mode,
            height_mode,
            computed_width: computed.0,
            computed_height: computed.1,
        }
    }

    fn request(width_mode: MeasureMode, width: f32, height_mode: MeasureMode, height: f32) -> MeasureRequest {
        MeasureRequest {
            width_mode,
            width,
            height_mode,
            height,
        }
    }

    #[test]
    fn identical_request_is_reused() {
        let entry = cached(MeasureMode::Exactly, 100.0, MeasureMode::Undefined, UNDEFINED, (100.0, 20.0));
        let req = request(MeasureMode::Exactly, 100.0, MeasureMode::Undefined, UNDEFINED);
        assert!(can_use_cached_measurement(req, &entry, 0.0, 0.0, 0.0));
    }

    #[test]
    fn unconstrained_result_fits_new_upper_bound() {
        let entry = cached(MeasureMode::Undefined, UNDEFINED, MeasureMode::Undefined, UNDEFINED, (60.0, 20.0));
        let fits = request(MeasureMode::AtMost, 80.0, MeasureMode::Undefined, UNDEFINED);
        assert!(can_use_cached_measurement(fits, &entry, 0.0, 0.0, 0.0));

        let too_small = request(MeasureMode::AtMost, 50.0, MeasureMode::Undefined, UNDEFINED);
        assert!(!can_use_cached_measurement(too_small, &entry, 0.0, 0.0, 0.0));
    }

    #[test]
    fn exact_request_matching_old_result_is_reused() {
        let entry = cached(MeasureMode::AtMost, 200.0, MeasureMode::Undefined, UNDEFINED, (60.0, 20.0));
        let req = request(MeasureMode::Exactly, 70.0, MeasureMode::Undefined, UNDEFINED);
        assert!(can_use_cached_measurement(req, &entry, 10.0, 0.0, 0.0));
        assert!(!can_use_cached_measurement(req, &entry, 0.0, 0.0, 0.0));
    }

    #[test]
    fn tighter_bound_reuses_when_result_still_fits() {
        let entry = cached(MeasureMode::AtMost, 200.0, MeasureMode::AtMost, 100.0, (60.0, 20.0));
        let tighter = request(MeasureMode::AtMost, 80.0, MeasureMode::AtMost, 50.0);
        assert!(can_use_cached_measurement(tighter, &entry, 0.0, 0.0, 0.0));

        let looser = request(MeasureMode::AtMost, 300.0, MeasureMode::AtMost, 100.0);
        assert!(!can_use_cached_measurement(looser, &entry, 0.0, 0.0, 0.0));
    }

    #[test]
    fn negative_results_are_never_reused() {
        let entry = cached(MeasureMode::Exactly, 10.0, MeasureMode::Exactly, 10.0, (-1.0, -1.0));
        let req = request(MeasureMode::Exactly, 10.0, MeasureMode::Exactly, 10.0);
        assert!(!can_use_cached_measurement(req, &entry, 0.0, 0.0, 0.0));
    }

    #[test]
    fn pixel_grid_comparison_ignores_sub_pixel_noise() {
        let entry = cached(MeasureMode::Exactly, 100.2, MeasureMode::Exactly, 50.0, (100.2, 50.0));
        let req = request(MeasureMode::Exactly, 99.9, MeasureMode::Exactly, 50.0);
        assert!(can_use_cached_measurement(req, &entry, 0.0, 0.0, 1.0));
        assert!(!can_use_cached_measurement(req, &entry, 0.0, 0.0, 0.0));
        assert!(!matches_exactly(req, &entry));
    }
}
