//! Gap candidate selection over silence periods

use crate::preprocessing::silence::SilencePeriod;

/// Pick the silence endpoint closest to `expected_gap_ms`
///
/// Both the start and the end of every period are candidates, since the gap
/// can sit at either edge of a quiet stretch. Ties keep the earliest endpoint
/// in list order (a period's start before its end).
///
/// # Returns
///
/// `None` when `periods` is empty
pub fn select_gap_candidate(periods: &[SilencePeriod], expected_gap_ms: f64) -> Option<f64> {
    let mut best: Option<(f64, f64)> = None;

    for endpoint in periods.iter().flat_map(|p| [p.start_ms, p.end_ms]) {
        let distance = (endpoint - expected_gap_ms).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((endpoint, distance)),
        }
    }

    if let Some((endpoint, distance)) = best {
        log::debug!(
            "Selected gap candidate {:.1} ms from {} periods ({:.1} ms from expected)",
            endpoint,
            periods.len(),
            distance
        );
    }

    best.map(|(endpoint, _)| endpoint)
}
