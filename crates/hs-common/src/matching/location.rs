fn normalize(location: &str) -> String {
    location.trim().to_lowercase()
}

/// Exact location match after trimming, ignoring case. A missing or blank
/// preference never matches. "Remote" gets no special treatment.
pub fn location_score(job_location: &str, preference: Option<&str>) -> f64 {
    let Some(preference) = preference.map(normalize).filter(|p| !p.is_empty()) else {
        return 0.0;
    };

    if normalize(job_location) == preference {
        100.0
    } else {
        0.0
    }
}
