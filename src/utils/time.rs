// src/utils/time.rs

/// Formats a countdown as `MM:SS`, or `H:MM:SS` from one hour up.
pub fn format_remaining(secs: u32) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// Human readable time limit, e.g. "90 minutes" or "No time limit".
pub fn format_limit(minutes: Option<u32>) -> String {
    match minutes {
        Some(0) | None => "No time limit".to_string(),
        Some(1) => "1 minute".to_string(),
        Some(m) => format!("{} minutes", m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(59), "00:59");
        assert_eq!(format_remaining(600), "10:00");
        assert_eq!(format_remaining(3661), "1:01:01");
    }

    #[test]
    fn test_format_limit() {
        assert_eq!(format_limit(None), "No time limit");
        assert_eq!(format_limit(Some(0)), "No time limit");
        assert_eq!(format_limit(Some(1)), "1 minute");
        assert_eq!(format_limit(Some(45)), "45 minutes");
    }
}
