use std::time::Duration;

/// Formats a remaining-time estimate for display.
///
/// Shows the two most significant units, e.g. `"1 day, 3 hours"`,
/// `"4 minutes, 10 seconds"`, `"1 second"`. A zero lower unit is omitted.
/// Returns `"?"` when no estimate is available.
pub fn print_time_diff(diff: Option<Duration>) -> String {
    let total = match diff {
        Some(d) => d.as_secs(),
        None    => return "?".to_owned(),
    };

    let days    = total / 86_400;
    let hours   = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    if days > 0 {
        pair(days, "day", hours, "hour")
    } else if hours > 0 {
        pair(hours, "hour", minutes, "minute")
    } else if minutes > 0 {
        pair(minutes, "minute", seconds, "second")
    } else {
        plural(seconds, "second")
    }
}

fn plural(n: u64, unit: &str) -> String {
    if n == 1 {
        format!("{} {}", n, unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

fn pair(n1: u64, unit1: &str, n2: u64, unit2: &str) -> String {
    if n2 == 0 {
        plural(n1, unit1)
    } else {
        format!("{}, {}", plural(n1, unit1), plural(n2, unit2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown() {
        assert_eq!(print_time_diff(None), "?");
    }

    #[test]
    fn picks_two_largest_units() {
        assert_eq!(print_time_diff(Some(Duration::from_secs(0))), "0 seconds");
        assert_eq!(print_time_diff(Some(Duration::from_secs(1))), "1 second");
        assert_eq!(print_time_diff(Some(Duration::from_secs(250))), "4 minutes, 10 seconds");
        assert_eq!(print_time_diff(Some(Duration::from_secs(7_200))), "2 hours");
        assert_eq!(print_time_diff(Some(Duration::from_secs(90_000))), "1 day, 1 hour");
    }
}
