use time::OffsetDateTime;

/// Wall-clock time as unix milliseconds.
pub fn unix_millis_now() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// Wall-clock time as whole unix seconds, floored.
pub fn unix_seconds_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_are_floored_millis() {
        let millis = unix_millis_now();
        let seconds = unix_seconds_now();
        assert!(seconds >= millis / 1_000);
        assert!(seconds - millis / 1_000 <= 1);
    }
}
