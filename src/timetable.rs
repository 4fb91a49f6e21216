/// Fixed bell schedule: seven 45-minute slots starting at 09:00 with a
/// 15-minute break between them. The backend sends no times of its own, so
/// slot numbers outside 1..=7 resolve to empty strings.
pub fn lesson_times(num: i64) -> (&'static str, &'static str) {
    match num {
        1 => ("09:00", "09:45"),
        2 => ("10:00", "10:45"),
        3 => ("11:00", "11:45"),
        4 => ("12:00", "12:45"),
        5 => ("13:00", "13:45"),
        6 => ("14:00", "14:45"),
        7 => ("15:00", "15:45"),
        _ => ("", ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covers_slots_one_through_seven() {
        assert_eq!(lesson_times(1), ("09:00", "09:45"));
        assert_eq!(lesson_times(4), ("12:00", "12:45"));
        assert_eq!(lesson_times(7), ("15:00", "15:45"));
    }

    #[test]
    fn out_of_range_slots_are_empty() {
        assert_eq!(lesson_times(0), ("", ""));
        assert_eq!(lesson_times(8), ("", ""));
        assert_eq!(lesson_times(-3), ("", ""));
    }
}
