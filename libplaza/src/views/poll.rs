//! Poll and event ratios

use crate::types::{EventDetails, Poll};

/// `round(100 * part / total)`, rounding halves up. Zero total gives zero.
pub fn percentage(part: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    let part = u64::from(part);
    let total = u64::from(total);
    let rounded = (200 * part + total) / (2 * total);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Percentage per option, in option order.
///
/// Each option is rounded on its own, so the sum may land a point or two
/// away from 100.
pub fn poll_percentages(poll: &Poll) -> Vec<u32> {
    let total = poll.total_votes();
    poll.options
        .iter()
        .map(|option| percentage(option.vote_count(), total))
        .collect()
}

/// Share of the capacity taken, capped at 100. `None` when uncapped.
pub fn attendance_rate(event: &EventDetails) -> Option<u32> {
    event
        .capacity
        .map(|capacity| percentage(event.attendees.count(), capacity).min(100))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PollOption, Reactions};

    fn poll(votes: &[u32]) -> Poll {
        Poll {
            question: "Wie würdet ihr vorgehen?".to_string(),
            options: votes
                .iter()
                .enumerate()
                .map(|(i, votes)| PollOption::with_votes(format!("Option {}", i), *votes))
                .collect(),
        }
    }

    #[test]
    fn test_zero_votes_gives_zero_everywhere() {
        assert_eq!(poll_percentages(&poll(&[0, 0, 0])), vec![0, 0, 0]);
    }

    #[test]
    fn test_percentages_for_observed_tally() {
        let percentages = poll_percentages(&poll(&[45, 78, 12]));
        assert_eq!(percentages, vec![33, 58, 9]);
        assert!(percentages.iter().all(|p| *p <= 100));
        let sum: u32 = percentages.iter().sum();
        assert!((98..=102).contains(&sum));
    }

    #[test]
    fn test_half_rounds_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(5, 5), 100);
    }

    #[test]
    fn test_attendance_rate() {
        let mut event = crate::types::EventDetails {
            title: "Online Case Discussion".to_string(),
            datetime: crate::feed::draft::parse_event_date("2024-12-20T19:00").unwrap(),
            location: Some("Online".to_string()),
            attendees: Reactions::seeded(89, None),
            capacity: Some(200),
        };
        assert_eq!(attendance_rate(&event), Some(45));

        event.capacity = None;
        assert_eq!(attendance_rate(&event), None);
    }
}
